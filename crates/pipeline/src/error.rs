use reelsmith_core::CoreError;

/// Errors from an [`ObjectStore`](crate::store::ObjectStore).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Object not found: {key}")]
    NotFound { key: String },

    /// The backend rejected or failed the request.
    #[error("Storage backend error for '{key}': {message}")]
    Backend { key: String, message: String },
}

/// Errors from text, image and speech generators.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("Prompt must not be empty")]
    EmptyPrompt,

    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Generator API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The provider answered 2xx with a body we could not use.
    #[error("Malformed generator response: {0}")]
    Malformed(String),
}

/// Errors from reading the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: '{value}'")]
    Invalid { var: &'static str, value: String },
}

/// Top-level error of the scenario and asset pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Generator(#[from] GeneratorError),

    #[error("Generated scenario is not valid JSON: {0}")]
    ScenarioJson(#[from] serde_json::Error),

    /// A project without shots has nothing to render.
    #[error("Project {0} has no shots to render")]
    EmptyProject(String),

    #[error("Generator returned no image for {0}")]
    NoImage(String),
}
