//! Scenario generation: ask a text model for a storyboard, then turn the
//! reply into a validated [`ProjectEntity`].

use reelsmith_core::fixtures::schema_skeleton;
use reelsmith_core::storage_keys::{content_type_for_key, scenario_key};
use reelsmith_core::walker::{build_project, IdGenerator, RandomIds};
use reelsmith_core::{ProjectEntity, ProjectId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::error::PipelineError;
use crate::generator::TextGenerator;
use crate::store::ObjectStore;

/// What the storyboard should be about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioRequest {
    pub theme: String,
    pub style: String,
    /// Target narration length when read aloud.
    pub duration_secs: u32,
    /// Language of the shot text.
    pub language: String,
}

impl ScenarioRequest {
    pub fn new(theme: impl Into<String>, style: impl Into<String>, duration_secs: u32) -> Self {
        Self {
            theme: theme.into(),
            style: style.into(),
            duration_secs,
            language: "en".into(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// User prompt sent alongside the system role.
    pub fn prompt(&self) -> String {
        format!(
            "Topic: {}\nStyle/reference: {}\nCreate text in shots for {} seconds of aloud reading.",
            self.theme, self.style, self.duration_secs
        )
    }
}

/// System role describing the hierarchy rules and the expected JSON shape.
pub fn scenarist_role(language: &str) -> String {
    let schema = schema_skeleton();
    format!(
        "You are a scriptwriter for educational and entertainment videos.\n\
         Strictly adhere to the JSON response schema.\n\
         Requirements:\n\
         1) Return ONLY valid JSON without explanations and Markdown.\n\
         2) Maintain the hierarchy: project -> episodes -> sequences -> shots.\n   \
            In each project there are episodes;\n   \
            in each episode there are 3-7 sequences;\n   \
            in each sequence there are 5-10 shots;\n   \
            in each shot there are 3-5 text sentences.\n\
         3) Do not add fields outside the schema.\n\
         4) All language: en. Shot text language: {language}.\n\
         Schema:\n{schema}"
    )
}

/// Strip a surrounding Markdown code fence (```` ``` ```` or ```` ```json ````)
/// from a model reply.
pub fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Produces storyboards from a [`TextGenerator`].
pub struct ScenarioGenerator<G> {
    text: G,
}

impl<G: TextGenerator> ScenarioGenerator<G> {
    pub fn new(text: G) -> Self {
        Self { text }
    }

    /// Generate a project rooted at `root` with random entity ids.
    pub async fn generate(
        &self,
        request: &ScenarioRequest,
        root: ProjectId,
    ) -> Result<ProjectEntity, PipelineError> {
        self.generate_with(request, root, &mut RandomIds).await
    }

    /// Generate a project rooted at `root`, drawing entity ids from `ids`.
    #[instrument(skip_all, fields(theme = %request.theme, root = %root))]
    pub async fn generate_with<I>(
        &self,
        request: &ScenarioRequest,
        root: ProjectId,
        ids: &mut I,
    ) -> Result<ProjectEntity, PipelineError>
    where
        I: IdGenerator + ?Sized,
    {
        let role = scenarist_role(&request.language);
        let reply = self.text.ask(&request.prompt(), Some(&role)).await?;
        debug!(reply_len = reply.len(), "Scenario reply received");

        let raw: serde_json::Value = serde_json::from_str(strip_code_fence(&reply))?;
        let project = build_project(raw, root, ids)?;

        info!(
            episodes = project.episodes().len(),
            sequences = project.sequences().count(),
            shots = project.shots().count(),
            "Scenario generated"
        );
        Ok(project)
    }
}

/// Store `project` as JSON under its scenario key and return the key.
#[instrument(skip_all, fields(project = %project.hierarchy_id()))]
pub async fn save_scenario(
    store: &dyn ObjectStore,
    project: &ProjectEntity,
) -> Result<String, PipelineError> {
    let key = scenario_key(project.hierarchy_id());
    let data = serde_json::to_vec_pretty(project)?;
    store.put(&key, data, content_type_for_key(&key)).await?;
    info!(%key, "Scenario saved");
    Ok(key)
}

/// Load and re-validate the scenario stored for `project`.
#[instrument(skip(store))]
pub async fn load_scenario(
    store: &dyn ObjectStore,
    project: ProjectId,
) -> Result<ProjectEntity, PipelineError> {
    let key = scenario_key(project);
    let data = store.get(&key).await?;
    let loaded: ProjectEntity = serde_json::from_slice(&data)?;
    loaded.validate_consistency()?;
    Ok(loaded)
}
