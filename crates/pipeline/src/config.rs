use std::str::FromStr;

use crate::error::ConfigError;

/// S3-compatible object storage settings.
#[derive(Debug, Clone)]
pub struct S3Config {
    /// Custom endpoint for MinIO/LocalStack; `None` uses AWS.
    pub endpoint_url: Option<String>,
    pub bucket: String,
    pub region: String,
    /// Static credentials. When either is missing the default AWS credential
    /// chain is used.
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    /// Path-style addressing, required by MinIO.
    pub force_path_style: bool,
}

/// OpenAI-compatible HTTP API settings.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub chat_model: String,
    pub image_model: String,
    pub image_size: String,
    pub speech_model: String,
    pub speech_voice: String,
    pub request_timeout_secs: u64,
}

/// Pipeline configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub s3: S3Config,
    pub openai: OpenAiConfig,
    /// Maximum number of generator requests in flight while rendering assets.
    pub asset_concurrency: usize,
    /// Language of the narration text requested from the scenario generator.
    pub narration_language: String,
}

impl PipelineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                     |
    /// |--------------------------|-----------------------------|
    /// | `S3_ENDPOINT_URL`        | unset (AWS)                 |
    /// | `S3_BUCKET`              | `reelsmith`                 |
    /// | `S3_REGION`              | `us-east-1`                 |
    /// | `S3_ACCESS_KEY`          | unset                       |
    /// | `S3_SECRET_KEY`          | unset                       |
    /// | `S3_FORCE_PATH_STYLE`    | `true`                      |
    /// | `OPENAI_API_KEY`         | required                    |
    /// | `OPENAI_BASE_URL`        | `https://api.openai.com/v1` |
    /// | `OPENAI_CHAT_MODEL`      | `gpt-5-nano`                |
    /// | `OPENAI_IMAGE_MODEL`     | `gpt-image-1`               |
    /// | `OPENAI_IMAGE_SIZE`      | `1024x1024`                 |
    /// | `OPENAI_SPEECH_MODEL`    | `gpt-4o-mini-tts`           |
    /// | `OPENAI_SPEECH_VOICE`    | `alloy`                     |
    /// | `OPENAI_TIMEOUT_SECS`    | `200`                       |
    /// | `ASSET_CONCURRENCY`      | `4`                         |
    /// | `NARRATION_LANGUAGE`     | `en`                        |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reading from `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.into());

        let s3 = S3Config {
            endpoint_url: lookup("S3_ENDPOINT_URL").filter(|s| !s.trim().is_empty()),
            bucket: var("S3_BUCKET", "reelsmith"),
            region: var("S3_REGION", "us-east-1"),
            access_key: lookup("S3_ACCESS_KEY"),
            secret_key: lookup("S3_SECRET_KEY"),
            force_path_style: parse_var(&lookup, "S3_FORCE_PATH_STYLE", true)?,
        };

        let openai = OpenAiConfig {
            api_key: lookup("OPENAI_API_KEY").ok_or(ConfigError::Missing("OPENAI_API_KEY"))?,
            base_url: var("OPENAI_BASE_URL", "https://api.openai.com/v1")
                .trim_end_matches('/')
                .to_string(),
            chat_model: var("OPENAI_CHAT_MODEL", "gpt-5-nano"),
            image_model: var("OPENAI_IMAGE_MODEL", "gpt-image-1"),
            image_size: var("OPENAI_IMAGE_SIZE", "1024x1024"),
            speech_model: var("OPENAI_SPEECH_MODEL", "gpt-4o-mini-tts"),
            speech_voice: var("OPENAI_SPEECH_VOICE", "alloy"),
            request_timeout_secs: parse_var(&lookup, "OPENAI_TIMEOUT_SECS", 200)?,
        };

        let asset_concurrency: usize = parse_var(&lookup, "ASSET_CONCURRENCY", 4)?;
        if asset_concurrency == 0 {
            return Err(ConfigError::Invalid {
                var: "ASSET_CONCURRENCY",
                value: "0".into(),
            });
        }

        Ok(Self {
            s3,
            openai,
            asset_concurrency,
            narration_language: var("NARRATION_LANGUAGE", "en"),
        })
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}
