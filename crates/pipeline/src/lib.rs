//! Scenario and asset pipeline built on the storyboard model.
//!
//! - [`ScenarioGenerator`]: asks a [`TextGenerator`] for a storyboard and
//!   validates it into a [`ProjectEntity`](reelsmith_core::ProjectEntity).
//! - [`render_assets`]: fans out image and narration generation over a
//!   project and stores the results.
//! - [`ObjectStore`]: storage seam, implemented by [`S3Store`] and
//!   [`MemoryStore`].
//! - [`openai`]: HTTP clients for an OpenAI-compatible API.

pub mod assets;
pub mod config;
pub mod error;
pub mod generator;
pub mod openai;
pub mod s3;
pub mod scenarist;
pub mod store;

pub use assets::{render_assets, AssetEntry, AssetManifest};
pub use config::{OpenAiConfig, PipelineConfig, S3Config};
pub use error::{ConfigError, GeneratorError, PipelineError, StoreError};
pub use generator::{ImageGenerator, SpeechGenerator, TextGenerator};
pub use openai::{OpenAiChat, OpenAiImages, OpenAiSpeech};
pub use s3::S3Store;
pub use scenarist::{load_scenario, save_scenario, ScenarioGenerator, ScenarioRequest};
pub use store::{MemoryStore, ObjectStore, StoredObject};
