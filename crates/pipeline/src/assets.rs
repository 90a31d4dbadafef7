//! Asset rendering: one illustration per sequence, one narration per shot.

use futures::stream::{self, StreamExt, TryStreamExt};
use reelsmith_core::storage_keys::{asset_key, content_type_for_key, AssetKind};
use reelsmith_core::{HierarchyId, Level, ProjectEntity};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::error::PipelineError;
use crate::generator::{ImageGenerator, SpeechGenerator};
use crate::store::ObjectStore;

/// One stored asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetEntry {
    pub hierarchy_id: HierarchyId,
    pub kind: AssetKind,
    pub key: String,
}

/// Everything [`render_assets`] stored, in hierarchy order (a sequence's
/// image precedes the narrations of its shots).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssetManifest {
    pub entries: Vec<AssetEntry>,
}

impl AssetManifest {
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.key.as_str())
    }

    pub fn of_kind(&self, kind: AssetKind) -> impl Iterator<Item = &AssetEntry> {
        self.entries.iter().filter(move |entry| entry.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug)]
enum Job {
    Image { id: HierarchyId, prompt: String },
    Narration { id: HierarchyId, text: String },
}

/// Illustration prompt for a sequence.
pub fn image_prompt(sequence_title: &str, sequence_style: &str, project_style: &str) -> String {
    format!("{sequence_title}. Visual style: {sequence_style}. Overall look: {project_style}.")
}

fn plan(project: &ProjectEntity) -> Vec<Job> {
    let mut jobs = Vec::with_capacity(project.count(Level::Sequence) + project.count(Level::Shot));
    for sequence in project.sequences() {
        jobs.push(Job::Image {
            id: sequence.hierarchy_id().into(),
            prompt: image_prompt(sequence.title(), sequence.style(), project.style()),
        });
        for shot in sequence.shots() {
            jobs.push(Job::Narration {
                id: shot.hierarchy_id().into(),
                text: shot.text().to_string(),
            });
        }
    }
    jobs
}

async fn run(
    job: Job,
    images: &dyn ImageGenerator,
    speech: &dyn SpeechGenerator,
    store: &dyn ObjectStore,
) -> Result<AssetEntry, PipelineError> {
    let (id, kind, data) = match job {
        Job::Image { id, prompt } => {
            let data = images
                .generate(&prompt)
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| PipelineError::NoImage(id.to_string()))?;
            (id, AssetKind::Image, data)
        }
        Job::Narration { id, text } => {
            let data = speech.synthesize(&text).await?;
            (id, AssetKind::Speech, data)
        }
    };

    let key = asset_key(&id, kind);
    let size_bytes = data.len();
    store.put(&key, data, content_type_for_key(&key)).await?;
    debug!(%key, size_bytes, "Asset stored");

    Ok(AssetEntry {
        hierarchy_id: id,
        kind,
        key,
    })
}

/// Generate and store every sequence image and shot narration of `project`.
///
/// At most `max_concurrency` generator calls run at once (zero is treated as
/// one). The first failure aborts the remaining work.
#[instrument(
    skip_all,
    fields(project = %project.hierarchy_id(), max_concurrency = max_concurrency)
)]
pub async fn render_assets(
    project: &ProjectEntity,
    images: &dyn ImageGenerator,
    speech: &dyn SpeechGenerator,
    store: &dyn ObjectStore,
    max_concurrency: usize,
) -> Result<AssetManifest, PipelineError> {
    if project.count(Level::Shot) == 0 {
        return Err(PipelineError::EmptyProject(project.hierarchy_id().to_string()));
    }

    let jobs = plan(project);
    info!(jobs = jobs.len(), "Rendering assets");

    let mut done: Vec<(usize, AssetEntry)> = stream::iter(jobs.into_iter().enumerate())
        .map(|(position, job)| async move {
            run(job, images, speech, store)
                .await
                .map(|entry| (position, entry))
        })
        .buffer_unordered(max_concurrency.max(1))
        .try_collect()
        .await?;

    done.sort_unstable_by_key(|(position, _)| *position);
    let manifest = AssetManifest {
        entries: done.into_iter().map(|(_, entry)| entry).collect(),
    };
    info!(assets = manifest.len(), "Assets rendered");
    Ok(manifest)
}
