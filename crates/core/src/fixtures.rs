//! Deterministic example storyboards.
//!
//! The examples double as the response schema handed to the scenario text
//! generator: [`schema_skeleton`] dumps [`ProjectEntity::example`] and strips
//! the fields the walker assigns.

use serde_json::Value;
use uuid::Uuid;

use crate::entity::{EpisodeEntity, ProjectEntity, SequenceEntity, ShotEntity};
use crate::hierarchy::{EpisodeId, ProjectId, SequenceId, ShotId};
use crate::types::Index;

/// Number of children each example node carries.
const EXAMPLE_CHILDREN: Index = 2;

impl ShotEntity {
    pub fn example() -> Self {
        Self::example_at(ShotId::new(0, 0, 0, 0))
    }

    fn example_at(hierarchy_id: ShotId) -> Self {
        Self::from_parts(Uuid::nil(), "Shot title", "Shot style", "Shot text", hierarchy_id)
    }
}

impl SequenceEntity {
    pub fn example() -> Self {
        Self::example_at(SequenceId::new(0, 0, 0))
    }

    fn example_at(hierarchy_id: SequenceId) -> Self {
        let shots = example_indices()
            .map(|i| ShotEntity::example_at(hierarchy_id.child(i)))
            .collect();
        Self::from_parts(Uuid::nil(), "Sequence title", "Sequence style", shots, hierarchy_id)
    }
}

impl EpisodeEntity {
    pub fn example() -> Self {
        Self::example_at(EpisodeId::new(0, 0))
    }

    fn example_at(hierarchy_id: EpisodeId) -> Self {
        let sequences = example_indices()
            .map(|i| SequenceEntity::example_at(hierarchy_id.child(i)))
            .collect();
        Self::from_parts(Uuid::nil(), "Episode title", "Episode style", sequences, hierarchy_id)
    }
}

impl ProjectEntity {
    pub fn example() -> Self {
        let hierarchy_id = ProjectId::new(0);
        let episodes = example_indices()
            .map(|i| EpisodeEntity::example_at(hierarchy_id.child(i)))
            .collect();
        Self::from_parts(Uuid::nil(), "Project name", "Project style", episodes, hierarchy_id)
    }
}

fn example_indices() -> impl Iterator<Item = Index> {
    0..EXAMPLE_CHILDREN
}

/// Remove every `key` entry from objects anywhere inside `value`.
pub fn deep_exclude_key(value: Value, key: &str) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(k, _)| k != key)
                .map(|(k, v)| (k, deep_exclude_key(v, key)))
                .collect(),
        ),
        Value::Array(items) => {
            Value::Array(items.into_iter().map(|v| deep_exclude_key(v, key)).collect())
        }
        other => other,
    }
}

/// Shape of a scenario as the text generator should return it: the example
/// project without `id` and `hierarchy_id`.
pub fn schema_skeleton() -> Value {
    let dumped = serde_json::to_value(ProjectEntity::example()).unwrap_or(Value::Null);
    deep_exclude_key(deep_exclude_key(dumped, "id"), "hierarchy_id")
}
