//! Hierarchical identifiers and the storyboard entity model.
//!
//! - [`hierarchy`]: `Pr/Ep/Seq/Sh` ids, parsing and ordering.
//! - [`entity`]: the strictly-typed Project → Episode → Sequence → Shot tree.
//! - [`walker`]: id assignment for raw generated scenario data.
//! - [`fixtures`]: deterministic examples and the generator schema skeleton.
//! - [`storage_keys`]: object storage key derivation.
//!
//! Everything here is synchronous and free of I/O.

pub mod entity;
pub mod error;
pub mod fixtures;
pub mod hierarchy;
pub mod storage_keys;
pub mod types;
pub mod walker;

pub use entity::{
    EntityRef, EpisodeEntity, HierarchyIdInput, ProjectEntity, SequenceEntity, ShotEntity,
    StoryboardEntity,
};
pub use error::CoreError;
pub use hierarchy::{EpisodeId, HierarchyId, Level, LevelId, ProjectId, SequenceId, ShotId};
