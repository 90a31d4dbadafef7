//! Object storage key convention.
//!
//! Assets are stored under a directory per hierarchy segment followed by a
//! file named after the full canonical id:
//!
//! ```
//! use reelsmith_core::hierarchy::{HierarchyId, ShotId};
//! use reelsmith_core::storage_keys::object_key;
//!
//! let id = HierarchyId::from(ShotId::new(0, 1, 0, 2));
//! assert_eq!(object_key(&id, "png"), "Pr0/Ep1/Seq0/Sh2/Pr0-Ep1-Seq0-Sh2.png");
//! ```

use serde::{Deserialize, Serialize};

use crate::hierarchy::{HierarchyId, ProjectId, SEPARATOR};

/// Fallback MIME type for unknown extensions.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Known extension → MIME type pairs.
const CONTENT_TYPES: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("webp", "image/webp"),
    ("wav", "audio/wav"),
    ("mp4", "video/mp4"),
    ("json", "application/json"),
    ("yaml", "application/x-yaml"),
    ("yml", "application/x-yaml"),
];

/// Kinds of stored assets, each with its default file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Image,
    Speech,
    Video,
    Scenario,
}

impl AssetKind {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Image => "png",
            Self::Speech => "wav",
            Self::Video => "mp4",
            Self::Scenario => "json",
        }
    }
}

/// Build the storage key for the asset of `id` with file extension `ext`.
///
/// Convention: `{segment}/.../{segment}/{canonical}.{ext}`
///
/// - every `-` of the canonical form becomes a `/`
/// - the file name is the canonical form itself
/// - `ext` is lowercased and stripped of a leading `.`; an empty extension
///   leaves the file name bare
pub fn object_key(id: &HierarchyId, ext: &str) -> String {
    let canonical = id.to_string();
    let mut key = canonical.replace(SEPARATOR, "/");
    key.push('/');
    key.push_str(&canonical);

    let ext = ext.trim_start_matches('.').to_ascii_lowercase();
    if !ext.is_empty() {
        key.push('.');
        key.push_str(&ext);
    }
    key
}

/// Key of the asset of `kind` attached to `id`.
pub fn asset_key(id: &HierarchyId, kind: AssetKind) -> String {
    object_key(id, kind.extension())
}

/// Key under which a project's validated scenario is stored.
pub fn scenario_key(project: ProjectId) -> String {
    asset_key(&HierarchyId::Project(project), AssetKind::Scenario)
}

/// MIME type for a key, chosen by its extension (case-insensitive).
pub fn content_type_for_key(key: &str) -> &'static str {
    let file_name = key.rsplit('/').next().unwrap_or(key);
    let Some((_, ext)) = file_name.rsplit_once('.') else {
        return DEFAULT_CONTENT_TYPE;
    };
    let ext = ext.to_ascii_lowercase();
    CONTENT_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, content_type)| *content_type)
        .unwrap_or(DEFAULT_CONTENT_TYPE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::{EpisodeId, ShotId};

    #[test]
    fn project_key() {
        let id = HierarchyId::Project(ProjectId::new(3));
        assert_eq!(object_key(&id, "json"), "Pr3/Pr3.json");
    }

    #[test]
    fn episode_key() {
        let id = HierarchyId::Episode(EpisodeId::new(0, 4));
        assert_eq!(object_key(&id, "mp4"), "Pr0/Ep4/Pr0-Ep4.mp4");
    }

    #[test]
    fn extension_is_normalized() {
        let id = HierarchyId::Shot(ShotId::new(1, 2, 3, 4));
        assert_eq!(object_key(&id, ".WAV"), "Pr1/Ep2/Seq3/Sh4/Pr1-Ep2-Seq3-Sh4.wav");
    }

    #[test]
    fn empty_extension() {
        let id = HierarchyId::Project(ProjectId::new(0));
        assert_eq!(object_key(&id, ""), "Pr0/Pr0");
    }

    #[test]
    fn scenario_lives_next_to_the_project() {
        assert_eq!(scenario_key(ProjectId::new(7)), "Pr7/Pr7.json");
    }

    #[test]
    fn asset_kinds_pick_extensions() {
        let id = HierarchyId::Shot(ShotId::new(0, 0, 0, 1));
        assert_eq!(asset_key(&id, AssetKind::Image), "Pr0/Ep0/Seq0/Sh1/Pr0-Ep0-Seq0-Sh1.png");
        assert_eq!(asset_key(&id, AssetKind::Speech), "Pr0/Ep0/Seq0/Sh1/Pr0-Ep0-Seq0-Sh1.wav");
    }

    #[test]
    fn content_types() {
        assert_eq!(content_type_for_key("Pr0/Pr0.json"), "application/json");
        assert_eq!(content_type_for_key("a/b.JPG"), "image/jpeg");
        assert_eq!(content_type_for_key("a/b.yml"), "application/x-yaml");
        assert_eq!(content_type_for_key("a/b.bin"), DEFAULT_CONTENT_TYPE);
        assert_eq!(content_type_for_key("dir.png/noext"), DEFAULT_CONTENT_TYPE);
    }
}
