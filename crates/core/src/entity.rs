//! Storyboard entity tree: Project → Episodes → Sequences → Shots.
//!
//! Each node carries an id of exactly its own level. A `hierarchy_id` may be
//! supplied as a typed id, a canonical string or a flat field map; all three
//! go through [`resolve_hierarchy_id`], which never reinterprets a value as a
//! different level.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::hierarchy::{EpisodeId, HierarchyId, Level, LevelId, ProjectId, SequenceId, ShotId};
use crate::types::{EntityId, FieldMap};

// ---------------------------------------------------------------------------
// hierarchy_id input
// ---------------------------------------------------------------------------

/// The accepted shapes of a `hierarchy_id` value.
#[derive(Debug, Clone, PartialEq)]
pub enum HierarchyIdInput {
    /// An already-constructed id of some level.
    Typed(HierarchyId),
    /// A canonical string, parsed with the expected level's own pattern.
    Text(String),
    /// A flat field map such as `{"project": 0, "episode": 1}`.
    Fields(FieldMap),
}

macro_rules! typed_input {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for HierarchyIdInput {
                fn from(id: $ty) -> Self {
                    Self::Typed(id.into())
                }
            }
        )*
    };
}

typed_input!(HierarchyId, ProjectId, EpisodeId, SequenceId, ShotId);

impl From<&str> for HierarchyIdInput {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for HierarchyIdInput {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<FieldMap> for HierarchyIdInput {
    fn from(map: FieldMap) -> Self {
        Self::Fields(map)
    }
}

/// Resolve `input` into an id of level `T`.
///
/// A typed id of another level is a [`CoreError::TypeMismatch`], never
/// narrowed or widened. Strings fail with the level's own
/// [`CoreError::Format`]; field maps with [`CoreError::Validation`].
pub fn resolve_hierarchy_id<T: LevelId>(input: HierarchyIdInput) -> Result<T, CoreError> {
    match input {
        HierarchyIdInput::Typed(id) => T::from_hierarchy(id).map_err(|other| {
            CoreError::TypeMismatch {
                expected: T::LEVEL,
                actual: format!("{} level", other.level()),
            }
        }),
        HierarchyIdInput::Text(s) => T::parse_level(&s),
        HierarchyIdInput::Fields(map) => T::from_fields(&map),
    }
}

/// Resolve a JSON value. Anything but a string or an object is a type mismatch.
pub(crate) fn resolve_json<T: LevelId>(value: serde_json::Value) -> Result<T, CoreError> {
    use serde_json::Value;

    let input = match value {
        Value::String(s) => HierarchyIdInput::Text(s),
        Value::Object(map) => HierarchyIdInput::Fields(map),
        other => {
            let kind = match other {
                Value::Null => "null",
                Value::Bool(_) => "boolean",
                Value::Number(_) => "number",
                _ => "array",
            };
            return Err(CoreError::TypeMismatch {
                expected: T::LEVEL,
                actual: format!("{kind} value"),
            });
        }
    };
    resolve_hierarchy_id(input)
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShotEntity {
    id: EntityId,
    title: String,
    style: String,
    text: String,
    hierarchy_id: ShotId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SequenceEntity {
    id: EntityId,
    title: String,
    style: String,
    shots: Vec<ShotEntity>,
    hierarchy_id: SequenceId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EpisodeEntity {
    id: EntityId,
    title: String,
    style: String,
    sequences: Vec<SequenceEntity>,
    hierarchy_id: EpisodeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectEntity {
    id: EntityId,
    title: String,
    style: String,
    episodes: Vec<EpisodeEntity>,
    hierarchy_id: ProjectId,
}

impl ShotEntity {
    pub fn new(
        id: EntityId,
        title: impl Into<String>,
        style: impl Into<String>,
        text: impl Into<String>,
        hierarchy_id: impl Into<HierarchyIdInput>,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            id,
            title: title.into(),
            style: style.into(),
            text: text.into(),
            hierarchy_id: resolve_hierarchy_id(hierarchy_id.into())?,
        })
    }

    pub(crate) fn from_parts(
        id: EntityId,
        title: &str,
        style: &str,
        text: &str,
        hierarchy_id: ShotId,
    ) -> Self {
        Self {
            id,
            title: title.to_string(),
            style: style.to_string(),
            text: text.to_string(),
            hierarchy_id,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn style(&self) -> &str {
        &self.style
    }

    /// Narration text of the shot.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn hierarchy_id(&self) -> ShotId {
        self.hierarchy_id
    }
}

impl SequenceEntity {
    pub fn new(
        id: EntityId,
        title: impl Into<String>,
        style: impl Into<String>,
        shots: Vec<ShotEntity>,
        hierarchy_id: impl Into<HierarchyIdInput>,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            id,
            title: title.into(),
            style: style.into(),
            shots,
            hierarchy_id: resolve_hierarchy_id(hierarchy_id.into())?,
        })
    }

    pub(crate) fn from_parts(
        id: EntityId,
        title: &str,
        style: &str,
        shots: Vec<ShotEntity>,
        hierarchy_id: SequenceId,
    ) -> Self {
        Self {
            id,
            title: title.to_string(),
            style: style.to_string(),
            shots,
            hierarchy_id,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn style(&self) -> &str {
        &self.style
    }

    pub fn shots(&self) -> &[ShotEntity] {
        &self.shots
    }

    pub fn hierarchy_id(&self) -> SequenceId {
        self.hierarchy_id
    }
}

impl EpisodeEntity {
    pub fn new(
        id: EntityId,
        title: impl Into<String>,
        style: impl Into<String>,
        sequences: Vec<SequenceEntity>,
        hierarchy_id: impl Into<HierarchyIdInput>,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            id,
            title: title.into(),
            style: style.into(),
            sequences,
            hierarchy_id: resolve_hierarchy_id(hierarchy_id.into())?,
        })
    }

    pub(crate) fn from_parts(
        id: EntityId,
        title: &str,
        style: &str,
        sequences: Vec<SequenceEntity>,
        hierarchy_id: EpisodeId,
    ) -> Self {
        Self {
            id,
            title: title.to_string(),
            style: style.to_string(),
            sequences,
            hierarchy_id,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn style(&self) -> &str {
        &self.style
    }

    pub fn sequences(&self) -> &[SequenceEntity] {
        &self.sequences
    }

    pub fn hierarchy_id(&self) -> EpisodeId {
        self.hierarchy_id
    }
}

impl ProjectEntity {
    pub fn new(
        id: EntityId,
        title: impl Into<String>,
        style: impl Into<String>,
        episodes: Vec<EpisodeEntity>,
        hierarchy_id: impl Into<HierarchyIdInput>,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            id,
            title: title.into(),
            style: style.into(),
            episodes,
            hierarchy_id: resolve_hierarchy_id(hierarchy_id.into())?,
        })
    }

    pub(crate) fn from_parts(
        id: EntityId,
        title: &str,
        style: &str,
        episodes: Vec<EpisodeEntity>,
        hierarchy_id: ProjectId,
    ) -> Self {
        Self {
            id,
            title: title.to_string(),
            style: style.to_string(),
            episodes,
            hierarchy_id,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn style(&self) -> &str {
        &self.style
    }

    pub fn episodes(&self) -> &[EpisodeEntity] {
        &self.episodes
    }

    pub fn hierarchy_id(&self) -> ProjectId {
        self.hierarchy_id
    }

    pub fn sequences(&self) -> impl Iterator<Item = &SequenceEntity> {
        self.episodes.iter().flat_map(|episode| episode.sequences.iter())
    }

    /// Every shot of the project in storyboard order.
    pub fn shots(&self) -> impl Iterator<Item = &ShotEntity> {
        self.sequences().flat_map(|sequence| sequence.shots.iter())
    }

    /// Number of nodes at `level` (the project itself counts as one).
    pub fn count(&self, level: Level) -> usize {
        match level {
            Level::Project => 1,
            Level::Episode => self.episodes.len(),
            Level::Sequence => self.sequences().count(),
            Level::Shot => self.shots().count(),
        }
    }

    /// Look up the node addressed by `id`.
    pub fn find(&self, id: &HierarchyId) -> Option<EntityRef<'_>> {
        match *id {
            HierarchyId::Project(id) => {
                (id == self.hierarchy_id).then_some(EntityRef::Project(self))
            }
            HierarchyId::Episode(id) => self
                .episodes
                .iter()
                .find(|e| e.hierarchy_id == id)
                .map(EntityRef::Episode),
            HierarchyId::Sequence(id) => self
                .sequences()
                .find(|s| s.hierarchy_id == id)
                .map(EntityRef::Sequence),
            HierarchyId::Shot(id) => self
                .shots()
                .find(|s| s.hierarchy_id == id)
                .map(EntityRef::Shot),
        }
    }

    /// Check that every child's id extends its parent's id and that siblings
    /// are in strictly increasing order.
    pub fn validate_consistency(&self) -> Result<(), CoreError> {
        check_children(
            self.hierarchy_id,
            self.episodes.iter().map(|e| e.hierarchy_id),
            EpisodeId::parent,
        )?;
        for episode in &self.episodes {
            check_children(
                episode.hierarchy_id,
                episode.sequences.iter().map(|s| s.hierarchy_id),
                SequenceId::parent,
            )?;
            for sequence in &episode.sequences {
                check_children(
                    sequence.hierarchy_id,
                    sequence.shots.iter().map(|s| s.hierarchy_id),
                    ShotId::parent,
                )?;
            }
        }
        Ok(())
    }
}

fn check_children<P, C>(
    parent: P,
    children: impl Iterator<Item = C>,
    parent_of: fn(C) -> P,
) -> Result<(), CoreError>
where
    P: LevelId + PartialEq,
    C: LevelId + Ord,
{
    let mut previous: Option<C> = None;
    for child in children {
        if parent_of(child) != parent {
            return Err(CoreError::structural(
                child.to_string(),
                format!("does not belong to parent {parent}"),
            ));
        }
        if let Some(prev) = previous {
            if child <= prev {
                return Err(CoreError::structural(
                    child.to_string(),
                    format!("out of order after sibling {prev}"),
                ));
            }
        }
        previous = Some(child);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Level-tagged views
// ---------------------------------------------------------------------------

/// A storyboard node of any level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "level", rename_all = "snake_case")]
pub enum StoryboardEntity {
    Project(ProjectEntity),
    Episode(EpisodeEntity),
    Sequence(SequenceEntity),
    Shot(ShotEntity),
}

impl StoryboardEntity {
    pub fn as_ref(&self) -> EntityRef<'_> {
        match self {
            Self::Project(e) => EntityRef::Project(e),
            Self::Episode(e) => EntityRef::Episode(e),
            Self::Sequence(e) => EntityRef::Sequence(e),
            Self::Shot(e) => EntityRef::Shot(e),
        }
    }

    pub fn level(&self) -> Level {
        self.as_ref().level()
    }

    pub fn id(&self) -> EntityId {
        self.as_ref().id()
    }

    pub fn title(&self) -> &str {
        self.as_ref().title()
    }

    pub fn hierarchy_id(&self) -> HierarchyId {
        self.as_ref().hierarchy_id()
    }
}

/// Borrowed counterpart of [`StoryboardEntity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef<'a> {
    Project(&'a ProjectEntity),
    Episode(&'a EpisodeEntity),
    Sequence(&'a SequenceEntity),
    Shot(&'a ShotEntity),
}

impl<'a> EntityRef<'a> {
    pub fn level(&self) -> Level {
        self.hierarchy_id().level()
    }

    pub fn id(&self) -> EntityId {
        match self {
            Self::Project(e) => e.id,
            Self::Episode(e) => e.id,
            Self::Sequence(e) => e.id,
            Self::Shot(e) => e.id,
        }
    }

    pub fn title(&self) -> &'a str {
        match *self {
            Self::Project(e) => &e.title,
            Self::Episode(e) => &e.title,
            Self::Sequence(e) => &e.title,
            Self::Shot(e) => &e.title,
        }
    }

    pub fn hierarchy_id(&self) -> HierarchyId {
        match self {
            Self::Project(e) => e.hierarchy_id.into(),
            Self::Episode(e) => e.hierarchy_id.into(),
            Self::Sequence(e) => e.hierarchy_id.into(),
            Self::Shot(e) => e.hierarchy_id.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use uuid::Uuid;

    use super::*;

    fn shot(hierarchy_id: impl Into<HierarchyIdInput>) -> Result<ShotEntity, CoreError> {
        ShotEntity::new(Uuid::from_u128(1), "t", "s", "x", hierarchy_id)
    }

    // -- resolve_hierarchy_id ------------------------------------------------

    #[test]
    fn accepts_exact_level() {
        let id = ShotId::new(1, 2, 3, 4);
        assert_eq!(shot(id).unwrap().hierarchy_id(), id);
    }

    #[test]
    fn rejects_ancestor_levels() {
        let err = shot(SequenceId::new(1, 2, 3)).unwrap_err();
        assert_matches!(
            err,
            CoreError::TypeMismatch { expected: Level::Shot, ref actual }
                if actual == "Sequence level"
        );
        assert_matches!(shot(EpisodeId::new(1, 2)), Err(CoreError::TypeMismatch { .. }));
    }

    #[test]
    fn rejects_descendant_levels() {
        let err = SequenceEntity::new(Uuid::nil(), "bad", "x", vec![], ShotId::new(1, 1, 1, 1))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Type mismatch: expected Sequence level, got Shot level"
        );
    }

    #[test]
    fn string_is_parsed_with_the_level_pattern() {
        let entity = shot("Pr3-Ep4-Seq5-Sh6").unwrap();
        assert_eq!(entity.hierarchy_id(), ShotId::new(3, 4, 5, 6));

        // A valid sequence string is not reinterpreted as a shot.
        assert_matches!(shot("Pr3-Ep4-Seq5"), Err(CoreError::Format { target: "ShotId", .. }));
    }

    #[test]
    fn field_map_is_constructed_directly() {
        let map = serde_json::json!({"project": 3}).as_object().cloned().unwrap();
        let project = ProjectEntity::new(Uuid::nil(), "p", "s", vec![], map).unwrap();
        assert_eq!(project.hierarchy_id(), ProjectId::new(3));
    }

    #[test]
    fn unsupported_json_kinds_are_type_mismatches() {
        assert_matches!(
            resolve_json::<ProjectId>(serde_json::json!(3)),
            Err(CoreError::TypeMismatch { expected: Level::Project, ref actual })
                if actual == "number value"
        );
        assert_matches!(
            resolve_json::<ProjectId>(serde_json::Value::Null),
            Err(CoreError::TypeMismatch { .. })
        );
    }

    // -- serde ---------------------------------------------------------------

    #[test]
    fn deserialization_goes_through_level_validation() {
        let ok = serde_json::json!({
            "id": Uuid::nil(),
            "title": "t",
            "style": "s",
            "text": "x",
            "hierarchy_id": {"project": 0, "episode": 1, "sequence": 0, "shot": 2},
        });
        let entity: ShotEntity = serde_json::from_value(ok).unwrap();
        assert_eq!(entity.hierarchy_id().to_string(), "Pr0-Ep1-Seq0-Sh2");

        let wrong_level = serde_json::json!({
            "id": Uuid::nil(),
            "title": "t",
            "style": "s",
            "text": "x",
            "hierarchy_id": "Pr0-Ep1",
        });
        assert!(serde_json::from_value::<ShotEntity>(wrong_level).is_err());
    }

    #[test]
    fn project_dump_uses_canonical_strings() {
        let project = ProjectEntity::new(Uuid::nil(), "p", "s", vec![], ProjectId::new(9)).unwrap();
        let dumped = serde_json::to_value(&project).unwrap();
        assert_eq!(dumped["hierarchy_id"], "Pr9");
        assert_eq!(dumped["episodes"], serde_json::json!([]));
    }

    #[test]
    fn tagged_entity_carries_its_level() {
        let entity = StoryboardEntity::Shot(shot(ShotId::new(0, 0, 0, 0)).unwrap());
        let dumped = serde_json::to_value(&entity).unwrap();
        assert_eq!(dumped["level"], "shot");
        assert_eq!(entity.level(), Level::Shot);
        assert_eq!(entity.title(), entity.as_ref().title());
        assert_eq!(entity.hierarchy_id().to_string(), "Pr0-Ep0-Seq0-Sh0");

        let reloaded: StoryboardEntity = serde_json::from_value(dumped).unwrap();
        assert_eq!(reloaded, entity);
    }

    #[test]
    fn unknown_fields_are_not_silently_dropped() {
        let mut dumped = serde_json::to_value(ProjectEntity::example()).unwrap();
        dumped["sequences"] = serde_json::json!([]);
        assert!(serde_json::from_value::<ProjectEntity>(dumped).is_err());
    }

    // -- tree helpers --------------------------------------------------------

    fn small_project() -> ProjectEntity {
        let seq = SequenceId::new(0, 0, 0);
        let shots = vec![
            shot(seq.child(0)).unwrap(),
            shot(seq.child(1)).unwrap(),
        ];
        let sequence = SequenceEntity::new(Uuid::nil(), "S", "s", shots, seq).unwrap();
        let episode =
            EpisodeEntity::new(Uuid::nil(), "E", "s", vec![sequence], seq.parent()).unwrap();
        ProjectEntity::new(Uuid::nil(), "P", "s", vec![episode], ProjectId::new(0)).unwrap()
    }

    #[test]
    fn counts_and_lookup() {
        let project = small_project();
        assert_eq!(project.count(Level::Episode), 1);
        assert_eq!(project.count(Level::Shot), 2);

        let target = HierarchyId::parse("Pr0-Ep0-Seq0-Sh1").unwrap();
        let found = project.find(&target).unwrap();
        assert_eq!(found.level(), Level::Shot);
        assert_eq!(found.hierarchy_id(), target);
        assert!(project.find(&HierarchyId::parse("Pr0-Ep3").unwrap()).is_none());
    }

    #[test]
    fn consistent_tree_validates() {
        assert!(small_project().validate_consistency().is_ok());
    }

    #[test]
    fn misplaced_child_is_structural_error() {
        let stray = shot(ShotId::new(0, 0, 7, 0)).unwrap();
        let sequence =
            SequenceEntity::new(Uuid::nil(), "S", "s", vec![stray], SequenceId::new(0, 0, 0))
                .unwrap();
        let episode =
            EpisodeEntity::new(Uuid::nil(), "E", "s", vec![sequence], EpisodeId::new(0, 0))
                .unwrap();
        let project =
            ProjectEntity::new(Uuid::nil(), "P", "s", vec![episode], ProjectId::new(0)).unwrap();

        assert_matches!(
            project.validate_consistency(),
            Err(CoreError::Structural { ref path, .. }) if path == "Pr0-Ep0-Seq7-Sh0"
        );
    }

    #[test]
    fn duplicate_siblings_are_rejected() {
        let project_id = ProjectId::new(0);
        let episodes = vec![
            EpisodeEntity::new(Uuid::nil(), "E", "s", vec![], project_id.child(0)).unwrap(),
            EpisodeEntity::new(Uuid::nil(), "E", "s", vec![], project_id.child(0)).unwrap(),
        ];
        let project = ProjectEntity::new(Uuid::nil(), "P", "s", episodes, project_id).unwrap();
        assert!(project.validate_consistency().is_err());
    }
}
