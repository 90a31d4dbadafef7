//! Hierarchical storyboard identifiers.
//!
//! Every node of a storyboard is addressed by a leveled id whose canonical
//! string form accumulates one segment per level:
//!
//! ```text
//! Pr<n>[-Ep<n>[-Seq<n>[-Sh<n>]]]
//! ```
//!
//! The four levels are independent value types ([`ProjectId`],
//! [`EpisodeId`], [`SequenceId`], [`ShotId`]) each carrying every numeric
//! component of its ancestors. [`HierarchyId`] is the sum type returned by the
//! level-agnostic parser.
//!
//! Input strings are never trimmed: `" Pr1"` is rejected at every level.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;
use crate::types::{FieldMap, Index};

// ---------------------------------------------------------------------------
// Levels
// ---------------------------------------------------------------------------

/// Separator between the segments of a canonical id.
pub const SEPARATOR: char = '-';

/// Pattern of the numeric part of a segment. ASCII digits only.
const DIGITS_PATTERN: &str = "([0-9]+)";

/// One of the four positions in the storyboard hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Project,
    Episode,
    Sequence,
    Shot,
}

impl Level {
    /// All levels, root first.
    pub const ALL: [Level; 4] = [Level::Project, Level::Episode, Level::Sequence, Level::Shot];

    /// Zero-based depth (`Project` = 0).
    pub const fn depth(self) -> usize {
        match self {
            Self::Project => 0,
            Self::Episode => 1,
            Self::Sequence => 2,
            Self::Shot => 3,
        }
    }

    /// Human-readable level name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Project => "Project",
            Self::Episode => "Episode",
            Self::Sequence => "Sequence",
            Self::Shot => "Shot",
        }
    }

    /// Name of the id type for this level, used in error messages.
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::Project => "ProjectId",
            Self::Episode => "EpisodeId",
            Self::Sequence => "SequenceId",
            Self::Shot => "ShotId",
        }
    }

    /// Field name of this level's numeric component in the structured encoding.
    pub const fn field(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Episode => "episode",
            Self::Sequence => "sequence",
            Self::Shot => "shot",
        }
    }

    /// Literal prefix of this level's string segment.
    pub const fn segment_prefix(self) -> &'static str {
        match self {
            Self::Project => "Pr",
            Self::Episode => "Ep",
            Self::Sequence => "Seq",
            Self::Shot => "Sh",
        }
    }

    /// Key of the child collection holding nodes of this level
    /// (`episodes`, `sequences`, `shots`). The root has none.
    pub const fn collection_key(self) -> Option<&'static str> {
        match self {
            Self::Project => None,
            Self::Episode => Some("episodes"),
            Self::Sequence => Some("sequences"),
            Self::Shot => Some("shots"),
        }
    }

    /// Inverse of [`collection_key`](Self::collection_key).
    pub fn from_collection_key(key: &str) -> Option<Level> {
        Self::ALL
            .into_iter()
            .find(|level| level.collection_key() == Some(key))
    }

    pub const fn parent(self) -> Option<Level> {
        match self {
            Self::Project => None,
            Self::Episode => Some(Self::Project),
            Self::Sequence => Some(Self::Episode),
            Self::Shot => Some(Self::Sequence),
        }
    }

    pub const fn child(self) -> Option<Level> {
        match self {
            Self::Project => Some(Self::Episode),
            Self::Episode => Some(Self::Sequence),
            Self::Sequence => Some(Self::Shot),
            Self::Shot => None,
        }
    }

    /// Field names of every component carried by an id of this level, root first.
    pub fn fields(self) -> impl Iterator<Item = &'static str> {
        let all: &'static [Level; 4] = &Self::ALL;
        all[..=self.depth()].iter().map(|level| level.field())
    }

    /// Anchored pattern matched by the canonical form of this level.
    pub fn pattern(self) -> &'static str {
        &LEVEL_PATTERNS[self.depth()].source
    }

    fn regex(self) -> &'static Regex {
        &LEVEL_PATTERNS[self.depth()].regex
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

struct LevelPattern {
    source: String,
    regex: Regex,
}

/// Compiled patterns, indexed by [`Level::depth`]. Each level's pattern is its
/// parent's pattern, the separator, and its own segment.
static LEVEL_PATTERNS: LazyLock<Vec<LevelPattern>> = LazyLock::new(|| {
    let mut accumulated = String::new();
    Level::ALL
        .iter()
        .map(|level| {
            if !accumulated.is_empty() {
                accumulated.push(SEPARATOR);
            }
            accumulated.push_str(level.segment_prefix());
            accumulated.push_str(DIGITS_PATTERN);
            let source = format!("^{accumulated}$");
            let regex = Regex::new(&source).expect("valid hierarchy pattern");
            LevelPattern { source, regex }
        })
        .collect()
});

/// Every level pattern joined with `|`, used when no level matched.
fn all_patterns() -> String {
    Level::ALL
        .iter()
        .map(|level| level.pattern())
        .collect::<Vec<_>>()
        .join("|")
}

fn format_error(target: &'static str, expected: impl Into<String>, input: &str) -> CoreError {
    CoreError::Format {
        target,
        expected: expected.into(),
        input: input.to_string(),
    }
}

/// Match `input` against `level`'s anchored pattern and return its numeric
/// components, root first.
fn match_components(level: Level, input: &str) -> Result<Vec<Index>, CoreError> {
    let captures = level
        .regex()
        .captures(input)
        .ok_or_else(|| format_error(level.type_name(), level.pattern(), input))?;

    captures
        .iter()
        .skip(1)
        .map(|group| {
            group
                .and_then(|m| m.as_str().parse::<Index>().ok())
                .ok_or_else(|| format_error(level.type_name(), level.pattern(), input))
        })
        .collect()
}

/// Read the flat field map of `level`. Every field of the level must be
/// present as a non-negative integer and no other key is allowed.
fn read_fields(level: Level, map: &FieldMap) -> Result<Vec<Index>, CoreError> {
    if let Some(extra) = map.keys().find(|key| !level.fields().any(|f| f == key.as_str())) {
        return Err(CoreError::Validation(format!(
            "{}: unexpected field '{extra}'",
            level.type_name()
        )));
    }

    level
        .fields()
        .map(|field| {
            let value = map.get(field).ok_or_else(|| {
                CoreError::Validation(format!("{}: missing field '{field}'", level.type_name()))
            })?;
            value
                .as_u64()
                .and_then(|n| Index::try_from(n).ok())
                .ok_or_else(|| {
                    CoreError::Validation(format!(
                        "{}: field '{field}' must be a non-negative integer, got {value}",
                        level.type_name()
                    ))
                })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Level id trait
// ---------------------------------------------------------------------------

/// Behaviour shared by the four concrete id types.
pub trait LevelId: Sized + Copy + fmt::Display + Into<HierarchyId> {
    /// The level this id type addresses.
    const LEVEL: Level;

    /// Build from numeric components, root first. Returns `None` when the
    /// slice length does not match the level.
    fn from_components(components: &[Index]) -> Option<Self>;

    /// Narrow a [`HierarchyId`] to this level, handing it back on mismatch.
    fn from_hierarchy(id: HierarchyId) -> Result<Self, HierarchyId>;

    /// Parse with this level's own anchored pattern.
    fn parse_level(s: &str) -> Result<Self, CoreError> {
        let components = match_components(Self::LEVEL, s)?;
        Self::from_components(&components)
            .ok_or_else(|| format_error(Self::LEVEL.type_name(), Self::LEVEL.pattern(), s))
    }

    /// Build from the structured encoding, e.g. `{"project": 1, "episode": 2}`.
    fn from_fields(map: &FieldMap) -> Result<Self, CoreError> {
        let components = read_fields(Self::LEVEL, map)?;
        Self::from_components(&components).ok_or_else(|| {
            CoreError::Validation(format!("{}: wrong number of fields", Self::LEVEL.type_name()))
        })
    }

    fn to_fields(self) -> FieldMap {
        self.into().to_fields()
    }
}

// ---------------------------------------------------------------------------
// Concrete ids
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProjectId {
    pub project: Index,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EpisodeId {
    pub project: Index,
    pub episode: Index,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SequenceId {
    pub project: Index,
    pub episode: Index,
    pub sequence: Index,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShotId {
    pub project: Index,
    pub episode: Index,
    pub sequence: Index,
    pub shot: Index,
}

impl ProjectId {
    pub const fn new(project: Index) -> Self {
        Self { project }
    }

    /// Id of the episode at `episode` within this project.
    pub const fn child(self, episode: Index) -> EpisodeId {
        EpisodeId::new(self.project, episode)
    }
}

impl EpisodeId {
    pub const fn new(project: Index, episode: Index) -> Self {
        Self { project, episode }
    }

    pub const fn parent(self) -> ProjectId {
        ProjectId::new(self.project)
    }

    pub const fn child(self, sequence: Index) -> SequenceId {
        SequenceId::new(self.project, self.episode, sequence)
    }
}

impl SequenceId {
    pub const fn new(project: Index, episode: Index, sequence: Index) -> Self {
        Self {
            project,
            episode,
            sequence,
        }
    }

    pub const fn parent(self) -> EpisodeId {
        EpisodeId::new(self.project, self.episode)
    }

    pub const fn child(self, shot: Index) -> ShotId {
        ShotId::new(self.project, self.episode, self.sequence, shot)
    }
}

impl ShotId {
    pub const fn new(project: Index, episode: Index, sequence: Index, shot: Index) -> Self {
        Self {
            project,
            episode,
            sequence,
            shot,
        }
    }

    pub const fn parent(self) -> SequenceId {
        SequenceId::new(self.project, self.episode, self.sequence)
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pr{}", self.project)
    }
}

impl fmt::Display for EpisodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}Ep{}", self.parent(), self.episode)
    }
}

impl fmt::Display for SequenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}Seq{}", self.parent(), self.sequence)
    }
}

impl fmt::Display for ShotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}Sh{}", self.parent(), self.shot)
    }
}

impl LevelId for ProjectId {
    const LEVEL: Level = Level::Project;

    fn from_components(components: &[Index]) -> Option<Self> {
        match *components {
            [project] => Some(Self::new(project)),
            _ => None,
        }
    }

    fn from_hierarchy(id: HierarchyId) -> Result<Self, HierarchyId> {
        match id {
            HierarchyId::Project(id) => Ok(id),
            other => Err(other),
        }
    }
}

impl LevelId for EpisodeId {
    const LEVEL: Level = Level::Episode;

    fn from_components(components: &[Index]) -> Option<Self> {
        match *components {
            [project, episode] => Some(Self::new(project, episode)),
            _ => None,
        }
    }

    fn from_hierarchy(id: HierarchyId) -> Result<Self, HierarchyId> {
        match id {
            HierarchyId::Episode(id) => Ok(id),
            other => Err(other),
        }
    }
}

impl LevelId for SequenceId {
    const LEVEL: Level = Level::Sequence;

    fn from_components(components: &[Index]) -> Option<Self> {
        match *components {
            [project, episode, sequence] => Some(Self::new(project, episode, sequence)),
            _ => None,
        }
    }

    fn from_hierarchy(id: HierarchyId) -> Result<Self, HierarchyId> {
        match id {
            HierarchyId::Sequence(id) => Ok(id),
            other => Err(other),
        }
    }
}

impl LevelId for ShotId {
    const LEVEL: Level = Level::Shot;

    fn from_components(components: &[Index]) -> Option<Self> {
        match *components {
            [project, episode, sequence, shot] => {
                Some(Self::new(project, episode, sequence, shot))
            }
            _ => None,
        }
    }

    fn from_hierarchy(id: HierarchyId) -> Result<Self, HierarchyId> {
        match id {
            HierarchyId::Shot(id) => Ok(id),
            other => Err(other),
        }
    }
}

/// `FromStr`, serde and `From<_> for HierarchyId` for a concrete level id.
///
/// Ids serialize as their canonical string and deserialize from either the
/// canonical string or the flat field map.
macro_rules! level_id_conversions {
    ($ty:ident, $variant:ident) => {
        impl FromStr for $ty {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty as LevelId>::parse_level(s)
            }
        }

        impl From<$ty> for HierarchyId {
            fn from(id: $ty) -> Self {
                HierarchyId::$variant(id)
            }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let value = serde_json::Value::deserialize(deserializer)?;
                crate::entity::resolve_json::<$ty>(value).map_err(serde::de::Error::custom)
            }
        }
    };
}

level_id_conversions!(ProjectId, Project);
level_id_conversions!(EpisodeId, Episode);
level_id_conversions!(SequenceId, Sequence);
level_id_conversions!(ShotId, Shot);

// ---------------------------------------------------------------------------
// HierarchyId
// ---------------------------------------------------------------------------

/// An id of any level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HierarchyId {
    Project(ProjectId),
    Episode(EpisodeId),
    Sequence(SequenceId),
    Shot(ShotId),
}

impl HierarchyId {
    /// Parse a canonical string of any level.
    ///
    /// Levels are tried deepest first; patterns are anchored so at most one
    /// can match.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        for level in Level::ALL.iter().rev() {
            if !level.regex().is_match(s) {
                continue;
            }
            return Ok(match level {
                Level::Project => ProjectId::parse_level(s)?.into(),
                Level::Episode => EpisodeId::parse_level(s)?.into(),
                Level::Sequence => SequenceId::parse_level(s)?.into(),
                Level::Shot => ShotId::parse_level(s)?.into(),
            });
        }
        Err(format_error("HierarchyId", all_patterns(), s))
    }

    /// Build from a flat field map. The level is the deepest field present;
    /// gaps (e.g. `sequence` without `episode`) are rejected.
    pub fn from_fields(map: &FieldMap) -> Result<Self, CoreError> {
        let level = Level::ALL
            .iter()
            .rev()
            .find(|level| map.contains_key(level.field()))
            .copied()
            .ok_or_else(|| {
                CoreError::Validation("HierarchyId: missing field 'project'".to_string())
            })?;
        Ok(match level {
            Level::Project => ProjectId::from_fields(map)?.into(),
            Level::Episode => EpisodeId::from_fields(map)?.into(),
            Level::Sequence => SequenceId::from_fields(map)?.into(),
            Level::Shot => ShotId::from_fields(map)?.into(),
        })
    }

    pub const fn level(&self) -> Level {
        match self {
            Self::Project(_) => Level::Project,
            Self::Episode(_) => Level::Episode,
            Self::Sequence(_) => Level::Sequence,
            Self::Shot(_) => Level::Shot,
        }
    }

    /// The enclosing id, or `None` for a project.
    pub const fn parent(&self) -> Option<HierarchyId> {
        match *self {
            Self::Project(_) => None,
            Self::Episode(id) => Some(Self::Project(id.parent())),
            Self::Sequence(id) => Some(Self::Episode(id.parent())),
            Self::Shot(id) => Some(Self::Sequence(id.parent())),
        }
    }

    /// The id of the child at `index` one level down, or `None` for a shot.
    pub const fn child(&self, index: Index) -> Option<HierarchyId> {
        match *self {
            Self::Project(id) => Some(Self::Episode(id.child(index))),
            Self::Episode(id) => Some(Self::Sequence(id.child(index))),
            Self::Sequence(id) => Some(Self::Shot(id.child(index))),
            Self::Shot(_) => None,
        }
    }

    /// Numeric components; levels below this id are `None`.
    pub const fn components(&self) -> (Index, Option<Index>, Option<Index>, Option<Index>) {
        match *self {
            Self::Project(id) => (id.project, None, None, None),
            Self::Episode(id) => (id.project, Some(id.episode), None, None),
            Self::Sequence(id) => (id.project, Some(id.episode), Some(id.sequence), None),
            Self::Shot(id) => (id.project, Some(id.episode), Some(id.sequence), Some(id.shot)),
        }
    }

    pub const fn project(&self) -> ProjectId {
        ProjectId::new(self.components().0)
    }

    /// Whether `self` strictly encloses `other`.
    pub fn is_ancestor_of(&self, other: &HierarchyId) -> bool {
        let mut current = other.parent();
        while let Some(id) = current {
            if id == *self {
                return true;
            }
            current = id.parent();
        }
        false
    }

    pub fn to_fields(&self) -> FieldMap {
        let (project, episode, sequence, shot) = self.components();
        let values = [Some(project), episode, sequence, shot];
        Level::ALL
            .iter()
            .zip(values)
            .filter_map(|(level, value)| value.map(|v| (level.field().to_string(), v.into())))
            .collect()
    }
}

impl PartialOrd for HierarchyId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Ordered by `(project, episode, sequence, shot)` with an absent component
/// sorting before any present one, so a parent precedes its children.
impl Ord for HierarchyId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.components().cmp(&other.components())
    }
}

impl fmt::Display for HierarchyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Project(id) => id.fmt(f),
            Self::Episode(id) => id.fmt(f),
            Self::Sequence(id) => id.fmt(f),
            Self::Shot(id) => id.fmt(f),
        }
    }
}

impl FromStr for HierarchyId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for HierarchyId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HierarchyId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(s) => Self::parse(&s).map_err(D::Error::custom),
            serde_json::Value::Object(map) => Self::from_fields(&map).map_err(D::Error::custom),
            other => Err(D::Error::custom(format!(
                "hierarchy id must be a string or a field map, got {other}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    // -- patterns ------------------------------------------------------------

    #[test]
    fn patterns_accumulate_from_the_root() {
        assert_eq!(Level::Project.pattern(), "^Pr([0-9]+)$");
        assert_eq!(Level::Episode.pattern(), "^Pr([0-9]+)-Ep([0-9]+)$");
        assert_eq!(
            Level::Shot.pattern(),
            "^Pr([0-9]+)-Ep([0-9]+)-Seq([0-9]+)-Sh([0-9]+)$"
        );
    }

    #[test]
    fn collection_keys_map_back_to_levels() {
        assert_eq!(Level::from_collection_key("episodes"), Some(Level::Episode));
        assert_eq!(Level::from_collection_key("shots"), Some(Level::Shot));
        assert_eq!(Level::from_collection_key("projects"), None);
    }

    // -- ProjectId -----------------------------------------------------------

    #[test]
    fn project_from_str() {
        let id: ProjectId = "Pr123".parse().unwrap();
        assert_eq!(id, ProjectId::new(123));
        assert_eq!(id.to_string(), "Pr123");
    }

    #[test]
    fn project_rejects_malformed() {
        for s in ["", "Pr", "Pr-1", "PrA", "Ep1", "Pr1-Ep2", "pr1", "Pr+1"] {
            assert_matches!(ProjectId::from_str(s), Err(CoreError::Format { .. }), "{s}");
        }
    }

    #[test]
    fn surrounding_whitespace_is_not_trimmed() {
        assert!(ProjectId::from_str(" Pr1").is_err());
        assert!(ShotId::from_str("Pr1-Ep2-Seq3-Sh4\n").is_err());
        assert!(HierarchyId::parse("Pr1 ").is_err());
    }

    #[test]
    fn non_ascii_digits_are_rejected() {
        assert!(ProjectId::from_str("Pr١").is_err());
    }

    #[test]
    fn out_of_range_component_is_a_format_error() {
        let err = ProjectId::from_str("Pr99999999999").unwrap_err();
        assert_matches!(err, CoreError::Format { target: "ProjectId", .. });
    }

    #[test]
    fn leading_zeros_parse_to_the_canonical_value() {
        let id = EpisodeId::from_str("Pr01-Ep002").unwrap();
        assert_eq!(id, EpisodeId::new(1, 2));
        assert_eq!(id.to_string(), "Pr1-Ep2");
    }

    // -- EpisodeId / SequenceId / ShotId -------------------------------------

    #[test]
    fn episode_rejects_other_levels() {
        for s in ["Ep1", "Pr1", "Pr1-Ep", "Pr-Ep1", "Pr1-EpA", "Pr1-Ep1-Seq2", ""] {
            assert!(EpisodeId::from_str(s).is_err(), "{s}");
        }
    }

    #[test]
    fn sequence_round_trips() {
        let id = SequenceId::from_str("Pr10-Ep25-Seq99").unwrap();
        assert_eq!((id.project, id.episode, id.sequence), (10, 25, 99));
        assert_eq!(id.to_string(), "Pr10-Ep25-Seq99");
    }

    #[test]
    fn shot_parent_is_sequence() {
        let shot = ShotId::from_str("Pr1-Ep2-Seq3-Sh4").unwrap();
        assert_eq!((shot.project, shot.episode, shot.sequence, shot.shot), (1, 2, 3, 4));
        assert_eq!(shot.parent().to_string(), "Pr1-Ep2-Seq3");
        assert_eq!(shot.parent().parent().parent(), ProjectId::new(1));
    }

    #[test]
    fn children_extend_their_parent() {
        let shot = ProjectId::new(0).child(1).child(0).child(2);
        assert_eq!(shot.to_string(), "Pr0-Ep1-Seq0-Sh2");
    }

    #[test]
    fn format_error_names_pattern_and_input() {
        let err = ShotId::from_str("Pr1-Ep2-Seq3").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid ShotId: expected '^Pr([0-9]+)-Ep([0-9]+)-Seq([0-9]+)-Sh([0-9]+)$', got 'Pr1-Ep2-Seq3'"
        );
    }

    // -- HierarchyId ---------------------------------------------------------

    #[test]
    fn parse_picks_exactly_one_level() {
        assert_eq!(HierarchyId::parse("Pr5").unwrap().level(), Level::Project);
        assert_eq!(HierarchyId::parse("Pr5-Ep1").unwrap().level(), Level::Episode);
        assert_eq!(HierarchyId::parse("Pr5-Ep1-Seq9").unwrap().level(), Level::Sequence);
        assert_eq!(HierarchyId::parse("Pr5-Ep1-Seq9-Sh3").unwrap().level(), Level::Shot);
    }

    #[test]
    fn parse_failure_lists_every_pattern() {
        let err = HierarchyId::parse("Ep1").unwrap_err();
        assert_matches!(
            err,
            CoreError::Format { target: "HierarchyId", ref expected, ref input }
                if expected.split('|').count() == 4 && input == "Ep1"
        );
    }

    #[test]
    fn parse_rejects_gaps_and_garbage() {
        for s in ["Epx", "Seq1", "Sh1", "Ep1-Seq", "random", "", "Pr1-Seq2", "Pr1-Ep2-"] {
            assert!(HierarchyId::parse(s).is_err(), "{s}");
        }
    }

    #[test]
    fn hierarchy_parent_chain() {
        let id = HierarchyId::parse("Pr1-Ep2-Seq3-Sh4").unwrap();
        let parent = id.parent().unwrap();
        assert_eq!(parent.to_string(), "Pr1-Ep2-Seq3");
        assert!(HierarchyId::parse("Pr1").unwrap().parent().is_none());
        assert!(parent.is_ancestor_of(&id));
        assert!(HierarchyId::Project(id.project()).is_ancestor_of(&id));
        assert!(!id.is_ancestor_of(&parent));
    }

    #[test]
    fn ordering_puts_parents_before_children() {
        let mut ids: Vec<HierarchyId> =
            ["Pr0-Ep1", "Pr0-Ep0-Seq1", "Pr0", "Pr0-Ep0", "Pr0-Ep0-Seq0-Sh2"]
                .iter()
                .map(|s| HierarchyId::parse(s).unwrap())
                .collect();
        ids.sort();
        let rendered: Vec<String> = ids.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            ["Pr0", "Pr0-Ep0", "Pr0-Ep0-Seq0-Sh2", "Pr0-Ep0-Seq1", "Pr0-Ep1"]
        );
    }

    // -- field maps ----------------------------------------------------------

    #[test]
    fn field_map_encoding_is_flat() {
        let id = SequenceId::new(1, 2, 3);
        let fields = id.to_fields();
        assert_eq!(
            serde_json::Value::Object(fields.clone()),
            serde_json::json!({"project": 1, "episode": 2, "sequence": 3})
        );
        assert_eq!(SequenceId::from_fields(&fields).unwrap(), id);
    }

    #[test]
    fn field_map_rejects_extra_missing_and_negative() {
        let extra = serde_json::json!({"project": 1, "episode": 2});
        assert!(ProjectId::from_fields(extra.as_object().unwrap()).is_err());

        let missing = serde_json::json!({"project": 1});
        assert!(EpisodeId::from_fields(missing.as_object().unwrap()).is_err());

        let negative = serde_json::json!({"project": -1});
        assert_matches!(
            ProjectId::from_fields(negative.as_object().unwrap()),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn hierarchy_from_fields_picks_deepest_level() {
        let map = serde_json::json!({"project": 0, "episode": 1, "sequence": 0, "shot": 2});
        let id = HierarchyId::from_fields(map.as_object().unwrap()).unwrap();
        assert_eq!(id, HierarchyId::Shot(ShotId::new(0, 1, 0, 2)));

        let gap = serde_json::json!({"project": 0, "sequence": 1});
        assert!(HierarchyId::from_fields(gap.as_object().unwrap()).is_err());
    }

    // -- serde ---------------------------------------------------------------

    #[test]
    fn ids_serialize_as_canonical_strings() {
        let json = serde_json::to_value(ShotId::new(1, 2, 3, 4)).unwrap();
        assert_eq!(json, serde_json::json!("Pr1-Ep2-Seq3-Sh4"));

        let any: HierarchyId = serde_json::from_value(serde_json::json!("Pr1-Ep2")).unwrap();
        assert_eq!(any, HierarchyId::Episode(EpisodeId::new(1, 2)));
    }

    #[test]
    fn level_ids_deserialize_from_string_or_fields() {
        let from_str: EpisodeId = serde_json::from_value(serde_json::json!("Pr4-Ep5")).unwrap();
        let from_map: EpisodeId =
            serde_json::from_value(serde_json::json!({"project": 4, "episode": 5})).unwrap();
        assert_eq!(from_str, from_map);

        let wrong: Result<EpisodeId, _> = serde_json::from_value(serde_json::json!("Pr4"));
        assert!(wrong.is_err());
    }
}
