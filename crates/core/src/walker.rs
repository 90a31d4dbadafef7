//! Hierarchy assignment for raw, id-less scenario trees.
//!
//! Generated scenarios arrive as nested JSON without `id` or `hierarchy_id`.
//! [`assign_hierarchy`] walks the tree, tracking the path from the root, and
//! fills both fields on every node. [`build_project`] then validates the result
//! into a [`ProjectEntity`].

use serde_json::Value;
use uuid::Uuid;

use crate::entity::ProjectEntity;
use crate::error::CoreError;
use crate::hierarchy::{HierarchyId, Level, ProjectId};
use crate::types::{EntityId, Index};

/// Child collection keys in the order they are looked up on a node.
pub const CHILD_KEYS: [&str; 3] = ["episodes", "sequences", "shots"];

// ---------------------------------------------------------------------------
// Id generation
// ---------------------------------------------------------------------------

/// Source of fresh entity ids.
pub trait IdGenerator {
    fn next_id(&mut self) -> EntityId;
}

/// Random v4 UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&mut self) -> EntityId {
        Uuid::new_v4()
    }
}

/// Deterministic ids counting up from a seed: `from_u128(seed)`,
/// `from_u128(seed + 1)`, ...
#[derive(Debug, Default, Clone)]
pub struct SequentialIds {
    next: u128,
}

impl SequentialIds {
    pub fn new(seed: u128) -> Self {
        Self { next: seed }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> EntityId {
        let id = Uuid::from_u128(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

impl<F> IdGenerator for F
where
    F: FnMut() -> EntityId,
{
    fn next_id(&mut self) -> EntityId {
        self()
    }
}

// ---------------------------------------------------------------------------
// Walker
// ---------------------------------------------------------------------------

/// Assign `id` and `hierarchy_id` to every node of `node`, in place.
///
/// `hierarchy_id` is written as the flat field map of the node's path,
/// e.g. `{"project": 0, "episode": 1}`. Children of the collection one level
/// below the node are visited with their zero-based index appended to the
/// path. A non-empty collection of any other level is rejected; empty ones
/// are removed.
pub fn assign_hierarchy<G>(
    node: &mut Value,
    root: ProjectId,
    ids: &mut G,
) -> Result<(), CoreError>
where
    G: IdGenerator + ?Sized,
{
    assign(node, HierarchyId::Project(root), ids)
}

/// Collection key of the level directly below `path`.
fn child_key(path: &HierarchyId) -> Option<&'static str> {
    path.level().child().and_then(Level::collection_key)
}

fn child_path(path: &HierarchyId, key: &str, index: usize) -> Result<HierarchyId, CoreError> {
    Index::try_from(index)
        .ok()
        .and_then(|index| path.child(index))
        .ok_or_else(|| {
            CoreError::structural(path.to_string(), format!("'{key}' index {index} out of range"))
        })
}

fn assign<G>(node: &mut Value, path: HierarchyId, ids: &mut G) -> Result<(), CoreError>
where
    G: IdGenerator + ?Sized,
{
    let object = node
        .as_object_mut()
        .ok_or_else(|| CoreError::structural(path.to_string(), "node must be a JSON object"))?;

    let populated: Vec<&str> = CHILD_KEYS
        .into_iter()
        .filter(|key| matches!(object.get(*key), Some(Value::Array(items)) if !items.is_empty()))
        .collect();
    if populated.len() > 1 {
        return Err(CoreError::structural(
            path.to_string(),
            format!("node has more than one child collection: {}", populated.join(", ")),
        ));
    }

    let expected = child_key(&path);
    if let Some(key) = populated.first().filter(|key| Some(**key) != expected) {
        return Err(CoreError::structural(
            path.to_string(),
            format!("'{key}' cannot appear under a {} node", path.level()),
        ));
    }
    object.retain(|key, value| {
        Some(key.as_str()) == expected
            || !CHILD_KEYS.contains(&key.as_str())
            || !matches!(value, Value::Array(items) if items.is_empty())
    });

    object.insert("id".to_string(), Value::String(ids.next_id().to_string()));
    object.insert("hierarchy_id".to_string(), Value::Object(path.to_fields()));

    let Some(key) = expected else {
        return Ok(());
    };
    if let Some(Value::Array(children)) = object.get_mut(key) {
        for (index, child) in children.iter_mut().enumerate() {
            assign(child, child_path(&path, key, index)?, ids)?;
        }
    }
    Ok(())
}

/// Fields every node of `level` carries besides `id`, `hierarchy_id` and its
/// child collection.
fn content_fields(level: Level) -> &'static [&'static str] {
    match level {
        Level::Shot => &["title", "style", "text"],
        _ => &["title", "style"],
    }
}

/// Check the content of a walked node and its subtree, reporting the path of
/// the first node that would not deserialize.
fn check_content(node: &Value, path: HierarchyId) -> Result<(), CoreError> {
    let object = node
        .as_object()
        .ok_or_else(|| CoreError::structural(path.to_string(), "node must be a JSON object"))?;
    let level = path.level();
    let expected = child_key(&path);

    for field in content_fields(level) {
        match object.get(*field) {
            Some(Value::String(_)) => {}
            Some(_) => {
                return Err(CoreError::structural(
                    path.to_string(),
                    format!("'{field}' must be a string"),
                ))
            }
            None => {
                return Err(CoreError::structural(
                    path.to_string(),
                    format!("missing field '{field}'"),
                ))
            }
        }
    }

    let known = |key: &str| {
        key == "id"
            || key == "hierarchy_id"
            || Some(key) == expected
            || content_fields(level).contains(&key)
    };
    if let Some(unknown) = object.keys().find(|key| !known(key.as_str())) {
        return Err(CoreError::structural(
            path.to_string(),
            format!("unknown field '{unknown}' on a {level} node"),
        ));
    }

    let Some(key) = expected else {
        return Ok(());
    };
    let children = match object.get(key) {
        Some(Value::Array(children)) => children,
        Some(_) => {
            return Err(CoreError::structural(path.to_string(), format!("'{key}' must be a list")))
        }
        None => {
            return Err(CoreError::structural(path.to_string(), format!("missing field '{key}'")))
        }
    };
    for (index, child) in children.iter().enumerate() {
        check_content(child, child_path(&path, key, index)?)?;
    }
    Ok(())
}

/// Walk `raw`, then validate it into a consistent [`ProjectEntity`].
///
/// Missing or malformed content fields (`title`, `style`, `text`, child
/// collections) and unknown fields are reported as [`CoreError::Structural`]
/// at the path of the offending node.
pub fn build_project<G>(
    mut raw: Value,
    root: ProjectId,
    ids: &mut G,
) -> Result<ProjectEntity, CoreError>
where
    G: IdGenerator + ?Sized,
{
    assign_hierarchy(&mut raw, root, ids)?;
    check_content(&raw, HierarchyId::Project(root))?;
    let project: ProjectEntity = serde_json::from_value(raw)
        .map_err(|e| CoreError::structural(root.to_string(), e.to_string()))?;
    project.validate_consistency()?;
    Ok(project)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
