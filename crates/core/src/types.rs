/// Every storyboard entity is identified by a UUID in addition to its
/// hierarchy id.
pub type EntityId = uuid::Uuid;

/// A single numeric component of a hierarchy id (`project`, `episode`, ...).
pub type Index = u32;

/// Flat JSON field map, the structured encoding of a hierarchy id.
pub type FieldMap = serde_json::Map<String, serde_json::Value>;
