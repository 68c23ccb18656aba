/// Shared data structures for the board
///
/// These structs represent the data model that flows between
/// the storage layer and the containers.

use serde::{Deserialize, Serialize};

/// One image entry in a container.
///
/// The encoded image payload is immutable after creation; `link_url` and
/// `notes` are edited in place. The JSON field names match the persisted
/// layout (`imageData`, `linkUrl`, `notes`).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Unique within the owning container for the item's lifetime
    pub id: i64,
    /// Self-describing encoded image (data URI)
    pub image_data: String,
    /// Optional navigation target; absent or empty means no action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,
    /// Optional annotation; absent or empty means none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Item {
    /// Create a freshly ingested item with no link or notes yet
    pub fn new(id: i64, image_data: String) -> Self {
        Item {
            id,
            image_data,
            link_url: None,
            notes: None,
        }
    }
}

/// The editable fields of an item (the image payload is not one of them)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemField {
    LinkUrl,
    Notes,
}

/// Presentation metadata for a tier. The color and name double as the
/// tier's storage identity (see `ContainerKey::Tier`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tier {
    pub color: String,
    pub name: String,
}

/// Generate ids for one ingestion batch: a shared millisecond timestamp
/// plus each entry's offset within the batch. Entries ingested in the same
/// event get distinct ids no matter which decode finishes first.
pub fn batch_id(batch_stamp: i64, offset: usize) -> i64 {
    batch_stamp + offset as i64
}

/// The shared timestamp for a new ingestion batch
pub fn batch_stamp() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_field_names() {
        let item = Item {
            id: 42,
            image_data: "data:image/jpeg;base64,AA==".to_string(),
            link_url: Some("https://example.com".to_string()),
            notes: None,
        };

        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"imageData\""));
        assert!(json.contains("\"linkUrl\""));
        // Absent optionals are omitted entirely
        assert!(!json.contains("\"notes\""));

        let restored: Item = serde_json::from_str(&json).unwrap();
        assert_eq!(item, restored);
    }

    #[test]
    fn test_missing_optionals_deserialize_as_none() {
        let json = r#"{"id":1,"imageData":"data:image/jpeg;base64,AA=="}"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.link_url, None);
        assert_eq!(item.notes, None);
    }

    #[test]
    fn test_batch_ids_are_distinct() {
        let stamp = batch_stamp();
        let ids: Vec<i64> = (0..8).map(|i| batch_id(stamp, i)).collect();
        for (i, a) in ids.iter().enumerate() {
            for b in ids.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
