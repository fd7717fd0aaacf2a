//! Records for entities referenced by items.
//!
//! These are read-only from the item repository's point of view: groups,
//! locations, labels, documents and attachments are managed elsewhere and
//! only eager-loaded here.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type GroupId = Uuid;
pub type LocationId = Uuid;
pub type LabelId = Uuid;
pub type AttachmentId = Uuid;
pub type DocumentId = Uuid;

/// Tenant/ownership boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRecord {
    pub id: GroupId,
    pub name: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationRecord {
    pub id: LocationId,
    pub name: String,
    pub description: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRecord {
    pub id: LabelId,
    pub name: String,
    pub description: String,
    pub color: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRecord {
    pub id: DocumentId,
    pub title: String,
    pub path: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Purpose of a file attached to an item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentType {
    Photo,
    Manual,
    Warranty,
    #[default]
    Attachment,
    Receipt,
}

impl AttachmentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Manual => "manual",
            Self::Warranty => "warranty",
            Self::Attachment => "attachment",
            Self::Receipt => "receipt",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "photo" => Some(Self::Photo),
            "manual" => Some(Self::Manual),
            "warranty" => Some(Self::Warranty),
            "attachment" => Some(Self::Attachment),
            "receipt" => Some(Self::Receipt),
            _ => None,
        }
    }
}

/// Attachment row with its document edge.
///
/// `document` is `None` when the attachment points at no document row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRecord {
    pub id: AttachmentId,
    pub kind: AttachmentType,
    pub created_at: i64,
    pub updated_at: i64,
    pub document: Option<DocumentRecord>,
}

/// Value kind of a custom item field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemFieldType {
    Text,
    Number,
    Boolean,
    Time,
}

impl ItemFieldType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "text" => Some(Self::Text),
            "number" => Some(Self::Number),
            "boolean" => Some(Self::Boolean),
            "time" => Some(Self::Time),
            _ => None,
        }
    }
}

/// Custom user-defined field on an item.
///
/// Loaded with item details but not yet projected into output views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFieldRecord {
    pub id: Uuid,
    pub kind: ItemFieldType,
    pub name: String,
    pub description: String,
    pub text_value: String,
    pub number_value: i64,
    pub boolean_value: bool,
    pub time_value: Option<i64>,
}
