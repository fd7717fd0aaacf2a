//! Output views returned to callers.
//!
//! `ItemSummary` is the lightweight listing shape; `ItemOut` embeds it and
//! adds the detail fields. Sub-objects default to zero/empty values.

use super::item::ItemId;
use super::related::{AttachmentId, AttachmentType, DocumentId, LabelId, LocationId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSummary {
    pub id: LocationId,
    pub name: String,
    pub description: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSummary {
    pub id: LabelId,
    pub name: String,
    pub description: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentOut {
    pub id: DocumentId,
    pub title: String,
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemAttachment {
    pub id: AttachmentId,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(rename = "type")]
    pub kind: AttachmentType,
    pub document: DocumentOut,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSummary {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub quantity: i32,
    pub insured: bool,
    pub created_at: i64,
    pub updated_at: i64,

    pub location: LocationSummary,
    pub labels: Vec<LabelSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemOut {
    #[serde(flatten)]
    pub summary: ItemSummary,

    pub serial_number: String,
    pub model_number: String,
    pub manufacturer: String,

    pub lifetime_warranty: bool,
    pub warranty_expires: Option<i64>,
    pub warranty_details: String,

    pub purchase_time: Option<i64>,
    pub purchase_from: String,
    #[serde(with = "super::price")]
    pub purchase_price: f64,

    pub sold_time: Option<i64>,
    pub sold_to: String,
    #[serde(with = "super::price")]
    pub sold_price: f64,
    pub sold_notes: String,

    pub notes: String,

    pub attachments: Vec<ItemAttachment>,
}
