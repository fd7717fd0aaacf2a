//! Item record and item request shapes.
//!
//! # Responsibility
//! - Mirror one `items` row plus its optionally eager-loaded edges.
//! - Carry typed read/write requests from the application layer.
//!
//! # Invariants
//! - `group_id` is set on create and never changed by updates.
//! - Edge fields are `None` unless the query asked for them.
//! - `ItemQuery` with `page == -1 && page_size == -1` disables pagination.

use super::related::{
    AttachmentRecord, GroupId, GroupRecord, ItemFieldRecord, LabelId, LabelRecord, LocationId,
    LocationRecord,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for an inventory item.
pub type ItemId = Uuid;

/// Page sentinel that, on both `page` and `page_size`, disables pagination.
pub const PAGINATION_DISABLED: i64 = -1;

/// Relations of an item, each present only when eager-loaded.
///
/// `location` is also `None` when the item has no location.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemEdges {
    pub group: Option<GroupRecord>,
    pub location: Option<LocationRecord>,
    pub labels: Option<Vec<LabelRecord>>,
    pub attachments: Option<Vec<AttachmentRecord>>,
    pub fields: Option<Vec<ItemFieldRecord>>,
}

/// Persisted item row.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRecord {
    pub id: ItemId,
    pub group_id: GroupId,
    pub location_id: Option<LocationId>,
    pub import_ref: Option<String>,
    pub name: String,
    pub description: String,
    pub notes: String,
    pub quantity: i32,
    pub insured: bool,

    pub serial_number: String,
    pub model_number: String,
    pub manufacturer: String,

    pub lifetime_warranty: bool,
    pub warranty_expires: Option<i64>,
    pub warranty_details: String,

    pub purchase_time: Option<i64>,
    pub purchase_from: String,
    pub purchase_price: f64,

    pub sold_time: Option<i64>,
    pub sold_to: String,
    pub sold_price: f64,
    pub sold_notes: String,

    pub created_at: i64,
    pub updated_at: i64,

    pub edges: ItemEdges,
}

/// Listing request for items of one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemQuery {
    /// 1-based page number.
    pub page: i64,
    pub page_size: i64,
    /// Case-insensitive substring matched against name or description.
    pub search: String,
    /// Match items located in any of these locations.
    pub location_ids: Vec<LocationId>,
    /// Match items carrying any of these labels.
    pub label_ids: Vec<LabelId>,
    /// Accepted for forward compatibility; listings are always ordered by name.
    pub sort_by: String,
}

impl Default for ItemQuery {
    /// Unpaginated, unfiltered query.
    fn default() -> Self {
        Self {
            page: PAGINATION_DISABLED,
            page_size: PAGINATION_DISABLED,
            search: String::new(),
            location_ids: Vec::new(),
            label_ids: Vec::new(),
            sort_by: String::new(),
        }
    }
}

impl ItemQuery {
    /// Creates an unfiltered query for one page.
    pub fn page(page: i64, page_size: i64) -> Self {
        Self {
            page,
            page_size,
            ..Self::default()
        }
    }

    pub fn is_paginated(&self) -> bool {
        self.page != PAGINATION_DISABLED || self.page_size != PAGINATION_DISABLED
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemCreate {
    /// Correlates rows created by bulk import; never exposed on the wire.
    #[serde(skip)]
    pub import_ref: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,

    pub location_id: LocationId,
    #[serde(default)]
    pub label_ids: Vec<LabelId>,
}

/// Full-replace update of one item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemUpdate {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub quantity: i32,
    pub insured: bool,

    pub location_id: LocationId,
    /// Desired label set after the update.
    pub label_ids: Vec<LabelId>,

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
}

#[cfg(test)]
mod tests {
    use super::{ItemQuery, ItemUpdate};

    #[test]
    fn default_query_is_unpaginated() {
        assert!(!ItemQuery::default().is_paginated());
        assert!(ItemQuery::page(1, 10).is_paginated());
        assert!(ItemQuery::page(-1, 25).is_paginated());
    }

    #[test]
    fn query_deserializes_from_partial_camel_case_json() {
        let query: ItemQuery =
            serde_json::from_str(r#"{"search":"drill","labelIds":[]}"#).unwrap();
        assert_eq!(query.search, "drill");
        assert!(!query.is_paginated());
    }

    #[test]
    fn update_accepts_string_prices() {
        let update: ItemUpdate = serde_json::from_str(
            r#"{"name":"Drill","purchasePrice":"129.99","soldPrice":0,"quantity":2}"#,
        )
        .unwrap();
        assert_eq!(update.name, "Drill");
        assert_eq!(update.quantity, 2);
        assert_eq!(update.purchase_price, 129.99);
        assert_eq!(update.sold_price, 0.0);
    }
}
