//! Pure record-to-view mappers.
//!
//! Absent edges are an expected state: an unloaded location maps to
//! `LocationSummary::default()`, unloaded labels and attachments map to empty
//! vectors. Nothing here can fail.

use super::item::ItemRecord;
use super::related::{AttachmentRecord, DocumentRecord, LabelRecord, LocationRecord};
use super::view::{
    DocumentOut, ItemAttachment, ItemOut, ItemSummary, LabelSummary, LocationSummary,
};

pub fn map_location_summary(location: &LocationRecord) -> LocationSummary {
    LocationSummary {
        id: location.id,
        name: location.name.clone(),
        description: location.description.clone(),
        created_at: location.created_at,
        updated_at: location.updated_at,
    }
}

pub fn map_label_summary(label: &LabelRecord) -> LabelSummary {
    LabelSummary {
        id: label.id,
        name: label.name.clone(),
        description: label.description.clone(),
        created_at: label.created_at,
        updated_at: label.updated_at,
    }
}

fn map_document(document: &DocumentRecord) -> DocumentOut {
    DocumentOut {
        id: document.id,
        title: document.title.clone(),
        path: document.path.clone(),
    }
}

pub fn map_item_attachment(attachment: &AttachmentRecord) -> ItemAttachment {
    ItemAttachment {
        id: attachment.id,
        created_at: attachment.created_at,
        updated_at: attachment.updated_at,
        kind: attachment.kind,
        document: attachment
            .document
            .as_ref()
            .map(map_document)
            .unwrap_or_default(),
    }
}

pub fn map_item_summary(item: &ItemRecord) -> ItemSummary {
    let location = match &item.edges.location {
        Some(location) => map_location_summary(location),
        None => LocationSummary::default(),
    };

    let labels = match &item.edges.labels {
        Some(labels) => labels.iter().map(map_label_summary).collect(),
        None => Vec::new(),
    };

    ItemSummary {
        id: item.id,
        name: item.name.clone(),
        description: item.description.clone(),
        quantity: item.quantity,
        insured: item.insured,
        created_at: item.created_at,
        updated_at: item.updated_at,
        location,
        labels,
    }
}

pub fn map_item_out(item: &ItemRecord) -> ItemOut {
    let attachments = match &item.edges.attachments {
        Some(attachments) => attachments.iter().map(map_item_attachment).collect(),
        None => Vec::new(),
    };

    ItemOut {
        summary: map_item_summary(item),

        serial_number: item.serial_number.clone(),
        model_number: item.model_number.clone(),
        manufacturer: item.manufacturer.clone(),

        lifetime_warranty: item.lifetime_warranty,
        warranty_expires: item.warranty_expires,
        warranty_details: item.warranty_details.clone(),

        purchase_time: item.purchase_time,
        purchase_from: item.purchase_from.clone(),
        purchase_price: item.purchase_price,

        sold_time: item.sold_time,
        sold_to: item.sold_to.clone(),
        sold_price: item.sold_price,
        sold_notes: item.sold_notes.clone(),

        notes: item.notes.clone(),
        attachments,
    }
}
