#![allow(dead_code)]

use inventory_core::model::related::{AttachmentType, GroupId, LabelId, LocationId};
use inventory_core::{ItemCreate, ItemOut, ItemRepository, QueryContext, SqliteItemRepository};
use rusqlite::{params, Connection};
use uuid::Uuid;

pub fn seed_group(conn: &Connection, name: &str) -> GroupId {
    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO groups (id, name) VALUES (?1, ?2);",
        params![id.to_string(), name],
    )
    .unwrap();
    id
}

pub fn seed_location(conn: &Connection, group_id: GroupId, name: &str) -> LocationId {
    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO locations (id, group_id, name) VALUES (?1, ?2, ?3);",
        params![id.to_string(), group_id.to_string(), name],
    )
    .unwrap();
    id
}

pub fn seed_label(conn: &Connection, group_id: GroupId, name: &str) -> LabelId {
    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO labels (id, group_id, name) VALUES (?1, ?2, ?3);",
        params![id.to_string(), group_id.to_string(), name],
    )
    .unwrap();
    id
}

/// Inserts a document and attaches it to `item_id`; returns the attachment id.
pub fn seed_attachment(
    conn: &Connection,
    group_id: GroupId,
    item_id: Uuid,
    kind: AttachmentType,
    title: &str,
) -> Uuid {
    let document_id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO documents (id, group_id, title, path) VALUES (?1, ?2, ?3, ?4);",
        params![
            document_id.to_string(),
            group_id.to_string(),
            title,
            format!("/documents/{title}")
        ],
    )
    .unwrap();

    let attachment_id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO attachments (id, item_id, document_id, type) VALUES (?1, ?2, ?3, ?4);",
        params![
            attachment_id.to_string(),
            item_id.to_string(),
            document_id.to_string(),
            kind.as_str()
        ],
    )
    .unwrap();
    attachment_id
}

pub fn seed_text_field(conn: &Connection, item_id: Uuid, name: &str, value: &str) -> Uuid {
    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO item_fields (id, item_id, type, name, text_value)
         VALUES (?1, ?2, 'text', ?3, ?4);",
        params![id.to_string(), item_id.to_string(), name, value],
    )
    .unwrap();
    id
}

pub fn create_item(
    repo: &SqliteItemRepository<'_>,
    group_id: GroupId,
    name: &str,
    description: &str,
    location_id: LocationId,
    label_ids: &[LabelId],
) -> ItemOut {
    repo.create(
        &QueryContext::new(),
        group_id,
        &ItemCreate {
            import_ref: None,
            name: name.to_string(),
            description: description.to_string(),
            location_id,
            label_ids: label_ids.to_vec(),
        },
    )
    .unwrap()
}

pub fn label_link_count(conn: &Connection, item_id: Uuid) -> i64 {
    conn.query_row(
        "SELECT COUNT(*) FROM label_items WHERE item_id = ?1;",
        [item_id.to_string()],
        |row| row.get(0),
    )
    .unwrap()
}
