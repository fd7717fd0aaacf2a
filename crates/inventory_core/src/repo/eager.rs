//! Batched eager loading of item relations.
//!
//! # Responsibility
//! - Populate `ItemEdges` for a page of items with one query per relation
//!   (per chunk of ids) instead of one query per item.
//!
//! # Invariants
//! - A requested edge is always `Some` afterwards; an item without related
//!   rows gets an empty vector.
//! - `edges.location` stays `None` for items without a location.
//! - Labels are ordered by name, attachments by creation time, fields by name.

use super::context::QueryContext;
use super::item_repo::{RepoError, RepoResult};
use super::predicate::placeholders;
use super::row::{bool_column, optional_uuid_column, uuid_column};
use crate::model::item::{ItemId, ItemRecord};
use crate::model::related::{
    AttachmentRecord, AttachmentType, DocumentRecord, GroupRecord, ItemFieldRecord,
    ItemFieldType, LabelRecord, LocationRecord,
};
use rusqlite::{params_from_iter, Connection, Row};
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

/// Upper bound of ids bound into one `IN (...)` list.
const ID_CHUNK_SIZE: usize = 500;

/// Which relations to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EdgeLoad {
    pub group: bool,
    pub location: bool,
    pub labels: bool,
    pub attachments: bool,
    pub fields: bool,
}

impl EdgeLoad {
    /// Relations shown in listings.
    pub const SUMMARY: Self = Self {
        group: false,
        location: true,
        labels: true,
        attachments: false,
        fields: false,
    };

    /// Every relation of an item.
    pub const DETAIL: Self = Self {
        group: true,
        location: true,
        labels: true,
        attachments: true,
        fields: true,
    };
}

pub(crate) fn load_edges(
    conn: &Connection,
    ctx: &QueryContext,
    items: &mut [ItemRecord],
    load: EdgeLoad,
) -> RepoResult<()> {
    if items.is_empty() {
        return Ok(());
    }

    let item_ids = items.iter().map(|item| item.id).collect::<Vec<_>>();

    if load.group {
        let group_ids = distinct(items.iter().map(|item| item.group_id));
        let groups = load_groups(conn, ctx, &group_ids)?;
        for item in items.iter_mut() {
            item.edges.group = groups.get(&item.group_id).cloned();
        }
    }

    if load.location {
        let location_ids = distinct(items.iter().filter_map(|item| item.location_id));
        let locations = load_locations(conn, ctx, &location_ids)?;
        for item in items.iter_mut() {
            item.edges.location = item
                .location_id
                .and_then(|location_id| locations.get(&location_id).cloned());
        }
    }

    if load.labels {
        let mut labels = load_labels(conn, ctx, &item_ids)?;
        for item in items.iter_mut() {
            item.edges.labels = Some(labels.remove(&item.id).unwrap_or_default());
        }
    }

    if load.attachments {
        let mut attachments = load_attachments(conn, ctx, &item_ids)?;
        for item in items.iter_mut() {
            item.edges.attachments = Some(attachments.remove(&item.id).unwrap_or_default());
        }
    }

    if load.fields {
        let mut fields = load_fields(conn, ctx, &item_ids)?;
        for item in items.iter_mut() {
            item.edges.fields = Some(fields.remove(&item.id).unwrap_or_default());
        }
    }

    Ok(())
}

fn distinct(ids: impl Iterator<Item = Uuid>) -> Vec<Uuid> {
    ids.collect::<BTreeSet<_>>().into_iter().collect()
}

/// Runs `build_sql(placeholders)` once per chunk of `ids` and decodes every row.
fn query_by_ids<T>(
    conn: &Connection,
    ctx: &QueryContext,
    ids: &[Uuid],
    build_sql: impl Fn(&str) -> String,
    mut decode: impl FnMut(&Row<'_>) -> RepoResult<T>,
) -> RepoResult<Vec<T>> {
    let mut decoded = Vec::new();
    for chunk in ids.chunks(ID_CHUNK_SIZE) {
        ctx.check()?;
        let sql = build_sql(&placeholders(chunk.len()));
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(chunk.iter().map(Uuid::to_string)))?;
        while let Some(row) = rows.next()? {
            decoded.push(decode(row)?);
        }
    }
    Ok(decoded)
}

fn load_groups(
    conn: &Connection,
    ctx: &QueryContext,
    group_ids: &[Uuid],
) -> RepoResult<HashMap<Uuid, GroupRecord>> {
    let groups = query_by_ids(
        conn,
        ctx,
        group_ids,
        |marks| {
            format!(
                "SELECT id, name, created_at, updated_at
                 FROM groups
                 WHERE id IN ({marks});"
            )
        },
        |row| {
            Ok(GroupRecord {
                id: uuid_column(row, "id")?,
                name: row.get("name")?,
                created_at: row.get("created_at")?,
                updated_at: row.get("updated_at")?,
            })
        },
    )?;

    Ok(groups.into_iter().map(|group| (group.id, group)).collect())
}

fn load_locations(
    conn: &Connection,
    ctx: &QueryContext,
    location_ids: &[Uuid],
) -> RepoResult<HashMap<Uuid, LocationRecord>> {
    let locations = query_by_ids(
        conn,
        ctx,
        location_ids,
        |marks| {
            format!(
                "SELECT id, name, description, created_at, updated_at
                 FROM locations
                 WHERE id IN ({marks});"
            )
        },
        |row| {
            Ok(LocationRecord {
                id: uuid_column(row, "id")?,
                name: row.get("name")?,
                description: row.get("description")?,
                created_at: row.get("created_at")?,
                updated_at: row.get("updated_at")?,
            })
        },
    )?;

    Ok(locations
        .into_iter()
        .map(|location| (location.id, location))
        .collect())
}

fn load_labels(
    conn: &Connection,
    ctx: &QueryContext,
    item_ids: &[ItemId],
) -> RepoResult<HashMap<ItemId, Vec<LabelRecord>>> {
    let rows = query_by_ids(
        conn,
        ctx,
        item_ids,
        |marks| {
            format!(
                "SELECT
                    li.item_id,
                    l.id,
                    l.name,
                    l.description,
                    l.color,
                    l.created_at,
                    l.updated_at
                 FROM label_items li
                 INNER JOIN labels l ON l.id = li.label_id
                 WHERE li.item_id IN ({marks})
                 ORDER BY l.name ASC, l.id ASC;"
            )
        },
        |row| {
            let label = LabelRecord {
                id: uuid_column(row, "id")?,
                name: row.get("name")?,
                description: row.get("description")?,
                color: row.get("color")?,
                created_at: row.get("created_at")?,
                updated_at: row.get("updated_at")?,
            };
            Ok((uuid_column(row, "item_id")?, label))
        },
    )?;

    Ok(group_by_item(rows))
}

fn load_attachments(
    conn: &Connection,
    ctx: &QueryContext,
    item_ids: &[ItemId],
) -> RepoResult<HashMap<ItemId, Vec<AttachmentRecord>>> {
    let rows = query_by_ids(
        conn,
        ctx,
        item_ids,
        |marks| {
            format!(
                "SELECT
                    a.item_id,
                    a.id,
                    a.type,
                    a.created_at,
                    a.updated_at,
                    d.id AS document_id,
                    d.title AS document_title,
                    d.path AS document_path,
                    d.created_at AS document_created_at,
                    d.updated_at AS document_updated_at
                 FROM attachments a
                 LEFT JOIN documents d ON d.id = a.document_id
                 WHERE a.item_id IN ({marks})
                 ORDER BY a.created_at ASC, a.id ASC;"
            )
        },
        |row| {
            let kind_text: String = row.get("type")?;
            let kind = AttachmentType::parse(&kind_text).ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "invalid attachment type `{kind_text}` in attachments.type"
                ))
            })?;

            let document = match optional_uuid_column(row, "document_id")? {
                Some(document_id) => Some(DocumentRecord {
                    id: document_id,
                    title: row.get("document_title")?,
                    path: row.get("document_path")?,
                    created_at: row.get("document_created_at")?,
                    updated_at: row.get("document_updated_at")?,
                }),
                None => None,
            };

            let attachment = AttachmentRecord {
                id: uuid_column(row, "id")?,
                kind,
                created_at: row.get("created_at")?,
                updated_at: row.get("updated_at")?,
                document,
            };
            Ok((uuid_column(row, "item_id")?, attachment))
        },
    )?;

    Ok(group_by_item(rows))
}

fn load_fields(
    conn: &Connection,
    ctx: &QueryContext,
    item_ids: &[ItemId],
) -> RepoResult<HashMap<ItemId, Vec<ItemFieldRecord>>> {
    let rows = query_by_ids(
        conn,
        ctx,
        item_ids,
        |marks| {
            format!(
                "SELECT
                    item_id,
                    id,
                    type,
                    name,
                    description,
                    text_value,
                    number_value,
                    boolean_value,
                    time_value
                 FROM item_fields
                 WHERE item_id IN ({marks})
                 ORDER BY name ASC, id ASC;"
            )
        },
        |row| {
            let kind_text: String = row.get("type")?;
            let kind = ItemFieldType::parse(&kind_text).ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "invalid field type `{kind_text}` in item_fields.type"
                ))
            })?;

            let field = ItemFieldRecord {
                id: uuid_column(row, "id")?,
                kind,
                name: row.get("name")?,
                description: row.get("description")?,
                text_value: row.get("text_value")?,
                number_value: row.get("number_value")?,
                boolean_value: bool_column(row, "boolean_value")?,
                time_value: row.get("time_value")?,
            };
            Ok((uuid_column(row, "item_id")?, field))
        },
    )?;

    Ok(group_by_item(rows))
}

fn group_by_item<T>(rows: Vec<(ItemId, T)>) -> HashMap<ItemId, Vec<T>> {
    let mut grouped: HashMap<ItemId, Vec<T>> = HashMap::new();
    for (item_id, value) in rows {
        grouped.entry(item_id).or_default().push(value);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::{distinct, group_by_item};
    use uuid::Uuid;

    #[test]
    fn group_by_item_keeps_row_order_per_item() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        let grouped = group_by_item(vec![(first, "a"), (second, "x"), (first, "b")]);

        assert_eq!(grouped[&first], vec!["a", "b"]);
        assert_eq!(grouped[&second], vec!["x"]);
    }

    #[test]
    fn distinct_drops_repeated_ids() {
        let id = Uuid::new_v4();
        assert_eq!(distinct([id, id, id].into_iter()), vec![id]);
    }
}
