//! Item repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide group-scoped read, list, create, update and delete of items.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Every `*_by_group` operation filters through `group_scoped`, so an item
//!   of another group is indistinguishable from a missing one.
//! - Multi-statement writes run in one transaction; a failure or
//!   cancellation leaves no partial change behind.
//! - Read paths reject undecodable persisted rows with `InvalidData`.

use super::context::QueryContext;
use super::eager::{load_edges, EdgeLoad};
use super::id_set::{reconcile_labels, LabelDiff};
use super::pagination::{calculate_offset, PaginationResult};
use super::predicate::{
    compile_predicates, group_scoped, item_query_predicates, ItemPredicate, SqlFilter,
};
use super::row::{bool_column, bool_to_int, optional_uuid_column, uuid_column};
use crate::db::DbError;
use crate::model::item::{ItemCreate, ItemId, ItemQuery, ItemRecord, ItemUpdate};
use crate::model::mapper::{map_item_out, map_item_summary};
use crate::model::related::{GroupId, LabelId};
use crate::model::view::{ItemOut, ItemSummary};
use log::{debug, log, Level};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, Row};
use std::time::Instant;
use thiserror::Error;
use uuid::Uuid;

const ITEM_SELECT_SQL: &str = "SELECT
    items.id,
    items.group_id,
    items.location_id,
    items.import_ref,
    items.name,
    items.description,
    items.notes,
    items.quantity,
    items.insured,
    items.serial_number,
    items.model_number,
    items.manufacturer,
    items.lifetime_warranty,
    items.warranty_expires,
    items.warranty_details,
    items.purchase_time,
    items.purchase_from,
    items.purchase_price,
    items.sold_time,
    items.sold_to,
    items.sold_price,
    items.sold_notes,
    items.created_at,
    items.updated_at
FROM items";

const ITEM_ORDER_SQL: &str = "ORDER BY items.name ASC, items.id ASC";

/// Current time in epoch milliseconds, evaluated by SQLite.
const NOW_MS_SQL: &str = "CAST((julianday('now') - 2440587.5) * 86400000 AS INTEGER)";

const REQUIRED_TABLES: [&str; 8] = [
    "groups",
    "locations",
    "labels",
    "items",
    "label_items",
    "documents",
    "attachments",
    "item_fields",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Error returned by every item repository operation.
#[derive(Debug, Error)]
pub enum RepoError {
    /// No item matched the id (and group, for scoped operations).
    #[error("item not found: {0}")]
    NotFound(ItemId),
    /// The query context was cancelled or its deadline passed.
    #[error("operation cancelled")]
    Cancelled,
    #[error(transparent)]
    Db(DbError),
    #[error("invalid persisted item data: {0}")]
    InvalidData(String),
    #[error("required table `{0}` is missing; run migrations first")]
    MissingRequiredTable(&'static str),
}

impl RepoError {
    /// Stable machine-readable code, used as `error_code` in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Cancelled => "cancelled",
            Self::Db(_) => "db_error",
            Self::InvalidData(_) => "invalid_data",
            Self::MissingRequiredTable(_) => "missing_table",
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Sqlite(err) => Self::from(err),
            other => Self::Db(other),
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        if value.sqlite_error_code() == Some(ErrorCode::OperationInterrupted) {
            return Self::Cancelled;
        }
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for item use-cases.
///
/// Every method checks `ctx` before each database round trip and aborts a
/// running statement once `ctx` is done.
pub trait ItemRepository {
    /// Gets one item with all relations, regardless of group.
    fn get_one(&self, ctx: &QueryContext, id: ItemId) -> RepoResult<ItemOut>;
    /// Gets one item with all relations if it belongs to `group_id`.
    fn get_one_by_group(
        &self,
        ctx: &QueryContext,
        group_id: GroupId,
        id: ItemId,
    ) -> RepoResult<ItemOut>;
    /// Lists filtered item summaries of one group, optionally paginated.
    fn query_by_group(
        &self,
        ctx: &QueryContext,
        group_id: GroupId,
        query: &ItemQuery,
    ) -> RepoResult<PaginationResult<ItemSummary>>;
    /// Lists every item summary of one group.
    fn get_all(&self, ctx: &QueryContext, group_id: GroupId) -> RepoResult<Vec<ItemSummary>>;
    /// Creates an item under `group_id` and returns its fresh detail view.
    fn create(
        &self,
        ctx: &QueryContext,
        group_id: GroupId,
        data: &ItemCreate,
    ) -> RepoResult<ItemOut>;
    /// Deletes an item regardless of group.
    fn delete(&self, ctx: &QueryContext, id: ItemId) -> RepoResult<()>;
    /// Deletes an item if it belongs to `group_id`; returns rows affected.
    fn delete_by_group(
        &self,
        ctx: &QueryContext,
        group_id: GroupId,
        id: ItemId,
    ) -> RepoResult<usize>;
    /// Replaces all mutable fields and the label set of a group's item.
    fn update_by_group(
        &self,
        ctx: &QueryContext,
        group_id: GroupId,
        data: &ItemUpdate,
    ) -> RepoResult<ItemOut>;
}

/// SQLite-backed item repository.
pub struct SqliteItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteItemRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `MissingRequiredTable` when the schema has not been applied.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        for table in REQUIRED_TABLES {
            if !table_exists(conn, table)? {
                return Err(RepoError::MissingRequiredTable(table));
            }
        }
        Ok(Self { conn })
    }

    /// Installs the interrupt guard, runs `op` and logs its outcome.
    fn observed<T>(
        &self,
        ctx: &QueryContext,
        event: &'static str,
        op: impl FnOnce() -> RepoResult<T>,
    ) -> RepoResult<T> {
        let started_at = Instant::now();
        let result = match ctx.interrupt_guard(self.conn) {
            Ok(_guard) => op(),
            Err(err) => Err(err),
        };
        log_outcome(event, started_at, &result);
        result
    }

    fn fetch_items(
        &self,
        ctx: &QueryContext,
        filter: &SqlFilter,
        window: Option<PageWindow>,
    ) -> RepoResult<Vec<ItemRecord>> {
        let mut sql = format!("{ITEM_SELECT_SQL} WHERE {} {ITEM_ORDER_SQL}", filter.clause);
        let mut bind_values = filter.binds.clone();
        if let Some(window) = window {
            sql.push_str(" LIMIT ? OFFSET ?");
            bind_values.push(Value::Integer(window.limit));
            bind_values.push(Value::Integer(window.offset));
        }

        ctx.check()?;
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }
        Ok(items)
    }

    fn count_items(&self, ctx: &QueryContext, filter: &SqlFilter) -> RepoResult<i64> {
        ctx.check()?;
        let total = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM items WHERE {};", filter.clause),
            params_from_iter(filter.binds.iter()),
            |row| row.get(0),
        )?;
        Ok(total)
    }

    /// Loads the single item matching `predicates` with every relation.
    fn find_detail(
        &self,
        ctx: &QueryContext,
        id: ItemId,
        predicates: &[ItemPredicate],
    ) -> RepoResult<ItemOut> {
        let filter = compile_predicates(predicates);
        let mut items = self.fetch_items(ctx, &filter, None)?;
        if items.is_empty() {
            return Err(RepoError::NotFound(id));
        }

        load_edges(self.conn, ctx, &mut items[..1], EdgeLoad::DETAIL)?;
        Ok(map_item_out(&items[0]))
    }

    fn find_summaries(
        &self,
        ctx: &QueryContext,
        filter: &SqlFilter,
        window: Option<PageWindow>,
    ) -> RepoResult<Vec<ItemSummary>> {
        let mut items = self.fetch_items(ctx, filter, window)?;
        load_edges(self.conn, ctx, &mut items, EdgeLoad::SUMMARY)?;
        Ok(items.iter().map(map_item_summary).collect())
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn get_one(&self, ctx: &QueryContext, id: ItemId) -> RepoResult<ItemOut> {
        self.observed(ctx, "item_get", || {
            self.find_detail(ctx, id, &[ItemPredicate::IdEquals(id)])
        })
    }

    fn get_one_by_group(
        &self,
        ctx: &QueryContext,
        group_id: GroupId,
        id: ItemId,
    ) -> RepoResult<ItemOut> {
        self.observed(ctx, "item_get", || {
            self.find_detail(
                ctx,
                id,
                &group_scoped(group_id, [ItemPredicate::IdEquals(id)]),
            )
        })
    }

    fn query_by_group(
        &self,
        ctx: &QueryContext,
        group_id: GroupId,
        query: &ItemQuery,
    ) -> RepoResult<PaginationResult<ItemSummary>> {
        self.observed(ctx, "item_query", || {
            let filter = compile_predicates(&item_query_predicates(group_id, query));
            let window = query.is_paginated().then(|| PageWindow {
                limit: query.page_size,
                offset: calculate_offset(query.page, query.page_size),
            });

            let items = self.find_summaries(ctx, &filter, window)?;
            let total = self.count_items(ctx, &filter)?;

            Ok(PaginationResult {
                page: query.page,
                page_size: query.page_size,
                total,
                items,
            })
        })
    }

    fn get_all(&self, ctx: &QueryContext, group_id: GroupId) -> RepoResult<Vec<ItemSummary>> {
        self.observed(ctx, "item_query", || {
            let filter = compile_predicates(&group_scoped(group_id, std::iter::empty()));
            self.find_summaries(ctx, &filter, None)
        })
    }

    fn create(
        &self,
        ctx: &QueryContext,
        group_id: GroupId,
        data: &ItemCreate,
    ) -> RepoResult<ItemOut> {
        self.observed(ctx, "item_create", || {
            let item_id = Uuid::new_v4();

            ctx.check()?;
            let tx = self.conn.unchecked_transaction()?;
            tx.execute(
                "INSERT INTO items (
                    id,
                    group_id,
                    location_id,
                    import_ref,
                    name,
                    description
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                params![
                    item_id.to_string(),
                    group_id.to_string(),
                    data.location_id.to_string(),
                    data.import_ref.as_deref(),
                    data.name.as_str(),
                    data.description.as_str(),
                ],
            )?;

            let initial_labels = reconcile_labels(&[], &data.label_ids);
            apply_label_diff(&tx, ctx, item_id, &initial_labels)?;

            ctx.check()?;
            tx.commit()?;

            self.find_detail(ctx, item_id, &[ItemPredicate::IdEquals(item_id)])
        })
    }

    fn delete(&self, ctx: &QueryContext, id: ItemId) -> RepoResult<()> {
        self.observed(ctx, "item_delete", || {
            let deleted = delete_matching(self.conn, ctx, &[ItemPredicate::IdEquals(id)])?;
            if deleted == 0 {
                return Err(RepoError::NotFound(id));
            }
            Ok(())
        })
    }

    fn delete_by_group(
        &self,
        ctx: &QueryContext,
        group_id: GroupId,
        id: ItemId,
    ) -> RepoResult<usize> {
        self.observed(ctx, "item_delete", || {
            delete_matching(
                self.conn,
                ctx,
                &group_scoped(group_id, [ItemPredicate::IdEquals(id)]),
            )
        })
    }

    fn update_by_group(
        &self,
        ctx: &QueryContext,
        group_id: GroupId,
        data: &ItemUpdate,
    ) -> RepoResult<ItemOut> {
        self.observed(ctx, "item_update", || {
            let scope = group_scoped(group_id, [ItemPredicate::IdEquals(data.id)]);
            let filter = compile_predicates(&scope);

            ctx.check()?;
            let tx = self.conn.unchecked_transaction()?;

            let mut bind_values = update_values(data);
            bind_values.extend(filter.binds);
            let changed = tx.execute(
                &format!(
                    "UPDATE items
                     SET
                        name = ?,
                        description = ?,
                        quantity = ?,
                        insured = ?,
                        location_id = ?,
                        serial_number = ?,
                        model_number = ?,
                        manufacturer = ?,
                        lifetime_warranty = ?,
                        warranty_expires = ?,
                        warranty_details = ?,
                        purchase_time = ?,
                        purchase_from = ?,
                        purchase_price = ?,
                        sold_time = ?,
                        sold_to = ?,
                        sold_price = ?,
                        sold_notes = ?,
                        notes = ?,
                        updated_at = {NOW_MS_SQL}
                     WHERE {};",
                    filter.clause
                ),
                params_from_iter(bind_values),
            )?;
            if changed == 0 {
                return Err(RepoError::NotFound(data.id));
            }

            let current = current_label_ids(&tx, ctx, data.id)?;
            let diff = reconcile_labels(&current, &data.label_ids);
            apply_label_diff(&tx, ctx, data.id, &diff)?;

            ctx.check()?;
            tx.commit()?;

            self.find_detail(ctx, data.id, &scope)
        })
    }
}

/// `LIMIT`/`OFFSET` pair of an active pagination request.
#[derive(Debug, Clone, Copy)]
struct PageWindow {
    limit: i64,
    offset: i64,
}

/// Values for the `SET` list of the update statement, in column order.
fn update_values(data: &ItemUpdate) -> Vec<Value> {
    vec![
        Value::from(data.name.clone()),
        Value::from(data.description.clone()),
        Value::from(data.quantity),
        Value::from(bool_to_int(data.insured)),
        Value::from(data.location_id.to_string()),
        Value::from(data.serial_number.clone()),
        Value::from(data.model_number.clone()),
        Value::from(data.manufacturer.clone()),
        Value::from(bool_to_int(data.lifetime_warranty)),
        Value::from(data.warranty_expires),
        Value::from(data.warranty_details.clone()),
        Value::from(data.purchase_time),
        Value::from(data.purchase_from.clone()),
        Value::from(data.purchase_price),
        Value::from(data.sold_time),
        Value::from(data.sold_to.clone()),
        Value::from(data.sold_price),
        Value::from(data.sold_notes.clone()),
        Value::from(data.notes.clone()),
    ]
}

fn delete_matching(
    conn: &Connection,
    ctx: &QueryContext,
    predicates: &[ItemPredicate],
) -> RepoResult<usize> {
    let filter = compile_predicates(predicates);
    ctx.check()?;
    let deleted = conn.execute(
        &format!("DELETE FROM items WHERE {};", filter.clause),
        params_from_iter(filter.binds),
    )?;
    Ok(deleted)
}

fn current_label_ids(
    conn: &Connection,
    ctx: &QueryContext,
    item_id: ItemId,
) -> RepoResult<Vec<LabelId>> {
    ctx.check()?;
    let mut stmt = conn.prepare_cached(
        "SELECT label_id
         FROM label_items
         WHERE item_id = ?1;",
    )?;
    let mut rows = stmt.query([item_id.to_string()])?;
    let mut label_ids = Vec::new();
    while let Some(row) = rows.next()? {
        label_ids.push(uuid_column(row, "label_id")?);
    }
    Ok(label_ids)
}

fn apply_label_diff(
    conn: &Connection,
    ctx: &QueryContext,
    item_id: ItemId,
    diff: &LabelDiff,
) -> RepoResult<()> {
    if diff.is_empty() {
        return Ok(());
    }
    let item_id_text = item_id.to_string();

    if !diff.to_remove.is_empty() {
        let mut stmt = conn.prepare_cached(
            "DELETE FROM label_items
             WHERE item_id = ?1
               AND label_id = ?2;",
        )?;
        for label_id in &diff.to_remove {
            ctx.check()?;
            stmt.execute(params![item_id_text.as_str(), label_id.to_string()])?;
        }
    }

    if !diff.to_add.is_empty() {
        let mut stmt = conn.prepare_cached(
            "INSERT INTO label_items (label_id, item_id)
             VALUES (?1, ?2);",
        )?;
        for label_id in &diff.to_add {
            ctx.check()?;
            stmt.execute(params![label_id.to_string(), item_id_text.as_str()])?;
        }
    }

    Ok(())
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<ItemRecord> {
    Ok(ItemRecord {
        id: uuid_column(row, "id")?,
        group_id: uuid_column(row, "group_id")?,
        location_id: optional_uuid_column(row, "location_id")?,
        import_ref: row.get("import_ref")?,
        name: row.get("name")?,
        description: row.get("description")?,
        notes: row.get("notes")?,
        quantity: row.get("quantity")?,
        insured: bool_column(row, "insured")?,

        serial_number: row.get("serial_number")?,
        model_number: row.get("model_number")?,
        manufacturer: row.get("manufacturer")?,

        lifetime_warranty: bool_column(row, "lifetime_warranty")?,
        warranty_expires: row.get("warranty_expires")?,
        warranty_details: row.get("warranty_details")?,

        purchase_time: row.get("purchase_time")?,
        purchase_from: row.get("purchase_from")?,
        purchase_price: row.get("purchase_price")?,

        sold_time: row.get("sold_time")?,
        sold_to: row.get("sold_to")?,
        sold_price: row.get("sold_price")?,
        sold_notes: row.get("sold_notes")?,

        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,

        edges: Default::default(),
    })
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn log_outcome<T>(event: &str, started_at: Instant, result: &RepoResult<T>) {
    let duration_ms = started_at.elapsed().as_millis();
    match result {
        Ok(_) => debug!("event={event} module=repo status=ok duration_ms={duration_ms}"),
        Err(err) => {
            let level = match err {
                RepoError::NotFound(_) | RepoError::Cancelled => Level::Info,
                _ => Level::Warn,
            };
            log!(
                level,
                "event={event} module=repo status=error duration_ms={duration_ms} error_code={}",
                err.code()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RepoError, SqliteItemRepository};
    use crate::db::{open_db_in_memory, DbError};
    use rusqlite::Connection;

    #[test]
    fn try_new_rejects_unmigrated_connection() {
        let conn = Connection::open_in_memory().unwrap();
        let result = SqliteItemRepository::try_new(&conn);
        assert!(matches!(
            result,
            Err(RepoError::MissingRequiredTable("groups"))
        ));
    }

    #[test]
    fn try_new_accepts_migrated_connection() {
        let conn = open_db_in_memory().unwrap();
        assert!(SqliteItemRepository::try_new(&conn).is_ok());
    }

    #[test]
    fn interrupted_sqlite_error_maps_to_cancelled() {
        let interrupted = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_INTERRUPT),
            None,
        );
        assert!(matches!(RepoError::from(interrupted), RepoError::Cancelled));

        let wrapped = DbError::Sqlite(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_INTERRUPT),
            None,
        ));
        assert_eq!(RepoError::from(wrapped).code(), "cancelled");

        let other = RepoError::from(rusqlite::Error::QueryReturnedNoRows);
        assert_eq!(other.code(), "db_error");
    }
}
