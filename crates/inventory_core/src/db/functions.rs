//! Scalar SQL functions registered on every core connection.
//!
//! SQLite's built-in `LIKE` and `lower()` only fold ASCII, so text search
//! predicates compile to `contains_fold` instead.

use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;

/// Name of the case-insensitive substring function.
pub const CONTAINS_FOLD_FN: &str = "contains_fold";

pub(crate) fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        CONTAINS_FOLD_FN,
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let haystack: Option<String> = ctx.get(0)?;
            let needle: Option<String> = ctx.get(1)?;
            Ok(match (haystack, needle) {
                (Some(haystack), Some(needle)) => contains_fold(&haystack, &needle),
                _ => false,
            })
        },
    )
}

fn contains_fold(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
