//! Column decoding helpers shared by item and edge queries.

use super::item_repo::{RepoError, RepoResult};
use rusqlite::Row;
use uuid::Uuid;

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn uuid_column(row: &Row<'_>, column: &str) -> RepoResult<Uuid> {
    let value: String = row.get(column)?;
    parse_uuid(&value, column)
}

pub(crate) fn optional_uuid_column(row: &Row<'_>, column: &str) -> RepoResult<Option<Uuid>> {
    let value: Option<String> = row.get(column)?;
    value.map(|value| parse_uuid(&value, column)).transpose()
}

pub(crate) fn bool_column(row: &Row<'_>, column: &str) -> RepoResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::{bool_column, optional_uuid_column, uuid_column};
    use crate::repo::item_repo::RepoError;
    use rusqlite::Connection;
    use uuid::Uuid;

    #[test]
    fn decodes_uuid_and_boolean_columns() {
        let conn = Connection::open_in_memory().unwrap();
        let id = Uuid::new_v4();

        let (parsed, missing, flag) = conn
            .query_row(
                "SELECT ?1 AS id, NULL AS location_id, 1 AS insured;",
                [id.to_string()],
                |row| {
                    Ok((
                        uuid_column(row, "id"),
                        optional_uuid_column(row, "location_id"),
                        bool_column(row, "insured"),
                    ))
                },
            )
            .unwrap();

        assert_eq!(parsed.unwrap(), id);
        assert_eq!(missing.unwrap(), None);
        assert!(flag.unwrap());
    }

    #[test]
    fn rejects_malformed_persisted_values() {
        let conn = Connection::open_in_memory().unwrap();

        let (bad_id, bad_flag) = conn
            .query_row("SELECT 'not-a-uuid' AS id, 7 AS insured;", [], |row| {
                Ok((uuid_column(row, "id"), bool_column(row, "insured")))
            })
            .unwrap();

        assert!(matches!(bad_id, Err(RepoError::InvalidData(message)) if message.contains("id")));
        assert!(matches!(bad_flag, Err(RepoError::InvalidData(_))));
    }
}
