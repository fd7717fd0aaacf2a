//! Typed item predicates and their SQLite compilation.
//!
//! # Responsibility
//! - Build filter predicates for item reads and writes as plain values.
//! - Compile predicate lists into a `WHERE` clause with bound parameters.
//!
//! # Invariants
//! - Every group-scoped predicate list is built by `group_scoped`, which
//!   always places `GroupEquals` first.
//! - User input only ever reaches SQL as a bound parameter.
//! - An id list is bound as a single JSON array and expanded with
//!   `json_each`, so its length never counts against SQLite's variable limit.
//! - A top-level predicate list is a conjunction; `AnyOf` is a disjunction.

use crate::db::CONTAINS_FOLD_FN;
use crate::model::item::{ItemId, ItemQuery};
use crate::model::related::{GroupId, LabelId, LocationId};
use rusqlite::types::Value;
use uuid::Uuid;

/// Text column a `TextContains` predicate inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Name,
    Description,
}

impl TextField {
    fn column(self) -> &'static str {
        match self {
            Self::Name => "items.name",
            Self::Description => "items.description",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemPredicate {
    IdEquals(ItemId),
    GroupEquals(GroupId),
    /// Item carries at least one of the labels.
    HasAnyLabel(Vec<LabelId>),
    /// Item is stored in one of the locations.
    HasAnyLocation(Vec<LocationId>),
    /// Case-insensitive substring match.
    TextContains(TextField, String),
    AnyOf(Vec<ItemPredicate>),
}

/// Prefixes `rest` with the mandatory group predicate.
pub fn group_scoped(
    group_id: GroupId,
    rest: impl IntoIterator<Item = ItemPredicate>,
) -> Vec<ItemPredicate> {
    let mut predicates = vec![ItemPredicate::GroupEquals(group_id)];
    predicates.extend(rest);
    predicates
}

/// Translates a listing request into predicates. Empty filters add nothing.
pub fn item_query_predicates(group_id: GroupId, query: &ItemQuery) -> Vec<ItemPredicate> {
    let mut filters = Vec::new();

    if !query.label_ids.is_empty() {
        filters.push(ItemPredicate::HasAnyLabel(query.label_ids.clone()));
    }

    if !query.location_ids.is_empty() {
        filters.push(ItemPredicate::HasAnyLocation(query.location_ids.clone()));
    }

    if !query.search.is_empty() {
        filters.push(ItemPredicate::AnyOf(vec![
            ItemPredicate::TextContains(TextField::Name, query.search.clone()),
            ItemPredicate::TextContains(TextField::Description, query.search.clone()),
        ]));
    }

    group_scoped(group_id, filters)
}

/// Compiled `WHERE` clause (without the keyword) and its positional binds.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlFilter {
    pub clause: String,
    pub binds: Vec<Value>,
}

/// Compiles a conjunction of predicates. An empty list matches every row.
pub fn compile_predicates(predicates: &[ItemPredicate]) -> SqlFilter {
    let mut binds = Vec::new();
    let clause = if predicates.is_empty() {
        "1 = 1".to_string()
    } else {
        predicates
            .iter()
            .map(|predicate| compile_one(predicate, &mut binds))
            .collect::<Vec<_>>()
            .join(" AND ")
    };

    SqlFilter { clause, binds }
}

fn compile_one(predicate: &ItemPredicate, binds: &mut Vec<Value>) -> String {
    match predicate {
        ItemPredicate::IdEquals(id) => {
            binds.push(Value::Text(id.to_string()));
            "items.id = ?".to_string()
        }
        ItemPredicate::GroupEquals(group_id) => {
            binds.push(Value::Text(group_id.to_string()));
            "items.group_id = ?".to_string()
        }
        ItemPredicate::HasAnyLabel(label_ids) => {
            if label_ids.is_empty() {
                return "0 = 1".to_string();
            }
            binds.push(id_array(label_ids));
            "EXISTS (
                SELECT 1
                FROM label_items li
                WHERE li.item_id = items.id
                  AND li.label_id IN (SELECT value FROM json_each(?))
            )"
            .to_string()
        }
        ItemPredicate::HasAnyLocation(location_ids) => {
            if location_ids.is_empty() {
                return "0 = 1".to_string();
            }
            binds.push(id_array(location_ids));
            "items.location_id IN (SELECT value FROM json_each(?))".to_string()
        }
        ItemPredicate::TextContains(field, needle) => {
            binds.push(Value::Text(needle.clone()));
            format!("{CONTAINS_FOLD_FN}({}, ?)", field.column())
        }
        ItemPredicate::AnyOf(alternatives) => {
            if alternatives.is_empty() {
                return "0 = 1".to_string();
            }
            let parts = alternatives
                .iter()
                .map(|alternative| compile_one(alternative, binds))
                .collect::<Vec<_>>();
            format!("({})", parts.join(" OR "))
        }
    }
}

/// JSON array text of hyphenated ids, e.g. `["id-a","id-b"]`.
fn id_array(ids: &[Uuid]) -> Value {
    let items = ids
        .iter()
        .map(|id| serde_json::Value::String(id.to_string()))
        .collect::<Vec<_>>();
    Value::Text(serde_json::Value::Array(items).to_string())
}

/// `?, ?, ?` with `count` markers.
pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

#[cfg(test)]
mod tests {
    use super::{
        compile_predicates, group_scoped, item_query_predicates, placeholders, ItemPredicate,
        TextField,
    };
    use crate::model::item::ItemQuery;
    use rusqlite::types::Value;
    use uuid::Uuid;

    #[test]
    fn group_predicate_always_comes_first() {
        let group_id = Uuid::new_v4();
        let item_id = Uuid::new_v4();

        let scoped = group_scoped(group_id, [ItemPredicate::IdEquals(item_id)]);
        assert_eq!(
            scoped,
            vec![
                ItemPredicate::GroupEquals(group_id),
                ItemPredicate::IdEquals(item_id)
            ]
        );

        let listing = item_query_predicates(group_id, &ItemQuery::default());
        assert_eq!(listing, vec![ItemPredicate::GroupEquals(group_id)]);
    }

    #[test]
    fn query_filters_become_disjunctions() {
        let group_id = Uuid::new_v4();
        let labels = vec![Uuid::new_v4(), Uuid::new_v4()];
        let locations = vec![Uuid::new_v4()];
        let query = ItemQuery {
            search: "drill".to_string(),
            label_ids: labels.clone(),
            location_ids: locations.clone(),
            ..ItemQuery::default()
        };

        let predicates = item_query_predicates(group_id, &query);
        assert_eq!(
            predicates,
            vec![
                ItemPredicate::GroupEquals(group_id),
                ItemPredicate::HasAnyLabel(labels),
                ItemPredicate::HasAnyLocation(locations),
                ItemPredicate::AnyOf(vec![
                    ItemPredicate::TextContains(TextField::Name, "drill".to_string()),
                    ItemPredicate::TextContains(TextField::Description, "drill".to_string()),
                ]),
            ]
        );
    }

    #[test]
    fn compile_binds_values_in_clause_order() {
        let group_id = Uuid::new_v4();
        let label_a = Uuid::new_v4();
        let label_b = Uuid::new_v4();
        let predicates = group_scoped(
            group_id,
            [
                ItemPredicate::HasAnyLabel(vec![label_a, label_b]),
                ItemPredicate::AnyOf(vec![
                    ItemPredicate::TextContains(TextField::Name, "saw".to_string()),
                    ItemPredicate::TextContains(TextField::Description, "saw".to_string()),
                ]),
            ],
        );

        let filter = compile_predicates(&predicates);

        assert!(filter.clause.starts_with("items.group_id = ? AND EXISTS"));
        assert!(filter
            .clause
            .contains("li.label_id IN (SELECT value FROM json_each(?))"));
        assert!(filter
            .clause
            .ends_with("(contains_fold(items.name, ?) OR contains_fold(items.description, ?))"));
        assert_eq!(
            filter.binds,
            vec![
                Value::Text(group_id.to_string()),
                Value::Text(format!(r#"["{label_a}","{label_b}"]"#)),
                Value::Text("saw".to_string()),
                Value::Text("saw".to_string()),
            ]
        );
    }

    #[test]
    fn empty_sets_match_nothing_and_empty_list_matches_everything() {
        assert_eq!(compile_predicates(&[]).clause, "1 = 1");

        let filter = compile_predicates(&[
            ItemPredicate::HasAnyLocation(Vec::new()),
            ItemPredicate::AnyOf(Vec::new()),
        ]);
        assert_eq!(filter.clause, "0 = 1 AND 0 = 1");
        assert!(filter.binds.is_empty());
    }

    #[test]
    fn id_lists_use_one_bind_regardless_of_length() {
        let locations = (0..40_000).map(|_| Uuid::new_v4()).collect::<Vec<_>>();

        let filter = compile_predicates(&[ItemPredicate::HasAnyLocation(locations.clone())]);

        assert_eq!(
            filter.clause,
            "items.location_id IN (SELECT value FROM json_each(?))"
        );
        assert_eq!(filter.binds.len(), 1);
        let Value::Text(json) = &filter.binds[0] else {
            panic!("expected a text bind, got {:?}", filter.binds[0]);
        };
        let decoded: Vec<Uuid> = serde_json::from_str(json).unwrap();
        assert_eq!(decoded, locations);
    }

    #[test]
    fn placeholders_are_comma_separated() {
        assert_eq!(placeholders(1), "?");
        assert_eq!(placeholders(3), "?, ?, ?");
    }
}
