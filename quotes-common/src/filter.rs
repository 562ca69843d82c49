//! Ransack-style filtering and sorting for admin index pages
//!
//! Filter parameters arrive as `q[<condition>]=value` (or `q[<condition>][]=value`
//! for lists) where a condition is `<attribute>_<predicate>` or
//! `<association>_<attribute>_<predicate>`. Every attribute and association
//! must appear in the model's filterable allowlist; anything else is dropped
//! before SQL is built. Blank values are ignored rather than rejected.

use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite};
use tracing::debug;

/// Storage type of a filterable attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Integer,
    Text,
    Timestamp,
}

/// An attribute exposed to filter queries
#[derive(Debug)]
pub struct Attribute {
    pub name: &'static str,
    pub kind: AttributeKind,
}

impl Attribute {
    pub const fn integer(name: &'static str) -> Self {
        Self { name, kind: AttributeKind::Integer }
    }

    pub const fn text(name: &'static str) -> Self {
        Self { name, kind: AttributeKind::Text }
    }

    pub const fn timestamp(name: &'static str) -> Self {
        Self { name, kind: AttributeKind::Timestamp }
    }
}

/// How an association is stored
#[derive(Debug)]
pub enum AssociationKind {
    /// Owner row holds `foreign_key` pointing at `target.id`
    BelongsTo { foreign_key: &'static str },
    /// Rows are linked through `join_table(owner_key, target_key)`
    HasAndBelongsToMany {
        join_table: &'static str,
        owner_key: &'static str,
        target_key: &'static str,
    },
}

/// An association exposed to filter queries
#[derive(Debug)]
pub struct Association {
    pub name: &'static str,
    pub target_table: &'static str,
    pub kind: AssociationKind,
    /// The target model's own filterable allowlist
    pub target_attributes: &'static [Attribute],
}

/// Comparison applied by a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    Eq,
    NotEq,
    Cont,
    Start,
    End,
    Gt,
    Lt,
    Gteq,
    Lteq,
    In,
}

impl Predicate {
    /// Suffixes in match order. `not_eq`, `gteq` and `lteq` must be tried
    /// before `eq`.
    const SUFFIXES: [(&'static str, Predicate); 10] = [
        ("not_eq", Predicate::NotEq),
        ("gteq", Predicate::Gteq),
        ("lteq", Predicate::Lteq),
        ("cont", Predicate::Cont),
        ("start", Predicate::Start),
        ("end", Predicate::End),
        ("eq", Predicate::Eq),
        ("gt", Predicate::Gt),
        ("lt", Predicate::Lt),
        ("in", Predicate::In),
    ];

    /// Split `author_id_eq` into (`author_id`, `Eq`)
    pub fn split(key: &str) -> Option<(&str, Predicate)> {
        Self::SUFFIXES.iter().find_map(|(suffix, predicate)| {
            key.strip_suffix(suffix)
                .and_then(|rest| rest.strip_suffix('_'))
                .filter(|base| !base.is_empty())
                .map(|base| (base, *predicate))
        })
    }

    pub fn suffix(self) -> &'static str {
        Self::SUFFIXES
            .iter()
            .find(|(_, p)| *p == self)
            .map(|(s, _)| *s)
            .unwrap_or("eq")
    }

    fn is_text_only(self) -> bool {
        matches!(self, Predicate::Cont | Predicate::Start | Predicate::End)
    }
}

/// What a condition filters on
#[derive(Debug, Clone, Copy)]
pub enum Target {
    Attribute(&'static Attribute),
    Association(&'static Association, &'static Attribute),
}

impl Target {
    fn attribute(&self) -> &'static Attribute {
        match self {
            Target::Attribute(attr) => attr,
            Target::Association(_, attr) => attr,
        }
    }

    fn param_base(&self) -> String {
        match self {
            Target::Attribute(attr) => attr.name.to_string(),
            Target::Association(assoc, attr) => format!("{}_{}", assoc.name, attr.name),
        }
    }
}

/// Typed value bound into the query
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Integer(i64),
    Text(String),
}

impl FilterValue {
    fn parse(kind: AttributeKind, raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            return None;
        }
        match kind {
            AttributeKind::Integer => raw.trim().parse().ok().map(FilterValue::Integer),
            AttributeKind::Text | AttributeKind::Timestamp => Some(FilterValue::Text(raw.to_string())),
        }
    }

    fn display(&self) -> String {
        match self {
            FilterValue::Integer(v) => v.to_string(),
            FilterValue::Text(v) => v.clone(),
        }
    }
}

/// One validated filter condition
#[derive(Debug, Clone)]
pub struct Condition {
    pub target: Target,
    pub predicate: Predicate,
    pub values: Vec<FilterValue>,
}

impl Condition {
    /// Parameter key this condition was parsed from, e.g. `tags_id_in`
    pub fn param_key(&self) -> String {
        format!("{}_{}", self.target.param_base(), self.predicate.suffix())
    }
}

/// An active filter echoed back to the index page
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ActiveFilter {
    pub key: String,
    pub values: Vec<String>,
}

/// A set of conditions combined with AND
#[derive(Debug, Clone, Default)]
pub struct Search {
    conditions: Vec<Condition>,
}

impl Search {
    /// Parse `q[...]` parameters against an allowlist.
    ///
    /// Parameters outside `q[...]`, unknown attributes, associations or
    /// predicates, and blank or mistyped values are dropped.
    pub fn parse(
        params: &[(String, String)],
        attributes: &'static [Attribute],
        associations: &'static [Association],
    ) -> Self {
        let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
        for (key, value) in params {
            let Some(condition_key) = condition_key(key) else {
                continue;
            };
            match grouped.iter_mut().find(|(k, _)| k == condition_key) {
                Some((_, values)) => values.push(value.clone()),
                None => grouped.push((condition_key.to_string(), vec![value.clone()])),
            }
        }

        let conditions = grouped
            .into_iter()
            .filter_map(|(key, raw)| {
                let condition = build_condition(&key, &raw, attributes, associations);
                if condition.is_none() {
                    debug!("Dropping filter condition q[{}]", key);
                }
                condition
            })
            .collect();

        Self { conditions }
    }

    /// Add an equality condition that does not come from user input
    pub fn and_eq(mut self, attribute: &'static Attribute, value: i64) -> Self {
        self.conditions.push(Condition {
            target: Target::Attribute(attribute),
            predicate: Predicate::Eq,
            values: vec![FilterValue::Integer(value)],
        });
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Conditions in the `q[...]` vocabulary, for echoing back to the UI
    pub fn active_filters(&self) -> Vec<ActiveFilter> {
        self.conditions
            .iter()
            .map(|c| ActiveFilter {
                key: c.param_key(),
                values: c.values.iter().map(FilterValue::display).collect(),
            })
            .collect()
    }

    /// Append ` WHERE ...` for all conditions against `table`
    pub fn push_where(&self, qb: &mut QueryBuilder<'_, Sqlite>, table: &str) {
        for (i, condition) in self.conditions.iter().enumerate() {
            qb.push(if i == 0 { " WHERE " } else { " AND " });
            push_condition(qb, table, condition);
        }
    }
}

/// `q[name_cont]` -> `name_cont`, `q[tags_id_in][]` -> `tags_id_in`
fn condition_key(param: &str) -> Option<&str> {
    let inner = param.strip_prefix("q[")?;
    let end = inner.find(']')?;
    let key = &inner[..end];
    let rest = &inner[end + 1..];
    (rest.is_empty() || rest == "[]").then_some(key)
}

fn resolve_target(
    base: &str,
    attributes: &'static [Attribute],
    associations: &'static [Association],
) -> Option<Target> {
    if let Some(attr) = attributes.iter().find(|a| a.name == base) {
        return Some(Target::Attribute(attr));
    }

    associations.iter().find_map(|assoc| {
        let attr_name = base.strip_prefix(assoc.name)?.strip_prefix('_')?;
        assoc
            .target_attributes
            .iter()
            .find(|a| a.name == attr_name)
            .map(|attr| Target::Association(assoc, attr))
    })
}

fn build_condition(
    key: &str,
    raw: &[String],
    attributes: &'static [Attribute],
    associations: &'static [Association],
) -> Option<Condition> {
    let (base, predicate) = Predicate::split(key)?;
    let target = resolve_target(base, attributes, associations)?;
    let kind = target.attribute().kind;

    if predicate.is_text_only() && kind != AttributeKind::Text {
        return None;
    }

    // `in` takes every `[]` value whole; only integer ids may also be comma-joined
    let values: Vec<FilterValue> = if predicate == Predicate::In {
        raw.iter()
            .flat_map(|v| match kind {
                AttributeKind::Integer => v.split(',').collect::<Vec<_>>(),
                _ => vec![v.as_str()],
            })
            .filter_map(|v| FilterValue::parse(kind, v))
            .collect()
    } else {
        raw.last()
            .and_then(|v| FilterValue::parse(kind, v))
            .into_iter()
            .collect()
    };

    if values.is_empty() {
        return None;
    }

    Some(Condition { target, predicate, values })
}

fn push_condition(qb: &mut QueryBuilder<'_, Sqlite>, table: &str, condition: &Condition) {
    match condition.target {
        Target::Attribute(attr) => {
            qb.push(format!("{}.{}", table, attr.name));
            push_predicate(qb, condition);
        }
        Target::Association(assoc, attr) => match assoc.kind {
            AssociationKind::BelongsTo { foreign_key } => {
                qb.push(format!(
                    "{table}.{foreign_key} IN (SELECT {target}.id FROM {target} WHERE {target}.{column}",
                    target = assoc.target_table,
                    column = attr.name,
                ));
                push_predicate(qb, condition);
                qb.push(")");
            }
            AssociationKind::HasAndBelongsToMany {
                join_table,
                owner_key,
                target_key,
            } => {
                qb.push(format!(
                    "{table}.id IN (SELECT {join_table}.{owner_key} FROM {join_table} \
                     JOIN {target} ON {target}.id = {join_table}.{target_key} \
                     WHERE {target}.{column}",
                    target = assoc.target_table,
                    column = attr.name,
                ));
                push_predicate(qb, condition);
                qb.push(")");
            }
        },
    }
}

fn push_predicate(qb: &mut QueryBuilder<'_, Sqlite>, condition: &Condition) {
    let operator = match condition.predicate {
        Predicate::Eq => " = ",
        Predicate::NotEq => " <> ",
        Predicate::Gt => " > ",
        Predicate::Lt => " < ",
        Predicate::Gteq => " >= ",
        Predicate::Lteq => " <= ",
        Predicate::Cont | Predicate::Start | Predicate::End => {
            let text = condition.values[0].display();
            let escaped = escape_like(&text);
            let pattern = match condition.predicate {
                Predicate::Cont => format!("%{}%", escaped),
                Predicate::Start => format!("{}%", escaped),
                _ => format!("%{}", escaped),
            };
            qb.push(" LIKE ");
            qb.push_bind(pattern);
            qb.push(" ESCAPE '\\'");
            return;
        }
        Predicate::In => {
            qb.push(" IN (");
            let mut separated = qb.separated(", ");
            for value in &condition.values {
                match value {
                    FilterValue::Integer(v) => separated.push_bind(*v),
                    FilterValue::Text(v) => separated.push_bind(v.clone()),
                };
            }
            separated.push_unseparated(")");
            return;
        }
    };

    qb.push(operator);
    push_value(qb, &condition.values[0]);
}

fn push_value(qb: &mut QueryBuilder<'_, Sqlite>, value: &FilterValue) {
    match value {
        FilterValue::Integer(v) => qb.push_bind(*v),
        FilterValue::Text(v) => qb.push_bind(v.clone()),
    };
}

/// Escape LIKE wildcards so user text matches literally
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// `ORDER BY` restricted to an allowlist of sortable columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub column: &'static str,
    pub direction: Direction,
}

impl Sort {
    /// Default admin index order
    pub const ID_DESC: Sort = Sort {
        column: "id",
        direction: Direction::Desc,
    };

    /// Parse `order=<column>_<asc|desc>`, falling back to `default` when the
    /// value is missing, malformed or names a column outside `sortable`.
    pub fn parse(order: Option<&str>, sortable: &'static [&'static str], default: Sort) -> Sort {
        let Some((column, direction)) = order.and_then(|o| o.rsplit_once('_')) else {
            return default;
        };

        let direction = match direction {
            "asc" => Direction::Asc,
            "desc" => Direction::Desc,
            _ => return default,
        };

        match sortable.iter().find(|c| **c == column) {
            Some(column) => Sort { column, direction },
            None => default,
        }
    }

    /// The `order` parameter value for this sort
    pub fn as_param(&self) -> String {
        let direction = match self.direction {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        };
        format!("{}_{}", self.column, direction)
    }

    /// Append ` ORDER BY table.column DIR`
    pub fn push_order_by(&self, qb: &mut QueryBuilder<'_, Sqlite>, table: &str) {
        let direction = match self.direction {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        };
        qb.push(format!(" ORDER BY {}.{} {}", table, self.column, direction));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static PEOPLE_ATTRIBUTES: &[Attribute] = &[
        Attribute::integer("id"),
        Attribute::text("name"),
        Attribute::timestamp("created_at"),
    ];

    static LABEL_ATTRIBUTES: &[Attribute] = &[Attribute::integer("id"), Attribute::text("name")];

    static PEOPLE_ASSOCIATIONS: &[Association] = &[Association {
        name: "labels",
        target_table: "labels",
        kind: AssociationKind::HasAndBelongsToMany {
            join_table: "labels_people",
            owner_key: "person_id",
            target_key: "label_id",
        },
        target_attributes: LABEL_ATTRIBUTES,
    }];

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn parse(pairs: &[(&str, &str)]) -> Search {
        Search::parse(&params(pairs), PEOPLE_ATTRIBUTES, PEOPLE_ASSOCIATIONS)
    }

    fn where_sql(search: &Search) -> String {
        let mut qb = QueryBuilder::new("SELECT * FROM people");
        search.push_where(&mut qb, "people");
        qb.sql().to_string()
    }

    #[test]
    fn test_predicate_split() {
        assert_eq!(Predicate::split("name_cont"), Some(("name", Predicate::Cont)));
        assert_eq!(Predicate::split("author_id_eq"), Some(("author_id", Predicate::Eq)));
        assert_eq!(Predicate::split("author_id_not_eq"), Some(("author_id", Predicate::NotEq)));
        assert_eq!(Predicate::split("created_at_gteq"), Some(("created_at", Predicate::Gteq)));
        assert_eq!(Predicate::split("tags_id_in"), Some(("tags_id", Predicate::In)));
        assert_eq!(Predicate::split("name"), None);
        assert_eq!(Predicate::split("_eq"), None);
    }

    #[test]
    fn test_attribute_condition() {
        let search = parse(&[("q[name_cont]", "ada")]);
        assert_eq!(search.conditions().len(), 1);
        assert_eq!(
            where_sql(&search),
            "SELECT * FROM people WHERE people.name LIKE ? ESCAPE '\\'"
        );
    }

    #[test]
    fn test_attribute_outside_allowlist_is_dropped() {
        let search = parse(&[("q[password_eq]", "x"), ("q[labels_secret_eq]", "y")]);
        assert!(search.is_empty());
        assert_eq!(where_sql(&search), "SELECT * FROM people");
    }

    #[test]
    fn test_non_filter_params_ignored() {
        let search = parse(&[("order", "id_desc"), ("page", "2"), ("name_eq", "x")]);
        assert!(search.is_empty());
    }

    #[test]
    fn test_blank_and_mistyped_values_ignored() {
        let search = parse(&[("q[name_eq]", ""), ("q[id_eq]", "abc"), ("q[id_cont]", "1")]);
        assert!(search.is_empty());
    }

    #[test]
    fn test_association_list_condition() {
        let search = parse(&[("q[labels_id_in][]", "1"), ("q[labels_id_in][]", "2")]);
        assert_eq!(search.conditions().len(), 1);
        assert_eq!(
            search.conditions()[0].values,
            vec![FilterValue::Integer(1), FilterValue::Integer(2)]
        );
        assert_eq!(
            where_sql(&search),
            "SELECT * FROM people WHERE people.id IN (SELECT labels_people.person_id FROM labels_people \
             JOIN labels ON labels.id = labels_people.label_id WHERE labels.id IN (?, ?))"
        );
    }

    #[test]
    fn test_in_keeps_text_values_whole() {
        let search = parse(&[("q[name_in][]", "Smith, John"), ("q[name_in][]", "Ada")]);
        assert_eq!(
            search.conditions()[0].values,
            vec![
                FilterValue::Text("Smith, John".to_string()),
                FilterValue::Text("Ada".to_string())
            ]
        );
    }

    #[test]
    fn test_in_splits_joined_integer_ids() {
        let search = parse(&[("q[id_in]", "3,5")]);
        assert_eq!(
            search.conditions()[0].values,
            vec![FilterValue::Integer(3), FilterValue::Integer(5)]
        );
    }

    #[test]
    fn test_conditions_joined_with_and() {
        let search = parse(&[("q[name_start]", "A"), ("q[id_gt]", "3")]);
        assert_eq!(
            where_sql(&search),
            "SELECT * FROM people WHERE people.name LIKE ? ESCAPE '\\' AND people.id > ?"
        );
    }

    #[test]
    fn test_active_filters_echo() {
        let search = parse(&[("q[labels_name_cont]", "wis")]).and_eq(&PEOPLE_ATTRIBUTES[0], 7);
        assert_eq!(
            search.active_filters(),
            vec![
                ActiveFilter {
                    key: "labels_name_cont".to_string(),
                    values: vec!["wis".to_string()],
                },
                ActiveFilter {
                    key: "id_eq".to_string(),
                    values: vec!["7".to_string()],
                },
            ]
        );
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%_off\\"), "100\\%\\_off\\\\");
    }

    #[test]
    fn test_sort_parse() {
        static SORTABLE: &[&str] = &["id", "name", "created_at"];
        assert_eq!(
            Sort::parse(Some("name_asc"), SORTABLE, Sort::ID_DESC),
            Sort { column: "name", direction: Direction::Asc }
        );
        assert_eq!(
            Sort::parse(Some("created_at_desc"), SORTABLE, Sort::ID_DESC).as_param(),
            "created_at_desc"
        );
        assert_eq!(Sort::parse(Some("secret_asc"), SORTABLE, Sort::ID_DESC), Sort::ID_DESC);
        assert_eq!(Sort::parse(Some("name_sideways"), SORTABLE, Sort::ID_DESC), Sort::ID_DESC);
        assert_eq!(Sort::parse(None, SORTABLE, Sort::ID_DESC), Sort::ID_DESC);
    }
}
