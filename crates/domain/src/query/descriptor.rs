//! Declarative query descriptor sent to the record API.
//!
//! The serialized form is the record API's own JSON shape, including its
//! mixed field casing (`FieldName` in `where`, `fieldName` in `orderBy`).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Comparison operators understood by the record API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    EqualTo,
    Contains,
    GreaterThanOrEqualTo,
    LessThanOrEqualTo,
    ExactMatch,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    /// Parses `asc`/`desc` in any case.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldName {
    #[serde(rename = "Name")]
    pub name: String,
}

/// Projection entry, `{"field": {"Name": ...}}` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSelector {
    pub field: FieldName,
}

impl FieldSelector {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            field: FieldName { name: name.into() },
        }
    }

    pub fn name(&self) -> &str {
        &self.field.name
    }
}

/// Top-level predicate. All `where` conditions are AND-combined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WhereCondition {
    pub field_name: String,
    pub operator: Operator,
    pub values: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<bool>,
}

impl WhereCondition {
    pub fn new(field: impl Into<String>, operator: Operator, values: Vec<Value>) -> Self {
        Self {
            field_name: field.into(),
            operator,
            values,
            include: None,
        }
    }

    pub fn equal_to(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::EqualTo, vec![value.into()])
    }

    pub fn contains(field: impl Into<String>, term: impl Into<String>) -> Self {
        Self::new(field, Operator::Contains, vec![Value::String(term.into())])
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::GreaterThanOrEqualTo, vec![value.into()])
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::LessThanOrEqualTo, vec![value.into()])
    }

    /// Membership test against a set of values.
    pub fn one_of(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            include: Some(true),
            ..Self::new(field, Operator::ExactMatch, values)
        }
    }

    /// Membership test against a set of ids.
    pub fn exact_match(field: impl Into<String>, ids: &[i64]) -> Self {
        Self::one_of(field, ids.iter().map(|id| Value::from(*id)).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GroupOperator {
    And,
    Or,
}

/// Predicate inside a where-group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupCondition {
    pub field_name: String,
    pub operator: Operator,
    pub values: Vec<Value>,
}

impl From<WhereCondition> for GroupCondition {
    fn from(c: WhereCondition) -> Self {
        Self {
            field_name: c.field_name,
            operator: c.operator,
            values: c.values,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubGroup {
    pub conditions: Vec<GroupCondition>,
    pub operator: GroupOperator,
}

/// A group of sub-groups combined with `operator`, AND-combined with the
/// rest of the descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhereGroup {
    pub operator: GroupOperator,
    pub sub_groups: Vec<SubGroup>,
}

impl WhereGroup {
    /// Matches when any of `conditions` matches.
    pub fn any_of(conditions: Vec<WhereCondition>) -> Self {
        Self {
            operator: GroupOperator::Or,
            sub_groups: conditions
                .into_iter()
                .map(|c| SubGroup {
                    conditions: vec![c.into()],
                    operator: GroupOperator::And,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    #[serde(rename = "fieldName")]
    pub field_name: String,
    #[serde(rename = "sorttype")]
    pub sort_type: SortDirection,
}

impl OrderBy {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field_name: field.into(),
            sort_type: direction,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingInfo {
    pub limit: u32,
    pub offset: u32,
}

/// Full query against one table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDescriptor {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldSelector>,
    #[serde(rename = "where", default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<WhereCondition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub where_groups: Vec<WhereGroup>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<OrderBy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paging_info: Option<PagingInfo>,
}

impl QueryDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = names.into_iter().map(FieldSelector::new).collect();
        self
    }

    pub fn filter(mut self, condition: WhereCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn group(mut self, group: WhereGroup) -> Self {
        self.where_groups.push(group);
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by.push(OrderBy::new(field, direction));
        self
    }

    pub fn page(mut self, limit: u32, offset: u32) -> Self {
        self.paging_info = Some(PagingInfo { limit, offset });
        self
    }

    /// Query for exactly the records with the given ids.
    pub fn by_ids(ids: &[i64]) -> Self {
        Self::new().filter(WhereCondition::exact_match("Id", ids))
    }
}
