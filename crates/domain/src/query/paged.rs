//! Search, filter, sort and paging state shared by every list page.

use serde_json::Value;
use std::collections::BTreeMap;

use shared::pagination::{check_page, check_page_size, is_valid_page_size, offset_for, DEFAULT_PAGE_SIZE};
use shared::validation::validate_search_term;

use super::date_range::DateRange;
use super::descriptor::{PagingInfo, QueryDescriptor, SortDirection, WhereCondition, WhereGroup};
use crate::error::ServiceError;

/// How a filter value is turned into a predicate value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Compared as the string given.
    Text,
    /// Parsed as an integer record id or count.
    Integer,
    /// `connected`/`true` or `disconnected`/`false`.
    Flag,
}

/// A discrete filter offered by a list page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSpec {
    /// Name of the filter in requests.
    pub key: &'static str,
    /// Record field the filter applies to.
    pub field: &'static str,
    pub kind: FilterKind,
}

/// Static description of a list page's table.
#[derive(Debug, Clone, Copy)]
pub struct TableSpec {
    pub table: &'static str,
    pub fields: &'static [&'static str],
    /// Fields searched with `Contains`. Several fields are OR-combined.
    pub search_fields: &'static [&'static str],
    pub date_field: Option<&'static str>,
    pub default_sort: (&'static str, SortDirection),
    pub filters: &'static [FilterSpec],
    pub sortable: &'static [&'static str],
}

impl TableSpec {
    fn filter_spec(&self, key: &str) -> Option<&FilterSpec> {
        self.filters.iter().find(|f| f.key == key)
    }
}

/// Replacement for the default text search predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchPredicate {
    /// `Contains` on each field, OR-combined.
    Contains(Vec<&'static str>),
    /// Membership of `field` in a set of ids resolved beforehand.
    ExactIds { field: &'static str, ids: Vec<i64> },
}

/// Query state of one list page.
///
/// Changing the search, a filter or the date range moves back to page 1.
/// Changing the page or page size never touches filters or sort.
#[derive(Debug, Clone, PartialEq)]
pub struct PagedQuery {
    search: String,
    filters: BTreeMap<String, String>,
    date_range: Option<DateRange>,
    sort: Option<(String, SortDirection)>,
    page: u32,
    per_page: u32,
}

impl Default for PagedQuery {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl PagedQuery {
    pub fn new(per_page: u32) -> Self {
        Self {
            search: String::new(),
            filters: BTreeMap::new(),
            date_range: None,
            sort: None,
            page: 1,
            per_page: if is_valid_page_size(per_page) {
                per_page
            } else {
                DEFAULT_PAGE_SIZE
            },
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn filter(&self, key: &str) -> Option<&str> {
        self.filters.get(key).map(String::as_str)
    }

    pub fn date_range(&self) -> Option<&DateRange> {
        self.date_range.as_ref()
    }

    pub fn sort(&self) -> Option<(&str, SortDirection)> {
        self.sort.as_ref().map(|(c, d)| (c.as_str(), *d))
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn set_search(&mut self, term: &str) -> Result<(), ServiceError> {
        let term = term.trim();
        validate_search_term(term).map_err(|e| ServiceError::invalid(validation_message(&e)))?;
        if self.search != term {
            self.search = term.to_string();
            self.page = 1;
        }
        Ok(())
    }

    /// Sets or, with an empty value, clears a discrete filter.
    pub fn set_filter(&mut self, key: &str, value: &str) {
        let value = value.trim();
        let changed = if value.is_empty() {
            self.filters.remove(key).is_some()
        } else {
            self.filters.insert(key.to_string(), value.to_string()).as_deref() != Some(value)
        };
        if changed {
            self.page = 1;
        }
    }

    pub fn set_date_range(&mut self, range: Option<DateRange>) {
        if self.date_range != range {
            self.date_range = range;
            self.page = 1;
        }
    }

    /// Sorts by `column`. The active column flips direction, a new one
    /// starts ascending.
    pub fn set_sort(&mut self, column: &str) {
        self.sort = match self.sort.take() {
            Some((active, direction)) if active == column => Some((active, direction.toggled())),
            _ => Some((column.to_string(), SortDirection::Asc)),
        };
    }

    pub fn set_sort_explicit(&mut self, column: &str, direction: SortDirection) {
        self.sort = Some((column.to_string(), direction));
    }

    pub fn set_page(&mut self, page: u32) -> Result<(), ServiceError> {
        self.page = check_page(page)?;
        Ok(())
    }

    /// Changes the page size and returns to page 1.
    pub fn set_page_size(&mut self, per_page: u32) -> Result<(), ServiceError> {
        self.per_page = check_page_size(per_page)?;
        self.page = 1;
        Ok(())
    }

    pub fn paging(&self) -> PagingInfo {
        PagingInfo {
            limit: self.per_page,
            offset: offset_for(self.page, self.per_page),
        }
    }

    pub fn build_descriptor(&self, spec: &TableSpec) -> Result<QueryDescriptor, ServiceError> {
        self.build_descriptor_with(spec, None)
    }

    /// Builds the record query for the current state.
    ///
    /// `search` replaces the default `Contains` search when the term is set.
    pub fn build_descriptor_with(
        &self,
        spec: &TableSpec,
        search: Option<SearchPredicate>,
    ) -> Result<QueryDescriptor, ServiceError> {
        let mut query = QueryDescriptor::new().fields(spec.fields.iter().copied());

        if !self.search.is_empty() {
            let predicate =
                search.unwrap_or_else(|| SearchPredicate::Contains(spec.search_fields.to_vec()));
            query = match predicate {
                SearchPredicate::Contains(fields) if fields.len() == 1 => {
                    query.filter(WhereCondition::contains(fields[0], self.search.as_str()))
                }
                SearchPredicate::Contains(fields) if fields.is_empty() => query,
                SearchPredicate::Contains(fields) => query.group(WhereGroup::any_of(
                    fields
                        .into_iter()
                        .map(|f| WhereCondition::contains(f, self.search.as_str()))
                        .collect(),
                )),
                SearchPredicate::ExactIds { field, ids } => {
                    query.filter(WhereCondition::exact_match(field, &ids))
                }
            };
        }

        for (key, raw) in &self.filters {
            let filter = spec.filter_spec(key).ok_or_else(|| {
                ServiceError::invalid(format!("Unknown filter '{}' for {}", key, spec.table))
            })?;
            query = query.filter(WhereCondition::equal_to(filter.field, filter_value(filter, raw)?));
        }

        if let Some(range) = &self.date_range {
            let field = spec.date_field.ok_or_else(|| {
                ServiceError::invalid(format!("{} has no date range filter", spec.table))
            })?;
            for condition in range.conditions(field) {
                query = query.filter(condition);
            }
        }

        query = match &self.sort {
            Some((column, direction)) => {
                if !spec.sortable.contains(&column.as_str()) {
                    return Err(ServiceError::invalid(format!(
                        "Cannot sort {} by '{}'",
                        spec.table, column
                    )));
                }
                query.order_by(column.as_str(), *direction)
            }
            None => query.order_by(spec.default_sort.0, spec.default_sort.1),
        };

        let paging = self.paging();
        Ok(query.page(paging.limit, paging.offset))
    }
}

fn filter_value(filter: &FilterSpec, raw: &str) -> Result<Value, ServiceError> {
    match filter.kind {
        FilterKind::Text => Ok(Value::from(raw)),
        FilterKind::Integer => raw.parse::<i64>().map(Value::from).map_err(|_| {
            ServiceError::invalid(format!("Filter '{}' expects a number, got '{}'", filter.key, raw))
        }),
        FilterKind::Flag => match raw.to_ascii_lowercase().as_str() {
            "connected" | "true" | "yes" => Ok(Value::Bool(true)),
            "disconnected" | "false" | "no" => Ok(Value::Bool(false)),
            _ => Err(ServiceError::invalid(format!(
                "Filter '{}' expects connected or disconnected, got '{}'",
                filter.key, raw
            ))),
        },
    }
}

fn validation_message(err: &validator::ValidationError) -> String {
    err.message
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_else(|| err.code.to_string())
}
