//! In-memory record client.
//!
//! Evaluates query descriptors against seeded JSON rows the way the record
//! API does, and keeps a log of every call. Used by tests and local runs
//! without record API credentials.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::DateTime;
use domain::query::{GroupCondition, GroupOperator, Operator, QueryDescriptor, SortDirection, WhereCondition};
use domain::services::{
    BatchEnvelope, BatchResult, ListEnvelope, RecordClient, RecordError, RecordFields, SingleEnvelope,
};
use serde_json::{Map, Value};

/// Kind of record API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Fetch,
    GetById,
    Create,
    Update,
    Delete,
}

/// One call made against the client.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordCall {
    pub kind: CallKind,
    pub table: String,
    pub query: Option<QueryDescriptor>,
}

#[derive(Default)]
struct State {
    tables: HashMap<String, Vec<Value>>,
    failing_tables: HashMap<String, String>,
    failing_records: HashMap<(String, i64), String>,
    unreachable: bool,
    calls: Vec<RecordCall>,
}

#[derive(Default)]
pub struct InMemoryRecordClient {
    state: Mutex<State>,
}

impl InMemoryRecordClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(self, table: &str, rows: Vec<Value>) -> Self {
        self.seed(table, rows);
        self
    }

    /// Replaces the rows of `table`.
    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        self.state().tables.insert(table.to_string(), rows);
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.state().tables.get(table).cloned().unwrap_or_default()
    }

    /// Every request against `table` is answered with `success: false`.
    pub fn fail_table(&self, table: &str, message: &str) {
        self.state()
            .failing_tables
            .insert(table.to_string(), message.to_string());
    }

    /// Writes touching record `id` of `table` fail with `message`. A create
    /// fails for the record that would have been given `id`.
    pub fn fail_record(&self, table: &str, id: i64, message: &str) {
        self.state()
            .failing_records
            .insert((table.to_string(), id), message.to_string());
    }

    /// Every request fails at the transport level.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.state().unreachable = unreachable;
    }

    pub fn calls(&self) -> Vec<RecordCall> {
        self.state().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state().calls.len()
    }

    pub fn calls_of(&self, kind: CallKind) -> usize {
        self.state().calls.iter().filter(|c| c.kind == kind).count()
    }

    /// The most recent list query sent for `table`.
    pub fn last_query(&self, table: &str) -> Option<QueryDescriptor> {
        self.state()
            .calls
            .iter()
            .rev()
            .find(|c| c.kind == CallKind::Fetch && c.table == table)
            .and_then(|c| c.query.clone())
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Logs the call and applies transport and table failures.
    fn begin(
        &self,
        kind: CallKind,
        table: &str,
        query: Option<&QueryDescriptor>,
    ) -> Result<(MutexGuard<'_, State>, Option<String>), RecordError> {
        let mut state = self.state();
        state.calls.push(RecordCall {
            kind,
            table: table.to_string(),
            query: query.cloned(),
        });
        if state.unreachable {
            return Err(RecordError::Transport("connection refused".to_string()));
        }
        let rejection = state.failing_tables.get(table).cloned();
        Ok((state, rejection))
    }
}

#[async_trait]
impl RecordClient for InMemoryRecordClient {
    async fn fetch_records(
        &self,
        table: &str,
        query: &QueryDescriptor,
    ) -> Result<ListEnvelope, RecordError> {
        let (state, rejection) = self.begin(CallKind::Fetch, table, Some(query))?;
        if let Some(message) = rejection {
            return Ok(ListEnvelope::rejected(message));
        }

        let mut rows: Vec<&Value> = state
            .tables
            .get(table)
            .map(|rows| rows.iter().filter(|row| matches_query(row, query)).collect())
            .unwrap_or_default();

        for order in query.order_by.iter().rev() {
            rows.sort_by(|a, b| {
                let ordering = compare_fields(a.get(&order.field_name), b.get(&order.field_name));
                match order.sort_type {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }

        let total = rows.len() as i64;
        let (offset, limit) = query
            .paging_info
            .map(|p| (p.offset as usize, p.limit as usize))
            .unwrap_or((0, usize::MAX));
        let page = rows
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|row| project(row, query.fields.iter().map(|f| f.name())))
            .collect();

        Ok(ListEnvelope::ok(page, total))
    }

    async fn get_record_by_id(
        &self,
        table: &str,
        id: i64,
        fields: &[&str],
    ) -> Result<SingleEnvelope, RecordError> {
        let (state, rejection) = self.begin(CallKind::GetById, table, None)?;
        if let Some(message) = rejection {
            return Ok(SingleEnvelope {
                success: false,
                data: None,
                message: Some(message),
            });
        }

        let data = state
            .tables
            .get(table)
            .and_then(|rows| rows.iter().find(|row| row_id(row) == Some(id)))
            .map(|row| project(row, fields.iter().copied()));
        Ok(SingleEnvelope {
            success: true,
            data,
            message: None,
        })
    }

    async fn create_records(
        &self,
        table: &str,
        records: Vec<RecordFields>,
    ) -> Result<BatchEnvelope, RecordError> {
        let (mut state, rejection) = self.begin(CallKind::Create, table, None)?;
        if let Some(message) = rejection {
            return Ok(rejected_batch(message));
        }

        let State {
            tables,
            failing_records: failing,
            ..
        } = &mut *state;
        let rows = tables.entry(table.to_string()).or_default();
        let mut next_id = rows.iter().filter_map(row_id).max().unwrap_or(0) + 1;
        let results = records
            .into_iter()
            .map(|mut fields| {
                let id = next_id;
                next_id += 1;
                if let Some(message) = failing.get(&(table.to_string(), id)) {
                    return BatchResult::failed(message.clone());
                }
                fields.insert("Id".to_string(), Value::from(id));
                let row = Value::Object(fields);
                rows.push(row.clone());
                BatchResult::ok(row)
            })
            .collect();
        Ok(BatchEnvelope::from_results(results))
    }

    async fn update_records(
        &self,
        table: &str,
        records: Vec<RecordFields>,
    ) -> Result<BatchEnvelope, RecordError> {
        let (mut state, rejection) = self.begin(CallKind::Update, table, None)?;
        if let Some(message) = rejection {
            return Ok(rejected_batch(message));
        }

        let mut results = Vec::with_capacity(records.len());
        for fields in records {
            let Some(id) = fields.get("Id").and_then(value_to_i64) else {
                results.push(BatchResult::failed("Record Id is required"));
                continue;
            };
            if let Some(message) = state.failing_records.get(&(table.to_string(), id)) {
                results.push(BatchResult::failed(message.clone()));
                continue;
            }
            let row = state
                .tables
                .get_mut(table)
                .and_then(|rows| rows.iter_mut().find(|row| row_id(row) == Some(id)));
            match row {
                Some(Value::Object(existing)) => {
                    existing.extend(fields);
                    results.push(BatchResult::ok(Value::Object(existing.clone())));
                }
                _ => results.push(BatchResult::failed(format!("Record {} not found", id))),
            }
        }
        Ok(BatchEnvelope::from_results(results))
    }

    async fn delete_records(&self, table: &str, ids: &[i64]) -> Result<BatchEnvelope, RecordError> {
        let (mut state, rejection) = self.begin(CallKind::Delete, table, None)?;
        if let Some(message) = rejection {
            return Ok(rejected_batch(message));
        }

        let mut results = Vec::with_capacity(ids.len());
        for &id in ids {
            if let Some(message) = state.failing_records.get(&(table.to_string(), id)) {
                results.push(BatchResult::failed(message.clone()));
                continue;
            }
            let rows = state.tables.entry(table.to_string()).or_default();
            match rows.iter().position(|row| row_id(row) == Some(id)) {
                Some(index) => {
                    rows.remove(index);
                    results.push(BatchResult::ok(serde_json::json!({ "Id": id })));
                }
                None => results.push(BatchResult::failed(format!("Record {} not found", id))),
            }
        }
        Ok(BatchEnvelope::from_results(results))
    }
}

fn rejected_batch(message: String) -> BatchEnvelope {
    BatchEnvelope {
        success: false,
        results: None,
        message: Some(message),
    }
}

fn matches_query(row: &Value, query: &QueryDescriptor) -> bool {
    query.conditions.iter().all(|c| matches_where(row, c))
        && query.where_groups.iter().all(|group| {
            let mut sub_groups = group.sub_groups.iter().map(|sub| {
                let mut conditions = sub.conditions.iter().map(|c| matches_group(row, c));
                match sub.operator {
                    GroupOperator::And => conditions.all(|m| m),
                    GroupOperator::Or => conditions.any(|m| m),
                }
            });
            match group.operator {
                GroupOperator::And => sub_groups.all(|m| m),
                GroupOperator::Or => sub_groups.any(|m| m),
            }
        })
}

fn matches_where(row: &Value, condition: &WhereCondition) -> bool {
    matches(row.get(&condition.field_name), condition.operator, &condition.values)
}

fn matches_group(row: &Value, condition: &GroupCondition) -> bool {
    matches(row.get(&condition.field_name), condition.operator, &condition.values)
}

fn matches(field: Option<&Value>, operator: Operator, values: &[Value]) -> bool {
    let Some(field) = field.map(scalar).filter(|v| !v.is_null()) else {
        return false;
    };
    match operator {
        Operator::EqualTo | Operator::ExactMatch => values.iter().any(|v| loose_eq(field, v)),
        Operator::Contains => {
            let haystack = as_text(field).to_lowercase();
            values
                .iter()
                .any(|v| haystack.contains(&as_text(v).to_lowercase()))
        }
        Operator::GreaterThanOrEqualTo => values
            .iter()
            .all(|v| compare(field, v).is_some_and(|o| o != Ordering::Less)),
        Operator::LessThanOrEqualTo => values
            .iter()
            .all(|v| compare(field, v).is_some_and(|o| o != Ordering::Greater)),
    }
}

/// Lookup objects (`{"Id": 3, "Name": ..}`) compare by their id.
fn scalar(value: &Value) -> &Value {
    match value {
        Value::Object(map) => map.get("Id").unwrap_or(value),
        other => other,
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn loose_eq(a: &Value, b: &Value) -> bool {
    match (value_to_f64(a), value_to_f64(b)) {
        (Some(x), Some(y)) => x == y,
        _ => as_text(a) == as_text(b),
    }
}

/// Timestamps compare as instants, so `23:59:59Z` falls before `23:59:59.999Z`.
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::String(x), Value::String(y)) => {
            match (DateTime::parse_from_rfc3339(x), DateTime::parse_from_rfc3339(y)) {
                (Ok(x), Ok(y)) => Some(x.cmp(&y)),
                _ => Some(x.cmp(y)),
            }
        }
        _ => value_to_f64(a)?.partial_cmp(&value_to_f64(b)?),
    }
}

/// Missing values sort first.
fn compare_fields(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.map(scalar).filter(|v| !v.is_null());
    let b = b.map(scalar).filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => compare(a, b).unwrap_or(Ordering::Equal),
    }
}

fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn row_id(row: &Value) -> Option<i64> {
    row.get("Id").and_then(value_to_i64)
}

/// Keeps `Id` plus the named fields; no names keeps the whole row.
fn project<'a>(row: &Value, fields: impl Iterator<Item = &'a str>) -> Value {
    let names: Vec<&str> = fields.collect();
    let Value::Object(map) = row else {
        return row.clone();
    };
    if names.is_empty() {
        return row.clone();
    }
    let projected: Map<String, Value> = map
        .iter()
        .filter(|(key, _)| key.as_str() == "Id" || names.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    Value::Object(projected)
}
