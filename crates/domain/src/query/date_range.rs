//! Date range filter resolution.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::descriptor::WhereCondition;
use crate::error::ServiceError;

/// How many months or weeks back the pickers offer.
pub const MAX_RANGE_INDEX: u32 = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateRangeMode {
    Custom,
    Month,
    Week,
}

/// Inclusive range of calendar days applied to an entity's timestamp field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub mode: DateRangeMode,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// User-picked bounds. At least one bound is required.
    pub fn custom(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Self, ServiceError> {
        match (from, to) {
            (None, None) => Err(ServiceError::invalid("Custom date range needs a start or end date")),
            (Some(f), Some(t)) if f > t => Err(ServiceError::invalid(format!(
                "Date range start {} is after end {}",
                f, t
            ))),
            _ => Ok(Self {
                mode: DateRangeMode::Custom,
                from,
                to,
            }),
        }
    }

    /// The calendar month `months_ago` months before `today`'s month.
    pub fn month(months_ago: u32, today: NaiveDate) -> Result<Self, ServiceError> {
        check_index("Month", months_ago)?;

        let index = today.year() * 12 + today.month0() as i32 - months_ago as i32;
        let first = first_of_month(index)?;
        let last = first_of_month(index + 1)? - Duration::days(1);

        Ok(Self {
            mode: DateRangeMode::Month,
            from: Some(first),
            to: Some(last),
        })
    }

    /// The Monday-to-Sunday week `weeks_ago` weeks before `today`'s week.
    pub fn week(weeks_ago: u32, today: NaiveDate) -> Result<Self, ServiceError> {
        check_index("Week", weeks_ago)?;

        let monday = today
            - Duration::days(i64::from(today.weekday().num_days_from_monday()))
            - Duration::weeks(i64::from(weeks_ago));

        Ok(Self {
            mode: DateRangeMode::Week,
            from: Some(monday),
            to: Some(monday + Duration::days(6)),
        })
    }

    /// Predicates on `field`, covering whole days at both ends.
    pub fn conditions(&self, field: &str) -> Vec<WhereCondition> {
        let mut conditions = Vec::with_capacity(2);
        if let Some(from) = self.from {
            conditions.push(WhereCondition::gte(field, format!("{}T00:00:00Z", from)));
        }
        if let Some(to) = self.to {
            conditions.push(WhereCondition::lte(field, format!("{}T23:59:59.999Z", to)));
        }
        conditions
    }
}

fn check_index(kind: &str, index: u32) -> Result<(), ServiceError> {
    if index > MAX_RANGE_INDEX {
        return Err(ServiceError::invalid(format!(
            "{} index must be between 0 and {}, got {}",
            kind, MAX_RANGE_INDEX, index
        )));
    }
    Ok(())
}

fn first_of_month(month_index: i32) -> Result<NaiveDate, ServiceError> {
    let year = month_index.div_euclid(12);
    let month = month_index.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| ServiceError::invalid(format!("Date out of range: {}-{}", year, month)))
}
