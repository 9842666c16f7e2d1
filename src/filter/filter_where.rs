use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use std::cmp::Ordering;
use uuid::Uuid;

use super::error::FilterError;
use super::types::{FieldKind, FieldSpec, FilterOp, FilterValue, FilterWhereInfo};

pub struct FilterWhere;

impl FilterWhere {
    /// Parse a raw query-string value according to the field's kind.
    /// `in` takes a comma separated list.
    pub fn parse_value(field: &FieldSpec, op: FilterOp, raw: &str) -> Result<FilterValue, FilterError> {
        if op == FilterOp::In {
            let items = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|item| Self::parse_scalar(field, item))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(FilterValue::List(items));
        }
        Self::parse_scalar(field, raw)
    }

    fn parse_scalar(field: &FieldSpec, raw: &str) -> Result<FilterValue, FilterError> {
        let invalid = || FilterError::InvalidOperatorData {
            field: field.name.to_string(),
            value: raw.to_string(),
        };

        let value = match field.kind {
            FieldKind::Text => FilterValue::Text(raw.to_string()),
            FieldKind::Integer => FilterValue::Integer(raw.trim().parse().map_err(|_| invalid())?),
            FieldKind::Float => FilterValue::Float(raw.trim().parse().map_err(|_| invalid())?),
            FieldKind::Bool => FilterValue::Bool(raw.trim().parse().map_err(|_| invalid())?),
            FieldKind::Uuid => FilterValue::Uuid(Uuid::parse_str(raw.trim()).map_err(|_| invalid())?),
            FieldKind::Timestamp => FilterValue::Timestamp(parse_timestamp(raw.trim()).ok_or_else(invalid)?),
        };
        Ok(value)
    }

    /// Generate a SQL condition joined with AND; placeholders start at `$start + 1`
    pub fn generate(conditions: &[FilterWhereInfo], start: usize) -> (String, Vec<FilterValue>) {
        let mut params = Vec::new();
        let mut clauses = Vec::with_capacity(conditions.len());

        for condition in conditions {
            let column = format!("\"{}\"", condition.field.column);
            match (&condition.operator, &condition.data) {
                (FilterOp::In, FilterValue::List(items)) => {
                    if items.is_empty() {
                        clauses.push("FALSE".to_string());
                        continue;
                    }
                    let placeholders: Vec<String> = items
                        .iter()
                        .map(|item| {
                            params.push(item.clone());
                            format!("${}", start + params.len())
                        })
                        .collect();
                    clauses.push(format!("{} IN ({})", column, placeholders.join(", ")));
                }
                (op, data) => {
                    params.push(data.clone());
                    clauses.push(format!("{} {} ${}", column, op.to_sql(), start + params.len()));
                }
            }
        }

        (clauses.join(" AND "), params)
    }

    /// In-memory counterpart of `generate`: missing or null fields never match
    pub fn matches(conditions: &[FilterWhereInfo], record: &Value) -> bool {
        conditions.iter().all(|condition| {
            let Some(actual) = lookup(record, condition.field.name) else {
                return false;
            };

            match (&condition.operator, &condition.data) {
                (FilterOp::In, FilterValue::List(items)) => {
                    items.iter().any(|item| compare(actual, item) == Some(Ordering::Equal))
                }
                (op, expected) => match compare(actual, expected) {
                    Some(ordering) => match op {
                        FilterOp::Eq | FilterOp::In => ordering == Ordering::Equal,
                        FilterOp::Ne => ordering != Ordering::Equal,
                        FilterOp::Gt => ordering == Ordering::Greater,
                        FilterOp::Gte => ordering != Ordering::Less,
                        FilterOp::Lt => ordering == Ordering::Less,
                        FilterOp::Lte => ordering != Ordering::Greater,
                    },
                    None => false,
                },
            }
        })
    }
}

/// Resolve a dotted API field name inside a serialized record
pub(crate) fn lookup<'a>(record: &'a Value, name: &str) -> Option<&'a Value> {
    name.split('.')
        .try_fold(record, |current, segment| current.get(segment))
        .filter(|v| !v.is_null())
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn compare(actual: &Value, expected: &FilterValue) -> Option<Ordering> {
    match (actual, expected) {
        (Value::Number(n), FilterValue::Integer(i)) => n.as_f64()?.partial_cmp(&(*i as f64)),
        (Value::Number(n), FilterValue::Float(f)) => n.as_f64()?.partial_cmp(f),
        (Value::String(s), FilterValue::Text(t)) => Some(s.as_str().cmp(t.as_str())),
        (Value::Bool(b), FilterValue::Bool(e)) => Some(b.cmp(e)),
        (Value::String(s), FilterValue::Uuid(u)) => Some(Uuid::parse_str(s).ok()?.cmp(u)),
        (Value::String(s), FilterValue::Timestamp(t)) => Some(parse_timestamp(s)?.cmp(t)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const COST: FieldSpec = FieldSpec::new("averageCost", "average_cost", FieldKind::Integer);
    const CITY: FieldSpec = FieldSpec::new("location.city", "city", FieldKind::Text);

    fn cond(field: FieldSpec, operator: FilterOp, raw: &str) -> FilterWhereInfo {
        FilterWhereInfo {
            field,
            operator,
            data: FilterWhere::parse_value(&field, operator, raw).unwrap(),
        }
    }

    #[test]
    fn generates_numbered_placeholders() {
        let conditions = vec![cond(COST, FilterOp::Gte, "5000"), cond(CITY, FilterOp::In, "Boston,Lowell")];
        let (sql, params) = FilterWhere::generate(&conditions, 0);
        assert_eq!(sql, "\"average_cost\" >= $1 AND \"city\" IN ($2, $3)");
        assert_eq!(params.len(), 3);
        assert_eq!(params[0], FilterValue::Integer(5000));
    }

    #[test]
    fn empty_in_list_matches_nothing() {
        let conditions = vec![cond(CITY, FilterOp::In, "")];
        let (sql, params) = FilterWhere::generate(&conditions, 0);
        assert_eq!(sql, "FALSE");
        assert!(params.is_empty());
    }

    #[test]
    fn rejects_values_of_wrong_kind() {
        assert!(FilterWhere::parse_value(&COST, FilterOp::Lt, "cheap").is_err());
    }

    #[test]
    fn matches_nested_and_numeric_fields() {
        let record = json!({ "averageCost": 9000, "location": { "city": "Boston" } });
        assert!(FilterWhere::matches(&[cond(COST, FilterOp::Lt, "10000")], &record));
        assert!(!FilterWhere::matches(&[cond(COST, FilterOp::Gt, "10000")], &record));
        assert!(FilterWhere::matches(&[cond(CITY, FilterOp::In, "Lowell,Boston")], &record));
        assert!(!FilterWhere::matches(&[cond(CITY, FilterOp::Ne, "Boston")], &record));
    }

    #[test]
    fn null_fields_never_match() {
        let record = json!({ "averageCost": null });
        assert!(!FilterWhere::matches(&[cond(COST, FilterOp::Ne, "1")], &record));
    }

    #[test]
    fn parses_dates_and_rfc3339() {
        assert!(parse_timestamp("2024-03-01").is_some());
        assert!(parse_timestamp("2024-03-01T10:00:00Z").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
