use serde_json::Value;
use std::cmp::Ordering;

use super::error::FilterError;
use super::filter_where::{lookup, parse_timestamp};
use super::types::{FieldKind, FieldSpec, FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    /// `sort=-averageCost,name`: a leading `-` means descending
    pub fn validate_and_parse(raw: &str, fields: &[FieldSpec]) -> Result<Vec<FilterOrderInfo>, FilterError> {
        raw.split([',', ' '])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|item| {
                let (name, sort) = match item.strip_prefix('-') {
                    Some(name) => (name, SortDirection::Desc),
                    None => (item, SortDirection::Asc),
                };
                let field = fields
                    .iter()
                    .find(|f| f.name == name)
                    .copied()
                    .ok_or_else(|| FilterError::InvalidColumn(name.to_string()))?;
                Ok(FilterOrderInfo { field, sort })
            })
            .collect()
    }

    pub fn generate(order: &[FilterOrderInfo]) -> String {
        if order.is_empty() {
            return String::new();
        }
        let parts: Vec<String> = order
            .iter()
            .map(|o| format!("\"{}\" {}", o.field.column, o.sort.to_sql()))
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }

    /// Nulls sort last ascending and first descending, as in Postgres
    pub fn compare(order: &[FilterOrderInfo], a: &Value, b: &Value) -> Ordering {
        for info in order {
            let ordering = compare_values(info.field.kind, lookup(a, info.field.name), lookup(b, info.field.name));
            let ordering = match info.sort {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

fn compare_values(kind: FieldKind, a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => match (kind, a, b) {
            (FieldKind::Timestamp, Value::String(x), Value::String(y)) => {
                parse_timestamp(x).cmp(&parse_timestamp(y))
            }
            (_, Value::Number(x), Value::Number(y)) => x
                .as_f64()
                .partial_cmp(&y.as_f64())
                .unwrap_or(Ordering::Equal),
            (_, Value::String(x), Value::String(y)) => x.cmp(y),
            (_, Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            _ => Ordering::Equal,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    static FIELDS: &[FieldSpec] = &[
        FieldSpec::new("name", "name", FieldKind::Text),
        FieldSpec::new("averageRating", "average_rating", FieldKind::Float),
    ];

    #[test]
    fn parses_mixed_directions() {
        let order = FilterOrder::validate_and_parse("-averageRating,name", FIELDS).unwrap();
        assert_eq!(
            FilterOrder::generate(&order),
            "ORDER BY \"average_rating\" DESC, \"name\" ASC"
        );
    }

    #[test]
    fn rejects_unknown_sort_field() {
        assert!(FilterOrder::validate_and_parse("password", FIELDS).is_err());
    }

    #[test]
    fn nulls_last_when_ascending() {
        let order = FilterOrder::validate_and_parse("averageRating", FIELDS).unwrap();
        let rated = json!({ "averageRating": 7.5 });
        let unrated = json!({ "averageRating": null });
        assert_eq!(FilterOrder::compare(&order, &rated, &unrated), Ordering::Less);
    }
}
