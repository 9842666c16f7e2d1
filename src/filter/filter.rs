use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{FieldSpec, FilterOp, FilterOrderInfo, FilterWhereInfo, ListQuery, Page, SortDirection};

/// Builds a `ListQuery` from query-string parameters against a field whitelist
pub struct Filter {
    fields: &'static [FieldSpec],
    select_columns: Option<Vec<String>>,
    where_data: Vec<FilterWhereInfo>,
    order_data: Vec<FilterOrderInfo>,
    page: u32,
    limit: u32,
    max_limit: u32,
}

impl Filter {
    pub fn new(fields: &'static [FieldSpec], default_limit: u32, max_limit: u32) -> Self {
        // Newest first unless the caller sorts explicitly
        let order_data = fields
            .iter()
            .find(|f| f.name == "createdAt")
            .map(|f| vec![FilterOrderInfo { field: *f, sort: SortDirection::Desc }])
            .unwrap_or_default();

        Self {
            fields,
            select_columns: None,
            where_data: vec![],
            order_data,
            page: 1,
            limit: default_limit.min(max_limit).max(1),
            max_limit: max_limit.max(1),
        }
    }

    /// Parse a full query-string map in one go
    pub fn parse(
        params: &HashMap<String, String>,
        fields: &'static [FieldSpec],
        default_limit: u32,
        max_limit: u32,
    ) -> Result<ListQuery, FilterError> {
        let mut filter = Self::new(fields, default_limit, max_limit);
        filter.assign(params)?;
        Ok(filter.build())
    }

    pub fn assign(&mut self, params: &HashMap<String, String>) -> Result<&mut Self, FilterError> {
        let mut keys: Vec<&String> = params.keys().collect();
        keys.sort();

        for key in keys {
            let raw = &params[key];
            match key.as_str() {
                "select" => {
                    self.select(raw);
                }
                "sort" => {
                    self.order(raw)?;
                }
                "page" | "limit" => {}
                _ => {
                    self.where_param(key, raw)?;
                }
            }
        }

        self.limit(params.get("limit").map(String::as_str), params.get("page").map(String::as_str))?;
        Ok(self)
    }

    pub fn select(&mut self, raw: &str) -> &mut Self {
        let columns: Vec<String> = raw
            .split(',')
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        self.select_columns = (!columns.is_empty()).then_some(columns);
        self
    }

    /// `field=value` or `field[op]=value`
    pub fn where_param(&mut self, key: &str, raw: &str) -> Result<&mut Self, FilterError> {
        let (name, op) = match key.split_once('[') {
            Some((name, rest)) => {
                let op = rest
                    .strip_suffix(']')
                    .ok_or_else(|| FilterError::UnsupportedOperator(key.to_string()))?;
                let op = FilterOp::parse(op).ok_or_else(|| FilterError::UnsupportedOperator(op.to_string()))?;
                (name, op)
            }
            None => (key, FilterOp::Eq),
        };

        let field = self.field(name)?;
        let data = FilterWhere::parse_value(&field, op, raw)?;
        self.where_data.push(FilterWhereInfo { field, operator: op, data });
        Ok(self)
    }

    pub fn order(&mut self, raw: &str) -> Result<&mut Self, FilterError> {
        let order = FilterOrder::validate_and_parse(raw, self.fields)?;
        if !order.is_empty() {
            self.order_data = order;
        }
        Ok(self)
    }

    pub fn limit(&mut self, limit: Option<&str>, page: Option<&str>) -> Result<&mut Self, FilterError> {
        if let Some(raw) = limit {
            let parsed: u32 = raw
                .trim()
                .parse()
                .map_err(|_| FilterError::InvalidLimit(raw.to_string()))?;
            if parsed == 0 {
                return Err(FilterError::InvalidLimit("Limit must be positive".to_string()));
            }
            if parsed > self.max_limit {
                tracing::debug!("Limit {} exceeds max {}, capping to max", parsed, self.max_limit);
            }
            self.limit = parsed.min(self.max_limit);
        }

        if let Some(raw) = page {
            let parsed: u32 = raw
                .trim()
                .parse()
                .map_err(|_| FilterError::InvalidPage(raw.to_string()))?;
            if parsed == 0 {
                return Err(FilterError::InvalidPage("Page numbers start at 1".to_string()));
            }
            self.page = parsed;
        }

        Ok(self)
    }

    pub fn build(&self) -> ListQuery {
        ListQuery {
            select: self.select_columns.clone(),
            conditions: self.where_data.clone(),
            order: self.order_data.clone(),
            page: self.page,
            limit: self.limit,
        }
    }

    fn field(&self, name: &str) -> Result<FieldSpec, FilterError> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .copied()
            .ok_or_else(|| FilterError::InvalidColumn(name.to_string()))
    }
}

/// Evaluate a list query over records held in memory. Records are matched on
/// their serialized JSON form, so field names are the API names.
pub fn apply_in_memory<T: Serialize>(records: Vec<T>, query: &ListQuery) -> Page<T> {
    let mut matched: Vec<(Value, T)> = records
        .into_iter()
        .map(|record| (serde_json::to_value(&record).unwrap_or(Value::Null), record))
        .filter(|(json, _)| FilterWhere::matches(&query.conditions, json))
        .collect();

    matched.sort_by(|(a, _), (b, _)| FilterOrder::compare(&query.order, a, b));

    let total = matched.len() as u64;
    let items = matched
        .into_iter()
        .skip(query.offset() as usize)
        .take(query.limit as usize)
        .map(|(_, record)| record)
        .collect();

    Page { items, total }
}

/// Keep only the selected keys (plus `id`) of serialized records. Dotted
/// names such as `location.city` keep that leaf inside its parent object.
pub fn project(records: Vec<Value>, select: Option<&[String]>) -> Vec<Value> {
    let Some(select) = select else {
        return records;
    };

    records
        .into_iter()
        .map(|record| match record {
            Value::Object(map) => {
                let mut kept = Map::new();
                if let Some(id) = map.get("id") {
                    kept.insert("id".to_string(), id.clone());
                }
                for name in select {
                    let path: Vec<&str> = name.split('.').collect();
                    pick(&map, &path, &mut kept);
                }
                Value::Object(kept)
            }
            other => other,
        })
        .collect()
}

fn pick(source: &Map<String, Value>, path: &[&str], target: &mut Map<String, Value>) {
    let Some((head, rest)) = path.split_first() else {
        return;
    };
    let Some(value) = source.get(*head) else {
        return;
    };

    if rest.is_empty() {
        target.insert(head.to_string(), value.clone());
        return;
    }

    if let Value::Object(inner) = value {
        let slot = target
            .entry(head.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(slot) = slot {
            pick(inner, rest, slot);
        }
    }
}
