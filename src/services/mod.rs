// services/mod.rs - Resource operations behind the HTTP handlers
//
// Each operation takes the shared state plus the acting identity, loads what
// it needs, applies the owner-or-admin policy before any write and returns a
// typed result. Handlers only translate HTTP in and envelopes out.

pub mod bootcamps;
pub mod photos;
pub mod reviews;
pub mod users;

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::error::ApiError;
use crate::filter::filter::project;
use crate::filter::{FieldSpec, Filter, ListQuery, Page, Pagination};
use crate::state::AppState;

/// One page of a filtered collection, already projected for output
#[derive(Debug)]
pub struct Listing {
    pub data: Vec<Value>,
    pub pagination: Pagination,
}

/// Parse `select`, `sort`, `page`, `limit` and field filters from a query string
pub fn list_query(
    state: &AppState,
    params: &HashMap<String, String>,
    fields: &'static [FieldSpec],
) -> Result<ListQuery, ApiError> {
    let api = &state.config.api;
    Ok(Filter::parse(params, fields, api.default_page_limit, api.max_page_limit)?)
}

/// Shape a repository page into the advanced-results form
pub fn advanced_results<T: Serialize>(page: Page<T>, query: &ListQuery) -> Result<Listing, ApiError> {
    let records = page
        .items
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            tracing::error!("Failed to serialize records: {}", e);
            ApiError::internal_server_error("Failed to serialize response data")
        })?;

    Ok(Listing {
        data: project(records, query.select.as_deref()),
        pagination: Pagination::for_page(query.page, query.limit, page.total),
    })
}
