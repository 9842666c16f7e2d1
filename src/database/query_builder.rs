use sqlx::{self, postgres::PgArguments, FromRow, PgPool, Row};

use crate::database::manager::DatabaseError;
use crate::filter::filter_order::FilterOrder;
use crate::filter::filter_where::FilterWhere;
use crate::filter::types::SqlResult;
use crate::filter::{FilterValue, ListQuery};

/// Compiles a `ListQuery` into a paged SELECT plus a matching COUNT
pub struct QueryBuilder<'a> {
    table_name: &'static str,
    query: &'a ListQuery,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(table_name: &'static str, query: &'a ListQuery) -> Self {
        Self { table_name, query }
    }

    pub fn to_sql(&self) -> SqlResult {
        let (where_clause, params) = FilterWhere::generate(&self.query.conditions, 0);
        let order_clause = FilterOrder::generate(&self.query.order);

        let query = [
            "SELECT *".to_string(),
            format!("FROM \"{}\"", self.table_name),
            if where_clause.is_empty() { String::new() } else { format!("WHERE {}", where_clause) },
            order_clause,
            format!("LIMIT {} OFFSET {}", self.query.limit, self.query.offset()),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        SqlResult { query, params }
    }

    pub fn to_count_sql(&self) -> SqlResult {
        let (where_clause, params) = FilterWhere::generate(&self.query.conditions, 0);
        let query = if where_clause.is_empty() {
            format!("SELECT COUNT(*) AS count FROM \"{}\"", self.table_name)
        } else {
            format!("SELECT COUNT(*) AS count FROM \"{}\" WHERE {}", self.table_name, where_clause)
        };
        SqlResult { query, params }
    }

    /// Fetch one page of rows and the total matching count
    pub async fn fetch_page<T>(&self, pool: &PgPool) -> Result<(Vec<T>, u64), DatabaseError>
    where
        T: for<'r> FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
    {
        let select = self.to_sql();
        let mut q = sqlx::query_as::<_, T>(&select.query);
        for p in select.params.iter() {
            q = bind_param_query_as(q, p);
        }
        let rows = q.fetch_all(pool).await?;

        let count = self.to_count_sql();
        let mut q = sqlx::query(&count.query);
        for p in count.params.iter() {
            q = bind_param_query(q, p);
        }
        let row = q.fetch_one(pool).await?;
        let total: i64 = row.try_get("count")?;

        Ok((rows, total.max(0) as u64))
    }
}

fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &FilterValue,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        FilterValue::Text(s) => q.bind(s.clone()),
        FilterValue::Integer(i) => q.bind(*i),
        FilterValue::Float(f) => q.bind(*f),
        FilterValue::Bool(b) => q.bind(*b),
        FilterValue::Uuid(u) => q.bind(*u),
        FilterValue::Timestamp(t) => q.bind(*t),
        // Lists are expanded into scalar placeholders by FilterWhere
        FilterValue::List(_) => q,
    }
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &FilterValue,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, sqlx::postgres::PgRow>,
{
    match v {
        FilterValue::Text(s) => q.bind(s.clone()),
        FilterValue::Integer(i) => q.bind(*i),
        FilterValue::Float(f) => q.bind(*f),
        FilterValue::Bool(b) => q.bind(*b),
        FilterValue::Uuid(u) => q.bind(*u),
        FilterValue::Timestamp(t) => q.bind(*t),
        FilterValue::List(_) => q,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::BOOTCAMP_FIELDS;
    use crate::filter::Filter;
    use std::collections::HashMap;

    #[test]
    fn builds_paged_select_and_count() {
        let params: HashMap<String, String> = [
            ("averageCost[lt]".to_string(), "10000".to_string()),
            ("page".to_string(), "3".to_string()),
            ("limit".to_string(), "10".to_string()),
        ]
        .into_iter()
        .collect();
        let query = Filter::parse(&params, BOOTCAMP_FIELDS, 25, 100).unwrap();
        let builder = QueryBuilder::new("bootcamps", &query);

        let select = builder.to_sql();
        assert_eq!(
            select.query,
            "SELECT * FROM \"bootcamps\" WHERE \"average_cost\" < $1 ORDER BY \"created_at\" DESC LIMIT 10 OFFSET 20"
        );
        assert_eq!(select.params, vec![FilterValue::Integer(10000)]);

        let count = builder.to_count_sql();
        assert_eq!(count.query, "SELECT COUNT(*) AS count FROM \"bootcamps\" WHERE \"average_cost\" < $1");
    }

    #[test]
    fn unfiltered_count() {
        let query = Filter::parse(&HashMap::new(), BOOTCAMP_FIELDS, 25, 100).unwrap();
        let builder = QueryBuilder::new("users", &query);
        assert_eq!(builder.to_count_sql().query, "SELECT COUNT(*) AS count FROM \"users\"");
    }
}
