//! Rendering of predicates, orderings and writes into parameterised SQL.
//!
//! Identifiers come from `'static` column names declared by entity code.
//! Every value, including `LIKE` patterns, is bound as a `?` parameter.

use agora_core::{
  filter::{Clause, Order, Predicate, Query, SortDirection},
  schema::{Column, Row, Value},
};
use rusqlite::types::Value as SqlValue;
use uuid::Uuid;

use crate::encode::encode;

/// SQL text plus its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
  pub sql:    String,
  pub params: Vec<SqlValue>,
}

/// Unicode lowercase, registered on every connection.
pub const FOLD: &str = "fold";

/// Escape `LIKE` metacharacters so the needle matches literally.
fn like_pattern(needle: &str) -> String {
  let mut out = String::with_capacity(needle.len() + 2);
  out.push('%');
  for c in needle.to_lowercase().chars() {
    if matches!(c, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out.push('%');
  out
}

fn where_clause(predicate: &Predicate, params: &mut Vec<SqlValue>) -> String {
  let mut conds = Vec::with_capacity(predicate.clauses().len());
  for clause in predicate.clauses() {
    match clause {
      Clause::Eq(col, Value::Null) | Clause::IsNull(col) => conds.push(format!("{col} IS NULL")),
      Clause::Eq(col, value) => {
        conds.push(format!("{col} = ?"));
        params.push(encode(value));
      }
      Clause::NotNull(col) => conds.push(format!("{col} IS NOT NULL")),
      Clause::Contains(col, needle) => {
        conds.push(format!("{FOLD}({col}) LIKE ? ESCAPE '\\'"));
        params.push(SqlValue::Text(like_pattern(needle)));
      }
      Clause::Range { column, min, max } => {
        if let Some(min) = min {
          conds.push(format!("{column} >= ?"));
          params.push(encode(min));
        }
        if let Some(max) = max {
          conds.push(format!("{column} <= ?"));
          params.push(encode(max));
        }
      }
    }
  }
  if conds.is_empty() {
    String::new()
  } else {
    format!(" WHERE {}", conds.join(" AND "))
  }
}

fn order_clause(order: &[Order]) -> String {
  if order.is_empty() {
    return String::new();
  }
  let terms: Vec<String> = order
    .iter()
    .map(|o| {
      let dir = match o.direction {
        SortDirection::Asc => "ASC",
        SortDirection::Desc => "DESC",
      };
      format!("{} {dir}", o.column)
    })
    .collect();
  format!(" ORDER BY {}", terms.join(", "))
}

fn column_list(columns: &[Column]) -> String {
  columns.iter().map(|c| c.name).collect::<Vec<_>>().join(", ")
}

pub fn select(table: &str, columns: &[Column], query: &Query) -> Statement {
  let mut params = Vec::new();
  let filter = where_clause(&query.predicate, &mut params);
  let order = order_clause(&query.order);
  params.push(SqlValue::Integer(i64::try_from(query.take).unwrap_or(i64::MAX)));
  params.push(SqlValue::Integer(i64::try_from(query.skip).unwrap_or(i64::MAX)));
  Statement {
    sql: format!(
      "SELECT {} FROM {table}{filter}{order} LIMIT ? OFFSET ?",
      column_list(columns)
    ),
    params,
  }
}

/// The first matching row, in stable id order.
pub fn select_first(table: &str, columns: &[Column], predicate: &Predicate) -> Statement {
  let mut params = Vec::new();
  let filter = where_clause(predicate, &mut params);
  Statement {
    sql: format!("SELECT {} FROM {table}{filter} ORDER BY id LIMIT 1", column_list(columns)),
    params,
  }
}

pub fn count(table: &str, predicate: &Predicate) -> Statement {
  let mut params = Vec::new();
  let filter = where_clause(predicate, &mut params);
  Statement { sql: format!("SELECT COUNT(*) FROM {table}{filter}"), params }
}

pub fn insert(table: &str, row: &Row) -> Statement {
  let (names, params): (Vec<&str>, Vec<SqlValue>) =
    row.iter().map(|(name, value)| (name, encode(value))).unzip();
  let marks = vec!["?"; names.len()].join(", ");
  Statement {
    sql: format!("INSERT INTO {table} ({}) VALUES ({marks})", names.join(", ")),
    params,
  }
}

/// Overwrite every non-id column of the row with `id`.
pub fn update(table: &str, id: Uuid, row: &Row) -> Statement {
  let mut sets = Vec::new();
  let mut params = Vec::new();
  for (name, value) in row.iter().filter(|(name, _)| *name != "id") {
    sets.push(format!("{name} = ?"));
    params.push(encode(value));
  }
  params.push(encode(&Value::Uuid(id)));
  Statement {
    sql: format!("UPDATE {table} SET {} WHERE id = ?", sets.join(", ")),
    params,
  }
}

pub fn delete(table: &str, id: Uuid) -> Statement {
  Statement {
    sql:    format!("DELETE FROM {table} WHERE id = ?"),
    params: vec![encode(&Value::Uuid(id))],
  }
}
