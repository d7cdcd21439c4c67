//! Filter Builder primitives: predicates, visibility, sorting and list
//! requests.
//!
//! Column names inside a [`Predicate`] or [`Order`] are always `'static`
//! strings chosen by typed builder code; nothing a client sends is ever used
//! as an identifier.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, page::PageParams, schema::Value};

// ─── Predicate ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
  Eq(&'static str, Value),
  IsNull(&'static str),
  NotNull(&'static str),
  /// Case-insensitive substring containment.
  Contains(&'static str, String),
  /// Inclusive range; a missing bound leaves that side open.
  Range {
    column: &'static str,
    min:    Option<Value>,
    max:    Option<Value>,
  },
}

/// A conjunction of clauses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
  clauses: Vec<Clause>,
}

impl Predicate {
  pub fn new() -> Self { Self::default() }

  pub fn by_id(id: Uuid) -> Self { Self::new().eq("id", id) }

  pub fn clauses(&self) -> &[Clause] { &self.clauses }

  pub fn eq(mut self, column: &'static str, value: impl Into<Value>) -> Self {
    self.clauses.push(Clause::Eq(column, value.into()));
    self
  }

  /// Equality when `value` is present, no clause otherwise.
  pub fn eq_opt<T: Into<Value>>(self, column: &'static str, value: Option<T>) -> Self {
    match value {
      Some(v) => self.eq(column, v),
      None => self,
    }
  }

  /// Tri-state filter on a nullable column: absent omits the clause,
  /// `Some(None)` matches NULL, `Some(Some(v))` matches `v`.
  pub fn nullable<T: Into<Value>>(
    self,
    column: &'static str,
    value: Option<Option<T>>,
  ) -> Self {
    match value {
      None => self,
      Some(None) => self.is_null(column),
      Some(Some(v)) => self.eq(column, v),
    }
  }

  pub fn is_null(mut self, column: &'static str) -> Self {
    self.clauses.push(Clause::IsNull(column));
    self
  }

  pub fn not_null(mut self, column: &'static str) -> Self {
    self.clauses.push(Clause::NotNull(column));
    self
  }

  /// `Some(true)` requires the column to be set, `Some(false)` requires NULL.
  pub fn presence(self, column: &'static str, present: Option<bool>) -> Self {
    match present {
      Some(true) => self.not_null(column),
      Some(false) => self.is_null(column),
      None => self,
    }
  }

  pub fn contains(mut self, column: &'static str, needle: Option<&str>) -> Self {
    if let Some(needle) = needle {
      self.clauses.push(Clause::Contains(column, needle.to_owned()));
    }
    self
  }

  pub fn range<T: Into<Value>>(
    mut self,
    column: &'static str,
    min: Option<T>,
    max: Option<T>,
  ) -> Self {
    if min.is_some() || max.is_some() {
      self.clauses.push(Clause::Range {
        column,
        min: min.map(Into::into),
        max: max.map(Into::into),
      });
    }
    self
  }

  pub fn visibility(self, visibility: Visibility) -> Self {
    match visibility {
      Visibility::Active => self.is_null("deleted_at"),
      Visibility::DeletedOnly => self.not_null("deleted_at"),
      Visibility::All => self,
    }
  }
}

// ─── Visibility ──────────────────────────────────────────────────────────────

/// Which rows a read may see with respect to soft deletion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
  #[default]
  Active,
  All,
  DeletedOnly,
}


/// Explicit audit flag sent by privileged callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditScope {
  /// Include soft-deleted rows alongside active ones.
  Include,
  /// Only soft-deleted rows.
  Only,
}

impl From<AuditScope> for Visibility {
  fn from(scope: AuditScope) -> Self {
    match scope {
      AuditScope::Include => Self::All,
      AuditScope::Only => Self::DeletedOnly,
    }
  }
}

// ─── Sorting ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
  Asc,
  Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
  pub column:    &'static str,
  pub direction: SortDirection,
}

/// The sortable columns of one entity.
pub trait SortField: Copy + FromStr {
  const DEFAULT: Self;

  fn column(self) -> &'static str;
}

/// A validated sort request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort<F> {
  pub field:     F,
  pub direction: SortDirection,
}

impl<F: SortField> Sort<F> {
  /// Parse `field`, `+field` or `-field`. Absent means the entity default,
  /// newest first.
  pub fn parse(raw: Option<&str>) -> Result<Self> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
      return Ok(Self { field: F::DEFAULT, direction: SortDirection::Desc });
    };
    let (direction, name) = if let Some(name) = raw.strip_prefix('-') {
      (SortDirection::Desc, name)
    } else {
      (SortDirection::Asc, raw.strip_prefix('+').unwrap_or(raw))
    };
    let field = F::from_str(name)
      .map_err(|_| Error::validation(format!("cannot sort by {name:?}")))?;
    Ok(Self { field, direction })
  }

  /// The requested order followed by `id` as a tie-breaker.
  pub fn orders(&self) -> Vec<Order> {
    vec![
      Order { column: self.field.column(), direction: self.direction },
      Order { column: "id", direction: self.direction },
    ]
  }
}

// ─── Query & list request ────────────────────────────────────────────────────

/// A fully-built read: predicate, ordering and window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
  pub predicate: Predicate,
  pub order:     Vec<Order>,
  pub skip:      u64,
  pub take:      u64,
}

/// Body of every `PATCH <collection>` listing call.
///
/// Filter fields sit at the top level next to `sort`, `page`, `limit` and
/// `audit`; unknown keys are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListRequest<F> {
  #[serde(flatten)]
  pub filter: F,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub sort:   Option<String>,
  #[serde(flatten)]
  pub page:   PageParams,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub audit:  Option<AuditScope>,
}

impl<F> ListRequest<F> {
  pub fn new(filter: F) -> Self {
    Self { filter, sort: None, page: PageParams::default(), audit: None }
  }

  pub fn page(mut self, page: i64, limit: i64) -> Self {
    self.page = PageParams { page: Some(page), limit: Some(limit) };
    self
  }

  pub fn sort(mut self, sort: impl Into<String>) -> Self {
    self.sort = Some(sort.into());
    self
  }

  pub fn audit(mut self, scope: AuditScope) -> Self {
    self.audit = Some(scope);
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString)]
  #[strum(serialize_all = "snake_case")]
  enum Field {
    CreatedAt,
    Title,
  }

  impl SortField for Field {
    const DEFAULT: Self = Self::CreatedAt;

    fn column(self) -> &'static str {
      match self {
        Self::CreatedAt => "created_at",
        Self::Title => "title",
      }
    }
  }

  #[test]
  fn absent_fields_add_no_clauses() {
    let p = Predicate::new()
      .eq_opt("author_id", None::<Uuid>)
      .nullable("bio", None::<Option<String>>)
      .contains("title", None)
      .range("created_at", None::<i64>, None);
    assert!(p.clauses().is_empty());
  }

  #[test]
  fn nullable_null_matches_null() {
    let p = Predicate::new().nullable("comment_id", Some(None::<Uuid>));
    assert_eq!(p.clauses(), &[Clause::IsNull("comment_id")]);
  }

  #[test]
  fn one_sided_range() {
    let p = Predicate::new().range("size_bytes", Some(10_i64), None);
    assert_eq!(p.clauses(), &[Clause::Range {
      column: "size_bytes",
      min:    Some(Value::Integer(10)),
      max:    None,
    }]);
  }

  #[test]
  fn visibility_controls_deleted_at() {
    assert_eq!(
      Predicate::new().visibility(Visibility::Active).clauses(),
      &[Clause::IsNull("deleted_at")]
    );
    assert_eq!(
      Predicate::new().visibility(Visibility::DeletedOnly).clauses(),
      &[Clause::NotNull("deleted_at")]
    );
    assert!(Predicate::new().visibility(Visibility::All).clauses().is_empty());
  }

  #[test]
  fn sort_defaults_to_newest_first() {
    let sort = Sort::<Field>::parse(None).unwrap();
    assert_eq!(sort.field, Field::CreatedAt);
    assert_eq!(sort.direction, SortDirection::Desc);
  }

  #[test]
  fn sort_prefixes_pick_direction() {
    let desc = Sort::<Field>::parse(Some("-title")).unwrap();
    assert_eq!((desc.field, desc.direction), (Field::Title, SortDirection::Desc));
    let asc = Sort::<Field>::parse(Some("+title")).unwrap();
    assert_eq!(asc.direction, SortDirection::Asc);
    let bare = Sort::<Field>::parse(Some("title")).unwrap();
    assert_eq!(bare.direction, SortDirection::Asc);
  }

  #[test]
  fn unknown_sort_field_is_rejected() {
    let err = Sort::<Field>::parse(Some("password_hash; drop table")).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
  }

  #[test]
  fn sort_breaks_ties_by_id() {
    let orders = Sort::<Field>::parse(Some("title")).unwrap().orders();
    assert_eq!(orders[1].column, "id");
  }

  #[derive(Debug, Default, Deserialize)]
  struct TitleFilter {
    title: Option<String>,
  }

  #[test]
  fn list_request_reads_flat_body_and_ignores_unknown_keys() {
    let req: ListRequest<TitleFilter> = serde_json::from_value(serde_json::json!({
      "title": "rust",
      "page": 2,
      "limit": 5,
      "sort": "-created_at",
      "audit": "include",
      "mystery": true,
    }))
    .unwrap();
    assert_eq!(req.filter.title.as_deref(), Some("rust"));
    assert_eq!(req.page.page, Some(2));
    assert_eq!(req.page.limit, Some(5));
    assert_eq!(req.audit, Some(AuditScope::Include));
  }
}
