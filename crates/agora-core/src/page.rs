//! Pagination Engine.
//!
//! Turns `page`/`limit` into a skip/take window, runs the data and count
//! queries over the same predicate concurrently, and wraps the result in the
//! `{ pagination, data }` envelope.

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  filter::{Order, Predicate, Query},
  schema::Entity,
  store::Store,
};

pub const DEFAULT_LIMIT: u64 = 20;
pub const MAX_LIMIT: u64 = 100;

/// Raw `page`/`limit` as sent by the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageParams {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub page:  Option<i64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub limit: Option<i64>,
}

/// How an endpoint treats out-of-range `page`/`limit` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMode {
  /// Fall back to defaults and clamp to the ceiling.
  Lenient,
  /// Reject with a validation error.
  Strict,
}

/// A normalised 1-based page and its size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
  pub page:  u64,
  pub limit: u64,
}

impl PageWindow {
  pub fn skip(&self) -> u64 { (self.page - 1).saturating_mul(self.limit) }

  pub fn take(&self) -> u64 { self.limit }
}

impl PageParams {
  pub fn resolve(self, mode: PageMode) -> Result<PageWindow> {
    let page = match self.page {
      None => 1,
      Some(p) if p >= 1 => p as u64,
      Some(p) => match mode {
        PageMode::Lenient => 1,
        PageMode::Strict => {
          return Err(Error::validation(format!("page must be at least 1, got {p}")));
        }
      },
    };

    let limit = match self.limit {
      None => DEFAULT_LIMIT,
      Some(l) if l < 0 => match mode {
        PageMode::Lenient => DEFAULT_LIMIT,
        PageMode::Strict => {
          return Err(Error::validation(format!("limit must not be negative, got {l}")));
        }
      },
      Some(l) if l as u64 > MAX_LIMIT => match mode {
        PageMode::Lenient => MAX_LIMIT,
        PageMode::Strict => {
          return Err(Error::validation(format!(
            "limit must not exceed {MAX_LIMIT}, got {l}"
          )));
        }
      },
      Some(l) => l as u64,
    };

    Ok(PageWindow { page, limit })
  }
}

// ─── Envelope ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
  pub current: u64,
  pub limit:   u64,
  pub records: u64,
  pub pages:   u64,
}

impl Pagination {
  pub fn new(window: PageWindow, records: u64) -> Self {
    let pages = if window.limit == 0 { 0 } else { records.div_ceil(window.limit) };
    Self { current: window.page, limit: window.limit, records, pages }
  }
}

/// The `{ pagination, data }` envelope returned by every listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
  pub pagination: Pagination,
  pub data:       Vec<T>,
}

impl<T> Page<T> {
  pub fn empty(window: PageWindow) -> Self {
    Self { pagination: Pagination::new(window, 0), data: Vec::new() }
  }

  pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
    Page {
      pagination: self.pagination,
      data:       self.data.into_iter().map(f).collect(),
    }
  }
}

/// Run the data and count queries for one page concurrently.
pub async fn paginate<S, E>(
  store: &S,
  predicate: Predicate,
  order: Vec<Order>,
  window: PageWindow,
) -> Result<Page<E>>
where
  S: Store,
  E: Entity,
{
  let query = Query { predicate, order, skip: window.skip(), take: window.take() };
  let (data, records) = futures::try_join!(
    store.find_many::<E>(&query),
    store.count::<E>(&query.predicate),
  )?;
  Ok(Page { pagination: Pagination::new(window, records), data })
}
