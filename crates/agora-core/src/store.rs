//! The `Store` trait and the atomic write batch.
//!
//! The trait is implemented by storage backends (e.g. `agora-store-sqlite`).
//! Providers receive a store handle explicitly; nothing here holds global
//! state.

use std::future::Future;

use uuid::Uuid;

use crate::{
  Result,
  filter::{Predicate, Query},
  schema::{Entity, Row},
};

// ─── Batch ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Write {
  Insert { table: &'static str, row: Row },
  Update { table: &'static str, id: Uuid, row: Row },
}

/// Writes that must land together or not at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
  writes: Vec<Write>,
}

impl Batch {
  pub fn new() -> Self { Self::default() }

  pub fn insert<E: Entity>(mut self, entity: &E) -> Self {
    self.writes.push(Write::Insert { table: E::TABLE, row: entity.to_row() });
    self
  }

  pub fn update<E: Entity>(mut self, entity: &E) -> Self {
    self.writes.push(Write::Update {
      table: E::TABLE,
      id:    entity.id(),
      row:   entity.to_row(),
    });
    self
  }

  pub fn into_writes(self) -> Vec<Write> { self.writes }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the entity store.
///
/// Backends translate their own failures into [`crate::Error`]; in
/// particular a unique-constraint violation must surface as
/// [`crate::Error::Conflict`] so that the loser of a create race sees the
/// same error as a caller caught by the pre-check.
///
/// All methods return `Send` futures so the trait can be used from axum
/// handlers on a multi-threaded runtime.
pub trait Store: Send + Sync {
  /// Rows matching `query.predicate`, ordered and windowed.
  fn find_many<'a, E: Entity>(
    &'a self,
    query: &'a Query,
  ) -> impl Future<Output = Result<Vec<E>>> + Send + 'a;

  fn count<'a, E: Entity>(
    &'a self,
    predicate: &'a Predicate,
  ) -> impl Future<Output = Result<u64>> + Send + 'a;

  fn find_first<'a, E: Entity>(
    &'a self,
    predicate: &'a Predicate,
  ) -> impl Future<Output = Result<Option<E>>> + Send + 'a;

  /// Insert one row and return it unchanged.
  fn create<E: Entity>(&self, entity: E) -> impl Future<Output = Result<E>> + Send + '_;

  /// Overwrite the row with `entity.id()`. Fails with `NotFound` if absent.
  fn update<E: Entity>(&self, entity: E) -> impl Future<Output = Result<E>> + Send + '_;

  /// Remove a row permanently. Returns `false` if there was nothing to remove.
  fn delete<E: Entity>(&self, id: Uuid) -> impl Future<Output = Result<bool>> + Send + '_;

  /// Apply every write in `batch` in one transaction.
  fn commit(&self, batch: Batch) -> impl Future<Output = Result<()>> + Send + '_;
}
