//! [`SqliteStore`]: the SQLite implementation of [`Store`].

use std::path::Path;

use agora_core::{
  filter::{Predicate, Query},
  schema::Entity,
  store::{Batch, Store, Write},
};
use rusqlite::{
  OptionalExtension as _, functions::FunctionFlags, params_from_iter, types::Value as SqlValue,
};
use tracing::debug;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::decode_row,
  render::{self, Statement},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An Agora store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        // SQLite's `lower()` only folds ASCII.
        conn.create_scalar_function(
          render::FOLD,
          1,
          FunctionFlags::SQLITE_DETERMINISTIC | FunctionFlags::SQLITE_UTF8,
          |ctx| Ok(ctx.get::<Option<String>>(0)?.map(|s| s.to_lowercase())),
        )?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a query and return each row's raw values, `width` columns wide.
  async fn fetch(&self, stmt: Statement, width: usize) -> Result<Vec<Vec<SqlValue>>> {
    debug!(sql = %stmt.sql, params = stmt.params.len(), "query");
    let rows = self
      .conn
      .call(move |conn| {
        let mut prepared = conn.prepare_cached(&stmt.sql)?;
        let rows = prepared
          .query_map(params_from_iter(stmt.params.iter()), |row| {
            (0..width).map(|i| row.get::<_, SqlValue>(i)).collect()
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  /// Run one statement and return the number of rows it changed.
  async fn execute(&self, stmt: Statement) -> Result<usize> {
    debug!(sql = %stmt.sql, params = stmt.params.len(), "execute");
    let changed = self
      .conn
      .call(move |conn| {
        let mut prepared = conn.prepare_cached(&stmt.sql)?;
        Ok(prepared.execute(params_from_iter(stmt.params.iter()))?)
      })
      .await?;
    Ok(changed)
  }

  fn decode<E: Entity>(raws: Vec<SqlValue>) -> agora_core::Result<E> {
    E::from_row(decode_row(E::COLUMNS, raws)?)
  }
}

// ─── Store impl ──────────────────────────────────────────────────────────────

impl Store for SqliteStore {
  async fn find_many<'a, E: Entity>(&'a self, query: &'a Query) -> agora_core::Result<Vec<E>> {
    let stmt = render::select(E::TABLE, E::COLUMNS, query);
    let rows = self.fetch(stmt, E::COLUMNS.len()).await?;
    rows.into_iter().map(Self::decode::<E>).collect()
  }

  async fn count<'a, E: Entity>(&'a self, predicate: &'a Predicate) -> agora_core::Result<u64> {
    let stmt = render::count(E::TABLE, predicate);
    debug!(sql = %stmt.sql, params = stmt.params.len(), "count");
    let records: i64 = self
      .conn
      .call(move |conn| {
        let mut prepared = conn.prepare_cached(&stmt.sql)?;
        Ok(prepared.query_row(params_from_iter(stmt.params.iter()), |row| row.get(0))?)
      })
      .await
      .map_err(Error::from)?;
    Ok(records.max(0).unsigned_abs())
  }

  async fn find_first<'a, E: Entity>(
    &'a self,
    predicate: &'a Predicate,
  ) -> agora_core::Result<Option<E>> {
    let stmt = render::select_first(E::TABLE, E::COLUMNS, predicate);
    let width = E::COLUMNS.len();
    debug!(sql = %stmt.sql, params = stmt.params.len(), "find first");
    let raw: Option<Vec<SqlValue>> = self
      .conn
      .call(move |conn| {
        let mut prepared = conn.prepare_cached(&stmt.sql)?;
        Ok(
          prepared
            .query_row(params_from_iter(stmt.params.iter()), |row| {
              (0..width).map(|i| row.get::<_, SqlValue>(i)).collect()
            })
            .optional()?,
        )
      })
      .await
      .map_err(Error::from)?;
    raw.map(Self::decode::<E>).transpose()
  }

  async fn create<E: Entity>(&self, entity: E) -> agora_core::Result<E> {
    self.execute(render::insert(E::TABLE, &entity.to_row())).await?;
    Ok(entity)
  }

  async fn update<E: Entity>(&self, entity: E) -> agora_core::Result<E> {
    let changed = self
      .execute(render::update(E::TABLE, entity.id(), &entity.to_row()))
      .await?;
    if changed == 0 {
      return Err(Error::RowNotFound { noun: E::NOUN, id: entity.id() }.into());
    }
    Ok(entity)
  }

  async fn delete<E: Entity>(&self, id: Uuid) -> agora_core::Result<bool> {
    Ok(self.execute(render::delete(E::TABLE, id)).await? > 0)
  }

  async fn commit(&self, batch: Batch) -> agora_core::Result<()> {
    let writes: Vec<(Statement, Option<(&'static str, Uuid)>)> = batch
      .into_writes()
      .into_iter()
      .map(|write| match write {
        Write::Insert { table, row } => (render::insert(table, &row), None),
        Write::Update { table, id, row } => (render::update(table, id, &row), Some((table, id))),
      })
      .collect();
    debug!(writes = writes.len(), "commit batch");

    let missing = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for (stmt, target) in &writes {
          let changed = tx.execute(&stmt.sql, params_from_iter(stmt.params.iter()))?;
          if changed == 0 {
            if let Some(target) = target {
              // Dropping the transaction rolls it back.
              return Ok(Some(*target));
            }
          }
        }
        tx.commit()?;
        Ok(None)
      })
      .await
      .map_err(Error::from)?;

    match missing {
      Some((table, id)) => Err(Error::RowNotFound { noun: table, id }.into()),
      None => Ok(()),
    }
  }
}
