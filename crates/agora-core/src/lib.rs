//! Domain core of the Agora discussion board: entities, DTOs, filtering,
//! pagination, authorization and the storage abstraction.

pub mod error;
pub mod filter;
pub mod guard;
pub mod model;
pub mod page;
pub mod principal;
pub mod schema;
pub mod sequence;
pub mod store;
pub mod timestamp;

pub use self::error::{Error, ErrorKind, Result};
