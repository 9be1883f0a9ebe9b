//! Database module: pool handling, query construction, row mapping and the
//! repository API.
//!
//! - `pool`: connection pool setup and migrations.
//! - `query`: the feed Query Builder and the update field tables.
//! - `model`: raw rows as returned by queries.
//! - `mapper`: rows into external entities.
//! - `repo`: one function per operation; each acquires a single pooled
//!   connection for its duration.
//!
//! Callers import from `showcase::db`; the repository API is re-exported.

pub mod mapper;
pub mod model;
pub mod pool;
pub mod query;
pub mod repo;

pub use pool::{init_pool, run_migrations, Pool};
pub use query::FeedQuery;
pub use repo::*;
