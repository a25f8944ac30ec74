//! ordo-core library.
//!
//! # Conventions
//!
//! - **Errors**: store operations return [`error::StoreError`]; expected
//!   outcomes (absent item, out-of-range rank) are variants, not panics.
//! - **Logging**: use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod shift;
pub mod store;

pub use error::{ErrorCode, StoreError, StoreResult};
pub use model::item::{Item, ItemId, ItemPatch, NewItem};
pub use store::{DensityReport, ItemStore};
