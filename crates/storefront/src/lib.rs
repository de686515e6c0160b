//! Medina Storefront library.
//!
//! The I/O edge around `medina-core`: configuration, the catalog HTTP
//! client, durable cart storage, order submission, and the session
//! controller that ties them to the checkout flow.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod orders;
pub mod session;
pub mod storage;
pub mod store;
pub mod task;

pub use catalog::{CatalogClient, CatalogError};
pub use config::{ConfigError, StorefrontConfig};
pub use error::{StorefrontError, add_breadcrumb};
pub use orders::{OrderClient, OrderReceipt, SubmitError};
pub use session::{PendingSubmission, StorefrontSession};
pub use storage::{CartStorage, FileCartStorage, MemoryCartStorage, StorageError};
pub use store::{CartCommand, CartStore};
pub use task::ViewTask;
