#![forbid(unsafe_code)]

//! Durable layout preferences.
//!
//! A [`LayoutStore`] reads and writes the three preferences of one layout
//! target (item order, hidden set, layout mode) through any
//! [`KeyValueStore`] backend. [`MemoryStore`] serves tests and browser-like
//! hosts; [`JsonFileStore`] persists to disk for desktop hosts.

pub mod backend;
pub mod file;
pub mod keys;
pub mod layout_store;
pub mod legacy;

pub use backend::{KeyValueStore, MemoryStore, StoreError};
pub use file::{FILE_FORMAT_VERSION, JsonFileStore};
pub use keys::{DEFAULT_NAMESPACE, KeyKind, LEGACY_ORDER_KEY, StorageKeys};
pub use layout_store::{LayoutStore, ResetReport, parse_id_list, parse_mode};
pub use legacy::LegacyAliases;
