//! # ChiffonUpdater Core
//!
//! The deterministic product registry behind the updater tool.
//!
//! Registering a program records a durable product entry (name, version,
//! vendor, binary path) so a later updater pass can locate the program on
//! disk. This crate owns the registry model, its serialization formats,
//! and the embedded-database persistence. It is pure and synchronous;
//! the CLI, the demo flow, and the local agent endpoint live in the app
//! layer.
//!
//! All collections use `BTreeMap` for deterministic ordering.

mod error;
mod primitives;
mod product;

pub mod formats;
pub mod registry;
pub mod storage;

pub use error::RegistryError;
pub use primitives::{ProductName, ProductVersion, SequenceNumber, VendorName};
pub use product::ProductRecord;
pub use registry::{ProductRegistry, RegistryStore, SerializableRegistry};
