//! # Product Registry
//!
//! The deterministic in-memory registry that backs the updater tool.
//!
//! This module implements the `RegistryStore` trait. All data structures
//! use `BTreeMap` for deterministic ordering, and the registration counter
//! is a logical clock rather than wall time.

use crate::product::validate_install_path;
use crate::{ProductName, ProductRecord, ProductVersion, RegistryError, SequenceNumber, VendorName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// =============================================================================
// REGISTRYSTORE TRAIT
// =============================================================================

/// Core registry operations.
///
/// One record per install path. Registration is an upsert: registering a
/// path that is already present replaces the descriptive fields but keeps
/// the original sequence number.
pub trait RegistryStore {
    /// Insert or update the product registered at the given path.
    /// Returns the record's sequence number.
    fn register(
        &mut self,
        name: ProductName,
        version: ProductVersion,
        vendor: Option<VendorName>,
        install_path: PathBuf,
    ) -> Result<SequenceNumber, RegistryError>;

    /// Look up the record registered at a path.
    fn lookup(&self, install_path: &Path) -> Option<&ProductRecord>;

    /// Remove and return the record registered at a path.
    fn unregister(&mut self, install_path: &Path) -> Option<ProductRecord>;

    /// All records in deterministic (install path) order.
    fn products(&self) -> impl Iterator<Item = &ProductRecord>;

    /// Number of registered products.
    fn product_count(&self) -> usize;

    /// The sequence number the next fresh registration would receive.
    fn next_sequence(&self) -> SequenceNumber;
}

// =============================================================================
// REGISTRY IMPLEMENTATION
// =============================================================================

/// The in-memory product registry.
///
/// Uses `BTreeMap` exclusively for deterministic ordering.
#[derive(Debug, Clone)]
pub struct ProductRegistry {
    /// Record storage: install path -> record.
    products: BTreeMap<PathBuf, ProductRecord>,

    /// Next sequence number to hand out.
    next_sequence: SequenceNumber,
}

impl Default for ProductRegistry {
    fn default() -> Self {
        Self {
            products: BTreeMap::new(),
            next_sequence: SequenceNumber::first(),
        }
    }
}

impl ProductRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a path is registered.
    #[must_use]
    pub fn contains(&self, install_path: &Path) -> bool {
        self.products.contains_key(install_path)
    }

    /// Import a record with its original sequence number.
    ///
    /// Used when rebuilding a registry from persistent storage. Advances
    /// the sequence counter past the imported record so later fresh
    /// registrations never reuse a number.
    pub fn import_record(&mut self, record: ProductRecord) {
        if record.sequence >= self.next_sequence {
            self.next_sequence = record.sequence.next();
        }
        self.products.insert(record.install_path.clone(), record);
    }

    /// Advance the sequence counter to at least the given value.
    ///
    /// Used when a persisted counter is further along than the records
    /// imply (records were unregistered after being assigned numbers).
    pub(crate) fn advance_sequence_to(&mut self, sequence: SequenceNumber) {
        if sequence > self.next_sequence {
            self.next_sequence = sequence;
        }
    }
}

impl RegistryStore for ProductRegistry {
    fn register(
        &mut self,
        name: ProductName,
        version: ProductVersion,
        vendor: Option<VendorName>,
        install_path: PathBuf,
    ) -> Result<SequenceNumber, RegistryError> {
        validate_install_path(&install_path)?;

        // Upsert keeps the original sequence number
        if let Some(existing) = self.products.get_mut(&install_path) {
            existing.name = name;
            existing.version = version;
            existing.vendor = vendor;
            return Ok(existing.sequence);
        }

        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.next();

        let record = ProductRecord::new(name, version, vendor, install_path.clone(), sequence)?;
        self.products.insert(install_path, record);

        Ok(sequence)
    }

    fn lookup(&self, install_path: &Path) -> Option<&ProductRecord> {
        self.products.get(install_path)
    }

    fn unregister(&mut self, install_path: &Path) -> Option<ProductRecord> {
        self.products.remove(install_path)
    }

    fn products(&self) -> impl Iterator<Item = &ProductRecord> {
        self.products.values()
    }

    fn product_count(&self) -> usize {
        self.products.len()
    }

    fn next_sequence(&self) -> SequenceNumber {
        self.next_sequence
    }
}

// =============================================================================
// SERIALIZATION SUPPORT
// =============================================================================

/// Serializable representation of the registry for persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializableRegistry {
    pub products: Vec<ProductRecord>,
    pub next_sequence: SequenceNumber,
}

impl From<&ProductRegistry> for SerializableRegistry {
    fn from(registry: &ProductRegistry) -> Self {
        Self {
            products: registry.products.values().cloned().collect(),
            next_sequence: registry.next_sequence,
        }
    }
}

impl From<SerializableRegistry> for ProductRegistry {
    fn from(sr: SerializableRegistry) -> Self {
        let mut registry = ProductRegistry::new();
        for record in sr.products {
            registry.import_record(record);
        }
        // Persisted counter wins if it is further along
        if sr.next_sequence > registry.next_sequence {
            registry.next_sequence = sr.next_sequence;
        }
        registry
    }
}

// =============================================================================
// TESTS
// =============================================================================
