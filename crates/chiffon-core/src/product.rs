//! Product records.
//!
//! A `ProductRecord` is the durable entity behind registration: enough
//! information for a later updater pass to locate a program on disk and
//! decide what it is.

use crate::{ProductName, ProductVersion, RegistryError, SequenceNumber, VendorName};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A registered product.
///
/// Records are keyed by install path in the registry; the sequence number
/// is assigned at first registration and kept across upserts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Display name of the product.
    pub name: ProductName,
    /// Version string as reported at registration time.
    pub version: ProductVersion,
    /// Vendor, if known.
    pub vendor: Option<VendorName>,
    /// Absolute path of the registered binary.
    pub install_path: PathBuf,
    /// Logical registration counter value.
    pub sequence: SequenceNumber,
}

impl ProductRecord {
    /// Create a record, validating the install path.
    ///
    /// The path must be absolute: the registry exists so an updater can
    /// find the binary later, and a relative path would depend on a
    /// working directory that no longer exists by then. The path must
    /// also be valid UTF-8 since it doubles as the storage key.
    pub fn new(
        name: ProductName,
        version: ProductVersion,
        vendor: Option<VendorName>,
        install_path: PathBuf,
        sequence: SequenceNumber,
    ) -> Result<Self, RegistryError> {
        validate_install_path(&install_path)?;
        Ok(Self {
            name,
            version,
            vendor,
            install_path,
            sequence,
        })
    }

    /// The install path as a string slice.
    ///
    /// Infallible for constructed records; validation rejected non-UTF-8
    /// paths at creation time.
    #[must_use]
    pub fn install_path_str(&self) -> &str {
        self.install_path.to_str().unwrap_or_default()
    }
}

/// Validate an install path: absolute and valid UTF-8.
pub(crate) fn validate_install_path(path: &Path) -> Result<(), RegistryError> {
    if !path.is_absolute() {
        return Err(RegistryError::RelativePath {
            path: path.to_path_buf(),
        });
    }
    if path.to_str().is_none() {
        return Err(RegistryError::NonUtf8Path {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
