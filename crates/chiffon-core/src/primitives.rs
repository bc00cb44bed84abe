//! Core primitive types.
//!
//! Validated newtypes for the text fields of a product record, plus the
//! logical registration counter. Validation happens at construction so the
//! rest of the crate can treat these as well-formed: non-empty and free of
//! line breaks (the agent feed format is line-oriented).

use crate::RegistryError;
use serde::{Deserialize, Serialize};

/// Validate a text field: non-empty after trimming, no line breaks.
fn validate_field(value: &str, field: &'static str) -> Result<(), RegistryError> {
    if value.trim().is_empty() {
        return Err(RegistryError::EmptyField { field });
    }
    if value.contains('\n') || value.contains('\r') {
        return Err(RegistryError::EmbeddedLineBreak { field });
    }
    Ok(())
}

// =============================================================================
// PRODUCT NAME
// =============================================================================

/// Display name of a registered product.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductName(String);

impl ProductName {
    /// Create a validated product name.
    pub fn new(value: impl Into<String>) -> Result<Self, RegistryError> {
        let value = value.into();
        validate_field(&value, "product name")?;
        Ok(Self(value))
    }

    /// The name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// PRODUCT VERSION
// =============================================================================

/// Version string of a registered product.
///
/// Versions are opaque text. The registry does not order or compare them;
/// that is the updater's concern, not registration's.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductVersion(String);

impl ProductVersion {
    /// Create a validated version string.
    pub fn new(value: impl Into<String>) -> Result<Self, RegistryError> {
        let value = value.into();
        validate_field(&value, "product version")?;
        Ok(Self(value))
    }

    /// Placeholder version for programs registered without one.
    #[must_use]
    pub fn unknown() -> Self {
        Self(String::from("0.0"))
    }

    /// The version as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// VENDOR NAME
// =============================================================================

/// Vendor of a registered product.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VendorName(String);

impl VendorName {
    /// Create a validated vendor name.
    pub fn new(value: impl Into<String>) -> Result<Self, RegistryError> {
        let value = value.into();
        validate_field(&value, "vendor name")?;
        Ok(Self(value))
    }

    /// The vendor as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VendorName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// SEQUENCE NUMBER
// =============================================================================

/// Logical registration counter.
///
/// Monotonic integer counter, not wall clock, so registry contents stay
/// deterministic. A record keeps its sequence number for its lifetime;
/// numbers are never reused.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct SequenceNumber(pub u64);

impl SequenceNumber {
    /// The first sequence number handed out by an empty registry.
    #[must_use]
    pub fn first() -> Self {
        Self(1)
    }

    /// The next sequence number, saturating at the maximum.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Raw counter value.
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// TESTS
// =============================================================================
