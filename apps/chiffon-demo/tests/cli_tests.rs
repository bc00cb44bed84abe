//! Integration tests for the demo CLI commands.
//!
//! Uses tempfile for testing file-based operations.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use chiffon_demo::cli::{
    cmd_demo, cmd_products, cmd_register, cmd_status, cmd_unregister, CliError,
};
use chiffon_demo::tool::REGISTRY_FILE_NAME;
use chiffon_core::storage::RedbRegistry;
use chiffon_core::{ProductRegistry, RegistryStore};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Create a temporary directory for tests.
fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Create a fake program binary to register.
fn create_binary(dir: &TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, b"\x7fELF fake").unwrap();
    path
}

/// Load the registry the commands wrote.
fn load_registry(registry_dir: &Path) -> ProductRegistry {
    let store = RedbRegistry::open(&registry_dir.join(REGISTRY_FILE_NAME)).unwrap();
    store.load().unwrap()
}

// =============================================================================
// REGISTER COMMAND TESTS
// =============================================================================

#[test]
fn test_register_creates_registry_database() {
    let temp = create_temp_dir();
    let registry_dir = temp.path().join("registry");
    let binary = create_binary(&temp, "app");

    let result = cmd_register(Some(registry_dir.as_path()), &binary, None, None, None);
    assert!(result.is_ok());
    assert!(registry_dir.join(REGISTRY_FILE_NAME).exists());
}

#[test]
fn test_register_records_identity() {
    let temp = create_temp_dir();
    let registry_dir = temp.path().join("registry");
    let binary = create_binary(&temp, "app");

    cmd_register(
        Some(registry_dir.as_path()),
        &binary,
        Some("My App"),
        Some("3.1"),
        Some("Example Corp"),
    )
    .unwrap();

    let registry = load_registry(&registry_dir);
    assert_eq!(registry.product_count(), 1);
    let record = registry.products().next().unwrap();
    assert_eq!(record.name.as_str(), "My App");
    assert_eq!(record.version.as_str(), "3.1");
    assert_eq!(record.vendor.as_ref().map(|v| v.as_str()), Some("Example Corp"));
}

#[test]
fn test_register_derives_name_from_stem() {
    let temp = create_temp_dir();
    let registry_dir = temp.path().join("registry");
    let binary = create_binary(&temp, "stem-name");

    cmd_register(Some(registry_dir.as_path()), &binary, None, None, None).unwrap();

    let registry = load_registry(&registry_dir);
    let record = registry.products().next().unwrap();
    assert_eq!(record.name.as_str(), "stem-name");
    assert_eq!(record.version.as_str(), "0.0");
}

#[test]
fn test_register_missing_binary_fails() {
    let temp = create_temp_dir();
    let registry_dir = temp.path().join("registry");

    let result = cmd_register(
        Some(registry_dir.as_path()),
        &temp.path().join("missing"),
        None,
        None,
        None,
    );
    assert!(result.is_err());
}

#[test]
fn test_register_rejects_invalid_name() {
    let temp = create_temp_dir();
    let registry_dir = temp.path().join("registry");
    let binary = create_binary(&temp, "app");

    let result = cmd_register(Some(registry_dir.as_path()), &binary, Some("   "), None, None);
    assert!(result.is_err());
}

#[test]
fn test_reregister_is_upsert() {
    let temp = create_temp_dir();
    let registry_dir = temp.path().join("registry");
    let binary = create_binary(&temp, "app");

    cmd_register(Some(registry_dir.as_path()), &binary, Some("App"), Some("1.0"), None).unwrap();
    cmd_register(Some(registry_dir.as_path()), &binary, Some("App"), Some("2.0"), None).unwrap();

    let registry = load_registry(&registry_dir);
    assert_eq!(registry.product_count(), 1);
    let record = registry.products().next().unwrap();
    assert_eq!(record.version.as_str(), "2.0");
}

// =============================================================================
// UNREGISTER COMMAND TESTS
// =============================================================================

#[test]
fn test_unregister_removes_record() {
    let temp = create_temp_dir();
    let registry_dir = temp.path().join("registry");
    let binary = create_binary(&temp, "app");

    cmd_register(Some(registry_dir.as_path()), &binary, None, None, None).unwrap();
    cmd_unregister(Some(registry_dir.as_path()), &binary).unwrap();

    let registry = load_registry(&registry_dir);
    assert_eq!(registry.product_count(), 0);
}

#[test]
fn test_unregister_missing_is_ok() {
    let temp = create_temp_dir();
    let registry_dir = temp.path().join("registry");

    let result = cmd_unregister(Some(registry_dir.as_path()), &temp.path().join("never-registered"));
    assert!(result.is_ok());
}

// =============================================================================
// PRODUCTS / STATUS COMMAND TESTS
// =============================================================================

#[test]
fn test_products_empty_registry() {
    let temp = create_temp_dir();
    let registry_dir = temp.path().join("registry");

    assert!(cmd_products(Some(registry_dir.as_path()), false).is_ok());
    assert!(cmd_products(Some(registry_dir.as_path()), true).is_ok());
}

#[test]
fn test_products_after_register() {
    let temp = create_temp_dir();
    let registry_dir = temp.path().join("registry");
    let binary = create_binary(&temp, "app");
    cmd_register(Some(registry_dir.as_path()), &binary, None, None, None).unwrap();

    assert!(cmd_products(Some(registry_dir.as_path()), false).is_ok());
    assert!(cmd_products(Some(registry_dir.as_path()), true).is_ok());
}

#[test]
fn test_status_modes() {
    let temp = create_temp_dir();
    let registry_dir = temp.path().join("registry");

    assert!(cmd_status(Some(registry_dir.as_path()), false).is_ok());
    assert!(cmd_status(Some(registry_dir.as_path()), true).is_ok());
}

#[test]
fn test_status_fails_on_unusable_registry_dir() {
    let temp = create_temp_dir();
    // Occupy the registry directory path with a plain file
    let blocker = temp.path().join("registry");
    std::fs::write(&blocker, b"in the way").unwrap();

    let result = cmd_status(Some(blocker.as_path()), false);
    assert!(matches!(result, Err(CliError::InitFailed)));
}

// =============================================================================
// DEMO COMMAND TESTS
// =============================================================================

#[test]
fn test_demo_registers_the_running_binary() {
    let temp = create_temp_dir();
    let registry_dir = temp.path().join("registry");

    cmd_demo(Some(registry_dir.as_path()), false).unwrap();

    // The demo registered the test binary itself under the demo identity
    let registry = load_registry(&registry_dir);
    assert_eq!(registry.product_count(), 1);
    let record = registry.products().next().unwrap();
    assert_eq!(record.name.as_str(), "Demo");
    assert_eq!(record.version.as_str(), "1.0");
    let own_path = std::fs::canonicalize(std::env::current_exe().unwrap()).unwrap();
    assert_eq!(record.install_path, own_path);
}

#[test]
fn test_demo_succeeds_even_when_registration_is_skipped() {
    let temp = create_temp_dir();
    // Unusable registry dir: initialization fails, demo still exits cleanly
    let blocker = temp.path().join("registry");
    std::fs::write(&blocker, b"in the way").unwrap();

    let result = cmd_demo(Some(blocker.as_path()), false);
    assert!(result.is_ok());
}

#[test]
fn test_demo_is_idempotent() {
    let temp = create_temp_dir();
    let registry_dir = temp.path().join("registry");

    cmd_demo(Some(registry_dir.as_path()), false).unwrap();
    cmd_demo(Some(registry_dir.as_path()), false).unwrap();

    let registry = load_registry(&registry_dir);
    assert_eq!(registry.product_count(), 1);
}
