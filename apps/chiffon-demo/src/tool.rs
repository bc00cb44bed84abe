//! The updater tool.
//!
//! The collaborator the demo drives: construct with a configuration
//! carrying the logging flag, `initialize` (boolean success, never
//! throws), then `register_program` with the program's own binary path.
//! Registration records a durable product entry in the per-user registry
//! so a later updater pass can locate the program.

use chiffon_core::storage::RedbRegistry;
use chiffon_core::{
    ProductName, ProductRecord, ProductRegistry, ProductVersion, RegistryError, RegistryStore,
    SequenceNumber, VendorName,
};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// File name of the registry database inside the registry directory.
pub const REGISTRY_FILE_NAME: &str = "products.redb";

// =============================================================================
// ERRORS
// =============================================================================

/// Errors surfaced by the updater tool.
#[derive(Debug, Error)]
pub enum ToolError {
    /// An operation ran before a successful `initialize`.
    #[error("updater tool is not initialized")]
    NotInitialized,

    /// No per-user data directory could be determined.
    #[error("no per-user data directory available")]
    NoDataDir,

    /// The program binary to register does not exist.
    #[error("program binary not found: {path}")]
    MissingProgram {
        /// The path that was checked.
        path: PathBuf,
    },

    /// Registry validation, format, or storage failure.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Filesystem failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Updater tool configuration.
///
/// The logging flag mirrors the tool's original boolean constructor
/// argument; the demo leaves it off by default. The registry directory
/// override exists for the CLI and for tests; when unset the tool uses
/// the per-user data directory.
#[derive(Debug, Clone, Default)]
pub struct ToolConfig {
    /// Whether the tool should emit log output.
    pub logging_enabled: bool,
    /// Registry directory override.
    pub registry_dir: Option<PathBuf>,
    /// Product name used when registering the host program. Falls back to
    /// the binary's file stem.
    pub product_name: Option<ProductName>,
    /// Product version used when registering the host program. Falls back
    /// to the unknown placeholder.
    pub product_version: Option<ProductVersion>,
    /// Vendor used when registering the host program.
    pub vendor: Option<VendorName>,
}

impl ToolConfig {
    /// Config with just the logging flag, as the original constructor took.
    #[must_use]
    pub fn with_logging(logging_enabled: bool) -> Self {
        Self {
            logging_enabled,
            ..Self::default()
        }
    }
}

// =============================================================================
// UPDATER TOOL
// =============================================================================

/// Loaded registry state behind a successful `initialize`.
struct ToolState {
    store: RedbRegistry,
    registry: ProductRegistry,
    registry_path: PathBuf,
}

/// The registration facility the demo consumes.
pub struct UpdaterTool {
    config: ToolConfig,
    state: Option<ToolState>,
}

impl UpdaterTool {
    /// Create an uninitialized tool.
    #[must_use]
    pub fn new(config: ToolConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Whether log output was requested at construction.
    #[must_use]
    pub fn logging_enabled(&self) -> bool {
        self.config.logging_enabled
    }

    /// Whether `initialize` has succeeded.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Path of the opened registry database, if initialized.
    #[must_use]
    pub fn registry_path(&self) -> Option<&Path> {
        self.state.as_ref().map(|s| s.registry_path.as_path())
    }

    /// Resolve the registry directory from config or the per-user default.
    pub fn registry_dir(&self) -> Result<PathBuf, ToolError> {
        if let Some(dir) = &self.config.registry_dir {
            return Ok(dir.clone());
        }
        let dirs = ProjectDirs::from("io.github", "chiffonupdater", "ChiffonUpdater")
            .ok_or(ToolError::NoDataDir)?;
        Ok(dirs.data_dir().to_path_buf())
    }

    /// Prepare the registry and open the store.
    ///
    /// Returns `false` on any failure. The boolean contract is part of the
    /// collaborator interface the demo consumes; failures are logged, not
    /// thrown.
    pub fn initialize(&mut self) -> bool {
        match self.open_state() {
            Ok(state) => {
                debug!(
                    registry = %state.registry_path.display(),
                    products = state.registry.product_count(),
                    "updater tool initialized"
                );
                self.state = Some(state);
                true
            }
            Err(err) => {
                warn!(error = %err, "updater tool initialization failed");
                false
            }
        }
    }

    /// Register a program binary, deriving product identity from the tool
    /// configuration (name falls back to the binary's file stem, version
    /// to the unknown placeholder).
    pub fn register_program(&mut self, path: &Path) -> Result<SequenceNumber, ToolError> {
        let name = match &self.config.product_name {
            Some(name) => name.clone(),
            None => product_name_from_path(path)?,
        };
        let version = self
            .config
            .product_version
            .clone()
            .unwrap_or_else(ProductVersion::unknown);
        let vendor = self.config.vendor.clone();
        self.register_program_as(path, name, version, vendor)
    }

    /// Register a program binary under an explicit product identity.
    pub fn register_program_as(
        &mut self,
        path: &Path,
        name: ProductName,
        version: ProductVersion,
        vendor: Option<VendorName>,
    ) -> Result<SequenceNumber, ToolError> {
        let state = self.state.as_mut().ok_or(ToolError::NotInitialized)?;

        if !path.exists() {
            return Err(ToolError::MissingProgram {
                path: path.to_path_buf(),
            });
        }
        // Canonicalize so the same binary always maps to the same record
        let canonical = std::fs::canonicalize(path)?;

        let sequence = state.registry.register(name, version, vendor, canonical)?;
        state.store.save(&state.registry)?;
        debug!(sequence = sequence.value(), "program registered");
        Ok(sequence)
    }

    /// Remove a program's registration. Returns the removed record.
    pub fn unregister_program(
        &mut self,
        path: &Path,
    ) -> Result<Option<ProductRecord>, ToolError> {
        let state = self.state.as_mut().ok_or(ToolError::NotInitialized)?;

        // The binary may already be gone; fall back to the path as given
        let key = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        let removed = state.registry.unregister(&key);
        if removed.is_some() {
            state.store.save(&state.registry)?;
        }
        Ok(removed)
    }

    /// Snapshot of all registered products in deterministic order.
    pub fn products(&self) -> Result<Vec<ProductRecord>, ToolError> {
        let state = self.state.as_ref().ok_or(ToolError::NotInitialized)?;
        Ok(state.registry.products().cloned().collect())
    }

    /// Number of registered products.
    pub fn product_count(&self) -> Result<usize, ToolError> {
        let state = self.state.as_ref().ok_or(ToolError::NotInitialized)?;
        Ok(state.registry.product_count())
    }

    fn open_state(&self) -> Result<ToolState, ToolError> {
        let dir = self.registry_dir()?;
        std::fs::create_dir_all(&dir)?;
        let registry_path = dir.join(REGISTRY_FILE_NAME);
        let store = RedbRegistry::open(&registry_path)?;
        let registry = store.load()?;
        Ok(ToolState {
            store,
            registry,
            registry_path,
        })
    }
}

/// Derive a product name from a binary path's file stem.
pub(crate) fn product_name_from_path(path: &Path) -> Result<ProductName, ToolError> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(ProductName::new(stem)?)
}

// =============================================================================
// TESTS
// =============================================================================
