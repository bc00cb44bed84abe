//! redb-backed registry persistence.
//!
//! Two tables: `products` maps the install path to a postcard-encoded
//! [`ProductRecord`]; `meta` carries the schema version and the next
//! sequence number. Saves are transactional, so a crashed save leaves the
//! previous registry intact.

use crate::{ProductRecord, ProductRegistry, RegistryError, RegistryStore, SequenceNumber};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;

/// Products table: install path -> postcard-encoded record.
const PRODUCTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("products");

/// Meta table: named counters.
const META_TABLE: TableDefinition<&str, u64> = TableDefinition::new("meta");

const SCHEMA_VERSION_KEY: &str = "schema_version";
const NEXT_SEQUENCE_KEY: &str = "next_sequence";

/// Current database schema version.
const SCHEMA_VERSION: u64 = 1;

/// A product registry persisted in a redb database file.
pub struct RedbRegistry {
    db: Database,
}

impl RedbRegistry {
    /// Open a registry database, creating it if missing.
    ///
    /// Rejects databases written by a different schema version.
    pub fn open(path: &Path) -> Result<Self, RegistryError> {
        let db = Database::create(path)?;
        let store = Self { db };
        store.ensure_schema()?;
        Ok(store)
    }

    /// Load the full registry from the database.
    pub fn load(&self) -> Result<ProductRegistry, RegistryError> {
        let txn = self.db.begin_read()?;

        let meta = match txn.open_table(META_TABLE) {
            Ok(table) => table,
            // A foreign or empty database without our tables reads as empty
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(ProductRegistry::new()),
            Err(err) => return Err(err.into()),
        };
        let schema = meta
            .get(SCHEMA_VERSION_KEY)?
            .map(|guard| guard.value())
            .unwrap_or(SCHEMA_VERSION);
        if schema != SCHEMA_VERSION {
            return Err(RegistryError::UnsupportedSchema(schema));
        }
        let next_sequence = meta.get(NEXT_SEQUENCE_KEY)?.map(|guard| guard.value());

        let mut registry = ProductRegistry::new();
        match txn.open_table(PRODUCTS_TABLE) {
            Ok(products) => {
                for entry in products.iter()? {
                    let (_path, value) = entry?;
                    let record: ProductRecord = postcard::from_bytes(value.value())?;
                    registry.import_record(record);
                }
            }
            Err(redb::TableError::TableDoesNotExist(_)) => {}
            Err(err) => return Err(err.into()),
        }

        if let Some(sequence) = next_sequence {
            registry.advance_sequence_to(SequenceNumber(sequence));
        }

        Ok(registry)
    }

    /// Replace the stored registry with the given one, atomically.
    pub fn save(&self, registry: &ProductRegistry) -> Result<(), RegistryError> {
        let txn = self.db.begin_write()?;
        {
            txn.delete_table(PRODUCTS_TABLE)?;
            let mut products = txn.open_table(PRODUCTS_TABLE)?;
            for record in registry.products() {
                let key = record.install_path.to_str().ok_or_else(|| {
                    RegistryError::NonUtf8Path {
                        path: record.install_path.clone(),
                    }
                })?;
                let value = postcard::to_stdvec(record)?;
                products.insert(key, value.as_slice())?;
            }

            let mut meta = txn.open_table(META_TABLE)?;
            meta.insert(SCHEMA_VERSION_KEY, SCHEMA_VERSION)?;
            meta.insert(NEXT_SEQUENCE_KEY, registry.next_sequence().value())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Initialize meta on first open; verify schema on later opens.
    fn ensure_schema(&self) -> Result<(), RegistryError> {
        let txn = self.db.begin_write()?;
        {
            let mut meta = txn.open_table(META_TABLE)?;
            let existing = meta.get(SCHEMA_VERSION_KEY)?.map(|guard| guard.value());
            match existing {
                Some(version) if version != SCHEMA_VERSION => {
                    return Err(RegistryError::UnsupportedSchema(version));
                }
                Some(_) => {}
                None => {
                    meta.insert(SCHEMA_VERSION_KEY, SCHEMA_VERSION)?;
                    meta.insert(NEXT_SEQUENCE_KEY, SequenceNumber::first().value())?;
                }
            }
            txn.open_table(PRODUCTS_TABLE)?;
        }
        txn.commit()?;
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ProductName, ProductVersion};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn abs(path: &str) -> PathBuf {
        if cfg!(windows) {
            PathBuf::from(format!("C:{}", path.replace('/', "\\")))
        } else {
            PathBuf::from(path)
        }
    }

    fn name(value: &str) -> ProductName {
        ProductName::new(value).expect("valid name")
    }

    fn version(value: &str) -> ProductVersion {
        ProductVersion::new(value).expect("valid version")
    }

    #[test]
    fn open_creates_database_file() {
        let tmp = TempDir::new().expect("temp dir");
        let db_path = tmp.path().join("products.redb");

        let store = RedbRegistry::open(&db_path);
        assert!(store.is_ok());
        assert!(db_path.exists());
    }

    #[test]
    fn fresh_database_loads_empty() {
        let tmp = TempDir::new().expect("temp dir");
        let store = RedbRegistry::open(&tmp.path().join("products.redb")).expect("open succeeds");

        let registry = store.load().expect("load succeeds");
        assert_eq!(registry.product_count(), 0);
        assert_eq!(registry.next_sequence(), SequenceNumber::first());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let tmp = TempDir::new().expect("temp dir");
        let db_path = tmp.path().join("products.redb");
        let install_path = abs("/opt/demo/demo");

        let mut registry = ProductRegistry::new();
        registry
            .register(name("Demo"), version("1.0"), None, install_path.clone())
            .expect("registration succeeds");

        let store = RedbRegistry::open(&db_path).expect("open succeeds");
        store.save(&registry).expect("save succeeds");
        drop(store);

        // Reopen and verify the data survived
        let store = RedbRegistry::open(&db_path).expect("reopen succeeds");
        let loaded = store.load().expect("load succeeds");
        assert_eq!(loaded.product_count(), 1);
        assert_eq!(
            loaded.lookup(&install_path).map(|r| r.name.as_str()),
            Some("Demo")
        );
        assert_eq!(loaded.next_sequence(), registry.next_sequence());
    }

    #[test]
    fn save_replaces_stale_records() {
        let tmp = TempDir::new().expect("temp dir");
        let db_path = tmp.path().join("products.redb");
        let store = RedbRegistry::open(&db_path).expect("open succeeds");

        let mut registry = ProductRegistry::new();
        let stale = abs("/opt/stale");
        registry
            .register(name("Stale"), version("1.0"), None, stale.clone())
            .expect("registration succeeds");
        store.save(&registry).expect("save succeeds");

        registry.unregister(&stale);
        registry
            .register(name("Fresh"), version("1.0"), None, abs("/opt/fresh"))
            .expect("registration succeeds");
        store.save(&registry).expect("save succeeds");

        let loaded = store.load().expect("load succeeds");
        assert_eq!(loaded.product_count(), 1);
        assert!(loaded.lookup(&stale).is_none());
    }

    #[test]
    fn sequence_counter_survives_unregister() {
        let tmp = TempDir::new().expect("temp dir");
        let db_path = tmp.path().join("products.redb");
        let store = RedbRegistry::open(&db_path).expect("open succeeds");

        let mut registry = ProductRegistry::new();
        registry
            .register(name("A"), version("1.0"), None, abs("/opt/a"))
            .expect("registration succeeds");
        registry
            .register(name("B"), version("1.0"), None, abs("/opt/b"))
            .expect("registration succeeds");
        registry.unregister(&abs("/opt/a"));
        registry.unregister(&abs("/opt/b"));
        store.save(&registry).expect("save succeeds");

        // Records are gone but the counter must not rewind
        let loaded = store.load().expect("load succeeds");
        assert_eq!(loaded.product_count(), 0);
        assert_eq!(loaded.next_sequence(), SequenceNumber(3));
    }
}
