//! # Storage Module
//!
//! Durable registry persistence using redb.
//!
//! Uses redb embedded database for:
//! - ACID transactions
//! - Crash safety (copy-on-write B-trees)
//! - MVCC (concurrent readers, single writer)

mod redb_registry;

pub use redb_registry::RedbRegistry;
