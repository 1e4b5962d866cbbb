//! Warden adapters - Infrastructure implementations
//!
//! This crate contains concrete implementations of the ports defined in
//! warden-core: the SQLite-backed state store and the hosts-file blocking
//! engine, plus in-memory doubles for tests.

pub mod hosts;
pub mod sqlite;
pub mod testing;

pub use hosts::HostsRuleEngine;
pub use sqlite::SqliteStateStore;
pub use testing::{FailingRuleEngine, StubRuleEngine};
