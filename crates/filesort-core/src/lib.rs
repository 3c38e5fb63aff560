//! filesort core - Domain logic and business rules
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `FileDescriptor`, `ClassificationResult`, `MigrationPlan`,
//!   `OperationRecord`, `RunSummary`, `OrganizerEvent`
//! - **Port definitions** - Traits for adapters: `IClassifier`, `IAuditStore`,
//!   `INotificationSink`
//! - **Configuration** - YAML config loading and validation
//!
//! # Architecture
//!
//! The domain module contains pure business logic with no I/O.
//! Ports define trait interfaces that adapter crates implement.
//! Filesystem work lives in `filesort-organize`.

pub mod config;
pub mod domain;
pub mod ports;
