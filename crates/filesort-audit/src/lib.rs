//! filesort audit - Operation records and failure reasons
//!
//! Provides:
//! - `AuditLogger`: Non-fatal facade over `IAuditStore`
//! - `ReasonCode`: Structured codes for why an operation failed

pub mod logger;
pub mod reason;

pub use logger::AuditLogger;
pub use reason::ReasonCode;
