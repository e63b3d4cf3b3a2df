//! Plugin records for the two supported agents.
//!
//! These are plain data: they derive [`Record`](crate::Record) for compilation
//! and `serde::Deserialize` so they can be decoded from declarative input.

pub mod fluentd;
pub mod syslogng;
