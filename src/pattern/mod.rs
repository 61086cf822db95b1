//! Pattern configuration and the fiber curve generator.

pub(crate) mod config;
pub(crate) mod curves;
