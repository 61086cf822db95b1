//! Tick-driven animation time.

pub(crate) mod driver;
