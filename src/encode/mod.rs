//! Frame export: still images and frame sequences.

pub(crate) mod export;
pub(crate) mod sink;
