//! Color parsing, RGB/HSL conversion, palettes and dominant-color extraction.

pub(crate) mod extract;
pub(crate) mod model;
pub(crate) mod palette;
