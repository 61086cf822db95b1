//! Scene description: layers, layer images and the full render request.

pub(crate) mod assets;
pub(crate) mod layer;
pub(crate) mod model;
