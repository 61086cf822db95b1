use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{FiberError, FiberResult, RenderWarning};
use crate::scene::layer::{ImageSource, LayerImage, LayerSet, LayerSlot};

/// A decoded layer image.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Decoded images keyed by the layer that shows them.
///
/// Built once before a frame is compiled so that rendering never waits on IO.
#[derive(Clone, Debug, Default)]
pub struct PreparedImages {
    background: Option<PreparedImage>,
    pattern: Option<PreparedImage>,
}

impl PreparedImages {
    pub fn get(&self, slot: LayerSlot) -> Option<&PreparedImage> {
        match slot {
            LayerSlot::Background => self.background.as_ref(),
            LayerSlot::Pattern => self.pattern.as_ref(),
        }
    }

    pub fn insert(&mut self, slot: LayerSlot, image: PreparedImage) {
        match slot {
            LayerSlot::Background => self.background = Some(image),
            LayerSlot::Pattern => self.pattern = Some(image),
        }
    }
}

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> FiberResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| FiberError::decode(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Read and decode one layer image. Relative paths resolve against `assets_root`.
pub fn load_layer_image(image: &LayerImage, assets_root: &Path) -> FiberResult<PreparedImage> {
    match &image.source {
        ImageSource::Bytes(bytes) => decode_image(bytes),
        ImageSource::Path(rel) => {
            let path = assets_root.join(rel);
            let bytes = std::fs::read(&path)
                .with_context(|| format!("read image '{}'", path.display()))?;
            decode_image(&bytes)
        }
    }
}

/// Decode the images of every visible layer, background first.
///
/// A layer whose image cannot be read or decoded is left without one and reported as a
/// [`RenderWarning::ImageDecode`]; the other layer is unaffected.
#[tracing::instrument(skip(layers))]
pub fn prepare_layer_images(
    layers: &LayerSet,
    assets_root: &Path,
) -> (PreparedImages, Vec<RenderWarning>) {
    let mut images = PreparedImages::default();
    let mut warnings = Vec::new();

    for slot in layers.visible() {
        let Some(image) = &layers.base(slot).image else {
            continue;
        };
        match load_layer_image(image, assets_root) {
            Ok(prepared) => {
                tracing::debug!(%slot, width = prepared.width, height = prepared.height, "layer image ready");
                images.insert(slot, prepared);
            }
            Err(err) => {
                let message = format!("{err:#}");
                tracing::warn!(%slot, error = %message, "failed to load layer image");
                warnings.push(RenderWarning::ImageDecode { slot, message });
            }
        }
    }

    (images, warnings)
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/assets.rs"]
mod tests;
