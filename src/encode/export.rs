//! Still-image export: PNG (lossless) and JPEG at quality 95.

use std::path::Path;

use anyhow::Context;
use image::ImageEncoder as _;
use serde::{Deserialize, Serialize};

use crate::foundation::error::{FiberError, FiberResult, RenderWarning};
use crate::render::backend::FrameRGBA;

/// JPEG quality on the encoder's 1..=100 scale.
pub const JPEG_QUALITY: u8 = 95;

/// Requested export encoding. Anything unrecognized is kept verbatim and exported as PNG.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
    Unsupported(String),
}

impl ExportFormat {
    /// The encoding that is actually produced.
    pub fn effective(&self) -> EncodedFormat {
        match self {
            Self::Jpeg => EncodedFormat::Jpeg,
            Self::Png | Self::Unsupported(_) => EncodedFormat::Png,
        }
    }
}

impl From<String> for ExportFormat {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Self::Png,
            "jpg" | "jpeg" => Self::Jpeg,
            _ => Self::Unsupported(s),
        }
    }
}

impl From<ExportFormat> for String {
    fn from(f: ExportFormat) -> Self {
        match f {
            ExportFormat::Png => "png".to_owned(),
            ExportFormat::Jpeg => "jpg".to_owned(),
            ExportFormat::Unsupported(s) => s,
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_owned()))
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Png => f.write_str("png"),
            Self::Jpeg => f.write_str("jpg"),
            Self::Unsupported(s) => f.write_str(s),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EncodedFormat {
    Png,
    Jpeg,
}

impl EncodedFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

#[derive(Clone, Debug)]
pub struct EncodedImage {
    pub format: EncodedFormat,
    pub bytes: Vec<u8>,
    /// Set when the requested format was replaced by PNG.
    pub warning: Option<RenderWarning>,
}

/// Encode a premultiplied frame.
///
/// PNG keeps transparency (straight alpha). JPEG has no alpha channel, so translucent pixels are
/// flattened over black.
#[tracing::instrument(skip(frame), fields(width = frame.width, height = frame.height))]
pub fn encode_frame(frame: &FrameRGBA, format: &ExportFormat) -> FiberResult<EncodedImage> {
    let expected = (frame.width as usize)
        .saturating_mul(frame.height as usize)
        .saturating_mul(4);
    if frame.data.len() != expected {
        return Err(FiberError::encode("frame byte length does not match its size"));
    }

    let warning = match format {
        ExportFormat::Unsupported(requested) => {
            tracing::warn!(requested = %requested, "unsupported export format, using PNG");
            Some(RenderWarning::UnsupportedExport {
                requested: requested.clone(),
            })
        }
        _ => None,
    };

    let encoded = format.effective();
    let mut bytes = Vec::new();
    match encoded {
        EncodedFormat::Png => {
            let rgba = frame.to_straight_rgba8();
            image::codecs::png::PngEncoder::new(&mut bytes)
                .write_image(&rgba, frame.width, frame.height, image::ExtendedColorType::Rgba8)
                .context("encode png")?;
        }
        EncodedFormat::Jpeg => {
            let rgb = flatten_premul_over_black_to_rgb8(&frame.data);
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY)
                .encode(&rgb, frame.width, frame.height, image::ExtendedColorType::Rgb8)
                .context("encode jpeg")?;
        }
    }

    tracing::debug!(format = encoded.extension(), bytes = bytes.len(), "encoded frame");
    Ok(EncodedImage {
        format: encoded,
        bytes,
        warning,
    })
}

/// Encode `frame` and write it to `path`, creating parent directories.
pub fn write_frame(
    frame: &FrameRGBA,
    format: &ExportFormat,
    path: &Path,
) -> FiberResult<EncodedImage> {
    let encoded = encode_frame(frame, format)?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output directory '{}'", parent.display()))?;
    }
    std::fs::write(path, &encoded.bytes)
        .with_context(|| format!("write '{}'", path.display()))?;
    Ok(encoded)
}

fn flatten_premul_over_black_to_rgb8(src_premul: &[u8]) -> Vec<u8> {
    // Premultiplied color over opaque black is the premultiplied color itself.
    let mut out = Vec::with_capacity(src_premul.len() / 4 * 3);
    for px in src_premul.chunks_exact(4) {
        out.extend_from_slice(&px[..3]);
    }
    out
}

/// Inverse of premultiplication, rounding to nearest.
pub(crate) fn unpremultiply_px(px: [u8; 4]) -> [u8; 4] {
    let a = u16::from(px[3]);
    match a {
        0 => [0, 0, 0, 0],
        255 => px,
        _ => {
            let un = |c: u8| -> u8 {
                let v = (u32::from(c) * 255 + u32::from(a) / 2) / u32::from(a);
                v.min(255) as u8
            };
            [un(px[0]), un(px[1]), un(px[2]), px[3]]
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/export.rs"]
mod tests;
