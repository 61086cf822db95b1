use crate::foundation::error::{FiberError, FiberResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Output raster dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> FiberResult<Self> {
        if width == 0 || height == 0 {
            return Err(FiberError::validation("canvas dimensions must be > 0"));
        }
        Ok(Self { width, height })
    }

    pub fn width_f64(self) -> f64 {
        f64::from(self.width)
    }

    pub fn height_f64(self) -> f64 {
        f64::from(self.height)
    }

    pub fn center(self) -> Point {
        Point::new(self.width_f64() / 2.0, self.height_f64() / 2.0)
    }

    pub fn bounds(self) -> Rect {
        Rect::new(0.0, 0.0, self.width_f64(), self.height_f64())
    }

    pub fn byte_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }
}

/// Export aspect ratio. Each ratio maps to one fixed pixel size.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "3:4")]
    Portrait,
    #[serde(rename = "9:16")]
    Tall,
    #[serde(rename = "16:9")]
    Wide,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 4] = [Self::Square, Self::Portrait, Self::Tall, Self::Wide];

    pub fn canvas(self) -> Canvas {
        let (width, height) = match self {
            Self::Square => (1600, 1600),
            Self::Portrait => (1200, 1600),
            Self::Tall => (900, 1600),
            Self::Wide => (1600, 900),
        };
        Canvas { width, height }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Portrait => "3:4",
            Self::Tall => "9:16",
            Self::Wide => "16:9",
        }
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for AspectRatio {
    type Err = FiberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.label() == s.trim())
            .ok_or_else(|| {
                FiberError::validation(format!(
                    "unknown aspect ratio \"{s}\" (expected 1:1, 3:4, 9:16 or 16:9)"
                ))
            })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
