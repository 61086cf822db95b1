use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::color::model::{Rgb, is_hex6, try_parse_color};
use crate::foundation::core::{Canvas, Point, Rect};
use crate::foundation::error::{FiberError, FiberResult, RenderWarning};

/// Identifies one of the two layers. Layers always draw in [`LayerSlot::DRAW_ORDER`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerSlot {
    Background,
    Pattern,
}

impl LayerSlot {
    pub const DRAW_ORDER: [LayerSlot; 2] = [Self::Background, Self::Pattern];

    pub fn name(self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::Pattern => "pattern",
        }
    }
}

impl std::fmt::Display for LayerSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for LayerSlot {
    type Err = FiberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "background" => Ok(Self::Background),
            "pattern" => Ok(Self::Pattern),
            other => Err(FiberError::validation(format!("unknown layer \"{other}\""))),
        }
    }
}

/// Where a layer image comes from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSource {
    /// File path; relative paths resolve against the scene's assets root.
    Path(PathBuf),
    /// Encoded bytes supplied programmatically.
    #[serde(skip)]
    Bytes(Arc<[u8]>),
}

/// An image attached to a layer, fitted with "contain" semantics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerImage {
    pub source: ImageSource,
    #[serde(default = "default_image_scale")]
    pub scale: f64,
    /// Fraction of the frame width.
    #[serde(default)]
    pub offset_x: f64,
    /// Fraction of the frame height.
    #[serde(default)]
    pub offset_y: f64,
}

fn default_image_scale() -> f64 {
    1.0
}

impl LayerImage {
    pub fn new(source: ImageSource) -> Self {
        Self {
            source,
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    /// Destination rectangle for an `image_width x image_height` bitmap.
    ///
    /// The frame scaled by `scale` is the bounding box; the axis that would distort the image's
    /// aspect ratio shrinks. The box is centered, then shifted by the fractional offsets.
    pub fn contain_rect(&self, image_width: u32, image_height: u32, canvas: Canvas) -> Rect {
        let (w, h) = (canvas.width_f64(), canvas.height_f64());
        let image_aspect = f64::from(image_width) / f64::from(image_height.max(1));
        let canvas_aspect = w / h;

        let mut draw_w = w * self.scale;
        let mut draw_h = h * self.scale;
        if image_aspect > canvas_aspect {
            draw_h = draw_w / image_aspect;
        } else {
            draw_w = draw_h * image_aspect;
        }

        let x = (w - draw_w) / 2.0 + self.offset_x * w;
        let y = (h - draw_h) / 2.0 + self.offset_y * h;
        Rect::new(x, y, x + draw_w, y + draw_h)
    }
}

/// Fields every layer has.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayerBase {
    pub visible: bool,
    /// Multiplies every draw performed for this layer.
    pub opacity: f64,
    pub image: Option<LayerImage>,
}

impl Default for LayerBase {
    fn default() -> Self {
        Self {
            visible: true,
            opacity: 1.0,
            image: None,
        }
    }
}

impl LayerBase {
    pub fn validate(&self, slot: LayerSlot) -> FiberResult<()> {
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(FiberError::validation(format!(
                "{slot} layer opacity must be in [0, 1]"
            )));
        }
        if let Some(img) = &self.image
            && !(img.scale.is_finite() && img.scale > 0.0)
        {
            return Err(FiberError::validation(format!(
                "{slot} layer image scale must be > 0"
            )));
        }
        Ok(())
    }
}

/// One anchor of a linear gradient. The color is kept as entered so it can be edited back.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub color: String,
    /// Percent along the gradient axis, nominally `[0, 100]`.
    pub position: f64,
}

impl GradientStop {
    pub fn new(color: impl Into<String>, position: f64) -> Self {
        Self {
            color: color.into(),
            position,
        }
    }
}

/// A stop ready to paint: offset in `[0, 1]`, color resolved.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedStop {
    pub offset: f64,
    pub color: Rgb,
}

pub const MIN_GRADIENT_STOPS: usize = 2;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Gradient {
    /// Direction of the gradient axis, degrees clockwise from +x.
    pub angle_deg: f64,
    pub stops: Vec<GradientStop>,
}

impl Default for Gradient {
    fn default() -> Self {
        Self {
            angle_deg: 0.0,
            stops: vec![
                GradientStop::new("#000000", 0.0),
                GradientStop::new("#FFFFFF", 100.0),
            ],
        }
    }
}

impl Gradient {
    pub fn validate(&self) -> FiberResult<()> {
        if !self.angle_deg.is_finite() {
            return Err(FiberError::validation("gradient angle must be finite"));
        }
        if self.stops.len() < MIN_GRADIENT_STOPS {
            return Err(FiberError::validation(format!(
                "gradient needs at least {MIN_GRADIENT_STOPS} stops, got {}",
                self.stops.len()
            )));
        }
        Ok(())
    }

    /// Stops in position order with colors and positions made paintable.
    ///
    /// The sort is stable, a missing (NaN) position counts as 0, positions clamp to `[0, 100]`,
    /// and any color that is not `#RRGGBB` paints black and yields a warning.
    pub fn resolved_stops(&self) -> (Vec<ResolvedStop>, Vec<RenderWarning>) {
        let position = |s: &GradientStop| {
            if s.position.is_nan() {
                0.0
            } else {
                s.position
            }
        };

        let mut sorted: Vec<&GradientStop> = self.stops.iter().collect();
        sorted.sort_by(|a, b| position(a).total_cmp(&position(b)));

        let mut warnings = Vec::new();
        let stops = sorted
            .into_iter()
            .enumerate()
            .map(|(index, stop)| {
                let color = if is_hex6(&stop.color) {
                    try_parse_color(&stop.color).unwrap_or(Rgb::BLACK)
                } else {
                    tracing::warn!(index, color = %stop.color, "invalid gradient stop color");
                    warnings.push(RenderWarning::InvalidGradientStop {
                        index,
                        color: stop.color.clone(),
                    });
                    Rgb::BLACK
                };
                ResolvedStop {
                    offset: position(stop).clamp(0.0, 100.0) / 100.0,
                    color,
                }
            })
            .collect();
        (stops, warnings)
    }

    /// Gradient axis end points: a line through the frame center along `angle_deg`, reaching
    /// half the frame width horizontally and half the height vertically.
    pub fn axis(&self, canvas: Canvas) -> (Point, Point) {
        let rad = self.angle_deg.to_radians();
        let c = canvas.center();
        let dx = rad.cos() * canvas.width_f64() / 2.0;
        let dy = rad.sin() * canvas.height_f64() / 2.0;
        (Point::new(c.x - dx, c.y - dy), Point::new(c.x + dx, c.y + dy))
    }

    /// Append a white stop at the midpoint. Returns its index.
    pub fn add_stop(&mut self) -> usize {
        self.stops.push(GradientStop::new("#FFFFFF", 50.0));
        self.stops.len() - 1
    }

    pub fn remove_stop(&mut self, index: usize) -> FiberResult<GradientStop> {
        if self.stops.len() <= MIN_GRADIENT_STOPS {
            return Err(FiberError::validation(format!(
                "a gradient keeps at least {MIN_GRADIENT_STOPS} stops"
            )));
        }
        self.check_index(index)?;
        Ok(self.stops.remove(index))
    }

    pub fn set_stop_color(&mut self, index: usize, color: impl Into<String>) -> FiberResult<()> {
        self.check_index(index)?;
        self.stops[index].color = color.into();
        Ok(())
    }

    pub fn set_stop_position(&mut self, index: usize, position: f64) -> FiberResult<()> {
        self.check_index(index)?;
        self.stops[index].position = position;
        Ok(())
    }

    /// Set the axis angle, wrapped into `[0, 360)`.
    pub fn set_angle(&mut self, angle_deg: f64) -> FiberResult<()> {
        if !angle_deg.is_finite() {
            return Err(FiberError::validation("gradient angle must be finite"));
        }
        self.angle_deg = angle_deg.rem_euclid(360.0);
        Ok(())
    }

    fn check_index(&self, index: usize) -> FiberResult<()> {
        if index >= self.stops.len() {
            return Err(FiberError::validation(format!(
                "gradient stop {index} out of range ({} stops)",
                self.stops.len()
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackgroundLayer {
    #[serde(flatten)]
    pub base: LayerBase,
    pub color: Rgb,
    pub use_gradient: bool,
    pub gradient: Gradient,
}

impl Default for BackgroundLayer {
    fn default() -> Self {
        Self {
            base: LayerBase::default(),
            color: Rgb::BLACK,
            use_gradient: false,
            gradient: Gradient::default(),
        }
    }
}

impl BackgroundLayer {
    /// Whether the fill is painted as a gradient rather than the flat color.
    pub fn paints_gradient(&self) -> bool {
        self.use_gradient && self.gradient.stops.len() >= MIN_GRADIENT_STOPS
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatternLayer {
    #[serde(flatten)]
    pub base: LayerBase,
}

/// The fixed pair of layers plus which one draws the fiber pattern.
///
/// Ownership is a single field, so exactly one layer owns the pattern at all times.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayerSet {
    pub background: BackgroundLayer,
    pub pattern: PatternLayer,
    pattern_owner: LayerSlot,
}

impl Default for LayerSet {
    fn default() -> Self {
        Self {
            background: BackgroundLayer::default(),
            pattern: PatternLayer::default(),
            pattern_owner: LayerSlot::Pattern,
        }
    }
}

impl LayerSet {
    pub fn pattern_owner(&self) -> LayerSlot {
        self.pattern_owner
    }

    pub fn owns_pattern(&self, slot: LayerSlot) -> bool {
        self.pattern_owner == slot
    }

    /// Give the pattern to `slot`, taking it from whichever layer had it.
    pub fn move_pattern_to(&mut self, slot: LayerSlot) {
        if self.pattern_owner != slot {
            tracing::debug!(from = %self.pattern_owner, to = %slot, "moving pattern");
        }
        self.pattern_owner = slot;
    }

    pub fn base(&self, slot: LayerSlot) -> &LayerBase {
        match slot {
            LayerSlot::Background => &self.background.base,
            LayerSlot::Pattern => &self.pattern.base,
        }
    }

    pub fn base_mut(&mut self, slot: LayerSlot) -> &mut LayerBase {
        match slot {
            LayerSlot::Background => &mut self.background.base,
            LayerSlot::Pattern => &mut self.pattern.base,
        }
    }

    pub fn set_image(&mut self, slot: LayerSlot, image: Option<LayerImage>) {
        self.base_mut(slot).image = image;
    }

    /// Visible layers in draw order.
    pub fn visible(&self) -> impl Iterator<Item = LayerSlot> + '_ {
        LayerSlot::DRAW_ORDER
            .into_iter()
            .filter(|&slot| self.base(slot).visible)
    }

    pub fn validate(&self) -> FiberResult<()> {
        for slot in LayerSlot::DRAW_ORDER {
            self.base(slot).validate(slot)?;
        }
        self.background.gradient.validate()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/layer.rs"]
mod tests;
