use serde::{Deserialize, Serialize};

use crate::foundation::error::{FiberError, FiberResult};

/// Upper bound on the number of fiber lines.
pub const MAX_DENSITY: u32 = 100;
/// Upper bound on the pattern blur radius in pixels.
pub const MAX_PATTERN_BLUR_PX: f64 = 20.0;

/// Motion applied to the fibers while animating.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationKind {
    None,
    /// Twist amplitude ripples along each line.
    Wave,
    /// The twist rotation spins uniformly.
    Rotation,
    /// Line thickness breathes.
    #[default]
    Pulse,
    /// Rotation increases along each line.
    Flow,
}

impl AnimationKind {
    /// Whether `time` feeds into the geometry at all.
    pub fn is_animated(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl std::str::FromStr for AnimationKind {
    type Err = FiberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "wave" => Ok(Self::Wave),
            "rotation" => Ok(Self::Rotation),
            "pulse" => Ok(Self::Pulse),
            "flow" => Ok(Self::Flow),
            other => Err(FiberError::validation(format!(
                "unknown animation type \"{other}\""
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnimationSpec {
    /// Whether the driver advances `time`. Off means a still at the current `time`.
    pub enabled: bool,
    #[serde(rename = "type")]
    pub kind: AnimationKind,
    /// Multiplier on the per-tick time step; must be > 0.
    pub speed: f64,
    /// Current animation time, used for stills.
    pub time: f64,
}

impl AnimationSpec {
    /// True when time-dependent offsets apply to the generated geometry.
    pub fn is_active(&self) -> bool {
        self.enabled && self.kind.is_animated()
    }
}

impl Default for AnimationSpec {
    fn default() -> Self {
        Self {
            enabled: false,
            kind: AnimationKind::Pulse,
            speed: 0.5,
            time: 0.0,
        }
    }
}

/// Immutable numeric description of one fiber pattern.
///
/// Defaults are the "basic pattern" preset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatternConfig {
    pub min_thickness: f64,
    pub max_thickness: f64,
    /// 0 = regular clusters of equal thickness, 1 = independent per-line jitter.
    pub thickness_variation: f64,
    pub bulge: f64,
    pub twist: f64,
    pub twist_rotation: f64,
    /// Number of fiber lines.
    pub density: u32,
    pub graphic_scale: f64,
    pub color_repeats: u32,
    pub opacity: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub pattern_scale: f64,
    pub pattern_rotate_deg: f64,
    pub pattern_blur_px: f64,
    /// Perspective strength coupling x displacement to y position.
    pub axis_x: f64,
    /// Perspective strength coupling y displacement to x position.
    pub axis_y: f64,
    pub seed: f64,
    pub animation: AnimationSpec,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            min_thickness: 0.2,
            max_thickness: 20.0,
            thickness_variation: 0.0,
            bulge: 0.1,
            twist: 0.3,
            twist_rotation: 0.0,
            density: 20,
            graphic_scale: 1.0,
            color_repeats: 1,
            opacity: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            pattern_scale: 1.0,
            pattern_rotate_deg: 0.0,
            pattern_blur_px: 0.0,
            axis_x: 0.0,
            axis_y: 0.0,
            seed: 0.123456,
            animation: AnimationSpec::default(),
        }
    }
}

impl PatternConfig {
    pub fn validate(&self) -> FiberResult<()> {
        fn finite(name: &str, v: f64) -> FiberResult<()> {
            if v.is_finite() {
                Ok(())
            } else {
                Err(FiberError::validation(format!("{name} must be finite")))
            }
        }

        fn within(name: &str, v: f64, lo: f64, hi: f64) -> FiberResult<()> {
            finite(name, v)?;
            if v < lo || v > hi {
                return Err(FiberError::validation(format!(
                    "{name} must be in [{lo}, {hi}], got {v}"
                )));
            }
            Ok(())
        }

        fn at_least(name: &str, v: f64, lo: f64) -> FiberResult<()> {
            within(name, v, lo, f64::MAX)
        }

        at_least("minThickness", self.min_thickness, 0.0)?;
        at_least("maxThickness", self.max_thickness, 0.0)?;
        within("thicknessVariation", self.thickness_variation, 0.0, 1.0)?;
        within("bulge", self.bulge, 0.0, 0.5)?;
        within("twist", self.twist, 0.0, 2.0)?;
        within("twistRotation", self.twist_rotation, 0.0, 1.0)?;
        at_least("graphicScale", self.graphic_scale, 0.0)?;
        within("opacity", self.opacity, 0.0, 1.0)?;
        within("offsetX", self.offset_x, -1.0, 1.0)?;
        within("offsetY", self.offset_y, -1.0, 1.0)?;
        within("patternRotateDeg", self.pattern_rotate_deg, -180.0, 180.0)?;
        within("patternBlurPx", self.pattern_blur_px, 0.0, MAX_PATTERN_BLUR_PX)?;
        finite("axisX", self.axis_x)?;
        finite("axisY", self.axis_y)?;
        finite("seed", self.seed)?;
        at_least("animation.time", self.animation.time, 0.0)?;

        if !(1..=MAX_DENSITY).contains(&self.density) {
            return Err(FiberError::validation(format!(
                "density must be in [1, {MAX_DENSITY}], got {}",
                self.density
            )));
        }
        if self.color_repeats == 0 {
            return Err(FiberError::validation("colorRepeats must be >= 1"));
        }
        if !(self.pattern_scale.is_finite() && self.pattern_scale > 0.0) {
            return Err(FiberError::validation("patternScale must be > 0"));
        }
        if !(self.animation.speed.is_finite() && self.animation.speed > 0.0) {
            return Err(FiberError::validation("animation.speed must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pattern/config.rs"]
mod tests;
