//! Fiber line geometry.
//!
//! Each line is sampled as a polyline across a virtual canvas six frame-widths wide, starting
//! two and a half widths left of the frame, so that panning never runs out of pattern.

use std::f64::consts::PI;

use crate::color::model::{Interpolation, Rgb};
use crate::color::palette::Palette;
use crate::foundation::core::{BezPath, Canvas, Point};
use crate::foundation::rng::hash01;
use crate::pattern::config::{AnimationKind, PatternConfig};

/// Virtual canvas width as a multiple of the frame width.
pub const VIRTUAL_WIDTH_FACTOR: f64 = 6.0;
/// Polyline segments per frame width of virtual canvas.
pub const SEGMENTS_PER_WIDTH: f64 = 200.0;
/// Virtual canvas origin, in frame widths left of the frame.
const VIRTUAL_ORIGIN_WIDTHS: f64 = 2.5;
/// Twist and rotation frequencies are calibrated for a virtual canvas two widths wide.
const FREQUENCY_MULTIPLIER: f64 = VIRTUAL_WIDTH_FACTOR / 2.0;
/// Lines sharing one thickness jitter seed when variation is 0.
const MAX_CLUSTER_SIZE: f64 = 50.0;

/// One stroked fiber line, ready to rasterize with round caps and joins.
#[derive(Clone, Debug, PartialEq)]
pub struct FiberStroke {
    pub path: BezPath,
    pub color: Rgb,
    pub width: f64,
    /// Pattern opacity times the owning layer's opacity.
    pub alpha: f32,
}

/// Polyline segment count for one line.
pub fn segment_count() -> usize {
    (VIRTUAL_WIDTH_FACTOR * SEGMENTS_PER_WIDTH).floor() as usize
}

/// Phase offset contributed by the animation at `time`. Zero when animation is inactive.
pub fn time_offset(config: &PatternConfig, time: f64) -> f64 {
    if !config.animation.is_active() {
        return 0.0;
    }
    match config.animation.kind {
        AnimationKind::None => 0.0,
        AnimationKind::Wave => time * 2.0,
        AnimationKind::Rotation => time * PI * 2.0,
        AnimationKind::Pulse => (time * 3.0).sin() * 0.5,
        AnimationKind::Flow => time * 3.0,
    }
}

/// Stroke width of line `index` before any pulse modulation.
///
/// Lines are grouped into clusters of `max(1, floor(50 * (1 - variation)))` consecutive
/// lines; the jitter seed depends on the cluster and, scaled by `variation`, on the line.
pub fn line_thickness(config: &PatternConfig, index: u32) -> f64 {
    let variation = config.thickness_variation;
    let cluster_size = (MAX_CLUSTER_SIZE * (1.0 - variation)).floor().max(1.0);
    let cluster = (f64::from(index) / cluster_size).floor();
    let jitter = hash01(config.seed + cluster + f64::from(index) * variation * 100.0);

    let avg = (config.min_thickness + config.max_thickness) / 2.0;
    let range = (config.max_thickness - config.min_thickness) * variation;
    avg - range / 2.0 + jitter * range
}

/// Generate the `density` fiber strokes of one frame, in draw order.
///
/// Coordinates are in frame space before the pattern transform is applied. The output is a
/// pure function of the arguments.
pub fn generate_fibers(
    config: &PatternConfig,
    palette: &Palette,
    canvas: Canvas,
    time: f64,
    layer_opacity: f64,
    interpolation: Interpolation,
) -> Vec<FiberStroke> {
    let sweep = Sweep::new(config, canvas, time);
    let alpha = (config.opacity * layer_opacity).clamp(0.0, 1.0) as f32;
    let lines = config.density;

    (0..lines)
        .map(|i| {
            let progress = f64::from(i) / f64::from(lines);
            let color = palette.sample(progress, config.color_repeats, interpolation);

            let mut width = line_thickness(config, i);
            if sweep.animating && config.animation.kind == AnimationKind::Pulse {
                width *= 1.0 + sweep.time_offset * 0.2;
            }

            FiberStroke {
                path: sweep.line_path(progress),
                color,
                width: width.max(0.0),
                alpha,
            }
        })
        .collect()
}

/// Per-frame constants shared by every line.
struct Sweep<'a> {
    config: &'a PatternConfig,
    width: f64,
    height: f64,
    virtual_width: f64,
    segments: usize,
    phase: f64,
    animating: bool,
    time_offset: f64,
}

impl<'a> Sweep<'a> {
    fn new(config: &'a PatternConfig, canvas: Canvas, time: f64) -> Self {
        let width = canvas.width_f64();
        Self {
            config,
            width,
            height: canvas.height_f64(),
            virtual_width: width * VIRTUAL_WIDTH_FACTOR,
            segments: segment_count(),
            phase: config.seed * PI * 2.0,
            animating: config.animation.is_active(),
            time_offset: time_offset(config, time),
        }
    }

    fn line_path(&self, progress: f64) -> BezPath {
        let mut path = BezPath::new();
        for j in 0..=self.segments {
            let t = j as f64 / self.segments as f64;
            let p = self.point(progress, t);
            if j == 0 {
                path.move_to(p);
            } else {
                path.line_to(p);
            }
        }
        path
    }

    fn point(&self, progress: f64, t: f64) -> Point {
        let c = self.config;
        let (w, h) = (self.width, self.height);
        let x = t * self.virtual_width - w * VIRTUAL_ORIGIN_WIDTHS;

        let (mut rotation, mut twist) = (c.twist_rotation, c.twist);
        if self.animating {
            match c.animation.kind {
                AnimationKind::Wave => {
                    twist = c.twist + (t * PI * 4.0 + self.time_offset).sin() * 0.3;
                }
                AnimationKind::Rotation => rotation = c.twist_rotation + self.time_offset,
                AnimationKind::Flow => {
                    rotation = c.twist_rotation + t * self.time_offset * 0.3;
                }
                AnimationKind::Pulse | AnimationKind::None => {}
            }
        }

        let normalized_y = progress - 0.5;
        let angle = t * PI * 2.0 * rotation * FREQUENCY_MULTIPLIER + self.phase;
        let rotated = normalized_y * angle.cos();
        let depth = normalized_y * angle.sin();

        let envelope = (t * PI).sin();
        let bulge = envelope * c.bulge * h * c.graphic_scale;
        let twist_wave = (t * PI * twist * FREQUENCY_MULTIPLIER
            + self.phase
            + progress * PI
            + self.time_offset)
            .sin()
            * h
            * 0.15
            * c.graphic_scale;

        let perspective = 1.0 + envelope * 0.3;
        let depth_scale = 1.0 - depth * 0.3;
        let line_offset = rotated * h * 0.4 * depth_scale * c.graphic_scale;
        let mut y = h / 2.0 + line_offset * perspective + bulge + twist_wave;

        // The y warp reads the already-warped x.
        let x_factor = 1.0 + ((y - h / 2.0) / h) * c.axis_x * 0.01;
        let x = (x - w / 2.0) * x_factor + w / 2.0;
        let y_factor = 1.0 + ((x - w / 2.0) / w) * c.axis_y * 0.01;
        y = (y - h / 2.0) * y_factor + h / 2.0;

        Point::new(x, y)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pattern/curves.rs"]
mod tests;
