//! fibertwist renders deterministic twisted-fiber patterns.
//!
//! A [`Scene`] describes the pattern, its palette, the two layers it is composited with and the
//! export settings. Rendering is a pure function of the scene and an animation time:
//!
//! - Load and validate a [`Scene`]
//! - Prepare layer images with [`prepare_layer_images`]
//! - Render a frame with [`render_frame`], or drive an [`AnimationDriver`] through
//!   [`render_sequence`] into a [`FrameSink`]
//! - Encode with [`encode_frame`] / [`write_frame`]
#![forbid(unsafe_code)]

mod animation;
mod color;
mod encode;
mod foundation;
mod pattern;
mod render;
mod scene;

pub use crate::foundation::core::{Affine, AspectRatio, BezPath, Canvas, Point, Rect, Vec2};
pub use crate::foundation::error::{FiberError, FiberResult, RenderWarning};
pub use crate::foundation::rng::{SeededRandom, hash01};

pub use crate::color::extract::{
    CentroidInit, DEFAULT_CLUSTER_COUNT, ExtractOpts, color_distance, extract_dominant_colors,
    extract_palette, kmeans, sample_colors,
};
pub use crate::color::model::{
    Hsl, Interpolation, Rgb, darkest, hsl_to_rgb, lerp_rgb, parse_color, rgb_to_hsl,
    try_parse_color,
};
pub use crate::color::palette::{
    MAX_PALETTE_COLORS, MIN_PALETTE_COLORS, Palette, RANDOM_PALETTE_POOL, random_palette,
};

pub use crate::pattern::config::{
    AnimationKind, AnimationSpec, MAX_DENSITY, MAX_PATTERN_BLUR_PX, PatternConfig,
};
pub use crate::pattern::curves::{
    FiberStroke, SEGMENTS_PER_WIDTH, VIRTUAL_WIDTH_FACTOR, generate_fibers, line_thickness,
    segment_count, time_offset,
};

pub use crate::scene::assets::{
    PreparedImage, PreparedImages, decode_image, load_layer_image, prepare_layer_images,
};
pub use crate::scene::layer::{
    BackgroundLayer, Gradient, GradientStop, ImageSource, LayerBase, LayerImage, LayerSet,
    LayerSlot, PatternLayer, ResolvedStop,
};
pub use crate::scene::model::Scene;

pub use crate::animation::driver::{
    AnimationDriver, ManualScheduler, TICK_DELTA, TickId, TickScheduler,
};

pub use crate::render::backend::{BackendKind, FrameRGBA, RenderBackend, create_backend};
pub use crate::render::cpu::CpuBackend;
pub use crate::render::passes::{PassBackend, execute_plan};
pub use crate::render::pipeline::{
    RenderGate, RenderOutput, export_scene, render_frame, render_scene, render_sequence,
};
pub use crate::render::plan::{
    CompositeOp, CompositePass, DrawOp, OffscreenPass, Pass, PassFx, PixelFormat, RenderPlan,
    ScenePass, SurfaceDesc, SurfaceId, compile_frame, pattern_transform,
};

pub use crate::encode::export::{
    EncodedFormat, EncodedImage, ExportFormat, JPEG_QUALITY, encode_frame, write_frame,
};
pub use crate::encode::sink::{FrameSink, InMemorySink, PngSequenceSink, SinkConfig};
