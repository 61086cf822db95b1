use crate::{
    color::model::Rgb,
    foundation::core::{Affine, BezPath, Canvas, Point, Rect, Vec2},
    foundation::error::RenderWarning,
    pattern::curves::generate_fibers,
    render::blur::radius_for_sigma,
    scene::assets::PreparedImages,
    scene::layer::{LayerSlot, ResolvedStop},
    scene::model::Scene,
};

/// Pattern scale that shows the six-width virtual canvas at its natural size.
pub const PATTERN_SCALE_FACTOR: f64 = 0.3;
/// Horizontal pan range, in frame widths, reached at `offset_x = ±1`.
pub const PAN_WIDTHS: f64 = 2.5;

#[derive(Clone, Debug)]
/// Backend-agnostic render plan for a single frame.
///
/// A plan consists of:
/// - surface declarations (`surfaces`)
/// - a sequence of passes (`passes`)
/// - a declared final surface (`final_surface`)
pub struct RenderPlan {
    pub canvas: Canvas,
    pub surfaces: Vec<SurfaceDesc>,
    pub passes: Vec<Pass>,
    pub final_surface: SurfaceId,
}

#[derive(Clone, Debug)]
/// A single pass in a [`RenderPlan`].
pub enum Pass {
    Scene(ScenePass),
    Offscreen(OffscreenPass),
    Composite(CompositePass),
}

#[derive(Clone, Debug)]
/// Draw operations into a surface.
///
/// Without `clear_to_transparent` the ops accumulate over what the surface already holds.
pub struct ScenePass {
    pub target: SurfaceId,
    pub ops: Vec<DrawOp>,
    pub clear_to_transparent: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Identifier for a render surface declared in [`RenderPlan::surfaces`].
pub struct SurfaceId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Supported pixel formats for render surfaces.
pub enum PixelFormat {
    Rgba8Premul,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Surface declaration: dimensions + pixel format.
pub struct SurfaceDesc {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

#[derive(Clone, Debug)]
/// Run a post-processing effect producing a new surface from an input surface.
pub struct OffscreenPass {
    pub input: SurfaceId,
    pub output: SurfaceId,
    pub fx: PassFx,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PassFx {
    /// Separable gaussian blur over the whole surface.
    Blur { radius_px: u32, sigma: f32 },
}

#[derive(Clone, Debug)]
/// Composite surfaces into a target surface.
pub struct CompositePass {
    pub target: SurfaceId,
    pub ops: Vec<CompositeOp>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CompositeOp {
    /// Premultiplied source-over.
    Over { src: SurfaceId, opacity: f32 },
}

#[derive(Clone, Debug, PartialEq)]
/// Draw operation emitted by the compiler.
pub enum DrawOp {
    FillRect {
        rect: Rect,
        color: Rgb,
        opacity: f32,
    },
    /// Linear gradient between `start` and `end`, padded with the end colors.
    FillLinearGradient {
        rect: Rect,
        start: Point,
        end: Point,
        stops: Vec<ResolvedStop>,
        opacity: f32,
    },
    /// The prepared image of `slot`; `transform` maps image pixels onto the frame.
    Image {
        slot: LayerSlot,
        transform: Affine,
        opacity: f32,
    },
    /// Round-capped, round-joined polyline stroke.
    Stroke {
        path: BezPath,
        transform: Affine,
        color: Rgb,
        width: f64,
        alpha: f32,
    },
}

/// Transform from pattern space into the frame: rotate and scale about the frame center, then
/// pan.
pub fn pattern_transform(scene: &Scene) -> Affine {
    let canvas = scene.canvas();
    let center = canvas.center().to_vec2();
    let p = &scene.pattern;
    let scale = p.pattern_scale * PATTERN_SCALE_FACTOR;
    let pan = Vec2::new(
        p.offset_x * canvas.width_f64() * PAN_WIDTHS,
        p.offset_y * canvas.height_f64(),
    );

    Affine::translate(center)
        * Affine::rotate(p.pattern_rotate_deg.to_radians())
        * Affine::scale(scale)
        * Affine::translate(-center)
        * Affine::translate(pan)
}

/// Compile one frame of `scene` at animation `time`.
///
/// Surface 0 receives the background color and every visible layer's fill and image, in layer
/// order. The pattern is drawn on a scratch surface, blurred when requested, and composited
/// over surface 0 right after its owning layer. Layers whose image is missing from `images`
/// are drawn without it.
#[tracing::instrument(skip(scene, images))]
pub fn compile_frame(
    scene: &Scene,
    images: &PreparedImages,
    time: f64,
) -> (RenderPlan, Vec<RenderWarning>) {
    let canvas = scene.canvas();
    let bounds = canvas.bounds();
    let frame_desc = SurfaceDesc {
        width: canvas.width,
        height: canvas.height,
        format: PixelFormat::Rgba8Premul,
    };
    let final_surface = SurfaceId(0);
    let mut surfaces = vec![frame_desc.clone()];
    let mut passes = Vec::new();
    let mut warnings = Vec::new();

    let mut backdrop = Vec::new();
    if !scene.transparent {
        backdrop.push(DrawOp::FillRect {
            rect: bounds,
            color: scene.background_color,
            opacity: 1.0,
        });
    }
    passes.push(Pass::Scene(ScenePass {
        target: final_surface,
        ops: backdrop,
        clear_to_transparent: true,
    }));

    for slot in scene.layers.visible() {
        let base = scene.layers.base(slot);
        let opacity = base.opacity.clamp(0.0, 1.0) as f32;
        let mut ops = Vec::new();

        if slot == LayerSlot::Background {
            let bg = &scene.layers.background;
            if bg.paints_gradient() {
                let (stops, stop_warnings) = bg.gradient.resolved_stops();
                warnings.extend(stop_warnings);
                let (start, end) = bg.gradient.axis(canvas);
                ops.push(DrawOp::FillLinearGradient {
                    rect: bounds,
                    start,
                    end,
                    stops,
                    opacity,
                });
            } else {
                ops.push(DrawOp::FillRect {
                    rect: bounds,
                    color: bg.color,
                    opacity,
                });
            }
        }

        if let (Some(layer_image), Some(prepared)) = (&base.image, images.get(slot)) {
            let dst = layer_image.contain_rect(prepared.width, prepared.height, canvas);
            let transform = Affine::translate(dst.origin().to_vec2())
                * Affine::scale_non_uniform(
                    dst.width() / f64::from(prepared.width.max(1)),
                    dst.height() / f64::from(prepared.height.max(1)),
                );
            ops.push(DrawOp::Image {
                slot,
                transform,
                opacity,
            });
        }

        if !ops.is_empty() {
            passes.push(Pass::Scene(ScenePass {
                target: final_surface,
                ops,
                clear_to_transparent: false,
            }));
        }

        if scene.layers.owns_pattern(slot) {
            let scratch = SurfaceId(surfaces.len() as u32);
            surfaces.push(frame_desc.clone());
            passes.extend(pattern_passes(scene, time, base.opacity, scratch, final_surface));
        }
    }

    tracing::debug!(
        passes = passes.len(),
        surfaces = surfaces.len(),
        warnings = warnings.len(),
        "compiled frame"
    );
    (
        RenderPlan {
            canvas,
            surfaces,
            passes,
            final_surface,
        },
        warnings,
    )
}

fn pattern_passes(
    scene: &Scene,
    time: f64,
    layer_opacity: f64,
    scratch: SurfaceId,
    target: SurfaceId,
) -> Vec<Pass> {
    let transform = pattern_transform(scene);
    let ops = generate_fibers(
        &scene.pattern,
        &scene.palette,
        scene.canvas(),
        time,
        layer_opacity,
        scene.interpolation,
    )
    .into_iter()
    .map(|fiber| DrawOp::Stroke {
        path: fiber.path,
        transform,
        color: fiber.color,
        width: fiber.width,
        alpha: fiber.alpha,
    })
    .collect();

    let mut out = vec![Pass::Scene(ScenePass {
        target: scratch,
        ops,
        clear_to_transparent: true,
    })];

    let sigma = scene.pattern.pattern_blur_px;
    let canvas = scene.canvas();
    let radius_px = radius_for_sigma(sigma, canvas.width.max(canvas.height));
    if radius_px > 0 {
        out.push(Pass::Offscreen(OffscreenPass {
            input: scratch,
            output: scratch,
            fx: PassFx::Blur {
                radius_px,
                sigma: sigma as f32,
            },
        }));
    }

    out.push(Pass::Composite(CompositePass {
        target,
        ops: vec![CompositeOp::Over {
            src: scratch,
            opacity: 1.0,
        }],
    }));
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/plan.rs"]
mod tests;
