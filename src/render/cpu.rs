use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    color::model::Rgb,
    foundation::core::{Affine, BezPath, Canvas, Point, Rect},
    foundation::error::{FiberError, FiberResult},
    foundation::math::{alpha_to_u8, mul_div255_u8},
    render::backend::{FrameRGBA, RenderBackend},
    render::blur::blur_rgba8_premul,
    render::passes::PassBackend,
    render::plan::{
        CompositeOp, CompositePass, DrawOp, OffscreenPass, PassFx, RenderPlan, ScenePass,
        SurfaceDesc, SurfaceId,
    },
    scene::assets::{PreparedImage, PreparedImages},
    scene::layer::{LayerSlot, ResolvedStop},
};

/// CPU raster backend powered by `vello_cpu`.
///
/// Surfaces persist between frames of the same size; decoded layer images are uploaded once
/// and reused while the prepared bytes stay the same.
#[derive(Default)]
pub struct CpuBackend {
    image_cache: HashMap<LayerSlot, CachedImage>,
    surfaces: HashMap<SurfaceId, CpuSurface>,
}

struct CachedImage {
    source: Arc<Vec<u8>>,
    paint: vello_cpu::Image,
}

struct CpuSurface {
    width: u16,
    height: u16,
    pixmap: vello_cpu::Pixmap,
}

impl CpuSurface {
    fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            pixmap: vello_cpu::Pixmap::new(width, height),
        }
    }
}

impl CpuBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn take_surface(&mut self, id: SurfaceId, role: &str) -> FiberResult<CpuSurface> {
        self.surfaces.remove(&id).ok_or_else(|| {
            FiberError::render(format!("{role} surface {id:?} was not initialized"))
        })
    }

    fn surface(&self, id: SurfaceId, role: &str) -> FiberResult<&CpuSurface> {
        self.surfaces.get(&id).ok_or_else(|| {
            FiberError::render(format!("{role} surface {id:?} was not initialized"))
        })
    }

    fn image_paint_for(
        &mut self,
        slot: LayerSlot,
        images: &PreparedImages,
    ) -> FiberResult<(vello_cpu::Image, f64, f64)> {
        let prepared = images
            .get(slot)
            .ok_or_else(|| FiberError::render(format!("no prepared image for {slot} layer")))?;
        let size = (f64::from(prepared.width), f64::from(prepared.height));

        if let Some(cached) = self.image_cache.get(&slot)
            && Arc::ptr_eq(&cached.source, &prepared.rgba8_premul)
        {
            return Ok((cached.paint.clone(), size.0, size.1));
        }

        let paint = prepared_to_image(prepared)?;
        self.image_cache.insert(
            slot,
            CachedImage {
                source: prepared.rgba8_premul.clone(),
                paint: paint.clone(),
            },
        );
        Ok((paint, size.0, size.1))
    }

    fn render_ops_to(
        &mut self,
        ops: &[DrawOp],
        images: &PreparedImages,
        dst: &mut vello_cpu::Pixmap,
    ) -> FiberResult<()> {
        let mut ctx = vello_cpu::RenderContext::new(dst.width(), dst.height());
        for op in ops {
            self.draw_op(&mut ctx, op, images)?;
        }
        ctx.flush();
        ctx.render_to_pixmap(dst);
        Ok(())
    }

    fn draw_op(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        op: &DrawOp,
        images: &PreparedImages,
    ) -> FiberResult<()> {
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        match op {
            DrawOp::FillRect {
                rect,
                color,
                opacity,
            } => {
                ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.set_paint(solid(*color, 1.0));
                with_opacity(ctx, *opacity, |ctx| ctx.fill_rect(&rect_to_cpu(*rect)));
            }
            DrawOp::FillLinearGradient {
                rect,
                start,
                end,
                stops,
                opacity,
            } => {
                let w = rect.width().round().max(0.0) as u32;
                let h = rect.height().round().max(0.0) as u32;
                if w == 0 || h == 0 {
                    return Ok(());
                }
                let bytes = linear_gradient_rgba8(rect.origin(), w, h, *start, *end, stops);
                let paint = rgba_premul_to_image(&bytes, w, h)?;
                ctx.set_transform(affine_to_cpu(Affine::translate(rect.origin().to_vec2())));
                ctx.set_paint(paint);
                with_opacity(ctx, *opacity, |ctx| {
                    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                        0.0,
                        0.0,
                        f64::from(w),
                        f64::from(h),
                    ));
                });
            }
            DrawOp::Image {
                slot,
                transform,
                opacity,
            } => {
                let (paint, w, h) = self.image_paint_for(*slot, images)?;
                ctx.set_transform(affine_to_cpu(*transform));
                ctx.set_paint(paint);
                with_opacity(ctx, *opacity, |ctx| {
                    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
                });
            }
            DrawOp::Stroke {
                path,
                transform,
                color,
                width,
                alpha,
            } => {
                if *width <= 0.0 || *alpha <= 0.0 {
                    return Ok(());
                }
                ctx.set_transform(affine_to_cpu(*transform));
                ctx.set_paint(solid(*color, *alpha));
                ctx.set_stroke(
                    vello_cpu::kurbo::Stroke::new(*width)
                        .with_caps(vello_cpu::kurbo::Cap::Round)
                        .with_join(vello_cpu::kurbo::Join::Round),
                );
                ctx.stroke_path(&bezpath_to_cpu(path));
            }
        }
        Ok(())
    }
}

impl PassBackend for CpuBackend {
    fn ensure_surface(&mut self, id: SurfaceId, desc: &SurfaceDesc) -> FiberResult<()> {
        let width: u16 = desc
            .width
            .try_into()
            .map_err(|_| FiberError::render("surface width exceeds u16"))?;
        let height: u16 = desc
            .height
            .try_into()
            .map_err(|_| FiberError::render("surface height exceeds u16"))?;

        let reuse = self
            .surfaces
            .get(&id)
            .is_some_and(|s| s.width == width && s.height == height);
        if !reuse {
            self.surfaces.insert(id, CpuSurface::new(width, height));
        }
        Ok(())
    }

    fn exec_scene(&mut self, pass: &ScenePass, images: &PreparedImages) -> FiberResult<()> {
        let mut surface = self.take_surface(pass.target, "scene target")?;

        let result = if pass.clear_to_transparent {
            clear_pixmap_to_transparent(&mut surface.pixmap);
            self.render_ops_to(&pass.ops, images, &mut surface.pixmap)
        } else {
            // `vello_cpu` renders into a fresh buffer, so accumulation goes through a temp
            // surface composited over the target.
            let mut tmp = vello_cpu::Pixmap::new(surface.width, surface.height);
            self.render_ops_to(&pass.ops, images, &mut tmp)
                .and_then(|()| {
                    premul_over_in_place(
                        surface.pixmap.data_as_u8_slice_mut(),
                        tmp.data_as_u8_slice(),
                        1.0,
                    )
                })
        };

        self.surfaces.insert(pass.target, surface);
        result
    }

    fn exec_offscreen(&mut self, pass: &OffscreenPass, _images: &PreparedImages) -> FiberResult<()> {
        let separate_input = if pass.input == pass.output {
            None
        } else {
            let input = self.surface(pass.input, "offscreen input")?;
            Some((
                input.width,
                input.height,
                input.pixmap.data_as_u8_slice().to_vec(),
            ))
        };

        let mut output = self.take_surface(pass.output, "offscreen output")?;
        let input_bytes = match separate_input {
            None => output.pixmap.data_as_u8_slice().to_vec(),
            Some((w, h, bytes)) => {
                if w != output.width || h != output.height {
                    self.surfaces.insert(pass.output, output);
                    return Err(FiberError::render(
                        "offscreen input/output surface size mismatch",
                    ));
                }
                bytes
            }
        };

        let (w, h) = (u32::from(output.width), u32::from(output.height));
        let result = match pass.fx {
            PassFx::Blur { radius_px, sigma } => {
                blur_rgba8_premul(&input_bytes, w, h, radius_px, sigma).map(|blurred| {
                    output
                        .pixmap
                        .data_as_u8_slice_mut()
                        .copy_from_slice(&blurred);
                })
            }
        };

        self.surfaces.insert(pass.output, output);
        result
    }

    fn exec_composite(&mut self, pass: &CompositePass, _images: &PreparedImages) -> FiberResult<()> {
        let mut dst = self.take_surface(pass.target, "composite target")?;

        let mut result = Ok(());
        for op in &pass.ops {
            match *op {
                CompositeOp::Over { src, opacity } => {
                    result = self.surface(src, "composite src").and_then(|src| {
                        premul_over_in_place(
                            dst.pixmap.data_as_u8_slice_mut(),
                            src.pixmap.data_as_u8_slice(),
                            opacity,
                        )
                    });
                }
            }
            if result.is_err() {
                break;
            }
        }

        self.surfaces.insert(pass.target, dst);
        result
    }

    fn readback_rgba8(&mut self, surface: SurfaceId, plan: &RenderPlan) -> FiberResult<FrameRGBA> {
        let s = self.surface(surface, "readback")?;
        let data = s.pixmap.data_as_u8_slice().to_vec();
        let surface_cap = plan.surfaces.len() as u32;
        self.surfaces.retain(|id, _| id.0 < surface_cap);

        Ok(FrameRGBA {
            width: plan.canvas.width,
            height: plan.canvas.height,
            data,
            premultiplied: true,
        })
    }
}

impl RenderBackend for CpuBackend {}

fn with_opacity(
    ctx: &mut vello_cpu::RenderContext,
    opacity: f32,
    draw: impl FnOnce(&mut vello_cpu::RenderContext),
) {
    if opacity <= 0.0 {
        return;
    }
    if opacity < 1.0 {
        ctx.push_opacity_layer(opacity);
        draw(ctx);
        ctx.pop_layer();
    } else {
        draw(ctx);
    }
}

fn solid(color: Rgb, alpha: f32) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(color.r, color.g, color.b, alpha_to_u8(alpha))
}

/// Opaque gradient pixels for a `width x height` region whose top-left sits at `origin`.
///
/// Each pixel center is projected onto the `start -> end` axis; positions before the first
/// stop or after the last take the end colors.
pub(crate) fn linear_gradient_rgba8(
    origin: Point,
    width: u32,
    height: u32,
    start: Point,
    end: Point,
    stops: &[ResolvedStop],
) -> Vec<u8> {
    let mut bytes = vec![0u8; (width as usize) * (height as usize) * 4];
    let axis = end - start;
    let len2 = axis.hypot2();

    for y in 0..height {
        for x in 0..width {
            let p = Point::new(
                origin.x + f64::from(x) + 0.5,
                origin.y + f64::from(y) + 0.5,
            );
            let t = if len2 > 0.0 {
                ((p - start).dot(axis) / len2).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let c = sample_stops(stops, t);
            let idx = ((y as usize) * (width as usize) + (x as usize)) * 4;
            bytes[idx..idx + 4].copy_from_slice(&[c.r, c.g, c.b, 255]);
        }
    }
    bytes
}

fn sample_stops(stops: &[ResolvedStop], t: f64) -> Rgb {
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        return Rgb::BLACK;
    };
    if t <= first.offset {
        return first.color;
    }
    if t >= last.offset {
        return last.color;
    }
    for pair in stops.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if t <= b.offset {
            let span = b.offset - a.offset;
            if span <= 0.0 {
                return b.color;
            }
            let k = (t - a.offset) / span;
            let lerp = |x: u8, y: u8| -> u8 {
                let (x, y) = (f64::from(x), f64::from(y));
                (x + (y - x) * k).round().clamp(0.0, 255.0) as u8
            };
            return Rgb::new(
                lerp(a.color.r, b.color.r),
                lerp(a.color.g, b.color.g),
                lerp(a.color.b, b.color.b),
            );
        }
    }
    last.color
}

/// Premultiplied source-over of `src` onto `dst`, scaling the source by `opacity`.
pub(crate) fn premul_over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> FiberResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(FiberError::render(
            "premul_over_in_place expects equal-length rgba8 buffers",
        ));
    }
    let op = u16::from(alpha_to_u8(opacity));
    if op == 0 {
        return Ok(());
    }

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let sa = mul_div255_u8(u16::from(s[3]), op);
        if sa == 0 {
            continue;
        }
        let inv = 255u16 - u16::from(sa);

        d[3] = sa.saturating_add(mul_div255_u8(u16::from(d[3]), inv));
        for c in 0..3 {
            let sc = mul_div255_u8(u16::from(s[c]), op);
            let dc = mul_div255_u8(u16::from(d[c]), inv);
            d[c] = sc.saturating_add(dc);
        }
    }
    Ok(())
}

fn clear_pixmap_to_transparent(pixmap: &mut vello_cpu::Pixmap) {
    pixmap.data_as_u8_slice_mut().fill(0);
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let pt = |p: Point| vello_cpu::kurbo::Point::new(p.x, p.y);
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(pt(p)),
            PathEl::LineTo(p) => out.line_to(pt(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(pt(p1), pt(p2)),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(pt(p1), pt(p2), pt(p3)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> FiberResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| FiberError::render("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| FiberError::render("pixmap height exceeds u16"))?;
    let canvas = Canvas { width, height };
    if bytes.len() != canvas.byte_len() {
        return Err(FiberError::render("pixmap byte len mismatch"));
    }

    let mut may_have_opacities = false;
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]])
        })
        .collect();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

fn rgba_premul_to_image(
    bytes_premul: &[u8],
    width: u32,
    height: u32,
) -> FiberResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(bytes_premul, width, height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn prepared_to_image(img: &PreparedImage) -> FiberResult<vello_cpu::Image> {
    rgba_premul_to_image(img.rgba8_premul.as_slice(), img.width, img.height)
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
