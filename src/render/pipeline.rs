use std::path::Path;

use crate::{
    animation::driver::{AnimationDriver, ManualScheduler},
    encode::export::{EncodedImage, write_frame},
    encode::sink::{FrameSink, SinkConfig},
    foundation::error::{FiberError, FiberResult, RenderWarning},
    render::backend::{FrameRGBA, RenderBackend},
    render::plan::compile_frame,
    scene::assets::{PreparedImages, prepare_layer_images},
    scene::model::Scene,
};

/// A rendered frame plus every non-fatal degradation met while producing it.
#[derive(Clone, Debug)]
pub struct RenderOutput {
    pub frame: FrameRGBA,
    pub warnings: Vec<RenderWarning>,
}

/// Compile and render one frame of `scene` at animation `time`.
///
/// `images` must already hold the decoded layer images; see [`prepare_layer_images`]. The
/// scene is borrowed for the whole call, so the frame reflects one consistent snapshot.
///
/// Returns a [`FrameRGBA`] containing **premultiplied** RGBA8 pixels.
#[tracing::instrument(skip(scene, images, backend))]
pub fn render_frame(
    scene: &Scene,
    images: &PreparedImages,
    time: f64,
    backend: &mut dyn RenderBackend,
) -> FiberResult<RenderOutput> {
    let (plan, warnings) = compile_frame(scene, images, time);
    let frame = backend.render_plan(&plan, images)?;
    Ok(RenderOutput { frame, warnings })
}

/// Load the scene's layer images from `assets_root`, then render one frame.
///
/// Image load failures are reported in the output warnings, ahead of compile warnings.
pub fn render_scene(
    scene: &Scene,
    assets_root: &Path,
    time: f64,
    backend: &mut dyn RenderBackend,
) -> FiberResult<RenderOutput> {
    let (images, mut warnings) = prepare_layer_images(&scene.layers, assets_root);
    let out = render_frame(scene, &images, time, backend)?;
    warnings.extend(out.warnings);
    Ok(RenderOutput {
        frame: out.frame,
        warnings,
    })
}

/// Render a still at `time` and write it to `path` in the scene's export format.
pub fn export_scene(
    scene: &Scene,
    assets_root: &Path,
    time: f64,
    path: &Path,
    backend: &mut dyn RenderBackend,
) -> FiberResult<(EncodedImage, Vec<RenderWarning>)> {
    let mut out = render_scene(scene, assets_root, time, backend)?;
    let encoded = write_frame(&out.frame, &scene.export_format, path)?;
    out.warnings.extend(encoded.warning.clone());
    Ok((encoded, out.warnings))
}

/// Drive `driver` for `ticks` ticks, rendering one frame per tick into `sink`.
///
/// The driver is started if needed and stopped afterwards; its time keeps the last value.
/// Warnings are collected once each, in first-seen order.
pub fn render_sequence(
    scene: &Scene,
    images: &PreparedImages,
    driver: &mut AnimationDriver<ManualScheduler>,
    ticks: u32,
    backend: &mut dyn RenderBackend,
    sink: &mut dyn FrameSink,
) -> FiberResult<Vec<RenderWarning>> {
    let canvas = scene.canvas();
    sink.begin(SinkConfig {
        width: canvas.width,
        height: canvas.height,
        frame_count: ticks,
    })?;

    let mut warnings: Vec<RenderWarning> = Vec::new();
    driver.start();
    for index in 0..ticks {
        let id = driver
            .scheduler_mut()
            .next_due()
            .ok_or_else(|| FiberError::render("animation driver has no pending tick"))?;
        let Some(time) = driver.tick(id) else {
            return Err(FiberError::render("animation tick was not accepted"));
        };

        let out = render_frame(scene, images, time, backend)?;
        for w in out.warnings {
            if !warnings.contains(&w) {
                warnings.push(w);
            }
        }
        sink.push_frame(index, time, &out.frame)?;
    }
    driver.stop();
    sink.end()?;

    tracing::debug!(frames = ticks, time = driver.time(), "rendered sequence");
    Ok(warnings)
}

/// Skips renders whose inputs equal the previous render's.
///
/// Stills re-render only when the scene changes; animated frames differ in `time` and always
/// render.
#[derive(Debug, Default)]
pub struct RenderGate {
    last: Option<(Scene, f64)>,
}

impl RenderGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when `(scene, time)` differs from the last accepted pair; the pair is then
    /// remembered.
    pub fn should_render(&mut self, scene: &Scene, time: f64) -> bool {
        if let Some((last_scene, last_time)) = &self.last
            && last_scene == scene
            && last_time.to_bits() == time.to_bits()
        {
            return false;
        }
        self.last = Some((scene.clone(), time));
        true
    }

    /// Forget the last render so the next call renders unconditionally.
    pub fn invalidate(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
