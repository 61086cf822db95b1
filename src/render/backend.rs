use crate::{
    encode::export::unpremultiply_px,
    foundation::error::FiberResult,
    foundation::math::Fnv1a64,
    render::passes::{PassBackend, execute_plan},
    render::plan::RenderPlan,
    scene::assets::PreparedImages,
};

/// A rendered frame as RGBA8 pixels.
///
/// Frames are **premultiplied alpha** by default. The `premultiplied` flag is included to make
/// this explicit at API boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Stable 64-bit FNV-1a hash of the dimensions and pixel bytes.
    pub fn fingerprint(&self) -> u64 {
        let mut h = Fnv1a64::new_default();
        h.write_u32(self.width);
        h.write_u32(self.height);
        h.write_bytes(&self.data);
        h.finish()
    }

    /// RGBA8 bytes with straight (non-premultiplied) alpha.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        if !self.premultiplied {
            return self.data.clone();
        }
        let mut out = Vec::with_capacity(self.data.len());
        for px in self.data.chunks_exact(4) {
            out.extend_from_slice(&unpremultiply_px([px[0], px[1], px[2], px[3]]));
        }
        out
    }

    /// Premultiplied pixel at `(x, y)`. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        [
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ]
    }
}

/// A renderer that can execute a compiled [`RenderPlan`] into a [`FrameRGBA`].
///
/// Most users do not call [`RenderBackend::render_plan`] directly; prefer [`crate::render_frame`]
/// and friends, which handle image preparation and compilation.
pub trait RenderBackend: PassBackend {
    /// Execute a backend-agnostic [`RenderPlan`] and read back the final frame.
    fn render_plan(
        &mut self,
        plan: &RenderPlan,
        images: &PreparedImages,
    ) -> FiberResult<FrameRGBA> {
        execute_plan(self, plan, images)
    }
}

/// Available backend kinds.
#[derive(Clone, Copy, Debug, Default)]
pub enum BackendKind {
    /// CPU raster backend powered by `vello_cpu`.
    #[default]
    Cpu,
}

/// Create a rendering backend implementation.
pub fn create_backend(kind: BackendKind) -> Box<dyn RenderBackend> {
    match kind {
        BackendKind::Cpu => Box::new(crate::render::cpu::CpuBackend::new()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
