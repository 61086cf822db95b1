use crate::{
    foundation::error::{FiberError, FiberResult},
    render::backend::FrameRGBA,
    render::plan::{CompositePass, OffscreenPass, Pass, RenderPlan, ScenePass, SurfaceDesc, SurfaceId},
    scene::assets::PreparedImages,
};

/// Executes the three kinds of [`Pass`] against backend-owned surfaces.
pub trait PassBackend {
    fn ensure_surface(&mut self, id: SurfaceId, desc: &SurfaceDesc) -> FiberResult<()>;

    fn exec_scene(&mut self, pass: &ScenePass, images: &PreparedImages) -> FiberResult<()>;

    fn exec_offscreen(&mut self, pass: &OffscreenPass, images: &PreparedImages) -> FiberResult<()>;

    fn exec_composite(&mut self, pass: &CompositePass, images: &PreparedImages) -> FiberResult<()>;

    fn readback_rgba8(&mut self, surface: SurfaceId, plan: &RenderPlan) -> FiberResult<FrameRGBA>;
}

/// Run every pass of `plan` in order and read back the final surface.
pub fn execute_plan<B: PassBackend + ?Sized>(
    backend: &mut B,
    plan: &RenderPlan,
    images: &PreparedImages,
) -> FiberResult<FrameRGBA> {
    for (idx, desc) in plan.surfaces.iter().enumerate() {
        let id = SurfaceId(
            idx.try_into()
                .map_err(|_| FiberError::render("surface id overflow"))?,
        );
        backend.ensure_surface(id, desc)?;
    }

    for pass in &plan.passes {
        match pass {
            Pass::Scene(p) => backend.exec_scene(p, images)?,
            Pass::Offscreen(p) => backend.exec_offscreen(p, images)?,
            Pass::Composite(p) => backend.exec_composite(p, images)?,
        }
    }

    backend.readback_rgba8(plan.final_surface, plan)
}

#[cfg(test)]
#[path = "../../tests/unit/render/passes.rs"]
mod tests;
