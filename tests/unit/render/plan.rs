use super::*;
use crate::scene::assets::PreparedImage;
use crate::scene::layer::{ImageSource, LayerImage};
use std::sync::Arc;

fn scene_passes(plan: &RenderPlan) -> Vec<&ScenePass> {
    plan.passes
        .iter()
        .filter_map(|p| match p {
            Pass::Scene(s) => Some(s),
            _ => None,
        })
        .collect()
}

#[test]
fn default_scene_compiles_backdrop_fill_and_pattern() {
    let scene = Scene::default();
    let (plan, warnings) = compile_frame(&scene, &PreparedImages::default(), 0.0);
    assert!(warnings.is_empty());
    assert_eq!(plan.canvas, Canvas::new(1600, 1600).unwrap());
    assert_eq!(plan.final_surface, SurfaceId(0));
    assert_eq!(plan.surfaces.len(), 2);

    // backdrop, background layer fill, pattern strokes, composite
    assert_eq!(plan.passes.len(), 4);
    let scenes = scene_passes(&plan);
    assert!(scenes[0].clear_to_transparent);
    assert_eq!(
        scenes[0].ops,
        vec![DrawOp::FillRect {
            rect: plan.canvas.bounds(),
            color: Rgb::BLACK,
            opacity: 1.0,
        }]
    );
    assert!(!scenes[1].clear_to_transparent);
    assert_eq!(scenes[2].target, SurfaceId(1));
    assert_eq!(scenes[2].ops.len(), 20);
    assert!(matches!(
        plan.passes[3],
        Pass::Composite(CompositePass { target: SurfaceId(0), .. })
    ));
}

#[test]
fn transparent_scene_skips_backdrop_and_hidden_background() {
    let mut scene = Scene::default();
    scene.set_transparent(true);
    let (plan, _) = compile_frame(&scene, &PreparedImages::default(), 0.0);

    let scenes = scene_passes(&plan);
    assert!(scenes[0].ops.is_empty());
    assert!(
        scenes
            .iter()
            .flat_map(|s| &s.ops)
            .all(|op| matches!(op, DrawOp::Stroke { .. }))
    );
}

#[test]
fn gradient_background_reports_bad_stops() {
    let mut scene = Scene::default();
    scene.layers.background.use_gradient = true;
    scene.layers.background.gradient.stops[1].color = "white".to_owned();
    let (plan, warnings) = compile_frame(&scene, &PreparedImages::default(), 0.0);
    assert_eq!(warnings.len(), 1);

    let fill = &scene_passes(&plan)[1].ops[0];
    let DrawOp::FillLinearGradient { stops, start, end, .. } = fill else {
        panic!("expected gradient fill, got {fill:?}");
    };
    assert_eq!(stops[1].color, Rgb::BLACK);
    assert_eq!(*start, Point::new(0.0, 800.0));
    assert_eq!(*end, Point::new(1600.0, 800.0));
}

#[test]
fn blur_adds_offscreen_pass() {
    let mut scene = Scene::default();
    scene.pattern.pattern_blur_px = 2.0;
    let (plan, _) = compile_frame(&scene, &PreparedImages::default(), 0.0);
    let blur = plan.passes.iter().find_map(|p| match p {
        Pass::Offscreen(o) => Some(o.fx),
        _ => None,
    });
    assert_eq!(
        blur,
        Some(PassFx::Blur {
            radius_px: 6,
            sigma: 2.0
        })
    );
}

#[test]
fn oversized_blur_radius_is_capped_at_the_longest_side() {
    let mut scene = Scene::default();
    scene.aspect_ratio = crate::foundation::core::AspectRatio::Wide;
    scene.pattern.pattern_blur_px = 1e9;
    let (plan, _) = compile_frame(&scene, &PreparedImages::default(), 0.0);
    let radius = plan.passes.iter().find_map(|p| match p {
        Pass::Offscreen(OffscreenPass {
            fx: PassFx::Blur { radius_px, .. },
            ..
        }) => Some(*radius_px),
        _ => None,
    });
    assert_eq!(radius, Some(1600));
}

#[test]
fn pattern_follows_its_owner_and_visibility() {
    let mut scene = Scene::default();
    scene.layers.move_pattern_to(LayerSlot::Background);
    let (plan, _) = compile_frame(&scene, &PreparedImages::default(), 0.0);
    // backdrop, background fill, strokes, composite; the empty pattern layer adds nothing
    assert_eq!(plan.passes.len(), 4);

    scene.layers.background.base.visible = false;
    let (plan, _) = compile_frame(&scene, &PreparedImages::default(), 0.0);
    assert_eq!(plan.passes.len(), 1);
    assert_eq!(plan.surfaces.len(), 1);
}

#[test]
fn layer_opacity_reaches_fill_image_and_strokes() {
    let mut scene = Scene::default();
    scene.layers.background.base.opacity = 0.5;
    scene.layers.pattern.base.opacity = 0.25;
    scene.layers.pattern.base.image = Some(LayerImage::new(ImageSource::Path("p.png".into())));

    let mut images = PreparedImages::default();
    images.insert(
        LayerSlot::Pattern,
        PreparedImage {
            width: 800,
            height: 400,
            rgba8_premul: Arc::new(vec![0; 800 * 400 * 4]),
        },
    );
    let (plan, _) = compile_frame(&scene, &images, 0.0);
    let scenes = scene_passes(&plan);

    let DrawOp::FillRect { opacity, .. } = &scenes[1].ops[0] else {
        panic!("expected background fill");
    };
    assert_eq!(*opacity, 0.5);
    let DrawOp::Image {
        slot,
        transform,
        opacity,
    } = &scenes[2].ops[0]
    else {
        panic!("expected image op");
    };
    assert_eq!(*slot, LayerSlot::Pattern);
    assert_eq!(*opacity, 0.25);
    // 2:1 image in a square frame: full width, half height, vertically centered.
    assert_eq!(*transform * Point::new(0.0, 0.0), Point::new(0.0, 400.0));
    assert_eq!(*transform * Point::new(800.0, 400.0), Point::new(1600.0, 1200.0));

    let DrawOp::Stroke { alpha, .. } = &scenes[3].ops[0] else {
        panic!("expected stroke");
    };
    assert_eq!(*alpha, 0.25);
}

#[test]
fn missing_image_is_skipped() {
    let mut scene = Scene::default();
    scene.layers.background.base.image =
        Some(LayerImage::new(ImageSource::Path("missing.png".into())));
    let (plan, _) = compile_frame(&scene, &PreparedImages::default(), 0.0);
    assert_eq!(scene_passes(&plan)[1].ops.len(), 1);
}

#[test]
fn pattern_transform_scales_about_center_then_pans() {
    let mut scene = Scene::default();
    let center = scene.canvas().center();
    let fixed = pattern_transform(&scene) * center;
    assert!((fixed - center).hypot() < 1e-9);

    scene.pattern.offset_x = 0.5;
    let moved = pattern_transform(&scene) * center;
    // pan of 0.5 * 1600 * 2.5 in pattern space, scaled by 0.3
    assert!((moved.x - (center.x + 600.0)).abs() < 1e-9);
    assert!((moved.y - center.y).abs() < 1e-9);

    scene.pattern.offset_x = 0.0;
    scene.pattern.pattern_rotate_deg = 90.0;
    let p = pattern_transform(&scene) * Point::new(center.x + 100.0, center.y);
    assert!((p.x - center.x).abs() < 1e-9);
    assert!((p.y - (center.y + 30.0)).abs() < 1e-9);
}
