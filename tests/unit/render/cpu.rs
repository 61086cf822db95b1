use super::*;
use crate::render::passes::execute_plan;
use crate::render::plan::PixelFormat;

fn plan_with(canvas: Canvas, surfaces: usize, passes: Vec<crate::render::plan::Pass>) -> RenderPlan {
    let desc = SurfaceDesc {
        width: canvas.width,
        height: canvas.height,
        format: PixelFormat::Rgba8Premul,
    };
    RenderPlan {
        canvas,
        surfaces: vec![desc; surfaces],
        passes,
        final_surface: SurfaceId(0),
    }
}

fn scene(target: u32, clear: bool, ops: Vec<DrawOp>) -> crate::render::plan::Pass {
    crate::render::plan::Pass::Scene(ScenePass {
        target: SurfaceId(target),
        ops,
        clear_to_transparent: clear,
    })
}

fn fill(canvas: Canvas, color: Rgb, opacity: f32) -> DrawOp {
    DrawOp::FillRect {
        rect: canvas.bounds(),
        color,
        opacity,
    }
}

#[test]
fn solid_fill_and_accumulating_half_opacity_fill() {
    let canvas = Canvas::new(8, 8).unwrap();
    let plan = plan_with(
        canvas,
        1,
        vec![
            scene(0, true, vec![fill(canvas, Rgb::new(255, 0, 0), 1.0)]),
            scene(0, false, vec![fill(canvas, Rgb::new(0, 0, 255), 0.5)]),
        ],
    );
    let mut backend = CpuBackend::new();
    let frame = execute_plan(&mut backend, &plan, &PreparedImages::default()).unwrap();
    let [r, g, b, a] = frame.pixel(4, 4);
    assert_eq!(a, 255);
    assert_eq!(g, 0);
    assert!((i32::from(r) - 128).abs() <= 2, "r = {r}");
    assert!((i32::from(b) - 128).abs() <= 2, "b = {b}");
}

#[test]
fn cleared_surface_is_transparent_between_frames() {
    let canvas = Canvas::new(4, 4).unwrap();
    let mut backend = CpuBackend::new();
    let red = plan_with(canvas, 1, vec![scene(0, true, vec![fill(canvas, Rgb::new(255, 0, 0), 1.0)])]);
    execute_plan(&mut backend, &red, &PreparedImages::default()).unwrap();

    let empty = plan_with(canvas, 1, vec![scene(0, true, vec![])]);
    let frame = execute_plan(&mut backend, &empty, &PreparedImages::default()).unwrap();
    assert!(frame.data.iter().all(|&b| b == 0));
}

#[test]
fn stroke_covers_its_path_and_nothing_far_away() {
    let canvas = Canvas::new(32, 32).unwrap();
    let mut path = BezPath::new();
    path.move_to((0.0, 16.0));
    path.line_to((32.0, 16.0));
    let plan = plan_with(
        canvas,
        1,
        vec![scene(
            0,
            true,
            vec![DrawOp::Stroke {
                path,
                transform: Affine::IDENTITY,
                color: Rgb::WHITE,
                width: 4.0,
                alpha: 1.0,
            }],
        )],
    );
    let frame = execute_plan(&mut CpuBackend::new(), &plan, &PreparedImages::default()).unwrap();
    assert_eq!(frame.pixel(16, 15), [255, 255, 255, 255]);
    assert_eq!(frame.pixel(16, 2), [0, 0, 0, 0]);
}

#[test]
fn blur_and_composite_passes_run_on_scratch_surface() {
    let canvas = Canvas::new(16, 16).unwrap();
    let dot = DrawOp::FillRect {
        rect: Rect::new(6.0, 6.0, 10.0, 10.0),
        color: Rgb::WHITE,
        opacity: 1.0,
    };
    let plan = plan_with(
        canvas,
        2,
        vec![
            scene(0, true, vec![fill(canvas, Rgb::BLACK, 1.0)]),
            scene(1, true, vec![dot]),
            crate::render::plan::Pass::Offscreen(OffscreenPass {
                input: SurfaceId(1),
                output: SurfaceId(1),
                fx: PassFx::Blur {
                    radius_px: 6,
                    sigma: 2.0,
                },
            }),
            crate::render::plan::Pass::Composite(CompositePass {
                target: SurfaceId(0),
                ops: vec![CompositeOp::Over {
                    src: SurfaceId(1),
                    opacity: 1.0,
                }],
            }),
        ],
    );
    let frame = execute_plan(&mut CpuBackend::new(), &plan, &PreparedImages::default()).unwrap();
    // Soft halo outside the dot, opaque everywhere over the black backdrop.
    let halo = frame.pixel(4, 8);
    assert!(halo[0] > 0 && halo[0] < 255);
    assert_eq!(halo[3], 255);
    assert_eq!(frame.pixel(0, 0)[3], 255);
}

#[test]
fn image_op_uses_prepared_pixels() {
    let canvas = Canvas::new(4, 4).unwrap();
    let mut images = PreparedImages::default();
    images.insert(
        LayerSlot::Background,
        PreparedImage {
            width: 2,
            height: 2,
            rgba8_premul: Arc::new([0u8, 255, 0, 255].repeat(4)),
        },
    );
    let plan = plan_with(
        canvas,
        1,
        vec![scene(
            0,
            true,
            vec![DrawOp::Image {
                slot: LayerSlot::Background,
                transform: Affine::scale(2.0),
                opacity: 1.0,
            }],
        )],
    );
    let mut backend = CpuBackend::new();
    let frame = execute_plan(&mut backend, &plan, &images).unwrap();
    assert_eq!(frame.pixel(1, 1), [0, 255, 0, 255]);

    // Missing prepared image is a render error, not a panic.
    let err = execute_plan(&mut backend, &plan, &PreparedImages::default());
    assert!(err.is_err());
}

#[test]
fn gradient_pixels_follow_sorted_stops() {
    let stops = [
        ResolvedStop {
            offset: 0.0,
            color: Rgb::BLACK,
        },
        ResolvedStop {
            offset: 1.0,
            color: Rgb::WHITE,
        },
    ];
    let bytes = linear_gradient_rgba8(
        Point::ORIGIN,
        4,
        1,
        Point::new(0.0, 0.5),
        Point::new(4.0, 0.5),
        &stops,
    );
    let reds: Vec<u8> = bytes.chunks_exact(4).map(|px| px[0]).collect();
    assert_eq!(reds, vec![32, 96, 159, 223]);
    assert!(bytes.chunks_exact(4).all(|px| px[3] == 255));
}

#[test]
fn gradient_pads_outside_stop_range() {
    let stops = [
        ResolvedStop {
            offset: 0.25,
            color: Rgb::new(255, 0, 0),
        },
        ResolvedStop {
            offset: 0.75,
            color: Rgb::new(0, 0, 255),
        },
    ];
    let bytes = linear_gradient_rgba8(
        Point::ORIGIN,
        8,
        1,
        Point::new(0.0, 0.0),
        Point::new(8.0, 0.0),
        &stops,
    );
    assert_eq!(&bytes[0..4], &[255, 0, 0, 255]);
    assert_eq!(&bytes[28..32], &[0, 0, 255, 255]);
}

#[test]
fn premul_over_blends_and_checks_lengths() {
    let mut dst = vec![0, 0, 255, 255];
    premul_over_in_place(&mut dst, &[128, 0, 0, 128], 1.0).unwrap();
    assert_eq!(dst, vec![128, 0, 127, 255]);

    let mut untouched = vec![1, 2, 3, 4];
    premul_over_in_place(&mut untouched, &[255, 255, 255, 255], 0.0).unwrap();
    assert_eq!(untouched, vec![1, 2, 3, 4]);

    assert!(premul_over_in_place(&mut [0; 4], &[0; 8], 1.0).is_err());
}

#[test]
fn pixmap_upload_checks_byte_length() {
    let pixmap = pixmap_from_premul_bytes(&[10, 20, 30, 255, 0, 0, 0, 0], 2, 1).unwrap();
    assert_eq!((pixmap.width(), pixmap.height()), (2, 1));
    assert!(pixmap_from_premul_bytes(&[0; 8], 1, 1).is_err());
    assert!(pixmap_from_premul_bytes(&[0; 4], 70_000, 1).is_err());
}
