use super::*;

#[test]
fn empty_object_is_the_basic_preset() {
    let scene = Scene::from_json_str("{}").unwrap();
    assert_eq!(scene, Scene::default());
    assert_eq!(scene.palette.to_hex(), vec!["#cbcccd", "#7a7b7d", "#292b2c"]);
    assert_eq!(scene.canvas(), Canvas::new(1600, 1600).unwrap());
    assert_eq!(scene.background_color, Rgb::BLACK);
    assert!(!scene.transparent);
    assert_eq!(scene.export_format, ExportFormat::Png);
    assert_eq!(scene.interpolation, Interpolation::Rgb);
}

#[test]
fn json_fields_are_camel_case() {
    let scene = Scene::from_json_str(
        r##"{
            "aspectRatio": "16:9",
            "backgroundColor": "#102030",
            "exportFormat": "jpg",
            "palette": ["#ff0000", "rgb(0, 0, 255)"],
            "pattern": { "density": 7, "patternBlurPx": 2.5 },
            "interpolation": "hsl"
        }"##,
    )
    .unwrap();
    assert_eq!(scene.aspect_ratio, AspectRatio::Wide);
    assert_eq!(scene.canvas(), Canvas::new(1600, 900).unwrap());
    assert_eq!(scene.background_color, Rgb::new(0x10, 0x20, 0x30));
    assert_eq!(scene.export_format, ExportFormat::Jpeg);
    assert_eq!(scene.palette.colors()[1], Rgb::new(0, 0, 255));
    assert_eq!(scene.pattern.density, 7);
    assert_eq!(scene.pattern.pattern_blur_px, 2.5);
    assert_eq!(scene.interpolation, Interpolation::Hsl);
}

#[test]
fn invalid_scenes_are_rejected() {
    assert!(matches!(
        Scene::from_json_str("{ not json"),
        Err(FiberError::Serde(_))
    ));
    assert!(matches!(
        Scene::from_json_str(r##"{ "palette": ["#ffffff"] }"##),
        Err(FiberError::Validation(_))
    ));
    assert!(matches!(
        Scene::from_json_str(r#"{ "pattern": { "density": 0 } }"#),
        Err(FiberError::Validation(_))
    ));
    assert!(Scene::from_path(Path::new("/no/such/scene.json")).is_err());
}

#[test]
fn json_round_trips() {
    let mut scene = Scene::default();
    scene.pattern.twist = 1.25;
    scene.layers.move_pattern_to(LayerSlot::Background);
    scene.export_format = ExportFormat::Unsupported("svg".to_owned());
    let json = scene.to_json_pretty().unwrap();
    assert_eq!(Scene::from_json_str(&json).unwrap(), scene);
}

#[test]
fn transparency_toggles_background_visibility() {
    let mut scene = Scene::default();
    scene.set_transparent(true);
    assert!(scene.transparent);
    assert!(!scene.layers.background.base.visible);
    scene.set_transparent(false);
    assert!(!scene.transparent);
    assert!(scene.layers.background.base.visible);
}

#[test]
fn regenerate_is_reproducible_for_a_seeded_rng() {
    let mut a = Scene::default();
    let mut b = Scene::default();
    let seed_a = a.regenerate(&mut SeededRandom::new(42.0));
    let seed_b = b.regenerate(&mut SeededRandom::new(42.0));
    assert_eq!(seed_a, seed_b);
    assert!((0.0..1.0).contains(&seed_a));
    assert_ne!(seed_a, Scene::default().pattern.seed);

    let mut rng = SeededRandom::new(7.0);
    a.randomize_palette(&mut rng);
    assert!((3..=6).contains(&a.palette.len()));
    a.validate().unwrap();
}
