use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        FiberError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(FiberError::decode("x").to_string().contains("decode error:"));
    assert!(FiberError::encode("x").to_string().contains("encode error:"));
    assert!(FiberError::render("x").to_string().contains("render error:"));
    assert!(
        FiberError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = FiberError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn warnings_name_the_layer_and_fallback() {
    let w = RenderWarning::ImageDecode {
        slot: LayerSlot::Background,
        message: "bad magic".to_owned(),
    };
    assert_eq!(
        w.to_string(),
        "failed to load image for background layer: bad magic"
    );

    let w = RenderWarning::UnsupportedExport {
        requested: "svg".to_owned(),
    };
    assert!(w.to_string().contains("using PNG"));
}
