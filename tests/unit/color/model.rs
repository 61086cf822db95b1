use super::*;

fn close(a: Rgb, b: Rgb, tol: i16) -> bool {
    (i16::from(a.r) - i16::from(b.r)).abs() <= tol
        && (i16::from(a.g) - i16::from(b.g)).abs() <= tol
        && (i16::from(a.b) - i16::from(b.b)).abs() <= tol
}

#[test]
fn parses_hex_and_rgb_text() {
    assert_eq!(parse_color("#CBCCCD"), Rgb::new(0xcb, 0xcc, 0xcd));
    assert_eq!(parse_color("#ff0080"), Rgb::new(255, 0, 128));
    assert_eq!(parse_color("rgb(1,2,3)"), Rgb::new(1, 2, 3));
    assert_eq!(parse_color("rgba(10, 20, 30, 0.5)"), Rgb::new(10, 20, 30));
}

#[test]
fn unrecognized_text_is_black() {
    for bad in ["", "red", "#12345", "#GGGGGG", "rgb(1,2)", "hsl(0,0%,0%)"] {
        assert_eq!(parse_color(bad), Rgb::BLACK, "input {bad:?}");
        assert!(try_parse_color(bad).is_none(), "input {bad:?}");
    }
}

#[test]
fn hex6_check_is_case_insensitive_and_exact() {
    assert!(is_hex6("#abcDEF"));
    assert!(!is_hex6("abcdef"));
    assert!(!is_hex6("#abcd"));
    assert!(!is_hex6("#abcdefff"));
}

#[test]
fn hex_serde_roundtrip() {
    let c = Rgb::new(0x29, 0x2b, 0x2c);
    assert_eq!(c.to_hex(), "#292b2c");
    let json = serde_json::to_string(&c).unwrap();
    assert_eq!(json, "\"#292b2c\"");
    let back: Rgb = serde_json::from_str(&json).unwrap();
    assert_eq!(back, c);
}

#[test]
fn known_hsl_values() {
    let red = rgb_to_hsl(Rgb::new(255, 0, 0));
    assert!((red.h - 0.0).abs() < 1e-9);
    assert!((red.s - 100.0).abs() < 1e-9);
    assert!((red.l - 50.0).abs() < 1e-9);

    assert_eq!(
        hsl_to_rgb(Hsl {
            h: 120.0,
            s: 100.0,
            l: 50.0
        }),
        Rgb::new(0, 255, 0)
    );
    assert_eq!(
        hsl_to_rgb(Hsl {
            h: 0.0,
            s: 0.0,
            l: 50.0
        }),
        Rgb::new(128, 128, 128)
    );
}

#[test]
fn rgb_hsl_roundtrip_within_one() {
    for r in (0..=255u16).step_by(15) {
        for g in (0..=255u16).step_by(17) {
            for b in (0..=255u16).step_by(51) {
                let c = Rgb::new(r as u8, g as u8, b as u8);
                let back = hsl_to_rgb(rgb_to_hsl(c));
                assert!(close(c, back, 1), "{c:?} -> {back:?}");
            }
        }
    }
}

#[test]
fn hsl_rgb_hsl_rgb_is_stable_within_one() {
    for h in (0..360).step_by(30) {
        for s in (0..=100).step_by(25) {
            for l in (0..=100).step_by(20) {
                let once = hsl_to_rgb(Hsl {
                    h: f64::from(h),
                    s: f64::from(s),
                    l: f64::from(l),
                });
                let twice = hsl_to_rgb(rgb_to_hsl(once));
                assert!(close(once, twice, 1), "h={h} s={s} l={l}");
            }
        }
    }
}

#[test]
fn interpolation_identity_law() {
    let c = Rgb::new(0x7a, 0x7b, 0x7d);
    for mode in [Interpolation::Rgb, Interpolation::Hsl] {
        for i in 0..=10 {
            let t = f64::from(i) / 10.0;
            assert_eq!(mode.interpolate(c, c, t), c);
        }
    }
}

#[test]
fn rgb_interpolation_endpoints_and_midpoint() {
    let a = Rgb::new(0, 0, 0);
    let b = Rgb::new(255, 100, 10);
    assert_eq!(lerp_rgb(a, b, 0.0), a);
    assert_eq!(lerp_rgb(a, b, 1.0), b);
    assert_eq!(lerp_rgb(a, b, 0.5), Rgb::new(128, 50, 5));
}

#[test]
fn hsl_interpolation_takes_short_arc() {
    // 350deg -> 10deg passes through red, not through cyan.
    let a = hsl_to_rgb(Hsl {
        h: 350.0,
        s: 100.0,
        l: 50.0,
    });
    let b = hsl_to_rgb(Hsl {
        h: 10.0,
        s: 100.0,
        l: 50.0,
    });
    let mid = Interpolation::Hsl.interpolate(a, b, 0.5);
    assert!(close(mid, Rgb::new(255, 0, 0), 1), "{mid:?}");
}

#[test]
fn darken_and_darkest() {
    assert_eq!(Rgb::new(200, 100, 50).darken(0.3), Rgb::new(140, 70, 35));
    assert_eq!(Rgb::new(200, 100, 50).darken(2.0), Rgb::BLACK);
    assert_eq!(Rgb::new(200, 100, 50).darken(-1.0), Rgb::new(200, 100, 50));

    let colors = [
        Rgb::new(0xcb, 0xcc, 0xcd),
        Rgb::new(0x29, 0x2b, 0x2c),
        Rgb::new(0x7a, 0x7b, 0x7d),
    ];
    assert_eq!(darkest(&colors), Some(Rgb::new(0x29, 0x2b, 0x2c)));
    assert_eq!(darkest(&[]), None);
}
