use serde::{Deserialize, Serialize};

/// Opaque 8-bit sRGB color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Mean of the three channels.
    pub fn brightness(self) -> f64 {
        (f64::from(self.r) + f64::from(self.g) + f64::from(self.b)) / 3.0
    }

    /// Scale every channel by `1 - amount`; `amount` is clamped to `[0, 1]`.
    pub fn darken(self, amount: f64) -> Rgb {
        let k = 1.0 - amount.clamp(0.0, 1.0);
        let ch = |c: u8| (f64::from(c) * k).round().max(0.0) as u8;
        Rgb::new(ch(self.r), ch(self.g), ch(self.b))
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Rgb {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(parse_color(&s))
    }
}

/// Parse `#RRGGBB` or `rgb(r, g, b)` text. Anything else is black.
pub fn parse_color(s: &str) -> Rgb {
    match try_parse_color(s) {
        Some(c) => c,
        None => {
            tracing::warn!(input = s, "unrecognized color, using black");
            Rgb::BLACK
        }
    }
}

/// Strict variant of [`parse_color`]: `None` when the text is not a recognized color.
pub fn try_parse_color(s: &str) -> Option<Rgb> {
    let s = s.trim();
    if s.starts_with("rgb") {
        // Takes the first three integer runs, so `rgba(1, 2, 3, 0.5)` reads as (1,2,3).
        let mut channels = s
            .split(|c: char| !c.is_ascii_digit())
            .filter(|run| !run.is_empty())
            .map(|run| run.parse::<u32>().map(|v| v.min(255) as u8).unwrap_or(255));
        let r = channels.next()?;
        let g = channels.next()?;
        let b = channels.next()?;
        return Some(Rgb::new(r, g, b));
    }
    let hex = s.strip_prefix('#')?;
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Rgb::new(byte(0)?, byte(2)?, byte(4)?))
}

/// True for exactly `#` followed by six hex digits, in either case.
pub fn is_hex6(s: &str) -> bool {
    s.strip_prefix('#')
        .is_some_and(|hex| hex.len() == 6 && hex.bytes().all(|b| b.is_ascii_hexdigit()))
}

/// Hue in degrees `[0, 360)`, saturation and lightness in percent `[0, 100]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

pub fn rgb_to_hsl(c: Rgb) -> Hsl {
    let r = f64::from(c.r) / 255.0;
    let g = f64::from(c.g) / 255.0;
    let b = f64::from(c.b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    let (mut h, mut s) = (0.0, 0.0);

    if max != min {
        let d = max - min;
        s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };
        h = if max == r {
            ((g - b) / d + if g < b { 6.0 } else { 0.0 }) / 6.0
        } else if max == g {
            ((b - r) / d + 2.0) / 6.0
        } else {
            ((r - g) / d + 4.0) / 6.0
        };
    }

    Hsl {
        h: h * 360.0,
        s: s * 100.0,
        l: l * 100.0,
    }
}

pub fn hsl_to_rgb(hsl: Hsl) -> Rgb {
    let h = hsl.h / 360.0;
    let s = hsl.s / 100.0;
    let l = hsl.l / 100.0;

    let (r, g, b) = if s == 0.0 {
        (l, l, l)
    } else {
        fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
            if t < 0.0 {
                t += 1.0;
            }
            if t > 1.0 {
                t -= 1.0;
            }
            if t < 1.0 / 6.0 {
                return p + (q - p) * 6.0 * t;
            }
            if t < 1.0 / 2.0 {
                return q;
            }
            if t < 2.0 / 3.0 {
                return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
            }
            p
        }

        let q = if l < 0.5 {
            l * (1.0 + s)
        } else {
            l + s - l * s
        };
        let p = 2.0 * l - q;
        (
            hue_to_rgb(p, q, h + 1.0 / 3.0),
            hue_to_rgb(p, q, h),
            hue_to_rgb(p, q, h - 1.0 / 3.0),
        )
    };

    let to_u8 = |x: f64| (x * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgb::new(to_u8(r), to_u8(g), to_u8(b))
}

/// Color space used when blending two palette entries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    /// Per-channel linear blend in sRGB. Avoids hue swings across large color jumps.
    #[default]
    Rgb,
    /// Blend in HSL, taking the shorter way around the hue circle.
    Hsl,
}

impl Interpolation {
    pub fn interpolate(self, a: Rgb, b: Rgb, t: f64) -> Rgb {
        match self {
            Self::Rgb => lerp_rgb(a, b, t),
            Self::Hsl => lerp_hsl(a, b, t),
        }
    }
}

/// Linear per-channel interpolation; `lerp_rgb(c, c, t) == c` for every `t`.
pub fn lerp_rgb(a: Rgb, b: Rgb, t: f64) -> Rgb {
    let ch = |x: u8, y: u8| {
        let x = f64::from(x);
        let y = f64::from(y);
        (x + (y - x) * t).round().clamp(0.0, 255.0) as u8
    };
    Rgb::new(ch(a.r, b.r), ch(a.g, b.g), ch(a.b, b.b))
}

fn lerp_hsl(a: Rgb, b: Rgb, t: f64) -> Rgb {
    if a == b {
        return a;
    }
    let ha = rgb_to_hsl(a);
    let hb = rgb_to_hsl(b);

    let (mut h1, mut h2) = (ha.h, hb.h);
    if (h2 - h1).abs() > 180.0 {
        if h2 > h1 {
            h1 += 360.0;
        } else {
            h2 += 360.0;
        }
    }

    hsl_to_rgb(Hsl {
        h: (h1 + (h2 - h1) * t) % 360.0,
        s: ha.s + (hb.s - ha.s) * t,
        l: ha.l + (hb.l - ha.l) * t,
    })
}

/// Lowest mean brightness; the first one wins ties. `None` for an empty slice.
pub fn darkest(colors: &[Rgb]) -> Option<Rgb> {
    colors.iter().copied().reduce(|darkest, c| {
        if c.brightness() < darkest.brightness() {
            c
        } else {
            darkest
        }
    })
}

#[cfg(test)]
#[path = "../../tests/unit/color/model.rs"]
mod tests;
