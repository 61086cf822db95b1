use serde::{Deserialize, Serialize};

use crate::color::model::{Interpolation, Rgb, parse_color};
use crate::foundation::error::{FiberError, FiberResult};
use crate::foundation::rng::SeededRandom;

/// Fewest colors a palette may hold.
pub const MIN_PALETTE_COLORS: usize = 2;
/// Most colors a palette may hold.
pub const MAX_PALETTE_COLORS: usize = 8;

/// Colors [`random_palette`] draws from.
pub const RANDOM_PALETTE_POOL: [&str; 10] = [
    "#D12115", "#FFFFFF", "#CBCCCD", "#7A7B7D", "#292B2C", "#000000", "#F8BDB9", "#F3918B",
    "#74120C", "#260604",
];

/// Ordered sequence of colors; order sets the sweep direction of the line gradient.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette(Vec<Rgb>);

impl Default for Palette {
    fn default() -> Self {
        Self(vec![
            Rgb::new(0xcb, 0xcc, 0xcd),
            Rgb::new(0x7a, 0x7b, 0x7d),
            Rgb::new(0x29, 0x2b, 0x2c),
        ])
    }
}

impl Palette {
    pub fn new(colors: Vec<Rgb>) -> FiberResult<Self> {
        let p = Self(colors);
        p.validate()?;
        Ok(p)
    }

    /// Build from color text; unparseable entries become black.
    pub fn from_hex<S: AsRef<str>>(colors: &[S]) -> FiberResult<Self> {
        Self::new(colors.iter().map(|c| parse_color(c.as_ref())).collect())
    }

    pub fn validate(&self) -> FiberResult<()> {
        let n = self.0.len();
        if !(MIN_PALETTE_COLORS..=MAX_PALETTE_COLORS).contains(&n) {
            return Err(FiberError::validation(format!(
                "palette must have {MIN_PALETTE_COLORS}..={MAX_PALETTE_COLORS} colors, got {n}"
            )));
        }
        Ok(())
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, color: Rgb) -> FiberResult<()> {
        if self.0.len() >= MAX_PALETTE_COLORS {
            return Err(FiberError::validation(format!(
                "palette already has {MAX_PALETTE_COLORS} colors"
            )));
        }
        self.0.push(color);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> FiberResult<Rgb> {
        if self.0.len() <= MIN_PALETTE_COLORS {
            return Err(FiberError::validation(format!(
                "palette needs at least {MIN_PALETTE_COLORS} colors"
            )));
        }
        if index >= self.0.len() {
            return Err(FiberError::validation(format!(
                "palette index {index} out of range"
            )));
        }
        Ok(self.0.remove(index))
    }

    pub fn set(&mut self, index: usize, color: Rgb) -> FiberResult<()> {
        let slot = self
            .0
            .get_mut(index)
            .ok_or_else(|| FiberError::validation(format!("palette index {index} out of range")))?;
        *slot = color;
        Ok(())
    }

    pub fn to_hex(&self) -> Vec<String> {
        self.0.iter().map(|c| c.to_hex()).collect()
    }

    /// Color at `progress ∈ [0, 1)` along a sweep that cycles through the palette `repeats`
    /// times. `progress = 0` is exactly the first color.
    pub fn sample(&self, progress: f64, repeats: u32, mode: Interpolation) -> Rgb {
        let n = self.0.len();
        if n == 0 {
            return Rgb::BLACK;
        }
        let size = n as f64;
        let p = (progress * f64::from(repeats) * size).rem_euclid(size);
        let index = (p.floor() as usize).min(n - 1);
        let t = p - index as f64;
        let next = (index + 1) % n;
        mode.interpolate(self.0[index], self.0[next], t)
    }
}

/// Pick 3 to 6 distinct pool colors in shuffled order.
pub fn random_palette(rng: &mut SeededRandom) -> Palette {
    let count = 3 + rng.index(4);
    let mut pool = RANDOM_PALETTE_POOL;
    rng.shuffle(&mut pool);
    Palette(pool[..count].iter().map(|c| parse_color(c)).collect())
}

#[cfg(test)]
#[path = "../../tests/unit/color/palette.rs"]
mod tests;
