//! Separable gaussian blur on premultiplied RGBA8.

use crate::foundation::error::{FiberError, FiberResult};

const Q16_ONE: u32 = 1 << 16;

/// Tap radius for a blur of standard deviation `sigma`: `ceil(3 * sigma)`, capped at
/// `longest_side` so a huge sigma degrades to a full-surface smear instead of failing.
pub(crate) fn radius_for_sigma(sigma: f64, longest_side: u32) -> u32 {
    if !sigma.is_finite() || sigma <= 0.0 {
        return 0;
    }
    let wanted = (sigma * 3.0).ceil();
    if wanted >= f64::from(longest_side) {
        longest_side
    } else {
        wanted as u32
    }
}

/// Symmetric gaussian weights in Q16 fixed point, `2 * radius + 1` taps summing to `1 << 16`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct GaussianKernel {
    taps: Vec<u32>,
}

impl GaussianKernel {
    pub(crate) fn new(radius: u32, sigma: f32) -> FiberResult<Self> {
        if radius == 0 {
            return Ok(Self {
                taps: vec![Q16_ONE],
            });
        }
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(FiberError::validation("blur sigma must be > 0"));
        }

        // One side only: the center tap is exp(0) = 1, so the sum never vanishes.
        let two_sigma_sq = 2.0 * f64::from(sigma) * f64::from(sigma);
        let side: Vec<f64> = (1..=radius)
            .map(|d| {
                let d = f64::from(d);
                (-(d * d) / two_sigma_sq).exp()
            })
            .collect();
        let total = 1.0 + 2.0 * side.iter().sum::<f64>();

        let quantize = |w: f64| ((w / total) * f64::from(Q16_ONE)).round() as u32;
        let side_q: Vec<u32> = side.iter().map(|&w| quantize(w)).collect();
        let side_sum: u32 = side_q.iter().sum();
        let center = Q16_ONE.saturating_sub(2 * side_sum);

        let taps = side_q
            .iter()
            .rev()
            .copied()
            .chain(std::iter::once(center))
            .chain(side_q.iter().copied())
            .collect();
        Ok(Self { taps })
    }

    pub(crate) fn radius(&self) -> usize {
        self.taps.len() / 2
    }

    pub(crate) fn taps(&self) -> &[u32] {
        &self.taps
    }
}

/// Blur `src` (`width * height` premultiplied RGBA8 pixels) with a `radius`-tap gaussian.
///
/// Edges clamp. A zero radius returns the input unchanged.
pub fn blur_rgba8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    radius: u32,
    sigma: f32,
) -> FiberResult<Vec<u8>> {
    let (w, h) = (width as usize, height as usize);
    let len = w
        .checked_mul(h)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| FiberError::render("blur buffer size overflow"))?;
    if src.len() != len {
        return Err(FiberError::render(format!(
            "blur input has {} bytes, expected {len} for {width}x{height}",
            src.len()
        )));
    }
    let radius = radius.min(width.max(height));
    if radius == 0 || len == 0 {
        return Ok(src.to_vec());
    }

    let kernel = GaussianKernel::new(radius, sigma)?;
    let mut rows = vec![0u8; len];
    let mut out = vec![0u8; len];

    // Rows: `h` lines of `w` pixels, 4 bytes apart. Columns: `w` lines of `h` pixels, one row apart.
    convolve_lines(src, &mut rows, Lines::new(h, w, w * 4, 4), &kernel);
    convolve_lines(&rows, &mut out, Lines::new(w, h, 4, w * 4), &kernel);
    Ok(out)
}

/// A set of parallel pixel lines inside an RGBA8 buffer.
#[derive(Clone, Copy)]
struct Lines {
    count: usize,
    len: usize,
    /// Byte distance between the first pixels of consecutive lines.
    line_stride: usize,
    /// Byte distance between consecutive pixels along a line.
    pixel_stride: usize,
}

impl Lines {
    fn new(count: usize, len: usize, line_stride: usize, pixel_stride: usize) -> Self {
        Self {
            count,
            len,
            line_stride,
            pixel_stride,
        }
    }
}

fn convolve_lines(src: &[u8], dst: &mut [u8], lines: Lines, kernel: &GaussianKernel) {
    let radius = kernel.radius();
    let last = lines.len - 1;

    for line in 0..lines.count {
        let base = line * lines.line_stride;
        for i in 0..lines.len {
            let mut acc = [0u64; 4];
            for (k, &weight) in kernel.taps().iter().enumerate() {
                // i + k - radius, clamped to the line.
                let j = (i + k).saturating_sub(radius).min(last);
                let at = base + j * lines.pixel_stride;
                for (a, &v) in acc.iter_mut().zip(&src[at..at + 4]) {
                    *a += u64::from(weight) * u64::from(v);
                }
            }
            let at = base + i * lines.pixel_stride;
            for (d, a) in dst[at..at + 4].iter_mut().zip(acc) {
                *d = ((a + u64::from(Q16_ONE / 2)) >> 16).min(255) as u8;
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/blur.rs"]
mod tests;
