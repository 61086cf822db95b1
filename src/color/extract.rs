//! Dominant color extraction: k-means over a sparse sample of a downscaled image.

use image::imageops::FilterType;
use rand::Rng as _;

use crate::color::model::Rgb;
use crate::color::palette::{MAX_PALETTE_COLORS, Palette};
use crate::foundation::error::FiberResult;
use crate::foundation::rng::SeededRandom;

/// Cluster count used when the caller has no preference.
pub const DEFAULT_CLUSTER_COUNT: usize = 4;
/// Longest image edge after downscaling, in pixels.
pub const SAMPLE_MAX_EDGE: u32 = 100;
/// Every Nth pixel of the downscaled image enters the sample set.
pub const SAMPLE_PIXEL_STRIDE: usize = 4;
/// Fixed number of assign/update rounds.
pub const KMEANS_ITERATIONS: usize = 10;

/// How the initial centroids are drawn from the sample set.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum CentroidInit {
    /// Thread-local entropy; two runs may disagree.
    #[default]
    Entropy,
    /// Reproducible draws from the seeded LCG.
    Seeded(f64),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExtractOpts {
    pub clusters: usize,
    pub init: CentroidInit,
}

impl Default for ExtractOpts {
    fn default() -> Self {
        Self {
            clusters: DEFAULT_CLUSTER_COUNT,
            init: CentroidInit::Entropy,
        }
    }
}

/// Return `opts.clusters` representative colors of `img`. Order carries no meaning.
///
/// An image with no sampled pixels yields an empty vector.
#[tracing::instrument(skip(img), fields(width = img.width(), height = img.height()))]
pub fn extract_dominant_colors(img: &image::DynamicImage, opts: &ExtractOpts) -> Vec<Rgb> {
    let samples = sample_colors(img);
    let centroids = match opts.init {
        CentroidInit::Entropy => {
            let mut rng = rand::thread_rng();
            kmeans(&samples, opts.clusters, KMEANS_ITERATIONS, |n| {
                rng.gen_range(0..n)
            })
        }
        CentroidInit::Seeded(seed) => {
            let mut rng = SeededRandom::new(seed);
            kmeans(&samples, opts.clusters, KMEANS_ITERATIONS, |n| rng.index(n))
        }
    };
    tracing::debug!(samples = samples.len(), clusters = centroids.len(), "extracted colors");
    centroids
}

/// Extract colors and turn them into a palette, keeping at most the palette maximum.
pub fn extract_palette(img: &image::DynamicImage, opts: &ExtractOpts) -> FiberResult<Palette> {
    let mut colors = extract_dominant_colors(img, opts);
    colors.truncate(MAX_PALETTE_COLORS);
    Palette::new(colors)
}

/// Downscale so the longest edge is [`SAMPLE_MAX_EDGE`], then keep every
/// [`SAMPLE_PIXEL_STRIDE`]th pixel in row-major order.
pub fn sample_colors(img: &image::DynamicImage) -> Vec<Rgb> {
    let (w, h) = (img.width(), img.height());
    if w == 0 || h == 0 {
        return Vec::new();
    }
    let scale = (f64::from(SAMPLE_MAX_EDGE) / f64::from(w))
        .min(f64::from(SAMPLE_MAX_EDGE) / f64::from(h));
    let sw = ((f64::from(w) * scale) as u32).max(1);
    let sh = ((f64::from(h) * scale) as u32).max(1);

    let small = image::imageops::resize(&img.to_rgba8(), sw, sh, FilterType::Triangle);
    small
        .as_raw()
        .chunks_exact(4)
        .step_by(SAMPLE_PIXEL_STRIDE)
        .map(|px| Rgb::new(px[0], px[1], px[2]))
        .collect()
}

/// Lloyd's k-means with Euclidean RGB distance.
///
/// `pick(n)` chooses an initial centroid index in `0..n`. A cluster that ends a round empty
/// takes the first centroid of the previous round.
pub fn kmeans(
    samples: &[Rgb],
    k: usize,
    iterations: usize,
    mut pick: impl FnMut(usize) -> usize,
) -> Vec<Rgb> {
    if samples.is_empty() || k == 0 {
        return Vec::new();
    }

    let mut centroids: Vec<Rgb> = (0..k).map(|_| samples[pick(samples.len())]).collect();
    let mut sums = vec![[0u64; 3]; k];
    let mut counts = vec![0u64; k];

    for _ in 0..iterations {
        sums.iter_mut().for_each(|s| *s = [0; 3]);
        counts.iter_mut().for_each(|c| *c = 0);

        for &c in samples {
            let nearest = nearest_centroid(c, &centroids);
            sums[nearest][0] += u64::from(c.r);
            sums[nearest][1] += u64::from(c.g);
            sums[nearest][2] += u64::from(c.b);
            counts[nearest] += 1;
        }

        let fallback = centroids[0];
        for (i, centroid) in centroids.iter_mut().enumerate() {
            let n = counts[i];
            *centroid = if n == 0 {
                fallback
            } else {
                let mean = |s: u64| ((s as f64) / (n as f64)).round() as u8;
                Rgb::new(mean(sums[i][0]), mean(sums[i][1]), mean(sums[i][2]))
            };
        }
    }

    centroids
}

fn nearest_centroid(c: Rgb, centroids: &[Rgb]) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, &k) in centroids.iter().enumerate() {
        let d = color_distance(c, k);
        if d < best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}

pub fn color_distance(a: Rgb, b: Rgb) -> f64 {
    let dr = f64::from(a.r) - f64::from(b.r);
    let dg = f64::from(a.g) - f64::from(b.g);
    let db = f64::from(a.b) - f64::from(b.b);
    (dr * dr + dg * dg + db * db).sqrt()
}

#[cfg(test)]
#[path = "../../tests/unit/color/extract.rs"]
mod tests;
