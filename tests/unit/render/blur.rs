use super::*;

#[test]
fn radius_0_is_identity() {
    let src = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
    let out = blur_rgba8_premul(&src, 1, 2, 0, 1.0).unwrap();
    assert_eq!(out, src);
}

#[test]
fn constant_image_is_unchanged() {
    let (w, h) = (4u32, 3u32);
    let src = [10u8, 20, 30, 40].repeat((w * h) as usize);
    let out = blur_rgba8_premul(&src, w, h, 3, 2.0).unwrap();
    assert_eq!(out, src);
}

#[test]
fn single_pixel_spreads_and_keeps_energy() {
    let (w, h) = (5u32, 5u32);
    let mut src = vec![0u8; (w * h * 4) as usize];
    let center = ((2 * w + 2) * 4) as usize;
    src[center..center + 4].copy_from_slice(&[255, 255, 255, 255]);

    let out = blur_rgba8_premul(&src, w, h, 2, 1.2).unwrap();

    let nonzero = out.chunks_exact(4).filter(|px| px[3] != 0).count();
    assert!(nonzero > 1);
    let sum_a: u32 = out.chunks_exact(4).map(|px| u32::from(px[3])).sum();
    assert!((sum_a as i32 - 255).abs() <= 4);
    // Symmetric spread around the lit pixel.
    let alpha = |x: u32, y: u32| out[((y * w + x) * 4 + 3) as usize];
    assert_eq!(alpha(1, 2), alpha(3, 2));
    assert_eq!(alpha(2, 1), alpha(2, 3));
    assert_eq!(alpha(1, 2), alpha(2, 1));
}

#[test]
fn kernel_is_normalized_and_symmetric() {
    let k = GaussianKernel::new(6, 2.0).unwrap();
    assert_eq!(k.radius(), 6);
    let taps = k.taps();
    assert_eq!(taps.len(), 13);
    assert_eq!(taps.iter().sum::<u32>(), 1 << 16);
    for i in 0..6 {
        assert_eq!(taps[i], taps[12 - i]);
        assert!(taps[i] <= taps[i + 1]);
    }
}

#[test]
fn wide_kernel_with_huge_sigma_stays_normalized() {
    let k = GaussianKernel::new(1600, 1e9).unwrap();
    assert_eq!(k.taps().len(), 3201);
    assert_eq!(k.taps().iter().sum::<u32>(), 1 << 16);
}

#[test]
fn radius_follows_three_sigma_and_caps_at_the_longest_side() {
    assert_eq!(radius_for_sigma(0.0, 1600), 0);
    assert_eq!(radius_for_sigma(f64::NAN, 1600), 0);
    assert_eq!(radius_for_sigma(2.0, 1600), 6);
    assert_eq!(radius_for_sigma(0.5, 1600), 2);
    assert_eq!(radius_for_sigma(1e9, 900), 900);
    assert_eq!(radius_for_sigma(f64::INFINITY, 900), 0);
}

#[test]
fn radius_larger_than_the_image_still_blurs() {
    let (w, h) = (3u32, 2u32);
    let mut src = vec![0u8; (w * h * 4) as usize];
    src[..4].copy_from_slice(&[200, 0, 0, 200]);
    let out = blur_rgba8_premul(&src, w, h, 10_000, 1e6).unwrap();
    assert_eq!(out.len(), src.len());
    assert!(out.chunks_exact(4).all(|px| px[3] > 0));
}

#[test]
fn bad_inputs_are_rejected() {
    assert!(GaussianKernel::new(2, 0.0).is_err());
    assert!(blur_rgba8_premul(&[0; 7], 1, 2, 1, 1.0).is_err());
}
