use super::*;

#[test]
fn fnv_hash_is_split_invariant() {
    let mut a = Fnv1a64::new_default();
    a.write_bytes(b"fibertwist");
    let mut b = Fnv1a64::new_default();
    b.write_bytes(b"fiber");
    b.write_bytes(b"twist");
    assert_eq!(a.finish(), b.finish());
}

#[test]
fn mul_div255_variants_align() {
    for x in [0u16, 1, 127, 255] {
        for y in [0u16, 1, 127, 255] {
            assert_eq!(u16::from(mul_div255_u8(x, y)), mul_div255_u16(x, y));
        }
    }
}

#[test]
fn alpha_to_u8_clamps() {
    assert_eq!(alpha_to_u8(-1.0), 0);
    assert_eq!(alpha_to_u8(0.5), 128);
    assert_eq!(alpha_to_u8(2.0), 255);
}
