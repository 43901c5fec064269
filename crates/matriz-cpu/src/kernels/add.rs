//! Elementwise addition kernels.

crate::kernels::binary_kernels!(_mm_add_ps, vaddq_f32, +=);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dense_matches_naive() {
        let a: Vec<f32> = (0..131).map(|i| i as f32 * 0.5).collect();
        let b: Vec<f32> = (0..131).map(|i| 100.0 - i as f32).collect();
        let expect: Vec<f32> = a.iter().zip(&b).map(|(x, y)| x + y).collect();

        let mut out = a;
        dense(&mut out, &b);
        assert_eq!(out, expect);
    }

    #[test]
    fn test_short_buffer_uses_remainder_only() {
        // len < 16: the whole buffer is remainder.
        let mut out = vec![1.0, 2.0, 3.0];
        dense(&mut out, &[10.0, 20.0, 30.0]);
        assert_eq!(out, vec![11.0, 22.0, 33.0]);
    }

    #[test]
    fn test_strided_touches_only_its_region() {
        // 6x10 buffer, operate on the 3x5 block at (2, 4).
        let stride = 10;
        let mut dst = vec![1.0f32; 60];
        let src = vec![2.0f32; 60];

        unsafe { strided(dst.as_mut_ptr(), src.as_ptr(), 2, 4, 3, 5, stride) };

        for r in 0..6 {
            for c in 0..10 {
                let inside = (2..5).contains(&r) && (4..9).contains(&c);
                let want = if inside { 3.0 } else { 1.0 };
                assert_eq!(dst[r * stride + c], want, "at ({r}, {c})");
            }
        }
    }

    #[test]
    fn test_simd_matches_scalar_bitwise() {
        let a: Vec<f32> = (0..200).map(|i| (i as f32).sin()).collect();
        let b: Vec<f32> = (0..200).map(|i| (i as f32).cos()).collect();

        let mut fast = a.clone();
        dense(&mut fast, &b);

        let mut plain = a;
        unsafe { dense_scalar(plain.as_mut_ptr(), b.as_ptr(), plain.len()) };

        assert_eq!(fast, plain);
    }
}
