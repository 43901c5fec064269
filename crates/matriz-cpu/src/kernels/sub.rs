//! Elementwise subtraction kernels.

crate::kernels::binary_kernels!(_mm_sub_ps, vsubq_f32, -=);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dense_matches_naive() {
        let a: Vec<f32> = (0..99).map(|i| i as f32).collect();
        let b: Vec<f32> = (0..99).map(|i| (i / 2) as f32).collect();
        let expect: Vec<f32> = a.iter().zip(&b).map(|(x, y)| x - y).collect();

        let mut out = a;
        dense(&mut out, &b);
        assert_eq!(out, expect);
    }

    #[test]
    fn test_subtracting_self_zeroes() {
        let a: Vec<f32> = (0..40).map(|i| i as f32 * 1.25).collect();
        let mut out = a.clone();
        dense(&mut out, &a);
        assert!(out.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_strided_rows_with_remainder_columns() {
        // cols = 18 exercises both the 16-wide main loop and the tail.
        let stride = 20;
        let mut dst = vec![5.0f32; 4 * stride];
        let src = vec![2.0f32; 4 * stride];

        unsafe { strided(dst.as_mut_ptr(), src.as_ptr(), 1, 1, 2, 18, stride) };

        for r in 0..4 {
            for c in 0..stride {
                let inside = (1..3).contains(&r) && (1..19).contains(&c);
                let want = if inside { 3.0 } else { 5.0 };
                assert_eq!(dst[r * stride + c], want, "at ({r}, {c})");
            }
        }
    }
}
