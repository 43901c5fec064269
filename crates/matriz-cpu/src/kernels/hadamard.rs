//! Elementwise (Hadamard) multiplication kernels.

crate::kernels::binary_kernels!(_mm_mul_ps, vmulq_f32, *=);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dense_matches_naive() {
        let a: Vec<f32> = (0..77).map(|i| i as f32 * 0.25).collect();
        let b: Vec<f32> = (0..77).map(|i| 3.0 - i as f32 * 0.125).collect();
        let expect: Vec<f32> = a.iter().zip(&b).map(|(x, y)| x * y).collect();

        let mut out = a;
        dense(&mut out, &b);
        assert_eq!(out, expect);
    }

    #[test]
    fn test_multiply_by_ones_is_identity() {
        let a: Vec<f32> = (0..33).map(|i| i as f32 - 16.0).collect();
        let ones = vec![1.0f32; 33];
        let mut out = a.clone();
        dense(&mut out, &ones);
        assert_eq!(out, a);
    }

    #[test]
    fn test_simd_matches_scalar_bitwise() {
        let a: Vec<f32> = (0..150).map(|i| 1.0 + i as f32 * 1e-3).collect();
        let b: Vec<f32> = (0..150).map(|i| 2.0 - i as f32 * 1e-3).collect();

        let mut fast = a.clone();
        dense(&mut fast, &b);

        let mut plain = a;
        unsafe { dense_scalar(plain.as_mut_ptr(), b.as_ptr(), plain.len()) };

        assert_eq!(fast, plain);
    }
}
