//! Scalar multiplication kernels.
//!
//! Same loop shape as the binary operations, with the factor broadcast into
//! a vector register once before the main loop.

use crate::capability::{self, KernelVariant};

/// Multiply every element of `dst` by `factor`.
pub fn dense(dst: &mut [f32], factor: f32) {
    unsafe { dense_at(dst.as_mut_ptr(), factor, dst.len()) }
}

/// Dense kernel over a raw buffer.
///
/// # Safety
///
/// `dst` must be valid for `len` elements.
pub(crate) unsafe fn dense_at(dst: *mut f32, factor: f32, len: usize) {
    match capability::select() {
        #[cfg(target_arch = "x86_64")]
        KernelVariant::Sse42 => dense_sse42(dst, factor, len),
        #[cfg(target_arch = "x86_64")]
        KernelVariant::Sse41 => dense_sse41(dst, factor, len),
        #[cfg(target_arch = "x86_64")]
        KernelVariant::Avx2 => dense_avx2(dst, factor, len),
        #[cfg(target_arch = "x86_64")]
        KernelVariant::Sse3 => dense_sse3(dst, factor, len),
        #[cfg(target_arch = "aarch64")]
        KernelVariant::Neon => dense_neon(dst, factor, len),
        _ => dense_scalar(dst, factor, len),
    }
}

/// Multiply a `rows x cols` sub-region at `(row0, col0)` by `factor`.
///
/// # Safety
///
/// - `dst` must be valid for the whole strided extent.
/// - Concurrent calls must target disjoint sub-regions.
pub unsafe fn strided(
    dst: *mut f32,
    factor: f32,
    row0: usize,
    col0: usize,
    rows: usize,
    cols: usize,
    stride: usize,
) {
    match capability::select() {
        #[cfg(target_arch = "x86_64")]
        KernelVariant::Sse42 => strided_sse42(dst, factor, row0, col0, rows, cols, stride),
        #[cfg(target_arch = "x86_64")]
        KernelVariant::Sse41 => strided_sse41(dst, factor, row0, col0, rows, cols, stride),
        #[cfg(target_arch = "x86_64")]
        KernelVariant::Avx2 => strided_avx2(dst, factor, row0, col0, rows, cols, stride),
        #[cfg(target_arch = "x86_64")]
        KernelVariant::Sse3 => strided_sse3(dst, factor, row0, col0, rows, cols, stride),
        #[cfg(target_arch = "aarch64")]
        KernelVariant::Neon => strided_neon(dst, factor, row0, col0, rows, cols, stride),
        _ => strided_scalar(dst, factor, row0, col0, rows, cols, stride),
    }
}

macro_rules! x86_scale {
    ($dense:ident, $strided:ident, $feature:literal) => {
        #[cfg(target_arch = "x86_64")]
        #[target_feature(enable = $feature)]
        unsafe fn $dense(dst: *mut f32, factor: f32, len: usize) {
            use core::arch::x86_64::*;
            const J: usize = 4;
            const STEP: usize = 16;
            let k = _mm_set1_ps(factor);
            let main = len - len % STEP;
            let mut i = 0;
            while i < main {
                _mm_storeu_ps(dst.add(i), _mm_mul_ps(_mm_loadu_ps(dst.add(i)), k));
                _mm_storeu_ps(dst.add(i + J), _mm_mul_ps(_mm_loadu_ps(dst.add(i + J)), k));
                _mm_storeu_ps(
                    dst.add(i + 2 * J),
                    _mm_mul_ps(_mm_loadu_ps(dst.add(i + 2 * J)), k),
                );
                _mm_storeu_ps(
                    dst.add(i + 3 * J),
                    _mm_mul_ps(_mm_loadu_ps(dst.add(i + 3 * J)), k),
                );
                i += STEP;
            }
            while i < len {
                *dst.add(i) *= factor;
                i += 1;
            }
        }

        #[cfg(target_arch = "x86_64")]
        #[target_feature(enable = $feature)]
        unsafe fn $strided(
            dst: *mut f32,
            factor: f32,
            row0: usize,
            col0: usize,
            rows: usize,
            cols: usize,
            stride: usize,
        ) {
            use core::arch::x86_64::*;
            const J: usize = 4;
            const STEP: usize = 16;
            let k = _mm_set1_ps(factor);
            let main = cols - cols % STEP;
            for r in 0..rows {
                let d = dst.add((row0 + r) * stride + col0);
                let mut i = 0;
                while i < main {
                    _mm_storeu_ps(d.add(i), _mm_mul_ps(_mm_loadu_ps(d.add(i)), k));
                    _mm_storeu_ps(d.add(i + J), _mm_mul_ps(_mm_loadu_ps(d.add(i + J)), k));
                    _mm_storeu_ps(
                        d.add(i + 2 * J),
                        _mm_mul_ps(_mm_loadu_ps(d.add(i + 2 * J)), k),
                    );
                    _mm_storeu_ps(
                        d.add(i + 3 * J),
                        _mm_mul_ps(_mm_loadu_ps(d.add(i + 3 * J)), k),
                    );
                    i += STEP;
                }
                while i < cols {
                    *d.add(i) *= factor;
                    i += 1;
                }
            }
        }
    };
}

x86_scale!(dense_sse42, strided_sse42, "sse4.2");
x86_scale!(dense_sse41, strided_sse41, "sse4.1");
x86_scale!(dense_avx2, strided_avx2, "avx2");
x86_scale!(dense_sse3, strided_sse3, "sse3");

#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
unsafe fn dense_neon(dst: *mut f32, factor: f32, len: usize) {
    use core::arch::aarch64::*;
    const J: usize = 4;
    const STEP: usize = 16;
    let k = vdupq_n_f32(factor);
    let main = len - len % STEP;
    let mut i = 0;
    while i < main {
        vst1q_f32(dst.add(i), vmulq_f32(vld1q_f32(dst.add(i)), k));
        vst1q_f32(dst.add(i + J), vmulq_f32(vld1q_f32(dst.add(i + J)), k));
        vst1q_f32(dst.add(i + 2 * J), vmulq_f32(vld1q_f32(dst.add(i + 2 * J)), k));
        vst1q_f32(dst.add(i + 3 * J), vmulq_f32(vld1q_f32(dst.add(i + 3 * J)), k));
        i += STEP;
    }
    while i < len {
        *dst.add(i) *= factor;
        i += 1;
    }
}

#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
unsafe fn strided_neon(
    dst: *mut f32,
    factor: f32,
    row0: usize,
    col0: usize,
    rows: usize,
    cols: usize,
    stride: usize,
) {
    use core::arch::aarch64::*;
    const J: usize = 4;
    const STEP: usize = 16;
    let k = vdupq_n_f32(factor);
    let main = cols - cols % STEP;
    for r in 0..rows {
        let d = dst.add((row0 + r) * stride + col0);
        let mut i = 0;
        while i < main {
            vst1q_f32(d.add(i), vmulq_f32(vld1q_f32(d.add(i)), k));
            vst1q_f32(d.add(i + J), vmulq_f32(vld1q_f32(d.add(i + J)), k));
            vst1q_f32(d.add(i + 2 * J), vmulq_f32(vld1q_f32(d.add(i + 2 * J)), k));
            vst1q_f32(d.add(i + 3 * J), vmulq_f32(vld1q_f32(d.add(i + 3 * J)), k));
            i += STEP;
        }
        while i < cols {
            *d.add(i) *= factor;
            i += 1;
        }
    }
}

unsafe fn dense_scalar(dst: *mut f32, factor: f32, len: usize) {
    const STEP: usize = 8;
    let main = len - len % STEP;
    let mut i = 0;
    while i < main {
        *dst.add(i) *= factor;
        *dst.add(i + 1) *= factor;
        *dst.add(i + 2) *= factor;
        *dst.add(i + 3) *= factor;
        *dst.add(i + 4) *= factor;
        *dst.add(i + 5) *= factor;
        *dst.add(i + 6) *= factor;
        *dst.add(i + 7) *= factor;
        i += STEP;
    }
    while i < len {
        *dst.add(i) *= factor;
        i += 1;
    }
}

unsafe fn strided_scalar(
    dst: *mut f32,
    factor: f32,
    row0: usize,
    col0: usize,
    rows: usize,
    cols: usize,
    stride: usize,
) {
    const STEP: usize = 4;
    let main = cols - cols % STEP;
    for r in 0..rows {
        let d = dst.add((row0 + r) * stride + col0);
        let mut i = 0;
        while i < main {
            *d.add(i) *= factor;
            *d.add(i + 1) *= factor;
            *d.add(i + 2) *= factor;
            *d.add(i + 3) *= factor;
            i += STEP;
        }
        while i < cols {
            *d.add(i) *= factor;
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dense_matches_naive() {
        let a: Vec<f32> = (0..85).map(|i| i as f32 - 40.0).collect();
        let expect: Vec<f32> = a.iter().map(|x| x * 2.5).collect();

        let mut out = a;
        dense(&mut out, 2.5);
        assert_eq!(out, expect);
    }

    #[test]
    fn test_scale_by_zero_and_one() {
        let a: Vec<f32> = (0..20).map(|i| i as f32 + 0.5).collect();

        let mut out = a.clone();
        dense(&mut out, 1.0);
        assert_eq!(out, a);

        dense(&mut out, 0.0);
        assert!(out.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_strided_touches_only_its_region() {
        let stride = 12;
        let mut dst = vec![2.0f32; 5 * stride];

        unsafe { strided(dst.as_mut_ptr(), 10.0, 1, 2, 3, 7, stride) };

        for r in 0..5 {
            for c in 0..stride {
                let inside = (1..4).contains(&r) && (2..9).contains(&c);
                let want = if inside { 20.0 } else { 2.0 };
                assert_eq!(dst[r * stride + c], want, "at ({r}, {c})");
            }
        }
    }

    #[test]
    fn test_simd_matches_scalar_bitwise() {
        let a: Vec<f32> = (0..170).map(|i| (i as f32).sqrt()).collect();

        let mut fast = a.clone();
        dense(&mut fast, 0.3);

        let mut plain = a;
        unsafe { dense_scalar(plain.as_mut_ptr(), 0.3, plain.len()) };

        assert_eq!(fast, plain);
    }
}
