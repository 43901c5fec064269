//! Buffer copy kernels.
//!
//! Copy only ever runs over contiguous spans (whole buffers sequentially, or
//! fixed-size chunks on the pool), so there is no strided form.

use crate::capability::{self, KernelVariant};

/// Overwrite `dst` with the contents of `src`.
pub fn dense(dst: &mut [f32], src: &[f32]) {
    debug_assert_eq!(dst.len(), src.len());
    unsafe { dense_at(dst.as_mut_ptr(), src.as_ptr(), dst.len()) }
}

/// Copy `len` elements from `src` to `dst`.
///
/// # Safety
///
/// - `dst` and `src` must each be valid for `len` elements.
/// - The spans must not overlap.
pub(crate) unsafe fn dense_at(dst: *mut f32, src: *const f32, len: usize) {
    match capability::select() {
        #[cfg(target_arch = "x86_64")]
        KernelVariant::Sse42 => dense_sse42(dst, src, len),
        #[cfg(target_arch = "x86_64")]
        KernelVariant::Sse41 => dense_sse41(dst, src, len),
        #[cfg(target_arch = "x86_64")]
        KernelVariant::Avx2 => dense_avx2(dst, src, len),
        #[cfg(target_arch = "x86_64")]
        KernelVariant::Sse3 => dense_sse3(dst, src, len),
        #[cfg(target_arch = "aarch64")]
        KernelVariant::Neon => dense_neon(dst, src, len),
        _ => dense_scalar(dst, src, len),
    }
}

macro_rules! x86_copy {
    ($dense:ident, $feature:literal) => {
        #[cfg(target_arch = "x86_64")]
        #[target_feature(enable = $feature)]
        unsafe fn $dense(dst: *mut f32, src: *const f32, len: usize) {
            use core::arch::x86_64::*;
            const J: usize = 4;
            const STEP: usize = 16;
            let main = len - len % STEP;
            let mut i = 0;
            while i < main {
                _mm_storeu_ps(dst.add(i), _mm_loadu_ps(src.add(i)));
                _mm_storeu_ps(dst.add(i + J), _mm_loadu_ps(src.add(i + J)));
                _mm_storeu_ps(dst.add(i + 2 * J), _mm_loadu_ps(src.add(i + 2 * J)));
                _mm_storeu_ps(dst.add(i + 3 * J), _mm_loadu_ps(src.add(i + 3 * J)));
                i += STEP;
            }
            while i < len {
                *dst.add(i) = *src.add(i);
                i += 1;
            }
        }
    };
}

x86_copy!(dense_sse42, "sse4.2");
x86_copy!(dense_sse41, "sse4.1");
x86_copy!(dense_avx2, "avx2");
x86_copy!(dense_sse3, "sse3");

#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
unsafe fn dense_neon(dst: *mut f32, src: *const f32, len: usize) {
    use core::arch::aarch64::*;
    const J: usize = 4;
    const STEP: usize = 16;
    let main = len - len % STEP;
    let mut i = 0;
    while i < main {
        vst1q_f32(dst.add(i), vld1q_f32(src.add(i)));
        vst1q_f32(dst.add(i + J), vld1q_f32(src.add(i + J)));
        vst1q_f32(dst.add(i + 2 * J), vld1q_f32(src.add(i + 2 * J)));
        vst1q_f32(dst.add(i + 3 * J), vld1q_f32(src.add(i + 3 * J)));
        i += STEP;
    }
    while i < len {
        *dst.add(i) = *src.add(i);
        i += 1;
    }
}

unsafe fn dense_scalar(dst: *mut f32, src: *const f32, len: usize) {
    const STEP: usize = 8;
    let main = len - len % STEP;
    let mut i = 0;
    while i < main {
        *dst.add(i) = *src.add(i);
        *dst.add(i + 1) = *src.add(i + 1);
        *dst.add(i + 2) = *src.add(i + 2);
        *dst.add(i + 3) = *src.add(i + 3);
        *dst.add(i + 4) = *src.add(i + 4);
        *dst.add(i + 5) = *src.add(i + 5);
        *dst.add(i + 6) = *src.add(i + 6);
        *dst.add(i + 7) = *src.add(i + 7);
        i += STEP;
    }
    while i < len {
        *dst.add(i) = *src.add(i);
        i += 1;
    }
}
