//! Elementwise kernel set and the tiled executor glue.
//!
//! Each operation module exposes a safe `dense` entry point over whole
//! buffers and an unsafe `strided` entry point over a rectangular
//! sub-region addressed with the full region's stride. Both dispatch once
//! per call on the cached [`crate::capability::KernelVariant`].
//!
//! Kernel shape, shared by every variant: the main loop retires four
//! 128-bit vectors (16 elements) per iteration, then a scalar loop handles
//! the `len % 16` remainder. The degenerate scalar variant unrolls 8 wide
//! (4 wide per row in the strided form) with a single-element remainder.
//! Elementwise operations are independent per element, so every path is
//! bit-identical to a naive loop, and a region shorter than the unroll
//! width is handled entirely by the remainder loop.

use std::sync::OnceLock;

use forkpool::ForkPool;
use matriz_core::Shape;
use tracing::trace;

use crate::strategy::{execution_mode, ExecMode, OpFamily};
use crate::tile;

pub mod add;
pub mod copy;
pub mod hadamard;
pub mod scalar;
pub mod sub;

/// x86-64 dense + strided kernel pair for one feature level.
///
/// The body mirrors the scalar kernels exactly; only the instruction set
/// carrying the 128-bit loads, stores and arithmetic differs per variant.
macro_rules! x86_binary {
    ($dense:ident, $strided:ident, $feature:literal, $simd:ident, $op:tt) => {
        #[cfg(target_arch = "x86_64")]
        #[target_feature(enable = $feature)]
        unsafe fn $dense(dst: *mut f32, src: *const f32, len: usize) {
            use core::arch::x86_64::*;
            const J: usize = 4;
            const STEP: usize = 16;
            let main = len - len % STEP;
            let mut i = 0;
            while i < main {
                _mm_storeu_ps(
                    dst.add(i),
                    $simd(_mm_loadu_ps(dst.add(i)), _mm_loadu_ps(src.add(i))),
                );
                _mm_storeu_ps(
                    dst.add(i + J),
                    $simd(_mm_loadu_ps(dst.add(i + J)), _mm_loadu_ps(src.add(i + J))),
                );
                _mm_storeu_ps(
                    dst.add(i + 2 * J),
                    $simd(
                        _mm_loadu_ps(dst.add(i + 2 * J)),
                        _mm_loadu_ps(src.add(i + 2 * J)),
                    ),
                );
                _mm_storeu_ps(
                    dst.add(i + 3 * J),
                    $simd(
                        _mm_loadu_ps(dst.add(i + 3 * J)),
                        _mm_loadu_ps(src.add(i + 3 * J)),
                    ),
                );
                i += STEP;
            }
            while i < len {
                *dst.add(i) $op *src.add(i);
                i += 1;
            }
        }

        #[cfg(target_arch = "x86_64")]
        #[target_feature(enable = $feature)]
        unsafe fn $strided(
            dst: *mut f32,
            src: *const f32,
            row0: usize,
            col0: usize,
            rows: usize,
            cols: usize,
            stride: usize,
        ) {
            use core::arch::x86_64::*;
            const J: usize = 4;
            const STEP: usize = 16;
            let main = cols - cols % STEP;
            for r in 0..rows {
                let base = (row0 + r) * stride + col0;
                let d = dst.add(base);
                let s = src.add(base);
                let mut i = 0;
                while i < main {
                    _mm_storeu_ps(
                        d.add(i),
                        $simd(_mm_loadu_ps(d.add(i)), _mm_loadu_ps(s.add(i))),
                    );
                    _mm_storeu_ps(
                        d.add(i + J),
                        $simd(_mm_loadu_ps(d.add(i + J)), _mm_loadu_ps(s.add(i + J))),
                    );
                    _mm_storeu_ps(
                        d.add(i + 2 * J),
                        $simd(_mm_loadu_ps(d.add(i + 2 * J)), _mm_loadu_ps(s.add(i + 2 * J))),
                    );
                    _mm_storeu_ps(
                        d.add(i + 3 * J),
                        $simd(_mm_loadu_ps(d.add(i + 3 * J)), _mm_loadu_ps(s.add(i + 3 * J))),
                    );
                    i += STEP;
                }
                while i < cols {
                    *d.add(i) $op *s.add(i);
                    i += 1;
                }
            }
        }
    };
}

/// AArch64 NEON dense + strided kernel pair.
macro_rules! neon_binary {
    ($dense:ident, $strided:ident, $simd:ident, $op:tt) => {
        #[cfg(target_arch = "aarch64")]
        #[target_feature(enable = "neon")]
        unsafe fn $dense(dst: *mut f32, src: *const f32, len: usize) {
            use core::arch::aarch64::*;
            const J: usize = 4;
            const STEP: usize = 16;
            let main = len - len % STEP;
            let mut i = 0;
            while i < main {
                vst1q_f32(dst.add(i), $simd(vld1q_f32(dst.add(i)), vld1q_f32(src.add(i))));
                vst1q_f32(
                    dst.add(i + J),
                    $simd(vld1q_f32(dst.add(i + J)), vld1q_f32(src.add(i + J))),
                );
                vst1q_f32(
                    dst.add(i + 2 * J),
                    $simd(vld1q_f32(dst.add(i + 2 * J)), vld1q_f32(src.add(i + 2 * J))),
                );
                vst1q_f32(
                    dst.add(i + 3 * J),
                    $simd(vld1q_f32(dst.add(i + 3 * J)), vld1q_f32(src.add(i + 3 * J))),
                );
                i += STEP;
            }
            while i < len {
                *dst.add(i) $op *src.add(i);
                i += 1;
            }
        }

        #[cfg(target_arch = "aarch64")]
        #[target_feature(enable = "neon")]
        unsafe fn $strided(
            dst: *mut f32,
            src: *const f32,
            row0: usize,
            col0: usize,
            rows: usize,
            cols: usize,
            stride: usize,
        ) {
            use core::arch::aarch64::*;
            const J: usize = 4;
            const STEP: usize = 16;
            let main = cols - cols % STEP;
            for r in 0..rows {
                let base = (row0 + r) * stride + col0;
                let d = dst.add(base);
                let s = src.add(base);
                let mut i = 0;
                while i < main {
                    vst1q_f32(d.add(i), $simd(vld1q_f32(d.add(i)), vld1q_f32(s.add(i))));
                    vst1q_f32(
                        d.add(i + J),
                        $simd(vld1q_f32(d.add(i + J)), vld1q_f32(s.add(i + J))),
                    );
                    vst1q_f32(
                        d.add(i + 2 * J),
                        $simd(vld1q_f32(d.add(i + 2 * J)), vld1q_f32(s.add(i + 2 * J))),
                    );
                    vst1q_f32(
                        d.add(i + 3 * J),
                        $simd(vld1q_f32(d.add(i + 3 * J)), vld1q_f32(s.add(i + 3 * J))),
                    );
                    i += STEP;
                }
                while i < cols {
                    *d.add(i) $op *s.add(i);
                    i += 1;
                }
            }
        }
    };
}

/// Full kernel set for one binary elementwise operation: per-variant SIMD
/// pairs, the scalar fallback pair, and the two dispatch entry points.
/// Expanded once inside each operation module.
macro_rules! binary_kernels {
    ($simd:ident, $neon:ident, $op:tt) => {
        use crate::capability::{self, KernelVariant};

        /// Apply the operation over two whole buffers of equal length.
        pub fn dense(dst: &mut [f32], src: &[f32]) {
            debug_assert_eq!(dst.len(), src.len());
            // Buffers are live, equal-length and distinct; the kernels stay
            // inside `0..len`.
            unsafe { dense_at(dst.as_mut_ptr(), src.as_ptr(), dst.len()) }
        }

        /// Dense kernel over raw buffers.
        ///
        /// # Safety
        ///
        /// - `dst` and `src` must each be valid for `len` elements.
        /// - The buffers must not overlap.
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

        /// Apply the operation over a `rows x cols` sub-region whose origin
        /// is `(row0, col0)`, addressed row-major with the full region's
        /// `stride`.
        ///
        /// # Safety
        ///
        /// - `dst` and `src` must each be valid for the whole strided
        ///   extent, i.e. `(row0 + rows - 1) * stride + col0 + cols`
        ///   elements when `rows > 0`.
        /// - The buffers must not overlap.
        /// - Concurrent calls must target disjoint sub-regions of `dst`.
        pub unsafe fn strided(
            dst: *mut f32,
            src: *const f32,
            row0: usize,
            col0: usize,
            rows: usize,
            cols: usize,
            stride: usize,
        ) {
            match capability::select() {
                #[cfg(target_arch = "x86_64")]
                KernelVariant::Sse42 => {
                    strided_sse42(dst, src, row0, col0, rows, cols, stride)
                }
                #[cfg(target_arch = "x86_64")]
                KernelVariant::Sse41 => {
                    strided_sse41(dst, src, row0, col0, rows, cols, stride)
                }
                #[cfg(target_arch = "x86_64")]
                KernelVariant::Avx2 => {
                    strided_avx2(dst, src, row0, col0, rows, cols, stride)
                }
                #[cfg(target_arch = "x86_64")]
                KernelVariant::Sse3 => {
                    strided_sse3(dst, src, row0, col0, rows, cols, stride)
                }
                #[cfg(target_arch = "aarch64")]
                KernelVariant::Neon => {
                    strided_neon(dst, src, row0, col0, rows, cols, stride)
                }
                _ => strided_scalar(dst, src, row0, col0, rows, cols, stride),
            }
        }

        crate::kernels::x86_binary!(dense_sse42, strided_sse42, "sse4.2", $simd, $op);
        crate::kernels::x86_binary!(dense_sse41, strided_sse41, "sse4.1", $simd, $op);
        crate::kernels::x86_binary!(dense_avx2, strided_avx2, "avx2", $simd, $op);
        crate::kernels::x86_binary!(dense_sse3, strided_sse3, "sse3", $simd, $op);
        crate::kernels::neon_binary!(dense_neon, strided_neon, $neon, $op);

        unsafe fn dense_scalar(dst: *mut f32, src: *const f32, len: usize) {
            const STEP: usize = 8;
            let main = len - len % STEP;
            let mut i = 0;
            while i < main {
                *dst.add(i) $op *src.add(i);
                *dst.add(i + 1) $op *src.add(i + 1);
                *dst.add(i + 2) $op *src.add(i + 2);
                *dst.add(i + 3) $op *src.add(i + 3);
                *dst.add(i + 4) $op *src.add(i + 4);
                *dst.add(i + 5) $op *src.add(i + 5);
                *dst.add(i + 6) $op *src.add(i + 6);
                *dst.add(i + 7) $op *src.add(i + 7);
                i += STEP;
            }
            while i < len {
                *dst.add(i) $op *src.add(i);
                i += 1;
            }
        }

        unsafe fn strided_scalar(
            dst: *mut f32,
            src: *const f32,
            row0: usize,
            col0: usize,
            rows: usize,
            cols: usize,
            stride: usize,
        ) {
            const STEP: usize = 4;
            let main = cols - cols % STEP;
            for r in 0..rows {
                let base = (row0 + r) * stride + col0;
                let d = dst.add(base);
                let s = src.add(base);
                let mut i = 0;
                while i < main {
                    *d.add(i) $op *s.add(i);
                    *d.add(i + 1) $op *s.add(i + 1);
                    *d.add(i + 2) $op *s.add(i + 2);
                    *d.add(i + 3) $op *s.add(i + 3);
                    i += STEP;
                }
                while i < cols {
                    *d.add(i) $op *s.add(i);
                    i += 1;
                }
            }
        }
    };
}

pub(crate) use binary_kernels;
pub(crate) use neon_binary;
pub(crate) use x86_binary;

/// Pointer that may cross into pool tasks.
///
/// Tasks write through it only inside their own disjoint tile, which is the
/// same argument the pool's type-erased job makes for its context pointer.
struct SharedMut(*mut f32);
unsafe impl Send for SharedMut {}
unsafe impl Sync for SharedMut {}

struct SharedConst(*const f32);
unsafe impl Send for SharedConst {}
unsafe impl Sync for SharedConst {}

/// Process-wide fork-join pool, created on first tiled operation.
fn pool() -> &'static ForkPool {
    static POOL: OnceLock<ForkPool> = OnceLock::new();
    POOL.get_or_init(ForkPool::default)
}

type StridedKernel =
    unsafe fn(*mut f32, *const f32, usize, usize, usize, usize, usize);

/// Run one binary elementwise operation over the whole region, choosing the
/// sequential or tiled path by element count.
fn run_binary(
    dst: &mut [f32],
    src: &[f32],
    shape: Shape,
    dense: fn(&mut [f32], &[f32]),
    strided: StridedKernel,
) {
    match execution_mode(OpFamily::Elementwise, shape.rows, shape.cols) {
        ExecMode::Sequential => dense(dst, src),
        ExecMode::Tiled => {
            trace!(rows = shape.rows, cols = shape.cols, "tiled elementwise");
            let d = SharedMut(dst.as_mut_ptr());
            let s = SharedConst(src.as_ptr());
            pool().run(tile::PARTITIONS, |part| {
                // Capture the Sync wrappers whole, not their raw-pointer fields.
                let (d, s) = (&d, &s);
                let t = tile::tile(part, shape.rows, shape.cols);
                if t.rows == 0 || t.cols == 0 {
                    return;
                }
                // Tiles are disjoint and in bounds (tile module tests),
                // and both buffers span shape.len() elements.
                unsafe {
                    strided(d.0, s.0, t.row0, t.col0, t.rows, t.cols, shape.cols)
                }
            });
        }
    }
}

pub(crate) fn add_region(dst: &mut [f32], src: &[f32], shape: Shape) {
    run_binary(dst, src, shape, add::dense, add::strided);
}

pub(crate) fn sub_region(dst: &mut [f32], src: &[f32], shape: Shape) {
    run_binary(dst, src, shape, sub::dense, sub::strided);
}

pub(crate) fn hadamard_region(dst: &mut [f32], src: &[f32], shape: Shape) {
    run_binary(dst, src, shape, hadamard::dense, hadamard::strided);
}

/// Scalar multiply over the whole region.
pub(crate) fn scale_region(dst: &mut [f32], factor: f32, shape: Shape) {
    match execution_mode(OpFamily::Elementwise, shape.rows, shape.cols) {
        ExecMode::Sequential => scalar::dense(dst, factor),
        ExecMode::Tiled => {
            trace!(rows = shape.rows, cols = shape.cols, "tiled scale");
            let d = SharedMut(dst.as_mut_ptr());
            pool().run(tile::PARTITIONS, |part| {
                // Capture the Sync wrapper whole, not its raw-pointer field.
                let d = &d;
                let t = tile::tile(part, shape.rows, shape.cols);
                if t.rows == 0 || t.cols == 0 {
                    return;
                }
                unsafe {
                    scalar::strided(
                        d.0, factor, t.row0, t.col0, t.rows, t.cols, shape.cols,
                    )
                }
            });
        }
    }
}

/// Overwrite `dst` with `src`, chunked across the pool for large buffers.
pub(crate) fn copy_region(dst: &mut [f32], src: &[f32], shape: Shape) {
    match execution_mode(OpFamily::Copy, shape.rows, shape.cols) {
        ExecMode::Sequential => copy::dense(dst, src),
        ExecMode::Tiled => {
            trace!(rows = shape.rows, cols = shape.cols, "chunked copy");
            let len = dst.len();
            let d = SharedMut(dst.as_mut_ptr());
            let s = SharedConst(src.as_ptr());
            pool().run(tile::copy_chunks(len), |part| {
                // Capture the Sync wrappers whole, not their raw-pointer fields.
                let (d, s) = (&d, &s);
                let (start, end) = tile::chunk_span(part, len);
                // Chunk spans are disjoint and cover 0..len exactly.
                unsafe { copy::dense_at(d.0.add(start), s.0.add(start), end - start) }
            });
        }
    }
}
