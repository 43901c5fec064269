//! One-time CPU capability probe.
//!
//! All kernels work on 128-bit vectors (4 f32 lanes), so the variants only
//! differ in which instruction set carries the loads, stores and arithmetic.
//! The probe runs once, on first use, in a fixed priority order; the result
//! is cached for the life of the process and never re-evaluated. A machine
//! with no vector support always resolves to [`KernelVariant::Scalar`].

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which kernel implementation carries the elementwise loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KernelVariant {
    /// AArch64 Advanced SIMD.
    Neon,
    Sse42,
    Sse41,
    Avx2,
    Sse3,
    /// Plain scalar loops, 8-wide unrolled.
    Scalar,
}

impl KernelVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            KernelVariant::Neon => "neon",
            KernelVariant::Sse42 => "sse4.2",
            KernelVariant::Sse41 => "sse4.1",
            KernelVariant::Avx2 => "avx2",
            KernelVariant::Sse3 => "sse3",
            KernelVariant::Scalar => "scalar",
        }
    }

    pub fn is_simd(&self) -> bool {
        !matches!(self, KernelVariant::Scalar)
    }
}

impl std::fmt::Display for KernelVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The process-wide kernel variant, probed on first call.
pub fn select() -> KernelVariant {
    static CHOSEN: OnceLock<KernelVariant> = OnceLock::new();
    *CHOSEN.get_or_init(|| {
        let variant = probe();
        debug!(variant = variant.as_str(), "kernel variant selected");
        variant
    })
}

fn probe() -> KernelVariant {
    #[cfg(target_arch = "aarch64")]
    {
        if std::arch::is_aarch64_feature_detected!("neon") {
            return KernelVariant::Neon;
        }
    }
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("sse4.2") {
            return KernelVariant::Sse42;
        }
        if is_x86_feature_detected!("sse4.1") {
            return KernelVariant::Sse41;
        }
        if is_x86_feature_detected!("avx2") {
            return KernelVariant::Avx2;
        }
        if is_x86_feature_detected!("sse3") {
            return KernelVariant::Sse3;
        }
    }
    KernelVariant::Scalar
}
