//! Sequential vs tiled execution decision.
//!
//! A pure function of the operation family and the region's dimensions, so
//! tests can assert which path a given size takes. Arithmetic switches
//! earlier than copy because copy does far less work per element.

/// How a region will be executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    /// One dense kernel call over the whole region.
    Sequential,
    /// Fork-join over disjoint partitions.
    Tiled,
}

/// Operation families with distinct parallel thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpFamily {
    /// Add, subtract, Hadamard multiply, scalar multiply.
    Elementwise,
    Copy,
}

/// Side length whose square is the elementwise parallel threshold.
pub const ELEMENTWISE_SPLIT: usize = 64;

/// Side length whose square is the copy parallel threshold.
pub const COPY_SPLIT: usize = 256;

/// Decide how to execute an operation over a `rows x cols` region.
pub fn execution_mode(family: OpFamily, rows: usize, cols: usize) -> ExecMode {
    let split = match family {
        OpFamily::Elementwise => ELEMENTWISE_SPLIT,
        OpFamily::Copy => COPY_SPLIT,
    };
    if rows * cols < split * split {
        ExecMode::Sequential
    } else {
        ExecMode::Tiled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elementwise_threshold_boundary() {
        assert_eq!(
            execution_mode(OpFamily::Elementwise, 63, 63),
            ExecMode::Sequential
        );
        assert_eq!(
            execution_mode(OpFamily::Elementwise, 64, 64),
            ExecMode::Tiled
        );
    }

    #[test]
    fn test_threshold_counts_elements_not_sides() {
        // 32 * 128 == 64 * 64, so a skinny region still tiles.
        assert_eq!(
            execution_mode(OpFamily::Elementwise, 32, 128),
            ExecMode::Tiled
        );
        assert_eq!(
            execution_mode(OpFamily::Elementwise, 1, 4095),
            ExecMode::Sequential
        );
    }

    #[test]
    fn test_copy_threshold_is_higher() {
        assert_eq!(
            execution_mode(OpFamily::Copy, 255, 255),
            ExecMode::Sequential
        );
        assert_eq!(execution_mode(OpFamily::Copy, 256, 256), ExecMode::Tiled);
        // A size that tiles for arithmetic stays sequential for copy.
        assert_eq!(
            execution_mode(OpFamily::Copy, 64, 64),
            ExecMode::Sequential
        );
    }
}
