//! Partitioning math for the tiled executor.
//!
//! 2-D regions split into a fixed 8x8 grid; the last grid row and column
//! absorb the remainders so the union of tiles covers every cell exactly
//! once. 1-D copies split into fixed 256-element chunks with the tail
//! absorbed into the final chunk. Disjointness of these partitions is the
//! whole safety argument for the parallel path: no two tasks ever touch the
//! same destination element.

/// Grid side for 2-D tiling.
pub const GRID: usize = 8;

/// Partition count per tiled 2-D operation.
pub const PARTITIONS: usize = GRID * GRID;

/// Elements per chunk for tiled 1-D copy.
pub const COPY_CHUNK: usize = 256;

/// One rectangular sub-region of a matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub row0: usize,
    pub col0: usize,
    pub rows: usize,
    pub cols: usize,
}

/// Tile for partition index `part` of a `rows x cols` region.
///
/// Grid position is `(part % GRID, part / GRID)`; base tile size is
/// `rows / GRID` by `cols / GRID` and the last row/column of the grid picks
/// up `rows % GRID` / `cols % GRID`. Tiles can be empty when a dimension is
/// smaller than the grid.
pub fn tile(part: usize, rows: usize, cols: usize) -> Tile {
    debug_assert!(part < PARTITIONS);
    let gi = part % GRID;
    let gj = part / GRID;
    let base_rows = rows / GRID;
    let base_cols = cols / GRID;

    Tile {
        row0: gi * base_rows,
        col0: gj * base_cols,
        rows: base_rows + if gi == GRID - 1 { rows % GRID } else { 0 },
        cols: base_cols + if gj == GRID - 1 { cols % GRID } else { 0 },
    }
}

/// Number of chunks a `len`-element copy splits into.
///
/// The tail (`len % COPY_CHUNK`) belongs to the last chunk rather than to a
/// chunk of its own.
pub fn copy_chunks(len: usize) -> usize {
    len / COPY_CHUNK
}

/// Half-open element span of copy chunk `part`.
pub fn chunk_span(part: usize, len: usize) -> (usize, usize) {
    let chunks = copy_chunks(len);
    debug_assert!(part < chunks);
    let start = part * COPY_CHUNK;
    let end = if part == chunks - 1 {
        len
    } else {
        start + COPY_CHUNK
    };
    (start, end)
}
