//! Fixed dimensions of the canonical deployment.
//!
//! The torus's shape is fixed at compile time; this binary is built for a
//! 64x64 tile torus. A different deployment shape means rebuilding with
//! different constants here, not a runtime flag — the persistent file's
//! size is derived from these.

/// Rows of cells per tile.
pub const CELL_ROWS: usize = 25;
/// Columns of cells per tile.
pub const CELL_COLS: usize = 80;

/// Rows of tiles in the torus.
pub const TILE_ROWS: u32 = 64;
/// Columns of tiles in the torus.
pub const TILE_COLS: u32 = 64;

/// Size in bytes of one page-aligned tile record.
pub const PAGE_SIZE: usize = 4096;

/// Size in bytes of the persistent file: `TILE_ROWS * TILE_COLS * PAGE_SIZE`.
#[must_use]
pub const fn tiles_file_size() -> u64 {
	TILE_ROWS as u64 * TILE_COLS as u64 * PAGE_SIZE as u64
}

/// The canonical spawn tile: the center of the torus.
#[must_use]
pub const fn spawn_tile() -> (u32, u32) {
	(TILE_COLS / 2, TILE_ROWS / 2)
}

/// The canonical spawn cell: the center of a tile.
#[must_use]
pub const fn spawn_cell() -> (u8, u8) {
	(CELL_COLS as u8 / 2, CELL_ROWS as u8 / 2)
}
