//! The page-sized, persistent tile record.
//!
//! This is the exact in-memory layout mapped by the persistent file: an
//! in-place mapping of a strongly-typed record. Any change to field order
//! or size is a file-format change — external tools that read `torus.dat`
//! directly share this definition.

use super::cell::{Cell, DEFAULT_COLOR, DEFAULT_GLYPH};
use super::constants::{CELL_COLS, CELL_ROWS, PAGE_SIZE};
use bytemuck::{Pod, Zeroable};

/// Unpadded field layout, used only to compute the trailing padding below.
#[repr(C)]
struct UnpaddedTile {
	cells: [[u8; CELL_COLS]; CELL_ROWS],
	colors: [[u8; CELL_COLS]; CELL_ROWS],
	create_time: u64,
	modify_time: u64,
	access_time: u64,
	modify_count: u32,
	access_count: u32,
}

const TILE_PAD_LEN: usize = PAGE_SIZE - std::mem::size_of::<UnpaddedTile>();

/// One tile: its cells, colours, and metadata, packed into exactly one
/// `PAGE_SIZE`-byte, page-aligned record.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct Tile {
	pub cells: [[u8; CELL_COLS]; CELL_ROWS],
	pub colors: [[u8; CELL_COLS]; CELL_ROWS],
	/// Seconds since the epoch the tile was first touched; 0 means
	/// uninitialised.
	pub create_time: u64,
	pub modify_time: u64,
	pub access_time: u64,
	pub modify_count: u32,
	pub access_count: u32,
	_pad: [u8; TILE_PAD_LEN],
}

const _: () = assert!(std::mem::size_of::<Tile>() == PAGE_SIZE, "Tile must be page-sized");
const _: () = assert!(std::mem::align_of::<Tile>() <= PAGE_SIZE, "Tile alignment must fit a page");

impl Tile {
	/// `create_time == 0` means this tile has never been touched. A tile
	/// genuinely created at the Unix epoch is indistinguishable from
	/// uninitialised; this is inherited behaviour, not a bug.
	#[must_use]
	pub fn is_uninitialized(&self) -> bool {
		self.create_time == 0
	}

	/// Fills cells with spaces, colours with white-on-black, and stamps
	/// `create_time`. Does not touch `access_time`/`modify_time`.
	pub fn initialize(&mut self, now: u64) {
		for row in &mut self.cells {
			row.fill(DEFAULT_GLYPH);
		}
		for row in &mut self.colors {
			row.fill(DEFAULT_COLOR);
		}
		self.create_time = now;
	}

	#[must_use]
	pub fn cell_at(&self, x: u8, y: u8) -> Cell {
		Cell::new(self.cells[y as usize][x as usize], self.colors[y as usize][x as usize])
	}

	pub fn set_cell_at(&mut self, x: u8, y: u8, cell: Cell) {
		self.cells[y as usize][x as usize] = cell.glyph;
		self.colors[y as usize][x as usize] = cell.color;
	}

	#[must_use]
	pub fn meta_snapshot(&self) -> TileMetaSnapshot {
		TileMetaSnapshot {
			create_time: self.create_time,
			modify_time: self.modify_time,
			access_time: self.access_time,
			modify_count: self.modify_count,
			access_count: self.access_count,
		}
	}
}

/// The five metadata fields of a [`Tile`], detached from its cell grid.
///
/// Used by the map aggregator, which reports an 11x11 window of these
/// alongside field-wise min/max, without copying any cell data.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct TileMetaSnapshot {
	pub create_time: u64,
	pub modify_time: u64,
	pub access_time: u64,
	pub modify_count: u32,
	pub access_count: u32,
}

impl TileMetaSnapshot {
	/// A snapshot for a never-touched tile: every field zero.
	#[must_use]
	pub fn never() -> TileMetaSnapshot {
		TileMetaSnapshot::zeroed()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tile_is_exactly_one_page() {
		assert_eq!(std::mem::size_of::<Tile>(), PAGE_SIZE);
	}

	#[test]
	fn fresh_tile_is_uninitialized() {
		let tile = Tile::zeroed();
		assert!(tile.is_uninitialized());
	}

	#[test]
	fn initialize_fills_spaces_and_white_on_black() {
		let mut tile = Tile::zeroed();
		tile.initialize(12345);
		assert!(!tile.is_uninitialized());
		assert_eq!(tile.create_time, 12345);
		let cell = tile.cell_at(0, 0);
		assert_eq!(cell.glyph, b' ');
		assert_eq!(cell.color, DEFAULT_COLOR);
		let cell = tile.cell_at((CELL_COLS - 1) as u8, (CELL_ROWS - 1) as u8);
		assert_eq!(cell.glyph, b' ');
	}

	#[test]
	fn set_and_get_cell_round_trips() {
		let mut tile = Tile::zeroed();
		tile.initialize(1);
		tile.set_cell_at(5, 3, Cell::new(b'X', 0x07));
		assert_eq!(tile.cell_at(5, 3), Cell::new(b'X', 0x07));
		// Neighbouring cells are untouched.
		assert_eq!(tile.cell_at(4, 3), Cell::blank());
	}
}
