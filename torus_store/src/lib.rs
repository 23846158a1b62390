//! The persistent, memory-mapped tile store.
//!
//! Backed by a file of exactly `tile_rows * tile_cols * PAGE_SIZE` bytes,
//! created on first run and mapped read/write shared. Every failure here is
//! a startup failure: opening, sizing, mapping, or advising the region are
//! all fatal, and no recovery is attempted once the server is running.

use anyhow::{Context, Result};
use memmap2::MmapMut;
use std::fs::OpenOptions;
use std::path::Path;
use torus_core::clock::now;
use torus_core::types::constants::PAGE_SIZE;
use torus_core::{Tile, TileMetaSnapshot};

/// An open, mapped tile store.
///
/// Owns the mapping exclusively for the process lifetime; there is no
/// synchronisation because exactly one single-threaded server ever touches
/// it at a time.
pub struct TileStore {
	mmap: MmapMut,
	tile_rows: u32,
	tile_cols: u32,
}

impl TileStore {
	/// Opens (creating if absent) the tile data file at `path`, sized for a
	/// `tile_cols x tile_rows` torus, and maps it read/write shared.
	pub fn open(path: &Path, tile_cols: u32, tile_rows: u32) -> Result<TileStore> {
		let file = OpenOptions::new()
			.read(true)
			.write(true)
			.create(true)
			.open(path)
			.with_context(|| format!("opening tile data file {}", path.display()))?;

		let size = u64::from(tile_cols) * u64::from(tile_rows) * PAGE_SIZE as u64;
		file.set_len(size)
			.with_context(|| format!("sizing tile data file {} to {size} bytes", path.display()))?;

		let mut mmap =
			unsafe { MmapMut::map_mut(&file) }.with_context(|| format!("mmap'ing tile data file {}", path.display()))?;

		advise(&mut mmap).context("advising tile data mapping")?;

		log::info!(
			"mapped tile store {} ({tile_cols}x{tile_rows} tiles, {size} bytes)",
			path.display()
		);

		Ok(TileStore { mmap, tile_rows, tile_cols })
	}

	#[must_use]
	pub fn tile_cols(&self) -> u32 {
		self.tile_cols
	}

	#[must_use]
	pub fn tile_rows(&self) -> u32 {
		self.tile_rows
	}

	fn index(&self, tile_x: u32, tile_y: u32) -> usize {
		debug_assert!(tile_x < self.tile_cols && tile_y < self.tile_rows);
		(tile_y as usize) * (self.tile_cols as usize) + (tile_x as usize)
	}

	fn tiles(&self) -> &[Tile] {
		bytemuck::cast_slice(&self.mmap[..])
	}

	fn tiles_mut(&mut self) -> &mut [Tile] {
		bytemuck::cast_slice_mut(&mut self.mmap[..])
	}

	/// Returns the tile at `(tile_x, tile_y)`, lazily initialising it (fill
	/// with spaces / white-on-black, stamp `create_time`) if it has never
	/// been touched.
	pub fn get(&mut self, tile_x: u32, tile_y: u32) -> &mut Tile {
		let idx = self.index(tile_x, tile_y);
		let tile = &mut self.tiles_mut()[idx];
		if tile.is_uninitialized() {
			tile.initialize(now());
		}
		tile
	}

	/// `get`, then stamps `access_time`/`access_count`.
	pub fn access(&mut self, tile_x: u32, tile_y: u32) -> &mut Tile {
		let tile = self.get(tile_x, tile_y);
		tile.access_time = now();
		tile.access_count += 1;
		tile
	}

	/// `get`, then stamps `modify_time`/`modify_count`.
	pub fn modify(&mut self, tile_x: u32, tile_y: u32) -> &mut Tile {
		let tile = self.get(tile_x, tile_y);
		tile.modify_time = now();
		tile.modify_count += 1;
		tile
	}

	/// Reads metadata for `(tile_x, tile_y)` without lazily initialising it
	/// and without touching any stamp. A never-touched tile reads back as
	/// all-zero, which is exactly the "never" sentinel the map aggregator's
	/// min/max computation relies on — unlike `get`/`access`/`modify`, this
	/// must not manufacture a `create_time`.
	#[must_use]
	pub fn peek_meta(&self, tile_x: u32, tile_y: u32) -> TileMetaSnapshot {
		let idx = self.index(tile_x, tile_y);
		self.tiles()[idx].meta_snapshot()
	}
}

#[cfg(unix)]
fn advise(mmap: &mut MmapMut) -> Result<()> {
	mmap.advise(memmap2::Advice::Random).context("madvise(MADV_RANDOM)")?;
	// Exclude the mapping from core dumps where the platform supports it.
	// Advisory only; not required for correctness.
	#[cfg(target_os = "linux")]
	{
		if let Err(e) = mmap.advise(memmap2::Advice::DontDump) {
			log::debug!("madvise(MADV_DONTDUMP) unsupported: {e}");
		}
	}
	Ok(())
}

#[cfg(not(unix))]
fn advise(_mmap: &mut MmapMut) -> Result<()> {
	Ok(())
}

/// Computes the exact byte size of a `tile_cols x tile_rows` tile store.
#[must_use]
pub fn file_size(tile_cols: u32, tile_rows: u32) -> u64 {
	u64::from(tile_cols) * u64::from(tile_rows) * PAGE_SIZE as u64
}
