//! The bulk payload following a `Map` header frame.

use crate::types::tile::TileMetaSnapshot;
use bytemuck::{Pod, Zeroable};

/// Side length of the metadata window the map aggregator reports.
pub const MAP_WINDOW: usize = 11;

/// `{now, min, max, meta}`: one pass over an 11x11 window of tile metadata
/// centred on the requester's current tile.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct MapRecord {
	/// Wall-clock second at the time of the scan.
	pub now: u64,
	/// Field-wise minimum across the window (zero `create/modify/access_time`
	/// means "never" and is ignored when computing the minimum; counts are
	/// not ignored at zero).
	pub min: TileMetaSnapshot,
	/// Field-wise maximum across the window.
	pub max: TileMetaSnapshot,
	/// Row-major `[y][x]` metadata window, `MAP_WINDOW` per side.
	pub meta: [[TileMetaSnapshot; MAP_WINDOW]; MAP_WINDOW],
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn map_record_has_no_surprise_padding() {
		let expected = std::mem::size_of::<u64>()
			+ 2 * std::mem::size_of::<TileMetaSnapshot>()
			+ MAP_WINDOW * MAP_WINDOW * std::mem::size_of::<TileMetaSnapshot>();
		assert_eq!(std::mem::size_of::<MapRecord>(), expected);
	}
}
