//! `Map` handler: an 11x11 metadata window around the requester's tile,
//! plus field-wise min/max across that window.
//!
//! Nothing in the window is lazily initialised by the scan — `peek_meta`
//! reads whatever is already on disk — and the scan never touches any other
//! client, so there is no observer broadcast here, only a reply.

use crate::registry::{ClientId, Registry};
use torus_core::proto::{MapRecord, ServerFrame, MAP_WINDOW};
use torus_core::types::constants::{TILE_COLS, TILE_ROWS};
use torus_core::{clock, TileMetaSnapshot};
use torus_store::TileStore;

/// Runs the scan and replies with a `Map` header plus its [`MapRecord`]
/// payload. Returns whether the reply was sent successfully.
pub fn apply_map(registry: &mut Registry, store: &mut TileStore, id: ClientId) -> bool {
	let Some((_, center)) = registry.cell_tile(id) else {
		return false;
	};

	let mut acc = Accumulator::new();
	let mut meta = [[TileMetaSnapshot::never(); MAP_WINDOW]; MAP_WINDOW];
	let half = (MAP_WINDOW / 2) as i64;

	for (wy, row) in meta.iter_mut().enumerate() {
		for (wx, slot) in row.iter_mut().enumerate() {
			let dx = wx as i64 - half;
			let dy = wy as i64 - half;
			let x = torus_core::wrap(i64::from(center.x) + dx, i64::from(TILE_COLS)) as u32;
			let y = torus_core::wrap(i64::from(center.y) + dy, i64::from(TILE_ROWS)) as u32;
			let snapshot = store.peek_meta(x, y);
			acc.accumulate(snapshot);
			*slot = snapshot;
		}
	}

	let record = MapRecord {
		now: clock::now(),
		min: acc.min(),
		max: acc.max(),
		meta,
	};

	let Some(stream) = registry.stream_mut(id) else {
		return false;
	};
	if crate::wire::send_frame(stream, ServerFrame::Map).is_err() {
		return false;
	}
	let Some(stream) = registry.stream_mut(id) else {
		return false;
	};
	crate::wire::send_map(stream, &record).is_ok()
}

/// Field-wise min (ignoring zero on the time fields, which means "never")
/// and max across a run of [`TileMetaSnapshot`]s.
struct Accumulator {
	min_create: u64,
	min_modify: u64,
	min_access: u64,
	min_modify_count: u32,
	min_access_count: u32,
	max_create: u64,
	max_modify: u64,
	max_access: u64,
	max_modify_count: u32,
	max_access_count: u32,
}

impl Accumulator {
	fn new() -> Accumulator {
		Accumulator {
			min_create: u64::MAX,
			min_modify: u64::MAX,
			min_access: u64::MAX,
			min_modify_count: u32::MAX,
			min_access_count: u32::MAX,
			max_create: 0,
			max_modify: 0,
			max_access: 0,
			max_modify_count: 0,
			max_access_count: 0,
		}
	}

	fn accumulate(&mut self, s: TileMetaSnapshot) {
		if s.create_time != 0 {
			self.min_create = self.min_create.min(s.create_time);
		}
		if s.modify_time != 0 {
			self.min_modify = self.min_modify.min(s.modify_time);
		}
		if s.access_time != 0 {
			self.min_access = self.min_access.min(s.access_time);
		}
		self.min_modify_count = self.min_modify_count.min(s.modify_count);
		self.min_access_count = self.min_access_count.min(s.access_count);

		self.max_create = self.max_create.max(s.create_time);
		self.max_modify = self.max_modify.max(s.modify_time);
		self.max_access = self.max_access.max(s.access_time);
		self.max_modify_count = self.max_modify_count.max(s.modify_count);
		self.max_access_count = self.max_access_count.max(s.access_count);
	}

	fn min(&self) -> TileMetaSnapshot {
		TileMetaSnapshot {
			create_time: if self.min_create == u64::MAX { 0 } else { self.min_create },
			modify_time: if self.min_modify == u64::MAX { 0 } else { self.min_modify },
			access_time: if self.min_access == u64::MAX { 0 } else { self.min_access },
			modify_count: self.min_modify_count,
			access_count: self.min_access_count,
		}
	}

	fn max(&self) -> TileMetaSnapshot {
		TileMetaSnapshot {
			create_time: self.max_create,
			modify_time: self.max_modify,
			access_time: self.max_access,
			modify_count: self.max_modify_count,
			access_count: self.max_access_count,
		}
	}
}
