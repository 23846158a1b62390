//! `Put{color, cell}` handler.
//!
//! Writes the cell into the editor's current tile, stamping
//! `modify_count`/`modify_time`, then echoes the same `Put` frame to the
//! editor and casts it to every other co-located observer.

use crate::engine::broadcast::{broadcast, send_to};
use crate::registry::{ClientId, Registry};
use torus_core::proto::ServerFrame;
use torus_core::Cell;
use torus_store::TileStore;

/// Applies the write, then emits `Put` to the editor and to observers.
/// Returns whether the editor's own send succeeded.
pub fn apply_put(registry: &mut Registry, store: &mut TileStore, id: ClientId, color: u8, cell: u8) -> bool {
	let Some((cursor_cell, tile)) = registry.cell_tile(id) else {
		return false;
	};

	store.modify(tile.x, tile.y).set_cell_at(cursor_cell.x, cursor_cell.y, Cell::new(cell, color));

	let frame = ServerFrame::Put {
		cell_x: cursor_cell.x,
		cell_y: cursor_cell.y,
		color,
		cell,
	};
	let origin_ok = send_to(registry, store, id, frame);
	broadcast(registry, store, tile, Some(id), frame);
	origin_ok
}
