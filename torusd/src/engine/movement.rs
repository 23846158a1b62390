//! `Move`, `Flip`, and `Tele` handlers.
//!
//! All three funnel into [`post_move`]: a `Move` ack (plus, on a tile
//! change, a `Tile` header/payload and a bulk cursor snapshot) to the mover,
//! then a departure cast to the old tile and an arrival cast to the new one.

use crate::client::Client;
use crate::engine::broadcast::{broadcast, send_to};
use crate::registry::{ClientId, Registry};
use mio::net::UnixStream;
use torus_core::proto::ServerFrame;
use torus_core::{spawn, types::constants, CellCoord, TileCoord};
use torus_store::TileStore;

/// Admits a newly-accepted connection: spawns it at the canonical center
/// tile and center cell, sends it the initial `Move`/`Tile`/cursor-snapshot
/// sequence, and casts its arrival to whoever already shares that tile.
/// There is no previous tile to depart from, so no departure cast is sent.
///
/// Returns the new client's id and whether its own sends all succeeded; if
/// not, the caller should remove it immediately (it still gets a proper
/// departure broadcast on the way out).
pub fn admit(registry: &mut Registry, store: &mut TileStore, stream: UnixStream) -> (ClientId, bool) {
	let (tile_x, tile_y) = constants::spawn_tile();
	let (cell_x, cell_y) = constants::spawn_cell();
	let tile = TileCoord::new(tile_x, tile_y);
	let cell = CellCoord::new(cell_x, cell_y);

	let id = registry.insert(Client::new(stream, tile, cell));

	let mut origin_ok = send_to(registry, store, id, ServerFrame::Move { cell_x, cell_y });
	origin_ok &= send_to(registry, store, id, ServerFrame::Tile);
	for peer in registry.co_located(tile, Some(id)) {
		if let Some(peer_cell) = registry.get(peer).map(|c| c.cell) {
			origin_ok &= send_to(registry, store, id, ServerFrame::cursor_arrive(peer_cell.x, peer_cell.y));
		}
	}
	broadcast(registry, store, tile, Some(id), ServerFrame::cursor_arrive(cell.x, cell.y));

	(id, origin_ok)
}

/// `Move{dx, dy}`: clamps and applies the step, then emits the shared
/// post-move message sequence. Returns whether the mover's own sends all
/// succeeded; the caller removes it if not.
pub fn apply_move(registry: &mut Registry, store: &mut TileStore, id: ClientId, dx: i8, dy: i8) -> bool {
	let Some((old_cell, old_tile)) = registry.cell_tile(id) else {
		return false;
	};
	let (new_cell, new_tile) = torus_core::move_cursor(old_cell, old_tile, dx, dy);
	registry.set_cell_tile(id, new_cell, new_tile);
	post_move(registry, store, id, old_tile, old_cell, new_tile, new_cell)
}

/// `Flip`: jumps to the diametrically opposite tile, cell unchanged. Always
/// a tile change.
pub fn apply_flip(registry: &mut Registry, store: &mut TileStore, id: ClientId) -> bool {
	let Some((cell, old_tile)) = registry.cell_tile(id) else {
		return false;
	};
	let new_tile = old_tile.flipped(constants::TILE_COLS, constants::TILE_ROWS);
	registry.set_cell_tile(id, cell, new_tile);
	post_move(registry, store, id, old_tile, cell, new_tile, cell)
}

/// `Tele{port}`: jumps to the port's tile and resets to the spawn cell. An
/// out-of-range port fails the client before any state changes or messages
/// are sent.
pub fn apply_teleport(registry: &mut Registry, store: &mut TileStore, id: ClientId, port: u8) -> bool {
	let Some(port_tile) = spawn::port_tile(port) else {
		return false;
	};
	let Some((old_cell, old_tile)) = registry.cell_tile(id) else {
		return false;
	};
	let (spawn_x, spawn_y) = constants::spawn_cell();
	let new_cell = CellCoord::new(spawn_x, spawn_y);
	let new_tile = TileCoord::new(port_tile.0, port_tile.1);
	registry.set_cell_tile(id, new_cell, new_tile);
	post_move(registry, store, id, old_tile, old_cell, new_tile, new_cell)
}

/// The message sequence every cursor move emits, in order: `Move` ack to
/// the mover; on a tile change, `Tile` then a bulk `Cursor`
/// snapshot of the new tile's other occupants, both to the mover, then a
/// departure cast to the old tile and an arrival cast to the new one; on no
/// tile change, a single `Cursor{old -> new}` cast within the shared tile,
/// skipped entirely when the cell didn't move either (a zero-delta `Move`
/// is a no-op for observers, though the mover still gets its ack).
fn post_move(
	registry: &mut Registry,
	store: &mut TileStore,
	id: ClientId,
	old_tile: TileCoord,
	old_cell: CellCoord,
	new_tile: TileCoord,
	new_cell: CellCoord,
) -> bool {
	let mut origin_ok = send_to(registry, store, id, ServerFrame::Move { cell_x: new_cell.x, cell_y: new_cell.y });

	if new_tile != old_tile {
		origin_ok &= send_to(registry, store, id, ServerFrame::Tile);
		for peer in registry.co_located(new_tile, Some(id)) {
			if let Some(peer_cell) = registry.get(peer).map(|c| c.cell) {
				origin_ok &= send_to(registry, store, id, ServerFrame::cursor_arrive(peer_cell.x, peer_cell.y));
			}
		}
		broadcast(registry, store, old_tile, None, ServerFrame::cursor_depart(old_cell.x, old_cell.y));
		broadcast(registry, store, new_tile, Some(id), ServerFrame::cursor_arrive(new_cell.x, new_cell.y));
	} else if old_cell != new_cell {
		broadcast(
			registry,
			store,
			new_tile,
			Some(id),
			ServerFrame::Cursor {
				old_x: old_cell.x,
				old_y: old_cell.y,
				new_x: new_cell.x,
				new_y: new_cell.y,
			},
		);
	}

	origin_ok
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::client::Client;
	use mio::net::UnixStream;
	use std::io::Read;
	use std::os::unix::net::UnixStream as StdUnixStream;

	fn paired_client(tile: TileCoord, cell: CellCoord) -> (Client, StdUnixStream) {
		let (server_side, client_side) = StdUnixStream::pair().unwrap();
		server_side.set_nonblocking(true).unwrap();
		(Client::new(UnixStream::from_std(server_side), tile, cell), client_side)
	}

	fn temp_store() -> (tempfile::TempDir, TileStore) {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("torus.dat");
		let store = TileStore::open(&path, 64, 64).unwrap();
		(dir, store)
	}

	#[test]
	fn move_within_a_tile_sends_only_move_and_cursor() {
		let (_dir, mut store) = temp_store();
		let mut registry = Registry::new();
		let tile = TileCoord::new(32, 32);
		let (mover, mut mover_peer) = paired_client(tile, CellCoord::new(40, 12));
		let (_other, mut other_peer) = paired_client(tile, CellCoord::new(41, 12));
		let mover_id = registry.insert(mover);
		registry.insert(_other);

		assert!(apply_move(&mut registry, &mut store, mover_id, 5, -3));

		let mut buf = [0u8; torus_core::proto::SERVER_FRAME_SIZE];
		mover_peer.read_exact(&mut buf).unwrap();
		assert_eq!(buf[0], 1); // Move tag
		assert_eq!(buf[1], 45);
		assert_eq!(buf[2], 9);

		other_peer.read_exact(&mut buf).unwrap();
		assert_eq!(buf[0], 3); // Cursor tag
	}

	#[test]
	fn zero_delta_move_acks_but_sends_no_cursor_to_observers() {
		let (_dir, mut store) = temp_store();
		let mut registry = Registry::new();
		let tile = TileCoord::new(32, 32);
		let (mover, mut mover_peer) = paired_client(tile, CellCoord::new(40, 12));
		let (_other, mut other_peer) = paired_client(tile, CellCoord::new(41, 12));
		let mover_id = registry.insert(mover);
		registry.insert(_other);

		assert!(apply_move(&mut registry, &mut store, mover_id, 0, 0));

		let mut buf = [0u8; torus_core::proto::SERVER_FRAME_SIZE];
		mover_peer.read_exact(&mut buf).unwrap();
		assert_eq!(buf[0], 1); // Move ack, still sent
		assert_eq!(buf[1], 40);
		assert_eq!(buf[2], 12);

		other_peer.set_nonblocking(true).unwrap();
		let mut probe = [0u8; 1];
		assert_eq!(other_peer.read(&mut probe).unwrap_err().kind(), std::io::ErrorKind::WouldBlock);
	}

	#[test]
	fn move_across_a_tile_boundary_sends_tile_header() {
		let (_dir, mut store) = temp_store();
		let mut registry = Registry::new();
		let (mover, mut mover_peer) = paired_client(TileCoord::new(32, 32), CellCoord::new(79, 12));
		let mover_id = registry.insert(mover);

		assert!(apply_move(&mut registry, &mut store, mover_id, 1, 0));

		let mut buf = [0u8; torus_core::proto::SERVER_FRAME_SIZE];
		mover_peer.read_exact(&mut buf).unwrap(); // Move
		mover_peer.read_exact(&mut buf).unwrap();
		assert_eq!(buf[0], 0); // Tile tag
		let mut tile_payload = vec![0u8; torus_core::PAGE_SIZE];
		mover_peer.read_exact(&mut tile_payload).unwrap();

		let (_, tile) = registry.cell_tile(mover_id).unwrap();
		assert_eq!(tile, TileCoord::new(33, 32));
	}

	#[test]
	fn flip_jumps_to_the_opposite_tile_keeping_the_cell() {
		let (_dir, mut store) = temp_store();
		let mut registry = Registry::new();
		let (client, _peer) = paired_client(TileCoord::new(32, 32), CellCoord::new(40, 12));
		let id = registry.insert(client);

		apply_flip(&mut registry, &mut store, id);

		let (cell, tile) = registry.cell_tile(id).unwrap();
		assert_eq!(tile, TileCoord::new(0, 0));
		assert_eq!(cell, CellCoord::new(40, 12));
	}

	#[test]
	fn teleport_to_an_invalid_port_fails_without_moving() {
		let (_dir, mut store) = temp_store();
		let mut registry = Registry::new();
		let (client, _peer) = paired_client(TileCoord::new(32, 32), CellCoord::new(40, 12));
		let id = registry.insert(client);

		assert!(!apply_teleport(&mut registry, &mut store, id, 200));

		let (cell, tile) = registry.cell_tile(id).unwrap();
		assert_eq!(tile, TileCoord::new(32, 32));
		assert_eq!(cell, CellCoord::new(40, 12));
	}

	#[test]
	fn teleport_is_idempotent_for_the_same_port() {
		let (_dir, mut store) = temp_store();
		let mut registry = Registry::new();
		let (client, _peer) = paired_client(TileCoord::new(32, 32), CellCoord::new(40, 12));
		let id = registry.insert(client);

		apply_teleport(&mut registry, &mut store, id, 1);
		let first = registry.cell_tile(id).unwrap();
		apply_teleport(&mut registry, &mut store, id, 1);
		let second = registry.cell_tile(id).unwrap();
		assert_eq!(first, second);
	}

	#[test]
	fn admitting_a_client_spawns_it_at_the_canonical_center() {
		let (_dir, mut store) = temp_store();
		let mut registry = Registry::new();
		let (server_side, mut client_side) = StdUnixStream::pair().unwrap();
		server_side.set_nonblocking(true).unwrap();

		let (id, ok) = admit(&mut registry, &mut store, UnixStream::from_std(server_side));
		assert!(ok);

		let (cell, tile) = registry.cell_tile(id).unwrap();
		let (spawn_x, spawn_y) = constants::spawn_tile();
		assert_eq!(tile, TileCoord::new(spawn_x, spawn_y));
		assert_eq!(cell, CellCoord::new(constants::spawn_cell().0, constants::spawn_cell().1));

		let mut buf = [0u8; torus_core::proto::SERVER_FRAME_SIZE];
		client_side.read_exact(&mut buf).unwrap();
		assert_eq!(buf[0], 1); // Move
		client_side.read_exact(&mut buf).unwrap();
		assert_eq!(buf[0], 0); // Tile
		let mut payload = vec![0u8; torus_core::PAGE_SIZE];
		client_side.read_exact(&mut payload).unwrap();
	}

	#[test]
	fn a_second_admitted_client_sees_the_first_arrive() {
		let (_dir, mut store) = temp_store();
		let mut registry = Registry::new();
		let (first_server, _first_peer) = StdUnixStream::pair().unwrap();
		first_server.set_nonblocking(true).unwrap();
		let (_first_id, _) = admit(&mut registry, &mut store, UnixStream::from_std(first_server));

		let (second_server, mut second_peer) = StdUnixStream::pair().unwrap();
		second_server.set_nonblocking(true).unwrap();
		let (_second_id, ok) = admit(&mut registry, &mut store, UnixStream::from_std(second_server));
		assert!(ok);

		let mut buf = [0u8; torus_core::proto::SERVER_FRAME_SIZE];
		second_peer.read_exact(&mut buf).unwrap(); // Move
		second_peer.read_exact(&mut buf).unwrap(); // Tile
		assert_eq!(buf[0], 0);
		let mut payload = vec![0u8; torus_core::PAGE_SIZE];
		second_peer.read_exact(&mut payload).unwrap();
		second_peer.read_exact(&mut buf).unwrap();
		assert_eq!(buf[0], 3); // bulk cursor snapshot of the first client
	}
}
