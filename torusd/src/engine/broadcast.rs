//! Sending frames to one client, or to every client sharing a tile.
//!
//! A failed recipient is evicted, with its own departure cast, without
//! interrupting delivery to the rest of the window, so one broken peer can
//! never swallow a broadcast meant for the others.

use crate::registry::{ClientId, Registry};
use crate::wire;
use torus_core::proto::ServerFrame;
use torus_core::TileCoord;
use torus_store::TileStore;

/// Sends one frame to `id`. If the frame is [`ServerFrame::Tile`], also
/// fetches and sends the bulk tile payload for whatever tile `id` currently
/// occupies, stamping `access_count` the moment the header send succeeds:
/// the fetch happens unconditionally once the header is on the wire, since
/// the wire protocol gives the server no acknowledgement of whether the
/// client actually reads the payload — `access_count` counts attempted
/// transfers, not confirmed ones.
pub fn send_to(registry: &mut Registry, store: &mut TileStore, id: ClientId, frame: ServerFrame) -> bool {
	let Some(tile) = registry.get(id).map(|c| c.tile) else {
		return false;
	};
	let Some(stream) = registry.stream_mut(id) else {
		return false;
	};
	if wire::send_frame(stream, frame).is_err() {
		return false;
	}
	if matches!(frame, ServerFrame::Tile) {
		let tile = store.access(tile.x, tile.y);
		let Some(stream) = registry.stream_mut(id) else {
			return false;
		};
		if wire::send_tile(stream, tile).is_err() {
			return false;
		}
	}
	true
}

/// Sends `frame` to every client co-located with `tile`, excluding `exclude`.
/// A recipient whose send fails is evicted immediately, with its own
/// departure broadcast, rather than aborting the rest of the delivery.
pub fn broadcast(registry: &mut Registry, store: &mut TileStore, tile: TileCoord, exclude: Option<ClientId>, frame: ServerFrame) {
	for target in registry.co_located(tile, exclude) {
		if registry.get(target).is_none() {
			// Evicted earlier in this same broadcast (e.g. as someone else's
			// departure notification raced this one); nothing left to send to.
			continue;
		}
		if !send_to(registry, store, target, frame) {
			remove_client(registry, store, target);
		}
	}
}

/// Evicts `id`, casting its departure to whatever tile it last occupied.
/// Closing the socket happens implicitly when the evicted [`crate::client::Client`] drops.
pub fn remove_client(registry: &mut Registry, store: &mut TileStore, id: ClientId) {
	if let Some(client) = registry.evict(id) {
		broadcast(registry, store, client.tile, None, ServerFrame::cursor_depart(client.cell.x, client.cell.y));
	}
}
