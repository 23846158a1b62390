//! The protocol handlers: one per [`ClientFrame`] variant, plus the
//! broadcast/removal primitives they share.

pub mod broadcast;
pub mod edit;
pub mod map;
pub mod movement;

pub use broadcast::remove_client;

use crate::registry::{ClientId, Registry};
use torus_core::proto::ClientFrame;
use torus_store::TileStore;

/// Dispatches one decoded client frame to its handler. Returns whether the
/// client survives; `false` means the caller should remove it.
pub fn handle_frame(registry: &mut Registry, store: &mut TileStore, id: ClientId, frame: ClientFrame) -> bool {
	match frame {
		ClientFrame::Move { dx, dy } => movement::apply_move(registry, store, id, dx, dy),
		ClientFrame::Flip => movement::apply_flip(registry, store, id),
		ClientFrame::Put { color, cell } => edit::apply_put(registry, store, id, color, cell),
		ClientFrame::Map => map::apply_map(registry, store, id),
		ClientFrame::Tele { port } => movement::apply_teleport(registry, store, id, port),
	}
}
