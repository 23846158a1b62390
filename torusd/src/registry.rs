//! The connected-client arena.
//!
//! Slots are addressed by a stable [`ClientId`], handed out once and never
//! reused while a client is live, so nothing holds a raw index that a
//! concurrent removal could dangle.

use crate::client::Client;
use mio::net::UnixStream;
use torus_core::{CellCoord, TileCoord};

/// A stable handle to a connected client, valid until that client is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(pub usize);

/// The set of currently-connected clients, addressed by [`ClientId`].
#[derive(Default)]
pub struct Registry {
	slots: Vec<Option<Client>>,
	free: Vec<usize>,
}

impl Registry {
	#[must_use]
	pub fn new() -> Registry {
		Registry::default()
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.slots.iter().filter(|s| s.is_some()).count()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Admits a new client, returning the slot it now occupies.
	pub fn insert(&mut self, client: Client) -> ClientId {
		if let Some(index) = self.free.pop() {
			self.slots[index] = Some(client);
			ClientId(index)
		} else {
			self.slots.push(Some(client));
			ClientId(self.slots.len() - 1)
		}
	}

	/// Evicts the client at `id`, freeing the slot for reuse. Pure storage
	/// operation: callers are responsible for any departure broadcast before
	/// calling this.
	pub fn evict(&mut self, id: ClientId) -> Option<Client> {
		let slot = self.slots.get_mut(id.0)?;
		let client = slot.take()?;
		self.free.push(id.0);
		Some(client)
	}

	#[must_use]
	pub fn get(&self, id: ClientId) -> Option<&Client> {
		self.slots.get(id.0)?.as_ref()
	}

	pub fn get_mut(&mut self, id: ClientId) -> Option<&mut Client> {
		self.slots.get_mut(id.0)?.as_mut()
	}

	pub fn stream_mut(&mut self, id: ClientId) -> Option<&mut UnixStream> {
		self.get_mut(id).map(|c| &mut c.stream)
	}

	#[must_use]
	pub fn cell_tile(&self, id: ClientId) -> Option<(CellCoord, TileCoord)> {
		self.get(id).map(|c| (c.cell, c.tile))
	}

	pub fn set_cell_tile(&mut self, id: ClientId, cell: CellCoord, tile: TileCoord) {
		if let Some(client) = self.get_mut(id) {
			client.cell = cell;
			client.tile = tile;
		}
	}

	/// All clients currently on `tile`, other than `exclude`. Collected
	/// eagerly so callers may mutate the registry — evicting a failed peer,
	/// say — while iterating the result.
	#[must_use]
	pub fn co_located(&self, tile: TileCoord, exclude: Option<ClientId>) -> Vec<ClientId> {
		self.slots
			.iter()
			.enumerate()
			.filter_map(|(index, slot)| {
				let client = slot.as_ref()?;
				let id = ClientId(index);
				if client.tile == tile && Some(id) != exclude {
					Some(id)
				} else {
					None
				}
			})
			.collect()
	}

	/// Every connected client and its id, for the full-registry cursor
	/// snapshot a newcomer receives on arrival.
	pub fn iter(&self) -> impl Iterator<Item = (ClientId, &Client)> {
		self.slots.iter().enumerate().filter_map(|(index, slot)| slot.as_ref().map(|c| (ClientId(index), c)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::os::unix::net::UnixStream as StdUnixStream;

	fn dummy_client(tile: TileCoord, cell: CellCoord) -> Client {
		let (a, _b) = StdUnixStream::pair().unwrap();
		a.set_nonblocking(true).unwrap();
		Client::new(UnixStream::from_std(a), tile, cell)
	}

	#[test]
	fn insert_then_evict_reuses_the_slot() {
		let mut registry = Registry::new();
		let id = registry.insert(dummy_client(TileCoord::new(0, 0), CellCoord::new(0, 0)));
		assert_eq!(registry.len(), 1);
		registry.evict(id);
		assert_eq!(registry.len(), 0);
		let reused = registry.insert(dummy_client(TileCoord::new(1, 1), CellCoord::new(0, 0)));
		assert_eq!(reused.0, id.0);
	}

	#[test]
	fn co_located_excludes_the_given_id_and_other_tiles() {
		let mut registry = Registry::new();
		let tile = TileCoord::new(5, 5);
		let a = registry.insert(dummy_client(tile, CellCoord::new(0, 0)));
		let b = registry.insert(dummy_client(tile, CellCoord::new(1, 1)));
		let _c = registry.insert(dummy_client(TileCoord::new(6, 6), CellCoord::new(0, 0)));

		let peers = registry.co_located(tile, Some(a));
		assert_eq!(peers, vec![b]);
	}
}
