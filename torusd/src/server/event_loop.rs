//! The single-threaded, readiness-driven event loop.
//!
//! Accept connections as they arrive, dispatch exactly one recv per
//! readable client per wakeup, and let a failed handler remove its client.
//! `mio` drives readiness notification here.
//!
//! Accepted sockets come out of `mio::net::UnixListener::accept` already
//! non-blocking. A broken pipe on write surfaces as `EPIPE` rather than a
//! process-killing signal because Rust's runtime ignores `SIGPIPE`
//! process-wide at startup. Each accepted socket also gets an explicit send
//! buffer so a tile payload never has to fragment across writes, and a
//! listener that's run out of file descriptors brings the process down
//! instead of spinning.

use crate::engine;
use crate::registry::{ClientId, Registry};
use crate::wire;
use anyhow::{Context, Result};
use mio::net::{UnixListener, UnixStream};
use mio::{Events, Interest, Poll, Token};
use socket2::SockRef;
use std::os::unix::net::UnixStream as StdUnixStream;
use std::path::Path;
use torus_store::TileStore;

const LISTENER: Token = Token(0);

/// A send buffer below this lets a tile payload fragment across two writes,
/// which `wire::write_exact`'s single non-retried write can't recover from.
const MIN_SEND_BUFFER: usize = 2 * torus_core::PAGE_SIZE;

fn is_listener_exhausted(err: &std::io::Error) -> bool {
	matches!(err.raw_os_error(), Some(code) if code == libc::EMFILE || code == libc::ENFILE)
}

fn configure_send_buffer(stream: &UnixStream) {
	if let Err(e) = SockRef::from(stream).set_send_buffer_size(MIN_SEND_BUFFER) {
		log::warn!("failed to size send buffer on accepted connection: {e}");
	}
}

fn token_for(id: ClientId) -> Token {
	Token(id.0 + 1)
}

fn id_for(token: Token) -> ClientId {
	ClientId(token.0 - 1)
}

/// Owns the listener, the poll handle, and the two pieces of server state
/// every handler needs: the client registry and the tile store.
pub struct Server {
	poll: Poll,
	events: Events,
	listener: UnixListener,
	registry: Registry,
	store: TileStore,
}

impl Server {
	/// Binds `socket_path`, removing a stale (unconnected) socket file left
	/// behind by a previous run first. A socket that a live server is still
	/// listening on is left alone and reported as "unavailable".
	pub fn bind(socket_path: &Path, store: TileStore) -> Result<Server> {
		if socket_path.exists() {
			if StdUnixStream::connect(socket_path).is_ok() {
				return Err(crate::sysexits::StartupFault::SocketInUse)
					.with_context(|| format!("binding Unix socket {}", socket_path.display()));
			}
			std::fs::remove_file(socket_path)
				.with_context(|| format!("removing stale socket file {}", socket_path.display()))?;
		}

		let listener = UnixListener::bind(socket_path)
			.with_context(|| format!("binding Unix socket {}", socket_path.display()))?;

		Ok(Server {
			poll: Poll::new().context("creating poll instance")?,
			events: Events::with_capacity(1024),
			listener,
			registry: Registry::new(),
			store,
		})
	}

	/// Runs until an I/O error escapes `poll` itself (a genuine OS-level
	/// failure, not a per-client fault — those are handled internally and
	/// never propagate here).
	pub fn run(&mut self) -> Result<()> {
		self.poll
			.registry()
			.register(&mut self.listener, LISTENER, Interest::READABLE)
			.context("registering listener with poll")?;

		log::info!("accepting connections, {} client(s) connected", self.registry.len());

		loop {
			self.poll.poll(&mut self.events, None).context("polling for readiness")?;

			let tokens: Vec<Token> = self.events.iter().map(mio::event::Event::token).collect();
			for token in tokens {
				if token == LISTENER {
					self.accept_all()?;
				} else {
					self.service(id_for(token));
				}
			}
		}
	}

	/// Drains every pending connection. A listener out of file descriptors
	/// (`EMFILE`/`ENFILE`) can't recover on its own and is reported as a
	/// fatal error; any other accept failure is logged and the next event
	/// is processed instead.
	fn accept_all(&mut self) -> Result<()> {
		loop {
			match self.listener.accept() {
				Ok((stream, _addr)) => {
					configure_send_buffer(&stream);
					self.admit(stream);
				}
				Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => break,
				Err(e) if is_listener_exhausted(&e) => {
					return Err(crate::sysexits::StartupFault::ListenerExhausted)
						.with_context(|| format!("accept failed: {e}"));
				}
				Err(e) => {
					log::warn!("accept failed: {e}");
					break;
				}
			}
		}
		Ok(())
	}

	fn admit(&mut self, stream: UnixStream) {
		let (id, ok) = engine::movement::admit(&mut self.registry, &mut self.store, stream);
		if !ok {
			log::debug!("new client's own handshake send failed, removing immediately");
			engine::remove_client(&mut self.registry, &mut self.store, id);
			return;
		}
		let Some(stream) = self.registry.stream_mut(id) else {
			return;
		};
		if let Err(e) = self.poll.registry().register(stream, token_for(id), Interest::READABLE) {
			log::warn!("registering new client with poll failed: {e}");
			engine::remove_client(&mut self.registry, &mut self.store, id);
		}
	}

	fn service(&mut self, id: ClientId) {
		if self.registry.get(id).is_none() {
			return; // stale readiness event for an already-removed client
		}
		let Some(stream) = self.registry.stream_mut(id) else {
			return;
		};
		match wire::recv_client_frame(stream) {
			Ok(None) => {
				log::debug!("client disconnected");
				engine::remove_client(&mut self.registry, &mut self.store, id);
			}
			Err(e) => {
				log::debug!("client fault: {e}");
				engine::remove_client(&mut self.registry, &mut self.store, id);
			}
			Ok(Some(frame)) => {
				if !engine::handle_frame(&mut self.registry, &mut self.store, id, frame) {
					engine::remove_client(&mut self.registry, &mut self.store, id);
				}
			}
		}
	}
}
