//! Reading and writing exact-size frames on a client socket.
//!
//! No length prefix, no partial-frame buffering: every read or write moves
//! exactly one frame (or bulk payload) at a time; a short transfer is a
//! fault, not something retried.

use std::io::{self, Read, Write};
use torus_core::proto::{ClientFrame, RawClientFrame, RawServerFrame, ServerFrame, CLIENT_FRAME_SIZE};
use torus_core::{MapRecord, Tile};

/// Reads exactly one client frame. `Ok(None)` is a clean EOF (the client
/// closed its end); a short, non-empty read is reported as an error so the
/// caller treats it the same as any other fault and removes the client.
pub fn recv_client_frame<S: Read>(stream: &mut S) -> io::Result<Option<ClientFrame>> {
	let mut buf = [0u8; CLIENT_FRAME_SIZE];
	let n = stream.read(&mut buf)?;
	if n == 0 {
		return Ok(None);
	}
	if n != buf.len() {
		return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "short read of client frame"));
	}
	let raw: RawClientFrame = *bytemuck::from_bytes(&buf);
	ClientFrame::try_from(raw).map(Some).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Sends one server frame header.
pub fn send_frame<S: Write>(stream: &mut S, frame: ServerFrame) -> io::Result<()> {
	let raw: RawServerFrame = frame.into();
	write_exact(stream, bytemuck::bytes_of(&raw))
}

/// Sends the bulk [`Tile`] payload that follows a [`ServerFrame::Tile`] header.
pub fn send_tile<S: Write>(stream: &mut S, tile: &Tile) -> io::Result<()> {
	write_exact(stream, bytemuck::bytes_of(tile))
}

/// Sends the bulk [`MapRecord`] payload that follows a [`ServerFrame::Map`] header.
pub fn send_map<S: Write>(stream: &mut S, record: &MapRecord) -> io::Result<()> {
	write_exact(stream, bytemuck::bytes_of(record))
}

/// A single `write()`, succeeding only if it consumes the whole buffer. A
/// short send is a fault, not something retried.
fn write_exact<S: Write>(stream: &mut S, bytes: &[u8]) -> io::Result<()> {
	let n = stream.write(bytes)?;
	if n != bytes.len() {
		return Err(io::Error::new(io::ErrorKind::WriteZero, "short send"));
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::os::unix::net::UnixStream as StdUnixStream;
	use torus_core::proto::RawClientFrame;

	#[test]
	fn recv_decodes_a_move_frame() {
		let (mut a, mut b) = StdUnixStream::pair().unwrap();
		let raw = RawClientFrame {
			tag: 0,
			p0: (-3i8) as u8,
			p1: 4,
		};
		a.write_all(bytemuck::bytes_of(&raw)).unwrap();
		let frame = recv_client_frame(&mut b).unwrap().unwrap();
		assert_eq!(frame, ClientFrame::Move { dx: -3, dy: 4 });
	}

	#[test]
	fn recv_reports_clean_eof_as_none() {
		let (a, mut b) = StdUnixStream::pair().unwrap();
		drop(a);
		assert!(recv_client_frame(&mut b).unwrap().is_none());
	}

	#[test]
	fn send_then_recv_round_trips_a_put() {
		let (mut a, mut b) = StdUnixStream::pair().unwrap();
		send_frame(&mut a, ServerFrame::Put { cell_x: 1, cell_y: 2, color: 3, cell: b'Q' }).unwrap();
		let mut buf = [0u8; torus_core::proto::SERVER_FRAME_SIZE];
		b.read_exact(&mut buf).unwrap();
		let raw: RawServerFrame = *bytemuck::from_bytes(&buf);
		assert_eq!(raw.p3, b'Q');
	}
}
