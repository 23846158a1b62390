//! The wire protocol: fixed-size, native-endian, native-padded frames.
//!
//! There is no length prefix; message boundaries are a `recv`/`send` of
//! exactly one frame's size at a time. Frame layout is therefore only
//! portable between two processes built from the same sources on the same
//! ABI — deliberately.

pub mod client;
pub mod map_record;
pub mod server;

/// Reserved cursor coordinate meaning "no cursor" — appearance or
/// disappearance rather than a move.
pub const CURSOR_NONE: u8 = 0xFF;

pub use client::{ClientFrame, RawClientFrame, CLIENT_FRAME_SIZE};
pub use map_record::{MapRecord, MAP_WINDOW};
pub use server::{RawServerFrame, ServerFrame, SERVER_FRAME_SIZE};
