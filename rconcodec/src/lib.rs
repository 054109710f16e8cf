//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! # RCON Protocol Codec
//!
//! This crate implements the binary framing used by Source-style remote consoles (RCON), as
//! spoken by Minecraft and other game servers. It is designed to sit underneath a Tokio
//! transport through [`tokio_util::codec::Framed`], and also offers one-shot helpers for
//! encoding and decoding a single frame from a byte slice.
//!
//! ## Frame Layout
//!
//! Every message on the wire is a single frame, with all integers little-endian `i32`:
//!
//! ```text
//! +--------+------------+------+-----------------+-----------+
//! |  size  | request id | type | body (n bytes)  | 0x00 0x00 |
//! +--------+------------+------+-----------------+-----------+
//!            \___________________ size bytes ________________/
//! ```
//!
//! `size` counts everything after itself, so `size = 4 + 4 + n + 2`.
//!
//! ## Packet Types
//!
//! The protocol reuses the value `2` for both an outgoing command and an incoming
//! authentication response, so [`PacketType`] is a newtype over `i32` rather than an enum:
//!
//! - [`PacketType::AUTH`] (3): client login carrying the password
//! - [`PacketType::AUTH_RESPONSE`] (2): server reply to a login
//! - [`PacketType::EXEC_COMMAND`] (2): client command
//! - [`PacketType::RESPONSE_VALUE`] (0): server reply to a command
//!
//! ## Usage Example
//!
//! ```rust
//! use rconwatch_codec::{Frame, PacketType, RconCodec};
//! use tokio_util::codec::{Decoder, Encoder};
//! use bytes::BytesMut;
//!
//! let mut codec = RconCodec::new();
//! let mut buffer = BytesMut::new();
//! codec.encode(Frame::exec(7, "list"), &mut buffer).unwrap();
//!
//! let frame = codec.decode(&mut buffer).unwrap().unwrap();
//! assert_eq!(frame.request_id, 7);
//! assert_eq!(frame.packet_type, PacketType::EXEC_COMMAND);
//! assert_eq!(frame.body_text(), "list");
//! ```

mod codec;
mod frame;
mod result;

pub use codec::{RconCodec, decode_frame, encode_frame};
pub use frame::{
    DEFAULT_MAX_FRAME_SIZE, Frame, HEADER_LEN, MIN_FRAME_SIZE, PacketType, TERMINATOR_LEN,
};
pub use result::{CodecError, CodecResult};
