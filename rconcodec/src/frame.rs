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

use bytes::Bytes;
use std::fmt;

/// Bytes occupied by the `size`, `request id` and `type` fields.
pub const HEADER_LEN: usize = 12;

/// Bytes occupied by the two trailing nulls.
pub const TERMINATOR_LEN: usize = 2;

/// Smallest legal value of the `size` field (empty body).
pub const MIN_FRAME_SIZE: usize = 4 + 4 + TERMINATOR_LEN;

/// Default upper bound for the `size` field.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 64 * 1024;

///
/// Type field of an RCON frame.
///
/// The value `2` means [`EXEC_COMMAND`](PacketType::EXEC_COMMAND) when sent by the client and
/// [`AUTH_RESPONSE`](PacketType::AUTH_RESPONSE) when sent by the server, which is why this is
/// a plain newtype and not an enum.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PacketType(i32);

impl PacketType {
    /// Server reply carrying command output
    pub const RESPONSE_VALUE: PacketType = PacketType(0);
    /// Client command execution request
    pub const EXEC_COMMAND: PacketType = PacketType(2);
    /// Server reply to an authentication request
    pub const AUTH_RESPONSE: PacketType = PacketType(2);
    /// Client authentication request carrying the password
    pub const AUTH: PacketType = PacketType(3);

    /// Wrap a raw type value
    pub const fn new(value: i32) -> Self {
        PacketType(value)
    }

    /// Raw type value as written on the wire
    pub const fn value(self) -> i32 {
        self.0
    }
}

impl From<i32> for PacketType {
    fn from(value: i32) -> Self {
        PacketType(value)
    }
}

impl From<PacketType> for i32 {
    fn from(value: PacketType) -> Self {
        value.0
    }
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            0 => write!(f, "ResponseValue"),
            2 => write!(f, "ExecCommand/AuthResponse"),
            3 => write!(f, "Auth"),
            other => write!(f, "Unknown({})", other),
        }
    }
}

/// A single RCON message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Client chosen id echoed back by the server (`-1` on failed authentication)
    pub request_id: i32,
    /// Message type
    pub packet_type: PacketType,
    /// Payload without the trailing nulls
    pub body: Bytes,
}

impl Frame {
    /// Create a frame from its parts
    pub fn new(request_id: i32, packet_type: PacketType, body: impl Into<Bytes>) -> Self {
        Frame {
            request_id,
            packet_type,
            body: body.into(),
        }
    }

    /// Authentication request carrying `password`
    pub fn auth(request_id: i32, password: &str) -> Self {
        Frame::new(
            request_id,
            PacketType::AUTH,
            Bytes::copy_from_slice(password.as_bytes()),
        )
    }

    /// Command execution request
    pub fn exec(request_id: i32, command: &str) -> Self {
        Frame::new(
            request_id,
            PacketType::EXEC_COMMAND,
            Bytes::copy_from_slice(command.as_bytes()),
        )
    }

    /// Value of the `size` field for this frame
    pub fn size(&self) -> usize {
        MIN_FRAME_SIZE + self.body.len()
    }

    /// Total number of bytes this frame occupies on the wire
    pub fn encoded_len(&self) -> usize {
        4 + self.size()
    }

    /// Body decoded as text, replacing invalid UTF-8 sequences
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
