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

//! Client error types

use rconwatch_codec::CodecError;
use std::io;

/// Client error type
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(io::Error),

    /// Connection timeout
    #[error("Connection timeout")]
    ConnectTimeout,

    /// Read timeout
    #[error("Read timeout")]
    ReadTimeout,

    /// Write timeout
    #[error("Write timeout")]
    WriteTimeout,

    /// Connection closed by server
    #[error("Connection closed by server")]
    ConnectionClosed,

    /// Connection refused
    #[error("Connection refused")]
    ConnectionRefused,

    /// The byte stream no longer forms valid frames
    #[error("Codec error: {0}")]
    Codec(CodecError),

    /// The server rejected the password
    #[error("Authentication rejected by {address}")]
    AuthFailed {
        /// Address of the server that rejected the login
        address: String,
    },

    /// A frame arrived that does not answer the outstanding request
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Command issued before authentication completed
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Command issued on a closed connection
    #[error("Not connected")]
    NotConnected,
}

impl ClientError {
    /// Socket-level failure (refused, reset, timed out, closed)
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Io(_)
                | Self::ConnectTimeout
                | Self::ReadTimeout
                | Self::WriteTimeout
                | Self::ConnectionClosed
                | Self::ConnectionRefused
                | Self::NotConnected
        )
    }

    /// The server refused the credentials
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::AuthFailed { .. })
    }

    /// The stream is desynchronized and must be rebuilt
    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::Codec(_) | Self::UnexpectedResponse(_))
    }
}

impl From<io::Error> for ClientError {
    fn from(error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::TimedOut => Self::ReadTimeout,
            io::ErrorKind::ConnectionRefused => Self::ConnectionRefused,
            io::ErrorKind::ConnectionReset
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::UnexpectedEof => Self::ConnectionClosed,
            _ => Self::Io(error),
        }
    }
}

impl From<CodecError> for ClientError {
    fn from(error: CodecError) -> Self {
        match error {
            CodecError::Io(error) => Self::from(error),
            other => Self::Codec(other),
        }
    }
}

/// Client result type
pub type Result<T> = std::result::Result<T, ClientError>;
