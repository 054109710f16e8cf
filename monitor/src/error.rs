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

//! Error types for the monitor

use crate::parser::ParseError;
use rconwatch_client::ClientError;
use thiserror::Error;

/// Result type for monitor operations
pub type Result<T> = std::result::Result<T, MonitorError>;

/// Monitor error types
#[derive(Debug, Error)]
pub enum MonitorError {
    /// A console command could not be completed
    #[error("Command '{command}' failed: {source}")]
    Command {
        /// Command that was being executed
        command: String,
        /// Underlying client failure
        #[source]
        source: ClientError,
    },

    /// Console output did not have the expected shape
    #[error("Could not parse reply to '{command}': {source}")]
    Parse {
        /// Command whose reply was rejected
        command: String,
        /// Underlying parse failure
        #[source]
        source: ParseError,
    },

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MonitorError {
    /// Check if the error came from the transport or protocol layer
    pub fn is_connection_error(&self) -> bool {
        matches!(self, MonitorError::Command { .. })
    }

    /// Check if the error came from reply parsing
    pub fn is_parse_error(&self) -> bool {
        matches!(self, MonitorError::Parse { .. })
    }
}

impl From<serde_yaml_ng::Error> for MonitorError {
    fn from(error: serde_yaml_ng::Error) -> Self {
        MonitorError::Config(error.to_string())
    }
}
