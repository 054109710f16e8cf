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

/// Result Type for Codec Operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Represents possible errors that can occur while framing RCON traffic.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// An I/O error occurred while reading from or writing to the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The bytes on the wire do not form a valid frame.
    ///
    /// Once this is returned the stream must be considered desynchronized; there is no
    /// way to find the start of the next frame.
    #[error("Malformed frame: {reason}")]
    MalformedFrame {
        /// Description of what was wrong with the frame
        reason: String,
    },

    /// An outgoing frame body is larger than the codec allows.
    #[error("Frame body of {size} bytes exceeds the limit of {max} bytes")]
    FrameTooLarge {
        /// Size of the rejected frame
        size: usize,
        /// Configured maximum
        max: usize,
    },
}

impl CodecError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        CodecError::MalformedFrame {
            reason: reason.into(),
        }
    }

    /// Check if the error means the stream can no longer be trusted
    pub fn is_desync(&self) -> bool {
        matches!(self, CodecError::MalformedFrame { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CodecError::malformed("missing terminator");
        assert_eq!(err.to_string(), "Malformed frame: missing terminator");

        let err = CodecError::FrameTooLarge { size: 9000, max: 4096 };
        assert_eq!(
            err.to_string(),
            "Frame body of 9000 bytes exceeds the limit of 4096 bytes"
        );
    }

    #[test]
    fn test_error_is_desync() {
        assert!(CodecError::malformed("short").is_desync());
        assert!(!CodecError::FrameTooLarge { size: 1, max: 0 }.is_desync());
    }
}
