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

use crate::frame::{DEFAULT_MAX_FRAME_SIZE, HEADER_LEN, MIN_FRAME_SIZE, TERMINATOR_LEN};
use crate::{CodecError, CodecResult, Frame, PacketType};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::trace;

/// A codec for RCON frames.
///
/// `RconCodec` is stateless apart from its size limit: the decoder waits until a whole frame is
/// buffered before yielding it, so a frame split across several TCP reads is reassembled. It does
/// not join multiple frames into one logical response; callers see each frame separately.
#[derive(Clone, Debug)]
pub struct RconCodec {
    max_frame_size: usize,
}

impl RconCodec {
    /// Creates a codec with [`DEFAULT_MAX_FRAME_SIZE`].
    ///
    /// # Example
    /// ```
    /// use rconwatch_codec::RconCodec;
    ///
    /// let codec = RconCodec::new();
    /// assert_eq!(codec.max_frame_size(), rconwatch_codec::DEFAULT_MAX_FRAME_SIZE);
    /// ```
    pub fn new() -> RconCodec {
        RconCodec::default()
    }

    /// Creates a codec that rejects frames whose `size` field exceeds `max_frame_size`.
    pub fn with_max_frame_size(max_frame_size: usize) -> RconCodec {
        RconCodec {
            max_frame_size: max_frame_size.max(MIN_FRAME_SIZE),
        }
    }

    /// Largest accepted value of the `size` field
    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }
}

impl Default for RconCodec {
    fn default() -> Self {
        RconCodec {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

impl Decoder for RconCodec {
    type Item = Frame;
    type Error = CodecError;

    /// Decodes one frame from `src`.
    ///
    /// # Returns
    /// - `Ok(Some(Frame))`: a complete frame was consumed from the buffer.
    /// - `Ok(None)`: more bytes are needed; nothing was consumed.
    /// - `Err(CodecError::MalformedFrame)`: the `size` field is out of range or the frame is not
    ///   terminated by two null bytes.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, Self::Error> {
        if src.len() < 4 {
            return Ok(None);
        }

        let declared = i32::from_le_bytes([src[0], src[1], src[2], src[3]]);
        if declared < MIN_FRAME_SIZE as i32 {
            return Err(CodecError::malformed(format!(
                "size field {} is below the minimum of {}",
                declared, MIN_FRAME_SIZE
            )));
        }
        let size = declared as usize;
        if size > self.max_frame_size {
            return Err(CodecError::malformed(format!(
                "size field {} exceeds the limit of {}",
                size, self.max_frame_size
            )));
        }

        let total = 4 + size;
        if src.len() < total {
            src.reserve(total - src.len());
            return Ok(None);
        }

        let mut raw = src.split_to(total);
        raw.advance(4);
        let request_id = raw.get_i32_le();
        let packet_type = PacketType::new(raw.get_i32_le());
        let body = raw.split_to(size - MIN_FRAME_SIZE).freeze();

        if raw[..] != [0u8; TERMINATOR_LEN] {
            return Err(CodecError::malformed(format!(
                "frame {} is not terminated by two null bytes",
                request_id
            )));
        }

        trace!(
            request_id,
            packet_type = %packet_type,
            body_len = body.len(),
            "Decoded RCON frame"
        );

        Ok(Some(Frame {
            request_id,
            packet_type,
            body,
        }))
    }
}

impl Encoder<Frame> for RconCodec {
    type Error = CodecError;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let size = item.size();
        if size > self.max_frame_size || size > i32::MAX as usize {
            return Err(CodecError::FrameTooLarge {
                size: item.body.len(),
                max: self.max_frame_size.saturating_sub(MIN_FRAME_SIZE),
            });
        }

        dst.reserve(item.encoded_len());
        dst.put_i32_le(size as i32);
        dst.put_i32_le(item.request_id);
        dst.put_i32_le(item.packet_type.value());
        dst.put_slice(&item.body);
        dst.put_bytes(0, TERMINATOR_LEN);
        Ok(())
    }
}

/// Encodes a single frame into a standalone buffer.
///
/// Produces `size ‖ request_id ‖ type ‖ body ‖ 0x00 0x00` with `size = 4 + 4 + body.len() + 2`.
pub fn encode_frame(request_id: i32, packet_type: PacketType, body: &[u8]) -> Bytes {
    let frame = Frame::new(request_id, packet_type, Bytes::copy_from_slice(body));
    let mut dst = BytesMut::with_capacity(frame.encoded_len());
    dst.put_i32_le(frame.size() as i32);
    dst.put_i32_le(request_id);
    dst.put_i32_le(packet_type.value());
    dst.put_slice(body);
    dst.put_bytes(0, TERMINATOR_LEN);
    dst.freeze()
}

/// Decodes a single frame from the start of `buf`.
///
/// The three header fields are read first, then `size - 10` bytes are taken as the body.
/// Bytes past the body (the terminator and anything after it) are ignored.
///
/// # Errors
/// Returns [`CodecError::MalformedFrame`] when fewer than 12 bytes are available, when the
/// `size` field is below its minimum, or when the body is truncated.
pub fn decode_frame(buf: &[u8]) -> CodecResult<Frame> {
    if buf.len() < HEADER_LEN {
        return Err(CodecError::malformed(format!(
            "need {} header bytes, got {}",
            HEADER_LEN,
            buf.len()
        )));
    }

    let mut header = &buf[..HEADER_LEN];
    let declared = header.get_i32_le();
    let request_id = header.get_i32_le();
    let packet_type = PacketType::new(header.get_i32_le());

    if declared < MIN_FRAME_SIZE as i32 {
        return Err(CodecError::malformed(format!(
            "size field {} is below the minimum of {}",
            declared, MIN_FRAME_SIZE
        )));
    }
    let body_len = declared as usize - MIN_FRAME_SIZE;
    let available = buf.len() - HEADER_LEN;
    if available < body_len {
        return Err(CodecError::malformed(format!(
            "body truncated: expected {} bytes, got {}",
            body_len, available
        )));
    }

    Ok(Frame {
        request_id,
        packet_type,
        body: Bytes::copy_from_slice(&buf[HEADER_LEN..HEADER_LEN + body_len]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // ============================================================================
    // Helper Functions
    // ============================================================================

    fn encode(frame: Frame) -> BytesMut {
        let mut codec = RconCodec::new();
        let mut dst = BytesMut::new();
        codec.encode(frame, &mut dst).expect("encode ok");
        dst
    }

    fn collect_all(codec: &mut RconCodec, src: &mut BytesMut) -> Vec<Frame> {
        let mut out = Vec::new();
        while let Some(frame) = codec.decode(src).expect("decode should not error") {
            out.push(frame);
        }
        out
    }

    // ============================================================================
    // Encoding Tests
    // ============================================================================

    #[test]
    fn encode_auth_layout() {
        let dst = encode(Frame::auth(1, "pw"));
        assert_eq!(
            &dst[..],
            &[12, 0, 0, 0, 1, 0, 0, 0, 3, 0, 0, 0, b'p', b'w', 0, 0][..]
        );
    }

    #[test]
    fn encode_empty_body() {
        let dst = encode(Frame::new(5, PacketType::RESPONSE_VALUE, Bytes::new()));
        assert_eq!(&dst[..], &[10, 0, 0, 0, 5, 0, 0, 0, 0, 0, 0, 0, 0, 0][..]);
    }

    #[test]
    fn encode_negative_request_id() {
        let dst = encode(Frame::new(-1, PacketType::AUTH_RESPONSE, Bytes::new()));
        assert_eq!(&dst[4..8], &[0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn encode_rejects_oversized_body() {
        let mut codec = RconCodec::with_max_frame_size(20);
        let mut dst = BytesMut::new();
        let err = codec
            .encode(Frame::exec(1, "this body is far too long"), &mut dst)
            .unwrap_err();
        assert!(matches!(err, CodecError::FrameTooLarge { max: 10, .. }));
        assert!(dst.is_empty());
    }

    #[test]
    fn encode_frame_matches_encoder() {
        let standalone = encode_frame(9, PacketType::EXEC_COMMAND, b"tps");
        let framed = encode(Frame::exec(9, "tps"));
        assert_eq!(&standalone[..], &framed[..]);
    }

    // ============================================================================
    // Decoding Tests
    // ============================================================================

    #[test]
    fn decode_single_frame() {
        let mut codec = RconCodec::new();
        let mut src = encode(Frame::new(4, PacketType::RESPONSE_VALUE, "hello"));
        let frame = codec.decode(&mut src).unwrap().unwrap();
        assert_eq!(frame.request_id, 4);
        assert_eq!(frame.packet_type, PacketType::RESPONSE_VALUE);
        assert_eq!(frame.body_text(), "hello");
        assert!(src.is_empty());
    }

    #[test]
    fn decode_waits_for_complete_frame() {
        let mut codec = RconCodec::new();
        let full = encode(Frame::new(4, PacketType::RESPONSE_VALUE, "split reply"));

        let mut src = BytesMut::new();
        for chunk in full.chunks(3) {
            assert!(codec.decode(&mut src).unwrap().is_none());
            src.extend_from_slice(chunk);
        }
        let frame = codec.decode(&mut src).unwrap().unwrap();
        assert_eq!(frame.body_text(), "split reply");
    }

    #[test]
    fn decode_back_to_back_frames() {
        let mut codec = RconCodec::new();
        let mut src = encode(Frame::new(1, PacketType::RESPONSE_VALUE, Bytes::new()));
        src.extend_from_slice(&encode(Frame::new(1, PacketType::AUTH_RESPONSE, Bytes::new())));
        let frames = collect_all(&mut codec, &mut src);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].packet_type, PacketType::RESPONSE_VALUE);
        assert_eq!(frames[1].packet_type, PacketType::AUTH_RESPONSE);
    }

    #[test]
    fn decode_rejects_small_size() {
        let mut codec = RconCodec::new();
        let mut src = BytesMut::from(&[4u8, 0, 0, 0, 1, 0, 0, 0][..]);
        assert!(codec.decode(&mut src).unwrap_err().is_desync());
    }

    #[test]
    fn decode_rejects_oversized_size() {
        let mut codec = RconCodec::with_max_frame_size(64);
        let mut src = BytesMut::from(&[0u8, 1, 0, 0][..]);
        assert!(codec.decode(&mut src).unwrap_err().is_desync());
    }

    #[test]
    fn decode_rejects_missing_terminator() {
        let mut codec = RconCodec::new();
        let mut src = BytesMut::from(&[10u8, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, b'x', 0][..]);
        assert!(codec.decode(&mut src).unwrap_err().is_desync());
    }

    // ============================================================================
    // One-shot Decoding Tests
    // ============================================================================

    #[test]
    fn decode_frame_from_receive_buffer() {
        let mut buffer = vec![0u8; 4096];
        let wire = encode_frame(3, PacketType::RESPONSE_VALUE, b"20.0");
        buffer[..wire.len()].copy_from_slice(&wire);

        let frame = decode_frame(&buffer).unwrap();
        assert_eq!(frame.request_id, 3);
        assert_eq!(frame.body_text(), "20.0");
    }

    #[test]
    fn decode_frame_requires_header() {
        let err = decode_frame(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]).unwrap_err();
        assert!(matches!(err, CodecError::MalformedFrame { .. }));
    }

    #[test]
    fn decode_frame_rejects_truncated_body() {
        let wire = encode_frame(3, PacketType::RESPONSE_VALUE, b"a longer body");
        assert!(decode_frame(&wire[..16]).is_err());
    }
}
