//! Fixed-size binary frame codec.
//!
//! Requests and replies share one 20-byte layout: five big-endian 32-bit
//! words. Words 0 and 1 are the operands, word 2 is the result, word 3
//! carries the operator character in its low byte, word 4 is the status.
//! The codec never sees a partial frame; length validation happens at the
//! connection layer and the `[u8; FRAME_LEN]` buffer type enforces it here.

use bytes::{Buf, BufMut};

/// Wire size of one request or reply.
pub const FRAME_LEN: usize = 20;

/// Status word for a successfully computed result.
pub const STATUS_OK: u32 = 1;

/// Status word for a failed request (unknown operator, division by zero).
pub const STATUS_ERR: u32 = 0;

/// One decoded frame. The same layout serves as request and reply; the
/// server fills in `result` and `status` before encoding the reply and
/// echoes the remaining words back as received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub operand_a: i32,
    pub operand_b: i32,
    /// Valid only when `status` is [`STATUS_OK`].
    pub result: i32,
    /// Word 3 as received; the operator character lives in the low byte
    /// and the upper bytes are preserved verbatim.
    pub op_word: u32,
    pub status: u32,
}

impl Frame {
    /// Decode five big-endian words from a full frame buffer.
    pub fn decode(raw: &[u8; FRAME_LEN]) -> Self {
        let mut buf = &raw[..];
        Frame {
            operand_a: buf.get_i32(),
            operand_b: buf.get_i32(),
            result: buf.get_i32(),
            op_word: buf.get_u32(),
            status: buf.get_u32(),
        }
    }

    /// Encode the frame back into wire form.
    pub fn encode(&self) -> [u8; FRAME_LEN] {
        let mut raw = [0u8; FRAME_LEN];
        let mut buf = &mut raw[..];
        buf.put_i32(self.operand_a);
        buf.put_i32(self.operand_b);
        buf.put_i32(self.result);
        buf.put_u32(self.op_word);
        buf.put_u32(self.status);
        raw
    }

    /// The operator character (low byte of word 3).
    pub fn operator(&self) -> u8 {
        (self.op_word & 0xff) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_field_positions() {
        let mut raw = [0u8; FRAME_LEN];
        raw[..4].copy_from_slice(&2i32.to_be_bytes());
        raw[4..8].copy_from_slice(&3i32.to_be_bytes());
        raw[12..16].copy_from_slice(&u32::from(b'+').to_be_bytes());

        let frame = Frame::decode(&raw);
        assert_eq!(frame.operand_a, 2);
        assert_eq!(frame.operand_b, 3);
        assert_eq!(frame.result, 0);
        assert_eq!(frame.operator(), b'+');
        assert_eq!(frame.status, 0);
    }

    #[test]
    fn test_encode_is_big_endian() {
        let frame = Frame {
            operand_a: 1,
            operand_b: -1,
            result: 0,
            op_word: 0,
            status: STATUS_OK,
        };

        let raw = frame.encode();
        assert_eq!(raw[..4], [0x00, 0x00, 0x00, 0x01]);
        assert_eq!(raw[4..8], [0xff, 0xff, 0xff, 0xff]);
        assert_eq!(raw[16..], [0x00, 0x00, 0x00, 0x01]);
    }

    #[test]
    fn test_round_trip() {
        let frame = Frame {
            operand_a: -7,
            operand_b: 1234,
            result: i32::MIN,
            op_word: 0xdead_002f,
            status: STATUS_ERR,
        };

        assert_eq!(Frame::decode(&frame.encode()), frame);
    }

    #[test]
    fn test_operator_ignores_upper_bytes() {
        let frame = Frame {
            operand_a: 0,
            operand_b: 0,
            result: 0,
            op_word: 0x1122_332b,
            status: 0,
        };

        assert_eq!(frame.operator(), b'+');
        // The full word survives a round trip untouched.
        assert_eq!(Frame::decode(&frame.encode()).op_word, 0x1122_332b);
    }
}
