//! Binary batch stream: length-prefixed protobuf frames, in memory.
//!
//! Format:
//!   [4-byte LE length][protobuf ProtoBatch][4-byte LE length][...]...
//!
//! Rules:
//!   - Frame sequence numbers start at 1 and increase by exactly one
//!   - Zero-length and oversized frames are rejected
//!   - A short trailing frame is an error, never silently dropped

use prost::Message;
use thiserror::Error;

use anim_engine::command::CommandBatch;

use crate::proto_bridge::{batch_to_proto, proto_to_batch};
use crate::proto_types::ProtoBatch;

/// Upper bound on one encoded batch.
pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid frame length {0}")]
    InvalidFrameLength(usize),
    #[error("truncated frame at offset {0}")]
    Truncated(usize),
    #[error("protobuf decode error: {0}")]
    Decode(#[from] prost::DecodeError),
    #[error("sequence violation: expected {expected}, got {got}")]
    Sequence { expected: u64, got: u64 },
    #[error("unknown opcode {0:?}")]
    UnknownOpcode(String),
    #[error("operand without a value")]
    EmptyOperand,
}

/// Encode batches as one frame each, numbered from 1. A batch whose
/// frame would exceed `MAX_FRAME_LEN` is rejected, so every stream this
/// writes is one `decode_batches` accepts.
pub fn encode_batches(batches: &[CommandBatch]) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    for (i, batch) in batches.iter().enumerate() {
        let buf = batch_to_proto(i as u64 + 1, batch).encode_to_vec();
        out.extend_from_slice(&frame_len(buf.len())?.to_le_bytes());
        out.extend_from_slice(&buf);
    }
    Ok(out)
}

fn frame_len(len: usize) -> Result<u32, CodecError> {
    if len == 0 || len > MAX_FRAME_LEN {
        return Err(CodecError::InvalidFrameLength(len));
    }
    u32::try_from(len).map_err(|_| CodecError::InvalidFrameLength(len))
}

/// Decode a full frame stream, validating frame integrity and order.
pub fn decode_batches(bytes: &[u8]) -> Result<Vec<CommandBatch>, CodecError> {
    let mut batches = Vec::new();
    let mut offset = 0;
    while offset < bytes.len() {
        let header = bytes
            .get(offset..offset + 4)
            .ok_or(CodecError::Truncated(offset))?;
        let mut len_buf = [0u8; 4];
        len_buf.copy_from_slice(header);
        let len = u32::from_le_bytes(len_buf) as usize;
        if len == 0 || len > MAX_FRAME_LEN {
            return Err(CodecError::InvalidFrameLength(len));
        }
        let start = offset + 4;
        let frame = bytes
            .get(start..start + len)
            .ok_or(CodecError::Truncated(offset))?;

        let proto = ProtoBatch::decode(frame)?;
        let expected = batches.len() as u64 + 1;
        if proto.sequence != expected {
            return Err(CodecError::Sequence {
                expected,
                got: proto.sequence,
            });
        }
        batches.push(proto_to_batch(&proto)?);
        offset = start + len;
    }
    Ok(batches)
}
