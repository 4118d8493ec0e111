//! Hand-written protobuf types for the binary batch transport.
//!
//! Uses prost derive macros for encode/decode without prost-build.
//!
//! ```text
//! message Batch   { uint64 sequence = 1; repeated Command commands = 2; }
//! message Command { string opcode = 1; repeated Operand operands = 2; }
//! message Operand { oneof kind { sint64 int = 1; double float = 2; string text = 3; } }
//! ```

use prost::Message;

#[derive(Clone, PartialEq, Message)]
pub struct ProtoBatch {
    /// 1-based, strictly increasing within a stream.
    #[prost(uint64, tag = "1")]
    pub sequence: u64,
    #[prost(message, repeated, tag = "2")]
    pub commands: Vec<ProtoCommand>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ProtoCommand {
    /// Wire name, as in the text codec.
    #[prost(string, tag = "1")]
    pub opcode: String,
    #[prost(message, repeated, tag = "2")]
    pub operands: Vec<ProtoOperand>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ProtoOperand {
    #[prost(oneof = "OperandKind", tags = "1, 2, 3")]
    pub kind: Option<OperandKind>,
}

#[derive(Clone, PartialEq, prost::Oneof)]
pub enum OperandKind {
    #[prost(sint64, tag = "1")]
    Int(i64),
    #[prost(double, tag = "2")]
    Float(f64),
    #[prost(string, tag = "3")]
    Text(String),
}
