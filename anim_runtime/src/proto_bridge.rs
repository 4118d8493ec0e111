//! Proto ↔ kernel conversion bridge.
//!
//! Converts between the protobuf wire types (proto_types.rs) and the
//! kernel's Command / CommandBatch. Operand kinds map one-to-one, so a
//! batch survives the trip unchanged.

use anim_engine::command::{Command, CommandBatch, Opcode, Operand};

use crate::batch_codec::CodecError;
use crate::proto_types::{OperandKind, ProtoBatch, ProtoCommand, ProtoOperand};

pub fn operand_to_proto(operand: &Operand) -> ProtoOperand {
    let kind = match operand {
        Operand::Int(i) => OperandKind::Int(*i),
        Operand::Float(f) => OperandKind::Float(*f),
        Operand::Text(s) => OperandKind::Text(s.clone()),
    };
    ProtoOperand { kind: Some(kind) }
}

pub fn proto_to_operand(proto: &ProtoOperand) -> Result<Operand, CodecError> {
    match &proto.kind {
        Some(OperandKind::Int(i)) => Ok(Operand::Int(*i)),
        Some(OperandKind::Float(f)) => Ok(Operand::Float(*f)),
        Some(OperandKind::Text(s)) => Ok(Operand::Text(s.clone())),
        None => Err(CodecError::EmptyOperand),
    }
}

pub fn command_to_proto(command: &Command) -> ProtoCommand {
    ProtoCommand {
        opcode: command.opcode().name().to_string(),
        operands: command.operands().iter().map(operand_to_proto).collect(),
    }
}

pub fn proto_to_command(proto: &ProtoCommand) -> Result<Command, CodecError> {
    let opcode = Opcode::from_name(&proto.opcode)
        .ok_or_else(|| CodecError::UnknownOpcode(proto.opcode.clone()))?;
    let operands = proto
        .operands
        .iter()
        .map(proto_to_operand)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Command::new(opcode, operands))
}

pub fn batch_to_proto(sequence: u64, batch: &CommandBatch) -> ProtoBatch {
    ProtoBatch {
        sequence,
        commands: batch.iter().map(command_to_proto).collect(),
    }
}

pub fn proto_to_batch(proto: &ProtoBatch) -> Result<CommandBatch, CodecError> {
    let commands = proto
        .commands
        .iter()
        .map(proto_to_command)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CommandBatch::from(commands))
}
