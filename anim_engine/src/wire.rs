//! Text wire form of commands.
//!
//! `Opcode<;>op1<;>op2...`, one string per command. The delimiter is
//! never escaped: an operand that contains it is rejected on encode, and
//! decoding splits on the exact delimiter only.
//!
//! Decoded operands stay text; the typed accessors on `Command` parse
//! them on use, so a label such as `0012` survives a round trip.

use thiserror::Error;

use crate::command::{Command, CommandBatch, Opcode, Operand};

/// Fixed operand delimiter.
pub const DELIMITER: &str = "<;>";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WireError {
    #[error("{opcode}: operand #{index} contains the wire delimiter \"<;>\"")]
    DelimiterInOperand { opcode: Opcode, index: usize },
    #[error("unknown opcode {0:?}")]
    UnknownOpcode(String),
    #[error("empty command line")]
    Empty,
}

/// Encode one command.
pub fn encode_command(command: &Command) -> Result<String, WireError> {
    let mut out = String::from(command.opcode().name());
    for (index, op) in command.operands().iter().enumerate() {
        let text = op.to_string();
        if text.contains(DELIMITER) {
            return Err(WireError::DelimiterInOperand {
                opcode: command.opcode(),
                index,
            });
        }
        out.push_str(DELIMITER);
        out.push_str(&text);
    }
    Ok(out)
}

/// Decode one command line.
pub fn decode_command(line: &str) -> Result<Command, WireError> {
    if line.is_empty() {
        return Err(WireError::Empty);
    }
    let mut tokens = line.split(DELIMITER);
    let name = tokens.next().unwrap_or_default();
    let opcode =
        Opcode::from_name(name).ok_or_else(|| WireError::UnknownOpcode(name.to_string()))?;
    let operands = tokens.map(|t| Operand::Text(t.to_string())).collect();
    Ok(Command::new(opcode, operands))
}

/// Encode a whole batch, one entry per command.
pub fn encode_batch(batch: &CommandBatch) -> Result<Vec<String>, WireError> {
    batch.iter().map(encode_command).collect()
}

/// Decode a batch from its per-command lines.
pub fn decode_batch<S: AsRef<str>>(lines: &[S]) -> Result<CommandBatch, WireError> {
    let commands = lines
        .iter()
        .map(|l| decode_command(l.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CommandBatch::from(commands))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ObjectId;
    use crate::operands;

    #[test]
    fn test_encode_joins_with_delimiter() {
        let c = Command::new(Opcode::CreateRectangle, operands![ObjectId(1), "A", 50, 50, 10, 10]);
        assert_eq!(
            encode_command(&c).unwrap(),
            "CreateRectangle<;>1<;>A<;>50<;>50<;>10<;>10"
        );
        assert_eq!(encode_command(&Command::step()).unwrap(), "Step");
    }

    #[test]
    fn test_decode_restores_typed_operands() {
        let c = decode_command("Move<;>3<;>12.5<;>-4").unwrap();
        assert_eq!(c.opcode(), Opcode::Move);
        assert_eq!(c.id(0).unwrap(), ObjectId(3));
        assert_eq!(c.num(1).unwrap(), 12.5);
        assert_eq!(c.num(2).unwrap(), -4.0);
    }

    #[test]
    fn test_operand_with_delimiter_is_rejected() {
        let c = Command::new(Opcode::SetText, operands![ObjectId(2), "a<;>b"]);
        assert_eq!(
            encode_command(&c),
            Err(WireError::DelimiterInOperand { opcode: Opcode::SetText, index: 1 })
        );
    }

    #[test]
    fn test_partial_delimiters_are_plain_text() {
        let c = Command::new(Opcode::SetText, operands![ObjectId(2), "a<;b;>c"]);
        let line = encode_command(&c).unwrap();
        let back = decode_command(&line).unwrap();
        assert_eq!(back.text(1).unwrap(), "a<;b;>c");
    }

    #[test]
    fn test_empty_operand_survives() {
        let back = decode_command("SetText<;>4<;>").unwrap();
        assert_eq!(back.operands().len(), 2);
        assert_eq!(back.text(1).unwrap(), "");
    }

    #[test]
    fn test_unknown_opcode() {
        assert_eq!(
            decode_command("Settext<;>1<;>x"),
            Err(WireError::UnknownOpcode("Settext".into()))
        );
        assert_eq!(decode_command(""), Err(WireError::Empty));
    }

    #[test]
    fn test_numeric_looking_labels_round_trip() {
        use crate::hashing::canonical_hash;
        use crate::world::World;

        let batch = CommandBatch::from(vec![
            Command::new(Opcode::CreateRectangle, operands![1, "0012", 50, 50, 10, 10]),
            Command::new(Opcode::CreateLabel, operands![2, "1.50", 0, 0]),
            Command::new(Opcode::CreateCircle, operands![3, "+5", 20, 20]),
            Command::new(Opcode::SetText, operands![1, "-0"]),
            Command::new(Opcode::CreateLabel, operands![4, "1e3", 0.25, -7]),
        ]);
        let lines = encode_batch(&batch).unwrap();
        let decoded = decode_batch(&lines).unwrap();

        let (mut live, mut wired) = (World::new(), World::new());
        for (a, b) in batch.iter().zip(decoded.iter()) {
            live.apply(a).unwrap();
            wired.apply(b).unwrap();
        }
        assert_eq!(wired.object(ObjectId(1)).unwrap().text(0), Some("-0"));
        assert_eq!(wired.object(ObjectId(2)).unwrap().text(0), Some("1.50"));
        assert_eq!(wired.object(ObjectId(3)).unwrap().text(0), Some("+5"));
        assert_eq!(wired.object(ObjectId(4)).unwrap().x, 0.25);
        assert_eq!(canonical_hash(&live), canonical_hash(&wired));
        assert_eq!(encode_batch(&decoded).unwrap(), lines);
    }

    #[test]
    fn test_multiline_labels_are_allowed() {
        let c = Command::new(Opcode::CreateCircle, operands![ObjectId(5), "top\nbottom", 1, 2]);
        let back = decode_command(&encode_command(&c).unwrap()).unwrap();
        assert_eq!(back.text(1).unwrap(), "top\nbottom");
    }
}
