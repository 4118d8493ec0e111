//! Command vocabulary.
//!
//! Commands are pure data: an opcode plus an ordered list of primitive
//! operands. They carry no mutation logic; the World interprets them.
//! The vocabulary is closed and maps one-to-one onto World mutations.

use std::fmt;

use thiserror::Error;

use crate::ids::ObjectId;

// ---------------------------------------------------------------------------
// Opcode
// ---------------------------------------------------------------------------

/// Every instruction the protocol knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Opcode {
    CreateRectangle,
    CreateCircle,
    CreateLabel,
    CreateLinkedList,
    CreateHighlightCircle,
    SetText,
    SetForegroundColor,
    SetBackgroundColor,
    SetAlpha,
    SetHighlight,
    SetLayer,
    SetNull,
    SetPrevNull,
    SetNextNull,
    Move,
    Connect,
    Disconnect,
    SetEdgeHighlight,
    SetEdgeColor,
    SetEdgeAlpha,
    SetNumElements,
    SetHighlightIndex,
    Delete,
    Step,
}

impl Opcode {
    pub const ALL: [Opcode; 24] = [
        Opcode::CreateRectangle,
        Opcode::CreateCircle,
        Opcode::CreateLabel,
        Opcode::CreateLinkedList,
        Opcode::CreateHighlightCircle,
        Opcode::SetText,
        Opcode::SetForegroundColor,
        Opcode::SetBackgroundColor,
        Opcode::SetAlpha,
        Opcode::SetHighlight,
        Opcode::SetLayer,
        Opcode::SetNull,
        Opcode::SetPrevNull,
        Opcode::SetNextNull,
        Opcode::Move,
        Opcode::Connect,
        Opcode::Disconnect,
        Opcode::SetEdgeHighlight,
        Opcode::SetEdgeColor,
        Opcode::SetEdgeAlpha,
        Opcode::SetNumElements,
        Opcode::SetHighlightIndex,
        Opcode::Delete,
        Opcode::Step,
    ];

    /// Wire name of the opcode.
    pub fn name(self) -> &'static str {
        match self {
            Opcode::CreateRectangle => "CreateRectangle",
            Opcode::CreateCircle => "CreateCircle",
            Opcode::CreateLabel => "CreateLabel",
            Opcode::CreateLinkedList => "CreateLinkedList",
            Opcode::CreateHighlightCircle => "CreateHighlightCircle",
            Opcode::SetText => "SetText",
            Opcode::SetForegroundColor => "SetForegroundColor",
            Opcode::SetBackgroundColor => "SetBackgroundColor",
            Opcode::SetAlpha => "SetAlpha",
            Opcode::SetHighlight => "SetHighlight",
            Opcode::SetLayer => "SetLayer",
            Opcode::SetNull => "SetNull",
            Opcode::SetPrevNull => "SetPrevNull",
            Opcode::SetNextNull => "SetNextNull",
            Opcode::Move => "Move",
            Opcode::Connect => "Connect",
            Opcode::Disconnect => "Disconnect",
            Opcode::SetEdgeHighlight => "SetEdgeHighlight",
            Opcode::SetEdgeColor => "SetEdgeColor",
            Opcode::SetEdgeAlpha => "SetEdgeAlpha",
            Opcode::SetNumElements => "SetNumElements",
            Opcode::SetHighlightIndex => "SetHighlightIndex",
            Opcode::Delete => "Delete",
            Opcode::Step => "Step",
        }
    }

    /// Inverse of `name()`. Exact, case-sensitive match.
    pub fn from_name(name: &str) -> Option<Opcode> {
        Opcode::ALL.iter().copied().find(|op| op.name() == name)
    }

    /// `Step` is the only opcode that does not touch the World.
    pub fn is_mutating(self) -> bool {
        self != Opcode::Step
    }

    pub fn is_create(self) -> bool {
        matches!(
            self,
            Opcode::CreateRectangle
                | Opcode::CreateCircle
                | Opcode::CreateLabel
                | Opcode::CreateLinkedList
                | Opcode::CreateHighlightCircle
        )
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Operand
// ---------------------------------------------------------------------------

/// One primitive operand value.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Int(i) => write!(f, "{}", i),
            Operand::Float(x) => write!(f, "{}", x),
            Operand::Text(s) => f.write_str(s),
        }
    }
}

impl From<ObjectId> for Operand {
    fn from(id: ObjectId) -> Self {
        Operand::Int(id.0 as i64)
    }
}

impl From<i64> for Operand {
    fn from(v: i64) -> Self {
        Operand::Int(v)
    }
}

impl From<i32> for Operand {
    fn from(v: i32) -> Self {
        Operand::Int(v as i64)
    }
}

impl From<u32> for Operand {
    fn from(v: u32) -> Self {
        Operand::Int(v as i64)
    }
}

impl From<usize> for Operand {
    fn from(v: usize) -> Self {
        Operand::Int(v as i64)
    }
}

impl From<f64> for Operand {
    fn from(v: f64) -> Self {
        Operand::Float(v)
    }
}

impl From<bool> for Operand {
    fn from(v: bool) -> Self {
        Operand::Int(if v { 1 } else { 0 })
    }
}

impl From<&str> for Operand {
    fn from(v: &str) -> Self {
        Operand::Text(v.to_string())
    }
}

impl From<String> for Operand {
    fn from(v: String) -> Self {
        Operand::Text(v)
    }
}

impl From<&String> for Operand {
    fn from(v: &String) -> Self {
        Operand::Text(v.clone())
    }
}

/// Build a `Vec<Operand>` from heterogeneous values.
///
/// ```
/// use anim_engine::operands;
/// use anim_engine::ids::ObjectId;
/// let ops = operands![ObjectId(1), "A", 50, 12.5];
/// assert_eq!(ops.len(), 4);
/// ```
#[macro_export]
macro_rules! operands {
    () => { ::std::vec::Vec::<$crate::command::Operand>::new() };
    ($($value:expr),+ $(,)?) => {
        vec![$($crate::command::Operand::from($value)),+]
    };
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Operand decoding failures for a single command.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProtocolError {
    #[error("{opcode}: missing operand #{index}")]
    MissingOperand { opcode: Opcode, index: usize },
    #[error("{opcode}: operand #{index} ({value:?}) is not {expected}")]
    BadOperand {
        opcode: Opcode,
        index: usize,
        value: String,
        expected: &'static str,
    },
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// A single immutable instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    opcode: Opcode,
    operands: Vec<Operand>,
}

impl Command {
    pub fn new(opcode: Opcode, operands: Vec<Operand>) -> Self {
        Self { opcode, operands }
    }

    pub fn step() -> Self {
        Self::new(Opcode::Step, Vec::new())
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn operands(&self) -> &[Operand] {
        &self.operands
    }

    fn operand(&self, index: usize) -> Result<&Operand, ProtocolError> {
        self.operands.get(index).ok_or(ProtocolError::MissingOperand {
            opcode: self.opcode,
            index,
        })
    }

    fn bad(&self, index: usize, value: &Operand, expected: &'static str) -> ProtocolError {
        ProtocolError::BadOperand {
            opcode: self.opcode,
            index,
            value: value.to_string(),
            expected,
        }
    }

    /// Operand as an object id (non-negative integer that fits u32).
    pub fn id(&self, index: usize) -> Result<ObjectId, ProtocolError> {
        let v = self.operand(index)?;
        let raw = match v {
            Operand::Int(i) => u32::try_from(*i).ok(),
            Operand::Text(s) => s.parse::<u32>().ok(),
            Operand::Float(_) => None,
        };
        raw.map(ObjectId).ok_or_else(|| self.bad(index, v, "an object id"))
    }

    /// Operand as an integer. Integral floats are accepted.
    pub fn int(&self, index: usize) -> Result<i64, ProtocolError> {
        let v = self.operand(index)?;
        let raw = match v {
            Operand::Int(i) => Some(*i),
            Operand::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            Operand::Float(_) => None,
            Operand::Text(s) => s.parse::<i64>().ok(),
        };
        raw.ok_or_else(|| self.bad(index, v, "an integer"))
    }

    /// Operand as a finite number.
    pub fn num(&self, index: usize) -> Result<f64, ProtocolError> {
        let v = self.operand(index)?;
        let raw = match v {
            Operand::Int(i) => Some(*i as f64),
            Operand::Float(f) => Some(*f),
            Operand::Text(s) => s.parse::<f64>().ok(),
        };
        raw.filter(|f| f.is_finite())
            .ok_or_else(|| self.bad(index, v, "a finite number"))
    }

    /// Operand rendered as text. Numbers are formatted.
    pub fn text(&self, index: usize) -> Result<String, ProtocolError> {
        Ok(self.operand(index)?.to_string())
    }

    /// Operand as a boolean flag: any non-zero number, or "true"/"false".
    pub fn flag(&self, index: usize) -> Result<bool, ProtocolError> {
        let v = self.operand(index)?;
        let raw = match v {
            Operand::Int(i) => Some(*i != 0),
            Operand::Float(f) => Some(*f != 0.0),
            Operand::Text(s) => match s.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f != 0.0),
            },
        };
        raw.ok_or_else(|| self.bad(index, v, "a flag"))
    }

    pub fn opt_int(&self, index: usize) -> Result<Option<i64>, ProtocolError> {
        self.optional(index, Self::int)
    }

    pub fn opt_num(&self, index: usize) -> Result<Option<f64>, ProtocolError> {
        self.optional(index, Self::num)
    }

    pub fn opt_text(&self, index: usize) -> Result<Option<String>, ProtocolError> {
        self.optional(index, Self::text)
    }

    pub fn opt_flag(&self, index: usize) -> Result<Option<bool>, ProtocolError> {
        self.optional(index, Self::flag)
    }

    fn optional<T>(
        &self,
        index: usize,
        get: fn(&Self, usize) -> Result<T, ProtocolError>,
    ) -> Result<Option<T>, ProtocolError> {
        if index < self.operands.len() {
            get(self, index).map(Some)
        } else {
            Ok(None)
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opcode)?;
        for op in &self.operands {
            write!(f, " {:?}", op.to_string())?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// CommandBatch
// ---------------------------------------------------------------------------

/// Ordered commands produced by one action.
///
/// Append-only while building; callers only get shared access once the
/// batch has been handed off.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandBatch {
    commands: Vec<Command>,
}

impl CommandBatch {
    pub fn new() -> Self {
        Self { commands: Vec::new() }
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.commands.iter()
    }

    pub fn into_commands(self) -> Vec<Command> {
        self.commands
    }

    /// Number of mutating commands (everything except Step).
    pub fn mutation_count(&self) -> usize {
        self.commands.iter().filter(|c| c.opcode().is_mutating()).count()
    }

    /// Split into Step-delimited segments. The Step itself closes a
    /// segment and is not part of it. Consecutive Steps yield empty
    /// segments (a pause). A trailing run without a final Step is its own
    /// segment.
    pub fn segments(&self) -> Vec<&[Command]> {
        let mut out = Vec::new();
        let mut start = 0;
        for (i, c) in self.commands.iter().enumerate() {
            if c.opcode() == Opcode::Step {
                out.push(&self.commands[start..i]);
                start = i + 1;
            }
        }
        if start < self.commands.len() {
            out.push(&self.commands[start..]);
        }
        out
    }
}

impl From<Vec<Command>> for CommandBatch {
    fn from(commands: Vec<Command>) -> Self {
        Self { commands }
    }
}

impl<'a> IntoIterator for &'a CommandBatch {
    type Item = &'a Command;
    type IntoIter = std::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_names_are_unique_and_invertible() {
        for op in Opcode::ALL {
            assert_eq!(Opcode::from_name(op.name()), Some(op));
        }
        assert_eq!(Opcode::from_name("settext"), None);
        assert_eq!(Opcode::from_name("AlignRight"), None);
    }

    #[test]
    fn test_only_step_is_non_mutating() {
        let non_mutating: Vec<_> = Opcode::ALL.iter().filter(|o| !o.is_mutating()).collect();
        assert_eq!(non_mutating, vec![&Opcode::Step]);
    }

    #[test]
    fn test_text_operands_parse_on_access() {
        let c = Command::new(Opcode::Move, crate::operands![ObjectId(3), "12.5", "-4", "0012"]);
        assert_eq!(c.id(0).unwrap(), ObjectId(3));
        assert_eq!(c.num(1).unwrap(), 12.5);
        assert_eq!(c.int(2).unwrap(), -4);
        assert_eq!(c.int(3).unwrap(), 12);
        assert_eq!(c.text(3).unwrap(), "0012");
    }

    #[test]
    fn test_typed_accessors() {
        let c = Command::new(Opcode::CreateRectangle, crate::operands![ObjectId(7), "A", 50, 2.5]);
        assert_eq!(c.id(0).unwrap(), ObjectId(7));
        assert_eq!(c.text(1).unwrap(), "A");
        assert_eq!(c.int(2).unwrap(), 50);
        assert_eq!(c.num(3).unwrap(), 2.5);
        assert_eq!(c.text(2).unwrap(), "50");
        assert_eq!(c.opt_num(4).unwrap(), None);
    }

    #[test]
    fn test_accessor_errors() {
        let c = Command::new(Opcode::SetAlpha, crate::operands![-1, "x"]);
        assert!(matches!(c.id(0), Err(ProtocolError::BadOperand { index: 0, .. })));
        assert!(matches!(c.num(1), Err(ProtocolError::BadOperand { index: 1, .. })));
        assert_eq!(
            c.num(2),
            Err(ProtocolError::MissingOperand { opcode: Opcode::SetAlpha, index: 2 })
        );
    }

    #[test]
    fn test_flag_accepts_numbers_and_words() {
        let c = Command::new(
            Opcode::SetHighlight,
            crate::operands![1, 0, "true", true, "maybe", "2", "0"],
        );
        assert!(c.flag(0).unwrap());
        assert!(!c.flag(1).unwrap());
        assert!(c.flag(2).unwrap());
        assert!(c.flag(3).unwrap());
        assert!(c.flag(4).is_err());
        assert!(c.flag(5).unwrap());
        assert!(!c.flag(6).unwrap());
    }

    #[test]
    fn test_segments_split_on_step() {
        let batch = CommandBatch::from(vec![
            Command::new(Opcode::CreateLabel, crate::operands![1, "a", 0, 0]),
            Command::step(),
            Command::step(),
            Command::new(Opcode::SetText, crate::operands![1, "b"]),
            Command::step(),
            Command::new(Opcode::Delete, crate::operands![1]),
        ]);
        let segs = batch.segments();
        assert_eq!(segs.len(), 4);
        assert_eq!(segs[0].len(), 1);
        assert!(segs[1].is_empty());
        assert_eq!(segs[2][0].opcode(), Opcode::SetText);
        assert_eq!(segs[3][0].opcode(), Opcode::Delete);
        assert_eq!(batch.mutation_count(), 3);
    }

    #[test]
    fn test_segments_of_empty_batch() {
        assert!(CommandBatch::new().segments().is_empty());
    }
}
