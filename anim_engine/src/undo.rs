//! Undo blocks: value captures taken immediately before a command
//! mutates the World.
//!
//! Every variant remembers exactly the field(s) its command changes.
//! Reversal writes the captured values back; it never replays anything.

use crate::ids::ObjectId;
use crate::object::{AnimatedObject, Edge};
use crate::world::World;

/// An edge together with its endpoints, as removed from a World.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRecord {
    pub from: ObjectId,
    pub to: ObjectId,
    pub edge: Edge,
}

/// Pre-mutation state of one command.
#[derive(Debug, Clone, PartialEq)]
pub enum UndoBlock {
    /// Identity only: reversal removes the object.
    Create { id: ObjectId },
    /// Full copy of the deleted object plus the edges its removal dropped.
    Delete {
        object: Box<AnimatedObject>,
        edges: Vec<EdgeRecord>,
    },
    SetText {
        id: ObjectId,
        index: usize,
        text: String,
    },
    /// Captured by Move.
    SetPosition { id: ObjectId, x: f64, y: f64 },
    SetForegroundColor { id: ObjectId, color: String },
    SetBackgroundColor { id: ObjectId, color: String },
    SetAlpha { id: ObjectId, alpha: f64 },
    SetHighlight { id: ObjectId, highlighted: bool },
    SetLayer { id: ObjectId, layer: i64 },
    SetNull { id: ObjectId, value: bool },
    SetPrevNull { id: ObjectId, value: bool },
    SetNextNull { id: ObjectId, value: bool },
    /// Captured by Connect and Disconnect: the edge that existed before,
    /// if any.
    EdgePresence {
        from: ObjectId,
        to: ObjectId,
        prior: Option<Edge>,
    },
    SetEdgeHighlight {
        from: ObjectId,
        to: ObjectId,
        highlighted: bool,
    },
    SetEdgeColor {
        from: ObjectId,
        to: ObjectId,
        color: String,
    },
    SetEdgeAlpha {
        from: ObjectId,
        to: ObjectId,
        alpha: f64,
    },
    /// Slot count before the change and, when shrinking, the text and
    /// color of every slot that disappeared.
    SetNumElements {
        id: ObjectId,
        before: usize,
        after: usize,
        trailing: Vec<(String, String)>,
    },
    SetHighlightIndex { id: ObjectId, index: i64 },
}

impl UndoBlock {
    /// Object the block restores. Edge blocks report their source.
    pub fn object_id(&self) -> ObjectId {
        match self {
            UndoBlock::Create { id }
            | UndoBlock::SetText { id, .. }
            | UndoBlock::SetPosition { id, .. }
            | UndoBlock::SetForegroundColor { id, .. }
            | UndoBlock::SetBackgroundColor { id, .. }
            | UndoBlock::SetAlpha { id, .. }
            | UndoBlock::SetHighlight { id, .. }
            | UndoBlock::SetLayer { id, .. }
            | UndoBlock::SetNull { id, .. }
            | UndoBlock::SetPrevNull { id, .. }
            | UndoBlock::SetNextNull { id, .. }
            | UndoBlock::SetNumElements { id, .. }
            | UndoBlock::SetHighlightIndex { id, .. } => *id,
            UndoBlock::Delete { object, .. } => object.id,
            UndoBlock::EdgePresence { from, .. }
            | UndoBlock::SetEdgeHighlight { from, .. }
            | UndoBlock::SetEdgeColor { from, .. }
            | UndoBlock::SetEdgeAlpha { from, .. } => *from,
        }
    }

    /// Write the captured state back into `world`.
    ///
    /// Panics if the block references an object or edge the World does not
    /// hold: the log no longer matches the World it was captured from.
    pub fn reverse(self, world: &mut World) {
        match self {
            UndoBlock::Create { id } => {
                world.remove_object(id);
            }
            UndoBlock::Delete { object, edges } => {
                world.add_object(*object);
                for rec in edges {
                    world.put_edge(rec.from, rec.to, Some(rec.edge));
                }
            }
            UndoBlock::SetText { id, index, text } => {
                if !world.expect_object_mut(id).set_text(index, &text) {
                    panic!("Undo mismatch: object {} has no text slot {}", id, index);
                }
            }
            UndoBlock::SetPosition { id, x, y } => {
                let obj = world.expect_object_mut(id);
                obj.x = x;
                obj.y = y;
            }
            UndoBlock::SetForegroundColor { id, color } => {
                world.expect_object_mut(id).foreground = color;
            }
            UndoBlock::SetBackgroundColor { id, color } => {
                world.expect_object_mut(id).background = color;
            }
            UndoBlock::SetAlpha { id, alpha } => {
                world.expect_object_mut(id).alpha = alpha;
            }
            UndoBlock::SetHighlight { id, highlighted } => {
                world.expect_object_mut(id).set_highlight(highlighted);
            }
            UndoBlock::SetLayer { id, layer } => {
                world.expect_object_mut(id).layer = layer;
            }
            UndoBlock::SetNull { id, value } => {
                world.expect_object_mut(id).set_null_pointer(value);
            }
            UndoBlock::SetPrevNull { id, value } => {
                world.expect_object_mut(id).set_prev_null(value);
            }
            UndoBlock::SetNextNull { id, value } => {
                world.expect_object_mut(id).set_next_null(value);
            }
            UndoBlock::EdgePresence { from, to, prior } => {
                world.put_edge(from, to, prior);
            }
            UndoBlock::SetEdgeHighlight {
                from,
                to,
                highlighted,
            } => {
                world.expect_edge_mut(from, to).highlighted = highlighted;
            }
            UndoBlock::SetEdgeColor { from, to, color } => {
                world.expect_edge_mut(from, to).color = color;
            }
            UndoBlock::SetEdgeAlpha { from, to, alpha } => {
                world.expect_edge_mut(from, to).alpha = alpha;
            }
            UndoBlock::SetNumElements {
                id,
                before,
                after,
                trailing,
            } => {
                let obj = world.expect_object_mut(id);
                obj.set_num_elements(before);
                for (offset, (text, color)) in trailing.into_iter().enumerate() {
                    obj.set_text(after + offset, &text);
                    obj.set_text_color(after + offset, &color);
                }
            }
            UndoBlock::SetHighlightIndex { id, index } => {
                world.expect_object_mut(id).highlight_index = index;
            }
        }
    }
}

/// Reverse a whole per-batch log, newest block first.
pub fn reverse_all(blocks: Vec<UndoBlock>, world: &mut World) {
    for block in blocks.into_iter().rev() {
        block.reverse(world);
    }
}
