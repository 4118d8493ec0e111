//! The World: live registry of animated objects and edges.
//!
//! Mutated only through `apply`, which captures an UndoBlock from the
//! current state before changing anything, and through UndoBlock
//! reversal. Commands that reference objects or edges the World does not
//! hold are client defects and panic.

use std::collections::BTreeMap;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::command::{Command, Opcode, ProtocolError};
use crate::ids::ObjectId;
use crate::object::{AnimatedObject, Edge, DEFAULT_HIGHLIGHT_RADIUS, DEFAULT_LINK_PERCENT};
use crate::undo::{EdgeRecord, UndoBlock};

/// Scene state owned by a playback orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct World {
    objects: BTreeMap<ObjectId, AnimatedObject>,
    /// from -> to -> edge
    edges: BTreeMap<ObjectId, BTreeMap<ObjectId, Edge>>,
}

// ---------------------------------------------------------------------------
// Registry access
// ---------------------------------------------------------------------------

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty() && self.edges.is_empty()
    }

    pub fn object(&self, id: ObjectId) -> Option<&AnimatedObject> {
        self.objects.get(&id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// Objects in id order.
    pub fn objects(&self) -> impl Iterator<Item = &AnimatedObject> {
        self.objects.values()
    }

    pub fn edge(&self, from: ObjectId, to: ObjectId) -> Option<&Edge> {
        self.edges.get(&from).and_then(|m| m.get(&to))
    }

    /// Edges ordered by (from, to).
    pub fn edges(&self) -> impl Iterator<Item = (ObjectId, ObjectId, &Edge)> {
        self.edges
            .iter()
            .flat_map(|(from, m)| m.iter().map(move |(to, e)| (*from, *to, e)))
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeMap::len).sum()
    }

    /// Every edge touching `id`, outgoing first.
    pub fn incident_edges(&self, id: ObjectId) -> Vec<EdgeRecord> {
        self.edges()
            .filter(|(from, to, _)| *from == id || *to == id)
            .map(|(from, to, edge)| EdgeRecord {
                from,
                to,
                edge: edge.clone(),
            })
            .collect()
    }

    /// Creation factory. Panics if the id is already taken.
    pub fn add_object(&mut self, object: AnimatedObject) {
        let id = object.id;
        if self.objects.insert(id, object).is_some() {
            panic!("Protocol violation: ObjectID {} created twice", id);
        }
    }

    /// Remove an object and every incident edge. Panics if missing.
    pub fn remove_object(&mut self, id: ObjectId) -> (AnimatedObject, Vec<EdgeRecord>) {
        let object = self
            .objects
            .remove(&id)
            .unwrap_or_else(|| panic!("Protocol violation: missing ObjectID {}", id));
        let edges = self.incident_edges(id);
        for rec in &edges {
            self.put_edge(rec.from, rec.to, None);
        }
        (object, edges)
    }

    pub fn expect_object_mut(&mut self, id: ObjectId) -> &mut AnimatedObject {
        self.objects
            .get_mut(&id)
            .unwrap_or_else(|| panic!("Protocol violation: missing ObjectID {}", id))
    }

    pub fn expect_edge_mut(&mut self, from: ObjectId, to: ObjectId) -> &mut Edge {
        self.edges
            .get_mut(&from)
            .and_then(|m| m.get_mut(&to))
            .unwrap_or_else(|| panic!("Protocol violation: missing edge {} -> {}", from, to))
    }

    /// Set or clear the edge `from -> to`, returning what was there.
    pub fn put_edge(&mut self, from: ObjectId, to: ObjectId, edge: Option<Edge>) -> Option<Edge> {
        match edge {
            Some(e) => {
                self.require_endpoints(from, to);
                self.edges.entry(from).or_default().insert(to, e)
            }
            None => {
                let inner = self.edges.get_mut(&from)?;
                let prior = inner.remove(&to);
                if inner.is_empty() {
                    self.edges.remove(&from);
                }
                prior
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Command application
// ---------------------------------------------------------------------------

fn alpha_operand(cmd: &Command, index: usize) -> Result<f64, ProtocolError> {
    let alpha = cmd.num(index)?;
    if (0.0..=1.0).contains(&alpha) {
        Ok(alpha)
    } else {
        Err(ProtocolError::BadOperand {
            opcode: cmd.opcode(),
            index,
            value: alpha.to_string(),
            expected: "an alpha in [0, 1]",
        })
    }
}

fn count_operand(cmd: &Command, index: usize) -> Result<usize, ProtocolError> {
    let n = cmd.int(index)?;
    if n >= 1 {
        Ok(n as usize)
    } else {
        Err(ProtocolError::BadOperand {
            opcode: cmd.opcode(),
            index,
            value: n.to_string(),
            expected: "a positive count",
        })
    }
}

fn index_operand(cmd: &Command, index: usize) -> Result<usize, ProtocolError> {
    match cmd.opt_int(index)? {
        None => Ok(0),
        Some(i) if i >= 0 => Ok(i as usize),
        Some(i) => Err(ProtocolError::BadOperand {
            opcode: cmd.opcode(),
            index,
            value: i.to_string(),
            expected: "a slot index",
        }),
    }
}

impl World {
    /// Execute one command.
    ///
    /// Operands are fully decoded before anything is touched, so an
    /// `Err` leaves the World unchanged. On success the returned block
    /// holds the pre-mutation value(s); `Step` returns `None`.
    pub fn apply(&mut self, cmd: &Command) -> Result<Option<UndoBlock>, ProtocolError> {
        trace!("apply {}", cmd);
        let block = match cmd.opcode() {
            Opcode::Step => return Ok(None),

            // -- creation ---------------------------------------------------
            Opcode::CreateRectangle => {
                let id = cmd.id(0)?;
                let mut obj = AnimatedObject::rectangle(
                    id,
                    &cmd.text(1)?,
                    cmd.num(2)?,
                    cmd.num(3)?,
                    cmd.num(4)?,
                    cmd.num(5)?,
                );
                if let Some(bg) = cmd.opt_text(6)? {
                    obj.background = bg;
                }
                if let Some(fg) = cmd.opt_text(7)? {
                    obj.foreground = fg;
                }
                self.add_object(obj);
                UndoBlock::Create { id }
            }
            Opcode::CreateCircle => {
                let id = cmd.id(0)?;
                let obj = AnimatedObject::circle(id, &cmd.text(1)?, cmd.num(2)?, cmd.num(3)?);
                self.add_object(obj);
                UndoBlock::Create { id }
            }
            Opcode::CreateLabel => {
                let id = cmd.id(0)?;
                let centered = cmd.opt_flag(4)?.unwrap_or(true);
                let obj =
                    AnimatedObject::label(id, &cmd.text(1)?, cmd.num(2)?, cmd.num(3)?, centered);
                self.add_object(obj);
                UndoBlock::Create { id }
            }
            Opcode::CreateLinkedList => {
                let id = cmd.id(0)?;
                let num_labels = match cmd.opt_int(9)? {
                    Some(_) => count_operand(cmd, 9)?,
                    None => 1,
                };
                let obj = AnimatedObject::linked_list(
                    id,
                    &cmd.text(1)?,
                    cmd.num(2)?,
                    cmd.num(3)?,
                    cmd.num(4)?,
                    cmd.num(5)?,
                    cmd.opt_num(6)?.unwrap_or(DEFAULT_LINK_PERCENT),
                    cmd.opt_flag(7)?.unwrap_or(false),
                    cmd.opt_flag(8)?.unwrap_or(true),
                    num_labels,
                );
                self.add_object(obj);
                UndoBlock::Create { id }
            }
            Opcode::CreateHighlightCircle => {
                let id = cmd.id(0)?;
                let radius = cmd.opt_num(4)?.unwrap_or(DEFAULT_HIGHLIGHT_RADIUS);
                let obj = AnimatedObject::highlight_circle(
                    id,
                    &cmd.text(1)?,
                    cmd.num(2)?,
                    cmd.num(3)?,
                    radius,
                );
                self.add_object(obj);
                UndoBlock::Create { id }
            }

            // -- object fields ----------------------------------------------
            Opcode::SetText => {
                let id = cmd.id(0)?;
                let text = cmd.text(1)?;
                let index = index_operand(cmd, 2)?;
                let obj = self.expect_object_mut(id);
                let prior = obj
                    .text(index)
                    .unwrap_or_else(|| {
                        panic!("Protocol violation: object {} has no text slot {}", id, index)
                    })
                    .to_string();
                obj.set_text(index, &text);
                UndoBlock::SetText {
                    id,
                    index,
                    text: prior,
                }
            }
            Opcode::SetForegroundColor => {
                let id = cmd.id(0)?;
                let color = cmd.text(1)?;
                let obj = self.expect_object_mut(id);
                let prior = std::mem::replace(&mut obj.foreground, color);
                UndoBlock::SetForegroundColor { id, color: prior }
            }
            Opcode::SetBackgroundColor => {
                let id = cmd.id(0)?;
                let color = cmd.text(1)?;
                let obj = self.expect_object_mut(id);
                let prior = std::mem::replace(&mut obj.background, color);
                UndoBlock::SetBackgroundColor { id, color: prior }
            }
            Opcode::SetAlpha => {
                let id = cmd.id(0)?;
                let alpha = alpha_operand(cmd, 1)?;
                let obj = self.expect_object_mut(id);
                let prior = std::mem::replace(&mut obj.alpha, alpha);
                UndoBlock::SetAlpha { id, alpha: prior }
            }
            Opcode::SetHighlight => {
                let id = cmd.id(0)?;
                let value = cmd.flag(1)?;
                let obj = self.expect_object_mut(id);
                let prior = obj.highlighted;
                obj.set_highlight(value);
                UndoBlock::SetHighlight {
                    id,
                    highlighted: prior,
                }
            }
            Opcode::SetLayer => {
                let id = cmd.id(0)?;
                let layer = cmd.int(1)?;
                let obj = self.expect_object_mut(id);
                let prior = std::mem::replace(&mut obj.layer, layer);
                UndoBlock::SetLayer { id, layer: prior }
            }
            Opcode::SetNull => {
                let id = cmd.id(0)?;
                let value = cmd.flag(1)?;
                let obj = self.expect_object_mut(id);
                let prior = unsupported(id, "SetNull", obj.null_pointer());
                obj.set_null_pointer(value);
                UndoBlock::SetNull { id, value: prior }
            }
            Opcode::SetPrevNull => {
                let id = cmd.id(0)?;
                let value = cmd.flag(1)?;
                let obj = self.expect_object_mut(id);
                let prior = unsupported(id, "SetPrevNull", obj.prev_null());
                obj.set_prev_null(value);
                UndoBlock::SetPrevNull { id, value: prior }
            }
            Opcode::SetNextNull => {
                let id = cmd.id(0)?;
                let value = cmd.flag(1)?;
                let obj = self.expect_object_mut(id);
                let prior = unsupported(id, "SetNextNull", obj.next_null());
                obj.set_next_null(value);
                UndoBlock::SetNextNull { id, value: prior }
            }
            Opcode::Move => {
                let id = cmd.id(0)?;
                let (x, y) = (cmd.num(1)?, cmd.num(2)?);
                let obj = self.expect_object_mut(id);
                let block = UndoBlock::SetPosition {
                    id,
                    x: obj.x,
                    y: obj.y,
                };
                obj.x = x;
                obj.y = y;
                block
            }
            Opcode::SetNumElements => {
                let id = cmd.id(0)?;
                let after = count_operand(cmd, 1)?;
                let obj = self.expect_object_mut(id);
                let before = obj.num_elements();
                let trailing = (after..before)
                    .map(|i| {
                        (
                            obj.text(i).unwrap_or_default().to_string(),
                            obj.text_color(i).unwrap_or_default().to_string(),
                        )
                    })
                    .collect();
                if !obj.set_num_elements(after) {
                    panic!(
                        "Protocol violation: SetNumElements on {} object {}",
                        obj.kind_name(),
                        id
                    );
                }
                UndoBlock::SetNumElements {
                    id,
                    before,
                    after,
                    trailing,
                }
            }
            Opcode::SetHighlightIndex => {
                let id = cmd.id(0)?;
                let index = cmd.int(1)?;
                let obj = self.expect_object_mut(id);
                let prior = std::mem::replace(&mut obj.highlight_index, index);
                UndoBlock::SetHighlightIndex { id, index: prior }
            }
            Opcode::Delete => {
                let id = cmd.id(0)?;
                let (object, edges) = self.remove_object(id);
                object.create_undo_delete(edges)
            }

            // -- edges ------------------------------------------------------
            Opcode::Connect => {
                let from = cmd.id(0)?;
                let to = cmd.id(1)?;
                let default = Edge::default();
                let edge = Edge {
                    color: cmd.opt_text(2)?.unwrap_or(default.color),
                    curve: cmd.opt_num(3)?.unwrap_or(default.curve),
                    directed: cmd.opt_flag(4)?.unwrap_or(default.directed),
                    label: cmd.opt_text(5)?.unwrap_or(default.label),
                    anchor: cmd.opt_int(6)?,
                    ..default
                };
                self.require_endpoints(from, to);
                let prior = self.put_edge(from, to, Some(edge));
                UndoBlock::EdgePresence { from, to, prior }
            }
            Opcode::Disconnect => {
                let from = cmd.id(0)?;
                let to = cmd.id(1)?;
                let prior = self.put_edge(from, to, None);
                UndoBlock::EdgePresence { from, to, prior }
            }
            Opcode::SetEdgeHighlight => {
                let (from, to) = (cmd.id(0)?, cmd.id(1)?);
                let value = cmd.flag(2)?;
                let edge = self.expect_edge_mut(from, to);
                let prior = std::mem::replace(&mut edge.highlighted, value);
                UndoBlock::SetEdgeHighlight {
                    from,
                    to,
                    highlighted: prior,
                }
            }
            Opcode::SetEdgeColor => {
                let (from, to) = (cmd.id(0)?, cmd.id(1)?);
                let color = cmd.text(2)?;
                let edge = self.expect_edge_mut(from, to);
                let prior = std::mem::replace(&mut edge.color, color);
                UndoBlock::SetEdgeColor {
                    from,
                    to,
                    color: prior,
                }
            }
            Opcode::SetEdgeAlpha => {
                let (from, to) = (cmd.id(0)?, cmd.id(1)?);
                let alpha = alpha_operand(cmd, 2)?;
                let edge = self.expect_edge_mut(from, to);
                let prior = std::mem::replace(&mut edge.alpha, alpha);
                UndoBlock::SetEdgeAlpha {
                    from,
                    to,
                    alpha: prior,
                }
            }
        };
        Ok(Some(block))
    }

    fn require_endpoints(&self, from: ObjectId, to: ObjectId) {
        for id in [from, to] {
            if !self.contains(id) {
                panic!("Protocol violation: edge endpoint missing ObjectID {}", id);
            }
        }
    }
}

fn unsupported(id: ObjectId, op: &str, value: Option<bool>) -> bool {
    value.unwrap_or_else(|| {
        panic!("Protocol violation: {} on object {} without that marker", op, id)
    })
}
