//! Animated objects and edges.
//!
//! Pure data plus the capability methods every object kind shares. The
//! set of kinds is closed (`Shape`); behaviour differences are handled
//! by matching on the shape, never by trait objects.

use serde::{Deserialize, Serialize};

use crate::ids::ObjectId;
use crate::undo::{EdgeRecord, UndoBlock};

pub const DEFAULT_FOREGROUND: &str = "#000000";
pub const DEFAULT_BACKGROUND: &str = "#FFFFFF";
pub const DEFAULT_CIRCLE_RADIUS: f64 = 20.0;
pub const DEFAULT_HIGHLIGHT_RADIUS: f64 = 20.0;
pub const DEFAULT_LINK_PERCENT: f64 = 0.25;
/// Rough per-character advance used for label extents.
pub const LABEL_CHAR_WIDTH: f64 = 7.0;
pub const LABEL_HEIGHT: f64 = 10.0;

/// Where an edge attaches on a skip-list box.
pub const ANCHOR_TOP: i64 = 0;
pub const ANCHOR_BOTTOM: i64 = 1;
pub const ANCHOR_LEFT: i64 = 2;
pub const ANCHOR_RIGHT: i64 = 3;

// ── Shapes ─────────────────────────────────────────────────────────

/// Kind-specific state of an animated object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum Shape {
    /// Array cell / generic box.
    Rectangle {
        width: f64,
        height: f64,
        label: String,
        label_color: String,
        null_marker: bool,
    },
    /// Tree node.
    Circle { radius: f64, label: String },
    /// Skip-list tower box. Foreground is the edge color, background the fill.
    SkipList {
        width: f64,
        height: f64,
        label: String,
        label_color: String,
    },
    /// Free-floating text.
    Label { text: String, centered: bool },
    /// Linked-list cell with one or more value slots and a link section.
    LinkedList {
        width: f64,
        height: f64,
        labels: Vec<String>,
        label_colors: Vec<String>,
        link_percent: f64,
        vertical: bool,
        link_at_end: bool,
        null_pointer: bool,
        prev_null: bool,
        next_null: bool,
    },
    /// Ring used to point at another object. Foreground is the ring color.
    HighlightCircle { radius: f64 },
}

/// One drawable entity living inside a World.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnimatedObject {
    pub id: ObjectId,
    pub x: f64,
    pub y: f64,
    pub foreground: String,
    pub background: String,
    pub alpha: f64,
    pub highlighted: bool,
    pub layer: i64,
    /// Character index drawn emphasised inside the label, -1 for none.
    pub highlight_index: i64,
    pub shape: Shape,
}

/// Directed connection between two objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Edge {
    pub color: String,
    pub highlighted: bool,
    pub alpha: f64,
    pub curve: f64,
    pub directed: bool,
    pub label: String,
    pub anchor: Option<i64>,
}

impl Default for Edge {
    fn default() -> Self {
        Self {
            color: DEFAULT_FOREGROUND.to_string(),
            highlighted: false,
            alpha: 1.0,
            curve: 0.0,
            directed: true,
            label: String::new(),
            anchor: None,
        }
    }
}

// ── Construction ───────────────────────────────────────────────────

impl AnimatedObject {
    /// Base object with default styling at (x, y).
    pub fn new(id: ObjectId, x: f64, y: f64, shape: Shape) -> Self {
        Self {
            id,
            x,
            y,
            foreground: DEFAULT_FOREGROUND.to_string(),
            background: DEFAULT_BACKGROUND.to_string(),
            alpha: 1.0,
            highlighted: false,
            layer: 0,
            highlight_index: -1,
            shape,
        }
    }

    pub fn rectangle(id: ObjectId, label: &str, width: f64, height: f64, x: f64, y: f64) -> Self {
        Self::new(
            id,
            x,
            y,
            Shape::Rectangle {
                width,
                height,
                label: label.to_string(),
                label_color: DEFAULT_FOREGROUND.to_string(),
                null_marker: false,
            },
        )
    }

    pub fn circle(id: ObjectId, label: &str, x: f64, y: f64) -> Self {
        Self::new(
            id,
            x,
            y,
            Shape::Circle {
                radius: DEFAULT_CIRCLE_RADIUS,
                label: label.to_string(),
            },
        )
    }

    pub fn skip_list(id: ObjectId, label: &str, width: f64, height: f64, x: f64, y: f64) -> Self {
        Self::new(
            id,
            x,
            y,
            Shape::SkipList {
                width,
                height,
                label: label.to_string(),
                label_color: DEFAULT_FOREGROUND.to_string(),
            },
        )
    }

    pub fn label(id: ObjectId, text: &str, x: f64, y: f64, centered: bool) -> Self {
        Self::new(
            id,
            x,
            y,
            Shape::Label {
                text: text.to_string(),
                centered,
            },
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn linked_list(
        id: ObjectId,
        label: &str,
        width: f64,
        height: f64,
        x: f64,
        y: f64,
        link_percent: f64,
        vertical: bool,
        link_at_end: bool,
        num_labels: usize,
    ) -> Self {
        let n = num_labels.max(1);
        let mut labels = vec![String::new(); n];
        labels[0] = label.to_string();
        Self::new(
            id,
            x,
            y,
            Shape::LinkedList {
                width,
                height,
                labels,
                label_colors: vec![DEFAULT_FOREGROUND.to_string(); n],
                link_percent,
                vertical,
                link_at_end,
                null_pointer: false,
                prev_null: false,
                next_null: false,
            },
        )
    }

    pub fn highlight_circle(id: ObjectId, color: &str, x: f64, y: f64, radius: f64) -> Self {
        let mut obj = Self::new(id, x, y, Shape::HighlightCircle { radius });
        obj.foreground = color.to_string();
        obj
    }

    pub fn kind_name(&self) -> &'static str {
        match self.shape {
            Shape::Rectangle { .. } => "rectangle",
            Shape::Circle { .. } => "circle",
            Shape::SkipList { .. } => "skip_list",
            Shape::Label { .. } => "label",
            Shape::LinkedList { .. } => "linked_list",
            Shape::HighlightCircle { .. } => "highlight_circle",
        }
    }
}

// ── Capabilities ───────────────────────────────────────────────────

impl AnimatedObject {
    pub fn width(&self) -> f64 {
        match &self.shape {
            Shape::Rectangle { width, .. }
            | Shape::SkipList { width, .. }
            | Shape::LinkedList { width, .. } => *width,
            Shape::Circle { radius, .. } | Shape::HighlightCircle { radius } => radius * 2.0,
            Shape::Label { text, .. } => text.chars().count() as f64 * LABEL_CHAR_WIDTH,
        }
    }

    /// Labels size themselves from their text; setting a width is a no-op.
    pub fn set_width(&mut self, new_width: f64) {
        match &mut self.shape {
            Shape::Rectangle { width, .. }
            | Shape::SkipList { width, .. }
            | Shape::LinkedList { width, .. } => *width = new_width,
            Shape::Circle { radius, .. } | Shape::HighlightCircle { radius } => {
                *radius = new_width / 2.0
            }
            Shape::Label { .. } => {}
        }
    }

    pub fn height(&self) -> f64 {
        match &self.shape {
            Shape::Rectangle { height, .. }
            | Shape::SkipList { height, .. }
            | Shape::LinkedList { height, .. } => *height,
            Shape::Circle { radius, .. } | Shape::HighlightCircle { radius } => radius * 2.0,
            Shape::Label { .. } => LABEL_HEIGHT,
        }
    }

    pub fn set_height(&mut self, new_height: f64) {
        match &mut self.shape {
            Shape::Rectangle { height, .. }
            | Shape::SkipList { height, .. }
            | Shape::LinkedList { height, .. } => *height = new_height,
            Shape::Circle { radius, .. } | Shape::HighlightCircle { radius } => {
                *radius = new_height / 2.0
            }
            Shape::Label { .. } => {}
        }
    }

    pub fn left(&self) -> f64 {
        self.x - self.width() / 2.0
    }

    pub fn right(&self) -> f64 {
        self.x + self.width() / 2.0
    }

    pub fn top(&self) -> f64 {
        self.y - self.height() / 2.0
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height() / 2.0
    }

    /// Midpoint of the bounding-box side closest to `from`.
    fn closest_cardinal_point(&self, from: (f64, f64)) -> (f64, f64) {
        let candidates = [
            (self.x, self.top()),
            (self.x, self.bottom()),
            (self.left(), self.y),
            (self.right(), self.y),
        ];
        let dist = |p: &(f64, f64)| (p.0 - from.0).powi(2) + (p.1 - from.1).powi(2);
        let mut best = candidates[0];
        for c in &candidates[1..] {
            if dist(c) < dist(&best) {
                best = *c;
            }
        }
        best
    }

    /// Where an incoming edge drawn from `from` ends on this object.
    pub fn head_attach_point(&self, from: (f64, f64)) -> (f64, f64) {
        match &self.shape {
            Shape::Circle { radius, .. } | Shape::HighlightCircle { radius } => {
                let dx = from.0 - self.x;
                let dy = from.1 - self.y;
                let len = (dx * dx + dy * dy).sqrt();
                if len == 0.0 {
                    (self.x, self.y)
                } else {
                    (self.x + dx / len * radius, self.y + dy / len * radius)
                }
            }
            Shape::Label { .. } => (self.x, self.y),
            Shape::Rectangle { .. } | Shape::SkipList { .. } | Shape::LinkedList { .. } => {
                self.closest_cardinal_point(from)
            }
        }
    }

    /// Where an outgoing edge towards `toward` starts on this object.
    pub fn tail_attach_point(&self, toward: (f64, f64), anchor: Option<i64>) -> (f64, f64) {
        match &self.shape {
            Shape::SkipList { .. } => match anchor {
                Some(ANCHOR_TOP) => (self.x, self.top()),
                Some(ANCHOR_BOTTOM) => (self.x, self.bottom()),
                Some(ANCHOR_LEFT) => (self.left(), self.y),
                Some(ANCHOR_RIGHT) => (self.right(), self.y),
                _ => self.closest_cardinal_point(toward),
            },
            Shape::LinkedList {
                width,
                height,
                link_percent,
                vertical,
                link_at_end,
                ..
            } => {
                if *vertical {
                    let offset = height * link_percent / 2.0;
                    if *link_at_end {
                        (self.x, self.bottom() - offset)
                    } else {
                        (self.x, self.top() + offset)
                    }
                } else {
                    let offset = width * link_percent / 2.0;
                    if *link_at_end {
                        (self.right() - offset, self.y)
                    } else {
                        (self.left() + offset, self.y)
                    }
                }
            }
            _ => self.head_attach_point(toward),
        }
    }

    /// Text of slot `index`. Only linked lists have more than one slot;
    /// highlight circles have none.
    pub fn text(&self, index: usize) -> Option<&str> {
        match &self.shape {
            Shape::Rectangle { label, .. }
            | Shape::Circle { label, .. }
            | Shape::SkipList { label, .. }
            | Shape::Label { text: label, .. } => (index == 0).then_some(label.as_str()),
            Shape::LinkedList { labels, .. } => labels.get(index).map(String::as_str),
            Shape::HighlightCircle { .. } => None,
        }
    }

    /// Returns false when the slot does not exist.
    pub fn set_text(&mut self, index: usize, new_text: &str) -> bool {
        match &mut self.shape {
            Shape::Rectangle { label, .. }
            | Shape::Circle { label, .. }
            | Shape::SkipList { label, .. }
            | Shape::Label { text: label, .. } => {
                if index != 0 {
                    return false;
                }
                *label = new_text.to_string();
                true
            }
            Shape::LinkedList { labels, .. } => match labels.get_mut(index) {
                Some(slot) => {
                    *slot = new_text.to_string();
                    true
                }
                None => false,
            },
            Shape::HighlightCircle { .. } => false,
        }
    }

    pub fn text_color(&self, index: usize) -> Option<&str> {
        match &self.shape {
            Shape::Rectangle { label_color, .. } | Shape::SkipList { label_color, .. } => {
                (index == 0).then_some(label_color.as_str())
            }
            Shape::LinkedList { label_colors, .. } => label_colors.get(index).map(String::as_str),
            Shape::Circle { .. } | Shape::Label { .. } | Shape::HighlightCircle { .. } => {
                (index == 0).then_some(self.foreground.as_str())
            }
        }
    }

    pub fn set_text_color(&mut self, index: usize, color: &str) -> bool {
        match &mut self.shape {
            Shape::Rectangle { label_color, .. } | Shape::SkipList { label_color, .. } => {
                if index != 0 {
                    return false;
                }
                *label_color = color.to_string();
                true
            }
            Shape::LinkedList { label_colors, .. } => match label_colors.get_mut(index) {
                Some(slot) => {
                    *slot = color.to_string();
                    true
                }
                None => false,
            },
            Shape::Circle { .. } | Shape::Label { .. } | Shape::HighlightCircle { .. } => {
                if index != 0 {
                    return false;
                }
                self.foreground = color.to_string();
                true
            }
        }
    }

    pub fn set_highlight(&mut self, value: bool) {
        self.highlighted = value;
    }

    /// Number of value slots. Every kind but a linked list has exactly one.
    pub fn num_elements(&self) -> usize {
        match &self.shape {
            Shape::LinkedList { labels, .. } => labels.len(),
            _ => 1,
        }
    }

    /// Resize the slot vectors of a linked list. New slots are blank.
    /// Returns false for kinds without slots.
    pub fn set_num_elements(&mut self, n: usize) -> bool {
        match &mut self.shape {
            Shape::LinkedList {
                labels,
                label_colors,
                ..
            } => {
                labels.resize(n, String::new());
                label_colors.resize(n, DEFAULT_FOREGROUND.to_string());
                true
            }
            _ => false,
        }
    }

    pub fn null_pointer(&self) -> Option<bool> {
        match &self.shape {
            Shape::Rectangle { null_marker, .. } => Some(*null_marker),
            Shape::LinkedList { null_pointer, .. } => Some(*null_pointer),
            _ => None,
        }
    }

    pub fn set_null_pointer(&mut self, value: bool) -> bool {
        match &mut self.shape {
            Shape::Rectangle { null_marker, .. } => *null_marker = value,
            Shape::LinkedList { null_pointer, .. } => *null_pointer = value,
            _ => return false,
        }
        true
    }

    pub fn prev_null(&self) -> Option<bool> {
        match &self.shape {
            Shape::LinkedList { prev_null, .. } => Some(*prev_null),
            _ => None,
        }
    }

    pub fn set_prev_null(&mut self, value: bool) -> bool {
        match &mut self.shape {
            Shape::LinkedList { prev_null, .. } => {
                *prev_null = value;
                true
            }
            _ => false,
        }
    }

    pub fn next_null(&self) -> Option<bool> {
        match &self.shape {
            Shape::LinkedList { next_null, .. } => Some(*next_null),
            _ => None,
        }
    }

    pub fn set_next_null(&mut self, value: bool) -> bool {
        match &mut self.shape {
            Shape::LinkedList { next_null, .. } => {
                *next_null = value;
                true
            }
            _ => false,
        }
    }

    /// Full-copy undo record for deleting this object together with the
    /// edges that the deletion removes.
    pub fn create_undo_delete(&self, edges: Vec<EdgeRecord>) -> UndoBlock {
        UndoBlock::Delete {
            object: Box::new(self.clone()),
            edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_width_is_diameter() {
        let mut c = AnimatedObject::circle(ObjectId(1), "5", 0.0, 0.0);
        assert_eq!(c.width(), 40.0);
        c.set_width(30.0);
        assert_eq!(c.width(), 30.0);
        assert!(matches!(c.shape, Shape::Circle { radius, .. } if radius == 15.0));
    }

    #[test]
    fn test_circle_head_attach_is_on_rim() {
        let c = AnimatedObject::circle(ObjectId(1), "", 100.0, 100.0);
        assert_eq!(c.head_attach_point((100.0, 0.0)), (100.0, 80.0));
        assert_eq!(c.head_attach_point((100.0, 100.0)), (100.0, 100.0));
    }

    #[test]
    fn test_rectangle_attaches_at_closest_side() {
        let r = AnimatedObject::rectangle(ObjectId(2), "", 50.0, 20.0, 0.0, 0.0);
        assert_eq!(r.head_attach_point((200.0, 0.0)), (25.0, 0.0));
        assert_eq!(r.head_attach_point((0.0, -200.0)), (0.0, -10.0));
    }

    #[test]
    fn test_skip_list_tail_anchor() {
        let s = AnimatedObject::skip_list(ObjectId(3), "7", 40.0, 20.0, 10.0, 10.0);
        assert_eq!(s.tail_attach_point((0.0, 0.0), Some(ANCHOR_RIGHT)), (30.0, 10.0));
        assert_eq!(s.tail_attach_point((0.0, 0.0), Some(ANCHOR_BOTTOM)), (10.0, 20.0));
    }

    #[test]
    fn test_linked_list_slots() {
        let mut l = AnimatedObject::linked_list(
            ObjectId(4), "a", 60.0, 30.0, 0.0, 0.0, DEFAULT_LINK_PERCENT, false, true, 2,
        );
        assert_eq!(l.num_elements(), 2);
        assert_eq!(l.text(0), Some("a"));
        assert_eq!(l.text(1), Some(""));
        assert!(l.set_text(1, "b"));
        assert!(!l.set_text(2, "c"));
        assert!(l.set_num_elements(1));
        assert_eq!(l.text(1), None);
    }

    #[test]
    fn test_single_slot_kinds_reject_other_indices() {
        let mut r = AnimatedObject::rectangle(ObjectId(5), "x", 10.0, 10.0, 0.0, 0.0);
        assert!(!r.set_text(1, "y"));
        assert_eq!(r.text(0), Some("x"));
        assert!(!r.set_num_elements(3));
        assert_eq!(r.num_elements(), 1);
    }

    #[test]
    fn test_null_markers_only_on_supported_kinds() {
        let mut r = AnimatedObject::rectangle(ObjectId(6), "", 10.0, 10.0, 0.0, 0.0);
        assert!(r.set_null_pointer(true));
        assert_eq!(r.null_pointer(), Some(true));
        assert!(!r.set_prev_null(true));
        let mut c = AnimatedObject::circle(ObjectId(7), "", 0.0, 0.0);
        assert!(!c.set_null_pointer(true));
        assert_eq!(c.null_pointer(), None);
    }

    #[test]
    fn test_create_undo_delete_copies_everything() {
        let mut c = AnimatedObject::circle(ObjectId(8), "n", 3.0, 4.0);
        c.background = "#ABCDEF".into();
        c.layer = 2;
        match c.create_undo_delete(Vec::new()) {
            UndoBlock::Delete { object, edges } => {
                assert_eq!(*object, c);
                assert!(edges.is_empty());
            }
            other => panic!("Expected Delete block, got {:?}", other),
        }
    }
}
