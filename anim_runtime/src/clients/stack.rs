//! Array-backed stack with a visible `top` cell.

use anim_engine::command::Opcode;
use anim_engine::ids::ObjectId;
use anim_engine::operands;
use anim_engine::recorder::{ActionContext, Algorithm};

pub const SIZE: usize = 30;
const PER_LINE: usize = 15;

const ARRAY_START_X: f64 = 100.0;
const ARRAY_START_Y: f64 = 200.0;
const ELEMENT_WIDTH: f64 = 50.0;
const ELEMENT_HEIGHT: f64 = 50.0;
const LINE_SPACING: f64 = 130.0;

const TOP_POS: (f64, f64) = (180.0, 100.0);
const TOP_LABEL_POS: (f64, f64) = (130.0, 100.0);
const MESSAGE_POS: (f64, f64) = (50.0, 30.0);
const VALUE_POS: (f64, f64) = (120.0, 30.0);

const INDEX_COLOR: &str = "#0000FF";
const HIGHLIGHT_COLOR: &str = "#0000FF";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackAction {
    Push(String),
    Pop,
    Clear,
}

/// Ids fixed by `setup`.
#[derive(Debug, Clone)]
struct Layout {
    cells: Vec<ObjectId>,
    top: ObjectId,
    message: ObjectId,
    highlight: ObjectId,
}

#[derive(Debug, Default)]
pub struct StackArray {
    layout: Option<Layout>,
    data: Vec<String>,
}

fn cell_pos(index: usize) -> (f64, f64) {
    (
        (index % PER_LINE) as f64 * ELEMENT_WIDTH + ARRAY_START_X,
        (index / PER_LINE) as f64 * LINE_SPACING + ARRAY_START_Y,
    )
}

impl StackArray {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of elements on the stack.
    pub fn top(&self) -> usize {
        self.data.len()
    }

    pub fn values(&self) -> &[String] {
        &self.data
    }

    pub fn can_push(&self) -> bool {
        self.data.len() < SIZE
    }

    pub fn can_pop(&self) -> bool {
        !self.data.is_empty()
    }

    fn layout(&self) -> Layout {
        self.layout
            .clone()
            .unwrap_or_else(|| panic!("StackArray used before setup"))
    }

    fn push(&mut self, value: &str, ctx: &mut ActionContext<'_>) {
        if !self.can_push() {
            panic!("Protocol violation: push onto a full stack");
        }
        let layout = self.layout();
        let index = self.data.len();
        let (x, y) = cell_pos(index);
        let heading = ctx.alloc();
        let moving = ctx.alloc();

        ctx.cmd(Opcode::SetText, operands![layout.message, ""]);
        ctx.cmd(
            Opcode::CreateLabel,
            operands![heading, "Pushing Value: ", MESSAGE_POS.0, MESSAGE_POS.1],
        );
        ctx.cmd(
            Opcode::CreateLabel,
            operands![moving, value, VALUE_POS.0, VALUE_POS.1],
        );
        ctx.step();
        ctx.cmd(
            Opcode::CreateHighlightCircle,
            operands![layout.highlight, HIGHLIGHT_COLOR, TOP_POS.0, TOP_POS.1],
        );
        ctx.step();
        ctx.cmd(
            Opcode::Move,
            operands![layout.highlight, x, y + ELEMENT_HEIGHT],
        );
        ctx.step();
        ctx.cmd(Opcode::Move, operands![moving, x, y]);
        ctx.step();
        ctx.cmd(Opcode::SetText, operands![layout.cells[index], value]);
        ctx.cmd(Opcode::Delete, operands![moving]);
        ctx.cmd(Opcode::Delete, operands![layout.highlight]);
        ctx.cmd(Opcode::SetHighlight, operands![layout.top, true]);
        ctx.step();

        self.data.push(value.to_string());
        ctx.cmd(Opcode::SetText, operands![layout.top, self.data.len()]);
        ctx.cmd(Opcode::Delete, operands![heading]);
        ctx.step();
        ctx.cmd(Opcode::SetHighlight, operands![layout.top, false]);
    }

    fn pop(&mut self, ctx: &mut ActionContext<'_>) {
        let layout = self.layout();
        let value = self
            .data
            .pop()
            .unwrap_or_else(|| panic!("Protocol violation: pop from an empty stack"));
        let index = self.data.len();
        let (x, y) = cell_pos(index);
        let heading = ctx.alloc();
        let moving = ctx.alloc();

        ctx.cmd(Opcode::SetText, operands![layout.message, ""]);
        ctx.cmd(
            Opcode::CreateLabel,
            operands![heading, "Popped Value: ", MESSAGE_POS.0, MESSAGE_POS.1],
        );
        ctx.cmd(Opcode::SetHighlight, operands![layout.top, true]);
        ctx.step();
        ctx.cmd(Opcode::SetText, operands![layout.top, index]);
        ctx.step();
        ctx.cmd(Opcode::SetHighlight, operands![layout.top, false]);
        ctx.cmd(
            Opcode::CreateHighlightCircle,
            operands![layout.highlight, HIGHLIGHT_COLOR, TOP_POS.0, TOP_POS.1],
        );
        ctx.step();
        ctx.cmd(
            Opcode::Move,
            operands![layout.highlight, x, y + ELEMENT_HEIGHT],
        );
        ctx.step();
        ctx.cmd(Opcode::CreateLabel, operands![moving, &value, x, y]);
        ctx.cmd(Opcode::SetText, operands![layout.cells[index], ""]);
        ctx.cmd(Opcode::Move, operands![moving, VALUE_POS.0, VALUE_POS.1]);
        ctx.step();
        ctx.cmd(Opcode::Delete, operands![moving]);
        ctx.cmd(Opcode::Delete, operands![heading]);
        ctx.cmd(Opcode::Delete, operands![layout.highlight]);
        ctx.cmd(
            Opcode::SetText,
            operands![layout.message, format!("Popped Value: {}", value)],
        );
    }

    fn clear(&mut self, ctx: &mut ActionContext<'_>) {
        let layout = self.layout();
        for cell in &layout.cells[..self.data.len()] {
            ctx.cmd(Opcode::SetText, operands![*cell, ""]);
        }
        self.data.clear();
        ctx.cmd(Opcode::SetText, operands![layout.top, "0"]);
    }
}

impl Algorithm for StackArray {
    type Action = StackAction;

    fn setup(&mut self, ctx: &mut ActionContext<'_>) {
        let mut cells = Vec::with_capacity(SIZE);
        for i in 0..SIZE {
            let cell = ctx.alloc();
            let index_label = ctx.alloc();
            let (x, y) = cell_pos(i);
            ctx.cmd(
                Opcode::CreateRectangle,
                operands![cell, "", ELEMENT_WIDTH, ELEMENT_HEIGHT, x, y],
            );
            ctx.cmd(
                Opcode::CreateLabel,
                operands![index_label, i, x, y + ELEMENT_HEIGHT],
            );
            ctx.cmd(Opcode::SetForegroundColor, operands![index_label, INDEX_COLOR]);
            cells.push(cell);
        }
        let top = ctx.alloc();
        let top_label = ctx.alloc();
        let message = ctx.alloc();
        ctx.cmd(
            Opcode::CreateLabel,
            operands![top_label, "top", TOP_LABEL_POS.0, TOP_LABEL_POS.1],
        );
        ctx.cmd(
            Opcode::CreateRectangle,
            operands![top, 0, ELEMENT_WIDTH, ELEMENT_HEIGHT, TOP_POS.0, TOP_POS.1],
        );
        ctx.cmd(
            Opcode::CreateLabel,
            operands![message, "", MESSAGE_POS.0, MESSAGE_POS.1],
        );
        let highlight = ctx.alloc();
        self.layout = Some(Layout {
            cells,
            top,
            message,
            highlight,
        });
    }

    fn perform(&mut self, action: &StackAction, ctx: &mut ActionContext<'_>) {
        match action {
            StackAction::Push(value) => self.push(value, ctx),
            StackAction::Pop => self.pop(ctx),
            StackAction::Clear => self.clear(ctx),
        }
    }

    fn reset(&mut self) {
        self.data.clear();
    }
}
