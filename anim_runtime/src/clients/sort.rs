//! Top-down merge sort drawn as a tree of copied sub-arrays.
//!
//! Each recursion level gets its own row of cells; values are animated
//! down into the row on the split and back up into the parent on the merge,
//! with three highlight circles tracking the merge pointers.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use anim_engine::command::Opcode;
use anim_engine::ids::ObjectId;
use anim_engine::operands;
use anim_engine::recorder::{ActionContext, Algorithm};

pub const MAX_ELEMENTS: usize = 12;

const ARRAY_START_X: f64 = 120.0;
const ARRAY_START_Y: f64 = 50.0;
const ELEMENT_WIDTH: f64 = 50.0;
const ELEMENT_HEIGHT: f64 = 50.0;
const LINE_SPACING: f64 = 80.0;
const LARGE_OFFSET: f64 = 15.0;
const SMALL_OFFSET: f64 = 7.0;

const SORTED_COLOR: &str = "#2ECC71";
const POINTER_COLOR: &str = "#0000FF";
const ACTIVE_POINTER_COLOR: &str = "#FF0000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortAction {
    /// Delete every cell.
    Clear,
    /// Lay out the values and sort them.
    Sort(Vec<i64>),
    /// Redraw the current values in an order drawn from `seed`.
    Shuffle { seed: u64 },
}

#[derive(Debug, Default)]
pub struct MergeSort {
    cells: Vec<ObjectId>,
    data: Vec<i64>,
    display: Vec<String>,
}

fn x_at(index: i64, offset: f64) -> f64 {
    index as f64 * ELEMENT_WIDTH + ARRAY_START_X + offset
}

fn y_at(row: i64) -> f64 {
    row as f64 * LINE_SPACING + ARRAY_START_Y
}

/// Cells of one row, addressed by absolute array position.
struct Row<'a> {
    first: i64,
    ids: &'a [ObjectId],
}

impl Row<'_> {
    fn at(&self, index: i64) -> ObjectId {
        self.ids[(index - self.first) as usize]
    }
}

/// Display strings; repeated values get `A`, `B`, ... suffixes in order.
fn display_labels(values: &[i64]) -> Vec<String> {
    let mut totals: BTreeMap<i64, usize> = BTreeMap::new();
    for v in values {
        *totals.entry(*v).or_default() += 1;
    }
    let mut seen: BTreeMap<i64, usize> = BTreeMap::new();
    values
        .iter()
        .map(|v| {
            if totals[v] > 1 {
                let n = seen.entry(*v).or_default();
                let label = format!("{}{}", v, (b'A' + (*n % 26) as u8) as char);
                *n += 1;
                label
            } else {
                v.to_string()
            }
        })
        .collect()
}

struct Merge {
    left: i64,
    right: i64,
    mid: i64,
    row: i64,
    curr_offset: f64,
    left_offset: f64,
    right_offset: f64,
}

impl MergeSort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of values currently laid out.
    pub fn array_len(&self) -> usize {
        self.data.len()
    }

    pub fn values(&self) -> &[i64] {
        &self.data
    }

    pub fn labels(&self) -> &[String] {
        &self.display
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    fn clear(&mut self, ctx: &mut ActionContext<'_>) {
        for id in self.cells.drain(..) {
            ctx.cmd(Opcode::Delete, operands![id]);
        }
        self.data.clear();
        self.display.clear();
    }

    /// Replace the scene with one top row holding `values`.
    fn lay_out(&mut self, values: &[i64], ctx: &mut ActionContext<'_>) -> Vec<ObjectId> {
        self.clear(ctx);
        self.data = values.to_vec();
        self.display = display_labels(values);
        let mut top = Vec::with_capacity(values.len());
        for (i, label) in self.display.iter().enumerate() {
            let id = ctx.alloc();
            ctx.cmd(
                Opcode::CreateRectangle,
                operands![id, label, ELEMENT_WIDTH, ELEMENT_HEIGHT, x_at(i as i64, 0.0), y_at(0)],
            );
            top.push(id);
        }
        self.cells.extend_from_slice(&top);
        ctx.step();
        top
    }

    fn sort(&mut self, values: &[i64], ctx: &mut ActionContext<'_>) {
        let top = self.lay_out(values, ctx);
        let n = top.len() as i64;
        match n {
            0 => {}
            1 => {
                ctx.cmd(Opcode::SetBackgroundColor, operands![top[0], SORTED_COLOR]);
                ctx.step();
            }
            _ => {
                let mid = n / 2;
                self.split(ctx, 0, mid - 1, -LARGE_OFFSET, 0.0, 1, true);
                self.split(ctx, mid, n - 1, LARGE_OFFSET, 0.0, 1, false);
                let merge = Merge {
                    left: 0,
                    right: n - 1,
                    mid,
                    row: 0,
                    curr_offset: 0.0,
                    left_offset: -LARGE_OFFSET,
                    right_offset: LARGE_OFFSET,
                };
                self.merge(ctx, &merge, &Row { first: 0, ids: &top });
            }
        }
    }

    fn shuffle(&mut self, seed: u64, ctx: &mut ActionContext<'_>) {
        if self.data.is_empty() {
            return;
        }
        let mut values = self.data.clone();
        let mut rng = StdRng::seed_from_u64(seed);
        values.shuffle(&mut rng);
        self.lay_out(&values, ctx);
    }

    /// Copy `left..=right` into a new row and sort it there. Subtrees on
    /// the left half drift further left, those on the right further right.
    #[allow(clippy::too_many_arguments)]
    fn split(
        &mut self,
        ctx: &mut ActionContext<'_>,
        left: i64,
        right: i64,
        offset: f64,
        prev_offset: f64,
        row: i64,
        leftward: bool,
    ) {
        if left > right {
            return;
        }
        let ids = self.draw_row_and_copy(ctx, left, right, offset, prev_offset, row);
        let cells = Row { first: left, ids: &ids };
        if left == right {
            ctx.cmd(Opcode::SetBackgroundColor, operands![cells.at(left), SORTED_COLOR]);
            ctx.step();
            return;
        }
        let mid = (left + right + 1) / 2;
        let spread = if row < 2 { 2.0 * LARGE_OFFSET } else { 2.0 * SMALL_OFFSET };
        let (left_offset, right_offset) = if leftward {
            (offset - spread, offset)
        } else {
            (offset, offset + spread)
        };
        self.split(ctx, left, mid - 1, left_offset, offset, row + 1, leftward);
        self.split(ctx, mid, right, right_offset, offset, row + 1, leftward);
        let merge = Merge {
            left,
            right,
            mid,
            row,
            curr_offset: offset,
            left_offset,
            right_offset,
        };
        self.merge(ctx, &merge, &cells);
    }

    fn draw_row_and_copy(
        &mut self,
        ctx: &mut ActionContext<'_>,
        left: i64,
        right: i64,
        offset: f64,
        prev_offset: f64,
        row: i64,
    ) -> Vec<ObjectId> {
        let mut ids = Vec::with_capacity((right - left + 1) as usize);
        for i in left..=right {
            let id = ctx.alloc();
            ctx.cmd(
                Opcode::CreateRectangle,
                operands![id, "", ELEMENT_WIDTH, ELEMENT_HEIGHT, x_at(i, offset), y_at(row)],
            );
            ids.push(id);
        }
        self.cells.extend_from_slice(&ids);
        ctx.step();
        for i in left..=right {
            let label = self.display[i as usize].clone();
            let cell = ids[(i - left) as usize];
            copy_value(ctx, (i, prev_offset, row - 1), (i, offset, row), &label, cell, None);
        }
        ids
    }

    fn merge(&mut self, ctx: &mut ActionContext<'_>, m: &Merge, cells: &Row<'_>) {
        let first = m.left as usize;
        let temp: Vec<i64> = self.data[first..=m.right as usize].to_vec();
        let temp_display: Vec<String> = self.display[first..=m.right as usize].to_vec();
        let value = |i: i64| temp[(i - m.left) as usize];
        let label = |i: i64| temp_display[(i - m.left) as usize].clone();

        let below = m.row + 1;
        let i_ptr = ctx.alloc();
        let j_ptr = ctx.alloc();
        let k_ptr = ctx.alloc();
        ctx.cmd(
            Opcode::CreateHighlightCircle,
            operands![i_ptr, POINTER_COLOR, x_at(m.left, m.left_offset), y_at(below)],
        );
        ctx.cmd(
            Opcode::CreateHighlightCircle,
            operands![j_ptr, POINTER_COLOR, x_at(m.mid, m.right_offset), y_at(below)],
        );
        ctx.cmd(
            Opcode::CreateHighlightCircle,
            operands![k_ptr, POINTER_COLOR, x_at(m.left, m.curr_offset), y_at(m.row)],
        );
        ctx.step();

        let (mut i, mut j, mut k) = (m.left, m.mid, m.left);
        while i < m.mid && j <= m.right {
            let take_left = value(i) <= value(j);
            let (src, src_offset, ptr) = if take_left {
                (i, m.left_offset, i_ptr)
            } else {
                (j, m.right_offset, j_ptr)
            };
            copy_value(
                ctx,
                (src, src_offset, below),
                (k, m.curr_offset, m.row),
                &label(src),
                cells.at(k),
                Some(ptr),
            );
            self.data[k as usize] = value(src);
            self.display[k as usize] = label(src);
            k += 1;
            move_pointer(ctx, k_ptr, k, m.curr_offset, m.row);
            if take_left {
                i += 1;
                if i < m.mid {
                    move_pointer(ctx, i_ptr, i, m.left_offset, below);
                }
            } else {
                j += 1;
                if j <= m.right {
                    move_pointer(ctx, j_ptr, j, m.right_offset, below);
                }
            }
            ctx.step();
        }

        let rest = (i..m.mid)
            .map(|src| (src, m.left_offset, i_ptr))
            .chain((j..=m.right).map(|src| (src, m.right_offset, j_ptr)))
            .collect::<Vec<_>>();
        for (src, src_offset, ptr) in rest {
            copy_value(
                ctx,
                (src, src_offset, below),
                (k, m.curr_offset, m.row),
                &label(src),
                cells.at(k),
                Some(ptr),
            );
            self.data[k as usize] = value(src);
            self.display[k as usize] = label(src);
            k += 1;
            if k <= m.right {
                move_pointer(ctx, ptr, src + 1, src_offset, below);
                move_pointer(ctx, k_ptr, k, m.curr_offset, m.row);
            }
        }

        for ptr in [i_ptr, j_ptr, k_ptr] {
            ctx.cmd(Opcode::Delete, operands![ptr]);
        }
        ctx.step();
    }
}

/// Float a temporary label from one cell position to another and write
/// it into `cell`. With a pointer, the pointer flashes while it moves and
/// the target cell is marked sorted.
fn copy_value(
    ctx: &mut ActionContext<'_>,
    from: (i64, f64, i64),
    to: (i64, f64, i64),
    label: &str,
    cell: ObjectId,
    pointer: Option<ObjectId>,
) {
    if let Some(p) = pointer {
        ctx.cmd(Opcode::SetForegroundColor, operands![p, ACTIVE_POINTER_COLOR]);
        ctx.step();
    }
    let floating = ctx.alloc();
    ctx.cmd(
        Opcode::CreateLabel,
        operands![floating, label, x_at(from.0, from.1), y_at(from.2)],
    );
    ctx.cmd(Opcode::Move, operands![floating, x_at(to.0, to.1), y_at(to.2)]);
    ctx.step();
    ctx.cmd(Opcode::SetText, operands![cell, label]);
    ctx.cmd(Opcode::Delete, operands![floating]);
    if let Some(p) = pointer {
        ctx.cmd(Opcode::SetBackgroundColor, operands![cell, SORTED_COLOR]);
        ctx.cmd(Opcode::SetForegroundColor, operands![p, POINTER_COLOR]);
        ctx.step();
    }
}

fn move_pointer(ctx: &mut ActionContext<'_>, pointer: ObjectId, index: i64, offset: f64, row: i64) {
    ctx.cmd(Opcode::Move, operands![pointer, x_at(index, offset), y_at(row)]);
}

impl Algorithm for MergeSort {
    type Action = SortAction;

    fn setup(&mut self, _ctx: &mut ActionContext<'_>) {}

    fn perform(&mut self, action: &SortAction, ctx: &mut ActionContext<'_>) {
        match action {
            SortAction::Clear => self.clear(ctx),
            SortAction::Sort(values) => self.sort(values, ctx),
            SortAction::Shuffle { seed } => self.shuffle(*seed, ctx),
        }
    }

    fn reset(&mut self) {
        self.cells.clear();
        self.data.clear();
        self.display.clear();
    }
}
