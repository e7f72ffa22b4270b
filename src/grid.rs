use std::collections::VecDeque;

use crate::attrs::{CellAttrs, UnderlineStyle};
use crate::color::Color;

/// A single terminal cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub c: char,
    pub fg: Color,
    pub bg: Color,
    pub attrs: CellAttrs,
    pub underline: UnderlineStyle,
    pub is_wide: bool,
    pub is_wide_continuation: bool,
    pub hyperlink: Option<u32>,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            c: ' ',
            fg: Color::DefaultForeground,
            bg: Color::DefaultBackground,
            attrs: CellAttrs::empty(),
            underline: UnderlineStyle::None,
            is_wide: false,
            is_wide_continuation: false,
            hyperlink: None,
        }
    }
}

impl Cell {
    /// The right half of a wide character: carries no glyph of its own.
    pub fn wide_continuation() -> Self {
        Self {
            is_wide_continuation: true,
            ..Default::default()
        }
    }

    /// Erase to blank, but keep the given background color per ECMA-48
    /// (erasing with the current SGR background, not always the default).
    pub fn erase(&mut self, bg: Color) {
        *self = Cell {
            bg,
            ..Default::default()
        };
    }
}

/// A single row of the grid, plus whether its last write wrapped onto the
/// next row rather than ending with a hard newline.
#[derive(Debug, Clone)]
pub struct Row {
    pub cells: Vec<Cell>,
    pub wrapped: bool,
}

impl Row {
    pub fn new(cols: u16) -> Self {
        Self {
            cells: vec![Cell::default(); cols as usize],
            wrapped: false,
        }
    }

    pub fn clear(&mut self, fill: Cell) {
        for cell in &mut self.cells {
            *cell = fill.clone();
        }
        self.wrapped = false;
    }

    pub fn resize(&mut self, cols: u16) {
        self.cells.resize(cols as usize, Cell::default());
    }
}

/// Fixed `rows × cols` array of cells. Holds no scrollback of its own —
/// `scroll_up` hands the evicted row back to the caller (`State`), which
/// decides whether to keep it.
pub struct Grid {
    rows: VecDeque<Row>,
    pub rows_count: u16,
    pub cols: u16,
}

impl Grid {
    pub fn new(rows: u16, cols: u16) -> Self {
        let mut q = VecDeque::with_capacity(rows as usize);
        for _ in 0..rows {
            q.push_back(Row::new(cols));
        }
        Self {
            rows: q,
            rows_count: rows,
            cols,
        }
    }

    fn in_bounds(&self, r: u16, c: u16) -> bool {
        r < self.rows_count && c < self.cols
    }

    pub fn get(&self, r: u16, c: u16) -> Cell {
        if !self.in_bounds(r, c) {
            return Cell::default();
        }
        self.rows[r as usize].cells[c as usize].clone()
    }

    pub fn set(&mut self, r: u16, c: u16, cell: Cell) {
        if !self.in_bounds(r, c) {
            return;
        }
        self.rows[r as usize].cells[c as usize] = cell;
    }

    pub fn row(&self, r: u16) -> Option<&Row> {
        self.rows.get(r as usize)
    }

    pub fn row_mut(&mut self, r: u16) -> Option<&mut Row> {
        self.rows.get_mut(r as usize)
    }

    pub fn line_wrapped(&self, r: u16) -> bool {
        self.rows.get(r as usize).map(|row| row.wrapped).unwrap_or(false)
    }

    pub fn set_line_wrapped(&mut self, r: u16, wrapped: bool) {
        if let Some(row) = self.rows.get_mut(r as usize) {
            row.wrapped = wrapped;
        }
    }

    pub fn clear_row(&mut self, r: u16, fill: Cell) {
        if let Some(row) = self.rows.get_mut(r as usize) {
            row.clear(fill);
        }
    }

    pub fn clear(&mut self, fill: Cell) {
        for row in self.rows.iter_mut() {
            row.clear(fill.clone());
        }
    }

    /// `rows[top..=bottom]` shift up by one; `top` is discarded and handed
    /// back to the caller (so it can append it to scrollback); `bottom`
    /// becomes `fill`. No-op (returns `None`) if `top > bottom`.
    pub fn scroll_up(&mut self, top: u16, bottom: u16, fill: Cell) -> Option<Row> {
        if top > bottom || bottom >= self.rows_count {
            return None;
        }
        let evicted = self.rows.remove(top as usize)?;
        let mut new_row = Row::new(self.cols);
        new_row.clear(fill);
        self.rows.insert(bottom as usize, new_row);
        Some(evicted)
    }

    /// Inverse of `scroll_up`: `bottom` is discarded, `top` becomes `fill`.
    pub fn scroll_down(&mut self, top: u16, bottom: u16, fill: Cell) {
        if top > bottom || bottom >= self.rows_count {
            return;
        }
        self.rows.remove(bottom as usize);
        let mut new_row = Row::new(self.cols);
        new_row.clear(fill);
        self.rows.insert(top as usize, new_row);
    }

    /// Resize preserving content at matching indices: pad/truncate columns
    /// on the right, pad/drop rows at the bottom. Does not reflow wrapped
    /// lines (v1 non-goal).
    pub fn resize(&mut self, new_rows: u16, new_cols: u16) {
        for row in self.rows.iter_mut() {
            row.resize(new_cols);
        }
        let current = self.rows.len();
        let target = new_rows as usize;
        if target > current {
            for _ in 0..(target - current) {
                self.rows.push_back(Row::new(new_cols));
            }
        } else {
            while self.rows.len() > target {
                self.rows.pop_back();
            }
        }
        self.rows_count = new_rows;
        self.cols = new_cols;
    }

    /// `n` clamped to `cols - c`; shifts `[c, cols-n)` right by `n` and
    /// fills `[c, c+n)`. When `n >= cols - c` the whole tail `[c, cols)` is
    /// overwritten with `fill` and nothing is shifted — the explicit fix
    /// for the zero-length-slice edge case of a naive translation.
    pub fn insert_blanks(&mut self, r: u16, c: u16, n: u16, fill: Cell) {
        let Some(row) = self.rows.get_mut(r as usize) else {
            return;
        };
        let cols = row.cells.len();
        let c = (c as usize).min(cols);
        let n = n as usize;
        if n == 0 || c >= cols {
            return;
        }
        if n >= cols - c {
            for cell in &mut row.cells[c..cols] {
                *cell = fill.clone();
            }
            return;
        }
        row.cells.truncate(cols - n);
        for _ in 0..n {
            row.cells.insert(c, fill.clone());
        }
    }

    /// Shifts `[c+n, cols)` left to `c`; fills the vacated tail with `fill`.
    pub fn delete_cells(&mut self, r: u16, c: u16, n: u16, fill: Cell) {
        let Some(row) = self.rows.get_mut(r as usize) else {
            return;
        };
        let cols = row.cells.len();
        let c = (c as usize).min(cols);
        let n = (n as usize).min(cols.saturating_sub(c));
        if n == 0 || c >= cols {
            return;
        }
        row.cells.drain(c..c + n);
        for _ in 0..n {
            row.cells.push(fill.clone());
        }
    }

    /// Erases `[c, end)` on row `r` to blank cells carrying `bg`. `end` is
    /// exclusive and clamped to `cols`; a no-op if `c >= end`.
    pub fn erase_cells(&mut self, r: u16, c: u16, end: u16, bg: Color) {
        let Some(row) = self.rows.get_mut(r as usize) else {
            return;
        };
        let cols = row.cells.len();
        let c = (c as usize).min(cols);
        let end = (end as usize).min(cols);
        if c >= end {
            return;
        }
        for cell in &mut row.cells[c..end] {
            cell.erase(bg);
        }
    }

    /// Concatenate base characters in the inclusive cell range, in reading
    /// order, skipping wide-continuation cells and inserting `\n` between
    /// consecutive rows unless the earlier row's `wrapped` flag is set.
    /// Column bounds are clamped before iterating; a row whose clamped
    /// `c1 > c2` contributes nothing, rather than iterating an unsound
    /// range.
    pub fn extract_text(&self, r1: u16, c1: u16, r2: u16, c2: u16) -> String {
        if r1 > r2 || r1 >= self.rows_count {
            return String::new();
        }
        let max_col = self.cols.saturating_sub(1);
        let mut out = String::new();
        for r in r1..=r2.min(self.rows_count.saturating_sub(1)) {
            let row_c1 = if r == r1 { c1.min(max_col) } else { 0 };
            let row_c2 = if r == r2 { c2.min(max_col) } else { max_col };
            if row_c1 <= row_c2 {
                if let Some(row) = self.rows.get(r as usize) {
                    for cell in &row.cells[row_c1 as usize..=row_c2 as usize] {
                        if !cell.is_wide_continuation {
                            out.push(cell.c);
                        }
                    }
                }
            }
            if r != r2 && !self.line_wrapped(r) {
                out.push('\n');
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(c: char) -> Cell {
        Cell {
            c,
            ..Default::default()
        }
    }

    #[test]
    fn out_of_range_read_returns_blank() {
        let g = Grid::new(3, 3);
        assert_eq!(g.get(10, 10), Cell::default());
    }

    #[test]
    fn out_of_range_write_is_noop() {
        let mut g = Grid::new(3, 3);
        g.set(10, 10, filled('x'));
        assert_eq!(g.get(10, 10), Cell::default());
    }

    #[test]
    fn scroll_up_evicts_top_and_blanks_bottom() {
        let mut g = Grid::new(3, 1);
        g.set(0, 0, filled('A'));
        g.set(1, 0, filled('B'));
        g.set(2, 0, filled('C'));
        let evicted = g.scroll_up(0, 2, Cell::default()).unwrap();
        assert_eq!(evicted.cells[0].c, 'A');
        assert_eq!(g.get(0, 0).c, 'B');
        assert_eq!(g.get(1, 0).c, 'C');
        assert_eq!(g.get(2, 0).c, ' ');
    }

    #[test]
    fn scroll_up_down_round_trips_region() {
        let mut g = Grid::new(3, 1);
        g.set(0, 0, filled('A'));
        g.set(1, 0, filled('B'));
        g.set(2, 0, filled('C'));
        let evicted = g.scroll_up(0, 2, Cell::default()).unwrap();
        g.scroll_down(0, 2, evicted);
        assert_eq!(g.get(0, 0).c, 'A');
        assert_eq!(g.get(1, 0).c, 'B');
        assert_eq!(g.get(2, 0).c, 'C');
    }

    #[test]
    fn scroll_noop_when_top_after_bottom() {
        let mut g = Grid::new(3, 1);
        g.set(0, 0, filled('A'));
        assert!(g.scroll_up(2, 1, Cell::default()).is_none());
        assert_eq!(g.get(0, 0).c, 'A');
    }

    #[test]
    fn insert_blanks_shifts_right_and_clamps_overflow() {
        let mut g = Grid::new(1, 5);
        for i in 0..5u16 {
            g.set(0, i, filled((b'a' + i as u8) as char));
        }
        g.insert_blanks(0, 1, 2, filled('.'));
        let text = g.extract_text(0, 0, 0, 4);
        assert_eq!(text, "a..bc");
    }

    #[test]
    fn insert_blanks_overflow_fills_whole_tail() {
        let mut g = Grid::new(1, 5);
        for i in 0..5u16 {
            g.set(0, i, filled((b'a' + i as u8) as char));
        }
        g.insert_blanks(0, 1, 10, filled('.'));
        let text = g.extract_text(0, 0, 0, 4);
        assert_eq!(text, "a....");
    }

    #[test]
    fn delete_cells_shifts_left_and_fills_tail() {
        let mut g = Grid::new(1, 5);
        for i in 0..5u16 {
            g.set(0, i, filled((b'a' + i as u8) as char));
        }
        g.delete_cells(0, 1, 2, filled('.'));
        let text = g.extract_text(0, 0, 0, 4);
        assert_eq!(text, "ade..");
    }

    #[test]
    fn extract_text_joins_wrapped_rows_without_newline() {
        let mut g = Grid::new(2, 3);
        g.set(0, 0, filled('a'));
        g.set(0, 1, filled('b'));
        g.set(0, 2, filled('c'));
        g.set_line_wrapped(0, true);
        g.set(1, 0, filled('d'));
        assert_eq!(g.extract_text(0, 0, 1, 0), "abcd");
    }

    #[test]
    fn extract_text_inserts_newline_for_hard_breaks() {
        let mut g = Grid::new(2, 3);
        g.set(0, 0, filled('a'));
        g.set(1, 0, filled('b'));
        assert_eq!(g.extract_text(0, 0, 1, 0), "a\nb");
    }

    #[test]
    fn extract_text_clamps_unsound_column_range() {
        let g = Grid::new(1, 3);
        // c1 > c2 after clamping should yield an empty contribution, not panic.
        assert_eq!(g.extract_text(0, 2, 0, 0), "");
    }

    #[test]
    fn resize_pads_and_preserves_content() {
        let mut g = Grid::new(2, 2);
        g.set(0, 0, filled('x'));
        g.resize(3, 4);
        assert_eq!(g.get(0, 0).c, 'x');
        assert_eq!(g.get(2, 3), Cell::default());
    }
}
