use std::collections::VecDeque;

use crate::attrs::{CellAttrs, UnderlineStyle};
use crate::color::Color;
use crate::cursor::CursorState;
use crate::grid::{Cell, Grid, Row};
use crate::modes::Modes;
use crate::shell::ShellIntegration;

/// Composes the primary and alternate grids, cursor, modes, scroll region,
/// tab stops, scrollback, and the redisplay flag the renderer polls.
pub struct State {
    pub rows: u16,
    pub cols: u16,
    primary: Grid,
    alternate: Grid,
    pub cursor: CursorState,
    pub modes: Modes,
    pub scroll_top: u16,
    pub scroll_bottom: u16,
    tab_stops: Vec<bool>,
    scrollback: VecDeque<Row>,
    pub scrollback_limit: usize,
    pub title: String,
    pub shell: ShellIntegration,
    needs_display: bool,
    pub bell_counter: u64,
    /// Pending byte replies (DSR/DA/DECRPM) queued for the PTY write path.
    pending_responses: Vec<Vec<u8>>,
}

impl State {
    pub fn new(rows: u16, cols: u16) -> Self {
        let mut s = Self {
            rows,
            cols,
            primary: Grid::new(rows, cols),
            alternate: Grid::new(rows, cols),
            cursor: CursorState::new(),
            modes: Modes::default(),
            scroll_top: 0,
            scroll_bottom: rows.saturating_sub(1),
            tab_stops: Vec::new(),
            scrollback: VecDeque::new(),
            scrollback_limit: 10_000,
            title: String::new(),
            shell: ShellIntegration::new(),
            needs_display: true,
            bell_counter: 0,
            pending_responses: Vec::new(),
        };
        s.rebuild_tab_stops();
        s
    }

    pub fn active_grid(&self) -> &Grid {
        if self.modes.alt_screen {
            &self.alternate
        } else {
            &self.primary
        }
    }

    pub fn active_grid_mut(&mut self) -> &mut Grid {
        if self.modes.alt_screen {
            &mut self.alternate
        } else {
            &mut self.primary
        }
    }

    pub fn mark_dirty(&mut self) {
        self.needs_display = true;
    }

    /// Clear-on-observe: reads and clears the redisplay flag in one step.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.needs_display, false)
    }

    pub fn queue_response(&mut self, bytes: Vec<u8>) {
        self.pending_responses.push(bytes);
    }

    pub fn take_pending_responses(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.pending_responses)
    }

    fn blank_cell(&self) -> Cell {
        Cell {
            fg: self.cursor.fg,
            bg: self.cursor.bg,
            ..Default::default()
        }
    }

    pub fn resize(&mut self, rows: u16, cols: u16) {
        self.primary.resize(rows, cols);
        self.alternate.resize(rows, cols);
        self.rows = rows;
        self.cols = cols;
        self.scroll_top = 0;
        self.scroll_bottom = rows.saturating_sub(1);
        self.cursor.row = self.cursor.row.min(rows.saturating_sub(1));
        self.cursor.col = self.cursor.col.min(cols.saturating_sub(1));
        self.rebuild_tab_stops();
        self.mark_dirty();
    }

    pub fn clear_active(&mut self) {
        let fill = self.blank_cell();
        self.active_grid_mut().clear(fill);
        self.cursor.row = 0;
        self.cursor.col = 0;
        self.mark_dirty();
    }

    pub fn clear_scrollback(&mut self) {
        self.scrollback.clear();
    }

    pub fn full_reset(&mut self) {
        let rows = self.rows;
        let cols = self.cols;
        let shell = std::mem::replace(&mut self.shell, ShellIntegration::new());
        *self = State::new(rows, cols);
        self.shell = shell;
        self.mark_dirty();
    }

    /// `move_cursor` clamps to active grid bounds; when origin mode is on,
    /// (r,c) is interpreted relative to the scroll region and cannot
    /// escape it.
    pub fn move_cursor(&mut self, r: i64, c: i64) {
        let (row, col) = if self.modes.origin {
            let top = self.scroll_top as i64;
            let bottom = self.scroll_bottom as i64;
            (
                (top + r).clamp(top, bottom),
                c.clamp(0, self.cols.saturating_sub(1) as i64),
            )
        } else {
            (
                r.clamp(0, self.rows.saturating_sub(1) as i64),
                c.clamp(0, self.cols.saturating_sub(1) as i64),
            )
        };
        self.cursor.row = row as u16;
        self.cursor.col = col as u16;
        self.mark_dirty();
    }

    pub fn save_cursor(&mut self) {
        self.cursor.save(self.modes.origin);
    }

    pub fn restore_cursor(&mut self) {
        if let Some(origin) = self.cursor.restore() {
            self.modes.origin = origin;
        }
        self.mark_dirty();
    }

    /// Pushes `row` to the scrollback tail; drops the head if over limit.
    /// Callers must gate this on `!modes.alt_screen` themselves (the
    /// alternate screen never touches scrollback).
    pub fn append_scrollback(&mut self, row: Row) {
        self.scrollback.push_back(row);
        while self.scrollback.len() > self.scrollback_limit {
            self.scrollback.pop_front();
        }
    }

    pub fn scrollback_len(&self) -> usize {
        self.scrollback.len()
    }

    fn rebuild_tab_stops(&mut self) {
        self.tab_stops = (0..self.cols).map(|c| c > 0 && c % 8 == 0).collect();
    }

    pub fn set_tab(&mut self, c: u16) {
        if let Some(slot) = self.tab_stops.get_mut(c as usize) {
            *slot = true;
        }
    }

    pub fn clear_tab(&mut self, c: u16) {
        if let Some(slot) = self.tab_stops.get_mut(c as usize) {
            *slot = false;
        }
    }

    pub fn clear_all_tabs(&mut self) {
        for slot in self.tab_stops.iter_mut() {
            *slot = false;
        }
    }

    /// Smallest tab stop strictly greater than `c`, or `cols - 1` if none.
    pub fn next_tab_after(&self, c: u16) -> u16 {
        for col in (c + 1)..self.cols {
            if self.tab_stops.get(col as usize).copied().unwrap_or(false) {
                return col;
            }
        }
        self.cols.saturating_sub(1)
    }

    /// Largest tab stop strictly less than `c`, or `0` if none.
    pub fn prev_tab_before(&self, c: u16) -> u16 {
        for col in (0..c).rev() {
            if self.tab_stops.get(col as usize).copied().unwrap_or(false) {
                return col;
            }
        }
        0
    }

    pub fn get_visible_text(&self) -> String {
        let grid = self.active_grid();
        let mut out = String::new();
        for r in 0..self.rows {
            if r > 0 {
                out.push('\n');
            }
            if let Some(row) = grid.row(r) {
                for cell in &row.cells {
                    if !cell.is_wide_continuation {
                        out.push(cell.c);
                    }
                }
            }
        }
        out
    }

    pub fn default_attrs(&self) -> (Color, Color, CellAttrs, UnderlineStyle) {
        (
            self.cursor.fg,
            self.cursor.bg,
            self.cursor.attrs,
            self.cursor.underline,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_cursor_clamps_to_bounds() {
        let mut s = State::new(5, 5);
        s.move_cursor(100, -10);
        assert_eq!(s.cursor.row, 4);
        assert_eq!(s.cursor.col, 0);
    }

    #[test]
    fn move_cursor_respects_origin_mode_region() {
        let mut s = State::new(10, 10);
        s.scroll_top = 2;
        s.scroll_bottom = 6;
        s.modes.origin = true;
        s.move_cursor(0, 0);
        assert_eq!(s.cursor.row, 2);
        s.move_cursor(100, 0);
        assert_eq!(s.cursor.row, 6);
    }

    #[test]
    fn save_restore_cursor_round_trips() {
        let mut s = State::new(5, 5);
        s.cursor.row = 2;
        s.cursor.col = 3;
        s.save_cursor();
        s.cursor.row = 0;
        s.restore_cursor();
        assert_eq!(s.cursor.row, 2);
        assert_eq!(s.cursor.col, 3);
    }

    #[test]
    fn scrollback_respects_limit() {
        let mut s = State::new(3, 3);
        s.scrollback_limit = 2;
        for _ in 0..5 {
            s.append_scrollback(Row::new(3));
        }
        assert_eq!(s.scrollback_len(), 2);
    }

    #[test]
    fn next_tab_after_default_stops_every_eight_columns() {
        let s = State::new(24, 80);
        assert_eq!(s.next_tab_after(0), 8);
        assert_eq!(s.next_tab_after(7), 8);
        assert_eq!(s.next_tab_after(79), 79);
    }

    #[test]
    fn take_dirty_clears_flag() {
        let mut s = State::new(3, 3);
        assert!(s.take_dirty());
        assert!(!s.take_dirty());
        s.mark_dirty();
        assert!(s.take_dirty());
    }
}
