use unicode_width::UnicodeWidthChar;

use crate::attrs::{CellAttrs, UnderlineStyle};
use crate::color::Color;
use crate::cursor::Charset;
use crate::grid::Cell;
use crate::modes::MouseReporting;
use crate::parser::{Event, EventSink};
use crate::shell::TerminalEvent;
use crate::state::State;

const REP_LIMIT: i64 = 4096;

/// Binds parser events to `State` mutations: the CSI/OSC/ESC handlers, SGR
/// attribute parsing, and wrap/scroll policy. This is the "business logic"
/// half of the split the source's single `vte::Perform` impl conflates.
pub struct Emulator {
    pub state: State,
    last_printed: Option<char>,
    pending_wrap: bool,
}

impl Emulator {
    pub fn new(rows: u16, cols: u16) -> Self {
        Self {
            state: State::new(rows, cols),
            last_printed: None,
            pending_wrap: false,
        }
    }

    pub fn apply(&mut self, event: Event) {
        match event {
            Event::Print(c) => self.print(c),
            Event::Execute(b) => self.execute(b),
            Event::Csi {
                private,
                params,
                intermediates,
                action,
            } => self.csi_dispatch(private, &params, &intermediates, action),
            Event::Osc { data, .. } => self.osc_dispatch(&data),
            Event::Esc { intermediates, action } => self.esc_dispatch(&intermediates, action),
            Event::Dcs { .. } => {
                // XTGETTCAP/Sixel/DECRQSS-style DCS payloads are outside
                // this core's scope; acknowledged but not acted on.
                tracing::trace!("ignoring DCS sequence");
            }
        }
    }

    pub fn take_pending_events(&mut self) -> Vec<TerminalEvent> {
        self.state.shell.take_pending_events()
    }

    fn param(params: &[Vec<i64>], idx: usize, default: i64) -> i64 {
        match params.get(idx).and_then(|g| g.first()) {
            Some(0) | None => default,
            Some(v) => *v,
        }
    }

    fn subparams(params: &[Vec<i64>], idx: usize) -> &[i64] {
        params.get(idx).map(|g| g.as_slice()).unwrap_or(&[])
    }

    // ---- Print -------------------------------------------------------

    fn print(&mut self, c: char) {
        let c = match self.state.cursor.active_charset {
            Charset::DecLineDrawing => dec_line_drawing_char(c).unwrap_or(c),
            Charset::Ascii => c,
        };

        let width = UnicodeWidthChar::width(c).unwrap_or(1).max(1);
        let cols = self.state.cols;

        if self.pending_wrap {
            self.pending_wrap = false;
            if self.state.modes.autowrap {
                self.wrap_to_next_line();
            }
        }

        let row = self.state.cursor.row;
        let mut col = self.state.cursor.col;

        if width == 2 && col == cols.saturating_sub(1) {
            if self.state.modes.autowrap {
                self.state.active_grid_mut().set_line_wrapped(row, true);
                self.wrap_to_next_line();
                col = self.state.cursor.col;
            }
        }

        if self.state.modes.insert {
            let fill = self.fill_cell();
            self.state.active_grid_mut().insert_blanks(row, col, width as u16, fill);
        }

        let (fg, bg, attrs, underline) = self.state.default_attrs();
        let cell = Cell {
            c,
            fg,
            bg,
            attrs,
            underline,
            is_wide: width == 2,
            is_wide_continuation: false,
            hyperlink: None,
        };
        let row = self.state.cursor.row;
        let col = self.state.cursor.col;
        self.state.active_grid_mut().set(row, col, cell);
        if width == 2 {
            self.state
                .active_grid_mut()
                .set(row, col + 1, Cell::wide_continuation());
        }

        self.last_printed = Some(c);
        let new_col = col + width as u16;
        if new_col >= cols {
            if self.state.modes.autowrap {
                self.pending_wrap = true;
                self.state.cursor.col = cols.saturating_sub(1);
            } else {
                self.state.cursor.col = cols.saturating_sub(1);
            }
        } else {
            self.state.cursor.col = new_col;
        }
        self.state.mark_dirty();
    }

    fn wrap_to_next_line(&mut self) {
        let row = self.state.cursor.row;
        self.state.cursor.col = 0;
        if row == self.state.scroll_bottom {
            self.scroll_up_primary();
        } else {
            self.state.cursor.row = row + 1;
        }
    }

    fn fill_cell(&self) -> Cell {
        Cell {
            bg: self.state.cursor.bg,
            ..Default::default()
        }
    }

    // ---- Execute (C0) -------------------------------------------------

    fn execute(&mut self, byte: u8) {
        match byte {
            0x07 => {
                self.state.bell_counter = self.state.bell_counter.wrapping_add(1);
                self.state.mark_dirty();
            }
            0x08 => {
                self.state.cursor.col = self.state.cursor.col.saturating_sub(1);
                self.state.mark_dirty();
            }
            0x09 => {
                let next = self.state.next_tab_after(self.state.cursor.col);
                self.state.cursor.col = next;
                self.state.mark_dirty();
            }
            0x0A | 0x0B | 0x0C => self.line_feed(),
            0x0D => {
                self.state.cursor.col = 0;
                self.state.mark_dirty();
            }
            0x0E => self.state.cursor.active_charset = Charset::DecLineDrawing,
            0x0F => self.state.cursor.active_charset = Charset::Ascii,
            _ => {}
        }
    }

    fn line_feed(&mut self) {
        self.pending_wrap = false;
        if self.state.cursor.row == self.state.scroll_bottom {
            self.scroll_up_primary();
        } else {
            self.state.cursor.row += 1;
        }
        if self.state.modes.linefeed_newline {
            self.state.cursor.col = 0;
        }
        self.state.mark_dirty();
    }

    /// Scrolls the active scroll region up by one line. On the primary
    /// screen (not the alternate), the evicted top row is appended to
    /// scrollback — alternate-screen scrolling never touches scrollback.
    fn scroll_up_primary(&mut self) {
        let top = self.state.scroll_top;
        let bottom = self.state.scroll_bottom;
        let fill = self.fill_cell();
        let alt = self.state.modes.alt_screen;
        let evicted = self.state.active_grid_mut().scroll_up(top, bottom, fill);
        if let (false, Some(row)) = (alt, evicted) {
            if top == 0 {
                self.state.append_scrollback(row);
            }
        }
        self.state.mark_dirty();
    }

    // ---- CSI ------------------------------------------------------------

    fn csi_dispatch(&mut self, private: Option<char>, params: &[Vec<i64>], intermediates: &[u8], action: char) {
        self.pending_wrap = false;
        let n = || Self::param(params, 0, 1).max(0);

        match (private, action) {
            (None, '@') => {
                let (row, col) = (self.state.cursor.row, self.state.cursor.col);
                let fill = self.fill_cell();
                self.state.active_grid_mut().insert_blanks(row, col, n() as u16, fill);
            }
            (None, 'A') => {
                let top = self.state.scroll_top;
                self.state.cursor.row = self.state.cursor.row.saturating_sub(n() as u16).max(top);
                self.state.mark_dirty();
            }
            (None, 'B') => {
                let bottom = self.state.scroll_bottom;
                self.state.cursor.row = (self.state.cursor.row + n() as u16).min(bottom);
                self.state.mark_dirty();
            }
            (None, 'C') => {
                let cols = self.state.cols;
                self.state.cursor.col = (self.state.cursor.col + n() as u16).min(cols.saturating_sub(1));
                self.state.mark_dirty();
            }
            (None, 'D') => {
                self.state.cursor.col = self.state.cursor.col.saturating_sub(n() as u16);
                self.state.mark_dirty();
            }
            (None, 'E') => {
                let bottom = self.state.scroll_bottom;
                self.state.cursor.row = (self.state.cursor.row + n() as u16).min(bottom);
                self.state.cursor.col = 0;
                self.state.mark_dirty();
            }
            (None, 'F') => {
                let top = self.state.scroll_top;
                self.state.cursor.row = self.state.cursor.row.saturating_sub(n() as u16).max(top);
                self.state.cursor.col = 0;
                self.state.mark_dirty();
            }
            (None, 'G') => {
                let cols = self.state.cols;
                self.state.cursor.col = (n() as u16).saturating_sub(1).min(cols.saturating_sub(1));
                self.state.mark_dirty();
            }
            (None, 'H') | (None, 'f') => {
                let r = Self::param(params, 0, 1) - 1;
                let c = Self::param(params, 1, 1) - 1;
                self.state.move_cursor(r, c);
            }
            (None, 'I') => {
                for _ in 0..n() {
                    let next = self.state.next_tab_after(self.state.cursor.col);
                    self.state.cursor.col = next;
                }
                self.state.mark_dirty();
            }
            (None, 'J') => self.erase_display(Self::param(params, 0, 0)),
            (None, 'K') => self.erase_line(Self::param(params, 0, 0)),
            (None, 'L') => {
                let row = self.state.cursor.row;
                let bottom = self.state.scroll_bottom;
                let fill = self.fill_cell();
                for _ in 0..n() {
                    self.state.active_grid_mut().scroll_down(row, bottom, fill.clone());
                }
                self.state.mark_dirty();
            }
            (None, 'M') => {
                let row = self.state.cursor.row;
                let bottom = self.state.scroll_bottom;
                let fill = self.fill_cell();
                for _ in 0..n() {
                    self.state.active_grid_mut().scroll_up(row, bottom, fill.clone());
                }
                self.state.mark_dirty();
            }
            (None, 'P') => {
                let (row, col) = (self.state.cursor.row, self.state.cursor.col);
                let fill = self.fill_cell();
                self.state.active_grid_mut().delete_cells(row, col, n() as u16, fill);
                self.state.mark_dirty();
            }
            (None, 'S') => {
                let (top, bottom) = (self.state.scroll_top, self.state.scroll_bottom);
                for _ in 0..n() {
                    self.scroll_up_region(top, bottom);
                }
            }
            (None, 'T') => {
                let (top, bottom) = (self.state.scroll_top, self.state.scroll_bottom);
                let fill = self.fill_cell();
                for _ in 0..n() {
                    self.state.active_grid_mut().scroll_down(top, bottom, fill.clone());
                }
                self.state.mark_dirty();
            }
            (None, 'X') => {
                let (row, col) = (self.state.cursor.row, self.state.cursor.col);
                let end = (col as i64 + n()).min(self.state.cols as i64) as u16;
                let bg = self.state.cursor.bg;
                self.state.active_grid_mut().erase_cells(row, col, end, bg);
                self.state.mark_dirty();
            }
            (None, 'Z') => {
                for _ in 0..n() {
                    let prev = self.state.prev_tab_before(self.state.cursor.col);
                    self.state.cursor.col = prev;
                }
                self.state.mark_dirty();
            }
            (None, 'b') => {
                if let Some(c) = self.last_printed {
                    for _ in 0..n().min(REP_LIMIT) {
                        self.print(c);
                    }
                }
            }
            (None, 'd') => {
                let rows = self.state.rows;
                self.state.cursor.row = (Self::param(params, 0, 1) - 1).max(0).min(rows.saturating_sub(1) as i64) as u16;
                self.state.mark_dirty();
            }
            (None, 'h') => self.set_mode(params, false, true),
            (Some('?'), 'h') => self.set_mode(params, true, true),
            (None, 'l') => self.set_mode(params, false, false),
            (Some('?'), 'l') => self.set_mode(params, true, false),
            (None, 'm') => self.handle_sgr(params),
            (None, 'n') => self.handle_dsr(params),
            (None, 'c') => {
                self.state.queue_response(b"\x1b[?1;2c".to_vec());
            }
            (Some('>'), 'c') => {
                self.state.queue_response(b"\x1b[>1;10;0c".to_vec());
            }
            (None, 'r') => {
                let top = (Self::param(params, 0, 1) - 1).max(0) as u16;
                let bottom = (Self::param(params, 1, self.state.rows as i64) - 1).max(0) as u16;
                if top < bottom {
                    self.state.scroll_top = top;
                    self.state.scroll_bottom = bottom.min(self.state.rows.saturating_sub(1));
                } else {
                    self.state.scroll_top = 0;
                    self.state.scroll_bottom = self.state.rows.saturating_sub(1);
                }
                self.state.move_cursor(0, 0);
            }
            (None, 's') => self.state.save_cursor(),
            (None, 'u') => self.state.restore_cursor(),
            (Some('?'), 'p') if intermediates == b"$" => {
                // DECRPM: `CSI ? Pd $ p`. We don't track per-mode query
                // state distinctly from set state, so report "not
                // recognized" (Pm=0) rather than claim support we lack.
                let pd = Self::param(params, 0, 0);
                let reply = format!("\x1b[?{};0$y", pd);
                self.state.queue_response(reply.into_bytes());
            }
            (None, 'q') if intermediates == b" " => {
                self.set_cursor_style(Self::param(params, 0, 1));
            }
            _ => {
                tracing::trace!(?private, %action, "ignoring unrecognized CSI");
            }
        }
    }

    /// CSI `S` (SU): scrolls the region up, discarding the evicted row.
    /// Scrollback is only ever appended from a line feed on the primary
    /// screen (`scroll_up_primary`), never from an explicit scroll-region
    /// CSI — matching CSI `M`/DL, which discards the same way.
    fn scroll_up_region(&mut self, top: u16, bottom: u16) {
        let fill = self.fill_cell();
        self.state.active_grid_mut().scroll_up(top, bottom, fill);
        self.state.mark_dirty();
    }

    fn erase_display(&mut self, mode: i64) {
        let rows = self.state.rows;
        let cols = self.state.cols;
        let (row, col) = (self.state.cursor.row, self.state.cursor.col);
        let bg = self.state.cursor.bg;
        match mode {
            0 => {
                self.state.active_grid_mut().erase_cells(row, col, cols, bg);
                for r in (row + 1)..rows {
                    self.state.active_grid_mut().erase_cells(r, 0, cols, bg);
                }
            }
            1 => {
                self.state.active_grid_mut().erase_cells(row, 0, col + 1, bg);
                for r in 0..row {
                    self.state.active_grid_mut().erase_cells(r, 0, cols, bg);
                }
            }
            2 => {
                for r in 0..rows {
                    self.state.active_grid_mut().erase_cells(r, 0, cols, bg);
                }
            }
            3 => {
                for r in 0..rows {
                    self.state.active_grid_mut().erase_cells(r, 0, cols, bg);
                }
                self.state.clear_scrollback();
            }
            _ => {}
        }
        self.state.mark_dirty();
    }

    fn erase_line(&mut self, mode: i64) {
        let cols = self.state.cols;
        let (row, col) = (self.state.cursor.row, self.state.cursor.col);
        let bg = self.state.cursor.bg;
        match mode {
            0 => self.state.active_grid_mut().erase_cells(row, col, cols, bg),
            1 => self.state.active_grid_mut().erase_cells(row, 0, col + 1, bg),
            2 => self.state.active_grid_mut().erase_cells(row, 0, cols, bg),
            _ => {}
        }
        self.state.mark_dirty();
    }

    fn set_cursor_style(&mut self, n: i64) {
        use crate::attrs::CursorShape;
        let (shape, blink) = match n {
            0 | 1 => (CursorShape::Block, true),
            2 => (CursorShape::Block, false),
            3 => (CursorShape::Underline, true),
            4 => (CursorShape::Underline, false),
            5 => (CursorShape::Bar, true),
            6 => (CursorShape::Bar, false),
            _ => (self.state.cursor.shape, self.state.cursor.blink),
        };
        self.state.cursor.shape = shape;
        self.state.cursor.blink = blink;
    }

    fn handle_dsr(&mut self, params: &[Vec<i64>]) {
        match Self::param(params, 0, 0) {
            6 => {
                let reply = format!(
                    "\x1b[{};{}R",
                    self.state.cursor.row + 1,
                    self.state.cursor.col + 1
                );
                self.state.queue_response(reply.into_bytes());
            }
            5 => self.state.queue_response(b"\x1b[0n".to_vec()),
            _ => {}
        }
    }

    fn set_mode(&mut self, params: &[Vec<i64>], private: bool, enable: bool) {
        for group in params {
            let Some(&code) = group.first() else { continue };
            if private {
                self.set_dec_mode(code, enable);
            } else {
                self.set_ansi_mode(code, enable);
            }
        }
    }

    fn set_ansi_mode(&mut self, code: i64, enable: bool) {
        match code {
            4 => self.state.modes.insert = enable,
            20 => self.state.modes.linefeed_newline = enable,
            _ => {}
        }
    }

    fn set_dec_mode(&mut self, code: i64, enable: bool) {
        match code {
            1 => self.state.modes.cursor_keys_application = enable,
            6 => {
                self.state.modes.origin = enable;
                self.state.move_cursor(0, 0);
            }
            7 => self.state.modes.autowrap = enable,
            25 => self.state.modes.cursor_visible = enable,
            9 => {
                self.state.modes.mouse_reporting =
                    if enable { MouseReporting::X10 } else { MouseReporting::None };
            }
            1000 => {
                self.state.modes.mouse_reporting =
                    if enable { MouseReporting::Normal } else { MouseReporting::None };
            }
            1002 => {
                self.state.modes.mouse_reporting =
                    if enable { MouseReporting::ButtonEvent } else { MouseReporting::None };
            }
            1003 => {
                self.state.modes.mouse_reporting =
                    if enable { MouseReporting::AnyEvent } else { MouseReporting::None };
            }
            1004 => self.state.modes.focus_events = enable,
            1006 => self.state.modes.sgr_mouse_encoding = enable,
            1007 => self.state.modes.alternate_scroll = enable,
            1015 => self.state.modes.urxvt_mouse_encoding = enable,
            1049 => self.set_alt_screen(enable),
            2004 => self.state.modes.bracketed_paste = enable,
            2026 => self.state.modes.synchronized_output = enable,
            _ => {}
        }
    }

    fn set_alt_screen(&mut self, enable: bool) {
        if enable == self.state.modes.alt_screen {
            return;
        }
        if enable {
            self.state.save_cursor();
            self.state.modes.alt_screen = true;
            self.state.clear_active();
            self.state.shell.push(TerminalEvent::AltScreenEntered);
        } else {
            self.state.modes.alt_screen = false;
            self.state.restore_cursor();
            self.state.shell.push(TerminalEvent::AltScreenExited);
        }
        self.state.mark_dirty();
    }

    // ---- SGR ------------------------------------------------------------

    fn handle_sgr(&mut self, params: &[Vec<i64>]) {
        if params.is_empty() {
            self.reset_sgr();
            return;
        }
        let mut i = 0;
        while i < params.len() {
            let group = &params[i];
            let code = group.first().copied().unwrap_or(0);
            match code {
                0 => self.reset_sgr(),
                1 => self.state.cursor.attrs.insert(CellAttrs::BOLD),
                2 => self.state.cursor.attrs.insert(CellAttrs::DIM),
                3 => self.state.cursor.attrs.insert(CellAttrs::ITALIC),
                4 => {
                    self.state.cursor.underline = if group.len() > 1 {
                        UnderlineStyle::from_sgr_subparam(group[1])
                    } else {
                        UnderlineStyle::Single
                    };
                }
                5 | 6 => self.state.cursor.attrs.insert(CellAttrs::BLINK),
                7 => self.state.cursor.attrs.insert(CellAttrs::REVERSE),
                8 => self.state.cursor.attrs.insert(CellAttrs::HIDDEN),
                9 => self.state.cursor.attrs.insert(CellAttrs::STRIKETHROUGH),
                21 => self.state.cursor.underline = UnderlineStyle::Double,
                22 => self.state.cursor.attrs.remove(CellAttrs::BOLD | CellAttrs::DIM),
                23 => self.state.cursor.attrs.remove(CellAttrs::ITALIC),
                24 => self.state.cursor.underline = UnderlineStyle::None,
                25 => self.state.cursor.attrs.remove(CellAttrs::BLINK),
                27 => self.state.cursor.attrs.remove(CellAttrs::REVERSE),
                28 => self.state.cursor.attrs.remove(CellAttrs::HIDDEN),
                29 => self.state.cursor.attrs.remove(CellAttrs::STRIKETHROUGH),
                30..=37 => self.state.cursor.fg = Color::ansi((code - 30) as u8),
                38 => {
                    if let Some((color, consumed)) = self.extended_color(params, i) {
                        self.state.cursor.fg = color;
                        i += consumed;
                        continue;
                    }
                }
                39 => self.state.cursor.fg = Color::DefaultForeground,
                40..=47 => self.state.cursor.bg = Color::ansi((code - 40) as u8),
                48 => {
                    if let Some((color, consumed)) = self.extended_color(params, i) {
                        self.state.cursor.bg = color;
                        i += consumed;
                        continue;
                    }
                }
                49 => self.state.cursor.bg = Color::DefaultBackground,
                90..=97 => self.state.cursor.fg = Color::ansi((code - 90 + 8) as u8),
                100..=107 => self.state.cursor.bg = Color::ansi((code - 100 + 8) as u8),
                _ => {}
            }
            i += 1;
        }
    }

    /// Parses `38;5;n` / `38;2;r;g;b` (and `48;...` analogously), supporting
    /// both the semicolon form (separate Params groups) and the colon
    /// subparameter form (`38:2::r:g:b` folded into one group). Returns the
    /// resolved color plus how many top-level params it consumed.
    fn extended_color(&self, params: &[Vec<i64>], at: usize) -> Option<(Color, usize)> {
        let group = &params[at];
        if group.len() > 1 {
            return match group[1] {
                5 if group.len() > 2 => Some((Color::Palette256(group[2] as u8), 1)),
                2 if group.len() > 4 => Some((
                    Color::TrueColor(group[2] as u8, group[3] as u8, group[4] as u8),
                    1,
                )),
                _ => None,
            };
        }
        match Self::subparams(params, at + 1).first().copied() {
            Some(5) => {
                let n = *Self::subparams(params, at + 2).first()?;
                Some((Color::Palette256(n as u8), 3))
            }
            Some(2) => {
                let r = *Self::subparams(params, at + 2).first()?;
                let g = *Self::subparams(params, at + 3).first()?;
                let b = *Self::subparams(params, at + 4).first()?;
                Some((Color::TrueColor(r as u8, g as u8, b as u8), 5))
            }
            _ => None,
        }
    }

    fn reset_sgr(&mut self) {
        self.state.cursor.fg = Color::DefaultForeground;
        self.state.cursor.bg = Color::DefaultBackground;
        self.state.cursor.attrs = CellAttrs::empty();
        self.state.cursor.underline = UnderlineStyle::None;
    }

    // ---- ESC ------------------------------------------------------------

    fn esc_dispatch(&mut self, intermediates: &[u8], action: u8) {
        match (intermediates.first(), action) {
            (None, b'7') => self.state.save_cursor(),
            (None, b'8') => self.state.restore_cursor(),
            (None, b'D') => self.line_feed(),
            (None, b'E') => {
                self.state.cursor.col = 0;
                self.line_feed();
            }
            (None, b'H') => {
                let col = self.state.cursor.col;
                self.state.set_tab(col);
            }
            (None, b'M') => self.reverse_index(),
            (None, b'c') => self.state.full_reset(),
            (None, b'=') => self.state.modes.keypad_application = true,
            (None, b'>') => self.state.modes.keypad_application = false,
            (Some(b'('), b'0') => self.state.cursor.active_charset = Charset::DecLineDrawing,
            (Some(b'('), b'B') => self.state.cursor.active_charset = Charset::Ascii,
            _ => {}
        }
        self.state.mark_dirty();
    }

    /// RI: reverse index — move up one line, scrolling down if at the top
    /// of the scroll region.
    fn reverse_index(&mut self) {
        let top = self.state.scroll_top;
        if self.state.cursor.row == top {
            let bottom = self.state.scroll_bottom;
            let fill = self.fill_cell();
            self.state.active_grid_mut().scroll_down(top, bottom, fill);
        } else {
            self.state.cursor.row = self.state.cursor.row.saturating_sub(1);
        }
    }

    // ---- OSC ------------------------------------------------------------

    fn osc_dispatch(&mut self, data: &[Vec<u8>]) {
        let Some(code) = data.first().and_then(|d| std::str::from_utf8(d).ok()) else {
            return;
        };
        match code {
            "0" | "2" => {
                if let Some(title) = data.get(1).and_then(|d| std::str::from_utf8(d).ok()) {
                    self.state.title = title.to_string();
                    self.state
                        .shell
                        .push(TerminalEvent::TitleChanged { title: title.to_string() });
                }
            }
            "7" => {
                if let Some(url) = data.get(1).and_then(|d| std::str::from_utf8(d).ok()) {
                    if let Some(path) = url.strip_prefix("file://").and_then(|rest| {
                        rest.splitn(2, '/').nth(1).map(|p| format!("/{p}"))
                    }) {
                        self.state.shell.set_cwd(path);
                    }
                }
            }
            "8" => {
                // params;URI — hyperlink id/URI tracked by the caller via
                // the cell's `hyperlink` field; the id/URI mapping table
                // itself lives with the renderer, which owns link lookups.
            }
            "133" => self.handle_osc_133(data),
            _ => {
                tracing::trace!(%code, "ignoring unrecognized OSC code");
            }
        }
    }

    fn handle_osc_133(&mut self, data: &[Vec<u8>]) {
        let Some(sub) = data.get(1).and_then(|d| std::str::from_utf8(d).ok()) else {
            return;
        };
        let (row, col) = (self.state.cursor.row, self.state.cursor.col);
        match sub {
            "A" => self.state.shell.prompt_start(row, col),
            "B" => self.state.shell.command_start(String::new(), row, col),
            "C" => {}
            "D" => {
                let exit_code = data
                    .get(2)
                    .and_then(|d| std::str::from_utf8(d).ok())
                    .and_then(|s| s.parse::<i32>().ok())
                    .unwrap_or(0);
                self.state.shell.command_end(exit_code, row, col);
            }
            _ => {}
        }
    }
}

/// Maps ASCII to the VT100 DEC Special Graphics (line-drawing) charset for
/// the subset commonly emitted by TUIs (box-drawing corners/lines).
fn dec_line_drawing_char(c: char) -> Option<char> {
    Some(match c {
        'j' => '┘',
        'k' => '┐',
        'l' => '┌',
        'm' => '└',
        'n' => '┼',
        'q' => '─',
        't' => '├',
        'u' => '┤',
        'v' => '┴',
        'w' => '┬',
        'x' => '│',
        '~' => '·',
        '`' => '◆',
        'a' => '▒',
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn feed(emu: &mut Emulator, bytes: &[u8]) {
        let mut parser = Parser::new();
        let mut events = Vec::new();
        parser.feed(bytes, &mut |e| events.push(e));
        for e in events {
            emu.apply(e);
        }
    }

    #[test]
    fn hello_world() {
        let mut emu = Emulator::new(24, 80);
        feed(&mut emu, b"Hello\r\n");
        let g = emu.state.active_grid();
        assert_eq!(g.get(0, 0).c, 'H');
        assert_eq!(g.get(0, 4).c, 'o');
        assert_eq!(emu.state.cursor.row, 1);
        assert_eq!(emu.state.cursor.col, 0);
        assert!(!g.line_wrapped(0));
        assert!(emu.state.get_visible_text().starts_with("Hello\n"));
    }

    #[test]
    fn sgr_red_bold() {
        let mut emu = Emulator::new(24, 80);
        feed(&mut emu, b"\x1b[1;31mX\x1b[0mY");
        let g = emu.state.active_grid();
        let cell = g.get(0, 0);
        assert_eq!(cell.c, 'X');
        assert!(cell.attrs.contains(CellAttrs::BOLD));
        assert_eq!(cell.fg, Color::Ansi(1));
        let cell2 = g.get(0, 1);
        assert_eq!(cell2.c, 'Y');
        assert_eq!(cell2.attrs, CellAttrs::empty());
        assert_eq!(cell2.fg, Color::DefaultForeground);
    }

    #[test]
    fn scroll_via_lf_at_bottom() {
        let mut emu = Emulator::new(3, 3);
        feed(&mut emu, b"A\nB\nC\nD");
        let g = emu.state.active_grid();
        assert_eq!(g.get(0, 0).c, 'B');
        assert_eq!(g.get(1, 0).c, 'C');
        assert_eq!(g.get(2, 0).c, 'D');
        assert_eq!(emu.state.scrollback_len(), 1);
        assert_eq!(emu.state.cursor.row, 2);
        assert_eq!(emu.state.cursor.col, 1);
    }

    #[test]
    fn cup_then_erase() {
        let mut emu = Emulator::new(24, 80);
        for r in 0..24u16 {
            for c in 0..80u16 {
                let cell = Cell {
                    c: '.',
                    ..Default::default()
                };
                emu.state.active_grid_mut().set(r, c, cell);
            }
        }
        feed(&mut emu, b"\x1b[5;10H\x1b[K");
        let g = emu.state.active_grid();
        assert_eq!(g.get(4, 8).c, '.');
        assert_eq!(g.get(4, 9).c, ' ');
        assert_eq!(g.get(4, 79).c, ' ');
        assert_eq!(emu.state.cursor.row, 4);
        assert_eq!(emu.state.cursor.col, 9);
    }

    #[test]
    fn cup_zero_zero_behaves_as_one_one() {
        let mut emu = Emulator::new(24, 80);
        feed(&mut emu, b"\x1b[0;0H");
        assert_eq!(emu.state.cursor.row, 0);
        assert_eq!(emu.state.cursor.col, 0);
    }

    #[test]
    fn alt_screen_round_trip_preserves_primary() {
        let mut emu = Emulator::new(5, 5);
        feed(&mut emu, b"hi");
        feed(&mut emu, b"\x1b[?1049h");
        assert!(emu.state.modes.alt_screen);
        feed(&mut emu, b"\x1b[?1049l");
        assert!(!emu.state.modes.alt_screen);
        assert_eq!(emu.state.active_grid().get(0, 0).c, 'h');
    }

    #[test]
    fn wide_character_pairing() {
        let mut emu = Emulator::new(3, 10);
        feed(&mut emu, "漢".as_bytes());
        let g = emu.state.active_grid();
        assert!(g.get(0, 0).is_wide);
        assert!(g.get(0, 1).is_wide_continuation);
    }

    #[test]
    fn dsr_cursor_position_reply() {
        let mut emu = Emulator::new(24, 80);
        feed(&mut emu, b"\x1b[10;5H\x1b[6n");
        let responses = emu.state.take_pending_responses();
        assert_eq!(responses, vec![b"\x1b[10;5R".to_vec()]);
    }
}
