use crate::attrs::{CellAttrs, CursorShape, UnderlineStyle};
use crate::color::Color;

/// Which of the two G-sets is selected by SI/SO (0x0F / 0x0E).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    Ascii,
    DecLineDrawing,
}

impl Default for Charset {
    fn default() -> Self {
        Charset::Ascii
    }
}

/// Full cursor state: position, shape, current SGR pen, and the one slot of
/// save/restore state used by DECSC/DECRC.
#[derive(Debug, Clone)]
pub struct CursorState {
    pub row: u16,
    pub col: u16,
    pub fg: Color,
    pub bg: Color,
    pub attrs: CellAttrs,
    pub underline: UnderlineStyle,
    pub shape: CursorShape,
    pub visible: bool,
    pub blink: bool,
    /// Which G-set (G0/G1) is currently selected.
    pub active_charset: Charset,
    saved: Option<SavedCursor>,
}

#[derive(Debug, Clone)]
struct SavedCursor {
    row: u16,
    col: u16,
    fg: Color,
    bg: Color,
    attrs: CellAttrs,
    underline: UnderlineStyle,
    charset: Charset,
    origin_mode: bool,
}

impl Default for CursorState {
    fn default() -> Self {
        Self {
            row: 0,
            col: 0,
            fg: Color::DefaultForeground,
            bg: Color::DefaultBackground,
            attrs: CellAttrs::empty(),
            underline: UnderlineStyle::None,
            shape: CursorShape::Block,
            visible: true,
            blink: true,
            active_charset: Charset::Ascii,
            saved: None,
        }
    }
}

impl CursorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// DECSC: save position, SGR pen, charset, and origin mode.
    pub fn save(&mut self, origin_mode: bool) {
        self.saved = Some(SavedCursor {
            row: self.row,
            col: self.col,
            fg: self.fg,
            bg: self.bg,
            attrs: self.attrs,
            underline: self.underline,
            charset: self.active_charset,
            origin_mode,
        });
    }

    /// DECRC: restore previously saved state. Returns the saved origin-mode
    /// flag so the caller can restore it on `Modes` too (a no-op, returning
    /// `None`, if nothing was ever saved).
    pub fn restore(&mut self) -> Option<bool> {
        let saved = self.saved.take()?;
        self.row = saved.row;
        self.col = saved.col;
        self.fg = saved.fg;
        self.bg = saved.bg;
        self.attrs = saved.attrs;
        self.underline = saved.underline;
        self.active_charset = saved.charset;
        Some(saved.origin_mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restore_without_save_is_noop() {
        let mut c = CursorState::new();
        c.row = 5;
        assert_eq!(c.restore(), None);
        assert_eq!(c.row, 5);
    }

    #[test]
    fn save_restore_round_trips_pen_and_position() {
        let mut c = CursorState::new();
        c.row = 3;
        c.col = 7;
        c.fg = Color::Ansi(1);
        c.attrs = CellAttrs::BOLD;
        c.save(false);
        c.row = 0;
        c.col = 0;
        c.fg = Color::DefaultForeground;
        c.attrs = CellAttrs::empty();
        let origin = c.restore();
        assert_eq!(origin, Some(false));
        assert_eq!(c.row, 3);
        assert_eq!(c.col, 7);
        assert_eq!(c.fg, Color::Ansi(1));
        assert_eq!(c.attrs, CellAttrs::BOLD);
    }
}
