use bitflags::bitflags;

bitflags! {
    /// Cell text attributes as a compact bitflag set. Underline is tracked
    /// separately via `UnderlineStyle` since it is multi-valued rather than
    /// a simple on/off toggle.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct CellAttrs: u16 {
        const BOLD          = 1 << 0;
        const DIM           = 1 << 1;
        const ITALIC        = 1 << 2;
        const BLINK         = 1 << 3;
        const REVERSE       = 1 << 4;
        const HIDDEN        = 1 << 5;
        const STRIKETHROUGH = 1 << 6;
    }
}

/// SGR underline style. `4` alone selects `Single`; `4:n` subparameters
/// select the others; `21` also selects `Double` per xterm convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnderlineStyle {
    None,
    Single,
    Double,
    Curly,
    Dotted,
    Dashed,
}

impl Default for UnderlineStyle {
    fn default() -> Self {
        UnderlineStyle::None
    }
}

impl UnderlineStyle {
    pub fn is_underlined(&self) -> bool {
        !matches!(self, UnderlineStyle::None)
    }

    pub fn from_sgr_subparam(n: i64) -> Self {
        match n {
            0 => UnderlineStyle::None,
            1 => UnderlineStyle::Single,
            2 => UnderlineStyle::Double,
            3 => UnderlineStyle::Curly,
            4 => UnderlineStyle::Dotted,
            5 => UnderlineStyle::Dashed,
            _ => UnderlineStyle::Single,
        }
    }
}

/// Cursor shape for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorShape {
    Block,
    Underline,
    Bar,
}

impl Default for CursorShape {
    fn default() -> Self {
        CursorShape::Block
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn underline_subparam_zero_clears() {
        assert_eq!(UnderlineStyle::from_sgr_subparam(0), UnderlineStyle::None);
        assert!(!UnderlineStyle::None.is_underlined());
    }

    #[test]
    fn underline_subparam_maps_curly() {
        assert_eq!(UnderlineStyle::from_sgr_subparam(3), UnderlineStyle::Curly);
    }
}
