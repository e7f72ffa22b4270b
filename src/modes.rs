/// Mouse tracking variant and reply encoding, collapsed into one tagged
/// value. Modes 1000/1002/1003 select which events are tracked; 1006/1015
/// layer an encoding on top. We fold "no mouse tracking" and each tracking
/// variant into this enum directly, and track the encoding choice alongside
/// it on `Modes` (`sgr_mouse_encoding` / `urxvt_mouse_encoding`) since 1006
/// and 1015 are applied independently of which tracking variant is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseReporting {
    None,
    X10,
    Normal,
    ButtonEvent,
    AnyEvent,
}

impl Default for MouseReporting {
    fn default() -> Self {
        MouseReporting::None
    }
}

/// Terminal mode flags tracking various DEC and ANSI modes.
#[derive(Debug, Clone)]
pub struct Modes {
    /// DECCKM: cursor key mode (application vs normal).
    pub cursor_keys_application: bool,
    /// DECKPAM/DECKPNM: application keypad mode.
    pub keypad_application: bool,
    /// DECOM: origin mode.
    pub origin: bool,
    /// DECAWM: auto-wrap mode.
    pub autowrap: bool,
    /// DECTCEM: text cursor visible.
    pub cursor_visible: bool,
    /// Mouse tracking variant (modes 1000/1002/1003, or none).
    pub mouse_reporting: MouseReporting,
    /// Mode 1006: SGR mouse reply encoding.
    pub sgr_mouse_encoding: bool,
    /// Mode 1015: URXVT mouse reply encoding.
    pub urxvt_mouse_encoding: bool,
    /// Mode 1007: alternate scroll mode.
    pub alternate_scroll: bool,
    /// Mode 2004: bracketed paste mode.
    pub bracketed_paste: bool,
    /// Mode 2026: synchronized output — a passive flag the renderer checks
    /// before redrawing mid-batch; the core does not act on it itself.
    pub synchronized_output: bool,
    /// Mode 1004: focus in/out events.
    pub focus_events: bool,
    /// Mode 1049: alternate screen active.
    pub alt_screen: bool,
    /// IRM: insert mode.
    pub insert: bool,
    /// LNM: line feed / new line mode.
    pub linefeed_newline: bool,
}

impl Default for Modes {
    fn default() -> Self {
        Self {
            cursor_keys_application: false,
            keypad_application: false,
            origin: false,
            autowrap: true,
            cursor_visible: true,
            mouse_reporting: MouseReporting::None,
            sgr_mouse_encoding: false,
            urxvt_mouse_encoding: false,
            alternate_scroll: false,
            bracketed_paste: false,
            synchronized_output: false,
            focus_events: false,
            alt_screen: false,
            insert: false,
            linefeed_newline: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_vt100_power_on_state() {
        let m = Modes::default();
        assert!(m.autowrap);
        assert!(m.cursor_visible);
        assert_eq!(m.mouse_reporting, MouseReporting::None);
        assert!(!m.alt_screen);
    }
}
