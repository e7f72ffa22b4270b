use crate::modes::Modes;

/// A non-printable key the caller wants encoded into PTY input bytes.
/// Printable characters bypass this encoder entirely — the caller writes
/// UTF-8 text straight to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Right,
    Left,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,
    Tab,
    Return,
    Escape,
    Backspace,
    F(u8),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub alt: bool,
    pub ctrl: bool,
}

impl Modifiers {
    pub fn is_none(&self) -> bool {
        !self.shift && !self.alt && !self.ctrl
    }

    /// xterm's modifier parameter: `1 + shift(1) + alt(2) + ctrl(4)`.
    fn code(&self) -> u8 {
        1 + self.shift as u8 + 2 * self.alt as u8 + 4 * self.ctrl as u8
    }
}

/// Encodes a key press into the byte sequence xterm-class terminals expect,
/// given the currently active modes (DECCKM affects arrow/Home/End).
pub fn encode_key(key: Key, modifiers: Modifiers, modes: &Modes) -> Vec<u8> {
    if !modifiers.is_none() && matches!(key, Up | Down | Right | Left | Home | End) {
        return encode_modified_motion(key, modifiers);
    }

    match key {
        Key::Up => app_or_normal(b"A", modes.cursor_keys_application),
        Key::Down => app_or_normal(b"B", modes.cursor_keys_application),
        Key::Right => app_or_normal(b"C", modes.cursor_keys_application),
        Key::Left => app_or_normal(b"D", modes.cursor_keys_application),
        Key::Home => app_or_normal(b"H", modes.cursor_keys_application),
        Key::End => app_or_normal(b"F", modes.cursor_keys_application),
        Key::PageUp => b"\x1b[5~".to_vec(),
        Key::PageDown => b"\x1b[6~".to_vec(),
        Key::Insert => b"\x1b[2~".to_vec(),
        Key::Delete => b"\x1b[3~".to_vec(),
        Key::Tab => {
            if modifiers.shift {
                b"\x1b[Z".to_vec()
            } else {
                b"\t".to_vec()
            }
        }
        Key::Return => b"\r".to_vec(),
        Key::Escape => b"\x1b".to_vec(),
        Key::Backspace => b"\x7f".to_vec(),
        Key::F(n) => encode_function_key(n),
    }
}

use Key::{Down, End, Home, Left, Right, Up};

fn app_or_normal(final_byte: &[u8], application: bool) -> Vec<u8> {
    let mut out = Vec::with_capacity(3);
    out.push(0x1b);
    out.push(if application { b'O' } else { b'[' });
    out.extend_from_slice(final_byte);
    out
}

fn encode_modified_motion(key: Key, modifiers: Modifiers) -> Vec<u8> {
    let final_byte = match key {
        Up => 'A',
        Down => 'B',
        Right => 'C',
        Left => 'D',
        Home => 'H',
        End => 'F',
        _ => unreachable!(),
    };
    format!("\x1b[1;{}{}", modifiers.code(), final_byte).into_bytes()
}

fn encode_function_key(n: u8) -> Vec<u8> {
    match n {
        1..=4 => {
            let c = (b'P' + (n - 1)) as char;
            format!("\x1bO{}", c).into_bytes()
        }
        5 => b"\x1b[15~".to_vec(),
        6 => b"\x1b[17~".to_vec(),
        7 => b"\x1b[18~".to_vec(),
        8 => b"\x1b[19~".to_vec(),
        9 => b"\x1b[20~".to_vec(),
        10 => b"\x1b[21~".to_vec(),
        11 => b"\x1b[23~".to_vec(),
        12 => b"\x1b[24~".to_vec(),
        _ => Vec::new(),
    }
}

/// Encodes Control-`c` for a letter or punctuation key per the standard C0
/// control mapping. Returns `None` for keys with no Control form.
pub fn encode_control(c: char) -> Option<u8> {
    let upper = c.to_ascii_uppercase();
    match upper {
        'A'..='Z' => Some(upper as u8 - 64),
        '@' => Some(0x00),
        '[' => Some(0x1b),
        '\\' => Some(0x1c),
        ']' => Some(0x1d),
        '^' => Some(0x1e),
        '_' => Some(0x1f),
        '?' => Some(0x7f),
        _ => None,
    }
}

/// Wraps pasted text for bracketed-paste mode (2004). Callers should check
/// `modes.bracketed_paste` before calling; when unset, paste as plain bytes.
pub fn bracketed_paste(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() + 12);
    out.extend_from_slice(b"\x1b[200~");
    out.extend_from_slice(text.as_bytes());
    out.extend_from_slice(b"\x1b[201~");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrow_keys_default_to_csi() {
        let modes = Modes::default();
        assert_eq!(encode_key(Key::Up, Modifiers::default(), &modes), b"\x1b[A");
    }

    #[test]
    fn arrow_keys_use_ss3_in_application_mode() {
        let mut modes = Modes::default();
        modes.cursor_keys_application = true;
        assert_eq!(encode_key(Key::Up, Modifiers::default(), &modes), b"\x1bOA");
    }

    #[test]
    fn shift_tab_sends_csi_z() {
        let modes = Modes::default();
        let m = Modifiers { shift: true, ..Default::default() };
        assert_eq!(encode_key(Key::Tab, m, &modes), b"\x1b[Z");
    }

    #[test]
    fn modified_arrow_uses_modifier_code() {
        let modes = Modes::default();
        let m = Modifiers { ctrl: true, ..Default::default() };
        assert_eq!(encode_key(Key::Right, m, &modes), b"\x1b[1;5C");
    }

    #[test]
    fn control_c_maps_to_etx() {
        assert_eq!(encode_control('c'), Some(0x03));
        assert_eq!(encode_control('['), Some(0x1b));
    }

    #[test]
    fn bracketed_paste_wraps_text() {
        let wrapped = bracketed_paste("hi");
        assert_eq!(wrapped, b"\x1b[200~hi\x1b[201~");
    }

    #[test]
    fn function_key_f5_uses_tilde_sequence() {
        assert_eq!(encode_key(Key::F(5), Modifiers::default(), &Modes::default()), b"\x1b[15~");
    }
}
