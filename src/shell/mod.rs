pub mod detect;
pub mod hooks;

use uuid::Uuid;

/// Observable side effects the emulator raises while applying events.
/// The renderer/caller drains these; none of them carry renderer-specific
/// presentation state (no spans, no colors — those stay on `Cell`).
#[derive(Debug, Clone, PartialEq)]
pub enum TerminalEvent {
    TitleChanged { title: String },
    CwdChanged { path: String },
    BlockStarted { id: String, cwd: String, row: u16, col: u16 },
    BlockCommand { id: String, command: String, row: u16, col: u16 },
    BlockCompleted { id: String, exit_code: i32, row: u16, col: u16 },
    AltScreenEntered,
    AltScreenExited,
}

/// Tracks shell integration state for command block detection, driven by
/// OSC 7 (cwd) and OSC 133 (FinalTerm prompt/command markers).
#[derive(Debug)]
pub struct ShellIntegration {
    pub active: bool,
    pub current_block_id: Option<String>,
    pub cwd: String,
    pending_events: Vec<TerminalEvent>,
}

impl ShellIntegration {
    pub fn new() -> Self {
        Self {
            active: false,
            cwd: String::new(),
            current_block_id: None,
            pending_events: Vec::new(),
        }
    }

    /// OSC 133;A — prompt start. Marks the beginning of a new command block.
    pub fn prompt_start(&mut self, row: u16, col: u16) {
        self.active = true;
        let id = Uuid::new_v4().to_string();
        self.current_block_id = Some(id.clone());
        self.pending_events.push(TerminalEvent::BlockStarted {
            id,
            cwd: self.cwd.clone(),
            row,
            col,
        });
    }

    /// OSC 133;B — command text identified, about to execute.
    pub fn command_start(&mut self, command: String, row: u16, col: u16) {
        if let Some(id) = &self.current_block_id {
            self.pending_events.push(TerminalEvent::BlockCommand {
                id: id.clone(),
                command,
                row,
                col,
            });
        }
    }

    /// OSC 133;D;<exit_code> — command finished.
    pub fn command_end(&mut self, exit_code: i32, row: u16, col: u16) {
        if let Some(id) = self.current_block_id.take() {
            self.pending_events.push(TerminalEvent::BlockCompleted {
                id,
                exit_code,
                row,
                col,
            });
        }
    }

    /// OSC 7 — working directory update.
    pub fn set_cwd(&mut self, path: String) {
        self.cwd = path.clone();
        self.pending_events.push(TerminalEvent::CwdChanged { path });
    }

    pub fn push(&mut self, event: TerminalEvent) {
        self.pending_events.push(event);
    }

    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    pub fn take_pending_events(&mut self) -> Vec<TerminalEvent> {
        std::mem::take(&mut self.pending_events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_start_assigns_a_fresh_block_id() {
        let mut s = ShellIntegration::new();
        s.prompt_start(3, 0);
        assert!(s.current_block_id.is_some());
        let events = s.take_pending_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], TerminalEvent::BlockStarted { .. }));
    }

    #[test]
    fn command_end_without_start_is_noop() {
        let mut s = ShellIntegration::new();
        s.command_end(0, 1, 0);
        assert!(!s.has_pending_events());
    }
}
