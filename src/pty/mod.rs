pub mod reader;
pub mod session;

pub use session::Session;

use portable_pty::{native_pty_system, CommandBuilder, PtySize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use uuid::Uuid;

use crate::error::{Result, TerminalError};
use crate::shell::{detect::detect_shell, hooks::shell_init_command};

/// Result of spawning a session: the session itself plus the reader handle,
/// which the caller passes to `reader::spawn_pty_threads`.
pub struct SpawnResult {
    pub session: Session,
    pub reader: Box<dyn std::io::Read + Send>,
}

/// Creates PTY sessions. Stateless: a new `PtySystem` is created per spawn
/// to avoid `Sync` constraints on the platform-native implementation.
pub struct PtyManager;

impl Default for PtyManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PtyManager {
    pub fn new() -> Self {
        Self
    }

    /// Spawn a new terminal session with the given shell and dimensions.
    pub fn spawn_session(
        &self,
        shell_path: Option<&str>,
        cwd: Option<&str>,
        rows: u16,
        cols: u16,
        env: Option<&HashMap<String, String>>,
    ) -> Result<SpawnResult> {
        let pty_system = native_pty_system();
        let shell = match shell_path {
            Some(p) if std::path::Path::new(p).exists() => p.to_string(),
            Some(p) => {
                tracing::warn!(shell = %p, "configured shell not found; falling back to default");
                detect_shell()
            }
            None => detect_shell(),
        };

        let pair = pty_system
            .openpty(PtySize {
                rows,
                cols,
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(|e| TerminalError::PtyCreateFailed { reason: e.to_string() })?;

        let mut cmd = CommandBuilder::new(&shell);

        if let Some(dir) = cwd {
            cmd.cwd(dir);
        } else if let Some(home) = dirs::home_dir() {
            cmd.cwd(home);
        }

        cmd.env("TERM", "xterm-256color");
        cmd.env("COLORTERM", "truecolor");
        cmd.env("TERM_PROGRAM", "harborterm");
        cmd.env("TERM_PROGRAM_VERSION", env!("CARGO_PKG_VERSION"));

        let lang = std::env::var("LANG").unwrap_or_else(|_| "en_US.UTF-8".to_string());
        cmd.env("LANG", &lang);
        if let Ok(lc_all) = std::env::var("LC_ALL") {
            cmd.env("LC_ALL", &lc_all);
        }

        if let Some(custom_env) = env {
            for (key, value) in custom_env {
                let trimmed_key = key.trim();
                if trimmed_key.is_empty() {
                    continue;
                }
                cmd.env(trimmed_key, value);
            }
        }

        let shell_name = crate::shell::detect::shell_name(&shell);
        let mut temp_dir: Option<PathBuf> = None;
        if let Some(init_cmd) = shell_init_command(shell_name) {
            temp_dir = apply_shell_init(&mut cmd, shell_name, &init_cmd)
                .map_err(|e| TerminalError::PtyCreateFailed { reason: e.to_string() })?;
        } else {
            #[cfg(unix)]
            cmd.arg("--login");
        }

        let child = pair
            .slave
            .spawn_command(cmd)
            .map_err(|e| TerminalError::PtyCreateFailed { reason: e.to_string() })?;
        let reader = pair
            .master
            .try_clone_reader()
            .map_err(|e| TerminalError::PtyCreateFailed { reason: e.to_string() })?;
        let writer = pair
            .master
            .take_writer()
            .map_err(|e| TerminalError::PtyCreateFailed { reason: e.to_string() })?;

        let mut session = Session::new(pair.master, child, writer, rows, cols);
        if let Some(dir) = temp_dir {
            session.set_temp_dir(dir);
        }

        Ok(SpawnResult { session, reader })
    }
}

/// Writes a temp-directory-scoped rc file that re-sources the user's own rc
/// and then runs the shell-integration hook, rather than mutating the real
/// dotfiles. Returns the temp directory so the caller can clean it up on
/// termination.
fn apply_shell_init(
    cmd: &mut CommandBuilder,
    shell_name: &str,
    init_cmd: &str,
) -> std::io::Result<Option<PathBuf>> {
    match shell_name {
        "zsh" => {
            let dir = create_shell_init_dir("zsh")?;
            let zshrc = format!(
                r#"
if [ -n "$HT_ORIG_ZDOTDIR" ] && [ -f "$HT_ORIG_ZDOTDIR/.zshrc" ]; then
  source "$HT_ORIG_ZDOTDIR/.zshrc"
elif [ -f "$HOME/.zshrc" ]; then
  source "$HOME/.zshrc"
fi
{init_cmd}
"#
            );
            let zprofile = r#"
if [ -n "$HT_ORIG_ZDOTDIR" ] && [ -f "$HT_ORIG_ZDOTDIR/.zprofile" ]; then
  source "$HT_ORIG_ZDOTDIR/.zprofile"
elif [ -f "$HOME/.zprofile" ]; then
  source "$HOME/.zprofile"
fi
"#;
            fs::write(dir.join(".zshrc"), zshrc)?;
            fs::write(dir.join(".zprofile"), zprofile)?;
            if let Ok(orig) = std::env::var("ZDOTDIR") {
                if !orig.is_empty() {
                    cmd.env("HT_ORIG_ZDOTDIR", orig);
                }
            }
            cmd.env("ZDOTDIR", dir.clone());
            cmd.arg("--login");
            Ok(Some(dir))
        }
        "bash" => {
            let dir = create_shell_init_dir("bash")?;
            let bashrc = format!(
                r#"
if [ -f "$HOME/.bash_profile" ]; then
  source "$HOME/.bash_profile"
elif [ -f "$HOME/.bash_login" ]; then
  source "$HOME/.bash_login"
elif [ -f "$HOME/.profile" ]; then
  source "$HOME/.profile"
fi
if [ -f "$HOME/.bashrc" ]; then
  source "$HOME/.bashrc"
fi
{init_cmd}
"#
            );
            let rc_path = dir.join("init.bashrc");
            fs::write(&rc_path, bashrc)?;
            cmd.arg("--noprofile");
            cmd.arg("--rcfile");
            cmd.arg(rc_path);
            Ok(Some(dir))
        }
        "fish" => {
            let dir = create_shell_init_dir("fish")?;
            let config_dir = dir.join("fish");
            fs::create_dir_all(&config_dir)?;
            fs::write(config_dir.join("config.fish"), init_cmd)?;
            cmd.env("XDG_CONFIG_HOME", &dir);
            Ok(Some(dir))
        }
        "pwsh" | "powershell" => {
            cmd.arg("-NoExit");
            cmd.arg("-Command");
            cmd.arg(init_cmd);
            Ok(None)
        }
        _ => {
            #[cfg(unix)]
            cmd.arg("--login");
            Ok(None)
        }
    }
}

fn create_shell_init_dir(shell_name: &str) -> std::io::Result<PathBuf> {
    let dir = std::env::temp_dir().join(format!("harborterm-shell-{}-{}", shell_name, Uuid::new_v4()));
    fs::create_dir_all(&dir)?;
    Ok(dir)
}
