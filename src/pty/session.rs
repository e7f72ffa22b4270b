use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::Sender;
use parking_lot::Mutex;
use portable_pty::{Child, MasterPty, PtySize};

use crate::emulator::Emulator;
use crate::error::{Result, TerminalError};

/// Shared writer handle so both `Session::write_input` (keyboard/paste) and
/// the reader thread (DSR/DA responses) can write to the PTY.
pub type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

/// Shared slot for the child process exit code, written by the reader
/// thread once it observes EOF.
pub type SharedExitCode = Arc<Mutex<Option<i32>>>;

/// Shared child handle so the reader thread can reap it after EOF.
pub type SharedChild = Arc<Mutex<Box<dyn Child + Send + Sync>>>;

/// A live terminal session: PTY handle, writer, and the emulator owning
/// `State`. The reader thread runs the Parser-feed-then-apply step directly
/// against `emulator` under this same mutex (see the concurrency notes on
/// `reader::spawn_pty_threads`).
pub struct Session {
    master: Option<Box<dyn MasterPty + Send>>,
    child: SharedChild,
    writer: SharedWriter,
    pub emulator: Arc<Mutex<Emulator>>,
    running: Arc<AtomicBool>,
    render_waker: Option<Sender<()>>,
    reader_handle: Option<std::thread::JoinHandle<()>>,
    render_handle: Option<std::thread::JoinHandle<()>>,
    temp_dir: Option<std::path::PathBuf>,
    exit_code: SharedExitCode,
}

impl Session {
    pub fn new(
        master: Box<dyn MasterPty + Send>,
        child: Box<dyn Child + Send + Sync>,
        writer: Box<dyn Write + Send>,
        rows: u16,
        cols: u16,
    ) -> Self {
        Self {
            master: Some(master),
            child: Arc::new(Mutex::new(child)),
            writer: Arc::new(Mutex::new(writer)),
            emulator: Arc::new(Mutex::new(Emulator::new(rows, cols))),
            running: Arc::new(AtomicBool::new(true)),
            render_waker: None,
            reader_handle: None,
            render_handle: None,
            temp_dir: None,
            exit_code: Arc::new(Mutex::new(None)),
        }
    }

    pub fn emulator(&self) -> Arc<Mutex<Emulator>> {
        Arc::clone(&self.emulator)
    }

    pub fn writer(&self) -> SharedWriter {
        Arc::clone(&self.writer)
    }

    pub fn running(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn exit_code(&self) -> SharedExitCode {
        Arc::clone(&self.exit_code)
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Wake the render-pump thread; a no-op if no thread is attached yet or
    /// the session already stopped.
    pub fn notify_render(&self) {
        if let Some(waker) = &self.render_waker {
            let _ = waker.try_send(());
        }
    }

    /// Mark the whole active screen dirty so the next render pass emits a
    /// full frame, e.g. after a theme change on the renderer side.
    pub fn request_full_redraw(&self) {
        self.emulator.lock().state.mark_dirty();
        self.notify_render();
    }

    pub fn write_input(&self, data: &[u8]) -> Result<()> {
        if !self.is_running() {
            return Err(TerminalError::NotRunning);
        }
        let mut writer = self.writer.lock();
        writer
            .write_all(data)
            .map_err(|e| TerminalError::WriteFailed { reason: e.to_string() })?;
        writer
            .flush()
            .map_err(|e| TerminalError::WriteFailed { reason: e.to_string() })
    }

    /// Resizes the grid before the PTY, so the reader thread never processes
    /// bytes arriving post-SIGWINCH against stale dimensions.
    pub fn resize(&self, rows: u16, cols: u16) -> Result<()> {
        if !self.is_running() {
            return Err(TerminalError::NotRunning);
        }
        let mut emu = self.emulator.lock();
        emu.state.resize(rows, cols);
        self.master
            .as_ref()
            .ok_or(TerminalError::NotRunning)?
            .resize(PtySize {
                rows,
                cols,
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(|e| TerminalError::ResizeFailed { reason: e.to_string() })?;
        drop(emu);
        self.notify_render();
        Ok(())
    }

    /// Sends `sig` to the child's process group. Non-fatal: failures are
    /// reported, not propagated as a fatal session error.
    #[cfg(unix)]
    pub fn send_signal(&self, sig: i32) -> Result<()> {
        if !self.is_running() {
            return Err(TerminalError::NotRunning);
        }
        let pid = self
            .child
            .lock()
            .process_id()
            .ok_or_else(|| TerminalError::SignalFailed { reason: "no pid".into() })?;
        let ret = unsafe { libc::kill(-(pid as i32), sig) };
        if ret != 0 {
            return Err(TerminalError::SignalFailed {
                reason: std::io::Error::last_os_error().to_string(),
            });
        }
        Ok(())
    }

    #[cfg(unix)]
    pub fn interrupt(&self) -> Result<()> {
        self.send_signal(libc::SIGINT)
    }

    #[cfg(unix)]
    pub fn suspend(&self) -> Result<()> {
        self.send_signal(libc::SIGTSTP)
    }

    #[cfg(unix)]
    pub fn quit(&self) -> Result<()> {
        self.send_signal(libc::SIGQUIT)
    }

    pub fn eof(&self) -> Result<()> {
        self.write_input(&[0x04])
    }

    pub fn set_temp_dir(&mut self, path: std::path::PathBuf) {
        self.temp_dir = Some(path);
    }

    pub fn set_thread_handles(
        &mut self,
        reader: std::thread::JoinHandle<()>,
        render: std::thread::JoinHandle<()>,
        render_waker: Sender<()>,
    ) {
        self.reader_handle = Some(reader);
        self.render_handle = Some(render);
        self.render_waker = Some(render_waker);
    }

    /// Terminates the session: SIGHUP, grace window, then SIGKILL. Closes
    /// the master FD so the reader thread's blocking read unblocks on EOF.
    /// Idempotent — safe to call more than once (e.g. via `Drop`).
    pub fn terminate(&mut self) {
        if !self.running.swap(false, Ordering::AcqRel) && self.master.is_none() {
            return;
        }
        self.notify_render();

        {
            let mut child = self.child.lock();
            let pid = child.process_id();
            let _ = child.kill();

            let deadline = std::time::Instant::now() + std::time::Duration::from_millis(100);
            let mut exited = false;
            while std::time::Instant::now() < deadline {
                if let Ok(Some(_)) = child.try_wait() {
                    exited = true;
                    break;
                }
                std::thread::sleep(std::time::Duration::from_millis(10));
            }

            if !exited {
                if let Some(raw_pid) = pid {
                    #[cfg(unix)]
                    unsafe {
                        libc::kill(-(raw_pid as i32), libc::SIGKILL);
                        libc::kill(raw_pid as i32, libc::SIGKILL);
                    }
                }
                let _ = child.try_wait();
            }
        }

        drop(self.master.take());

        if let Some(handle) = self.reader_handle.take() {
            let _ = handle.join();
        }
        if let Some(handle) = self.render_handle.take() {
            let _ = handle.join();
        }
        self.render_waker = None;

        if let Some(dir) = self.temp_dir.take() {
            let _ = std::fs::remove_dir_all(&dir);
        }
    }

    pub fn try_wait(&self) -> Option<portable_pty::ExitStatus> {
        self.child.lock().try_wait().ok().flatten()
    }

    pub fn child(&self) -> SharedChild {
        Arc::clone(&self.child)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.terminate();
    }
}
