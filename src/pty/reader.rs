use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Sender};
use parking_lot::Mutex;

use crate::emulator::Emulator;
use crate::parser::Parser;

use super::session::{SharedChild, SharedExitCode, SharedWriter};

const FRAME_TICK: Duration = Duration::from_millis(16);

/// Handles for the reader and render-pump threads.
pub struct PtyThreadHandles {
    pub reader: std::thread::JoinHandle<()>,
    pub render_pump: std::thread::JoinHandle<()>,
    pub render_waker: Sender<()>,
}

/// Spawns the reader and render-pump threads for a session.
///
/// The reader thread owns the PTY read side: it reads up to 4 KiB at a
/// time, feeds the bytes straight through the Parser, and applies the
/// resulting events to `emulator` under its mutex on the same thread (the
/// Reader/Emulator fusion — there is no channel hop between decoding a byte
/// and mutating State, since both happen synchronously on this thread
/// anyway). DSR/DA/DECRPM replies queued by the emulator are flushed back
/// to the PTY immediately after each read.
///
/// The render-pump thread is a separate thread that wakes on `render_waker`
/// sends, coalesces bursts into one call per tick, and invokes `on_frame`
/// — the caller's hook for redraw scheduling. It carries no renderer
/// payload itself; the renderer reads `emulator.lock().state` directly.
pub fn spawn_pty_threads(
    mut reader: Box<dyn Read + Send>,
    emulator: Arc<Mutex<Emulator>>,
    writer: SharedWriter,
    child: SharedChild,
    exit_code: SharedExitCode,
    running: Arc<AtomicBool>,
    on_frame: impl Fn() + Send + 'static,
    on_session_end: impl FnOnce(Option<i32>) + Send + 'static,
) -> PtyThreadHandles {
    let (render_waker, render_rx) = bounded::<()>(1);

    let reader_emulator = Arc::clone(&emulator);
    let reader_writer = Arc::clone(&writer);
    let reader_child = Arc::clone(&child);
    let reader_exit_code = Arc::clone(&exit_code);
    let reader_running = Arc::clone(&running);
    let reader_waker = render_waker.clone();

    let reader_thread = std::thread::Builder::new()
        .name("pty-reader".into())
        .spawn(move || {
            let mut parser = Parser::new();
            let mut buf = [0u8; 4096];

            while reader_running.load(Ordering::Acquire) {
                match reader.read(&mut buf) {
                    Ok(0) => {
                        tracing::info!("pty reader got EOF");
                        if let Ok(Some(status)) = reader_child.lock().try_wait() {
                            let code = status.exit_code() as i32;
                            *reader_exit_code.lock() = Some(code);
                            tracing::info!(exit_code = code, "session exited");
                        }
                        reader_running.store(false, Ordering::Release);
                        let _ = reader_waker.try_send(());
                        break;
                    }
                    Ok(n) => {
                        let mut events = Vec::new();
                        parser.feed(&buf[..n], &mut |e| events.push(e));

                        let mut emu = reader_emulator.lock();
                        for event in events {
                            emu.apply(event);
                        }
                        let responses = emu.state.take_pending_responses();
                        drop(emu);

                        if !responses.is_empty() {
                            let mut w = reader_writer.lock();
                            for resp in &responses {
                                let _ = w.write_all(resp);
                            }
                            let _ = w.flush();
                        }
                        let _ = reader_waker.try_send(());
                    }
                    Err(e) => {
                        if reader_running.load(Ordering::Acquire) {
                            tracing::error!(error = %e, "pty read error");
                        }
                        if let Ok(Some(status)) = reader_child.lock().try_wait() {
                            *reader_exit_code.lock() = Some(status.exit_code() as i32);
                        }
                        reader_running.store(false, Ordering::Release);
                        let _ = reader_waker.try_send(());
                        break;
                    }
                }
            }
        })
        .expect("failed to spawn pty reader thread");

    let render_running = Arc::clone(&running);
    let render_exit_code = Arc::clone(&exit_code);

    let render_pump = std::thread::Builder::new()
        .name("pty-render-pump".into())
        .spawn(move || {
            let mut last_emit = Instant::now() - FRAME_TICK;

            while render_running.load(Ordering::Acquire) {
                if render_rx.recv().is_err() {
                    break;
                }
                if !render_running.load(Ordering::Acquire) {
                    break;
                }

                let elapsed = last_emit.elapsed();
                if elapsed < FRAME_TICK {
                    std::thread::sleep(FRAME_TICK - elapsed);
                }
                while render_rx.try_recv().is_ok() {}

                on_frame();
                last_emit = Instant::now();
            }

            on_frame();
            let captured_exit_code = render_exit_code.lock().take();
            on_session_end(captured_exit_code);
        })
        .expect("failed to spawn pty render-pump thread");

    PtyThreadHandles {
        reader: reader_thread,
        render_pump,
        render_waker,
    }
}
