//! Global hotkey subscription on a dedicated listener thread.
//!
//! The OS registration API is thread-affine: a binding must be created on
//! the same thread that later blocks waiting for its events. The first
//! successful `register` therefore spawns one listener thread; every later
//! registration is forwarded to it. Callbacks run synchronously on that
//! thread, so they must be cheap or hand off elsewhere themselves.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;

use crate::hotkey::{parse_hotkey, HotkeyError, ParsedHotkey};
use crate::logging;

pub type HotkeyId = i32;

type HotkeyCallback = Box<dyn FnMut() + Send>;

enum ListenerCmd {
    Register {
        spec: String,
        parsed: ParsedHotkey,
        callback: HotkeyCallback,
        reply: Sender<Result<HotkeyId, HotkeyError>>,
    },
    /// A synthetic trigger event, delivered on the listener thread like a
    /// native one. The portable backend has no OS events, so this is how its
    /// bindings fire at all.
    Trigger(HotkeyId),
    Stop,
}

struct ListenerHandle {
    cmds: Sender<ListenerCmd>,
    thread: JoinHandle<()>,
    #[cfg(target_os = "windows")]
    thread_id: u32,
}

impl ListenerHandle {
    #[cfg(target_os = "windows")]
    fn wake(&self) {
        use windows_sys::Win32::UI::WindowsAndMessaging::PostThreadMessageW;
        // WM_NULL: only purpose is unblocking GetMessageW so the command
        // queue gets drained.
        unsafe {
            PostThreadMessageW(self.thread_id, 0, 0, 0);
        }
    }

    #[cfg(not(target_os = "windows"))]
    fn wake(&self) {}
}

pub struct HotkeyListener {
    handle: Option<ListenerHandle>,
}

impl Default for HotkeyListener {
    fn default() -> Self {
        Self::new()
    }
}

impl HotkeyListener {
    pub fn new() -> Self {
        Self { handle: None }
    }

    /// Parses `spec` and registers it on the listener thread, starting the
    /// thread on first use. A bad spec fails synchronously with
    /// `UnknownBinding` and registers nothing.
    pub fn register(
        &mut self,
        spec: &str,
        callback: impl FnMut() + Send + 'static,
    ) -> Result<HotkeyId, HotkeyError> {
        let parsed = parse_hotkey(spec)?;
        let handle = self.ensure_started()?;

        let (reply_tx, reply_rx) = mpsc::channel();
        handle
            .cmds
            .send(ListenerCmd::Register {
                spec: spec.to_string(),
                parsed,
                callback: Box::new(callback),
                reply: reply_tx,
            })
            .map_err(|_| HotkeyError::ListenerStopped)?;
        handle.wake();

        reply_rx.recv().map_err(|_| HotkeyError::ListenerStopped)?
    }

    /// Injects a trigger event for `id`, as if the OS had reported the
    /// combo. The callback runs on the listener thread.
    pub fn trigger(&self, id: HotkeyId) {
        if let Some(handle) = &self.handle {
            if handle.cmds.send(ListenerCmd::Trigger(id)).is_ok() {
                handle.wake();
            }
        }
    }

    /// Unblocks the wait loop, unregisters every binding, and joins the
    /// listener thread. Idempotent.
    pub fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };

        let _ = handle.cmds.send(ListenerCmd::Stop);
        handle.wake();
        if handle.thread.join().is_err() {
            logging::error("hotkey listener thread panicked during shutdown");
        }
    }

    fn ensure_started(&mut self) -> Result<&ListenerHandle, HotkeyError> {
        if self.handle.is_none() {
            self.handle = Some(start_listener()?);
        }
        self.handle.as_ref().ok_or(HotkeyError::ListenerStopped)
    }
}

impl Drop for HotkeyListener {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(target_os = "windows")]
fn start_listener() -> Result<ListenerHandle, HotkeyError> {
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (ready_tx, ready_rx) = mpsc::channel();
    let thread = std::thread::spawn(move || listener_main(cmd_rx, ready_tx));
    let thread_id = ready_rx
        .recv()
        .map_err(|_| HotkeyError::RegistrationFailed("listener thread died on start".into()))?;

    Ok(ListenerHandle {
        cmds: cmd_tx,
        thread,
        thread_id,
    })
}

#[cfg(target_os = "windows")]
fn listener_main(cmds: Receiver<ListenerCmd>, ready: Sender<u32>) {
    use windows_sys::Win32::System::Threading::GetCurrentThreadId;
    use windows_sys::Win32::UI::Input::KeyboardAndMouse::{RegisterHotKey, UnregisterHotKey};
    use windows_sys::Win32::UI::WindowsAndMessaging::{
        DispatchMessageW, GetMessageW, PeekMessageW, TranslateMessage, MSG, PM_NOREMOVE, WM_HOTKEY,
    };

    // Touching the message queue once makes PostThreadMessageW to this
    // thread valid from here on.
    let mut msg: MSG = unsafe { std::mem::zeroed() };
    unsafe {
        PeekMessageW(&mut msg, std::ptr::null_mut(), 0, 0, PM_NOREMOVE);
    }
    let _ = ready.send(unsafe { GetCurrentThreadId() });

    let mut bindings: HashMap<HotkeyId, HotkeyCallback> = HashMap::new();
    let mut next_id: HotkeyId = 1;
    let mut stopping = false;

    loop {
        while let Ok(cmd) = cmds.try_recv() {
            match cmd {
                ListenerCmd::Register {
                    spec,
                    parsed,
                    callback,
                    reply,
                } => {
                    let id = next_id;
                    next_id += 1;
                    let ok = unsafe {
                        RegisterHotKey(
                            std::ptr::null_mut(),
                            id,
                            parsed.effective_modifiers(),
                            parsed.vk,
                        )
                    };
                    if ok == 0 {
                        let _ = reply.send(Err(HotkeyError::RegistrationFailed(format!(
                            "RegisterHotKey refused '{spec}'"
                        ))));
                        continue;
                    }
                    logging::info(&format!("hotkey '{spec}' registered as id={id}"));
                    bindings.insert(id, callback);
                    let _ = reply.send(Ok(id));
                }
                ListenerCmd::Trigger(id) => {
                    if let Some(callback) = bindings.get_mut(&id) {
                        callback();
                    }
                }
                ListenerCmd::Stop => stopping = true,
            }
        }
        if stopping {
            break;
        }

        let status = unsafe { GetMessageW(&mut msg, std::ptr::null_mut(), 0, 0) };
        if status == -1 {
            logging::error("hotkey wait loop failed: GetMessageW returned -1");
            break;
        }
        if status == 0 {
            break;
        }

        if msg.message == WM_HOTKEY {
            if let Some(callback) = bindings.get_mut(&(msg.wParam as HotkeyId)) {
                callback();
            }
        }

        unsafe {
            TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }

    for id in bindings.keys() {
        let ok = unsafe { UnregisterHotKey(std::ptr::null_mut(), *id) };
        if ok == 0 {
            logging::warn(&format!("hotkey id={id} was already unregistered"));
        }
    }
}

#[cfg(not(target_os = "windows"))]
fn start_listener() -> Result<ListenerHandle, HotkeyError> {
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let thread = std::thread::spawn(move || listener_main(cmd_rx));
    Ok(ListenerHandle {
        cmds: cmd_tx,
        thread,
    })
}

/// Portable backend: same binding table and delivery discipline, driven
/// entirely by injected `Trigger` events instead of an OS wait call.
#[cfg(not(target_os = "windows"))]
fn listener_main(cmds: Receiver<ListenerCmd>) {
    let mut bindings: HashMap<HotkeyId, HotkeyCallback> = HashMap::new();
    let mut next_id: HotkeyId = 1;

    while let Ok(cmd) = cmds.recv() {
        match cmd {
            ListenerCmd::Register {
                spec,
                parsed,
                callback,
                reply,
            } => {
                let id = next_id;
                next_id += 1;
                logging::info(&format!(
                    "hotkey '{spec}' registered as id={id} mods={:#06x} (portable)",
                    parsed.effective_modifiers()
                ));
                bindings.insert(id, callback);
                let _ = reply.send(Ok(id));
            }
            ListenerCmd::Trigger(id) => {
                if let Some(callback) = bindings.get_mut(&id) {
                    callback();
                }
            }
            ListenerCmd::Stop => break,
        }
    }

    bindings.clear();
}
