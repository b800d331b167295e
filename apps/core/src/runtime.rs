use std::fmt::{Display, Formatter};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};

use crate::app_index::{AppIndex, AppIndexSource};
use crate::config_store::{self, ConfigStore};
use crate::dispatcher::{QueryDispatcher, ResultBatch};
use crate::events::{CoreEvent, SurfaceSignal};
use crate::file_search::FileSearchSource;
use crate::hotkey::HotkeyError;
use crate::hotkey_listener::{HotkeyId, HotkeyListener};
use crate::index_store;
use crate::logging;
use crate::mode::ModeController;
use crate::plugins::builtin_plugins;
use crate::registry::PluginRegistry;
use crate::source::{PluginTriggerSource, SearchSource};
use crate::startup;

#[derive(Debug)]
pub enum RuntimeError {
    Instance(String),
}

impl Display for RuntimeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Instance(error) => write!(f, "single instance guard failed: {error}"),
        }
    }
}

impl std::error::Error for RuntimeError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RuntimeOptions {
    /// Set when launched from the Run key at boot: stay resident without
    /// announcing anything.
    pub background: bool,
}

pub fn parse_cli_args(args: &[String]) -> Result<RuntimeOptions, String> {
    let mut options = RuntimeOptions::default();
    for arg in args {
        if arg == startup::STARTUP_ARG {
            options.background = true;
        } else {
            return Err(format!("unknown argument: {arg}"));
        }
    }
    Ok(options)
}

/// The assembled core: every component constructed once and wired through
/// explicit handles. The embedding shell feeds query text and key events
/// into `controller` and drains `events` for everything it must render.
pub struct Core {
    pub config: Arc<ConfigStore>,
    pub registry: Arc<PluginRegistry>,
    pub dispatcher: Arc<QueryDispatcher>,
    pub controller: ModeController,
    pub app_index: Arc<AppIndex>,
    pub events: Receiver<CoreEvent>,
    pub notifier: Sender<CoreEvent>,
}

pub fn assemble_core(config: Arc<ConfigStore>) -> Core {
    let registry = Arc::new(PluginRegistry::load(builtin_plugins(), Arc::clone(&config)));
    let app_index = Arc::new(AppIndex::new());
    let (events_tx, events_rx) = channel();

    // Source order is the merge order: trigger row first, then locally
    // known launchable apps, then the file sweep.
    let sources: Vec<Arc<dyn SearchSource>> = vec![
        Arc::new(PluginTriggerSource::new(Arc::clone(&registry))),
        Arc::new(AppIndexSource::new(Arc::clone(&app_index))),
        Arc::new(FileSearchSource::new(config.max_results())),
    ];

    let delivery_tx = Mutex::new(events_tx.clone());
    let dispatcher = Arc::new(QueryDispatcher::new(
        sources,
        Arc::new(move |batch: ResultBatch| {
            if let Ok(tx) = delivery_tx.lock() {
                let _ = tx.send(CoreEvent::Results {
                    query: batch.query,
                    items: batch.items,
                });
            }
        }),
    ));

    let controller = ModeController::new(
        Arc::clone(&dispatcher),
        Arc::clone(&registry),
        events_tx.clone(),
    );

    Core {
        config,
        registry,
        dispatcher,
        controller,
        app_index,
        events: events_rx,
        notifier: events_tx,
    }
}

pub fn run_with_options(options: RuntimeOptions) -> Result<(), RuntimeError> {
    if let Err(error) = logging::init() {
        eprintln!("[quickbar-core] logging unavailable: {error}");
    }

    let config = Arc::new(ConfigStore::open(ConfigStore::default_path()));
    logging::info(&format!(
        "startup mode={} background={} hotkey={} config_path={}",
        runtime_mode(),
        options.background,
        config.hotkey(),
        config.path().display(),
    ));

    #[cfg(target_os = "windows")]
    let _single_instance = {
        let guard = acquire_single_instance_guard().map_err(RuntimeError::Instance)?;
        if guard.is_none() {
            logging::info("launcher already active; exiting duplicate process");
            return Ok(());
        }
        guard
    };

    let core = assemble_core(Arc::clone(&config));
    for warning in core.registry.load_warnings() {
        logging::warn(warning);
    }

    warm_start_app_index(&core.app_index);
    spawn_app_index_rescan(Arc::clone(&core.app_index));

    let mut listener = HotkeyListener::new();
    register_toggle_hotkey(&mut listener, &config.hotkey(), core.notifier.clone());

    #[cfg(target_os = "windows")]
    {
        run_event_loop(&core.events);
    }

    #[cfg(not(target_os = "windows"))]
    {
        logging::info("portable runtime mode: no global hotkey loop; core wired and exiting");
    }

    listener.stop();
    drop(core);
    Ok(())
}

fn runtime_mode() -> &'static str {
    #[cfg(target_os = "windows")]
    {
        "windows-hotkey-runtime"
    }

    #[cfg(not(target_os = "windows"))]
    {
        "portable-noop"
    }
}

/// Registers the configured toggle combo. A spec the parser rejects falls
/// back to the default combo; an OS refusal is logged and the launcher
/// stays resident with whatever bindings did succeed (possibly none).
fn register_toggle_hotkey(listener: &mut HotkeyListener, spec: &str, notifier: Sender<CoreEvent>) {
    const FALLBACK: &str = "alt+q";

    match register_toggle(listener, spec, notifier.clone()) {
        Ok(id) => logging::info(&format!("toggle hotkey '{spec}' active (id={id})")),
        Err(HotkeyError::UnknownBinding(detail)) if spec != FALLBACK => {
            logging::warn(&format!(
                "configured hotkey rejected ({detail}); falling back to '{FALLBACK}'"
            ));
            match register_toggle(listener, FALLBACK, notifier) {
                Ok(id) => logging::info(&format!("toggle hotkey '{FALLBACK}' active (id={id})")),
                Err(error) => {
                    logging::error(&format!("toggle hotkey '{FALLBACK}' unavailable: {error}"));
                }
            }
        }
        Err(error) => {
            logging::error(&format!("toggle hotkey '{spec}' unavailable: {error}"));
        }
    }
}

fn register_toggle(
    listener: &mut HotkeyListener,
    spec: &str,
    notifier: Sender<CoreEvent>,
) -> Result<HotkeyId, HotkeyError> {
    let toggle_tx = Mutex::new(notifier);
    listener.register(spec, move || {
        if let Ok(tx) = toggle_tx.lock() {
            let _ = tx.send(CoreEvent::Surface(SurfaceSignal::Toggle));
        }
    })
}

fn warm_start_app_index(app_index: &Arc<AppIndex>) {
    match index_store::open_at(&app_index_db_path()) {
        Ok(db) => match index_store::load_all(&db) {
            Ok(entries) if !entries.is_empty() => {
                logging::info(&format!("warm start with {} cached app(s)", entries.len()));
                app_index.replace(entries);
            }
            Ok(_) => {}
            Err(error) => logging::warn(&format!("app index cache unreadable: {error}")),
        },
        Err(error) => logging::warn(&format!("app index cache unavailable: {error}")),
    }
}

fn spawn_app_index_rescan(app_index: Arc<AppIndex>) {
    std::thread::spawn(move || {
        let count = app_index.rescan();
        logging::info(&format!("app index rescan complete: {count} entries"));

        match index_store::open_at(&app_index_db_path()) {
            Ok(mut db) => {
                if let Err(error) = index_store::replace_all(&mut db, &app_index.snapshot()) {
                    logging::warn(&format!("app index cache write failed: {error}"));
                }
            }
            Err(error) => logging::warn(&format!("app index cache unavailable: {error}")),
        }
    });
}

/// Drains core events until the process is torn down. The presentation
/// surface is an external collaborator; this loop is the seam it attaches
/// to, and without one the events are logged and dropped.
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
fn run_event_loop(events: &Receiver<CoreEvent>) {
    while let Ok(event) = events.recv() {
        match event {
            CoreEvent::Results { query, items } => {
                logging::info(&format!("results ready: {} item(s) for '{query}'", items.len()));
            }
            CoreEvent::Mode(signal) => logging::info(&format!("mode changed: {signal:?}")),
            CoreEvent::Surface(signal) => logging::info(&format!("surface signal: {signal:?}")),
        }
    }
}

fn app_index_db_path() -> std::path::PathBuf {
    config_store::app_data_dir().join("apps.sqlite3")
}

#[cfg(target_os = "windows")]
struct SingleInstanceGuard {
    handle: windows_sys::Win32::Foundation::HANDLE,
}

#[cfg(target_os = "windows")]
impl Drop for SingleInstanceGuard {
    fn drop(&mut self) {
        unsafe {
            windows_sys::Win32::Foundation::CloseHandle(self.handle);
        }
    }
}

#[cfg(target_os = "windows")]
fn acquire_single_instance_guard() -> Result<Option<SingleInstanceGuard>, String> {
    use windows_sys::Win32::Foundation::GetLastError;
    use windows_sys::Win32::System::Threading::CreateMutexW;

    const ERROR_ALREADY_EXISTS: u32 = 183;

    let mutex_name: Vec<u16> = "Local\\QuickbarRuntimeSingleton"
        .encode_utf16()
        .chain(std::iter::once(0))
        .collect();
    let handle = unsafe { CreateMutexW(std::ptr::null(), 0, mutex_name.as_ptr()) };
    if handle.is_null() {
        let error = unsafe { GetLastError() };
        return Err(format!("CreateMutexW failed with error {error}"));
    }

    if unsafe { GetLastError() } == ERROR_ALREADY_EXISTS {
        unsafe {
            windows_sys::Win32::Foundation::CloseHandle(handle);
        }
        return Ok(None);
    }

    Ok(Some(SingleInstanceGuard { handle }))
}

#[cfg(test)]
mod tests {
    use super::{parse_cli_args, RuntimeOptions};

    #[test]
    fn background_flag_is_recognized() {
        let options = parse_cli_args(&["--background".to_string()]).unwrap();
        assert_eq!(options, RuntimeOptions { background: true });
    }

    #[test]
    fn no_args_means_foreground() {
        assert_eq!(parse_cli_args(&[]).unwrap(), RuntimeOptions::default());
    }

    #[test]
    fn unknown_argument_is_rejected() {
        assert!(parse_cli_args(&["--verbose".to_string()]).is_err());
    }
}
