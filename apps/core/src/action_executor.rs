//! Maps an activated result row to its side effect. The plan step is pure
//! (driven by the item's kind tag alone) so the routing is testable without
//! launching anything; the execute step does the actual work.

use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

#[allow(unused_imports)]
use crate::logging;
use crate::model::{ResultItem, ResultKind};

#[derive(Debug)]
pub enum ActivationError {
    EmptyPath,
    MissingPath(PathBuf),
    Command(String),
    Clipboard(String),
    UnknownSystemCommand(String),
    UnsupportedPlatform,
}

impl Display for ActivationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPath => write!(f, "empty path"),
            Self::MissingPath(path) => write!(f, "path does not exist: {}", path.display()),
            Self::Command(detail) => write!(f, "command error: {detail}"),
            Self::Clipboard(detail) => write!(f, "clipboard error: {detail}"),
            Self::UnknownSystemCommand(name) => write!(f, "unknown system command: {name}"),
            Self::UnsupportedPlatform => write!(f, "unsupported platform"),
        }
    }
}

impl std::error::Error for ActivationError {}

/// What activating a row should do. `None` covers rows that exist only to
/// be read, like plugin error messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    Launch { path: String },
    CopyText { text: String },
    RunSystemCommand { command: String },
    None,
}

pub fn activation_for(item: &ResultItem) -> Activation {
    match item.kind {
        ResultKind::App | ResultKind::File => Activation::Launch {
            path: item.payload.clone(),
        },
        ResultKind::PluginResult => Activation::CopyText {
            text: item.payload.clone(),
        },
        ResultKind::SystemCommand => Activation::RunSystemCommand {
            command: item.payload.clone(),
        },
        // Trigger rows are consumed by the mode controller before they get
        // here; an error row has nothing to do.
        ResultKind::PluginTrigger | ResultKind::PluginError => Activation::None,
    }
}

pub fn execute(activation: &Activation) -> Result<(), ActivationError> {
    match activation {
        Activation::Launch { path } => launch_path(path),
        Activation::CopyText { text } => copy_text(text),
        Activation::RunSystemCommand { command } => run_system_command(command),
        Activation::None => Ok(()),
    }
}

pub fn launch_path(path: &str) -> Result<(), ActivationError> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Err(ActivationError::EmptyPath);
    }

    let candidate = Path::new(trimmed);
    if !candidate.exists() {
        return Err(ActivationError::MissingPath(candidate.to_path_buf()));
    }

    open_with_shell(trimmed)
}

pub fn copy_text(text: &str) -> Result<(), ActivationError> {
    let mut clipboard =
        arboard::Clipboard::new().map_err(|error| ActivationError::Clipboard(error.to_string()))?;
    clipboard
        .set_text(text.to_string())
        .map_err(|error| ActivationError::Clipboard(error.to_string()))
}

#[cfg(target_os = "windows")]
fn open_with_shell(target: &str) -> Result<(), ActivationError> {
    let status = std::process::Command::new("cmd")
        .arg("/C")
        .arg("start")
        .arg("")
        .arg(target)
        .status()
        .map_err(|error| ActivationError::Command(error.to_string()))?;
    if !status.success() {
        return Err(ActivationError::Command(format!(
            "start exited with status {status} for '{target}'"
        )));
    }
    Ok(())
}

#[cfg(not(target_os = "windows"))]
fn open_with_shell(target: &str) -> Result<(), ActivationError> {
    // Launching is a Windows concern; elsewhere the validated path is left
    // to the embedding shell.
    logging::info(&format!("launch requested for '{target}' (no-op off windows)"));
    Ok(())
}

#[cfg(target_os = "windows")]
pub fn run_system_command(command: &str) -> Result<(), ActivationError> {
    match command {
        "lock" => spawn_checked("rundll32.exe", &["user32.dll,LockWorkStation"]),
        "sleep" => spawn_checked("rundll32.exe", &["powrprof.dll,SetSuspendState", "0,1,0"]),
        "empty" => empty_recycle_bin(),
        "shutdown" => spawn_checked("shutdown", &["/s", "/t", "0"]),
        "restart" => spawn_checked("shutdown", &["/r", "/t", "0"]),
        other => Err(ActivationError::UnknownSystemCommand(other.to_string())),
    }
}

#[cfg(not(target_os = "windows"))]
pub fn run_system_command(command: &str) -> Result<(), ActivationError> {
    match command {
        "lock" | "sleep" | "empty" | "shutdown" | "restart" => {
            Err(ActivationError::UnsupportedPlatform)
        }
        other => Err(ActivationError::UnknownSystemCommand(other.to_string())),
    }
}

#[cfg(target_os = "windows")]
fn spawn_checked(program: &str, args: &[&str]) -> Result<(), ActivationError> {
    std::process::Command::new(program)
        .args(args)
        .spawn()
        .map(|_| ())
        .map_err(|error| ActivationError::Command(format!("{program} failed: {error}")))
}

#[cfg(target_os = "windows")]
fn empty_recycle_bin() -> Result<(), ActivationError> {
    use windows_sys::Win32::UI::Shell::{
        SHEmptyRecycleBinW, SHERB_NOCONFIRMATION, SHERB_NOPROGRESSUI, SHERB_NOSOUND,
    };

    let status = unsafe {
        SHEmptyRecycleBinW(
            std::ptr::null_mut(),
            std::ptr::null(),
            SHERB_NOCONFIRMATION | SHERB_NOPROGRESSUI | SHERB_NOSOUND,
        )
    };
    if status != 0 {
        return Err(ActivationError::Command(format!(
            "SHEmptyRecycleBinW returned {status:#x}"
        )));
    }
    Ok(())
}
