//! Run-on-startup toggle, backed by the HKCU Run key on Windows.

use std::fmt::{Display, Formatter};
use std::path::Path;

#[derive(Debug)]
pub enum StartupError {
    Io(std::io::Error),
    Command(String),
    UnsupportedPlatform,
}

impl Display for StartupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(error) => write!(f, "io error: {error}"),
            Self::Command(error) => write!(f, "command error: {error}"),
            Self::UnsupportedPlatform => write!(f, "unsupported platform"),
        }
    }
}

impl std::error::Error for StartupError {}

impl From<std::io::Error> for StartupError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

#[cfg(target_os = "windows")]
const RUN_SUBKEY: &str = r"Software\Microsoft\Windows\CurrentVersion\Run";
#[cfg(target_os = "windows")]
const VALUE_NAME: &str = "Quickbar";
pub const STARTUP_ARG: &str = "--background";

/// The command line written into the Run key: quoted executable plus the
/// background flag so a boot-time launch does not pop the surface.
pub fn startup_command_for_executable(executable_path: &Path) -> Result<String, StartupError> {
    if executable_path.as_os_str().is_empty() {
        return Err(StartupError::Command("executable path is empty".to_string()));
    }
    if !executable_path.is_file() {
        return Err(StartupError::Command(format!(
            "executable path is not a file: {}",
            executable_path.display()
        )));
    }

    Ok(format!(
        "\"{}\" {}",
        executable_path.to_string_lossy(),
        STARTUP_ARG
    ))
}

#[cfg(target_os = "windows")]
pub fn is_enabled() -> Result<bool, StartupError> {
    use windows_sys::Win32::Foundation::{ERROR_FILE_NOT_FOUND, ERROR_SUCCESS};
    use windows_sys::Win32::System::Registry::{
        RegQueryValueExW, KEY_QUERY_VALUE,
    };

    let key = match open_run_key(KEY_QUERY_VALUE, false)? {
        Some(key) => key,
        None => return Ok(false),
    };

    let value_name = to_wide(VALUE_NAME);
    let mut value_type = 0_u32;
    let mut size = 0_u32;
    let status = unsafe {
        RegQueryValueExW(
            key.0,
            value_name.as_ptr(),
            std::ptr::null(),
            &mut value_type,
            std::ptr::null_mut(),
            &mut size,
        )
    };

    if status == ERROR_FILE_NOT_FOUND {
        return Ok(false);
    }
    if status != ERROR_SUCCESS {
        return Err(registry_error("query run value", status));
    }
    Ok(true)
}

#[cfg(target_os = "windows")]
pub fn set_enabled(enabled: bool, executable_path: &Path) -> Result<(), StartupError> {
    use windows_sys::Win32::Foundation::{ERROR_FILE_NOT_FOUND, ERROR_SUCCESS};
    use windows_sys::Win32::System::Registry::{
        RegDeleteValueW, RegSetValueExW, KEY_SET_VALUE, REG_SZ,
    };

    let value_name = to_wide(VALUE_NAME);

    if enabled {
        let command = startup_command_for_executable(executable_path)?;
        let key = open_run_key(KEY_SET_VALUE, true)?
            .ok_or_else(|| StartupError::Command("run key unavailable".to_string()))?;
        let command_wide = to_wide(&command);
        let status = unsafe {
            RegSetValueExW(
                key.0,
                value_name.as_ptr(),
                0,
                REG_SZ,
                command_wide.as_ptr() as *const u8,
                (command_wide.len() * std::mem::size_of::<u16>()) as u32,
            )
        };
        if status != ERROR_SUCCESS {
            return Err(registry_error("set run value", status));
        }
        return Ok(());
    }

    let key = match open_run_key(KEY_SET_VALUE, false)? {
        Some(key) => key,
        None => return Ok(()),
    };
    let status = unsafe { RegDeleteValueW(key.0, value_name.as_ptr()) };
    if status == ERROR_SUCCESS || status == ERROR_FILE_NOT_FOUND {
        return Ok(());
    }
    Err(registry_error("delete run value", status))
}

#[cfg(not(target_os = "windows"))]
pub fn is_enabled() -> Result<bool, StartupError> {
    Err(StartupError::UnsupportedPlatform)
}

#[cfg(not(target_os = "windows"))]
pub fn set_enabled(_enabled: bool, _executable_path: &Path) -> Result<(), StartupError> {
    Err(StartupError::UnsupportedPlatform)
}

#[cfg(target_os = "windows")]
struct RunKey(windows_sys::Win32::System::Registry::HKEY);

#[cfg(target_os = "windows")]
impl Drop for RunKey {
    fn drop(&mut self) {
        unsafe {
            windows_sys::Win32::System::Registry::RegCloseKey(self.0);
        }
    }
}

/// Opens (or creates, when `create` is set) the HKCU Run key. `Ok(None)`
/// means the key does not exist and was not asked for.
#[cfg(target_os = "windows")]
fn open_run_key(access: u32, create: bool) -> Result<Option<RunKey>, StartupError> {
    use windows_sys::Win32::Foundation::{ERROR_FILE_NOT_FOUND, ERROR_SUCCESS};
    use windows_sys::Win32::System::Registry::{
        RegCreateKeyExW, RegOpenKeyExW, HKEY_CURRENT_USER,
    };

    let subkey = to_wide(RUN_SUBKEY);
    let mut key = std::ptr::null_mut();

    let status = if create {
        unsafe {
            RegCreateKeyExW(
                HKEY_CURRENT_USER,
                subkey.as_ptr(),
                0,
                std::ptr::null(),
                0,
                access,
                std::ptr::null(),
                &mut key,
                std::ptr::null_mut(),
            )
        }
    } else {
        unsafe { RegOpenKeyExW(HKEY_CURRENT_USER, subkey.as_ptr(), 0, access, &mut key) }
    };

    if !create && status == ERROR_FILE_NOT_FOUND {
        return Ok(None);
    }
    if status != ERROR_SUCCESS {
        return Err(registry_error("open run key", status));
    }
    Ok(Some(RunKey(key)))
}

#[cfg(target_os = "windows")]
fn to_wide(value: &str) -> Vec<u16> {
    value.encode_utf16().chain(std::iter::once(0)).collect()
}

#[cfg(target_os = "windows")]
fn registry_error(action: &str, status: u32) -> StartupError {
    StartupError::Command(format!("{action} failed with code {status}"))
}
