use std::fmt::{Display, Formatter};

pub const MOD_ALT: u32 = 0x0001;
pub const MOD_CONTROL: u32 = 0x0002;
pub const MOD_SHIFT: u32 = 0x0004;
pub const MOD_WIN: u32 = 0x0008;
/// A held key fires the binding once, not per auto-repeat tick. Applied to
/// every registration.
pub const MOD_NOREPEAT: u32 = 0x4000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HotkeyError {
    /// The combo spec names a modifier or key we do not know. Returned
    /// synchronously from parsing; nothing is registered.
    UnknownBinding(String),
    /// The OS refused the registration (typically the combo is owned by
    /// another process). That binding never fires; others are unaffected.
    RegistrationFailed(String),
    /// The listener is no longer running.
    ListenerStopped,
}

impl Display for HotkeyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownBinding(spec) => write!(f, "unknown hotkey binding: {spec}"),
            Self::RegistrationFailed(detail) => write!(f, "hotkey registration failed: {detail}"),
            Self::ListenerStopped => write!(f, "hotkey listener stopped"),
        }
    }
}

impl std::error::Error for HotkeyError {}

/// A combo spec resolved to OS modifier flags and a virtual-key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedHotkey {
    pub modifiers: u32,
    pub vk: u32,
}

impl ParsedHotkey {
    /// Flags actually handed to the OS: the parsed modifiers plus the
    /// mandatory no-repeat flag.
    pub fn effective_modifiers(&self) -> u32 {
        self.modifiers | MOD_NOREPEAT
    }
}

/// Parses `modifier+...+key`, case-insensitive. Modifiers: alt, ctrl/control,
/// shift, win. Keys: a-z, 0-9, f1-f12, space, enter, escape, tab.
pub fn parse_hotkey(spec: &str) -> Result<ParsedHotkey, HotkeyError> {
    let lowered = spec.trim().to_ascii_lowercase();
    let parts: Vec<&str> = lowered.split('+').map(str::trim).collect();
    if parts.len() < 2 {
        return Err(HotkeyError::UnknownBinding(format!(
            "'{spec}' must combine at least one modifier with a key"
        )));
    }

    let key_name = parts[parts.len() - 1];
    let vk = virtual_key(key_name).ok_or_else(|| {
        HotkeyError::UnknownBinding(format!("'{spec}' has unknown key '{key_name}'"))
    })?;

    let mut modifiers = 0_u32;
    for name in &parts[..parts.len() - 1] {
        let flag = modifier_flag(name).ok_or_else(|| {
            HotkeyError::UnknownBinding(format!("'{spec}' has unknown modifier '{name}'"))
        })?;
        modifiers |= flag;
    }

    Ok(ParsedHotkey { modifiers, vk })
}

fn modifier_flag(name: &str) -> Option<u32> {
    match name {
        "alt" => Some(MOD_ALT),
        "ctrl" | "control" => Some(MOD_CONTROL),
        "shift" => Some(MOD_SHIFT),
        "win" => Some(MOD_WIN),
        _ => None,
    }
}

fn virtual_key(name: &str) -> Option<u32> {
    match name {
        "space" => return Some(0x20),
        "enter" => return Some(0x0D),
        "escape" => return Some(0x1B),
        "tab" => return Some(0x09),
        _ => {}
    }

    let bytes = name.as_bytes();
    if bytes.len() == 1 {
        let b = bytes[0];
        if b.is_ascii_lowercase() {
            return Some(0x41 + (b - b'a') as u32);
        }
        if b.is_ascii_digit() {
            return Some(b as u32);
        }
        return None;
    }

    if let Some(number) = name.strip_prefix('f') {
        if let Ok(n) = number.parse::<u32>() {
            if (1..=12).contains(&n) {
                return Some(0x70 + n - 1);
            }
        }
    }

    None
}
