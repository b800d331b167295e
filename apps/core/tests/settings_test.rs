use std::time::{SystemTime, UNIX_EPOCH};

use quickbar_core::config_store::ConfigStore;
use quickbar_core::settings::{SettingsDraft, SettingsError};

fn temp_store(label: &str) -> ConfigStore {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    ConfigStore::open(std::env::temp_dir().join(format!("quickbar-settings-{label}-{unique}.json")))
}

#[test]
fn draft_starts_from_the_stored_values() {
    let store = temp_store("from-store");
    store.set_hotkey("ctrl+shift+o").unwrap();

    let draft = SettingsDraft::from_store(&store);
    assert_eq!(draft.hotkey, "ctrl+shift+o");
    assert_eq!(draft.max_results, 20);
}

#[test]
fn invalid_hotkey_spec_fails_validation() {
    let mut draft = SettingsDraft::from_store(&temp_store("bad-hotkey"));
    draft.hotkey = "nope+q".to_string();
    assert!(matches!(
        draft.validate(),
        Err(SettingsError::InvalidHotkey(_))
    ));
}

#[test]
fn out_of_range_max_results_fails_validation() {
    let mut draft = SettingsDraft::from_store(&temp_store("bad-range"));
    draft.max_results = 0;
    assert!(matches!(
        draft.validate(),
        Err(SettingsError::MaxResultsOutOfRange(0))
    ));
}

#[cfg(not(target_os = "windows"))]
#[test]
fn apply_persists_through_the_config_store() {
    let store = temp_store("apply");
    let draft = SettingsDraft {
        hotkey: "ctrl+alt+p".to_string(),
        max_results: 30,
        run_on_startup: false,
    };

    draft.apply(&store).unwrap();
    assert_eq!(store.hotkey(), "ctrl+alt+p");
    assert_eq!(store.max_results(), 30);
}

#[cfg(not(target_os = "windows"))]
#[test]
fn apply_rejects_an_invalid_draft_without_persisting() {
    let store = temp_store("apply-invalid");
    let draft = SettingsDraft {
        hotkey: "broken".to_string(),
        max_results: 30,
        run_on_startup: false,
    };

    assert!(draft.apply(&store).is_err());
    assert_eq!(store.hotkey(), "alt+q", "store must be untouched");
}
