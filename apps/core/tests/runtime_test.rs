use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use quickbar_core::app_index::AppEntry;
use quickbar_core::config_store::ConfigStore;
use quickbar_core::events::{CoreEvent, ModeSignal};
use quickbar_core::model::ResultKind;
use quickbar_core::runtime::assemble_core;

fn temp_store(label: &str) -> Arc<ConfigStore> {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    Arc::new(ConfigStore::open(std::env::temp_dir().join(format!(
        "quickbar-runtime-{label}-{unique}.json"
    ))))
}

fn recv_results(core: &quickbar_core::runtime::Core) -> (String, Vec<quickbar_core::model::ResultItem>) {
    loop {
        match core
            .events
            .recv_timeout(Duration::from_secs(2))
            .expect("core event should arrive")
        {
            CoreEvent::Results { query, items } => return (query, items),
            _ => continue,
        }
    }
}

#[test]
fn assembled_core_answers_a_free_query_from_the_app_index() {
    let mut core = assemble_core(temp_store("free-query"));
    core.app_index.replace(vec![
        AppEntry::new("Visual Studio Code", "C:\\Apps\\Code.lnk"),
        AppEntry::new("Notepad", "C:\\Apps\\Notepad.lnk"),
    ]);

    core.controller.on_query_changed("notepad");
    let (query, items) = recv_results(&core);
    assert_eq!(query, "notepad");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "Notepad");
    assert_eq!(items[0].kind, ResultKind::App);
}

#[test]
fn trigger_row_outranks_app_matches_in_the_merged_batch() {
    let mut core = assemble_core(temp_store("merge"));
    core.app_index.replace(vec![AppEntry::new(
        "C Compiler",
        "C:\\Apps\\cc.lnk",
    )]);

    // "c" is both the calculator trigger and an app-name substring.
    core.controller.on_query_changed("c");
    let (_, items) = recv_results(&core);
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].kind, ResultKind::PluginTrigger);
    assert_eq!(items[1].kind, ResultKind::App);
}

#[test]
fn full_plugin_session_through_the_assembled_core() {
    let mut core = assemble_core(temp_store("plugin-session"));

    core.controller.on_query_changed("c");
    let (_, items) = recv_results(&core);
    let trigger = items[0].clone();
    assert_eq!(trigger.kind, ResultKind::PluginTrigger);

    assert!(core.controller.on_item_activated(&trigger).is_none());
    assert_eq!(
        core.controller.mode(),
        ModeSignal::Plugin {
            name: "Calculator".to_string()
        }
    );

    core.controller.on_query_changed("40+2");
    let (query, items) = loop {
        // Skip the empty clearing batch emitted on entry.
        let (query, items) = recv_results(&core);
        if query == "40+2" {
            break (query, items);
        }
    };
    assert_eq!(query, "40+2");
    assert_eq!(items[0].payload, "42");
}
