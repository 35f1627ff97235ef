use crate::config::preferences::PREFERENCES_FILE_NAME;
use crate::config::{GEMINI_API_KEY_ENV, PreferenceUpdate, Preferences, resolve_credential};
use crate::error::ConfigError;
use crate::ipc::PreferenceStore;

use serial_test::serial;
use tempfile::TempDir;

fn with_key(key: &str) -> Preferences {
    Preferences {
        api_key: Some(key.to_string()),
        ..Preferences::default()
    }
}

#[test]
fn given_update_when_applied_then_only_set_fields_change() {
    let mut preferences = Preferences {
        target_lang: Some("German".to_string()),
        last_input: Some("Hello".to_string()),
        ..Preferences::default()
    };

    preferences.apply(PreferenceUpdate::last_translation("Hallo", "German"));

    assert_eq!(preferences.target_lang.as_deref(), Some("German"));
    assert_eq!(preferences.last_input.as_deref(), Some("Hello"));
    assert_eq!(preferences.last_result.as_deref(), Some("Hallo"));
    assert_eq!(preferences.last_target_lang.as_deref(), Some("German"));
}

/// **VALUE**: Verifies saving an empty key removes the stored key.
///
/// **WHY THIS MATTERS**: Clearing the settings field is how users sign out; a blank
/// key left in storage would still count as "configured".
#[test]
fn given_blank_api_key_when_applied_then_key_is_removed() {
    let mut preferences = with_key("abc");

    preferences.apply(PreferenceUpdate {
        api_key: Some("  ".to_string()),
        ..PreferenceUpdate::default()
    });

    assert!(preferences.api_key.is_none());
    assert!(!preferences.has_api_key());
    assert!(preferences.credential().is_none());
}

#[test]
fn given_preferences_when_debug_formatted_then_key_is_redacted() {
    let debug = format!("{:?}", with_key("AIzaSy-secret"));

    assert!(!debug.contains("AIzaSy-secret"));
    assert!(debug.contains("[REDACTED]"));
}

/// **VALUE**: Verifies the on-disk field names match the extension's storage keys.
///
/// **BUG THIS CATCHES**: Would catch a lost `rename_all = "camelCase"`, which silently
/// orphans every preference saved by an earlier version.
#[test]
fn given_preferences_when_saved_then_file_uses_storage_keys_and_reloads() {
    let dir = TempDir::new().unwrap();
    let preferences = Preferences {
        api_key: Some("abc".to_string()),
        target_lang: Some("Japanese".to_string()),
        last_target_lang: Some("Japanese".to_string()),
        ..Preferences::default()
    };

    preferences.save(dir.path()).unwrap();

    let raw = std::fs::read_to_string(dir.path().join(PREFERENCES_FILE_NAME)).unwrap();
    assert!(raw.contains("\"apiKey\""));
    assert!(raw.contains("\"targetLang\""));
    assert!(raw.contains("\"lastTargetLang\""));
    assert!(!dir.path().join(format!("{PREFERENCES_FILE_NAME}.tmp")).exists());

    assert_eq!(Preferences::load(dir.path()).unwrap(), preferences);
}

#[test]
fn given_missing_file_when_loaded_then_empty_preferences() {
    let dir = TempDir::new().unwrap();

    assert_eq!(Preferences::load(dir.path()).unwrap(), Preferences::default());
}

#[test]
fn given_corrupt_file_when_loaded_then_parse_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(PREFERENCES_FILE_NAME), "{ not json").unwrap();

    let result = Preferences::load(dir.path());

    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}

/// **VALUE**: Verifies an update is visible to readers as soon as `update` returns and is
/// persisted to disk.
///
/// **BUG THIS CATCHES**: Would catch a fire-and-forget update where a translation issued
/// right after saving the key still sees the old (missing) key.
#[tokio::test]
async fn given_store_when_updated_then_snapshot_and_disk_reflect_change() {
    let dir = TempDir::new().unwrap();
    let store = PreferenceStore::new(dir.path().to_path_buf(), Preferences::default());

    store
        .update(PreferenceUpdate {
            api_key: Some("fresh-key".to_string()),
            target_lang: Some("Spanish".to_string()),
            ..PreferenceUpdate::default()
        })
        .await
        .unwrap();

    let snapshot = store.snapshot().await;
    assert!(snapshot.has_api_key());
    assert_eq!(snapshot.target_lang.as_deref(), Some("Spanish"));
    assert_eq!(store.credential().await.expose(), "fresh-key");

    let on_disk = Preferences::load(dir.path()).unwrap();
    assert_eq!(on_disk, snapshot);
}

#[tokio::test]
async fn given_in_memory_store_when_updated_then_clones_share_state() {
    let store = PreferenceStore::in_memory(Preferences::default());
    let clone = store.clone();

    store
        .update(PreferenceUpdate::last_translation("Bonjour", "French"))
        .await
        .unwrap();

    assert_eq!(clone.snapshot().await.last_result.as_deref(), Some("Bonjour"));
}

/// **VALUE**: Verifies the stored key wins over `GEMINI_API_KEY`, which is only a fallback.
#[test]
#[serial]
fn given_stored_key_and_env_key_when_resolved_then_stored_key_wins() {
    unsafe { std::env::set_var(GEMINI_API_KEY_ENV, "env-key") };

    let stored = resolve_credential(&with_key("stored-key"));
    let fallback = resolve_credential(&Preferences::default());

    unsafe { std::env::remove_var(GEMINI_API_KEY_ENV) };

    assert_eq!(stored.expose(), "stored-key");
    assert_eq!(fallback.expose(), "env-key");
}

#[test]
#[serial]
fn given_no_key_anywhere_when_resolved_then_credential_is_empty() {
    unsafe { std::env::remove_var(GEMINI_API_KEY_ENV) };

    let credential = resolve_credential(&Preferences::default());

    assert!(!credential.is_present());
}
