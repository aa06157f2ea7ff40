use std::collections::BTreeSet;

use preset_creator_lib::commands::library::{preset_export, presets_export_all, presets_import};
use preset_creator_lib::commands::preset::{presets_list, presets_save};
use preset_creator_lib::commands::AppState;
use preset_creator_lib::models::export::{BulkEnvelope, PresetEnvelope};
use preset_creator_lib::models::preset::Preset;
use preset_creator_lib::models::settings::CreatorSettings;
use preset_creator_lib::services::export_service::{suggested_file_name, BULK_EXPORT_FILE_NAME};
use serde_json::json;
use tempfile::tempdir;

fn setup_state() -> (AppState, tempfile::TempDir) {
    let dir = tempdir().expect("temp dir");
    let settings = CreatorSettings {
        library_path: dir.path().join("presets_library.json"),
        categories_path: dir.path().join("custom_categories.json"),
        ..CreatorSettings::default()
    };
    (AppState::new(settings).expect("app state"), dir)
}

fn valid(name: &str) -> Preset {
    let mut preset = Preset::new();
    preset.name = name.into();
    preset.description = "desc".into();
    preset.category = "vegetables".into();
    preset
}

#[test]
fn bulk_export_lists_every_preset() {
    let (state, dir) = setup_state();
    let mut ids = BTreeSet::new();
    for name in ["Lettuce", "Basil", "Kale"] {
        ids.insert(presets_save(&state, &valid(name)).expect("save").id);
    }

    let path = dir.path().join(BULK_EXPORT_FILE_NAME);
    assert_eq!(presets_export_all(&state, &path).expect("export"), 3);

    let envelope: BulkEnvelope =
        serde_json::from_slice(&std::fs::read(&path).expect("read")).expect("parse");
    assert_eq!(envelope.export_info.preset_count, 3);
    assert_eq!(envelope.export_info.compatible_with, "OrtoIoT v4.0+");
    let exported: BTreeSet<String> = envelope.data.presets.keys().cloned().collect();
    assert_eq!(exported, ids);
}

#[test]
fn importing_a_colliding_id_mints_a_new_one() {
    let (state, dir) = setup_state();
    let mut existing = valid("Existing");
    existing.id = "X".into();
    presets_save(&state, &existing).expect("save");

    let payload = json!({
        "preset": {
            "id": "X",
            "name": "Incoming",
            "description": "from another machine",
            "category": "vegetables",
            "type": "static",
            "settings": {"temperature": {"enabled": true, "value": 22.0}}
        },
        "export_info": {"version": "2.0"}
    });
    let path = dir.path().join("incoming.json");
    std::fs::write(&path, payload.to_string()).expect("write");

    let outcome = presets_import(&state, &path).expect("import");
    assert_eq!(outcome.count(), 1);
    assert_ne!(outcome.imported_ids[0], "X");

    let items = presets_list(&state, None).expect("list");
    assert_eq!(items.len(), 2);
    let names: Vec<&str> = items.iter().map(|item| item.name.as_str()).collect();
    assert_eq!(names, vec!["Existing", "Incoming"]);
}

#[test]
fn export_then_import_duplicates_under_new_ids() {
    let (state, dir) = setup_state();
    let saved = presets_save(&state, &valid("Lettuce")).expect("save");

    let single = dir.path().join(suggested_file_name(&saved));
    preset_export(&state, &saved, &single).expect("export one");
    let envelope: PresetEnvelope =
        serde_json::from_slice(&std::fs::read(&single).expect("read")).expect("parse");
    assert_eq!(envelope.preset.id, saved.id);
    assert_eq!(envelope.export_info.version, "2.0");

    let bulk = dir.path().join(BULK_EXPORT_FILE_NAME);
    presets_export_all(&state, &bulk).expect("export all");

    presets_import(&state, &single).expect("import single");
    presets_import(&state, &bulk).expect("import bulk");

    let items = presets_list(&state, None).expect("list");
    assert_eq!(items.len(), 3);
    let ids: BTreeSet<&str> = items.iter().map(|item| item.id.as_str()).collect();
    assert_eq!(ids.len(), 3);
    assert!(ids.contains(saved.id.as_str()));
}

#[test]
fn export_refuses_invalid_drafts() {
    let (state, dir) = setup_state();
    let path = dir.path().join("invalid_preset.json");
    let err = preset_export(&state, &Preset::new(), &path).expect_err("invalid");
    assert_eq!(err.code, "VALIDATION_FAILED");
    assert!(!path.exists());
}

#[test]
fn import_failures_are_reported_without_side_effects() {
    let (state, dir) = setup_state();
    presets_save(&state, &valid("Lettuce")).expect("save");

    let empty = dir.path().join("empty.json");
    std::fs::write(&empty, r#"{"data": {"presets": {}}, "export_info": {}}"#).expect("write");
    assert_eq!(
        presets_import(&state, &empty).expect_err("no presets").code,
        "NO_VALID_PRESETS"
    );

    let garbage = dir.path().join("garbage.json");
    std::fs::write(&garbage, "not json at all").expect("write");
    assert_eq!(
        presets_import(&state, &garbage).expect_err("garbage").code,
        "MALFORMED_IMPORT_PAYLOAD"
    );

    assert_eq!(presets_list(&state, None).expect("list").len(), 1);
}
