use preset_creator_lib::commands::library::{library_load, library_save};
use preset_creator_lib::commands::preset::{
    presets_delete, presets_get, presets_list, presets_save, presets_stats,
};
use preset_creator_lib::commands::AppState;
use preset_creator_lib::models::library::PresetLibrary;
use preset_creator_lib::models::preset::{Preset, PresetType};
use preset_creator_lib::models::settings::CreatorSettings;
use preset_creator_lib::services::editor_service::PresetEditor;
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

fn draft(name: &str, category: &str) -> Preset {
    let mut editor = PresetEditor::new();
    editor.set_name(name);
    editor.set_description(format!("{name} settings"));
    editor.set_category(category);
    editor.draft().clone()
}

#[test]
fn preset_crud_flow() {
    let (state, _dir) = setup_state();

    // create
    let saved = presets_save(&state, &draft("Lettuce", "vegetables")).expect("save preset");
    assert!(!saved.id.is_empty());
    assert!(!saved.updated_at.is_empty());

    // list carries ids next to labels
    let items = presets_list(&state, None).expect("list presets");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, saved.id);
    assert_eq!(items[0].label, "🌱 Lettuce 🔒");

    // replace by id
    let mut changed = saved.clone();
    changed.name = "Romaine".into();
    presets_save(&state, &changed).expect("save again");
    assert_eq!(presets_get(&state, &saved.id).expect("get").name, "Romaine");
    assert_eq!(presets_list(&state, None).expect("list").len(), 1);

    // delete
    assert!(presets_delete(&state, &saved.id).expect("delete"));
    assert!(!presets_delete(&state, &saved.id).expect("delete again"));
    let missing = presets_get(&state, &saved.id).expect_err("gone");
    assert_eq!(missing.code, "NOT_FOUND");
}

#[test]
fn library_persists_and_reloads() {
    let (state, dir) = setup_state();
    presets_save(&state, &draft("Lettuce", "vegetables")).expect("save");
    presets_save(&state, &draft("Rose", "flowers")).expect("save");

    let path = library_save(&state).expect("library save");
    assert_eq!(path, dir.path().join("presets_library.json"));

    let on_disk = PresetLibrary::load(&std::fs::read(&path).expect("read")).expect("parse");
    assert_eq!(on_disk.len(), 2);
    assert_eq!(on_disk.version, "2.0");
    assert_eq!(on_disk.created_with, "OrtoIoT Preset Creator v1.0");
    assert_eq!(on_disk, state.library().snapshot().expect("snapshot"));

    // a fresh state over the same files sees the saved presets
    let reopened = AppState::new((*state.settings()).clone()).expect("reopen");
    assert_eq!(presets_list(&reopened, None).expect("list").len(), 2);
}

#[test]
fn loading_a_broken_library_keeps_the_current_one() {
    let (state, dir) = setup_state();
    presets_save(&state, &draft("Lettuce", "vegetables")).expect("save");

    let broken = dir.path().join("broken.json");
    std::fs::write(&broken, "{\"presets\": ").expect("write");
    let err = library_load(&state, &broken).expect_err("malformed");
    assert_eq!(err.code, "MALFORMED_LIBRARY");

    let missing = library_load(&state, &dir.path().join("missing.json")).expect_err("missing");
    assert_eq!(missing.code, "IO_FAILURE");

    assert_eq!(presets_list(&state, None).expect("list").len(), 1);
}

#[test]
fn loading_another_library_switches_the_save_target() {
    let (state, dir) = setup_state();
    let mut other = PresetLibrary::new("elsewhere");
    let mut preset = draft("Orchid", "flowers").committed();
    preset.id = "orchid".into();
    other.upsert(preset);
    let other_path = dir.path().join("other.json");
    std::fs::write(&other_path, other.save().expect("bytes")).expect("write");

    assert_eq!(library_load(&state, &other_path).expect("load"), 1);
    assert_eq!(library_save(&state).expect("save"), other_path);
    assert_eq!(presets_get(&state, "orchid").expect("get").name, "Orchid");
}

#[test]
fn stats_and_search() {
    let (state, _dir) = setup_state();
    presets_save(&state, &draft("Lettuce", "vegetables")).expect("save");
    presets_save(&state, &draft("Basil", "vegetables")).expect("save");
    let mut tomato = draft("Tomato", "vegetables");
    tomato.preset_type = PresetType::Progressive;
    tomato.add_phase();
    presets_save(&state, &tomato).expect("save");
    presets_save(&state, &draft("Rose", "flowers")).expect("save");

    let stats = presets_stats(&state).expect("stats");
    assert_eq!(stats.total, 4);
    assert_eq!(stats.static_count, 3);
    assert_eq!(stats.progressive_count, 1);
    assert_eq!(stats.by_category.len(), 2);
    assert_eq!(stats.by_category[1].name, "Vegetables");
    assert_eq!(stats.by_category[1].count, 3);

    let found = presets_list(&state, Some("tom")).expect("search");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].label, "🌱 Tomato 🔄");
}

#[test]
fn corrupt_library_file_does_not_block_startup() {
    let dir = tempdir().expect("temp dir");
    let library_path = dir.path().join("presets_library.json");
    std::fs::write(&library_path, "{broken").expect("write");
    let settings = CreatorSettings {
        library_path: library_path.clone(),
        categories_path: dir.path().join("custom_categories.json"),
        ..CreatorSettings::default()
    };

    let state = AppState::new(settings).expect("state opens");
    assert_eq!(state.startup_warnings().expect("warnings").len(), 1);
    assert!(presets_list(&state, None).expect("list").is_empty());
    assert_eq!(std::fs::read_to_string(&library_path).expect("read"), "{broken");

    // recover by loading a good library
    let mut good = PresetLibrary::new("backup");
    let mut preset = draft("Lettuce", "vegetables").committed();
    preset.id = "lettuce".into();
    good.upsert(preset);
    let backup = dir.path().join("backup.json");
    std::fs::write(&backup, good.save().expect("bytes")).expect("write");
    assert_eq!(library_load(&state, &backup).expect("load"), 1);
    assert!(state.startup_warnings().expect("warnings").is_empty());
}
