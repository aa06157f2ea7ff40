use preset_creator_lib::commands::preset::{presets_get, presets_save, presets_validate};
use preset_creator_lib::commands::AppState;
use preset_creator_lib::models::automation::AutomationChannel;
use preset_creator_lib::models::category::{CategoryLookup, CategoryRegistry};
use preset_creator_lib::models::preset::PresetType;
use preset_creator_lib::models::settings::CreatorSettings;
use preset_creator_lib::services::editor_service::{PhaseUpdate, PresetEditor};
use preset_creator_lib::services::validation_service::PresetValidator;
use tempfile::tempdir;

fn setup_state(strict_subcategories: bool) -> (AppState, tempfile::TempDir) {
    let dir = tempdir().expect("temp dir");
    let settings = CreatorSettings {
        library_path: dir.path().join("presets_library.json"),
        categories_path: dir.path().join("custom_categories.json"),
        strict_subcategories,
        ..CreatorSettings::default()
    };
    (AppState::new(settings).expect("app state"), dir)
}

#[test]
fn static_veg_mix_is_savable() {
    let mut editor = PresetEditor::new();
    editor.set_name("Veg Mix");
    editor.set_description("desc");
    editor.set_category("vegetables");
    editor.set_channel_enabled(AutomationChannel::Temperature, true);
    editor.set_channel_value(AutomationChannel::Temperature, "value", 22.0);

    let registry = CategoryRegistry::builtin();
    let validator = PresetValidator::new(&registry);
    assert!(validator.validate(editor.draft()).is_empty());
    assert!(validator.validate_automation(editor.draft()).is_empty());
}

#[test]
fn progressive_without_phases_is_not_savable() {
    let (state, _dir) = setup_state(false);
    let mut editor = PresetEditor::new();
    editor.set_name("Tomato cycle");
    editor.set_description("desc");
    editor.set_category("vegetables");
    editor.set_type(PresetType::Progressive);

    let report = presets_validate(&state, editor.draft()).expect("validate");
    let messages: Vec<&str> = report.violations.iter().map(|v| v.message.as_str()).collect();
    assert_eq!(messages, vec!["Progressive presets must have at least one phase"]);

    let err = presets_save(&state, editor.draft()).expect_err("refused");
    assert_eq!(err.code, "VALIDATION_FAILED");
    assert!(state.library().snapshot().expect("snapshot").is_empty());
}

#[test]
fn progressive_session_saves_only_phases() {
    let (state, _dir) = setup_state(false);
    let mut editor = PresetEditor::new();
    editor.set_name("Tomato cycle");
    editor.set_description("Seedling to fruit");
    editor.set_category("vegetables");
    editor.set_subcategory("fruiting_plants");
    editor.set_tags_text("tomato, summer, tomato");
    editor.set_type(PresetType::Progressive);

    let seedling = editor.add_phase();
    editor.update_phase(
        seedling,
        PhaseUpdate {
            name: Some("Seedling".into()),
            duration: Some(10),
            ..PhaseUpdate::default()
        },
    );
    let fruiting = editor.add_phase();
    editor.update_phase(
        fruiting,
        PhaseUpdate {
            name: Some("Fruiting".into()),
            duration: Some(40),
            ..PhaseUpdate::default()
        },
    );
    // move fruiting first, then back
    assert!(editor.move_selected_phase_up());
    assert!(!editor.move_selected_phase_up());
    assert!(editor.move_selected_phase_down());
    assert_eq!(
        editor.phase_labels(),
        vec!["1. Seedling (10 days)", "2. Fruiting (40 days)"]
    );

    let report = presets_validate(&state, editor.draft()).expect("validate");
    assert!(report.is_savable());

    let saved = presets_save(&state, editor.draft()).expect("save");
    assert!(saved.settings.is_empty());
    assert_eq!(saved.phases.len(), 2);
    assert_eq!(saved.tags.len(), 2);
    assert_eq!(saved.id, editor.id());
}

#[test]
fn zero_duration_phase_blocks_saving() {
    let (state, _dir) = setup_state(false);
    let mut editor = PresetEditor::new();
    editor.set_name("Herbs");
    editor.set_description("desc");
    editor.set_category("vegetables");
    editor.set_type(PresetType::Progressive);
    let index = editor.add_phase();
    editor.update_phase(
        index,
        PhaseUpdate {
            duration: Some(0),
            ..PhaseUpdate::default()
        },
    );

    let err = presets_save(&state, editor.draft()).expect_err("refused");
    let details = err.details.expect("details");
    assert_eq!(
        details["violations"][0]["message"],
        "Phase 1 duration must be greater than 0"
    );
}

#[test]
fn out_of_range_channels_are_reported_but_do_not_block() {
    let (state, _dir) = setup_state(false);
    let mut editor = PresetEditor::new();
    editor.set_name("Hot house");
    editor.set_description("desc");
    editor.set_category("flowers");
    editor.set_channel_value(AutomationChannel::Temperature, "value", 35.5);

    let report = presets_validate(&state, editor.draft()).expect("validate");
    assert!(report.is_savable());
    assert_eq!(report.automation.len(), 1);
    assert_eq!(report.automation[0].field, "settings.temperature.value");
}

#[test]
fn strict_mode_checks_subcategory_membership() {
    let (state, _dir) = setup_state(true);
    let mut editor = PresetEditor::new();
    editor.set_name("Mislabelled");
    editor.set_description("desc");
    editor.set_category("flowers");
    editor.set_subcategory("sativa");

    let report = presets_validate(&state, editor.draft()).expect("validate");
    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.violations[0].field, "subcategory");

    editor.set_subcategory("annuals");
    assert!(presets_save(&state, editor.draft()).is_ok());
}

#[test]
fn saved_category_is_the_registry_key() {
    let (state, _dir) = setup_state(false);
    let mut editor = PresetEditor::new();
    editor.set_name("Padded");
    editor.set_description("desc");
    editor.set_category(" vegetables ");
    editor.set_subcategory(" herbs ");

    let saved = presets_save(&state, editor.draft()).expect("save");
    assert_eq!(saved.category, "vegetables");
    assert_eq!(saved.subcategory, "herbs");
    assert!(CategoryRegistry::builtin().contains_category(&saved.category));
    assert_eq!(presets_get(&state, &saved.id).expect("get").category, "vegetables");
}
