use std::path::{Path, PathBuf};

use tracing::info;

use crate::models::library::ImportOutcome;
use crate::models::preset::Preset;

use super::preset::commit_valid;
use super::{AppState, CommandResult};

/// Validates and commits the draft, then writes the single-preset envelope.
/// The library itself is not modified.
pub fn preset_export(state: &AppState, draft: &Preset, path: &Path) -> CommandResult<PathBuf> {
    let committed = commit_valid(state, draft)?;
    state.exporter().write_one(&committed, path)?;
    Ok(path.to_path_buf())
}

pub fn presets_export_all(state: &AppState, path: &Path) -> CommandResult<usize> {
    let snapshot = state.library().snapshot()?;
    Ok(state.exporter().write_all(&snapshot, path)?)
}

pub fn presets_import(state: &AppState, path: &Path) -> CommandResult<ImportOutcome> {
    Ok(state.library().import_file(path)?)
}

/// Switches to the library at `path`. The current library stays loaded if
/// the file cannot be read or parsed.
pub fn library_load(state: &AppState, path: &Path) -> CommandResult<usize> {
    Ok(state.library().load_from(path)?)
}

pub fn library_save(state: &AppState) -> CommandResult<PathBuf> {
    let path = state.library().save()?;
    info!(target: "app::command", path = %path.display(), "library_save");
    Ok(path)
}
