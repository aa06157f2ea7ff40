pub mod category_service;
pub mod editor_service;
pub mod export_service;
pub mod library_service;
pub mod settings_service;
pub mod validation_service;
