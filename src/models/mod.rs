pub mod automation;
pub mod category;
pub mod export;
pub mod library;
pub mod phase;
pub mod preset;
pub mod settings;
pub mod violation;
