//! Utility functions and helpers.

pub mod preflight;
pub mod settings;

pub use preflight::check_git_repository;
pub use settings::Settings;
