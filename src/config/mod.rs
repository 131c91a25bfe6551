//! Configuration module for Clipwise.
//!
//! Handles loading and managing application settings.

mod settings;

pub use settings::{
    GeneralSettings, PreflightSettings, ReportSettings, ServerSettings, SessionStoreProvider,
    SessionStoreSettings, Settings, TranscriptionSettings, VisionSettings,
};
