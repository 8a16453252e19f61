//! Configuration module for ClipNest.

mod settings;

pub use settings::{
    CompletionSettings, EmbeddingSettings, GeneralSettings, SearchSettings, ServerSettings,
    Settings,
};
