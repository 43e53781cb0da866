/// Compiler and player settings, loadable from RON.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::schema::value::RuntimeState;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// How far macro references are resolved during expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MacroExpansion {
    /// One pass: a macro is replaced by the target scene's grouped events,
    /// and any macros or code blocks inside those are left as they were.
    #[default]
    Shallow,
    /// Macros of macros are resolved until none remain, and spliced code
    /// blocks are lowered too. Cycles are a compile error.
    Transitive,
}

/// What to do with a line that starts like a known construct but does not
/// parse as one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MalformedLinePolicy {
    #[default]
    Drop,
    Narration,
}

/// Options for [`Compiler`](crate::core::compiler::Compiler).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompileOptions {
    #[serde(default)]
    pub macro_expansion: MacroExpansion,
    #[serde(default)]
    pub malformed_lines: MalformedLinePolicy,
}

impl CompileOptions {
    /// Load options from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<CompileOptions, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse options from a RON string.
    pub fn parse_ron(input: &str) -> Result<CompileOptions, ConfigError> {
        Ok(ron::from_str(input)?)
    }
}

fn default_start_scene() -> String {
    "Start".to_string()
}

/// Where and with what state a playthrough begins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    #[serde(default = "default_start_scene")]
    pub start_scene: String,
    #[serde(default)]
    pub initial_state: RuntimeState,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            start_scene: default_start_scene(),
            initial_state: RuntimeState::default(),
        }
    }
}

impl PlayerConfig {
    pub fn load_from_ron(path: &Path) -> Result<PlayerConfig, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<PlayerConfig, ConfigError> {
        Ok(ron::from_str(input)?)
    }
}
