//! Error types for the menu engine

use crate::types::Slot;
use std::{io::Error as IoError, path::PathBuf};
use thiserror::Error;

/// Layout build-time validation errors. Fatal for the one layout being built.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("Row count {0} is outside 1..=6")]
    InvalidRows(u8),

    #[error("Layout has no title for the main language '{0}'")]
    MissingMainTitle(String),

    #[error("Icon '{icon}' has no slot")]
    MissingSlot { icon: String },

    #[error("Icon '{icon}' uses slot {slot} outside a {size}-slot container")]
    SlotOutOfBounds { icon: String, slot: Slot, size: usize },

    #[error("Slot {slot} is used by both '{first}' and '{second}'")]
    SlotTaken {
        slot: Slot,
        first: String,
        second: String,
    },

    #[error("Fill range {start}..={end} is invalid for this layout")]
    InvalidFillRange { start: Slot, end: Slot },

    #[error("Page switcher '{icon}' at slot {slot} lies inside the fill range")]
    SwitcherInFillRange { icon: String, slot: Slot },

    #[error("Fillable layout is missing the '{0}' icon")]
    MissingSwitcher(&'static str),

    #[error("Fillable layout has no empty-state icon")]
    MissingEmptyIcon,

    #[error("Fillable layout has no icon templates")]
    NoTemplates,
}

/// Layout and settings file loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read directory {0}: {1}")]
    DirectoryRead(PathBuf, IoError),

    #[error("Failed to read file {0}: {1}")]
    FileRead(PathBuf, IoError),

    #[error("Failed to parse {0}: {1}")]
    Parse(PathBuf, toml::de::Error),

    #[error("Invalid layout in {0}: {1}")]
    Layout(PathBuf, LayoutError),
}

/// Contract errors raised by menu instances and the registry
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MenuError {
    #[error("Page {page} is outside 0..{page_count}")]
    PageOutOfRange { page: usize, page_count: usize },

    #[error("Menu instance '{0}' already exists")]
    DuplicateInstance(String),

    #[error("Unknown layout '{0}'")]
    UnknownLayout(String),

    #[error("Menu '{0}' not found")]
    NotFound(String),
}

/// Texture lookup failures. Never surfaced past the resolver.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("No texture for '{0}'")]
    NotFound(String),

    #[error("Lookup for '{0}' timed out")]
    Timeout(String),

    #[error("Texture backend error: {0}")]
    Backend(String),
}

// Result type aliases for convenience
pub type LayoutResult<T> = Result<T, LayoutError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type MenuResult<T> = Result<T, MenuError>;
