// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! src/config/error.rs
//!
//! Errors from reading specifications and writing keylayout files

use std::path::PathBuf;
use thiserror::Error;

use crate::core::KeylayoutError;

/// Errors that can occur while loading input files or writing output.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Input file or directory does not exist.
    #[error("Not found: {0}")]
    NotFound(PathBuf),

    /// A YAML file could not be parsed.
    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// A state definition file describes a state that cannot be built.
    #[error("Invalid state definition in {path}: {source}")]
    InvalidState {
        path: PathBuf,
        source: KeylayoutError,
    },

    /// The output path is already taken.
    #[error("Refusing to overwrite existing file: {0}")]
    FileExists(PathBuf),

    /// Atomic write operation failed.
    #[error("Atomic write failed: {0}")]
    WriteFailed(String),

    /// Generic I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
