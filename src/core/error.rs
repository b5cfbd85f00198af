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

//! src/core/error.rs
//!
//! Errors raised while turning a specification into keylayout content
//!
//! Everything here is a content-generation failure: the input describes a
//! keyboard that cannot be built. File-system failures live in
//! `config::ConfigError` so callers can tell the two apart.

use thiserror::Error;

/// Keylayout construction and rendering errors
#[derive(Debug, Error, PartialEq)]
pub enum KeylayoutError {
    /// The specification is malformed or incomplete
    #[error("Invalid specification: {0}")]
    Specification(String),

    /// An output list does not line up with any built-in script
    #[error(
        "No script has {length} characters (supported: 26, 27, 28, 36); outputs were {outputs:?}"
    )]
    AlphabetLength { length: usize, outputs: Vec<String> },

    /// A mapped value is neither a literal output nor an action
    #[error("Unresolved output at {location}: {found}")]
    UnresolvedOutput { location: String, found: String },

    /// A referenced state is missing from the state repository
    #[error("State '{0}' is referenced but was never defined")]
    MissingState(String),

    /// Rendering was requested without a keylayout
    #[error("Cannot render a keylayout that does not exist")]
    NilKeylayout,

    /// The XML writer failed
    #[error("Failed to serialise keylayout: {0}")]
    Serialization(String),
}
