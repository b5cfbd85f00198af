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

//! src/core/mod.rs
//!
//! Core business logic module
//!
//! This module contains the data model and algorithms that turn a keyboard
//! specification into a resolved keylayout:
//! - Scripts: fixed alphabets used to align output lists to keys
//! - Actions and key outputs, with the unicode-escape table
//! - States and the precedence-ordered state builder
//! - The keylayout aggregate and its builder
//!
//! Nothing here touches the filesystem, so every part can be tested with
//! plain values.

pub mod actions;
pub mod builder;
pub mod error;
pub mod keylayout;
pub mod repository;
pub mod script;
pub mod state;

pub use actions::{to_unicode, Action, KeyOutput, ACTION_TO_UNICODE};
pub use builder::{BaseLayouts, KeylayoutBuilder, KeylayoutSpec, ModifierCombinations};
pub use error::KeylayoutError;
pub use keylayout::{KeyMap, Keylayout, LayoutAttributes};
pub use repository::StateRepository;
pub use script::{resolve_script, Case, Script};
pub use state::{State, StateAttribute, StateDefinition};

#[cfg(test)]
mod tests;
