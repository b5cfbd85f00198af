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

//! src/config/mod.rs
//!
//! Configuration and file operations
//!
//! Everything that touches the filesystem lives here: runtime settings,
//! loading specifications, base layouts and state definitions, and writing
//! the generated `.keylayout` file.
//!
//! # Example
//!
//! ```no_run
//! use symboard::config::{load_base_layouts, load_states, Settings};
//!
//! let settings = Settings::from_env();
//! let states = load_states(&settings)?;
//! let layouts = load_base_layouts(&settings)?;
//!
//! println!("{} states, {} base layouts", states.len(), layouts.len());
//! # Ok::<(), symboard::config::ConfigError>(())
//! ```

pub mod error;
pub mod loader;
pub mod settings;
pub mod writer;

pub use error::ConfigError;
pub use loader::{load_base_layouts, load_states, parse_yaml_file};
pub use settings::Settings;
pub use writer::KeylayoutFileWriter;

#[cfg(test)]
mod tests;
