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

//! Symboard
//!
//! Compiles human-written YAML keyboard specifications into macOS
//! `.keylayout` files, including dead-key states.
//!
//! # Features
//!
//! - **Base layouts:** Start from a predefined layout and override only what differs
//! - **Dead keys:** States built from whole alphabets with a single line each
//! - **Precedence:** `lower`, then `upper`, then explicit `map` overrides
//! - **Reproducible output:** Deterministic element order, injectable timestamps
//! - **Safe writes:** Never overwrites an existing file; no partial files
//!
//! # Architecture
//!
//! - **`core`:** Business logic (scripts, actions, states, keylayouts, builder)
//! - **`render`:** XML generation
//! - **`config`:** Settings, loading inputs, writing outputs
//! - **`compiler`:** The pipeline tying the three together
//!
//! # Examples
//!
//! ## Building a dead-key state
//!
//! ```
//! use symboard::core::State;
//!
//! let grave = State::new("grave", "`")
//!     .with_lower("à,b̀,c̀,d̀,è,f̀,g̀,h̀,ì,j̀,k̀,l̀,m̀,ǹ,ò,p̀,q̀,r̀,s̀,t̀,ù,v̀,ẁ,x̀,ỳ,z̀")?;
//! assert_eq!(grave.action_to_output_map.len(), 26);
//! # Ok::<(), symboard::core::KeylayoutError>(())
//! ```
//!
//! ## Compiling a specification
//!
//! ```no_run
//! use symboard::compiler::Compiler;
//! use symboard::config::Settings;
//! use std::path::Path;
//!
//! let written = Compiler::new(Settings::from_env())
//!     .run(Path::new("my_layout.yaml"), Some(Path::new("My Layout.keylayout")))?;
//! println!("Wrote {}", written.display());
//! # Ok::<(), symboard::compiler::CompileError>(())
//! ```

pub mod compiler;
pub mod config;
pub mod core;
pub mod render;

// Re-export commonly used types for convenience
pub use compiler::{CompileError, Compiler};
pub use core::{Keylayout, KeylayoutError, State};
