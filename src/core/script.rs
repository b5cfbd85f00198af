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

//! src/core/script.rs
//!
//! Built-in scripts used to align output lists with keys
//!
//! A script is an ordered alphabet with a lower case and an upper case row
//! of equal length. A state file gives one output per letter of a script, in
//! order, and the script decides which key each output belongs to. The
//! script is chosen purely by the number of outputs, so every built-in
//! script must have a distinct length.

use crate::core::error::KeylayoutError;

/// An ordered alphabet with lower and upper case rows
///
/// `lower` is always present. `upper`, when present, has exactly as many
/// characters as `lower`; position `i` of each row belongs to the same key.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Script {
    /// Short name for diagnostics (e.g. "latin_26")
    pub name: &'static str,

    /// Characters typed without shift
    pub lower: &'static str,

    /// Characters typed with shift
    pub upper: Option<&'static str>,
}

impl Script {
    /// Number of keys covered by the script
    pub fn length(&self) -> usize {
        self.lower.chars().count()
    }

    /// Returns the row for the requested case, if the script has one
    pub fn row(&self, case: Case) -> Option<&'static str> {
        match case {
            Case::Lower => Some(self.lower),
            Case::Upper => self.upper,
        }
    }
}

/// Which row of a script an output list is aligned against
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Case {
    Lower,
    Upper,
}

const LATIN_LOWER: &str = "abcdefghijklmnopqrstuvwxyz";
const LATIN_UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// ISO basic Latin alphabet
pub const LATIN_26: Script = Script {
    name: "latin_26",
    lower: LATIN_LOWER,
    upper: Some(LATIN_UPPER),
};

/// Latin plus the apostrophe key (shifted: double quote)
pub const LATIN_27: Script = Script {
    name: "latin_27",
    lower: "abcdefghijklmnopqrstuvwxyz'",
    upper: Some("ABCDEFGHIJKLMNOPQRSTUVWXYZ\""),
};

/// Latin plus separate apostrophe and double quote keys
///
/// Shift swaps the two quote marks.
pub const LATIN_28: Script = Script {
    name: "latin_28",
    lower: "abcdefghijklmnopqrstuvwxyz'\"",
    upper: Some("ABCDEFGHIJKLMNOPQRSTUVWXYZ\"'"),
};

/// Latin plus the number row, with the symbol row of the JDvorak layout
pub const ALPHALATIN: Script = Script {
    name: "alphalatin",
    lower: "abcdefghijklmnopqrstuvwxyz1234567890",
    upper: Some("ABCDEFGHIJKLMNOPQRSTUVWXYZ&@#$%^<>()"),
};

/// Every script an output list can be aligned against
pub const SCRIPTS: &[Script] = &[LATIN_26, LATIN_27, LATIN_28, ALPHALATIN];

/// Finds the built-in script covering exactly `output_count` keys
pub fn script_for_length(output_count: usize) -> Option<&'static Script> {
    SCRIPTS.iter().find(|script| script.length() == output_count)
}

/// Resolves the script for an output list
///
/// # Errors
/// Returns `KeylayoutError::AlphabetLength` carrying the outputs when no
/// script has as many keys as there are outputs.
///
/// # Example
/// ```
/// use symboard::core::script::resolve_script;
///
/// let outputs: Vec<String> = "abcdefghijklmnopqrstuvwxyz"
///     .chars()
///     .map(String::from)
///     .collect();
/// assert_eq!(resolve_script(&outputs).unwrap().name, "latin_26");
/// ```
pub fn resolve_script(outputs: &[String]) -> Result<&'static Script, KeylayoutError> {
    script_for_length(outputs.len()).ok_or_else(|| KeylayoutError::AlphabetLength {
        length: outputs.len(),
        outputs: outputs.to_vec(),
    })
}
