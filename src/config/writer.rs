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

//! src/config/writer.rs
//!
//! Writing generated keylayouts to disk

use atomic_write_file::AtomicWriteFile;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::settings::KEYLAYOUT_EXTENSION;
use crate::config::ConfigError;

/// Writes one `.keylayout` file without ever overwriting an existing one
///
/// The target's extension is corrected on construction: a missing
/// extension is appended and a different one is replaced.
///
/// Contents go to a temporary file that is renamed into place on success,
/// so a failed write never leaves a partial file behind.
///
/// # Example
///
/// ```no_run
/// use symboard::config::KeylayoutFileWriter;
///
/// let written = KeylayoutFileWriter::new("out").write("<keyboard/>\n")?;
/// assert_eq!(written.to_str(), Some("out.keylayout"));
/// # Ok::<(), symboard::config::ConfigError>(())
/// ```
#[derive(Clone, Debug)]
pub struct KeylayoutFileWriter {
    path: PathBuf,
}

impl KeylayoutFileWriter {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: change_extension(path.as_ref()),
        }
    }

    /// Where the file will be written
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `contents` and returns the final path
    ///
    /// # Errors
    ///
    /// - `ConfigError::FileExists` if the target already exists; the
    ///   existing file is left untouched
    /// - `ConfigError::WriteFailed` if the file cannot be opened, written or
    ///   committed
    pub fn write(self, contents: &str) -> Result<PathBuf, ConfigError> {
        if self.path.exists() {
            return Err(ConfigError::FileExists(self.path));
        }

        info!("Writing keylayout to {}", self.path.display());

        let mut file = AtomicWriteFile::options().open(&self.path).map_err(|e| {
            ConfigError::WriteFailed(format!(
                "Failed to open {} for atomic write: {}",
                self.path.display(),
                e
            ))
        })?;

        file.write_all(contents.as_bytes())
            .map_err(|e| ConfigError::WriteFailed(format!("Failed to write content: {}", e)))?;

        file.commit().map_err(|e| {
            ConfigError::WriteFailed(format!("Failed to commit atomic write: {}", e))
        })?;

        Ok(self.path)
    }
}

/// Gives `path` the `.keylayout` extension
///
/// # Example
/// ```
/// use std::path::{Path, PathBuf};
/// use symboard::config::writer::change_extension;
///
/// assert_eq!(change_extension(Path::new("out")), PathBuf::from("out.keylayout"));
/// assert_eq!(change_extension(Path::new("out.txt")), PathBuf::from("out.keylayout"));
/// ```
pub fn change_extension(path: &Path) -> PathBuf {
    match path.extension() {
        Some(extension) if extension == KEYLAYOUT_EXTENSION => path.to_path_buf(),
        _ => path.with_extension(KEYLAYOUT_EXTENSION),
    }
}
