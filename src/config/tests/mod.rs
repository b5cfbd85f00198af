//! Config module tests
//!
//! Contains test suites for file operations:
//! - Settings defaults and overrides
//! - Loading states and base layouts from disk
//! - Writing keylayout files

#[cfg(test)]
mod settings_tests;
