//! Core module tests
//!
//! Contains test suites for core functionality:
//! - Script resolution tests
//! - State builder and precedence tests
//! - Keylayout aggregate tests
//! - Keylayout builder tests
