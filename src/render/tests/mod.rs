//! Render module tests
//!
//! Contains test suites for XML generation:
//! - Document structure and ordering
//! - Escaping and the numeric reference pass
//! - Reproducibility with a fixed timestamp

#[cfg(test)]
mod keylayout_xml_tests;
