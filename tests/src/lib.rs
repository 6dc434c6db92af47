//! # breach-filters Test Suite
//!
//! Unified test crate for cross-module flows:
//!
//! ```text
//! tests/src/
//! └── integration/      # Full build -> publish -> load -> verify passes
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p bf-tests
//! ```

pub mod integration;
