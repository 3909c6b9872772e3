//! Documentation testing module.
//!
//! This module contains tests to verify:
//! - CLI help text completeness
//! - README accuracy against the real CLI and category set

mod help;
mod readme;
