//! Per-skill checks. Each function is pure with respect to its inputs and
//! returns issues instead of printing them.

pub mod budget;
pub mod references;
pub mod structure;
