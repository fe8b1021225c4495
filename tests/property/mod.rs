//! Property-based tests for the conversion pipeline

mod determinism;
