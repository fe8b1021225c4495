//! Integration tests for the borg-ncdu conversion pipeline

mod cli_binary;
mod conflicts;
pub mod test_utils;
