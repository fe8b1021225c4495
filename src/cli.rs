//! CLI domain: parse, route and output only.

mod output;
mod parse;
mod route;

pub use output::{format_report, format_size, map_error};
pub use parse::Cli;
pub use route::{Destination, RunContext};
