//! Library half of the `vero` command-line tool: project configuration and
//! the source formatter. The `vero` binary (`src/main.rs`) is a thin
//! wrapper that wires these into `check`/`build`/`fmt` subcommands.

pub mod colors;
pub mod config;
pub mod fmt;
