//! ORMTool CLI library.
//!
//! Command implementations behind the `ormtool` binary. Each command returns
//! the process exit code so the commands can also be driven from tests.

pub mod commands;
