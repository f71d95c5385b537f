//! ORMTool End-to-End Test Infrastructure
//!
//! Integration tests for the packing flows:
//!
//! - Packing: three source maps -> Unreal/Unity files on disk
//! - Worker: single-slot background runs, busy rejection, cancellation
//! - CLI: command functions and, optionally, the `ormtool` binary
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ormtool-tests
//!
//! # Also spawn the CLI binary through cargo
//! ORMTOOL_RUN_CLI_TESTS=1 cargo test -p ormtool-tests --test e2e_cli
//! ```

pub mod fixtures;
pub mod harness;

pub use fixtures::{write_map, SourceSet};
pub use harness::{decode_png, CliResult, DecodedPng, ProgressRecorder, TestHarness};
