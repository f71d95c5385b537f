//! Test harness utilities for running CLI commands and checking outputs.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::OnceLock;
use tempfile::TempDir;

use ormtool_pack::ProgressSink;

/// Result of running the ormtool CLI.
#[derive(Debug)]
pub struct CliResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CliResult {
    /// Create a CliResult from a Command Output.
    pub fn from_output(output: Output) -> Self {
        Self {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }

    /// Assert that the command succeeded.
    pub fn assert_success(&self) {
        assert!(
            self.success,
            "Command failed with exit code {}.\nstdout: {}\nstderr: {}",
            self.exit_code, self.stdout, self.stderr
        );
    }

    /// Assert that the command failed.
    pub fn assert_failure(&self) {
        assert!(
            !self.success,
            "Expected command to fail, but it succeeded.\nstdout: {}",
            self.stdout
        );
    }

    /// Parse stdout as JSON (for `--json` runs).
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout)
            .unwrap_or_else(|e| panic!("stdout is not JSON ({}):\n{}", e, self.stdout))
    }
}

/// A test harness for running ormtool CLI commands.
pub struct TestHarness {
    /// Working directory for test outputs.
    pub work_dir: TempDir,
}

impl TestHarness {
    pub fn new() -> Self {
        Self {
            work_dir: TempDir::new().expect("Failed to create work dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.work_dir.path()
    }

    /// Run the ormtool binary through cargo with the given arguments.
    pub fn run_cli(&self, args: &[&str]) -> CliResult {
        let output = Command::new("cargo")
            .args(["run", "--quiet", "--manifest-path"])
            .arg(workspace_manifest_path())
            .args(["-p", "ormtool-cli", "--bin", "ormtool", "--"])
            .args(args)
            .current_dir(self.path())
            .output();

        match output {
            Ok(out) => CliResult::from_output(out),
            Err(e) => CliResult {
                success: false,
                exit_code: -1,
                stdout: String::new(),
                stderr: format!("Failed to run CLI: {}", e),
            },
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

fn workspace_manifest_path() -> PathBuf {
    static PATH: OnceLock<PathBuf> = OnceLock::new();
    PATH.get_or_init(|| {
        let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        let manifest_path = manifest_dir.join("..").join("..").join("Cargo.toml");
        manifest_path.canonicalize().unwrap_or(manifest_path)
    })
    .clone()
}

/// Check if tests that spawn the CLI through cargo should run.
pub fn should_run_cli_tests() -> bool {
    std::env::var("ORMTOOL_RUN_CLI_TESTS")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Progress sink that keeps every reported value.
#[derive(Debug, Default)]
pub struct ProgressRecorder {
    pub values: Vec<f32>,
    /// Report `is_cancelled` once this many values have arrived.
    pub cancel_after: Option<usize>,
}

impl ProgressRecorder {
    pub fn cancelling_after(count: usize) -> Self {
        Self {
            values: Vec::new(),
            cancel_after: Some(count),
        }
    }

    pub fn is_non_decreasing(&self) -> bool {
        self.values.windows(2).all(|w| w[0] <= w[1])
    }

    pub fn last(&self) -> Option<f32> {
        self.values.last().copied()
    }
}

impl ProgressSink for ProgressRecorder {
    fn report(&mut self, progress: f32) {
        self.values.push(progress);
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_after
            .is_some_and(|count| self.values.len() >= count)
    }
}

/// Raw pixels of a decoded PNG.
#[derive(Debug)]
pub struct DecodedPng {
    pub width: u32,
    pub height: u32,
    pub color_type: png::ColorType,
    pub data: Vec<u8>,
}

/// Decode a PNG without any color conversion.
pub fn decode_png(path: &Path) -> DecodedPng {
    let file = File::open(path)
        .unwrap_or_else(|e| panic!("Failed to open {}: {}", path.display(), e));
    let decoder = png::Decoder::new(file);
    let mut reader = decoder.read_info().expect("Failed to read PNG header");
    let mut data = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut data).expect("Failed to decode PNG");
    data.truncate(info.buffer_size());
    DecodedPng {
        width: info.width,
        height: info.height,
        color_type: info.color_type,
        data,
    }
}

/// BLAKE3 hash of a file's bytes.
pub fn hash_file(path: &Path) -> String {
    let data = fs::read(path).unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
    blake3::hash(&data).to_hex().to_string()
}
