//! Single-line terminal progress display.

use std::io::{self, IsTerminal, Write};
use std::time::Instant;

use ormtool_pack::anim::LoadingSpinner;

const FRAMES: [char; 8] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧'];
const BAR_WIDTH: usize = 30;

/// Format one progress line: spinner glyph, bar, percentage.
pub(crate) fn render(progress: f32, spinner: &LoadingSpinner) -> String {
    let progress = progress.clamp(0.0, 1.0);
    let filled = ((progress * BAR_WIDTH as f32).round() as usize).min(BAR_WIDTH);
    format!(
        "{} [{}{}] {:>3}%",
        FRAMES[spinner.frame(FRAMES.len())],
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        (progress * 100.0).floor() as u32
    )
}

/// Redraws the progress line on stderr while a pack runs.
pub(crate) struct ProgressLine {
    spinner: LoadingSpinner,
    last_tick: Instant,
    enabled: bool,
}

impl ProgressLine {
    /// Draws only when `visible` and stderr is a terminal.
    pub(crate) fn new(visible: bool) -> Self {
        Self {
            spinner: LoadingSpinner::new(),
            last_tick: Instant::now(),
            enabled: visible && io::stderr().is_terminal(),
        }
    }

    pub(crate) fn tick(&mut self, progress: f32) {
        let now = Instant::now();
        self.spinner
            .update(now.duration_since(self.last_tick).as_secs_f32());
        self.last_tick = now;

        if self.enabled {
            let mut stderr = io::stderr().lock();
            let _ = write!(stderr, "\r{}", render(progress, &self.spinner));
            let _ = stderr.flush();
        }
    }

    /// Clear the line so following output starts at column 0.
    pub(crate) fn finish(&mut self) {
        if self.enabled {
            let mut stderr = io::stderr().lock();
            let _ = write!(stderr, "\r{}\r", " ".repeat(BAR_WIDTH + 10));
            let _ = stderr.flush();
        }
    }
}
