//! Progress accounting for pack runs.
//!
//! A run is divided into units: every requested output costs one unit for the
//! interleave pass and one for the write. Reported values are
//! `(units_done + fraction_of_current_unit) / total_units`, clamped so the
//! sequence never goes backwards.

use crate::packer::PackError;

/// Receiver of progress values in `[0, 1]`.
///
/// Any `FnMut(f32)` closure is a sink. Implementors may also request that the
/// run stops; the packer polls [`ProgressSink::is_cancelled`] while
/// interleaving and before each write.
pub trait ProgressSink {
    fn report(&mut self, progress: f32);

    fn is_cancelled(&self) -> bool {
        false
    }
}

impl<F: FnMut(f32)> ProgressSink for F {
    fn report(&mut self, progress: f32) {
        self(progress)
    }
}

/// Sink that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _progress: f32) {}
}

pub(crate) struct ProgressTracker<'a, S: ProgressSink + ?Sized> {
    sink: &'a mut S,
    total_units: u32,
    units_done: u32,
    last: f32,
}

impl<'a, S: ProgressSink + ?Sized> ProgressTracker<'a, S> {
    pub(crate) fn new(sink: &'a mut S, total_units: u32) -> Self {
        Self {
            sink,
            total_units,
            units_done: 0,
            last: 0.0,
        }
    }

    /// Report progress within the current unit, then poll for cancellation.
    pub(crate) fn report_fraction(&mut self, fraction: f32) -> Result<(), PackError> {
        let value = if self.total_units == 0 {
            0.0
        } else {
            (self.units_done as f32 + fraction.clamp(0.0, 1.0)) / self.total_units as f32
        };
        self.emit(value);
        self.check_cancelled()
    }

    /// Close the current unit and report the new boundary.
    pub(crate) fn finish_unit(&mut self) {
        self.units_done = (self.units_done + 1).min(self.total_units);
        log::debug!("progress unit {}/{}", self.units_done, self.total_units);
        let value = if self.total_units == 0 {
            0.0
        } else {
            self.units_done as f32 / self.total_units as f32
        };
        self.emit(value);
    }

    pub(crate) fn check_cancelled(&self) -> Result<(), PackError> {
        if self.sink.is_cancelled() {
            return Err(PackError::Cancelled);
        }
        Ok(())
    }

    /// Terminal report; always exactly 1.0.
    pub(crate) fn complete(&mut self) {
        self.last = 1.0;
        self.sink.report(1.0);
    }

    fn emit(&mut self, value: f32) {
        let value = value.clamp(self.last, 1.0);
        self.last = value;
        self.sink.report(value);
    }
}
