//! Where dropped frames get reported.
//!
//! The frame loop never lets a failed frame escape; it hands the error to a
//! [`DiagnosticSink`] and carries on. [`TracingSink`] logs through
//! `tracing`, [`MemorySink`] keeps failures around for inspection.

use tracing::warn;

use crate::error::FrameError;

/// Receives frame failures from a [`FrameLoop`](crate::animator::FrameLoop).
pub trait DiagnosticSink {
    /// Frame `frame` was dropped because of `error`.
    fn frame_failed(&mut self, frame: u64, error: &FrameError);
}

/// Logs failures at warn level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn frame_failed(&mut self, frame: u64, error: &FrameError) {
        warn!(frame, %error, "frame dropped");
    }
}

/// Collects failures in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    failures: Vec<(u64, FrameError)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failures(&self) -> &[(u64, FrameError)] {
        &self.failures
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn clear(&mut self) {
        self.failures.clear();
    }
}

impl DiagnosticSink for MemorySink {
    fn frame_failed(&mut self, frame: u64, error: &FrameError) {
        self.failures.push((frame, error.clone()));
    }
}

impl<F> DiagnosticSink for F
where
    F: FnMut(u64, &FrameError),
{
    fn frame_failed(&mut self, frame: u64, error: &FrameError) {
        self(frame, error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DrawError;

    #[test]
    fn test_memory_sink_collects() {
        let mut sink = MemorySink::new();
        assert!(sink.is_empty());
        sink.frame_failed(3, &FrameError::Draw(DrawError::NonFinite));
        assert_eq!(sink.failures().len(), 1);
        assert_eq!(sink.failures()[0].0, 3);
        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_closure_sink() {
        let mut seen = Vec::new();
        {
            let mut sink = |frame: u64, _: &FrameError| seen.push(frame);
            sink.frame_failed(7, &FrameError::Panicked("x".into()));
        }
        assert_eq!(seen, vec![7]);
    }
}
