// src/progress.rs
/// Lightweight progress reporting used by research runs.
/// Frontends (GUI/CLI) implement this to surface status to users.
pub trait Progress {
    /// Called when a batch starts, with the brands it covers.
    fn begin(&mut self, _batch_number: usize, _brands: &[String]) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// One brand of the batch finished (all cells, all competitors).
    fn item_done(&mut self, _brand: &str) {}

    /// A search or fetch failed; already written to the run's error log.
    fn item_failed(&mut self, _msg: &str) {}

    /// Called at the end of the batch, successful or not.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}
