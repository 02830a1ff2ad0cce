//! First-success combinator for prioritized fallback chains

use std::fmt::Debug;

use tracing::debug;

use crate::error::SourceError;

/// Outcome of a single chain step
pub type StepResult<T> = std::result::Result<T, SourceError>;

/// An ordered list of steps; running it yields the first step that succeeds.
///
/// A failing step is logged and skipped, it never aborts the chain.
pub struct Chain<'a, S, T> {
    steps: Vec<(S, Box<dyn Fn() -> StepResult<T> + 'a>)>,
}

impl<'a, S: Copy + Debug, T> Chain<'a, S, T> {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Append a step tagged with the source it reads from
    pub fn step(mut self, source: S, step: impl Fn() -> StepResult<T> + 'a) -> Self {
        self.steps.push((source, Box::new(step)));
        self
    }

    /// Run steps in order until one succeeds
    pub fn run(self) -> Option<(S, T)> {
        for (source, step) in self.steps {
            match step() {
                Ok(value) => {
                    debug!(source = ?source, "extraction step succeeded");
                    return Some((source, value));
                }
                Err(e) => debug!(source = ?source, error = %e, "extraction step produced nothing"),
            }
        }
        None
    }
}

impl<'a, S: Copy + Debug, T> Default for Chain<'a, S, T> {
    fn default() -> Self {
        Self::new()
    }
}
