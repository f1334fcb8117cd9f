//! Graph-wide configuration.

/// How the graph treats NaN and infinite values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Any non-finite forward value, local derivative or gradient aborts the pass with
    /// [`ADError::NonFinite`](crate::errors::ADError::NonFinite).
    #[default]
    Strict,
    /// Non-finite values are propagated and only traced.
    Lenient,
}

/// Options fixed when a [`Graph`](crate::graph::Graph) is created.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GraphConfig {
    pub mode: Mode,
}

impl GraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }
}
