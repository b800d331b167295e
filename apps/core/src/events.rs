use crate::model::ResultItem;

/// Which mode the controller is in, as reported to the presentation layer
/// so it can adjust placeholder text and sizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeSignal {
    Free,
    Plugin { name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceSignal {
    Toggle,
    Hide,
}

/// Everything the core tells the presentation layer. The core never touches
/// presentation state directly; it emits these over a channel and the shell
/// decides what showing, hiding, or rendering means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreEvent {
    /// A coherent result list answering `query`. Replaces whatever is shown.
    Results {
        query: String,
        items: Vec<ResultItem>,
    },
    Mode(ModeSignal),
    Surface(SurfaceSignal),
}
