mod app;
mod config;
mod effects;
mod logging;
mod ui;

pub use app::run_app;

/// Everything the main loop reacts to, in arrival order.
#[derive(Debug)]
pub(crate) enum AppEvent {
    /// A line typed on stdin.
    Line(String),
    /// Stdin reached end of file.
    InputClosed,
    /// Engine completion, already translated for the core.
    Engine(docqa_core::Msg),
}
