pub mod accordion;
pub mod adapt;
pub mod config;
pub mod controller;
pub mod dom;
pub mod error;
pub mod intro;
pub mod lightbox;
pub mod page;
pub mod pointer;
pub mod reveal;
pub mod schedule;
pub mod scroll;
pub mod skills;
pub mod telemetry;
pub mod widgets;

#[cfg(target_arch = "wasm32")]
pub mod frontend;

#[cfg(test)]
mod testing;

pub use config::InteractionConfig;
pub use controller::PageController;
pub use dom::Dom;
pub use error::DomError;
pub use schedule::{debounce, Debounced, Scheduler};
