//! Coursegate - a terminal course viewer with quiz-gated lesson progression
//!
//! Students work through a course's lessons in order. A lesson that carries
//! a quiz must be passed before the next lesson unlocks, and every completed
//! lesson or quiz attempt is written back to the enrollment record.

pub mod api;
pub mod app;
pub mod config;
pub mod course;
pub mod draft;
pub mod progress;
pub mod quiz;
pub mod theme;
pub mod ui;
pub mod viewer;

pub use app::App;
pub use config::Config;
pub use theme::Theme;
