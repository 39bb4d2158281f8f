//! Course viewer: load, gate, and advance through a course

pub mod controller;

pub use controller::{
    Advance, CourseViewerController, ViewerError, ViewerPhase, initial_active_lesson, initial_phase,
};
