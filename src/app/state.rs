//! Application state definitions

use crate::api::Backend;
use crate::course::{ContentBlock, content};
use crate::progress::{LessonState, WriteState};
use crate::quiz::QuizSession;
use crate::viewer::{CourseViewerController, ViewerPhase};

/// Which screen is currently displayed
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Screen {
    #[default]
    Loading,
    /// No enrollment for this course
    NotEnrolled,
    /// Enrolled but the course has no lessons
    Empty,
    /// Lesson sidebar, lesson content and status line
    Main,
    /// Every lesson completed
    Complete,
    /// The course could not be loaded
    Fatal(String),
}

/// Which panel is currently focused
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Panel {
    Lessons,
    #[default]
    Content,
}

/// One row of the lesson sidebar
#[derive(Debug, Clone, PartialEq)]
pub struct LessonRow {
    pub order: u32,
    pub title: String,
    pub state: LessonState,
    pub has_quiz: bool,
    /// Score of the last attempt, if any
    pub quiz_score: Option<f64>,
}

/// State for the lesson sidebar
#[derive(Debug, Clone, Default)]
pub struct SidebarState {
    /// Selected row index
    pub selected_index: usize,
    /// Scroll offset for long courses
    pub scroll_offset: usize,
    /// Visible height in rows (updated on render)
    pub visible_height: usize,
}

impl SidebarState {
    /// Ensure the selected row is visible by adjusting scroll offset
    pub fn ensure_selection_visible(&mut self) {
        if self.selected_index < self.scroll_offset {
            self.scroll_offset = self.selected_index;
        }
        let visible = self.visible_height;
        if visible > 0 && self.selected_index >= self.scroll_offset + visible {
            self.scroll_offset = self.selected_index + 1 - visible;
        }
    }

    /// Move the selection by `delta` rows within `len` rows
    pub fn move_selection(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.selected_index = 0;
            return;
        }
        let target = self.selected_index as isize + delta;
        self.selected_index = target.clamp(0, len as isize - 1) as usize;
        self.ensure_selection_visible();
    }
}

/// State for content rendering
#[derive(Debug, Clone, Default)]
pub struct ContentState {
    /// Current scroll position (lines from top)
    pub scroll_offset: usize,
    /// Total rendered lines (updated on render)
    pub total_lines: usize,
    /// Visible height in lines (updated on render)
    pub visible_height: usize,
}

impl ContentState {
    /// Get the maximum allowed scroll offset
    pub fn max_scroll(&self) -> usize {
        self.total_lines.saturating_sub(self.visible_height / 2)
    }

    /// Clamp scroll offset to valid range
    pub fn clamp_scroll(&mut self) {
        self.scroll_offset = self.scroll_offset.min(self.max_scroll());
    }

    /// Scroll by a number of lines (negative is up)
    pub fn scroll_by(&mut self, delta: isize) {
        self.scroll_offset = self.scroll_offset.saturating_add_signed(delta);
        self.clamp_scroll();
    }
}

/// Bottom line: messages, errors and save state
#[derive(Debug, Clone, Default)]
pub struct StatusLine {
    pub message: Option<String>,
    pub is_error: bool,
}

impl StatusLine {
    /// Set a status message
    pub fn set_message(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.is_error = false;
    }

    /// Set an error message
    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.is_error = true;
    }

    pub fn clear(&mut self) {
        self.message = None;
        self.is_error = false;
    }
}

/// Full application state
///
/// A render snapshot of the viewer plus pure UI state (focus, scroll,
/// quiz overlay). Refreshed from the controller after every action.
#[derive(Debug, Default)]
pub struct AppState {
    /// Current screen
    pub screen: Screen,

    pub course_title: String,

    /// Sidebar rows sorted by lesson order
    pub lessons: Vec<LessonRow>,

    /// Lesson being studied
    pub active_order: Option<u32>,

    /// Rendered blocks of the active lesson
    pub active_blocks: Vec<ContentBlock>,

    /// Stored completion percentage
    pub completion: f64,

    /// Currently focused panel
    pub focused_panel: Panel,

    pub sidebar: SidebarState,

    pub content: ContentState,

    /// Quiz overlay, when open
    pub quiz: Option<QuizSession>,

    pub status: StatusLine,

    /// State of the last progress write
    pub write_state: WriteState,

    /// A rejected result is waiting for retry
    pub unsaved: bool,
}

impl AppState {
    /// Refresh the snapshot from the controller
    pub fn sync<B: Backend + ?Sized>(&mut self, viewer: &CourseViewerController<B>) {
        let course = viewer.course();
        self.course_title = course.title.clone();
        self.completion = viewer.completion_percentage();
        self.write_state = viewer.write_state().clone();
        self.unsaved = viewer.has_unsaved_result();

        let enrollment = viewer.enrollment();
        self.lessons = viewer
            .lesson_states()
            .into_iter()
            .map(|(lesson, state)| LessonRow {
                order: lesson.order,
                title: lesson.title.clone(),
                state,
                has_quiz: lesson.has_quiz(),
                quiz_score: enrollment
                    .and_then(|e| e.lesson(lesson.order))
                    .and_then(|entry| entry.quiz_score),
            })
            .collect();

        let active = viewer.active_lesson();
        let active_order = active.map(|lesson| lesson.order);
        if active_order != self.active_order {
            self.active_blocks = active.map(|l| content::to_blocks(&l.content)).unwrap_or_default();
            self.content.scroll_offset = 0;
            if let Some(index) = self.lessons.iter().position(|row| Some(row.order) == active_order) {
                self.sidebar.selected_index = index;
                self.sidebar.ensure_selection_visible();
            }
        }
        self.active_order = active_order;

        self.screen = match viewer.phase() {
            ViewerPhase::NotEnrolled => Screen::NotEnrolled,
            ViewerPhase::Empty => Screen::Empty,
            ViewerPhase::Learning { .. } => Screen::Main,
            ViewerPhase::Complete => Screen::Complete,
        };
    }

    /// Lesson row under the sidebar cursor
    pub fn selected_lesson(&self) -> Option<&LessonRow> {
        self.lessons.get(self.sidebar.selected_index)
    }

    /// Title of the lesson being studied
    pub fn active_title(&self) -> Option<&str> {
        let order = self.active_order?;
        self.lessons.iter().find(|row| row.order == order).map(|row| row.title.as_str())
    }

    /// Whether the quiz overlay is open
    pub fn quiz_open(&self) -> bool {
        self.quiz.is_some()
    }
}
