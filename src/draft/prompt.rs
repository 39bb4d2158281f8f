//! Drafting prompt and reply parsing

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use super::error::DraftError;
use crate::course::{Course, Lesson, Quiz};

/// Fenced code block around the reply, with or without a language tag
static FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json)?\s*\n(.*?)\n?```").expect("valid regex"));

/// What to draft
#[derive(Debug, Clone)]
pub struct DraftRequest {
    pub topic: String,
    pub lessons: u32,
    pub audience: Option<String>,
}

impl DraftRequest {
    pub fn new(topic: impl Into<String>, lessons: u32) -> Self {
        Self { topic: topic.into(), lessons: lessons.max(1), audience: None }
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }
}

/// System prompt describing the expected JSON shape
pub const SYSTEM_PROMPT: &str = "You write short online courses. Reply with a single JSON object \
and nothing else. Shape: {\"title\": string, \"description\": string, \"lessons\": [{\"title\": \
string, \"content\": markdown string, \"quiz\": {\"title\": string, \"passing_score\": integer \
0-100, \"questions\": [{\"question_text\": string, \"options\": [string], \
\"correct_option_index\": integer}]} or null}]}. Lessons are listed in teaching order. Give \
each question 3 or 4 options.";

/// User prompt for a draft request
pub fn build_prompt(request: &DraftRequest) -> String {
    let mut prompt = format!(
        "Draft a course on \"{}\" with exactly {} lessons.",
        request.topic.trim(),
        request.lessons
    );
    if let Some(audience) = request.audience.as_deref().filter(|a| !a.trim().is_empty()) {
        prompt.push_str(&format!(" The audience is {}.", audience.trim()));
    }
    prompt.push_str(
        " End every lesson except the last with a quiz that checks the lesson's key ideas; \
         learners must pass it to unlock the next lesson.",
    );
    prompt
}

#[derive(Debug, Deserialize)]
struct DraftCourse {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    lessons: Vec<DraftLesson>,
}

#[derive(Debug, Deserialize)]
struct DraftLesson {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    quiz: Option<Quiz>,
}

/// Turn a model reply into a course
///
/// Takes the fenced block if there is one, otherwise the outermost braces.
/// Lessons are numbered 1..=N in reply order and quizzes are normalized.
pub fn parse_course(reply: &str, course_id: &str) -> Result<Course, DraftError> {
    let json = extract_json(reply)
        .ok_or_else(|| DraftError::MalformedDraft("no JSON object in reply".to_string()))?;
    let draft: DraftCourse = serde_json::from_str(json)?;

    if draft.lessons.is_empty() {
        return Err(DraftError::MalformedDraft("draft has no lessons".to_string()));
    }

    let mut course = Course::new(course_id, draft.title.trim());
    course.description = draft.description.filter(|d| !d.trim().is_empty());
    for (order, lesson) in (1u32..).zip(draft.lessons) {
        let quiz = lesson.quiz.map(|mut quiz| {
            quiz.normalize();
            quiz
        });
        let mut built = Lesson::plain(order, lesson.title.trim(), lesson.content);
        built.set_quiz(quiz);
        course.lessons.push(built);
    }

    for issue in course.validate() {
        tracing::warn!("Drafted course problem: {}", issue);
    }
    Ok(course)
}

fn extract_json(reply: &str) -> Option<&str> {
    if let Some(captures) = FENCE_RE.captures(reply) {
        if let Some(body) = captures.get(1) {
            let body = body.as_str().trim();
            if body.starts_with('{') {
                return Some(body);
            }
        }
    }

    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (end > start).then(|| &reply[start..=end])
}

/// Course id derived from a topic: lowercase words joined by dashes
pub fn slug(topic: &str) -> String {
    let words: Vec<String> = topic
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect();
    if words.is_empty() { "course".to_string() } else { words.join("-") }
}
