//! AI course drafting
//!
//! Asks a text-completion service for a course outline with quizzes and
//! turns the reply into a [`Course`] that can be reviewed and uploaded.

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod prompt;

pub use auth::ApiKeyManager;
pub use client::CompletionClient;
pub use error::DraftError;
pub use models::{CreateMessageRequest, DraftModel, Message, MessageResponse};
pub use prompt::{DraftRequest, build_prompt, parse_course, slug};

use crate::course::Course;

/// Draft a course with the given model
pub async fn draft_course(
    client: &CompletionClient,
    model: DraftModel,
    request: &DraftRequest,
) -> Result<Course, DraftError> {
    tracing::info!(topic = %request.topic, lessons = request.lessons, model = model.display_name(), "drafting course");

    let message = CreateMessageRequest::new(model, vec![Message::user(build_prompt(request))])
        .with_system(prompt::SYSTEM_PROMPT);
    let response = client.send_message(&message).await?;

    if response.stop_reason.as_deref() == Some("max_tokens") {
        tracing::warn!("Draft reply was cut off at the token limit");
    }

    parse_course(&response.text(), &slug(&request.topic))
}
