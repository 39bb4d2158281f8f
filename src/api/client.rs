//! HTTP client for the course backend

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};

use super::error::ApiError;
use super::{CourseApi, EnrollmentApi, EnrollmentUpdate};
use crate::course::Course;
use crate::progress::Enrollment;

/// JSON REST client for courses and enrollments
pub struct RestClient {
    /// HTTP client
    client: Client,
    /// API root, without trailing slash
    base_url: String,
    /// Bearer token, if the backend requires one
    token: Option<String>,
}

impl RestClient {
    /// Environment variable holding the bearer token
    pub const TOKEN_ENV: &'static str = "COURSEGATE_API_TOKEN";

    /// Create a new client for the given API root
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self { client, base_url, token })
    }

    /// Create a client reading the bearer token from the environment
    pub fn from_env(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let token = std::env::var(Self::TOKEN_ENV).ok().filter(|t| !t.is_empty());
        Self::new(base_url, token, timeout)
    }

    /// Build a full URL for an API path
    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Attach authentication headers
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Map HTTP error statuses onto API errors
    async fn check(response: Response, resource: impl FnOnce() -> String) -> Result<Response, ApiError> {
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound { resource: resource() });
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::ApiError { status: status.as_u16(), message });
        }

        Ok(response)
    }
}

#[async_trait]
impl CourseApi for RestClient {
    fn backend_tag(&self) -> &'static str {
        "rest"
    }

    async fn get_course(&self, course_id: &str) -> Result<Course, ApiError> {
        tracing::debug!(course_id, "fetching course");
        let response = self
            .authorize(self.client.get(self.url(&format!("courses/{course_id}"))))
            .send()
            .await?;
        let response = Self::check(response, || format!("course {course_id}")).await?;

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl EnrollmentApi for RestClient {
    async fn find_enrollments(
        &self,
        student_email: &str,
        course_id: &str,
    ) -> Result<Vec<Enrollment>, ApiError> {
        tracing::debug!(student_email, course_id, "looking up enrollment");
        let response = self
            .authorize(self.client.get(self.url("enrollments")))
            .query(&[("student_email", student_email), ("course_id", course_id)])
            .send()
            .await?;
        let response = Self::check(response, || "enrollments".to_string()).await?;

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn update_enrollment(
        &self,
        enrollment_id: &str,
        update: &EnrollmentUpdate,
    ) -> Result<Enrollment, ApiError> {
        tracing::debug!(enrollment_id, "updating enrollment");
        let response = self
            .authorize(self.client.put(self.url(&format!("enrollments/{enrollment_id}"))))
            .json(update)
            .send()
            .await?;
        let response = Self::check(response, || format!("enrollment {enrollment_id}")).await?;

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation_trims_trailing_slash() {
        let client =
            RestClient::new("https://api.example.com/v1/", None, Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url, "https://api.example.com/v1");
        assert_eq!(client.url("/courses/c1"), "https://api.example.com/v1/courses/c1");
        assert_eq!(client.url("enrollments"), "https://api.example.com/v1/enrollments");
    }

    #[test]
    fn client_keeps_token() {
        let client = RestClient::new(
            "http://localhost:8080",
            Some("secret".into()),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.token.as_deref(), Some("secret"));
        assert_eq!(client.backend_tag(), "rest");
    }
}
