//! Local read-through cache
//!
//! Keeps the last server copy of each course and enrollment on disk so the
//! viewer can show something while offline. The server stays the source of
//! truth: collaborator methods always go to the wrapped backend, and cached
//! copies are only reachable through the explicit `peek_*` methods.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::{CourseApi, EnrollmentApi, EnrollmentUpdate};
use crate::config::Config;
use crate::course::Course;
use crate::progress::Enrollment;

/// A cached record with the time it was last confirmed by the server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedCopy<T> {
    pub value: T,
    pub cached_at: DateTime<Utc>,
}

/// JSON files under a cache directory
#[derive(Debug, Clone)]
pub struct LocalCache {
    dir: PathBuf,
}

impl LocalCache {
    /// Cache rooted at an explicit directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Cache in the platform data directory
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(Config::data_dir()?.join("cache")))
    }

    /// Root directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn course_path(&self, course_id: &str) -> PathBuf {
        self.dir.join("courses").join(format!("{}.json", file_key(course_id)))
    }

    fn enrollment_path(&self, student_email: &str, course_id: &str) -> PathBuf {
        self.dir
            .join("enrollments")
            .join(format!("{}--{}.json", file_key(student_email), file_key(course_id)))
    }

    /// Store a server-confirmed course
    pub fn put_course(&self, course: &Course) -> Result<()> {
        write_json(&self.course_path(&course.id), course)
    }

    /// Store a server-confirmed enrollment
    pub fn put_enrollment(&self, enrollment: &Enrollment) -> Result<()> {
        write_json(&self.enrollment_path(&enrollment.student_email, &enrollment.course_id), enrollment)
    }

    /// Last cached copy of a course
    pub fn course(&self, course_id: &str) -> Result<Option<CachedCopy<Course>>> {
        read_json(&self.course_path(course_id))
    }

    /// Last cached copy of an enrollment
    pub fn enrollment(
        &self,
        student_email: &str,
        course_id: &str,
    ) -> Result<Option<CachedCopy<Enrollment>>> {
        read_json(&self.enrollment_path(student_email, course_id))
    }
}

/// Make an identifier safe to use as a file name
fn file_key(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@') { c } else { '_' })
        .collect()
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create cache directory {:?}", parent))?;
    }

    let copy = CachedCopy { value, cached_at: Utc::now() };
    let contents =
        serde_json::to_string_pretty(&copy).with_context(|| "Failed to serialize cache entry")?;

    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write cache entry {:?}", path))?;

    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<CachedCopy<T>>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read cache entry {:?}", path))?;
    let copy = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse cache entry {:?}", path))?;
    Ok(Some(copy))
}

/// Backend wrapper writing every server-confirmed record through to disk
pub struct CachedBackend<B> {
    inner: B,
    cache: LocalCache,
}

impl<B> CachedBackend<B> {
    /// Wrap a backend
    pub fn new(inner: B, cache: LocalCache) -> Self {
        Self { inner, cache }
    }

    /// The wrapped backend
    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// Advisory copy of a course; never authoritative
    pub fn peek_course(&self, course_id: &str) -> Option<CachedCopy<Course>> {
        self.cache.course(course_id).unwrap_or_else(|e| {
            tracing::warn!("Ignoring unreadable course cache: {:#}", e);
            None
        })
    }

    /// Advisory copy of an enrollment; never authoritative
    pub fn peek_enrollment(
        &self,
        student_email: &str,
        course_id: &str,
    ) -> Option<CachedCopy<Enrollment>> {
        self.cache.enrollment(student_email, course_id).unwrap_or_else(|e| {
            tracing::warn!("Ignoring unreadable enrollment cache: {:#}", e);
            None
        })
    }

    fn remember(&self, result: Result<()>) {
        if let Err(e) = result {
            tracing::warn!("Failed to update local cache: {:#}", e);
        }
    }
}

#[async_trait]
impl<B: CourseApi> CourseApi for CachedBackend<B> {
    fn backend_tag(&self) -> &'static str {
        self.inner.backend_tag()
    }

    async fn get_course(&self, course_id: &str) -> Result<Course, ApiError> {
        let course = self.inner.get_course(course_id).await?;
        self.remember(self.cache.put_course(&course));
        Ok(course)
    }
}

#[async_trait]
impl<B: EnrollmentApi> EnrollmentApi for CachedBackend<B> {
    async fn find_enrollments(
        &self,
        student_email: &str,
        course_id: &str,
    ) -> Result<Vec<Enrollment>, ApiError> {
        let enrollments = self.inner.find_enrollments(student_email, course_id).await?;
        if let Some(enrollment) = enrollments.first() {
            self.remember(self.cache.put_enrollment(enrollment));
        }
        Ok(enrollments)
    }

    async fn update_enrollment(
        &self,
        enrollment_id: &str,
        update: &EnrollmentUpdate,
    ) -> Result<Enrollment, ApiError> {
        let saved = self.inner.update_enrollment(enrollment_id, update).await?;
        self.remember(self.cache.put_enrollment(&saved));
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::InMemoryBackend;
    use crate::course::Lesson;
    use tempfile::TempDir;

    fn backend(dir: &TempDir) -> CachedBackend<InMemoryBackend> {
        let mut course = Course::new("c1", "Course");
        course.lessons.push(Lesson::plain(1, "Intro", ""));
        let inner = InMemoryBackend::new()
            .with_course(course)
            .with_enrollment(Enrollment::new("e1", "s@example.com", "c1"));
        CachedBackend::new(inner, LocalCache::new(dir.path()))
    }

    #[test]
    fn file_key_replaces_separators() {
        assert_eq!(file_key("a/b\\c d"), "a_b_c_d");
        assert_eq!(file_key("s@example.com"), "s@example.com");
    }

    #[tokio::test]
    async fn reads_are_written_through() {
        let dir = TempDir::new().unwrap();
        let backend = backend(&dir);
        assert!(backend.peek_course("c1").is_none());

        backend.get_course("c1").await.unwrap();
        backend.find_enrollments("s@example.com", "c1").await.unwrap();

        assert_eq!(backend.peek_course("c1").unwrap().value.title, "Course");
        assert_eq!(backend.peek_enrollment("s@example.com", "c1").unwrap().value.id, "e1");
    }

    #[tokio::test]
    async fn failed_update_does_not_touch_cache() {
        let dir = TempDir::new().unwrap();
        let backend = backend(&dir);
        backend.find_enrollments("s@example.com", "c1").await.unwrap();

        backend.inner().set_fail_updates(true);
        let update = EnrollmentUpdate { progress: Vec::new(), completion_percentage: 100.0 };
        assert!(backend.update_enrollment("e1", &update).await.is_err());

        let cached = backend.peek_enrollment("s@example.com", "c1").unwrap();
        assert_eq!(cached.value.completion_percentage, 0.0);
    }

    #[tokio::test]
    async fn server_errors_are_not_masked_by_cache() {
        let dir = TempDir::new().unwrap();
        let backend = backend(&dir);
        backend.get_course("c1").await.unwrap();

        assert!(backend.get_course("other").await.unwrap_err().is_not_found());
    }
}
