//! Source-side collaborator: the learning-management service that exposes
//! courses, sections and downloadable resources.
//!
//! The pipeline only depends on the [`CourseSource`] trait; the concrete
//! [`HttpCourseSource`] talks to the service over HTTP with a session cookie
//! obtained at login. The trait is annotated for `mockall` so tests can
//! script source behaviour deterministically.

use std::time::Duration;

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::Credentials;

/// Error type for source calls (simple boxed error for now).
pub type SourceError = Box<dyn std::error::Error + Send + Sync>;

/// A course as listed for the authenticated account. Immutable snapshot,
/// fetched once per run.
#[derive(Debug, Clone, Deserialize)]
pub struct Course {
    pub id: String,
    pub name: String,
}

/// A section within a course.
#[derive(Debug, Clone, Deserialize)]
pub struct Section {
    pub id: String,
    pub name: String,
}

/// A single downloadable file exposed by a course section. Content is fetched
/// lazily through [`CourseSource::download`].
#[derive(Debug, Clone, Deserialize)]
pub struct Resource {
    pub filename: String,
    /// Download URL, absolute or relative to the source base URL.
    pub url: String,
}

/// Header metadata for a resource, obtained without downloading the body.
#[derive(Debug, Clone)]
pub struct ResourceHeader {
    /// Declared size of the resource body in bytes.
    pub content_length: u64,
}

/// Trait for everything the pipeline asks of the learning-management source.
///
/// All methods are async and may fail; listing failures are not caught by the
/// pipeline and abort the run. Implemented by [`HttpCourseSource`] and by test
/// mocks/fakes.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait CourseSource: Send + Sync {
    /// Authenticate the account. Must succeed before any listing call.
    async fn login(&self, credentials: &Credentials) -> Result<(), SourceError>;

    /// List the courses visible to the authenticated account.
    async fn list_courses(&self) -> Result<Vec<Course>, SourceError>;

    /// List the sections of one course, in course order.
    async fn list_sections(&self, course: &Course) -> Result<Vec<Section>, SourceError>;

    /// List the resources of one section, in section order.
    async fn list_resources(&self, section: &Section) -> Result<Vec<Resource>, SourceError>;

    /// Fetch header metadata for a resource without downloading its body.
    async fn resource_header(&self, resource: &Resource) -> Result<ResourceHeader, SourceError>;

    /// Download the full resource body.
    async fn download(&self, resource: &Resource) -> Result<Vec<u8>, SourceError>;
}

/// HTTP implementation of [`CourseSource`].
///
/// Login establishes a session cookie held by the client's cookie store;
/// subsequent listing and download calls ride on that session. Every request
/// carries the client-wide timeout so a hung call cannot stall its
/// concurrency slot indefinitely.
pub struct HttpCourseSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCourseSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn absolute(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("{}/{}", self.base_url, url.trim_start_matches('/'))
        }
    }
}

#[async_trait]
impl CourseSource for HttpCourseSource {
    async fn login(&self, credentials: &Credentials) -> Result<(), SourceError> {
        let url = format!("{}/login", self.base_url);
        let response = self
            .client
            .post(&url)
            .form(&[
                ("username", credentials.username.as_str()),
                ("password", credentials.password.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(format!("login rejected with status {}", response.status()).into());
        }
        debug!(username = %credentials.username, "Session established");
        Ok(())
    }

    async fn list_courses(&self) -> Result<Vec<Course>, SourceError> {
        let url = format!("{}/api/courses", self.base_url);
        let courses: Vec<Course> = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!(count = courses.len(), "Listed courses");
        Ok(courses)
    }

    async fn list_sections(&self, course: &Course) -> Result<Vec<Section>, SourceError> {
        let url = format!("{}/api/courses/{}/sections", self.base_url, course.id);
        let sections: Vec<Section> = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!(course = %course.name, count = sections.len(), "Listed sections");
        Ok(sections)
    }

    async fn list_resources(&self, section: &Section) -> Result<Vec<Resource>, SourceError> {
        let url = format!("{}/api/sections/{}/resources", self.base_url, section.id);
        let resources: Vec<Resource> = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!(section = %section.name, count = resources.len(), "Listed resources");
        Ok(resources)
    }

    async fn resource_header(&self, resource: &Resource) -> Result<ResourceHeader, SourceError> {
        let url = self.absolute(&resource.url);
        let response = self
            .client
            .head(&url)
            .send()
            .await?
            .error_for_status()?;

        // `Response::content_length` is the body-size hint, which is zero for
        // a HEAD response; the declared size only exists in the header.
        let content_length = response
            .headers()
            .get(reqwest::header::CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<u64>().ok())
            .ok_or_else(|| {
                format!(
                    "source declared no content length for '{}'",
                    resource.filename
                )
            })?;
        Ok(ResourceHeader { content_length })
    }

    async fn download(&self, resource: &Resource) -> Result<Vec<u8>, SourceError> {
        let url = self.absolute(&resource.url);
        let bytes = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        info!(file = %resource.filename, bytes = bytes.len(), "Downloaded resource body");
        Ok(bytes.to_vec())
    }
}
