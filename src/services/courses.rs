// src/services/courses.rs

//! Courses and their required textbooks.

use crate::api::{ApiClient, ApiRequest, segment};
use crate::error::{AppError, Result};
use crate::models::{BookListing, Course};
use crate::services::resource::{Created, Resource, ResourceClient};

impl Resource for Course {
    const COLLECTION: &'static str = "Courses";
    const LABEL: &'static str = "course";

    fn id(&self) -> Option<&str> {
        self.course_id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.course_id = Some(id);
    }

    fn validate(&self) -> Result<()> {
        if self.course_name.trim().is_empty() {
            return Err(AppError::validation("Course name is required."));
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct CourseService {
    client: ResourceClient<Course>,
}

impl CourseService {
    pub fn new(api: ApiClient) -> Self {
        Self {
            client: ResourceClient::new(api),
        }
    }

    pub fn client(&self) -> &ResourceClient<Course> {
        &self.client
    }

    pub async fn list(&self) -> Result<Vec<Course>> {
        self.client.fetch_all().await
    }

    pub fn by_teacher_request(teacher_email: &str) -> ApiRequest {
        ApiRequest::get(format!("/Courses/teacher/{}", segment(teacher_email)))
    }

    /// Courses taught by one teacher.
    pub async fn by_teacher(&self, teacher_email: &str) -> Result<Vec<Course>> {
        self.client.fetch(Self::by_teacher_request(teacher_email)).await
    }

    /// Listings for a course's textbooks.
    pub async fn books_for(&self, course_name: &str) -> Result<Vec<BookListing>> {
        let path = format!("/Courses/books/name/{}", segment(course_name));
        self.client.api().list(ApiRequest::get(path)).await
    }

    pub async fn add(&self, course: &Course) -> Result<Created<Course>> {
        self.client.create(course).await
    }

    pub async fn update(&self, course: &Course) -> Result<()> {
        self.client.update(course).await
    }

    pub async fn delete(&self, course_id: &str) -> Result<()> {
        self.client.delete(course_id).await
    }

    /// Attach a required textbook to a course by name.
    pub async fn add_textbook(&self, course_name: &str, textbook: &str) -> Result<()> {
        if course_name.trim().is_empty() || textbook.trim().is_empty() {
            return Err(AppError::validation("Course name and textbook are required."));
        }
        let request = ApiRequest::post("/Courses/addTextbook")
            .query("courseName", course_name.trim())
            .query("textbook", textbook.trim());
        self.client.api().ack(request).await?;
        Ok(())
    }
}
