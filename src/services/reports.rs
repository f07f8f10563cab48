// src/services/reports.rs

//! Moderation reports filed against sellers or books.

use crate::api::{ApiClient, ApiRequest};
use crate::error::{AppError, Result};
use crate::models::{Report, ReportKind};
use crate::services::resource::{Created, Resource, ResourceClient};

impl Resource for Report {
    const COLLECTION: &'static str = "Reports";
    const LABEL: &'static str = "report";

    fn id(&self) -> Option<&str> {
        self.report_id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.report_id = Some(id);
    }

    fn validate(&self) -> Result<()> {
        require("content", Some(&self.content))
    }
}

#[derive(Clone)]
pub struct ReportService {
    client: ResourceClient<Report>,
}

impl ReportService {
    pub fn new(api: ApiClient) -> Self {
        Self {
            client: ResourceClient::new(api),
        }
    }

    pub fn client(&self) -> &ResourceClient<Report> {
        &self.client
    }

    pub async fn list(&self) -> Result<Vec<Report>> {
        self.client.fetch_all().await
    }

    pub async fn add(&self, report: &Report) -> Result<Created<Report>> {
        self.client.create(report).await
    }

    pub async fn update(&self, report: &Report) -> Result<()> {
        self.client.update(report).await
    }

    pub async fn delete(&self, report_id: &str) -> Result<()> {
        self.client.delete(report_id).await
    }

    /// File a report about a seller. Returns the new report id when the server gives one.
    pub async fn report_seller(
        &self,
        reported_by: &str,
        seller_email: &str,
        content: &str,
    ) -> Result<Option<String>> {
        let mut report = Report::new(content.trim());
        report.report_type = Some(ReportKind::Seller);
        report.reported_by = Some(reported_by.trim().to_string());
        report.seller_email = Some(seller_email.trim().to_string());

        require("reportedBy", report.reported_by.as_ref())?;
        require("sellerEmail", report.seller_email.as_ref())?;
        require("content", Some(&report.content))?;
        self.submit("/Reports/add/seller", &report).await
    }

    /// File a report about a book.
    pub async fn report_book(
        &self,
        reported_by: &str,
        book_title: &str,
        content: &str,
    ) -> Result<Option<String>> {
        let mut report = Report::new(content.trim());
        report.report_type = Some(ReportKind::Book);
        report.reported_by = Some(reported_by.trim().to_string());
        report.user_email = Some(reported_by.trim().to_string());
        report.book_title = Some(book_title.trim().to_string());

        require("reportedBy", report.reported_by.as_ref())?;
        require("bookTitle", report.book_title.as_ref())?;
        require("content", Some(&report.content))?;
        self.submit("/Reports/add/book", &report).await
    }

    async fn submit(&self, path: &str, report: &Report) -> Result<Option<String>> {
        let request = ApiRequest::post(path).json(report)?;
        let envelope = self.client.api().envelope::<String>(request).await?;
        log::info!("Filed {} report", path.rsplit('/').next().unwrap_or("general"));
        Ok(envelope.data.filter(|id| !id.is_empty()))
    }
}

fn require(field: &str, value: Option<&String>) -> Result<()> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(AppError::validation(format!("Missing required field: {field}"))),
    }
}
