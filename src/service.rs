use axum::{
    Router,
    extract::{Multipart, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

use crate::{
    helpers::{
        codec,
        report::{ReportBuilder, ReportConfig},
    },
    models::report::{COL_CUSTOMER_NAME, COL_DATE, COL_HOURS, COL_MINUTES, COL_TASK_DESCRIPTION},
};

/// Upload precondition failures, raised before any decoding happens.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("cannot use multiple files: got {0}")]
    MultipleFiles(usize),
    #[error("no file was uploaded")]
    MissingFile,
}

impl IntoResponse for InputError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, self.to_string()).into_response()
    }
}

/// The main report service: accepts one uploaded timesheet workbook and
/// returns the formatted combined report as a download
#[derive(Clone, Default)]
pub struct ReportService {
    pub config: ReportConfig,
}

impl ReportService {
    /// Create a new report service instance
    pub fn new(config: ReportConfig) -> Self {
        info!("Creating new ReportService instance");
        Self { config }
    }

    /// Create an Axum router for the report service
    pub fn router(self) -> Router {
        info!("Creating report service router");
        let shared_state = Arc::new(self);

        Router::new()
            .route("/report-upload", post(report_upload))
            .route("/report-columns", get(report_columns))
            .with_state(shared_state)
    }

    /// Process one uploaded workbook: decode rows, aggregate, encode the
    /// combined report. Synchronous once the upload body has been read.
    pub fn process_upload(&self, bytes: &[u8]) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        info!("Processing uploaded workbook, size: {} bytes", bytes.len());

        let records = codec::decode(bytes)?;
        let rows = ReportBuilder::ingest(records);
        let builder = ReportBuilder::new(self.config.clone());
        let sheet = builder.build_report(&rows);
        let report = codec::encode(&sheet)?;

        info!(
            "Successfully built combined report, size: {} bytes",
            report.len()
        );
        Ok(report)
    }
}

// Route handlers
async fn report_upload(
    State(service): State<Arc<ReportService>>,
    mut multipart: Multipart,
) -> Response {
    info!("Received report upload request");

    let mut files: Vec<Vec<u8>> = Vec::new();
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                // only parts carrying a filename count as uploaded files
                if field.file_name().is_none() {
                    continue;
                }
                match field.bytes().await {
                    Ok(bytes) => files.push(bytes.to_vec()),
                    Err(e) => {
                        error!("Failed to read uploaded field: {}", e);
                        return (
                            StatusCode::BAD_REQUEST,
                            format!("Error reading upload: {}", e),
                        )
                            .into_response();
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                error!("Failed to read multipart body: {}", e);
                return (
                    StatusCode::BAD_REQUEST,
                    format!("Error reading upload: {}", e),
                )
                    .into_response();
            }
        }
    }

    let file = match files.as_slice() {
        [file] => file,
        [] => {
            error!("Upload rejected: no file supplied");
            return InputError::MissingFile.into_response();
        }
        many => {
            error!("Upload rejected: {} files supplied", many.len());
            return InputError::MultipleFiles(many.len()).into_response();
        }
    };

    match service.process_upload(file) {
        Ok(report) => {
            info!("Report upload processed successfully");
            (
                [
                    (
                        header::CONTENT_TYPE,
                        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
                            .to_string(),
                    ),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", codec::REPORT_FILE_NAME),
                    ),
                ],
                report,
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to build combined report: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error building report: {}", e),
            )
                .into_response()
        }
    }
}

async fn report_columns() -> String {
    info!("Listing expected timesheet columns");

    format!(
        "Expected columns in the uploaded timesheet: {}, {}, {}, {}, {}",
        COL_CUSTOMER_NAME, COL_DATE, COL_HOURS, COL_MINUTES, COL_TASK_DESCRIPTION
    )
}
