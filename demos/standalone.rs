use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use combined_report_util::{ReportConfig, ReportService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting Combined Report Service example");

    // Header identities (in a real deployment, adjust per resource)
    let config = ReportConfig::default();

    // Create the report service
    let report_service = ReportService::new(config);

    // Create router with the report service
    let app = Router::new()
        .nest("/api/report", report_service.router())
        .route("/health", axum::routing::get(|| async { "OK" }));

    // Start server
    let listener = TcpListener::bind("0.0.0.0:3000").await?;
    info!("Server running on http://0.0.0.0:3000");

    axum::serve(listener, app).await?;

    Ok(())
}

/*
Example usage of the service:

1. POST /api/report/report-upload
   - Multipart upload of exactly one timesheet workbook
   - Responds with CombinedReport.xlsx as an attachment

2. GET /api/report/report-columns
   - Returns the expected input column layout

The service will:
- Decode the uploaded workbook into timesheet rows
- Aggregate effort per date and split the task descriptions
- Return the formatted combined report workbook
*/
