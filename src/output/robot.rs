//! Robot mode JSON output implementation.

use serde::Serialize;
use tracing::{debug, instrument, trace};

use crate::error::BoothError;
use crate::export::Notice;

use super::{
    ArrangeReport, CaptureReport, ContrastReport, Output, RobotFormat, StyleCatalog, VersionInfo,
};

/// JSON output implementation for agents and scripting.
pub struct RobotOutput {
    format: RobotFormat,
}

impl RobotOutput {
    #[instrument]
    pub fn new(format: RobotFormat) -> Self {
        debug!(?format, "Creating RobotOutput");
        Self { format }
    }

    /// Serialize `data` in the configured format.
    pub fn render<T: Serialize + ?Sized>(&self, data: &T) -> String {
        let rendered = match self.format {
            RobotFormat::Json => serde_json::to_string_pretty(data),
            RobotFormat::JsonCompact => serde_json::to_string(data),
        };
        rendered.unwrap_or_else(|e| {
            serde_json::json!({ "error": true, "message": format!("serialization failed: {e}") })
                .to_string()
        })
    }

    fn output_json<T: Serialize + ?Sized>(&self, data: &T) {
        let json = self.render(data);
        trace!(json_len = json.len(), "JSON serialized");
        println!("{json}");
    }
}

impl Output for RobotOutput {
    fn success(&self, message: &str) {
        self.output_json(&serde_json::json!({
            "success": true,
            "message": message
        }));
    }

    #[instrument(skip(self))]
    fn error(&self, error: &BoothError) {
        debug!(error = %error, "Robot: error");
        eprintln!(
            "{}",
            self.render(&serde_json::json!({
                "error": true,
                "message": error.to_string(),
                "suggestion": error.suggestion(),
                "recoverable": error.is_user_recoverable(),
                "retryable": error.is_retryable(),
            }))
        );
    }

    fn warning(&self, message: &str) {
        self.output_json(&serde_json::json!({
            "warning": true,
            "message": message
        }));
    }

    fn capture_report(&self, report: &CaptureReport) {
        self.output_json(report);
    }

    fn arrangement(&self, report: &ArrangeReport) {
        self.output_json(report);
    }

    fn notice(&self, notice: &Notice) {
        self.output_json(notice);
    }

    fn contrast(&self, report: &ContrastReport) {
        self.output_json(report);
    }

    fn styles(&self, catalog: &StyleCatalog) {
        self.output_json(catalog);
    }

    fn version_info(&self, info: &VersionInfo) {
        self.output_json(info);
    }
}
