//! Machine-readable run result printed by `deploy --json`.

use gtm_core::RunReport;
use gtm_model::ErrorCode;
use serde::Serialize;

pub const SUCCESS_MESSAGE: &str = "Uploaded and processed successfully.";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployResult<'a> {
    /// `SUCCESS` or `FAILED`.
    pub status: &'static str,
    pub message: String,
    pub error_code: Option<ErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixel: Option<&'a str>,
    pub report: &'a RunReport,
}

impl<'a> DeployResult<'a> {
    pub fn new(report: &'a RunReport, pixel: Option<&'a str>) -> Self {
        if report.is_success() {
            return Self {
                status: "SUCCESS",
                message: SUCCESS_MESSAGE.to_string(),
                error_code: None,
                pixel,
                report,
            };
        }
        let code = report
            .error_code
            .unwrap_or_else(|| ErrorCode::classify(&report.failure_text()));
        Self {
            status: "FAILED",
            message: failure_message(code, &report.failure_text()),
            error_code: Some(code),
            pixel,
            report,
        }
    }
}

/// Known codes get a fixed message; otherwise the last line of output.
pub fn failure_message(code: ErrorCode, failure_text: &str) -> String {
    if code != ErrorCode::UnknownError {
        return code.user_message().to_string();
    }
    failure_text
        .lines()
        .map(str::trim)
        .rfind(|line| !line.is_empty())
        .unwrap_or(code.user_message())
        .to_string()
}
