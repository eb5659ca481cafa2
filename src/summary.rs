//! Machine-readable run result printed by `cdirec run --json`

use serde::Serialize;
use std::path::PathBuf;

use cdirec_engine::RunReport;
use cdirec_utils::CdiError;
use cdirec_utils::error::UserFriendlyError;
use cdirec_utils::types::ErrorKind;

/// One JSON object per run, success or failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init_guess: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_dir: Option<PathBuf>,
    /// Device or solve status, when a stage reported one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl RunSummary {
    #[must_use]
    pub fn from_report(report: &RunReport) -> Self {
        Self {
            ok: true,
            backend: Some(report.backend.to_string()),
            init_guess: Some(report.plan.strategy().to_string()),
            save_dir: Some(report.save_dir.clone()),
            status: Some(report.outcome.status()),
            error_kind: None,
            message: None,
            started_at: Some(report.started_at.to_rfc3339()),
            duration_ms: Some(u64::try_from(report.duration_ms).unwrap_or(u64::MAX)),
        }
    }

    #[must_use]
    pub fn from_error(err: &CdiError) -> Self {
        let status = match err {
            CdiError::SolveFailed { status } | CdiError::DeviceAcquisition { status, .. } => {
                Some(*status)
            }
            _ => None,
        };
        Self {
            ok: false,
            backend: None,
            init_guess: None,
            save_dir: None,
            status,
            error_kind: Some(err.kind()),
            message: Some(err.user_message()),
            started_at: None,
            duration_ms: None,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
