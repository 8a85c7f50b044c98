use crate::{style::StyleReport, xlsx::RenderReport};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputStatus {
    Accepted,
    Rejected,
    ExtractFailed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputReport {
    pub input: String,
    pub sha256: Option<String>,
    pub text_file: Option<String>,
    pub status: InputStatus,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub mbti_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub started: String,
    pub finished: String,
    pub workbook: Option<String>,
    /// Where the dual-graph compositor reads and writes images for this run.
    pub media_dir: Option<String>,
    /// Rows carried over from an existing workbook.
    pub prior_records: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub extract_failed: usize,
    pub inputs: Vec<InputReport>,
    pub style: Option<StyleReport>,
    pub render: Option<RenderReport>,
}

impl BatchReport {
    pub fn push(&mut self, input: InputReport) {
        match input.status {
            InputStatus::Accepted => self.accepted += 1,
            InputStatus::Rejected => self.rejected += 1,
            InputStatus::ExtractFailed => self.extract_failed += 1,
        }
        self.inputs.push(input);
    }
}
