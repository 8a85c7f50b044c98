use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractIn {
    pub input_pdf: String,
    /// Zero disables the check.
    pub max_file_size_bytes: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractOut {
    pub ok: bool,
    /// One entry per page, in page order.
    pub pages: Vec<String>,
    pub warnings: Vec<String>,
}

impl ExtractOut {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}
