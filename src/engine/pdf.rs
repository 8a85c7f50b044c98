use super::{Engine, ExtractIn, ExtractOut};
use anyhow::{Context, Result, anyhow};
use std::path::Path;
use tracing::debug;

/// Native text layer extraction through `pdf-extract`.
#[derive(Debug, Clone, Default)]
pub struct PdfExtractEngine;

impl PdfExtractEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Engine for PdfExtractEngine {
    fn name(&self) -> &'static str {
        "pdf-extract"
    }

    fn extract_pages(&self, req: &ExtractIn) -> Result<ExtractOut> {
        let path = Path::new(&req.input_pdf);
        let meta = std::fs::metadata(path).with_context(|| format!("stat {}", path.display()))?;
        if req.max_file_size_bytes > 0 && meta.len() > req.max_file_size_bytes {
            return Err(anyhow!(
                "input exceeds max_input_file_bytes ({} > {}): {}",
                meta.len(),
                req.max_file_size_bytes,
                path.display()
            ));
        }

        let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
        debug!("pdf-extract {} bytes={}", path.display(), bytes.len());

        // pdf-extract panics on some malformed content streams.
        let pages = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(&bytes))
            .map_err(|_| anyhow!("pdf-extract panicked on {}", path.display()))?
            .map_err(|e| anyhow!("pdf-extract failed on {}: {e}", path.display()))?;

        let mut warnings = Vec::new();
        if pages.iter().all(|p| p.trim().is_empty()) {
            warnings.push("no text layer found".to_string());
        }

        Ok(ExtractOut {
            ok: !pages.is_empty(),
            pages,
            warnings,
        })
    }
}
