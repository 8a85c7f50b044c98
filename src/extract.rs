//! Text Extractor: PDF to `<stem>_text.txt` with `--- Page N ---` markers.

use crate::{
    config::Config,
    engine::{Engine, ExtractIn},
    parser::page_marker,
    postprocess,
    util::write_atomic,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const TEXT_SUFFIX: &str = "_text.txt";

/// Joins pages under 1-based page markers.
pub fn render_pages(cfg: &Config, pages: &[String]) -> String {
    let mut out = String::new();
    for (i, page) in pages.iter().enumerate() {
        out.push_str(&page_marker(i + 1));
        out.push('\n');
        out.push_str(&postprocess::normalize_page(cfg, page));
        out.push('\n');
    }
    out
}

pub fn text_path_for(pdf: &Path, out_dir: &Path) -> PathBuf {
    let stem = pdf
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    out_dir.join(format!("{stem}{TEXT_SUFFIX}"))
}

/// Extracts `pdf` into `out_dir`. Every failure is logged and yields `None`.
pub fn extract_and_save_text<E: Engine>(
    engine: &E,
    cfg: &Config,
    pdf: &Path,
    out_dir: &Path,
) -> Option<PathBuf> {
    let req = ExtractIn {
        input_pdf: pdf.display().to_string(),
        max_file_size_bytes: cfg.limits.max_input_file_bytes,
    };

    let out = match engine.extract_pages(&req) {
        Ok(out) => out,
        Err(err) => {
            warn!("extract failed for {}: {err:#}", pdf.display());
            return None;
        }
    };
    if !out.ok {
        warn!(
            "extract returned no pages for {}; warnings={:?}",
            pdf.display(),
            out.warnings
        );
        return None;
    }
    for w in &out.warnings {
        warn!("{}: {w}", pdf.display());
    }

    let path = text_path_for(pdf, out_dir);
    let text = render_pages(cfg, &out.pages);
    if let Err(err) = write_atomic(&path, text.as_bytes()) {
        warn!("cannot write {}: {err:#}", path.display());
        return None;
    }

    info!(
        "extracted {} pages engine={} -> {}",
        out.page_count(),
        engine.name(),
        path.display()
    );
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_are_numbered_from_one() {
        let cfg = Config::default();
        let text = render_pages(&cfg, &["alpha \r\nbeta".into(), "gamma\u{000C}".into()]);
        assert_eq!(text, "--- Page 1 ---\nalpha\nbeta\n--- Page 2 ---\ngamma\n");
    }

    #[test]
    fn text_file_name_uses_pdf_stem() {
        let p = text_path_for(Path::new("/in/Jane Doe.pdf"), Path::new("/out"));
        assert_eq!(p, PathBuf::from("/out/Jane Doe_text.txt"));
    }
}
