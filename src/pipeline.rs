use crate::{
    compose::Composer,
    config::Config,
    engine::Engine,
    extract::{self, TEXT_SUFFIX},
    parser,
    record::SubjectRecord,
    report::{BatchReport, InputReport, InputStatus},
    sheet::Workbook,
    style::StyleApplier,
    util::{ensure_dir, hash_file, now_rfc3339, write_atomic},
    xlsx,
};
use anyhow::{Context, Result, anyhow};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub struct Pipeline<E: Engine> {
    cfg: Config,
    engine: E,
}

pub struct BatchOutput {
    pub workbook: Workbook,
    pub records: Vec<SubjectRecord>,
    pub report: BatchReport,
}

/// `.pdf` files directly under `dir`, sorted by file name.
pub fn collect_pdfs(dir: &Path, max_inputs: usize) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("read_dir {}", dir.display()))? {
        let path = entry?.path();
        let is_pdf = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        if path.is_file() && is_pdf {
            out.push(path);
        } else if path.is_file() {
            warn!("skipping non-PDF input {}", path.display());
        }
    }
    out.sort_by_key(|p| p.file_name().map(|n| n.to_os_string()));
    if max_inputs > 0 && out.len() > max_inputs {
        warn!(
            "{} PDFs found; keeping the first {max_inputs}",
            out.len()
        );
        out.truncate(max_inputs);
    }
    Ok(out)
}

pub fn is_text_input(path: &Path) -> bool {
    path.to_string_lossy().ends_with(TEXT_SUFFIX)
}

pub fn parse_text_file(path: &Path) -> Result<SubjectRecord> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parser::parse_record(&text).with_context(|| format!("parse {}", path.display()))
}

impl<E: Engine> Pipeline<E> {
    pub fn new(cfg: &Config, engine: E) -> Self {
        Self {
            cfg: cfg.clone(),
            engine,
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Extracts (unless `input` is already a text file) and parses one input.
    /// Failures are reported, never raised.
    pub fn process_input(
        &self,
        input: &Path,
        text_dir: &Path,
    ) -> (InputReport, Option<SubjectRecord>) {
        let mut report = InputReport {
            input: input.display().to_string(),
            sha256: hash_file(input).ok(),
            text_file: None,
            status: InputStatus::ExtractFailed,
            reason: None,
            mbti_type: None,
        };

        let from_pdf = !is_text_input(input);
        let text_path = if from_pdf {
            match extract::extract_and_save_text(&self.engine, &self.cfg, input, text_dir) {
                Some(p) => p,
                None => {
                    report.reason = Some("text extraction failed".to_string());
                    return (report, None);
                }
            }
        } else {
            input.to_path_buf()
        };
        report.text_file = Some(text_path.display().to_string());

        let parsed = parse_text_file(&text_path);

        if from_pdf && !self.cfg.global.keep_text_files {
            if let Err(e) = std::fs::remove_file(&text_path) {
                warn!("cannot remove {}: {e}", text_path.display());
            }
        }

        match parsed {
            Ok(record) => {
                info!(
                    "accepted {} type={} name={:?}",
                    input.display(),
                    record.mbti_type,
                    record.name
                );
                report.status = InputStatus::Accepted;
                report.mbti_type = Some(record.mbti_type.to_string());
                (report, Some(record))
            }
            Err(err) => {
                warn!("rejected {}: {err:#}", input.display());
                report.status = InputStatus::Rejected;
                report.reason = Some(format!("{err:#}"));
                (report, None)
            }
        }
    }

    /// Processes `inputs` in order behind `prior` rows, then composes and
    /// styles the workbook. Only a composition failure is an error.
    pub fn run_batch(
        &self,
        inputs: &[PathBuf],
        text_dir: &Path,
        prior: Vec<SubjectRecord>,
    ) -> Result<BatchOutput> {
        ensure_dir(text_dir)?;
        let mut report = BatchReport {
            started: now_rfc3339(),
            prior_records: prior.len(),
            ..Default::default()
        };

        let mut composer = Composer::new(&self.cfg.workbook.table_style);
        for record in prior {
            composer.append(record).context("append prior row")?;
        }

        for input in inputs {
            info!("input {}", input.display());
            let (input_report, record) = self.process_input(input, text_dir);
            report.push(input_report);
            if let Some(record) = record {
                composer.append(record).context("append row")?;
            }
        }

        let records = composer.records().to_vec();
        let mut workbook = composer.finish().context("compose workbook")?;
        let style = StyleApplier::new().apply(&mut workbook);
        report.style = Some(style);
        report.finished = now_rfc3339();

        info!(
            "batch accepted={} rejected={} extract_failed={} rows={}",
            report.accepted,
            report.rejected,
            report.extract_failed,
            records.len()
        );

        Ok(BatchOutput {
            workbook,
            records,
            report,
        })
    }

    /// Writes the workbook and, if enabled, the JSON report next to it.
    pub fn save(&self, out: &mut BatchOutput, workbook_path: &Path) -> Result<()> {
        let render = xlsx::write_workbook(&out.workbook, workbook_path)
            .with_context(|| format!("write workbook {}", workbook_path.display()))?;
        out.report.workbook = Some(workbook_path.display().to_string());
        out.report.render = Some(render);

        if !self.cfg.paths.media_dir.trim().is_empty() {
            let media = PathBuf::from(&self.cfg.paths.media_dir);
            ensure_dir(&media)?;
            out.report.media_dir = Some(media.display().to_string());
        }

        if self.cfg.output.write_report_json {
            let dir = workbook_path
                .parent()
                .ok_or_else(|| anyhow!("workbook path has no parent"))?;
            let path = dir.join(&self.cfg.output.report_filename);
            write_atomic(&path, serde_json::to_string_pretty(&out.report)?.as_bytes())?;
        }
        Ok(())
    }
}
