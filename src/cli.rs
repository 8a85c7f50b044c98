use crate::{
    config::Config,
    engine::pdf::PdfExtractEngine,
    extract,
    pipeline::{self, Pipeline},
    util::ensure_dir,
    xlsx,
};
use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "mbti-engine")]
#[command(about = "MBTI Step II report extraction and workbook aggregation")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./mbti-engine.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write `<stem>_text.txt` for one PDF.
    Extract {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Print the parsed record of one PDF or `_text.txt` file as JSON.
    Parse {
        #[arg(long)]
        input: PathBuf,
    },
    /// Build a styled workbook from every PDF in a directory.
    Group {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        out_dir: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Add one subject to an existing workbook.
    Append {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        workbook: PathBuf,
    },
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg_path = resolve_config_path(args.config.as_deref());
    let cfg = Config::load(&cfg_path)?;

    match &args.cmd {
        Command::Extract { input, out_dir } => {
            let out_dir = out_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(&cfg.paths.text_dir));
            let _guard = init_logging(&args, &cfg, resolve_log_path(&cfg, None).as_deref())?;
            extract_one(&cfg, input, &out_dir)
        }
        Command::Parse { input } => {
            let _guard = init_logging(&args, &cfg, resolve_log_path(&cfg, None).as_deref())?;
            parse_one(&cfg, input)
        }
        Command::Group {
            input,
            out_dir,
            output,
        } => group(&args, &cfg, input.as_deref(), out_dir.as_deref(), output.as_deref()),
        Command::Append { input, workbook } => append(&args, &cfg, input, workbook),
    }
}

fn resolve_config_path(user: Option<&Path>) -> PathBuf {
    if let Some(p) = user {
        return p.to_path_buf();
    }
    let default = PathBuf::from("mbti-engine.toml");
    if default.exists() {
        default
    } else {
        PathBuf::from("mbti-engine.example.toml")
    }
}

fn init_logging(args: &Args, cfg: &Config, file_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stdout_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = file_path {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn extract_one(cfg: &Config, input: &Path, out_dir: &Path) -> Result<()> {
    validate_input(cfg, input, false)?;
    ensure_dir(out_dir)?;
    let engine = PdfExtractEngine::new();
    let path = extract::extract_and_save_text(&engine, cfg, input, out_dir)
        .ok_or_else(|| anyhow!("text extraction failed: {}", input.display()))?;
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "input": input,
            "text_file": path,
        }))?
    );
    Ok(())
}

fn parse_one(cfg: &Config, input: &Path) -> Result<()> {
    validate_input(cfg, input, true)?;
    let record = if pipeline::is_text_input(input) {
        pipeline::parse_text_file(input)?
    } else {
        let text_dir = PathBuf::from(&cfg.paths.text_dir);
        ensure_dir(&text_dir)?;
        let pipeline = Pipeline::new(cfg, PdfExtractEngine::new());
        let (report, record) = pipeline.process_input(input, &text_dir);
        record.ok_or_else(|| {
            anyhow!(
                "{} rejected: {}",
                input.display(),
                report.reason.unwrap_or_default()
            )
        })?
    };
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

fn group(
    args: &Args,
    cfg: &Config,
    input: Option<&Path>,
    out_override: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    let input_dir = input
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&cfg.paths.input_dir));
    if !input_dir.is_dir() {
        return Err(anyhow!("input is not a directory: {}", input_dir.display()));
    }

    let out_dir = out_override
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&cfg.paths.output_dir));
    ensure_dir(&out_dir)?;
    let text_dir = match out_override {
        Some(dir) => dir.join("text"),
        None => PathBuf::from(&cfg.paths.text_dir),
    };
    let workbook_path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| out_dir.join(&cfg.workbook.filename));

    let log_path = resolve_log_path(cfg, Some(&out_dir));
    let _guard = init_logging(args, cfg, log_path.as_deref())?;
    dump_config(cfg, &out_dir)?;

    let inputs = pipeline::collect_pdfs(&input_dir, cfg.limits.max_inputs)?;
    info!("group inputs={} dir={}", inputs.len(), input_dir.display());
    for p in &inputs {
        validate_input(cfg, p, false)?;
    }

    let pipeline = Pipeline::new(cfg, PdfExtractEngine::new());
    let mut out = pipeline.run_batch(&inputs, &text_dir, Vec::new())?;
    pipeline.save(&mut out, &workbook_path)?;

    print_summary(cfg, &workbook_path, &out.report)
}

fn append(args: &Args, cfg: &Config, input: &Path, workbook: &Path) -> Result<()> {
    validate_input(cfg, input, false)?;
    if !workbook.exists() {
        return Err(anyhow!("workbook does not exist: {}", workbook.display()));
    }
    let out_dir = workbook
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let log_path = resolve_log_path(cfg, Some(&out_dir));
    let _guard = init_logging(args, cfg, log_path.as_deref())?;

    let prior = xlsx::read_records(workbook)?;
    info!("append to {} existing_rows={}", workbook.display(), prior.len());

    let text_dir = PathBuf::from(&cfg.paths.text_dir);
    let pipeline = Pipeline::new(cfg, PdfExtractEngine::new());
    let mut out = pipeline.run_batch(&[input.to_path_buf()], &text_dir, prior)?;
    if out.report.accepted == 0 {
        let reason = out
            .report
            .inputs
            .first()
            .and_then(|r| r.reason.clone())
            .unwrap_or_default();
        return Err(anyhow!(
            "{} rejected ({reason}); workbook left unchanged",
            input.display()
        ));
    }
    pipeline.save(&mut out, workbook)?;

    print_summary(cfg, workbook, &out.report)
}

fn print_summary(cfg: &Config, workbook: &Path, report: &crate::report::BatchReport) -> Result<()> {
    if cfg.global.print_summary {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "workbook": workbook,
                "accepted": report.accepted,
                "rejected": report.rejected,
                "extract_failed": report.extract_failed,
                "rows": report.prior_records + report.accepted,
                "status": "ok"
            }))?
        );
    }
    Ok(())
}

fn dump_config(cfg: &Config, out_dir: &Path) -> Result<()> {
    if cfg.debug.dump_effective_config {
        let raw = toml::to_string(cfg).unwrap_or_default();
        std::fs::write(out_dir.join("effective-config.toml"), raw)?;
    }
    Ok(())
}

fn validate_input(cfg: &Config, input: &Path, allow_text: bool) -> Result<()> {
    let input_str = input.display().to_string();

    if cfg.security.reject_url_inputs && looks_like_url(&input_str) {
        return Err(anyhow!("URL inputs are disabled: {input_str}"));
    }

    if !input.exists() {
        return Err(anyhow!("input does not exist: {}", input.display()));
    }

    if allow_text && pipeline::is_text_input(input) {
        return Ok(());
    }

    if let Some(ext) = input.extension().and_then(|s| s.to_str()) {
        if !ext.eq_ignore_ascii_case("pdf") {
            return Err(anyhow!("input is not a PDF: {}", input.display()));
        }
    } else {
        warn!("input has no extension; assuming PDF: {}", input.display());
    }

    Ok(())
}

fn looks_like_url(s: &str) -> bool {
    let s = s.to_ascii_lowercase();
    s.starts_with("http://") || s.starts_with("https://") || s.starts_with("file://")
}

fn resolve_log_path(cfg: &Config, out_dir: Option<&Path>) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }

    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }

    if let Some(out_dir) = out_dir {
        return Some(out_dir.join("logs").join("mbti-engine.log"));
    }

    Some(PathBuf::from(&cfg.paths.output_dir).join("logs").join("mbti-engine.log"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_inputs_are_detected() {
        assert!(looks_like_url("HTTPS://example.com/a.pdf"));
        assert!(!looks_like_url("reports/a.pdf"));
    }

    #[test]
    fn log_path_defaults_under_output_dir() {
        let cfg = Config::default();
        let p = resolve_log_path(&cfg, Some(Path::new("/tmp/out"))).unwrap();
        assert_eq!(p, PathBuf::from("/tmp/out/logs/mbti-engine.log"));
    }
}
