use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub global: Global,
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub workbook: Workbook,
    #[serde(default)]
    pub postprocess: Postprocess,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub debug: Debug,
    #[serde(default)]
    pub security: Security,
}

impl Config {
    /// Reads `path`, falling back to built-in defaults when it does not
    /// exist, then applies the `MBTI_*_DIR` environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let mut cfg = if path.exists() {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config: {}", path.display()))?;
            toml::from_str::<Config>(&raw).with_context(|| "parsing TOML")?
        } else {
            Config::default()
        };
        cfg.apply_env(|k| std::env::var(k).ok());
        Ok(cfg)
    }

    /// Replaces `[paths]` entries with any non-empty value `lookup` returns.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let targets: [(&str, &mut String); 4] = [
            ("MBTI_INPUT_DIR", &mut self.paths.input_dir),
            ("MBTI_OUTPUT_DIR", &mut self.paths.output_dir),
            ("MBTI_TEXT_DIR", &mut self.paths.text_dir),
            ("MBTI_MEDIA_DIR", &mut self.paths.media_dir),
        ];
        for (key, slot) in targets {
            if let Some(v) = lookup(key).filter(|v| !v.trim().is_empty()) {
                *slot = v;
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Global {
    pub print_summary: bool,
    pub keep_text_files: bool,
}
impl Default for Global {
    fn default() -> Self {
        Self {
            print_summary: true,
            keep_text_files: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Paths {
    pub input_dir: String,
    pub output_dir: String,
    pub text_dir: String,
    /// Hand-off directory for dual-graph images composited outside the engine.
    pub media_dir: String,
}
impl Default for Paths {
    fn default() -> Self {
        Self {
            input_dir: "input".into(),
            output_dir: "output".into(),
            text_dir: "output/text".into(),
            media_dir: "media".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_input_file_bytes: u64,
    /// Zero means unlimited.
    pub max_inputs: usize,
}
impl Default for Limits {
    fn default() -> Self {
        Self {
            max_input_file_bytes: 64 * 1024 * 1024,
            max_inputs: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Workbook {
    pub filename: String,
    pub table_style: String,
}
impl Default for Workbook {
    fn default() -> Self {
        Self {
            filename: "group_report.xlsx".into(),
            table_style: "TableStyleMedium9".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Postprocess {
    pub normalize_newlines: bool,
    pub trim_trailing_whitespace: bool,
    pub control_chars_to_sanitize: Vec<u8>,
}
impl Default for Postprocess {
    fn default() -> Self {
        let mut codes: Vec<u8> = (0x00..=0x08).collect();
        codes.extend([0x0B, 0x0C]);
        codes.extend(0x0E..=0x1F);
        codes.push(0x7F);
        Self {
            normalize_newlines: true,
            trim_trailing_whitespace: true,
            control_chars_to_sanitize: codes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Output {
    pub write_report_json: bool,
    pub report_filename: String,
}
impl Default for Output {
    fn default() -> Self {
        Self {
            write_report_json: true,
            report_filename: "report.json".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: true,
            file_path: "".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Debug {
    pub dump_effective_config: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Security {
    pub reject_url_inputs: bool,
}
impl Default for Security {
    fn default() -> Self {
        Self {
            reject_url_inputs: true,
        }
    }
}
