#![allow(dead_code)]

use anyhow::{Result, anyhow};
use mbti_engine::{
    config::Config,
    engine::{Engine, ExtractIn, ExtractOut},
    extract::render_pages,
};
use std::collections::HashMap;
use std::path::Path;

/// Text layer of a synthetic Step II report, laid out the way the parser
/// expects: identity on page 1, scores and facet lines on page 2, context
/// sections on page 3.
#[derive(Debug, Clone)]
pub struct ReportText {
    pub name: String,
    pub date: String,
    pub type_code: Option<String>,
    /// E, I, S, N, T, F, J, P.
    pub scores: Option<[u32; 8]>,
    pub in_pref: Vec<String>,
    pub midzone: Vec<String>,
    pub out_of_pref: Vec<String>,
    pub communication: Vec<String>,
    pub change: Vec<String>,
    pub conflict: Vec<String>,
}

fn owned(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

impl ReportText {
    pub fn new(name: &str, type_code: &str) -> Self {
        Self {
            name: name.to_string(),
            date: "2024-03-01".to_string(),
            type_code: Some(type_code.to_string()),
            scores: Some([22, 8, 14, 16, 9, 21, 11, 19]),
            in_pref: owned(&["Initiating", "Active", "Early Starting"]),
            midzone: owned(&["Tough–Tender"]),
            out_of_pref: owned(&["Receiving", "Open-Ended"]),
            communication: owned(&["Questioning", "Initiating"]),
            change: owned(&["Questioning", "Active"]),
            conflict: owned(&["Questioning", "Tough–Tender"]),
        }
    }

    pub fn pages(&self) -> Vec<String> {
        let mut p1 = String::new();
        for i in 1..=9 {
            p1.push_str(&format!("Step II profile header {i}\n\n"));
        }
        p1.push_str(&format!("{}\n{}\n", self.name, self.date));
        if let Some(t) = &self.type_code {
            p1.push_str(&format!("Your reported type: {t}\n"));
        }

        let mut p2 = String::new();
        if let Some(s) = self.scores {
            p2.push_str(&format!(
                "EXTRAVERSION | {} INTROVERSION | {} SENSING | {} INTUITION | {} \
                 THINKING | {} FEELING | {} JUDGING | {} PERCEIVING | {}\n",
                s[0], s[1], s[2], s[3], s[4], s[5], s[6], s[7]
            ));
        }
        for (keyword, list) in [
            ("in-preference", &self.in_pref),
            ("midzone", &self.midzone),
            ("out-of-preference", &self.out_of_pref),
        ] {
            p2.push_str(&format!("Summary of facets\n{keyword}\n"));
            for facet in list {
                p2.push_str(&format!("{facet}\n{keyword}\n"));
            }
        }

        let mut p3 = String::new();
        for (header, end, list) in [
            (
                "YOUR FACET RESULT COMMUNICATION STYLE ENHANCING YOUR STYLE",
                "|10",
                &self.communication,
            ),
            (
                "YOUR FACET RESULT CHANGE MANAGEMENT STYLE ENHANCING YOUR STYLE",
                "|12",
                &self.change,
            ),
            (
                "YOUR FACET RESULT CONFLICT MANAGEMENT STYLE ENHANCING YOUR STYLE",
                "|13",
                &self.conflict,
            ),
        ] {
            p3.push_str(&format!("{header}\n"));
            for facet in list {
                p3.push_str(&format!("{facet} shows up here\n"));
            }
            p3.push_str(&format!("{end}\n"));
        }

        vec![p1, p2, p3]
    }

    /// Body of the `_text.txt` file the extractor would write.
    pub fn text(&self) -> String {
        render_pages(&Config::default(), &self.pages())
    }
}

/// Returns canned pages keyed by PDF file stem; unknown stems fail like a
/// PDF without a text layer.
#[derive(Debug, Default)]
pub struct FakeEngine {
    pages: HashMap<String, Vec<String>>,
}

impl FakeEngine {
    pub fn with(mut self, stem: &str, report: &ReportText) -> Self {
        self.pages.insert(stem.to_string(), report.pages());
        self
    }
}

impl Engine for FakeEngine {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn extract_pages(&self, req: &ExtractIn) -> Result<ExtractOut> {
        let stem = Path::new(&req.input_pdf)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let pages = self
            .pages
            .get(&stem)
            .ok_or_else(|| anyhow!("no text layer in {}", req.input_pdf))?;
        Ok(ExtractOut {
            ok: true,
            pages: pages.clone(),
            warnings: Vec::new(),
        })
    }
}

/// Config writing everything under `root`, with no log file.
pub fn test_config(root: &Path) -> Config {
    let mut cfg = Config::default();
    cfg.paths.input_dir = root.join("input").display().to_string();
    cfg.paths.output_dir = root.join("output").display().to_string();
    cfg.paths.text_dir = root.join("output/text").display().to_string();
    cfg.paths.media_dir = root.join("media").display().to_string();
    cfg.logging.write_to_file = false;
    cfg
}
