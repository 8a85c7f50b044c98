//! Style Applier.
//!
//! Rules are only ever added, deduplicated by range and formula, so a second
//! pass over the same workbook changes nothing. A step that fails on one
//! sheet is logged and skipped.

use crate::compose::layout::*;
use crate::record::{Context, FacetClass, MbtiType};
use crate::sheet::{
    CellRange, CellRef, ConditionalRule, Row, RuleKind, ScaleStop, Workbook, parse_col,
};
use crate::taxonomy::{
    BLACK, CONTEXT_BANDS, FACET_GREY_BAND, IDENTITY_BAND, IN_PREF_FILL, MIDZONE_FILL,
    MIDZONE_SEPARATOR, OUT_OF_PREF_FILL, SCORE_BAND, SCORE_HIGH, SCORE_LOW, SCORE_MAX, SCORE_MID,
    SCORE_MID_VALUE, SCORE_MIN, UNCLASSIFIED_FILL,
};
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StyleError {
    #[error("sheet {0} not found")]
    SheetNotFound(String),
    #[error("table {0} not found")]
    TableNotFound(String),
    #[error("invalid range {0}")]
    InvalidRange(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StyleReport {
    pub rules_added: usize,
    pub rules_skipped: usize,
    pub failures: Vec<String>,
}

impl StyleReport {
    fn record(&mut self, added: bool) {
        if added {
            self.rules_added += 1;
        } else {
            self.rules_skipped += 1;
        }
    }
}

pub fn class_fill(class: FacetClass) -> u32 {
    match class {
        FacetClass::InPref => IN_PREF_FILL,
        FacetClass::Midzone => MIDZONE_FILL,
        FacetClass::OutOfPref => OUT_OF_PREF_FILL,
        FacetClass::Unclassified => UNCLASSIFIED_FILL,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StyleApplier;

impl StyleApplier {
    pub fn new() -> Self {
        Self
    }

    pub fn apply(&self, wb: &mut Workbook) -> StyleReport {
        let mut report = StyleReport::default();

        // Static fills first: they widen used ranges that the type rules cover.
        let fills: [(&str, Step); 2] = [
            ("header bands", header_bands),
            ("dashboard frame", dashboard_frame),
        ];
        run_steps(wb, &mut report, fills);

        type_rules(wb, &mut report);

        let rules: [(&str, Step); 5] = [
            ("facet class rules", facet_class_rules),
            ("score scale", score_rules),
            ("results context class lookup", results_context_lookup_rules),
            ("context class lookup", context_lookup_rules),
            ("facet table class lookup", facet_table_lookup_rules),
        ];
        run_steps(wb, &mut report, rules);

        debug!(
            "style applied added={} skipped={} failures={}",
            report.rules_added,
            report.rules_skipped,
            report.failures.len()
        );
        report
    }
}

type Step = fn(&mut Workbook, &mut StyleReport) -> Result<(), StyleError>;

fn run_steps<const N: usize>(
    wb: &mut Workbook,
    report: &mut StyleReport,
    steps: [(&str, Step); N],
) {
    for (name, step) in steps {
        if let Err(err) = step(wb, report) {
            warn!("style step {name} skipped: {err}");
            report.failures.push(format!("{name}: {err}"));
        }
    }
}

fn last_body_row(wb: &Workbook, table: &str) -> Result<Row, StyleError> {
    wb.table(table)
        .map(|(_, t)| t.range.last.row)
        .ok_or_else(|| StyleError::TableNotFound(table.to_string()))
}

fn a1(s: &str) -> Result<CellRange, StyleError> {
    CellRange::parse(s).ok_or_else(|| StyleError::InvalidRange(s.to_string()))
}

/// One fill rule per type code over the used range of every sheet.
fn type_rules(wb: &mut Workbook, report: &mut StyleReport) {
    for ws in wb.sheets_mut() {
        let Some(range) = ws.used_range() else {
            continue;
        };
        for t in MbtiType::ALL {
            let added = ws.add_rule(ConditionalRule::equal_to(range, t.code(), t.color()));
            report.record(added);
        }
    }
}

fn facet_class_rules(wb: &mut Workbook, report: &mut StyleReport) -> Result<(), StyleError> {
    let last = last_body_row(wb, RESULTS_TABLE)?;
    let ws = wb
        .sheet_mut(RESULTS_SHEET)
        .ok_or_else(|| StyleError::SheetNotFound(RESULTS_SHEET.to_string()))?;
    for col in FACET_FIRST_COL..CONTEXT_FIRST_COL {
        let range = CellRange::new(1, col, last, col);
        for class in FacetClass::ALL {
            let added = ws.add_rule(ConditionalRule::equal_to(
                range,
                class.as_str(),
                class_fill(class),
            ));
            report.record(added);
        }
    }
    Ok(())
}

fn score_rules(wb: &mut Workbook, report: &mut StyleReport) -> Result<(), StyleError> {
    let last = last_body_row(wb, RESULTS_TABLE)?;
    let ws = wb
        .sheet_mut(RESULTS_SHEET)
        .ok_or_else(|| StyleError::SheetNotFound(RESULTS_SHEET.to_string()))?;
    let range = CellRange::new(1, SCORE_FIRST_COL, last, FACET_FIRST_COL - 1);

    // Out-of-range first so black wins over the scale.
    let first = range.first;
    let out_of_range = format!("=OR({first}<{SCORE_MIN},{first}>{SCORE_MAX})");
    report.record(ws.add_rule(ConditionalRule::formula(range, out_of_range, BLACK)));

    let scale = ConditionalRule {
        range,
        kind: RuleKind::ColorScale3 {
            min: ScaleStop {
                value: SCORE_MIN,
                color: SCORE_LOW,
            },
            mid: ScaleStop {
                value: SCORE_MID_VALUE,
                color: SCORE_MID,
            },
            max: ScaleStop {
                value: SCORE_MAX,
                color: SCORE_HIGH,
            },
        },
        fill: None,
    };
    report.record(ws.add_rule(scale));
    Ok(())
}

/// Fills a facet-name range by looking the subject's class up in
/// `MBTI Results`. `row_offset` maps the sheet row to the results row.
fn lookup_rules(range: CellRange, row_offset: i64) -> Vec<ConditionalRule> {
    let first = range.first;
    let results = crate::sheet::quote_sheet(RESULTS_SHEET);
    let facet_cols = format!(
        "{results}!${}:${}",
        crate::sheet::col_letters(FACET_FIRST_COL),
        crate::sheet::col_letters(CONTEXT_FIRST_COL - 1)
    );
    let header = format!(
        "{results}!{}:{}",
        CellRef::new(0, FACET_FIRST_COL).absolute(),
        CellRef::new(0, CONTEXT_FIRST_COL - 1).absolute()
    );
    let row_expr = match row_offset {
        0 => "ROW()".to_string(),
        n if n > 0 => format!("ROW()+{n}"),
        n => format!("ROW()-{}", -n),
    };

    let mut rules: Vec<ConditionalRule> = FacetClass::ALL
        .iter()
        .map(|class| {
            ConditionalRule::formula(
                range,
                format!(
                    "=IFERROR(INDEX({facet_cols},{row_expr},MATCH({first},{header},0)),\"\")=\"{}\"",
                    class.as_str()
                ),
                class_fill(*class),
            )
        })
        .collect();
    rules.push(ConditionalRule::formula(
        range,
        format!("=ISNUMBER(SEARCH(\"{MIDZONE_SEPARATOR}\",{first}))"),
        MIDZONE_FILL,
    ));
    rules
}

/// Context columns AZ..BZ of `MBTI Results` name facets of the same row.
fn results_context_lookup_rules(
    wb: &mut Workbook,
    report: &mut StyleReport,
) -> Result<(), StyleError> {
    let last = last_body_row(wb, RESULTS_TABLE)?;
    let ws = wb
        .sheet_mut(RESULTS_SHEET)
        .ok_or_else(|| StyleError::SheetNotFound(RESULTS_SHEET.to_string()))?;
    let range = CellRange::new(1, CONTEXT_FIRST_COL, last, RESULTS_LAST_COL);
    for rule in lookup_rules(range, 0) {
        report.record(ws.add_rule(rule));
    }
    Ok(())
}

fn context_lookup_rules(wb: &mut Workbook, report: &mut StyleReport) -> Result<(), StyleError> {
    for ctx in Context::ALL {
        let last = last_body_row(wb, &ctx.table_name())?;
        let first_row = CONTEXT_HEADER_ROW + 1;
        if last < first_row {
            continue;
        }
        let ws = wb
            .sheet_mut(ctx.sheet_name())
            .ok_or_else(|| StyleError::SheetNotFound(ctx.sheet_name().to_string()))?;
        let range = CellRange::new(first_row, CONTEXT_FIRST_FACET_COL, last, CONTEXT_LAST_COL);
        // Context body row 4 holds the subject of results row 2.
        for rule in lookup_rules(range, -(first_row as i64 - 1)) {
            report.record(ws.add_rule(rule));
        }
    }
    Ok(())
}

fn facet_table_lookup_rules(
    wb: &mut Workbook,
    report: &mut StyleReport,
) -> Result<(), StyleError> {
    let last = last_body_row(wb, FACET_TABLE_NAME)?;
    let ws = wb
        .sheet_mut(FACET_TABLE_SHEET)
        .ok_or_else(|| StyleError::SheetNotFound(FACET_TABLE_SHEET.to_string()))?;
    let range = CellRange::new(1, BUCKET_FIRST_COL, last, FACET_TABLE_LAST_COL);
    for rule in lookup_rules(range, 0) {
        report.record(ws.add_rule(rule));
    }
    Ok(())
}

fn header_bands(wb: &mut Workbook, _report: &mut StyleReport) -> Result<(), StyleError> {
    let ws = wb
        .sheet_mut(RESULTS_SHEET)
        .ok_or_else(|| StyleError::SheetNotFound(RESULTS_SHEET.to_string()))?;

    let mut bands = vec![(a1("C1")?, IDENTITY_BAND), (a1("D1:K1")?, SCORE_BAND)];
    for (i, ctx) in Context::ALL.into_iter().enumerate() {
        let first = context_col(ctx, 0);
        let last = first + CONTEXT_GROUP_WIDTH - 1;
        bands.push((CellRange::new(0, first, 0, last), CONTEXT_BANDS[i]));
    }
    bands.push((a1("V1:AE1")?, FACET_GREY_BAND));
    bands.push((a1("AR1:AY1")?, FACET_GREY_BAND));

    for (range, color) in bands {
        ws.fill_range(range, color);
    }
    Ok(())
}

fn dashboard_frame(wb: &mut Workbook, _report: &mut StyleReport) -> Result<(), StyleError> {
    let ws = wb
        .sheet_mut(DASHBOARD_SHEET)
        .ok_or_else(|| StyleError::SheetNotFound(DASHBOARD_SHEET.to_string()))?;

    for letters in FRAME_COLUMNS {
        let col = parse_col(letters).ok_or_else(|| StyleError::InvalidRange(letters.into()))?;
        ws.col_widths.insert(col, 1.0);
    }
    for row in FRAME_ROWS {
        ws.row_heights.insert(row - 1, 10.0);
    }
    ws.fill_range(a1(FRAME_RANGE)?, BLACK);
    Ok(())
}
