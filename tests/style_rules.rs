mod common;

use common::ReportText;
use mbti_engine::compose::compose;
use mbti_engine::compose::layout::{DASHBOARD_SHEET, FACET_TABLE_SHEET, RESULTS_SHEET};
use mbti_engine::parser::parse_record;
use mbti_engine::record::SubjectRecord;
use mbti_engine::sheet::{CellRef, RuleKind, Workbook};
use mbti_engine::style::StyleApplier;
use mbti_engine::taxonomy::{BLACK, CONTEXT_BANDS, IDENTITY_BAND, SCORE_BAND};

fn styled(records: &[SubjectRecord]) -> Workbook {
    let mut wb = compose(records, "TableStyleMedium9").unwrap();
    let report = StyleApplier::new().apply(&mut wb);
    assert!(report.failures.is_empty(), "{:?}", report.failures);
    wb
}

fn record(name: &str, type_code: &str) -> SubjectRecord {
    parse_record(&ReportText::new(name, type_code).text()).unwrap()
}

#[test]
fn second_pass_adds_nothing() {
    let mut wb = styled(&[record("One", "ESFP"), record("Two", "INTP")]);
    let before = wb.clone();

    let report = StyleApplier::new().apply(&mut wb);
    assert_eq!(report.rules_added, 0);
    assert!(report.rules_skipped > 0);
    assert_eq!(wb, before);
}

#[test]
fn zero_scores_hit_the_black_rule_first() {
    let mut report = ReportText::new("Zero", "ESFP");
    report.scores = None;
    let wb = styled(&[parse_record(&report.text()).unwrap()]);

    let results = wb.sheet(RESULTS_SHEET).unwrap();
    let score_rules: Vec<_> = results
        .rules()
        .iter()
        .filter(|r| r.range.to_string() == "D2:K2")
        .collect();
    assert_eq!(score_rules.len(), 2);
    assert_eq!(score_rules[0].formula_text(), "=OR(D2<1,D2>30)");
    assert_eq!(score_rules[0].fill, Some(BLACK));
    assert!(matches!(score_rules[1].kind, RuleKind::ColorScale3 { .. }));
}

#[test]
fn every_sheet_gets_type_colours() {
    let wb = styled(&[record("One", "ESFP")]);
    for ws in wb.sheets() {
        let esfp = ws
            .rules()
            .iter()
            .any(|r| matches!(&r.kind, RuleKind::EqualTo(v) if v == "ESFP"));
        assert!(esfp, "{} has no ESFP rule", ws.name);
    }
}

#[test]
fn facet_columns_get_one_rule_per_class() {
    let wb = styled(&[record("One", "ESFP")]);
    let results = wb.sheet(RESULTS_SHEET).unwrap();
    let on_l: Vec<String> = results
        .rules()
        .iter()
        .filter(|r| r.range.to_string() == "L2")
        .map(|r| r.formula_text())
        .collect();
    assert_eq!(on_l.len(), 4);
    assert!(on_l.contains(&"=L2=\"MIDZONE\"".to_string()));
}

#[test]
fn context_and_facet_sheets_look_classes_up() {
    let wb = styled(&[record("One", "ESFP")]);

    let comm = wb.sheet("Communicating").unwrap();
    let lookup = comm
        .rules()
        .iter()
        .find(|r| r.range.to_string() == "D4:L4" && r.formula_text().contains("IN-PREF"))
        .expect("communicating lookup rule");
    assert!(lookup.formula_text().contains("ROW()-2"));

    let facets = wb.sheet(FACET_TABLE_SHEET).unwrap();
    assert!(
        facets
            .rules()
            .iter()
            .any(|r| r.range.to_string() == "D2:T2" && r.formula_text().contains("ROW(),"))
    );
}

#[test]
fn dashboard_frame_is_black() {
    let wb = styled(&[record("One", "ESFP")]);
    let dash = wb.sheet(DASHBOARD_SHEET).unwrap();
    let corner = dash.get(CellRef::parse("B2").unwrap()).unwrap();
    assert_eq!(corner.style.fill, Some(BLACK));
    assert_eq!(dash.col_widths.get(&1), Some(&1.0));
}

#[test]
fn results_context_cells_get_class_lookup() {
    let wb = styled(&[record("One", "ESFP")]);
    let results = wb.sheet(RESULTS_SHEET).unwrap();
    assert_eq!(results.text(CellRef::parse("AZ2").unwrap()), Some("questioning"));

    let lookups: Vec<String> = results
        .rules()
        .iter()
        .filter(|r| r.range.to_string() == "AZ2:BZ2")
        .map(|r| r.formula_text())
        .collect();
    assert_eq!(lookups.len(), 5);
    let in_pref = lookups
        .iter()
        .find(|f| f.contains("\"IN-PREF\""))
        .expect("IN-PREF lookup on AZ2:BZ2");
    assert!(in_pref.contains("ROW(),"), "{in_pref}");
    assert!(in_pref.contains("'MBTI Results'!$L$1:$AY$1"), "{in_pref}");
}

#[test]
fn results_header_bands_use_group_palette() {
    let wb = styled(&[record("One", "ESFP")]);
    let results = wb.sheet(RESULTS_SHEET).unwrap();
    let fill = |a1: &str| {
        results
            .get(CellRef::parse(a1).unwrap())
            .and_then(|c| c.style.fill)
    };
    assert_eq!(fill("C1"), Some(IDENTITY_BAND));
    assert_eq!(IDENTITY_BAND, 0x99CCFF);
    assert_eq!(fill("A1"), None);
    assert_eq!(fill("D1"), Some(SCORE_BAND));
    assert_eq!(fill("AZ1"), Some(0x66CC33));
    assert_eq!(fill("BI1"), Some(0xFFCC66));
    assert_eq!(fill("BR1"), Some(CONTEXT_BANDS[2]));
    assert_eq!(fill("V1"), Some(0x999999));
}
