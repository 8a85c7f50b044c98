mod common;

use common::ReportText;
use mbti_engine::compose::layout::*;
use mbti_engine::compose::{ComposeError, Composer, compose};
use mbti_engine::parser::parse_record;
use mbti_engine::record::{Facet, SubjectRecord};
use mbti_engine::sheet::{CellRef, CellValue, Workbook};
use pretty_assertions::assert_eq;

const STYLE: &str = "TableStyleMedium9";

fn record(name: &str, type_code: &str) -> SubjectRecord {
    parse_record(&ReportText::new(name, type_code).text()).unwrap()
}

fn cell<'a>(wb: &'a Workbook, sheet: &str, a1: &str) -> &'a CellValue {
    wb.sheet(sheet)
        .unwrap()
        .value(CellRef::parse(a1).unwrap())
}

fn text<'a>(wb: &'a Workbook, sheet: &str, a1: &str) -> Option<&'a str> {
    cell(wb, sheet, a1).as_text()
}

fn header_col(name: &str) -> String {
    let i = results_headers().iter().position(|h| h == name).unwrap();
    mbti_engine::sheet::col_letters(i as u16)
}

#[test]
fn single_subject_fills_row_two() {
    let wb = compose(&[record("Dana Cohen", "ESFP")], STYLE).unwrap();

    assert_eq!(text(&wb, RESULTS_SHEET, "A2"), Some("Dana Cohen"));
    assert_eq!(text(&wb, RESULTS_SHEET, "B2"), Some("2024-03-01"));
    assert_eq!(text(&wb, RESULTS_SHEET, "C2"), Some("ESFP"));
    assert_eq!(cell(&wb, RESULTS_SHEET, "D2"), &CellValue::Number(22.0));
    assert_eq!(cell(&wb, RESULTS_SHEET, "K2"), &CellValue::Number(19.0));

    let initiating = format!("{}2", header_col("Initiating"));
    let receiving = format!("{}2", header_col("Receiving"));
    assert_eq!(text(&wb, RESULTS_SHEET, &initiating), Some("IN-PREF"));
    assert_eq!(text(&wb, RESULTS_SHEET, &receiving), Some("OUT-OF-PREF"));

    assert_eq!(
        cell(&wb, DATA_SHEET, "H17"),
        &CellValue::Formula("=SUM(B11,B10)".to_string())
    );
    assert_eq!(text(&wb, DATA_SHEET, "G17"), Some("Se"));
}

#[test]
fn table_one_grows_with_each_append() {
    let mut composer = Composer::new(STYLE);
    composer.append(record("One", "ESFP")).unwrap();
    let range = composer.workbook().table(RESULTS_TABLE).unwrap().1.range;
    assert_eq!(range.to_string(), "A1:BZ2");

    composer.append(record("Two", "INTJ")).unwrap();
    let range = composer.workbook().table(RESULTS_TABLE).unwrap().1.range;
    assert_eq!(range.to_string(), "A1:BZ3");

    let wb = composer.finish().unwrap();
    assert_eq!(text(&wb, RESULTS_SHEET, "C3"), Some("INTJ"));
}

#[test]
fn data_sheet_holds_only_formulas_over_table_one() {
    let wb = compose(&[record("One", "ESFP")], STYLE).unwrap();
    let data = wb.sheet(DATA_SHEET).unwrap();

    let formulas: Vec<&str> = data
        .cells()
        .filter_map(|(_, c)| match &c.value {
            CellValue::Formula(f) => Some(f.as_str()),
            _ => None,
        })
        .collect();
    assert!(!formulas.is_empty());
    assert!(
        data.cells()
            .all(|(_, c)| !matches!(c.value, CellValue::Number(_)))
    );

    assert_eq!(
        cell(&wb, DATA_SHEET, "B2"),
        &CellValue::Formula("=COUNTIF(Table1[Type],A2)".to_string())
    );
    assert!(formulas.iter().any(|f| f.contains("Table1[[Open-Ended]]")));
    assert!(formulas.iter().any(|f| f.contains("Table1[Early Starting]")));
    assert_eq!(
        cell(&wb, DATA_SHEET, "D5"),
        &CellValue::Formula("=(D4/SUM(D4:E4))".to_string())
    );
}

#[test]
fn identical_input_gives_identical_results_sheet() {
    let records = [record("One", "ESFP"), record("Two", "ISTJ")];
    let a = compose(&records, STYLE).unwrap();
    let b = compose(&records, STYLE).unwrap();
    assert_eq!(a.sheet(RESULTS_SHEET), b.sheet(RESULTS_SHEET));
    assert_eq!(a, b);
}

#[test]
fn empty_context_still_produces_rows() {
    let mut r = record("Empty", "ENFP");
    r.change_facets.clear();
    let wb = compose(&[r], STYLE).unwrap();

    let first_change = mbti_engine::sheet::col_letters(context_col(
        mbti_engine::record::Context::Change,
        0,
    ));
    assert_eq!(cell(&wb, RESULTS_SHEET, &format!("{first_change}2")), &CellValue::Blank);

    assert_eq!(text(&wb, "Managing Change", "A4"), Some("Empty"));
    assert_eq!(text(&wb, "Managing Change", "D4"), None);
    let (_, table) = wb.table("ManagingChangeTable").unwrap();
    assert_eq!(table.range.to_string(), "A3:L4");
}

#[test]
fn facet_listed_in_all_three_contexts_lands_in_first_bucket() {
    let wb = compose(&[record("Q", "ESFP")], STYLE).unwrap();

    assert_eq!(text(&wb, FACET_TABLE_SHEET, "D2"), Some("questioning"));
    assert_eq!(text(&wb, FACET_TABLE_SHEET, "E2"), None);
    assert_eq!(text(&wb, FACET_TABLE_SHEET, "G2"), None);

    let once: Vec<&str> = (bucket_col(2)..=FACET_TABLE_LAST_COL)
        .filter_map(|c| wb.sheet(FACET_TABLE_SHEET).unwrap().text(CellRef::new(1, c)))
        .collect();
    assert_eq!(once, vec!["initiating", "active", "tough–tender"]);
    assert!(!once.contains(&"questioning"));
}

#[test]
fn sheets_come_in_dashboard_results_order() {
    let wb = compose(&[record("One", "ESFP")], STYLE).unwrap();
    let names = wb.sheet_names();
    assert_eq!(names[0], DASHBOARD_SHEET);
    assert_eq!(names[1], RESULTS_SHEET);
    for name in [
        DATA_SHEET,
        FACET_TABLE_SHEET,
        "Communicating",
        "Managing Change",
        "Managing Conflict",
    ] {
        assert!(names.contains(&name), "{name} missing from {names:?}");
    }
}

#[test]
fn dashboard_charts_point_at_data() {
    let wb = compose(&[record("One", "ESFP")], STYLE).unwrap();
    let dash = wb.sheet(DASHBOARD_SHEET).unwrap();
    // type pie, four dichotomies, twenty facet pairs, three function pies
    assert_eq!(dash.charts.len(), 1 + 4 + 20 + 3);
    assert!(dash.hide_gridlines);
}

#[test]
fn composing_nothing_is_an_error() {
    assert_eq!(compose(&[], STYLE).unwrap_err(), ComposeError::NoRecords);
}

#[test]
fn unclassified_facets_render_as_dash() {
    let wb = compose(&[record("One", "ESFP")], STYLE).unwrap();
    let quiet = Facet::from_name("Quiet").unwrap();
    let at = format!(
        "{}2",
        mbti_engine::sheet::col_letters(facet_col(quiet))
    );
    assert_eq!(text(&wb, RESULTS_SHEET, &at), Some("—"));
}
