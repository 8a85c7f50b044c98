mod common;

use common::ReportText;
use mbti_engine::parser::{ParseError, contextual_facets, parse_record};
use mbti_engine::record::{
    Context, ContextFacet, Dominant, Facet, FacetClass, MbtiType, Preference,
};
use pretty_assertions::assert_eq;

fn class(record: &mbti_engine::record::SubjectRecord, name: &str) -> FacetClass {
    record.facet_classes.get(Facet::from_name(name).expect("facet"))
}

fn canon(list: &[ContextFacet]) -> Vec<String> {
    list.iter().map(|f| f.canonical()).collect()
}

#[test]
fn complete_report_parses_into_a_record() {
    let record = parse_record(&ReportText::new("Dana Cohen", "ESFP").text()).unwrap();

    assert_eq!(record.name.as_deref(), Some("Dana Cohen"));
    assert_eq!(record.date.as_deref(), Some("2024-03-01"));
    assert_eq!(record.mbti_type, MbtiType::Esfp);
    assert_eq!(record.dominant, Dominant::Se);

    let scores: Vec<u32> = Preference::ALL
        .iter()
        .map(|p| record.preference_scores.get(*p))
        .collect();
    assert_eq!(scores, vec![22, 8, 14, 16, 9, 21, 11, 19]);

    assert_eq!(class(&record, "Initiating"), FacetClass::InPref);
    assert_eq!(class(&record, "Receiving"), FacetClass::OutOfPref);
    assert_eq!(class(&record, "Early Starting"), FacetClass::InPref);
    assert_eq!(class(&record, "Open-Ended"), FacetClass::OutOfPref);
    assert_eq!(class(&record, "Quiet"), FacetClass::Unclassified);

    assert_eq!(
        canon(&record.communication_facets),
        vec!["questioning", "initiating"]
    );
    assert_eq!(canon(&record.conflict_facets), vec!["questioning", "tough–tender"]);
}

#[test]
fn midzone_pair_marks_both_sides() {
    let record = parse_record(&ReportText::new("A", "ISTJ").text()).unwrap();
    assert_eq!(class(&record, "Tough"), FacetClass::Midzone);
    assert_eq!(class(&record, "Tender"), FacetClass::Midzone);
}

#[test]
fn report_without_type_is_rejected() {
    let mut report = ReportText::new("No Type", "ESFP");
    report.type_code = None;
    let err = parse_record(&report.text()).unwrap_err();
    assert!(matches!(err, ParseError::AnchorNotFound { .. }), "{err}");
}

#[test]
fn missing_score_line_leaves_scores_at_zero() {
    let mut report = ReportText::new("B", "INTJ");
    report.scores = None;
    let record = parse_record(&report.text()).unwrap();
    assert!(record.preference_scores.is_zero());
    assert_eq!(class(&record, "Initiating"), FacetClass::InPref);
}

#[test]
fn contradictory_facet_lists_reject_the_record() {
    let mut report = ReportText::new("C", "ENFP");
    report.in_pref.push("Receiving".to_string());
    report.out_of_pref = vec!["Quiet".to_string()];
    let err = parse_record(&report.text()).unwrap_err();
    assert!(matches!(err, ParseError::Malformed { .. }), "{err}");
}

#[test]
fn context_substrings_collapse_into_midzone_pair() {
    let mut report = ReportText::new("D", "ESFP");
    report.conflict = vec!["Tough".to_string(), "Tough–Tender".to_string()];
    let record = parse_record(&report.text()).unwrap();
    assert_eq!(canon(&record.conflict_facets), vec!["tough–tender"]);
}

#[test]
fn empty_context_section_yields_empty_list() {
    let mut report = ReportText::new("E", "ESFP");
    report.change.clear();
    let record = parse_record(&report.text()).unwrap();
    assert!(record.change_facets.is_empty());
    assert_eq!(record.communication_facets.len(), 2);
}

#[test]
fn context_lists_are_capped_at_nine() {
    let mut report = ReportText::new("F", "ESFP");
    report.communication = [
        "Initiating",
        "Expressive",
        "Gregarious",
        "Active",
        "Enthusiastic",
        "Concrete",
        "Realistic",
        "Practical",
        "Experiential",
        "Traditional",
        "Logical",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    let list = contextual_facets(&report.text(), Context::Communication).unwrap();
    assert_eq!(list.len(), Context::MAX_FACETS);
    assert_eq!(list[0].canonical(), "initiating");
    assert_eq!(list[8].canonical(), "experiential");
}

#[test]
fn record_serializes_with_type_key() {
    let record = parse_record(&ReportText::new("G", "ESFP").text()).unwrap();
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["type"], "ESFP");
    assert_eq!(json["facet_classes"]["Receiving"], "OUT-OF-PREF");
    assert_eq!(json["conflict_facets"][1], "tough–tender");
}
