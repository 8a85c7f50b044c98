//! `Data`: every aggregate is a formula over `Table1`, never a value.

use super::layout::*;
use crate::record::{Dominant, FacetPair, MbtiType};
use crate::sheet::{CellRef, Workbook, Worksheet};
use crate::taxonomy::DICHOTOMY_COLORS;

pub fn build(wb: &mut Workbook) {
    let ws = wb.recreate_sheet(DATA_SHEET);
    type_counts(ws);
    dichotomies(ws);
    facet_pairs(ws);
    internal_external(ws);
    dominant_functions(ws);
    ws.autofit();
}

/// Structured reference to a `Table1` column. Captions with operator
/// characters need the inner bracket pair.
pub fn column_ref(column: &str) -> String {
    const SPECIAL: &[char] = &[
        '-', ',', ':', '.', '[', ']', '#', '\'', '"', '{', '}', '$', '^', '&', '*', '+', '=',
        '<', '>', '/',
    ];
    // Spaces are legal inside a single bracket pair: `Table1[Early Starting]`.
    if column.contains(SPECIAL) {
        format!("{RESULTS_TABLE}[[{column}]]")
    } else {
        format!("{RESULTS_TABLE}[{column}]")
    }
}

fn count_if(column: &str, criterion: &str) -> String {
    format!("COUNTIF({},{criterion})", column_ref(column))
}

fn quoted(s: &str) -> String {
    format!("\"{s}\"")
}

fn type_counts(ws: &mut Worksheet) {
    ws.set_text(CellRef::new(0, TYPE_LABEL_COL), "MBTI Type Data").bold = true;
    for t in MbtiType::ALL {
        let row = type_row(t);
        let label = CellRef::new(row, TYPE_LABEL_COL);
        ws.set_text(label, t.code()).fill = Some(t.color());
        ws.set_formula(
            CellRef::new(row, TYPE_COUNT_COL),
            format!("={}", count_if("Type", &label.to_string())),
        );
    }
}

fn dichotomies(ws: &mut Worksheet) {
    ws.set_text(CellRef::new(0, DICHOTOMY_LEFT_COL), "Dichotomies Data").bold = true;
    ws.set_text(CellRef::new(1, DICHOTOMY_RIGHT_COL), "Count");

    for (k, title) in DICHOTOMY_TITLES.iter().enumerate() {
        let row = dichotomy_row(k);
        ws.set_text(CellRef::new(row, DICHOTOMY_LEFT_COL), *title).bold = true;

        let (a, b) = dichotomy_prefs(k);
        let count_row = row + 2;
        let share_row = row + 3;
        let left = CellRef::new(count_row, DICHOTOMY_LEFT_COL);
        let right = CellRef::new(count_row, DICHOTOMY_RIGHT_COL);

        for (pref, col) in [(a, DICHOTOMY_LEFT_COL), (b, DICHOTOMY_RIGHT_COL)] {
            ws.set_text(CellRef::new(row + 1, col), pref.label()).fill =
                Some(DICHOTOMY_COLORS[pref.index()]);
            let pattern = quoted(&format!("*{}*", pref.letter()));
            ws.set_formula(
                CellRef::new(count_row, col),
                format!("={}", count_if("Type", &pattern)),
            );
            let this = CellRef::new(count_row, col);
            ws.set_formula(
                CellRef::new(share_row, col),
                format!("=({this}/SUM({left}:{right}))"),
            )
            .num_format = Some("0.0%".to_string());
        }
    }
}

fn facet_pairs(ws: &mut Worksheet) {
    ws.set_text(CellRef::new(PAIR_HEADER_ROW, PAIR_LABEL_COL), "Dichotomy Preference data").bold =
        true;

    for pair in FacetPair::all() {
        let row = pair_row(pair);
        ws.set_text(CellRef::new(row, PAIR_LABEL_COL), pair.title()).bold = true;

        for (offset, facet) in [(1, pair.left()), (2, pair.right())] {
            let name = facet.name();
            ws.set_text(CellRef::new(row + offset, PAIR_LABEL_COL), name);
            ws.set_formula(
                CellRef::new(row + offset, PAIR_COUNT_COL),
                format!(
                    "={}+{}",
                    count_if(name, &quoted("=IN-PREF")),
                    count_if(name, &quoted("=OUT-OF-PREF"))
                ),
            );
        }

        ws.set_text(CellRef::new(row + 3, PAIR_LABEL_COL), "MIDZONE");
        ws.set_formula(
            CellRef::new(row + 3, PAIR_COUNT_COL),
            format!("={}", count_if(pair.left().name(), &quoted("=MIDZONE"))),
        );
    }
}

fn internal_external(ws: &mut Worksheet) {
    let blocks = [
        (
            "Internal Analysis",
            "Internal",
            INTERNAL_LABEL_COL,
            INTERNAL_COUNT_COL,
            INTERNAL_FIRST_ROW,
            INTERNAL_GROUPS,
        ),
        (
            "External Analysis",
            "External",
            EXTERNAL_LABEL_COL,
            EXTERNAL_COUNT_COL,
            EXTERNAL_FIRST_ROW,
            EXTERNAL_GROUPS,
        ),
    ];

    for (title, header, label_col, count_col, first_row, groups) in blocks {
        ws.set_text(CellRef::new(0, label_col), title).bold = true;
        ws.set_text(CellRef::new(1, label_col), header).bold = true;
        ws.set_text(CellRef::new(1, count_col), "Count").bold = true;
        for (i, (label, pattern)) in groups.iter().enumerate() {
            let row = first_row + i as u32;
            ws.set_text(CellRef::new(row, label_col), *label);
            ws.set_formula(
                CellRef::new(row, count_col),
                format!("={}", count_if("Type", &quoted(pattern))),
            );
        }
    }
}

fn dominant_functions(ws: &mut Worksheet) {
    let title_row = DOMINANT_FIRST_ROW - 2;
    ws.set_text(CellRef::new(title_row, DOMINANT_LABEL_COL), "Dominant Function Data").bold = true;
    ws.set_text(CellRef::new(title_row + 1, DOMINANT_LABEL_COL), "Dominant Function").bold = true;
    ws.set_text(CellRef::new(title_row + 1, DOMINANT_COUNT_COL), "Count").bold = true;

    for d in Dominant::ALL {
        let row = dominant_row(d);
        ws.set_text(CellRef::new(row, DOMINANT_LABEL_COL), d.code());
        let cells: Vec<String> = d
            .types()
            .map(|t| CellRef::new(type_row(t), TYPE_COUNT_COL).to_string())
            .collect();
        ws.set_formula(
            CellRef::new(row, DOMINANT_COUNT_COL),
            format!("=SUM({})", cells.join(",")),
        );
    }
}
