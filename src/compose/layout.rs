//! Canonical sheet names, table names and cell addresses.
//!
//! Charts, `Data` formulas and style rules all point at these addresses;
//! change them here or not at all.

use crate::record::{Context, Dominant, Facet, FacetPair, MbtiType, Preference};
use crate::sheet::{CellRange, CellRef, Col, Row};
use crate::taxonomy::PAIRS_PER_DICHOTOMY;

pub const DASHBOARD_SHEET: &str = "Dashboard";
pub const RESULTS_SHEET: &str = "MBTI Results";
pub const DATA_SHEET: &str = "Data";
pub const FACET_TABLE_SHEET: &str = "Facet Table";

pub const RESULTS_TABLE: &str = "Table1";
pub const FACET_TABLE_NAME: &str = "FacetTable";
pub const CONTEXT_TABLE_STYLE: &str = "TableStyleMedium2";

// `MBTI Results` columns.
pub const NAME_COL: Col = 0;
pub const DATE_COL: Col = 1;
pub const TYPE_COL: Col = 2;
pub const SCORE_FIRST_COL: Col = 3;
pub const FACET_FIRST_COL: Col = 11;
pub const CONTEXT_FIRST_COL: Col = 51;
pub const CONTEXT_GROUP_WIDTH: Col = 9;
pub const RESULTS_LAST_COL: Col = CONTEXT_FIRST_COL + 3 * CONTEXT_GROUP_WIDTH - 1;

pub fn score_col(p: Preference) -> Col {
    SCORE_FIRST_COL + p.index() as Col
}

pub fn facet_col(f: Facet) -> Col {
    FACET_FIRST_COL + f.index() as Col
}

pub fn context_index(ctx: Context) -> usize {
    Context::ALL.iter().position(|c| *c == ctx).unwrap_or(0)
}

pub fn context_col(ctx: Context, slot: usize) -> Col {
    CONTEXT_FIRST_COL + context_index(ctx) as Col * CONTEXT_GROUP_WIDTH + slot as Col
}

/// Header captions of `MBTI Results`, A..BZ.
pub fn results_headers() -> Vec<String> {
    let mut h: Vec<String> = vec!["Name".into(), "Date".into(), "Type".into()];
    h.extend(Preference::ALL.iter().map(|p| p.label().to_string()));
    h.extend(Facet::all().map(|f| f.name().to_string()));
    for ctx in Context::ALL {
        h.push(ctx.sheet_name().to_string());
        for i in 1..CONTEXT_GROUP_WIDTH {
            h.push(format!("{}-{i}", ctx.sheet_name()));
        }
    }
    h
}

/// `Table1` rectangle for `records` body rows.
pub fn results_table_range(records: usize) -> CellRange {
    CellRange::new(0, 0, records as Row, RESULTS_LAST_COL)
}

// `Data` sheet.
pub const TYPE_FIRST_ROW: Row = 1;
pub const TYPE_LABEL_COL: Col = 0;
pub const TYPE_COUNT_COL: Col = 1;

pub fn type_row(t: MbtiType) -> Row {
    TYPE_FIRST_ROW + t.index() as Row
}

pub const DICHOTOMY_LEFT_COL: Col = 3;
pub const DICHOTOMY_RIGHT_COL: Col = 4;
pub const DICHOTOMY_TITLES: [&str; 4] = [
    "Energy source - E/I",
    "Information - S/N",
    "Decisions - T/F",
    "Lifestyle - J/P",
];

/// Title row of dichotomy block `k`; labels, counts and shares follow.
pub fn dichotomy_row(k: usize) -> Row {
    1 + 4 * k as Row
}

/// The two preferences of dichotomy `k`.
pub fn dichotomy_prefs(k: usize) -> (Preference, Preference) {
    (Preference::ALL[2 * k], Preference::ALL[2 * k + 1])
}

pub const PAIR_HEADER_ROW: Row = 18;
pub const PAIR_FIRST_ROW: Row = 19;
pub const PAIR_STRIDE: Row = 5;
pub const PAIR_LABEL_COL: Col = 3;
pub const PAIR_COUNT_COL: Col = 4;

/// Title row of facet pair block `pair`; side A, side B and MIDZONE follow.
pub fn pair_row(pair: FacetPair) -> Row {
    PAIR_FIRST_ROW + PAIR_STRIDE * pair.index() as Row
}

pub const INTERNAL_LABEL_COL: Col = 6;
pub const INTERNAL_COUNT_COL: Col = 7;
pub const INTERNAL_FIRST_ROW: Row = 2;
pub const INTERNAL_GROUPS: [(&str, &str); 4] =
    [("ST", "*ST*"), ("SF", "*SF*"), ("NF", "*NF*"), ("NT", "*NT*")];

pub const EXTERNAL_LABEL_COL: Col = 9;
pub const EXTERNAL_COUNT_COL: Col = 10;
pub const EXTERNAL_FIRST_ROW: Row = 2;
pub const EXTERNAL_GROUPS: [(&str, &str); 4] =
    [("IJ", "I*J"), ("IP", "I*P"), ("EJ", "E*J"), ("EP", "E*P")];

pub const DOMINANT_LABEL_COL: Col = 6;
pub const DOMINANT_COUNT_COL: Col = 7;
pub const DOMINANT_FIRST_ROW: Row = 10;

pub fn dominant_row(d: Dominant) -> Row {
    let i = Dominant::ALL.iter().position(|x| *x == d).unwrap_or(0);
    DOMINANT_FIRST_ROW + i as Row
}

// `Dashboard` anchors.
pub const DASHBOARD_TITLE: CellRef = CellRef::new(0, 3);
pub const TYPE_PIE_ANCHOR: &str = "C3";
pub const DICHOTOMY_ANCHORS: [&str; 4] = ["K3", "V3", "K16", "V16"];
pub const FACET_ANCHOR_ROWS: [&str; 4] = ["9", "9", "22", "22"];
pub const FACET_ANCHOR_COLS: [[&str; PAIRS_PER_DICHOTOMY]; 4] = [
    ["K", "M", "O", "Q", "S"],
    ["V", "X", "Z", "AB", "AD"],
    ["K", "M", "O", "Q", "S"],
    ["V", "X", "Z", "AB", "AD"],
];
pub const DOMINANT_PIE_ANCHOR: &str = "C30";
pub const INTERNAL_PIE_ANCHOR: &str = "K30";
pub const EXTERNAL_PIE_ANCHOR: &str = "P30";
pub const FACET_LEGEND_TITLE: &str = "V30";
pub const FACET_LEGEND_FIRST: &str = "X31";

pub const FRAME_COLUMNS: [&str; 4] = ["B", "J", "U", "AF"];
/// 1-based rows given a thin height.
pub const FRAME_ROWS: [Row; 6] = [2, 8, 21, 28, 29, 45];
pub const FRAME_RANGE: &str = "B2:AF45";

/// Anchor of the facet chart for `pair`.
pub fn facet_anchor(pair: FacetPair) -> Option<CellRef> {
    let group = pair.index() / PAIRS_PER_DICHOTOMY;
    let slot = pair.index() % PAIRS_PER_DICHOTOMY;
    let col = FACET_ANCHOR_COLS.get(group)?.get(slot)?;
    CellRef::parse(&format!("{col}{}", FACET_ANCHOR_ROWS[group]))
}

pub fn anchor(a1: &str) -> Option<CellRef> {
    CellRef::parse(a1)
}

// Context sheets.
pub const CONTEXT_TITLE: CellRef = CellRef::new(0, 0);
pub const CONTEXT_HEADER_ROW: Row = 2;
pub const CONTEXT_FIRST_FACET_COL: Col = 3;
pub const CONTEXT_LAST_COL: Col = CONTEXT_FIRST_FACET_COL + CONTEXT_GROUP_WIDTH - 1;

pub fn context_headers() -> Vec<String> {
    let mut h: Vec<String> = vec!["Name".into(), "Date".into(), "Type".into()];
    h.extend((1..=CONTEXT_GROUP_WIDTH).map(|i| format!("Facet {i}")));
    h
}

// `Facet Table`.
pub const BUCKET_CAPACITY: [usize; 3] = [3, 5, 9];
pub const BUCKET_FIRST_COL: Col = 3;
pub const FACET_TABLE_LAST_COL: Col = BUCKET_FIRST_COL + 3 + 5 + 9 - 1;

/// First column of bucket `b` (0: three times, 1: twice, 2: once).
pub fn bucket_col(b: usize) -> Col {
    BUCKET_FIRST_COL + BUCKET_CAPACITY[..b].iter().sum::<usize>() as Col
}

pub fn facet_table_headers() -> Vec<String> {
    let mut h: Vec<String> = vec!["Name".into(), "Date".into(), "Type".into()];
    h.extend((1..=3).map(|i| format!("3 Times {i}")));
    h.extend((1..=5).map(|i| format!("2 Times {i}")));
    h.extend((1..=9).map(|i| format!("1 Time {i}")));
    h
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::col_letters;

    #[test]
    fn results_columns_land_on_documented_letters() {
        assert_eq!(results_headers().len(), RESULTS_LAST_COL as usize + 1);
        assert_eq!(col_letters(score_col(Preference::P)), "K");
        let first = Facet::from_index(0).unwrap();
        let last = Facet::from_index(Facet::COUNT - 1).unwrap();
        assert_eq!(col_letters(facet_col(first)), "L");
        assert_eq!(col_letters(facet_col(last)), "AY");
        assert_eq!(col_letters(context_col(Context::Communication, 0)), "AZ");
        assert_eq!(col_letters(context_col(Context::Change, 0)), "BI");
        assert_eq!(col_letters(context_col(Context::Conflict, 8)), "BZ");
    }

    #[test]
    fn data_blocks_start_where_documented() {
        let first = FacetPair::all().next().unwrap();
        assert_eq!(CellRef::new(pair_row(first), PAIR_LABEL_COL).to_string(), "D20");
        assert_eq!(
            CellRef::new(dominant_row(Dominant::Se), DOMINANT_COUNT_COL).to_string(),
            "H17"
        );
        assert_eq!(CellRef::new(type_row(MbtiType::Esfp), 1).to_string(), "B11");
        assert_eq!(dichotomy_row(3), 13);
    }

    #[test]
    fn facet_anchors_follow_the_grid() {
        let anchors: Vec<String> = FacetPair::all()
            .filter_map(facet_anchor)
            .map(|a| a.to_string())
            .collect();
        assert_eq!(anchors.len(), 20);
        assert_eq!(anchors[0], "K9");
        assert_eq!(anchors[9], "AD9");
        assert_eq!(anchors[10], "K22");
        assert_eq!(anchors[19], "AD22");
    }

    #[test]
    fn bucket_columns() {
        assert_eq!(col_letters(bucket_col(0)), "D");
        assert_eq!(col_letters(bucket_col(1)), "G");
        assert_eq!(col_letters(bucket_col(2)), "L");
        assert_eq!(col_letters(FACET_TABLE_LAST_COL), "T");
        assert_eq!(facet_table_headers().len(), FACET_TABLE_LAST_COL as usize + 1);
    }
}
