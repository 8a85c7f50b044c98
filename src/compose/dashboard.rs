//! `Dashboard`: charts only, every series pointing into `Data`.

use super::ComposeError;
use super::layout::*;
use crate::record::{Dominant, FacetPair, MbtiType};
use crate::sheet::{
    CellRange, CellRef, ChartKind, ChartSpec, DataLabel, SeriesSpec, Workbook, Worksheet,
};
use crate::taxonomy::{DICHOTOMY_BAR_FILLS, FACET_COLORS, MIDZONE_COLORS, WHITE};

const PIE_SIZE: (u32, u32) = (480, 360);
const DICHOTOMY_SIZE: (u32, u32) = (640, 110);
const FACET_SIZE: (u32, u32) = (128, 240);

const FACET_LEGEND: [&str; 5] = [
    "First bar: left facet, in-pref plus out-of-pref",
    "Second bar: right facet, in-pref plus out-of-pref",
    "Third bar: midzone results",
    "Top rows: E/I and S/N pairs",
    "Bottom rows: T/F and J/P pairs",
];

pub fn build(wb: &mut Workbook) -> Result<(), ComposeError> {
    let ws = wb.recreate_sheet(DASHBOARD_SHEET);
    ws.hide_gridlines = true;

    let title = ws.set_text(DASHBOARD_TITLE, "MBTI Distribution Dashboard");
    title.bold = true;
    title.font_size = Some(16.0);

    ws.charts.push(type_pie()?);
    for k in 0..DICHOTOMY_ANCHORS.len() {
        ws.charts.push(dichotomy_bar(k)?);
    }
    for pair in FacetPair::all() {
        ws.charts.push(facet_bar(pair)?);
    }
    ws.charts.push(dominant_pie()?);
    ws.charts.push(group_pie(
        INTERNAL_PIE_ANCHOR,
        "Internal",
        INTERNAL_LABEL_COL,
        INTERNAL_COUNT_COL,
        INTERNAL_FIRST_ROW,
    )?);
    ws.charts.push(group_pie(
        EXTERNAL_PIE_ANCHOR,
        "External",
        EXTERNAL_LABEL_COL,
        EXTERNAL_COUNT_COL,
        EXTERNAL_FIRST_ROW,
    )?);

    facet_legend(ws)?;
    Ok(())
}

fn at(a1: &str) -> Result<CellRef, ComposeError> {
    anchor(a1).ok_or_else(|| ComposeError::InvalidRange(a1.to_string()))
}

fn data(range: CellRange) -> (String, CellRange) {
    (DATA_SHEET.to_string(), range)
}

fn pie(anchor: CellRef, title: &str, series: SeriesSpec) -> ChartSpec {
    ChartSpec {
        kind: ChartKind::Pie,
        anchor,
        title: Some(title.to_string()),
        series: vec![series],
        hide_axes: false,
        hide_legend: true,
        width: PIE_SIZE.0,
        height: PIE_SIZE.1,
    }
}

fn type_pie() -> Result<ChartSpec, ComposeError> {
    let first = type_row(MbtiType::ALL[0]);
    let last = type_row(MbtiType::ALL[MbtiType::ALL.len() - 1]);
    let series = SeriesSpec {
        name: Some("MBTI Types".to_string()),
        categories: Some(data(CellRange::new(first, TYPE_LABEL_COL, last, TYPE_LABEL_COL))),
        values: data(CellRange::new(first, TYPE_COUNT_COL, last, TYPE_COUNT_COL)),
        fill: None,
        point_fills: MbtiType::ALL.iter().map(|t| t.color()).collect(),
        label: DataLabel::CategoryName,
    };
    Ok(pie(at(TYPE_PIE_ANCHOR)?, "MBTI Type Distribution", series))
}

fn single_bar(name: String, value: CellRef, fill: u32) -> SeriesSpec {
    SeriesSpec {
        name: Some(name),
        categories: None,
        values: data(CellRange::cell(value)),
        fill: Some(fill),
        point_fills: Vec::new(),
        label: DataLabel::SeriesName,
    }
}

fn stacked_bar(anchor: CellRef, series: Vec<SeriesSpec>, size: (u32, u32)) -> ChartSpec {
    ChartSpec {
        kind: ChartKind::BarPercentStacked,
        anchor,
        title: None,
        series,
        hide_axes: true,
        hide_legend: true,
        width: size.0,
        height: size.1,
    }
}

fn dichotomy_bar(k: usize) -> Result<ChartSpec, ComposeError> {
    let (a, b) = dichotomy_prefs(k);
    let count_row = dichotomy_row(k) + 2;
    let series = vec![
        single_bar(
            a.label().to_string(),
            CellRef::new(count_row, DICHOTOMY_LEFT_COL),
            DICHOTOMY_BAR_FILLS[0],
        ),
        single_bar(
            b.label().to_string(),
            CellRef::new(count_row, DICHOTOMY_RIGHT_COL),
            DICHOTOMY_BAR_FILLS[1],
        ),
    ];
    Ok(stacked_bar(at(DICHOTOMY_ANCHORS[k])?, series, DICHOTOMY_SIZE))
}

fn facet_bar(pair: FacetPair) -> Result<ChartSpec, ComposeError> {
    let anchor = facet_anchor(pair)
        .ok_or_else(|| ComposeError::InvalidRange(pair.midzone_label().to_string()))?;
    let row = pair_row(pair);
    let (left, right) = (pair.left(), pair.right());
    let series = vec![
        single_bar(
            left.name().to_string(),
            CellRef::new(row + 1, PAIR_COUNT_COL),
            FACET_COLORS[left.index()],
        ),
        single_bar(
            right.name().to_string(),
            CellRef::new(row + 2, PAIR_COUNT_COL),
            FACET_COLORS[right.index()],
        ),
        single_bar(
            pair.midzone_label().to_string(),
            CellRef::new(row + 3, PAIR_COUNT_COL),
            MIDZONE_COLORS[pair.index()],
        ),
    ];
    Ok(stacked_bar(anchor, series, FACET_SIZE))
}

fn dominant_pie() -> Result<ChartSpec, ComposeError> {
    let first = dominant_row(Dominant::ALL[0]);
    let last = dominant_row(Dominant::ALL[Dominant::ALL.len() - 1]);
    let series = SeriesSpec {
        name: Some("Dominant Function".to_string()),
        categories: Some(data(CellRange::new(
            first,
            DOMINANT_LABEL_COL,
            last,
            DOMINANT_LABEL_COL,
        ))),
        values: data(CellRange::new(first, DOMINANT_COUNT_COL, last, DOMINANT_COUNT_COL)),
        fill: None,
        point_fills: Vec::new(),
        label: DataLabel::CategoryName,
    };
    Ok(pie(
        at(DOMINANT_PIE_ANCHOR)?,
        "Dominant Function Distribution",
        series,
    ))
}

fn group_pie(
    anchor_a1: &str,
    name: &str,
    label_col: u16,
    count_col: u16,
    first_row: u32,
) -> Result<ChartSpec, ComposeError> {
    let last_row = first_row + 3;
    let series = SeriesSpec {
        name: Some(name.to_string()),
        categories: Some(data(CellRange::new(first_row, label_col, last_row, label_col))),
        values: data(CellRange::new(first_row, count_col, last_row, count_col)),
        fill: None,
        point_fills: Vec::new(),
        label: DataLabel::CategoryName,
    };
    Ok(pie(at(anchor_a1)?, &format!("{name} Distribution"), series))
}

fn facet_legend(ws: &mut Worksheet) -> Result<(), ComposeError> {
    let title = ws.set_text(at(FACET_LEGEND_TITLE)?, "Facet Charts");
    title.bold = true;
    title.font_color = Some(WHITE);

    let first = at(FACET_LEGEND_FIRST)?;
    for (i, line) in FACET_LEGEND.iter().enumerate() {
        ws.set_text(CellRef::new(first.row + i as u32, first.col), *line)
            .font_color = Some(WHITE);
    }
    Ok(())
}
