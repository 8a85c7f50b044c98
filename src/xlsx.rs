//! Renders the workbook model with `rust_xlsxwriter` and reads
//! `MBTI Results` rows back with `calamine`.

use crate::compose::layout::{CONTEXT_GROUP_WIDTH, RESULTS_SHEET};
use crate::record::{Context, ContextFacet, Facet, FacetClass, Preference, SubjectRecord};
use crate::sheet::{
    self, CellStyle, CellValue, ChartKind, ChartSpec, ConditionalRule, DataLabel, RuleKind,
    TableSpec,
};
use crate::util::write_atomic;
use anyhow::{Context as _, Result, anyhow};
use calamine::{Data, Reader, open_workbook_auto};
use rust_xlsxwriter::{
    Chart, ChartDataLabel, ChartFormat, ChartPoint, ChartSolidFill, ChartType, Color,
    ConditionalFormat3ColorScale, ConditionalFormatCell, ConditionalFormatCellRule,
    ConditionalFormatFormula, ConditionalFormatType, Format, Table, TableColumn, TableStyle,
    Worksheet, XlsxError,
};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, Serialize)]
pub struct RenderReport {
    pub sheets: usize,
    pub charts: usize,
    pub rules_written: usize,
    pub rules_failed: usize,
}

fn format_for(style: &CellStyle) -> Format {
    let mut f = Format::new();
    if style.bold {
        f = f.set_bold();
    }
    if let Some(size) = style.font_size {
        f = f.set_font_size(size);
    }
    if let Some(c) = style.font_color {
        f = f.set_font_color(Color::RGB(c));
    }
    if let Some(c) = style.fill {
        f = f.set_background_color(Color::RGB(c));
    }
    if let Some(nf) = &style.num_format {
        f = f.set_num_format(nf);
    }
    f
}

fn fill_format(fill: Option<u32>) -> Format {
    match fill {
        Some(c) => Format::new().set_background_color(Color::RGB(c)),
        None => Format::new(),
    }
}

/// Serializes `model` and writes it to `path` through a temp file.
pub fn write_workbook(model: &sheet::Workbook, path: &Path) -> Result<RenderReport> {
    let mut book = rust_xlsxwriter::Workbook::new();
    let mut report = RenderReport::default();

    for ws_model in model.sheets() {
        let ws = book.add_worksheet();
        ws.set_name(&ws_model.name)
            .with_context(|| format!("sheet name {:?}", ws_model.name))?;
        render_sheet(ws, ws_model, &mut report)
            .with_context(|| format!("render sheet {}", ws_model.name))?;
        report.sheets += 1;
    }

    let bytes = book
        .save_to_buffer()
        .map_err(|e| anyhow!("serialize workbook: {e}"))?;
    write_atomic(path, &bytes)?;
    debug!(
        "wrote {} sheets={} charts={} rules={} failed_rules={}",
        path.display(),
        report.sheets,
        report.charts,
        report.rules_written,
        report.rules_failed
    );
    Ok(report)
}

fn render_sheet(
    ws: &mut Worksheet,
    model: &sheet::Worksheet,
    report: &mut RenderReport,
) -> Result<(), XlsxError> {
    for (at, cell) in model.cells() {
        let fmt = format_for(&cell.style);
        let (row, col) = (at.row, at.col);
        match &cell.value {
            CellValue::Blank => {
                if !cell.style.is_plain() {
                    ws.write_blank(row, col, &fmt)?;
                }
            }
            CellValue::Text(s) => {
                ws.write_string_with_format(row, col, s, &fmt)?;
            }
            CellValue::Number(n) => {
                ws.write_number_with_format(row, col, *n, &fmt)?;
            }
            CellValue::Formula(f) => {
                ws.write_formula_with_format(row, col, f.as_str(), &fmt)?;
            }
        }
    }

    for (col, width) in &model.col_widths {
        ws.set_column_width(*col, *width)?;
    }
    for (row, height) in &model.row_heights {
        ws.set_row_height(*row, *height)?;
    }
    if model.hide_gridlines {
        ws.set_screen_gridlines(false);
    }
    if let Some(f) = model.freeze {
        ws.set_freeze_panes(f.row, f.col)?;
    }

    for table in &model.tables {
        render_table(ws, model, table)?;
    }

    for chart in &model.charts {
        let c = build_chart(chart);
        ws.insert_chart(chart.anchor.row, chart.anchor.col, &c)?;
        report.charts += 1;
    }

    for rule in model.rules() {
        match add_rule(ws, rule) {
            Ok(()) => report.rules_written += 1,
            Err(e) => {
                warn!(
                    "conditional rule {} on {}!{} rejected: {e}",
                    rule.formula_text(),
                    model.name,
                    rule.range
                );
                report.rules_failed += 1;
            }
        }
    }
    Ok(())
}

fn render_table(
    ws: &mut Worksheet,
    model: &sheet::Worksheet,
    spec: &TableSpec,
) -> Result<(), XlsxError> {
    let header_row = spec.range.first.row;
    let columns: Vec<TableColumn> = (spec.range.first.col..=spec.range.last.col)
        .map(|c| {
            let at = sheet::CellRef::new(header_row, c);
            let caption = model
                .text(at)
                .map(str::to_string)
                .unwrap_or_else(|| format!("Column{}", c - spec.range.first.col + 1));
            let mut column = TableColumn::new().set_header(caption);
            if let Some(cell) = model.get(at) {
                column = column.set_header_format(format_for(&cell.style));
            }
            column
        })
        .collect();

    let table = Table::new()
        .set_name(&spec.name)
        .set_style(table_style(&spec.style))
        .set_banded_rows(spec.banded_rows)
        .set_banded_columns(spec.banded_columns)
        .set_columns(&columns);

    ws.add_table(
        spec.range.first.row,
        spec.range.first.col,
        spec.range.last.row,
        spec.range.last.col,
        &table,
    )?;
    Ok(())
}

fn build_chart(spec: &ChartSpec) -> Chart {
    let kind = match spec.kind {
        ChartKind::Pie => ChartType::Pie,
        ChartKind::BarPercentStacked => ChartType::BarPercentStacked,
    };
    let mut chart = Chart::new(kind);

    for s in &spec.series {
        let series = chart.add_series();
        let (sheet_name, v) = &s.values;
        series.set_values((
            sheet_name.as_str(),
            v.first.row,
            v.first.col,
            v.last.row,
            v.last.col,
        ));
        if let Some((sheet_name, c)) = &s.categories {
            series.set_categories((
                sheet_name.as_str(),
                c.first.row,
                c.first.col,
                c.last.row,
                c.last.col,
            ));
        }
        if let Some(name) = &s.name {
            series.set_name(name.as_str());
        }
        if let Some(fill) = s.fill {
            series.set_format(
                ChartFormat::new().set_solid_fill(ChartSolidFill::new().set_color(Color::RGB(fill))),
            );
        }
        if !s.point_fills.is_empty() {
            let points: Vec<ChartPoint> = s
                .point_fills
                .iter()
                .map(|c| {
                    ChartPoint::new().set_format(
                        ChartFormat::new()
                            .set_solid_fill(ChartSolidFill::new().set_color(Color::RGB(*c))),
                    )
                })
                .collect();
            series.set_points(&points);
        }
        match s.label {
            DataLabel::None => {}
            DataLabel::CategoryName => {
                series.set_data_label(ChartDataLabel::new().show_category_name());
            }
            DataLabel::SeriesName => {
                series.set_data_label(ChartDataLabel::new().show_series_name());
            }
        }
    }

    if let Some(title) = &spec.title {
        chart.title().set_name(title);
    }
    if spec.hide_legend {
        chart.legend().set_hidden();
    }
    if spec.hide_axes {
        chart.x_axis().set_hidden(true).set_major_gridlines(false);
        chart.y_axis().set_hidden(true).set_major_gridlines(false);
    }
    chart.set_width(spec.width).set_height(spec.height);
    chart
}

fn add_rule(ws: &mut Worksheet, rule: &ConditionalRule) -> Result<(), XlsxError> {
    let r = rule.range;
    let (r0, c0, r1, c1) = (r.first.row, r.first.col, r.last.row, r.last.col);
    match &rule.kind {
        RuleKind::EqualTo(value) => {
            let quoted = format!("\"{}\"", value.replace('"', "\"\""));
            let cf = ConditionalFormatCell::new()
                .set_rule(ConditionalFormatCellRule::EqualTo(quoted.as_str()))
                .set_format(fill_format(rule.fill));
            ws.add_conditional_format(r0, c0, r1, c1, &cf)?;
        }
        RuleKind::Formula(formula) => {
            let cf = ConditionalFormatFormula::new()
                .set_rule(formula.as_str())
                .set_format(fill_format(rule.fill));
            ws.add_conditional_format(r0, c0, r1, c1, &cf)?;
        }
        RuleKind::ColorScale3 { min, mid, max } => {
            let cf = ConditionalFormat3ColorScale::new()
                .set_minimum(ConditionalFormatType::Number, f64::from(min.value))
                .set_midpoint(ConditionalFormatType::Number, f64::from(mid.value))
                .set_maximum(ConditionalFormatType::Number, f64::from(max.value))
                .set_minimum_color(Color::RGB(min.color))
                .set_midpoint_color(Color::RGB(mid.color))
                .set_maximum_color(Color::RGB(max.color));
            ws.add_conditional_format(r0, c0, r1, c1, &cf)?;
        }
    }
    Ok(())
}

/// Maps `TableStyleMedium9` style names onto the writer's enum.
pub fn table_style(name: &str) -> TableStyle {
    let short = name.strip_prefix("TableStyle").unwrap_or(name);
    match short {
        "None" => TableStyle::None,
        "Light1" => TableStyle::Light1,
        "Light2" => TableStyle::Light2,
        "Light8" => TableStyle::Light8,
        "Light9" => TableStyle::Light9,
        "Light15" => TableStyle::Light15,
        "Medium1" => TableStyle::Medium1,
        "Medium2" => TableStyle::Medium2,
        "Medium3" => TableStyle::Medium3,
        "Medium4" => TableStyle::Medium4,
        "Medium5" => TableStyle::Medium5,
        "Medium6" => TableStyle::Medium6,
        "Medium7" => TableStyle::Medium7,
        "Medium8" => TableStyle::Medium8,
        "Medium9" => TableStyle::Medium9,
        "Medium10" => TableStyle::Medium10,
        "Medium11" => TableStyle::Medium11,
        "Medium12" => TableStyle::Medium12,
        "Medium13" => TableStyle::Medium13,
        "Medium14" => TableStyle::Medium14,
        "Medium15" => TableStyle::Medium15,
        "Medium16" => TableStyle::Medium16,
        "Medium17" => TableStyle::Medium17,
        "Medium18" => TableStyle::Medium18,
        "Medium19" => TableStyle::Medium19,
        "Medium20" => TableStyle::Medium20,
        "Medium21" => TableStyle::Medium21,
        "Dark1" => TableStyle::Dark1,
        "Dark2" => TableStyle::Dark2,
        "Dark9" => TableStyle::Dark9,
        other => {
            warn!("unsupported table style {other:?}; using TableStyleMedium9");
            TableStyle::Medium9
        }
    }
}

fn cell_text(d: &Data) -> String {
    match d {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

fn cell_u32(d: &Data) -> u32 {
    match d {
        Data::Float(f) if *f >= 0.0 => *f as u32,
        Data::Int(i) if *i >= 0 => *i as u32,
        Data::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// Reads every body row of `MBTI Results` back into records. Rows without a
/// valid type are skipped with a warning.
pub fn read_records(path: &Path) -> Result<Vec<SubjectRecord>> {
    let mut book =
        open_workbook_auto(path).with_context(|| format!("open workbook {}", path.display()))?;
    let range = book
        .worksheet_range(RESULTS_SHEET)
        .with_context(|| format!("{RESULTS_SHEET} in {}", path.display()))?;

    let mut rows = range.rows();
    let header: Vec<String> = rows
        .next()
        .ok_or_else(|| anyhow!("{RESULTS_SHEET} is empty in {}", path.display()))?
        .iter()
        .map(cell_text)
        .collect();
    let col = |name: &str| header.iter().position(|h| h == name);

    let type_col = col("Type").ok_or_else(|| anyhow!("{RESULTS_SHEET} has no Type column"))?;
    let name_col = col("Name");
    let date_col = col("Date");

    let mut records = Vec::new();
    for (i, row) in rows.enumerate() {
        let get = |c: Option<usize>| c.and_then(|c| row.get(c));
        let text = |c: Option<usize>| get(c).map(cell_text).filter(|s| !s.is_empty());

        let Some(type_text) = text(Some(type_col)) else {
            continue;
        };
        let mbti_type = match type_text.parse() {
            Ok(t) => t,
            Err(e) => {
                warn!("{RESULTS_SHEET} row {}: {e}; skipped", i + 2);
                continue;
            }
        };

        let mut record = SubjectRecord::new(text(name_col), text(date_col), mbti_type);

        for p in Preference::ALL {
            if let Some(d) = get(col(p.label())) {
                record.preference_scores.set(p, cell_u32(d));
            }
        }

        for facet in Facet::all() {
            let raw = text(col(facet.name())).unwrap_or_default();
            let class = FacetClass::parse(&raw).unwrap_or_else(|| {
                warn!("{RESULTS_SHEET} row {}: unknown class {raw:?}", i + 2);
                FacetClass::Unclassified
            });
            record.facet_classes.set(facet, class);
        }

        for ctx in Context::ALL {
            let Some(first) = col(ctx.sheet_name()) else {
                continue;
            };
            let entries: Vec<ContextFacet> = (first..first + CONTEXT_GROUP_WIDTH as usize)
                .filter_map(|c| text(Some(c)))
                .filter_map(|s| ContextFacet::from_canonical(&s))
                .collect();
            *record.context_mut(ctx) = entries;
        }

        records.push(record);
    }

    debug!("read {} records from {}", records.len(), path.display());
    Ok(records)
}
