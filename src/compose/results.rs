//! `MBTI Results`: one row per subject under the named table `Table1`.

use super::ComposeError;
use super::layout::*;
use crate::record::{Context, Facet, SubjectRecord};
use crate::sheet::{CellRef, Row, TableSpec, Workbook};

pub fn create(wb: &mut Workbook, table_style: &str) {
    let ws = wb.recreate_sheet(RESULTS_SHEET);
    for (i, h) in results_headers().into_iter().enumerate() {
        ws.set_text(CellRef::new(0, i as u16), h).bold = true;
    }
    ws.freeze = Some(CellRef::new(1, 0));
    ws.tables.push(TableSpec {
        name: RESULTS_TABLE.to_string(),
        range: results_table_range(0),
        style: table_style.to_string(),
        banded_rows: true,
        banded_columns: true,
    });
}

/// Writes `record` as body row `index` (0-based) and re-references `Table1`.
pub fn append_row(
    wb: &mut Workbook,
    index: usize,
    record: &SubjectRecord,
) -> Result<(), ComposeError> {
    let ws = wb
        .sheet_mut(RESULTS_SHEET)
        .ok_or_else(|| ComposeError::SheetNotFound(RESULTS_SHEET.to_string()))?;
    let row = index as Row + 1;
    let at = |col| CellRef::new(row, col);

    if let Some(name) = &record.name {
        ws.set_text(at(NAME_COL), name.clone());
    }
    if let Some(date) = &record.date {
        ws.set_text(at(DATE_COL), date.clone());
    }
    ws.set_text(at(TYPE_COL), record.mbti_type.code());

    for (p, v) in record.preference_scores.iter() {
        ws.set_number(at(score_col(p)), v as f64);
    }

    for facet in Facet::all() {
        ws.set_text(
            at(facet_col(facet)),
            record.facet_classes.get(facet).as_str(),
        );
    }

    for ctx in Context::ALL {
        let entries = record.context(ctx);
        for (slot, entry) in entries.iter().take(CONTEXT_GROUP_WIDTH as usize).enumerate() {
            ws.set_text(at(context_col(ctx, slot)), entry.canonical());
        }
    }

    let range = results_table_range(index + 1);
    if !ws.replace_table(RESULTS_TABLE, range) {
        return Err(ComposeError::TableNotFound(RESULTS_TABLE.to_string()));
    }
    Ok(())
}

/// Non-empty context cells of body row `row`, AZ through BZ.
pub fn context_cells(wb: &Workbook, row: Row) -> Vec<String> {
    let Some(ws) = wb.sheet(RESULTS_SHEET) else {
        return Vec::new();
    };
    (CONTEXT_FIRST_COL..=RESULTS_LAST_COL)
        .filter_map(|c| ws.text(CellRef::new(row, c)))
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .collect()
}
