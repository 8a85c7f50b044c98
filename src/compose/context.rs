//! `Communicating`, `Managing Change` and `Managing Conflict`.

use super::ComposeError;
use super::layout::*;
use crate::record::{Context, SubjectRecord};
use crate::sheet::{CellRange, CellRef, TableSpec, Workbook};

pub fn build(wb: &mut Workbook, records: &[SubjectRecord]) -> Result<(), ComposeError> {
    if records.is_empty() {
        return Err(ComposeError::NoRecords);
    }
    for ctx in Context::ALL {
        build_one(wb, ctx, records);
    }
    Ok(())
}

fn build_one(wb: &mut Workbook, ctx: Context, records: &[SubjectRecord]) {
    let ws = wb.recreate_sheet(ctx.sheet_name());

    let title = ws.set_text(CONTEXT_TITLE, format!("{} Facets", ctx.sheet_name()));
    title.bold = true;
    title.font_size = Some(14.0);

    for (i, h) in context_headers().into_iter().enumerate() {
        ws.set_text(CellRef::new(CONTEXT_HEADER_ROW, i as u16), h).bold = true;
    }

    for (i, record) in records.iter().enumerate() {
        let row = CONTEXT_HEADER_ROW + 1 + i as u32;
        if let Some(name) = &record.name {
            ws.set_text(CellRef::new(row, NAME_COL), name.clone());
        }
        if let Some(date) = &record.date {
            ws.set_text(CellRef::new(row, DATE_COL), date.clone());
        }
        ws.set_text(CellRef::new(row, TYPE_COL), record.mbti_type.code());
        for (slot, entry) in record
            .context(ctx)
            .iter()
            .take(CONTEXT_GROUP_WIDTH as usize)
            .enumerate()
        {
            ws.set_text(
                CellRef::new(row, CONTEXT_FIRST_FACET_COL + slot as u16),
                entry.canonical(),
            );
        }
    }

    let last_row = CONTEXT_HEADER_ROW + records.len() as u32;
    ws.tables.push(TableSpec {
        name: ctx.table_name(),
        range: CellRange::new(CONTEXT_HEADER_ROW, 0, last_row, CONTEXT_LAST_COL),
        style: CONTEXT_TABLE_STYLE.to_string(),
        banded_rows: true,
        banded_columns: false,
    });
    ws.autofit();
}
