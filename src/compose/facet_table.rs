//! `Facet Table`: each subject's context facets regrouped by how many of the
//! three contexts list them.

use super::ComposeError;
use super::layout::*;
use super::results::context_cells;
use crate::sheet::{CellRange, CellRef, TableSpec, Workbook};
use crate::taxonomy::{BUCKET_ONE_FILL, BUCKET_THREE_FILL, BUCKET_TWO_FILL};
use tracing::warn;

pub const BUCKET_FILLS: [u32; 3] = [BUCKET_THREE_FILL, BUCKET_TWO_FILL, BUCKET_ONE_FILL];

/// Splits `entries` into the three-, two- and one-time buckets, in order of
/// first appearance. Each bucket is packed from its first slot.
pub fn bucket_facets(entries: &[String]) -> [Vec<String>; 3] {
    let mut counted: Vec<(String, usize)> = Vec::new();
    for e in entries {
        let key = e.trim().to_lowercase();
        if key.is_empty() {
            continue;
        }
        match counted.iter_mut().find(|(k, _)| *k == key) {
            Some((_, n)) => *n += 1,
            None => counted.push((key, 1)),
        }
    }

    let mut buckets: [Vec<String>; 3] = Default::default();
    for (name, n) in counted {
        let b = match n {
            1 => 2,
            2 => 1,
            _ => 0,
        };
        buckets[b].push(name);
    }
    buckets
}

pub fn build(wb: &mut Workbook) -> Result<(), ComposeError> {
    let body_rows = wb
        .table(RESULTS_TABLE)
        .map(|(_, t)| t.range.row_count() - 1)
        .ok_or_else(|| ComposeError::TableNotFound(RESULTS_TABLE.to_string()))?;
    if body_rows == 0 {
        return Err(ComposeError::NoRecords);
    }

    let mut rows = Vec::with_capacity(body_rows as usize);
    {
        let results = wb
            .sheet(RESULTS_SHEET)
            .ok_or_else(|| ComposeError::SheetNotFound(RESULTS_SHEET.to_string()))?;
        for r in 1..=body_rows {
            let identity: Vec<Option<String>> = [NAME_COL, DATE_COL, TYPE_COL]
                .iter()
                .map(|c| results.text(CellRef::new(r, *c)).map(str::to_string))
                .collect();
            rows.push((identity, bucket_facets(&context_cells(wb, r))));
        }
    }

    let ws = wb.recreate_sheet(FACET_TABLE_SHEET);
    for (i, h) in facet_table_headers().into_iter().enumerate() {
        let col = i as u16;
        let style = ws.set_text(CellRef::new(0, col), h);
        style.bold = true;
        if let Some(b) = bucket_of(col) {
            style.fill = Some(BUCKET_FILLS[b]);
        }
    }

    for (i, (identity, buckets)) in rows.into_iter().enumerate() {
        let row = 1 + i as u32;
        for (col, value) in identity.into_iter().enumerate() {
            if let Some(v) = value {
                ws.set_text(CellRef::new(row, col as u16), v);
            }
        }
        for (b, names) in buckets.into_iter().enumerate() {
            let cap = BUCKET_CAPACITY[b];
            if names.len() > cap {
                warn!(
                    "facet table row {row}: {} entries for a {cap}-slot bucket; extra dropped",
                    names.len()
                );
            }
            let first = bucket_col(b);
            for slot in 0..cap {
                let at = CellRef::new(row, first + slot as u16);
                match names.get(slot) {
                    Some(name) => ws.set_text(at, name.clone()).fill = Some(BUCKET_FILLS[b]),
                    None => ws.style_mut(at).fill = Some(BUCKET_FILLS[b]),
                }
            }
        }
    }

    ws.tables.push(TableSpec {
        name: FACET_TABLE_NAME.to_string(),
        range: CellRange::new(0, 0, body_rows, FACET_TABLE_LAST_COL),
        style: CONTEXT_TABLE_STYLE.to_string(),
        banded_rows: false,
        banded_columns: false,
    });
    ws.autofit();
    Ok(())
}

fn bucket_of(col: u16) -> Option<usize> {
    (0..3).find(|&b| {
        let first = bucket_col(b);
        (first..first + BUCKET_CAPACITY[b] as u16).contains(&col)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn three_time_facet_lands_in_first_bucket() {
        let entries = s(&["questioning", "tough", "questioning", "questioning", "active"]);
        let [three, two, one] = bucket_facets(&entries);
        assert_eq!(three, s(&["questioning"]));
        assert!(two.is_empty());
        assert_eq!(one, s(&["tough", "active"]));
    }

    #[test]
    fn buckets_keep_first_appearance_order() {
        let entries = s(&["b", "a", "a", "b", "c"]);
        let [_, two, one] = bucket_facets(&entries);
        assert_eq!(two, s(&["b", "a"]));
        assert_eq!(one, s(&["c"]));
    }
}
