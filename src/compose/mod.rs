//! Workbook Composer.
//!
//! `MBTI Results` grows one row per [`Composer::append`]; every derived
//! sheet is rebuilt from scratch by [`Composer::finish`].

pub mod context;
pub mod dashboard;
pub mod data;
pub mod facet_table;
pub mod layout;
pub mod results;

use crate::record::SubjectRecord;
use crate::sheet::Workbook;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComposeError {
    #[error("named table {0} not found")]
    TableNotFound(String),
    #[error("sheet {0} not found")]
    SheetNotFound(String),
    #[error("no records to compose")]
    NoRecords,
    #[error("invalid range {0}")]
    InvalidRange(String),
}

pub struct Composer {
    workbook: Workbook,
    records: Vec<SubjectRecord>,
    table_style: String,
}

impl Composer {
    pub fn new(table_style: &str) -> Self {
        let mut workbook = Workbook::new();
        results::create(&mut workbook, table_style);
        Self {
            workbook,
            records: Vec::new(),
            table_style: table_style.to_string(),
        }
    }

    pub fn records(&self) -> &[SubjectRecord] {
        &self.records
    }

    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }

    pub fn table_style(&self) -> &str {
        &self.table_style
    }

    /// Writes the next `MBTI Results` row and widens `Table1` over it.
    pub fn append(&mut self, record: SubjectRecord) -> Result<(), ComposeError> {
        results::append_row(&mut self.workbook, self.records.len(), &record)?;
        self.records.push(record);
        Ok(())
    }

    /// Builds the derived sheets and fixes the sheet order.
    pub fn finish(mut self) -> Result<Workbook, ComposeError> {
        if self.records.is_empty() {
            return Err(ComposeError::NoRecords);
        }

        data::build(&mut self.workbook);
        dashboard::build(&mut self.workbook)?;
        context::build(&mut self.workbook, &self.records)?;
        facet_table::build(&mut self.workbook)?;
        self.workbook.order_sheets();

        info!(
            "composed workbook records={} sheets={:?}",
            self.records.len(),
            self.workbook.sheet_names()
        );
        Ok(self.workbook)
    }
}

/// Appends every record in order, then finishes.
pub fn compose(records: &[SubjectRecord], table_style: &str) -> Result<Workbook, ComposeError> {
    let mut composer = Composer::new(table_style);
    for r in records {
        composer.append(r.clone())?;
    }
    composer.finish()
}
