//! In-memory workbook model.
//!
//! The composer and the style applier work against this model; `xlsx`
//! renders it. Rows and columns are 0-based internally and rendered in A1
//! notation for table references, chart ranges and rule keys.

use std::collections::BTreeMap;
use std::fmt;

pub type Row = u32;
pub type Col = u16;

/// Column letters for a 0-based column index (`0` -> `A`, `77` -> `BZ`).
pub fn col_letters(col: Col) -> String {
    let mut n = col as u32 + 1;
    let mut out = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

pub fn parse_col(letters: &str) -> Option<Col> {
    if letters.is_empty() || !letters.bytes().all(|b| b.is_ascii_uppercase()) {
        return None;
    }
    let mut n: u32 = 0;
    for b in letters.bytes() {
        n = n * 26 + (b - b'A' + 1) as u32;
        if n > Col::MAX as u32 {
            return None;
        }
    }
    Some((n - 1) as Col)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRef {
    pub row: Row,
    pub col: Col,
}

impl CellRef {
    pub const fn new(row: Row, col: Col) -> Self {
        Self { row, col }
    }

    /// Parses `B17` style references. `$` markers are ignored.
    pub fn parse(s: &str) -> Option<Self> {
        let s: String = s.chars().filter(|c| *c != '$').collect();
        let split = s.find(|c: char| c.is_ascii_digit())?;
        let (letters, digits) = s.split_at(split);
        let col = parse_col(letters)?;
        let row: Row = digits.parse().ok()?;
        (row >= 1).then(|| Self::new(row - 1, col))
    }

    pub fn absolute(&self) -> String {
        format!("${}${}", col_letters(self.col), self.row + 1)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", col_letters(self.col), self.row + 1)
    }
}

/// Inclusive rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRange {
    pub first: CellRef,
    pub last: CellRef,
}

impl CellRange {
    pub const fn new(first_row: Row, first_col: Col, last_row: Row, last_col: Col) -> Self {
        Self {
            first: CellRef::new(first_row, first_col),
            last: CellRef::new(last_row, last_col),
        }
    }

    pub const fn cell(cell: CellRef) -> Self {
        Self {
            first: cell,
            last: cell,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.split_once(':') {
            Some((a, b)) => {
                let (first, last) = (CellRef::parse(a)?, CellRef::parse(b)?);
                (first.row <= last.row && first.col <= last.col).then_some(Self { first, last })
            }
            None => CellRef::parse(s).map(Self::cell),
        }
    }

    pub fn row_count(&self) -> u32 {
        self.last.row - self.first.row + 1
    }

    pub fn cells(&self) -> impl Iterator<Item = CellRef> + '_ {
        (self.first.row..=self.last.row).flat_map(move |r| {
            (self.first.col..=self.last.col).map(move |c| CellRef::new(r, c))
        })
    }

    /// `'Sheet'!$A$1:$B$2`, the form chart series expect.
    pub fn on_sheet(&self, sheet: &str) -> String {
        format!(
            "{}!{}:{}",
            quote_sheet(sheet),
            self.first.absolute(),
            self.last.absolute()
        )
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.first == self.last {
            write!(f, "{}", self.first)
        } else {
            write!(f, "{}:{}", self.first, self.last)
        }
    }
}

pub fn quote_sheet(name: &str) -> String {
    if name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "''"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Blank,
    Text(String),
    Number(f64),
    /// Formula text including the leading `=`.
    Formula(String),
}

impl CellValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Display width estimate used for column auto-sizing.
    pub fn display_len(&self) -> usize {
        match self {
            CellValue::Blank => 0,
            CellValue::Text(s) => s.chars().count(),
            CellValue::Number(n) => n.to_string().len(),
            // Formulas render as short counts.
            CellValue::Formula(_) => 4,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellStyle {
    pub bold: bool,
    pub font_size: Option<f64>,
    pub font_color: Option<u32>,
    pub fill: Option<u32>,
    pub num_format: Option<String>,
}

impl CellStyle {
    pub fn is_plain(&self) -> bool {
        *self == CellStyle::default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub value: CellValue,
    pub style: CellStyle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    pub name: String,
    pub range: CellRange,
    pub style: String,
    pub banded_rows: bool,
    pub banded_columns: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Pie,
    BarPercentStacked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataLabel {
    None,
    CategoryName,
    SeriesName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesSpec {
    pub name: Option<String>,
    /// `(sheet, range)`; `None` for single-value bar series.
    pub categories: Option<(String, CellRange)>,
    pub values: (String, CellRange),
    pub fill: Option<u32>,
    /// Per-point fills, used by pies.
    pub point_fills: Vec<u32>,
    pub label: DataLabel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub anchor: CellRef,
    pub title: Option<String>,
    pub series: Vec<SeriesSpec>,
    pub hide_axes: bool,
    pub hide_legend: bool,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScaleStop {
    pub value: u32,
    pub color: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// Cell text equals the given string.
    EqualTo(String),
    /// Formula relative to the top-left cell of the range.
    Formula(String),
    ColorScale3 {
        min: ScaleStop,
        mid: ScaleStop,
        max: ScaleStop,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConditionalRule {
    pub range: CellRange,
    pub kind: RuleKind,
    pub fill: Option<u32>,
}

impl ConditionalRule {
    pub fn equal_to(range: CellRange, value: &str, fill: u32) -> Self {
        Self {
            range,
            kind: RuleKind::EqualTo(value.to_string()),
            fill: Some(fill),
        }
    }

    pub fn formula(range: CellRange, formula: impl Into<String>, fill: u32) -> Self {
        Self {
            range,
            kind: RuleKind::Formula(formula.into()),
            fill: Some(fill),
        }
    }

    /// Formula text identifying this rule within its range.
    pub fn formula_text(&self) -> String {
        match &self.kind {
            RuleKind::EqualTo(v) => format!("={}=\"{}\"", self.range.first, v.replace('"', "\"\"")),
            RuleKind::Formula(f) => f.clone(),
            RuleKind::ColorScale3 { min, mid, max } => format!(
                "colorScale({}:{:06X},{}:{:06X},{}:{:06X})",
                min.value, min.color, mid.value, mid.color, max.value, max.color
            ),
        }
    }

    pub fn key(&self) -> (CellRange, String) {
        (self.range, self.formula_text())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Worksheet {
    pub name: String,
    cells: BTreeMap<(Row, Col), Cell>,
    pub tables: Vec<TableSpec>,
    pub charts: Vec<ChartSpec>,
    rules: Vec<ConditionalRule>,
    pub col_widths: BTreeMap<Col, f64>,
    pub row_heights: BTreeMap<Row, f64>,
    pub hide_gridlines: bool,
    pub freeze: Option<CellRef>,
}

impl Worksheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
            tables: Vec::new(),
            charts: Vec::new(),
            rules: Vec::new(),
            col_widths: BTreeMap::new(),
            row_heights: BTreeMap::new(),
            hide_gridlines: false,
            freeze: None,
        }
    }

    pub fn set(&mut self, at: CellRef, value: CellValue) -> &mut CellStyle {
        let cell = self.cells.entry((at.row, at.col)).or_insert(Cell {
            value: CellValue::Blank,
            style: CellStyle::default(),
        });
        cell.value = value;
        &mut cell.style
    }

    pub fn set_text(&mut self, at: CellRef, text: impl Into<String>) -> &mut CellStyle {
        self.set(at, CellValue::Text(text.into()))
    }

    pub fn set_number(&mut self, at: CellRef, n: f64) -> &mut CellStyle {
        self.set(at, CellValue::Number(n))
    }

    pub fn set_formula(&mut self, at: CellRef, formula: impl Into<String>) -> &mut CellStyle {
        self.set(at, CellValue::Formula(formula.into()))
    }

    /// Style of `at`, creating a blank cell if needed.
    pub fn style_mut(&mut self, at: CellRef) -> &mut CellStyle {
        &mut self
            .cells
            .entry((at.row, at.col))
            .or_insert(Cell {
                value: CellValue::Blank,
                style: CellStyle::default(),
            })
            .style
    }

    pub fn fill_range(&mut self, range: CellRange, color: u32) {
        for at in range.cells().collect::<Vec<_>>() {
            self.style_mut(at).fill = Some(color);
        }
    }

    pub fn get(&self, at: CellRef) -> Option<&Cell> {
        self.cells.get(&(at.row, at.col))
    }

    pub fn value(&self, at: CellRef) -> &CellValue {
        self.get(at).map(|c| &c.value).unwrap_or(&CellValue::Blank)
    }

    pub fn text(&self, at: CellRef) -> Option<&str> {
        self.get(at).and_then(|c| c.value.as_text())
    }

    pub fn cells(&self) -> impl Iterator<Item = (CellRef, &Cell)> {
        self.cells
            .iter()
            .map(|((r, c), cell)| (CellRef::new(*r, *c), cell))
    }

    /// Bounding box of every cell holding a value or a style.
    pub fn used_range(&self) -> Option<CellRange> {
        let mut it = self.cells.keys();
        let &(r0, c0) = it.next()?;
        let (mut min_r, mut min_c, mut max_r, mut max_c) = (r0, c0, r0, c0);
        for &(r, c) in it {
            min_r = min_r.min(r);
            min_c = min_c.min(c);
            max_r = max_r.max(r);
            max_c = max_c.max(c);
        }
        Some(CellRange::new(min_r, min_c, max_r, max_c))
    }

    pub fn rules(&self) -> &[ConditionalRule] {
        &self.rules
    }

    /// Adds `rule` unless one with the same range and formula exists.
    pub fn add_rule(&mut self, rule: ConditionalRule) -> bool {
        let key = rule.key();
        if self.rules.iter().any(|r| r.key() == key) {
            return false;
        }
        self.rules.push(rule);
        true
    }

    pub fn table(&self, name: &str) -> Option<&TableSpec> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Points table `name` at `range`, keeping its style. False if absent.
    pub fn replace_table(&mut self, name: &str, range: CellRange) -> bool {
        match self.tables.iter_mut().find(|t| t.name == name) {
            Some(t) => {
                t.range = range;
                true
            }
            None => false,
        }
    }

    /// Sets widths to `(longest + 2) * 1.2` over the used range.
    pub fn autofit(&mut self) {
        let mut longest: BTreeMap<Col, usize> = BTreeMap::new();
        for ((_, c), cell) in &self.cells {
            let len = cell.value.display_len();
            let e = longest.entry(*c).or_insert(0);
            *e = (*e).max(len);
        }
        for (c, len) in longest {
            if len > 0 {
                self.col_widths.insert(c, (len as f64 + 2.0) * 1.2);
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: Vec<Worksheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheets(&self) -> &[Worksheet] {
        &self.sheets
    }

    pub fn sheets_mut(&mut self) -> impl Iterator<Item = &mut Worksheet> {
        self.sheets.iter_mut()
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn sheet(&self, name: &str) -> Option<&Worksheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Worksheet> {
        self.sheets.iter_mut().find(|s| s.name == name)
    }

    /// Drops any sheet called `name` and appends a fresh one.
    pub fn recreate_sheet(&mut self, name: &str) -> &mut Worksheet {
        self.sheets.retain(|s| s.name != name);
        self.sheets.push(Worksheet::new(name));
        let last = self.sheets.len() - 1;
        &mut self.sheets[last]
    }

    /// `Dashboard`, `MBTI Results`, `Charts`, `Section*`, then the rest in
    /// creation order.
    pub fn order_sheets(&mut self) {
        fn rank(name: &str) -> u8 {
            match name {
                "Dashboard" => 0,
                "MBTI Results" => 1,
                "Charts" => 2,
                n if n.starts_with("Section") => 3,
                _ => 4,
            }
        }
        self.sheets.sort_by_key(|s| rank(&s.name));
    }

    pub fn table(&self, name: &str) -> Option<(&Worksheet, &TableSpec)> {
        self.sheets
            .iter()
            .find_map(|s| s.table(name).map(|t| (s, t)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_letters_round_trip() {
        for (col, s) in [(0, "A"), (25, "Z"), (26, "AA"), (50, "AY"), (51, "AZ"), (77, "BZ")] {
            assert_eq!(col_letters(col), s);
            assert_eq!(parse_col(s), Some(col));
        }
    }

    #[test]
    fn ranges_render_in_a1() {
        let r = CellRange::parse("A1:BZ2").unwrap();
        assert_eq!(r.row_count(), 2);
        assert_eq!(r.to_string(), "A1:BZ2");
        assert_eq!(r.on_sheet("Data"), "Data!$A$1:$BZ$2");
        assert_eq!(
            CellRange::parse("B2").unwrap().on_sheet("MBTI Results"),
            "'MBTI Results'!$B$2:$B$2"
        );
        assert!(CellRange::parse("B2:A1").is_none());
    }

    #[test]
    fn rules_dedupe_by_range_and_formula() {
        let mut ws = Worksheet::new("x");
        let range = CellRange::parse("A1:A5").unwrap();
        assert!(ws.add_rule(ConditionalRule::equal_to(range, "ESFP", 1)));
        assert!(!ws.add_rule(ConditionalRule::equal_to(range, "ESFP", 2)));
        assert!(ws.add_rule(ConditionalRule::equal_to(range, "ISTJ", 1)));
        assert_eq!(ws.rules().len(), 2);
    }

    #[test]
    fn recreate_sheet_discards_previous_content() {
        let mut wb = Workbook::new();
        wb.recreate_sheet("Data").set_text(CellRef::new(0, 0), "old");
        wb.recreate_sheet("Data");
        assert_eq!(wb.sheets().len(), 1);
        assert!(wb.sheet("Data").unwrap().used_range().is_none());
    }

    #[test]
    fn sheet_order_puts_dashboard_first() {
        let mut wb = Workbook::new();
        for n in ["Data", "MBTI Results", "Section 2", "Dashboard", "Facet Table"] {
            wb.recreate_sheet(n);
        }
        wb.order_sheets();
        assert_eq!(
            wb.sheet_names(),
            vec!["Dashboard", "MBTI Results", "Section 2", "Data", "Facet Table"]
        );
    }
}
