//! `FrTable` — the auxiliary table kind (`auxTable` containers on
//! `FrameH`/`FrProcData`/`FrDetector`): a named column set.

#[derive(Debug, Clone, Default)]
pub struct FrTable {
    pub name: String,
    pub comment: String,
    pub columns: Vec<String>,
    /// Row-major cell values, one `String` per `(row, column)`. Cell
    /// typing beyond string representation is out of scope (spec.md §1).
    pub rows: Vec<Vec<String>>,
}
