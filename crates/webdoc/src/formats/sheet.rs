//! Spreadsheets, one page per sheet

use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

use crate::error::DocError;
use crate::types::{Document, DocumentKind};

pub fn load(path: &Path) -> Result<Document, DocError> {
    let mut workbook = open_workbook_auto(path).map_err(DocError::read)?;
    let names = workbook.sheet_names();

    let mut pages = Vec::with_capacity(names.len());
    for name in &names {
        let range = workbook.worksheet_range(name).map_err(DocError::read)?;
        let rows: Vec<String> = range.rows().map(row_text).collect();
        pages.push((Some(name.clone()), rows.join("\n")));
    }

    let mut doc = Document::paged(DocumentKind::Xlsx, pages);
    doc.metadata.insert("sheets".to_string(), names.join(","));
    Ok(doc)
}

/// Cells of one row, tab separated, without trailing empty cells
fn row_text(row: &[Data]) -> String {
    let cells: Vec<String> = row.iter().map(|cell| cell.to_string()).collect();
    let used = cells
        .iter()
        .rposition(|c| !c.is_empty())
        .map_or(0, |last| last + 1);
    cells[..used].join("\t")
}
