use scraper::{ElementRef, Html, Selector};
use crate::config::TableSchema;
use crate::errors::ParseError;
use crate::models::fund::RawRow;
use crate::util::clean_text;

fn compile(selector: &str) -> Result<Selector, ParseError> {
    Selector::parse(selector)
        .map_err(|e| ParseError(format!("selector '{}' cannot be compiled: {:?}", selector, e)))
}

/// Extract the data rows of the table in `markup`.
///
/// The first matched row is treated as the header and always dropped.
/// Cells are the row's direct children matching the cell selector, so a
/// table nested inside a cell does not leak its cells into the outer row.
/// Column counts are not checked here.
pub fn locate(markup: &str, schema: &TableSchema) -> Result<Vec<RawRow>, ParseError> {
    let row_selector = compile(&schema.row_selector)?;
    let cell_selector = compile(&schema.cell_selector)?;

    let document = Html::parse_document(markup);

    let rows = document
        .select(&row_selector)
        .skip(1)
        .map(|row| {
            row.children()
                .filter_map(ElementRef::wrap)
                .filter(|cell| cell_selector.matches(cell))
                .map(|cell| clean_text(&cell.text().collect::<String>()))
                .collect()
        })
        .collect();

    Ok(rows)
}
