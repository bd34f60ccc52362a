use crate::config::{ColumnMap, TableSchema};
use crate::models::fund::{Fund, RawRow};

/// Turn a raw row into a fund, or `None` when the row has fewer than
/// `min_columns` cells. Uses the default column layout.
pub fn normalize(row: &RawRow, index: u32, period_label: &str, min_columns: usize) -> Option<Fund> {
    normalize_with(row, index, period_label, min_columns, &ColumnMap::default())
}

pub fn normalize_with(
    row: &RawRow,
    index: u32,
    period_label: &str,
    min_columns: usize,
    columns: &ColumnMap,
) -> Option<Fund> {
    if row.len() < min_columns {
        return None;
    }

    let cell = |i: Option<usize>| {
        i.and_then(|i| row.get(i))
            .map(|s| s.trim())
            .unwrap_or_default()
            .to_string()
    };

    Some(Fund {
        id: index,
        name: cell(Some(columns.name)),
        month_performance: format!("{}: {}", period_label, cell(Some(columns.current_period))),
        last_year: cell(columns.last_year),
        last_3_years: cell(columns.last_3_years),
        last_5_years: cell(columns.last_5_years),
    })
}

/// Normalize every row of one scrape.
///
/// Ids are 1-based positions among the retained rows; a dropped row does
/// not consume an id. Returns the funds and the number of dropped rows.
pub fn normalize_rows(rows: &[RawRow], period_label: &str, schema: &TableSchema) -> (Vec<Fund>, usize) {
    let mut funds = Vec::with_capacity(rows.len());
    let mut dropped = 0;

    for row in rows {
        let next_id = funds.len() as u32 + 1;
        match normalize_with(row, next_id, period_label, schema.min_columns, &schema.columns) {
            Some(fund) => funds.push(fund),
            None => dropped += 1,
        }
    }

    (funds, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> RawRow {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn cells_map_to_fields_by_position() {
        let fund = normalize(&row(&["Fund X", "1.2%", "10%", "30%", "50%"]), 1, "March", 5).unwrap();
        assert_eq!(
            fund,
            Fund {
                id: 1,
                name: "Fund X".to_string(),
                month_performance: "March: 1.2%".to_string(),
                last_year: "10%".to_string(),
                last_3_years: "30%".to_string(),
                last_5_years: "50%".to_string(),
            }
        );
    }

    #[test]
    fn surrounding_whitespace_is_stripped() {
        let clean = normalize(&row(&["Fund X", "1.2%", "10%", "30%", "50%"]), 1, "March", 5);
        let padded = normalize(&row(&[" Fund X ", " 1.2% ", "10%", "30%", "50%"]), 1, "March", 5);
        assert_eq!(clean, padded);
    }

    #[test]
    fn short_rows_are_dropped() {
        assert!(normalize(&row(&["Fund X", "1.2%", "10%", "30%"]), 1, "March", 5).is_none());
        assert!(normalize(&row(&[]), 1, "March", 5).is_none());
    }

    #[test]
    fn extra_columns_are_ignored() {
        let fund = normalize(&row(&["A", "1", "2", "3", "4", "fee 0.5%"]), 3, "May", 5).unwrap();
        assert_eq!(fund.id, 3);
        assert_eq!(fund.last_5_years, "4");
    }

    #[test]
    fn dropped_rows_do_not_consume_ids() {
        let rows = vec![
            row(&["A", "1", "2", "3", "4"]),
            row(&["short", "1"]),
            row(&["B", "1", "2", "3", "4"]),
            row(&["C", "1", "2", "3", "4"]),
        ];
        let (funds, dropped) = normalize_rows(&rows, "מאי", &TableSchema::default());
        assert_eq!(dropped, 1);
        let ids: Vec<u32> = funds.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        let names: Vec<&str> = funds.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(funds[0].month_performance, "מאי: 1");
    }

    #[test]
    fn custom_column_map_reorders_fields() {
        let columns = ColumnMap {
            name: 1,
            current_period: 0,
            last_year: Some(2),
            last_3_years: Some(3),
            last_5_years: None,
        };
        let fund = normalize_with(&row(&["0.3%", "Fund Y", "9%", "27%"]), 1, "June", 4, &columns).unwrap();
        assert_eq!(fund.name, "Fund Y");
        assert_eq!(fund.month_performance, "June: 0.3%");
        assert_eq!(fund.last_3_years, "27%");
        assert_eq!(fund.last_5_years, "");
    }
}
