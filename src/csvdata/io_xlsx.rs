use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::csvdata::*;

fn get_range(path: &str, worksheet_name_o: Option<&str>) -> BCsvDataResult<calamine::Range<DataType>> {
    debug!(
        "read_xlsx_rows: path: {:?} worksheet: {:?}",
        path, worksheet_name_o
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it. Otherwise the first one.
    let wrange = if let Some(worksheet_name) = worksheet_name_o {
        workbook
            .worksheet_range(worksheet_name)
            .context(EmptyExcelSnafu {})?
            .context(OpeningExcelSnafu { path })?
    } else {
        workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu {})?
            .context(OpeningExcelSnafu { path })?
    };
    Ok(wrange)
}

/// The text of a cell, as it would have been written in a CSV file.
fn cell_value(cell: &DataType, lineno: u64) -> CsvDataResult<Option<String>> {
    match cell {
        DataType::Empty => Ok(None),
        DataType::String(s) => Ok(Some(s.clone())),
        DataType::Int(i) => Ok(Some(i.to_string())),
        // Spreadsheets store all the numbers as floats.
        DataType::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => {
            Ok(Some(format!("{}", *f as i64)))
        }
        DataType::Float(f) => Ok(Some(f.to_string())),
        DataType::Bool(b) => Ok(Some(if *b { "1" } else { "0" }.to_string())),
        x => ExcelWrongCellTypeSnafu {
            lineno,
            content: format!("{:?}", x),
        }
        .fail(),
    }
}

pub fn read_xlsx_rows(
    path: &str,
    worksheet_name: Option<&str>,
) -> BCsvDataResult<Vec<(u64, Row)>> {
    let wrange = get_range(path, worksheet_name)?;
    let res = rows_from_range(&wrange)?;
    info!("Read {} rows from {:?}", res.len(), path);
    Ok(res)
}

/// The first row of the range holds the column names. Empty cells are absent
/// columns and lines without any value are skipped.
pub fn rows_from_range(wrange: &calamine::Range<DataType>) -> BCsvDataResult<Vec<(u64, Row)>> {
    // Line numbers as displayed by spreadsheet programs.
    let first_line = wrange.start().map(|(r, _)| r as u64 + 1).unwrap_or(1);

    let mut iter = wrange.rows();
    let header_cells = iter.next().context(EmptyExcelSnafu {})?;
    let mut header: Vec<Option<String>> = Vec::new();
    for cell in header_cells.iter() {
        header.push(cell_value(cell, first_line)?);
    }
    debug!("rows_from_range: header: {:?}", header);

    let mut res: Vec<(u64, Row)> = Vec::new();
    for (idx, cells) in iter.enumerate() {
        let lineno = first_line + idx as u64 + 1;
        let mut row = Row::new();
        for (name_o, cell) in header.iter().zip(cells.iter()) {
            if let (Some(name), Some(value)) = (name_o, cell_value(cell, lineno)?) {
                row.insert(name.clone(), value);
            }
        }
        if row.is_empty() {
            debug!("rows_from_range: skipping empty line {}", lineno);
            continue;
        }
        res.push((lineno, row));
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_render_like_csv() {
        assert_eq!(cell_value(&DataType::Empty, 2).unwrap(), None);
        assert_eq!(
            cell_value(&DataType::Float(3.0), 2).unwrap(),
            Some("3".to_string())
        );
        assert_eq!(
            cell_value(&DataType::Float(0.25), 2).unwrap(),
            Some("0.25".to_string())
        );
        assert_eq!(
            cell_value(&DataType::Int(-1), 2).unwrap(),
            Some("-1".to_string())
        );
        assert_eq!(
            cell_value(&DataType::String("Hi".to_string()), 2).unwrap(),
            Some("Hi".to_string())
        );
        assert!(matches!(
            cell_value(&DataType::DateTime(44000.5), 4),
            Err(CsvDataError::ExcelWrongCellType { lineno: 4, .. })
        ));
    }

    fn cell(s: &str) -> DataType {
        DataType::String(s.to_string())
    }

    #[test]
    fn rows_skip_empty_cells_and_lines() {
        // Table starting on the third line of the worksheet.
        let mut wrange: calamine::Range<DataType> = calamine::Range::new((2, 0), (6, 2));
        wrange.set_value((2, 0), cell("questionnaire_id"));
        wrange.set_value((2, 1), cell("1_1_1"));
        wrange.set_value((2, 2), cell("1_2_1"));
        wrange.set_value((3, 0), DataType::Float(1001.0));
        wrange.set_value((3, 1), DataType::Float(1.0));
        // (3, 2) left empty, line 5 left empty.
        wrange.set_value((5, 0), cell("1002"));
        wrange.set_value((5, 1), DataType::Int(0));
        wrange.set_value((5, 2), cell("Great"));
        wrange.set_value((6, 0), DataType::DateTime(44000.5));

        let err = rows_from_range(&wrange).unwrap_err();
        assert!(matches!(
            *err,
            CsvDataError::ExcelWrongCellType { lineno: 7, .. }
        ));

        wrange.set_value((6, 0), DataType::Empty);
        let rows = rows_from_range(&wrange).unwrap();
        assert_eq!(rows.len(), 2);

        let (lineno, row) = &rows[0];
        assert_eq!(*lineno, 4);
        assert_eq!(row.get("questionnaire_id").map(|s| s.as_str()), Some("1001"));
        assert_eq!(row.get("1_1_1").map(|s| s.as_str()), Some("1"));
        assert!(!row.contains_key("1_2_1"));

        let (lineno, row) = &rows[1];
        assert_eq!(*lineno, 6);
        assert_eq!(row.get("1_2_1").map(|s| s.as_str()), Some("Great"));
    }

    #[test]
    fn empty_range() {
        let wrange: calamine::Range<DataType> = calamine::Range::empty();
        assert!(matches!(
            *rows_from_range(&wrange).unwrap_err(),
            CsvDataError::EmptyExcel {}
        ));
    }
}
