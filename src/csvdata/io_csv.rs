// Primitives for reading and writing CSV files.

use std::io::{Read, Write};

use crate::csvdata::*;

/// Writes the rows of an export session as CSV records.
pub struct CsvSink<W: Write>(pub csv::Writer<W>);

impl<W: Write> RowSink for CsvSink<W> {
    fn write_row(&mut self, values: &[String]) -> Result<(), CodecError> {
        self.0
            .write_record(values)
            .map_err(|e| CodecError::Sink(e.to_string()))
    }
}

/// Exports every sheet of the survey to the given output. Returns the number
/// of sheets written.
pub fn export_csv<W: Write>(
    survey: &Survey,
    options: ExportOptions,
    delimiter: u8,
    out: &mut W,
) -> BCsvDataResult<usize> {
    let writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(out);
    let mut session = ExportSession::open(survey.questionnaire(), options, CsvSink(writer))
        .context(ProjectSnafu {})?;
    debug!("export_csv: header: {:?}", session.header());
    for sheet in survey.sheets().iter() {
        session.export_sheet(sheet).context(ExportSnafu {
            global_id: sheet.global_id.clone(),
        })?;
    }
    let CsvSink(mut writer) = session.finish();
    writer.flush().context(CsvWriteSnafu {})?;
    Ok(survey.sheets().len())
}

pub fn read_csv_rows(path: &str, delimiter: u8) -> BCsvDataResult<Vec<(u64, Row)>> {
    let rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    read_records(rdr)
}

/// Reads rows from any source. The first line holds the column names.
pub fn rows_from_reader<R: Read>(input: R, delimiter: u8) -> BCsvDataResult<Vec<(u64, Row)>> {
    let rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(input);
    read_records(rdr)
}

fn read_records<R: Read>(mut rdr: csv::Reader<R>) -> BCsvDataResult<Vec<(u64, Row)>> {
    let header: Vec<String> = rdr
        .headers()
        .context(CsvLineParseSnafu { lineno: 1_u64 })?
        .iter()
        .map(|s| s.to_string())
        .collect();
    debug!("read_records: header: {:?}", header);

    let mut res: Vec<(u64, Row)> = Vec::new();
    for (idx, record_r) in rdr.records().enumerate() {
        // Without a position, assume one line per record after the header.
        let fallback = idx as u64 + 2;
        let record = record_r.context(CsvLineParseSnafu { lineno: fallback })?;
        let lineno = record.position().map(|p| p.line()).unwrap_or(fallback);
        if record.len() != header.len() {
            debug!(
                "read_records: line {} has {} fields, the header has {}",
                lineno,
                record.len(),
                header.len()
            );
        }
        // Missing trailing fields are absent columns.
        let row: Row = header
            .iter()
            .cloned()
            .zip(record.iter().map(|s| s.to_string()))
            .collect();
        res.push((lineno, row));
    }
    Ok(res)
}
