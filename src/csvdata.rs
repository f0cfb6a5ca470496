use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use survey_csv::*;

use std::fs;
use std::io::Write;

use text_diff::print_diff;

use crate::args::{ExportArgs, ImportArgs};
use crate::csvdata::config_reader::*;
use crate::csvdata::io_common::InputType;
use crate::csvdata::io_images::ImageRequestWriter;

pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_images;
pub mod io_xlsx;

#[derive(Debug, Snafu)]
pub enum CsvDataError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening reference file {path}"))]
    OpeningReference {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON content"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing file {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading CSV line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: u64 },
    #[snafu(display("Error writing CSV rows"))]
    CsvWrite { source: std::io::Error },
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Empty spreadsheet"))]
    EmptyExcel {},
    #[snafu(display("Unsupported cell on line {lineno}: {content}"))]
    ExcelWrongCellType { lineno: u64, content: String },
    #[snafu(display("Error exporting sheet {global_id}"))]
    Export {
        source: CodecError,
        global_id: String,
    },
    #[snafu(display("Error importing line {lineno}"))]
    Import { source: CodecError, lineno: u64 },
    #[snafu(display("Error in project: {source}"))]
    Project { source: CodecError },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type CsvDataResult<T> = Result<T, CsvDataError>;

pub type BCsvDataResult<T> = Result<T, Box<CsvDataError>>;

/// The destination of an export or of an updated project.
fn write_output(out: &Option<String>, content: &[u8]) -> BCsvDataResult<()> {
    match out.as_deref() {
        None | Some("stdout") | Some("") => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(content).context(WritingFileSnafu {
                path: "stdout".to_string(),
            })?;
        }
        Some(path) => {
            info!("Writing {} bytes to {:?}", content.len(), path);
            fs::write(path, content).context(WritingFileSnafu {
                path: path.to_string(),
            })?;
        }
    }
    Ok(())
}

fn delimiter_byte(delimiter: Option<char>) -> CsvDataResult<u8> {
    match delimiter {
        None => Ok(b','),
        Some(c) if c.is_ascii() => Ok(c as u8),
        Some(c) => whatever!("The delimiter must be an ASCII character, got {:?}", c),
    }
}

/// Exports the sheets of a survey, already loaded, into CSV bytes.
pub fn export_survey(
    survey: &Survey,
    options: ExportOptions,
    delimiter: u8,
) -> BCsvDataResult<Vec<u8>> {
    let mut buffer: Vec<u8> = Vec::new();
    let num_rows = io_csv::export_csv(survey, options, delimiter, &mut buffer)?;
    debug!("export_survey: {} rows, {} bytes", num_rows, buffer.len());
    Ok(buffer)
}

fn check_reference(reference_path: &str, exported: &str) -> CsvDataResult<()> {
    let reference = fs::read_to_string(reference_path).context(OpeningReferenceSnafu {
        path: reference_path.to_string(),
    })?;
    // Line endings depend on the program that saved the reference.
    let reference = reference.replace("\r\n", "\n");
    let exported = exported.replace("\r\n", "\n");
    if reference != exported {
        warn!("Found differences with the reference file");
        print_diff(reference.as_str(), exported.as_str(), "\n");
        whatever!("Difference detected between the exported rows and the reference file")
    }
    info!("The exported rows match the reference {:?}", reference_path);
    Ok(())
}

pub fn run_export(args: &ExportArgs) -> BCsvDataResult<()> {
    let project = read_project(&args.project)?;
    let survey = build_survey(&project)?;
    info!(
        "Exporting {} sheets of project {:?}",
        survey.sheets().len(),
        args.project
    );

    let image_writer = ImageRequestWriter::new(args.image_prefix.as_deref().unwrap_or("img/"));
    let options = ExportOptions::DEFAULT.with_quality(args.quality);
    let options = if args.images || args.question_images {
        options.with_image_writer(&image_writer, args.images, args.question_images)
    } else {
        options
    };
    let delimiter = delimiter_byte(args.delimiter)?;

    let exported = export_survey(&survey, options, delimiter)?;

    if let Some(reference_path) = &args.reference {
        let exported_str = String::from_utf8_lossy(&exported);
        check_reference(reference_path, &exported_str)?;
    }

    write_output(&args.out, &exported)?;

    if let Some(manifest_path) = &args.image_manifest {
        image_writer.write_manifest(manifest_path)?;
    }
    Ok(())
}

/// Imports rows into a survey, already loaded. Returns the number of rows
/// applied and skipped.
pub fn import_rows(
    survey: &mut Survey,
    rows: &[(u64, Row)],
    options: &ImportOptions,
) -> BCsvDataResult<(usize, usize)> {
    let mut applied = 0;
    let mut skipped = 0;
    for (lineno, row) in rows.iter() {
        match survey
            .import_row(row, options)
            .context(ImportSnafu { lineno: *lineno })?
        {
            ImportOutcome::Applied => applied += 1,
            ImportOutcome::Skipped => skipped += 1,
        }
    }
    Ok((applied, skipped))
}

pub fn run_import(args: &ImportArgs) -> BCsvDataResult<()> {
    let mut project = read_project(&args.project)?;
    let mut survey = build_survey(&project)?;

    let input_type = match &args.input_type {
        Some(s) => InputType::parse(s)?,
        None => InputType::from_path(&args.input)?,
    };
    info!("Attempting to read {:?} file {:?}", input_type, args.input);
    let rows = match input_type {
        InputType::Csv => io_csv::read_csv_rows(&args.input, delimiter_byte(args.delimiter)?)?,
        InputType::Xlsx => {
            io_xlsx::read_xlsx_rows(&args.input, args.excel_worksheet_name.as_deref())?
        }
    };

    let options = ImportOptions {
        unknown_sheet: if args.warn_unknown_sheets {
            UnknownSheetPolicy::Warn
        } else {
            UnknownSheetPolicy::Ignore
        },
    };
    let (applied, skipped) = import_rows(&mut survey, &rows, &options)?;
    info!(
        "Imported {} rows from {:?}, skipped {} rows",
        applied, args.input, skipped
    );

    project.sheets = sheets_to_config(&survey);
    let js = serde_json::to_string_pretty(&project).context(ParsingJsonSnafu {})?;
    write_output(&args.out, js.as_bytes())?;
    Ok(())
}
