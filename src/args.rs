use clap::{Parser, Subcommand};

/// Exports recognized survey sheets to CSV rows, and imports corrected rows back.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Writes one row per sheet of the project.
    Export(ExportArgs),
    /// Reads rows back into the sheets of the project.
    Import(ImportArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct ExportArgs {
    /// (file path) The project file in JSON format, containing the questionnaire and the recognized sheets.
    #[clap(short, long, value_parser)]
    pub project: String,

    /// (file path, 'stdout' or empty) Where to write the CSV rows. Defaults to the standard output.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// Adds a quality column after every checkbox.
    #[clap(long, takes_value = false)]
    pub quality: bool,

    /// Writes the image name of marked text boxes that have no recognized text.
    #[clap(long, takes_value = false)]
    pub images: bool,

    /// Adds an image column to every choice and text question.
    #[clap(long, takes_value = false)]
    pub question_images: bool,

    /// (default 'img/') Prefix of the image names written in the image columns.
    #[clap(long, value_parser)]
    pub image_prefix: Option<String>,

    /// (file path) If specified, the list of requested images is written in JSON format to the given
    /// location, for the program that crops them out of the scans.
    #[clap(long, value_parser)]
    pub image_manifest: Option<String>,

    /// (default ',') The column delimiter.
    #[clap(long, value_parser)]
    pub delimiter: Option<char>,

    /// (file path) A reference CSV file. If provided, sdapscsv will check that the exported rows
    /// match the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ImportArgs {
    /// (file path) The project file in JSON format, containing the questionnaire and the recognized sheets.
    #[clap(short, long, value_parser)]
    pub project: String,

    /// (file path) The file containing the rows to import.
    #[clap(short, long, value_parser)]
    pub input: String,

    /// (csv or xlsx) The type of the input. By default, it is guessed from the file extension.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (default ',') The column delimiter of CSV inputs.
    #[clap(long, value_parser)]
    pub delimiter: Option<char>,

    /// (file path, 'stdout' or empty) Where to write the updated project. Defaults to the standard output.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// Reports the rows that match no sheet of the project instead of silently skipping them.
    #[clap(long, takes_value = false)]
    pub warn_unknown_sheets: bool,
}
