mod config;
pub mod builder;
pub mod manual;
pub mod quick_start;

use log::{debug, info, warn};

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

pub use crate::config::*;

/// One row of data: column name -> value.
pub type Row = HashMap<String, String>;

/// Identifies the printed questionnaire a row belongs to. Always the first column.
pub const QUESTIONNAIRE_ID_COLUMN: &str = "questionnaire_id";
/// Identifies the sheet within the survey. Always the second column.
pub const GLOBAL_ID_COLUMN: &str = "global_id";

const QUALITY_SUFFIX: &str = "_quality";
const IMAGE_SUFFIX: &str = "_image";

/// The export and import behavior of one kind of node.
///
/// `export_data` covers exactly the columns declared by `export_header`.
/// `import_data` only reads the declared columns that are present in the row
/// and leaves the node untouched for the absent ones.
pub trait CsvCodec {
    fn export_header(&self, options: &ExportOptions) -> Vec<String>;

    fn export_data(
        &self,
        sheet: &Sheet,
        options: &ExportOptions,
    ) -> Result<Vec<(String, String)>, CodecError>;

    fn import_data(&self, row: &Row, sheet: &mut Sheet) -> Result<(), CodecError>;
}

/// How the value of a text box column is read back.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum TextboxValue {
    /// An integer: the state of the box, without text.
    State(BoxState),
    /// Anything else: recognized text, which implies a marked box.
    Text(String),
}

impl TextboxValue {
    pub fn classify(raw: &str) -> TextboxValue {
        match raw.trim().parse::<i32>() {
            Ok(state) => TextboxValue::State(BoxState(state)),
            Err(_) => TextboxValue::Text(raw.to_string()),
        }
    }
}

fn parse_integer<T: FromStr>(column: &str, value: &str) -> Result<T, CodecError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| CodecError::InvalidInteger {
            column: column.to_string(),
            value: value.to_string(),
        })
}

// ******** Codecs *********

impl CsvCodec for AnswerBox {
    fn export_header(&self, options: &ExportOptions) -> Vec<String> {
        let id = self.id.id_csv();
        match self.kind {
            BoxKind::Checkbox if options.export_quality() => {
                vec![id.clone(), format!("{}{}", id, QUALITY_SUFFIX)]
            }
            BoxKind::Checkbox => vec![id],
            BoxKind::Textbox => vec![id],
        }
    }

    fn export_data(
        &self,
        sheet: &Sheet,
        options: &ExportOptions,
    ) -> Result<Vec<(String, String)>, CodecError> {
        let id = self.id.id_csv();
        let data = sheet.box_data(&self.id);
        match self.kind {
            BoxKind::Checkbox => {
                let mut res = vec![(id.clone(), data.state.to_string())];
                if options.export_quality() {
                    res.push((format!("{}{}", id, QUALITY_SUFFIX), data.quality.to_string()));
                }
                Ok(res)
            }
            BoxKind::Textbox => {
                // Recognized text first, then an image of the field, then the bare state.
                let value = if data.state.is_marked() && !data.text.is_empty() {
                    data.text
                } else if data.state.is_marked() && options.export_images() {
                    options.image_writer()?.output_box(sheet, self)?
                } else {
                    data.state.to_string()
                };
                Ok(vec![(id, value)])
            }
        }
    }

    fn import_data(&self, row: &Row, sheet: &mut Sheet) -> Result<(), CodecError> {
        let id = self.id.id_csv();
        let value = match row.get(&id) {
            Some(v) => v,
            None => return Ok(()),
        };
        match self.kind {
            BoxKind::Checkbox => {
                let state = BoxState(parse_integer(&id, value)?);
                sheet.box_data_mut(&self.id).state = state;
            }
            BoxKind::Textbox => {
                let data = sheet.box_data_mut(&self.id);
                match TextboxValue::classify(value) {
                    TextboxValue::State(state) => {
                        data.state = state;
                        data.text.clear();
                    }
                    TextboxValue::Text(text) => {
                        data.state = BoxState::MARKED;
                        data.text = text;
                    }
                }
            }
        }
        Ok(())
    }
}

impl QObject {
    fn image_column(&self) -> String {
        format!("{}{}", self.id.id_csv(), IMAGE_SUFFIX)
    }
}

impl CsvCodec for QObject {
    fn export_header(&self, options: &ExportOptions) -> Vec<String> {
        match self.kind {
            QObjectKind::Head => vec![],
            QObjectKind::Choice | QObjectKind::Text => {
                let mut header: Vec<String> = Vec::new();
                if options.export_question_images() {
                    header.push(self.image_column());
                }
                for b in self.boxes.iter() {
                    header.extend(b.export_header(options));
                }
                header
            }
            QObjectKind::SingleOption | QObjectKind::AdditionalMark => vec![self.id.id_csv()],
        }
    }

    fn export_data(
        &self,
        sheet: &Sheet,
        options: &ExportOptions,
    ) -> Result<Vec<(String, String)>, CodecError> {
        match self.kind {
            QObjectKind::Head => Ok(vec![]),
            QObjectKind::Choice | QObjectKind::Text => {
                let mut data: Vec<(String, String)> = Vec::new();
                if options.export_question_images() {
                    let any_marked = self
                        .boxes
                        .iter()
                        .any(|b| sheet.box_data(&b.id).state.is_marked());
                    // The image writer is only called when there is something to look at.
                    let img = if any_marked {
                        options
                            .image_writer()?
                            .output_boxes(sheet, &self.id, &self.boxes)?
                    } else {
                        "".to_string()
                    };
                    data.push((self.image_column(), img));
                }
                for b in self.boxes.iter() {
                    data.extend(b.export_data(sheet, options)?);
                }
                Ok(data)
            }
            QObjectKind::SingleOption | QObjectKind::AdditionalMark => {
                Ok(vec![(self.id.id_csv(), sheet.answer(&self.id).to_string())])
            }
        }
    }

    fn import_data(&self, row: &Row, sheet: &mut Sheet) -> Result<(), CodecError> {
        match self.kind {
            QObjectKind::Head => Ok(()),
            QObjectKind::Choice | QObjectKind::Text => {
                for b in self.boxes.iter() {
                    b.import_data(row, sheet)?;
                }
                Ok(())
            }
            QObjectKind::SingleOption | QObjectKind::AdditionalMark => {
                let id = self.id.id_csv();
                if let Some(value) = row.get(&id) {
                    let answer: i64 = parse_integer(&id, value)?;
                    sheet.set_answer(&self.id, answer);
                }
                Ok(())
            }
        }
    }
}

// ******** Schema builder and row exporter *********

pub(crate) fn schema_columns(questionnaire: &Questionnaire, options: &ExportOptions) -> Vec<String> {
    let mut header = vec![
        QUESTIONNAIRE_ID_COLUMN.to_string(),
        GLOBAL_ID_COLUMN.to_string(),
    ];
    for qobject in questionnaire.qobjects() {
        header.extend(qobject.export_header(options));
    }
    header
}

/// The ordered list of columns for one export session.
///
/// The result only depends on the shape of the questionnaire and on the
/// options.
pub fn export_header(
    questionnaire: &Questionnaire,
    options: &ExportOptions,
) -> Result<Vec<String>, CodecError> {
    let header = schema_columns(questionnaire, options);
    let mut seen: HashSet<&str> = HashSet::new();
    for column in header.iter() {
        if !seen.insert(column.as_str()) {
            return Err(CodecError::DuplicateColumn(column.clone()));
        }
    }
    debug!("export_header: {} columns, options: {:?}", header.len(), options);
    Ok(header)
}

/// The values of one sheet, keyed by column name.
pub fn export_row(
    questionnaire: &Questionnaire,
    sheet: &Sheet,
    options: &ExportOptions,
) -> Result<Row, CodecError> {
    let mut row: Row = HashMap::new();
    row.insert(
        QUESTIONNAIRE_ID_COLUMN.to_string(),
        sheet.questionnaire_id.clone(),
    );
    row.insert(GLOBAL_ID_COLUMN.to_string(), sheet.global_id.clone());
    for qobject in questionnaire.qobjects() {
        for (column, value) in qobject.export_data(sheet, options)? {
            let previous = row.insert(column, value);
            debug_assert!(previous.is_none(), "column exported twice");
        }
    }
    Ok(row)
}

/// Lays out the values of a row in the order of the header. Columns missing
/// from the row are written empty.
pub fn order_row(header: &[String], row: &Row) -> Vec<String> {
    header
        .iter()
        .map(|column| row.get(column).cloned().unwrap_or_default())
        .collect()
}

/// Receives the header and then the rows of an export session.
pub trait RowSink {
    fn write_row(&mut self, values: &[String]) -> Result<(), CodecError>;
}

impl RowSink for Vec<Vec<String>> {
    fn write_row(&mut self, values: &[String]) -> Result<(), CodecError> {
        self.push(values.to_vec());
        Ok(())
    }
}

/// Streams sheets into a sink, one row per sheet, under a header computed
/// once when the session opens.
pub struct ExportSession<'a, S: RowSink> {
    questionnaire: &'a Questionnaire,
    options: ExportOptions<'a>,
    header: Vec<String>,
    sink: S,
    num_rows: usize,
}

impl<'a, S: RowSink> ExportSession<'a, S> {
    pub fn open(
        questionnaire: &'a Questionnaire,
        options: ExportOptions<'a>,
        mut sink: S,
    ) -> Result<ExportSession<'a, S>, CodecError> {
        let header = export_header(questionnaire, &options)?;
        sink.write_row(&header)?;
        info!("Opened export session with {} columns", header.len());
        Ok(ExportSession {
            questionnaire,
            options,
            header,
            sink,
            num_rows: 0,
        })
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn export_sheet(&mut self, sheet: &Sheet) -> Result<(), CodecError> {
        let row = export_row(self.questionnaire, sheet, &self.options)?;
        debug!("export_sheet: global_id: {:?} row: {:?}", sheet.global_id, row);
        self.sink.write_row(&order_row(&self.header, &row))?;
        self.num_rows += 1;
        Ok(())
    }

    /// Ends the session and hands back the sink.
    pub fn finish(self) -> S {
        info!("Exported {} sheets", self.num_rows);
        self.sink
    }
}

// ******** Row importer and survey export *********

impl Survey {
    /// Exports every sheet, in the order they were added.
    pub fn export<S: RowSink>(&self, options: ExportOptions, sink: S) -> Result<S, CodecError> {
        let mut session = ExportSession::open(&self.questionnaire, options, sink)?;
        for sheet in self.sheets.iter() {
            session.export_sheet(sheet)?;
        }
        Ok(session.finish())
    }

    /// Reads one row back into the sheet it designates.
    ///
    /// Rows of unknown sheets are skipped without error. A row is applied
    /// completely or not at all: when one of its columns cannot be decoded,
    /// the sheet is left as it was and the error is returned.
    pub fn import_row(
        &mut self,
        row: &Row,
        options: &ImportOptions,
    ) -> Result<ImportOutcome, CodecError> {
        let questionnaire_id = row.get(QUESTIONNAIRE_ID_COLUMN).map(|s| s.as_str());
        let idx = match questionnaire_id.and_then(|qid| self.index.get(qid)) {
            Some(idx) => *idx,
            None => {
                match options.unknown_sheet {
                    UnknownSheetPolicy::Warn => warn!(
                        "import_row: no sheet for questionnaire id {:?}, skipping row",
                        questionnaire_id
                    ),
                    UnknownSheetPolicy::Ignore => debug!(
                        "import_row: no sheet for questionnaire id {:?}, skipping row",
                        questionnaire_id
                    ),
                }
                return Ok(ImportOutcome::Skipped);
            }
        };

        let mut updated = self.sheets[idx].clone();
        for qobject in self.questionnaire.qobjects() {
            qobject.import_data(row, &mut updated)?;
        }
        debug!(
            "import_row: applied row to sheet {:?}",
            updated.questionnaire_id
        );
        self.sheets[idx] = updated;
        Ok(ImportOutcome::Applied)
    }
}
