// ********* Questionnaire model ***********

use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::Display;

/// The hierarchical identity of a question or of an answer box.
///
/// Questions are usually identified by `(section, question)` and boxes by
/// `(section, question, box)`. The identity never depends on the position of
/// the node in a traversal, so the derived column names stay stable.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Ord, PartialOrd)]
pub struct QObjectId(Vec<u32>);

impl QObjectId {
    pub fn new(parts: &[u32]) -> QObjectId {
        QObjectId(parts.to_vec())
    }

    /// The identity of a node owned by this one, given its node-local id.
    pub fn child(&self, local_id: u32) -> QObjectId {
        let mut parts = self.0.clone();
        parts.push(local_id);
        QObjectId(parts)
    }

    pub fn parts(&self) -> &[u32] {
        &self.0
    }

    /// The column-safe identifier of this node: the parts joined with `_`.
    pub fn id_csv(&self) -> String {
        self.0
            .iter()
            .map(|x| x.to_string())
            .collect::<Vec<String>>()
            .join("_")
    }

    /// Inverse of `id_csv`.
    pub fn parse_csv(s: &str) -> Option<QObjectId> {
        let parts: Option<Vec<u32>> = s.split('_').map(|p| p.parse::<u32>().ok()).collect();
        match parts {
            Some(p) if !p.is_empty() => Some(QObjectId(p)),
            _ => None,
        }
    }
}

impl Display for QObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id_csv())
    }
}

/// The recognized class of a box.
///
/// Any integer is accepted, the recognition process may use more classes
/// than marked and unmarked.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Default)]
pub struct BoxState(pub i32);

impl BoxState {
    pub const UNMARKED: BoxState = BoxState(0);
    pub const MARKED: BoxState = BoxState(1);

    pub fn is_marked(&self) -> bool {
        self.0 != 0
    }
}

impl Display for BoxState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The recognition output for one box on one sheet.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct BoxData {
    pub state: BoxState,
    /// Confidence of the recognition. Exported as is, never imported.
    pub quality: f64,
    /// Recognized text. Only meaningful for text boxes.
    pub text: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum BoxKind {
    /// A single mark location.
    Checkbox,
    /// A free-text field. Its column carries either the recognized text,
    /// an image of the field, or the state.
    Textbox,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AnswerBox {
    pub id: QObjectId,
    pub kind: BoxKind,
    pub label: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum QObjectKind {
    /// A section heading. It carries no data.
    Head,
    /// A group of checkboxes. Each box gets its own column.
    Choice,
    /// A group of text boxes.
    Text,
    /// The answer to a multi-valued selection, stored as an integer index.
    SingleOption,
    /// A flagged mark that lives outside of the box tree, holding one integer.
    AdditionalMark,
}

/// A question object, as printed on the questionnaire.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct QObject {
    pub id: QObjectId,
    pub kind: QObjectKind,
    pub title: String,
    pub boxes: Vec<AnswerBox>,
}

/// The printed questionnaire. The order of the question objects is fixed for
/// the lifetime of the questionnaire and defines the column order.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Questionnaire {
    qobjects: Vec<QObject>,
}

impl Questionnaire {
    /// Builds a questionnaire, checking that box ids derive from their
    /// question and that column names cannot collide under any export options.
    pub fn new(qobjects: Vec<QObject>) -> Result<Questionnaire, CodecError> {
        for qobject in qobjects.iter() {
            for b in qobject.boxes.iter() {
                let parts = b.id.parts();
                let is_child = parts.len() == qobject.id.parts().len() + 1
                    && parts.starts_with(qobject.id.parts());
                if !is_child {
                    return Err(CodecError::InvalidBoxId {
                        question: qobject.id.id_csv(),
                        answer_box: b.id.id_csv(),
                    });
                }
            }
        }
        let res = Questionnaire { qobjects };
        let mut seen: HashSet<String> = HashSet::new();
        for column in res.all_columns() {
            if !seen.insert(column.clone()) {
                return Err(CodecError::DuplicateColumn(column));
            }
        }
        Ok(res)
    }

    pub fn qobjects(&self) -> &[QObject] {
        &self.qobjects
    }

    pub fn find_qobject(&self, id: &QObjectId) -> Option<&QObject> {
        self.qobjects.iter().find(|q| q.id == *id)
    }

    pub fn find_box(&self, id: &QObjectId) -> Option<&AnswerBox> {
        self.qobjects
            .iter()
            .flat_map(|q| q.boxes.iter())
            .find(|b| b.id == *id)
    }

    // Every column any export session could produce.
    fn all_columns(&self) -> Vec<String> {
        let options = ExportOptions {
            export_images: true,
            export_question_images: true,
            export_quality: true,
            image_writer: None,
        };
        crate::schema_columns(self, &options)
    }
}

// ********* Sheets and the survey ***********

/// One physical scanned form.
#[derive(PartialEq, Debug, Clone)]
pub struct Sheet {
    /// Identifies the printed copy of the questionnaire.
    pub questionnaire_id: String,
    /// Identifies the sheet within the survey.
    pub global_id: String,
    boxes: HashMap<QObjectId, BoxData>,
    answers: HashMap<QObjectId, i64>,
}

impl Sheet {
    pub fn new(questionnaire_id: &str, global_id: &str) -> Sheet {
        Sheet {
            questionnaire_id: questionnaire_id.to_string(),
            global_id: global_id.to_string(),
            boxes: HashMap::new(),
            answers: HashMap::new(),
        }
    }

    /// The data of a box. Boxes never touched by the recognition read as unmarked.
    pub fn box_data(&self, id: &QObjectId) -> BoxData {
        self.boxes.get(id).cloned().unwrap_or_default()
    }

    pub fn box_data_mut(&mut self, id: &QObjectId) -> &mut BoxData {
        self.boxes.entry(id.clone()).or_default()
    }

    pub fn answer(&self, id: &QObjectId) -> i64 {
        self.answers.get(id).cloned().unwrap_or(0)
    }

    pub fn set_answer(&mut self, id: &QObjectId, answer: i64) {
        self.answers.insert(id.clone(), answer);
    }

    pub fn boxes(&self) -> impl Iterator<Item = (&QObjectId, &BoxData)> {
        self.boxes.iter()
    }

    pub fn answers(&self) -> impl Iterator<Item = (&QObjectId, i64)> {
        self.answers.iter().map(|(id, a)| (id, *a))
    }
}

/// A questionnaire with all the sheets scanned for it.
#[derive(PartialEq, Debug, Clone)]
pub struct Survey {
    pub(crate) questionnaire: Questionnaire,
    pub(crate) sheets: Vec<Sheet>,
    // questionnaire_id -> position in sheets
    pub(crate) index: HashMap<String, usize>,
    global_ids: HashSet<String>,
}

impl Survey {
    pub fn new(questionnaire: Questionnaire) -> Survey {
        Survey {
            questionnaire,
            sheets: Vec::new(),
            index: HashMap::new(),
            global_ids: HashSet::new(),
        }
    }

    pub fn questionnaire(&self) -> &Questionnaire {
        &self.questionnaire
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// Adds a sheet. Both identities must be unique within the survey, and
    /// the global id must not be empty.
    pub fn add_sheet(&mut self, sheet: Sheet) -> Result<(), CodecError> {
        if self.index.contains_key(&sheet.questionnaire_id) {
            return Err(CodecError::DuplicateQuestionnaireId(
                sheet.questionnaire_id,
            ));
        }
        if sheet.global_id.is_empty() {
            return Err(CodecError::MissingGlobalId(sheet.questionnaire_id));
        }
        if !self.global_ids.insert(sheet.global_id.clone()) {
            return Err(CodecError::DuplicateGlobalId(sheet.global_id));
        }
        self.index
            .insert(sheet.questionnaire_id.clone(), self.sheets.len());
        self.sheets.push(sheet);
        Ok(())
    }

    pub fn goto_questionnaire_id(&mut self, questionnaire_id: &str) -> Option<&mut Sheet> {
        let idx = *self.index.get(questionnaire_id)?;
        self.sheets.get_mut(idx)
    }
}

// ********* Session options **********

/// Renders an embeddable representation of boxes, for instance the file name
/// of a cropped image. Calls are expected to be idempotent for a given box.
pub trait ImageWriter {
    fn output_box(&self, sheet: &Sheet, answer_box: &AnswerBox) -> Result<String, CodecError>;

    fn output_boxes(
        &self,
        sheet: &Sheet,
        question_id: &QObjectId,
        boxes: &[AnswerBox],
    ) -> Result<String, CodecError>;
}

/// The options of one export session.
///
/// They are decided before the session starts and passed down to every codec,
/// they are never stored on the model.
#[derive(Clone, Copy)]
pub struct ExportOptions<'a> {
    pub(crate) export_images: bool,
    pub(crate) export_question_images: bool,
    pub(crate) export_quality: bool,
    pub(crate) image_writer: Option<&'a dyn ImageWriter>,
}

impl ExportOptions<'static> {
    pub const DEFAULT: ExportOptions<'static> = ExportOptions {
        export_images: false,
        export_question_images: false,
        export_quality: false,
        image_writer: None,
    };
}

impl<'a> ExportOptions<'a> {
    pub fn with_quality(self, export_quality: bool) -> ExportOptions<'a> {
        ExportOptions {
            export_quality,
            ..self
        }
    }

    /// Enables image columns. The image flags can only be raised together
    /// with a writer, so a session without writer never has image columns.
    pub fn with_image_writer<'b>(
        self,
        image_writer: &'b dyn ImageWriter,
        export_images: bool,
        export_question_images: bool,
    ) -> ExportOptions<'b>
    where
        'a: 'b,
    {
        ExportOptions {
            export_images,
            export_question_images,
            export_quality: self.export_quality,
            image_writer: Some(image_writer),
        }
    }

    /// Images of marked text boxes replace their state.
    pub fn export_images(&self) -> bool {
        self.export_images
    }

    /// Each box-backed question gets an additional `<id>_image` column.
    pub fn export_question_images(&self) -> bool {
        self.export_question_images
    }

    /// Each checkbox gets an additional `<id>_quality` column.
    pub fn export_quality(&self) -> bool {
        self.export_quality
    }

    pub(crate) fn image_writer(&self) -> Result<&'a dyn ImageWriter, CodecError> {
        self.image_writer
            .ok_or_else(|| CodecError::Media("no image writer in this session".to_string()))
    }
}

impl std::fmt::Debug for ExportOptions<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportOptions")
            .field("export_images", &self.export_images)
            .field("export_question_images", &self.export_question_images)
            .field("export_quality", &self.export_quality)
            .field("image_writer", &self.image_writer.is_some())
            .finish()
    }
}

/// What to do with a row whose `questionnaire_id` matches no sheet.
///
/// Such rows are never an error: an import file may mix several
/// questionnaires. The policy only controls how loudly they are dropped.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum UnknownSheetPolicy {
    Ignore,
    Warn,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct ImportOptions {
    pub unknown_sheet: UnknownSheetPolicy,
}

impl ImportOptions {
    pub const DEFAULT: ImportOptions = ImportOptions {
        unknown_sheet: UnknownSheetPolicy::Ignore,
    };
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ImportOutcome {
    /// The row was decoded into its sheet.
    Applied,
    /// No sheet matches the row, nothing changed.
    Skipped,
}

// ********* Errors **********

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum CodecError {
    /// A column that only accepts integers held something else.
    InvalidInteger { column: String, value: String },
    /// Two nodes produce the same column name.
    DuplicateColumn(String),
    /// Two sheets claim the same questionnaire id.
    DuplicateQuestionnaireId(String),
    /// Two sheets claim the same global id.
    DuplicateGlobalId(String),
    /// The sheet with this questionnaire id has no global id.
    MissingGlobalId(String),
    /// A box id that is not derived from the id of its question.
    InvalidBoxId { question: String, answer_box: String },
    /// The image writer failed.
    Media(String),
    /// The row sink failed.
    Sink(String),
}

impl Error for CodecError {}

impl Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecError::InvalidInteger { column, value } => {
                write!(f, "column {}: expected an integer, found {:?}", column, value)
            }
            CodecError::DuplicateColumn(c) => write!(f, "duplicate column {}", c),
            CodecError::DuplicateQuestionnaireId(id) => {
                write!(f, "questionnaire id {} is used by more than one sheet", id)
            }
            CodecError::DuplicateGlobalId(id) => {
                write!(f, "global id {} is used by more than one sheet", id)
            }
            CodecError::MissingGlobalId(qid) => {
                write!(f, "sheet {} has no global id", qid)
            }
            CodecError::InvalidBoxId {
                question,
                answer_box,
            } => write!(
                f,
                "box {} does not belong to question {}",
                answer_box, question
            ),
            CodecError::Media(msg) => write!(f, "image writer: {}", msg),
            CodecError::Sink(msg) => write!(f, "row sink: {}", msg),
        }
    }
}
