pub use crate::config::*;

/// A builder for questionnaires, numbering the question objects the way the
/// printed questionnaire does.
///
/// A head opens a new section. Questions are numbered `(section, n)` inside
/// their section and their boxes `(section, n, k)`.
///
/// ```
/// pub use survey_csv::builder::QuestionnaireBuilder;
/// pub use survey_csv::{export_header, ExportOptions};
/// # use survey_csv::CodecError;
///
/// let questionnaire = QuestionnaireBuilder::new()
///     .head("Lecture")
///     .choice("Which topics did you like?", &["Parsing", "Typing"])
///     .text("Comments", 1)
///     .build()?;
///
/// let header = export_header(&questionnaire, &ExportOptions::DEFAULT)?;
/// assert_eq!(header, vec!["questionnaire_id", "global_id", "1_1_1", "1_1_2", "1_2_1"]);
///
/// # Ok::<(), CodecError>(())
/// ```
pub struct QuestionnaireBuilder {
    _section: u32,
    _question: u32,
    _qobjects: Vec<QObject>,
}

impl Default for QuestionnaireBuilder {
    fn default() -> Self {
        QuestionnaireBuilder::new()
    }
}

impl QuestionnaireBuilder {
    pub fn new() -> QuestionnaireBuilder {
        QuestionnaireBuilder {
            _section: 0,
            _question: 0,
            _qobjects: Vec::new(),
        }
    }

    pub fn head(mut self, title: &str) -> QuestionnaireBuilder {
        self._section += 1;
        self._question = 0;
        let id = QObjectId::new(&[self._section]);
        self.push(id, QObjectKind::Head, title, &[], BoxKind::Checkbox)
    }

    /// A group of checkboxes, one per label.
    pub fn choice(self, title: &str, labels: &[&str]) -> QuestionnaireBuilder {
        let id = self.next_question_id();
        self.push(id, QObjectKind::Choice, title, labels, BoxKind::Checkbox)
    }

    /// A group of `num_boxes` free-text fields.
    pub fn text(self, title: &str, num_boxes: usize) -> QuestionnaireBuilder {
        let id = self.next_question_id();
        let labels: Vec<&str> = vec![""; num_boxes];
        self.push(id, QObjectKind::Text, title, &labels, BoxKind::Textbox)
    }

    pub fn option(self, title: &str) -> QuestionnaireBuilder {
        let id = self.next_question_id();
        self.push(id, QObjectKind::SingleOption, title, &[], BoxKind::Checkbox)
    }

    pub fn additional_mark(self, title: &str) -> QuestionnaireBuilder {
        let id = self.next_question_id();
        self.push(id, QObjectKind::AdditionalMark, title, &[], BoxKind::Checkbox)
    }

    pub fn build(self) -> Result<Questionnaire, CodecError> {
        Questionnaire::new(self._qobjects)
    }

    fn next_question_id(&self) -> QObjectId {
        QObjectId::new(&[self._section, self._question + 1])
    }

    fn push(
        mut self,
        id: QObjectId,
        kind: QObjectKind,
        title: &str,
        labels: &[&str],
        box_kind: BoxKind,
    ) -> QuestionnaireBuilder {
        if kind != QObjectKind::Head {
            self._question += 1;
        }
        let boxes: Vec<AnswerBox> = labels
            .iter()
            .enumerate()
            .map(|(idx, label)| AnswerBox {
                id: id.child((idx + 1) as u32),
                kind: box_kind,
                label: label.to_string(),
            })
            .collect();
        self._qobjects.push(QObject {
            id,
            kind,
            title: title.to_string(),
            boxes,
        });
        self
    }
}
