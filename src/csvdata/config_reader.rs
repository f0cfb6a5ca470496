use crate::csvdata::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct BoxConfig {
    pub id: u32,
    /// checkbox or textbox. By default, the kind follows the question.
    pub kind: Option<String>,
    pub label: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct QObjectConfig {
    pub kind: String,
    pub id: Vec<u32>,
    pub title: Option<String>,
    #[serde(default)]
    pub boxes: Vec<BoxConfig>,
}

impl QObjectConfig {
    pub fn qobject_kind(&self) -> CsvDataResult<QObjectKind> {
        match self.kind.as_str() {
            "head" => Ok(QObjectKind::Head),
            "choice" => Ok(QObjectKind::Choice),
            "text" => Ok(QObjectKind::Text),
            "option" => Ok(QObjectKind::SingleOption),
            "additional_mark" => Ok(QObjectKind::AdditionalMark),
            x => whatever!("unknown question kind {:?} for question {:?}", x, self.id),
        }
    }

    fn box_kind(&self, b: &BoxConfig, qkind: QObjectKind) -> CsvDataResult<BoxKind> {
        match (b.kind.as_deref(), qkind) {
            (Some("checkbox"), _) => Ok(BoxKind::Checkbox),
            (Some("textbox"), _) => Ok(BoxKind::Textbox),
            (None, QObjectKind::Text) => Ok(BoxKind::Textbox),
            (None, _) => Ok(BoxKind::Checkbox),
            (Some(x), _) => whatever!(
                "unknown box kind {:?} for box {} of question {:?}",
                x,
                b.id,
                self.id
            ),
        }
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct BoxDataConfig {
    pub state: i32,
    #[serde(default)]
    pub quality: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SheetConfig {
    #[serde(rename = "questionnaireId")]
    pub questionnaire_id: String,
    #[serde(rename = "globalId")]
    pub global_id: String,
    // Keyed by the csv id of the box.
    #[serde(default)]
    pub boxes: BTreeMap<String, BoxDataConfig>,
    // Keyed by the csv id of the question.
    #[serde(default)]
    pub answers: BTreeMap<String, i64>,
}

impl SheetConfig {
    pub fn new(questionnaire_id: &str, global_id: &str) -> SheetConfig {
        SheetConfig {
            questionnaire_id: questionnaire_id.to_string(),
            global_id: global_id.to_string(),
            boxes: BTreeMap::new(),
            answers: BTreeMap::new(),
        }
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub title: Option<String>,
    pub questionnaire: Vec<QObjectConfig>,
    #[serde(default)]
    pub sheets: Vec<SheetConfig>,
}

pub fn read_project(path: &str) -> BCsvDataResult<ProjectConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let project: ProjectConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!(
        "read_project: {:?}: {} question objects, {} sheets",
        path,
        project.questionnaire.len(),
        project.sheets.len()
    );
    Ok(project)
}

fn build_questionnaire(configs: &[QObjectConfig]) -> CsvDataResult<Questionnaire> {
    let mut qobjects: Vec<QObject> = Vec::new();
    for qc in configs.iter() {
        let kind = qc.qobject_kind()?;
        if qc.id.is_empty() {
            whatever!("empty id for question {:?}", qc.title)
        }
        let id = QObjectId::new(&qc.id);
        let mut boxes: Vec<AnswerBox> = Vec::new();
        for bc in qc.boxes.iter() {
            boxes.push(AnswerBox {
                id: id.child(bc.id),
                kind: qc.box_kind(bc, kind)?,
                label: bc.label.clone().unwrap_or_default(),
            });
        }
        qobjects.push(QObject {
            id,
            kind,
            title: qc.title.clone().unwrap_or_default(),
            boxes,
        });
    }
    Questionnaire::new(qobjects).context(ProjectSnafu {})
}

fn build_sheet(questionnaire: &Questionnaire, sc: &SheetConfig) -> CsvDataResult<Sheet> {
    let mut sheet = Sheet::new(&sc.questionnaire_id, &sc.global_id);
    for (box_id, data) in sc.boxes.iter() {
        let id = match QObjectId::parse_csv(box_id) {
            Some(id) => id,
            None => whatever!("invalid box id {:?} in sheet {:?}", box_id, sc.questionnaire_id),
        };
        if questionnaire.find_box(&id).is_none() {
            warn!(
                "build_sheet: sheet {:?} has data for unknown box {:?}",
                sc.questionnaire_id, box_id
            );
        }
        let bd = sheet.box_data_mut(&id);
        bd.state = BoxState(data.state);
        bd.quality = data.quality;
        bd.text = data.text.clone().unwrap_or_default();
    }
    for (qid, answer) in sc.answers.iter() {
        let id = match QObjectId::parse_csv(qid) {
            Some(id) => id,
            None => whatever!("invalid question id {:?} in sheet {:?}", qid, sc.questionnaire_id),
        };
        if questionnaire.find_qobject(&id).is_none() {
            warn!(
                "build_sheet: sheet {:?} has an answer for unknown question {:?}",
                sc.questionnaire_id, qid
            );
        }
        sheet.set_answer(&id, *answer);
    }
    Ok(sheet)
}

/// Assembles the questionnaire and the sheets of a project.
pub fn build_survey(project: &ProjectConfig) -> BCsvDataResult<Survey> {
    let questionnaire = build_questionnaire(&project.questionnaire)?;
    let mut survey = Survey::new(questionnaire);
    for sc in project.sheets.iter() {
        let sheet = build_sheet(survey.questionnaire(), sc)?;
        survey.add_sheet(sheet).context(ProjectSnafu {})?;
    }
    info!(
        "Loaded project {:?} with {} sheets",
        project.title.as_deref().unwrap_or(""),
        survey.sheets().len()
    );
    Ok(survey)
}

/// The sheets of a survey, in the format of the project file.
pub fn sheets_to_config(survey: &Survey) -> Vec<SheetConfig> {
    survey
        .sheets()
        .iter()
        .map(|sheet| {
            let mut sc = SheetConfig::new(&sheet.questionnaire_id, &sheet.global_id);
            for (id, data) in sheet.boxes() {
                sc.boxes.insert(
                    id.id_csv(),
                    BoxDataConfig {
                        state: data.state.0,
                        quality: data.quality,
                        text: if data.text.is_empty() {
                            None
                        } else {
                            Some(data.text.clone())
                        },
                    },
                );
            }
            for (id, answer) in sheet.answers() {
                sc.answers.insert(id.id_csv(), answer);
            }
            sc
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(js: &str) -> ProjectConfig {
        serde_json::from_str(js).unwrap()
    }

    #[test]
    fn box_kind_follows_question() {
        let p = project(
            r#"{ "questionnaire": [
                { "kind": "text", "id": [1, 1], "boxes": [ { "id": 1 }, { "id": 2, "kind": "checkbox" } ] }
            ] }"#,
        );
        let survey = build_survey(&p).unwrap();
        let q = survey.questionnaire();
        assert_eq!(
            q.find_box(&QObjectId::new(&[1, 1, 1])).unwrap().kind,
            BoxKind::Textbox
        );
        assert_eq!(
            q.find_box(&QObjectId::new(&[1, 1, 2])).unwrap().kind,
            BoxKind::Checkbox
        );
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let p = project(r#"{ "questionnaire": [ { "kind": "matrix", "id": [1, 1] } ] }"#);
        assert!(matches!(
            *build_survey(&p).unwrap_err(),
            CsvDataError::Whatever { .. }
        ));
    }

    #[test]
    fn duplicate_sheets_are_rejected() {
        let p = project(
            r#"{ "questionnaire": [ { "kind": "option", "id": [1, 1] } ],
                 "sheets": [ { "questionnaireId": "1", "globalId": "a" },
                             { "questionnaireId": "1", "globalId": "b" } ] }"#,
        );
        assert!(matches!(
            *build_survey(&p).unwrap_err(),
            CsvDataError::Project {
                source: CodecError::DuplicateQuestionnaireId(_)
            }
        ));
    }

    #[test]
    fn global_id_is_required() {
        let res: Result<ProjectConfig, _> = serde_json::from_str(
            r#"{ "questionnaire": [], "sheets": [ { "questionnaireId": "1" } ] }"#,
        );
        assert!(res.is_err());

        let p = project(
            r#"{ "questionnaire": [ { "kind": "option", "id": [1, 1] } ],
                 "sheets": [ { "questionnaireId": "1", "globalId": "" } ] }"#,
        );
        assert!(matches!(
            *build_survey(&p).unwrap_err(),
            CsvDataError::Project {
                source: CodecError::MissingGlobalId(_)
            }
        ));
    }

    #[test]
    fn duplicate_global_ids_are_rejected() {
        let p = project(
            r#"{ "questionnaire": [ { "kind": "option", "id": [1, 1] } ],
                 "sheets": [ { "questionnaireId": "1", "globalId": "a" },
                             { "questionnaireId": "2", "globalId": "a" } ] }"#,
        );
        assert!(matches!(
            *build_survey(&p).unwrap_err(),
            CsvDataError::Project {
                source: CodecError::DuplicateGlobalId(_)
            }
        ));
    }

    #[test]
    fn sheets_round_trip() {
        let p = project(
            r#"{ "questionnaire": [
                    { "kind": "text", "id": [1, 1], "boxes": [ { "id": 1 } ] },
                    { "kind": "option", "id": [1, 2] } ],
                 "sheets": [ { "questionnaireId": "1", "globalId": "a",
                               "boxes": { "1_1_1": { "state": 1, "quality": 0.5, "text": "hi" } },
                               "answers": { "1_2": 3 } } ] }"#,
        );
        let survey = build_survey(&p).unwrap();
        assert_eq!(sheets_to_config(&survey), p.sheets);
    }
}
