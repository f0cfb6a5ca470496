// Names the images of the exported boxes.
//
// The images themselves are cropped out of the scans by another program,
// which reads the manifest written here.

use std::cell::RefCell;

use serde::Serialize;

use crate::csvdata::*;

#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct ImageRequest {
    pub image: String,
    #[serde(rename = "questionnaireId")]
    pub questionnaire_id: String,
    #[serde(rename = "globalId")]
    pub global_id: String,
    /// The csv ids of the boxes to cut out, in questionnaire order.
    pub boxes: Vec<String>,
}

/// Hands out image names and records what each image must contain.
pub struct ImageRequestWriter {
    prefix: String,
    requests: RefCell<Vec<ImageRequest>>,
}

impl ImageRequestWriter {
    pub fn new(prefix: &str) -> ImageRequestWriter {
        ImageRequestWriter {
            prefix: prefix.to_string(),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ImageRequest> {
        self.requests.borrow().clone()
    }

    // The marker separates question images from box images: a box and a
    // question of another depth may share the same csv id.
    fn request(&self, sheet: &Sheet, marker: char, id: &QObjectId, boxes: &[AnswerBox]) -> String {
        let image = format!(
            "{}{}-{}{}.png",
            self.prefix,
            sheet.global_id,
            marker,
            id.id_csv()
        );
        let mut requests = self.requests.borrow_mut();
        if !requests.iter().any(|r| r.image == image) {
            debug!("request: image {:?} for {} boxes", image, boxes.len());
            requests.push(ImageRequest {
                image: image.clone(),
                questionnaire_id: sheet.questionnaire_id.clone(),
                global_id: sheet.global_id.clone(),
                boxes: boxes.iter().map(|b| b.id.id_csv()).collect(),
            });
        }
        image
    }

    pub fn write_manifest(&self, path: &str) -> BCsvDataResult<()> {
        let requests = self.requests.borrow();
        let js = serde_json::to_string_pretty(&*requests).context(ParsingJsonSnafu {})?;
        info!("Writing {} image requests to {:?}", requests.len(), path);
        fs::write(path, js).context(WritingFileSnafu { path })?;
        Ok(())
    }
}

impl ImageWriter for ImageRequestWriter {
    fn output_box(&self, sheet: &Sheet, answer_box: &AnswerBox) -> Result<String, CodecError> {
        Ok(self.request(
            sheet,
            'b',
            &answer_box.id,
            std::slice::from_ref(answer_box),
        ))
    }

    fn output_boxes(
        &self,
        sheet: &Sheet,
        question_id: &QObjectId,
        boxes: &[AnswerBox],
    ) -> Result<String, CodecError> {
        if boxes.is_empty() {
            return Err(CodecError::Media(format!(
                "no boxes to cut out for question {}",
                question_id
            )));
        }
        Ok(self.request(sheet, 'q', question_id, boxes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique_per_sheet() {
        let writer = ImageRequestWriter::new("img/");
        let sheet = Sheet::new("1001", "7");
        let b = AnswerBox {
            id: QObjectId::new(&[1, 2, 1]),
            kind: BoxKind::Textbox,
            label: String::new(),
        };
        assert_eq!(writer.output_box(&sheet, &b).unwrap(), "img/7-b1_2_1.png");
        assert_eq!(writer.output_box(&sheet, &b).unwrap(), "img/7-b1_2_1.png");
        let name = writer
            .output_boxes(&sheet, &QObjectId::new(&[1, 2]), std::slice::from_ref(&b))
            .unwrap();
        assert_eq!(name, "img/7-q1_2.png");

        let requests = writer.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].boxes, vec!["1_2_1".to_string()]);
    }

    #[test]
    fn box_and_question_with_same_csv_id() {
        let writer = ImageRequestWriter::new("img/");
        let sheet = Sheet::new("1001", "7");
        // Text box (1, 2) of question (1), next to the question (1, 2).
        let b = AnswerBox {
            id: QObjectId::new(&[1, 2]),
            kind: BoxKind::Textbox,
            label: String::new(),
        };
        let c = AnswerBox {
            id: QObjectId::new(&[1, 2, 1]),
            kind: BoxKind::Checkbox,
            label: String::new(),
        };
        let box_image = writer.output_box(&sheet, &b).unwrap();
        let question_image = writer
            .output_boxes(&sheet, &QObjectId::new(&[1, 2]), std::slice::from_ref(&c))
            .unwrap();
        assert_ne!(box_image, question_image);
        assert_eq!(writer.requests().len(), 2);
    }

    #[test]
    fn sheets_get_their_own_images() {
        let writer = ImageRequestWriter::new("img/");
        let b = AnswerBox {
            id: QObjectId::new(&[1, 1, 1]),
            kind: BoxKind::Textbox,
            label: String::new(),
        };
        let first = writer.output_box(&Sheet::new("1001", "1"), &b).unwrap();
        let second = writer.output_box(&Sheet::new("1002", "2"), &b).unwrap();
        assert_eq!(first, "img/1-b1_1_1.png");
        assert_eq!(second, "img/2-b1_1_1.png");
        let requests = writer.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].questionnaire_id, "1002");
    }

    #[test]
    fn question_without_boxes() {
        let writer = ImageRequestWriter::new("");
        let sheet = Sheet::new("1001", "7");
        let res = writer.output_boxes(&sheet, &QObjectId::new(&[1, 2]), &[]);
        assert!(matches!(res, Err(CodecError::Media(_))));
    }
}
