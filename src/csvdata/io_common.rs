use std::path::Path;

use crate::csvdata::*;

/// The formats that rows can be imported from.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum InputType {
    Csv,
    Xlsx,
}

impl InputType {
    pub fn parse(s: &str) -> CsvDataResult<InputType> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(InputType::Csv),
            "xlsx" | "excel" => Ok(InputType::Xlsx),
            x => whatever!("Input type not implemented {:?}", x),
        }
    }

    /// Guesses the input type from the extension of the file.
    pub fn from_path(path: &str) -> CsvDataResult<InputType> {
        let ext = Path::new(path).extension().and_then(|e| e.to_str());
        match ext {
            Some(e) => InputType::parse(e),
            None => whatever!(
                "Cannot guess the type of {:?}, pass --input-type explicitly",
                path
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_type_from_extension() {
        assert_eq!(InputType::from_path("data/a.csv").unwrap(), InputType::Csv);
        assert_eq!(InputType::from_path("a.XLSX").unwrap(), InputType::Xlsx);
        assert!(InputType::from_path("a.ods").is_err());
        assert!(InputType::from_path("noextension").is_err());
    }
}
