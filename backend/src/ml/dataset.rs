use std::fs;
use std::path::Path;

use super::ModelError;

pub const EXPECTED_HEADER: &str = "crime_type,location,time_of_day,suspect";

#[derive(Debug, Clone)]
pub struct TrainingRecord {
    pub crime_type: String,
    pub location: String,
    pub time_of_day: String,
    pub suspect: String,
}

/// The source training dataset, read once at first startup when no model
/// bundle exists yet. Changes to this file after the bundle is written have
/// no effect; the bundle is a static artifact keyed by its own presence.
#[derive(Debug, Clone)]
pub struct TrainingSet {
    pub records: Vec<TrainingRecord>,
}

impl TrainingSet {
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let text = fs::read_to_string(&path).map_err(|e| {
            ModelError::Dataset(format!(
                "cannot read {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Self::from_csv_str(&text)
    }

    pub fn from_csv_str(text: &str) -> Result<Self, ModelError> {
        let mut lines = text.lines();
        let header = lines
            .next()
            .ok_or_else(|| ModelError::Dataset("empty training file".into()))?;
        if header.trim() != EXPECTED_HEADER {
            return Err(ModelError::Dataset(format!(
                "unexpected header {header:?}, expected {EXPECTED_HEADER:?}"
            )));
        }

        let mut records = Vec::new();
        for (lineno, line) in lines.enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            if fields.len() != 4 {
                return Err(ModelError::Dataset(format!(
                    "line {}: expected 4 fields, found {}",
                    lineno + 2,
                    fields.len()
                )));
            }
            records.push(TrainingRecord {
                crime_type: fields[0].to_owned(),
                location: fields[1].to_owned(),
                time_of_day: fields[2].to_owned(),
                suspect: fields[3].to_owned(),
            });
        }
        Ok(Self { records })
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}
