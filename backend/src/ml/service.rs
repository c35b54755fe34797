use std::path::{Path, PathBuf};

use super::bundle::ModelBundle;
use super::dataset::TrainingSet;
use super::ModelError;

/// Handle to the persisted bundle, injected into handlers instead of being
/// reached through process-wide state. The bundle file is reloaded on every
/// prediction; nothing is cached across requests, so a request can never
/// observe a stale bundle.
pub struct PredictService {
    bundle_path: PathBuf,
}

impl PredictService {
    pub fn new<P: Into<PathBuf>>(bundle_path: P) -> Self {
        Self {
            bundle_path: bundle_path.into(),
        }
    }

    pub fn bundle_path(&self) -> &Path {
        &self.bundle_path
    }

    pub fn is_trained(&self) -> bool {
        self.bundle_path.exists()
    }

    /// Trains and persists a bundle from the CSV iff none exists yet.
    /// Returns true when a training run actually happened. Never retrains:
    /// an existing bundle wins even if the dataset has changed since.
    pub fn ensure_trained<P: AsRef<Path>>(&self, dataset_path: P) -> Result<bool, ModelError> {
        if self.is_trained() {
            return Ok(false);
        }
        let data = TrainingSet::from_csv_path(dataset_path)?;
        let bundle = ModelBundle::train(&data)?;
        bundle.save(&self.bundle_path)?;
        Ok(true)
    }

    /// Read-only prediction over a freshly loaded bundle.
    pub fn predict(
        &self,
        crime_type: &str,
        location: &str,
        time_of_day: &str,
    ) -> Result<String, ModelError> {
        let bundle = ModelBundle::load(&self.bundle_path)?;
        bundle.predict(crime_type, location, time_of_day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    const CSV: &str = "crime_type,location,time_of_day,suspect\n\
                       theft,downtown,night,repeat_offender\n\
                       fraud,mall,morning,insider\n\
                       vandalism,park,evening,juvenile\n";

    fn temp_paths(tag: &str) -> (PathBuf, PathBuf) {
        let dir = std::env::temp_dir();
        let pid = std::process::id();
        (
            dir.join(format!("case_service_{tag}_{pid}.json")),
            dir.join(format!("case_service_{tag}_{pid}.csv")),
        )
    }

    #[test]
    fn predict_before_training_reports_not_trained() {
        let (bundle_path, _) = temp_paths("untrained");
        let service = PredictService::new(&bundle_path);
        let err = service.predict("theft", "downtown", "night").unwrap_err();
        assert!(matches!(err, ModelError::NotTrained));
    }

    #[test]
    fn ensure_trained_runs_once_and_is_then_idempotent() {
        let (bundle_path, csv_path) = temp_paths("once");
        fs::remove_file(&bundle_path).ok();
        fs::write(&csv_path, CSV).unwrap();

        let service = PredictService::new(&bundle_path);
        assert!(service.ensure_trained(&csv_path).unwrap());
        assert!(service.is_trained());
        assert!(!service.ensure_trained(&csv_path).unwrap());

        let label = service.predict("fraud", "mall", "morning").unwrap();
        assert_eq!(label, "insider");

        fs::remove_file(&bundle_path).ok();
        fs::remove_file(&csv_path).ok();
    }
}
