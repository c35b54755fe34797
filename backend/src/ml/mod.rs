pub mod bundle;
pub mod dataset;
pub mod encoder;
pub mod forest;
pub mod service;

pub use bundle::ModelBundle;
pub use service::PredictService;

/// Errors of the training and prediction pipeline. `NotTrained` and
/// `UnseenCategory` are the two runtime paths the HTTP surface reports
/// distinctly; the rest only occur at startup or on a corrupt bundle file.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("ML model not trained")]
    NotTrained,
    #[error("unseen category {value:?} for column {column}")]
    UnseenCategory { column: String, value: String },
    #[error("training data error: {0}")]
    Dataset(String),
    #[error("training requires at least one record")]
    EmptyTrainingSet,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
