use thiserror::Error;

use crate::trainer::TargetKey;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("no training samples")]
    EmptyTrainingSet,
    #[error("{samples} samples but {labels} labels")]
    LabelCountMismatch { samples: usize, labels: usize },
    #[error("training labels contain a single class ({0})")]
    SingleClass(String),
    #[error("expected {expected} input columns, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("non-finite probability output")]
    NonFinite,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    #[error("model `{}` is not available", .0.key())]
    MissingModel(TargetKey),
    #[error("classifier has no class `{0}`")]
    UnknownLabel(String),
    #[error(transparent)]
    Model(#[from] ModelError),
}
