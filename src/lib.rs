pub mod calibration;
pub mod config;
pub mod encoder;
pub mod error;
pub mod form;
pub mod h2h;
pub mod logreg;
pub mod match_log;
pub mod model_store;
pub mod predictor;
pub mod schema;
pub mod simulator;
pub mod standings;
pub mod store;
pub mod targets;
pub mod trainer;
