//! Face analysis
//!
//! Single-shot analysis of one image: the dominant emotion from an emotion
//! classifier, plus gaze and posture heuristics derived from face mesh
//! landmarks. The result is one JSON document meant to be read by whatever
//! process spawned the CLI.
//!
//! # Module Structure
//!
//! - `frame`: image decoding and model input views
//! - `detect`: collaborator model traits and backends (tract, stub)
//! - `behavior`: gaze direction and score heuristics
//! - `analyzer`: orchestration and landmark model lifecycle
//! - `response`: the JSON success/error record
//! - `config`: file and environment configuration

use std::path::Path;

pub mod analyzer;
pub mod behavior;
pub mod config;
pub mod detect;
pub mod error;
pub mod frame;
pub mod response;

pub use analyzer::{Analyzer, LandmarkContext};
pub use behavior::{BehaviorScores, GazeDirection};
pub use config::{AnalyzerConfig, BackendKind};
pub use detect::{
    ConfiguredModels, EmotionClassifier, EmotionResult, FaceLandmarks, GazeLandmarks,
    LandmarkExtractor, ModelProvider, Point,
};
pub use error::AnalysisError;
pub use frame::Frame;
pub use response::{AnalysisResponse, ErrorRecord, FaceAnalysis};

/// Load configuration from the environment and analyze one image.
///
/// Never fails: configuration and analysis errors come back as an error
/// record. The session id is not attached.
pub fn analyze_image<P: AsRef<Path>>(image_path: P) -> AnalysisResponse {
    let config = match AnalyzerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            let err = AnalysisError::Config(format!("{:#}", e));
            log::warn!("{}", err);
            return AnalysisResponse::from(err);
        }
    };
    log::debug!("using {} backend", config.backend.as_str());
    Analyzer::new(ConfiguredModels::new(config)).respond(image_path)
}
