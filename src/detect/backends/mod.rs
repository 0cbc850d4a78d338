pub mod stub;

#[cfg(feature = "backend-tract")]
pub mod tract;

use anyhow::Result;

use crate::config::{AnalyzerConfig, BackendKind};
use crate::detect::backend::{EmotionClassifier, LandmarkExtractor, ModelProvider};

pub use stub::{StubEmotionClassifier, StubLandmarkExtractor};

#[cfg(feature = "backend-tract")]
pub use tract::{TractEmotionClassifier, TractFaceMesh};

/// Model provider driven by `AnalyzerConfig`.
///
/// Models are built on demand, once per analysis run.
pub struct ConfiguredModels {
    config: AnalyzerConfig,
}

impl ConfiguredModels {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn backend(&self) -> BackendKind {
        self.config.backend
    }
}

impl ModelProvider for ConfiguredModels {
    fn emotion_classifier(&self) -> Result<Box<dyn EmotionClassifier>> {
        match self.config.backend {
            BackendKind::Stub => Ok(Box::new(StubEmotionClassifier::new())),
            #[cfg(feature = "backend-tract")]
            BackendKind::Tract => Ok(Box::new(TractEmotionClassifier::new(
                &self.config.emotion.model_path,
                self.config.emotion.input_size,
            )?)),
            #[cfg(not(feature = "backend-tract"))]
            BackendKind::Tract => Err(anyhow::anyhow!(
                "backend 'tract' requires the backend-tract feature"
            )),
        }
    }

    fn landmark_extractor(&self) -> Result<Box<dyn LandmarkExtractor>> {
        match self.config.backend {
            BackendKind::Stub => Ok(Box::new(StubLandmarkExtractor::new())),
            #[cfg(feature = "backend-tract")]
            BackendKind::Tract => {
                let mesh = &self.config.face_mesh;
                Ok(Box::new(
                    TractFaceMesh::new(&mesh.model_path, mesh.input_size)?
                        .with_threshold(mesh.presence_threshold)
                        .with_refined_landmarks(mesh.refine_landmarks),
                ))
            }
            #[cfg(not(feature = "backend-tract"))]
            BackendKind::Tract => Err(anyhow::anyhow!(
                "backend 'tract' requires the backend-tract feature"
            )),
        }
    }
}
