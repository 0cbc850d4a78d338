//! One-shot analysis of a single image.
//!
//! Load frame -> classify emotion -> extract landmarks -> score gaze/posture.
//! Models are built through a `ModelProvider` for each run; the landmark
//! extractor is held by a `LandmarkContext` so it is closed on every path out
//! of the extraction step.

use std::path::Path;
use std::time::Instant;

use crate::behavior::{round_to, BehaviorScores};
use crate::detect::{FaceLandmarks, LandmarkExtractor, ModelProvider};
use crate::error::AnalysisError;
use crate::frame::Frame;
use crate::response::{AnalysisResponse, FaceAnalysis};

/// Scoped owner of a landmark extractor. Dropping it releases the model.
pub struct LandmarkContext {
    extractor: Box<dyn LandmarkExtractor>,
}

impl LandmarkContext {
    pub fn open<P: ModelProvider + ?Sized>(models: &P) -> anyhow::Result<Self> {
        let extractor = models.landmark_extractor()?;
        log::debug!("landmark extractor '{}' opened", extractor.name());
        Ok(Self { extractor })
    }

    pub fn extract(&mut self, frame: &Frame) -> anyhow::Result<Vec<FaceLandmarks>> {
        self.extractor.extract(frame)
    }
}

impl Drop for LandmarkContext {
    fn drop(&mut self) {
        self.extractor.close();
        log::debug!("landmark extractor '{}' released", self.extractor.name());
    }
}

pub struct Analyzer<P: ModelProvider> {
    models: P,
}

impl<P: ModelProvider> Analyzer<P> {
    pub fn new(models: P) -> Self {
        Self { models }
    }

    /// Analyze the image at `image_path`.
    pub fn analyze<Q: AsRef<Path>>(&self, image_path: Q) -> Result<FaceAnalysis, AnalysisError> {
        let started = Instant::now();
        let path = image_path.as_ref();
        let frame = Frame::open(path).map_err(|e| {
            AnalysisError::ImageLoad(format!("Invalid image path or corrupted frame: {:#}", e))
        })?;
        log::debug!("loaded {}x{} frame from {}", frame.width, frame.height, path.display());

        let analysis = self.analyze_frame(&frame)?;
        log::info!(
            "analysis complete: emotion={} gaze={} in {:.2}s",
            analysis.emotion,
            analysis.gaze_direction.as_str(),
            started.elapsed().as_secs_f64()
        );
        Ok(analysis)
    }

    /// Analyze an already decoded frame.
    pub fn analyze_frame(&self, frame: &Frame) -> Result<FaceAnalysis, AnalysisError> {
        let emotion = {
            let mut classifier = self.models.emotion_classifier()?;
            log::debug!("emotion classifier '{}'", classifier.name());
            classifier.classify(frame)?
        };
        let confidence = round_to(emotion.confidence(), 3);
        log::debug!(
            "dominant emotion {} ({:.3})",
            emotion.dominant_emotion,
            confidence
        );

        let behavior = {
            let mut context = LandmarkContext::open(&self.models)?;
            let faces = context.extract(frame)?;
            match faces.first() {
                Some(face) => BehaviorScores::from_landmarks(&face.gaze()?),
                None => {
                    log::info!("no face landmarks found");
                    BehaviorScores::unknown()
                }
            }
        };

        Ok(FaceAnalysis {
            emotion: emotion.dominant_emotion,
            confidence,
            emotion_scores: emotion.emotion_scores,
            gaze_direction: behavior.gaze_direction,
            eye_contact: behavior.eye_contact,
            gaze_stability: behavior.gaze_stability,
            posture_score: behavior.posture_score,
            session_id: None,
        })
    }

    /// Like `analyze`, folding any failure into an error record.
    pub fn respond<Q: AsRef<Path>>(&self, image_path: Q) -> AnalysisResponse {
        match self.analyze(image_path) {
            Ok(analysis) => AnalysisResponse::Success(analysis),
            Err(err) => {
                log::warn!("analysis failed ({}): {}", err.kind(), err);
                AnalysisResponse::from(err)
            }
        }
    }
}
