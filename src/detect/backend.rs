use anyhow::Result;

use crate::detect::result::{EmotionResult, FaceLandmarks};
use crate::frame::Frame;

/// Emotion classifier over a whole frame.
///
/// Implementations must not fail when no face is confidently visible; they
/// fall back to a best-effort estimate over the full frame.
pub trait EmotionClassifier {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Classify the frame.
    fn classify(&mut self, frame: &Frame) -> Result<EmotionResult>;
}

/// Facial landmark extractor in static single-image mode.
///
/// Holds model resources until `close` is called. Callers go through
/// `LandmarkContext`, which guarantees `close` on every exit path.
pub trait LandmarkExtractor {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Return zero or more faces, in extractor order.
    fn extract(&mut self, frame: &Frame) -> Result<Vec<FaceLandmarks>>;

    /// Release model resources. Must be idempotent.
    fn close(&mut self) {}
}

/// Builds the collaborator models for one analysis run.
pub trait ModelProvider {
    fn emotion_classifier(&self) -> Result<Box<dyn EmotionClassifier>>;

    fn landmark_extractor(&self) -> Result<Box<dyn LandmarkExtractor>>;
}
