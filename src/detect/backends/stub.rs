use anyhow::{anyhow, Result};

use crate::detect::backend::{EmotionClassifier, LandmarkExtractor};
use crate::detect::result::{
    EmotionResult, FaceLandmarks, Point, EMOTION_LABELS, LEFT_EYE_OUTER, NOSE_TIP,
    RIGHT_EYE_OUTER,
};
use crate::frame::Frame;

/// Fixed emotion distribution, `neutral` dominant. Sums to 100.
const STUB_SCORES: [f64; 7] = [0.8, 0.1, 1.6, 12.4, 3.1, 2.0, 80.0];

const MESH_POINTS: usize = 478;

/// Stub classifier for testing. Returns the same distribution for every frame.
#[derive(Default)]
pub struct StubEmotionClassifier;

impl StubEmotionClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl EmotionClassifier for StubEmotionClassifier {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn classify(&mut self, _frame: &Frame) -> Result<EmotionResult> {
        EmotionResult::from_scores(EMOTION_LABELS.iter().copied().zip(STUB_SCORES))
    }
}

/// Stub extractor for testing. Reports one frontal face centered in the frame.
pub struct StubLandmarkExtractor {
    closed: bool,
}

impl StubLandmarkExtractor {
    pub fn new() -> Self {
        Self { closed: false }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn centered_face() -> FaceLandmarks {
        let mut points = vec![Point::new(0.5, 0.5); MESH_POINTS];
        points[LEFT_EYE_OUTER] = Point::new(0.35, 0.42);
        points[RIGHT_EYE_OUTER] = Point::new(0.65, 0.42);
        points[NOSE_TIP] = Point::new(0.5, 0.5);
        FaceLandmarks { points }
    }
}

impl Default for StubLandmarkExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl LandmarkExtractor for StubLandmarkExtractor {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn extract(&mut self, _frame: &Frame) -> Result<Vec<FaceLandmarks>> {
        if self.closed {
            return Err(anyhow!("landmark extractor already closed"));
        }
        Ok(vec![Self::centered_face()])
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
