use std::collections::BTreeMap;

use anyhow::{anyhow, Result};

/// Emotion labels in classifier output order.
pub const EMOTION_LABELS: [&str; 7] = [
    "angry", "disgust", "fear", "happy", "sad", "surprise", "neutral",
];

/// Face mesh index of the nose tip.
pub const NOSE_TIP: usize = 1;
/// Face mesh index of the left-eye outer corner.
pub const LEFT_EYE_OUTER: usize = 33;
/// Face mesh index of the right-eye outer corner.
pub const RIGHT_EYE_OUTER: usize = 263;

/// Output of an emotion classifier for one image.
#[derive(Clone, Debug, PartialEq)]
pub struct EmotionResult {
    pub dominant_emotion: String,
    /// Label -> score, typically on a 0..100 scale.
    pub emotion_scores: BTreeMap<String, f64>,
}

impl EmotionResult {
    /// Build a result from scores in label order. The highest score wins;
    /// on ties the earlier label is kept.
    pub fn from_scores<I, S>(scores: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut dominant: Option<(String, f64)> = None;
        let mut emotion_scores = BTreeMap::new();
        for (label, score) in scores {
            let label = label.into();
            let better = match &dominant {
                Some((_, best)) => score > *best,
                None => true,
            };
            if better {
                dominant = Some((label.clone(), score));
            }
            emotion_scores.insert(label, score);
        }
        let (dominant_emotion, _) =
            dominant.ok_or_else(|| anyhow!("emotion classifier returned no scores"))?;
        Ok(Self {
            dominant_emotion,
            emotion_scores,
        })
    }

    /// Dominant score rescaled from 0..100 to 0..1; zero when the dominant
    /// label has no score.
    pub fn confidence(&self) -> f64 {
        self.emotion_scores
            .get(&self.dominant_emotion)
            .map(|score| score / 100.0)
            .unwrap_or(0.0)
    }
}

/// Landmark in normalized image coordinates. `z` is model-relative depth.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }
}

/// Full landmark set for one detected face.
#[derive(Clone, Debug, Default)]
pub struct FaceLandmarks {
    pub points: Vec<Point>,
}

impl FaceLandmarks {
    /// Extract the three points the gaze heuristic reads.
    pub fn gaze(&self) -> Result<GazeLandmarks> {
        let point = |index: usize| {
            self.points.get(index).copied().ok_or_else(|| {
                anyhow!(
                    "landmark set has {} points, index {} required",
                    self.points.len(),
                    index
                )
            })
        };
        Ok(GazeLandmarks {
            left_eye: point(LEFT_EYE_OUTER)?,
            right_eye: point(RIGHT_EYE_OUTER)?,
            nose: point(NOSE_TIP)?,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GazeLandmarks {
    pub left_eye: Point,
    pub right_eye: Point,
    pub nose: Point,
}
