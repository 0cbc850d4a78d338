//! Gaze and posture heuristics derived from three face landmarks.
//!
//! All scores are on a 0..=100 scale, rounded to two decimals. The nose tip's
//! offset from the image center drives everything:
//!
//! - `dx = |nose.x - 0.5|`, `dy = |nose.y - 0.5|`
//! - direction: horizontal offset first (`left`/`right`), then vertical
//!   (`down` only), else `center`
//! - `gaze_stability = 100 - 200·dx`, `eye_contact = 100 - 250·dx`,
//!   `posture_score = 100 - 200·(dx + dy)`, each clamped at zero
//!
//! Known limitation: a raised head is never reported as `up`; any vertical
//! offset past the threshold reads as `down`.

use serde::Serialize;

use crate::detect::GazeLandmarks;

/// Normalized offset beyond which the nose counts as off-center.
pub const GAZE_THRESHOLD: f64 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GazeDirection {
    Center,
    Left,
    Right,
    Down,
    Unknown,
}

impl GazeDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            GazeDirection::Center => "center",
            GazeDirection::Left => "left",
            GazeDirection::Right => "right",
            GazeDirection::Down => "down",
            GazeDirection::Unknown => "unknown",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BehaviorScores {
    pub gaze_direction: GazeDirection,
    pub gaze_stability: f64,
    pub eye_contact: f64,
    pub posture_score: f64,
}

impl BehaviorScores {
    /// Result when no face was found. Not an error.
    pub fn unknown() -> Self {
        Self {
            gaze_direction: GazeDirection::Unknown,
            gaze_stability: 0.0,
            eye_contact: 0.0,
            posture_score: 0.0,
        }
    }

    pub fn from_landmarks(landmarks: &GazeLandmarks) -> Self {
        let nose_x = landmarks.nose.x as f64;
        let nose_y = landmarks.nose.y as f64;
        let dx = (nose_x - 0.5).abs();
        let dy = (nose_y - 0.5).abs();

        let gaze_direction = if dx > GAZE_THRESHOLD {
            if nose_x < 0.5 {
                GazeDirection::Left
            } else {
                GazeDirection::Right
            }
        } else if dy > GAZE_THRESHOLD {
            GazeDirection::Down
        } else {
            GazeDirection::Center
        };

        Self {
            gaze_direction,
            gaze_stability: round_to(clamp_score(100.0 - dx * 200.0), 2),
            eye_contact: round_to(clamp_score(100.0 - dx * 250.0), 2),
            posture_score: round_to(clamp_score(100.0 - (dx + dy) * 200.0), 2),
        }
    }
}

impl Default for BehaviorScores {
    fn default() -> Self {
        Self::unknown()
    }
}

// f64::max drops NaN, so non-finite landmarks also land on zero.
fn clamp_score(value: f64) -> f64 {
    value.max(0.0)
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
