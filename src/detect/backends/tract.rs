#![cfg(feature = "backend-tract")]

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tract_onnx::prelude::*;

use crate::detect::backend::{EmotionClassifier, LandmarkExtractor};
use crate::detect::result::{EmotionResult, FaceLandmarks, Point, EMOTION_LABELS};
use crate::frame::Frame;

type Plan = TypedRunnableModel<TypedModel>;

/// Landmarks in the base face mesh, before the refined iris points.
const BASE_MESH_POINTS: usize = 468;
/// Smallest mesh that still contains every landmark the gaze heuristic reads.
const MIN_MESH_POINTS: usize = 264;

fn load_plan(model_path: &Path, shape: TVec<usize>) -> Result<Plan> {
    tract_onnx::onnx()
        .model_for_path(model_path)
        .with_context(|| format!("failed to load ONNX model from {}", model_path.display()))?
        .with_input_fact(0, InferenceFact::dt_shape(f32::datum_type(), shape))
        .context("failed to set input fact")?
        .into_optimized()
        .context("failed to optimize ONNX model")?
        .into_runnable()
        .context("failed to build runnable ONNX model")
}

/// FER-style emotion classifier.
///
/// Input is a `1x1xNxN` grayscale tensor in `0..=1` built from the centered
/// square of the whole frame; no face detection is enforced. Output is one
/// score per entry of `EMOTION_LABELS`.
pub struct TractEmotionClassifier {
    model: Plan,
    input_size: u32,
}

impl TractEmotionClassifier {
    pub fn new<P: AsRef<Path>>(model_path: P, input_size: u32) -> Result<Self> {
        let side = input_size as usize;
        let model = load_plan(model_path.as_ref(), tvec!(1, 1, side, side))?;
        Ok(Self { model, input_size })
    }

    fn build_input(&self, frame: &Frame) -> Result<Tensor> {
        let gray = frame.center_square_gray(self.input_size)?;
        let side = self.input_size as usize;
        let input = tract_ndarray::Array4::from_shape_fn((1, 1, side, side), |(_, _, y, x)| {
            gray.get_pixel(x as u32, y as u32)[0] as f32 / 255.0
        });
        Ok(input.into_tensor())
    }
}

fn check_score_count(raw: &[f32]) -> Result<&[f32]> {
    if raw.len() != EMOTION_LABELS.len() {
        return Err(anyhow!(
            "emotion model returned {} scores, expected {}",
            raw.len(),
            EMOTION_LABELS.len()
        ));
    }
    Ok(raw)
}

/// Turn raw classifier output into percentages.
///
/// Outputs that already form a probability distribution are kept; anything
/// else is treated as logits.
fn to_percentages(raw: &[f32]) -> Vec<f64> {
    let raw: Vec<f64> = raw.iter().map(|v| *v as f64).collect();
    let sum: f64 = raw.iter().sum();
    let is_distribution = raw.iter().all(|v| (0.0..=1.0).contains(v)) && (sum - 1.0).abs() < 1e-3;
    let probs = if is_distribution {
        raw
    } else {
        let max = raw.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = raw.iter().map(|v| (v - max).exp()).collect();
        let total: f64 = exps.iter().sum();
        exps.into_iter().map(|v| v / total).collect()
    };
    probs.into_iter().map(|p| p * 100.0).collect()
}

impl EmotionClassifier for TractEmotionClassifier {
    fn name(&self) -> &'static str {
        "tract"
    }

    fn classify(&mut self, frame: &Frame) -> Result<EmotionResult> {
        let input = self.build_input(frame)?;
        let outputs = self
            .model
            .run(tvec!(input.into()))
            .context("emotion inference failed")?;
        let output = outputs
            .first()
            .ok_or_else(|| anyhow!("emotion model produced no outputs"))?;
        let scores = output
            .to_array_view::<f32>()
            .context("emotion output tensor was not f32")?;
        let raw: Vec<f32> = scores.iter().copied().collect();
        let percentages = to_percentages(check_score_count(&raw)?);
        EmotionResult::from_scores(EMOTION_LABELS.iter().copied().zip(percentages))
    }
}

/// Face mesh landmark extractor.
///
/// Runs in static image mode: every call processes the whole frame
/// independently. Input is `1xNxNx3` RGB in `-1..=1`; output 0 holds flattened
/// `(x, y, z)` triples in input pixels, output 1 (when present) the face
/// presence logit.
pub struct TractFaceMesh {
    model: Option<Plan>,
    input_size: u32,
    presence_threshold: f32,
    refine_landmarks: bool,
}

impl TractFaceMesh {
    pub fn new<P: AsRef<Path>>(model_path: P, input_size: u32) -> Result<Self> {
        let side = input_size as usize;
        let model = load_plan(model_path.as_ref(), tvec!(1, side, side, 3))?;
        Ok(Self {
            model: Some(model),
            input_size,
            presence_threshold: 0.5,
            refine_landmarks: true,
        })
    }

    /// Override the default face presence threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.presence_threshold = threshold;
        self
    }

    /// Keep or drop the refined iris landmarks.
    pub fn with_refined_landmarks(mut self, refine: bool) -> Self {
        self.refine_landmarks = refine;
        self
    }

    fn build_input(&self, frame: &Frame) -> Result<Tensor> {
        let resized = frame.resized_rgb(self.input_size)?;
        let side = self.input_size as usize;
        let input =
            tract_ndarray::Array4::from_shape_fn((1, side, side, 3), |(_, y, x, channel)| {
                resized.get_pixel(x as u32, y as u32)[channel] as f32 / 127.5 - 1.0
            });
        Ok(input.into_tensor())
    }

    fn decode_mesh(&self, raw: &[f32]) -> Result<FaceLandmarks> {
        let count = raw.len() / 3;
        if count < MIN_MESH_POINTS {
            return Err(anyhow!(
                "face mesh returned {} landmarks, expected at least {}",
                count,
                MIN_MESH_POINTS
            ));
        }
        let keep = if self.refine_landmarks {
            count
        } else {
            count.min(BASE_MESH_POINTS)
        };
        let scale = self.input_size as f32;
        let points = raw
            .chunks_exact(3)
            .take(keep)
            .map(|xyz| Point {
                x: xyz[0] / scale,
                y: xyz[1] / scale,
                z: xyz[2] / scale,
            })
            .collect();
        Ok(FaceLandmarks { points })
    }
}

fn sigmoid(v: f32) -> f32 {
    1.0 / (1.0 + (-v).exp())
}

impl LandmarkExtractor for TractFaceMesh {
    fn name(&self) -> &'static str {
        "tract"
    }

    fn extract(&mut self, frame: &Frame) -> Result<Vec<FaceLandmarks>> {
        let input = self.build_input(frame)?;
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| anyhow!("face mesh model already released"))?;
        let outputs = model
            .run(tvec!(input.into()))
            .context("face mesh inference failed")?;

        if let Some(flag) = outputs.get(1) {
            let logit = flag
                .to_array_view::<f32>()
                .context("face presence tensor was not f32")?
                .iter()
                .next()
                .copied()
                .ok_or_else(|| anyhow!("face presence tensor is empty"))?;
            let presence = sigmoid(logit);
            if presence < self.presence_threshold {
                log::debug!("face presence {:.3} below threshold", presence);
                return Ok(Vec::new());
            }
        }

        let mesh = outputs
            .first()
            .ok_or_else(|| anyhow!("face mesh produced no outputs"))?
            .to_array_view::<f32>()
            .context("face mesh tensor was not f32")?;
        let raw: Vec<f32> = mesh.iter().copied().collect();
        Ok(vec![self.decode_mesh(&raw)?])
    }

    fn close(&mut self) {
        self.model = None;
    }
}
