use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_EMOTION_MODEL: &str = "models/emotion.onnx";
const DEFAULT_FACE_MESH_MODEL: &str = "models/face_mesh.onnx";
const DEFAULT_EMOTION_INPUT: u32 = 48;
const DEFAULT_FACE_MESH_INPUT: u32 = 192;
const DEFAULT_PRESENCE_THRESHOLD: f32 = 0.5;

/// Inference backend used for both collaborator models.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    /// ONNX models executed with tract.
    Tract,
    /// Deterministic fixture models.
    Stub,
}

impl BackendKind {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "tract" => Ok(BackendKind::Tract),
            "stub" => Ok(BackendKind::Stub),
            other => Err(anyhow!("unknown backend '{}' (expected tract or stub)", other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Tract => "tract",
            BackendKind::Stub => "stub",
        }
    }
}

impl Default for BackendKind {
    fn default() -> Self {
        if cfg!(feature = "backend-tract") {
            BackendKind::Tract
        } else {
            BackendKind::Stub
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct AnalyzerConfigFile {
    backend: Option<String>,
    emotion: Option<EmotionConfigFile>,
    face_mesh: Option<FaceMeshConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct EmotionConfigFile {
    model_path: Option<PathBuf>,
    input_size: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct FaceMeshConfigFile {
    model_path: Option<PathBuf>,
    input_size: Option<u32>,
    presence_threshold: Option<f32>,
    refine_landmarks: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub backend: BackendKind,
    pub emotion: EmotionSettings,
    pub face_mesh: FaceMeshSettings,
}

#[derive(Debug, Clone)]
pub struct EmotionSettings {
    pub model_path: PathBuf,
    /// Side length of the square grayscale input.
    pub input_size: u32,
}

#[derive(Debug, Clone)]
pub struct FaceMeshSettings {
    pub model_path: PathBuf,
    /// Side length of the square RGB input.
    pub input_size: u32,
    /// Minimum face presence probability for a mesh to count as a face.
    pub presence_threshold: f32,
    /// Keep the refined iris landmarks past index 467.
    pub refine_landmarks: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            emotion: EmotionSettings {
                model_path: PathBuf::from(DEFAULT_EMOTION_MODEL),
                input_size: DEFAULT_EMOTION_INPUT,
            },
            face_mesh: FaceMeshSettings {
                model_path: PathBuf::from(DEFAULT_FACE_MESH_MODEL),
                input_size: DEFAULT_FACE_MESH_INPUT,
                presence_threshold: DEFAULT_PRESENCE_THRESHOLD,
                refine_landmarks: true,
            },
        }
    }
}

impl AnalyzerConfig {
    /// Load from `FACE_ANALYSIS_CONFIG` (if set), then apply env overrides.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("FACE_ANALYSIS_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) if !path.trim().is_empty() => Some(read_config_file(Path::new(path))?),
            _ => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default())?;
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a JSON config document without touching the environment.
    pub fn from_json(raw: &str) -> Result<Self> {
        let file: AnalyzerConfigFile =
            serde_json::from_str(raw).map_err(|e| anyhow!("invalid config: {}", e))?;
        let cfg = Self::from_file(file)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: AnalyzerConfigFile) -> Result<Self> {
        let defaults = Self::default();
        let backend = match file.backend.as_deref() {
            Some(name) => BackendKind::parse(name)?,
            None => defaults.backend,
        };
        let emotion = file.emotion.unwrap_or_default();
        let face_mesh = file.face_mesh.unwrap_or_default();
        Ok(Self {
            backend,
            emotion: EmotionSettings {
                model_path: emotion.model_path.unwrap_or(defaults.emotion.model_path),
                input_size: emotion.input_size.unwrap_or(defaults.emotion.input_size),
            },
            face_mesh: FaceMeshSettings {
                model_path: face_mesh
                    .model_path
                    .unwrap_or(defaults.face_mesh.model_path),
                input_size: face_mesh
                    .input_size
                    .unwrap_or(defaults.face_mesh.input_size),
                presence_threshold: face_mesh
                    .presence_threshold
                    .unwrap_or(defaults.face_mesh.presence_threshold),
                refine_landmarks: face_mesh
                    .refine_landmarks
                    .unwrap_or(defaults.face_mesh.refine_landmarks),
            },
        })
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(backend) = std::env::var("FACE_ANALYSIS_BACKEND") {
            if !backend.trim().is_empty() {
                self.backend = BackendKind::parse(&backend)?;
            }
        }
        if let Ok(path) = std::env::var("FACE_ANALYSIS_EMOTION_MODEL") {
            if !path.trim().is_empty() {
                self.emotion.model_path = PathBuf::from(path);
            }
        }
        if let Ok(path) = std::env::var("FACE_ANALYSIS_FACE_MESH_MODEL") {
            if !path.trim().is_empty() {
                self.face_mesh.model_path = PathBuf::from(path);
            }
        }
        if let Ok(threshold) = std::env::var("FACE_ANALYSIS_PRESENCE_THRESHOLD") {
            self.face_mesh.presence_threshold = threshold.trim().parse().map_err(|_| {
                anyhow!("FACE_ANALYSIS_PRESENCE_THRESHOLD must be a number between 0 and 1")
            })?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.backend == BackendKind::Tract && !cfg!(feature = "backend-tract") {
            return Err(anyhow!(
                "backend 'tract' requires the backend-tract feature"
            ));
        }
        if !(0.0..=1.0).contains(&self.face_mesh.presence_threshold) {
            return Err(anyhow!("presence_threshold must be within 0..=1"));
        }
        if self.emotion.input_size == 0 || self.face_mesh.input_size == 0 {
            return Err(anyhow!("model input sizes must be greater than zero"));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<AnalyzerConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let cfg = AnalyzerConfig::from_json("{}").unwrap();
        assert_eq!(cfg.backend, BackendKind::default());
        assert_eq!(cfg.emotion.input_size, 48);
        assert_eq!(cfg.face_mesh.input_size, 192);
        assert_eq!(cfg.face_mesh.presence_threshold, 0.5);
        assert!(cfg.face_mesh.refine_landmarks);
        assert_eq!(cfg.emotion.model_path, PathBuf::from("models/emotion.onnx"));
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let cfg = AnalyzerConfig::from_json(
            r#"{"backend": "stub", "face_mesh": {"presence_threshold": 0.8}}"#,
        )
        .unwrap();
        assert_eq!(cfg.backend, BackendKind::Stub);
        assert_eq!(cfg.face_mesh.presence_threshold, 0.8);
        assert_eq!(cfg.face_mesh.input_size, 192);
        assert_eq!(
            cfg.face_mesh.model_path,
            PathBuf::from("models/face_mesh.onnx")
        );
    }

    #[test]
    fn rejects_unknown_backend() {
        let err = AnalyzerConfig::from_json(r#"{"backend": "opencv"}"#).unwrap_err();
        assert!(err.to_string().contains("unknown backend"));
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        assert!(
            AnalyzerConfig::from_json(r#"{"backend": "stub", "face_mesh": {"presence_threshold": 1.5}}"#)
                .is_err()
        );
    }

    #[test]
    fn rejects_zero_input_size() {
        assert!(
            AnalyzerConfig::from_json(r#"{"backend": "stub", "emotion": {"input_size": 0}}"#).is_err()
        );
    }
}
