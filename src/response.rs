//! The single JSON document written to stdout.

use std::collections::BTreeMap;

use anyhow::Result;
use serde::Serialize;

use crate::behavior::GazeDirection;
use crate::error::AnalysisError;

/// Successful analysis of one image.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FaceAnalysis {
    pub emotion: String,
    /// Dominant score on a 0..=1 scale, three decimals.
    pub confidence: f64,
    pub emotion_scores: BTreeMap<String, f64>,
    pub gaze_direction: GazeDirection,
    pub eye_contact: f64,
    pub gaze_stability: f64,
    pub posture_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ErrorRecord {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalysisResponse {
    Success(FaceAnalysis),
    Error(ErrorRecord),
}

impl AnalysisResponse {
    pub fn error(message: impl Into<String>) -> Self {
        AnalysisResponse::Error(ErrorRecord {
            error: message.into(),
            session_id: None,
        })
    }

    /// Attach the caller's session id, replacing any existing one.
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        let session_id = Some(session_id.into());
        match &mut self {
            AnalysisResponse::Success(analysis) => analysis.session_id = session_id,
            AnalysisResponse::Error(record) => record.session_id = session_id,
        }
        self
    }

    pub fn is_error(&self) -> bool {
        matches!(self, AnalysisResponse::Error(_))
    }

    /// Compact single-line JSON.
    pub fn to_json_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl From<Result<FaceAnalysis, AnalysisError>> for AnalysisResponse {
    fn from(result: Result<FaceAnalysis, AnalysisError>) -> Self {
        match result {
            Ok(analysis) => AnalysisResponse::Success(analysis),
            Err(err) => AnalysisResponse::error(err.to_string()),
        }
    }
}

impl From<AnalysisError> for AnalysisResponse {
    fn from(err: AnalysisError) -> Self {
        AnalysisResponse::error(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn sample() -> FaceAnalysis {
        FaceAnalysis {
            emotion: "happy".to_string(),
            confidence: 0.93,
            emotion_scores: BTreeMap::from([
                ("happy".to_string(), 93.0),
                ("neutral".to_string(), 7.0),
            ]),
            gaze_direction: GazeDirection::Center,
            eye_contact: 87.5,
            gaze_stability: 91.0,
            posture_score: 89.0,
            session_id: None,
        }
    }

    #[test]
    fn success_fields_in_order() {
        let line = AnalysisResponse::Success(sample())
            .with_session("abcd-1234")
            .to_json_line()
            .unwrap();
        assert_eq!(
            line,
            r#"{"emotion":"happy","confidence":0.93,"emotion_scores":{"happy":93.0,"neutral":7.0},"gaze_direction":"center","eye_contact":87.5,"gaze_stability":91.0,"posture_score":89.0,"session_id":"abcd-1234"}"#
        );
        assert!(!line.contains('\n'));
    }

    #[test]
    fn missing_arguments_has_no_session() {
        let line = AnalysisResponse::from(AnalysisError::MissingArguments)
            .to_json_line()
            .unwrap();
        assert_eq!(line, r#"{"error":"Missing arguments"}"#);
    }

    #[test]
    fn session_id_overwrites_existing() {
        let mut analysis = sample();
        analysis.session_id = Some("stale".to_string());
        let response = AnalysisResponse::Success(analysis).with_session("fresh");
        let value: Value = serde_json::from_str(&response.to_json_line().unwrap()).unwrap();
        assert_eq!(value["session_id"], "fresh");
    }

    #[test]
    fn error_result_becomes_error_record() {
        let result: Result<FaceAnalysis, AnalysisError> =
            Err(AnalysisError::ImageLoad("cannot open image x.jpg".to_string()));
        let response = AnalysisResponse::from(result);
        assert!(response.is_error());
        let value: Value =
            serde_json::from_str(&response.with_session("s1").to_json_line().unwrap()).unwrap();
        assert_eq!(value["error"], "cannot open image x.jpg");
        assert_eq!(value["session_id"], "s1");
        assert!(value.get("emotion").is_none());
    }
}
