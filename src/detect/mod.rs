mod backend;
mod backends;
mod result;

pub use backend::{EmotionClassifier, LandmarkExtractor, ModelProvider};
pub use backends::{ConfiguredModels, StubEmotionClassifier, StubLandmarkExtractor};
pub use result::{
    EmotionResult, FaceLandmarks, GazeLandmarks, Point, EMOTION_LABELS, LEFT_EYE_OUTER,
    NOSE_TIP, RIGHT_EYE_OUTER,
};

#[cfg(feature = "backend-tract")]
pub use backends::{TractEmotionClassifier, TractFaceMesh};
