use serde::Serialize;

/// The outcome of classifying one sampled frame.
///
/// Produced once per sampled frame and consumed immediately; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationResult {
    /// The engine has not finished initializing (or has not seen enough frames yet).
    NotReady,
    NoMotion,
    MotionDetected,
}

impl ClassificationResult {
    pub fn is_motion(self) -> bool {
        matches!(self, ClassificationResult::MotionDetected)
    }
}
