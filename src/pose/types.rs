use crate::recorder::error::TrackerError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A named landmark with its estimated screen position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub name: String,
    pub x: f64,
    pub y: f64,
    #[serde(alias = "score", default)]
    pub confidence: f64,
}

impl Keypoint {
    pub fn new(name: impl Into<String>, x: f64, y: f64, confidence: f64) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            confidence,
        }
    }
}

/// All keypoints of one detected person, in model order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub keypoints: Vec<Keypoint>,
}

impl Pose {
    pub fn new(keypoints: Vec<Keypoint>) -> Self {
        Self { keypoints }
    }

    /// First keypoint whose name matches exactly
    pub fn find(&self, name: &str) -> Option<&Keypoint> {
        self.keypoints.iter().find(|keypoint| keypoint.name == name)
    }
}

/// Options passed to the estimator on every tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimationOptions {
    pub flip_horizontal: bool,
    pub max_poses: usize,
}

impl Default for EstimationOptions {
    fn default() -> Self {
        Self {
            flip_horizontal: false,
            max_poses: 1,
        }
    }
}

/// Body landmarks the user can choose to record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Landmark {
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
}

impl Landmark {
    pub const ALL: [Landmark; 6] = [
        Landmark::LeftShoulder,
        Landmark::RightShoulder,
        Landmark::LeftElbow,
        Landmark::RightElbow,
        Landmark::LeftWrist,
        Landmark::RightWrist,
    ];

    /// Keypoint name as emitted by the estimator
    pub fn as_str(&self) -> &'static str {
        match self {
            Landmark::LeftShoulder => "left_shoulder",
            Landmark::RightShoulder => "right_shoulder",
            Landmark::LeftElbow => "left_elbow",
            Landmark::RightElbow => "right_elbow",
            Landmark::LeftWrist => "left_wrist",
            Landmark::RightWrist => "right_wrist",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Landmark::LeftShoulder => "Left Shoulder",
            Landmark::RightShoulder => "Right Shoulder",
            Landmark::LeftElbow => "Left Elbow",
            Landmark::RightElbow => "Right Elbow",
            Landmark::LeftWrist => "Left Wrist",
            Landmark::RightWrist => "Right Wrist",
        }
    }

    /// Parse user input where the empty string means "nothing selected"
    pub fn parse_selection(value: &str) -> Result<Option<Landmark>, TrackerError> {
        if value.is_empty() {
            return Ok(None);
        }
        value.parse().map(Some)
    }
}

impl FromStr for Landmark {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Landmark::ALL
            .iter()
            .copied()
            .find(|landmark| landmark.as_str() == s)
            .ok_or_else(|| TrackerError::UnknownLandmark(s.to_string()))
    }
}

impl std::fmt::Display for Landmark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
