//! Composition overlay
//!
//! Grid lines and scene frames as normalized geometry (0.0..=1.0 of the
//! viewfinder). Drawing them is up to the frontend.

use crate::scene::catalog::SceneId;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

/// Composition grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridType {
    #[default]
    None,
    Thirds,
    Golden,
    Center,
}

/// A straight guide line in normalized coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GuideLine {
    /// Vertical line at this x
    Vertical(f32),
    /// Horizontal line at this y
    Horizontal(f32),
}

impl GridType {
    /// Next grid in the toggle cycle: none, thirds, golden, back to none.
    ///
    /// `Center` is only reachable by choosing it directly and cycles to none.
    pub fn next(self) -> Self {
        match self {
            GridType::None => GridType::Thirds,
            GridType::Thirds => GridType::Golden,
            GridType::Golden | GridType::Center => GridType::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GridType::None => "none",
            GridType::Thirds => "thirds",
            GridType::Golden => "golden",
            GridType::Center => "center",
        }
    }

    /// Lines making up this grid
    pub fn lines(&self) -> Vec<GuideLine> {
        let at = |positions: &[f32]| -> Vec<GuideLine> {
            positions
                .iter()
                .flat_map(|&p| [GuideLine::Vertical(p), GuideLine::Horizontal(p)])
                .collect()
        };
        match self {
            GridType::None => Vec::new(),
            GridType::Thirds => at(&[1.0 / 3.0, 2.0 / 3.0]),
            GridType::Golden => at(&[0.382, 0.618]),
            GridType::Center => at(&[0.5]),
        }
    }
}

impl Display for GridType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GridType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "off" => Ok(GridType::None),
            "thirds" => Ok(GridType::Thirds),
            "golden" => Ok(GridType::Golden),
            "center" => Ok(GridType::Center),
            other => Err(format!("unknown grid '{}'", other)),
        }
    }
}

/// Scene-specific auxiliary frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneFrame {
    /// Dashed oval where the face should sit
    FaceOval,
    /// Dashed circle around the focus point
    FocusCircle,
    /// Level line across the middle
    Horizon,
    /// Rectangle inset from the edges for page alignment
    DocumentRect,
    /// Motion cue in the center
    MotionCue,
    /// Four corner brackets around the center
    StabilityCorners,
}

impl SceneFrame {
    /// The frame drawn for a scene, if any
    pub fn for_scene(scene: SceneId) -> Option<Self> {
        match scene {
            SceneId::Auto => None,
            SceneId::Portrait => Some(SceneFrame::FaceOval),
            SceneId::Food | SceneId::Macro => Some(SceneFrame::FocusCircle),
            SceneId::Landscape => Some(SceneFrame::Horizon),
            SceneId::Document => Some(SceneFrame::DocumentRect),
            SceneId::Sport => Some(SceneFrame::MotionCue),
            SceneId::Night => Some(SceneFrame::StabilityCorners),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SceneFrame::FaceOval => "face oval",
            SceneFrame::FocusCircle => "focus circle",
            SceneFrame::Horizon => "horizon",
            SceneFrame::DocumentRect => "document frame",
            SceneFrame::MotionCue => "motion cue",
            SceneFrame::StabilityCorners => "stability corners",
        }
    }
}

impl Display for SceneFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
