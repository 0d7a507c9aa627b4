//! Capture parameters and their discrete option lists
//!
//! Sensitivity, exposure time and aperture only ever take values from the
//! ordered lists below. Exposure compensation is stored in tenths of a stop so
//! that stepping and equality stay exact.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Selectable ISO sensitivities, ascending
pub const ISO_OPTIONS: &[u32] = &[50, 100, 200, 400, 800, 1600, 3200, 6400];

/// Selectable exposure times, fastest first
pub const SHUTTER_OPTIONS: &[&str] = &[
    "1/8000s", "1/4000s", "1/2000s", "1/1000s", "1/500s", "1/250s", "1/125s", "1/60s", "1/30s",
    "1/15s", "1/8s", "1/4s", "1/2s", "1s", "2s", "4s", "8s", "15s", "30s",
];

/// Selectable apertures, widest first
pub const APERTURE_OPTIONS: &[&str] = &[
    "f/1.4", "f/1.8", "f/2.0", "f/2.2", "f/2.8", "f/4.0", "f/5.6", "f/8.0", "f/11", "f/16",
];

/// Exposure compensation bound in tenths of a stop (±2.0 EV)
pub const EV_LIMIT_TENTHS: i8 = 20;

/// Number of exposure compensation steps (-2.0 ..= +2.0 at 0.1)
pub const EV_OPTION_COUNT: usize = (EV_LIMIT_TENTHS as usize) * 2 + 1;

/// Exposure compensation in tenths of a stop, always within ±2.0 EV
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(into = "f32", try_from = "f32")]
pub struct ExposureCompensation(i8);

impl ExposureCompensation {
    /// No compensation
    pub const ZERO: Self = Self(0);

    /// Create from tenths of a stop, clamping to ±2.0 EV
    pub const fn from_tenths(tenths: i8) -> Self {
        let clamped = if tenths > EV_LIMIT_TENTHS {
            EV_LIMIT_TENTHS
        } else if tenths < -EV_LIMIT_TENTHS {
            -EV_LIMIT_TENTHS
        } else {
            tenths
        };
        Self(clamped)
    }

    /// Value in tenths of a stop
    pub fn tenths(&self) -> i8 {
        self.0
    }

    /// Value in stops
    pub fn stops(&self) -> f32 {
        f32::from(self.0) / 10.0
    }

    /// Position in the EV option list (0 = -2.0)
    pub fn option_index(&self) -> usize {
        (self.0 + EV_LIMIT_TENTHS) as usize
    }

    /// Value at a position in the EV option list
    pub fn from_option_index(index: usize) -> Option<Self> {
        if index < EV_OPTION_COUNT {
            Some(Self(index as i8 - EV_LIMIT_TENTHS))
        } else {
            None
        }
    }
}

impl Display for ExposureCompensation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 > 0 {
            write!(f, "+{:.1}", self.stops())
        } else {
            write!(f, "{:.1}", self.stops())
        }
    }
}

impl From<ExposureCompensation> for f32 {
    fn from(ev: ExposureCompensation) -> Self {
        ev.stops()
    }
}

impl TryFrom<f32> for ExposureCompensation {
    type Error = String;

    fn try_from(stops: f32) -> Result<Self, Self::Error> {
        let tenths = (stops * 10.0).round();
        if !tenths.is_finite() || tenths.abs() > f32::from(EV_LIMIT_TENTHS) {
            return Err(format!("exposure compensation {} outside ±2.0", stops));
        }
        Ok(Self(tenths as i8))
    }
}

/// Focus strategy for a capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusMode {
    #[default]
    Auto,
    Face,
    Infinity,
    Macro,
    Continuous,
}

impl FocusMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FocusMode::Auto => "auto",
            FocusMode::Face => "face",
            FocusMode::Infinity => "infinity",
            FocusMode::Macro => "macro",
            FocusMode::Continuous => "continuous",
        }
    }
}

impl Display for FocusMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The parameter set currently governing capture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureParameters {
    /// ISO sensitivity, a member of [`ISO_OPTIONS`]
    pub iso: u32,
    /// Exposure time, a member of [`SHUTTER_OPTIONS`]
    pub shutter_speed: String,
    /// f-number, a member of [`APERTURE_OPTIONS`]
    pub aperture: String,
    /// Exposure compensation
    pub ev: ExposureCompensation,
    pub focus_mode: FocusMode,
    /// Wide dynamic range; `None` when the scene does not specify it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hdr: Option<bool>,
}

impl CaptureParameters {
    /// Read one adjustable parameter as a display string
    pub fn value_label(&self, kind: ParamKind) -> String {
        match kind {
            ParamKind::Iso => self.iso.to_string(),
            ParamKind::ShutterSpeed => self.shutter_speed.clone(),
            ParamKind::Aperture => self.aperture.clone(),
            ParamKind::ExposureCompensation => self.ev.to_string(),
        }
    }

    /// One-line summary, e.g. `ISO 200 · 1/250s · f/1.8 · EV +0.3 · face`
    pub fn summary(&self) -> String {
        let mut line = format!(
            "ISO {} · {} · {} · EV {} · {}",
            self.iso, self.shutter_speed, self.aperture, self.ev, self.focus_mode
        );
        if self.hdr == Some(true) {
            line.push_str(" · HDR");
        }
        line
    }
}

/// A manually adjustable parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    Iso,
    ShutterSpeed,
    Aperture,
    ExposureCompensation,
}

impl ParamKind {
    /// All adjustable parameters in display order
    pub const ALL: [ParamKind; 4] = [
        ParamKind::Iso,
        ParamKind::ShutterSpeed,
        ParamKind::Aperture,
        ParamKind::ExposureCompensation,
    ];

    /// Short label shown on the parameter strip
    pub fn label(&self) -> &'static str {
        match self {
            ParamKind::Iso => "ISO",
            ParamKind::ShutterSpeed => "Shutter",
            ParamKind::Aperture => "Aperture",
            ParamKind::ExposureCompensation => "EV",
        }
    }

    /// Number of values in this parameter's option list
    pub fn option_count(&self) -> usize {
        match self {
            ParamKind::Iso => ISO_OPTIONS.len(),
            ParamKind::ShutterSpeed => SHUTTER_OPTIONS.len(),
            ParamKind::Aperture => APERTURE_OPTIONS.len(),
            ParamKind::ExposureCompensation => EV_OPTION_COUNT,
        }
    }

    /// The option list rendered as display strings
    pub fn option_labels(&self) -> Vec<String> {
        match self {
            ParamKind::Iso => ISO_OPTIONS.iter().map(|v| v.to_string()).collect(),
            ParamKind::ShutterSpeed => SHUTTER_OPTIONS.iter().map(|v| v.to_string()).collect(),
            ParamKind::Aperture => APERTURE_OPTIONS.iter().map(|v| v.to_string()).collect(),
            ParamKind::ExposureCompensation => (0..EV_OPTION_COUNT)
                .filter_map(ExposureCompensation::from_option_index)
                .map(|ev| ev.to_string())
                .collect(),
        }
    }

    /// Index of the parameter's current value in its option list
    pub fn index_in(&self, params: &CaptureParameters) -> Option<usize> {
        match self {
            ParamKind::Iso => ISO_OPTIONS.iter().position(|v| *v == params.iso),
            ParamKind::ShutterSpeed => SHUTTER_OPTIONS
                .iter()
                .position(|v| *v == params.shutter_speed),
            ParamKind::Aperture => APERTURE_OPTIONS.iter().position(|v| *v == params.aperture),
            ParamKind::ExposureCompensation => Some(params.ev.option_index()),
        }
    }

    /// Write the option at `index` into `params`.
    ///
    /// Returns `false` (and leaves `params` untouched) when the index is out of range.
    pub fn write_index(&self, params: &mut CaptureParameters, index: usize) -> bool {
        match self {
            ParamKind::Iso => match ISO_OPTIONS.get(index) {
                Some(v) => params.iso = *v,
                None => return false,
            },
            ParamKind::ShutterSpeed => match SHUTTER_OPTIONS.get(index) {
                Some(v) => params.shutter_speed = v.to_string(),
                None => return false,
            },
            ParamKind::Aperture => match APERTURE_OPTIONS.get(index) {
                Some(v) => params.aperture = v.to_string(),
                None => return false,
            },
            ParamKind::ExposureCompensation => match ExposureCompensation::from_option_index(index)
            {
                Some(ev) => params.ev = ev,
                None => return false,
            },
        }
        true
    }
}

impl Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
