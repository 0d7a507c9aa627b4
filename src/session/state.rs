//! Capture state container
//!
//! Everything the viewfinder shows lives in one `CaptureState`: the mode, the
//! scene, the active parameters, the manual focus, the visible hint, the grid,
//! the camera facing and the permission status. The session and the resolver
//! share it behind a mutex.

use crate::device::traits::FacingMode;
use crate::scene::catalog::SceneId;
use crate::scene::params::{CaptureParameters, ParamKind};
use crate::session::guidance::GuidancePresenter;
use crate::session::manual::ManualController;
use crate::session::overlay::GridType;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::sync::{Arc, Mutex, MutexGuard};

/// Who governs the capture parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraMode {
    /// Parameters follow the scene; the resolver may change the scene
    #[default]
    Automatic,
    /// Parameters are set by hand; the scene is frozen
    Manual,
}

impl CameraMode {
    pub fn toggled(&self) -> Self {
        match self {
            CameraMode::Automatic => CameraMode::Manual,
            CameraMode::Manual => CameraMode::Automatic,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CameraMode::Automatic => "automatic",
            CameraMode::Manual => "manual",
        }
    }
}

impl Display for CameraMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Camera permission as last observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    /// No stream has been requested yet
    #[default]
    Unknown,
    Granted,
    /// Blocking state, left only through a retry
    Denied,
    /// The stream died after access was granted; left through a retry
    Unavailable,
}

/// The explicit state container
#[derive(Debug, Default)]
pub struct CaptureState {
    mode: CameraMode,
    scene: SceneId,
    params: CaptureParameters,
    focused: Option<ParamKind>,
    guidance: GuidancePresenter,
    grid: GridType,
    facing: FacingMode,
    permission: PermissionState,
}

/// State shared between the session and its background tasks
pub type SharedState = Arc<Mutex<CaptureState>>;

/// Lock shared state, recovering from a poisoned lock
pub fn lock_state(state: &SharedState) -> MutexGuard<'_, CaptureState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

impl CaptureState {
    /// Automatic mode, `auto` scene, rear camera
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a given facing
    pub fn with_facing(facing: FacingMode) -> Self {
        Self {
            facing,
            ..Self::default()
        }
    }

    pub fn into_shared(self) -> SharedState {
        Arc::new(Mutex::new(self))
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn is_automatic(&self) -> bool {
        self.mode == CameraMode::Automatic
    }

    pub fn scene(&self) -> SceneId {
        self.scene
    }

    pub fn params(&self) -> &CaptureParameters {
        &self.params
    }

    pub fn focused(&self) -> Option<ParamKind> {
        self.focused
    }

    pub fn guidance(&self) -> &GuidancePresenter {
        &self.guidance
    }

    pub fn guidance_mut(&mut self) -> &mut GuidancePresenter {
        &mut self.guidance
    }

    pub fn grid(&self) -> GridType {
        self.grid
    }

    pub fn facing(&self) -> FacingMode {
        self.facing
    }

    pub fn permission(&self) -> PermissionState {
        self.permission
    }

    pub(crate) fn set_facing(&mut self, facing: FacingMode) {
        self.facing = facing;
    }

    pub(crate) fn set_permission(&mut self, permission: PermissionState) {
        self.permission = permission;
    }

    /// Switch between automatic and manual. Returns whether the mode changed.
    ///
    /// Either direction clears the manual focus. Returning to automatic
    /// restores the current scene's defaults.
    pub fn set_mode(&mut self, mode: CameraMode) -> bool {
        if self.mode == mode {
            return false;
        }
        info!("Camera mode: {} -> {}", self.mode, mode);
        self.mode = mode;
        self.focused = None;
        if mode == CameraMode::Automatic {
            self.params = self.scene.descriptor().default_params();
        }
        true
    }

    pub fn toggle_mode(&mut self) -> CameraMode {
        self.set_mode(self.mode.toggled());
        self.mode
    }

    /// Make `scene` current and, in automatic mode, load its defaults.
    ///
    /// Returns `false` without touching anything in manual mode, where the
    /// scene is frozen. Reapplies defaults even when the scene is unchanged.
    pub fn apply_scene(&mut self, scene: SceneId) -> bool {
        if !self.is_automatic() {
            debug!("Ignoring scene {} in manual mode", scene);
            return false;
        }
        if self.scene != scene {
            info!("Scene: {} -> {}", self.scene, scene);
        }
        self.scene = scene;
        self.params = scene.descriptor().default_params();
        true
    }

    /// Manual adjustment access, `None` outside manual mode
    pub fn manual(&mut self) -> Option<ManualController<'_>> {
        match self.mode {
            CameraMode::Manual => Some(ManualController::new(&mut self.params, &mut self.focused)),
            CameraMode::Automatic => None,
        }
    }

    pub fn set_grid(&mut self, grid: GridType) {
        self.grid = grid;
    }

    /// Advance the grid toggle and return the new grid
    pub fn cycle_grid(&mut self) -> GridType {
        self.grid = self.grid.next();
        self.grid
    }

    /// One-line status under the shutter
    pub fn status_line(&self) -> String {
        match (self.mode, self.focused) {
            (CameraMode::Automatic, _) => format!("Scene: {}", self.scene.descriptor().name),
            (CameraMode::Manual, None) => "Tap a parameter to adjust".to_string(),
            (CameraMode::Manual, Some(kind)) => format!("Slide to adjust {}", kind.label()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene_defaults(state: &CaptureState) -> CaptureParameters {
        state.scene().descriptor().default_params()
    }

    #[test]
    fn test_new_state_is_automatic_auto() {
        let state = CaptureState::new();
        assert_eq!(state.mode(), CameraMode::Automatic);
        assert_eq!(state.scene(), SceneId::Auto);
        assert_eq!(state.params(), &scene_defaults(&state));
        assert_eq!(state.facing(), FacingMode::Environment);
        assert_eq!(state.status_line(), "Scene: Smart Auto");
    }

    #[test]
    fn test_manual_round_trip_restores_defaults() {
        let mut state = CaptureState::new();
        state.apply_scene(SceneId::Food);
        state.set_mode(CameraMode::Manual);
        {
            let mut manual = state.manual().unwrap();
            manual.select(ParamKind::Iso);
            manual.step(2);
            manual.select(ParamKind::Aperture);
            manual.step(-1);
        }
        assert_ne!(state.params(), &scene_defaults(&state));
        assert_eq!(state.status_line(), "Slide to adjust Aperture");

        state.set_mode(CameraMode::Automatic);
        assert_eq!(state.params(), &scene_defaults(&state));
        assert_eq!(state.scene(), SceneId::Food);
        assert_eq!(state.focused(), None);
    }

    #[test]
    fn test_manual_controller_only_in_manual_mode() {
        let mut state = CaptureState::new();
        assert!(state.manual().is_none());
        assert_eq!(state.toggle_mode(), CameraMode::Manual);
        assert!(state.manual().is_some());
        assert_eq!(state.status_line(), "Tap a parameter to adjust");
    }

    #[test]
    fn test_scene_frozen_in_manual_mode() {
        let mut state = CaptureState::new();
        state.set_mode(CameraMode::Manual);
        assert!(!state.apply_scene(SceneId::Night));
        assert_eq!(state.scene(), SceneId::Auto);
    }

    #[test]
    fn test_toggling_clears_focus() {
        let mut state = CaptureState::new();
        state.set_mode(CameraMode::Manual);
        state.manual().unwrap().select(ParamKind::ShutterSpeed);
        assert_eq!(state.focused(), Some(ParamKind::ShutterSpeed));
        state.toggle_mode();
        state.toggle_mode();
        assert_eq!(state.focused(), None);
    }

    #[test]
    fn test_grid_cycles() {
        let mut state = CaptureState::new();
        assert_eq!(state.cycle_grid(), GridType::Thirds);
        assert_eq!(state.cycle_grid(), GridType::Golden);
        assert_eq!(state.cycle_grid(), GridType::None);
    }
}
