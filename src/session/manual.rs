//! Manual adjustment controller
//!
//! While manual mode is on, one parameter at a time can be focused and moved
//! through its discrete option list, either by steps or by absolute index.
//! Steps clamp at the ends of the list; absolute indices outside it are
//! ignored. Every change is written straight into the active parameters.

use crate::scene::params::{CaptureParameters, ParamKind};
use log::debug;

/// Borrowed view over the parameter state, only handed out in manual mode
#[derive(Debug)]
pub struct ManualController<'a> {
    params: &'a mut CaptureParameters,
    focused: &'a mut Option<ParamKind>,
}

impl<'a> ManualController<'a> {
    pub(crate) fn new(params: &'a mut CaptureParameters, focused: &'a mut Option<ParamKind>) -> Self {
        Self { params, focused }
    }

    /// Option list of a parameter, formatted for display
    pub fn options(&self, kind: ParamKind) -> Vec<String> {
        kind.option_labels()
    }

    /// Position of the parameter's current value, `None` if not a list member
    pub fn current_index(&self, kind: ParamKind) -> Option<usize> {
        kind.index_in(self.params)
    }

    /// Focus a parameter, replacing any previous focus
    pub fn select(&mut self, kind: ParamKind) {
        debug!("Manual focus: {}", kind);
        *self.focused = Some(kind);
    }

    /// Close the adjustment panel
    pub fn deselect(&mut self) {
        *self.focused = None;
    }

    pub fn focused(&self) -> Option<ParamKind> {
        *self.focused
    }

    /// Move the focused parameter by `delta` positions, clamped to the list.
    ///
    /// Does nothing without a focused parameter or when its current value is
    /// not in the option list. Returns whether the value changed.
    pub fn step(&mut self, delta: i32) -> bool {
        let Some(kind) = *self.focused else {
            return false;
        };
        let Some(current) = kind.index_in(self.params) else {
            return false;
        };
        let last = kind.option_count().saturating_sub(1) as i64;
        let target = (current as i64 + i64::from(delta)).clamp(0, last) as usize;
        if target == current {
            return false;
        }
        kind.write_index(self.params, target)
    }

    /// Set the focused parameter to the option at `index`.
    ///
    /// Out-of-range indices are ignored. Returns whether the value changed.
    pub fn set_by_index(&mut self, index: usize) -> bool {
        let Some(kind) = *self.focused else {
            return false;
        };
        if kind.index_in(self.params) == Some(index) {
            return false;
        }
        kind.write_index(self.params, index)
    }

    /// Current value of a parameter as shown on the strip (EV carries a sign)
    pub fn value_label(&self, kind: ParamKind) -> String {
        self.params.value_label(kind)
    }

    pub fn params(&self) -> &CaptureParameters {
        self.params
    }
}
