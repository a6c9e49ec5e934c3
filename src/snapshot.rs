use std::fmt::Debug;

use crate::modes::Mode;
use crate::monitor::{Crtc, Output};
use crate::transform::TransformEncoding;

/// A point-in-time view of the display hardware.
///
/// Backends expose the same three tables (slots, outputs, modes) whatever
/// their native protocol looks like, so reconciliation is written once.
pub trait HardwareSnapshot: Debug {
    /// Generation token the backend uses to reject stale apply requests.
    fn serial(&self) -> u32;

    fn crtcs(&self) -> &[Crtc];

    fn outputs(&self) -> &[Output];

    fn modes(&self) -> &[Mode];

    fn transform_encoding(&self) -> TransformEncoding;

    /// Whether the backend itself reports a cloned layout. `None` means the
    /// clone state has to be inferred from geometry.
    fn clone_mode(&self) -> Option<bool> {
        None
    }

    fn crtc(&self, id: u32) -> Option<&Crtc> {
        self.crtcs().iter().find(|crtc| crtc.id == id)
    }

    fn mode(&self, id: u32) -> Option<&Mode> {
        self.modes().iter().find(|mode| mode.id == id)
    }

    fn output_by_name(&self, name: &str) -> Option<&Output> {
        self.outputs().iter().find(|output| output.name == name)
    }
}
