//! Snapshot over an object-style RandR screen, where each output reports its
//! own geometry and the screen reports whether it is cloned.
//!
//! That model has no user-visible CRTC table, so one slot is synthesized per
//! connected output: active outputs get a slot carrying their current
//! position, mode and rotation, connected but inactive ones a spare slot.
//! Any output may use any slot.

use crate::modes::Mode;
use crate::monitor::{Crtc, Output};
use crate::snapshot::HardwareSnapshot;
use crate::transform::TransformEncoding;

#[derive(Debug, Clone, PartialEq)]
pub struct RandrOutput {
    pub name: String,
    pub display_name: String,
    pub connected: bool,
    pub x: i32,
    pub y: i32,
    /// RandR rotation bit.
    pub rotation: u32,
    pub primary: bool,
    /// Id of the current mode; `None` when the output is switched off.
    pub current_mode: Option<u32>,
    pub modes: Vec<Mode>,
}

impl RandrOutput {
    pub fn is_active(&self) -> bool {
        self.connected && self.current_mode.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RandrScreen {
    timestamp: u32,
    clone: bool,
    crtcs: Vec<Crtc>,
    outputs: Vec<Output>,
    modes: Vec<Mode>,
}

impl RandrScreen {
    pub fn new(timestamp: u32, clone: bool, randr_outputs: Vec<RandrOutput>) -> RandrScreen {
        let mut modes: Vec<Mode> = Vec::new();
        for mode in randr_outputs.iter().flat_map(|o| o.modes.iter()) {
            if !modes.iter().any(|known| known.id == mode.id) {
                modes.push(mode.clone());
            }
        }

        let mut crtcs = Vec::new();
        let mut slots = Vec::with_capacity(randr_outputs.len());
        for output in &randr_outputs {
            if !output.connected {
                slots.push(None);
                continue;
            }
            let id = crtcs.len() as u32;
            let mut crtc = Crtc::new(id);
            crtc.transform = output.rotation;
            if output.is_active() {
                crtc.x = output.x;
                crtc.y = output.y;
                crtc.mode = output.current_mode;
                slots.push(Some(id));
            } else {
                slots.push(None);
            }
            crtcs.push(crtc);
        }

        let all_slots: Vec<u32> = crtcs.iter().map(|crtc| crtc.id).collect();
        let outputs = randr_outputs
            .into_iter()
            .zip(slots)
            .enumerate()
            .map(|(index, (output, crtc))| Output {
                id: index as u32,
                possible_crtcs: if output.connected {
                    all_slots.clone()
                } else {
                    Vec::new()
                },
                modes: output.modes.iter().map(|mode| mode.id).collect(),
                name: output.name,
                display_name: output.display_name,
                connected: output.connected,
                crtc,
                primary: output.primary,
            })
            .collect();

        RandrScreen {
            timestamp,
            clone,
            crtcs,
            outputs,
            modes,
        }
    }
}

impl HardwareSnapshot for RandrScreen {
    fn serial(&self) -> u32 {
        self.timestamp
    }

    fn crtcs(&self) -> &[Crtc] {
        &self.crtcs
    }

    fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    fn modes(&self) -> &[Mode] {
        &self.modes
    }

    fn transform_encoding(&self) -> TransformEncoding {
        TransformEncoding::Bitmask
    }

    fn clone_mode(&self) -> Option<bool> {
        Some(self.clone)
    }
}
