//! Matching stored profiles against live hardware.

use std::cmp::Ordering;

use thiserror::Error;

use crate::modes::{find_mode, Mode};
use crate::monitor::{Crtc, Output};
use crate::profile::{OutputEntry, Profile, PROFILE_ROTATION_ENCODING};
use crate::snapshot::HardwareSnapshot;
use crate::transform::Rotation;

/// Name given to a profile synthesized from the live layout.
pub const CURRENT_PROFILE_NAME: &str = "Unnamed";

/// Reasons a profile cannot be mapped onto the attached hardware.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    #[error("profile needs {required} outputs but only {available} logical monitors (CRTCs) exist")]
    TooManyOutputs { required: usize, available: usize },

    #[error("no free logical monitor (CRTC) can drive output {output}")]
    NoCompatibleCrtc { output: String },

    #[error("output {output} has no mode {width}x{height}@{refresh_rate}Hz")]
    NoMatchingMode {
        output: String,
        width: i32,
        height: i32,
        refresh_rate: i32,
    },
}

/// One CRTC to program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrtcAssignment {
    pub crtc: u32,
    pub mode: u32,
    pub x: i32,
    pub y: i32,
    /// In the backend's transform vocabulary.
    pub transform: u32,
    pub outputs: Vec<u32>,
}

/// Per-output settings. `primary: None` leaves the output as it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputAssignment {
    pub output: u32,
    pub primary: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyRequest {
    pub serial: u32,
    pub persistent: bool,
    pub crtcs: Vec<CrtcAssignment>,
    pub outputs: Vec<OutputAssignment>,
}

struct ActiveOutput<'a> {
    output: &'a Output,
    crtc: &'a Crtc,
    mode: &'a Mode,
}

fn active_outputs<H: HardwareSnapshot + ?Sized>(snapshot: &H) -> Vec<ActiveOutput<'_>> {
    snapshot
        .outputs()
        .iter()
        .filter(|output| output.connected)
        .filter_map(|output| {
            let crtc = snapshot.crtc(output.crtc?)?;
            let mode = snapshot.mode(crtc.mode?)?;
            Some(ActiveOutput { output, crtc, mode })
        })
        .collect()
}

fn infer_clone(active: &[ActiveOutput<'_>]) -> bool {
    let Some(first) = active.first() else {
        return false;
    };
    active.len() >= 2
        && active.iter().all(|a| {
            a.crtc.x == 0 && a.crtc.y == 0 && a.mode.same_timing(first.mode)
        })
}

/// Describes the live layout as a profile.
///
/// If no output claims to be primary the first one is marked primary, so a
/// stored profile (which always has one) can still compare equal.
pub fn current_profile<H: HardwareSnapshot + ?Sized>(snapshot: &H) -> Profile {
    let active = active_outputs(snapshot);
    let encoding = snapshot.transform_encoding();

    let mut outputs: Vec<OutputEntry> = active
        .iter()
        .map(|a| OutputEntry {
            name: a.output.name.clone(),
            display_name: a.output.display_name.clone(),
            x: a.crtc.x,
            y: a.crtc.y,
            width: a.mode.width,
            height: a.mode.height,
            refresh_rate: a.mode.rounded_refresh(),
            rotation: Rotation::translate(a.crtc.transform, encoding, PROFILE_ROTATION_ENCODING)
                as i32,
            primary: a.output.primary,
        })
        .collect();

    if !outputs.iter().any(|entry| entry.primary) {
        if let Some(first) = outputs.first_mut() {
            first.primary = true;
        }
    }

    Profile {
        name: CURRENT_PROFILE_NAME.to_owned(),
        clone: snapshot
            .clone_mode()
            .unwrap_or_else(|| infer_clone(&active)),
        outputs,
    }
}

/// Whether every output the profile names is attached and shows the same monitor.
/// Attached outputs the profile does not mention are ignored.
pub fn is_feasible<H: HardwareSnapshot + ?Sized>(profile: &Profile, snapshot: &H) -> bool {
    profile.outputs.iter().all(|entry| {
        snapshot
            .output_by_name(&entry.name)
            .is_some_and(|output| output.connected && output.matches_display_name(&entry.display_name))
    })
}

fn by_name(a: &&OutputEntry, b: &&OutputEntry) -> Ordering {
    a.name.cmp(&b.name)
}

/// Layout equality: clone flag and outputs, ignoring profile names and output order.
pub fn equals(a: &Profile, b: &Profile) -> bool {
    if a.clone != b.clone || a.outputs.len() != b.outputs.len() {
        return false;
    }
    let mut left: Vec<&OutputEntry> = a.outputs.iter().collect();
    let mut right: Vec<&OutputEntry> = b.outputs.iter().collect();
    left.sort_by(by_name);
    right.sort_by(by_name);
    left.iter().zip(&right).all(|(l, r)| l.same_as(r))
}

/// Maps a profile onto the snapshot's outputs, slots and modes.
///
/// Outputs the profile does not mention are passed through untouched and keep
/// the slot they currently hold. Each profile output takes the first free
/// slot, in snapshot order, that it can drive, and the first compatible mode with the exact size and rounded
/// refresh rate. Nothing partial is ever returned.
pub fn build_apply_request<H: HardwareSnapshot + ?Sized>(
    profile: &Profile,
    snapshot: &H,
) -> Result<ApplyRequest, ReconcileError> {
    let crtcs = snapshot.crtcs();
    if profile.outputs.len() > crtcs.len() {
        return Err(ReconcileError::TooManyOutputs {
            required: profile.outputs.len(),
            available: crtcs.len(),
        });
    }

    let encoding = snapshot.transform_encoding();
    let used_by_passthrough = |crtc: &Crtc| {
        snapshot.outputs().iter().any(|output| {
            output.connected
                && output.crtc == Some(crtc.id)
                && profile.output(&output.name).is_none()
        })
    };
    let mut used: Vec<bool> = crtcs.iter().map(used_by_passthrough).collect();
    let mut crtc_assignments = Vec::new();
    let mut output_assignments = Vec::new();

    for output in snapshot.outputs() {
        let Some(entry) = profile.output(&output.name) else {
            output_assignments.push(OutputAssignment {
                output: output.id,
                primary: None,
            });
            continue;
        };

        let (slot, crtc) = crtcs
            .iter()
            .enumerate()
            .find(|(slot, crtc)| !used[*slot] && output.can_drive(crtc.id))
            .ok_or_else(|| ReconcileError::NoCompatibleCrtc {
                output: output.name.clone(),
            })?;
        used[slot] = true;

        let mode = find_mode(
            snapshot.modes(),
            &output.modes,
            entry.width,
            entry.height,
            entry.refresh_rate,
        )
        .ok_or_else(|| ReconcileError::NoMatchingMode {
            output: output.name.clone(),
            width: entry.width,
            height: entry.height,
            refresh_rate: entry.refresh_rate,
        })?;

        crtc_assignments.push(CrtcAssignment {
            crtc: crtc.id,
            mode: mode.id,
            x: entry.x,
            y: entry.y,
            transform: entry.rotation().code(encoding),
            outputs: vec![output.id],
        });
        output_assignments.push(OutputAssignment {
            output: output.id,
            primary: Some(entry.primary),
        });
    }

    Ok(ApplyRequest {
        serial: snapshot.serial(),
        persistent: true,
        crtcs: crtc_assignments,
        outputs: output_assignments,
    })
}
