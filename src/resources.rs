use std::collections::HashMap;

use zvariant::{OwnedValue, Value};

use crate::modes::Mode;
use crate::monitor::{Crtc, Output};
use crate::snapshot::HardwareSnapshot;
use crate::transform::TransformEncoding;

/// `(id, winsys_id, x, y, width, height, current_mode, current_transform, transforms, properties)`
pub type CrtcWire = (
    u32,
    i64,
    i32,
    i32,
    i32,
    i32,
    i32,
    u32,
    Vec<u32>,
    HashMap<String, OwnedValue>,
);

/// `(id, winsys_id, current_crtc, possible_crtcs, name, modes, clones, properties)`
pub type OutputWire = (
    u32,
    i64,
    i32,
    Vec<u32>,
    String,
    Vec<u32>,
    Vec<u32>,
    HashMap<String, OwnedValue>,
);

/// `(id, winsys_id, width, height, refresh_rate)`
pub type ModeWire = (u32, i64, u32, u32, f64);

/// Reply of `org.gnome.Mutter.DisplayConfig.GetResources`.
pub type ResourcesWire = (u32, Vec<CrtcWire>, Vec<OutputWire>, Vec<ModeWire>, i32, i32);

/// Snapshot built from the raw resource tables of Mutter's DisplayConfig interface.
#[derive(Debug, Clone, PartialEq)]
pub struct Resources {
    serial: u32,
    crtcs: Vec<Crtc>,
    outputs: Vec<Output>,
    modes: Vec<Mode>,
}

fn string_property(properties: &HashMap<String, OwnedValue>, key: &str) -> Option<String> {
    match properties.get(key).map(|value| &**value) {
        Some(Value::Str(s)) => Some(s.as_str().to_owned()),
        _ => None,
    }
}

fn bool_property(properties: &HashMap<String, OwnedValue>, key: &str) -> Option<bool> {
    match properties.get(key).map(|value| &**value) {
        Some(Value::Bool(b)) => Some(*b),
        _ => None,
    }
}

/// Mutter uses `-1` for "no CRTC" / "no mode".
fn optional_id(raw: i32) -> Option<u32> {
    u32::try_from(raw).ok()
}

impl Resources {
    pub fn new(serial: u32, crtcs: Vec<Crtc>, outputs: Vec<Output>, modes: Vec<Mode>) -> Resources {
        Resources {
            serial,
            crtcs,
            outputs,
            modes,
        }
    }

    pub fn from_wire(wire: ResourcesWire) -> Resources {
        let (serial, crtcs, outputs, modes, _max_width, _max_height) = wire;
        let crtcs = crtcs
            .into_iter()
            .map(|(id, _, x, y, _, _, mode, transform, _, _)| Crtc {
                id,
                x,
                y,
                mode: optional_id(mode),
                transform,
            })
            .collect();
        let outputs = outputs
            .into_iter()
            .map(
                |(id, _, crtc, possible_crtcs, name, modes, _, properties)| Output {
                    id,
                    display_name: string_property(&properties, "display-name")
                        .unwrap_or_else(|| name.clone()),
                    primary: bool_property(&properties, "primary").unwrap_or(false),
                    name,
                    connected: true,
                    crtc: optional_id(crtc),
                    possible_crtcs,
                    modes,
                },
            )
            .collect();
        let modes = modes
            .into_iter()
            .map(|(id, _, width, height, refresh_rate)| {
                Mode::new(id, width as i32, height as i32, refresh_rate)
            })
            .collect();
        Resources {
            serial,
            crtcs,
            outputs,
            modes,
        }
    }
}

impl HardwareSnapshot for Resources {
    fn serial(&self) -> u32 {
        self.serial
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
        TransformEncoding::Ordinal
    }
}
