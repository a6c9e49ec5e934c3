use crate::profile::display_names_match;

/// A logical-monitor slot (CRTC) an output must be bound to in order to be driven.
#[derive(Debug, Clone, PartialEq)]
pub struct Crtc {
    pub id: u32,
    pub x: i32,
    pub y: i32,
    pub mode: Option<u32>,
    /// Backend transform code, see [`crate::snapshot::HardwareSnapshot::transform_encoding`].
    pub transform: u32,
}

impl Crtc {
    pub fn new(id: u32) -> Crtc {
        Crtc {
            id,
            x: 0,
            y: 0,
            mode: None,
            transform: 0,
        }
    }
}

/// A physical connector and what is plugged into it.
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    pub id: u32,
    /// Connector name, e.g. `HDMI-1`.
    pub name: String,
    /// Monitor name, e.g. `Dell U2415`.
    pub display_name: String,
    pub connected: bool,
    pub crtc: Option<u32>,
    pub possible_crtcs: Vec<u32>,
    pub modes: Vec<u32>,
    pub primary: bool,
}

impl Output {
    pub fn can_drive(&self, crtc: u32) -> bool {
        self.possible_crtcs.contains(&crtc)
    }

    pub fn matches_display_name(&self, display_name: &str) -> bool {
        display_names_match(&self.display_name, display_name)
    }
}
