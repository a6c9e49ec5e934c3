/// A timing mode as reported by the display backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Mode {
    pub id: u32,
    pub width: i32,
    pub height: i32,
    pub refresh_rate: f64,
}

impl Mode {
    pub fn new(id: u32, width: i32, height: i32, refresh_rate: f64) -> Mode {
        Mode {
            id,
            width,
            height,
            refresh_rate,
        }
    }

    /// Refresh rate at the whole-Hz precision profiles store.
    pub fn rounded_refresh(&self) -> i32 {
        self.refresh_rate.round() as i32
    }

    pub fn matches(&self, width: i32, height: i32, refresh_rate: i32) -> bool {
        self.width == width && self.height == height && self.rounded_refresh() == refresh_rate
    }

    pub fn same_timing(&self, other: &Mode) -> bool {
        self.matches(other.width, other.height, other.rounded_refresh())
    }
}

/// First mode in table order that is listed in `compatible` and matches the
/// requested geometry exactly.
pub fn find_mode<'a>(
    modes: &'a [Mode],
    compatible: &[u32],
    width: i32,
    height: i32,
    refresh_rate: i32,
) -> Option<&'a Mode> {
    modes
        .iter()
        .find(|mode| compatible.contains(&mode.id) && mode.matches(width, height, refresh_rate))
}
