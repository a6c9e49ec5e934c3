use crate::codec::{CodecError, Field};
use crate::transform::{Rotation, TransformEncoding};

/// Rotation codes inside a stored profile are RandR rotation bits.
pub const PROFILE_ROTATION_ENCODING: TransformEncoding = TransformEncoding::Bitmask;

/// One monitor's placement inside a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputEntry {
    /// Connector name, e.g. `eDP-1`. Unique within a profile.
    pub name: String,
    pub display_name: String,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub refresh_rate: i32,
    /// Raw rotation code, kept verbatim so unknown codes round-trip.
    pub rotation: i32,
    pub primary: bool,
}

impl OutputEntry {
    pub fn rotation(&self) -> Rotation {
        u32::try_from(self.rotation)
            .ok()
            .and_then(|code| Rotation::from_code(PROFILE_ROTATION_ENCODING, code))
            .unwrap_or_default()
    }

    /// Field-for-field equality with the display name compared case-insensitively.
    pub fn same_as(&self, other: &OutputEntry) -> bool {
        self.name == other.name
            && display_names_match(&self.display_name, &other.display_name)
            && self.x == other.x
            && self.y == other.y
            && self.width == other.width
            && self.height == other.height
            && self.refresh_rate == other.refresh_rate
            && self.rotation == other.rotation
            && self.primary == other.primary
    }

    pub fn summary(&self, clone: bool) -> String {
        let mut line = format!(
            "   {} - {}x{}@{}Hz",
            self.display_name, self.width, self.height, self.refresh_rate
        );
        if clone {
            line.push_str(" (Cloned)");
        }
        line
    }
}

pub(crate) fn display_names_match(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// A named monitor layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub clone: bool,
    pub outputs: Vec<OutputEntry>,
}

impl Profile {
    pub fn new(name: impl Into<String>) -> Profile {
        Profile {
            name: name.into(),
            ..Profile::default()
        }
    }

    pub fn output(&self, name: &str) -> Option<&OutputEntry> {
        self.outputs.iter().find(|entry| entry.name == name)
    }

    pub fn summary_lines(&self) -> Vec<String> {
        self.outputs
            .iter()
            .map(|entry| entry.summary(self.clone))
            .collect()
    }

    /// Replaces one field in place. Index 0 is the name, 1 the clone flag and
    /// `2 + n` the n-th output.
    pub fn set_field(&mut self, index: usize, field: Field) -> Result<(), CodecError> {
        match (index, field) {
            (0, Field::Name(name)) => self.name = name,
            (1, Field::Clone(clone)) => self.clone = clone,
            (i, Field::Output(entry)) if i >= 2 => {
                let slot = self
                    .outputs
                    .get_mut(i - 2)
                    .ok_or(CodecError::NoSuchOutput { index: i })?;
                *slot = entry;
            }
            (i, _) => return Err(CodecError::FieldMismatch { index: i }),
        }
        Ok(())
    }
}
