//! Text encoding of profiles.
//!
//! A whole profile list lives in one settings string with three delimiter
//! levels:
//!
//! ```text
//! Office||false||eDP-1|Built-in|0|0|1920|1080|60|1|true|||Home||true||...
//! ```
//!
//! `|||` separates profiles, `||` separates the fields of a profile
//! (`name`, `clone`, then one field per output) and `|` separates the nine
//! properties of an output (`name`, `display name`, `x`, `y`, `width`,
//! `height`, `refresh rate`, `rotation`, `primary`).
//!
//! The pipe is reserved and never escaped. Names containing it, and empty
//! output names or display names, cannot be stored faithfully.
//!
//! Booleans decode as `true` only for the exact literal `true`; `True`, `1`
//! and the empty string are all `false`.

use log::warn;
use thiserror::Error;

use crate::profile::{OutputEntry, Profile};

pub const DELIMITER_PROFILES: &str = "|||";
pub const DELIMITER_FIELDS: &str = "||";
pub const DELIMITER_PROPERTIES: &str = "|";

const OUTPUT_PROPERTY_COUNT: usize = 9;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("output property {position} is not an integer: '{value}'")]
    InvalidInteger { position: usize, value: String },

    #[error("output entry has {found} properties, expected 9")]
    PropertyCount { found: usize },

    #[error("profile has no output at field {index}")]
    NoSuchOutput { index: usize },

    #[error("field {index} cannot hold a value of that kind")]
    FieldMismatch { index: usize },

    #[error("profile names must not contain '|'")]
    ReservedCharacter,

    #[error("output property {position} must not be empty")]
    EmptyProperty { position: usize },
}

/// A single decoded profile field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Name(String),
    Clone(bool),
    Output(OutputEntry),
}

fn decode_bool(raw: &str) -> bool {
    raw.trim() == "true"
}

fn decode_int(raw: &str, position: usize) -> Result<i32, CodecError> {
    raw.trim()
        .parse()
        .map_err(|_| CodecError::InvalidInteger {
            position,
            value: raw.to_owned(),
        })
}

/// Rejects profile names that would split into extra fields once stored.
pub fn check_name(name: &str) -> Result<(), CodecError> {
    if name.contains(DELIMITER_PROPERTIES) {
        return Err(CodecError::ReservedCharacter);
    }
    Ok(())
}

/// An empty string next to a `|` reads back as a `||` field break.
fn decode_text(raw: &str, position: usize) -> Result<String, CodecError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(CodecError::EmptyProperty { position });
    }
    Ok(text.to_owned())
}

fn decode_output(raw: &str) -> Result<OutputEntry, CodecError> {
    let properties: Vec<&str> = raw.split(DELIMITER_PROPERTIES).collect();
    if properties.len() != OUTPUT_PROPERTY_COUNT {
        return Err(CodecError::PropertyCount {
            found: properties.len(),
        });
    }
    Ok(OutputEntry {
        name: decode_text(properties[0], 0)?,
        display_name: decode_text(properties[1], 1)?,
        x: decode_int(properties[2], 2)?,
        y: decode_int(properties[3], 3)?,
        width: decode_int(properties[4], 4)?,
        height: decode_int(properties[5], 5)?,
        refresh_rate: decode_int(properties[6], 6)?,
        rotation: decode_int(properties[7], 7)?,
        primary: decode_bool(properties[8]),
    })
}

fn encode_output(entry: &OutputEntry) -> String {
    [
        entry.name.clone(),
        entry.display_name.clone(),
        entry.x.to_string(),
        entry.y.to_string(),
        entry.width.to_string(),
        entry.height.to_string(),
        entry.refresh_rate.to_string(),
        entry.rotation.to_string(),
        entry.primary.to_string(),
    ]
    .join(DELIMITER_PROPERTIES)
}

/// Decodes the field at `index` of a profile: 0 is the name, 1 the clone
/// flag, anything after that an output entry.
pub fn decode_field(raw: &str, index: usize) -> Result<Field, CodecError> {
    match index {
        0 => {
            let name = raw.trim();
            check_name(name)?;
            Ok(Field::Name(name.to_owned()))
        }
        1 => Ok(Field::Clone(decode_bool(raw))),
        _ => decode_output(raw).map(Field::Output),
    }
}

pub fn encode_field(field: &Field) -> String {
    match field {
        Field::Name(name) => name.clone(),
        Field::Clone(clone) => clone.to_string(),
        Field::Output(entry) => encode_output(entry),
    }
}

/// Decodes one profile, rejecting it on the first malformed field.
/// A missing clone field reads as `false`.
pub fn decode_profile(raw: &str) -> Result<Profile, CodecError> {
    let mut profile = Profile::default();
    if raw.is_empty() {
        return Ok(profile);
    }
    for (index, segment) in raw.split(DELIMITER_FIELDS).enumerate() {
        match decode_field(segment, index)? {
            Field::Name(name) => profile.name = name,
            Field::Clone(clone) => profile.clone = clone,
            Field::Output(entry) => profile.outputs.push(entry),
        }
    }
    Ok(profile)
}

pub fn encode_profile(profile: &Profile) -> String {
    let mut fields = Vec::with_capacity(profile.outputs.len() + 2);
    fields.push(profile.name.clone());
    fields.push(profile.clone.to_string());
    fields.extend(profile.outputs.iter().map(encode_output));
    fields.join(DELIMITER_FIELDS)
}

/// Decodes a profile list, skipping (and logging) profiles that fail to
/// decode so one damaged entry does not hide the others.
pub fn decode_profile_list(raw: &str) -> Vec<Profile> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(DELIMITER_PROFILES)
        .enumerate()
        .filter_map(|(position, segment)| match decode_profile(segment) {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!("Skipping stored profile #{}: {e}", position + 1);
                None
            }
        })
        .collect()
}

/// Like [`decode_profile_list`] but fails on the first malformed profile.
pub fn try_decode_profile_list(raw: &str) -> Result<Vec<Profile>, CodecError> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    raw.split(DELIMITER_PROFILES).map(decode_profile).collect()
}

pub fn encode_profile_list(profiles: &[Profile]) -> String {
    profiles
        .iter()
        .map(encode_profile)
        .collect::<Vec<_>>()
        .join(DELIMITER_PROFILES)
}
