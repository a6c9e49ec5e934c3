use thiserror::Error;

use crate::codec::{self, CodecError};
use crate::profile::Profile;
use crate::reconcile::{equals, is_feasible};
use crate::snapshot::HardwareSnapshot;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileListError {
    #[error("no profile at position {0}")]
    OutOfRange(usize),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// The ordered profile list. Order is what the user sees in the menu and
/// what the keybinding slots follow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileList {
    profiles: Vec<Profile>,
}

impl ProfileList {
    pub fn new(profiles: Vec<Profile>) -> ProfileList {
        ProfileList { profiles }
    }

    pub fn decode(raw: &str) -> ProfileList {
        ProfileList::new(codec::decode_profile_list(raw))
    }

    pub fn encode(&self) -> String {
        codec::encode_profile_list(&self.profiles)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Profile> {
        self.profiles.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Profile> {
        self.profiles.iter()
    }

    /// Position of the first profile that is usable on `snapshot` and
    /// matches the live layout.
    pub fn first_active<H: HardwareSnapshot + ?Sized>(
        &self,
        current: &Profile,
        snapshot: &H,
    ) -> Option<usize> {
        self.profiles
            .iter()
            .position(|profile| is_feasible(profile, snapshot) && equals(profile, current))
    }

    pub fn add(&mut self, profile: Profile) {
        self.profiles.push(profile);
    }

    fn check(&self, index: usize) -> Result<(), ProfileListError> {
        if index < self.profiles.len() {
            Ok(())
        } else {
            Err(ProfileListError::OutOfRange(index))
        }
    }

    /// Swaps the profile with its predecessor.
    pub fn move_up(&mut self, index: usize) -> Result<(), ProfileListError> {
        self.check(index)?;
        if index == 0 {
            return Err(ProfileListError::OutOfRange(index));
        }
        self.profiles.swap(index, index - 1);
        Ok(())
    }

    /// Swaps the profile with its successor.
    pub fn move_down(&mut self, index: usize) -> Result<(), ProfileListError> {
        let next = index
            .checked_add(1)
            .ok_or(ProfileListError::OutOfRange(index))?;
        self.check(next)?;
        self.profiles.swap(index, next);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<Profile, ProfileListError> {
        self.check(index)?;
        Ok(self.profiles.remove(index))
    }

    /// Decodes one raw field and stores it in place, leaving every other
    /// field of the profile untouched.
    pub fn edit_field(
        &mut self,
        index: usize,
        field_index: usize,
        raw: &str,
    ) -> Result<(), ProfileListError> {
        let field = codec::decode_field(raw, field_index)?;
        let profile = self
            .profiles
            .get_mut(index)
            .ok_or(ProfileListError::OutOfRange(index))?;
        profile.set_field(field_index, field)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &ProfileList) -> Vec<&str> {
        list.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn reordering() {
        let mut list = ProfileList::decode("A|||B|||C");
        list.move_up(2).unwrap();
        assert_eq!(names(&list), ["A", "C", "B"]);
        list.move_down(0).unwrap();
        assert_eq!(names(&list), ["C", "A", "B"]);

        assert_eq!(list.move_up(0), Err(ProfileListError::OutOfRange(0)));
        assert_eq!(list.move_down(2), Err(ProfileListError::OutOfRange(3)));
        assert_eq!(names(&list), ["C", "A", "B"]);
    }

    #[test]
    fn moving_down_from_the_largest_index() {
        let mut list = ProfileList::decode("A|||B");
        assert_eq!(
            list.move_down(usize::MAX),
            Err(ProfileListError::OutOfRange(usize::MAX))
        );
        assert_eq!(names(&list), ["A", "B"]);
    }

    #[test]
    fn first_active_skips_unusable_and_different_layouts() {
        use crate::modes::Mode;
        use crate::monitor::{Crtc, Output};
        use crate::reconcile::current_profile;
        use crate::resources::Resources;

        let snapshot = Resources::new(
            3,
            vec![Crtc {
                id: 0,
                x: 0,
                y: 0,
                mode: Some(1),
                transform: 0,
            }],
            vec![Output {
                id: 1,
                name: "eDP-1".into(),
                display_name: "Built-in".into(),
                connected: true,
                crtc: Some(0),
                possible_crtcs: vec![0],
                modes: vec![1],
                primary: true,
            }],
            vec![Mode::new(1, 1920, 1080, 60.0)],
        );
        let current = current_profile(&snapshot);
        let mut list = ProfileList::decode(
            "Away||false||HDMI-1|TV|0|0|1920|1080|60|1|true\
             |||Shifted||false||eDP-1|Built-in|10|0|1920|1080|60|1|true",
        );
        assert_eq!(list.first_active(&current, &snapshot), None);

        let mut same = current.clone();
        same.name = "Laptop".into();
        list.add(same.clone());
        same.name = "Laptop again".into();
        list.add(same);
        assert_eq!(list.first_active(&current, &snapshot), Some(2));
    }

    #[test]
    fn edits_that_cannot_be_stored_are_rejected() {
        let mut list = ProfileList::decode("Desk||false||HDMI-1|TV|0|0|1280|720|60|1|true");
        assert_eq!(
            list.edit_field(0, 0, "x|"),
            Err(ProfileListError::Codec(CodecError::ReservedCharacter))
        );
        assert_eq!(
            list.edit_field(0, 2, "HDMI-1| |0|0|1280|720|60|1|true"),
            Err(ProfileListError::Codec(CodecError::EmptyProperty { position: 1 }))
        );
        assert_eq!(list.encode(), "Desk||false||HDMI-1|TV|0|0|1280|720|60|1|true");
    }

    #[test]
    fn removing() {
        let mut list = ProfileList::decode("A|||B");
        assert_eq!(list.remove(0).unwrap().name, "A");
        assert_eq!(names(&list), ["B"]);
        assert!(list.remove(1).is_err());
    }

    #[test]
    fn editing_a_field() {
        let mut list = ProfileList::decode("Desk||false||HDMI-1|TV|0|0|1280|720|60|1|true");
        list.edit_field(0, 0, "Couch").unwrap();
        list.edit_field(0, 1, "true").unwrap();
        assert_eq!(list.encode(), "Couch||true||HDMI-1|TV|0|0|1280|720|60|1|true");

        assert!(matches!(
            list.edit_field(0, 2, "HDMI-1|TV|0|0|wide|720|60|1|true"),
            Err(ProfileListError::Codec(CodecError::InvalidInteger { .. }))
        ));
        assert_eq!(list.edit_field(4, 0, "X"), Err(ProfileListError::OutOfRange(4)));
    }
}
