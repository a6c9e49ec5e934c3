use crate::profile::Profile;
use crate::profiles::ProfileList;
use crate::reconcile::{equals, is_feasible};
use crate::settings::{
    keybinding_key, SettingsStore, KEYBINDING_SLOTS, KEY_SHOW_DISPLAYS_SETTINGS,
    KEY_SHOW_MANAGER_SETTINGS, KEY_SHOW_PROFILE_DESCRIPTION,
};
use crate::snapshot::HardwareSnapshot;

pub const NO_PROFILES_LABEL: &str = "No Profiles Defined";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuOptions {
    pub show_profile_description: bool,
    pub show_displays_settings: bool,
    pub show_manager_settings: bool,
}

impl MenuOptions {
    pub fn from_settings<S: SettingsStore + ?Sized>(settings: &S) -> MenuOptions {
        MenuOptions {
            show_profile_description: settings.get_boolean(KEY_SHOW_PROFILE_DESCRIPTION),
            show_displays_settings: settings.get_boolean(KEY_SHOW_DISPLAYS_SETTINGS),
            show_manager_settings: settings.get_boolean(KEY_SHOW_MANAGER_SETTINGS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileItem {
    pub index: usize,
    pub label: String,
    /// Clickable; false when the profile's monitors are not all attached.
    pub reactive: bool,
    /// Matches the live layout (dot ornament).
    pub active: bool,
    /// Keybinding to register for this entry, if any.
    pub keybinding: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuItem {
    Profile(ProfileItem),
    Placeholder(String),
    Description(String),
    Separator,
    DisplaysSettings,
    ManagerSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Menu {
    /// Name of the first active profile, shown next to the submenu title.
    pub status: Option<String>,
    pub items: Vec<MenuItem>,
}

impl Menu {
    pub fn profile_items(&self) -> impl Iterator<Item = &ProfileItem> {
        self.items.iter().filter_map(|item| match item {
            MenuItem::Profile(profile) => Some(profile),
            _ => None,
        })
    }

    /// Keybindings to register, in slot order.
    pub fn keybindings(&self) -> Vec<(String, usize)> {
        self.profile_items()
            .filter_map(|item| item.keybinding.clone().map(|key| (key, item.index)))
            .collect()
    }
}

/// Lays out the profile menu. Without a snapshot nothing is reactive.
pub fn build_menu<H: HardwareSnapshot + ?Sized>(
    profiles: &ProfileList,
    current: Option<&Profile>,
    snapshot: Option<&H>,
    options: MenuOptions,
) -> Menu {
    let mut menu = Menu::default();
    if let (Some(current), Some(snapshot)) = (current, snapshot) {
        menu.status = profiles
            .first_active(current, snapshot)
            .and_then(|index| profiles.get(index))
            .map(|profile| profile.name.clone());
    }

    if profiles.is_empty() {
        menu.items
            .push(MenuItem::Placeholder(NO_PROFILES_LABEL.to_owned()));
    }

    for (index, profile) in profiles.iter().enumerate() {
        let reactive = snapshot.is_some_and(|snapshot| is_feasible(profile, snapshot));
        let active = reactive && current.is_some_and(|current| equals(profile, current));
        let keybinding = (reactive && index < KEYBINDING_SLOTS).then(|| keybinding_key(index + 1));
        menu.items.push(MenuItem::Profile(ProfileItem {
            index,
            label: profile.name.clone(),
            reactive,
            active,
            keybinding,
        }));
        if options.show_profile_description {
            menu.items.extend(
                profile
                    .summary_lines()
                    .into_iter()
                    .map(MenuItem::Description),
            );
        }
    }

    if options.show_displays_settings || options.show_manager_settings {
        menu.items.push(MenuItem::Separator);
    }
    if options.show_displays_settings {
        menu.items.push(MenuItem::DisplaysSettings);
    }
    if options.show_manager_settings {
        menu.items.push(MenuItem::ManagerSettings);
    }
    menu
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modes::Mode;
    use crate::monitor::{Crtc, Output};
    use crate::reconcile::current_profile;
    use crate::resources::Resources;

    fn snapshot() -> Resources {
        Resources::new(
            1,
            vec![Crtc {
                id: 0,
                x: 0,
                y: 0,
                mode: Some(1),
                transform: 0,
            }],
            vec![Output {
                id: 0,
                name: "eDP-1".into(),
                display_name: "Built-in".into(),
                connected: true,
                crtc: Some(0),
                possible_crtcs: vec![0],
                modes: vec![1],
                primary: true,
            }],
            vec![Mode::new(1, 1920, 1080, 60.0)],
        )
    }

    #[test]
    fn empty_list_shows_placeholder() {
        let menu = build_menu::<Resources>(&ProfileList::default(), None, None, MenuOptions::default());
        assert_eq!(
            menu.items,
            vec![MenuItem::Placeholder(NO_PROFILES_LABEL.to_owned())]
        );
        assert_eq!(menu.status, None);
    }

    #[test]
    fn marks_feasible_and_active_profiles() {
        let snapshot = snapshot();
        let current = current_profile(&snapshot);
        let mut laptop = current.clone();
        laptop.name = "Laptop".into();
        let mut again = current.clone();
        again.name = "Laptop again".into();
        let mut tv = current.clone();
        tv.name = "TV".into();
        tv.outputs[0].name = "HDMI-1".into();
        let profiles = ProfileList::new(vec![tv, laptop, again]);

        let options = MenuOptions {
            show_profile_description: true,
            show_displays_settings: true,
            show_manager_settings: false,
        };
        let menu = build_menu(&profiles, Some(&current), Some(&snapshot), options);

        assert_eq!(menu.status.as_deref(), Some("Laptop"));
        let items: Vec<_> = menu.profile_items().cloned().collect();
        assert!(!items[0].reactive && !items[0].active && items[0].keybinding.is_none());
        assert!(items[1].reactive && items[1].active);
        assert!(items[2].active);
        assert_eq!(
            menu.keybindings(),
            vec![
                ("keybinding-profile-2".to_owned(), 1),
                ("keybinding-profile-3".to_owned(), 2)
            ]
        );
        assert!(menu
            .items
            .contains(&MenuItem::Description("   Built-in - 1920x1080@60Hz".into())));
        assert_eq!(
            &menu.items[menu.items.len() - 2..],
            &[MenuItem::Separator, MenuItem::DisplaysSettings]
        );
    }

    #[test]
    fn only_nine_keybinding_slots() {
        let snapshot = snapshot();
        let current = current_profile(&snapshot);
        let profiles = ProfileList::new(vec![current.clone(); 12]);
        let menu = build_menu(&profiles, Some(&current), Some(&snapshot), MenuOptions::default());
        assert_eq!(menu.keybindings().len(), KEYBINDING_SLOTS);
        assert!(!menu.items.contains(&MenuItem::Separator));
    }

    #[test]
    fn nothing_reactive_without_snapshot() {
        let profiles = ProfileList::decode("A|||B");
        let menu = build_menu::<Resources>(&profiles, None, None, MenuOptions::default());
        assert!(menu.profile_items().all(|item| !item.reactive));
    }
}
