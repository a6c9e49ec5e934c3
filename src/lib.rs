pub mod codec;
pub mod dbus;
pub mod menu;
pub mod modes;
pub mod monitor;
pub mod profile;
pub mod profiles;
pub mod reconcile;
pub mod resources;
pub mod screen;
pub mod settings;
pub mod snapshot;
pub mod transform;

use std::fmt::Display;

use log::{debug, error, info, warn};
use thiserror::Error;

use codec::{check_name, decode_profile, encode_profile};
use menu::{build_menu, Menu, MenuOptions};
use profile::Profile;
use profiles::{ProfileList, ProfileListError};
use reconcile::{
    build_apply_request, current_profile, equals, is_feasible, ApplyRequest, ReconcileError,
};
use settings::{
    SettingsError, SettingsStore, KEY_CURRENT_PROFILE, KEY_EXPERT_MODE, KEY_PROFILES,
};
use snapshot::HardwareSnapshot;

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("display resources have not been loaded yet")]
    NoSnapshot,

    #[error("no profile at position {0}")]
    NoSuchProfile(usize),

    #[error("profile '{0}' does not match the attached monitors")]
    Infeasible(String),

    #[error("a configuration change is already in progress")]
    ApplyInFlight,

    #[error("the current layout is not known")]
    NoCurrentProfile,

    #[error("raw field edits require expert mode")]
    ExpertModeRequired,

    #[error("the current layout is already saved as '{0}'")]
    Duplicate(String),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error(transparent)]
    List(#[from] ProfileListError),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Errors surfaced to the binary.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Manager(#[from] ManagerError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("D-Bus error: {0}")]
    DBus(#[from] zbus::Error),
}

/// Last known profile list and hardware state. Both are replaced wholesale
/// by their refresh handlers.
#[derive(Debug, Default)]
pub struct ProfileCache {
    pub profiles: ProfileList,
    pub snapshot: Option<Box<dyn HardwareSnapshot + Send>>,
    pub current: Option<Profile>,
}

/// Keeps the cache in sync with settings and hardware, and turns user
/// activations into apply requests, one at a time.
#[derive(Debug)]
pub struct ProfileManager<S: SettingsStore> {
    settings: S,
    cache: ProfileCache,
    /// Serial of the apply request awaiting a backend reply.
    pending: Option<u32>,
}

impl<S: SettingsStore> ProfileManager<S> {
    pub fn new(settings: S) -> ProfileManager<S> {
        let mut manager = ProfileManager {
            settings,
            cache: ProfileCache::default(),
            pending: None,
        };
        manager.on_settings_changed();
        manager
    }

    pub fn settings(&self) -> &S {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut S {
        &mut self.settings
    }

    pub fn cache(&self) -> &ProfileCache {
        &self.cache
    }

    pub fn profiles(&self) -> &ProfileList {
        &self.cache.profiles
    }

    pub fn current_profile(&self) -> Option<&Profile> {
        self.cache.current.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Re-reads the profile list from settings.
    pub fn on_settings_changed(&mut self) {
        self.cache.profiles = ProfileList::decode(&self.settings.get_string(KEY_PROFILES));
        debug!("Loaded {} profiles", self.cache.profiles.len());
    }

    /// Replaces the hardware snapshot and publishes the live layout to the
    /// `current-profile` key when it changed.
    pub fn on_monitors_changed(
        &mut self,
        snapshot: Box<dyn HardwareSnapshot + Send>,
    ) -> Result<(), ManagerError> {
        let current = current_profile(&*snapshot);
        info!(
            "Monitors changed: serial {}, {} active outputs",
            snapshot.serial(),
            current.outputs.len()
        );
        let encoded = encode_profile(&current);
        if encoded != self.settings.get_string(KEY_CURRENT_PROFILE) {
            self.settings.set_string(KEY_CURRENT_PROFILE, &encoded)?;
        }
        self.cache.snapshot = Some(snapshot);
        self.cache.current = Some(current);
        Ok(())
    }

    pub fn menu(&self) -> Menu {
        build_menu(
            &self.cache.profiles,
            self.cache.current.as_ref(),
            self.cache.snapshot.as_deref(),
            MenuOptions::from_settings(&self.settings),
        )
    }

    /// Builds the request for the profile at `index`. Only one request may be
    /// outstanding; report its outcome with [`ProfileManager::apply_finished`].
    pub fn activate(&mut self, index: usize) -> Result<ApplyRequest, ManagerError> {
        if let Some(serial) = self.pending {
            warn!("Ignoring activation of profile #{index}: request for serial {serial} still pending");
            return Err(ManagerError::ApplyInFlight);
        }
        let snapshot = self
            .cache
            .snapshot
            .as_deref()
            .ok_or(ManagerError::NoSnapshot)?;
        let profile = self
            .cache
            .profiles
            .get(index)
            .ok_or(ManagerError::NoSuchProfile(index))?;
        if !is_feasible(profile, snapshot) {
            return Err(ManagerError::Infeasible(profile.name.clone()));
        }
        let request = build_apply_request(profile, snapshot).map_err(|e| {
            error!("Cannot apply profile '{}': {e}", profile.name);
            e
        })?;
        info!("Activating profile '{}'", profile.name);
        self.pending = Some(request.serial);
        Ok(request)
    }

    /// Clears the in-flight marker. A failed apply leaves everything as it
    /// was; the next monitors-changed refresh is the recovery path.
    pub fn apply_finished<E: Display>(&mut self, result: Result<(), E>) {
        let serial = self.pending.take();
        match result {
            Ok(()) => debug!("Apply for serial {serial:?} accepted"),
            Err(e) => error!("Display backend rejected configuration (serial {serial:?}): {e}"),
        }
    }

    fn persist(&mut self) -> Result<(), ManagerError> {
        let encoded = self.cache.profiles.encode();
        self.settings.set_string(KEY_PROFILES, &encoded)?;
        Ok(())
    }

    /// Appends the live layout under `name`. Falls back to the stored
    /// `current-profile` blob when no snapshot has been loaded in this process.
    pub fn save_current(&mut self, name: &str) -> Result<(), ManagerError> {
        let name = name.trim();
        check_name(name).map_err(ProfileListError::from)?;
        let mut profile = match &self.cache.current {
            Some(current) => current.clone(),
            None => {
                let stored = self.settings.get_string(KEY_CURRENT_PROFILE);
                if stored.is_empty() {
                    return Err(ManagerError::NoCurrentProfile);
                }
                decode_profile(&stored).map_err(ProfileListError::from)?
            }
        };
        if let Some(existing) = self.cache.profiles.iter().find(|p| equals(p, &profile)) {
            return Err(ManagerError::Duplicate(existing.name.clone()));
        }
        profile.name = name.to_owned();
        self.cache.profiles.add(profile);
        self.persist()
    }

    pub fn move_up(&mut self, index: usize) -> Result<(), ManagerError> {
        self.cache.profiles.move_up(index)?;
        self.persist()
    }

    pub fn move_down(&mut self, index: usize) -> Result<(), ManagerError> {
        self.cache.profiles.move_down(index)?;
        self.persist()
    }

    pub fn remove(&mut self, index: usize) -> Result<Profile, ManagerError> {
        let removed = self.cache.profiles.remove(index)?;
        self.persist()?;
        Ok(removed)
    }

    pub fn expert_mode(&self) -> bool {
        self.settings.get_boolean(KEY_EXPERT_MODE)
    }

    pub fn set_expert_mode(&mut self, enabled: bool) -> Result<(), ManagerError> {
        self.settings.set_boolean(KEY_EXPERT_MODE, enabled)?;
        Ok(())
    }

    /// Replaces one raw field of a stored profile. Only allowed in expert mode.
    pub fn edit_field(
        &mut self,
        index: usize,
        field_index: usize,
        raw: &str,
    ) -> Result<(), ManagerError> {
        if !self.expert_mode() {
            return Err(ManagerError::ExpertModeRequired);
        }
        self.cache.profiles.edit_field(index, field_index, raw)?;
        self.persist()
    }
}
