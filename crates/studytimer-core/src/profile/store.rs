//! Ordered profile list with an active selection.

use tracing::warn;

use super::types::Profile;
use crate::error::ProfileError;

/// Default cap on the number of stored profiles.
pub const MAX_PROFILES: usize = 20;

/// Ordered list of profiles plus the index of the active one.
///
/// Always holds between one and `capacity` profiles, and the active index
/// always points at one of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileStore {
    profiles: Vec<Profile>,
    active: usize,
    capacity: usize,
}

impl ProfileStore {
    /// A store holding just the default profile.
    pub fn new() -> Self {
        Self::with_capacity(MAX_PROFILES)
    }

    /// A store holding just the default profile, capped at `capacity`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            profiles: vec![Profile::default()],
            active: 0,
            capacity: capacity.max(1),
        }
    }

    /// Rebuild a store from loaded data, repairing anything out of range.
    ///
    /// Profiles are clamped into their valid ranges, extras beyond
    /// `capacity` are dropped, an empty list becomes the default profile,
    /// and `active` is clamped to the last profile.
    pub fn from_parts(profiles: Vec<Profile>, active: usize, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut profiles: Vec<Profile> = profiles
            .into_iter()
            .enumerate()
            .map(|(i, p)| {
                if p.validate().is_err() {
                    warn!(profile = %p.name, "repairing out-of-range profile");
                }
                p.repaired(i)
            })
            .collect();
        if profiles.len() > capacity {
            warn!(
                loaded = profiles.len(),
                capacity, "dropping profiles beyond capacity"
            );
            profiles.truncate(capacity);
        }
        if profiles.is_empty() {
            profiles.push(Profile::default());
        }
        let active = active.min(profiles.len() - 1);
        Self {
            profiles,
            active,
            capacity,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Always false; a store never drops below one profile.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn get(&self, index: usize) -> Option<&Profile> {
        self.profiles.get(index)
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> &Profile {
        &self.profiles[self.active]
    }

    /// Index of the first profile with this name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.profiles.iter().position(|p| p.name == name)
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Append a profile and return its index.
    ///
    /// # Errors
    ///
    /// `Invalid` if the profile fails validation, `CapacityExceeded` if the
    /// store is full.
    pub fn add_profile(&mut self, profile: Profile) -> Result<usize, ProfileError> {
        profile.validate()?;
        if self.profiles.len() >= self.capacity {
            return Err(ProfileError::CapacityExceeded { cap: self.capacity });
        }
        if self.position(&profile.name).is_some() {
            warn!(profile = %profile.name, "adding profile with a duplicate name");
        }
        self.profiles.push(profile);
        Ok(self.profiles.len() - 1)
    }

    /// Remove the profile at `index`, closing the gap.
    ///
    /// The active selection follows its profile when an earlier one is
    /// removed; removing the active profile selects its successor, or the
    /// new last profile.
    ///
    /// # Errors
    ///
    /// `LastProfileRemaining` if only one profile is left, `OutOfBounds`
    /// for a bad index.
    pub fn remove_profile(&mut self, index: usize) -> Result<Profile, ProfileError> {
        self.check_index(index)?;
        if self.profiles.len() == 1 {
            return Err(ProfileError::LastProfileRemaining);
        }
        let removed = self.profiles.remove(index);
        if index < self.active {
            self.active -= 1;
        }
        self.active = self.active.min(self.profiles.len() - 1);
        Ok(removed)
    }

    /// Replace the configurable fields of the profile at `index`, keeping
    /// its statistics.
    ///
    /// # Errors
    ///
    /// `Invalid` if the edited profile fails validation, `OutOfBounds` for a
    /// bad index.
    pub fn update_profile(&mut self, index: usize, edited: Profile) -> Result<(), ProfileError> {
        self.check_index(index)?;
        edited.validate()?;
        let current = &mut self.profiles[index];
        *current = Profile {
            total_study_time: current.total_study_time,
            total_sessions: current.total_sessions,
            completed_sessions: current.completed_sessions,
            ..edited
        };
        Ok(())
    }

    /// Select the active profile.
    ///
    /// # Errors
    ///
    /// `OutOfBounds` for a bad index.
    pub fn set_active(&mut self, index: usize) -> Result<(), ProfileError> {
        self.check_index(index)?;
        self.active = index;
        Ok(())
    }

    /// Statistics are engine-owned; other fields go through `update_profile`.
    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Profile> {
        self.profiles.get_mut(index)
    }

    fn check_index(&self, index: usize) -> Result<(), ProfileError> {
        if index < self.profiles.len() {
            Ok(())
        } else {
            Err(ProfileError::OutOfBounds {
                index,
                len: self.profiles.len(),
            })
        }
    }
}

impl Default for ProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> Profile {
        Profile::new(name, 25, 5, 15, 4)
    }

    #[test]
    fn new_store_has_default_profile() {
        let store = ProfileStore::new();
        assert_eq!(store.len(), 1);
        assert_eq!(store.active_index(), 0);
        assert_eq!(store.active().name, "Default");
        assert_eq!(store.capacity(), MAX_PROFILES);
    }

    #[test]
    fn add_until_capacity() {
        let mut store = ProfileStore::with_capacity(3);
        assert_eq!(store.add_profile(named("b")).unwrap(), 1);
        assert_eq!(store.add_profile(named("c")).unwrap(), 2);
        assert_eq!(
            store.add_profile(named("d")),
            Err(ProfileError::CapacityExceeded { cap: 3 })
        );
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn add_rejects_invalid_profile() {
        let mut store = ProfileStore::new();
        let err = store.add_profile(Profile::new("bad", 0, 5, 15, 4)).unwrap_err();
        assert!(matches!(err, ProfileError::Invalid(_)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn cannot_remove_last_profile() {
        let mut store = ProfileStore::new();
        assert_eq!(store.remove_profile(0), Err(ProfileError::LastProfileRemaining));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn remove_keeps_active_in_range() {
        let mut store = ProfileStore::new();
        store.add_profile(named("b")).unwrap();
        store.add_profile(named("c")).unwrap();
        store.set_active(2).unwrap();

        let removed = store.remove_profile(2).unwrap();
        assert_eq!(removed.name, "c");
        assert_eq!(store.active_index(), 1);
        assert_eq!(store.active().name, "b");
    }

    #[test]
    fn remove_before_active_shifts_selection() {
        let mut store = ProfileStore::new();
        store.add_profile(named("b")).unwrap();
        store.add_profile(named("c")).unwrap();
        store.set_active(2).unwrap();

        store.remove_profile(0).unwrap();
        assert_eq!(store.active().name, "c");
        assert_eq!(store.active_index(), 1);
    }

    #[test]
    fn remove_out_of_bounds() {
        let mut store = ProfileStore::new();
        store.add_profile(named("b")).unwrap();
        assert_eq!(
            store.remove_profile(5),
            Err(ProfileError::OutOfBounds { index: 5, len: 2 })
        );
    }

    #[test]
    fn update_preserves_statistics() {
        let mut store = ProfileStore::new();
        {
            let p = store.get_mut(0).unwrap();
            p.total_study_time = 600;
            p.total_sessions = 2;
            p.completed_sessions = 1;
        }
        let mut edited = named("Renamed");
        edited.study_minutes = 50;
        store.update_profile(0, edited).unwrap();

        let p = store.get(0).unwrap();
        assert_eq!(p.name, "Renamed");
        assert_eq!(p.study_minutes, 50);
        assert_eq!(p.total_study_time, 600);
        assert_eq!(p.total_sessions, 2);
        assert_eq!(p.completed_sessions, 1);
    }

    #[test]
    fn from_parts_repairs_and_clamps() {
        let profiles = vec![named("a"), Profile::new("", 0, 5, 15, 4), named("c")];
        let store = ProfileStore::from_parts(profiles, 9, 2);
        assert_eq!(store.len(), 2);
        assert_eq!(store.active_index(), 1);
        assert_eq!(store.get(1).unwrap().name, "Profile 2");
        assert_eq!(store.get(1).unwrap().study_minutes, 1);
    }

    #[test]
    fn from_parts_empty_gets_default() {
        let store = ProfileStore::from_parts(Vec::new(), 0, MAX_PROFILES);
        assert_eq!(store.len(), 1);
        assert_eq!(store.active(), &Profile::default());
    }
}
