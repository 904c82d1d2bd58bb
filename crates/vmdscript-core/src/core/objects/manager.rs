use super::molecule::Molecule;
use crate::core::host::backend::{HostBackend, HostError, MolId};
use std::cell::RefCell;
use std::collections::HashMap;
use tracing::trace;

/// Key used to look a molecule up in a [`MoleculeManager`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoleculeKey {
    Id(MolId),
    Name(String),
}

impl From<MolId> for MoleculeKey {
    fn from(value: MolId) -> Self {
        MoleculeKey::Id(value)
    }
}

impl From<&str> for MoleculeKey {
    fn from(value: &str) -> Self {
        MoleculeKey::Name(value.to_string())
    }
}

impl From<String> for MoleculeKey {
    fn from(value: String) -> Self {
        MoleculeKey::Name(value)
    }
}

/// Manager of all molecules known to one host.
///
/// Name lookups go through a best-effort name cache. A cached id is verified
/// against the host before use and evicted if stale; on a miss the whole cache
/// is rebuilt from the host and the lookup is retried once. When several
/// molecules share a name, the one created first wins.
pub struct MoleculeManager<'h, H: HostBackend + ?Sized> {
    host: &'h H,
    names: RefCell<HashMap<String, MolId>>,
}

impl<'h, H: HostBackend + ?Sized> MoleculeManager<'h, H> {
    pub fn new(host: &'h H) -> Result<Self, HostError> {
        let manager = Self {
            host,
            names: RefCell::new(HashMap::new()),
        };
        manager.refresh()?;
        Ok(manager)
    }

    fn refresh(&self) -> Result<(), HostError> {
        let mut cache = HashMap::new();
        for molid in self.host.list_molecules() {
            let name = self.host.name(molid)?;
            cache.entry(name).or_insert(molid);
        }
        trace!(entries = cache.len(), "Refreshed molecule name cache.");
        *self.names.borrow_mut() = cache;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.host.num_molecules()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the molecule with the given id or name.
    ///
    /// # Errors
    ///
    /// [`HostError::MoleculeNotFound`] or [`HostError::MoleculeNameNotFound`]
    /// when no molecule matches.
    pub fn get(&self, key: impl Into<MoleculeKey>) -> Result<Molecule<'h, H>, HostError> {
        match key.into() {
            MoleculeKey::Id(molid) => Molecule::new(self.host, molid),
            MoleculeKey::Name(name) => {
                let cached = self.names.borrow().get(&name).copied();
                if let Some(molid) = cached {
                    if self.host.exists(molid) {
                        return Molecule::new(self.host, molid);
                    }
                    self.names.borrow_mut().remove(&name);
                }

                self.refresh()?;

                let found = self.names.borrow().get(&name).copied();
                match found {
                    Some(molid) => Molecule::new(self.host, molid),
                    None => Err(HostError::MoleculeNameNotFound(name)),
                }
            }
        }
    }

    /// Deletes the molecule with the given id or name.
    pub fn remove(&self, key: impl Into<MoleculeKey>) -> Result<(), HostError> {
        let molecule = self.get(key)?;
        let name = molecule.name()?;
        self.names.borrow_mut().remove(&name);
        molecule.delete()
    }

    pub fn iter(&self) -> impl Iterator<Item = Molecule<'h, H>> + '_ {
        self.host
            .list_molecules()
            .into_iter()
            .filter_map(|molid| Molecule::new(self.host, molid).ok())
    }

    pub fn contains(&self, molecule: &Molecule<'_, H>) -> bool {
        self.host.exists(molecule.molid())
    }

    /// The top molecule.
    ///
    /// # Errors
    ///
    /// [`HostError::NoMolecules`] when the host holds no molecules.
    pub fn top(&self) -> Result<Molecule<'h, H>, HostError> {
        let molid = self.host.top().ok_or(HostError::NoMolecules)?;
        Molecule::new(self.host, molid)
    }

    pub fn set_top(&self, molecule: &Molecule<'_, H>) -> Result<(), HostError> {
        self.host.set_top(molecule.molid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::host::memory::MemoryHost;

    #[test]
    fn lookup_by_id_and_name() {
        let host = MemoryHost::new();
        let water = host.new_molecule("water").unwrap();
        let manager = MoleculeManager::new(&host).unwrap();

        assert_eq!(manager.get(water).unwrap().molid(), water);
        assert_eq!(manager.get("water").unwrap().molid(), water);
        assert!(matches!(
            manager.get(MolId(9)),
            Err(HostError::MoleculeNotFound(MolId(9)))
        ));
        assert!(matches!(
            manager.get("ice"),
            Err(HostError::MoleculeNameNotFound(_))
        ));
    }

    #[test]
    fn name_miss_refreshes_cache_for_molecules_created_later() {
        let host = MemoryHost::new();
        let manager = MoleculeManager::new(&host).unwrap();
        let late = host.new_molecule("late").unwrap();

        assert_eq!(manager.get("late").unwrap().molid(), late);
    }

    #[test]
    fn stale_cache_entry_is_replaced_after_deletion() {
        let host = MemoryHost::new();
        let first = host.new_molecule("protein").unwrap();
        let manager = MoleculeManager::new(&host).unwrap();
        host.delete_molecule(first).unwrap();
        let second = host.new_molecule("protein").unwrap();

        assert_eq!(manager.get("protein").unwrap().molid(), second);
    }

    #[test]
    fn duplicate_names_resolve_to_first_created() {
        let host = MemoryHost::new();
        let first = host.new_molecule("dup").unwrap();
        host.new_molecule("dup").unwrap();
        let manager = MoleculeManager::new(&host).unwrap();

        assert_eq!(manager.get("dup").unwrap().molid(), first);
    }

    #[test]
    fn remove_deletes_molecule_and_forgets_name() {
        let host = MemoryHost::new();
        host.new_molecule("gone").unwrap();
        let manager = MoleculeManager::new(&host).unwrap();

        manager.remove("gone").unwrap();
        assert!(manager.is_empty());
        assert!(matches!(
            manager.get("gone"),
            Err(HostError::MoleculeNameNotFound(_))
        ));
    }

    #[test]
    fn iteration_contains_and_top() {
        let host = MemoryHost::new();
        let manager = MoleculeManager::new(&host).unwrap();
        assert!(matches!(manager.top(), Err(HostError::NoMolecules)));

        let a = host.new_molecule("a").unwrap();
        let b = host.new_molecule("b").unwrap();
        let ids: Vec<MolId> = manager.iter().map(|m| m.molid()).collect();
        assert_eq!(ids, vec![a, b]);
        assert_eq!(manager.len(), 2);
        assert_eq!(manager.top().unwrap().molid(), b);

        let mol_a = manager.get(a).unwrap();
        manager.set_top(&mol_a).unwrap();
        assert_eq!(manager.top().unwrap(), mol_a);
        assert!(manager.contains(&mol_a));
        mol_a.delete().unwrap();
        assert!(!manager.contains(&mol_a));
    }
}
