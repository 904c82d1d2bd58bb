use super::frames::Frames;
use crate::core::host::backend::{HostBackend, HostError, MolId};
use crate::core::io::formats::{FileFormat, guess_file_format};
use crate::core::io::traits::LoadRange;
use std::fmt;
use std::path::Path;

const DEFAULT_MOLECULE_NAME: &str = "molecule";

/// Options for [`Molecule::load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Format of the file, guessed from its extension when `None`.
    pub format: Option<FileFormat>,
    /// First source frame to load.
    pub start: usize,
    /// Last source frame to load (inclusive), `None` for the end of the file.
    pub stop: Option<usize>,
    /// Load every `step`-th frame.
    pub step: usize,
    /// Whether to wait until the file is completely loaded.
    pub wait: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            format: None,
            start: 0,
            stop: None,
            step: 1,
            wait: true,
        }
    }
}

/// Proxy for a molecule loaded into the host.
///
/// The proxy holds nothing but the molecule id; every accessor is a host
/// call, so the values always reflect the current host state.
pub struct Molecule<'h, H: HostBackend + ?Sized> {
    host: &'h H,
    molid: MolId,
}

impl<'h, H: HostBackend + ?Sized> Clone for Molecule<'h, H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'h, H: HostBackend + ?Sized> Copy for Molecule<'h, H> {}

impl<'h, H: HostBackend + ?Sized> Molecule<'h, H> {
    /// Wraps an existing molecule.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::MoleculeNotFound`] if the host has no such molecule.
    pub fn new(host: &'h H, molid: MolId) -> Result<Self, HostError> {
        if !host.exists(molid) {
            return Err(HostError::MoleculeNotFound(molid));
        }
        Ok(Self { host, molid })
    }

    /// Creates a new, empty molecule in the host.
    pub fn create(host: &'h H, name: Option<&str>) -> Result<Self, HostError> {
        let molid = host.new_molecule(name.unwrap_or(DEFAULT_MOLECULE_NAME))?;
        Self::new(host, molid)
    }

    pub fn molid(&self) -> MolId {
        self.molid
    }

    pub fn host(&self) -> &'h H {
        self.host
    }

    pub fn exists(&self) -> bool {
        self.host.exists(self.molid)
    }

    pub fn delete(self) -> Result<(), HostError> {
        self.host.delete_molecule(self.molid)
    }

    /// Loads data from a file into the molecule.
    ///
    /// Returns the number of frames the host appended.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::UnknownFormat`] when no format is given and none can
    /// be guessed from the file name, [`HostError::InvalidArgument`] for a zero
    /// step, and any error raised by the host while reading.
    pub fn load(&self, path: impl AsRef<Path>, options: &LoadOptions) -> Result<usize, HostError> {
        let path = path.as_ref();
        if options.step == 0 {
            return Err(HostError::InvalidArgument(
                "frame step must be positive".to_string(),
            ));
        }
        let format = match &options.format {
            Some(format) => format.clone(),
            None => guess_file_format(path)
                .ok_or_else(|| HostError::UnknownFormat(path.to_path_buf()))?,
        };
        let range = LoadRange::new(options.start, options.stop, options.step);
        self.host
            .read(self.molid, &format, path, &range, options.wait)
    }

    /// The active frame, `None` when the molecule has no frames.
    pub fn frame(&self) -> Result<Option<usize>, HostError> {
        self.host.current_frame(self.molid)
    }

    pub fn set_frame(&self, frame: usize) -> Result<(), HostError> {
        self.host.set_frame(self.molid, frame)
    }

    pub fn frames(&self) -> Frames<'h, H> {
        Frames::new(*self)
    }

    pub fn name(&self) -> Result<String, HostError> {
        self.host.name(self.molid)
    }

    pub fn rename(&self, name: &str) -> Result<(), HostError> {
        self.host.rename(self.molid, name)
    }

    pub fn visible(&self) -> Result<bool, HostError> {
        self.host.visible(self.molid)
    }

    pub fn set_visible(&self, visible: bool) -> Result<(), HostError> {
        self.host.set_visible(self.molid, visible)
    }

    pub fn num_atoms(&self) -> Result<usize, HostError> {
        self.host.num_atoms(self.molid)
    }
}

impl<H: HostBackend + ?Sized> PartialEq for Molecule<'_, H> {
    fn eq(&self, other: &Self) -> bool {
        self.molid == other.molid
    }
}

impl<H: HostBackend + ?Sized> Eq for Molecule<'_, H> {}

impl<H: HostBackend + ?Sized> fmt::Debug for Molecule<'_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Molecule").field("molid", &self.molid).finish()
    }
}

impl<H: HostBackend + ?Sized> fmt::Display for Molecule<'_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Ok(name) => write!(f, "{}({})", name, self.molid),
            Err(_) => write!(f, "<deleted>({})", self.molid),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::host::memory::MemoryHost;
    use std::fs;

    #[test]
    fn create_uses_default_name_and_wraps_new_id() {
        let host = MemoryHost::new();
        let molecule = Molecule::create(&host, None).unwrap();

        assert_eq!(molecule.name().unwrap(), "molecule");
        assert!(molecule.exists());
        assert_eq!(molecule.to_string(), "molecule(0)");
    }

    #[test]
    fn new_rejects_unknown_molecule() {
        let host = MemoryHost::new();
        assert!(matches!(
            Molecule::new(&host, MolId(3)),
            Err(HostError::MoleculeNotFound(MolId(3)))
        ));
    }

    #[test]
    fn molecules_compare_by_id() {
        let host = MemoryHost::new();
        let a = Molecule::create(&host, Some("a")).unwrap();
        let b = Molecule::create(&host, Some("b")).unwrap();
        assert_eq!(a, Molecule::new(&host, a.molid()).unwrap());
        assert_ne!(a, b);
    }

    #[test]
    fn rename_and_visibility_are_forwarded_to_host() {
        let host = MemoryHost::new();
        let molecule = Molecule::create(&host, Some("old")).unwrap();

        molecule.rename("new").unwrap();
        molecule.set_visible(false).unwrap();

        assert_eq!(host.name(molecule.molid()).unwrap(), "new");
        assert!(!molecule.visible().unwrap());
    }

    #[test]
    fn load_guesses_format_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("water.xyz");
        fs::write(&path, "1\na\nO 0 0 0\n1\nb\nO 1 0 0\n").unwrap();
        let host = MemoryHost::new();
        let molecule = Molecule::create(&host, None).unwrap();

        let appended = molecule.load(&path, &LoadOptions::default()).unwrap();

        assert_eq!(appended, 2);
        assert_eq!(molecule.frame().unwrap(), Some(1));
        assert_eq!(molecule.num_atoms().unwrap(), 1);
    }

    #[test]
    fn load_without_detectable_format_fails() {
        let host = MemoryHost::new();
        let molecule = Molecule::create(&host, None).unwrap();
        assert!(matches!(
            molecule.load("trajectory", &LoadOptions::default()),
            Err(HostError::UnknownFormat(_))
        ));
    }

    #[test]
    fn load_rejects_zero_step() {
        let host = MemoryHost::new();
        let molecule = Molecule::create(&host, None).unwrap();
        let options = LoadOptions {
            step: 0,
            ..Default::default()
        };
        assert!(matches!(
            molecule.load("a.xyz", &options),
            Err(HostError::InvalidArgument(_))
        ));
    }

    #[test]
    fn delete_removes_molecule_from_host() {
        let host = MemoryHost::new();
        let molecule = Molecule::create(&host, None).unwrap();
        let molid = molecule.molid();
        molecule.delete().unwrap();
        assert!(!host.exists(molid));
    }
}
