use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// A molecular file format understood (or at least named) by a host backend.
///
/// The well-known formats get their own variants; anything else is carried as
/// [`FileFormat::Other`] so that a backend can decide whether it supports it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FileFormat {
    Dcd,
    Pdb,
    Psf,
    Parm7,
    CrdBox,
    Crd,
    Xyz,
    Other(String),
}

static EXTENSIONS: phf::Map<&'static str, FileFormat> = phf_map! {
    "dcd" => FileFormat::Dcd,
    "pdb" => FileFormat::Pdb,
    "psf" => FileFormat::Psf,
    "prmtop" => FileFormat::Parm7,
    "mdcrd" => FileFormat::CrdBox,
    "xyz" => FileFormat::Xyz,
};

impl FileFormat {
    pub fn as_str(&self) -> &str {
        match self {
            FileFormat::Dcd => "dcd",
            FileFormat::Pdb => "pdb",
            FileFormat::Psf => "psf",
            FileFormat::Parm7 => "parm7",
            FileFormat::CrdBox => "crdbox",
            FileFormat::Crd => "crd",
            FileFormat::Xyz => "xyz",
            FileFormat::Other(name) => name,
        }
    }
}

impl FromStr for FileFormat {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "dcd" => FileFormat::Dcd,
            "pdb" => FileFormat::Pdb,
            "psf" => FileFormat::Psf,
            "parm7" => FileFormat::Parm7,
            "crdbox" => FileFormat::CrdBox,
            "crd" => FileFormat::Crd,
            "xyz" => FileFormat::Xyz,
            other => FileFormat::Other(other.to_string()),
        })
    }
}

impl From<String> for FileFormat {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(format) => format,
            Err(never) => match never {},
        }
    }
}

impl From<FileFormat> for String {
    fn from(value: FileFormat) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Guesses the format of a file from its extension.
///
/// Returns `None` when the path has no extension (or an empty one). Known
/// extensions map to their format, e.g. `prmtop` to [`FileFormat::Parm7`];
/// unknown extensions are returned as they are.
pub fn guess_file_format(path: impl AsRef<Path>) -> Option<FileFormat> {
    let ext = path.as_ref().extension()?.to_str()?;
    if ext.is_empty() {
        return None;
    }
    Some(
        EXTENSIONS
            .get(ext)
            .cloned()
            .unwrap_or_else(|| FileFormat::Other(ext.to_string())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions_map_to_formats() {
        assert_eq!(guess_file_format("traj.dcd"), Some(FileFormat::Dcd));
        assert_eq!(guess_file_format("dir/model.pdb"), Some(FileFormat::Pdb));
        assert_eq!(guess_file_format("top.psf"), Some(FileFormat::Psf));
        assert_eq!(guess_file_format("amber.prmtop"), Some(FileFormat::Parm7));
        assert_eq!(guess_file_format("amber.mdcrd"), Some(FileFormat::CrdBox));
        assert_eq!(guess_file_format("water.xyz"), Some(FileFormat::Xyz));
    }

    #[test]
    fn unknown_extension_is_returned_as_is() {
        assert_eq!(
            guess_file_format("frames.xtc"),
            Some(FileFormat::Other("xtc".to_string()))
        );
    }

    #[test]
    fn missing_or_empty_extension_yields_none() {
        assert_eq!(guess_file_format("trajectory"), None);
        assert_eq!(guess_file_format("trajectory."), None);
    }

    #[test]
    fn format_names_round_trip_through_strings() {
        let parsed: FileFormat = "parm7".parse().unwrap();
        assert_eq!(parsed, FileFormat::Parm7);
        assert_eq!(String::from(FileFormat::CrdBox), "crdbox");
        assert_eq!(FileFormat::from("gro".to_string()).to_string(), "gro");
    }
}
