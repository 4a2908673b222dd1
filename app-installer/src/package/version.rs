use crate::defaults::VERSION_MARKER_SUFFIX;
use fs::FileReader;
use regex::Regex;
use std::fmt::{self, Display};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};
use thiserror::Error;
use tracing::trace;

static VERSION_MARKER_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "(?i)^(?P<version>.+){}$",
        regex::escape(VERSION_MARKER_SUFFIX)
    ))
    .expect("version marker pattern should be valid")
});

/// Version of an app, as encoded in the name of its marker file.
///
/// It is opaque: two versions are the same only if they are exactly the same string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionId(String);

impl VersionId {
    /// Extracts the version from a marker file name such as `2.1.0.version`.
    ///
    /// Returns `None` when the name is not a marker or does not encode any version.
    pub fn from_marker_name(file_name: &str) -> Option<Self> {
        VERSION_MARKER_NAME
            .captures(file_name)
            .and_then(|captures| captures.name("version"))
            .map(|version| Self(version.as_str().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A version marker file found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionMarker {
    pub version: VersionId,
    pub path: PathBuf,
}

impl VersionMarker {
    fn from_path(path: PathBuf) -> Option<Self> {
        let version = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(VersionId::from_marker_name)?;
        Some(Self { version, path })
    }
}

#[derive(Debug, Error)]
pub enum VersionProbeError {
    #[error("more than one version marker found: {}", display_paths(.0))]
    Ambiguous(Vec<PathBuf>),

    #[error("could not read directory `{}`: {}", .0.display(), .1)]
    Read(PathBuf, io::Error),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Finds the version marker of a package.
pub struct VersionProbe<F>
where
    F: FileReader,
{
    file_reader: Arc<F>,
}

impl<F> VersionProbe<F>
where
    F: FileReader,
{
    pub fn new(file_reader: Arc<F>) -> Self {
        Self { file_reader }
    }

    /// Looks for the single `*.version` file in the package `default` directory.
    ///
    /// A missing directory means there is no marker. Finding several markers is an error
    /// since there is no way to tell which one is current.
    pub fn probe(&self, default_dir: &Path) -> Result<Option<VersionMarker>, VersionProbeError> {
        let mut markers = self.markers(default_dir)?;
        if markers.len() > 1 {
            let paths = markers.into_iter().map(|m| m.path).collect();
            return Err(VersionProbeError::Ambiguous(paths));
        }
        Ok(markers.pop())
    }

    /// Every `*.version` file in the package `default` directory, sorted by path.
    pub fn markers(&self, default_dir: &Path) -> Result<Vec<VersionMarker>, VersionProbeError> {
        let files = match self.file_reader.dir_files(default_dir) {
            Ok(files) => files,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                trace!(dir = %default_dir.display(), "no default directory");
                return Ok(Vec::new());
            }
            Err(err) => return Err(VersionProbeError::Read(default_dir.to_path_buf(), err)),
        };

        let mut markers: Vec<VersionMarker> = files
            .into_iter()
            .filter_map(VersionMarker::from_path)
            .collect();
        markers.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(markers)
    }
}
