use super::LocalFile;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{instrument, trace};
use walkdir::WalkDir;

/// Amount of work performed by an overlay copy.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CopySummary {
    pub files_copied: usize,
    pub directories_created: usize,
}

pub trait DirectoryCopier {
    /// Recursively copies `source` into `destination` overlaying the existing contents.
    ///
    /// Missing directories are created and files are overwritten, but entries that only exist
    /// under `destination` are left untouched. The parent of `destination` must exist.
    fn copy_overlay(&self, source: &Path, destination: &Path) -> io::Result<CopySummary>;
}

impl DirectoryCopier for LocalFile {
    #[instrument(skip_all, fields(source = %source.display(), destination = %destination.display()))]
    fn copy_overlay(&self, source: &Path, destination: &Path) -> io::Result<CopySummary> {
        if !source.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!(
                    "directory not found or not a directory: {}",
                    source.display()
                ),
            ));
        }

        let mut summary = CopySummary::default();
        for entry in WalkDir::new(source).follow_links(false) {
            let entry = entry?;
            let relative = entry
                .path()
                .strip_prefix(source)
                .map_err(io::Error::other)?;
            let target = destination.join(relative);

            if entry.file_type().is_dir() {
                if !target.is_dir() {
                    fs::create_dir(&target)?;
                    summary.directories_created += 1;
                }
                continue;
            }

            #[cfg(target_family = "windows")]
            clear_readonly(&target)?;

            trace!(file = %target.display(), "copying file");
            fs::copy(entry.path(), &target)?;
            summary.files_copied += 1;
        }

        Ok(summary)
    }
}

// A read-only destination file cannot be overwritten on Windows.
#[cfg(target_family = "windows")]
fn clear_readonly(path: &Path) -> io::Result<()> {
    match fs::metadata(path) {
        Ok(metadata) if metadata.permissions().readonly() => {
            let mut permissions = metadata.permissions();
            permissions.set_readonly(false);
            fs::set_permissions(path, permissions)
        }
        Ok(_) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}

////////////////////////////////////////////////////////////////////////////////////
// Mock
////////////////////////////////////////////////////////////////////////////////////
#[cfg(feature = "mocks")]
pub mod mock {
    use super::*;
    use crate::mock::MockLocalFile;
    use mockall::predicate;
    use std::path::PathBuf;

    impl MockLocalFile {
        pub fn should_copy_overlay(&mut self, source: &Path, destination: &Path) {
            self.expect_copy_overlay()
                .with(
                    predicate::eq(PathBuf::from(source)),
                    predicate::eq(PathBuf::from(destination)),
                )
                .once()
                .returning(|_, _| Ok(CopySummary::default()));
        }

        pub fn should_not_copy_overlay(&mut self, source: &Path, destination: &Path) {
            self.expect_copy_overlay()
                .with(
                    predicate::eq(PathBuf::from(source)),
                    predicate::eq(PathBuf::from(destination)),
                )
                .once()
                .returning(|_, _| {
                    Err(io::Error::new(
                        io::ErrorKind::PermissionDenied,
                        "permission denied",
                    ))
                });
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::fs::{create_dir_all, read_to_string, write};

    #[test]
    fn test_copy_missing_source_should_return_error() {
        let tempdir = tempfile::tempdir().unwrap();
        let result = LocalFile.copy_overlay(
            Path::new("/a/path/that/does/not/exist"),
            &tempdir.path().join("target"),
        );
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_copy_creates_the_whole_tree() {
        let tempdir = tempfile::tempdir().unwrap();
        let source = tempdir.path().join("source");
        create_dir_all(source.join("default")).unwrap();
        create_dir_all(source.join("metadata")).unwrap();
        write(source.join("default").join("2.1.0.version"), "").unwrap();
        write(source.join("default").join("inputs.conf"), "[monitor]").unwrap();
        write(source.join("metadata").join("local.meta"), "[]").unwrap();

        let destination = tempdir.path().join("target");
        let summary = LocalFile.copy_overlay(&source, &destination).unwrap();

        assert_eq!(
            summary,
            CopySummary {
                files_copied: 3,
                directories_created: 3,
            }
        );
        assert_eq!(
            read_to_string(destination.join("default").join("inputs.conf")).unwrap(),
            "[monitor]"
        );
        assert!(destination.join("default").join("2.1.0.version").is_file());
        assert!(destination.join("metadata").join("local.meta").is_file());
    }

    #[test]
    fn test_copy_overwrites_but_keeps_destination_only_files() {
        let tempdir = tempfile::tempdir().unwrap();
        let source = tempdir.path().join("source");
        let destination = tempdir.path().join("target");
        create_dir_all(source.join("default")).unwrap();
        create_dir_all(destination.join("default")).unwrap();
        write(source.join("default").join("inputs.conf"), "new").unwrap();
        write(destination.join("default").join("inputs.conf"), "old").unwrap();
        write(destination.join("default").join("legacy.conf"), "legacy").unwrap();

        let summary = LocalFile.copy_overlay(&source, &destination).unwrap();

        assert_eq!(summary.files_copied, 1);
        assert_eq!(summary.directories_created, 0);
        assert_eq!(
            read_to_string(destination.join("default").join("inputs.conf")).unwrap(),
            "new"
        );
        assert_eq!(
            read_to_string(destination.join("default").join("legacy.conf")).unwrap(),
            "legacy"
        );
    }

    #[test]
    fn test_copy_fails_when_destination_parent_is_missing() {
        let tempdir = tempfile::tempdir().unwrap();
        let source = tempdir.path().join("source");
        create_dir_all(&source).unwrap();
        write(source.join("app.conf"), "").unwrap();

        let result = LocalFile.copy_overlay(&source, &tempdir.path().join("missing").join("app"));

        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
    }
}
