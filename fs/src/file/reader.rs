use super::LocalFile;
use std::fs::read_dir;
use std::io;
use std::path::{Path, PathBuf};

pub trait FileReader {
    /// Return the regular files directly inside a given Path. Subdirectories are skipped.
    ///
    /// If the path does not exist or is not a directory it returns an
    /// [io::ErrorKind::NotFound] error.
    fn dir_files(&self, dir_path: &Path) -> io::Result<Vec<PathBuf>>;
}

impl FileReader for LocalFile {
    fn dir_files(&self, dir_path: &Path) -> io::Result<Vec<PathBuf>> {
        if !dir_path.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!(
                    "directory not found or not a directory: {}",
                    dir_path.display()
                ),
            ));
        }
        let entries = read_dir(dir_path)?;
        let mut file_paths: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() {
                file_paths.push(path);
            }
        }
        Ok(file_paths)
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

    impl MockLocalFile {
        pub fn should_dir_files(&mut self, path: &Path, content: Vec<PathBuf>) {
            self.expect_dir_files()
                .with(predicate::eq(PathBuf::from(path)))
                .once()
                .returning(move |_| Ok(content.clone()));
        }

        pub fn should_not_dir_files_not_found(&mut self, path: &Path) {
            self.expect_dir_files()
                .with(predicate::eq(PathBuf::from(path)))
                .once()
                .returning(|dir| {
                    Err(io::Error::new(
                        io::ErrorKind::NotFound,
                        format!("directory not found: {}", dir.display()),
                    ))
                });
        }

        pub fn should_not_dir_files_io_error(&mut self, path: &Path) {
            self.expect_dir_files()
                .with(predicate::eq(PathBuf::from(path)))
                .once()
                .returning(|_| {
                    Err(io::Error::new(
                        io::ErrorKind::PermissionDenied,
                        "permission denied",
                    ))
                });
        }
    }
}
