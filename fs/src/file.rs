pub mod copier;
pub mod deleter;
pub mod reader;

/// Filesystem-backed implementation of every trait in this crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFile;

////////////////////////////////////////////////////////////////////////////////////
// Mock
////////////////////////////////////////////////////////////////////////////////////
#[cfg(feature = "mocks")]
pub mod mock {
    use super::copier::{CopySummary, DirectoryCopier};
    use super::deleter::FileDeleter;
    use super::reader::FileReader;
    use mockall::mock;
    use std::io;
    use std::path::{Path, PathBuf};

    mock! {
        pub LocalFile {}

        impl FileReader for LocalFile {
            fn dir_files(&self, dir_path: &Path) -> io::Result<Vec<PathBuf>>;
        }

        impl FileDeleter for LocalFile {
            fn delete(&self, file_path: &Path) -> io::Result<()>;
        }

        impl DirectoryCopier for LocalFile {
            fn copy_overlay(&self, source: &Path, destination: &Path) -> io::Result<CopySummary>;
        }
    }
}
