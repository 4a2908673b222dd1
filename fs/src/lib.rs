//! Small filesystem abstractions used by the installer.
//!
//! Each operation lives behind its own trait so that callers can be generic over exactly the
//! capabilities they need, and tests can swap the real [LocalFile] by a mock.

pub mod file;

pub use file::LocalFile;
pub use file::copier::{CopySummary, DirectoryCopier};
pub use file::deleter::FileDeleter;
pub use file::reader::FileReader;

#[cfg(feature = "mocks")]
pub use file::mock;
