//! Apps as deployable directory trees and the operations to install them.
pub mod installer;
pub mod state;
pub mod version;

use crate::defaults::PACKAGE_DEFAULT_DIR;
use std::path::{Path, PathBuf};

/// Directory of a package holding its `<version>.version` marker.
pub fn default_dir(package_dir: &Path) -> PathBuf {
    package_dir.join(PACKAGE_DEFAULT_DIR)
}
