use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Files found carrying the quarantine flag under a tree.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QuarantineScan {
    pub flagged: Vec<PathBuf>,
    /// Entries that could not be inspected.
    pub errors: Vec<String>,
}

/// Access to the platform flag marking a file as coming from an untrusted origin.
pub trait Quarantine {
    fn is_quarantined(&self, file: &Path) -> io::Result<bool>;

    fn unquarantine(&self, file: &Path) -> io::Result<()>;

    /// Every regular file under `root` carrying the flag.
    ///
    /// Only an unreadable `root` fails. Entries that cannot be inspected are collected in
    /// [QuarantineScan::errors] and the walk goes on.
    fn list_quarantined(&self, root: &Path) -> io::Result<QuarantineScan> {
        let mut scan = QuarantineScan::default();
        for entry in WalkDir::new(root) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => return Err(err.into()),
                Err(err) => {
                    scan.errors.push(err.to_string());
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            match self.is_quarantined(entry.path()) {
                Ok(true) => scan.flagged.push(entry.into_path()),
                Ok(false) => {}
                Err(err) => scan.errors.push(format!("{}: {err}", entry.path().display())),
            }
        }
        Ok(scan)
    }
}
