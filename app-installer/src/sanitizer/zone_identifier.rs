use super::quarantine::Quarantine;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

/// Alternate data stream written by browsers and mail clients on downloaded files.
pub const ZONE_IDENTIFIER_STREAM: &str = "Zone.Identifier";

/// Quarantine flag stored in the `Zone.Identifier` stream of an NTFS file.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZoneIdentifierQuarantine;

fn zone_identifier_path(file: &Path) -> PathBuf {
    let mut stream = OsString::from(file.as_os_str());
    stream.push(":");
    stream.push(ZONE_IDENTIFIER_STREAM);
    PathBuf::from(stream)
}

impl Quarantine for ZoneIdentifierQuarantine {
    fn is_quarantined(&self, file: &Path) -> io::Result<bool> {
        match std::fs::metadata(zone_identifier_path(file)) {
            Ok(_) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                // The stream is missing, but the file must exist.
                std::fs::metadata(file).map(|_| false)
            }
            Err(err) => Err(err),
        }
    }

    fn unquarantine(&self, file: &Path) -> io::Result<()> {
        match std::fs::remove_file(zone_identifier_path(file)) {
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            result => result,
        }
    }
}
