use super::quarantine::Quarantine;
use std::io;
use std::path::Path;

cfg_if::cfg_if! {
    if #[cfg(target_os = "macos")] {
        /// Set by the system on files coming from a download.
        pub const QUARANTINE_ATTRIBUTE: &str = "com.apple.quarantine";
    } else {
        /// Origin recorded by browsers and download managers following the freedesktop convention.
        pub const QUARANTINE_ATTRIBUTE: &str = "user.xdg.origin.url";
    }
}

/// Quarantine flag stored as an extended attribute of the file.
#[derive(Debug, Clone)]
pub struct ExtendedAttributesQuarantine {
    attribute: String,
}

impl Default for ExtendedAttributesQuarantine {
    fn default() -> Self {
        Self::new(QUARANTINE_ATTRIBUTE)
    }
}

impl ExtendedAttributesQuarantine {
    pub fn new(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
        }
    }
}

impl Quarantine for ExtendedAttributesQuarantine {
    fn is_quarantined(&self, file: &Path) -> io::Result<bool> {
        match xattr::get(file, &self.attribute) {
            Ok(value) => Ok(value.is_some()),
            // Filesystems without extended attributes cannot carry the flag.
            Err(err) if err.kind() == io::ErrorKind::Unsupported => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn unquarantine(&self, file: &Path) -> io::Result<()> {
        match xattr::remove(file, &self.attribute) {
            Ok(()) => Ok(()),
            Err(err) if !self.is_quarantined(file).unwrap_or(true) => {
                tracing::trace!(file = %file.display(), "attribute already gone: {err}");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitizer::quarantine::QuarantineScan;
    use std::fs::write;

    // Not every filesystem hosting the temporary directory supports user attributes.
    fn flag_supported(file: &Path, attribute: &str) -> bool {
        xattr::set(file, attribute, b"https://example.com/pluginA.tgz").is_ok()
    }

    #[test]
    fn test_unflagged_file() {
        let tempdir = tempfile::tempdir().unwrap();
        let file = tempdir.path().join("inputs.conf");
        write(&file, "").unwrap();

        let quarantine = ExtendedAttributesQuarantine::new("user.test.quarantine");
        assert!(!quarantine.is_quarantined(&file).unwrap());
        assert_eq!(
            quarantine.list_quarantined(tempdir.path()).unwrap(),
            QuarantineScan::default()
        );
    }

    #[test]
    fn test_flagged_file_is_unblocked() {
        let tempdir = tempfile::tempdir().unwrap();
        let file = tempdir.path().join("inputs.conf");
        write(&file, "").unwrap();

        let quarantine = ExtendedAttributesQuarantine::new("user.test.quarantine");
        if !flag_supported(&file, "user.test.quarantine") {
            return;
        }

        assert_eq!(
            quarantine.list_quarantined(tempdir.path()).unwrap().flagged,
            vec![file.clone()]
        );
        quarantine.unquarantine(&file).unwrap();
        assert!(!quarantine.is_quarantined(&file).unwrap());
    }

    #[test]
    fn test_unquarantine_missing_file_fails() {
        let tempdir = tempfile::tempdir().unwrap();
        let quarantine = ExtendedAttributesQuarantine::default();
        assert!(quarantine.unquarantine(&tempdir.path().join("missing")).is_err());
    }
}
