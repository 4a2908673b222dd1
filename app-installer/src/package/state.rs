use super::version::{VersionId, VersionMarker};

/// Relation between the app to install and what is already on the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallState {
    NotInstalled,
    SameVersion,
    /// Another version is installed. Its markers become stale once the new version is copied.
    ///
    /// A previous run that could not remove a stale marker leaves more than one behind, so
    /// every installed marker not matching the source version is listed here.
    DifferentVersion { stale: Vec<VersionMarker> },
}

pub fn resolve(source: &VersionId, installed: Vec<VersionMarker>) -> InstallState {
    if installed.is_empty() {
        return InstallState::NotInstalled;
    }
    let stale: Vec<VersionMarker> = installed
        .into_iter()
        .filter(|marker| &marker.version != source)
        .collect();
    if stale.is_empty() {
        InstallState::SameVersion
    } else {
        InstallState::DifferentVersion { stale }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn marker(version: &str) -> VersionMarker {
        VersionMarker {
            version: VersionId::from_test(version),
            path: PathBuf::from(format!("/apps/pluginA/default/{version}.version")),
        }
    }

    #[test]
    fn test_nothing_installed() {
        assert_eq!(
            resolve(&VersionId::from_test("2.1.0"), vec![]),
            InstallState::NotInstalled
        );
    }

    #[test]
    fn test_same_version_installed() {
        assert_eq!(
            resolve(&VersionId::from_test("2.1.0"), vec![marker("2.1.0")]),
            InstallState::SameVersion
        );
    }

    #[test]
    fn test_different_version_installed() {
        assert_eq!(
            resolve(&VersionId::from_test("2.1.0"), vec![marker("2.0.9")]),
            InstallState::DifferentVersion {
                stale: vec![marker("2.0.9")]
            }
        );
    }

    #[test]
    fn test_older_looking_version_is_still_different() {
        // No ordering is applied, a "downgrade" is just another version.
        assert_eq!(
            resolve(&VersionId::from_test("1.0"), vec![marker("1.0.0")]),
            InstallState::DifferentVersion {
                stale: vec![marker("1.0.0")]
            }
        );
    }

    #[test]
    fn test_leftover_markers_next_to_the_source_version_are_stale() {
        assert_eq!(
            resolve(&VersionId::from_test("2.1.0"), vec![marker("2.0.0"), marker("2.1.0")]),
            InstallState::DifferentVersion {
                stale: vec![marker("2.0.0")]
            }
        );
    }

    #[test]
    fn test_several_other_versions_are_all_stale() {
        assert_eq!(
            resolve(&VersionId::from_test("3.0"), vec![marker("1.0"), marker("2.0")]),
            InstallState::DifferentVersion {
                stale: vec![marker("1.0"), marker("2.0")]
            }
        );
    }
}
