use assert_cmd::Command;
use std::fs::{create_dir_all, write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const APP: &str = "pluginA";

/// Source package, agent apps directory and host config of an installer run.
pub struct TestHost {
    pub dir: TempDir,
}

impl TestHost {
    pub fn new(restart_command: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        create_dir_all(dir.path().join("source")).unwrap();
        create_dir_all(dir.path().join("apps")).unwrap();
        write(
            dir.path().join("config.yaml"),
            format!(
                r#"
service:
  name: agent
  restart_command: {restart_command}
  restart_grace: 0s
"#
            ),
        )
        .unwrap();
        Self { dir }
    }

    pub fn source(&self) -> PathBuf {
        self.dir.path().join("source")
    }

    pub fn apps(&self) -> PathBuf {
        self.dir.path().join("apps")
    }

    pub fn installed(&self, file: &str) -> PathBuf {
        self.apps().join(APP).join(file)
    }

    pub fn write_source(&self, files: &[(&str, &str)]) {
        write_tree(&self.source().join(APP), files);
    }

    pub fn write_installed(&self, files: &[(&str, &str)]) {
        write_tree(&self.apps().join(APP), files);
    }

    /// Installer command for this host, with the app name already set.
    pub fn installer(&self) -> Command {
        let mut cmd = Command::cargo_bin("agent-app-installer").unwrap();
        cmd.env_remove("LOG_LEVEL")
            .arg("--app-folder-name")
            .arg(APP)
            .arg("--app-source-path")
            .arg(self.source())
            .arg("--install-root")
            .arg(self.apps())
            .arg("--config")
            .arg(self.dir.path().join("config.yaml"));
        cmd
    }
}

pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (file, content) in files {
        let path = root.join(file);
        create_dir_all(path.parent().unwrap()).unwrap();
        write(path, content).unwrap();
    }
}
