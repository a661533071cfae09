//! Where config layers are looked up, in precedence order.

use super::{
    ConfigLayerSource, DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILE, LayeredConfigOptions,
    SYSTEM_CONFIG_PATH,
};
use crate::ConfigError;
use directories::BaseDirs;
use log::debug;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Optional file layers below the runtime overrides, lowest precedence first.
pub(super) fn file_candidates(
    options: &LayeredConfigOptions,
    cwd: &Path,
) -> Vec<(ConfigLayerSource, PathBuf)> {
    let project = project_root(cwd, &options.project_root_markers)
        .map(|root| root.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILE));
    if project.is_none() {
        debug!("no project root above cwd (cwd={})", cwd.display());
    }
    [
        (ConfigLayerSource::System, options.system_config_path.clone()),
        (ConfigLayerSource::User, options.user_config_path.clone()),
        (ConfigLayerSource::Project, project),
        (ConfigLayerSource::Cwd, Some(cwd.join(DEFAULT_CONFIG_FILE))),
    ]
    .into_iter()
    .filter_map(|(source, path)| path.map(|path| (source, path)))
    .collect()
}

/// `/etc/biasguard/biasguard.json5` on Unix, the ProgramData path on Windows.
pub(super) fn system_config_path() -> Option<PathBuf> {
    SYSTEM_CONFIG_PATH.map(PathBuf::from)
}

/// `~/.biasguard/biasguard.json5`.
pub(super) fn user_config_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| {
        dirs.home_dir()
            .join(DEFAULT_CONFIG_DIR)
            .join(DEFAULT_CONFIG_FILE)
    })
}

/// Nearest ancestor of `cwd` (inclusive) holding any marker entry.
pub(super) fn project_root(cwd: &Path, markers: &[String]) -> Option<PathBuf> {
    cwd.ancestors()
        .find(|dir| markers.iter().any(|marker| dir.join(marker).exists()))
        .map(Path::to_path_buf)
}

/// Canonical cwd; a directory that does not exist yet is kept as given.
pub(super) fn resolve_cwd(cwd: &Path) -> Result<PathBuf, ConfigError> {
    match cwd.canonicalize() {
        Ok(resolved) => Ok(resolved),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(cwd.to_path_buf()),
        Err(err) => Err(ConfigError::read(cwd, err)),
    }
}

/// Key used to skip a file reached through two layers (e.g. cwd == project).
pub(super) fn dedupe_key(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::project_root;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn project_root_is_nearest_marked_ancestor() {
        let temp = TempDir::new().expect("tmp");
        let root = temp.path().join("repo");
        let nested = root.join("reviews").join("batch-1");
        fs::create_dir_all(&nested).expect("dirs");
        fs::create_dir_all(root.join(".git")).expect("git");

        let markers = vec![".git".to_string()];
        assert_eq!(project_root(&nested, &markers), Some(root.clone()));
        assert_eq!(project_root(&nested, &[]), None);
    }
}
