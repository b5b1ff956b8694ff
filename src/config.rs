/*!
Fixed names and env-derived settings.

Environment (trimmed, empty means unset):
- LIBDRAGON_GIT / LIBDRAGON_BRANCH: upstream used by `init` and `update`.
- LIBDRAGON_COLOR, NO_COLOR: see color.rs.
- LIBDRAGON_LOG: tracing filter, read by the binary.
*/
use std::env;
use std::path::{Path, PathBuf};

/// Image used when neither an override, the vendored tree nor the cache names one.
pub const DOCKER_IMAGE: &str = "anacierdem/libdragon";
/// Container pointer file, inside the repository's `.git` directory.
pub const CONTAINER_FILE: &str = "libdragon-docker-container";
/// Persisted toolchain override, inside the repository's `.git` directory.
pub const IMAGE_CACHE_FILE: &str = "libdragon-docker-image";
/// Image declared by the vendored tree, relative to its root.
pub const TOOLCHAIN_FILE: &str = "tools/.docker-toolchain";
pub const VOLUME_ROOT: &str = "/app";
pub const RUNTIME_MARKER: &str = "IS_DOCKER=true";
pub const LIBDRAGON_GIT: &str = "https://github.com/DragonMinded/libdragon";
pub const LIBDRAGON_BRANCH: &str = "trunk";
pub const LIBDRAGON_SUBMODULE: &str = "libdragon";

/// Helper: read an env var, trim, and return Some when non-empty.
fn env_trim(k: &str) -> Option<String> {
    env::var(k)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub git: String,
    pub docker: String,
    /// Submodule name and subtree directory name of the vendored tree.
    pub vendor_name: String,
    pub vendor_git: String,
    pub vendor_branch: String,
    pub default_image: String,
    pub volume_root: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            git: "git".to_string(),
            docker: "docker".to_string(),
            vendor_name: LIBDRAGON_SUBMODULE.to_string(),
            vendor_git: LIBDRAGON_GIT.to_string(),
            vendor_branch: LIBDRAGON_BRANCH.to_string(),
            default_image: DOCKER_IMAGE.to_string(),
            volume_root: VOLUME_ROOT.to_string(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let mut s = Self::default();
        if let Some(url) = env_trim("LIBDRAGON_GIT") {
            s.vendor_git = url;
        }
        if let Some(branch) = env_trim("LIBDRAGON_BRANCH") {
            s.vendor_branch = branch;
        }
        s
    }

    /// Version-control metadata directory of a repository root.
    pub fn metadata_dir(&self, repo_root: &Path) -> PathBuf {
        repo_root.join(".git")
    }

    pub fn container_record_path(&self, repo_root: &Path) -> PathBuf {
        self.metadata_dir(repo_root).join(CONTAINER_FILE)
    }

    pub fn image_cache_path(&self, repo_root: &Path) -> PathBuf {
        self.metadata_dir(repo_root).join(IMAGE_CACHE_FILE)
    }

    pub fn vendor_toolchain_path(&self, vendor_dir: &Path) -> PathBuf {
        vendor_dir.join(TOOLCHAIN_FILE)
    }
}
