/*!
Location of the vendored libdragon tree inside a repository.

Two vendoring strategies are recognized:
- submodule: `.gitmodules` has `submodule.<name>.path`; authoritative, checked first.
- subtree: no persistent pointer exists, so commit bodies are mined for the
  `git-subtree-dir: <path>` marker left by `git subtree add/pull --squash`.
  The most recent marker whose last path component is the vendor name wins;
  markers are not validated beyond that.
*/
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::unsync::OnceCell;

use crate::errors::LibdragonError;
use crate::util::CommandRunner;

const SUBTREE_MARKER: &str = "git-subtree-dir:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VendorStrategy {
    Submodule,
    Subtree,
}

impl fmt::Display for VendorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VendorStrategy::Submodule => "submodule",
            VendorStrategy::Subtree => "subtree",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorLocation {
    /// Path relative to the repository root.
    pub path: PathBuf,
    pub strategy: VendorStrategy,
}

impl VendorLocation {
    pub fn absolute(&self, repo_root: &Path) -> PathBuf {
        repo_root.join(&self.path)
    }
}

pub struct VendorResolver<'r> {
    runner: &'r dyn CommandRunner,
    git: String,
    name: String,
    found: OnceCell<Option<VendorLocation>>,
}

impl<'r> VendorResolver<'r> {
    pub fn new(runner: &'r dyn CommandRunner, git: &str, name: &str) -> Self {
        Self {
            runner,
            git: git.to_string(),
            name: name.to_string(),
            found: OnceCell::new(),
        }
    }

    /// Find the vendored tree; the outcome (found or not) is computed once.
    pub fn resolve(&self, repo_root: &Path) -> Option<&VendorLocation> {
        self.found
            .get_or_init(|| {
                let found = self
                    .find_submodule(repo_root)
                    .map(|path| VendorLocation {
                        path,
                        strategy: VendorStrategy::Submodule,
                    })
                    .or_else(|| {
                        self.find_subtree(repo_root).map(|path| VendorLocation {
                            path,
                            strategy: VendorStrategy::Subtree,
                        })
                    });
                tracing::debug!(?found, "vendor resolution");
                found
            })
            .as_ref()
    }

    /// Use an explicit `--directory` when given, otherwise resolve; absent is fatal.
    pub fn resolve_or_override(
        &self,
        repo_root: &Path,
        explicit: Option<&Path>,
    ) -> Result<VendorLocation, LibdragonError> {
        match explicit {
            Some(dir) => validate_override(repo_root, dir),
            None => self
                .resolve(repo_root)
                .cloned()
                .ok_or(LibdragonError::VendorNotFound),
        }
    }

    fn find_submodule(&self, repo_root: &Path) -> Option<PathBuf> {
        let args = vec![
            "config".to_string(),
            "--file".to_string(),
            repo_root.join(".gitmodules").display().to_string(),
            "--get".to_string(),
            format!("submodule.{}.path", self.name),
        ];
        let lines = self.runner.capture_lines(&self.git, &args).ok()?;
        let path = lines.first().map(|l| l.trim()).unwrap_or("");
        if path.is_empty() {
            None
        } else {
            Some(PathBuf::from(path))
        }
    }

    fn find_subtree(&self, repo_root: &Path) -> Option<PathBuf> {
        let args = vec![
            "-C".to_string(),
            repo_root.display().to_string(),
            "log".to_string(),
            "--grep".to_string(),
            SUBTREE_MARKER.to_string(),
            "--format=tformat:%b".to_string(),
        ];
        // An empty repository (no HEAD yet) makes git log fail: nothing vendored.
        let lines = self.runner.capture_lines(&self.git, &args).ok()?;
        lines
            .iter()
            .find_map(|line| parse_subtree_marker(line, &self.name))
    }
}

/// Extract the path from a `git-subtree-dir: <path>` line when its last component is `dir_name`.
pub fn parse_subtree_marker(line: &str, dir_name: &str) -> Option<PathBuf> {
    let rest = line.trim().strip_prefix(SUBTREE_MARKER)?;
    let path = rest.trim().trim_end_matches('/');
    if path.is_empty() {
        return None;
    }
    let p = PathBuf::from(path);
    if p.file_name().and_then(|n| n.to_str()) == Some(dir_name) {
        Some(p)
    } else {
        None
    }
}

/// Validate a user-supplied vendor directory and express it relative to the repository root.
///
/// A `.git` linkage file inside the directory marks a submodule checkout.
pub fn validate_override(repo_root: &Path, dir: &Path) -> Result<VendorLocation, LibdragonError> {
    if !dir.is_dir() {
        return Err(LibdragonError::NotADirectory(dir.to_path_buf()));
    }
    let strategy = if dir.join(".git").is_file() {
        VendorStrategy::Submodule
    } else {
        VendorStrategy::Subtree
    };
    let abs = fs::canonicalize(dir)?;
    let root = fs::canonicalize(repo_root).unwrap_or_else(|_| repo_root.to_path_buf());
    let rel = abs
        .strip_prefix(&root)
        .map_err(|_| LibdragonError::OutsideRepository {
            path: dir.to_path_buf(),
            root: root.clone(),
        })?;
    Ok(VendorLocation {
        path: rel.to_path_buf(),
        strategy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeRunner, Reply};

    fn is_submodule_query(argv: &[String]) -> bool {
        argv.iter().any(|a| a == "submodule.libdragon.path")
    }

    fn is_log_query(argv: &[String]) -> bool {
        argv.iter().any(|a| a == "log")
    }

    #[test]
    fn test_parse_subtree_marker_suffix_component() {
        assert_eq!(
            parse_subtree_marker("git-subtree-dir: libdragon", "libdragon"),
            Some(PathBuf::from("libdragon"))
        );
        assert_eq!(
            parse_subtree_marker("  git-subtree-dir:   third_party/libdragon/ ", "libdragon"),
            Some(PathBuf::from("third_party/libdragon"))
        );
        assert_eq!(parse_subtree_marker("git-subtree-dir: mylibdragon", "libdragon"), None);
        assert_eq!(parse_subtree_marker("git-subtree-dir: libdragon/src", "libdragon"), None);
        assert_eq!(parse_subtree_marker("git-subtree-split: abcdef", "libdragon"), None);
        assert_eq!(parse_subtree_marker("git-subtree-dir:", "libdragon"), None);
    }

    #[test]
    fn test_submodule_wins_over_subtree_markers() {
        let fake = FakeRunner::new(|argv| {
            if is_submodule_query(argv) {
                Reply::Lines(vec!["deps/libdragon".to_string()])
            } else if is_log_query(argv) {
                Reply::Lines(vec!["git-subtree-dir: libdragon".to_string()])
            } else {
                Reply::Fail(1)
            }
        });
        let r = VendorResolver::new(&fake, "git", "libdragon");
        let loc = r.resolve(Path::new("/work/game")).expect("found");
        assert_eq!(loc.path, PathBuf::from("deps/libdragon"));
        assert_eq!(loc.strategy, VendorStrategy::Submodule);
        assert_eq!(fake.count(is_log_query), 0, "history must not be mined");
    }

    #[test]
    fn test_most_recent_subtree_marker_wins() {
        let fake = FakeRunner::new(|argv| {
            if is_submodule_query(argv) {
                Reply::Fail(1)
            } else if is_log_query(argv) {
                Reply::Lines(vec![
                    "git-subtree-dir: vendor/other".to_string(),
                    "git-subtree-split: 1234".to_string(),
                    String::new(),
                    "git-subtree-dir: engine/libdragon".to_string(),
                    "git-subtree-split: 5678".to_string(),
                    "git-subtree-dir: libdragon".to_string(),
                ])
            } else {
                Reply::Fail(1)
            }
        });
        let r = VendorResolver::new(&fake, "git", "libdragon");
        let loc = r.resolve(Path::new("/work/game")).expect("found");
        assert_eq!(loc.path, PathBuf::from("engine/libdragon"));
        assert_eq!(loc.strategy, VendorStrategy::Subtree);
    }

    #[test]
    fn test_absent_is_memoized() {
        let fake = FakeRunner::new(|argv| {
            if is_submodule_query(argv) {
                Reply::Lines(vec![String::new()])
            } else {
                Reply::Lines(vec!["unrelated body".to_string()])
            }
        });
        let r = VendorResolver::new(&fake, "git", "libdragon");
        assert!(r.resolve(Path::new("/work/game")).is_none());
        assert!(r.resolve(Path::new("/work/game")).is_none());
        assert_eq!(fake.calls().len(), 2);
        assert!(matches!(
            r.resolve_or_override(Path::new("/work/game"), None),
            Err(LibdragonError::VendorNotFound)
        ));
    }

    #[test]
    fn test_override_classifies_by_linkage_file() {
        let td = tempfile::tempdir().expect("tmpdir");
        let root = td.path();
        let sub = root.join("deps").join("libdragon");
        fs::create_dir_all(&sub).unwrap();

        let loc = validate_override(root, &sub).expect("valid override");
        assert_eq!(loc.path, PathBuf::from("deps/libdragon"));
        assert_eq!(loc.strategy, VendorStrategy::Subtree);

        fs::write(sub.join(".git"), "gitdir: ../../.git/modules/libdragon\n").unwrap();
        let loc = validate_override(root, &sub).expect("valid override");
        assert_eq!(loc.strategy, VendorStrategy::Submodule);
    }

    #[test]
    fn test_override_rejects_non_directories() {
        let td = tempfile::tempdir().expect("tmpdir");
        let file = td.path().join("libdragon");
        fs::write(&file, "x").unwrap();
        assert!(matches!(
            validate_override(td.path(), &file),
            Err(LibdragonError::NotADirectory(_))
        ));
        assert!(matches!(
            validate_override(td.path(), &td.path().join("missing")),
            Err(LibdragonError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_override_outside_repository_fails() {
        let repo = tempfile::tempdir().expect("tmpdir");
        let elsewhere = tempfile::tempdir().expect("tmpdir");
        assert!(matches!(
            validate_override(repo.path(), elsewhere.path()),
            Err(LibdragonError::OutsideRepository { .. })
        ));
    }
}
