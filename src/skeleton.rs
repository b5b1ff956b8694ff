//! Project skeleton embedded in the binary and extracted by `libdragon init`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::LibdragonError;

/// (relative path, contents) of every skeleton file.
pub const SKELETON: &[(&str, &str)] = &[("main.c", include_str!("../templates/main.c"))];

/// Write the skeleton into `dest`.
///
/// Without `force`, nothing is written if any target file already exists.
pub fn extract(dest: &Path, force: bool, verbose: bool) -> Result<Vec<PathBuf>, LibdragonError> {
    if !force {
        if let Some((rel, _)) = SKELETON.iter().find(|(rel, _)| dest.join(rel).exists()) {
            return Err(LibdragonError::SkeletonExists(PathBuf::from(rel)));
        }
    }
    let mut written = Vec::with_capacity(SKELETON.len());
    for (rel, contents) in SKELETON {
        let target = dest.join(rel);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        if verbose {
            println!("extracting: {rel}");
        }
        fs::write(&target, contents)?;
        written.push(target);
    }
    Ok(written)
}
