use std::fs;
use std::path::{Path, PathBuf};

use libdragon::LibdragonError;

use super::Context;

/// Directory levels walked upwards when looking for an ELF file.
const ELF_SEARCH_DEPTH: usize = 10;

pub(crate) fn run_exec(ctx: &Context<'_>, args: &[String]) -> Result<(), LibdragonError> {
    let root = ctx.repo.locate_or_start().to_path_buf();
    let settings = ctx.docker_settings()?;
    ctx.with_session(&settings, &root, None, |s| s.dispatch(&root, &ctx.cwd, args))
}

pub(crate) fn run_make(ctx: &Context<'_>, args: &[String]) -> Result<(), LibdragonError> {
    let mut command = vec!["make".to_string()];
    command.extend(args.iter().cloned());
    run_exec(ctx, &command)
}

pub(crate) fn run_disasm(
    ctx: &Context<'_>,
    symbol: Option<&str>,
    file: Option<&Path>,
) -> Result<(), LibdragonError> {
    let file = match file {
        Some(f) => f.to_path_buf(),
        None => find_elf(&ctx.cwd, ctx.repo.locate())?,
    };
    let mut command = vec!["mips64-elf-objdump".to_string(), "-S".to_string()];
    if let Some(sym) = symbol {
        command.push(format!("--disassemble={sym}"));
    }
    command.push(file.display().to_string());
    run_exec(ctx, &command)
}

/// Find the single `*.elf` in `cwd` or `cwd/build`, walking up to the repository root
/// (or the filesystem root). The returned path is relative to `cwd`.
pub(crate) fn find_elf(cwd: &Path, stop_at: Option<&Path>) -> Result<PathBuf, LibdragonError> {
    let mut rel = PathBuf::new();
    for _ in 0..ELF_SEARCH_DEPTH {
        for dir in [rel.clone(), rel.join("build")] {
            let mut found = elf_files(&cwd.join(&dir));
            match found.len() {
                0 => continue,
                1 => return Ok(dir.join(found.remove(0))),
                _ => return Err(LibdragonError::ElfAmbiguous(cwd.join(&dir))),
            }
        }
        let here = cwd.join(&rel);
        let abs = fs::canonicalize(&here).unwrap_or(here);
        if Some(abs.as_path()) == stop_at || abs.parent().is_none() {
            break;
        }
        rel.push("..");
    }
    Err(LibdragonError::ElfNotFound)
}

fn elf_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|e| PathBuf::from(e.file_name()))
        .filter(|n| n.extension().and_then(|x| x.to_str()) == Some("elf"))
        .collect();
    names.sort();
    names
}
