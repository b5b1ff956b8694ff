#![allow(clippy::module_name_repetitions)]
//! Color mode configuration and ANSI painting helpers.
//!
//! Output policy:
//! - Progress lines go to stdout in green (`log_progress_stdout`).
//! - Errors and refusals go to stderr in red (`log_error_stderr`).
//! - Verbose notices (`launching: ...`, `container found: ...`) stay uncolored.
//! - Precompute `color_enabled_*` once per scope and reuse it.

use clap::ValueEnum;
use once_cell::sync::OnceCell;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

static COLOR_MODE: OnceCell<ColorMode> = OnceCell::new();

pub fn set_color_mode(mode: ColorMode) {
    let _ = COLOR_MODE.set(mode);
}

fn parse_color_mode(s: &str) -> Option<ColorMode> {
    match s.trim().to_ascii_lowercase().as_str() {
        "auto" => Some(ColorMode::Auto),
        "always" | "on" | "true" | "yes" => Some(ColorMode::Always),
        "never" | "off" | "false" | "no" => Some(ColorMode::Never),
        _ => None,
    }
}

fn env_color_mode_pref() -> Option<ColorMode> {
    std::env::var("LIBDRAGON_COLOR")
        .ok()
        .and_then(|v| parse_color_mode(&v))
}

fn no_color_env() -> bool {
    // Per https://no-color.org/
    std::env::var("NO_COLOR").is_ok()
}

fn resolve(mode: Option<ColorMode>, no_color: bool, is_tty: bool) -> bool {
    if no_color {
        return false;
    }
    match mode {
        Some(ColorMode::Always) => true,
        Some(ColorMode::Never) => false,
        Some(ColorMode::Auto) | None => is_tty,
    }
}

fn color_enabled_for(is_tty: bool) -> bool {
    // CLI flag first, then LIBDRAGON_COLOR; NO_COLOR beats both
    let mode = COLOR_MODE.get().copied().or_else(env_color_mode_pref);
    resolve(mode, no_color_env(), is_tty)
}

pub fn color_enabled_stdout() -> bool {
    color_enabled_for(atty::is(atty::Stream::Stdout))
}

pub fn color_enabled_stderr() -> bool {
    color_enabled_for(atty::is(atty::Stream::Stderr))
}

/// Wrap string with ANSI color code when enabled; otherwise return unchanged.
pub fn paint(enabled: bool, code: &str, s: &str) -> String {
    if enabled {
        format!("{code}{s}\x1b[0m")
    } else {
        s.to_string()
    }
}

pub fn log_progress_stdout(use_color: bool, msg: &str) {
    println!("{}", paint(use_color, "\x1b[32m", msg));
}

pub fn log_error_stderr(use_color: bool, msg: &str) {
    eprintln!("{}", paint(use_color, "\x1b[31;1m", msg));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color_mode_aliases() {
        assert_eq!(parse_color_mode(" Always "), Some(ColorMode::Always));
        assert_eq!(parse_color_mode("off"), Some(ColorMode::Never));
        assert_eq!(parse_color_mode("auto"), Some(ColorMode::Auto));
        assert_eq!(parse_color_mode("purple"), None);
    }

    #[test]
    fn test_no_color_wins_over_always() {
        assert!(!resolve(Some(ColorMode::Always), true, true));
        assert!(resolve(Some(ColorMode::Always), false, false));
        assert!(!resolve(Some(ColorMode::Never), false, true));
        assert!(resolve(None, false, true));
        assert!(!resolve(Some(ColorMode::Auto), false, false));
    }

    #[test]
    fn test_paint_disabled_is_identity() {
        assert_eq!(paint(false, "\x1b[32m", "Updating libdragon..."), "Updating libdragon...");
        assert_eq!(paint(true, "\x1b[32m", "x"), "\x1b[32mx\x1b[0m");
    }
}
