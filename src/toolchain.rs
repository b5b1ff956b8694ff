/*!
Toolchain image selection.

Precedence (first match wins):
1. explicit override for this run (persisted to the cache file when asked to)
2. `tools/.docker-toolchain` inside the vendored libdragon tree
3. `.git/libdragon-docker-image` cache file
4. the built-in default image

Tiers 2 and 3 are best-effort reads: any error means "tier not present".
*/
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::vendor::VendorResolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    Override,
    Vendor,
    Cache,
    Default,
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ImageSource::Override => "override",
            ImageSource::Vendor => "libdragon",
            ImageSource::Cache => "cache",
            ImageSource::Default => "default",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainImage {
    pub reference: String,
    pub source: ImageSource,
}

enum VendorDir<'a> {
    None,
    Dir(PathBuf),
    /// Looked up through the resolver only when tier 1 did not match.
    Lazy(&'a VendorResolver<'a>),
}

pub struct ToolchainResolver<'a> {
    settings: &'a Settings,
    repo_root: Option<PathBuf>,
    vendor: VendorDir<'a>,
    explicit: Option<(String, bool)>,
}

impl<'a> ToolchainResolver<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self {
            settings,
            repo_root: None,
            vendor: VendorDir::None,
            explicit: None,
        }
    }

    pub fn repo_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.repo_root = Some(root.into());
        self
    }

    pub fn vendor_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.vendor = VendorDir::Dir(dir.into());
        self
    }

    pub fn vendor_resolver(mut self, resolver: &'a VendorResolver<'a>) -> Self {
        self.vendor = VendorDir::Lazy(resolver);
        self
    }

    /// Use `image` for this run; with `persist` it is also written to the cache file.
    pub fn override_image(mut self, image: Option<String>, persist: bool) -> Self {
        self.explicit = image
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(|s| (s, persist));
        self
    }

    pub fn resolve_image(&self) -> ToolchainImage {
        if let Some((image, persist)) = &self.explicit {
            if *persist {
                if let Some(root) = &self.repo_root {
                    if let Err(e) = persist_image(self.settings, root, image) {
                        tracing::debug!(error = %e, "could not persist toolchain override");
                    }
                }
            }
            return found(image.clone(), ImageSource::Override);
        }
        if let Some(dir) = self.vendor_path() {
            if let Some(image) = read_image_file(&self.settings.vendor_toolchain_path(&dir)) {
                return found(image, ImageSource::Vendor);
            }
        }
        if let Some(root) = &self.repo_root {
            if let Some(image) = read_image_file(&self.settings.image_cache_path(root)) {
                return found(image, ImageSource::Cache);
            }
        }
        found(self.settings.default_image.clone(), ImageSource::Default)
    }

    fn vendor_path(&self) -> Option<PathBuf> {
        match &self.vendor {
            VendorDir::None => None,
            VendorDir::Dir(dir) => Some(dir.clone()),
            VendorDir::Lazy(resolver) => {
                let root = self.repo_root.as_deref()?;
                resolver.resolve(root).map(|loc| loc.absolute(root))
            }
        }
    }
}

fn found(reference: String, source: ImageSource) -> ToolchainImage {
    tracing::debug!(%reference, %source, "toolchain image");
    ToolchainImage { reference, source }
}

fn read_image_file(p: &Path) -> Option<String> {
    fs::read_to_string(p)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Write the toolchain cache file (single reference, trailing newline).
pub fn persist_image(settings: &Settings, repo_root: &Path, image: &str) -> io::Result<()> {
    fs::write(settings.image_cache_path(repo_root), format!("{image}\n"))
}
