//! Command glue: each subcommand resolves what it needs through the library and
//! finishes with at most one user-visible action.

mod exec;
mod init;
mod update;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use libdragon::{
    docker, CommandRunner, ContainerSession, LibdragonError, RepoLocator, Settings,
    ToolchainResolver, VendorResolver,
};

use crate::cli::{Cli, Command};

/// Per-invocation state: settings plus the memoized repository and vendor lookups.
pub(crate) struct Context<'r> {
    pub(crate) settings: Settings,
    pub(crate) runner: &'r dyn CommandRunner,
    pub(crate) cwd: PathBuf,
    pub(crate) repo: RepoLocator<'r>,
    pub(crate) vendor: VendorResolver<'r>,
    use_color: bool,
}

impl<'r> Context<'r> {
    pub(crate) fn new(runner: &'r dyn CommandRunner) -> Result<Self, LibdragonError> {
        let settings = Settings::from_env();
        let cwd = {
            let p = env::current_dir()?;
            fs::canonicalize(&p).unwrap_or(p)
        };
        let repo = RepoLocator::new(runner, &settings.git, cwd.clone());
        let vendor = VendorResolver::new(runner, &settings.git, &settings.vendor_name);
        Ok(Self {
            settings,
            runner,
            cwd,
            repo,
            vendor,
            use_color: libdragon::color_enabled_stdout(),
        })
    }

    pub(crate) fn verbose(&self) -> bool {
        self.runner.verbose()
    }

    pub(crate) fn progress(&self, msg: &str) {
        libdragon::log_progress_stdout(self.use_color, msg);
    }

    /// Settings with `docker` pointing at the runtime binary found on PATH.
    pub(crate) fn docker_settings(&self) -> Result<Settings, LibdragonError> {
        let runtime = docker::container_runtime_path()?;
        Ok(Settings {
            docker: runtime.display().to_string(),
            ..self.settings.clone()
        })
    }

    /// Build a container session for `root` and hand it to `f`.
    ///
    /// `image` overrides the toolchain image for this run only; otherwise the
    /// vendored tree is consulted lazily, when a container must be created.
    pub(crate) fn with_session<T>(
        &self,
        settings: &Settings,
        root: &Path,
        image: Option<String>,
        f: impl FnOnce(&ContainerSession<'_>) -> Result<T, LibdragonError>,
    ) -> Result<T, LibdragonError> {
        let toolchain = ToolchainResolver::new(settings)
            .repo_root(root)
            .vendor_resolver(&self.vendor)
            .override_image(image, false);
        let session = ContainerSession::new(self.runner, settings, &toolchain);
        f(&session)
    }
}

pub(crate) fn dispatch(cli: &Cli, runner: &dyn CommandRunner) -> Result<(), LibdragonError> {
    let ctx = Context::new(runner)?;
    match &cli.command {
        Command::Init {
            force,
            submodule,
            image,
        } => init::run_init(&ctx, *force, *submodule, image.clone()),
        Command::Start { image } => run_start(&ctx, image.clone()),
        Command::Stop => run_stop(&ctx),
        Command::Exec { args } => exec::run_exec(&ctx, args),
        Command::Make { args } => exec::run_make(&ctx, args),
        Command::Disasm { symbol, file } => {
            exec::run_disasm(&ctx, symbol.as_deref(), file.as_deref())
        }
        Command::Update {
            directory,
            revision,
            image,
        } => update::run_update(&ctx, directory.as_deref(), revision.as_deref(), image.clone()),
        Command::Toolchain => run_toolchain(&ctx),
    }
}

fn run_start(ctx: &Context<'_>, image: Option<String>) -> Result<(), LibdragonError> {
    // Outside a repository the current directory is mounted, without a record.
    let root = ctx.repo.locate_or_start().to_path_buf();
    let settings = ctx.docker_settings()?;
    let id = ctx
        .with_session(&settings, &root, image, |s| s.resolve(&root, true))?
        .ok_or(LibdragonError::ContainerNotCreated)?;
    println!("{id}");
    Ok(())
}

fn run_stop(ctx: &Context<'_>) -> Result<(), LibdragonError> {
    let root = ctx.repo.must_locate()?.to_path_buf();
    let settings = ctx.docker_settings()?;
    let removed = ctx.with_session(&settings, &root, None, |s| s.teardown(&root))?;
    if removed.is_none() && ctx.verbose() {
        println!("no container found for {}", root.display());
    }
    Ok(())
}

fn run_toolchain(ctx: &Context<'_>) -> Result<(), LibdragonError> {
    let mut resolver = ToolchainResolver::new(&ctx.settings);
    if let Some(root) = ctx.repo.locate() {
        resolver = resolver.repo_root(root).vendor_resolver(&ctx.vendor);
    }
    let image = resolver.resolve_image();
    println!("{} ({})", image.reference, image.source);
    Ok(())
}
