//! `iconsync init <design-repo> <dev-repo> --name <pair> [--design-dir D] [--dev-dir D] [--ext ...]`

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use iconsync_core::{config, RepoSide};

/// Register a designer/dev repository pair.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Root of the designer repository.
    pub design_repo: PathBuf,

    /// Root of the dev repository.
    pub dev_repo: PathBuf,

    /// Pair name. Creates ~/.iconsync/pairs/<name>.yaml
    #[arg(long, short = 'n')]
    pub name: String,

    /// Icon tree inside the designer repository (defaults to its root).
    #[arg(long, value_name = "DIR")]
    pub design_dir: Option<PathBuf>,

    /// Icon tree inside the dev repository (defaults to its root).
    #[arg(long, value_name = "DIR")]
    pub dev_dir: Option<PathBuf>,

    /// Tracked file extensions, comma-separated (default: svg,png).
    #[arg(long = "ext", value_name = "EXT", value_delimiter = ',')]
    pub extensions: Vec<String>,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let design = side(&self.design_repo, self.design_dir, "design")?;
        let dev = side(&self.dev_repo, self.dev_dir, "dev")?;
        let extensions = if self.extensions.is_empty() {
            None
        } else {
            Some(
                self.extensions
                    .iter()
                    .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
                    .filter(|ext| !ext.is_empty())
                    .collect(),
            )
        };

        let pair = config::init(&self.name, design, dev, extensions)
            .with_context(|| format!("failed to init pair '{}'", self.name))?;

        println!("✓ Registered pair '{}'", pair.name);
        println!("  design: {}", pair.design.tree_root().display());
        println!("  dev:    {}", pair.dev.tree_root().display());
        println!("  Saved to: ~/.iconsync/pairs/{}.yaml", pair.name);
        Ok(())
    }
}

fn side(repo: &Path, dir: Option<PathBuf>, label: &str) -> Result<RepoSide> {
    let repo = repo
        .canonicalize()
        .with_context(|| format!("cannot resolve {label} repository '{}'", repo.display()))?;
    Ok(RepoSide {
        dir,
        ..RepoSide::new(repo)
    })
}
