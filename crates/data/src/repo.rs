//! Local checkout management for the example-data repository.
//!
//! Guarantees a working copy of the pinned dataset revision exists on
//! disk before any sample file is read from it. Callers must not sync
//! the same path from several processes at once; no locking is done.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use git2::{ObjectType, Repository, build::CheckoutBuilder};
use thiserror::Error;

/// Remote repository holding the sample assets.
pub const EXAMPLE_DATA_URL: &str = "https://github.com/voxel-foundation/fvdb-example-data.git";

/// Revision of the data repository the examples are written against.
pub const EXAMPLE_DATA_REV: &str = "613c3a4e220eb45b9ae0271dca4808ab484ee134";

const REPO_DIR_NAME: &str = "fvdb_example_data";

/// Where the example-data checkout lives on disk.
#[derive(Clone, Debug)]
pub enum DataLayout {
    /// Running from a source checkout: data goes into
    /// `<source_root>/external/`.
    SourceCheckout { source_root: PathBuf },
    /// Running from an installed package: data goes into the system
    /// temporary directory.
    Installed,
}

#[derive(Debug, Error)]
pub enum RepoError {
    /// The target path is occupied by something that is not a git
    /// working copy. Never auto-resolved.
    #[error("A path {0} exists but is not a git repo")]
    NotARepository(PathBuf),
}

/// Resolve the directory the example-data repository is stored in.
/// Creates the `external/` directory for the source layout if missing.
pub fn local_repo_path(layout: &DataLayout) -> Result<PathBuf> {
    let base = match layout {
        DataLayout::SourceCheckout { source_root } => {
            let external = source_root.join("external");
            if !external.exists() {
                fs::create_dir_all(&external).with_context(|| {
                    format!("Failed to create data directory {}", external.display())
                })?;
            }
            external
        }
        DataLayout::Installed => std::env::temp_dir(),
    };
    Ok(base.join(REPO_DIR_NAME))
}

/// Ensure `path` holds a working copy of `url` checked out at `rev`.
///
/// Reuses an existing checkout in place, clones if the path is absent,
/// and refuses to touch a path occupied by anything else.
pub fn sync_repo(path: &Path, url: &str, rev: &str) -> Result<()> {
    if path.exists() {
        let repo = match Repository::open(path) {
            Ok(repo) => repo,
            Err(_) => anyhow::bail!(RepoError::NotARepository(path.to_path_buf())),
        };
        log::info!("Reusing example-data checkout at {}", path.display());
        checkout_rev(&repo, rev)
    } else {
        log::info!("Cloning {} into {}", url, path.display());
        let repo = Repository::clone(url, path)?;
        checkout_rev(&repo, rev)
    }
}

fn checkout_rev(repo: &Repository, rev: &str) -> Result<()> {
    let commit = repo.revparse_single(rev)?.peel(ObjectType::Commit)?;
    repo.checkout_tree(&commit, Some(CheckoutBuilder::new().force()))?;
    repo.set_head_detached(commit.id())?;
    log::info!("Checked out revision {}", rev);
    Ok(())
}

/// Fetch the pinned example-data repository and return its local path.
pub fn fetch_example_data(layout: &DataLayout) -> Result<PathBuf> {
    let path = local_repo_path(layout)?;
    sync_repo(&path, EXAMPLE_DATA_URL, EXAMPLE_DATA_REV)?;
    Ok(path)
}
