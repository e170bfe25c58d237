use std::path::Path;

use git2::{ErrorCode, Repository};

use crate::error::ResolveError;

/// URL of the first configured remote of the repository at `dir`.
///
/// `Ok(None)` means the directory is a repository with no remotes (or a
/// remote without a readable URL); callers degrade rather than fail.
/// `Err` means the directory is not a working copy or its metadata could
/// not be read. The repository handle lives only for this call.
pub fn first_remote_url(dir: &Path) -> Result<Option<String>, ResolveError> {
    let repo = Repository::open(dir).map_err(|source| match source.code() {
        ErrorCode::NotFound => ResolveError::NotARepository {
            dir: dir.to_path_buf(),
        },
        _ => ResolveError::GitAccess {
            dir: dir.to_path_buf(),
            source,
        },
    })?;

    let names = repo.remotes().map_err(|source| ResolveError::GitAccess {
        dir: dir.to_path_buf(),
        source,
    })?;
    let Some(first) = names.iter().flatten().next() else {
        return Ok(None);
    };

    let remote = repo
        .find_remote(first)
        .map_err(|source| ResolveError::GitAccess {
            dir: dir.to_path_buf(),
            source,
        })?;
    Ok(remote.url().map(ToOwned::to_owned))
}
