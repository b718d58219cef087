use crate::error::{ReleaseError, Result};
use git2::{Repository as Git2Repo, StatusOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Discover the git repository containing `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path.as_ref())
            .map_err(|e| ReleaseError::NotARepository(e.message().to_string()))?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    fn workdir(&self) -> Result<&Path> {
        self.repo
            .workdir()
            .ok_or_else(|| ReleaseError::NotARepository("repository is bare".to_string()))
    }

    fn relative_to_workdir(&self, path: &Path) -> Result<PathBuf> {
        let workdir = self.workdir()?;
        if let Ok(relative) = path.strip_prefix(workdir) {
            return Ok(relative.to_path_buf());
        }

        let canonical_workdir = workdir.canonicalize()?;
        let canonical = path.canonicalize()?;
        canonical
            .strip_prefix(&canonical_workdir)
            .map(Path::to_path_buf)
            .map_err(|_| {
                ReleaseError::Git(git2::Error::from_str(&format!(
                    "{} is outside the working tree",
                    path.display()
                )))
            })
    }
}

/// Credentials for fetch/push: SSH keys from ~/.ssh, the SSH agent, the
/// configured credential helper, then libgit2 defaults.
fn remote_callbacks<'a>(config: Option<git2::Config>) -> git2::RemoteCallbacks<'a> {
    let mut callbacks = git2::RemoteCallbacks::new();

    callbacks.credentials(move |url, username_from_url, allowed_types| {
        let username = username_from_url.unwrap_or("git");

        if allowed_types.contains(git2::CredentialType::SSH_KEY) {
            if let Some(home) = dirs::home_dir() {
                for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                    let path = home.join(".ssh").join(key);
                    if path.exists() {
                        if let Ok(cred) = git2::Cred::ssh_key(username, None, &path, None) {
                            return Ok(cred);
                        }
                    }
                }
            }

            if let Ok(cred) = git2::Cred::ssh_key_from_agent(username) {
                return Ok(cred);
            }
        }

        if allowed_types.contains(git2::CredentialType::USER_PASS_PLAINTEXT) {
            if let Some(config) = config.as_ref() {
                if let Ok(cred) = git2::Cred::credential_helper(config, url, username_from_url) {
                    return Ok(cred);
                }
            }
        }

        git2::Cred::default()
    });

    callbacks.push_update_reference(|refname, status| match status {
        Some(status) => {
            warn!(refname, status, "remote rejected reference");
            Err(git2::Error::from_str(&format!(
                "Push failed for {}: {}",
                refname, status
            )))
        }
        None => Ok(()),
    });

    callbacks
}

impl super::Repository for Git2Repository {
    fn uncommitted_files(&self) -> Result<Vec<String>> {
        let mut options = StatusOptions::new();
        options.include_untracked(true).include_ignored(false);

        let statuses = self.repo.statuses(Some(&mut options))?;
        let files = statuses
            .iter()
            .filter(|entry| !entry.status().is_empty() && !entry.status().is_ignored())
            .filter_map(|entry| entry.path().map(str::to_string))
            .collect();

        Ok(files)
    }

    fn current_branch(&self) -> Result<Option<String>> {
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if head.is_branch() {
            Ok(head.shorthand().map(str::to_string))
        } else {
            Ok(None)
        }
    }

    fn stage_paths(&self, paths: &[PathBuf]) -> Result<()> {
        let mut index = self.repo.index()?;
        for path in paths {
            let relative = self.relative_to_workdir(path)?;
            debug!(path = %relative.display(), "staging");
            index.add_path(&relative)?;
        }
        index.write()?;
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<String> {
        let signature = self.repo.signature()?;
        let mut index = self.repo.index()?;
        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;

        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => None,
            Err(e) => return Err(e.into()),
        };
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        let oid = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &parents,
        )?;
        Ok(oid.to_string())
    }

    fn tag_exists(&self, name: &str) -> Result<bool> {
        match self.repo.find_reference(&format!("refs/tags/{}", name)) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn create_tag(&self, name: &str) -> Result<()> {
        let head = self.repo.head()?.peel_to_commit()?;
        self.repo.tag_lightweight(name, head.as_object(), false)?;
        Ok(())
    }

    fn push(&self, remote: &str, branch: Option<&str>, tag: Option<&str>) -> Result<()> {
        let mut remote = self.repo.find_remote(remote)?;

        let mut refspecs = Vec::new();
        if let Some(branch) = branch {
            refspecs.push(format!("refs/heads/{0}:refs/heads/{0}", branch));
        }
        if let Some(tag) = tag {
            refspecs.push(format!("refs/tags/{0}:refs/tags/{0}", tag));
        }
        if refspecs.is_empty() {
            return Ok(());
        }

        let mut push_options = git2::PushOptions::new();
        push_options.remote_callbacks(remote_callbacks(self.repo.config().ok()));

        remote.push(&refspecs, Some(&mut push_options))?;
        Ok(())
    }
}
