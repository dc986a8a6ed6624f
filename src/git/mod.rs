//! Git diff retrieval.
//!
//! The correlator only consumes parsed diff content; where that content
//! comes from is a collaborator concern. [`DiffSource`] is the seam, and
//! [`GitDiffSource`] is the default implementation reading straight from a
//! repository with `git2`.

use crate::models::{CommitDiff, DiffLine, FileDiff};
use crate::{Error, Result};
use git2::{Diff, DiffOptions, Repository};
use std::cell::RefCell;
use std::path::PathBuf;

/// Commit field sentinel for the uncommitted working state.
pub const WORKING_STATE: &str = "working";

/// Provider of commit diffs for the correlator.
pub trait DiffSource {
    /// Diff of the commit named by `rev` against its first parent.
    fn commit_diff(&self, rev: &str) -> Result<CommitDiff>;

    /// Diff of the uncommitted working state against `HEAD`.
    fn working_diff(&self) -> Result<CommitDiff>;
}

/// Reads commit diffs from a local repository.
pub struct GitDiffSource {
    repo_path: PathBuf,
}

impl GitDiffSource {
    /// Creates a source for the repository at `repo_path`.
    #[must_use]
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
        }
    }

    fn open(&self) -> Result<Repository> {
        Repository::open(&self.repo_path).map_err(|e| git_err("open_repository", &e))
    }
}

impl DiffSource for GitDiffSource {
    fn commit_diff(&self, rev: &str) -> Result<CommitDiff> {
        let repo = self.open()?;
        let object = repo
            .revparse_single(rev)
            .map_err(|e| Error::InvalidInput(format!("unknown revision '{rev}': {e}")))?;
        let commit = object
            .peel_to_commit()
            .map_err(|e| Error::InvalidInput(format!("'{rev}' is not a commit: {e}")))?;

        let tree = commit.tree().map_err(|e| git_err("commit_tree", &e))?;
        let parent_tree = match commit.parent(0) {
            Ok(parent) => Some(parent.tree().map_err(|e| git_err("parent_tree", &e))?),
            Err(_) => None,
        };

        let mut options = DiffOptions::new();
        let diff = repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut options))
            .map_err(|e| git_err("diff_tree_to_tree", &e))?;

        Ok(CommitDiff {
            commit: commit.id().to_string(),
            author: commit.author().name().unwrap_or("unknown").to_string(),
            timestamp: commit.time().seconds().saturating_mul(1000),
            message: commit.summary().unwrap_or_default().to_string(),
            files: collect_files(&diff)?,
        })
    }

    fn working_diff(&self) -> Result<CommitDiff> {
        let repo = self.open()?;
        let head_tree = repo
            .head()
            .and_then(|head| head.peel_to_tree())
            .map_err(|e| git_err("head_tree", &e))?;

        let mut options = DiffOptions::new();
        options.include_untracked(true).recurse_untracked_dirs(true);
        let diff = repo
            .diff_tree_to_workdir_with_index(Some(&head_tree), Some(&mut options))
            .map_err(|e| git_err("diff_workdir", &e))?;

        Ok(CommitDiff {
            commit: WORKING_STATE.to_string(),
            author: String::new(),
            timestamp: crate::current_timestamp_millis(),
            message: String::new(),
            files: collect_files(&diff)?,
        })
    }
}

/// Walks a libgit2 diff into per-file added/removed lines.
fn collect_files(diff: &Diff<'_>) -> Result<Vec<FileDiff>> {
    let files = RefCell::new(Vec::<FileDiff>::new());

    diff.foreach(
        &mut |delta, _| {
            let path = delta
                .new_file()
                .path()
                .or_else(|| delta.old_file().path())
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default();
            files.borrow_mut().push(FileDiff {
                path,
                ..FileDiff::default()
            });
            true
        },
        None,
        None,
        Some(&mut |_delta, _hunk, line| {
            let mut files = files.borrow_mut();
            let Some(current) = files.last_mut() else {
                return true;
            };
            let content = String::from_utf8_lossy(line.content())
                .trim_end_matches(['\r', '\n'])
                .to_string();
            match line.origin() {
                '+' => {
                    current.added += 1;
                    current.added_lines.push(DiffLine {
                        content,
                        line_number: line.new_lineno().unwrap_or(0),
                    });
                },
                '-' => {
                    current.removed += 1;
                    current.removed_lines.push(DiffLine {
                        content,
                        line_number: line.old_lineno().unwrap_or(0),
                    });
                },
                _ => {},
            }
            true
        }),
    )
    .map_err(|e| git_err("diff_foreach", &e))?;

    Ok(files.into_inner())
}

fn git_err(operation: &str, error: &git2::Error) -> Error {
    Error::OperationFailed {
        operation: operation.to_string(),
        cause: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;
    use std::fs;
    use std::path::Path;

    fn commit_file(repo: &Repository, name: &str, content: &str, message: &str) -> git2::Oid {
        let workdir = repo.workdir().unwrap();
        fs::write(workdir.join(name), content).unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(Path::new(name)).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();

        let signature = Signature::now("dev", "dev@example.com").unwrap();
        let parent = repo
            .head()
            .ok()
            .and_then(|head| head.peel_to_commit().ok());
        let parents: Vec<_> = parent.iter().collect();
        repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .unwrap()
    }

    #[test]
    fn test_commit_diff_against_parent() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        commit_file(&repo, "a.ts", "const x = 1;\n", "initial");
        commit_file(&repo, "a.ts", "const x = 1;\nconst y = 2;\n", "add y");

        let source = GitDiffSource::new(dir.path());
        let diff = source.commit_diff("HEAD").unwrap();

        assert_eq!(diff.message, "add y");
        assert_eq!(diff.author, "dev");
        assert_eq!(diff.files.len(), 1);
        assert_eq!(diff.files[0].path, "a.ts");
        assert_eq!(diff.files[0].added, 1);
        assert_eq!(diff.files[0].added_lines[0].content, "const y = 2;");
        assert_eq!(diff.files[0].added_lines[0].line_number, 2);
        assert_eq!(diff.files[0].removed, 0);
    }

    #[test]
    fn test_root_commit_diffs_against_empty() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        commit_file(&repo, "a.ts", "line one\n", "initial");

        let source = GitDiffSource::new(dir.path());
        let diff = source.commit_diff("HEAD").unwrap();
        assert_eq!(diff.files[0].added, 1);
        assert_eq!(diff.files[0].added_lines[0].content, "line one");
    }

    #[test]
    fn test_working_diff_sees_uncommitted_change() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        commit_file(&repo, "a.ts", "const x = 1;\n", "initial");
        fs::write(dir.path().join("a.ts"), "const x = 2;\n").unwrap();

        let source = GitDiffSource::new(dir.path());
        let diff = source.working_diff().unwrap();

        assert_eq!(diff.commit, WORKING_STATE);
        assert_eq!(diff.files.len(), 1);
        assert_eq!(diff.files[0].removed_lines[0].content, "const x = 1;");
        assert_eq!(diff.files[0].added_lines[0].content, "const x = 2;");
    }

    #[test]
    fn test_unknown_revision_is_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        Repository::init(dir.path()).unwrap();

        let source = GitDiffSource::new(dir.path());
        let result = source.commit_diff("does-not-exist");
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}
