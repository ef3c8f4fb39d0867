//! Patch series and programmatic source edits
//!
//! Patches are an ordered quilt-style series applied with the system
//! `patch` tool; edits are small pure text transforms baked into a recipe
//! declaration for known upstream build-script bugs. Both run on a freshly
//! extracted tree, so edits must be written to be idempotent.

use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::{debug, info};

use crate::BuildError;

/// One declared source edit: a file inside the unpacked tree and a pure
/// text transform applied to its whole contents
#[derive(Clone)]
pub struct Edit {
    pub path: PathBuf,
    pub apply: fn(&str) -> String,
}

impl Edit {
    pub fn new(path: impl Into<PathBuf>, apply: fn(&str) -> String) -> Self {
        Self {
            path: path.into(),
            apply,
        }
    }
}

impl std::fmt::Debug for Edit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Edit").field("path", &self.path).finish()
    }
}

/// Parse a quilt `series` file: one patch filename per line, blank lines
/// and `#` comments skipped
pub fn parse_series(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect()
}

/// Apply the patch series under `series_dir` to the tree at `src`, in
/// declaration order.
///
/// The first failing patch aborts with the tool's stderr and leaves the
/// tree partially patched; that is a fatal condition requiring operator
/// cleanup, not something to retry.
pub async fn apply_series(src: &Path, series_dir: &Path) -> Result<(), BuildError> {
    let series = tokio::fs::read_to_string(series_dir.join("series")).await?;

    for name in parse_series(&series) {
        let patch_file = series_dir.join(name);
        info!("Applying {}", name);

        let output = Command::new("patch")
            .arg("-p1")
            .arg("-i")
            .arg(&patch_file)
            .current_dir(src)
            .output()
            .await?;

        if !output.status.success() {
            return Err(BuildError::PatchFailed {
                patch: name.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }
    }

    Ok(())
}

/// Apply the declared edits to the tree at `src`, in declaration order
pub async fn apply_edits(src: &Path, edits: &[Edit]) -> Result<(), BuildError> {
    for edit in edits {
        let path = src.join(&edit.path);
        debug!("Editing {:?}", path);

        let text = tokio::fs::read_to_string(&path).await?;
        let new_text = (edit.apply)(&text);
        tokio::fs::write(&path, new_text).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_series() {
        let text = "\
# fixes from upstream master
0001-fix-configure.patch

0002-disable-docs.patch
  0003-indented.patch  \n";
        assert_eq!(
            parse_series(text),
            vec![
                "0001-fix-configure.patch",
                "0002-disable-docs.patch",
                "0003-indented.patch"
            ]
        );
    }

    #[tokio::test]
    async fn test_apply_edits() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("configure.ac"), "AC_INIT(X)\nAM_CONFIG_HEADER\n")
            .await
            .unwrap();

        let edits = vec![
            Edit::new("configure.ac", |s| s.replace("X", "Y")),
            Edit::new("configure.ac", |s| {
                s.replace("AM_CONFIG_HEADER", "AC_CONFIG_HEADERS")
            }),
        ];
        apply_edits(dir.path(), &edits).await.unwrap();

        let text = tokio::fs::read_to_string(dir.path().join("configure.ac"))
            .await
            .unwrap();
        assert_eq!(text, "AC_INIT(Y)\nAC_CONFIG_HEADERS\n");
        assert!(!text.contains("X"));
    }

    #[tokio::test]
    async fn test_edit_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let edits = vec![Edit::new("absent.c", |s| s.to_string())];

        let result = apply_edits(dir.path(), &edits).await;
        assert!(matches!(result, Err(BuildError::Io(_))));
    }
}
