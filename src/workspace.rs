//! Output workspace preparation and final manifest serialization.
//!
//! The migration mutates working copies, so before anything runs the source
//! tree is deep-copied into a fresh output directory and all branch work
//! happens against the copy. Repeated runs are therefore reproducible from
//! the same input. The updated manifests are written into the output
//! directory root at the end.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::distribution_file::Distribution;
use crate::error::{Error, Result};
use crate::repos_file::ReposFile;

/// File name of the repository list manifest in the output directory.
pub const REPOS_FILE_NAME: &str = "ros2.repos";
/// File name of the distribution manifest in the output directory.
pub const DISTRIBUTION_FILE_NAME: &str = "distribution.yaml";

/// Prepare the output workspace and return the path of the copied source
/// tree (`<out_dir>/src`).
///
/// Fails with [`Error::SourceTreeMissing`] if `src_root` does not exist.
/// Any pre-existing output directory is removed recursively first, then the
/// source tree is deep-copied (including `.git` directories, since branch
/// mutation happens against the copy).
pub fn prepare(src_root: &Path, out_dir: &Path) -> Result<PathBuf> {
    if !src_root.exists() {
        return Err(Error::SourceTreeMissing {
            path: src_root.display().to_string(),
        });
    }

    if out_dir.exists() {
        fs::remove_dir_all(out_dir).map_err(|e| Error::Filesystem {
            message: format!("Failed to remove '{}': {}", out_dir.display(), e),
        })?;
    }
    fs::create_dir_all(out_dir).map_err(|e| Error::Filesystem {
        message: format!("Failed to create '{}': {}", out_dir.display(), e),
    })?;

    let out_src = out_dir.join("src");
    copy_tree(src_root, &out_src)?;
    Ok(out_src)
}

fn copy_tree(from: &Path, to: &Path) -> Result<()> {
    for entry in WalkDir::new(from) {
        let entry = entry.map_err(|e| Error::Filesystem {
            message: format!("Failed to walk '{}': {}", from.display(), e),
        })?;
        let relative = entry.path().strip_prefix(from).map_err(|e| Error::Filesystem {
            message: format!("Failed to relativize '{}': {}", entry.path().display(), e),
        })?;
        let dest = to.join(relative);

        let file_type = entry.file_type();
        if file_type.is_dir() {
            fs::create_dir_all(&dest).map_err(|e| Error::Filesystem {
                message: format!("Failed to create '{}': {}", dest.display(), e),
            })?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &dest)?;
        } else {
            fs::copy(entry.path(), &dest).map_err(|e| Error::Filesystem {
                message: format!(
                    "Failed to copy '{}' to '{}': {}",
                    entry.path().display(),
                    dest.display(),
                    e
                ),
            })?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dest: &Path) -> Result<()> {
    let target = fs::read_link(src).map_err(|e| Error::Filesystem {
        message: format!("Failed to read link '{}': {}", src.display(), e),
    })?;
    std::os::unix::fs::symlink(&target, dest).map_err(|e| Error::Filesystem {
        message: format!("Failed to create link '{}': {}", dest.display(), e),
    })
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dest: &Path) -> Result<()> {
    // Fall back to copying the link target's content.
    fs::copy(src, dest)
        .map(|_| ())
        .map_err(|e| Error::Filesystem {
            message: format!(
                "Failed to copy '{}' to '{}': {}",
                src.display(),
                dest.display(),
                e
            ),
        })
}

/// Serialize both manifests into the output directory root.
pub fn write_manifests(
    out_dir: &Path,
    repos_file: &ReposFile,
    distribution: &Distribution,
) -> Result<()> {
    let repos_path = out_dir.join(REPOS_FILE_NAME);
    fs::write(&repos_path, serde_yaml::to_string(repos_file)?).map_err(|e| Error::Filesystem {
        message: format!("Failed to write '{}': {}", repos_path.display(), e),
    })?;

    let distribution_path = out_dir.join(DISTRIBUTION_FILE_NAME);
    fs::write(&distribution_path, serde_yaml::to_string(distribution)?).map_err(|e| {
        Error::Filesystem {
            message: format!("Failed to write '{}': {}", distribution_path.display(), e),
        }
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_prepare_missing_source_tree_fails() {
        let temp = TempDir::new().unwrap();
        let err = prepare(&temp.path().join("missing"), &temp.path().join("out")).unwrap_err();
        assert!(matches!(err, Error::SourceTreeMissing { .. }));
    }

    #[test]
    fn test_prepare_copies_nested_tree() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("data/src");
        fs::create_dir_all(src.join("ros2/rclcpp/.git")).unwrap();
        fs::write(src.join("ros2/rclcpp/.git/HEAD"), "ref: refs/heads/master").unwrap();
        fs::write(src.join("ros2/rclcpp/package.xml"), "<package/>").unwrap();

        let out = temp.path().join("out");
        let out_src = prepare(&src, &out).unwrap();

        assert_eq!(out_src, out.join("src"));
        assert!(out_src.join("ros2/rclcpp/package.xml").exists());
        // .git comes along; branch mutation happens against the copy
        assert_eq!(
            fs::read_to_string(out_src.join("ros2/rclcpp/.git/HEAD")).unwrap(),
            "ref: refs/heads/master"
        );
    }

    #[test]
    fn test_prepare_replaces_existing_output_directory() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(&src).unwrap();

        let out = temp.path().join("out");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("stale.txt"), "stale").unwrap();

        prepare(&src, &out).unwrap();
        assert!(!out.join("stale.txt").exists());
        assert!(out.join("src").exists());
    }

    #[test]
    fn test_write_manifests_round_trips() {
        let temp = TempDir::new().unwrap();

        let repos_file: ReposFile = serde_yaml::from_str(
            "repositories:\n  ros2/rclcpp:\n    type: git\n    url: u\n    version: humble\n",
        )
        .unwrap();
        let distribution: Distribution = serde_yaml::from_str(
            "repositories:\n  rclcpp:\n    doc:\n      version: humble\n    source:\n      version: humble\n",
        )
        .unwrap();

        write_manifests(temp.path(), &repos_file, &distribution).unwrap();

        let written: ReposFile = serde_yaml::from_str(
            &fs::read_to_string(temp.path().join(REPOS_FILE_NAME)).unwrap(),
        )
        .unwrap();
        assert_eq!(written, repos_file);

        let written: Distribution = serde_yaml::from_str(
            &fs::read_to_string(temp.path().join(DISTRIBUTION_FILE_NAME)).unwrap(),
        )
        .unwrap();
        assert_eq!(written, distribution);
    }
}
