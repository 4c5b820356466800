//! Loading of the demonstration fixture set.
//!
//! The embedded set is used unless a file override is configured. Override
//! files are read through `cap_std`.

use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use chrono::{DateTime, Utc};
use example_data::{FixtureError, FixtureSet};
use thiserror::Error;

use crate::domain::{FixtureConversionError, Post, fixture_posts};

/// Errors returned while loading fixtures.
#[derive(Debug, Error)]
pub enum FixtureLoadError {
    /// Fixture file could not be read.
    #[error("failed to read fixtures at {path}: {source}")]
    Read {
        /// Path to the fixture file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Fixture document failed validation.
    #[error("fixture parse error: {0}")]
    Parse(#[from] FixtureError),
    /// A fixture record could not become a post.
    #[error("fixture conversion error: {0}")]
    Convert(#[from] FixtureConversionError),
}

/// Load the fixture set from `path`, or the embedded set when `None`.
pub fn load_fixture_set(path: Option<&Path>) -> Result<FixtureSet, FixtureLoadError> {
    match path {
        Some(path) => {
            let contents = read_fixture_file(path)?;
            Ok(FixtureSet::from_json(&contents)?)
        }
        None => Ok(FixtureSet::embedded()?),
    }
}

/// Load fixtures and resolve them into posts relative to `now`.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use petgram::fixtures::load_fixture_posts;
///
/// let posts = load_fixture_posts(None, Utc::now()).expect("embedded fixtures load");
/// assert_eq!(posts.len(), 3);
/// ```
pub fn load_fixture_posts(
    path: Option<&Path>,
    now: DateTime<Utc>,
) -> Result<Vec<Post>, FixtureLoadError> {
    let set = load_fixture_set(path)?;
    Ok(fixture_posts(&set, now)?)
}

fn read_fixture_file(path: &Path) -> Result<String, FixtureLoadError> {
    let read_error = |source| FixtureLoadError::Read {
        path: path.to_path_buf(),
        source,
    };
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path.file_name().ok_or_else(|| {
        read_error(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "fixtures path must be a file",
        ))
    })?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(read_error)?;
    dir.read_to_string(Path::new(file_name)).map_err(read_error)
}
