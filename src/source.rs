use std::{
    fs,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::debug;

use crate::{
    ast::IdlFile,
    parser::{self, ParseOptions},
    token::Spanned,
};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read `{}`", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("`{}` has {} syntax error(s)", .path.display(), .errors.len())]
    Syntax {
        path: PathBuf,
        /// The parsed text, for rendering error positions.
        src: String,
        /// The best-effort tree.
        file: Box<IdlFile>,
        errors: Vec<Spanned<parser::Error>>,
    },
}

/// Parses the file at `path`, or `src` if it is given, in which case nothing
/// is read and `path` only names the input.
///
/// Bytes are decoded leniently; invalid UTF-8 sequences are replaced rather
/// than rejected. Imports are recorded but never followed.
pub fn parse_path(
    path: &Path,
    src: Option<&str>,
    options: ParseOptions,
) -> Result<IdlFile, SourceError> {
    let src = match src {
        Some(src) => src.to_owned(),
        None => read_lossy(path)?,
    };
    debug!(path = %path.display(), bytes = src.len(), "parsing");

    parser::parse_file_with(&src, options).map_err(|(file, errors)| SourceError::Syntax {
        path: path.to_owned(),
        src,
        file: Box::new(file),
        errors,
    })
}

fn read_lossy(path: &Path) -> Result<String, SourceError> {
    let bytes = fs::read(path).map_err(|source| SourceError::Io {
        path: path.to_owned(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
