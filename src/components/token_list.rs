use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::{fs, io, path::Path, path::PathBuf};
use thiserror::Error;

use crate::models::token::OutputRecord;

const INDENT: &[u8] = b"    ";

#[derive(Error, Debug)]
pub enum TokenListError {
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Cannot write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub fn to_token_list_json(tokens: &[OutputRecord]) -> Result<Vec<u8>, TokenListError> {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));

    tokens.serialize(&mut serializer)?;

    Ok(buf)
}

/// Writes the list to `path`, replacing whatever was there.
pub fn write_token_list(path: &Path, tokens: &[OutputRecord]) -> Result<(), TokenListError> {
    let json = to_token_list_json(tokens)?;

    fs::write(path, json).map_err(|source| TokenListError::Io {
        path: path.to_path_buf(),
        source,
    })
}
