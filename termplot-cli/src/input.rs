// ABOUTME: Classifies command-line inputs as stdin, local files or remote URLs
// ABOUTME: Derives the display name sent with each image

use crate::downloader::validate_url;
use anyhow::{Context, Result};
use std::io::{self, Read};
use std::path::PathBuf;
use url::Url;

pub const STDIN_MARKER: &str = "-";

/// Name shown for URLs whose path has no final segment
const FALLBACK_URL_NAME: &str = "image";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Stdin,
    File(PathBuf),
    Url(Url),
    /// An argument that could not be classified; reported when its turn comes
    Invalid { arg: String, reason: String },
}

impl Input {
    /// Classify one argument. Only malformed http(s) URLs are rejected.
    pub fn parse(arg: &str) -> Result<Self> {
        if arg == STDIN_MARKER {
            return Ok(Input::Stdin);
        }

        if is_remote(arg) {
            return validate_url(arg).map(Input::Url);
        }

        Ok(Input::File(PathBuf::from(arg)))
    }

    /// Like [`Input::parse`], keeping a rejected argument as [`Input::Invalid`]
    pub fn classify(arg: &str) -> Self {
        Self::parse(arg).unwrap_or_else(|e| Input::Invalid {
            arg: arg.to_string(),
            reason: format!("{:#}", e),
        })
    }

    /// What to call this input in diagnostics
    pub fn describe(&self) -> String {
        match self {
            Input::Stdin => "<stdin>".to_string(),
            Input::File(path) => path.display().to_string(),
            Input::Url(url) => url.to_string(),
            Input::Invalid { arg, .. } => arg.clone(),
        }
    }

    /// Name transmitted with the image; stdin has none
    pub fn display_name(&self) -> Option<Vec<u8>> {
        match self {
            Input::Stdin | Input::Invalid { .. } => None,
            Input::File(path) => path
                .file_name()
                .map(|name| name.as_encoded_bytes().to_vec()),
            Input::Url(url) => {
                let segment = url
                    .path_segments()
                    .and_then(|mut segments| segments.next_back())
                    .filter(|segment| !segment.is_empty())
                    .unwrap_or(FALLBACK_URL_NAME);
                Some(segment.as_bytes().to_vec())
            }
        }
    }
}

fn is_remote(arg: &str) -> bool {
    let lower = arg.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Read a local file whole
pub fn read_file(path: &std::path::Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| path.display().to_string())
}

/// Read all of `reader`
pub fn read_all<R: Read + ?Sized>(reader: &mut R) -> io::Result<Vec<u8>> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    Ok(data)
}

/// OS error number of the first I/O failure in `error`'s chain
pub fn exit_code_for(error: &anyhow::Error) -> i32 {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<io::Error>())
        .and_then(io::Error::raw_os_error)
        .filter(|code| *code > 0)
        .unwrap_or(1)
}
