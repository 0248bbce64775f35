//! Program loading and saving.
//!
//! Programs are stored as JSON (`.json`) or `MessagePack` (`.msgpack`). Both
//! use the same serde representation, with integers past the safe range
//! written as decimal strings.

use std::fs;
use std::path::Path;

use choicelog_foundation::{Error, ErrorKind, Result};
use choicelog_language::Program;

/// On-disk program encodings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Json,
    MessagePack,
}

impl Format {
    fn of(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("msgpack" | "mp") => Ok(Self::MessagePack),
            _ => Err(Error::new(ErrorKind::Serialization(format!(
                "unknown program format for '{}': expected .json or .msgpack",
                path.display()
            )))),
        }
    }
}

fn serialization(e: impl std::fmt::Display) -> Error {
    Error::new(ErrorKind::Serialization(e.to_string()))
}

/// Serializes a program to `MessagePack` bytes.
///
/// Uses named serialization to preserve struct field names.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn program_to_bytes(program: &Program) -> Result<Vec<u8>> {
    rmp_serde::to_vec_named(program).map_err(serialization)
}

/// Deserializes a program from `MessagePack` bytes.
///
/// # Errors
///
/// Returns an error if deserialization fails.
pub fn program_from_bytes(bytes: &[u8]) -> Result<Program> {
    rmp_serde::from_slice(bytes).map_err(serialization)
}

/// Loads a program, choosing the decoder by file extension.
///
/// # Errors
///
/// Returns an error if the file cannot be read, has an unknown extension, or
/// does not decode.
pub fn load_program<P: AsRef<Path>>(path: P) -> Result<Program> {
    let path = path.as_ref();
    let format = Format::of(path)?;
    let bytes = fs::read(path).map_err(|e| {
        Error::new(ErrorKind::Io(format!(
            "failed to read file '{}': {e}",
            path.display()
        )))
    })?;

    match format {
        Format::Json => serde_json::from_slice(&bytes).map_err(serialization),
        Format::MessagePack => program_from_bytes(&bytes),
    }
}

/// Saves a program, choosing the encoder by file extension.
///
/// # Errors
///
/// Returns an error if the extension is unknown, encoding fails, or the file
/// cannot be written.
pub fn save_program<P: AsRef<Path>>(program: &Program, path: P) -> Result<()> {
    let path = path.as_ref();
    let bytes = match Format::of(path)? {
        Format::Json => serde_json::to_vec_pretty(program).map_err(serialization)?,
        Format::MessagePack => program_to_bytes(program)?,
    };

    fs::write(path, bytes).map_err(|e| {
        Error::new(ErrorKind::Io(format!(
            "failed to write file '{}': {e}",
            path.display()
        )))
    })
}
