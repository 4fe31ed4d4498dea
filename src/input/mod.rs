use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

pub mod coeffs;
pub mod meta;

use coeffs::load_coeffs;
use meta::{FileMeta, MetaField, parse_file_meta};

#[derive(Debug, Error)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing input: {0}")]
    MissingInput(String),
    #[error("no usable input: {0}")]
    NoUsableInput(String),
}

/// One coefficient dump, loaded and gap-filled, with metadata taken from
/// its file name. Immutable after construction.
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub path: PathBuf,
    pub base: String,
    pub meta: FileMeta,
    pub coeffs: Vec<f64>,
}

impl LoadedFile {
    /// Truncation length M of the coefficient sequence.
    pub fn m(&self) -> usize {
        self.coeffs.len()
    }
}

/// Discover and load every usable coefficient dump under `input_dir`.
///
/// Files named `coeffs_*.txt` are taken from the directory itself and from
/// one level of subdirectories (the generator writes per-R subdirectories).
/// The result is sorted by path so downstream output ordering is
/// reproducible. Files that yield zero coefficients, or that fail to open
/// or read, are skipped with a warning; one file's failure never discards
/// the others. Only a missing directory or zero usable files is fatal.
pub fn load_inputs(input_dir: &Path) -> Result<Vec<LoadedFile>, InputError> {
    let paths = discover_coeff_files(input_dir)?;
    if paths.is_empty() {
        return Err(InputError::NoUsableInput(format!(
            "no coefficient files found in {}",
            input_dir.display()
        )));
    }
    info!(
        "discovered {} coefficient file(s) in {}",
        paths.len(),
        input_dir.display()
    );

    let mut loaded = Vec::with_capacity(paths.len());
    for path in paths {
        let base = file_base(&path);
        let coeffs = match load_coeffs(&path) {
            Ok(coeffs) => coeffs,
            Err(err) => {
                warn!("{}: failed to read: {err}; skipping file", base);
                continue;
            }
        };
        if coeffs.is_empty() {
            warn!("{}: no usable coefficients; skipping file", base);
            continue;
        }
        if coeffs[0] != 1.0 {
            warn!("{}: a(1) = {} (expected normalized 1.0)", base, coeffs[0]);
        }
        let meta = parse_file_meta(&base);
        if matches!(meta.r, MetaField::Unparsed) {
            warn!("{}: could not parse R from file name; using NaN", base);
        }
        if matches!(meta.y, MetaField::Unparsed) {
            warn!("{}: could not parse Y from file name; using NaN", base);
        }
        loaded.push(LoadedFile {
            path,
            base,
            meta,
            coeffs,
        });
    }

    if loaded.is_empty() {
        return Err(InputError::NoUsableInput(format!(
            "every coefficient file in {} was empty",
            input_dir.display()
        )));
    }
    Ok(loaded)
}

/// Sorted paths of `coeffs_*.txt` files in `input_dir` and its immediate
/// subdirectories.
pub fn discover_coeff_files(input_dir: &Path) -> Result<Vec<PathBuf>, InputError> {
    if !input_dir.is_dir() {
        return Err(InputError::MissingInput(format!(
            "input directory not found: {}",
            input_dir.display()
        )));
    }

    let mut out = Vec::new();
    collect_coeff_files(input_dir, &mut out)?;
    for entry in std::fs::read_dir(input_dir)? {
        let Ok(entry) = entry else {
            continue;
        };
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            if let Err(err) = collect_coeff_files(&entry.path(), &mut out) {
                warn!(
                    "{}: unreadable subdirectory: {err}; skipping it",
                    entry.path().display()
                );
            }
        }
    }
    out.sort();
    Ok(out)
}

fn collect_coeff_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), InputError> {
    for entry in std::fs::read_dir(dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("{}: unreadable directory entry: {err}", dir.display());
                continue;
            }
        };
        // Symlinks stay in: a target that fails to open is handled by the
        // per-file skip in load_inputs, not by aborting discovery.
        if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            continue;
        }
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with("coeffs_") && name.ends_with(".txt") {
            out.push(entry.path());
        }
    }
    Ok(())
}

fn file_base(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;
