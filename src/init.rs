// src/init.rs

//! `stylewatch init`.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::defaults::{DEFAULT_CONFIG, STARTER_CONFIG, STARTER_PIPELINE};
use crate::config::CONFIG_FILE_NAME;
use crate::errors::{Result, StyleError};
use crate::fs::FileSystem;
use crate::pipeline::PIPELINE_FILE_NAME;

fn write_new(fs: &dyn FileSystem, path: &Path, contents: &str) -> Result<()> {
    if fs.exists(path) {
        return Err(StyleError::Config(format!("{:?} already exists", path)));
    }
    fs.write(path, contents.trim_start().as_bytes())?;
    info!(file = ?path, "created");
    Ok(())
}

/// Write starter files into `dir`; returns the files created.
///
/// Existing files are never overwritten.
pub fn init_project(fs: &dyn FileSystem, dir: &Path, pipeline: bool, full: bool) -> Result<Vec<PathBuf>> {
    let mut created = Vec::new();

    let config = dir.join(CONFIG_FILE_NAME);
    let contents = if full { DEFAULT_CONFIG } else { STARTER_CONFIG };
    write_new(fs, &config, contents)?;
    created.push(config);

    if pipeline {
        let declaration = dir.join(PIPELINE_FILE_NAME);
        write_new(fs, &declaration, STARTER_PIPELINE)?;
        created.push(declaration);
    }

    Ok(created)
}
