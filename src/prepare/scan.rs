use anyhow::{Context, Result};
use blake3::Hasher;
use ignore::WalkBuilder;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const ROUTES_FILE: &str = "config/routes.rb";
pub const ROUTES_DIR: &str = "config/routes/";

#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub rel_path: String,
    pub abs_path: PathBuf,
    pub hash: String,
    pub size: u64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    pub no_ignore: bool,
}

impl ScanOptions {
    pub fn new(no_ignore: bool) -> Self {
        Self { no_ignore }
    }
}

/// `config/routes.rb` plus anything under `config/routes/` drawn from it.
pub fn is_route_file(rel_path: &str) -> bool {
    rel_path == ROUTES_FILE || (rel_path.starts_with(ROUTES_DIR) && rel_path.ends_with(".rb"))
}

pub fn scan_route_files(repo_root: &Path, options: ScanOptions) -> Result<Vec<ScannedFile>> {
    let mut files = Vec::new();
    let mut builder = WalkBuilder::new(repo_root);
    if options.no_ignore {
        builder
            .ignore(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .parents(false);
    } else {
        builder
            .ignore(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .parents(true)
            .require_git(false);
    }
    let walker = builder
        .hidden(false)
        .filter_entry(|entry| !is_ignored_entry(entry))
        .build();

    for entry in walker {
        let entry = match entry {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, "walk error");
                continue;
            }
        };
        if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
            continue;
        }
        let path = entry.path();
        let rel_path = crate::util::normalize_rel_path(repo_root, path)?;
        if !is_route_file(&rel_path) {
            continue;
        }
        files.push(scanned_file(rel_path, path)?);
    }
    // "config/routes.rb" sorts before "config/routes/..."
    files.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
    Ok(files)
}

/// A single explicitly named file, whatever its location.
pub fn scan_path(repo_root: &Path, path: &Path) -> Result<ScannedFile> {
    let abs = if path.is_absolute() {
        path.to_path_buf()
    } else {
        repo_root.join(path)
    };
    let rel_path = crate::util::normalize_rel_path(repo_root, &abs)
        .unwrap_or_else(|_| crate::util::normalize_path(&abs));
    scanned_file(rel_path, &abs)
}

fn scanned_file(rel_path: String, path: &Path) -> Result<ScannedFile> {
    let metadata = fs::metadata(path).with_context(|| format!("stat {}", path.display()))?;
    let hash = hash_file(path).with_context(|| format!("hash {}", path.display()))?;
    Ok(ScannedFile {
        rel_path,
        abs_path: path.to_path_buf(),
        hash,
        size: metadata.len(),
    })
}

fn is_ignored_entry(entry: &ignore::DirEntry) -> bool {
    if entry.depth() == 0 {
        return false;
    }
    match entry.file_name() {
        name if name == OsStr::new(".git") => true,
        name if name == OsStr::new("node_modules") => true,
        name if name == OsStr::new("tmp") => true,
        _ => false,
    }
}

fn hash_file(path: &Path) -> Result<String> {
    let data = fs::read(path)?;
    let mut hasher = Hasher::new();
    hasher.update(&data);
    Ok(hasher.finalize().to_hex().to_string())
}
