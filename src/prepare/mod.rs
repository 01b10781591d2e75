use crate::config::Config;
use crate::error::PrepareError;
use crate::model::{RouteFile, RouteRecord, RouteTable, RunStats};
use crate::registry::RouteRegistry;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};
use tree_sitter::Parser;

pub mod actions;
pub mod controller;
pub mod node;
pub mod routes;
pub mod scan;
pub mod scope;

/// One static pass over a family of project files.
///
/// Only the route pass exists; model and controller passes would plug in here.
pub trait Prepare {
    fn name(&self) -> &'static str;
    fn interesting_file(&self, rel_path: &str) -> bool;
    fn prepare(&mut self, source: &str, registry: &mut RouteRegistry) -> Result<usize>;
}

pub struct RoutePrepare {
    parser: Parser,
}

impl RoutePrepare {
    pub fn new() -> Result<Self, PrepareError> {
        let mut parser = Parser::new();
        let language = tree_sitter_ruby::LANGUAGE;
        parser.set_language(&language.into())?;
        Ok(Self { parser })
    }

    /// Parses one routes file and appends what it declares. Returns the
    /// number of routes added.
    pub fn prepare_source(
        &mut self,
        source: &str,
        registry: &mut RouteRegistry,
    ) -> Result<usize, PrepareError> {
        self.prepare_named(source, "<source>", registry)
    }

    fn prepare_named(
        &mut self,
        source: &str,
        path: &str,
        registry: &mut RouteRegistry,
    ) -> Result<usize, PrepareError> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| PrepareError::Parse {
                path: path.to_string(),
            })?;
        let root = tree.root_node();
        if root.has_error() {
            warn!(path, "syntax errors in routes file, recognizing what parsed");
        }
        let calls = node::lower_program(root, source);
        debug!(path, statements = calls.len(), "lowered routes file");
        Ok(routes::RouteRecognizer::new(registry).recognize(&calls))
    }
}

impl Prepare for RoutePrepare {
    fn name(&self) -> &'static str {
        "routes"
    }

    fn interesting_file(&self, rel_path: &str) -> bool {
        scan::is_route_file(rel_path)
    }

    fn prepare(&mut self, source: &str, registry: &mut RouteRegistry) -> Result<usize> {
        Ok(self.prepare_source(source, registry)?)
    }
}

pub struct Runner {
    repo_root: PathBuf,
    scan_options: scan::ScanOptions,
    registry: RouteRegistry,
    prepare: RoutePrepare,
}

impl Runner {
    pub fn new(repo_root: PathBuf, scan_options: scan::ScanOptions) -> Result<Self> {
        let repo_root = std::fs::canonicalize(&repo_root).unwrap_or(repo_root);
        let prepare = RoutePrepare::new().context("build ruby parser")?;
        Ok(Self {
            repo_root,
            scan_options,
            registry: RouteRegistry::new(),
            prepare,
        })
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    pub fn into_registry(self) -> RouteRegistry {
        self.registry
    }

    pub fn files(&self) -> Result<Vec<RouteFile>> {
        let scanned = scan::scan_route_files(&self.repo_root, self.scan_options)?;
        Ok(scanned
            .into_iter()
            .map(|file| RouteFile {
                path: file.rel_path,
                hash: file.hash,
                size: file.size as i64,
            })
            .collect())
    }

    /// Discovers every routes file under the repository and prepares them
    /// in path order into one registry.
    pub fn run(&mut self) -> Result<RunStats> {
        let start = Instant::now();
        let scanned = scan::scan_route_files(&self.repo_root, self.scan_options)
            .with_context(|| format!("scan {}", self.repo_root.display()))?;
        let mut stats = RunStats {
            scanned: scanned.len(),
            ..RunStats::default()
        };
        for file in &scanned {
            self.prepare_scanned(file, &mut stats);
        }
        stats.routes = self.registry.len();
        stats.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            pass = self.prepare.name(),
            files = stats.scanned,
            prepared = stats.prepared,
            errors = stats.errors,
            routes = stats.routes,
            duration_ms = stats.duration_ms,
            "route prepare finished"
        );
        Ok(stats)
    }

    /// Prepares explicitly named files, in the order given, regardless of
    /// where they live.
    pub fn run_paths(&mut self, paths: &[PathBuf]) -> Result<RunStats> {
        let start = Instant::now();
        let mut stats = RunStats::default();
        for path in paths {
            stats.scanned += 1;
            match scan::scan_path(&self.repo_root, path) {
                Ok(file) => self.prepare_scanned(&file, &mut stats),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping routes file");
                    stats.errors += 1;
                }
            }
        }
        stats.routes = self.registry.len();
        stats.duration_ms = start.elapsed().as_millis() as u64;
        Ok(stats)
    }

    /// Prepares a single file, surfacing any failure to the caller.
    pub fn prepare_path(&mut self, path: &Path) -> Result<usize> {
        let file = scan::scan_path(&self.repo_root, path)?;
        self.prepare_file(&file)
    }

    pub fn route_table(&self, stats: RunStats) -> RouteTable {
        RouteTable {
            routes: self.registry.iter().map(RouteRecord::from).collect(),
            digest: self.registry.digest(),
            stats,
        }
    }

    fn prepare_scanned(&mut self, file: &scan::ScannedFile, stats: &mut RunStats) {
        match self.prepare_file(file) {
            Ok(count) => {
                stats.prepared += 1;
                info!(path = %file.rel_path, routes = count, "prepared routes file");
            }
            Err(err) => {
                stats.errors += 1;
                warn!(path = %file.rel_path, error = %format!("{err:#}"), "skipping routes file");
            }
        }
    }

    fn prepare_file(&mut self, file: &scan::ScannedFile) -> Result<usize> {
        let limit = Config::get().max_file_bytes;
        if file.size > limit {
            return Err(PrepareError::TooLarge {
                path: file.rel_path.clone(),
                size: file.size,
                limit,
            }
            .into());
        }
        let source = crate::util::read_to_string(&file.abs_path)?;
        let count = self
            .prepare
            .prepare_named(&source, &file.rel_path, &mut self.registry)?;
        Ok(count)
    }
}
