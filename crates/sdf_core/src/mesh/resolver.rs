//! Mesh resolution: turn every visual mesh URI of a model into imported content.
//!
//! For each URI the resolver tries, in order:
//!
//! 1. the per-pass URI cache (every outcome is cached, failures included)
//! 2. the content store, when content with the mesh's name already exists
//! 3. a direct import, when the source already has the target extension
//! 4. conversion into the scratch directory, then import
//!
//! Anything that fails on the way resolves to [`MeshContent::Fallback`], which
//! the scene builder renders as a unit cube. A missing or broken mesh never
//! aborts the pass.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use super::converter::{ConvertError, MeshConverter};
use super::naming::extension_of;
use super::store::{ContentHandle, ContentStore, DirectoryStore};
use crate::config::ResolverSettings;
use crate::model::Model;

const FILE_SCHEME: &str = "file://";
const MODEL_SCHEME: &str = "model://";

/// Outcome of resolving one mesh.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MeshContent {
    Resolved(ContentHandle),
    Fallback,
}

impl MeshContent {
    pub fn handle(&self) -> Option<&ContentHandle> {
        match self {
            MeshContent::Resolved(handle) => Some(handle),
            MeshContent::Fallback => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, MeshContent::Fallback)
    }
}

/// Mesh display name to resolved content.
pub type MeshMap = BTreeMap<String, MeshContent>;

/// Why a single mesh fell back.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Mesh source not found: {0}")]
    SourceMissing(String),

    #[error("Conversion failed: {0}")]
    Convert(#[from] ConvertError),

    #[error("Import failed: {0}")]
    Import(#[source] std::io::Error),

    #[error("No content named '{0}' after import")]
    ImportMissing(String),
}

/// Counters for one resolution pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ResolveStats {
    pub conversions: usize,
    pub imports: usize,
    pub reused: usize,
    pub fallbacks: usize,
    pub cache_hits: usize,
}

/// State of one resolution pass: the URI cache and its counters.
///
/// Created empty by [`MeshResolver::resolve`] and handed back when the pass
/// ends, so it can be inspected but never carried into another pass.
#[derive(Debug)]
pub struct ResolverContext {
    uri_cache: HashMap<String, MeshContent>,
    stats: ResolveStats,
}

impl ResolverContext {
    fn new() -> Self {
        Self {
            uri_cache: HashMap::new(),
            stats: ResolveStats::default(),
        }
    }

    pub fn cached(&self, uri: &str) -> Option<&MeshContent> {
        self.uri_cache.get(strip_file_scheme(uri))
    }

    pub fn cache_len(&self) -> usize {
        self.uri_cache.len()
    }

    pub fn stats(&self) -> ResolveStats {
        self.stats
    }
}

/// Cooperative cancellation, polled once per link.
pub trait CancelCheck {
    fn is_cancelled(&self) -> bool;
}

impl<F: Fn() -> bool> CancelCheck for F {
    fn is_cancelled(&self) -> bool {
        self()
    }
}

/// Shareable cancellation flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

impl CancelCheck for CancelToken {
    fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Never cancels.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeverCancel;

impl CancelCheck for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Resolves model meshes through a converter into a content store.
pub struct MeshResolver<'a> {
    converter: &'a dyn MeshConverter,
    store: &'a dyn ContentStore,
    settings: ResolverSettings,
}

impl<'a> MeshResolver<'a> {
    pub fn new(
        converter: &'a dyn MeshConverter,
        store: &'a dyn ContentStore,
        settings: ResolverSettings,
    ) -> Self {
        Self {
            converter,
            store,
            settings,
        }
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Resolve every visual mesh of `model`.
    ///
    /// Links are visited in name order. When `cancel` reports cancellation
    /// before a link, the pass stops and returns what was resolved so far.
    /// Every call starts from an empty URI cache; the pass's context is
    /// returned with the map.
    pub fn resolve(&self, model: &Model, cancel: &dyn CancelCheck) -> (MeshMap, ResolverContext) {
        let mut ctx = ResolverContext::new();
        let mut meshes = MeshMap::new();

        for link in model.links.values() {
            if cancel.is_cancelled() {
                log::info!(
                    "Mesh resolution cancelled after {} meshes",
                    meshes.len()
                );
                break;
            }

            for mesh in link.visual_meshes() {
                let uri = strip_file_scheme(&mesh.uri);

                if let Some(content) = ctx.uri_cache.get(uri) {
                    ctx.stats.cache_hits += 1;
                    meshes.insert(mesh.name.clone(), content.clone());
                    continue;
                }

                let content = match self.resolve_one(&mesh.name, uri, &mut ctx) {
                    Ok(handle) => MeshContent::Resolved(handle),
                    Err(err) => {
                        log::warn!("Mesh '{}' ({}) uses a fallback: {}", mesh.name, mesh.uri, err);
                        ctx.stats.fallbacks += 1;
                        MeshContent::Fallback
                    }
                };

                ctx.uri_cache.insert(uri.to_string(), content.clone());
                meshes.insert(mesh.name.clone(), content);
            }
        }

        let stats = ctx.stats;
        log::info!(
            "Resolved {} meshes ({} converted, {} imported, {} reused, {} fallbacks)",
            meshes.len(),
            stats.conversions,
            stats.imports,
            stats.reused,
            stats.fallbacks
        );

        (meshes, ctx)
    }

    fn resolve_one(
        &self,
        name: &str,
        uri: &str,
        ctx: &mut ResolverContext,
    ) -> Result<ContentHandle, ResolveError> {
        if let Some(handle) = self.store.find(name) {
            log::debug!("Reusing existing content for '{}'", name);
            ctx.stats.reused += 1;
            return Ok(handle);
        }

        let source = self
            .source_path(uri)
            .filter(|path| path.is_file())
            .ok_or_else(|| ResolveError::SourceMissing(uri.to_string()))?;

        let importable = extension_of(&source.to_string_lossy())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.settings.target_extension));

        let import_path = if importable {
            source
        } else {
            ctx.stats.conversions += 1;
            self.converter.convert(&source, &self.settings.scratch_dir)?
        };

        self.store
            .import(&import_path, name)
            .map_err(ResolveError::Import)?;
        ctx.stats.imports += 1;

        self.store
            .find(name)
            .ok_or_else(|| ResolveError::ImportMissing(name.to_string()))
    }

    /// Filesystem location of a mesh URI.
    ///
    /// `model://` URIs are looked up in the model paths, relative paths are
    /// joined to the base directory. Returns `None` for a `model://` URI that
    /// no model path contains.
    pub fn source_path(&self, uri: &str) -> Option<PathBuf> {
        let uri = strip_file_scheme(uri);

        if let Some(rest) = uri.strip_prefix(MODEL_SCHEME) {
            return self
                .settings
                .model_paths
                .iter()
                .map(|dir| dir.join(rest))
                .find(|candidate| candidate.exists());
        }

        let path = Path::new(uri);
        match &self.settings.base_dir {
            Some(base) if path.is_relative() => Some(base.join(path)),
            _ => Some(path.to_path_buf()),
        }
    }
}

/// Resolve a model's meshes into a directory-backed store at `content_root`.
pub fn resolve_meshes(
    model: &Model,
    content_root: &Path,
    converter: &dyn MeshConverter,
    settings: ResolverSettings,
) -> MeshMap {
    let store = DirectoryStore::new(content_root, settings.target_extension.clone());
    let resolver = MeshResolver::new(converter, &store, settings);
    let (meshes, _) = resolver.resolve(model, &NeverCancel);
    meshes
}

fn strip_file_scheme(uri: &str) -> &str {
    uri.strip_prefix(FILE_SCHEME).unwrap_or(uri)
}
