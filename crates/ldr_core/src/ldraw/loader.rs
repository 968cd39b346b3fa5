//! High-level LDraw model import.
//!
//! An import runs in two layers over the [`PartCache`]:
//!
//! 1. Every distinct file that is referenced as a part gets one
//!    [`Prototype`]: its own geometry plus the geometry of every primitive
//!    it pulls in, merged into the part's frame. Files whose header names a
//!    part type (including subparts) stay separate.
//! 2. Starting at the root, each part reference becomes a [`PartInstance`]
//!    with its accumulated world transform and resolved color.
//!
//! Both layers guard against reference cycles with an ancestor chain and a
//! depth bound. Missing files become placeholder instances and never abort
//! the import.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ldr_math::Mat4;
use thiserror::Error;

use crate::color::ColorCode;
use crate::ldraw::cache::PartCache;
use crate::ldraw::resolver::SearchPaths;
use crate::ldraw::types::{ParsedPart, SubfileRef};
use crate::mesh::Mesh;
use crate::options::ImportOptions;
use crate::scene::{ImportReport, InstanceState, PartInstance, Prototype, Scene};

/// Errors that abort an import.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("failed to read model {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no search directories were given")]
    NoSearchPaths,
}

/// Result type for import operations.
pub type ImportResult<T> = Result<T, ImportError>;

/// Import an LDraw model file.
///
/// Referenced files are looked up in `search_paths` in order. Problems with
/// individual lines or referenced files are collected in the scene's
/// [`ImportReport`]; only an unreadable root file or an empty search path
/// list is an error.
///
/// # Example
///
/// ```ignore
/// use ldr_core::ldraw::{import_model, SearchPaths};
/// use ldr_core::options::ImportOptions;
///
/// let paths = SearchPaths::new(["/opt/ldraw/parts", "/opt/ldraw/p"]);
/// let scene = import_model("house.ldr", paths, &ImportOptions::default())?;
/// ```
pub fn import_model<P: AsRef<Path>>(
    path: P,
    search_paths: SearchPaths,
    options: &ImportOptions,
) -> ImportResult<Scene> {
    let path = path.as_ref();
    if search_paths.is_empty() {
        return Err(ImportError::NoSearchPaths);
    }

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unnamed")
        .to_string();

    let mut session = ImportSession::new(search_paths, options);
    let root = session
        .cache
        .insert_path(path)
        .map_err(|source| ImportError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(session.finish(name, &root, options))
}

/// Import a model from text (useful for testing).
///
/// References are still resolved through `search_paths`.
pub fn import_model_from_string(
    content: &str,
    name: &str,
    search_paths: SearchPaths,
    options: &ImportOptions,
) -> ImportResult<Scene> {
    if search_paths.is_empty() {
        return Err(ImportError::NoSearchPaths);
    }

    let mut session = ImportSession::new(search_paths, options);
    let root = session.cache.insert_source(name, content);
    Ok(session.finish(name.to_string(), &root, options))
}

/// State of one import. Dropped when the scene is returned.
struct ImportSession {
    cache: PartCache,
    report: ImportReport,
    /// Prototype per canonical filename
    prototype_map: HashMap<String, Arc<Prototype>>,
    prototypes: Vec<Arc<Prototype>>,
    max_depth: usize,
}

impl ImportSession {
    fn new(search_paths: SearchPaths, options: &ImportOptions) -> Self {
        Self {
            cache: PartCache::new(search_paths),
            report: ImportReport::default(),
            prototype_map: HashMap::new(),
            prototypes: Vec::new(),
            max_depth: options.max_depth,
        }
    }

    /// Build the tree under `root` and hand everything over as a [`Scene`].
    fn finish(mut self, name: String, root: &Arc<ParsedPart>, options: &ImportOptions) -> Scene {
        let mut ancestors = Vec::new();
        let root = self.instance_of(root, options.root_transform(), options.root_color, &mut ancestors);

        self.report.files_read = self.cache.files_read();

        let scene = Scene {
            name,
            root,
            prototypes: self.prototypes,
            report: self.report,
        };

        log::info!(
            "Imported {}: {} prototypes, {} instances, {} files read",
            scene.name,
            scene.prototype_count(),
            scene.instance_count(),
            scene.report.files_read
        );
        if !scene.report.missing_parts.is_empty() {
            log::warn!(
                "{} missing parts: {}",
                scene.report.missing_parts.len(),
                scene.report.missing_parts.join(", ")
            );
        }

        scene
    }

    /// Instantiate the file referenced as `name`.
    fn instantiate(
        &mut self,
        name: &str,
        transform: Mat4,
        color: ColorCode,
        ancestors: &mut Vec<String>,
    ) -> PartInstance {
        match self.cache.get_or_parse(name) {
            Ok(part) => self.instance_of(&part, transform, color, ancestors),
            Err(err) => {
                log::warn!("{}", err);
                self.report.record_missing(err.name());
                PartInstance::missing(err.name(), transform, color)
            }
        }
    }

    fn instance_of(
        &mut self,
        part: &Arc<ParsedPart>,
        transform: Mat4,
        color: ColorCode,
        ancestors: &mut Vec<String>,
    ) -> PartInstance {
        let prototype = self.prototype(part);
        let mut instance = PartInstance {
            name: part.name.clone(),
            prototype: Some(Arc::clone(&prototype)),
            transform,
            color,
            state: InstanceState::Resolved,
            children: Vec::new(),
        };

        if prototype.references.is_empty() {
            return instance;
        }

        if ancestors.contains(&part.name) {
            self.report.warn(format!(
                "circular reference to '{}' via {}, branch truncated",
                part.name,
                ancestors.join(" -> ")
            ));
            instance.state = InstanceState::Truncated;
            return instance;
        }

        if ancestors.len() >= self.max_depth {
            self.report.warn(format!(
                "'{}' is nested deeper than {} levels, branch truncated",
                part.name, self.max_depth
            ));
            instance.state = InstanceState::Truncated;
            return instance;
        }

        ancestors.push(part.name.clone());
        for reference in &prototype.references {
            let child = self.instantiate(
                &reference.name,
                transform * reference.transform,
                reference.color.resolve(color),
                ancestors,
            );
            instance.children.push(child);
        }
        ancestors.pop();

        instance
    }

    /// Get or build the prototype for `part`.
    fn prototype(&mut self, part: &Arc<ParsedPart>) -> Arc<Prototype> {
        if let Some(prototype) = self.prototype_map.get(&part.name) {
            return Arc::clone(prototype);
        }

        self.note_line_errors(part);

        let mut mesh = part.mesh.clone();
        let mut references = Vec::new();
        let mut chain = vec![part.name.clone()];
        self.inline(part, Mat4::IDENTITY, ColorCode::Inherit, &mut mesh, &mut references, &mut chain);

        let id = self.prototypes.len();
        let prototype = Arc::new(Prototype::new(id, part.name.clone(), mesh, references));
        log::debug!(
            "Prototype {} ({}): {} faces, {} part references",
            id,
            prototype.name,
            prototype.mesh.faces.len(),
            prototype.references.len()
        );

        self.prototype_map.insert(part.name.clone(), Arc::clone(&prototype));
        self.prototypes.push(Arc::clone(&prototype));
        prototype
    }

    /// Merge the non-part references of `part` into `mesh`.
    ///
    /// `transform` and `color` place `part` in the prototype's frame. Part
    /// references and unresolvable names are collected into `references`
    /// instead, already composed into that frame.
    fn inline(
        &mut self,
        part: &ParsedPart,
        transform: Mat4,
        color: ColorCode,
        mesh: &mut Mesh,
        references: &mut Vec<SubfileRef>,
        chain: &mut Vec<String>,
    ) {
        for subfile in &part.subfiles {
            let placed = SubfileRef {
                name: subfile.name.clone(),
                transform: transform * subfile.transform,
                color: subfile.color.resolve(color),
            };

            let child = match self.cache.get_or_parse(&subfile.name) {
                Ok(child) if !child.is_part() => child,
                _ => {
                    references.push(placed);
                    continue;
                }
            };

            if chain.contains(&child.name) {
                self.report.warn(format!(
                    "circular reference to '{}' via {}, skipped",
                    child.name,
                    chain.join(" -> ")
                ));
                continue;
            }

            if chain.len() >= self.max_depth {
                self.report.warn(format!(
                    "'{}' is nested deeper than {} levels, skipped",
                    child.name, self.max_depth
                ));
                continue;
            }

            self.note_line_errors(&child);
            mesh.append_transformed(&child.mesh, placed.transform, placed.color);

            chain.push(child.name.clone());
            self.inline(&child, placed.transform, placed.color, mesh, references, chain);
            chain.pop();
        }
    }

    fn note_line_errors(&mut self, part: &ParsedPart) {
        if !part.had_errors() || self.report.parts_with_errors.contains(&part.name) {
            return;
        }
        log::warn!("{}: {} malformed lines skipped", part.name, part.errors.len());
        self.report.record_line_errors(&part.name);
    }
}
