//! Scene types produced by an LDraw import.
//!
//! A [`Scene`] is a tree of [`PartInstance`]s. Each instance points at a
//! shared [`Prototype`] (one per distinct part file) and carries its own
//! world transform and resolved color.

use std::sync::Arc;

use ldr_math::{Aabb, Mat4, Mat4Ext};

use crate::color::ColorCode;
use crate::ldraw::SubfileRef;
use crate::mesh::Mesh;

/// A part with its primitives merged into one mesh.
///
/// Shared by every instance of the same file.
#[derive(Clone, Debug)]
pub struct Prototype {
    /// Unique identifier within the scene
    pub id: usize,

    /// Canonical filename of the part
    pub name: String,

    /// Merged geometry in the part's own frame
    pub mesh: Arc<Mesh>,

    /// References to other parts, relative to this part's frame
    pub references: Vec<SubfileRef>,

    /// Local bounding box (from mesh)
    pub bounds: Aabb,
}

impl Prototype {
    /// Create a new prototype from a mesh.
    pub fn new(id: usize, name: String, mesh: Mesh, references: Vec<SubfileRef>) -> Self {
        let bounds = mesh.bounds;
        Self {
            id,
            name,
            mesh: Arc::new(mesh),
            references,
            bounds,
        }
    }
}

/// How an instance came to be.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstanceState {
    /// Fully built
    Resolved,

    /// The file could not be found or read; no mesh, no children
    Missing,

    /// Children were cut off by the cycle or depth guard
    Truncated,
}

/// A positioned occurrence of a part.
#[derive(Clone, Debug)]
pub struct PartInstance {
    /// Referenced filename
    pub name: String,

    /// Shared geometry, `None` for missing files
    pub prototype: Option<Arc<Prototype>>,

    /// Accumulated world transform
    pub transform: Mat4,

    /// Resolved color (never inherit-like unless the root color is)
    pub color: ColorCode,

    pub state: InstanceState,

    pub children: Vec<PartInstance>,
}

impl PartInstance {
    /// A placeholder for a file that could not be loaded.
    pub fn missing(name: impl Into<String>, transform: Mat4, color: ColorCode) -> Self {
        Self {
            name: name.into(),
            prototype: None,
            transform,
            color,
            state: InstanceState::Missing,
            children: Vec::new(),
        }
    }

    /// The instance's mesh, if any.
    pub fn mesh(&self) -> Option<&Mesh> {
        self.prototype.as_deref().map(|p| p.mesh.as_ref())
    }

    /// True when the instance has geometry to draw.
    pub fn has_geometry(&self) -> bool {
        self.mesh().is_some_and(|m| !m.is_empty())
    }

    /// Color of face `index` with inherit-like codes replaced by this
    /// instance's color.
    pub fn face_color(&self, index: usize) -> Option<ColorCode> {
        self.mesh()?
            .faces
            .get(index)
            .map(|face| face.color.resolve(self.color))
    }

    /// Number of instances in this subtree, including this one.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(PartInstance::subtree_len).sum::<usize>()
    }

    /// Visit every instance depth-first, parents before children.
    pub fn walk<F: FnMut(&PartInstance, usize)>(&self, visit: &mut F) {
        self.walk_at(0, visit);
    }

    fn walk_at<F: FnMut(&PartInstance, usize)>(&self, depth: usize, visit: &mut F) {
        visit(self, depth);
        for child in &self.children {
            child.walk_at(depth + 1, visit);
        }
    }
}

/// Overall outcome of an import.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImportStatus {
    Complete,
    Incomplete { missing: usize },
}

/// Recoverable problems collected during one import.
#[derive(Clone, Debug, Default)]
pub struct ImportReport {
    /// Files that could not be found or read, first occurrence order
    pub missing_parts: Vec<String>,

    /// One entry per truncated branch or other recoverable condition
    pub warnings: Vec<String>,

    /// Files containing at least one malformed line
    pub parts_with_errors: Vec<String>,

    /// Files read from disk
    pub files_read: usize,
}

impl ImportReport {
    pub fn record_missing(&mut self, name: &str) {
        if !self.missing_parts.iter().any(|m| m == name) {
            self.missing_parts.push(name.to_string());
        }
    }

    pub fn warn(&mut self, message: String) {
        log::warn!("{}", message);
        self.warnings.push(message);
    }

    pub fn record_line_errors(&mut self, name: &str) {
        if !self.parts_with_errors.iter().any(|p| p == name) {
            self.parts_with_errors.push(name.to_string());
        }
    }

    /// True when some file had malformed lines.
    pub fn had_line_errors(&self) -> bool {
        !self.parts_with_errors.is_empty()
    }

    pub fn status(&self) -> ImportStatus {
        if self.missing_parts.is_empty() {
            ImportStatus::Complete
        } else {
            ImportStatus::Incomplete {
                missing: self.missing_parts.len(),
            }
        }
    }
}

/// A complete imported model.
#[derive(Clone, Debug)]
pub struct Scene {
    /// Scene name (usually from filename)
    pub name: String,

    /// Root of the instance tree
    pub root: PartInstance,

    /// Shared prototypes, indexed by `Prototype::id`
    pub prototypes: Vec<Arc<Prototype>>,

    pub report: ImportReport,
}

impl Scene {
    /// Get total instance count, including the root and placeholders.
    pub fn instance_count(&self) -> usize {
        self.root.subtree_len()
    }

    /// Get prototype count.
    pub fn prototype_count(&self) -> usize {
        self.prototypes.len()
    }

    /// Get total triangle count across all instances.
    pub fn total_triangle_count(&self) -> usize {
        let mut count = 0;
        self.root.walk(&mut |instance, _| {
            if let Some(mesh) = instance.mesh() {
                count += mesh.triangle_count();
            }
        });
        count
    }

    /// Compute the world-space bounding box of all instances.
    pub fn world_bounds(&self) -> Aabb {
        let mut bounds = Aabb::empty();
        self.root.walk(&mut |instance, _| {
            if let Some(proto) = &instance.prototype {
                let world = instance.transform.transform_aabb(&proto.bounds);
                bounds = Aabb::surrounding(&bounds, &world);
            }
        });
        bounds
    }

    pub fn status(&self) -> ImportStatus {
        self.report.status()
    }

    /// Visit every instance depth-first with its depth below the root.
    pub fn walk<F: FnMut(&PartInstance, usize)>(&self, mut visit: F) {
        self.root.walk(&mut visit);
    }
}
