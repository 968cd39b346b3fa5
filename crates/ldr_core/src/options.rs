//! Import options and LDraw library layout.
//!
//! Options can be stored as JSON:
//!
//! ```json
//! {
//!   "scale": 0.05,
//!   "primitive_resolution": "high",
//!   "use_unofficial": true,
//!   "use_lsynth": false
//! }
//! ```
//!
//! Missing fields take their defaults.

use std::path::{Path, PathBuf};

use ldr_math::{Mat4, Vec3, Vec4};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::ColorCode;
use crate::ldraw::SearchPaths;

/// Default bound on reference nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Errors reading an options file.
#[derive(Error, Debug)]
pub enum OptionsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid options: {0}")]
    Json(#[from] serde_json::Error),
}

/// Which primitive variants to prefer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveResolution {
    #[default]
    Standard,
    /// `p/48`
    High,
    /// `p/8`
    Low,
}

impl PrimitiveResolution {
    /// Subdirectory of `p/` holding this variant, if any.
    pub fn subdir(&self) -> Option<&'static str> {
        match self {
            PrimitiveResolution::Standard => None,
            PrimitiveResolution::High => Some("48"),
            PrimitiveResolution::Low => Some("8"),
        }
    }
}

/// User-facing import settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Uniform scale applied to the root
    pub scale: f32,

    pub primitive_resolution: PrimitiveResolution,

    /// Search `unofficial/` when it exists
    pub use_unofficial: bool,

    /// Search `unofficial/lsynth` when it exists
    pub use_lsynth: bool,

    /// Bound on reference nesting before a branch is cut
    pub max_depth: usize,

    /// Color given to the root model
    pub root_color: ColorCode,

    /// Rotate from LDraw's -Y up frame into a Z up frame
    pub convert_coordinates: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            scale: 0.05,
            primitive_resolution: PrimitiveResolution::Standard,
            use_unofficial: true,
            use_lsynth: false,
            max_depth: DEFAULT_MAX_DEPTH,
            root_color: ColorCode::Palette(7),
            convert_coordinates: true,
        }
    }
}

impl ImportOptions {
    /// Read options from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, OptionsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, OptionsError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Transform applied above the root model.
    pub fn root_transform(&self) -> Mat4 {
        let scale = Mat4::from_scale(Vec3::splat(self.scale));
        if !self.convert_coordinates {
            return scale;
        }

        // x -> x, y -> -z, z -> -y
        let z_up = Mat4::from_cols(
            Vec4::new(1.0, 0.0, 0.0, 0.0),
            Vec4::new(0.0, 0.0, -1.0, 0.0),
            Vec4::new(0.0, -1.0, 0.0, 0.0),
            Vec4::new(0.0, 0.0, 0.0, 1.0),
        );
        scale * z_up
    }
}

/// Directory layout of an LDraw parts library.
#[derive(Clone, Debug)]
pub struct LibraryLayout {
    root: PathBuf,
}

impl LibraryLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// True when the root looks like a library (has `LDConfig.ldr`).
    pub fn is_valid(&self) -> bool {
        self.root.join("LDConfig.ldr").is_file()
    }

    /// Ordered search directories for a model living in `model_dir`.
    pub fn search_paths(&self, model_dir: Option<&Path>, options: &ImportOptions) -> SearchPaths {
        let mut paths = SearchPaths::default();
        if let Some(dir) = model_dir {
            paths.push(dir);
        }
        paths.push(self.root.join("models"));

        let unofficial = self.root.join("unofficial");
        if options.use_unofficial && unofficial.is_dir() {
            paths.push(unofficial.join("parts"));
            if let Some(res) = options.primitive_resolution.subdir() {
                paths.push(unofficial.join("p").join(res));
            }
            paths.push(unofficial.join("p"));

            let lsynth = unofficial.join("lsynth");
            if options.use_lsynth && lsynth.is_dir() {
                paths.push(lsynth);
            }
        }

        paths.push(self.root.join("parts"));
        if let Some(res) = options.primitive_resolution.subdir() {
            paths.push(self.root.join("p").join(res));
        }
        paths.push(self.root.join("p"));

        paths
    }
}
