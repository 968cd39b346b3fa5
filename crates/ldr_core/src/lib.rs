//! LDR Core - LDraw parsing and part resolution.
//!
//! This crate provides:
//!
//! - **LDraw support**: encoding detection, line decoding, search-path
//!   resolution, a per-import part cache and the geometry tree builder
//! - **Scene types**: `Scene`, `Prototype`, `PartInstance`, `Mesh`
//! - **Options**: `ImportOptions` and the library directory layout
//!
//! # Example
//!
//! ```ignore
//! use ldr_core::{import_model, ImportOptions, LibraryLayout};
//!
//! let options = ImportOptions::default();
//! let paths = LibraryLayout::new("/opt/ldraw").search_paths(None, &options);
//! let scene = import_model("castle.ldr", paths, &options)?;
//! println!("Loaded {} prototypes, {} instances",
//!     scene.prototype_count(),
//!     scene.instance_count());
//! ```

pub mod color;
pub mod ldraw;
pub mod mesh;
pub mod options;
pub mod scene;

// Re-export commonly used types
pub use color::ColorCode;
pub use ldraw::{import_model, import_model_from_string, ImportError, SearchPaths};
pub use mesh::Mesh;
pub use options::{ImportOptions, LibraryLayout};
pub use scene::{ImportReport, ImportStatus, InstanceState, PartInstance, Prototype, Scene};
