//! LDraw file support.
//!
//! This module reads LDraw `.ldr`/`.dat` text files, resolves the
//! files they reference through an ordered list of library directories and
//! builds an instance tree out of them.
//!
//! ## Pipeline
//!
//! - [`TextEncoding`]: picks UTF-8 or UTF-16 from the leading bytes
//! - [`PartParser`]: decodes one file into a [`ParsedPart`]
//! - [`SearchPaths`]: first-match lookup of referenced names
//! - [`PartCache`]: parses each distinct file at most once per import
//! - [`import_model`]: inlines primitives into part prototypes and
//!   instantiates the part tree
//!
//! ## Not Yet Supported
//!
//! - Multi-part `.mpd` containers (`0 FILE` sections)
//! - BFC winding meta commands
//! - Texture mapping extensions
//!
//! # Example
//!
//! ```ignore
//! use ldr_core::ldraw::import_model;
//! use ldr_core::options::{ImportOptions, LibraryLayout};
//!
//! let options = ImportOptions::default();
//! let paths = LibraryLayout::new("/opt/ldraw").search_paths(None, &options);
//! let scene = import_model("castle.ldr", paths, &options)?;
//! println!("{} instances, {:?}", scene.instance_count(), scene.status());
//! ```

mod cache;
mod encoding;
mod loader;
mod parser;
mod resolver;
mod types;

pub use cache::*;
pub use encoding::*;
pub use loader::*;
pub use parser::*;
pub use resolver::*;
pub use types::*;
