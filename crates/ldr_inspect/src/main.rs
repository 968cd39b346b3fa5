//! LDraw model inspector.
//!
//! Imports a model against an LDraw parts library and reports what was
//! built: prototype, instance and triangle counts, world bounds, and any
//! parts that could not be found.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use ldr_core::ldraw::detect_file_encoding;
use ldr_core::{import_model, ImportOptions, ImportStatus, InstanceState, LibraryLayout, Scene, SearchPaths};
use ldr_math::Mat4Ext;

/// Command-line arguments for the inspector
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Model or part file to import
    #[arg(value_name = "MODEL")]
    model: PathBuf,

    /// Root of the LDraw parts library (the directory holding LDConfig.ldr)
    #[arg(short, long, value_name = "DIR")]
    library: Option<PathBuf>,

    /// JSON file with import options
    #[arg(short, long, value_name = "FILE")]
    options: Option<PathBuf>,

    /// Print the instance tree
    #[arg(short, long)]
    tree: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();

    let options = match &args.options {
        Some(path) => ImportOptions::from_json_file(path)
            .with_context(|| format!("Failed to load options from {}", path.display()))?,
        None => ImportOptions::default(),
    };

    let search_paths = search_paths(&args.model, args.library.as_deref(), &options);
    for dir in search_paths.dirs() {
        log::info!("Search path: {}", dir.display());
    }

    let encoding = detect_file_encoding(&args.model)
        .with_context(|| format!("Failed to open {}", args.model.display()))?;
    log::info!("Reading {} as {}", args.model.display(), encoding);

    let scene = import_model(&args.model, search_paths, &options)
        .with_context(|| format!("Failed to import {}", args.model.display()))?;

    print_summary(&scene);
    if args.tree {
        print_tree(&scene);
    }
    print_status(&scene);

    Ok(())
}

fn search_paths(model: &Path, library: Option<&Path>, options: &ImportOptions) -> SearchPaths {
    let model_dir = model
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    match library {
        Some(root) => {
            let layout = LibraryLayout::new(root);
            if !layout.is_valid() {
                log::warn!("{} does not look like an LDraw library", root.display());
            }
            layout.search_paths(Some(model_dir), options)
        }
        None => {
            log::warn!("No library given, only {} will be searched", model_dir.display());
            SearchPaths::new([model_dir])
        }
    }
}

fn print_summary(scene: &Scene) {
    println!("Model: {}", scene.name);
    println!("  Prototypes: {}", scene.prototype_count());
    println!("  Instances:  {}", scene.instance_count());
    println!("  Triangles:  {}", scene.total_triangle_count());
    println!("  Files read: {}", scene.report.files_read);

    let bounds = scene.world_bounds();
    if bounds.is_empty() {
        println!("  Bounds:     (empty)");
    } else {
        println!(
            "  Bounds:     ({:.2}, {:.2}, {:.2}) to ({:.2}, {:.2}, {:.2})",
            bounds.min.x, bounds.min.y, bounds.min.z, bounds.max.x, bounds.max.y, bounds.max.z
        );
        let (size, center) = (bounds.size(), bounds.centroid());
        println!("  Size:       {:.2} x {:.2} x {:.2}", size.x, size.y, size.z);
        println!("  Center:     ({:.2}, {:.2}, {:.2})", center.x, center.y, center.z);
    }
}

fn print_tree(scene: &Scene) {
    println!();
    scene.walk(|instance, depth| {
        let pos = instance.transform.origin();
        let marker = match instance.state {
            InstanceState::Resolved => "",
            InstanceState::Missing => " (missing)",
            InstanceState::Truncated => " (truncated)",
        };
        println!(
            "{:indent$}{} color {} at ({:.2}, {:.2}, {:.2}){}",
            "",
            instance.name,
            instance.color,
            pos.x,
            pos.y,
            pos.z,
            marker,
            indent = depth * 2
        );
    });
}

fn print_status(scene: &Scene) {
    println!();
    match scene.status() {
        ImportStatus::Complete => println!("Imported cleanly"),
        ImportStatus::Incomplete { missing } => {
            println!("Imported with {} missing parts:", missing);
            for name in &scene.report.missing_parts {
                println!("  {}", name);
            }
        }
    }

    if scene.report.had_line_errors() {
        println!("Some lines had errors in: {}", scene.report.parts_with_errors.join(", "));
    }
    if !scene.report.warnings.is_empty() {
        println!("{} warnings:", scene.report.warnings.len());
        for warning in &scene.report.warnings {
            println!("  {}", warning);
        }
    }
}
