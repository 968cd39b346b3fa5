//! Example: Import an LDraw model and print what was built.
//!
//! Run with: cargo run --example load_ldraw -- <model.ldr> <ldraw-library-dir>

use std::env;
use std::path::Path;

use ldr_core::{import_model, ImportOptions, ImportStatus, LibraryLayout};
use ldr_math::Mat4Ext;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        println!("Usage: load_ldraw <model> <ldraw-library-dir>");
        println!("\nExamples:");
        println!("  cargo run --example load_ldraw -- models/car.ldr /opt/ldraw");
        println!("  cargo run --example load_ldraw -- 3001.dat ~/ldraw");
        return;
    }

    let path = Path::new(&args[1]);
    let options = ImportOptions::default();
    let layout = LibraryLayout::new(&args[2]);
    if !layout.is_valid() {
        println!("Warning: {} has no LDConfig.ldr", args[2]);
    }
    let search_paths = layout.search_paths(path.parent(), &options);

    println!("Loading LDraw model: {}", path.display());

    match import_model(path, search_paths, &options) {
        Ok(scene) => {
            println!("\n=== Scene: {} ===", scene.name);
            println!("Prototypes: {}", scene.prototype_count());
            println!("Instances: {}", scene.instance_count());
            println!("Total triangles: {}", scene.total_triangle_count());
            println!("Files read: {}", scene.report.files_read);

            println!("\n--- Prototypes ---");
            for proto in &scene.prototypes {
                println!(
                    "  [{}] {} - {} vertices, {} triangles, {} part references",
                    proto.id,
                    proto.name,
                    proto.mesh.vertex_count(),
                    proto.mesh.triangle_count(),
                    proto.references.len()
                );
            }

            println!("\n--- Instances ---");
            scene.walk(|instance, depth| {
                let pos = instance.transform.origin();
                println!(
                    "  {:indent$}{} [{}] at ({:.2}, {:.2}, {:.2}) {:?}",
                    "",
                    instance.name,
                    instance.color,
                    pos.x,
                    pos.y,
                    pos.z,
                    instance.state,
                    indent = depth * 2
                );
            });

            let world_bounds = scene.world_bounds();
            println!("\n--- World Bounds ---");
            println!(
                "  Min: ({:.2}, {:.2}, {:.2})",
                world_bounds.min.x, world_bounds.min.y, world_bounds.min.z
            );
            println!(
                "  Max: ({:.2}, {:.2}, {:.2})",
                world_bounds.max.x, world_bounds.max.y, world_bounds.max.z
            );

            match scene.status() {
                ImportStatus::Complete => println!("\nImported cleanly"),
                ImportStatus::Incomplete { missing } => {
                    println!("\nImported with {} missing parts:", missing);
                    for name in &scene.report.missing_parts {
                        println!("  {}", name);
                    }
                }
            }
        }
        Err(e) => {
            eprintln!("Error loading LDraw model: {}", e);
        }
    }
}
