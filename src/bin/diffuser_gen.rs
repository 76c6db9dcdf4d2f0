//! diffuser-gen: offline diffuser panel generator.
//!
//! Loads a grid configuration from JSON, generates the block grid, applies
//! the configured curves, and writes the combined panel as a Wavefront OBJ.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::Parser;

use diffuser_engine::Error;
use diffuser_engine::grid::{DiffuserGrid, GridConfig};
use diffuser_engine::mesh::write_obj;

#[derive(Parser)]
#[command(name = "diffuser-gen", about = "Generate an acoustic diffuser panel mesh")]
struct Args {
    /// Grid configuration (JSON, see GridConfig)
    config: PathBuf,

    /// Output OBJ file
    output: PathBuf,

    /// Offset every other row sideways by this amount
    #[arg(long)]
    stagger: Option<f32>,

    /// Print the per-angle block histogram after generation
    #[arg(long)]
    angles: bool,
}

fn main() -> Result<(), Error> {
    env_logger::init();
    let args = Args::parse();

    let config: GridConfig = serde_json::from_reader(File::open(&args.config)?)?;
    let mut grid = DiffuserGrid::new(config)?;
    grid.generate();
    grid.update_all_with_curves();

    if let Some(dx) = args.stagger {
        grid.offset_alternate_rows(dx);
    }

    if args.angles {
        for (angle, count) in grid.angle_histogram() {
            println!("angle {angle}: {count} blocks");
        }
    }

    let panel = grid.combined_mesh();
    let mut writer = BufWriter::new(File::create(&args.output)?);
    write_obj(&panel, &mut writer)?;

    println!(
        "wrote {} ({} blocks, {} vertices, {} triangles)",
        args.output.display(),
        grid.blocks().len(),
        panel.vertices.len(),
        panel.triangle_count()
    );
    Ok(())
}
