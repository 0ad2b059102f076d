//! blobtree CLI
//!
//! Renders particle files with the three ray marchers and prints tree
//! statistics.
//!
//! Author: Moroya Sakamoto

use blobtree::prelude::*;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "blobtree")]
#[command(author = "Moroya Sakamoto")]
#[command(version = blobtree::VERSION)]
#[command(about = "Blob tree renderer with segment tracing", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a particle file to PPM images
    Render {
        /// Particle file, one `x y z` triple per line
        input: PathBuf,

        /// Primitive support radius
        #[arg(long, default_value_t = 2.25)]
        radius: f64,

        /// Image width in pixels
        #[arg(long, default_value_t = 500)]
        width: u32,

        /// Image height in pixels
        #[arg(long, default_value_t = 500)]
        height: u32,

        /// Camera position, comma-separated
        #[arg(long, default_value = "0,-80,0", value_parser = parse_vec3)]
        camera: DVec3,

        /// Sun direction, comma-separated
        #[arg(long, default_value = "0,-1,0", value_parser = parse_vec3)]
        sun: DVec3,

        /// Marching method
        #[arg(long, value_enum, default_value = "segment")]
        method: MethodArg,

        /// Output directory for render{N}.ppm / render{N}_cost.ppm
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Print tree statistics for a particle file
    Info {
        /// Particle file
        input: PathBuf,

        /// Primitive support radius
        #[arg(long, default_value_t = 2.25)]
        radius: f64,

        /// Dump the built tree as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MethodArg {
    /// Classic sphere tracing
    Sphere,
    /// Enhanced sphere tracing
    Enhanced,
    /// Segment tracing
    Segment,
    /// All three, one output pair each
    All,
}

impl MethodArg {
    fn methods(self) -> Vec<TraceMethod> {
        match self {
            MethodArg::Sphere => vec![TraceMethod::Sphere],
            MethodArg::Enhanced => vec![TraceMethod::Enhanced],
            MethodArg::Segment => vec![TraceMethod::Segment],
            MethodArg::All => TraceMethod::ALL.to_vec(),
        }
    }
}

fn parse_vec3(s: &str) -> Result<DVec3, String> {
    let parts: Vec<f64> = s
        .split(',')
        .map(|v| v.trim().parse::<f64>().map_err(|e| e.to_string()))
        .collect::<Result<_, _>>()?;
    if parts.len() != 3 {
        return Err(format!(
            "expected three comma-separated values, got {}",
            parts.len()
        ));
    }
    Ok(DVec3::new(parts[0], parts[1], parts[2]))
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Render {
            input,
            radius,
            width,
            height,
            camera,
            sun,
            method,
            out_dir,
        } => cmd_render(&input, radius, width, height, camera, sun, method, &out_dir),
        Commands::Info {
            input,
            radius,
            json,
        } => cmd_info(&input, radius, json.as_deref()),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_render(
    input: &std::path::Path,
    radius: f64,
    width: u32,
    height: u32,
    camera: DVec3,
    sun: DVec3,
    method: MethodArg,
    out_dir: &std::path::Path,
) -> Result<(), IoError> {
    let tree = BlobTree::from_particle_file(input, radius)?;
    println!("Primitive count: {}", tree.primitive_count());

    let scene = Scene {
        tree,
        camera: Camera::new(camera, width, height),
        sun,
    };

    for m in method.methods() {
        let begin = Instant::now();
        let output = render(&scene, m)?;
        let elapsed = begin.elapsed();
        println!(
            "{}: {}.{:03}s",
            m.label(),
            elapsed.as_secs(),
            elapsed.subsec_millis()
        );

        let color_path = out_dir.join(format!("render{}.ppm", m.index()));
        let cost_path = out_dir.join(format!("render{}_cost.ppm", m.index()));
        write_ppm(&output.color, &color_path)?;
        write_ppm(&output.cost, &cost_path)?;
        println!("Wrote {} and {}", color_path.display(), cost_path.display());
    }

    Ok(())
}

fn cmd_info(
    input: &std::path::Path,
    radius: f64,
    json: Option<&std::path::Path>,
) -> Result<(), IoError> {
    let tree = BlobTree::from_particle_file(input, radius)?;
    let bbox = tree.aabb();

    println!("Primitives: {}", tree.primitive_count());
    println!("Nodes:      {}", tree.node_count());
    println!("Depth:      {}", tree.depth());
    println!("Global K:   {:.6}", tree.k());
    println!(
        "Box:        ({:.3}, {:.3}, {:.3}) .. ({:.3}, {:.3}, {:.3})",
        bbox.min.x, bbox.min.y, bbox.min.z, bbox.max.x, bbox.max.y, bbox.max.z
    );

    if let Some(path) = json {
        save_json(&tree, path)?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}
