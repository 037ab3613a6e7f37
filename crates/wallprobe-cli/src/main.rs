//! wallprobe CLI - wall thickness of triangulated surfaces
//!
//! Reads a triangulation (or a shape of tessellated faces) from JSON and
//! either probes its wall thickness or prints statistics of the hierarchy
//! built over it.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use wallprobe_bvh::{
    dump_top_level_boxes, Aabb3, BuildParams, BuildStrategy, FacetSet, FacetTree, Orientation, PlotSink, Shape,
    Triangulation,
};
use wallprobe_math::Point3;
use wallprobe_thickness::{ThicknessProbe, ThicknessSettings};

#[derive(Parser)]
#[command(name = "wallprobe")]
#[command(about = "Wall thickness probing of triangulated surfaces", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct InputArgs {
    /// JSON triangulation, or a shape with --shape
    input: PathBuf,
    /// Read the input as a shape of tessellated faces
    #[arg(long)]
    shape: bool,
    /// Flip the winding of a raw triangulation
    #[arg(long)]
    reversed: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe the thickness of every triangle
    Probe {
        #[command(flatten)]
        input: InputArgs,
        /// TOML settings file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Global probing direction, e.g. 0,0,1
        #[arg(short, long, value_parser = parse_direction, allow_hyphen_values = true)]
        direction: Option<[f64; 3]>,
        /// Hierarchy build strategy (binned or linear)
        #[arg(short, long)]
        strategy: Option<BuildStrategy>,
        /// Probe triangles in parallel
        #[arg(short, long)]
        parallel: bool,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print statistics of the hierarchy built over the input
    Tree {
        #[command(flatten)]
        input: InputArgs,
        /// Hierarchy build strategy (binned or linear)
        #[arg(short, long, default_value = "binned")]
        strategy: BuildStrategy,
        /// Minimum leaf size
        #[arg(long, default_value_t = 1)]
        min_leaf: usize,
        /// Maximum leaf size
        #[arg(long, default_value_t = 5)]
        max_leaf: usize,
    },
}

/// Input geometry as read from disk.
enum Input {
    Mesh(Triangulation, Orientation),
    Shape(Shape),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Probe {
            input,
            config,
            direction,
            strategy,
            parallel,
            json,
        } => {
            let mut settings = match &config {
                Some(path) => load_settings(path)?,
                None => ThicknessSettings::default(),
            };
            if let Some(d) = direction {
                settings.direction = Some(d);
            }
            if let Some(s) = strategy {
                settings.strategy = s;
            }
            settings.parallel |= parallel;
            run_probe(&load_input(&input)?, settings, json)?;
        }
        Commands::Tree {
            input,
            strategy,
            min_leaf,
            max_leaf,
        } => {
            show_tree(&load_input(&input)?, strategy, BuildParams::new(min_leaf, max_leaf))?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_direction(s: &str) -> std::result::Result<[f64; 3], String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!("expected three comma-separated components, got '{s}'"));
    }
    let mut d = [0.0; 3];
    for (slot, part) in d.iter_mut().zip(&parts) {
        *slot = part.parse().map_err(|e| format!("invalid component '{part}': {e}"))?;
    }
    Ok(d)
}

fn load_settings(path: &Path) -> Result<ThicknessSettings> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let settings = ThicknessSettings::from_toml_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    debug!(path = %path.display(), "Loaded settings");
    Ok(settings)
}

fn load_input(args: &InputArgs) -> Result<Input> {
    let json = std::fs::read_to_string(&args.input).with_context(|| format!("reading {}", args.input.display()))?;
    if args.shape {
        if args.reversed {
            bail!("--reversed applies to raw triangulations; shapes carry per-face orientation");
        }
        let shape: Shape = serde_json::from_str(&json).context("parsing shape JSON")?;
        info!(faces = shape.faces.len(), triangles = shape.num_triangles(), "Loaded shape");
        Ok(Input::Shape(shape))
    } else {
        let mesh: Triangulation = serde_json::from_str(&json).context("parsing triangulation JSON")?;
        info!(
            nodes = mesh.nodes.len(),
            triangles = mesh.num_triangles(),
            "Loaded triangulation"
        );
        let orientation = if args.reversed {
            Orientation::Reversed
        } else {
            Orientation::Forward
        };
        Ok(Input::Mesh(mesh, orientation))
    }
}

fn run_probe(input: &Input, settings: ThicknessSettings, json: bool) -> Result<()> {
    let mut probe = match input {
        Input::Mesh(mesh, orientation) => ThicknessProbe::new(mesh, settings).with_orientation(*orientation),
        Input::Shape(shape) => ThicknessProbe::for_shape(shape, settings),
    };
    probe.perform()?;

    let report = probe.report();
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{report}");
    }
    Ok(())
}

/// Prints each wireframe as the box spanned by its edges.
struct StdoutSink;

impl PlotSink for StdoutSink {
    fn draw_wireframe(&mut self, name: &str, edges: &[(Point3, Point3)]) {
        let aabb = Aabb3::from_points(edges.iter().flat_map(|(a, b)| [a, b]));
        println!("  {name}: {}", fmt_box(&aabb));
    }
}

fn fmt_box(aabb: &Aabb3) -> String {
    format!(
        "[{:.3}, {:.3}, {:.3}] .. [{:.3}, {:.3}, {:.3}]",
        aabb.min.x, aabb.min.y, aabb.min.z, aabb.max.x, aabb.max.y, aabb.max.z
    )
}

fn show_tree(input: &Input, strategy: BuildStrategy, params: BuildParams) -> Result<()> {
    let facets = match input {
        Input::Mesh(mesh, orientation) => FacetSet::from_triangulation(mesh, *orientation)?,
        Input::Shape(shape) => FacetSet::from_shape(shape)?,
    };
    let diagonal = facets.bounding_diagonal();
    let count = facets.len();

    let mut cache = FacetTree::new(facets, strategy, params)?;
    let Some(tree) = cache.get_or_build() else {
        bail!("no valid facets to build a hierarchy over");
    };

    println!("Hierarchy ({strategy:?}):");
    println!("  Facets: {count}");
    println!("  Bounding diagonal: {diagonal:.3}");
    println!("  Nodes: {}", tree.len());
    println!("  Leaves: {}", tree.leaf_count());
    println!("  Depth: {}", tree.depth());
    println!("  Bounds: {}", fmt_box(&tree.bounds()));
    println!("Top-level boxes:");
    dump_top_level_boxes(tree, &mut StdoutSink);
    Ok(())
}
