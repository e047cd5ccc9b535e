//! Meshbridge CLI - remesh meshes through the kernel adapter.
//!
//! Usage: meshbridge <COMMAND> [OPTIONS] <INPUT> [OUTPUT]
//!
//! Run `meshbridge --help` for available commands.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{Args, Parser, Subcommand, ValueEnum};

use meshbridge::algo::progress::Progress;
use meshbridge::algo::remesh::{RemeshOptions, Remesher};
use meshbridge::io;
use meshbridge::kernel::{KernelKind, ReferenceKernel};
use meshbridge::mesh::{ElementKind, HostMesh};

/// Attribute that Medit element references are loaded into.
const REF_ATTRIBUTE: &str = "ref";

#[derive(Parser)]
#[command(name = "meshbridge")]
#[command(author, version, about = "Remeshing kernel bridge CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh information
    Info {
        /// Input mesh file
        input: PathBuf,
    },

    /// Export a mesh to the kernel and import it back unchanged
    Roundtrip {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Kernel mesh kind to convert through
        #[arg(short, long, value_enum, default_value = "volume")]
        kind: Kind,
    },

    /// Remesh a closed triangulated surface
    Surface {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        #[command(flatten)]
        remesh: RemeshArgs,
    },

    /// Remesh a tetrahedral volume
    Volume {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        #[command(flatten)]
        remesh: RemeshArgs,

        /// Do not modify the surface
        #[arg(long)]
        nosurf: bool,

        /// Optimise at constant size
        #[arg(long)]
        optim: bool,

        /// Strong optimisation for LES computations
        #[arg(long)]
        optim_les: bool,

        /// Preserve open boundaries inside the volume
        #[arg(long)]
        opnbdy: bool,
    },

    /// Discretise the level set of a vertex field into a tetrahedral mesh
    Levelset {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Scalar vertex field whose level set is extracted
        #[arg(short, long)]
        field: String,

        /// Level-set threshold
        #[arg(short, long, default_value = "0.0", allow_negative_numbers = true)]
        value: f64,

        #[command(flatten)]
        remesh: RemeshArgs,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Kind {
    /// Triangle surface mesh
    Surface,
    /// Tetrahedral volume mesh
    Volume,
}

impl From<Kind> for KernelKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Surface => KernelKind::Surface,
            Kind::Volume => KernelKind::Volume,
        }
    }
}

/// Options shared by the remeshing commands.
#[derive(Args)]
struct RemeshArgs {
    /// Minimal edge size
    #[arg(long, default_value = "0.01")]
    hmin: f64,

    /// Maximal edge size
    #[arg(long, default_value = "2.0")]
    hmax: f64,

    /// Uniform edge size (overrides hmin / hmax)
    #[arg(long, default_value = "0.0")]
    hsiz: f64,

    /// Maximal Hausdorff distance to the input surface
    #[arg(long, default_value = "0.01")]
    hausd: f64,

    /// Gradation between adjacent edge sizes
    #[arg(long, default_value = "1.105171", allow_negative_numbers = true)]
    hgrad: f64,

    /// Interpret sizes as fractions of the smallest bounding box extent
    #[arg(long)]
    relative: bool,

    /// Sharp-feature angle threshold in degrees
    #[arg(long, default_value = "45.0")]
    angle: f64,

    /// Disable sharp-feature detection
    #[arg(long)]
    no_angle: bool,

    /// Per-vertex size field
    #[arg(long)]
    metric: Option<String>,

    /// Treat the size field as a tensor
    #[arg(long)]
    aniso: bool,

    /// Disable point insertion and collapse
    #[arg(long)]
    noinsert: bool,

    /// Disable swaps
    #[arg(long)]
    noswap: bool,

    /// Disable point relocation
    #[arg(long)]
    nomove: bool,

    /// Integer edge attribute carried as tags (defaults to `ref` when present)
    #[arg(long)]
    edge_attr: Option<String>,

    /// Integer facet attribute carried as tags (defaults to `ref` when present)
    #[arg(long)]
    facet_attr: Option<String>,

    /// Integer cell attribute carried as tags (defaults to `ref` when present)
    #[arg(long)]
    cell_attr: Option<String>,
}

impl RemeshArgs {
    fn to_options(&self, mesh: &HostMesh) -> RemeshOptions {
        let scale = if self.relative { bbox_scale(mesh) } else { 1.0 };
        let mut options = RemeshOptions::default()
            .with_size_bounds(self.hmin * scale, self.hmax * scale)
            .with_uniform_size(self.hsiz * scale)
            .with_hausd(self.hausd * scale)
            .with_hgrad(self.hgrad)
            .with_angle_detection(!self.no_angle, self.angle)
            .with_anisotropy(self.aniso)
            .with_noinsert(self.noinsert)
            .with_noswap(self.noswap)
            .with_nomove(self.nomove);
        if let Some(metric) = &self.metric {
            options = options.with_metric(metric.as_str());
        }
        if let Some(name) = tag_attribute(mesh, ElementKind::Edge, &self.edge_attr) {
            options = options.with_edge_attribute(name);
        }
        if let Some(name) = tag_attribute(mesh, ElementKind::Facet, &self.facet_attr) {
            options = options.with_facet_attribute(name);
        }
        if let Some(name) = tag_attribute(mesh, ElementKind::Cell, &self.cell_attr) {
            options = options.with_cell_attribute(name);
        }
        options
    }
}

/// The smallest nonzero extent of the bounding box, or 1 for a degenerate
/// box.
fn bbox_scale(mesh: &HostMesh) -> f64 {
    mesh.bounding_box()
        .map(|(min, max)| max - min)
        .and_then(|d| {
            [d.x, d.y, d.z]
                .into_iter()
                .filter(|&e| e > 0.0)
                .min_by(f64::total_cmp)
        })
        .unwrap_or(1.0)
}

fn tag_attribute(mesh: &HostMesh, kind: ElementKind, named: &Option<String>) -> Option<String> {
    match named {
        Some(name) => Some(name.clone()),
        None if mesh.attributes(kind).int(REF_ATTRIBUTE).is_some() => {
            Some(REF_ATTRIBUTE.to_string())
        }
        None => None,
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { input } => {
            cmd_info(&input)?;
        }

        Commands::Roundtrip { input, output, kind } => {
            cmd_roundtrip(&input, &output, kind.into())?;
        }

        Commands::Surface {
            input,
            output,
            remesh,
        } => {
            cmd_surface(&input, &output, &remesh)?;
        }

        Commands::Volume {
            input,
            output,
            remesh,
            nosurf,
            optim,
            optim_les,
            opnbdy,
        } => {
            cmd_volume(&input, &output, &remesh, nosurf, (optim, optim_les, opnbdy))?;
        }

        Commands::Levelset {
            input,
            output,
            field,
            value,
            remesh,
        } => {
            cmd_levelset(&input, &output, &field, value, &remesh)?;
        }
    }

    Ok(())
}

/// Create a progress reporter that displays a progress bar on the terminal.
fn create_progress() -> Progress {
    let max_percent = Arc::new(AtomicUsize::new(0));

    Progress::new(move |current, total, message| {
        if total == 0 {
            return;
        }

        let raw_percent = if current >= total {
            100
        } else {
            (current * 100) / total
        };

        // Failure reports restart at step 0; keep the bar monotonic.
        let percent = max_percent.fetch_max(raw_percent, Ordering::Relaxed).max(raw_percent);

        let bar_width = 30;
        let filled = (percent * bar_width) / 100;
        let bar = "=".repeat(filled);
        let space = " ".repeat(bar_width - filled);

        eprint!("\r[{}{}] {:3}% {:<32}", bar, space, percent, message);
        let _ = std::io::stderr().flush();

        if current >= total {
            eprintln!();
        }
    })
}

fn load(input: &Path) -> Result<HostMesh, Box<dyn std::error::Error>> {
    let mesh = io::load(input)?;
    println!(
        "Loaded: {} vertices, {} edges, {} facets, {} cells",
        mesh.vertices.nb(),
        mesh.edges.nb(),
        mesh.facets.nb(),
        mesh.cells.nb()
    );
    Ok(mesh)
}

fn save(mesh: &HostMesh, output: &Path, started: Instant) -> Result<(), Box<dyn std::error::Error>> {
    println!(
        "Result: {} vertices, {} edges, {} facets, {} cells",
        mesh.vertices.nb(),
        mesh.edges.nb(),
        mesh.facets.nb(),
        mesh.cells.nb()
    );
    io::save(mesh, output)?;
    println!("Saved: {} ({:.2?})", output.display(), started.elapsed());
    Ok(())
}

fn check_surface_input(mesh: &HostMesh) -> Result<(), String> {
    if mesh.cells.nb() != 0 || mesh.facets.nb() == 0 || !mesh.facets.are_simplices() {
        return Err("input mesh should be a closed triangulated mesh, cancel".into());
    }
    Ok(())
}

fn check_volume_input(mesh: &HostMesh) -> Result<(), String> {
    if mesh.cells.nb() == 0 || !mesh.cells.are_simplices() {
        return Err("input mesh should be a tetrahedral mesh, cancel".into());
    }
    if !mesh.facets.are_simplices() {
        return Err("input mesh boundary should be triangulated, cancel".into());
    }
    Ok(())
}

/// Only vertices, edges, triangles and (for a volume) tetrahedra can cross
/// into the kernel.
fn check_roundtrip_input(mesh: &HostMesh, kind: KernelKind) -> Result<(), String> {
    if !mesh.facets.are_simplices() {
        return Err("input mesh facets should be triangles, cancel".into());
    }
    if kind == KernelKind::Volume && !mesh.cells.are_simplices() {
        return Err("input mesh cells should be tetrahedra, cancel".into());
    }
    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = io::load(input)?;

    println!("File: {}", input.display());
    println!("Vertices: {}", mesh.vertices.nb());
    println!("Edges: {}", mesh.edges.nb());
    println!("Facets: {}", mesh.facets.nb());
    println!("Cells: {}", mesh.cells.nb());

    if let Some((min, max)) = mesh.bounding_box() {
        println!(
            "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
        let diag = max - min;
        println!("Dimensions: {:.3} x {:.3} x {:.3}", diag.x, diag.y, diag.z);
    }

    if mesh.facets.nb() > 0 {
        let kind = if mesh.facets.are_simplices() {
            "triangles"
        } else {
            "mixed polygons"
        };
        println!("Facet type: {}", kind);
    }
    if mesh.cells.nb() > 0 {
        let kind = if mesh.cells.are_simplices() {
            "tetrahedra"
        } else {
            "mixed polyhedra"
        };
        println!("Cell type: {}", kind);
    }

    let boundary = (0..mesh.facets.nb())
        .flat_map(|f| (0..mesh.facets.nb_vertices(f)).map(move |k| (f, k)))
        .filter(|&(f, k)| mesh.facets.adjacent(f, k).is_none())
        .count();
    if mesh.facets.nb() > 0 {
        if boundary == 0 {
            println!("Surface: closed");
        } else {
            println!("Surface: open ({} border edges)", boundary);
        }
    }

    for kind in [
        ElementKind::Vertex,
        ElementKind::Edge,
        ElementKind::Facet,
        ElementKind::Cell,
    ] {
        let store = mesh.attributes(kind);
        for name in store.names() {
            match store.float(name) {
                Some(attr) => println!("Attribute: {} '{}' (float x{})", kind, name, attr.dimension()),
                None => println!("Attribute: {} '{}' (int)", kind, name),
            }
        }
    }

    Ok(())
}

fn cmd_roundtrip(input: &Path, output: &Path, kind: KernelKind) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = load(input)?;
    check_roundtrip_input(&mesh, kind)?;
    let kernel = ReferenceKernel::new();

    println!("Converting through {} kernel mesh...", kind);
    let start = Instant::now();
    let result = Remesher::new(&kernel).round_trip_selftest(&mesh, kind)?;
    save(&result, output, start)
}

fn cmd_surface(input: &Path, output: &Path, args: &RemeshArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = load(input)?;
    check_surface_input(&mesh)?;

    let options = args.to_options(&mesh);
    let kernel = ReferenceKernel::new();
    let progress = create_progress();

    println!("Remeshing surface (hmin={}, hmax={}, hausd={})...", options.hmin, options.hmax, options.hausd);
    let start = Instant::now();
    let result = Remesher::new(&kernel)
        .with_progress(&progress)
        .remesh_surface(&mesh, &options)?;
    save(&result, output, start)
}

fn cmd_volume(
    input: &Path,
    output: &Path,
    args: &RemeshArgs,
    nosurf: bool,
    (optim, optim_les, opnbdy): (bool, bool, bool),
) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = load(input)?;
    check_volume_input(&mesh)?;

    let options = args
        .to_options(&mesh)
        .with_nosurf(nosurf)
        .with_volume_modes(optim, optim_les, opnbdy);
    let kernel = ReferenceKernel::new();
    let progress = create_progress();

    println!("Remeshing volume (hmin={}, hmax={}, hausd={})...", options.hmin, options.hmax, options.hausd);
    let start = Instant::now();
    let result = Remesher::new(&kernel)
        .with_progress(&progress)
        .remesh_volume(&mesh, &options)?;
    save(&result, output, start)
}

fn cmd_levelset(
    input: &Path,
    output: &Path,
    field: &str,
    value: f64,
    args: &RemeshArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = load(input)?;
    check_volume_input(&mesh)?;

    let options = args.to_options(&mesh).with_level_set(field, value);
    let kernel = ReferenceKernel::new();
    let progress = create_progress();

    println!("Extracting level set {} = {}...", field, value);
    let start = Instant::now();
    let result = Remesher::new(&kernel)
        .with_progress(&progress)
        .extract_levelset(&mesh, &options)?;
    save(&result, output, start)
}
