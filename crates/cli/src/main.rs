use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use surfit::pointfile::{export_points, import_points};
use surfit::points::{interpolate_strip, StripId, StripSet, DEFAULT_SPACING, FIRST_STRIP_ID};
use surfit::region::{Circle, SingleCirclePolicy};
use surfit::surface::{build_surface, SolverKind, SurfaceRequest};
use tracing_subscriber::fmt::SubscriberBuilder;

mod output;
mod provenance;

#[derive(Parser)]
#[command(name = "surfit-cli")]
#[command(about = "Fit polynomial surfaces to digitized specimen points")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Fit a surface to a point file and write grid, slices and provenance
    Fit(FitArgs),
    /// Densify every strip of a point file
    Densify(DensifyArgs),
    /// Print a small provenance JSON block for this build
    Report,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
enum Mode {
    /// Recenter on circle 1 and mask by the circle pair
    Circle,
    /// Raw coordinates masked by the convex hull of the points
    Hull,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
enum LoneCircle {
    Constrain,
    Unconstrained,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
enum Solver {
    GaussJordan,
    Qr,
}

#[derive(Args, Clone, Debug)]
struct FitArgs {
    /// Point file (`x y z [stripId]` rows, optional header)
    #[arg(long)]
    input: PathBuf,
    #[arg(long, default_value_t = 3)]
    degree: usize,
    #[arg(long, value_enum, default_value_t = Mode::Circle)]
    mode: Mode,
    /// First circle as `cx,cy,r`
    #[arg(long, value_parser = parse_circle, allow_hyphen_values = true)]
    circle1: Option<Circle>,
    /// Second circle as `cx,cy,r`
    #[arg(long, value_parser = parse_circle, allow_hyphen_values = true)]
    circle2: Option<Circle>,
    /// Samples per axis; defaults to the mode's preset
    #[arg(long)]
    steps: Option<usize>,
    /// Skip tilt removal in circle mode
    #[arg(long)]
    keep_tilt: bool,
    #[arg(long, value_enum, default_value_t = LoneCircle::Constrain)]
    single_circle: LoneCircle,
    #[arg(long, value_enum, default_value_t = Solver::GaussJordan)]
    solver: Solver,
    /// Strip id for rows without a fourth column
    #[arg(long, default_value_t = FIRST_STRIP_ID.0, allow_hyphen_values = true)]
    default_strip: i64,
    /// Surface JSON output
    #[arg(long)]
    out: PathBuf,
    /// Optional long-form grid table (.csv or .parquet)
    #[arg(long)]
    grid_out: Option<PathBuf>,
}

#[derive(Args, Clone, Debug)]
struct DensifyArgs {
    #[arg(long)]
    input: PathBuf,
    /// Target distance between neighbouring points
    #[arg(long, default_value_t = DEFAULT_SPACING)]
    spacing: f64,
    #[arg(long, default_value_t = FIRST_STRIP_ID.0, allow_hyphen_values = true)]
    default_strip: i64,
    #[arg(long)]
    out: PathBuf,
}

/// Parameters recorded in the provenance sidecar.
#[derive(Serialize)]
struct FitParams {
    degree: usize,
    mode: Mode,
    circle1: Option<[f64; 3]>,
    circle2: Option<[f64; 3]>,
    steps: usize,
    remove_tilt: bool,
    single_circle: LoneCircle,
    solver: Solver,
    points: usize,
    skipped_rows: usize,
}

fn parse_circle(s: &str) -> Result<Circle, String> {
    let parts: Vec<f64> = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("expected cx,cy,r: {e}"))?;
    match parts.as_slice() {
        &[cx, cy, r] if cx.is_finite() && cy.is_finite() && r.is_finite() && r >= 0.0 => {
            Ok(Circle::new(cx, cy, r))
        }
        &[_, _, _] => Err("circle values must be finite with r >= 0".to_string()),
        _ => Err(format!("expected 3 values cx,cy,r, got {}", parts.len())),
    }
}

fn circle_triplet(c: Option<Circle>) -> Option<[f64; 3]> {
    c.map(|c| [c.center.x, c.center.y, c.radius])
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Fit(args) => fit(&args).map(|_| ()),
        Action::Densify(args) => densify(&args),
        Action::Report => report(),
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    Ok(())
}

fn load_points(path: &Path, default_strip: i64) -> Result<(StripSet, usize)> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let (set, report) = import_points(&text, StripId(default_strip));
    if report.skipped_count() > 0 {
        tracing::warn!(
            skipped = report.skipped_count(),
            imported = report.imported,
            "some rows were not imported"
        );
    }
    tracing::info!(points = set.len(), strips = set.strips.len(), "points loaded");
    Ok((set, report.skipped_count()))
}

fn request_for(args: &FitArgs) -> SurfaceRequest {
    let mut request = match args.mode {
        Mode::Circle => SurfaceRequest::circle_recentered(args.degree, args.circle1, args.circle2),
        Mode::Hull => SurfaceRequest::hull_masked(args.degree),
    };
    if let Some(steps) = args.steps {
        request.steps = steps;
    }
    if args.keep_tilt {
        request.remove_tilt = false;
    }
    if let surfit::surface::RegionSpec::Circles { policy, .. } = &mut request.region {
        *policy = match args.single_circle {
            LoneCircle::Constrain => SingleCirclePolicy::Constrain,
            LoneCircle::Unconstrained => SingleCirclePolicy::Unconstrained,
        };
    }
    request.solver = match args.solver {
        Solver::GaussJordan => SolverKind::GaussJordan,
        Solver::Qr => SolverKind::Qr,
    };
    request
}

/// Returns the written sidecar path.
fn fit(args: &FitArgs) -> Result<PathBuf> {
    if args.steps == Some(0) {
        bail!("--steps must be at least 1");
    }
    let grid_format = args
        .grid_out
        .as_deref()
        .map(output::GridFormat::from_path)
        .transpose()?;
    let (set, skipped) = load_points(&args.input, args.default_strip)?;
    let points = set.flatten();
    let request = request_for(args);
    tracing::info!(
        degree = request.degree,
        mode = ?args.mode,
        steps = request.steps,
        remove_tilt = request.remove_tilt,
        "fit"
    );
    let result = build_surface(&points, &request)
        .with_context(|| format!("fitting {}", args.input.display()))?;
    if !result.surface.has_data() {
        tracing::warn!("every grid cell is masked; nothing to draw");
    }

    ensure_parent(&args.out)?;
    let doc = output::surface_json(&result);
    fs::write(&args.out, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", args.out.display()))?;
    let mut artifacts = vec![args.out.clone()];
    if let (Some(grid_out), Some(format)) = (&args.grid_out, grid_format) {
        ensure_parent(grid_out)?;
        output::write_grid_table(&result, grid_out, format)?;
        artifacts.push(grid_out.clone());
    }

    let params = FitParams {
        degree: request.degree,
        mode: args.mode,
        circle1: circle_triplet(args.circle1),
        circle2: circle_triplet(args.circle2),
        steps: request.steps,
        remove_tilt: request.remove_tilt,
        single_circle: args.single_circle,
        solver: args.solver,
        points: points.len(),
        skipped_rows: skipped,
    };
    let payload = provenance::Payload::new(serde_json::to_value(&params)?)
        .with_input(args.input.to_string_lossy());
    let sidecar = provenance::write_sidecar(&artifacts, payload)?;
    tracing::info!(out = %args.out.display(), sidecar = %sidecar.display(), "surface written");
    Ok(sidecar)
}

fn densify(args: &DensifyArgs) -> Result<()> {
    if !(args.spacing > 0.0) {
        bail!("--spacing must be positive");
    }
    let (set, _) = load_points(&args.input, args.default_strip)?;
    let mut inserted = 0;
    let strips = set
        .strips
        .iter()
        .map(|s| {
            let (dense, added) = interpolate_strip(s, args.spacing);
            inserted += added;
            dense
        })
        .collect();
    let dense = StripSet { strips };
    ensure_parent(&args.out)?;
    fs::write(&args.out, export_points(&dense))
        .with_context(|| format!("writing {}", args.out.display()))?;
    tracing::info!(inserted, points = dense.len(), out = %args.out.display(), "densify");
    Ok(())
}

fn report() -> Result<()> {
    let obj = serde_json::json!({
        "tool": "surfit-cli",
        "version": surfit::VERSION,
        "code_rev": provenance::current_git_rev(),
        "params": {},
        "outputs": []
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}
