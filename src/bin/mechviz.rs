use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use rayon::prelude::*;

use mechviz::schema::registry::{CompoundNames, ReactionLink};
use mechviz::{
    BackendKind, FitScope, FrameRenderer, MechanismDefinition, MechanismRegistry, OverrideTable,
    RasterTarget, RenderOptions, SceneOptions, Surface as _, SvgSurface, ValidationGate,
};

#[derive(Parser, Debug)]
#[command(name = "mechviz", version)]
struct Cli {
    /// Log at DEBUG instead of INFO.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check the override file contract and validate every registered mechanism.
    Check(CheckArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Write a single frame as an SVG document.
    Svg(SvgArgs),
    /// Render evenly spaced frames as numbered PNGs.
    Strip(StripArgs),
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Curated override JSON, keyed by animation id.
    #[arg(long)]
    overrides: PathBuf,

    /// Link dataset JSON (`{nodes, links}`). Without it every override id is registered.
    #[arg(long)]
    links: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct CheckArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Scope dipoles and lone pairs to their exact step.
    #[arg(long)]
    strict: bool,
}

#[derive(Args, Debug)]
struct ViewArgs {
    /// Animation id to render.
    #[arg(long)]
    id: String,

    #[arg(long, default_value_t = 360.0)]
    width: f64,

    #[arg(long, default_value_t = 180.0)]
    height: f64,

    /// Device pixels per logical unit.
    #[arg(long, default_value_t = 1.0)]
    dpr: f64,

    /// Fit the cue cloud into the view.
    #[arg(long, value_enum)]
    fit: Option<FitChoice>,

    /// Scale axes independently instead of letterboxing.
    #[arg(long)]
    stretch: bool,

    /// Scope dipoles and lone pairs to their exact step.
    #[arg(long)]
    strict: bool,

    #[arg(long)]
    no_badge: bool,

    /// Skip dev-mode validation before drawing.
    #[arg(long)]
    no_validate: bool,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    source: SourceArgs,

    #[command(flatten)]
    view: ViewArgs,

    /// Timeline position in `[0, 1]`.
    #[arg(long, default_value_t = 0.0)]
    progress: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[arg(long, value_enum, default_value_t = SurfaceChoice::Cpu)]
    surface: SurfaceChoice,

    /// TTF/OTF used for labels on the raster surface.
    #[arg(long)]
    font: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct SvgArgs {
    #[command(flatten)]
    source: SourceArgs,

    #[command(flatten)]
    view: ViewArgs,

    #[arg(long, default_value_t = 0.0)]
    progress: f64,

    /// Output SVG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct StripArgs {
    #[command(flatten)]
    source: SourceArgs,

    #[command(flatten)]
    view: ViewArgs,

    /// Number of frames, spread from progress 0 to 1 inclusive.
    #[arg(long, default_value_t = 12)]
    frames: usize,

    /// Output directory.
    #[arg(long)]
    out: PathBuf,

    #[arg(long, value_enum, default_value_t = SurfaceChoice::Cpu)]
    surface: SurfaceChoice,

    #[arg(long)]
    font: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SurfaceChoice {
    Cpu,
    Svg,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FitChoice {
    Mechanism,
    Step,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Check(args) => cmd_check(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Svg(args) => cmd_svg(args),
        Command::Strip(args) => cmd_strip(args),
    }
}

fn load_overrides(path: &Path) -> anyhow::Result<OverrideTable> {
    OverrideTable::from_path(path).with_context(|| format!("load overrides '{}'", path.display()))
}

/// Links from the dataset, or one synthetic link per override id.
fn load_links(
    source: &SourceArgs,
    overrides: &OverrideTable,
) -> anyhow::Result<(Vec<ReactionLink>, CompoundNames)> {
    match &source.links {
        Some(path) => {
            let dataset = mechviz::LinkDataset::from_path(path)
                .with_context(|| format!("load links '{}'", path.display()))?;
            let names = dataset.compound_names();
            Ok((dataset.links, names))
        }
        None => Ok((
            overrides
                .ids()
                .map(|id| ReactionLink {
                    animation_id: Some(id.to_owned()),
                    ..ReactionLink::default()
                })
                .collect(),
            CompoundNames::default(),
        )),
    }
}

fn build_registry(source: &SourceArgs) -> anyhow::Result<MechanismRegistry> {
    let overrides = load_overrides(&source.overrides)?;
    let (links, names) = load_links(source, &overrides)?;
    let built = MechanismRegistry::build(&links, &overrides, &names);
    for w in &built.warnings {
        tracing::warn!("{w}");
    }
    if built.dropped > 0 {
        tracing::info!(dropped = built.dropped, "malformed cues dropped during ingestion");
    }
    Ok(built.value)
}

fn lookup<'r>(registry: &'r MechanismRegistry, id: &str) -> anyhow::Result<&'r MechanismDefinition> {
    registry
        .get(id)
        .map(|d| d.as_ref())
        .with_context(|| format!("no mechanism registered for '{id}'"))
}

fn render_options(view: &ViewArgs) -> RenderOptions {
    RenderOptions::default()
        .with_stretch_to_fill(view.stretch)
        .with_strict_step_cues(view.strict)
        .with_step_badge(!view.no_badge)
        .with_fit_to_content(view.fit.map(|f| match f {
            FitChoice::Mechanism => FitScope::Mechanism,
            FitChoice::Step => FitScope::Step,
        }))
}

fn renderer(view: &ViewArgs) -> FrameRenderer {
    let gate = if view.no_validate {
        ValidationGate::never()
    } else {
        ValidationGate::always()
    };
    FrameRenderer::new(render_options(view)).with_gate(gate)
}

fn raster_target(view: &ViewArgs, font: Option<&Path>) -> anyhow::Result<RasterTarget> {
    let font = font
        .map(|p| std::fs::read(p).with_context(|| format!("read font '{}'", p.display())))
        .transpose()?;
    Ok(RasterTarget {
        width: view.width,
        height: view.height,
        dpr: view.dpr,
        font,
    })
}

fn backend_kind(choice: SurfaceChoice) -> BackendKind {
    match choice {
        SurfaceChoice::Cpu => BackendKind::Cpu,
        SurfaceChoice::Svg => BackendKind::Svg,
    }
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn write_png(
    renderer: &mut FrameRenderer,
    def: &MechanismDefinition,
    progress: f64,
    kind: BackendKind,
    target: &RasterTarget,
    out: &Path,
) -> anyhow::Result<()> {
    let frame = mechviz::render_rgba(renderer, def, progress, kind, target)?
        .context("output size has no drawable area")?;
    let img = frame.into_image()?;
    ensure_parent(out)?;
    img.save_with_format(out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", out.display()))?;
    Ok(())
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let overrides = load_overrides(&args.source.overrides)?;
    let mut failed = 0usize;
    if let Err(issues) = overrides.check_contract() {
        eprintln!("override contract: {} issue(s)\n{issues}", issues.len());
        failed += 1;
    }

    let registry = build_registry(&args.source)?;
    let scene_opts = SceneOptions::default().with_strict_step_cues(args.strict);
    for def in registry.definitions() {
        match mechviz::validate_definition(def, scene_opts) {
            Ok(()) => eprintln!("ok    {}", def.id),
            Err(issues) => {
                failed += 1;
                eprintln!("FAIL  {} ({} issue(s))\n{issues}", def.id, issues.len());
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} check(s) failed");
    }
    eprintln!("{} mechanism(s) valid", registry.len());
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let registry = build_registry(&args.source)?;
    let def = lookup(&registry, &args.view.id)?;
    let target = raster_target(&args.view, args.font.as_deref())?;
    let mut renderer = renderer(&args.view);

    write_png(
        &mut renderer,
        def,
        args.progress,
        backend_kind(args.surface),
        &target,
        &args.out,
    )?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_svg(args: SvgArgs) -> anyhow::Result<()> {
    let registry = build_registry(&args.source)?;
    let def = lookup(&registry, &args.view.id)?;
    let mut surface = SvgSurface::new(args.view.width, args.view.height);
    anyhow::ensure!(surface.info().is_some(), "output size has no drawable area");

    renderer(&args.view).render_frame(def, args.progress, &mut surface)?;
    ensure_parent(&args.out)?;
    std::fs::write(&args.out, surface.finish())
        .with_context(|| format!("write svg '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_strip(args: StripArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.frames > 0, "--frames must be at least 1");
    let registry = build_registry(&args.source)?;
    let def = lookup(&registry, &args.view.id)?;
    let target = raster_target(&args.view, args.font.as_deref())?;
    let kind = backend_kind(args.surface);
    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("create output dir '{}'", args.out.display()))?;

    let last = (args.frames - 1).max(1) as f64;
    (0..args.frames).into_par_iter().try_for_each_init(
        || renderer(&args.view),
        |renderer, i| {
            let progress = i as f64 / last;
            let out = args.out.join(format!("{}_{i:04}.png", def.id));
            write_png(renderer, def, progress, kind, &target, &out)
        },
    )?;
    eprintln!("wrote {} frame(s) to {}", args.frames, args.out.display());
    Ok(())
}
