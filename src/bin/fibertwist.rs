use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "fibertwist", version, about = "Render twisted-fiber patterns")]
struct Cli {
    /// Log render passes and warnings at debug level.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single still image.
    Render(RenderArgs),
    /// Render an animation as a numbered PNG sequence.
    Animate(AnimateArgs),
    /// Extract a palette from an image and print it as JSON.
    Palette(PaletteArgs),
    /// Print a random palette drawn from the fixed color pool.
    RandomPalette(RandomPaletteArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input scene JSON. Layer image paths resolve against its directory.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output image path.
    #[arg(long)]
    out: PathBuf,

    /// Export format, overriding the scene's (png, jpg; anything else falls back to png).
    #[arg(long)]
    format: Option<String>,

    /// Animation time; defaults to the scene's `animation.time`.
    #[arg(long)]
    time: Option<f64>,

    /// Backend to use.
    #[arg(long, value_enum, default_value_t = BackendChoice::Cpu)]
    backend: BackendChoice,
}

#[derive(Parser, Debug)]
struct AnimateArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Number of ticks to render.
    #[arg(long, default_value_t = 60)]
    frames: u32,

    /// Output directory for `frame_NNNNN.png` files.
    #[arg(long)]
    out_dir: PathBuf,

    /// Backend to use.
    #[arg(long, value_enum, default_value_t = BackendChoice::Cpu)]
    backend: BackendChoice,
}

#[derive(Parser, Debug)]
struct PaletteArgs {
    /// Source image.
    #[arg(long)]
    image: PathBuf,

    /// Number of clusters.
    #[arg(long, default_value_t = fibertwist::DEFAULT_CLUSTER_COUNT)]
    k: usize,

    /// Seed for reproducible centroid initialization.
    #[arg(long)]
    seed: Option<f64>,
}

#[derive(Parser, Debug)]
struct RandomPaletteArgs {
    /// Seed for the palette draw; random when omitted.
    #[arg(long)]
    seed: Option<f64>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendChoice {
    Cpu,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Animate(args) => cmd_animate(args),
        Command::Palette(args) => cmd_palette(args),
        Command::RandomPalette(args) => cmd_random_palette(args),
    }
}

fn read_scene(path: &Path) -> anyhow::Result<fibertwist::Scene> {
    fibertwist::Scene::from_path(path).with_context(|| format!("load scene '{}'", path.display()))
}

fn assets_root(scene_path: &Path) -> &Path {
    scene_path.parent().unwrap_or_else(|| Path::new("."))
}

fn make_backend(choice: BackendChoice) -> Box<dyn fibertwist::RenderBackend> {
    let kind = match choice {
        BackendChoice::Cpu => fibertwist::BackendKind::Cpu,
    };
    fibertwist::create_backend(kind)
}

fn report(warnings: &[fibertwist::RenderWarning]) {
    for w in warnings {
        eprintln!("warning: {w}");
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut scene = read_scene(&args.in_path)?;
    if let Some(format) = args.format {
        scene.export_format = format.into();
    }
    let time = args.time.unwrap_or(scene.pattern.animation.time);
    let mut backend = make_backend(args.backend);

    let out = fibertwist::render_scene(&scene, assets_root(&args.in_path), time, backend.as_mut())
        .context("render scene")?;
    let encoded = fibertwist::write_frame(&out.frame, &scene.export_format, &args.out)
        .with_context(|| format!("write '{}'", args.out.display()))?;
    report(&out.warnings);
    report(encoded.warning.as_slice());

    eprintln!(
        "wrote {} ({}, {} bytes, fingerprint {:016x})",
        args.out.display(),
        encoded.format.extension(),
        encoded.bytes.len(),
        out.frame.fingerprint()
    );
    Ok(())
}

fn cmd_animate(args: AnimateArgs) -> anyhow::Result<()> {
    let mut scene = read_scene(&args.in_path)?;
    if !scene.pattern.animation.enabled {
        tracing::info!("scene has animation disabled; enabling it for the sequence");
        scene.pattern.animation.enabled = true;
    }

    let (images, mut warnings) =
        fibertwist::prepare_layer_images(&scene.layers, assets_root(&args.in_path));
    let mut driver =
        fibertwist::AnimationDriver::new(fibertwist::ManualScheduler::new(), &scene.pattern.animation);
    let mut backend = make_backend(args.backend);
    let mut sink = fibertwist::PngSequenceSink::new(&args.out_dir);

    warnings.extend(fibertwist::render_sequence(
        &scene,
        &images,
        &mut driver,
        args.frames,
        backend.as_mut(),
        &mut sink,
    )?);
    report(&warnings);

    eprintln!(
        "wrote {} frames to {} (t = {:.3})",
        sink.written().len(),
        args.out_dir.display(),
        driver.time()
    );
    Ok(())
}

fn cmd_palette(args: PaletteArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.k > 0, "--k must be at least 1");
    let img = image::open(&args.image)
        .with_context(|| format!("open image '{}'", args.image.display()))?;
    let opts = fibertwist::ExtractOpts {
        clusters: args.k,
        init: match args.seed {
            Some(seed) => fibertwist::CentroidInit::Seeded(seed),
            None => fibertwist::CentroidInit::Entropy,
        },
    };
    let colors: Vec<String> = fibertwist::extract_dominant_colors(&img, &opts)
        .into_iter()
        .map(fibertwist::Rgb::to_hex)
        .collect();
    println!("{}", serde_json::to_string(&colors)?);
    Ok(())
}

fn cmd_random_palette(args: RandomPaletteArgs) -> anyhow::Result<()> {
    let seed = args.seed.unwrap_or_else(rand::random::<f64>);
    let palette = fibertwist::random_palette(&mut fibertwist::SeededRandom::new(seed));
    println!("{}", serde_json::to_string(&palette)?);
    Ok(())
}
