use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use svg2tgs::{
    BatchCoordinator, BatchReport, BatchRequest, BatchStatus, ConversionConfig, FnStatusSink,
    InputDocument, SubmitterId, SvgRasterizer, SvgRasterizerOpts, ValidationResult,
};

#[derive(Parser, Debug)]
#[command(name = "svg2tgs", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert SVG files into `.tgs` sticker containers, in argument order.
    Convert(ConvertArgs),
    /// Validate SVG files without rendering them.
    Check(CheckArgs),
    /// Print what a `.tgs` container holds.
    Inspect(InspectArgs),
}

#[derive(Parser, Debug)]
struct LimitArgs {
    /// JSON conversion config; flags below override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Required width in pixels.
    #[arg(long)]
    width: Option<u32>,

    /// Required height in pixels.
    #[arg(long)]
    height: Option<u32>,

    /// Maximum input size in bytes.
    #[arg(long)]
    max_bytes: Option<usize>,
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    #[command(flatten)]
    limits: LimitArgs,

    /// Directory for the produced containers (defaults to each input's directory).
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Animation frame rate.
    #[arg(long)]
    fps: Option<u32>,

    /// Animation length in frames.
    #[arg(long)]
    frames: Option<u32>,

    /// gzip compression level (0-9).
    #[arg(long)]
    level: Option<u32>,

    /// Extra font directory for `<text>` elements (repeatable).
    #[arg(long = "font-dir")]
    font_dirs: Vec<PathBuf>,

    /// Do not load system fonts.
    #[arg(long, default_value_t = false)]
    no_system_fonts: bool,

    /// Input SVG files.
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
struct CheckArgs {
    #[command(flatten)]
    limits: LimitArgs,

    /// Input SVG files.
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Container to decode.
    file: PathBuf,

    /// Write the embedded PNG to this path.
    #[arg(long)]
    extract_png: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Convert(args) => cmd_convert(args),
        Command::Check(args) => cmd_check(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

impl LimitArgs {
    fn load(&self) -> anyhow::Result<ConversionConfig> {
        let mut cfg = match &self.config {
            Some(path) => ConversionConfig::from_path(path)?,
            None => ConversionConfig::default(),
        };
        if let Some(w) = self.width {
            cfg.required_width = w;
        }
        if let Some(h) = self.height {
            cfg.required_height = h;
        }
        if let Some(max) = self.max_bytes {
            cfg.max_bytes = max;
        }
        Ok(cfg)
    }
}

fn read_inputs(files: &[PathBuf]) -> anyhow::Result<Vec<InputDocument>> {
    files
        .iter()
        .map(|path| {
            let bytes =
                std::fs::read(path).with_context(|| format!("read '{}'", path.display()))?;
            Ok(InputDocument::new(display_name(path), bytes))
        })
        .collect()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn cmd_convert(args: ConvertArgs) -> anyhow::Result<()> {
    let mut cfg = args.limits.load()?;
    if let Some(fps) = args.fps {
        cfg.frame_rate = fps;
    }
    if let Some(frames) = args.frames {
        cfg.duration_frames = frames;
    }
    if let Some(level) = args.level {
        cfg.compression_level = level;
    }

    let rasterizer = SvgRasterizer::new(SvgRasterizerOpts {
        load_system_fonts: !args.no_system_fonts,
        font_dirs: args.font_dirs.clone(),
    });
    let coordinator = BatchCoordinator::new(cfg, Arc::new(rasterizer))?;

    let (paths, docs): (Vec<&PathBuf>, Vec<InputDocument>) = args
        .files
        .iter()
        .zip(read_inputs(&args.files)?)
        .filter(|(_, doc)| {
            let keep = doc.has_svg_extension();
            if !keep {
                eprintln!("❌ **{}**: please send only SVG files", doc.filename);
            }
            keep
        })
        .unzip();
    let batch = BatchRequest::new(SubmitterId(0), docs);
    if batch.status() == BatchStatus::Empty {
        anyhow::bail!("no .svg files to convert");
    }
    eprintln!("{}", BatchReport::acknowledgement_message(batch.len()));

    let mut sink = FnStatusSink(|s: svg2tgs::ProgressSnapshot| {
        eprintln!("{}", BatchReport::processing_message(s.completed, s.total));
    });
    let report = coordinator.run(batch, &mut sink)?;

    for ((_, name, outcome), input) in report.entries().zip(paths) {
        let Some(bytes) = outcome.container() else {
            continue;
        };
        let dir = match &args.out_dir {
            Some(dir) => dir.clone(),
            None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
        };
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("create output dir '{}'", dir.display()))?;
        let out = dir.join(svg2tgs::output_filename(name));
        std::fs::write(&out, bytes).with_context(|| format!("write '{}'", out.display()))?;
        eprintln!("wrote {} ({} bytes)", out.display(), bytes.len());
    }

    for line in report.failure_messages() {
        eprintln!("{line}");
    }
    eprintln!("{}", report.completion_message());

    if report.status() == BatchStatus::AllFailed {
        anyhow::bail!("no files were converted");
    }
    Ok(())
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let cfg = args.limits.load()?;
    cfg.validate()?;

    let mut rejected = 0usize;
    for doc in read_inputs(&args.files)? {
        match svg2tgs::validate(
            &doc.bytes,
            cfg.max_bytes,
            cfg.required_width,
            cfg.required_height,
        ) {
            ValidationResult::Valid {
                width,
                height,
                byte_size,
            } => println!("ok       {} ({width}×{height}, {byte_size} bytes)", doc.filename),
            ValidationResult::Rejected { reason } => {
                rejected += 1;
                println!("rejected {}: {reason}", doc.filename);
            }
        }
    }

    if rejected > 0 {
        anyhow::bail!("{rejected} of {} file(s) rejected", args.files.len());
    }
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let bytes =
        std::fs::read(&args.file).with_context(|| format!("read '{}'", args.file.display()))?;
    let doc = svg2tgs::decode(&bytes)?;
    let png = doc.embedded_png()?;

    println!("file:       {}", args.file.display());
    println!("container:  {} bytes", bytes.len());
    println!("version:    {}", doc.version);
    println!("canvas:     {}", doc.canvas());
    println!("frame rate: {} fps", doc.frame_rate);
    println!("duration:   {} frames", doc.duration_frames());
    println!("layers:     {}", doc.layers.len());
    println!("png:        {} bytes", png.len());

    if let Some(out) = args.extract_png {
        std::fs::write(&out, &png).with_context(|| format!("write '{}'", out.display()))?;
        eprintln!("wrote {}", out.display());
    }
    Ok(())
}
