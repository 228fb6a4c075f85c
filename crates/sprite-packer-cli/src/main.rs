use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, anyhow};
use clap::{ArgAction, Parser, Subcommand};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use sprite_packer_core::compositing::compose_page;
use sprite_packer_core::crop::detect_crop;
use sprite_packer_core::export::Manifest;
use sprite_packer_core::groups::{ExportGroups, pack_groups};
use sprite_packer_core::sheet::{parse_sheet, sprite_name_prefix};
use sprite_packer_core::sprite::{Sprite, sprite_requests};
use sprite_packer_core::{PackStats, PackerConfig, SizeSearch};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(
    name = "sprite-packer",
    about = "Pack .sprsheet sprite sheets into atlas pages",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pack sprite sheets into PNG pages and a JSON manifest
    Pack(PackArgs),
    /// Layout-only export (no PNGs): compute placements and write the manifest
    Layout(PackArgs),
}

#[derive(Parser, Debug, Clone)]
struct PackArgs {
    // Input/Output
    /// Directory searched recursively for .sprsheet files
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Output path without extension: writes <out>_<n>.png and <out>.json
    #[arg(short, long, default_value = "atlas", help_heading = "Input/Output")]
    out: PathBuf,
    /// YAML config file (its fields override the options below)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Export group file; each group is packed into its own pages
    #[arg(long, help_heading = "Input/Output")]
    groups: Option<PathBuf>,

    // Naming
    /// Prefix inserted before every sprite name
    #[arg(long, default_value = "", help_heading = "Naming")]
    prefix: String,
    /// Use the sheet's folder (relative to the input) as part of sprite names
    #[arg(long, default_value_t = true, action=ArgAction::Set, help_heading = "Naming")]
    use_folders: bool,

    // Layout
    /// Maximum page side in pixels
    #[arg(long, default_value_t = 2048, help_heading = "Layout")]
    max_size: u32,
    /// Maximum page width (defaults to --max-size)
    #[arg(long, help_heading = "Layout")]
    max_width: Option<u32>,
    /// Maximum page height (defaults to --max-size)
    #[arg(long, help_heading = "Layout")]
    max_height: Option<u32>,
    /// Minimum space in pixels between sprites
    #[arg(long, default_value_t = 1, help_heading = "Layout")]
    margin: u32,
    /// Page shrinking after packing: none | exact | pow2
    #[arg(long, default_value = "pow2", help_heading = "Layout")]
    size_search: String,
    /// Pack export groups in parallel (requires core feature `parallel`)
    #[arg(long, default_value_t = false, help_heading = "Layout")]
    parallel: bool,

    // Image Processing
    /// Use crop information from sheets to save space
    #[arg(long, default_value_t = true, action=ArgAction::Set, help_heading = "Image Processing")]
    use_crop_info: bool,
    /// Compute crops from alpha for sprites whose sheet has none
    #[arg(long, default_value_t = false, help_heading = "Image Processing")]
    detect_crop: bool,
    /// Alpha at or below this counts as transparent when detecting crops
    #[arg(long, default_value_t = 0, help_heading = "Image Processing")]
    crop_threshold: u8,

    // Export
    /// Include the .png extension in manifest "src" fields
    #[arg(long, default_value_t = true, action=ArgAction::Set, help_heading = "Export")]
    use_src_ext: bool,
    /// Export packing stats (JSON) to this file
    #[arg(long, help_heading = "Export")]
    export_stats: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: compute layout and stats but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

/// Options that shape sprite names, crops and the manifest.
#[derive(Debug, Clone, Serialize)]
struct ExportOptions {
    prefix: String,
    use_folders: bool,
    use_crop_info: bool,
    detect_crop: bool,
    crop_threshold: u8,
    use_src_ext: bool,
}

#[derive(Serialize)]
struct MergedConfig<'a> {
    #[serde(flatten)]
    packer: &'a PackerConfig,
    #[serde(flatten)]
    export: &'a ExportOptions,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Pack(args) => run_pack(args, cli.progress && !cli.quiet, false),
        Commands::Layout(args) => run_pack(args, false, true),
    }
}

fn run_pack(args: &PackArgs, show_progress: bool, layout_only: bool) -> anyhow::Result<()> {
    let (cfg, opts) = resolve_config(args)?;
    if args.print_config {
        let merged = MergedConfig {
            packer: &cfg,
            export: &opts,
        };
        match args.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&merged)?),
            _ => println!("{}", serde_json::to_string_pretty(&merged)?),
        }
        return Ok(());
    }
    cfg.validate().context("invalid packer configuration")?;

    let sheet_paths = gather_sheets(&args.input)?;
    if sheet_paths.is_empty() {
        anyhow::bail!("no .sprsheet files under {}", args.input.display());
    }
    let (mut sprites, images) =
        load_sheets_with_progress(&args.input, &sheet_paths, &opts, show_progress)?;
    info!(
        sheets = images.len(),
        sprites = sprites.len(),
        "loaded sprite sheets"
    );
    warn_duplicate_names(&sprites);
    if opts.detect_crop {
        apply_detected_crops(&mut sprites, &images, opts.crop_threshold);
    }

    let groups = match &args.groups {
        Some(path) => {
            let src = fs::read_to_string(path)
                .with_context(|| format!("read group file {}", path.display()))?;
            ExportGroups::parse(&src).with_context(|| format!("parse {}", path.display()))?
        }
        None => ExportGroups::default(),
    };
    if !groups.is_empty() {
        for g in groups.groups() {
            debug!(group = %g.name, patterns = ?g.patterns, "export group");
        }
        info!(groups = groups.groups().len(), "export groups loaded");
    }

    let requests = sprite_requests(&sprites, opts.use_crop_info);
    let parts = groups.partition(requests, |r| r.label.as_deref().unwrap_or(""));
    let t0 = Instant::now();
    let packed = pack_groups(parts, &cfg).context("packing failed")?;
    info!(groups = packed.len(), elapsed = %fmt_dur(t0.elapsed()), "packing done");

    let out_name = args
        .out
        .file_name()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow!("--out must end in a file name: {}", args.out.display()))?
        .to_string();
    let write_pages = !args.dry_run && !layout_only;
    if !args.dry_run {
        if let Some(dir) = args.out.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
        }
    }
    if write_pages {
        let mut suffixes = vec![String::new()];
        suffixes.extend(groups.groups().iter().map(|g| group_suffix(&g.name)));
        for suffix in &suffixes {
            let removed = delete_stale_pages(&with_suffix(&args.out, suffix))?;
            if removed > 0 {
                debug!(removed, suffix = %suffix, "deleted stale pages");
            }
        }
    }

    let mut manifest = Manifest::default();
    for (group, pages) in &packed {
        let suffix = group.as_deref().map(group_suffix).unwrap_or_default();
        for (n, page) in pages.iter().enumerate() {
            let src = if opts.use_src_ext {
                format!("{out_name}{suffix}_{n}.png")
            } else {
                format!("{out_name}{suffix}_{n}")
            };
            manifest.push_page(&src, page, &sprites, opts.use_crop_info);
            if !write_pages {
                continue;
            }
            let canvas = compose_page(page, &sprites, &images, opts.use_crop_info, cfg.margin)
                .with_context(|| format!("compose page {n} of group {group:?}"))?;
            let path = with_suffix(&args.out, &format!("{suffix}_{n}.png"));
            canvas
                .save(&path)
                .with_context(|| format!("write {}", path.display()))?;
            info!(
                ?path,
                sprites = page.placements.len(),
                width = page.width,
                height = page.height,
                "page written"
            );
        }
    }

    if !args.dry_run {
        let json_path = with_suffix(&args.out, ".json");
        fs::write(&json_path, manifest.to_json_string()?)
            .with_context(|| format!("write {}", json_path.display()))?;
        info!(?json_path, sprites = manifest.sprites.len(), "manifest written");
    }

    let stats = PackStats::from_pages(packed.iter().flat_map(|(_, pages)| pages));
    info!("{}", stats.summary());
    if let Some(stats_path) = &args.export_stats {
        if !args.dry_run {
            fs::write(stats_path, serde_json::to_string_pretty(&stats)?)
                .with_context(|| format!("write {}", stats_path.display()))?;
            info!(?stats_path, "stats exported");
        } else {
            println!(
                "pages={} sprites={} used_area={} total_area={} occupancy={:.2}%",
                stats.num_pages,
                stats.num_sprites,
                stats.used_area,
                stats.total_page_area,
                stats.occupancy * 100.0
            );
        }
    }
    Ok(())
}

fn resolve_config(args: &PackArgs) -> anyhow::Result<(PackerConfig, ExportOptions)> {
    let mut cfg = PackerConfig::builder()
        .with_max_dimensions(
            args.max_width.unwrap_or(args.max_size),
            args.max_height.unwrap_or(args.max_size),
        )
        .margin(args.margin)
        .size_search(parse_size_search(&args.size_search)?)
        .parallel(args.parallel)
        .build();
    let mut opts = ExportOptions {
        prefix: args.prefix.clone(),
        use_folders: args.use_folders,
        use_crop_info: args.use_crop_info,
        detect_crop: args.detect_crop,
        crop_threshold: args.crop_threshold,
        use_src_ext: args.use_src_ext,
    };
    if let Some(path) = &args.config {
        let file =
            fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)
            .with_context(|| format!("parse config {}", path.display()))?;
        y.apply(&mut cfg, &mut opts)?;
    }
    Ok((cfg, opts))
}

fn parse_size_search(s: &str) -> anyhow::Result<SizeSearch> {
    s.parse()
        .map_err(|_| anyhow!("unknown size search: {} (expected none|exact|pow2)", s))
}

fn gather_sheets(root: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if !root.is_dir() {
        anyhow::bail!("input is not a directory: {}", root.display());
    }
    let mut list: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && is_sheet(p))
        .collect();
    list.sort();
    Ok(list)
}

fn is_sheet(p: &Path) -> bool {
    p.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("sprsheet"))
}

/// Reads every sheet and its image. `Sprite::sheet` indexes the returned images.
fn load_sheets_with_progress(
    root: &Path,
    paths: &[PathBuf],
    opts: &ExportOptions,
    progress: bool,
) -> anyhow::Result<(Vec<Sprite>, Vec<RgbaImage>)> {
    use indicatif::{ProgressBar, ProgressStyle};
    let bar = if progress {
        let b = ProgressBar::new(paths.len() as u64);
        b.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} loading {pos}/{len} [{elapsed_precise}] {wide_msg}",
            )
            .context("progress bar template")?,
        );
        Some(b)
    } else {
        None
    };
    let mut sprites = Vec::new();
    let mut images = Vec::with_capacity(paths.len());
    for (index, p) in paths.iter().enumerate() {
        if let Some(b) = &bar {
            b.set_message(p.file_name().and_then(|s| s.to_str()).unwrap_or("").to_string());
        }
        let xml = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
        let relative = p.strip_prefix(root).unwrap_or(p);
        let prefix = sprite_name_prefix(&opts.prefix, relative, opts.use_folders);
        let sheet =
            parse_sheet(&xml, index, &prefix).with_context(|| format!("parse {}", p.display()))?;
        let image_path = p.parent().unwrap_or(root).join(&sheet.src);
        let image = image::open(&image_path)
            .with_context(|| format!("open sheet image {}", image_path.display()))?
            .to_rgba8();
        debug!(
            sheet = %relative.display(),
            sprites = sheet.sprites.len(),
            "sheet loaded"
        );
        sprites.extend(sheet.sprites);
        images.push(image);
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok((sprites, images))
}

fn apply_detected_crops(sprites: &mut [Sprite], images: &[RgbaImage], threshold: u8) {
    let mut detected = 0usize;
    for s in sprites.iter_mut().filter(|s| s.crop.is_none()) {
        s.crop = Some(detect_crop(&images[s.sheet], s.source, threshold));
        detected += 1;
    }
    debug!(detected, "crops detected from alpha");
}

fn warn_duplicate_names(sprites: &[Sprite]) {
    let mut seen = HashSet::new();
    for s in sprites {
        if !seen.insert(s.name.as_str()) {
            warn!(name = %s.name, "duplicate sprite name");
        }
    }
}

/// Part of a page file name that identifies an export group.
fn group_suffix(group: &str) -> String {
    let safe: String = group
        .chars()
        .map(|c| match c {
            '/' | '\\' | '*' | '?' | ':' => '_',
            c => c,
        })
        .collect();
    format!("_{safe}")
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut s: OsString = base.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

/// Deletes `<stem>_0.png`, `<stem>_1.png`, ... up to the first missing index.
fn delete_stale_pages(stem: &Path) -> anyhow::Result<usize> {
    let mut n = 0;
    loop {
        let path = with_suffix(stem, &format!("_{n}.png"));
        if !path.is_file() {
            return Ok(n);
        }
        fs::remove_file(&path).with_context(|| format!("delete {}", path.display()))?;
        n += 1;
    }
}

fn fmt_dur(d: Duration) -> String {
    let ms = d.as_secs_f64() * 1000.0;
    if ms >= 1.0 {
        format!("{:.1}ms", ms)
    } else {
        format!("{}µs", d.as_micros())
    }
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    max_size: Option<u32>,
    max_width: Option<u32>,
    max_height: Option<u32>,
    margin: Option<u32>,
    size_search: Option<String>,
    parallel: Option<bool>,
    prefix: Option<String>,
    use_folders: Option<bool>,
    use_crop_info: Option<bool>,
    detect_crop: Option<bool>,
    crop_threshold: Option<u8>,
    use_src_ext: Option<bool>,
}

impl YamlConfig {
    fn apply(self, cfg: &mut PackerConfig, opts: &mut ExportOptions) -> anyhow::Result<()> {
        if let Some(v) = self.max_size {
            cfg.max_width = v;
            cfg.max_height = v;
        }
        if let Some(v) = self.max_width {
            cfg.max_width = v;
        }
        if let Some(v) = self.max_height {
            cfg.max_height = v;
        }
        if let Some(v) = self.margin {
            cfg.margin = v;
        }
        if let Some(v) = self.size_search.as_deref() {
            cfg.size_search = parse_size_search(v)?;
        }
        if let Some(v) = self.parallel {
            cfg.parallel = v;
        }
        if let Some(v) = self.prefix {
            opts.prefix = v;
        }
        if let Some(v) = self.use_folders {
            opts.use_folders = v;
        }
        if let Some(v) = self.use_crop_info {
            opts.use_crop_info = v;
        }
        if let Some(v) = self.detect_crop {
            opts.detect_crop = v;
        }
        if let Some(v) = self.crop_threshold {
            opts.crop_threshold = v;
        }
        if let Some(v) = self.use_src_ext {
            opts.use_src_ext = v;
        }
        Ok(())
    }
}
