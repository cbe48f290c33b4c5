use clap::{Parser, Subcommand};
use snapwrap::imaging::{ImageBackend, RustBackend, supported_input_extensions};
use snapwrap::session::Session;
use snapwrap::settings::{AspectRatio, Background, BackgroundKind, SettingsError, StylePatch};
use snapwrap::{config, export, output, palette, preview};
use std::path::PathBuf;

/// Style overrides shared by commands that compose a frame.
///
/// Applied on top of the `[style]` section of `snapwrap.toml`.
#[derive(clap::Args, Clone, Default)]
struct StyleArgs {
    /// Named preset applied before the other flags: borderless | transparent
    #[arg(long)]
    preset: Option<String>,
    /// Canvas padding around the card (px)
    #[arg(long)]
    padding: Option<f64>,
    /// Border width (px, before scaling); 0 = no border and no shadow
    #[arg(long)]
    inset: Option<f64>,
    /// Image corner radius (px, before scaling)
    #[arg(long)]
    radius: Option<f64>,
    /// Shadow intensity, 0-100
    #[arg(long)]
    shadow: Option<f64>,
    /// Shadow direction in degrees (0 = right, clockwise)
    #[arg(long)]
    angle: Option<f64>,
    /// "transparent", a color, a linear-gradient(...) or url("...")
    #[arg(long)]
    background: Option<String>,
    /// preset | custom | ai-suggested | mesh | wallpaper-image
    #[arg(long)]
    kind: Option<BackgroundKind>,
    /// auto, or W/H such as 16/9
    #[arg(long)]
    ratio: Option<AspectRatio>,
    /// Zoom on top of the fitted size, 10-300
    #[arg(long)]
    scale: Option<f64>,
    /// Horizontal card offset (px)
    #[arg(long, allow_negative_numbers = true)]
    pan_x: Option<i32>,
    /// Vertical card offset (px)
    #[arg(long, allow_negative_numbers = true)]
    pan_y: Option<i32>,
    /// Mesh shuffle seed
    #[arg(long)]
    mesh_seed: Option<u32>,
}

impl StyleArgs {
    fn to_patch(&self) -> Result<StylePatch, SettingsError> {
        let base = match &self.preset {
            Some(name) => StylePatch::named(name)?,
            None => StylePatch::default(),
        };
        Ok(base.merged(StylePatch {
            padding: self.padding,
            inset: self.inset,
            border_radius: self.radius,
            shadow_intensity: self.shadow,
            shadow_angle: self.angle,
            background: self.background.as_deref().map(Background::parse),
            background_kind: self.kind,
            aspect_ratio: self.ratio,
            scale_percent: self.scale,
            pan_x: self.pan_x,
            pan_y: self.pan_y,
            mesh_seed: self.mesh_seed,
        }))
    }
}

#[derive(Parser)]
#[command(name = "snapwrap")]
#[command(about = "Frame a photo and export a pixel-exact PNG")]
#[command(long_about = "\
Frame a photo and export a pixel-exact PNG

The frame is padding around a white-bordered card with rounded corners and
a drop shadow, on a background: transparent, a color, a linear gradient,
an Aurora mesh built from the photo's own colors, or a wallpaper image.

Defaults come from snapwrap.toml in the config directory; flags override
them for a single run. Set RUST_LOG=debug for details.

Run 'snapwrap gen-config' to generate a documented snapwrap.toml.")]
#[command(version)]
struct Cli {
    /// Directory holding snapwrap.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Frame an image and write the PNG
    Render {
        /// Source image (jpg, png, tiff, webp)
        input: PathBuf,
        /// Output file (defaults to export.file_name from the config)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        style: StyleArgs,
    },
    /// Print the palette extracted from an image
    Palette {
        input: PathBuf,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print the preview stylesheet for a framed image
    Preview {
        input: PathBuf,
        /// Width of the preview container; with --container-height fits the canvas into it
        #[arg(long, requires = "container_height")]
        container_width: Option<f64>,
        #[arg(long, requires = "container_width")]
        container_height: Option<f64>,
        #[command(flatten)]
        style: StyleArgs,
    },
    /// List gradient and aspect-ratio presets
    Presets,
    /// Print a stock snapwrap.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Render {
            input,
            output: out_path,
            style,
        } => {
            let cfg = config::load_config(&cli.config_dir)?;
            let backend = RustBackend::new();
            let session = open_session(&cfg, &backend, &input, &style)?;
            let result = session.export(&backend)?;
            let path = out_path.unwrap_or_else(|| PathBuf::from(&cfg.export.file_name));
            export::write_export(&result, &path)?;
            output::print_render_output(&result, &path);
        }
        Command::Palette { input, json } => {
            let image = RustBackend::new().decode(&input)?;
            let extracted = palette::extract_palette(&image);
            if json {
                println!("{}", serde_json::to_string_pretty(&extracted)?);
            } else {
                output::print_palette(&extracted);
            }
        }
        Command::Preview {
            input,
            container_width,
            container_height,
            style,
        } => {
            let cfg = config::load_config(&cli.config_dir)?;
            let backend = RustBackend::new();
            let session = open_session(&cfg, &backend, &input, &style)?;
            let Some(composition) = session.composition() else {
                return Err("no image loaded".into());
            };
            let scale = match (container_width, container_height) {
                (Some(w), Some(h)) => preview::viewport_scale(w, h, &composition),
                _ => 1.0,
            };
            output::print_preview(&preview::PreviewStyle::new(&composition, scale));
        }
        Command::Presets => {
            output::print_presets();
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load `input` into a session seeded from the config, apply the CLI
/// overrides and, for mesh backgrounds, the image's palette.
fn open_session(
    cfg: &config::FrameConfig,
    backend: &impl ImageBackend,
    input: &std::path::Path,
    style: &StyleArgs,
) -> Result<Session, Box<dyn std::error::Error>> {
    let mut session = Session::new(cfg.style.clone())
        .with_density(cfg.export.density())
        .with_wallpaper_root(cfg.wallpapers.directory.clone());
    let known = input
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| supported_input_extensions().contains(&e.to_ascii_lowercase().as_str()));
    if !known {
        log::warn!(
            "{} has no recognized image extension, guessing the format from its contents",
            input.display()
        );
    }
    let request = session.open(backend, input)?;
    session.apply_patch(&style.to_patch()?);
    if session.settings().background_kind == BackgroundKind::Mesh {
        session.apply_palette(request.run());
    }
    Ok(session)
}
