//! Command-line argument definitions

use clap::Args;

/// Arguments for the detect command
#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the convert command
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: String,

    /// Output file path (default: auto-generated next to the input)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Source projection (default: detect from metadata)
    #[arg(long)]
    pub from: Option<String>,

    /// Target projection
    #[arg(long)]
    pub to: String,

    /// Output width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Output height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Per-conversion deadline in seconds
    #[arg(long)]
    pub deadline: Option<u64>,
}

/// Arguments for the batch-convert command
#[derive(Args, Debug)]
pub struct BatchConvertArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: String,

    /// Output directory
    #[arg(short, long)]
    pub output_dir: String,

    /// Source projection (default: detect from metadata)
    #[arg(long)]
    pub from: Option<String>,

    /// Target projections, comma separated
    #[arg(long, value_delimiter = ',')]
    pub targets: Vec<String>,

    /// Run conversions sequentially instead of in parallel
    #[arg(long)]
    pub sequential: bool,

    /// Per-conversion deadline in seconds
    #[arg(long)]
    pub deadline: Option<u64>,
}

/// Arguments for the viewport command
#[derive(Args, Debug)]
pub struct ViewportArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: String,

    /// Output file path
    #[arg(short, long)]
    pub output: String,

    /// Source projection (default: detect from metadata)
    #[arg(long)]
    pub from: Option<String>,

    /// Viewport yaw in degrees
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub yaw: f64,

    /// Viewport pitch in degrees
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub pitch: f64,

    /// Horizontal field of view in degrees
    #[arg(long, default_value = "90")]
    pub fov: f64,

    /// Vertical field of view in degrees (default: same as --fov)
    #[arg(long)]
    pub fov_vertical: Option<f64>,

    /// Output width in pixels
    #[arg(long, default_value = "1920")]
    pub width: u32,

    /// Output height in pixels
    #[arg(long, default_value = "1080")]
    pub height: u32,
}

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Source width in pixels
    #[arg(long)]
    pub width: u32,

    /// Source height in pixels
    #[arg(long)]
    pub height: u32,

    /// Motion intensity hint in [0, 1]
    #[arg(long)]
    pub motion: Option<f64>,

    /// Quality preset (low, medium, high, ultra)
    #[arg(long, default_value = "medium")]
    pub preset: String,

    /// Spherical projection to apply the 360° bitrate multiplier for
    #[arg(long)]
    pub projection: Option<String>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the stereo command
#[derive(Args, Debug)]
pub struct StereoArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: String,

    /// Output file path
    #[arg(short, long)]
    pub output: String,

    /// Stereoscopic layout of the input (top-bottom, left-right)
    #[arg(long)]
    pub layout: String,

    /// Convert to this layout instead of collapsing to mono
    #[arg(long)]
    pub to_layout: Option<String>,

    /// Eye to keep when collapsing to mono (left, right)
    #[arg(long, default_value = "left")]
    pub eye: String,

    /// Projection carried in the output metadata
    #[arg(long, default_value = "equirectangular")]
    pub projection: String,
}

/// Arguments for the stream command
#[derive(Args, Debug)]
pub struct StreamArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: String,

    /// Output directory for the streaming package
    #[arg(short, long)]
    pub output_dir: String,

    /// Video identifier (default: input file stem)
    #[arg(long)]
    pub video_id: Option<String>,

    /// Streaming formats, comma separated (hls, dash)
    #[arg(long, value_delimiter = ',', default_values_t = vec!["hls".to_string(), "dash".to_string()])]
    pub formats: Vec<String>,

    /// Quality preset override (low, medium, high, ultra)
    #[arg(long)]
    pub preset: Option<String>,

    /// Per-rendition encode deadline in seconds
    #[arg(long)]
    pub deadline: Option<u64>,
}
