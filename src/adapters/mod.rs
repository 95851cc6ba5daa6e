// Adapters - concrete implementations of the capability ports

pub mod exec_ffmpeg;
pub mod probe_ffprobe;

pub use exec_ffmpeg::FfmpegEncoder;
pub use probe_ffprobe::FfprobeProber;
