//! CLI module for Sphereflow
//!
//! This module handles command-line argument parsing and command execution.

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

/// Sphereflow 360° Video Toolkit
///
/// A command-line toolkit for 360-degree video work: spherical detection,
/// projection conversion, viewport extraction, and adaptive streaming
/// packaging.
#[derive(Parser)]
#[command(name = "sphereflow")]
#[command(about = "Sphereflow - 360-degree video projection and streaming toolkit")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Configuration file path (TOML)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Detect whether a video is spherical and with what projection
    Detect(args::DetectArgs),
    /// Convert a video between projection layouts
    Convert(args::ConvertArgs),
    /// Convert a video to several projection layouts at once
    BatchConvert(args::BatchConvertArgs),
    /// Extract a rectilinear viewport from a spherical video
    Viewport(args::ViewportArgs),
    /// Plan a bitrate ladder without encoding anything
    Plan(args::PlanArgs),
    /// Build an adaptive streaming package
    Stream(args::StreamArgs),
    /// Collapse or re-layout a stereoscopic video
    Stereo(args::StereoArgs),
}
