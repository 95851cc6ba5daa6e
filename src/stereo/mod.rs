//! Stereoscopic layout processing module
//!
//! Collapses stereoscopic frames to monoscopic (one eye) and converts
//! between frame layouts (top-bottom and left-right), expressed as
//! crop/stack filter plans executed by the encoder collaborator. Frame
//! geometry only - no disparity or depth processing.

use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::domain::model::{ConversionResult, Eye, FilterPlan, ProjectionKind, StereoKind};
use crate::error::{SphereflowError, SphereflowResult};
use crate::ports::Encoder;

/// Filter plan extracting one eye from a stereoscopic layout
///
/// The kept half is scaled back to the full frame size so the output keeps
/// the source projection's expected aspect ratio.
pub fn mono_plan(layout: StereoKind, eye: Eye, projection: ProjectionKind) -> SphereflowResult<FilterPlan> {
    let (crop, scale) = match layout {
        StereoKind::TopBottom => {
            let crop = match eye {
                Eye::Left => "crop=iw:ih/2:0:0",
                Eye::Right => "crop=iw:ih/2:0:ih/2",
            };
            (crop, "scale=iw:ih*2")
        }
        StereoKind::LeftRight => {
            let crop = match eye {
                Eye::Left => "crop=iw/2:ih:0:0",
                Eye::Right => "crop=iw/2:ih:iw/2:0",
            };
            (crop, "scale=iw*2:ih")
        }
        StereoKind::Mono => {
            return Err(SphereflowError::configuration(
                "source is already monoscopic",
            ))
        }
        StereoKind::FrameSequential | StereoKind::Anaglyph | StereoKind::Unknown => {
            return Err(SphereflowError::configuration(format!(
                "unsupported stereo layout for eye extraction: {:?}",
                layout
            )))
        }
    };

    Ok(FilterPlan::simple(format!("{},{}", crop, scale))
        .with_metadata("spherical", "1")
        .with_metadata("projection", projection.as_str())
        .with_metadata("stereo_mode", "mono"))
}

/// Filter plan converting between stereoscopic frame layouts
pub fn layout_plan(
    from: StereoKind,
    to: StereoKind,
    projection: ProjectionKind,
) -> SphereflowResult<FilterPlan> {
    let filter = match (from, to) {
        (StereoKind::TopBottom, StereoKind::LeftRight) => {
            "[0:v]crop=iw:ih/2:0:0[left];[0:v]crop=iw:ih/2:0:ih/2[right];[left][right]hstack"
        }
        (StereoKind::LeftRight, StereoKind::TopBottom) => {
            "[0:v]crop=iw/2:ih:0:0[left];[0:v]crop=iw/2:ih:iw/2:0[right];[left][right]vstack"
        }
        (from, to) => {
            return Err(SphereflowError::configuration(format!(
                "unsupported stereo layout conversion: {:?} -> {:?}",
                from, to
            )))
        }
    };

    let stereo_tag = match to {
        StereoKind::TopBottom => "top-bottom",
        _ => "left-right",
    };
    Ok(FilterPlan::complex(filter)
        .with_metadata("spherical", "1")
        .with_metadata("projection", projection.as_str())
        .with_metadata("stereo_mode", stereo_tag))
}

/// Stereoscopic processor driving the encoder collaborator
pub struct StereoProcessor<'a> {
    encoder: &'a dyn Encoder,
}

impl<'a> StereoProcessor<'a> {
    pub fn new(encoder: &'a dyn Encoder) -> Self {
        Self { encoder }
    }

    /// Collapse a stereoscopic source to monoscopic by keeping one eye
    pub async fn to_mono(
        &self,
        input: &Path,
        output: &Path,
        layout: StereoKind,
        eye: Eye,
        projection: ProjectionKind,
        deadline: Option<Duration>,
    ) -> SphereflowResult<ConversionResult> {
        let plan = mono_plan(layout, eye, projection)?;
        let operation = format!("stereo_to_mono_{:?}", eye).to_lowercase();

        info!(input = %input.display(), ?layout, ?eye, "extracting eye from stereoscopic source");
        let started = Instant::now();
        match self.encoder.run_filter(input, output, &plan, deadline).await {
            Ok(path) => Ok(ConversionResult::succeeded(operation, started.elapsed(), path)),
            Err(error) => {
                warn!(%error, "stereo to mono conversion failed");
                Ok(ConversionResult::failed(operation, started.elapsed(), error.to_string()))
            }
        }
    }

    /// Convert between stereoscopic frame layouts
    pub async fn convert_layout(
        &self,
        input: &Path,
        output: &Path,
        from: StereoKind,
        to: StereoKind,
        projection: ProjectionKind,
        deadline: Option<Duration>,
    ) -> SphereflowResult<ConversionResult> {
        let plan = layout_plan(from, to, projection)?;
        let operation = format!("stereo_layout_{:?}_to_{:?}", from, to).to_lowercase();

        info!(input = %input.display(), ?from, ?to, "converting stereoscopic layout");
        let started = Instant::now();
        match self.encoder.run_filter(input, output, &plan, deadline).await {
            Ok(path) => Ok(ConversionResult::succeeded(operation, started.elapsed(), path)),
            Err(error) => {
                warn!(%error, "stereo layout conversion failed");
                Ok(ConversionResult::failed(operation, started.elapsed(), error.to_string()))
            }
        }
    }
}
