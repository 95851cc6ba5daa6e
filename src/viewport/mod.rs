//! Viewport extraction module
//!
//! Computes the rectilinear (pinhole-camera) view into spherical content.
//! The core contract is the per-pixel mapping function from destination
//! pixels to source (u, v) coordinates; the actual pixel resampling is
//! delegated to the encoder collaborator through a v360 flat-viewport filter
//! plan.

use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::domain::model::{ConversionResult, FilterPlan, ProjectionKind, ViewportConfig};
use crate::error::{SphereflowError, SphereflowResult};
use crate::geometry::{self, DEG};
use crate::ports::Encoder;

/// Per-pixel source sampling map for a viewport
///
/// Points are row-major normalized source coordinates, one per destination
/// pixel.
#[derive(Debug, Clone)]
pub struct SamplingMap {
    pub width: u32,
    pub height: u32,
    points: Vec<(f64, f64)>,
}

impl SamplingMap {
    /// Source (u, v) for a destination pixel
    pub fn source_uv(&self, px: u32, py: u32) -> (f64, f64) {
        self.points[(py * self.width + px) as usize]
    }
}

/// Camera-ray direction through a destination pixel, rotated by (yaw, pitch)
///
/// Standard pinhole projection with independent horizontal and vertical FOV;
/// asymmetric FOV is intentional and neither axis is derived from the other.
pub fn viewport_ray(viewport: &ViewportConfig, px: u32, py: u32) -> [f64; 3] {
    let nx = 2.0 * (px as f64 + 0.5) / viewport.output_width as f64 - 1.0;
    let ny = 1.0 - 2.0 * (py as f64 + 0.5) / viewport.output_height as f64;

    let tan_half_h = (viewport.fov_horizontal / 2.0 * DEG).tan();
    let tan_half_v = (viewport.fov_vertical / 2.0 * DEG).tan();
    let (x, y, z) = (nx * tan_half_h, ny * tan_half_v, 1.0);

    // Pitch about the x axis, then yaw about the y axis
    let (sin_pitch, cos_pitch) = (viewport.pitch * DEG).sin_cos();
    let (sin_yaw, cos_yaw) = (viewport.yaw * DEG).sin_cos();
    let y1 = y * cos_pitch + z * sin_pitch;
    let z1 = -y * sin_pitch + z * cos_pitch;
    [
        x * cos_yaw + z1 * sin_yaw,
        y1,
        -x * sin_yaw + z1 * cos_yaw,
    ]
}

/// Build the full per-pixel sampling map for a viewport over a source
/// projection
pub fn build_sampling_map(
    source_kind: ProjectionKind,
    viewport: &ViewportConfig,
) -> SphereflowResult<SamplingMap> {
    viewport.validate()?;
    ensure_extractable_source(source_kind)?;

    let mut points = Vec::with_capacity((viewport.output_width * viewport.output_height) as usize);
    for py in 0..viewport.output_height {
        for px in 0..viewport.output_width {
            let (yaw, pitch) = geometry::direction_to_sphere(viewport_ray(viewport, px, py));
            points.push(geometry::from_spherical(source_kind, yaw, pitch)?);
        }
    }
    debug!(
        source = %source_kind,
        pixels = points.len(),
        "built viewport sampling map"
    );
    Ok(SamplingMap {
        width: viewport.output_width,
        height: viewport.output_height,
        points,
    })
}

/// v360 flat-viewport filter plan for the encoder collaborator
pub fn filter_plan(
    source_kind: ProjectionKind,
    viewport: &ViewportConfig,
) -> SphereflowResult<FilterPlan> {
    viewport.validate()?;
    ensure_extractable_source(source_kind)?;
    let source_code =
        source_kind
            .v360_code()
            .ok_or_else(|| SphereflowError::UnsupportedProjection {
                projection: source_kind,
                operation: "viewport extraction".to_string(),
            })?;

    let filter = format!(
        "v360={}:flat:yaw={}:pitch={}:h_fov={}:v_fov={}:w={}:h={}",
        source_code,
        viewport.yaw,
        viewport.pitch,
        viewport.fov_horizontal,
        viewport.fov_vertical,
        viewport.output_width,
        viewport.output_height,
    );
    Ok(FilterPlan::simple(filter))
}

/// Viewport extractor driving the encoder collaborator
pub struct ViewportExtractor<'a> {
    encoder: &'a dyn Encoder,
}

impl<'a> ViewportExtractor<'a> {
    pub fn new(encoder: &'a dyn Encoder) -> Self {
        Self { encoder }
    }

    /// Extract a rectilinear viewport from a spherical source file
    ///
    /// Invalid viewport parameters fail with a configuration error before
    /// the encoder is touched; encoder failures are reported in the result,
    /// not raised.
    pub async fn extract(
        &self,
        source_kind: ProjectionKind,
        input: &Path,
        output: &Path,
        viewport: &ViewportConfig,
        deadline: Option<Duration>,
    ) -> SphereflowResult<ConversionResult> {
        let plan = filter_plan(source_kind, viewport)?;
        let operation = format!(
            "viewport_extraction_yaw{}_pitch{}",
            viewport.yaw, viewport.pitch
        );

        info!(
            input = %input.display(),
            yaw = viewport.yaw,
            pitch = viewport.pitch,
            "extracting viewport"
        );
        let started = Instant::now();
        match self.encoder.run_filter(input, output, &plan, deadline).await {
            Ok(path) => {
                info!(output = %path.display(), "viewport extraction complete");
                Ok(ConversionResult::succeeded(operation, started.elapsed(), path))
            }
            Err(error) => {
                warn!(%error, "viewport extraction failed");
                Ok(ConversionResult::failed(operation, started.elapsed(), error.to_string()))
            }
        }
    }
}

fn ensure_extractable_source(source_kind: ProjectionKind) -> SphereflowResult<()> {
    match source_kind {
        ProjectionKind::Flat | ProjectionKind::Unknown | ProjectionKind::Stereographic => {
            Err(SphereflowError::UnsupportedProjection {
                projection: source_kind,
                operation: "viewport extraction".to_string(),
            })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_ray_points_at_look_direction() {
        let viewport = ViewportConfig::new(30.0, -20.0, 90.0, 101, 101);
        let ray = viewport_ray(&viewport, 50, 50);
        let (yaw, pitch) = geometry::direction_to_sphere(ray);
        // Center pixel sits half a pixel from the exact optical axis
        assert!((yaw - 30.0).abs() < 1.0, "yaw {}", yaw);
        assert!((pitch - -20.0).abs() < 1.0, "pitch {}", pitch);
    }

    #[test]
    fn test_horizontal_fov_span() {
        // With 90° horizontal FOV the left edge ray sits 45° left of center
        let viewport = ViewportConfig::new(0.0, 0.0, 90.0, 1000, 1000);
        let ray = viewport_ray(&viewport, 0, 500);
        let (yaw, _) = geometry::direction_to_sphere(ray);
        assert!((yaw + 45.0).abs() < 0.5, "yaw {}", yaw);
    }

    #[test]
    fn test_asymmetric_fov_respected() {
        let viewport = ViewportConfig {
            yaw: 0.0,
            pitch: 0.0,
            fov_horizontal: 120.0,
            fov_vertical: 40.0,
            output_width: 1000,
            output_height: 1000,
        };
        let left = viewport_ray(&viewport, 0, 500);
        let top = viewport_ray(&viewport, 500, 0);
        let (yaw, _) = geometry::direction_to_sphere(left);
        let (_, pitch) = geometry::direction_to_sphere(top);
        assert!((yaw + 60.0).abs() < 0.5, "yaw {}", yaw);
        assert!((pitch - 20.0).abs() < 0.5, "pitch {}", pitch);
    }

    #[test]
    fn test_sampling_map_forward_view_hits_frame_center() {
        let viewport = ViewportConfig::new(0.0, 0.0, 90.0, 9, 9);
        let map = build_sampling_map(ProjectionKind::Equirectangular, &viewport).unwrap();
        let (u, v) = map.source_uv(4, 4);
        assert!((u - 0.5).abs() < 0.01, "u {}", u);
        assert!((v - 0.5).abs() < 0.01, "v {}", v);
    }

    #[test]
    fn test_invalid_fov_is_configuration_error() {
        let viewport = ViewportConfig::new(0.0, 0.0, 180.0, 1920, 1080);
        let result = build_sampling_map(ProjectionKind::Equirectangular, &viewport);
        assert!(matches!(result, Err(SphereflowError::Configuration { .. })));
    }

    #[test]
    fn test_stereographic_source_rejected() {
        let viewport = ViewportConfig::new(0.0, 0.0, 90.0, 640, 480);
        let result = filter_plan(ProjectionKind::Stereographic, &viewport);
        assert!(matches!(result, Err(SphereflowError::UnsupportedProjection { .. })));
    }

    #[test]
    fn test_filter_plan_string() {
        let viewport = ViewportConfig::new(45.0, -10.0, 90.0, 1920, 1080);
        let plan = filter_plan(ProjectionKind::Equirectangular, &viewport).unwrap();
        assert_eq!(
            plan.filter,
            "v360=e:flat:yaw=45:pitch=-10:h_fov=90:v_fov=90:w=1920:h=1080"
        );
        assert!(!plan.complex);
    }

    mod extraction {
        use super::*;
        use crate::domain::model::BitrateLevel;
        use async_trait::async_trait;
        use std::path::PathBuf;

        struct StubEncoder {
            fail: bool,
        }

        #[async_trait]
        impl Encoder for StubEncoder {
            async fn run_filter(
                &self,
                _input: &Path,
                output: &Path,
                _plan: &FilterPlan,
                _deadline: Option<Duration>,
            ) -> SphereflowResult<PathBuf> {
                if self.fail {
                    return Err(SphereflowError::encoding("stub failure"));
                }
                Ok(output.to_path_buf())
            }

            async fn encode_rendition(
                &self,
                _input: &Path,
                _output_dir: &Path,
                _level: &BitrateLevel,
                _video_id: &str,
                _deadline: Option<Duration>,
            ) -> SphereflowResult<PathBuf> {
                unreachable!("not used by viewport extraction")
            }

            async fn thumbnail_track(
                &self,
                _input: &Path,
                _output_dir: &Path,
                _video_id: &str,
            ) -> SphereflowResult<PathBuf> {
                unreachable!("not used by viewport extraction")
            }
        }

        #[tokio::test]
        async fn test_extract_reports_success() {
            let encoder = StubEncoder { fail: false };
            let extractor = ViewportExtractor::new(&encoder);
            let viewport = ViewportConfig::new(0.0, 0.0, 90.0, 1280, 720);
            let result = extractor
                .extract(
                    ProjectionKind::Equirectangular,
                    Path::new("/media/in.mp4"),
                    Path::new("/media/front.mp4"),
                    &viewport,
                    None,
                )
                .await
                .unwrap();
            assert!(result.success);
            assert_eq!(result.output_path.as_deref(), Some(Path::new("/media/front.mp4")));
        }

        #[tokio::test]
        async fn test_extract_folds_encoder_failure_into_result() {
            let encoder = StubEncoder { fail: true };
            let extractor = ViewportExtractor::new(&encoder);
            let viewport = ViewportConfig::new(0.0, 0.0, 90.0, 1280, 720);
            let result = extractor
                .extract(
                    ProjectionKind::Equirectangular,
                    Path::new("/media/in.mp4"),
                    Path::new("/media/front.mp4"),
                    &viewport,
                    None,
                )
                .await
                .unwrap();
            assert!(!result.success);
            assert!(result.error_message.as_deref().unwrap().contains("stub failure"));
        }

        #[tokio::test]
        async fn test_extract_rejects_bad_viewport_before_encoding() {
            let encoder = StubEncoder { fail: false };
            let extractor = ViewportExtractor::new(&encoder);
            let viewport = ViewportConfig::new(0.0, 0.0, 190.0, 1280, 720);
            let outcome = extractor
                .extract(
                    ProjectionKind::Equirectangular,
                    Path::new("/media/in.mp4"),
                    Path::new("/media/front.mp4"),
                    &viewport,
                    None,
                )
                .await;
            assert!(matches!(outcome, Err(SphereflowError::Configuration { .. })));
        }
    }
}
