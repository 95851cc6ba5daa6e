//! Projection conversion module
//!
//! Converts full frames between projection layouts. Conversion is always
//! destination-driven (inverse mapping): every destination pixel is pulled
//! from the source through the target's `to_spherical` and the source's
//! `from_spherical`, which avoids the gaps a source-driven forward mapping
//! would leave. External conversions run as v360 filter plans on the encoder
//! collaborator; in-memory frames go through `geometry::project_frame`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::domain::model::{ConversionResult, FilterPlan, ProjectionKind};
use crate::error::{SphereflowError, SphereflowResult};
use crate::ports::Encoder;

/// Build the v360 filter plan for a full-frame projection conversion
pub fn conversion_plan(
    source_kind: ProjectionKind,
    target_kind: ProjectionKind,
    output_resolution: Option<(u32, u32)>,
) -> SphereflowResult<FilterPlan> {
    let source_code = source_v360_code(source_kind)?;
    let target_code = target_kind
        .v360_code()
        .filter(|_| target_kind != ProjectionKind::Flat)
        .ok_or_else(|| SphereflowError::UnsupportedProjection {
            projection: target_kind,
            operation: "projection conversion target (use viewport extraction for flat output)"
                .to_string(),
        })?;

    let mut filter = format!("v360={}:{}", source_code, target_code);
    if let Some((width, height)) = output_resolution {
        if width == 0 || height == 0 {
            return Err(SphereflowError::configuration(format!(
                "output resolution must be positive, got {}x{}",
                width, height
            )));
        }
        filter.push_str(&format!(":w={}:h={}", width, height));
    }

    Ok(FilterPlan::simple(filter)
        .with_metadata("spherical", "1")
        .with_metadata("projection", target_kind.as_str()))
}

fn source_v360_code(source_kind: ProjectionKind) -> SphereflowResult<&'static str> {
    // Stereographic is a spectator/output projection and is never accepted
    // as a conversion source
    if source_kind == ProjectionKind::Stereographic {
        return Err(SphereflowError::UnsupportedProjection {
            projection: source_kind,
            operation: "projection conversion source".to_string(),
        });
    }
    source_kind
        .v360_code()
        .filter(|_| source_kind != ProjectionKind::Flat)
        .ok_or_else(|| SphereflowError::UnsupportedProjection {
            projection: source_kind,
            operation: "projection conversion source".to_string(),
        })
}

/// Projection converter driving the encoder collaborator
pub struct ProjectionConverter {
    encoder: Arc<dyn Encoder>,
    parallelism: usize,
}

impl ProjectionConverter {
    pub fn new(encoder: Arc<dyn Encoder>) -> Self {
        Self {
            encoder,
            parallelism: num_cpus::get(),
        }
    }

    /// Cap the number of concurrent conversions in a parallel batch
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    /// Convert a source file into a single target projection
    ///
    /// Configuration problems (unsupported projection pairs, bad resolution)
    /// fail with an error before the encoder runs; encoder failures are
    /// captured in the returned result.
    pub async fn convert(
        &self,
        input: &Path,
        output: &Path,
        source_kind: ProjectionKind,
        target_kind: ProjectionKind,
        output_resolution: Option<(u32, u32)>,
        deadline: Option<Duration>,
    ) -> SphereflowResult<ConversionResult> {
        convert_with(
            self.encoder.as_ref(),
            input,
            output,
            source_kind,
            target_kind,
            output_resolution,
            deadline,
        )
        .await
    }

    /// Convert a source file into several target projections
    ///
    /// One `convert` per target; failures stay in their own result slot and
    /// never abort siblings. The returned sequence matches `targets` order
    /// regardless of completion order - parallel execution writes into
    /// pre-indexed slots rather than appending.
    pub async fn batch_convert(
        &self,
        input: &Path,
        output_dir: &Path,
        source_kind: ProjectionKind,
        targets: &[ProjectionKind],
        parallel: bool,
        deadline: Option<Duration>,
    ) -> Vec<ConversionResult> {
        info!(
            targets = targets.len(),
            parallel, "starting batch projection conversion"
        );

        if !parallel {
            let mut results = Vec::with_capacity(targets.len());
            for &target_kind in targets {
                results.push(
                    convert_unit(
                        self.encoder.as_ref(),
                        input,
                        output_dir,
                        source_kind,
                        target_kind,
                        deadline,
                    )
                    .await,
                );
            }
            return results;
        }

        let semaphore = Arc::new(Semaphore::new(self.parallelism));
        let mut join_set = JoinSet::new();
        for (index, &target_kind) in targets.iter().enumerate() {
            let encoder = Arc::clone(&self.encoder);
            let semaphore = Arc::clone(&semaphore);
            let input = input.to_path_buf();
            let output_dir = output_dir.to_path_buf();
            join_set.spawn(async move {
                let _permit = semaphore.acquire().await.expect("semaphore never closed");
                let result = convert_unit(
                    encoder.as_ref(),
                    &input,
                    &output_dir,
                    source_kind,
                    target_kind,
                    deadline,
                )
                .await;
                (index, result)
            });
        }

        let mut slots: Vec<Option<ConversionResult>> = vec![None; targets.len()];
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(join_error) => warn!(%join_error, "batch conversion task panicked"),
            }
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.unwrap_or_else(|| {
                    ConversionResult::failed(
                        format!("projection_conversion_{}_to_{}", source_kind, targets[index]),
                        Duration::ZERO,
                        "conversion task panicked",
                    )
                })
            })
            .collect()
    }
}

/// Run one conversion against a borrowed encoder
async fn convert_with(
    encoder: &dyn Encoder,
    input: &Path,
    output: &Path,
    source_kind: ProjectionKind,
    target_kind: ProjectionKind,
    output_resolution: Option<(u32, u32)>,
    deadline: Option<Duration>,
) -> SphereflowResult<ConversionResult> {
    let plan = conversion_plan(source_kind, target_kind, output_resolution)?;
    let operation = format!("projection_conversion_{}_to_{}", source_kind, target_kind);
    if source_kind == target_kind {
        debug!(%source_kind, "source and target projections are identical");
    }

    info!(
        input = %input.display(),
        %source_kind,
        %target_kind,
        "converting projection"
    );
    let started = Instant::now();
    match encoder.run_filter(input, output, &plan, deadline).await {
        Ok(path) => {
            info!(output = %path.display(), "projection conversion complete");
            Ok(ConversionResult::succeeded(operation, started.elapsed(), path))
        }
        Err(error) => {
            warn!(%error, %target_kind, "projection conversion failed");
            Ok(ConversionResult::failed(operation, started.elapsed(), error.to_string()))
        }
    }
}

/// Run one batch unit, folding configuration errors into the result slot
async fn convert_unit(
    encoder: &dyn Encoder,
    input: &Path,
    output_dir: &Path,
    source_kind: ProjectionKind,
    target_kind: ProjectionKind,
    deadline: Option<Duration>,
) -> ConversionResult {
    let output = batch_output_path(input, output_dir, target_kind);
    match convert_with(encoder, input, &output, source_kind, target_kind, None, deadline).await {
        Ok(result) => result,
        Err(error) => ConversionResult::failed(
            format!("projection_conversion_{}_to_{}", source_kind, target_kind),
            Duration::ZERO,
            error.to_string(),
        ),
    }
}

/// Output filename for one batch conversion target
fn batch_output_path(input: &Path, output_dir: &Path, target_kind: ProjectionKind) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    output_dir.join(format!("{}_{}.mp4", stem, target_kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_plan_string() {
        let plan = conversion_plan(
            ProjectionKind::Equirectangular,
            ProjectionKind::Cubemap,
            None,
        )
        .unwrap();
        assert_eq!(plan.filter, "v360=e:c3x2");
        assert!(plan
            .output_metadata
            .contains(&("projection".to_string(), "cubemap".to_string())));
    }

    #[test]
    fn test_conversion_plan_with_resolution() {
        let plan = conversion_plan(
            ProjectionKind::Equirectangular,
            ProjectionKind::Eac,
            Some((3840, 1920)),
        )
        .unwrap();
        assert_eq!(plan.filter, "v360=e:eac:w=3840:h=1920");
    }

    #[test]
    fn test_stereographic_source_rejected() {
        let result = conversion_plan(
            ProjectionKind::Stereographic,
            ProjectionKind::Equirectangular,
            None,
        );
        assert!(matches!(result, Err(SphereflowError::UnsupportedProjection { .. })));
    }

    #[test]
    fn test_stereographic_target_allowed() {
        let plan = conversion_plan(
            ProjectionKind::Equirectangular,
            ProjectionKind::Stereographic,
            None,
        )
        .unwrap();
        assert_eq!(plan.filter, "v360=e:sg");
    }

    #[test]
    fn test_flat_target_rejected() {
        let result = conversion_plan(ProjectionKind::Equirectangular, ProjectionKind::Flat, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_resolution_rejected() {
        let result = conversion_plan(
            ProjectionKind::Equirectangular,
            ProjectionKind::Cubemap,
            Some((0, 1080)),
        );
        assert!(matches!(result, Err(SphereflowError::Configuration { .. })));
    }

    #[test]
    fn test_batch_output_path_naming() {
        let path = batch_output_path(
            Path::new("/media/dive_360.mp4"),
            Path::new("/out"),
            ProjectionKind::Eac,
        );
        assert_eq!(path, Path::new("/out/dive_360_eac.mp4"));
    }
}
