use std::sync::Arc;

use tracing::info;

use crate::composite::{anaglyph, dissolve, highlight, side_by_side, HighlightOptions};
use crate::coords::{Rect, WorkingSpace};
use crate::correspondence::{resolve, CorrespondenceHint, Resolution};
use crate::error::Result;
use crate::params::{ComparisonParameters, CorrPts};
use crate::raster::{RasterImage, WorkingImage};
use crate::warp::{warp, WarpResult};

use super::config::{CompareMode, PipelineConfig};
use super::types::{NoOpReporter, PipelineOutputs, PipelineStage, ProgressReporter, Visualizations};

/// One comparison session: the two working images, the current
/// correspondences and the outputs derived from them.
///
/// Every setter reruns the stages its change affects and replaces the
/// outputs. Intermediate buffers of a run are dropped when the run returns.
pub struct PipelineState {
    config: PipelineConfig,
    params: ComparisonParameters,
    hint: CorrespondenceHint,
    first: WorkingImage,
    second: WorkingImage,
    resolution: Resolution,
    warp: WarpResult,
    outputs: PipelineOutputs,
    reporter: Arc<dyn ProgressReporter>,
}

impl PipelineState {
    /// Prepare both images and run every stage once.
    ///
    /// `params` supplies the correspondence hint and overrides the options it
    /// carries (mode, ROI, ordering, noise reduction) on `config`.
    pub fn new(
        first: &RasterImage,
        second: &RasterImage,
        params: ComparisonParameters,
        config: PipelineConfig,
        reporter: Arc<dyn ProgressReporter>,
    ) -> Result<Self> {
        let mut config = config;
        params.apply_to(&mut config);
        let config = config.validated()?;

        reporter.begin_stage(PipelineStage::Resizing, Some(2));
        let first = prepare(first, &config)?;
        reporter.advance(1);
        let second = prepare(second, &config)?;
        reporter.advance(2);
        reporter.finish_stage();
        info!(
            first = ?first.mapping.working_size(),
            second = ?second.mapping.working_size(),
            max_size = config.max_working_size,
            "Working sizes computed"
        );

        let hint = params.hint();
        let resolution = resolve_stage(&first, &second, &hint, &config, reporter.as_ref());
        let warp = warp_stage(&first, &second, &resolution, reporter.as_ref());
        let outputs = composite_stage(&first, &warp, &resolution.roi, &config, reporter.as_ref())?;

        Ok(Self {
            config,
            params,
            hint,
            first,
            second,
            resolution,
            warp,
            outputs,
            reporter,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn outputs(&self) -> &PipelineOutputs {
        &self.outputs
    }

    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    pub fn hint(&self) -> &CorrespondenceHint {
        &self.hint
    }

    pub fn first(&self) -> &WorkingImage {
        &self.first
    }

    pub fn second(&self) -> &WorkingImage {
        &self.second
    }

    pub fn warp(&self) -> &WarpResult {
        &self.warp
    }

    /// Replace the correspondences and rerun from resolution onward.
    pub fn set_correspondences(&mut self, hint: CorrespondenceHint) -> Result<&PipelineOutputs> {
        self.hint = hint;
        self.rerun()
    }

    /// Replace the region of interest and rerun from resolution onward.
    pub fn set_roi(&mut self, roi: Option<String>) -> Result<&PipelineOutputs> {
        self.config.roi = roi.filter(|s| !s.is_empty());
        self.rerun()
    }

    /// Switch visualization family; the alignment is kept.
    pub fn set_mode(&mut self, mode: CompareMode) -> Result<&PipelineOutputs> {
        self.config.mode = mode;
        self.recomposite()
    }

    pub fn set_show_first_on_right(&mut self, on_right: bool) -> Result<&PipelineOutputs> {
        self.config.show_first_on_right = on_right;
        self.recomposite()
    }

    pub fn set_noise_reduction(&mut self, enabled: bool) -> Result<&PipelineOutputs> {
        self.config.noise_reduction = enabled;
        self.recomposite()
    }

    /// Resolve, warp and composite again from the current state.
    pub fn rerun(&mut self) -> Result<&PipelineOutputs> {
        let reporter = self.reporter.as_ref();
        let resolution = resolve_stage(&self.first, &self.second, &self.hint, &self.config, reporter);
        let warp = warp_stage(&self.first, &self.second, &resolution, reporter);
        let outputs = composite_stage(&self.first, &warp, &resolution.roi, &self.config, reporter)?;
        self.resolution = resolution;
        self.warp = warp;
        self.outputs = outputs;
        Ok(&self.outputs)
    }

    fn recomposite(&mut self) -> Result<&PipelineOutputs> {
        self.outputs = composite_stage(
            &self.first,
            &self.warp,
            &self.resolution.roi,
            &self.config,
            self.reporter.as_ref(),
        )?;
        Ok(&self.outputs)
    }

    /// Dissolve at opacity `t` from the current alignment, in any mode.
    pub fn dissolve(&self, t: f32) -> Result<RasterImage> {
        dissolve(&self.first.raster, &self.warp.sharpened, t)
    }

    /// Snapshot of the parameters that reproduce this alignment, with the
    /// resolved correspondences in full-size coordinates.
    pub fn export_parameters(&self) -> ComparisonParameters {
        ComparisonParameters {
            img1: self.params.img1.clone(),
            img2: self.params.img2.clone(),
            img1_label: self.params.img1_label.clone(),
            img2_label: self.params.img2_label.clone(),
            corr_pts: Some(CorrPts::Points(self.resolution.correspondences.clone())),
            img1_roi_xywh: self.config.roi.clone(),
            mode: self.config.mode.is_global(),
            show_img1_right: self.config.show_first_on_right,
            nrbi: Some(self.config.noise_reduction),
        }
    }
}

fn prepare(natural: &RasterImage, config: &PipelineConfig) -> Result<WorkingImage> {
    let mut img = WorkingImage::prepare(natural, config.working_max_size())?;
    img.mapping = img.mapping.with_display_limit(&config.display);
    Ok(img)
}

fn resolve_stage(
    first: &WorkingImage,
    second: &WorkingImage,
    hint: &CorrespondenceHint,
    config: &PipelineConfig,
    reporter: &dyn ProgressReporter,
) -> Resolution {
    reporter.begin_stage(PipelineStage::Resolving, None);
    let resolution = resolve(
        first,
        second,
        hint,
        config.roi.as_deref(),
        &config.matching,
        &config.features,
    );
    reporter.finish_stage();
    resolution
}

fn warp_stage(
    first: &WorkingImage,
    second: &WorkingImage,
    resolution: &Resolution,
    reporter: &dyn ProgressReporter,
) -> WarpResult {
    reporter.begin_stage(PipelineStage::Warping, None);
    let result = warp(
        &second.raster,
        &resolution.transform,
        first.width(),
        first.height(),
    );
    reporter.finish_stage();
    result
}

fn composite_stage(
    first: &WorkingImage,
    warp: &WarpResult,
    roi: &Rect<WorkingSpace>,
    config: &PipelineConfig,
    reporter: &dyn ProgressReporter,
) -> Result<PipelineOutputs> {
    let a = &first.raster;
    let b = &warp.sharpened;
    let on_right = config.show_first_on_right;

    let total = if config.mode.is_global() { 2 } else { 4 };
    reporter.begin_stage(PipelineStage::Compositing, Some(total));
    let side = side_by_side(a, b, on_right)?;
    reporter.advance(1);

    let visualizations = match config.mode {
        CompareMode::GlobalDissolve => {
            let dissolve = dissolve(a, b, config.opacity)?;
            reporter.advance(2);
            Visualizations::Global { dissolve }
        }
        CompareMode::LocalHighlight => {
            let options = HighlightOptions {
                noise_reduction: config.noise_reduction,
                first_on_right: on_right,
            };
            let highlight = highlight(a, warp, roi, &options)?;
            reporter.advance(2);
            let highlighted_side_by_side = side_by_side(&highlight.first, &highlight.second, on_right)?;
            reporter.advance(3);
            let anaglyph = anaglyph(a, b, roi)?;
            reporter.advance(4);
            info!(
                differences = highlight.difference_pixels,
                first = %highlight.legend.first,
                second = %highlight.legend.second,
                "Highlight computed"
            );
            Visualizations::Local {
                highlight,
                highlighted_side_by_side,
                anaglyph,
            }
        }
    };
    reporter.finish_stage();

    Ok(PipelineOutputs {
        first: a.clone(),
        second: b.clone(),
        side_by_side: side,
        visualizations,
    })
}

/// Run the full pipeline with a thread-safe progress reporter.
pub fn run_pipeline_reported(
    first: &RasterImage,
    second: &RasterImage,
    params: &ComparisonParameters,
    config: &PipelineConfig,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<PipelineState> {
    PipelineState::new(first, second, params.clone(), config.clone(), reporter)
}

/// Run the full pipeline.
pub fn run_pipeline(
    first: &RasterImage,
    second: &RasterImage,
    params: &ComparisonParameters,
    config: &PipelineConfig,
) -> Result<PipelineState> {
    run_pipeline_reported(first, second, params, config, Arc::new(NoOpReporter))
}
