use crate::composite::HighlightOutput;
use crate::pipeline::config::CompareMode;
use crate::raster::RasterImage;

/// Pipeline processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Resizing,
    Resolving,
    Warping,
    Compositing,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resizing => write!(f, "Resizing images"),
            Self::Resolving => write!(f, "Resolving points"),
            Self::Warping => write!(f, "Warping image 2"),
            Self::Compositing => write!(f, "Compositing"),
        }
    }
}

/// Mode-specific visualizations.
#[derive(Clone, Debug)]
#[allow(clippy::large_enum_variant)]
pub enum Visualizations {
    Global {
        /// Dissolve at the configured opacity.
        dissolve: RasterImage,
    },
    Local {
        highlight: HighlightOutput,
        /// Both highlighted single images, side by side.
        highlighted_side_by_side: RasterImage,
        anaglyph: RasterImage,
    },
}

/// Everything one run produces, at image 1's working size.
#[derive(Clone, Debug)]
pub struct PipelineOutputs {
    /// Image 1, unmodified.
    pub first: RasterImage,
    /// Image 2 warped onto image 1 and sharpened.
    pub second: RasterImage,
    pub side_by_side: RasterImage,
    pub visualizations: Visualizations,
}

impl PipelineOutputs {
    pub fn mode(&self) -> CompareMode {
        match self.visualizations {
            Visualizations::Global { .. } => CompareMode::GlobalDissolve,
            Visualizations::Local { .. } => CompareMode::LocalHighlight,
        }
    }

    pub fn highlight(&self) -> Option<&HighlightOutput> {
        match &self.visualizations {
            Visualizations::Local { highlight, .. } => Some(highlight),
            Visualizations::Global { .. } => None,
        }
    }

    /// Every buffer with a stable name, in display order.
    pub fn named(&self) -> Vec<(&'static str, &RasterImage)> {
        let mut out = vec![
            ("first", &self.first),
            ("second", &self.second),
            ("side_by_side", &self.side_by_side),
        ];
        match &self.visualizations {
            Visualizations::Global { dissolve } => out.push(("dissolve", dissolve)),
            Visualizations::Local {
                highlight,
                highlighted_side_by_side,
                anaglyph,
            } => {
                out.push(("highlight", &highlight.merged));
                out.push(("highlighted_side_by_side", highlighted_side_by_side));
                out.push(("anaglyph", anaglyph));
            }
        }
        out
    }
}

/// Thread-safe progress reporting for the pipeline.
///
/// Implementors can use this to drive progress bars, logging, or any other
/// UI feedback. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new pipeline stage has started. `total_items` is the number of
    /// work items in this stage, if known.
    fn begin_stage(&self, _stage: PipelineStage, _total_items: Option<usize>) {}

    /// One work item within the current stage has completed.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

/// No-op progress reporter, used when `run_pipeline` delegates.
pub(super) struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}
