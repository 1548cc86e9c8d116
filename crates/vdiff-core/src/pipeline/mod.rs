pub mod config;
mod orchestrator;
mod types;

pub use orchestrator::{run_pipeline, run_pipeline_reported, PipelineState};
pub use types::{PipelineOutputs, PipelineStage, ProgressReporter, Visualizations};
