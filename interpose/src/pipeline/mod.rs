//! Handler pipelines and their per-method cache.

mod cache;
mod handler_pipeline;

pub use cache::PipelineCache;
pub use handler_pipeline::HandlerPipeline;
