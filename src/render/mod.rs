pub mod context;
pub mod diff;
pub mod file;
pub mod loader;
pub mod walker;

pub use context::build_context;
pub use loader::{build_engine, TemplateLoader};
pub use walker::{
    execute_plan, plan_render, GeneratedOutput, GenerationPlan, PlannedFile, RenderInput,
};
