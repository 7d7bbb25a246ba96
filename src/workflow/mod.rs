pub mod record_ctx;
pub mod resolve_flow;

pub use record_ctx::RecordCtx;
pub use resolve_flow::{ResolveFlow, ResolvedPdf};
