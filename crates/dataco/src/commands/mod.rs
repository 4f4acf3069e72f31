mod inspect;
mod pipeline;

pub use inspect::inspect;
pub use pipeline::{etl, kpis, run};
