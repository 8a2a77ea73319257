//! Top-level facade crate for tally.
//!
//! Re-exports the core types and the pipeline library so users can depend on a single crate.

pub mod core {
    pub use tally_core::*;
}

pub mod pipeline {
    pub use tally_pipeline::*;
}
