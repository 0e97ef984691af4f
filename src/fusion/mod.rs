//! Fusion assembly: from a parsed call to an annotated fusion protein.

pub mod assembler;
pub mod types;

pub use assembler::{FusionAssembler, build_fusion_sequence};
pub use types::{
    Breakpoint, Confidence, ConfidenceThresholds, FusionInput, FusionRecord, PartnerAnnotation,
    PartnerDescriptor,
};
