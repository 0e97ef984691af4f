//! Juncture: gene-fusion breakpoint to fusion-protein annotation engine.

pub mod error;

pub mod chromosome;
pub mod cli;
pub mod config;
pub mod domain;
pub mod fasta;
pub mod fusion;
pub mod genome_assembly;
pub mod input;
pub mod mapping;
pub mod partner;
pub mod reference;
pub mod sequence;
pub mod strand;
pub mod transcript;
pub mod visualization;
