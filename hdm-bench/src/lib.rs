//! # HDM Bench
//!
//! Synthetic HDM file images for benchmarking the reader.

pub mod sample;

pub use sample::{SAMPLE_HEADER, sample_image, sample_payload};
