//! Integration test crate for Resona Studio.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on multiple resona crates to verify they work together.

#[cfg(test)]
mod audio;

#[cfg(test)]
mod effects;
