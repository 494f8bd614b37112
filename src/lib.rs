//! # gopkg-finder
//!
//! Fast discovery of importable Go packages for editor tooling.
//!
//! ## Architecture
//!
//! - **config**: Source root resolution from GOROOT/GOPATH or explicit overrides
//! - **decl**: Package clause extraction reading only the head of each file
//! - **scan**: Parallel per-root walk applying the package-list filter rules
//! - **catalog**: Deduplicated directory-to-package catalog assembly
//! - **cli**: Command-line interface definitions

pub mod catalog;
pub mod cli;
pub mod config;
pub mod decl;
pub mod scan;
