//! depmap - dependency maps for legacy codebases
//!
//! Scans source files with a rule table of patterns, resolves every usage
//! to the declaration it names, and builds a scored dependency graph with
//! orphan and hub rankings.

pub mod cli;
pub mod config;
pub mod discovery;
pub mod graph;
pub mod models;
pub mod parsers;
pub mod progress;
pub mod reporters;
pub mod scoring;
