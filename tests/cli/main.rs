//! CLI tests for npm-exclude
//!
//! A shell script stands in for npm and records what it saw while running.

#![cfg(unix)]

mod common;
mod exclude;
