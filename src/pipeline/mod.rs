//! File-processing tasks wired from the resolved configuration.
//!
//! Each task reads files matching its `input` globs, passes them through a
//! transformer, and writes the results under its `output` directory. Task
//! internals beyond that pipe are pluggable; the built-in transform is a
//! passthrough.

mod runner;
mod task;

pub use runner::{build, clean, run_task, run_task_with, run_tasks};
pub use task::{collect_inputs, expand_braces, static_base, Passthrough, TaskKind, Transform};
