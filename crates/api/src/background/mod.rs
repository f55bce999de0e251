//! Periodic maintenance tasks, each stopped through a `CancellationToken`.

pub mod reset_code_sweep;
