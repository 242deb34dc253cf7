//! TUI module: Terminal User Interface using Ratatui.
//!
//! Screens:
//! - Dashboard with backend status and platform figures
//! - Single-patient assessment form and result
//! - Batch cohort analysis
//! - Model metrics

mod app;
mod styles;
mod ui;
mod worker;

pub use app::App;
pub use styles::Theme;
pub use worker::{PredictionWorker, PredictionWorkerHandle, WorkerEvent};
