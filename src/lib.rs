//! Timed multiple-choice exams from extracted question sets.
//!
//! [`session::SessionController`] owns the exam: question set, responses,
//! clock and navigation. Extraction of questions from a PDF happens behind
//! the [`extract::ExtractionProvider`] trait; the terminal front end lives in
//! [`tui`] and [`ui`].

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod logging;
pub mod model;
pub mod navigation;
pub mod report;
pub mod responses;
pub mod scoring;
pub mod session;
pub mod state;
pub mod timer;
pub mod tui;
pub mod ui;
