//! Clipwise - ask questions about a local video
//!
//! A local-first assistant that answers natural-language questions about a
//! video file and keeps a per-session history of the conversation.
//!
//! # Overview
//!
//! Clipwise allows you to:
//! - Transcribe the speech in a video and write an SRT subtitle file
//! - List the objects shown in a video and spot on-screen charts
//! - Summarize a session into a PDF or a PowerPoint deck
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `session` - Append-only session history (SQLite or in-memory)
//! - `intent` - Keyword-based query classification
//! - `preflight` - Video path and external tool checks
//! - `media` - ffmpeg plumbing for audio and frames
//! - `transcription` - Speech-to-text transcription
//! - `vision` - Object detection
//! - `report` - PDF and PowerPoint rendering
//! - `orchestrator` - Query dispatch, reports and history
//!
//! # Example
//!
//! ```rust,no_run
//! use clipwise::config::Settings;
//! use clipwise::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let reply = orchestrator
//!         .process_query("demo", "Transcribe the video", "/videos/talk.mp4")
//!         .await?;
//!     println!("{}", reply.answer);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod intent;
pub mod media;
pub mod openai;
pub mod orchestrator;
pub mod preflight;
pub mod report;
pub mod session;
pub mod transcription;
pub mod vision;

pub use error::{ClipwiseError, Result};
