//! HU test-plan pipeline for Jira.
//!
//! This crate provides:
//! - Jira REST access (attachments, subtasks, uploads)
//! - Optional Xray cloud test-plan creation
//! - Local folder trees with a generated test plan per HU
//! - The end-to-end pipeline that ties them to the email summary

pub mod config;
pub mod error;
pub mod filter;
pub mod jira;
pub mod organizer;
pub mod pipeline;
pub mod xray;

// Re-export main types
pub use config::{Config, JiraConfig, PipelineConfig, XrayConfig};
pub use error::{Error, Result};
pub use filter::is_hu_filename;
pub use jira::{Attachment, CreatedIssue, JiraClient};
pub use organizer::{Organizer, PlanDetails};
pub use pipeline::{GeneratedPlan, Pipeline, PipelineReport};
pub use xray::{XrayClient, XrayTestPlan};
