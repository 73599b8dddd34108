//! Test-plan CLI - turns HU attachments on a Jira issue into test plans.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use notify::{Notifier, NotifyEvent};
use testplan::config::{JiraConfig, PipelineConfig, XrayConfig};
use testplan::{JiraClient, Pipeline, PipelineReport, XrayClient};

/// Test-plan CLI - Jira HU attachments to test plans, subtasks and email.
#[derive(Parser)]
#[command(name = "testplan")]
#[command(about = "Generate test plans from the HU attachments of a Jira issue")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the pipeline once for an issue
    Run {
        /// Parent issue holding the HU attachments
        #[arg(long, env = "ISSUE_KEY")]
        issue_key: String,

        /// Working directory for downloads and generated folders
        #[arg(long, env = "TARGET_DIR")]
        target_dir: PathBuf,

        /// Skip the summary email
        #[arg(long)]
        no_email: bool,

        /// Skip Xray even when credentials are configured
        #[arg(long)]
        no_xray: bool,
    },

    /// Print the text extracted from a document
    Read {
        /// Document to read (.txt, .docx, .doc, .pdf)
        file: PathBuf,
    },

    /// Send a test email with the configured SMTP settings
    EmailTest,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "testplan=debug,docread=debug,notify=debug,info"
    } else {
        "testplan=info,docread=info,notify=info,warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Run {
            issue_key,
            target_dir,
            no_email,
            no_xray,
        } => {
            tracing::info!(
                issue_key,
                target_dir = %target_dir.display(),
                no_email,
                no_xray,
                "Starting pipeline run"
            );
            run_pipeline(issue_key, target_dir, no_email, no_xray).await
        }
        Commands::Read { file } => run_read(file).await,
        Commands::EmailTest => run_email_test().await,
    }
}

async fn run_pipeline(
    issue_key: String,
    target_dir: PathBuf,
    no_email: bool,
    no_xray: bool,
) -> Result<()> {
    let jira_config = JiraConfig::from_env().context("Jira is not configured")?;
    let mut config =
        PipelineConfig::new(issue_key, target_dir).context("Invalid pipeline settings")?;
    if no_email {
        config.send_email = false;
    }

    let xray = if no_xray {
        None
    } else {
        XrayConfig::from_env()
    };
    if xray.is_none() {
        tracing::debug!("Xray integration disabled");
    }

    let jira = JiraClient::new(&jira_config)?;
    let xray = xray.map(XrayClient::new).transpose()?;
    let notifier = if config.send_email {
        Notifier::from_env()
    } else {
        Notifier::disabled()
    };

    let pipeline = Pipeline::new(config, jira, xray, notifier)?;
    let report = pipeline
        .run()
        .await
        .context("Pipeline run failed")?;

    print_summary(&report);
    Ok(())
}

fn print_summary(report: &PipelineReport) {
    println!("\n📊 Test Plan Summary - {}", report.issue_key);
    println!("   Attachments: {}", report.attachments_found);
    println!("   Downloaded: {}", report.downloaded);
    println!("   Skipped: {}", report.skipped);
    println!("   Test plans: {}", report.generated.len());

    for plan in &report.generated {
        println!(
            "     - {} -> {} ({})",
            plan.source,
            plan.file_name(),
            plan.uploaded_to
        );
        if let Some(key) = &plan.xray_key {
            println!("       Xray: {key}");
        }
    }

    if report.notified {
        println!("   📧 Summary email sent");
    }

    if !report.errors.is_empty() {
        println!("   Errors: {}", report.errors.len());
        for err in &report.errors {
            eprintln!("     - {err}");
        }
    }
}

async fn run_read(file: PathBuf) -> Result<()> {
    let text = tokio::task::spawn_blocking(move || docread::read_document(&file))
        .await
        .context("Reader task failed")??;

    println!("{text}");
    Ok(())
}

async fn run_email_test() -> Result<()> {
    let notifier = Notifier::from_env();
    if !notifier.has_channels() {
        bail!("No email channel configured; set EMAIL_TO and the SMTP_* variables");
    }

    let results = notifier
        .notify_and_wait(NotifyEvent::ConnectionTest {
            timestamp: chrono::Utc::now(),
        })
        .await;

    let mut failed = false;
    for (channel, result) in results {
        match result {
            Ok(()) => println!("✅ {channel}: test message sent"),
            Err(e) => {
                eprintln!("❌ {channel}: {e}");
                failed = true;
            }
        }
    }

    if failed {
        bail!("Test email could not be delivered");
    }
    Ok(())
}
