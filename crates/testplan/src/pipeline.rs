//! Test-plan pipeline - orchestrates download, organize, upload and notify.

use futures::stream::{self, StreamExt};
use notify::{Notifier, NotifyEvent};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use crate::config::{Config, PipelineConfig};
use crate::error::{Error, Result};
use crate::filter::{is_hu_filename, stem_of};
use crate::jira::{project_key, Attachment, JiraClient};
use crate::organizer::{Organizer, PlanDetails};
use crate::xray::XrayClient;

/// Subtask created on the parent issue for each workflow phase.
pub const SUBTASK_TITLES: [&str; 3] = [
    "Estrategia de Pruebas",
    "Analisis y diseño de pruebas",
    "Ejecucion de pruebas",
];

/// Subtask that receives the generated test plan.
pub const STRATEGY_SUBTASK: &str = SUBTASK_TITLES[0];

/// A test plan produced and uploaded for one HU.
#[derive(Debug, Clone)]
pub struct GeneratedPlan {
    /// HU file the plan was generated from.
    pub source: String,
    /// Local path of the test plan.
    pub path: PathBuf,
    /// Issue the plan was attached to (strategy subtask or parent).
    pub uploaded_to: String,
    /// Keys of the phase subtasks that were created.
    pub subtasks: Vec<String>,
    /// Xray Test Plan key, when Xray is configured and succeeded.
    pub xray_key: Option<String>,
    /// Non-fatal problems hit while processing this HU.
    pub warnings: Vec<String>,
}

impl GeneratedPlan {
    /// File name of the generated test plan.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Result of a single pipeline run.
#[derive(Debug, Default)]
pub struct PipelineReport {
    /// Parent issue processed.
    pub issue_key: String,
    /// Number of attachments on the issue.
    pub attachments_found: usize,
    /// Number of HU attachments downloaded.
    pub downloaded: usize,
    /// Number of attachments skipped (not HU).
    pub skipped: usize,
    /// Test plans generated and uploaded.
    pub generated: Vec<GeneratedPlan>,
    /// Files listed in the summary: generated plans plus HU attachments.
    pub report_files: Vec<String>,
    /// Whether at least one notification channel delivered the summary.
    pub notified: bool,
    /// Errors encountered.
    pub errors: Vec<String>,
}

/// Test-plan pipeline orchestrator.
pub struct Pipeline {
    config: PipelineConfig,
    jira: JiraClient,
    xray: Option<XrayClient>,
    organizer: Organizer,
    notifier: Notifier,
}

impl Pipeline {
    /// Create a new pipeline.
    pub fn new(
        config: PipelineConfig,
        jira: JiraClient,
        xray: Option<XrayClient>,
        notifier: Notifier,
    ) -> Result<Self> {
        let organizer = Organizer::new(config.excerpt_chars)?;
        Ok(Self {
            config,
            jira,
            xray,
            organizer,
            notifier,
        })
    }

    /// Build every component from a loaded [`Config`].
    pub fn from_config(config: Config, notifier: Notifier) -> Result<Self> {
        let jira = JiraClient::new(&config.jira)?;
        let xray = config.xray.map(XrayClient::new).transpose()?;
        Self::new(config.pipeline, jira, xray, notifier)
    }

    fn concurrency(&self) -> usize {
        self.config.concurrency.max(1)
    }

    /// Run the pipeline once for the configured issue.
    #[instrument(skip(self), fields(issue_key = %self.config.issue_key))]
    pub async fn run(&self) -> Result<PipelineReport> {
        let issue_key = self.config.issue_key.as_str();
        let mut report = PipelineReport {
            issue_key: issue_key.to_string(),
            ..Default::default()
        };

        info!("Fetching attachments");
        let attachments = self.jira.fetch_attachments(issue_key).await?;
        report.attachments_found = attachments.len();

        if attachments.is_empty() {
            info!("No attachments found, nothing to download");
            return Ok(report);
        }

        // Phase 1: download HU attachments
        let (hu_attachments, others): (Vec<&Attachment>, Vec<&Attachment>) = attachments
            .iter()
            .partition(|a| is_hu_filename(&a.filename));
        for attachment in &others {
            info!(filename = %attachment.filename, "Skipping attachment without HU marker");
        }
        report.skipped = others.len();

        let hu_attachments = unique_by_file_name(hu_attachments, &mut report.errors);

        info!(
            count = hu_attachments.len(),
            target_dir = %self.config.target_dir.display(),
            "Downloading HU attachments"
        );
        let downloads: Vec<(&Attachment, Result<PathBuf>)> = stream::iter(hu_attachments.iter().copied())
            .map(|attachment| async move {
                let result = self
                    .jira
                    .download_attachment(attachment, &self.config.target_dir)
                    .await;
                (attachment, result)
            })
            .buffered(self.concurrency())
            .collect()
            .await;

        for (attachment, result) in downloads {
            match result {
                Ok(_) => report.downloaded += 1,
                Err(e) => {
                    warn!(filename = %attachment.filename, error = %e, "Download failed");
                    report
                        .errors
                        .push(format!("{}: download failed: {e}", attachment.filename));
                }
            }
        }
        info!(downloaded = report.downloaded, "Download phase complete");

        if report.downloaded == 0 {
            info!("Nothing downloaded, nothing to process");
            return Ok(report);
        }

        // Phase 2: folders, test plans and subtasks
        let files = hu_files_in(&self.config.target_dir)?;
        info!(count = files.len(), "Creating folder structures and test plans");

        let results: Vec<(PathBuf, Result<GeneratedPlan>)> = stream::iter(files)
            .map(|path| async move {
                let result = self.process_file(&path).await;
                (path, result)
            })
            .buffered(self.concurrency())
            .collect()
            .await;

        for (path, result) in results {
            match result {
                Ok(plan) => {
                    report.errors.extend(plan.warnings.iter().cloned());
                    report.generated.push(plan);
                }
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "Processing failed");
                    report
                        .errors
                        .push(format!("{}: processing failed: {e}", path.display()));
                }
            }
        }

        // Phase 3: summary
        report.report_files = summary_files(&report.generated, &hu_attachments);

        if report.generated.is_empty() {
            info!("No test plans generated, skipping notification");
        } else if !self.config.send_email {
            info!("Notification disabled for this run");
        } else {
            report.notified = self.notify(&report).await;
        }

        info!(
            attachments = report.attachments_found,
            downloaded = report.downloaded,
            skipped = report.skipped,
            generated = report.generated.len(),
            notified = report.notified,
            errors = report.errors.len(),
            "Pipeline run complete"
        );

        Ok(report)
    }

    /// Subtasks, test plan and upload for one downloaded HU file.
    #[instrument(skip(self, path), fields(file = %path.display()))]
    async fn process_file(&self, path: &Path) -> Result<GeneratedPlan> {
        let issue_key = self.config.issue_key.as_str();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = stem_of(&filename);
        let mut warnings = Vec::new();

        info!(hu = %stem, "Processing HU");

        let mut subtasks = Vec::new();
        let mut strategy_key = None;
        for title in SUBTASK_TITLES {
            match self.jira.create_subtask(issue_key, title).await {
                Ok(created) => {
                    if title == STRATEGY_SUBTASK {
                        strategy_key = Some(created.key.clone());
                    }
                    subtasks.push(created.key);
                }
                Err(e) => {
                    warn!(title, error = %e, "Failed to create subtask");
                    warnings.push(format!("{filename}: subtask '{title}' not created: {e}"));
                }
            }
        }

        let hu_path = path.to_path_buf();
        let hu_text = tokio::task::spawn_blocking(move || docread::process_document(&hu_path))
            .await
            .unwrap_or_default();

        let xray_key = match &self.xray {
            Some(xray) => match xray
                .create_test_plan(project_key(issue_key), &format!("Test Plan - {stem}"))
                .await
            {
                Ok(plan) => {
                    for warning in &plan.warnings {
                        warn!(warning = %warning, "Xray warning");
                    }
                    Some(plan.key)
                }
                Err(e) => {
                    warn!(error = %e, "Xray test plan not created, continuing with local plan");
                    warnings.push(format!("{filename}: Xray test plan not created: {e}"));
                    None
                }
            },
            None => None,
        };

        let details = PlanDetails {
            hu_text: Some(hu_text).filter(|t| !t.is_empty()),
            xray_key: xray_key.clone(),
            generated_at: None,
        };
        let base = path.parent().unwrap_or(self.config.target_dir.as_path());
        let plan_path = self
            .organizer
            .generate_folder_structure(base, &filename, &details)?;

        let destination = strategy_key.unwrap_or_else(|| {
            warn!("Strategy subtask missing, uploading to parent issue");
            issue_key.to_string()
        });
        info!(destination = %destination, "Uploading test plan");
        self.jira.upload_attachment(&destination, &plan_path).await?;

        Ok(GeneratedPlan {
            source: filename,
            path: plan_path,
            uploaded_to: destination,
            subtasks,
            xray_key,
            warnings,
        })
    }

    async fn notify(&self, report: &PipelineReport) -> bool {
        info!("Sending summary notification");

        let event = NotifyEvent::TestPlansGenerated {
            issue_key: report.issue_key.clone(),
            files: report.report_files.clone(),
            errors: report.errors.clone(),
            timestamp: chrono::Utc::now(),
        };

        let results = self.notifier.notify_and_wait(event).await;
        if results.is_empty() {
            warn!("No notification channel delivered the summary");
        }
        results.iter().any(|(_, result)| result.is_ok())
    }
}

/// Regular files in `dir` whose names mark them as HU, sorted by name.
pub fn hu_files_in(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let path = entry.path();
        let is_hu = path
            .file_name()
            .is_some_and(|name| is_hu_filename(&name.to_string_lossy()));
        if is_hu && path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Keep the first attachment for each saved file name. Later ones would
/// overwrite it in the target directory.
fn unique_by_file_name<'a>(
    attachments: Vec<&'a Attachment>,
    errors: &mut Vec<String>,
) -> Vec<&'a Attachment> {
    let mut seen = HashSet::new();
    attachments
        .into_iter()
        .filter(|attachment| {
            let name = Path::new(&attachment.filename)
                .file_name()
                .map(|n| n.to_os_string());
            if seen.insert(name) {
                return true;
            }
            warn!(
                filename = %attachment.filename,
                id = %attachment.id,
                "Duplicate attachment name, keeping the first one"
            );
            errors.push(format!(
                "{}: duplicate attachment name (id {}), not downloaded",
                attachment.filename, attachment.id
            ));
            false
        })
        .collect()
}

/// Generated plan names followed by HU attachment names, without duplicates.
fn summary_files(generated: &[GeneratedPlan], hu_attachments: &[&Attachment]) -> Vec<String> {
    let mut files: Vec<String> = Vec::new();
    let names = generated
        .iter()
        .map(GeneratedPlan::file_name)
        .chain(hu_attachments.iter().map(|a| a.filename.clone()));

    for name in names {
        if !files.contains(&name) {
            files.push(name);
        }
    }
    files
}
