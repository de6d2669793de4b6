use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Local;
use tokio::fs;
use tracing::debug;

use shared_config::AppConfig;

/// Delivery seam for everything that sends a message. The production
/// implementation drops files into `outbox/`; tests substitute a recording
/// fake.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver a pre-rendered message, returning where it landed.
    async fn deliver(
        &self,
        to_email: &str,
        subject_and_body: &str,
        attachments: &[PathBuf],
    ) -> Result<PathBuf>;
}

/// Simulated email delivery: rendered messages become text files in the
/// outbox directory, with any attachments listed at the bottom.
pub struct OutboxMailer {
    outbox_dir: PathBuf,
    templates_dir: PathBuf,
    intake_form: PathBuf,
}

impl OutboxMailer {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            outbox_dir: config.outbox_dir.clone(),
            templates_dir: config.templates_dir.clone(),
            intake_form: config.intake_form_path(),
        }
    }

    /// Render a template from `templates/` by `{placeholder}` substitution.
    pub async fn render_template(
        &self,
        template_name: &str,
        context: &HashMap<String, String>,
    ) -> Result<String> {
        let path = self.templates_dir.join(template_name);
        let content = fs::read_to_string(&path)
            .await
            .with_context(|| format!("reading template {}", path.display()))?;
        Ok(render(&content, context))
    }

    /// Render and deliver a templated email, optionally attaching the intake
    /// form when it exists on disk.
    pub async fn send_template(
        &self,
        to_email: &str,
        template_name: &str,
        context: &HashMap<String, String>,
        attach_form: bool,
    ) -> Result<PathBuf> {
        let body = self.render_template(template_name, context).await?;
        let mut attachments = Vec::new();
        if attach_form && self.intake_form.exists() {
            attachments.push(self.intake_form.clone());
        }
        self.deliver(to_email, &body, &attachments).await
    }
}

#[async_trait]
impl Mailer for OutboxMailer {
    async fn deliver(
        &self,
        to_email: &str,
        subject_and_body: &str,
        attachments: &[PathBuf],
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.outbox_dir).await?;

        let ts = Local::now().format("%Y%m%d_%H%M%S");
        let stem = format!("{}_{}", ts, to_email.replace('@', "_at_"));
        let path = unique_outbox_path(&self.outbox_dir, &stem);

        let mut content = subject_and_body.to_string();
        if !attachments.is_empty() {
            content.push_str("\n\nAttachments:\n");
            for attachment in attachments {
                content.push_str(&format!("- {}\n", attachment.display()));
            }
        }

        fs::write(&path, content).await?;
        debug!("Outbox message written to {}", path.display());
        Ok(path)
    }
}

fn render(template: &str, context: &HashMap<String, String>) -> String {
    let mut out = template.to_string();
    for (key, value) in context {
        out = out.replace(&format!("{{{}}}", key), value);
    }
    out
}

// Several messages can be sent within the same second; suffix a counter so
// none of them overwrites another.
fn unique_outbox_path(dir: &Path, stem: &str) -> PathBuf {
    let mut path = dir.join(format!("{}.txt", stem));
    let mut n = 1;
    while path.exists() {
        path = dir.join(format!("{}_{}.txt", stem, n));
        n += 1;
    }
    path
}
