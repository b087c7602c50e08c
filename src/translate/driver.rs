use indicatif::ProgressBar;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info, warn};

use super::prompt::PromptBuilder;
use super::scratch::ScratchFiles;
use super::validate::validate_response;
use super::window::{Window, WindowPlanner};
use super::{ChatBackend, ChatRequest};
use crate::config::TranslateConfig;
use crate::error::{Result, SubtransError};
use crate::subtitle::{read_document, SubtitleDocument};

/// One rejected attempt, kept for the caller's failure log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptFailure {
    pub window: Window,
    /// 1-based attempt number within the window
    pub attempt: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationReport {
    /// Windows committed
    pub windows: usize,
    /// Backend calls issued, successful or not
    pub requests: usize,
    pub failures: Vec<AttemptFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Destination already existed, nothing was sent
    Skipped,
    Translated(TranslationReport),
}

/// Translates a document window by window, retrying rejected answers.
pub struct WindowedTranslator {
    config: TranslateConfig,
    backend: Arc<dyn ChatBackend>,
    prompts: PromptBuilder,
    scratch: ScratchFiles,
    progress: ProgressBar,
}

impl WindowedTranslator {
    pub fn new(config: TranslateConfig, backend: Arc<dyn ChatBackend>) -> Self {
        let prompts = PromptBuilder::new(&config.target_language, config.prompt_template.as_deref());
        Self {
            config,
            backend,
            prompts,
            scratch: ScratchFiles::disabled(),
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_scratch(mut self, scratch: ScratchFiles) -> Self {
        self.scratch = scratch;
        self
    }

    /// Bar advanced by one per committed entry
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Translate `input` into `output` unless `output` already exists.
    pub async fn translate_file(&self, input: &Path, output: &Path) -> Result<FileOutcome> {
        if output.exists() {
            debug!("Output already exists, skipping: {}", output.display());
            return Ok(FileOutcome::Skipped);
        }

        info!("Translating file to {}: {}", self.prompts.language(), input.display());
        let mut document = read_document(input).await?;
        let (translated, report) = self.translate_document(&mut document, output).await?;

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        fs::write(output, translated).await?;

        info!(
            "Translated {} entries in {} windows ({} requests, {} rejected)",
            document.len(),
            report.windows,
            report.requests,
            report.failures.len()
        );
        Ok(FileOutcome::Translated(report))
    }

    /// Replace the text of every entry in place and return the serialized output.
    ///
    /// `destination` is only recorded in the checkpoint; nothing is written there.
    pub async fn translate_document(
        &self,
        document: &mut SubtitleDocument,
        destination: &Path,
    ) -> Result<(String, TranslationReport)> {
        let planner = WindowPlanner::new(document.len(), self.config.step_size, self.config.backtrack);
        debug!("Planned {} windows over {} entries", planner.window_count(), document.len());
        // Prompts always carry source text, including backtracked context.
        let source = document.clone();
        let mut report = TranslationReport::default();
        let mut output = String::new();

        self.progress.set_length(document.len() as u64);
        self.progress.set_position(0);

        for window in planner {
            let segments = self.translate_window(&source, window, &mut report).await?;

            // Context entries were committed by an earlier window.
            let committed = window.commit_range();
            let count = committed.len();
            for (entry, text) in document.entries[committed]
                .iter_mut()
                .zip(segments.into_iter().skip(window.context_len()))
            {
                entry.text = text;
                entry.write_to(&mut output);
            }
            report.windows += 1;

            if let Err(e) = self.scratch.write_checkpoint(destination, &output).await {
                warn!("Failed to write checkpoint: {}", e);
            }
            self.progress.inc(count as u64);
        }

        self.progress.finish();
        Ok((output, report))
    }

    /// Prompt and validate one window until it is accepted or the retry budget runs out.
    async fn translate_window(
        &self,
        document: &SubtitleDocument,
        window: Window,
        report: &mut TranslationReport,
    ) -> Result<Vec<String>> {
        let prompt = self.prompts.build(&document.entries[window.range()]);
        let attempts = self.config.max_retries as usize + 1;

        for attempt in 1..=attempts {
            debug!("Window {}..{} attempt {}/{}", window.start, window.end, attempt, attempts);
            report.requests += 1;

            let request = ChatRequest::user(&self.config.model, prompt.as_str());
            let (error, response) = match self.backend.chat(request).await {
                Ok(response) => {
                    let content = response.message.content;
                    match validate_response(&content, window.len()) {
                        Ok(segments) => return Ok(segments),
                        Err(failure) => (SubtransError::from(failure), content),
                    }
                }
                Err(e) => {
                    let text = e.to_string();
                    (e, text)
                }
            };
            let reason = error.to_string();

            warn!("Window {}..{} rejected: {}, retrying...", window.start, window.end, reason);
            if let Err(e) = self.scratch.write_error(&prompt, &response).await {
                warn!("Failed to write error log: {}", e);
            }
            report.failures.push(AttemptFailure {
                window,
                attempt,
                reason,
            });
        }

        Err(SubtransError::RetriesExhausted {
            start: window.start,
            end: window.end,
            attempts,
        })
    }
}
