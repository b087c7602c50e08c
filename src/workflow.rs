use indicatif::{ProgressBar, ProgressStyle};
use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{Result, SubtransError};
use crate::split::split_file;
use crate::translate::{BackendFactory, ChatBackend, FileOutcome, ScratchFiles, WindowedTranslator};

static SRT_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\.\w+)?\.srt$").expect("valid regex"));

/// `movie.en.srt` / `movie.srt` -> `movie.{language}.srt`
pub fn destination_file_name(file_name: &str, language: &str) -> String {
    let suffix = format!(".{}.srt", language);
    if SRT_SUFFIX.is_match(file_name) {
        SRT_SUFFIX.replace(file_name, NoExpand(&suffix)).into_owned()
    } else {
        format!("{}{}", file_name, suffix)
    }
}

/// Tally of a directory run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub translated: usize,
    pub skipped: usize,
    pub failed: Vec<PathBuf>,
    /// Rejected backend answers across all files
    pub rejected_attempts: usize,
}

pub struct Workflow {
    config: Config,
    backend: Arc<dyn ChatBackend>,
    show_progress: bool,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let backend = BackendFactory::create_backend(&config.translate)?;
        Ok(Self::with_backend(config, backend))
    }

    pub fn with_backend(config: Config, backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            config,
            backend,
            show_progress: true,
        }
    }

    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Translate every `.srt` under `input_root` into the mirrored tree under
    /// `output_root`, once per language. Files are processed one at a time;
    /// a file that fails is reported and the run moves on.
    pub async fn translate_directory<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_root: P,
        output_root: Q,
        languages: &[String],
    ) -> Result<BatchSummary> {
        let input_root = input_root.as_ref();
        let output_root = output_root.as_ref();
        info!("Processing directory: {}", input_root.display());

        if !input_root.is_dir() {
            return Err(SubtransError::Config(format!(
                "Input path is not a directory: {}",
                input_root.display()
            )));
        }

        let files = collect_files(input_root, |name| name.ends_with(".srt"));
        info!("Found {} subtitle files to translate", files.len());

        let mut summary = BatchSummary::default();
        let mut model_checked = false;
        for file in &files {
            let relative_dir = file
                .parent()
                .and_then(|dir| pathdiff::diff_paths(dir, input_root))
                .unwrap_or_default();

            for language in languages {
                let output = output_root
                    .join(&relative_dir)
                    .join(destination_file_name(&file_name(file), language));

                if output.exists() {
                    debug!("Output already exists, skipping: {}", output.display());
                    summary.skipped += 1;
                    continue;
                }
                // An unavailable model stops the run before the first request.
                if !model_checked {
                    self.backend.check_model(&self.config.translate.model).await?;
                    model_checked = true;
                }

                match self.translate_to(file, &output, language).await {
                    Ok(FileOutcome::Skipped) => summary.skipped += 1,
                    Ok(FileOutcome::Translated(report)) => {
                        summary.translated += 1;
                        summary.rejected_attempts += report.failures.len();
                    }
                    Err(e) => {
                        error!("Failed to translate {}: {}", file.display(), e);
                        summary.failed.push(file.clone());
                    }
                }
            }
        }

        info!(
            "Directory done: {} translated, {} skipped, {} failed",
            summary.translated,
            summary.skipped,
            summary.failed.len()
        );
        Ok(summary)
    }

    /// Translate one file; the output defaults to a sibling named for the language.
    pub async fn translate_single_file<P: AsRef<Path>>(
        &self,
        input: P,
        output: Option<PathBuf>,
        language: &str,
    ) -> Result<FileOutcome> {
        let input = input.as_ref();
        if !input.exists() {
            return Err(SubtransError::FileNotFound(input.display().to_string()));
        }

        let output = output.unwrap_or_else(|| {
            input.with_file_name(destination_file_name(&file_name(input), language))
        });

        if output.exists() {
            debug!("Output already exists, skipping: {}", output.display());
            return Ok(FileOutcome::Skipped);
        }

        self.backend.check_model(&self.config.translate.model).await?;
        self.translate_to(input, &output, language).await
    }

    async fn translate_to(&self, input: &Path, output: &Path, language: &str) -> Result<FileOutcome> {
        let mut config = self.config.translate.clone();
        config.target_language = language.to_string();

        let translator = WindowedTranslator::new(config, self.backend.clone())
            .with_scratch(ScratchFiles::from_config(&self.config.paths))
            .with_progress(self.progress_bar(&file_name(input)));

        translator.translate_file(input, output).await
    }

    /// Run the line splitter over every `.{language}.srt` under `root`.
    /// Returns the number of files that changed.
    pub async fn split_directory<P: AsRef<Path>>(&self, root: P, language: &str) -> Result<usize> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(SubtransError::Config(format!(
                "Output path is not a directory: {}",
                root.display()
            )));
        }

        let suffix = format!(".{}.srt", language);
        let files = collect_files(root, |name| name.ends_with(&suffix));
        info!("Found {} translated files to split", files.len());

        let mut changed = 0;
        for file in files {
            match split_file(&file, self.config.split.max_width).await {
                Ok(0) => {}
                Ok(_) => changed += 1,
                Err(e) => warn!("Failed to split {}: {}", file.display(), e),
            }
        }
        Ok(changed)
    }

    fn progress_bar(&self, label: &str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let style = ProgressStyle::with_template(
            "{spinner:.green} {msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
        )
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());

        // Nothing is drawn until the driver sets the length.
        ProgressBar::new(0)
            .with_style(style)
            .with_message(label.to_string())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Files under `root` whose name passes `filter`, in a stable order
fn collect_files(root: &Path, filter: impl Fn(&str) -> bool) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.file_name().to_str().is_some_and(&filter))
        .map(|entry| entry.into_path())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::{ChatMessage, ChatResponse, MockChatBackend};
    use assert_fs::prelude::*;
    use assert_fs::TempDir;

    #[test]
    fn test_destination_file_name() {
        assert_eq!(destination_file_name("movie.srt", "fr"), "movie.fr.srt");
        assert_eq!(destination_file_name("movie.en.srt", "fr"), "movie.fr.srt");
        assert_eq!(destination_file_name("S01E02.720p.en.srt", "de"), "S01E02.720p.de.srt");
        assert_eq!(destination_file_name("notes.txt", "ja"), "notes.txt.ja.srt");
    }

    #[test]
    fn test_collect_files_is_sorted_and_filtered() {
        let temp = TempDir::new().unwrap();
        temp.child("b/two.srt").write_str("").unwrap();
        temp.child("a/one.srt").write_str("").unwrap();
        temp.child("a/readme.md").write_str("").unwrap();

        let files = collect_files(temp.path(), |name| name.ends_with(".srt"));
        assert_eq!(files, vec![temp.path().join("a/one.srt"), temp.path().join("b/two.srt")]);
    }

    #[tokio::test]
    async fn test_unavailable_model_stops_before_any_file() {
        let temp = TempDir::new().unwrap();
        temp.child("in/movie.srt")
            .write_str("1\n00:00:01,000 --> 00:00:02,000\nHi\n\n")
            .unwrap();

        let mut backend = MockChatBackend::new();
        backend
            .expect_check_model()
            .returning(|model| Err(SubtransError::Backend(format!("{} missing", model))));
        backend.expect_chat().times(0);

        let workflow = Workflow::with_backend(Config::default(), Arc::new(backend)).show_progress(false);
        let result = workflow
            .translate_directory(temp.path().join("in"), temp.path().join("out"), &["fr".to_string()])
            .await;
        assert!(matches!(result, Err(SubtransError::Backend(_))));
    }

    #[tokio::test]
    async fn test_existing_single_output_skips_without_backend() {
        let temp = TempDir::new().unwrap();
        temp.child("movie.srt")
            .write_str("1\n00:00:01,000 --> 00:00:02,000\nHi\n\n")
            .unwrap();
        temp.child("movie.fr.srt").write_str("done").unwrap();

        let mut backend = MockChatBackend::new();
        backend.expect_check_model().times(0);
        backend.expect_chat().times(0);

        let workflow = Workflow::with_backend(Config::default(), Arc::new(backend)).show_progress(false);
        let outcome = workflow
            .translate_single_file(temp.path().join("movie.srt"), None, "fr")
            .await
            .unwrap();
        assert_eq!(outcome, FileOutcome::Skipped);
    }

    #[tokio::test]
    async fn test_translated_tree_skips_without_backend() {
        let temp = TempDir::new().unwrap();
        let caption = "1\n00:00:01,000 --> 00:00:02,000\nHi\n\n";
        temp.child("in/a.srt").write_str(caption).unwrap();
        temp.child("in/sub/b.en.srt").write_str(caption).unwrap();
        temp.child("out/a.fr.srt").write_str("done").unwrap();
        temp.child("out/sub/b.fr.srt").write_str("done").unwrap();

        let mut backend = MockChatBackend::new();
        backend
            .expect_check_model()
            .times(0)
            .returning(|_| Err(SubtransError::Backend("ollama down".to_string())));
        backend.expect_chat().times(0);

        let workflow = Workflow::with_backend(Config::default(), Arc::new(backend)).show_progress(false);
        let summary = workflow
            .translate_directory(temp.path().join("in"), temp.path().join("out"), &["fr".to_string()])
            .await
            .unwrap();
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.translated, 0);
        assert!(summary.failed.is_empty());
    }

    #[tokio::test]
    async fn test_model_checked_once_for_pending_files() {
        let temp = TempDir::new().unwrap();
        let caption = "1\n00:00:01,000 --> 00:00:02,000\nHi\n\n";
        temp.child("in/a.srt").write_str(caption).unwrap();
        temp.child("in/b.srt").write_str(caption).unwrap();
        temp.child("in/c.srt").write_str(caption).unwrap();
        temp.child("out/a.fr.srt").write_str("done").unwrap();

        let mut config = Config::default();
        config.paths.checkpoint = temp.path().join("tmp.srt");
        config.paths.error_log = temp.path().join("error.log");

        let mut backend = MockChatBackend::new();
        backend.expect_check_model().times(1).returning(|_| Ok(()));
        backend.expect_chat().times(2).returning(|_| {
            Ok(ChatResponse {
                message: ChatMessage {
                    role: "assistant".to_string(),
                    content: "Salut".to_string(),
                },
            })
        });

        let workflow = Workflow::with_backend(config, Arc::new(backend)).show_progress(false);
        let summary = workflow
            .translate_directory(temp.path().join("in"), temp.path().join("out"), &["fr".to_string()])
            .await
            .unwrap();
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.translated, 2);
        assert_eq!(
            std::fs::read_to_string(temp.path().join("out/c.fr.srt")).unwrap(),
            "1\n00:00:01,000 --> 00:00:02,000\nSalut\n\n"
        );
    }

    #[tokio::test]
    async fn test_split_directory_only_touches_language_files() {
        let temp = TempDir::new().unwrap();
        let long = format!("{} {}", "a".repeat(28), "b".repeat(31));
        let content = format!("1\n00:00:01,000 --> 00:00:02,000\n{}\n\n", long);
        temp.child("show/ep1.fr.srt").write_str(&content).unwrap();
        temp.child("show/ep1.de.srt").write_str(&content).unwrap();

        let workflow = Workflow::with_backend(Config::default(), Arc::new(MockChatBackend::new()));
        assert_eq!(workflow.split_directory(temp.path(), "fr").await.unwrap(), 1);

        let split = std::fs::read_to_string(temp.path().join("show/ep1.fr.srt")).unwrap();
        assert!(split.contains(&format!("{}\n{}", "a".repeat(28), "b".repeat(31))));
        let untouched = std::fs::read_to_string(temp.path().join("show/ep1.de.srt")).unwrap();
        assert_eq!(untouched, content);
    }
}
