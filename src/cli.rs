use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Translate every .srt file under a directory into a mirrored output tree
    Translate {
        /// Directory searched recursively for .srt files
        #[arg(short, long, default_value = "input")]
        input_dir: PathBuf,

        /// Root of the translated tree
        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,

        /// Target languages (comma-separated), overrides the config
        #[arg(short = 'l', long)]
        target_langs: Option<String>,

        #[command(flatten)]
        tuning: TuningArgs,
    },

    /// Translate a single subtitle file
    File {
        /// Input subtitle file
        #[arg(short, long)]
        input: PathBuf,

        /// Output file, defaults to a sibling named after the language
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Target language, overrides the config
        #[arg(short = 'l', long)]
        target_lang: Option<String>,

        #[command(flatten)]
        tuning: TuningArgs,
    },

    /// Split long single-line subtitles of translated files into two lines
    Split {
        /// Directory searched recursively for translated files
        #[arg(short, long, default_value = "output")]
        dir: PathBuf,

        /// Language suffix of the files to split, overrides the config
        #[arg(short = 'l', long)]
        target_lang: Option<String>,

        /// Maximum characters on a single line
        #[arg(long)]
        max_width: Option<usize>,
    },

    /// Write the default configuration to a file
    InitConfig {
        /// Destination of the configuration file
        #[arg(default_value = "config.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Per-run overrides of the translation settings
#[derive(clap::Args, Debug, Default)]
pub struct TuningArgs {
    /// LLM model served by ollama
    #[arg(short, long)]
    pub model: Option<String>,

    /// Ollama endpoint URL
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Entries committed per request
    #[arg(long)]
    pub step_size: Option<usize>,

    /// Already translated entries re-sent as context
    #[arg(long)]
    pub backtrack: Option<usize>,

    /// Retries per window before giving up on a file
    #[arg(long)]
    pub max_retries: Option<u32>,
}

/// Split a comma-separated language list
pub fn parse_languages(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_languages() {
        assert_eq!(parse_languages("fr, de,,ja "), vec!["fr", "de", "ja"]);
    }

    #[test]
    fn test_translate_command_parses() {
        let args = Args::parse_from([
            "subtrans", "-v", "translate", "-i", "subs", "-l", "fr,es", "--step-size", "10", "--backtrack", "2",
        ]);
        assert!(args.verbose);
        match args.command {
            Commands::Translate { input_dir, output_dir, target_langs, tuning } => {
                assert_eq!(input_dir, PathBuf::from("subs"));
                assert_eq!(output_dir, PathBuf::from("output"));
                assert_eq!(target_langs.as_deref(), Some("fr,es"));
                assert_eq!(tuning.step_size, Some(10));
                assert_eq!(tuning.backtrack, Some(2));
                assert_eq!(tuning.model, None);
            }
            _ => panic!("expected translate command"),
        }
    }
}
