use anyhow::{Context, Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};

use crate::app_config::Config;
use crate::file_utils::{FileManager, OutputTemplate};
use crate::subtitle_processor::SubtitleCollection;
use crate::ttml;

// @module: Application controller for TTML conversion

/// What happened to one input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// SRT written to this path
    Written(PathBuf),
    /// SRT printed to stdout only
    Printed,
    /// Output exists and overwriting is disabled
    Skipped(PathBuf),
    /// The document has no visible subtitles; nothing was written
    Empty,
}

/// Counters for a batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub converted: usize,
    pub skipped: usize,
    pub empty: usize,
    pub failed: usize,
}

/// Main application controller for subtitle conversion
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Parsed output filename template
    template: OutputTemplate,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        let template = config.output_template()?;
        Ok(Self { config, template })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Convert one TTML file into cues without writing anything
    pub fn convert_file(&self, input: &Path) -> Result<SubtitleCollection> {
        let xml = FileManager::read_to_string(input)?;
        let mut collection = ttml::convert_document(&xml)
            .with_context(|| format!("Failed to convert {}", input.display()))?;
        collection.source_file = Some(input.to_path_buf());
        Ok(collection)
    }

    /// Convert a single file.
    ///
    /// The SRT goes to `output` when given; otherwise to the templated path unless
    /// the configuration only prints to stdout.
    pub fn run(&self, input: &Path, output: Option<&Path>) -> Result<ConversionOutcome> {
        if !FileManager::file_exists(input) {
            return Err(anyhow!("Input file does not exist: {:?}", input));
        }

        let output = match output {
            Some(path) => Some(path.to_path_buf()),
            None if self.config.output.std_out => None,
            None => Some(self.template.render(input)?),
        };

        self.process_file(input, output.as_deref())
    }

    /// Convert every regular file matching `pattern`. A failing input is logged and
    /// counted; the remaining inputs are still converted.
    pub fn run_glob(&self, pattern: &str) -> Result<BatchSummary> {
        let start_time = std::time::Instant::now();
        let inputs = FileManager::expand_glob(pattern)?;

        let mut summary = BatchSummary {
            total: inputs.len(),
            ..BatchSummary::default()
        };

        if inputs.is_empty() {
            warn!("No files match pattern: {}", pattern);
            return Ok(summary);
        }

        let progress_bar = ProgressBar::new(inputs.len() as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));

        for input in &inputs {
            let file_name = input
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            progress_bar.set_message(format!("Rendering: {}", file_name));

            let result = self
                .template
                .render(input)
                .and_then(|output| {
                    progress_bar.suspend(|| info!("Rendering {} --> {}", input.display(), output.display()));
                    self.process_file(input, Some(&output))
                });

            match result {
                Ok(ConversionOutcome::Written(_)) | Ok(ConversionOutcome::Printed) => summary.converted += 1,
                Ok(ConversionOutcome::Skipped(_)) => summary.skipped += 1,
                Ok(ConversionOutcome::Empty) => summary.empty += 1,
                Err(e) => {
                    progress_bar.suspend(|| error!("Error processing file {}: {:#}", input.display(), e));
                    summary.failed += 1;
                }
            }

            progress_bar.inc(1);
        }

        progress_bar.finish_with_message("Batch complete");

        info!(
            "Batch completed in {}: {} converted, {} skipped, {} empty, {} errors",
            Self::format_duration(start_time.elapsed()),
            summary.converted,
            summary.skipped,
            summary.empty,
            summary.failed
        );

        Ok(summary)
    }

    fn process_file(&self, input: &Path, output: Option<&Path>) -> Result<ConversionOutcome> {
        if let Some(path) = output {
            if path.exists() && !self.config.output.force_overwrite {
                warn!("Skipping {}, output already exists: {}", input.display(), path.display());
                return Ok(ConversionOutcome::Skipped(path.to_path_buf()));
            }
        }

        let collection = self.convert_file(input)?;
        if collection.is_empty() {
            warn!("No subtitles found in {}; nothing written", input.display());
            return Ok(ConversionOutcome::Empty);
        }
        debug!("{}: {} cues", input.display(), collection.entries.len());

        if self.config.output.std_out {
            print!("{}", collection.to_srt_string());
        }

        match output {
            Some(path) => {
                collection.write_to_srt(path)?;
                Ok(ConversionOutcome::Written(path.to_path_buf()))
            }
            None => Ok(ConversionOutcome::Printed),
        }
    }

    /// Format a duration as a short human readable string
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let minutes = total_seconds / 60;
        let seconds = total_seconds % 60;

        if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
