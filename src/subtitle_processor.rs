use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

// @module: SRT cue model and cue assembly

// @const: Three or more consecutive newlines
static BLANK_LINES_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\n\n+").unwrap());

// @const: Distance of the closing boundary appended after the last rendering
const FINAL_CUE_PADDING: Duration = Duration::from_secs(24 * 60 * 60);

// @struct: Single subtitle entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    // @field: Sequence number
    pub seq_num: usize,

    // @field: Start instant
    pub start_time: Duration,

    // @field: End instant (exclusive)
    pub end_time: Duration,

    // @field: Subtitle text, may contain <font> and <i> markup
    pub text: String,
}

impl SubtitleEntry {
    pub fn new(seq_num: usize, start_time: Duration, end_time: Duration, text: String) -> Self {
        SubtitleEntry {
            seq_num,
            start_time,
            end_time,
            text,
        }
    }

    /// Convert start time to formatted SRT timestamp
    pub fn format_start_time(&self) -> String {
        Self::format_timestamp(self.start_time)
    }

    /// Convert end time to formatted SRT timestamp
    pub fn format_end_time(&self) -> String {
        Self::format_timestamp(self.end_time)
    }

    /// Format an instant as an SRT timestamp (HH:MM:SS,mmm), rounded half-up to the millisecond.
    /// Hours grow past two digits when needed.
    pub fn format_timestamp(instant: Duration) -> String {
        let ms = (instant.as_micros() + 500) / 1_000;
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Text visible from one sampled instant until the next
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFrame {
    pub instant: Duration,
    pub text: String,
}

impl RenderedFrame {
    /// Build a frame from raw rendered markup: runs of blank lines are reduced to a
    /// single blank line and surrounding whitespace is trimmed
    pub fn new(instant: Duration, rendered: &str) -> Self {
        let text = BLANK_LINES_REGEX.replace_all(rendered, "\n\n");
        RenderedFrame {
            instant,
            text: text.trim().to_string(),
        }
    }
}

/// Keep only the first frame of every run of consecutive frames with identical text
pub fn dedup_frames(frames: Vec<RenderedFrame>) -> Vec<RenderedFrame> {
    let mut kept: Vec<RenderedFrame> = Vec::with_capacity(frames.len());
    for frame in frames {
        if kept.last().is_none_or(|last| last.text != frame.text) {
            kept.push(frame);
        }
    }
    kept
}

/// Collection of subtitle entries with metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubtitleCollection {
    /// Source filename, when the cues came from a file
    pub source_file: Option<PathBuf>,

    /// List of subtitle entries
    pub entries: Vec<SubtitleEntry>,
}

impl SubtitleCollection {
    /// Create an empty subtitle collection
    pub fn new(source_file: Option<PathBuf>) -> Self {
        SubtitleCollection {
            source_file,
            entries: Vec::new(),
        }
    }

    /// Assemble cues from frames rendered at ascending instants.
    ///
    /// Each change of text starts a cue that lasts until the next change; the last
    /// change is closed 24 hours later. Blank texts produce no cue and do not use up
    /// a sequence number.
    pub fn from_frames(frames: Vec<RenderedFrame>) -> Self {
        let mut collection = Self::new(None);
        if frames.is_empty() {
            return collection;
        }

        let rendered = frames.len();
        let mut frames = dedup_frames(frames);
        debug!("{} rendered frames, {} after merging unchanged text", rendered, frames.len());

        if let Some(last) = frames.last() {
            let sentinel = last.instant.saturating_add(FINAL_CUE_PADDING);
            frames.push(RenderedFrame {
                instant: sentinel,
                text: String::new(),
            });
        }

        for pair in frames.windows(2) {
            let (current, next) = (&pair[0], &pair[1]);
            if current.text.is_empty() {
                continue;
            }
            collection.entries.push(SubtitleEntry::new(
                collection.entries.len() + 1,
                current.instant,
                next.instant,
                current.text.clone(),
            ));
        }

        collection
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize all entries as SRT text
    pub fn to_srt_string(&self) -> String {
        self.entries.iter().map(|entry| entry.to_string()).collect()
    }

    /// Write subtitles to an SRT file
    pub fn write_to_srt<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        // Create parent directory if needed
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let mut file = File::create(path)
            .with_context(|| format!("Failed to create subtitle file: {}", path.display()))?;

        for entry in &self.entries {
            write!(file, "{}", entry)
                .with_context(|| format!("Failed to write subtitle file: {}", path.display()))?;
        }

        Ok(())
    }
}
