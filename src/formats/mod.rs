//! Format Module
//!
//! Data contracts for the formats reported by yt-dlp and the enriched rows
//! shown in the format browser.

pub mod classifier;
pub mod filter;
pub mod selector;

pub use classifier::enhance;
pub use filter::{FILTER_OPTIONS, FilterTag, FormatFilter};
pub use selector::{DownloadRequest, FormatSelector};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Provider convention for "this stream type is absent"
pub const NONE_CODEC: &str = "none";

/// Sentinel used when a format carries no `format_id`
pub const UNKNOWN_FORMAT_ID: &str = "unknown";

const NOT_AVAILABLE: &str = "N/A";

/// Pixel height as reported by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Height {
    Pixels(i64),
    Label(String),
    Other(Value),
}

impl Height {
    /// Integer height, if the provider gave one
    pub fn as_pixels(&self) -> Option<i64> {
        match self {
            Height::Pixels(h) => Some(*h),
            _ => None,
        }
    }
}

impl fmt::Display for Height {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Height::Pixels(h) => write!(f, "{}", h),
            Height::Label(label) => write!(f, "{}", label),
            Height::Other(value) => write!(f, "{}", value),
        }
    }
}

/// One entry of the `formats` array returned by `yt-dlp -J`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFormat {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<Height>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vcodec: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acodec: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abr: Option<f64>,
    /// Remaining provider keys, carried along untouched
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl RawFormat {
    /// True when the format carries a video stream
    pub fn has_video(&self) -> bool {
        codec_present(self.vcodec.as_deref())
    }

    /// True when the format carries an audio stream
    pub fn has_audio(&self) -> bool {
        codec_present(self.acodec.as_deref())
    }

    /// The format id, or the unknown sentinel when absent
    pub fn id(&self) -> &str {
        self.format_id.as_deref().unwrap_or(UNKNOWN_FORMAT_ID)
    }

    /// Audio bitrate used for ranking; absent counts as zero
    pub fn abr_or_zero(&self) -> f64 {
        self.abr.unwrap_or(0.0)
    }

    /// Integer pixel height, if known
    pub fn height_pixels(&self) -> Option<i64> {
        self.height.as_ref().and_then(Height::as_pixels)
    }

    pub fn display_id(&self) -> String {
        self.format_id
            .clone()
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    pub fn display_ext(&self) -> String {
        self.ext.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    /// "1080p" for integer heights, the raw label otherwise
    pub fn display_resolution(&self) -> String {
        match &self.height {
            Some(Height::Pixels(h)) => format!("{}p", h),
            Some(other) => other.to_string(),
            None => NOT_AVAILABLE.to_string(),
        }
    }

    pub fn display_fps(&self) -> String {
        self.fps
            .map(|fps| fps.to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    pub fn display_vcodec(&self) -> String {
        self.vcodec
            .clone()
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }
}

fn codec_present(codec: Option<&str>) -> bool {
    codec.unwrap_or(NONE_CODEC) != NONE_CODEC
}

/// Human-facing category of an enriched format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MediaType {
    #[serde(rename = "Video + Audio")]
    VideoAudio,
    #[serde(rename = "Video (Add Audio)")]
    VideoAddAudio,
    #[serde(rename = "Video (No Audio)")]
    VideoNoAudio,
    #[serde(rename = "Audio Only")]
    AudioOnly,
    #[serde(rename = "Unknown Format")]
    Unknown,
}

impl MediaType {
    pub fn label(&self) -> &'static str {
        match self {
            MediaType::VideoAudio => "Video + Audio",
            MediaType::VideoAddAudio => "Video (Add Audio)",
            MediaType::VideoNoAudio => "Video (No Audio)",
            MediaType::AudioOnly => "Audio Only",
            MediaType::Unknown => "Unknown Format",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Placeholder-filled details kept on unidentified rows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormatDetails {
    pub ext: String,
    pub height: String,
    pub fps: String,
}

/// A raw format annotated with its category and audio handling
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedFormat {
    #[serde(flatten)]
    pub raw: RawFormat,
    pub media_type: MediaType,
    pub audio_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_extraction: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_merging: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub potential_audio: Option<Vec<RawFormat>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_audio_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_details: Option<FormatDetails>,
}

impl EnrichedFormat {
    /// Copy of `raw` with the given category and no optional annotations
    pub fn new(raw: &RawFormat, media_type: MediaType, audio_status: impl Into<String>) -> Self {
        Self {
            raw: raw.clone(),
            media_type,
            audio_status: audio_status.into(),
            audio_extraction: None,
            audio_merging: None,
            potential_audio: None,
            is_audio_only: None,
            format_details: None,
        }
    }

    pub fn format_id(&self) -> &str {
        self.raw.id()
    }

    /// The seven table columns: Code, Extension, Resolution, FPS,
    /// Video Codec, Media Type, Audio Status
    pub fn display_columns(&self) -> [String; 7] {
        [
            self.raw.display_id(),
            self.raw.display_ext(),
            self.raw.display_resolution(),
            self.raw.display_fps(),
            self.raw.display_vcodec(),
            self.media_type.label().to_string(),
            self.audio_status.clone(),
        ]
    }

    /// One-line summary shown once a format has been chosen
    pub fn summary(&self) -> String {
        format!(
            "Code: {} | Resolution: {} | Ext: {}",
            self.raw.display_id(),
            self.raw.display_resolution(),
            self.raw.display_ext()
        )
    }

    /// Preview line for the row under the cursor in the format browser
    pub fn preview(&self) -> String {
        format!(
            "Code: {} | Resolution: {} | Extension: {} | FPS: {}",
            self.raw.display_id(),
            self.raw.display_resolution(),
            self.raw.display_ext(),
            self.raw.display_fps()
        )
    }
}
