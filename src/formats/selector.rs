use super::{EnrichedFormat, RawFormat};
use crate::error::AppError;
use tracing::info;

/// Container used when a merged download is remuxed
pub const DEFAULT_REMUX_TARGET: &str = "mp4";

/// Post-processing step requested from yt-dlp
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostProcessor {
    /// Remux the merged output into another container
    RemuxVideo { target: String },
}

/// What the download engine should fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    /// yt-dlp format selector: `"id"` or `"video+audio"`
    pub format: String,
    pub post_processor: Option<PostProcessor>,
}

impl DownloadRequest {
    /// yt-dlp arguments for this request
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec!["-f".to_string(), self.format.clone()];
        if let Some(PostProcessor::RemuxVideo { target }) = &self.post_processor {
            args.push("--remux-video".to_string());
            args.push(target.clone());
        }
        args
    }
}

/// Build the download request for a chosen row.
///
/// Rows carrying audio candidates are paired with the highest-bitrate one;
/// on ties the earliest candidate wins.
pub fn resolve_download_request(selection: &EnrichedFormat, remux_target: &str) -> DownloadRequest {
    let best_audio = selection
        .potential_audio
        .as_deref()
        .and_then(best_audio);

    match best_audio {
        Some(audio) => DownloadRequest {
            format: format!("{}+{}", selection.format_id(), audio.id()),
            post_processor: Some(PostProcessor::RemuxVideo {
                target: remux_target.to_string(),
            }),
        },
        None => DownloadRequest {
            format: selection.format_id().to_string(),
            post_processor: None,
        },
    }
}

fn best_audio(candidates: &[RawFormat]) -> Option<&RawFormat> {
    let mut best: Option<&RawFormat> = None;
    for candidate in candidates {
        match best {
            Some(current) if candidate.abr_or_zero() <= current.abr_or_zero() => {}
            _ => best = Some(candidate),
        }
    }
    best
}

/// Owner of the confirmed format choice
#[derive(Debug, Clone, Default)]
pub struct FormatSelector {
    selection: Option<EnrichedFormat>,
}

impl FormatSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the row at `row` as the current selection
    pub fn select(
        &mut self,
        formats: &[EnrichedFormat],
        row: usize,
    ) -> Result<&EnrichedFormat, AppError> {
        let chosen = formats.get(row).ok_or(AppError::RowOutOfRange {
            index: row,
            len: formats.len(),
        })?;

        info!(
            "Selected format {} ({})",
            chosen.format_id(),
            chosen.media_type
        );
        Ok(self.selection.insert(chosen.clone()))
    }

    pub fn current(&self) -> Option<&EnrichedFormat> {
        self.selection.as_ref()
    }

    /// Resolve the current selection, if any
    pub fn download_request(&self, remux_target: &str) -> Option<DownloadRequest> {
        self.selection
            .as_ref()
            .map(|selection| resolve_download_request(selection, remux_target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::enhance;
    use serde_json::json;

    fn enriched(value: serde_json::Value) -> Vec<EnrichedFormat> {
        let raw: Vec<RawFormat> = serde_json::from_value(value).unwrap();
        enhance(&raw)
    }

    #[test]
    fn test_single_stream_request() {
        let rows = enriched(json!([
            {"format_id": "18", "ext": "mp4", "vcodec": "avc1", "acodec": "mp4a"}
        ]));

        let request = resolve_download_request(&rows[0], DEFAULT_REMUX_TARGET);
        assert_eq!(request.format, "18");
        assert_eq!(request.post_processor, None);
        assert_eq!(request.to_args(), vec!["-f", "18"]);
    }

    #[test]
    fn test_merge_picks_highest_bitrate() {
        let rows = enriched(json!([
            {"format_id": "137", "ext": "mp4", "height": 1080, "vcodec": "avc1", "acodec": "none"},
            {"format_id": "140", "ext": "m4a", "acodec": "mp4a", "vcodec": "none", "abr": 128},
            {"format_id": "139", "ext": "m4a", "acodec": "mp4a", "vcodec": "none", "abr": 256}
        ]));

        let request = resolve_download_request(&rows[0], DEFAULT_REMUX_TARGET);
        assert_eq!(request.format, "137+139");
        assert_eq!(
            request.post_processor,
            Some(PostProcessor::RemuxVideo {
                target: "mp4".to_string()
            })
        );
        assert_eq!(
            request.to_args(),
            vec!["-f", "137+139", "--remux-video", "mp4"]
        );
    }

    #[test]
    fn test_equal_bitrate_keeps_first_candidate() {
        let rows = enriched(json!([
            {"format_id": "248", "ext": "webm", "vcodec": "vp9", "acodec": "none"},
            {"format_id": "250", "ext": "webm", "acodec": "opus", "vcodec": "none", "abr": 160},
            {"format_id": "251", "ext": "webm", "acodec": "opus", "vcodec": "none", "abr": 160}
        ]));

        let request = resolve_download_request(&rows[0], "mkv");
        assert_eq!(request.format, "248+250");
    }

    #[test]
    fn test_missing_bitrate_counts_as_zero() {
        let rows = enriched(json!([
            {"format_id": "137", "ext": "mp4", "vcodec": "avc1", "acodec": "none"},
            {"format_id": "a", "ext": "m4a", "acodec": "mp4a", "vcodec": "none"},
            {"format_id": "b", "ext": "m4a", "acodec": "mp4a", "vcodec": "none", "abr": 48}
        ]));

        let request = resolve_download_request(&rows[0], DEFAULT_REMUX_TARGET);
        assert_eq!(request.format, "137+b");
    }

    #[test]
    fn test_select_out_of_range_is_an_error() {
        let rows = enriched(json!([
            {"format_id": "18", "vcodec": "avc1", "acodec": "mp4a"}
        ]));
        let mut selector = FormatSelector::new();

        let err = selector.select(&rows, 3).unwrap_err();
        assert!(matches!(err, AppError::RowOutOfRange { index: 3, len: 1 }));
        assert!(selector.current().is_none());
    }

    #[test]
    fn test_select_replaces_previous_choice() {
        let rows = enriched(json!([
            {"format_id": "18", "vcodec": "avc1", "acodec": "mp4a"},
            {"format_id": "140", "acodec": "mp4a", "vcodec": "none"}
        ]));
        let mut selector = FormatSelector::new();

        assert_eq!(selector.select(&rows, 0).unwrap().format_id(), "18");
        assert_eq!(selector.select(&rows, 1).unwrap().format_id(), "140");
        assert_eq!(selector.current().unwrap().format_id(), "140");

        // a failed pick leaves the last confirmed choice in place
        assert!(selector.select(&rows, 9).is_err());
        assert_eq!(
            selector.download_request(DEFAULT_REMUX_TARGET).unwrap().format,
            "140"
        );
    }
}
