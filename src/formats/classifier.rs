use super::{EnrichedFormat, FormatDetails, MediaType, RawFormat, UNKNOWN_FORMAT_ID};
use tracing::debug;

/// Stream layout of a raw format, decided from codec presence alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    /// Video and audio in one container
    Mixed,
    /// Video stream without audio
    VideoOnly,
    /// Audio stream without video
    AudioOnly,
    /// Neither stream, but a usable format id
    Unknown,
}

/// Classify a raw format; `None` means the row is dropped entirely
pub fn stream_kind(format: &RawFormat) -> Option<StreamKind> {
    match (format.has_video(), format.has_audio()) {
        (true, true) => Some(StreamKind::Mixed),
        (true, false) => Some(StreamKind::VideoOnly),
        (false, true) => Some(StreamKind::AudioOnly),
        (false, false) if format.id() != UNKNOWN_FORMAT_ID => Some(StreamKind::Unknown),
        (false, false) => None,
    }
}

/// Annotate raw formats for presentation.
///
/// Output order is fixed: muxed rows, then silent video rows, then audio
/// rows, then unidentified rows, each group in input order. Row indices in
/// the format browser rely on this order.
pub fn enhance(formats: &[RawFormat]) -> Vec<EnrichedFormat> {
    let mut mixed = Vec::new();
    let mut video = Vec::new();
    let mut audio = Vec::new();
    let mut unknown = Vec::new();

    for format in formats {
        match stream_kind(format) {
            Some(StreamKind::Mixed) => mixed.push(format),
            Some(StreamKind::VideoOnly) => video.push(format),
            Some(StreamKind::AudioOnly) => audio.push(format),
            Some(StreamKind::Unknown) => unknown.push(format),
            None => debug!("Dropping format without codecs or id"),
        }
    }

    let mut enhanced = Vec::with_capacity(mixed.len() + video.len() + audio.len() + unknown.len());

    for format in mixed {
        let mut row = EnrichedFormat::new(format, MediaType::VideoAudio, "Built-in Audio");
        row.audio_extraction = Some(true);
        enhanced.push(row);
    }

    for format in video {
        let candidates = compatible_audio(format, &audio);
        let row = if candidates.is_empty() {
            let mut row = EnrichedFormat::new(format, MediaType::VideoNoAudio, "No Audio Streams");
            row.audio_merging = Some(false);
            row
        } else {
            let mut row = EnrichedFormat::new(
                format,
                MediaType::VideoAddAudio,
                format!("Merge with {} audio streams", candidates.len()),
            );
            row.potential_audio = Some(candidates);
            row.audio_merging = Some(true);
            row
        };
        enhanced.push(row);
    }

    for format in audio {
        let mut row = EnrichedFormat::new(format, MediaType::AudioOnly, "MP3/Audio Extraction");
        row.is_audio_only = Some(true);
        enhanced.push(row);
    }

    for format in unknown {
        let mut row = EnrichedFormat::new(format, MediaType::Unknown, "Unidentified Stream");
        row.format_details = Some(FormatDetails {
            ext: format.ext.clone().unwrap_or_else(|| "Unknown".to_string()),
            height: format
                .height
                .as_ref()
                .map(|h| h.to_string())
                .unwrap_or_else(|| "N/A".to_string()),
            fps: format
                .fps
                .map(|fps| fps.to_string())
                .unwrap_or_else(|| "N/A".to_string()),
        });
        enhanced.push(row);
    }

    enhanced
}

/// Audio streams that can accompany a silent video stream.
///
/// Same-extension audio is preferred; without any, every audio stream is a
/// candidate.
fn compatible_audio(video: &RawFormat, audio: &[&RawFormat]) -> Vec<RawFormat> {
    let same_ext: Vec<RawFormat> = audio
        .iter()
        .filter(|a| a.ext == video.ext)
        .map(|a| (*a).clone())
        .collect();

    if same_ext.is_empty() {
        audio.iter().map(|a| (*a).clone()).collect()
    } else {
        same_ext
    }
}
