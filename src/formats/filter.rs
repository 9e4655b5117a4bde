use super::{EnrichedFormat, MediaType};

/// Minimum pixel height counted as high resolution
pub const HIGH_RES_MIN_HEIGHT: i64 = 720;

/// Category filter offered by the format browser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterTag {
    #[default]
    All,
    Video,
    Audio,
    HighRes,
}

/// Radio controls of the format browser, keyed by position
pub const FILTER_OPTIONS: [(&str, FilterTag); 4] = [
    ("All Formats", FilterTag::All),
    ("Video Only", FilterTag::Video),
    ("Audio Only", FilterTag::Audio),
    ("High Resolution", FilterTag::HighRes),
];

impl FilterTag {
    /// Tag bound to the radio control at `index`
    pub fn from_control(index: usize) -> Option<Self> {
        FILTER_OPTIONS.get(index).map(|(_, tag)| *tag)
    }

    /// Position of this tag's radio control
    pub fn control_index(&self) -> usize {
        FILTER_OPTIONS
            .iter()
            .position(|(_, tag)| tag == self)
            .unwrap_or(0)
    }

    pub fn matches(&self, format: &EnrichedFormat) -> bool {
        match self {
            FilterTag::All => true,
            FilterTag::Video => format.media_type.label().starts_with("Video"),
            FilterTag::Audio => format.media_type == MediaType::AudioOnly,
            FilterTag::HighRes => format
                .raw
                .height_pixels()
                .is_some_and(|h| h >= HIGH_RES_MIN_HEIGHT),
        }
    }
}

/// Case-insensitive match of `query` against any displayed column
pub fn matches_query(format: &EnrichedFormat, query: &str) -> bool {
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return true;
    }
    format
        .display_columns()
        .iter()
        .any(|cell| cell.to_lowercase().contains(&needle))
}

/// Combined visibility rule of the format browser.
///
/// A row is shown when it passes both the category and the text query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatFilter {
    pub tag: FilterTag,
    pub query: String,
}

impl FormatFilter {
    pub fn is_visible(&self, format: &EnrichedFormat) -> bool {
        self.tag.matches(format) && matches_query(format, &self.query)
    }

    /// Indices into `formats` of the rows that stay visible
    pub fn visible_rows(&self, formats: &[EnrichedFormat]) -> Vec<usize> {
        formats
            .iter()
            .enumerate()
            .filter(|(_, format)| self.is_visible(format))
            .map(|(index, _)| index)
            .collect()
    }
}
