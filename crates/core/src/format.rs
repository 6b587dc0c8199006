use chrono::NaiveDate;

use crate::{
    error::{RecapError, Result},
    types::{Chapter, SummaryResult},
};

pub const DOCUMENT_MEDIA_TYPE: &str = "text/markdown";
pub const DOCUMENT_EXTENSION: &str = "md";
pub const FILENAME_SUFFIX: &str = "_summary";

/// Timestamp the service uses when it has no real one.
pub const SENTINEL_TIMESTAMP: &str = "00:00";

const ILLEGAL_FILENAME_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryDocument {
    pub text: String,
    pub suggested_filename: String,
}

impl SummaryDocument {
    pub fn media_type(&self) -> &'static str {
        DOCUMENT_MEDIA_TYPE
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }
}

/// Whole minutes, remainder discarded.
pub fn format_duration_minutes(duration_seconds: u64) -> u64 {
    duration_seconds / 60
}

/// `Intro: "AI" <2024>?` becomes `Intro_AI_2024_summary.md`. Non-ASCII text
/// passes through untouched.
pub fn suggested_filename(title: &str) -> String {
    format!(
        "{}{}.{}",
        sanitize_title(title),
        FILENAME_SUFFIX,
        DOCUMENT_EXTENSION
    )
}

pub fn sanitize_title(title: &str) -> String {
    let stripped: String = title
        .chars()
        .filter(|c| !ILLEGAL_FILENAME_CHARS.contains(c))
        .collect();

    let mut out = String::with_capacity(stripped.len());
    let mut in_whitespace = false;
    for c in stripped.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push('_');
            }
            in_whitespace = true;
        } else {
            out.push(c);
            in_whitespace = false;
        }
    }
    out
}

fn show_timestamp(timestamp: &str) -> bool {
    !timestamp.is_empty() && timestamp != SENTINEL_TIMESTAMP
}

pub fn format_chapter_line(chapter: &Chapter) -> String {
    let prefix = if show_timestamp(&chapter.timestamp) {
        format!("**{}** - ", chapter.timestamp)
    } else {
        String::new()
    };
    format!("- {}**{}**: {}\n", prefix, chapter.title, chapter.summary)
}

/// Render a successful analysis as a markdown document.
///
/// Sections are emitted in a fixed order: title, metadata, thumbnail,
/// executive summary, key points, then chapters and terminology only when
/// they have entries. The key points heading is always present.
pub fn render_summary_document(
    result: &SummaryResult,
    source_url: &str,
    date: NaiveDate,
) -> Result<SummaryDocument> {
    let video = &result.video_info;
    let summary = &result.summary;

    if video.title.trim().is_empty() {
        return Err(RecapError::IncompleteSummary {
            field: "video_info.title",
        });
    }

    let mut output = String::new();

    output.push_str(&format!("# {}\n\n", video.title));

    output.push_str(&format!(
        "> **Channel:** {} | **Duration:** {} mins | **Date:** {}\n\n",
        video.channel,
        format_duration_minutes(video.duration_seconds),
        date.format("%Y-%m-%d")
    ));

    output.push_str(&format!(
        "[![Thumbnail]({})]({})\n\n",
        video.thumbnail_url, source_url
    ));

    output.push_str("## 📝 Executive Summary\n");
    output.push_str(&summary.full_summary);
    output.push_str("\n\n");

    output.push_str("## 🔑 Key Points\n");
    for point in &summary.key_points {
        output.push_str(&format!("- **{}**: {}\n", point.title, point.content));
    }
    output.push('\n');

    if !summary.chapters.is_empty() {
        output.push_str("## 📑 Chapters\n");
        for chapter in &summary.chapters {
            output.push_str(&format_chapter_line(chapter));
        }
        output.push('\n');
    }

    if !summary.terminology.is_empty() {
        output.push_str("## 📖 Terminology\n");
        for (term, definition) in summary.terminology.iter() {
            output.push_str(&format!("- **{}**: {}\n", term, definition));
        }
    }

    Ok(SummaryDocument {
        text: output,
        suggested_filename: suggested_filename(&video.title),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{KeyPoint, StructuredSummary, Terminology, VideoInfo};

    const URL: &str = "https://www.youtube.com/watch?v=5C_HPTJg5ek";

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    fn chapter(title: &str, timestamp: &str) -> Chapter {
        Chapter {
            title: title.to_string(),
            summary: format!("{title} summary"),
            timestamp: timestamp.to_string(),
        }
    }

    fn sample() -> SummaryResult {
        SummaryResult {
            video_info: VideoInfo {
                title: "Rust in 100 Seconds".to_string(),
                channel: "Fireship".to_string(),
                duration_seconds: 125,
                thumbnail_url: "https://i.ytimg.com/vi/5C_HPTJg5ek/hqdefault.jpg".to_string(),
            },
            summary: StructuredSummary {
                full_summary: "Rust is a memory-safe systems language.".to_string(),
                key_points: vec![
                    KeyPoint {
                        title: "Ownership".to_string(),
                        content: "Every value has one owner.".to_string(),
                    },
                    KeyPoint {
                        title: "Borrowing".to_string(),
                        content: "References never outlive data.".to_string(),
                    },
                ],
                chapters: vec![chapter("Intro", "00:00"), chapter("Memory", "03:15")],
                terminology: [("RAII", "scope-bound cleanup"), ("Cargo", "build tool")]
                    .into_iter()
                    .collect(),
            },
        }
    }

    fn render(result: &SummaryResult) -> SummaryDocument {
        render_summary_document(result, URL, date()).unwrap()
    }

    #[test]
    fn renders_full_document() {
        let doc = render(&sample());
        let expected = "# Rust in 100 Seconds\n\n\
> **Channel:** Fireship | **Duration:** 2 mins | **Date:** 2024-03-09\n\n\
[![Thumbnail](https://i.ytimg.com/vi/5C_HPTJg5ek/hqdefault.jpg)](https://www.youtube.com/watch?v=5C_HPTJg5ek)\n\n\
## 📝 Executive Summary\nRust is a memory-safe systems language.\n\n\
## 🔑 Key Points\n\
- **Ownership**: Every value has one owner.\n\
- **Borrowing**: References never outlive data.\n\n\
## 📑 Chapters\n\
- **Intro**: Intro summary\n\
- **03:15** - **Memory**: Memory summary\n\n\
## 📖 Terminology\n\
- **RAII**: scope-bound cleanup\n\
- **Cargo**: build tool\n";
        assert_eq!(doc.text, expected);
        assert_eq!(doc.suggested_filename, "Rust_in_100_Seconds_summary.md");
        assert_eq!(doc.media_type(), "text/markdown");
    }

    #[test]
    fn optional_sections_are_omitted_when_empty() {
        let mut result = sample();
        result.summary.chapters.clear();
        result.summary.terminology = Terminology::new();
        result.summary.key_points.clear();

        let text = render(&result).text;
        assert!(text.contains("## 🔑 Key Points\n\n"));
        assert!(!text.contains("Chapters"));
        assert!(!text.contains("Terminology"));
        assert!(text.ends_with("## 🔑 Key Points\n\n"));
    }

    #[test]
    fn sections_follow_fixed_order() {
        let text = render(&sample()).text;
        let positions: Vec<usize> = [
            "# Rust",
            "> **Channel:**",
            "[![Thumbnail]",
            "## 📝 Executive Summary",
            "## 🔑 Key Points",
            "## 📑 Chapters",
            "## 📖 Terminology",
        ]
        .iter()
        .map(|needle| text.find(needle).unwrap())
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn sentinel_and_empty_timestamps_are_suppressed() {
        assert_eq!(
            format_chapter_line(&chapter("Intro", "00:00")),
            "- **Intro**: Intro summary\n"
        );
        assert_eq!(
            format_chapter_line(&chapter("Intro", "")),
            "- **Intro**: Intro summary\n"
        );
        assert!(format_chapter_line(&chapter("Memory", "03:15")).starts_with("- **03:15** - "));
    }

    #[test]
    fn duration_is_floored_to_whole_minutes() {
        assert_eq!(format_duration_minutes(125), 2);
        assert_eq!(format_duration_minutes(59), 0);
        assert_eq!(format_duration_minutes(3600), 60);
    }

    #[test]
    fn filename_strips_illegal_characters() {
        assert_eq!(
            suggested_filename(r#"Intro: "AI" <2024>?"#),
            "Intro_AI_2024_summary.md"
        );
        assert_eq!(sanitize_title(r"a\b/c*d|e"), "abcde");
        assert_eq!(sanitize_title("tabs\t\tand  spaces"), "tabs_and_spaces");
    }

    #[test]
    fn filename_keeps_non_ascii_text() {
        assert_eq!(
            suggested_filename("深度学习 入门：第一课"),
            "深度学习_入门：第一课_summary.md"
        );
    }

    #[test]
    fn rendering_is_deterministic() {
        let result = sample();
        assert_eq!(render(&result), render(&result));
    }

    #[test]
    fn blank_title_is_rejected() {
        let mut result = sample();
        result.video_info.title = "  ".to_string();
        assert!(matches!(
            render_summary_document(&result, URL, date()),
            Err(RecapError::IncompleteSummary { field: "video_info.title" })
        ));
    }
}
