//! Fallback extraction of sections from raw text.
//!
//! Document structure is not reliably known in advance: markup assumptions
//! fail, scans drop headings, numbering schemes drift. Extraction therefore
//! tries progressively cruder stages and accepts the first one that yields
//! enough sections; if none does, the last stage's output is used as-is.

use std::sync::LazyLock;

use regex::Regex;

use crate::filter::{is_boilerplate, is_noise};
use crate::section::{Locus, Section, SectionKind};
use crate::strategy::Strategy;

/// A stage must yield at least this many sections to be accepted.
pub const MIN_SECTION_YIELD: usize = 10;

/// Segments introduced by a leading arabic number: "1.", "23)", "4]", "7:".
static NUMBERED_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s{0,8}(\d{1,4})[.)\]:]?\s+").expect("valid marker regex"));

/// Speaker heading at the start of a line: "HAMLET." / "FIRST WITCH:".
static SPEAKER_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Z][A-Z' .-]{1,40}?)[.:]\s+(\S.*)$").expect("valid speaker regex")
});

/// One extraction stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extractor {
    /// Form-aware: verse lines for poetry, speaker-tagged speeches for
    /// drama and dialogue, numbered items for numbered forms, blank-line
    /// paragraphs for everything else.
    Structured,
    /// Segments introduced by a leading number, regardless of form.
    NumberedSegments,
    /// Blank-line separated paragraphs; the crudest cut.
    Paragraphs,
}

impl Extractor {
    pub fn extract(self, text: &str, strategy: Strategy) -> Vec<Section> {
        let text = normalize_newlines(text);
        match self {
            Self::Structured => match strategy {
                Strategy::Poetry => extract_verse_lines(&text),
                Strategy::Drama | Strategy::Dialogue => extract_speeches(&text),
                Strategy::NumberedVerses | Strategy::NumberedSections => {
                    extract_numbered(&text)
                }
                Strategy::Preformatted => extract_paragraphs(&text, false),
                Strategy::Prose => extract_paragraphs(&text, true),
            },
            Self::NumberedSegments => extract_numbered(&text),
            Self::Paragraphs => extract_paragraphs(&text, true),
        }
    }
}

/// Ordered extraction stages with an explicit acceptance threshold.
#[derive(Debug, Clone)]
pub struct Cascade {
    pub stages: Vec<Extractor>,
    pub min_yield: usize,
}

impl Cascade {
    pub fn for_strategy(_strategy: Strategy) -> Self {
        Self {
            stages: vec![
                Extractor::Structured,
                Extractor::NumberedSegments,
                Extractor::Paragraphs,
            ],
            min_yield: MIN_SECTION_YIELD,
        }
    }

    /// Run stages in order; return the first output meeting `min_yield`,
    /// else the last stage's output regardless.
    pub fn extract(&self, text: &str, strategy: Strategy) -> Vec<Section> {
        let mut last = Vec::new();
        for stage in &self.stages {
            let sections = stage.extract(text, strategy);
            if sections.len() >= self.min_yield {
                return sections;
            }
            last = sections;
        }
        last
    }
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n")
}

/// Collapse internal whitespace runs to single spaces.
fn collapse_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn extract_paragraphs(text: &str, collapse: bool) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut ordinal = 0u32;
    for block in text.split("\n\n") {
        let content = if collapse {
            collapse_ws(block)
        } else {
            block.trim_matches('\n').trim_end().to_string()
        };
        if content.trim().is_empty() || is_noise(&content) {
            continue;
        }
        ordinal += 1;
        sections.push(Section {
            kind: SectionKind::Paragraph,
            content,
            locus: Locus::at_section(ordinal),
        });
    }
    sections
}

fn extract_verse_lines(text: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        // short verse lines are legitimate; only the blocklist applies
        if line.is_empty() || is_boilerplate(line) {
            continue;
        }
        sections.push(Section::verse_line(line, Locus::at_line(i as u32 + 1)));
    }
    sections
}

fn extract_numbered(text: &str) -> Vec<Section> {
    let markers: Vec<(usize, usize, u32)> = NUMBERED_MARKER
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let number = caps.get(1)?.as_str().parse().ok()?;
            Some((whole.start(), whole.end(), number))
        })
        .collect();

    let mut sections = Vec::new();
    for (i, (_, body_start, number)) in markers.iter().enumerate() {
        let body_end = markers.get(i + 1).map_or(text.len(), |next| next.0);
        let content = collapse_ws(&text[*body_start..body_end]);
        if is_noise(&content) {
            continue;
        }
        sections.push(Section {
            kind: SectionKind::NumberedItem,
            content,
            locus: Locus::at_section(*number),
        });
    }
    sections
}

fn extract_speeches(text: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current: Option<(String, String, u32)> = None;

    let mut close = |current: &mut Option<(String, String, u32)>,
                     sections: &mut Vec<Section>| {
        if let Some((speaker, content, line)) = current.take() {
            let content = collapse_ws(&content);
            if !content.is_empty() && !is_boilerplate(&content) {
                sections.push(Section::speech(speaker, content, Locus::at_line(line)));
            }
        }
    };

    for (i, line) in text.lines().enumerate() {
        if let Some(caps) = SPEAKER_HEAD.captures(line) {
            close(&mut current, &mut sections);
            let speaker = caps[1].trim().trim_end_matches('.').to_string();
            current = Some((speaker, caps[2].to_string(), i as u32 + 1));
        } else if line.trim().is_empty() {
            close(&mut current, &mut sections);
        } else if let Some((_, content, _)) = current.as_mut() {
            content.push(' ');
            content.push_str(line.trim());
        }
        // lines outside any speech (stage directions) are dropped
    }
    close(&mut current, &mut sections);
    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_text_uses_numbered_stage() {
        let text: String = (1..=12)
            .map(|i| format!("{i}. Proverb number {i} teaches an enduring lesson about life.\n"))
            .collect();
        let cascade = Cascade::for_strategy(Strategy::NumberedSections);
        let sections = cascade.extract(&text, Strategy::NumberedSections);
        assert_eq!(sections.len(), 12);
        assert_eq!(sections[0].kind, SectionKind::NumberedItem);
        assert_eq!(sections[0].locus.section, Some(1));
        assert_eq!(sections[11].locus.section, Some(12));
        assert!(!sections[0].content.starts_with("1."));
    }

    #[test]
    fn sparse_document_falls_back_to_paragraphs() {
        // three paragraphs — under every stage's threshold, so the last
        // stage's output is used regardless
        let text = "First paragraph with a sensible amount of content in it.\n\n\
                    Second paragraph with a sensible amount of content in it.\n\n\
                    Third paragraph with a sensible amount of content in it.";
        let cascade = Cascade::for_strategy(Strategy::Prose);
        let sections = cascade.extract(text, Strategy::Prose);
        assert_eq!(sections.len(), 3);
        assert!(sections.iter().all(|s| s.kind == SectionKind::Paragraph));
    }

    #[test]
    fn verse_extraction_keeps_short_lines() {
        let text: String = (0..15).fold(String::new(), |mut acc, i| {
            acc.push_str(&format!("And line {i} sang.\n"));
            acc
        });
        let sections = Extractor::Structured.extract(&text, Strategy::Poetry);
        assert_eq!(sections.len(), 15);
        assert_eq!(sections[0].locus.line, Some(1));
    }

    #[test]
    fn speeches_capture_speaker_and_continuations() {
        let text = "HAMLET: To be or not to be, that is the question.\n\
                    Whether 'tis nobler in the mind to suffer\n\
                    the slings and arrows of outrageous fortune.\n\
                    \n\
                    OPHELIA. Good my lord, how does your honour for this many a day?\n";
        let sections = Extractor::Structured.extract(text, Strategy::Drama);
        assert_eq!(sections.len(), 2);
        match &sections[0].kind {
            SectionKind::Speech { speaker } => assert_eq!(speaker, "HAMLET"),
            other => panic!("unexpected kind: {other:?}"),
        }
        assert!(sections[0].content.contains("slings and arrows"));
        match &sections[1].kind {
            SectionKind::Speech { speaker } => assert_eq!(speaker, "OPHELIA"),
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn numbered_stage_skips_boilerplate_segments() {
        let text = "1. Page 3\n2. A genuine numbered maxim with enough substance to keep.\n";
        let sections = Extractor::NumberedSegments.extract(text, Strategy::NumberedSections);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].locus.section, Some(2));
    }

    #[test]
    fn crlf_input_normalized() {
        let text = "First paragraph with plenty of words to clear the floor.\r\n\r\n\
                    Second paragraph with plenty of words to clear the floor.";
        let sections = Extractor::Paragraphs.extract(text, Strategy::Prose);
        assert_eq!(sections.len(), 2);
    }

    #[test]
    fn paragraph_stage_collapses_internal_whitespace() {
        let text = "A paragraph\nbroken over\nseveral lines   with ragged spacing.";
        let sections = Extractor::Paragraphs.extract(text, Strategy::Prose);
        assert_eq!(sections.len(), 1);
        assert_eq!(
            sections[0].content,
            "A paragraph broken over several lines with ragged spacing."
        );
    }

    #[test]
    fn threshold_prefers_earlier_stage_when_it_yields() {
        let text: String = (1..=20)
            .map(|i| format!("Verse line number {i} carries the hymn forward in measure.\n"))
            .collect();
        let cascade = Cascade::for_strategy(Strategy::Poetry);
        let sections = cascade.extract(&text, Strategy::Poetry);
        assert_eq!(sections.len(), 20);
        assert!(sections.iter().all(|s| s.kind == SectionKind::VerseLine));
    }
}
