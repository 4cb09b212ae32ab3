//! Structural sections of a source document

use serde::{Deserialize, Serialize};

/// Positional coordinates within a source's own structure.
///
/// Sources fill what they have: a psalm carries book, chapter and line; a
/// numbered maxim only `section`; free prose nothing at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl Locus {
    pub fn at_section(section: u32) -> Self {
        Self {
            section: Some(section),
            ..Self::default()
        }
    }

    pub fn at_line(line: u32) -> Self {
        Self {
            line: Some(line),
            ..Self::default()
        }
    }
}

/// Content form of one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Paragraph,
    VerseLine,
    Speech { speaker: String },
    NumberedItem,
}

/// One structural unit of source text, tagged with its form and position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub kind: SectionKind,
    pub content: String,
    #[serde(default)]
    pub locus: Locus,
}

impl Section {
    pub fn paragraph(content: impl Into<String>, locus: Locus) -> Self {
        Self {
            kind: SectionKind::Paragraph,
            content: content.into(),
            locus,
        }
    }

    pub fn verse_line(content: impl Into<String>, locus: Locus) -> Self {
        Self {
            kind: SectionKind::VerseLine,
            content: content.into(),
            locus,
        }
    }

    pub fn speech(speaker: impl Into<String>, content: impl Into<String>, locus: Locus) -> Self {
        Self {
            kind: SectionKind::Speech {
                speaker: speaker.into(),
            },
            content: content.into(),
            locus,
        }
    }

    pub fn numbered(content: impl Into<String>, number: u32) -> Self {
        Self {
            kind: SectionKind::NumberedItem,
            content: content.into(),
            locus: Locus::at_section(number),
        }
    }
}

/// Closed positional interval covered by one emitted passage: start from
/// the first contributing section, end from the last.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Span {
    #[serde(default)]
    pub start: Locus,
    #[serde(default)]
    pub end: Locus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
}
