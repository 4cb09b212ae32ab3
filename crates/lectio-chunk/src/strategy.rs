//! Chunking strategy family — one variant per content form.

use serde::{Deserialize, Serialize};

use crate::engine::PassageBuilder;
use crate::params::ChunkParams;
use crate::passage::Passage;
use crate::section::{Section, SectionKind};

/// Content-form strategies. A closed set: adding a form means adding a
/// variant here and the compiler walks every dispatch site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    Prose,
    Poetry,
    Drama,
    Dialogue,
    NumberedVerses,
    NumberedSections,
    Preformatted,
}

impl Strategy {
    /// Parse CLI/config string into enum
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "prose" => Some(Self::Prose),
            "poetry" => Some(Self::Poetry),
            "drama" => Some(Self::Drama),
            "dialogue" => Some(Self::Dialogue),
            "numbered-verses" => Some(Self::NumberedVerses),
            "numbered-sections" => Some(Self::NumberedSections),
            "pre-formatted" => Some(Self::Preformatted),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Prose => "prose",
            Self::Poetry => "poetry",
            Self::Drama => "drama",
            Self::Dialogue => "dialogue",
            Self::NumberedVerses => "numbered-verses",
            Self::NumberedSections => "numbered-sections",
            Self::Preformatted => "pre-formatted",
        }
    }

    pub fn all() -> [Self; 7] {
        [
            Self::Prose,
            Self::Poetry,
            Self::Drama,
            Self::Dialogue,
            Self::NumberedVerses,
            Self::NumberedSections,
            Self::Preformatted,
        ]
    }

    /// Default length window per form. Free prose carries an overlap
    /// bridge; structured forms rely on their own boundaries.
    pub fn default_params(self) -> ChunkParams {
        match self {
            Self::Prose => ChunkParams::new(200, 900, 1500).with_overlap(50),
            Self::Poetry => ChunkParams::new(150, 600, 1000),
            Self::Drama => ChunkParams::new(200, 800, 1400),
            Self::Dialogue => ChunkParams::new(150, 700, 1200),
            Self::NumberedVerses => ChunkParams::new(100, 500, 900),
            Self::NumberedSections => ChunkParams::new(150, 700, 1200),
            Self::Preformatted => ChunkParams::new(200, 800, 1400),
        }
    }

    /// Verse and pre-formatted passages keep line breaks; everything else
    /// joins sections with spaces.
    fn separator(self) -> &'static str {
        match self {
            Self::Poetry | Self::Preformatted => "\n",
            _ => " ",
        }
    }

    /// Chunk tagged sections into bounded passages.
    ///
    /// Speeches are prefixed with `"SPEAKER: "` and kept as one unit when
    /// they fit, so speaker context is never silently interleaved away.
    /// Pre-formatted sections are never decomposed.
    pub fn chunk(self, sections: &[Section], params: &ChunkParams) -> Vec<Passage> {
        let mut builder = PassageBuilder::new(params, self.separator());
        for section in sections {
            match &section.kind {
                SectionKind::Speech { speaker } => {
                    let line = format!("{speaker}: {}", section.content.trim());
                    builder.push(&line, &section.locus, Some(speaker.as_str()));
                }
                _ if self == Self::Preformatted => {
                    builder.push_whole(&section.content, &section.locus);
                }
                _ => builder.push(&section.content, &section.locus, None),
            }
        }
        builder.finish()
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::Locus;

    #[test]
    fn from_name_valid() {
        assert_eq!(Strategy::from_name("prose"), Some(Strategy::Prose));
        assert_eq!(Strategy::from_name("poetry"), Some(Strategy::Poetry));
        assert_eq!(Strategy::from_name("drama"), Some(Strategy::Drama));
        assert_eq!(Strategy::from_name("dialogue"), Some(Strategy::Dialogue));
        assert_eq!(
            Strategy::from_name("numbered-verses"),
            Some(Strategy::NumberedVerses)
        );
        assert_eq!(
            Strategy::from_name("numbered-sections"),
            Some(Strategy::NumberedSections)
        );
        assert_eq!(
            Strategy::from_name("pre-formatted"),
            Some(Strategy::Preformatted)
        );
    }

    #[test]
    fn from_name_invalid() {
        assert_eq!(Strategy::from_name("Prose"), None);
        assert_eq!(Strategy::from_name("unknown"), None);
        assert_eq!(Strategy::from_name(""), None);
    }

    #[test]
    fn name_roundtrip() {
        for strategy in Strategy::all() {
            assert_eq!(Strategy::from_name(strategy.name()), Some(strategy));
        }
    }

    #[test]
    fn default_windows_ordered() {
        for strategy in Strategy::all() {
            let p = strategy.default_params();
            assert!(p.min > 0);
            assert!(p.min <= p.target);
            assert!(p.target <= p.max);
        }
    }

    #[test]
    fn speech_prefixed_with_speaker() {
        let sections = vec![Section::speech(
            "HAMLET",
            "To be or not to be, that is the question.",
            Locus::at_line(1),
        )];
        let params = ChunkParams::new(10, 200, 400);
        let passages = Strategy::Drama.chunk(&sections, &params);
        assert_eq!(passages.len(), 1);
        assert!(passages[0].content.starts_with("HAMLET: To be or not to be"));
        assert_eq!(passages[0].span.speaker.as_deref(), Some("HAMLET"));
    }

    #[test]
    fn short_speeches_pack_together() {
        let sections = vec![
            Section::speech("ROSENCRANTZ", "My lord, you once did love me.", Locus::at_line(1)),
            Section::speech("HAMLET", "So I do still, by these pickers and stealers.", Locus::at_line(2)),
        ];
        let params = ChunkParams::new(20, 500, 900);
        let passages = Strategy::Drama.chunk(&sections, &params);
        assert_eq!(passages.len(), 1);
        let content = &passages[0].content;
        assert!(content.contains("ROSENCRANTZ: My lord"));
        assert!(content.contains("HAMLET: So I do still"));
        // speaker metadata follows the first contributing speech
        assert_eq!(passages[0].span.speaker.as_deref(), Some("ROSENCRANTZ"));
    }

    #[test]
    fn poetry_preserves_line_breaks() {
        let sections: Vec<Section> = (1..=4)
            .map(|i| {
                Section::verse_line(
                    format!("Verse line number {i} of the canto flows onward"),
                    Locus::at_line(i),
                )
            })
            .collect();
        let params = ChunkParams::new(40, 400, 800);
        let passages = Strategy::Poetry.chunk(&sections, &params);
        assert_eq!(passages.len(), 1);
        assert_eq!(passages[0].content.lines().count(), 4);
        assert_eq!(passages[0].span.start.line, Some(1));
        assert_eq!(passages[0].span.end.line, Some(4));
    }

    #[test]
    fn preformatted_sections_kept_whole() {
        let block = "col one      col two\ncol three    col four\nwide layout  stays put";
        let sections = vec![Section {
            kind: SectionKind::Paragraph,
            content: block.to_string(),
            locus: Locus::at_section(1),
        }];
        // max far below the block length would normally force a re-split
        let params = ChunkParams::new(10, 30, 40);
        let passages = Strategy::Preformatted.chunk(&sections, &params);
        assert_eq!(passages.len(), 1);
        assert_eq!(passages[0].content, block);
    }

    #[test]
    fn numbered_sections_pack_in_order() {
        let sections: Vec<Section> = (1..=6)
            .map(|i| {
                Section::numbered(
                    format!("Maxim number {i} counsels patience in all undertakings."),
                    i,
                )
            })
            .collect();
        let params = ChunkParams::new(50, 120, 220);
        let passages = Strategy::NumberedSections.chunk(&sections, &params);
        assert!(passages.len() > 1);
        assert_eq!(passages[0].span.start.section, Some(1));
        let last = passages.last().unwrap();
        assert_eq!(last.span.end.section, Some(6));
        for (i, p) in passages.iter().enumerate() {
            assert_eq!(p.index, i);
        }
    }

    #[test]
    fn chunk_twice_identical() {
        let sections: Vec<Section> = (1..=12)
            .map(|i| {
                Section::paragraph(
                    format!("Paragraph {i} holds a steady amount of prose for the packer."),
                    Locus::at_section(i),
                )
            })
            .collect();
        let params = Strategy::Prose.default_params();
        let a = Strategy::Prose.chunk(&sections, &params);
        let b = Strategy::Prose.chunk(&sections, &params);
        assert_eq!(a, b);
    }
}
