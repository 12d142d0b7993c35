//! Lyric and section model.
//!
//! A [`Lyric`] owns its physical lines; sections are derived views computed
//! from header positions, so fixers can rewrite lines freely and re-derive
//! sections afterwards.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::domain::line::{classify, header_label, LineKind};
use crate::text::fold_accents;

/// Musical role of a section, inferred from its header text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Intro,
    Verse,
    PreChorus,
    Chorus,
    Bridge,
    Outro,
    Other,
}

/// Header lexicon, matched in order against the accent-folded header.
/// Pre-chorus must precede chorus since "pré-refrão" contains "refrão".
const KIND_LEXICON: &[(SectionKind, &[&str])] = &[
    (
        SectionKind::PreChorus,
        &["pre-refrao", "pre refrao", "prerefrao", "pre-chorus", "pre chorus", "prechorus"],
    ),
    (SectionKind::Chorus, &["refrao", "chorus", "coro"]),
    (SectionKind::Bridge, &["ponte", "bridge"]),
    (SectionKind::Intro, &["intro"]),
    (SectionKind::Outro, &["outro", "final", "encerramento", "coda"]),
    (SectionKind::Verse, &["verso", "verse", "estrofe", "parte"]),
];

impl SectionKind {
    /// Infer the kind from a header label (`"Refrão 2"`, `"PRE-CHORUS"`, ...).
    pub fn from_header(label: &str) -> Self {
        let folded = fold_accents(label);
        KIND_LEXICON
            .iter()
            .find(|(_, keys)| keys.iter().any(|k| folded.contains(k)))
            .map(|(kind, _)| *kind)
            .unwrap_or(SectionKind::Other)
    }

    /// Portuguese name with its article, for reason strings.
    pub fn label_pt(self) -> &'static str {
        match self {
            Self::Intro => "a intro",
            Self::Verse => "o verso",
            Self::PreChorus => "o pré-refrão",
            Self::Chorus => "o refrão",
            Self::Bridge => "a ponte",
            Self::Outro => "o final",
            Self::Other => "a seção",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Intro => "intro",
            Self::Verse => "verse",
            Self::PreChorus => "pre_chorus",
            Self::Chorus => "chorus",
            Self::Bridge => "bridge",
            Self::Outro => "outro",
            Self::Other => "other",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for SectionKind {
    type Err = crate::domain::LetraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "intro" => Ok(Self::Intro),
            "verse" => Ok(Self::Verse),
            "pre_chorus" => Ok(Self::PreChorus),
            "chorus" => Ok(Self::Chorus),
            "bridge" => Ok(Self::Bridge),
            "outro" => Ok(Self::Outro),
            "other" => Ok(Self::Other),
            other => Err(crate::domain::LetraError::UnknownSectionKind(
                other.to_string(),
            )),
        }
    }
}

/// A header-delimited view into a [`Lyric`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub kind: SectionKind,
    /// Header text without brackets.
    pub label: String,
    /// Index of the header line.
    pub header_index: usize,
    /// Lines after the header, up to (excluding) the next header.
    pub body: Range<usize>,
}

/// An ordered sequence of physical lines.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Lyric {
    lines: Vec<String>,
}

impl Lyric {
    /// Split raw text into lines (`\r\n` tolerated).
    pub fn parse(text: &str) -> Self {
        Self {
            lines: text.lines().map(|l| l.trim_end_matches('\r').to_string()).collect(),
        }
    }

    pub fn from_lines(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn lines_mut(&mut self) -> &mut Vec<String> {
        &mut self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    /// Render back to text, one physical line per `\n`.
    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }

    /// Whether the lyric has no sung content at all.
    pub fn is_empty(&self) -> bool {
        self.verse_lines().next().is_none()
    }

    /// `(index, line)` for every verse line, in order.
    pub fn verse_lines(&self) -> impl Iterator<Item = (usize, &str)> {
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, l)| classify(l) == LineKind::Verse)
            .map(|(i, l)| (i, l.as_str()))
    }

    /// Header-delimited sections. Lines before the first header belong to no
    /// section.
    pub fn sections(&self) -> Vec<Section> {
        let headers: Vec<usize> = self
            .lines
            .iter()
            .enumerate()
            .filter(|(_, l)| classify(l) == LineKind::Header)
            .map(|(i, _)| i)
            .collect();

        headers
            .iter()
            .enumerate()
            .map(|(n, &start)| {
                let end = headers.get(n + 1).copied().unwrap_or(self.lines.len());
                let label = header_label(&self.lines[start]).unwrap_or_default().to_string();
                Section {
                    kind: SectionKind::from_header(&label),
                    label,
                    header_index: start,
                    body: start + 1..end,
                }
            })
            .collect()
    }

    /// Indices of the verse lines inside `section`.
    pub fn section_verse_indices(&self, section: &Section) -> Vec<usize> {
        section
            .body
            .clone()
            .filter(|&i| classify(&self.lines[i]) == LineKind::Verse)
            .collect()
    }

    /// Section containing line `index`, if any.
    pub fn section_of(&self, index: usize) -> Option<Section> {
        self.sections()
            .into_iter()
            .find(|s| s.body.contains(&index))
    }
}

impl fmt::Display for Lyric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}
