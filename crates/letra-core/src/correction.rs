//! Deterministic correction pipeline.
//!
//! A fixed, ordered list of fixers moves a raw generator output toward
//! compliance before it is validated:
//!
//! 1. strip quote artifacts, markdown fences and emphasis
//! 2. capitalize line starts (colloquial forms stay lower-case)
//! 3. trim over-long sections and pad short choruses
//! 4. complete truncated words that have an unambiguous suggestion
//! 5. collapse adjacent repeated phrases
//! 6. rewrite over-budget lines, then split the ones still too long
//! 7. normalize spacing and blank lines
//!
//! Every step is idempotent and only rewrites, drops or reorders whole
//! tokens. A line a step cannot improve is left as it is; whatever remains
//! wrong surfaces later as a validation failure. Running the pipeline on
//! its own output changes nothing.

use serde::{Deserialize, Serialize};

use crate::domain::{
    is_verse, CorrectionRecord, CorrectionStep, GenreConfig, Lyric, SectionKind, Severity,
};
use crate::rewrite::{reduce_line, stays_lowercase, suggest_rewrites};
use crate::syllable::count_line;
use crate::text::{has_letters, match_case, split_affixes};
use crate::validators::repetition::{collapse_repetitions, find_repetition};
use crate::validators::spacing::normalize_line;
use crate::validators::word_integrity::{suggest_completion, truncation_reason};

/// Quote characters generators wrap lines in.
const QUOTES: &[char] = &['"', '“', '”'];

/// Corrected lyric plus everything that changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionOutcome {
    pub text: String,
    pub records: Vec<CorrectionRecord>,
}

impl CorrectionOutcome {
    pub fn changed(&self) -> bool {
        !self.records.is_empty()
    }
}

type StepFn = fn(&mut Lyric, &GenreConfig) -> Vec<CorrectionRecord>;

const PIPELINE: &[(CorrectionStep, StepFn)] = &[
    (CorrectionStep::StripArtifacts, strip_artifacts),
    (CorrectionStep::Capitalize, capitalize),
    (CorrectionStep::SectionShape, enforce_shape),
    (CorrectionStep::WordIntegrity, fix_truncations),
    (CorrectionStep::Repetition, collapse_repeats),
    (CorrectionStep::SyllableRewrite, fit_syllables),
    (CorrectionStep::Spacing, normalize_spacing),
];

/// Run the full pipeline over raw text. Never fails.
pub fn correct(text: &str, genre: &GenreConfig) -> CorrectionOutcome {
    let mut lyric = Lyric::parse(text);
    let mut records = Vec::new();
    for (step, apply) in PIPELINE {
        let changes = apply(&mut lyric, genre);
        if !changes.is_empty() {
            tracing::debug!(step = ?step, changes = changes.len(), "correction step applied");
        }
        records.extend(changes);
    }
    CorrectionOutcome {
        text: lyric.to_text(),
        records,
    }
}

/// Per-line rewrite helper: replaces `lines[i]` with `f(line)` when it
/// returns something different, recording the change under `step`.
fn rewrite_lines<F>(lyric: &mut Lyric, step: CorrectionStep, verse_only: bool, mut f: F) -> Vec<CorrectionRecord>
where
    F: FnMut(&str) -> Option<String>,
{
    let mut records = Vec::new();
    for (index, line) in lyric.lines_mut().iter_mut().enumerate() {
        if verse_only && !is_verse(line.as_str()) {
            continue;
        }
        if let Some(next) = f(line.as_str()).filter(|n| n.as_str() != line.as_str()) {
            records.push(CorrectionRecord::new(step, Some(index), line.as_str(), next.as_str()));
            *line = next;
        }
    }
    records
}

// 1. artifacts

fn markdown_heading(line: &str) -> Option<String> {
    let label = line.strip_prefix('#')?.trim_start_matches('#').trim();
    (!label.is_empty()).then(|| format!("[{label}]"))
}

/// `**Refrão**` style emphasized labels, read as section headers. The whole
/// line must be wrapped in `**`, so `**Outro** dia` stays a verse.
fn emphasized_label(line: &str) -> Option<String> {
    let inner = line
        .trim()
        .trim_end_matches(':')
        .strip_prefix("**")?
        .strip_suffix("**")?;
    if inner.contains("**") {
        return None;
    }
    let label = inner.trim().trim_end_matches(':').trim();
    let is_label = is_verse(label)
        && label.split_whitespace().count() <= 3
        && SectionKind::from_header(label) != SectionKind::Other;
    is_label.then(|| format!("[{label}]"))
}

fn is_quote(c: char) -> bool {
    QUOTES.contains(&c)
}

/// Drop quotes that wrap the whole line, or an unbalanced one at an edge.
/// A quoted phrase inside the line keeps its quotes.
fn strip_edge_quotes(line: &str) -> &str {
    let mut s = line.trim();
    loop {
        let count = s.chars().filter(|&c| is_quote(c)).count();
        let opens = s.starts_with(is_quote);
        let closes = s.ends_with(is_quote);
        let next = if count == 2 && opens && closes {
            s.strip_prefix(is_quote).and_then(|t| t.strip_suffix(is_quote))
        } else if count % 2 == 1 && opens {
            s.strip_prefix(is_quote)
        } else if count % 2 == 1 && closes {
            s.strip_suffix(is_quote)
        } else {
            None
        };
        match next {
            Some(t) => s = t.trim(),
            None => return s,
        }
    }
}

/// Cleaned line, or `None` when the whole line is an artifact.
fn clean_artifacts(line: &str) -> Option<String> {
    let without_emphasis = line.replace("**", "");
    let cleaned = strip_edge_quotes(&without_emphasis);
    if cleaned.starts_with("```") {
        return None;
    }
    let converted = markdown_heading(cleaned).or_else(|| emphasized_label(line));
    Some(converted.unwrap_or_else(|| cleaned.to_string()))
}

fn strip_artifacts(lyric: &mut Lyric, _genre: &GenreConfig) -> Vec<CorrectionRecord> {
    let mut records = Vec::new();
    let mut kept = Vec::with_capacity(lyric.lines().len());
    for (index, line) in lyric.lines().iter().enumerate() {
        match clean_artifacts(line) {
            None => records.push(CorrectionRecord::new(
                CorrectionStep::StripArtifacts,
                Some(index),
                line.as_str(),
                "",
            )),
            Some(cleaned) if cleaned != line.trim() => {
                records.push(CorrectionRecord::new(
                    CorrectionStep::StripArtifacts,
                    Some(index),
                    line.as_str(),
                    cleaned.as_str(),
                ));
                kept.push(cleaned);
            }
            Some(_) => kept.push(line.clone()),
        }
    }
    *lyric.lines_mut() = kept;
    records
}

// 2. capitalization

/// Upper-case the first letter of a line unless it opens with a form that
/// stays lower-case (`pra`, `d'amor`). `None` when nothing changes.
pub fn capitalize_line(line: &str) -> Option<String> {
    let (idx, first) = line.char_indices().find(|(_, c)| c.is_alphabetic())?;
    if !first.is_lowercase() {
        return None;
    }
    let token = line[idx..].split_whitespace().next().unwrap_or_default();
    if stays_lowercase(token) {
        return None;
    }
    let upper: String = first.to_uppercase().collect();
    Some(format!(
        "{}{upper}{}",
        &line[..idx],
        &line[idx + first.len_utf8()..]
    ))
}

fn capitalize(lyric: &mut Lyric, _genre: &GenreConfig) -> Vec<CorrectionRecord> {
    rewrite_lines(lyric, CorrectionStep::Capitalize, true, capitalize_line)
}

// 3. section shape

fn enforce_shape(lyric: &mut Lyric, genre: &GenreConfig) -> Vec<CorrectionRecord> {
    let mut records = Vec::new();
    // Back to front so earlier indices stay valid.
    for section in lyric.sections().iter().rev() {
        let Some(rule) = genre.shape.rule_for(section.kind) else {
            continue;
        };
        let verses = lyric.section_verse_indices(section);
        if verses.len() > rule.max() {
            for &i in verses[rule.max()..].iter().rev() {
                let removed = lyric.lines_mut().remove(i);
                records.push(CorrectionRecord::new(CorrectionStep::SectionShape, None, removed, ""));
            }
            continue;
        }
        let too_short = rule
            .check(verses.len())
            .is_some_and(|m| m.severity == Severity::Error);
        if section.kind != SectionKind::Chorus || verses.is_empty() || !too_short {
            continue;
        }
        let (Some(target), Some(&last)) = (rule.pad_target(verses.len()), verses.last()) else {
            continue;
        };
        let copies: Vec<String> = (0..target - verses.len())
            .map(|k| lyric.lines()[verses[k % verses.len()]].clone())
            .collect();
        for (offset, copy) in copies.into_iter().enumerate() {
            let at = last + 1 + offset;
            records.push(CorrectionRecord::new(CorrectionStep::SectionShape, Some(at), "", copy.as_str()));
            lyric.lines_mut().insert(at, copy);
        }
    }
    records
}

// 4. word integrity

fn complete_fragments(line: &str) -> Option<String> {
    let normalized = normalize_line(line);
    let mut changed = false;
    let tokens: Vec<String> = normalized
        .split_whitespace()
        .map(|token| {
            let completion = truncation_reason(token)
                .and_then(|_| suggest_completion(token));
            match completion {
                Some(full) => {
                    changed = true;
                    let (leading, core, trailing) = split_affixes(token);
                    format!("{leading}{}{trailing}", match_case(core, full))
                }
                None => token.to_string(),
            }
        })
        .collect();
    changed.then(|| tokens.join(" "))
}

fn fix_truncations(lyric: &mut Lyric, _genre: &GenreConfig) -> Vec<CorrectionRecord> {
    rewrite_lines(lyric, CorrectionStep::WordIntegrity, true, complete_fragments)
}

// 5. repetition

fn collapse_repeats(lyric: &mut Lyric, _genre: &GenreConfig) -> Vec<CorrectionRecord> {
    rewrite_lines(lyric, CorrectionStep::Repetition, true, |line| {
        Some(collapse_repetitions(line))
    })
}

// 6. syllables

fn starts_with_quote(token: &str) -> bool {
    token.starts_with(QUOTES)
}

fn ends_with_quote(token: &str) -> bool {
    token.ends_with(QUOTES)
}

/// Split at the word boundary that best balances syllables between halves.
/// Both halves must stay verse lines; the right half is capitalized.
pub fn split_balanced(line: &str) -> Option<(String, String)> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let k = (1..tokens.len())
        .filter(|&k| {
            tokens[k].starts_with(char::is_alphabetic)
                && !ends_with_quote(tokens[k - 1])
                && !starts_with_quote(tokens[k])
                && tokens[..k].iter().any(|t| has_letters(t))
        })
        .filter(|&k| is_verse(&tokens[..k].join(" ")) && is_verse(&tokens[k..].join(" ")))
        .min_by_key(|&k| {
            count_line(&tokens[..k].join(" ")).abs_diff(count_line(&tokens[k..].join(" ")))
        })?;
    let left = tokens[..k].join(" ");
    let right = tokens[k..].join(" ");
    let right = capitalize_line(&right).unwrap_or(right);
    Some((left, right))
}

/// Whether adding one verse line to the section holding `index` keeps it
/// within its rule: never past `max`, never turning a valid count invalid.
fn may_split(lyric: &Lyric, index: usize, genre: &GenreConfig) -> bool {
    let Some(section) = lyric.section_of(index) else {
        return true;
    };
    let Some(rule) = genre.shape.rule_for(section.kind) else {
        return true;
    };
    let count = lyric.section_verse_indices(&section).len();
    let valid_now = rule.check(count).is_none();
    let valid_after = rule.check(count + 1).is_none();
    count < rule.max() && (valid_after || !valid_now)
}

fn fitting_rewrite(line: &str, max: usize) -> Option<String> {
    suggest_rewrites(line, max)
        .into_iter()
        .find(|s| find_repetition(s).is_none())
}

fn fit_syllables(lyric: &mut Lyric, genre: &GenreConfig) -> Vec<CorrectionRecord> {
    let max = genre.budget.max;
    let mut records = Vec::new();
    let mut i = 0;
    while i < lyric.lines().len() {
        let raw = lyric.lines()[i].clone();
        let line = normalize_line(&raw);
        if !is_verse(&raw) || count_line(&line) <= max {
            i += 1;
            continue;
        }

        if let Some(rewrite) = fitting_rewrite(&line, max) {
            records.push(CorrectionRecord::new(CorrectionStep::SyllableRewrite, Some(i), raw, rewrite.as_str()));
            lyric.lines_mut()[i] = rewrite;
            i += 1;
            continue;
        }

        let mut current = line;
        let reduced = reduce_line(&current);
        if reduced != current && find_repetition(&reduced).is_none() {
            records.push(CorrectionRecord::new(CorrectionStep::SyllableRewrite, Some(i), raw.as_str(), reduced.as_str()));
            lyric.lines_mut()[i] = reduced.clone();
            current = reduced;
            if let Some(rewrite) = fitting_rewrite(&current, max) {
                records.push(CorrectionRecord::new(CorrectionStep::SyllableRewrite, Some(i), current.as_str(), rewrite.as_str()));
                lyric.lines_mut()[i] = rewrite;
                i += 1;
                continue;
            }
            if count_line(&current) <= max {
                i += 1;
                continue;
            }
        }

        if may_split(lyric, i, genre) {
            if let Some((left, right)) = split_balanced(&current) {
                records.push(CorrectionRecord::new(
                    CorrectionStep::SplitLine,
                    Some(i),
                    current.as_str(),
                    format!("{left}\n{right}"),
                ));
                lyric.lines_mut()[i] = left;
                lyric.lines_mut().insert(i + 1, right);
                // Re-examine the left half; the right half comes next.
                continue;
            }
        }
        tracing::debug!(line = i + 1, syllables = count_line(&current), max, "line left over budget");
        i += 1;
    }
    records
}

// 7. spacing

fn normalize_spacing(lyric: &mut Lyric, _genre: &GenreConfig) -> Vec<CorrectionRecord> {
    let records: Vec<CorrectionRecord> = rewrite_lines(lyric, CorrectionStep::Spacing, false, |line| {
        Some(normalize_line(line))
    })
    .into_iter()
    .filter(|r| !r.before.trim().is_empty())
    .collect();

    let lines = std::mem::take(lyric.lines_mut());
    let before = lines.len();
    let mut kept: Vec<String> = Vec::with_capacity(before);
    for line in lines {
        if line.is_empty() && kept.last().map_or(true, |prev| prev.is_empty()) {
            continue;
        }
        kept.push(line);
    }
    while kept.last().is_some_and(|l| l.is_empty()) {
        kept.pop();
    }
    if kept.len() != before {
        tracing::debug!(removed = before - kept.len(), "collapsed blank lines");
    }
    *lyric.lines_mut() = kept;
    records
}
