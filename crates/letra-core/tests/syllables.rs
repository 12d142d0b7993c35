use letra_core::rewrite::{apply_edits, candidate_edits, suggest_rewrites, RewriteKind};
use letra_core::validators::syllable_compliance;
use letra_core::{count_line, line_breakdown, GenreConfig, Lyric, SyllableBudget};

const LINES: &[&str] = &[
    "Você está aqui para o que vier",
    "Eu estou em uma casa de amor",
    "Não é o fim para a gente",
    "Vocês estavam na estrada de um sonho",
    "Nós estamos onde estão os amigos",
    "A vida estava linda de uma vez",
    "Canta para os meninos da rua",
];

// ---- Counting ----

#[test]
fn mudei_o_corte_scans_with_elision() {
    let line = "Mudei o corte, desatei o laço,";
    assert_eq!(count_line(line), 9);

    let elided: Vec<String> = line_breakdown(line)
        .into_iter()
        .filter(|w| w.elided)
        .map(|w| w.word)
        .collect();
    assert_eq!(elided, vec!["Mudei", "desatei"]);
}

#[test]
fn mudei_o_corte_fits_a_twelve_syllable_budget() {
    let genre = GenreConfig::new("sertanejo", SyllableBudget::new(7, 10, 12));
    let report = syllable_compliance::validate(&Lyric::parse("Mudei o corte, desatei o laço,"), &genre);
    assert!(report.is_valid);
    assert!(report.violations.is_empty());
}

#[test]
fn headers_and_directives_count_zero() {
    assert_eq!(count_line("[Refrão]"), 0);
    assert_eq!(count_line("(2x)"), 0);
    assert_eq!(count_line("Vem dançar (2x)"), count_line("Vem dançar"));
}

#[test]
fn every_letter_line_counts_at_least_one() {
    for line in ["hmm", "sh", "é", "a"] {
        assert!(count_line(line) >= 1, "{line}");
    }
}

// ---- Monotonicity ----

#[test]
fn sanctioned_contractions_never_lengthen_a_line() {
    for line in LINES {
        let before = count_line(line);
        for edit in candidate_edits(line, false) {
            let after = apply_edits(line, &[&edit]);
            assert!(
                count_line(&after) <= before,
                "{:?} turned {line:?} ({before}) into {after:?} ({})",
                edit.kind,
                count_line(&after)
            );
        }
    }
}

#[test]
fn contraction_table_is_exercised() {
    let kinds: Vec<RewriteKind> = LINES
        .iter()
        .flat_map(|l| candidate_edits(l, false))
        .map(|e| e.kind)
        .collect();
    assert!(kinds.contains(&RewriteKind::Contraction));
    assert!(kinds.contains(&RewriteKind::Elision));
}

#[test]
fn suggestions_stay_within_budget_and_below_original() {
    for line in LINES {
        let original = count_line(line);
        let max = original.saturating_sub(1);
        for suggestion in suggest_rewrites(line, max) {
            assert!(count_line(&suggestion) <= max, "{suggestion}");
            assert!(count_line(&suggestion) < original);
        }
    }
}
