use letra_core::scoring::prefer;
use letra_core::{
    score_lyric, validate_all, CompositeScorer, GenreCatalog, GenreConfig, Lyric,
    ScoreComponentKind, Scorer, ScoringWeights, EMERGENCY_LYRIC, MAX_SCORE,
};

fn score_with(weights: ScoringWeights, text: &str) -> f64 {
    let lyric = Lyric::parse(text);
    let genre = GenreConfig::default();
    let reports = validate_all(&lyric, &genre);
    CompositeScorer::new(weights).score(&lyric, &genre, &reports).total
}

// ---- Bounds ----

#[test]
fn empty_lyric_scores_zero() {
    for text in ["", "\n\n", "[Refrão]\n(2x)"] {
        assert_eq!(score_lyric(&Lyric::parse(text), &GenreConfig::default()).total, 0.0);
    }
}

#[test]
fn scores_stay_within_scale() {
    let texts = [
        EMERGENCY_LYRIC,
        "o sol o sol o sol",
        "Meu coraç\nSaudad de",
        "Eu caminhei sozinho pela estrada escura da cidade grande até o fim do mundo",
    ];
    for genre in GenreCatalog::builtin().iter() {
        for text in texts {
            let total = score_lyric(&Lyric::parse(text), genre).total;
            assert!((0.0..=MAX_SCORE).contains(&total), "{}: {total}", genre.name);
        }
    }
}

#[test]
fn breakdown_has_every_component_once() {
    let breakdown = score_lyric(&Lyric::parse(EMERGENCY_LYRIC), &GenreConfig::default());
    for kind in [
        ScoreComponentKind::SyllableFit,
        ScoreComponentKind::IdealProximity,
        ScoreComponentKind::Repetition,
        ScoreComponentKind::Shape,
        ScoreComponentKind::Completeness,
        ScoreComponentKind::Catchiness,
    ] {
        let component = breakdown.component(kind).expect("component present");
        assert!((0.0..=1.0).contains(&component.ratio));
    }
    assert_eq!(breakdown.components.len(), 6);
}

// ---- Weights ----

#[test]
fn scaling_every_weight_keeps_the_total() {
    let base = ScoringWeights::default();
    let doubled = ScoringWeights {
        syllable_fit: base.syllable_fit * 2.0,
        ideal_proximity: base.ideal_proximity * 2.0,
        repetition: base.repetition * 2.0,
        shape: base.shape * 2.0,
        completeness: base.completeness * 2.0,
        catchiness: base.catchiness * 2.0,
        integrity_factor: base.integrity_factor,
    };
    let a = score_with(base, EMERGENCY_LYRIC);
    let b = score_with(doubled, EMERGENCY_LYRIC);
    assert!((a - b).abs() < 0.011, "{a} vs {b}");
}

#[test]
fn negative_weight_is_rejected() {
    let weights = ScoringWeights {
        shape: -1.0,
        ..ScoringWeights::default()
    };
    assert!(weights.validate().is_err());
}

#[test]
fn truncation_multiplies_total_down() {
    let broken = EMERGENCY_LYRIC.replace("caminho", "caminh");
    let clean = score_lyric(&Lyric::parse(EMERGENCY_LYRIC), &GenreConfig::default());
    let bad = score_lyric(&Lyric::parse(&broken), &GenreConfig::default());
    assert!(bad.integrity_penalty);
    assert!(bad.total <= clean.total * 0.1 + 0.01);
}

// ---- Ordering ----

#[test]
fn ties_keep_the_first() {
    assert!(!prefer(80.0, 80.0));
    assert!(prefer(80.5, 80.0));
}

#[test]
fn lyric_without_headers_is_not_penalized_for_shape() {
    let text = "A estrada abre o caminho\nO vento canta devagar\nEu sigo firme o meu destino";
    let breakdown = score_lyric(&Lyric::parse(text), &GenreConfig::default());
    let shape = breakdown
        .component(ScoreComponentKind::Shape)
        .expect("shape component");
    assert_eq!(shape.ratio, 1.0);
    assert_eq!(shape.points, shape.weight);
}
