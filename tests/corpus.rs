//! End-to-end corpus tests: batch aggregation and persistence over
//! synthetic record batches (no pdfium required).

use rand::rngs::StdRng;
use rand::SeedableRng;
use slidecorpus::analyze::CorpusAnalyzer;
use slidecorpus::corpus::{build_slim_corpus, CorpusWriter, SlimCorpus};
use slidecorpus::pipeline::classify::{classify, PageSignals};
use slidecorpus::record::{ColorSample, SlideRecord, SlideType};
use slidecorpus::CorpusConfig;

// ── Helpers ──────────────────────────────────────────────────────────────

fn record(source: &str, page: usize, slide_type: SlideType, title: &str, text: &str) -> SlideRecord {
    SlideRecord {
        source_file: source.into(),
        page_num: page,
        slide_type,
        title: title.into(),
        full_text: text.into(),
        text_blocks: vec![],
        colors: vec![],
        acronyms: slidecorpus::pipeline::acronyms::extract_acronyms(text)
            .into_iter()
            .collect(),
        num_text_blocks: 4,
        page_width: 720.0,
        page_height: 540.0,
    }
}

fn with_colors(mut rec: SlideRecord, hexes: &[&str]) -> SlideRecord {
    rec.colors = hexes
        .iter()
        .map(|h| ColorSample {
            hex: h.to_string(),
            frequency: 0.1,
        })
        .collect();
    rec
}

// ── Classification scenarios ─────────────────────────────────────────────

#[test]
fn budget_page_wins_over_bullets() {
    let signals = PageSignals {
        num_blocks: 6,
        mean_font_size: 14.0,
        full_text: "q1 budget fy24 total $500m",
    };
    assert_eq!(classify(&signals), SlideType::Budget);
}

#[test]
fn sparse_large_font_page_is_title() {
    let signals = PageSignals {
        num_blocks: 2,
        mean_font_size: 32.0,
        full_text: "joint munitions command overview",
    };
    assert_eq!(classify(&signals), SlideType::Title);
}

#[test]
fn agenda_keyword_beats_budget_keywords() {
    // rule order: agenda fires before budget even when fiscal words appear
    let signals = PageSignals {
        num_blocks: 5,
        mean_font_size: 14.0,
        full_text: "agenda: fy24 budget total overview",
    };
    assert_eq!(classify(&signals), SlideType::Agenda);
}

#[test]
fn plain_prose_defaults_to_bullets() {
    let signals = PageSignals {
        num_blocks: 8,
        mean_font_size: 12.0,
        full_text: "sustainment posture remains strong across all theaters",
    };
    assert_eq!(classify(&signals), SlideType::Bullets);
}

// ── Acronym aggregation ──────────────────────────────────────────────────

#[test]
fn acronym_counted_across_records_with_expansion() {
    let records = vec![
        record(
            "a.pdf",
            0,
            SlideType::Title,
            "JADC2",
            "Joint All-Domain Command and Control (JADC2) Overview",
        ),
        record("a.pdf", 1, SlideType::Bullets, "", "JADC2 integration milestones"),
        record("b.pdf", 0, SlideType::Bullets, "", "JADC2 funding profile"),
        record("b.pdf", 3, SlideType::Timeline, "", "JADC2 fielding timeline"),
    ];

    let config = CorpusConfig::default();
    let mut rng = StdRng::seed_from_u64(1);
    let analysis = CorpusAnalyzer::new(&config).analyze(&records, &mut rng);

    let jadc2 = analysis
        .acronyms
        .iter()
        .find(|a| a.acronym == "JADC2")
        .expect("JADC2 present");
    assert_eq!(jadc2.count, 4);
    assert_eq!(
        jadc2.expansion.as_deref(),
        Some("Joint All-Domain Command and Control")
    );
}

// ── Palette aggregation ──────────────────────────────────────────────────

#[test]
fn washed_out_record_contributes_no_overall_colors() {
    let records = vec![with_colors(
        record("a.pdf", 0, SlideType::Bullets, "", "text"),
        // near-white and near-black only
        &["#f0f0f0", "#080808"],
    )];

    let config = CorpusConfig::default();
    let mut rng = StdRng::seed_from_u64(1);
    let analysis = CorpusAnalyzer::new(&config).analyze(&records, &mut rng);

    let overall = analysis
        .palettes
        .iter()
        .find(|p| p.slide_type == "_overall")
        .expect("_overall palette present");
    assert!(overall.colors.is_empty());
    // the per-type palette entry still exists
    assert!(analysis.palettes.iter().any(|p| p.slide_type == "bullets"));
}

#[test]
fn midtone_colors_rank_in_overall_palette() {
    let records = vec![
        with_colors(
            record("a.pdf", 0, SlideType::Bullets, "", "text"),
            &["#306090", "#405060"],
        ),
        with_colors(
            record("b.pdf", 0, SlideType::Title, "", "text"),
            &["#306090", "#605040"],
        ),
    ];

    let config = CorpusConfig::default();
    let mut rng = StdRng::seed_from_u64(1);
    let analysis = CorpusAnalyzer::new(&config).analyze(&records, &mut rng);

    let overall = analysis
        .palettes
        .iter()
        .find(|p| p.slide_type == "_overall")
        .unwrap();
    assert_eq!(overall.colors[0], "#306090");
}

// ── Vocabulary properties ────────────────────────────────────────────────

#[test]
fn per_type_term_counts_sum_to_overall() {
    let records = vec![
        record("a.pdf", 0, SlideType::Title, "", "readiness sustainment"),
        record("a.pdf", 1, SlideType::Bullets, "", "readiness logistics"),
        record("b.pdf", 0, SlideType::Bullets, "", "readiness"),
    ];
    let config = CorpusConfig::builder()
        .min_term_count(1)
        .min_overall_count(1)
        .build()
        .unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    let analysis = CorpusAnalyzer::new(&config).analyze(&records, &mut rng);

    let overall_readiness = analysis.vocabulary["_overall"]
        .iter()
        .find(|t| t.term == "readiness")
        .unwrap()
        .count;
    let per_type_sum: u64 = analysis
        .vocabulary
        .iter()
        .filter(|(k, _)| !k.starts_with('_'))
        .flat_map(|(_, terms)| terms.iter())
        .filter(|t| t.term == "readiness")
        .map(|t| t.count)
        .sum();
    assert_eq!(overall_readiness, 3);
    assert_eq!(per_type_sum, overall_readiness);
}

// ── Distribution ─────────────────────────────────────────────────────────

#[test]
fn type_distribution_percentages_sum_to_hundred() {
    let records = vec![
        record("a.pdf", 0, SlideType::Title, "", "x"),
        record("a.pdf", 1, SlideType::Bullets, "", "x"),
        record("a.pdf", 2, SlideType::Bullets, "", "x"),
        record("a.pdf", 3, SlideType::Agenda, "", "x"),
    ];
    let config = CorpusConfig::default();
    let mut rng = StdRng::seed_from_u64(1);
    let analysis = CorpusAnalyzer::new(&config).analyze(&records, &mut rng);

    let total: u64 = analysis.type_distribution.values().map(|s| s.count).sum();
    assert_eq!(total, 4);
    let pct: f64 = analysis
        .type_distribution
        .values()
        .map(|s| s.percentage)
        .sum();
    assert!((pct - 100.0).abs() < 0.2, "percentages sum to {pct}");
    assert_eq!(analysis.stats.total_slides, 4);
    assert_eq!(analysis.stats.unique_sources, 1);
}

// ── Persistence ──────────────────────────────────────────────────────────

#[tokio::test]
async fn full_run_writes_parseable_artifacts() {
    let records: Vec<SlideRecord> = (0..6)
        .map(|i| {
            record(
                "deck.pdf",
                i,
                SlideType::Bullets,
                "Way Ahead",
                &format!("sustainment posture item {i} with some medium length body text to qualify as a sample slide for the corpus"),
            )
        })
        .collect();

    let config = CorpusConfig::builder().seed(9).build().unwrap();
    let mut rng = StdRng::seed_from_u64(9);
    let analysis = CorpusAnalyzer::new(&config).analyze(&records, &mut rng);

    let dir = tempfile::tempdir().unwrap();
    let writer = CorpusWriter::new(dir.path().join("corpus")).await.unwrap();
    writer.write(&analysis).await.unwrap();

    let slim_body = tokio::fs::read(writer.corpus_dir().join("slim_corpus.json"))
        .await
        .unwrap();
    let slim: SlimCorpus = serde_json::from_slice(&slim_body).unwrap();
    assert_eq!(slim.stats.total_slides, 6);
    assert!(slim.samples.contains_key("bullets"));

    let meta_body = tokio::fs::read(writer.corpus_dir().join("corpus_meta.json"))
        .await
        .unwrap();
    let meta: serde_json::Value = serde_json::from_slice(&meta_body).unwrap();
    assert_eq!(meta["stats"]["total_slides"], 6);
    assert!(meta["type_distribution"]["bullets"]["count"].is_u64());
}

#[tokio::test]
async fn empty_batch_produces_well_formed_corpus() {
    let config = CorpusConfig::default();
    let mut rng = StdRng::seed_from_u64(1);
    let analysis = CorpusAnalyzer::new(&config).analyze(&[], &mut rng);

    let dir = tempfile::tempdir().unwrap();
    let writer = CorpusWriter::new(dir.path()).await.unwrap();
    writer.write(&analysis).await.unwrap();

    let slim = build_slim_corpus(&analysis);
    assert!(slim.terms.is_empty());
    assert!(slim.acronyms.is_empty());
    assert_eq!(slim.stats.total_slides, 0);

    for name in [
        "vocabulary.json",
        "acronyms.json",
        "palettes.json",
        "sample_text.json",
        "common_titles.json",
        "corpus_meta.json",
        "slim_corpus.json",
    ] {
        let body = tokio::fs::read(writer.corpus_dir().join(name)).await.unwrap();
        serde_json::from_slice::<serde_json::Value>(&body).unwrap();
    }
}

#[test]
fn seeded_analysis_is_reproducible() {
    let records: Vec<SlideRecord> = (0..40)
        .map(|i| {
            with_colors(
                record(
                    &format!("deck{}.pdf", i % 5),
                    i,
                    if i % 3 == 0 { SlideType::Title } else { SlideType::Bullets },
                    "Overview",
                    &format!("operational readiness item {i} covering logistics and sustainment details across the enterprise"),
                ),
                &["#306090", "#405060", "#504030"],
            )
        })
        .collect();

    let config = CorpusConfig::default();
    let mut rng_a = StdRng::seed_from_u64(1234);
    let mut rng_b = StdRng::seed_from_u64(1234);
    let a = CorpusAnalyzer::new(&config).analyze(&records, &mut rng_a);
    let b = CorpusAnalyzer::new(&config).analyze(&records, &mut rng_b);

    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}
