//! LETRA - lyric prosody toolkit CLI
//!
//! The `letra` command validates, scores and corrects Brazilian Portuguese
//! song lyrics.
//!
//! ## Commands
//!
//! - `syllables`: Poetic syllable count of each line
//! - `validate`: Run every validator over a lyric
//! - `score`: Composite score with its breakdown
//! - `correct`: Run the correction pipeline
//! - `select`: Pick the best of several generator outputs
//! - `genres`: List the configured genres

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, Level};

use letra_core::validators::has_hard_failure;
use letra_core::{
    all_valid, correct, count_line, line_breakdown, validate_all, CompositeScorer, GenreConfig,
    LetraConfig, Lyric, Orchestrator, Scorer, ScriptedGenerator, Severity,
};

#[derive(Parser)]
#[command(name = "letra")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Prosody validation and correction for Brazilian Portuguese lyrics", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output and JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// TOML configuration file
    #[arg(short, long, global = true, env = "LETRA_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count poetic syllables line by line
    Syllables {
        /// Lines to count; reads the lyric from --file when empty
        lines: Vec<String>,

        /// Lyric file (`-` for stdin)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Validate a lyric against a genre
    Validate {
        /// Lyric file (`-` for stdin)
        file: PathBuf,

        /// Genre name (unknown genres use the default)
        #[arg(short, long, default_value = "padrao")]
        genre: String,
    },

    /// Score a lyric
    Score {
        /// Lyric file (`-` for stdin)
        file: PathBuf,

        #[arg(short, long, default_value = "padrao")]
        genre: String,
    },

    /// Run the correction pipeline over a raw lyric
    Correct {
        /// Lyric file (`-` for stdin)
        file: PathBuf,

        #[arg(short, long, default_value = "padrao")]
        genre: String,

        /// Write the corrected lyric here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replay saved generator outputs through the orchestrator and pick one
    Select {
        /// Generator outputs, one file per attempt, in order
        #[arg(required = true)]
        outputs: Vec<PathBuf>,

        #[arg(short, long, default_value = "padrao")]
        genre: String,

        /// Base prompt recorded with the run
        #[arg(short, long, default_value = "")]
        prompt: String,
    },

    /// List configured genres and their budgets
    Genres,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    letra_core::init_tracing(cli.json, level);

    let config = match &cli.config {
        Some(path) => LetraConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => LetraConfig::default(),
    };
    let catalog = config.catalog();

    match cli.command {
        Commands::Syllables { lines, file } => cmd_syllables(&lines, file.as_deref(), cli.json),
        Commands::Validate { file, genre } => cmd_validate(&file, catalog.get(&genre), cli.json),
        Commands::Score { file, genre } => {
            let scorer = CompositeScorer::new(config.scoring.clone());
            cmd_score(&file, catalog.get(&genre), &scorer, cli.json)
        }
        Commands::Correct {
            file,
            genre,
            output,
        } => cmd_correct(&file, catalog.get(&genre), output.as_deref(), cli.json),
        Commands::Select {
            outputs,
            genre,
            prompt,
        } => cmd_select(&config, &outputs, catalog.get(&genre), &prompt, cli.json).await,
        Commands::Genres => cmd_genres(&config, cli.json),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Read a lyric from a file, or stdin for `-`.
fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read lyric from stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Serialize)]
struct LineCount {
    line: usize,
    text: String,
    syllables: usize,
    elided: Vec<String>,
}

fn line_counts(lyric: &Lyric) -> Vec<LineCount> {
    lyric
        .verse_lines()
        .map(|(index, text)| LineCount {
            line: index + 1,
            text: text.to_string(),
            syllables: count_line(text),
            elided: line_breakdown(text)
                .into_iter()
                .filter(|w| w.elided)
                .map(|w| w.word)
                .collect(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_syllables(lines: &[String], file: Option<&Path>, json: bool) -> Result<()> {
    let lyric = match file {
        Some(path) => Lyric::parse(&read_input(path)?),
        None if !lines.is_empty() => Lyric::from_lines(lines.to_vec()),
        None => bail!("Pass lines to count or --file"),
    };
    let counts = line_counts(&lyric);
    if json {
        return print_json(&counts);
    }
    for c in counts {
        if c.elided.is_empty() {
            println!("{:>3}  {:>2}  {}", c.line, c.syllables, c.text);
        } else {
            println!(
                "{:>3}  {:>2}  {}  (elisão: {})",
                c.line,
                c.syllables,
                c.text,
                c.elided.join(", ")
            );
        }
    }
    Ok(())
}

fn cmd_validate(file: &Path, genre: &GenreConfig, json: bool) -> Result<()> {
    let lyric = Lyric::parse(&read_input(file)?);
    let reports = validate_all(&lyric, genre);
    info!(genre = %genre.name, valid = all_valid(&reports), "validated lyric");

    if json {
        print_json(&reports)?;
    } else {
        for report in &reports {
            let status = if report.is_valid { "ok" } else { "FAIL" };
            println!("{:<20} {}", report.kind.to_string(), status);
            for v in &report.violations {
                let level = match v.severity {
                    Severity::Error => "error",
                    Severity::Warning => "warning",
                };
                println!("    {level} linha {}: {}", v.line, v.reason);
            }
        }
    }

    if has_hard_failure(&reports) {
        bail!("Lyric has truncated words");
    }
    Ok(())
}

fn cmd_score(file: &Path, genre: &GenreConfig, scorer: &dyn Scorer, json: bool) -> Result<()> {
    let lyric = Lyric::parse(&read_input(file)?);
    let reports = validate_all(&lyric, genre);
    let breakdown = scorer.score(&lyric, genre, &reports);

    if json {
        return print_json(&breakdown);
    }
    println!("score: {:.2}", breakdown.total);
    for c in &breakdown.components {
        println!(
            "    {:<16} {:>6.2} / {:<6.2} ({:.0}%)",
            format!("{:?}", c.kind),
            c.points,
            c.weight,
            c.ratio * 100.0
        );
    }
    if breakdown.integrity_penalty {
        println!("    palavras truncadas: pontuação penalizada");
    }
    Ok(())
}

fn cmd_correct(file: &Path, genre: &GenreConfig, output: Option<&Path>, json: bool) -> Result<()> {
    let raw = read_input(file)?;
    let outcome = correct(&raw, genre);
    info!(changes = outcome.records.len(), "corrected lyric");

    if let Some(path) = output {
        std::fs::write(path, format!("{}\n", outcome.text))
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    if json {
        return print_json(&outcome);
    }
    if output.is_none() {
        println!("{}", outcome.text);
    }
    for r in &outcome.records {
        let line = r.line.map(|l| l.to_string()).unwrap_or_else(|| "-".to_string());
        eprintln!("{:?} linha {line}: {:?} -> {:?}", r.step, r.before, r.after);
    }
    Ok(())
}

async fn cmd_select(
    config: &LetraConfig,
    outputs: &[PathBuf],
    genre: &GenreConfig,
    prompt: &str,
    json: bool,
) -> Result<()> {
    let texts = outputs
        .iter()
        .map(|p| read_input(p))
        .collect::<Result<Vec<_>>>()?;
    let generator = ScriptedGenerator::from_texts(texts);
    let scorer = CompositeScorer::new(config.scoring.clone());
    let orchestrator =
        Orchestrator::new(config.orchestrator.clone()).context("Invalid orchestrator config")?;

    let outcome = orchestrator.run(&generator, &scorer, genre, prompt).await;
    let result = outcome.into_result();

    if json {
        return print_json(&result);
    }
    println!("{}", result.lyrics);
    eprintln!(
        "selection: {:?}, score: {:.2}, attempts: {}",
        result.diagnostics.selection,
        result.score,
        result.diagnostics.attempts.len()
    );
    Ok(())
}

fn cmd_genres(config: &LetraConfig, json: bool) -> Result<()> {
    let catalog = config.catalog();
    if json {
        return print_json(&catalog);
    }
    for genre in catalog.iter() {
        let b = genre.budget;
        println!("{:<12} {:>2} / {:>2} / {:>2}", genre.name, b.min, b.ideal, b.max);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn lyric_file(text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{text}").unwrap();
        file
    }

    #[test]
    fn test_cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["letra", "validate", "letra.txt", "--genre", "samba", "--json"])
            .unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Validate { ref genre, .. } if genre == "samba"));
    }

    #[test]
    fn test_select_requires_outputs() {
        assert!(Cli::try_parse_from(["letra", "select"]).is_err());
    }

    #[test]
    fn test_line_counts_report_elision() {
        let counts = line_counts(&Lyric::parse("[Verso]\nMudei o corte, desatei o laço,"));
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].line, 2);
        assert_eq!(counts[0].syllables, 9);
        assert_eq!(counts[0].elided, vec!["Mudei", "desatei"]);
    }

    #[test]
    fn test_validate_fails_on_truncation() {
        let file = lyric_file("Meu coraç bate forte");
        let err = cmd_validate(file.path(), &GenreConfig::default(), true).unwrap_err();
        assert!(format!("{err:#}").contains("truncated"));
    }

    #[test]
    fn test_correct_writes_output_file() {
        let input = lyric_file("\"vem dançar comigo  agora\"");
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("corrigida.txt");

        cmd_correct(input.path(), &GenreConfig::default(), Some(&out), false).unwrap();
        assert_eq!(std::fs::read_to_string(out).unwrap(), "Vem dançar comigo agora\n");
    }

    #[tokio::test]
    async fn test_select_reads_outputs_in_order() {
        let first = lyric_file("Meu soliã canta");
        let second = lyric_file(letra_core::EMERGENCY_LYRIC);
        let config = LetraConfig::default();
        let outputs = vec![first.path().to_path_buf(), second.path().to_path_buf()];

        let result = cmd_select(&config, &outputs, &GenreConfig::default(), "samba", true).await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_missing_input_has_context() {
        let err = read_input(Path::new("/nonexistent/letra.txt")).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to read"));
    }
}
