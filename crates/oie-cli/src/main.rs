//! OIE CLI - Command-line interface
//!
//! Usage:
//!   oie extract --conllu <file> [--table <json>] [--corenlp <url>] [--json]
//!   oie text <sentence> [--corenlp <url>] [--json]
//!   oie decompose --conllu <file> [--table <json>]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use oie_core::{
    AppConfig, DecompositionStrategy, DependencyParser, LabelScheme, LoggingConfig, Tuple,
};
use oie_extractor::{extract_batch, OpenIe};
use oie_parser::{ConllReader, ConllSentence, CoreNlpClient, TableParser};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "oie")]
#[command(about = "Open information extraction over dependency parses")]
#[command(version)]
struct Cli {
    /// TOML configuration file; environment variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract tuples from pre-parsed sentences
    Extract {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        options: ExtractionArgs,

        /// Print tuples as JSON
        #[arg(long)]
        json: bool,
    },
    /// Parse a sentence with CoreNLP and extract tuples from it
    Text {
        /// Raw text
        text: String,

        /// CoreNLP server URL
        #[arg(long)]
        corenlp: Option<String>,

        #[command(flatten)]
        options: ExtractionArgs,

        /// Print tuples as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the clause forest of pre-parsed sentences
    Decompose {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        options: ExtractionArgs,
    },
}

#[derive(Args)]
struct InputArgs {
    /// CoNLL-U file with the sentences to process
    #[arg(long)]
    conllu: PathBuf,

    /// JSON table of parses for the clauses cut out of the sentences
    #[arg(long)]
    table: Option<PathBuf>,

    /// Re-parse clauses with a CoreNLP server instead of a table
    #[arg(long, conflicts_with = "table")]
    corenlp: Option<String>,
}

#[derive(Args)]
struct ExtractionArgs {
    /// Decomposition strategy (single_pass, reparse, apposition_first)
    #[arg(long)]
    strategy: Option<DecompositionStrategy>,

    /// Relation label scheme of the parser (corenlp, spacy)
    #[arg(long)]
    scheme: Option<LabelScheme>,

    /// Keep the first PP of each verb for classification
    #[arg(long)]
    two_tier: bool,
}

impl ExtractionArgs {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(strategy) = self.strategy {
            config.extraction.strategy = strategy;
        }
        if let Some(scheme) = self.scheme {
            config.parser.label_scheme = scheme;
        }
        if self.two_tier {
            config.extraction.two_tier_adverbials = true;
        }
    }
}

/// Per-sentence JSON record
#[derive(Serialize)]
struct SentenceReport<'a> {
    sentence: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    tuples: &'a [Tuple],
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    init_logging(&config.logging);

    match cli.command {
        Commands::Extract {
            input,
            options,
            json,
        } => {
            options.apply(&mut config);
            let sentences = read_sentences(&input)?;
            let parser = clause_parser(&input, &mut config, &sentences)?;
            run_extract(&config, parser, sentences, json)?;
        }
        Commands::Text {
            text,
            corenlp,
            options,
            json,
        } => {
            options.apply(&mut config);
            if let Some(url) = corenlp {
                config.parser.corenlp_url = url;
            }
            let client = Arc::new(CoreNlpClient::from_config(&config.parser)?);
            let parses = client
                .annotate(&text)
                .with_context(|| format!("CoreNLP at {}", config.parser.corenlp_url))?;
            let sentences = parses
                .into_iter()
                .map(|parsed| ConllSentence {
                    id: None,
                    text: parsed.text(),
                    parsed,
                })
                .collect();
            run_extract(&config, client, sentences, json)?;
        }
        Commands::Decompose { input, options } => {
            options.apply(&mut config);
            let sentences = read_sentences(&input)?;
            let parser = clause_parser(&input, &mut config, &sentences)?;
            let openie = OpenIe::from_config(parser, &config);
            for sentence in &sentences {
                match openie.decompose(&sentence.parsed) {
                    Ok(forest) => println!("{}\n", forest.render()),
                    Err(e) => eprintln!("Skipping '{}': {}", sentence.text, e),
                }
            }
        }
    }

    Ok(())
}

fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    if config.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn read_sentences(input: &InputArgs) -> anyhow::Result<Vec<ConllSentence>> {
    let sentences = ConllReader::new()
        .read_file(&input.conllu)
        .with_context(|| format!("reading {}", input.conllu.display()))?;
    tracing::info!(
        "Read {} sentences from {}",
        sentences.len(),
        input.conllu.display()
    );
    Ok(sentences)
}

/// Parser for the clauses the restructurer cuts out: a CoreNLP server when
/// one is given, otherwise a lookup table seeded with the input parses
fn clause_parser(
    input: &InputArgs,
    config: &mut AppConfig,
    sentences: &[ConllSentence],
) -> anyhow::Result<Arc<dyn DependencyParser>> {
    if let Some(url) = &input.corenlp {
        config.parser.corenlp_url = url.clone();
        return Ok(Arc::new(CoreNlpClient::from_config(&config.parser)?));
    }

    let mut table = match &input.table {
        Some(path) => TableParser::from_file(path)
            .with_context(|| format!("loading parse table {}", path.display()))?,
        None => TableParser::new(),
    };
    let known: Vec<_> = sentences
        .iter()
        .filter(|s| s.parsed.validate().is_ok())
        .map(|s| s.parsed.clone())
        .collect();
    table.extend(known)?;
    tracing::debug!("Parse table holds {} clauses", table.len());
    Ok(Arc::new(table))
}

fn run_extract(
    config: &AppConfig,
    parser: Arc<dyn DependencyParser>,
    sentences: Vec<ConllSentence>,
    json: bool,
) -> anyhow::Result<()> {
    let openie = Arc::new(OpenIe::from_config(parser, config));
    let texts: Vec<String> = sentences.iter().map(|s| s.text.clone()).collect();
    let parses = sentences.into_iter().map(|s| s.parsed).collect();

    let runtime = tokio::runtime::Runtime::new()?;
    let outcomes = runtime.block_on(extract_batch(
        Arc::clone(&openie),
        parses,
        config.extraction.max_concurrency,
    ));

    if json {
        let reports: Vec<SentenceReport> = texts
            .iter()
            .zip(&outcomes)
            .map(|(text, outcome)| match outcome {
                Ok(tuples) => SentenceReport {
                    sentence: text,
                    error: None,
                    tuples,
                },
                Err(e) => SentenceReport {
                    sentence: text,
                    error: Some(e.to_string()),
                    tuples: &[],
                },
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    for (text, outcome) in texts.iter().zip(&outcomes) {
        println!("# {}", text);
        match outcome {
            Ok(tuples) => print_tuples(tuples, 0),
            Err(e) => println!("  error: {}", e),
        }
        println!();
    }
    Ok(())
}

fn print_tuples(tuples: &[Tuple], depth: usize) {
    let indent = "  ".repeat(depth + 1);
    for tuple in tuples {
        let negation = if tuple.negation { " [neg]" } else { "" };
        println!("{}[{}] {}{}", indent, tuple.clause_type, tuple, negation);
        print_tuples(&tuple.complement, depth + 1);
    }
}
