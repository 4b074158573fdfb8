//! CoNLL-U reader
//!
//! Reads sentences in the ten-column CoNLL-U format into the parse
//! contract of the extraction core. Multi-word token ranges (`1-2`) and
//! empty nodes (`3.1`) are skipped; `# sent_id` and `# text` comments are
//! kept with the sentence.

use std::path::Path;

use oie_core::{Dependency, ParsedSentence, ParsedToken};

use crate::{normalize_relation, ParserError, Result};

const COLUMNS: usize = 10;

/// One sentence read from a CoNLL-U document
#[derive(Debug, Clone, PartialEq)]
pub struct ConllSentence {
    /// Value of the `# sent_id` comment
    pub id: Option<String>,

    /// Value of the `# text` comment, or the words joined by spaces
    pub text: String,

    pub parsed: ParsedSentence,
}

/// CoNLL-U reader
#[derive(Debug, Clone, Default)]
pub struct ConllReader {
    /// Prefer the universal POS column over the language-specific one
    universal_tags: bool,
}

#[derive(Default)]
struct Pending {
    id: Option<String>,
    text: Option<String>,
    tokens: Vec<ParsedToken>,
    dependencies: Vec<Dependency>,
}

impl Pending {
    fn finish(&mut self) -> Option<ConllSentence> {
        if self.tokens.is_empty() {
            *self = Self::default();
            return None;
        }
        let taken = std::mem::take(self);
        let parsed = ParsedSentence::new(taken.tokens, taken.dependencies);
        Some(ConllSentence {
            id: taken.id,
            text: taken.text.unwrap_or_else(|| parsed.text()),
            parsed,
        })
    }
}

impl ConllReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take POS tags from the UPOS column instead of XPOS
    pub fn with_universal_tags(mut self, enabled: bool) -> Self {
        self.universal_tags = enabled;
        self
    }

    /// Read every sentence of a CoNLL-U file
    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<Vec<ConllSentence>> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ParserError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;
        self.read_str(&content)
    }

    /// Read every sentence of a CoNLL-U document
    pub fn read_str(&self, input: &str) -> Result<Vec<ConllSentence>> {
        let mut sentences = Vec::new();
        let mut pending = Pending::default();

        for (number, line) in input.lines().enumerate() {
            let line = line.trim_end();
            if line.is_empty() {
                sentences.extend(pending.finish());
                continue;
            }
            if let Some(comment) = line.strip_prefix('#') {
                if let Some((key, value)) = comment.split_once('=') {
                    match key.trim() {
                        "sent_id" => pending.id = Some(value.trim().to_string()),
                        "text" => pending.text = Some(value.trim().to_string()),
                        _ => {}
                    }
                }
                continue;
            }
            self.read_token(line, number + 1, &mut pending)?;
        }
        sentences.extend(pending.finish());
        Ok(sentences)
    }

    fn read_token(&self, line: &str, number: usize, pending: &mut Pending) -> Result<()> {
        let columns: Vec<&str> = line.split('\t').collect();
        if columns.len() != COLUMNS {
            return Err(ParserError::FormatError {
                line: number,
                message: format!("expected {} columns, found {}", COLUMNS, columns.len()),
            });
        }

        let id = columns[0];
        if id.contains('-') || id.contains('.') {
            return Ok(());
        }
        let index: usize = parse_index(id, number)?;
        if index != pending.tokens.len() + 1 {
            return Err(ParserError::FormatError {
                line: number,
                message: format!("token {} out of sequence", index),
            });
        }

        let pos = match (self.universal_tags, columns[3], columns[4]) {
            (false, upos, "_") => upos,
            (false, _, xpos) => xpos,
            (true, upos, _) => upos,
        };
        pending
            .tokens
            .push(ParsedToken::new(columns[1], pos));

        if columns[6] != "_" {
            let governor = parse_index(columns[6], number)?;
            pending.dependencies.push(Dependency::new(
                governor,
                index,
                normalize_relation(columns[7]),
            ));
        }
        Ok(())
    }
}

fn parse_index(value: &str, line: usize) -> Result<usize> {
    value.parse().map_err(|_| ParserError::FormatError {
        line,
        message: format!("invalid index '{}'", value),
    })
}
