//! CoreNLP server client
//!
//! Talks to a Stanford CoreNLP server over its JSON API. Clause re-parses
//! are sent pre-tokenized (whitespace tokenization, one sentence per
//! request) so the returned tokens line up with the words the core asked
//! about; raw text goes through the server's own tokenizer.

use std::time::Duration;

use oie_core::{
    Dependency, DependencyParser, NamedEntity, ParsedSentence, ParsedToken, ParserConfig,
};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;

use crate::{ParserError, Result};

const CLAUSE_ANNOTATORS: &str = "tokenize,ssplit,pos,depparse";
const TEXT_ANNOTATORS: &str = "tokenize,ssplit,pos,lemma,ner,depparse";

/// Blocking CoreNLP HTTP client
#[derive(Debug, Clone)]
pub struct CoreNlpClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct CoreNlpDocument {
    #[serde(default)]
    sentences: Vec<CoreNlpSentence>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoreNlpSentence {
    #[serde(default)]
    tokens: Vec<CoreNlpToken>,
    #[serde(default)]
    basic_dependencies: Vec<CoreNlpDependency>,
    #[serde(default)]
    entitymentions: Vec<CoreNlpEntity>,
}

#[derive(Debug, Deserialize)]
struct CoreNlpToken {
    word: String,
    pos: String,
}

#[derive(Debug, Deserialize)]
struct CoreNlpDependency {
    dep: String,
    governor: usize,
    dependent: usize,
}

#[derive(Debug, Deserialize)]
struct CoreNlpEntity {
    text: String,
    ner: String,
}

impl CoreNlpClient {
    /// Create a client for the server at `base_url`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ParserError::HttpError(format!("Failed to build client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create from config
    pub fn from_config(config: &ParserConfig) -> Result<Self> {
        Self::new(
            config.corenlp_url.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Tokenize, tag, recognize entities and parse raw text
    pub fn annotate(&self, text: &str) -> Result<Vec<ParsedSentence>> {
        let properties = json!({
            "annotators": TEXT_ANNOTATORS,
            "outputFormat": "json",
        });
        let document = self.request(text, &properties)?;
        Ok(document.sentences.into_iter().map(convert).collect())
    }

    /// Parse one pre-tokenized clause
    pub fn parse_words(&self, words: &[String]) -> Result<ParsedSentence> {
        let properties = json!({
            "annotators": CLAUSE_ANNOTATORS,
            "tokenize.whitespace": "true",
            "ssplit.eolonly": "true",
            "outputFormat": "json",
        });
        let document = self.request(&words.join(" "), &properties)?;

        let mut sentences = document.sentences.into_iter();
        let sentence = sentences
            .next()
            .map(convert)
            .ok_or_else(|| ParserError::InvalidResponse("no sentence returned".to_string()))?;
        if sentences.next().is_some() || sentence.len() != words.len() {
            return Err(ParserError::InvalidResponse(format!(
                "tokenization of '{}' does not match the input words",
                words.join(" ")
            )));
        }
        Ok(sentence)
    }

    fn request(&self, text: &str, properties: &serde_json::Value) -> Result<CoreNlpDocument> {
        tracing::debug!("Parsing '{}' with CoreNLP at {}", text, self.base_url);
        let response = self
            .client
            .post(format!("{}/", self.base_url))
            .query(&[("properties", properties.to_string())])
            .body(text.to_string())
            .send()
            .map_err(|e| ParserError::HttpError(format!("CoreNLP request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().unwrap_or_default();
            return Err(ParserError::HttpError(format!(
                "CoreNLP returned {status}: {error_text}"
            )));
        }

        response
            .json()
            .map_err(|e| ParserError::InvalidResponse(format!("Failed to parse response: {e}")))
    }
}

impl DependencyParser for CoreNlpClient {
    fn parse(&self, words: &[String]) -> oie_core::Result<ParsedSentence> {
        Ok(self.parse_words(words)?)
    }
}

fn convert(sentence: CoreNlpSentence) -> ParsedSentence {
    let tokens = sentence
        .tokens
        .into_iter()
        .map(|t| ParsedToken::new(t.word, t.pos))
        .collect();
    let dependencies = sentence
        .basic_dependencies
        .into_iter()
        .map(|d| Dependency::new(d.governor, d.dependent, d.dep))
        .collect();
    let entities = sentence
        .entitymentions
        .into_iter()
        .map(|e| NamedEntity {
            text: e.text,
            label: e.ner,
        })
        .collect();
    ParsedSentence::new(tokens, dependencies).with_entities(entities)
}
