//! Structural properties of decomposition and extraction over generated
//! dependency trees

use std::sync::Arc;

use oie_core::{
    DecompositionStrategy, Dependency, DependencyParser, ParsedSentence, ParsedToken,
    RelationLabels, Result, Tuple,
};
use oie_extractor::{DependencyChunker, DependencyTree, NounChunker, OpenIe};
use proptest::prelude::*;
use proptest::sample::Index;

const VOCABULARY: [(&str, &str); 18] = [
    ("he", "PRP"),
    ("man", "NN"),
    ("Paris", "NNP"),
    ("was", "VBD"),
    ("left", "VBD"),
    ("waving", "VBG"),
    ("invited", "VBN"),
    ("go", "VB"),
    ("to", "TO"),
    ("that", "IN"),
    ("who", "WP"),
    ("in", "IN"),
    ("the", "DT"),
    ("old", "JJ"),
    (",", ","),
    ("not", "RB"),
    ("and", "CC"),
    ("there", "EX"),
];

const RELATIONS: [&str; 26] = [
    "nsubj",
    "nsubjpass",
    "dobj",
    "iobj",
    "advcl",
    "acl",
    "acl:relcl",
    "ccomp",
    "xcomp",
    "appos",
    "csubj",
    "nmod",
    "case",
    "mark",
    "det",
    "amod",
    "conj",
    "cc",
    "punct",
    "cop",
    "aux",
    "auxpass",
    "neg",
    "compound:prt",
    "expl",
    "nmod:poss",
];

/// Tags every word from the vocabulary and hangs all tokens off the first
struct FlatParser;

impl DependencyParser for FlatParser {
    fn parse(&self, words: &[String]) -> Result<ParsedSentence> {
        let tokens = words
            .iter()
            .map(|w| {
                let pos = VOCABULARY
                    .iter()
                    .find(|(word, _)| word == w)
                    .map(|(_, pos)| *pos)
                    .unwrap_or(if w == "be" { "VB" } else { "NN" });
                ParsedToken::new(w.clone(), pos)
            })
            .collect();
        let dependencies = (1..=words.len())
            .map(|i| {
                if i == 1 {
                    Dependency::new(0, 1, "ROOT")
                } else {
                    Dependency::new(1, i, "dep")
                }
            })
            .collect();
        Ok(ParsedSentence::new(tokens, dependencies))
    }
}

/// Random trees: a shuffled attachment order guarantees every token
/// reaches the root
fn arb_sentence() -> impl Strategy<Value = ParsedSentence> {
    (2usize..10)
        .prop_flat_map(|n| {
            (
                Just((1..=n).collect::<Vec<usize>>()).prop_shuffle(),
                prop::collection::vec(any::<Index>(), n),
                prop::collection::vec(prop::sample::select(VOCABULARY.to_vec()), n),
                prop::collection::vec(prop::sample::select(RELATIONS.to_vec()), n),
            )
        })
        .prop_map(|(order, parents, words, relations)| {
            let tokens = words
                .iter()
                .map(|(w, t)| ParsedToken::new(*w, *t))
                .collect();
            let dependencies = order
                .iter()
                .enumerate()
                .map(|(k, token)| {
                    if k == 0 {
                        Dependency::new(0, *token, "ROOT")
                    } else {
                        let governor = order[parents[k].index(k)];
                        Dependency::new(governor, *token, relations[k])
                    }
                })
                .collect();
            ParsedSentence::new(tokens, dependencies)
        })
}

fn arb_strategy() -> impl Strategy<Value = DecompositionStrategy> {
    prop_oneof![
        Just(DecompositionStrategy::SinglePass),
        Just(DecompositionStrategy::Reparse),
        Just(DecompositionStrategy::AppositionFirst),
    ]
}

fn all_indices(tuples: &[Tuple]) -> Vec<usize> {
    tuples
        .iter()
        .flat_map(|t| {
            let mut indices: Vec<usize> = t
                .elements()
                .into_iter()
                .flat_map(|e| e.indices.clone())
                .collect();
            indices.extend(all_indices(&t.complement));
            indices
        })
        .collect()
}

fn labels() -> Arc<RelationLabels> {
    Arc::new(RelationLabels::corenlp())
}

type Snapshot = Vec<(usize, String, String, Option<usize>, Option<String>)>;

fn snapshot(tree: &DependencyTree) -> Snapshot {
    tree.units()
        .map(|(i, u)| {
            (
                i,
                u.word(),
                u.pos().to_string(),
                tree.parent(i),
                tree.incoming_relation(i).map(String::from),
            )
        })
        .collect()
}

/// "n .. n , p q .. , s .. v": a parenthetical headed by `p`, optionally
/// preceded by nouns, always followed by the main verb
fn parenthetical(prefix: usize, length: usize, suffix: usize) -> (ParsedSentence, usize) {
    let mut tokens = Vec::new();
    let mut attachments: Vec<(Option<usize>, &str)> = Vec::new();
    let verb = prefix + usize::from(prefix > 0) + length + 1 + suffix + 1;

    for _ in 0..prefix {
        tokens.push(ParsedToken::new("n", "NN"));
        attachments.push((Some(verb), "dep"));
    }
    if prefix > 0 {
        tokens.push(ParsedToken::new(",", ","));
        attachments.push((Some(verb), "punct"));
    }
    let head = tokens.len() + 1;
    tokens.push(ParsedToken::new("p", "VBG"));
    attachments.push((Some(verb), "advcl"));
    for _ in 1..length {
        tokens.push(ParsedToken::new("q", "NN"));
        attachments.push((Some(head), "dobj"));
    }
    tokens.push(ParsedToken::new(",", ","));
    attachments.push((Some(verb), "punct"));
    for _ in 0..suffix {
        tokens.push(ParsedToken::new("s", "NN"));
        attachments.push((Some(verb), "dep"));
    }
    tokens.push(ParsedToken::new("v", "VBD"));
    attachments.push((None, "ROOT"));

    let dependencies = attachments
        .iter()
        .enumerate()
        .map(|(i, (governor, relation))| Dependency::new(governor.unwrap_or(0), i + 1, *relation))
        .collect();
    (ParsedSentence::new(tokens, dependencies), head)
}

/// Noun phrases "[mods] noun", the first one the subject of a final verb
fn noun_phrases(modifiers: &[usize]) -> ParsedSentence {
    const MODIFIERS: [(&str, &str, &str); 3] =
        [("the", "DT", "det"), ("old", "JJ", "amod"), ("two", "CD", "nummod")];

    let verb = modifiers.iter().map(|m| m + 1).sum::<usize>() + 1;
    let mut tokens = Vec::new();
    let mut dependencies = Vec::new();
    for (k, count) in modifiers.iter().enumerate() {
        let head = tokens.len() + count + 1;
        for (word, pos, relation) in MODIFIERS.iter().take(*count) {
            tokens.push(ParsedToken::new(*word, *pos));
            dependencies.push(Dependency::new(head, tokens.len(), *relation));
        }
        tokens.push(ParsedToken::new("dogs", "NNS"));
        let relation = if k == 0 { "nsubj" } else { "dobj" };
        dependencies.push(Dependency::new(verb, head, relation));
    }
    tokens.push(ParsedToken::new("saw", "VBD"));
    dependencies.push(Dependency::new(0, verb, "ROOT"));
    ParsedSentence::new(tokens, dependencies)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_decomposition_terminates(sentence in arb_sentence(), strategy in arb_strategy()) {
        let openie = OpenIe::new(Arc::new(FlatParser), RelationLabels::corenlp())
            .with_strategy(strategy);
        let forest = openie.decompose(&sentence);
        prop_assert!(forest.is_ok());
        if let Ok(forest) = forest {
            prop_assert!(forest.clauses().len() <= sentence.len() + 1);
        }
    }

    #[test]
    fn prop_indices_come_from_the_sentence(sentence in arb_sentence(), strategy in arb_strategy()) {
        let openie = OpenIe::new(Arc::new(FlatParser), RelationLabels::corenlp())
            .with_strategy(strategy)
            .with_two_tier_adverbials(true);
        let tuples = openie.extract(&sentence);
        prop_assert!(tuples.is_ok());
        if let Ok(tuples) = tuples {
            for index in all_indices(&tuples) {
                prop_assert!((1..=sentence.len()).contains(&index));
            }
        }
    }

    #[test]
    fn prop_deletion_leaves_no_double_comma(
        prefix in 0usize..4,
        length in 1usize..4,
        suffix in 0usize..3,
        drop_following in any::<bool>(),
    ) {
        let (sentence, head) = parenthetical(prefix, length, suffix);
        let mut tree = DependencyTree::from_parsed(&sentence, labels()).unwrap();
        let nodes = tree.subtree(head, &[]);
        tree.delete_subtree(&nodes, drop_following);

        let commas: Vec<bool> = tree.units().map(|(_, u)| u.is_comma()).collect();
        prop_assert!(!commas.windows(2).any(|w| w[0] && w[1]));
        prop_assert_eq!(commas.first(), Some(&false));
    }

    #[test]
    fn prop_noun_phrase_round_trip(modifiers in prop::collection::vec(0usize..4, 1..4)) {
        let sentence = noun_phrases(&modifiers);
        let mut tree = DependencyTree::from_parsed(&sentence, labels()).unwrap();
        let before = snapshot(&tree);

        let chunks = DependencyChunker::new().noun_chunks(&tree);
        let expected = modifiers.iter().filter(|m| **m > 0).count();
        prop_assert_eq!(tree.merge_noun_phrases(&chunks), expected);

        tree.stretch_noun_phrases();
        prop_assert_eq!(snapshot(&tree), before);
    }
}
