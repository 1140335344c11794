// Rule-based analyzer — the default TextAnalyzer.
//
// Zero models, zero downloads. Sentence boundaries and tokens come from two
// regex_lite patterns compiled once per process; an abbreviation list vetoes
// boundaries after "Dr." and friends. Tags come from closed-class word lists
// plus a suffix rule for past participles. It is good enough for English
// stylometry, which only needs relative rates.

use std::sync::OnceLock;

use regex_lite::Regex;

use crate::error::{InkprintError, Result};

use super::traits::{AnalyzedText, PosTag, Sentence, TextAnalyzer, Token};

/// Forms that can head a passive ("was written", "got fired").
const PASSIVE_AUXILIARIES: &[&str] = &[
    "am", "is", "are", "was", "were", "be", "been", "being", "get", "gets", "got", "gotten",
    "getting",
];

const AUXILIARIES: &[&str] = &[
    "have", "has", "had", "having", "do", "does", "did", "will", "would", "shall", "should",
    "can", "could", "may", "might", "must",
];

const IRREGULAR_PARTICIPLES: &[&str] = &[
    "begun", "bitten", "beaten", "born", "borne", "bought", "broken", "brought", "built",
    "caught", "chosen", "done", "drawn", "driven", "eaten", "fallen", "fed", "felt", "flown",
    "forgiven", "forgotten", "found", "fought", "given", "gone", "grown", "heard", "held",
    "hidden", "kept", "known", "laid", "led", "left", "lost", "made", "meant", "met",
    "mistaken", "overtaken", "paid", "proven", "put", "read", "ridden", "risen", "run", "said",
    "seen", "sent", "set", "shaken", "shown", "sold", "spent", "spoken", "stolen", "sworn",
    "taken", "taught", "thought", "thrown", "told", "undertaken", "understood", "withdrawn",
    "woken", "won", "worn", "written",
];

/// Words ending in "-ed" that are not participles.
const ED_EXCEPTIONS: &[&str] = &[
    "bed", "red", "need", "feed", "seed", "speed", "indeed", "hundred", "shed", "wed", "bred",
    "greed", "breed", "sacred", "naked", "wicked",
];

const ADVERBS: &[&str] = &[
    "not", "also", "then", "just", "still", "often", "never", "always", "already", "soon",
    "quite", "very", "too", "rather", "almost", "even", "once", "again",
];

const PRONOUNS: &[&str] = &[
    "i", "me", "my", "mine", "myself", "we", "us", "our", "ours", "you", "your", "yours", "he",
    "him", "his", "she", "her", "hers", "they", "them", "their", "theirs", "it", "its",
];

const SUBORDINATORS: &[&str] = &[
    "because", "although", "though", "while", "whereas", "which", "who", "whom", "whose",
    "since", "unless", "whether", "if", "when", "whenever", "where", "until",
];

/// Abbreviations whose trailing period does not end a sentence.
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "st", "vs", "etc", "e.g", "i.e", "jr", "sr", "inc", "ltd",
    "fig", "cf", "al",
];

/// A run of terminal punctuation plus closing quotes or brackets, followed by
/// whitespace or end of text. A blank line is also a boundary.
const SENTENCE_BOUNDARY: &str = r#"[.!?…]+["'”’)\]]*(?:\s+|$)|\n[ \t\r]*\n"#;

/// One character of a word: anything but whitespace, ASCII punctuation, the
/// Latin-1 and general punctuation blocks, CJK punctuation, and symbol/emoji
/// ranges. regex_lite has no Unicode classes, so the set is spelled out.
const WORD_CHAR: &str = concat!(
    r"[^\s!-/:-@\[-`{-~",
    "\u{a0}-\u{bf}\u{d7}\u{f7}\u{2000}-\u{206f}\u{2190}-\u{2bff}\u{3000}-\u{303f}",
    "\u{1f000}-\u{1faff}",
    "]"
);

static SENTENCE_BOUNDARY_RE: OnceLock<Regex> = OnceLock::new();
static WORD_TOKEN_RE: OnceLock<Regex> = OnceLock::new();

fn sentence_boundary() -> &'static Regex {
    SENTENCE_BOUNDARY_RE
        .get_or_init(|| Regex::new(SENTENCE_BOUNDARY).expect("valid sentence boundary regex"))
}

/// Word characters, optionally joined by inner apostrophes or hyphens.
fn word_token() -> &'static Regex {
    WORD_TOKEN_RE.get_or_init(|| {
        Regex::new(&format!("{WORD_CHAR}+(?:['’-]{WORD_CHAR}+)*")).expect("valid word token regex")
    })
}

/// Heuristic English analyzer. Stateless and cheap to share.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedAnalyzer;

impl TextAnalyzer for RuleBasedAnalyzer {
    fn analyze(&self, text: &str) -> Result<AnalyzedText> {
        if text.trim().is_empty() {
            return Err(InkprintError::Input(
                "cannot analyze empty or whitespace-only text".to_string(),
            ));
        }

        let mut sentences: Vec<Sentence> = split_sentences(text)
            .into_iter()
            .map(|segment| Sentence {
                tokens: tokenize(segment).into_iter().map(tag_token).collect(),
            })
            .collect();

        if sentences.is_empty() {
            sentences.push(Sentence::default());
        }

        Ok(AnalyzedText { sentences })
    }
}

/// Split text into trimmed, non-empty sentence segments.
///
/// A sentence ends at a run of terminal punctuation (plus closing quotes or
/// brackets) followed by whitespace or end of text, or at a blank line.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0usize;

    for boundary in sentence_boundary().find_iter(text) {
        if boundary.as_str().starts_with('.')
            && is_abbreviation(&text[start..boundary.start()], &text[boundary.end()..])
        {
            continue;
        }
        push_segment(&mut segments, &text[start..boundary.end()]);
        start = boundary.end();
    }

    push_segment(&mut segments, &text[start..]);
    segments
}

fn push_segment<'a>(segments: &mut Vec<&'a str>, segment: &'a str) {
    let trimmed = segment.trim();
    if !trimmed.is_empty() {
        segments.push(trimmed);
    }
}

/// Whether the period closing `before_period` belongs to an abbreviation.
/// `after` is the text following the boundary's whitespace.
fn is_abbreviation(before_period: &str, after: &str) -> bool {
    let last_word = before_period
        .rsplit(char::is_whitespace)
        .next()
        .unwrap_or("")
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();

    // "No. 5" is a number sign; "the answer is no." ends a sentence
    if last_word == "no" {
        return after.starts_with(|c: char| c.is_ascii_digit());
    }

    // Single capital initials ("J. Smith") also do not end a sentence
    ABBREVIATIONS.contains(&last_word.as_str())
        || (last_word.chars().count() == 1 && before_period.ends_with(char::is_uppercase))
}

/// Split a sentence into word tokens.
pub fn tokenize(sentence: &str) -> Vec<String> {
    word_token()
        .find_iter(sentence)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Reduce a word to a crude lemma: lowercase, no possessive, no regular plural.
pub fn lemmatize(word: &str) -> String {
    let mut lemma = word.replace('’', "'").to_lowercase();

    if let Some(stripped) = lemma.strip_suffix("'s") {
        lemma = stripped.to_string();
    }

    if lemma.len() > 4 && lemma.ends_with("ies") {
        lemma.truncate(lemma.len() - 3);
        lemma.push('y');
    } else if lemma.ends_with("sses") {
        lemma.truncate(lemma.len() - 2);
    } else if lemma.len() > 3
        && lemma.ends_with('s')
        && !(lemma.ends_with("ss") || lemma.ends_with("us") || lemma.ends_with("is"))
    {
        lemma.pop();
    }

    lemma
}

fn tag_token(text: String) -> Token {
    let lower = text.replace('’', "'").to_lowercase();
    let tag = classify(&lower);
    Token {
        lemma: lemmatize(&text),
        text,
        tag,
    }
}

fn classify(word: &str) -> PosTag {
    if word.chars().all(|c| c.is_ascii_digit()) {
        PosTag::Number
    } else if PASSIVE_AUXILIARIES.contains(&word) {
        PosTag::PassiveAuxiliary
    } else if AUXILIARIES.contains(&word) {
        PosTag::Auxiliary
    } else if PRONOUNS.contains(&word) {
        PosTag::Pronoun
    } else if SUBORDINATORS.contains(&word) {
        PosTag::Subordinator
    } else if ADVERBS.contains(&word) || (word.len() > 4 && word.ends_with("ly")) {
        PosTag::Adverb
    } else if is_past_participle(word) {
        PosTag::PastParticiple
    } else {
        PosTag::Word
    }
}

fn is_past_participle(word: &str) -> bool {
    IRREGULAR_PARTICIPLES.contains(&word)
        || (word.len() > 3 && word.ends_with("ed") && !ED_EXCEPTIONS.contains(&word))
}
