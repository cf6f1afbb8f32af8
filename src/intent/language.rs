//! Best-effort language identification.
//!
//! The detector only needs a hint for the detection record, so a script
//! census with stop-word voting for Latin-script languages is enough.

use std::collections::HashMap;

use unicode_segmentation::UnicodeSegmentation;

use crate::error::{IntentError, Result};

/// Language identification capability.
pub trait LanguageDetector: Send + Sync {
    /// Return an ISO 639-1 code for `text`, or an error when unsure.
    fn detect(&self, text: &str) -> Result<String>;
}

const LATIN_STOP_WORDS: &[(&str, &[&str])] = &[
    (
        "en",
        &[
            "the", "is", "a", "an", "and", "of", "to", "for", "me", "what", "how", "my", "in",
            "please", "can", "you", "i", "find", "search", "create", "make", "hi", "hello",
        ],
    ),
    (
        "es",
        &[
            "el", "la", "los", "las", "de", "que", "y", "es", "un", "una", "para", "por", "buscar",
            "busca", "cómo", "qué", "hola", "crear", "imagen",
        ],
    ),
    (
        "fr",
        &[
            "le", "la", "les", "de", "des", "et", "est", "un", "une", "pour", "je", "moi",
            "cherche", "comment", "quoi", "bonjour", "créer", "une", "image",
        ],
    ),
    (
        "de",
        &[
            "der", "die", "das", "und", "ist", "ein", "eine", "für", "ich", "mir", "suche", "wie",
            "was", "hallo", "erstelle", "bild",
        ],
    ),
    (
        "pt",
        &[
            "o", "os", "as", "de", "que", "e", "é", "um", "uma", "para", "por", "pesquisar",
            "como", "olá", "criar", "imagem",
        ],
    ),
    (
        "it",
        &[
            "il", "lo", "gli", "di", "che", "e", "è", "un", "una", "per", "cerca", "come", "ciao",
            "crea", "immagine",
        ],
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Script {
    Latin,
    Kana,
    Hangul,
    Han,
    Cyrillic,
    Arabic,
    Devanagari,
    Thai,
    Greek,
    Hebrew,
}

impl Script {
    fn of(c: char) -> Option<Script> {
        let code = c as u32;
        let script = match code {
            0x3040..=0x30FF | 0x31F0..=0x31FF => Script::Kana,
            0xAC00..=0xD7AF | 0x1100..=0x11FF | 0x3130..=0x318F => Script::Hangul,
            0x4E00..=0x9FFF | 0x3400..=0x4DBF | 0xF900..=0xFAFF => Script::Han,
            0x0400..=0x04FF => Script::Cyrillic,
            0x0600..=0x06FF | 0x0750..=0x077F => Script::Arabic,
            0x0900..=0x097F => Script::Devanagari,
            0x0E00..=0x0E7F => Script::Thai,
            0x0370..=0x03FF => Script::Greek,
            0x0590..=0x05FF => Script::Hebrew,
            _ if c.is_alphabetic() && code < 0x0250 => Script::Latin,
            _ => return None,
        };
        Some(script)
    }

    fn language(&self) -> Option<&'static str> {
        match self {
            Script::Latin => None,
            Script::Kana => Some("ja"),
            Script::Hangul => Some("ko"),
            Script::Han => Some("zh"),
            Script::Cyrillic => Some("ru"),
            Script::Arabic => Some("ar"),
            Script::Devanagari => Some("hi"),
            Script::Thai => Some("th"),
            Script::Greek => Some("el"),
            Script::Hebrew => Some("he"),
        }
    }
}

/// Script census plus stop-word voting.
#[derive(Debug, Clone, Default)]
pub struct ScriptLanguageDetector;

impl ScriptLanguageDetector {
    pub fn new() -> Self {
        Self
    }

    fn vote_latin(text: &str) -> Option<&'static str> {
        let words: Vec<String> = text.unicode_words().map(|w| w.to_lowercase()).collect();
        let mut best: Option<(&'static str, usize)> = None;
        for &(language, stop_words) in LATIN_STOP_WORDS {
            let hits = words
                .iter()
                .filter(|w| stop_words.contains(&w.as_str()))
                .count();
            if hits == 0 {
                continue;
            }
            match best {
                Some((_, current)) if current >= hits => {}
                _ => best = Some((language, hits)),
            }
        }
        best.map(|(language, _)| language)
    }
}

impl LanguageDetector for ScriptLanguageDetector {
    fn detect(&self, text: &str) -> Result<String> {
        let mut census: HashMap<Script, usize> = HashMap::new();
        for script in text.chars().filter_map(Script::of) {
            *census.entry(script).or_default() += 1;
        }

        // Any kana means Japanese even when kanji dominate.
        if census.contains_key(&Script::Kana) {
            return Ok("ja".to_string());
        }

        let dominant = census
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.language().cmp(&a.0.language())))
            .map(|(script, _)| *script)
            .ok_or_else(|| IntentError::language("no letters to identify"))?;

        match dominant.language() {
            Some(language) => Ok(language.to_string()),
            None => Self::vote_latin(text)
                .map(str::to_string)
                .ok_or_else(|| IntentError::language("no stop words recognised")),
        }
    }
}
