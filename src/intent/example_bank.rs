//! Intent example bank.
//!
//! Labeled reference phrases used by the embedding classifier. Labels are
//! plain strings so that feedback for a label the resolver does not know yet
//! can still be recorded.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{IntentError, Result};
use crate::intent::category::IntentCategory;

const WEB_SEARCH_EXAMPLES: &[&str] = &[
    "search for the latest news",
    "look up information about climate change",
    "what is the capital of australia",
    "find information about electric cars",
    "tell me about the history of rome",
    "busca las últimas noticias",
    "recherche des informations sur la tour eiffel",
    "suche nach aktuellen nachrichten",
    "pesquisar notícias de hoje",
    "搜索最新新闻",
    "最新のニュースを検索して",
];

const LOCAL_SEARCH_EXAMPLES: &[&str] = &[
    "find restaurants near me",
    "coffee shops nearby",
    "where is the closest pharmacy",
    "hotels in my area",
    "restaurantes cerca de mí",
    "restaurants près de chez moi",
    "restaurants in der nähe",
    "farmácias perto de mim",
    "附近的餐厅",
    "近くのレストランを探して",
];

const IMAGE_GENERATION_EXAMPLES: &[&str] = &[
    "create an image of a sunset",
    "generate a picture of a cat",
    "draw an image of a mountain landscape",
    "make a logo for my bakery",
    "crea una imagen de un perro",
    "génère une image d'un château",
    "erstelle ein bild von einem hund",
    "crie uma imagem de uma praia",
    "生成一张猫的图片",
    "猫の画像を作成して",
];

const PUPPETEER_EXAMPLES: &[&str] = &[
    "navigate to example.com",
    "take a screenshot of the website",
    "open the website github.com",
    "browse to the news page",
    "click on the login button",
    "navega a example.com",
    "ouvre le site example.com",
    "öffne die webseite example.com",
    "abra o site example.com",
    "打开网站 example.com",
    "ウェブサイトを開いて",
];

const SOCIAL_MEDIA_EXAMPLES: &[&str] = &[
    "write a post for instagram",
    "create a tweet about our product launch",
    "draft a linkedin update",
    "schedule a facebook post",
    "escribe una publicación para instagram",
    "écris un post pour linkedin",
    "schreibe einen beitrag für instagram",
    "escreva um post para o facebook",
    "写一条微博",
    "インスタグラムの投稿を書いて",
];

const CALCULATION_EXAMPLES: &[&str] = &[
    "what is 10 plus 10",
    "calculate 15 times 3",
    "what is the square root of 144",
    "compute 2 to the power of 8",
    "cuánto es 5 por 7",
    "combien font 8 fois 9",
    "was ist 12 geteilt durch 4",
    "quanto é 6 vezes 7",
    "计算 5 加 3",
    "10たす10はいくつ",
];

const CONVERSATION_EXAMPLES: &[&str] = &[
    "hello",
    "hi there",
    "how are you",
    "good morning",
    "thank you",
    "hola, ¿qué tal?",
    "bonjour, ça va",
    "hallo, wie geht's",
    "olá, tudo bem",
    "你好",
    "こんにちは",
];

const GENERAL_KNOWLEDGE_EXAMPLES: &[&str] = &[
    "explain how photosynthesis works",
    "why is the sky blue",
    "what causes earthquakes",
    "explica cómo funciona la fotosíntesis",
    "pourquoi le ciel est bleu",
    "warum ist der himmel blau",
    "por que o céu é azul",
    "为什么天空是蓝色的",
    "空はなぜ青いのですか",
];

/// Labeled example phrases, keyed by label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntentExampleBank {
    examples: BTreeMap<String, Vec<String>>,
}

impl Default for IntentExampleBank {
    /// The built-in multilingual examples.
    fn default() -> Self {
        let tables: [(IntentCategory, &[&str]); 8] = [
            (IntentCategory::WebSearch, WEB_SEARCH_EXAMPLES),
            (IntentCategory::LocalSearch, LOCAL_SEARCH_EXAMPLES),
            (IntentCategory::Puppeteer, PUPPETEER_EXAMPLES),
            (IntentCategory::ImageGeneration, IMAGE_GENERATION_EXAMPLES),
            (IntentCategory::SocialMedia, SOCIAL_MEDIA_EXAMPLES),
            (IntentCategory::Calculation, CALCULATION_EXAMPLES),
            (IntentCategory::Conversation, CONVERSATION_EXAMPLES),
            (IntentCategory::GeneralKnowledge, GENERAL_KNOWLEDGE_EXAMPLES),
        ];

        let examples = tables
            .into_iter()
            .map(|(category, phrases)| {
                (
                    category.as_str().to_string(),
                    phrases.iter().map(|p| p.to_string()).collect(),
                )
            })
            .collect();

        Self { examples }
    }
}

impl IntentExampleBank {
    /// An empty bank.
    pub fn empty() -> Self {
        Self {
            examples: BTreeMap::new(),
        }
    }

    /// Load a `{"label": ["example", ...]}` file, replacing the built-in set.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let bank: IntentExampleBank = serde_json::from_str(&content)
            .with_context(|| format!("parsing example bank {}", path.as_ref().display()))?;
        if bank.total_examples() == 0 {
            return Err(IntentError::invalid_config(format!(
                "example bank {} has no examples",
                path.as_ref().display()
            )));
        }
        Ok(bank)
    }

    /// Append examples to a label, creating the label if needed.
    ///
    /// Blank phrases are skipped. Returns how many were added.
    pub fn add_examples<S: AsRef<str>>(&mut self, label: &str, examples: &[S]) -> usize {
        let entry = self.examples.entry(label.to_string()).or_default();
        let before = entry.len();
        entry.extend(
            examples
                .iter()
                .map(|e| e.as_ref().trim())
                .filter(|e| !e.is_empty())
                .map(str::to_string),
        );
        entry.len() - before
    }

    pub fn examples(&self, label: &str) -> Option<&[String]> {
        self.examples.get(label).map(Vec::as_slice)
    }

    /// Every label, sorted.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.examples.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.examples
            .iter()
            .map(|(label, examples)| (label.as_str(), examples.as_slice()))
    }

    pub fn total_examples(&self) -> usize {
        self.examples.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_default_bank_covers_every_category() {
        let bank = IntentExampleBank::default();
        for category in IntentCategory::ALL {
            let examples = bank.examples(category.as_str()).unwrap();
            assert!(!examples.is_empty(), "{category} has no examples");
        }
    }

    #[test]
    fn test_add_examples_creates_unknown_labels() {
        let mut bank = IntentExampleBank::empty();
        assert_eq!(bank.add_examples("weather", &["will it rain", "  ", ""]), 1);
        assert_eq!(bank.examples("weather").unwrap(), ["will it rain".to_string()]);
        assert_eq!(bank.add_examples("weather", &["forecast for tomorrow"]), 1);
        assert_eq!(bank.total_examples(), 2);
    }

    #[test]
    fn test_load_from_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"web_search": ["search for rust"], "custom": ["a", "b"]}}"#
        )
        .unwrap();

        let bank = IntentExampleBank::from_json_file(file.path()).unwrap();
        assert_eq!(bank.labels().collect::<Vec<_>>(), vec!["custom", "web_search"]);
        assert_eq!(bank.total_examples(), 3);
    }

    #[test]
    fn test_malformed_json_file_names_the_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"web_search": "not a list"}}"#).unwrap();

        let error = IntentExampleBank::from_json_file(file.path()).unwrap_err();
        assert!(matches!(error, IntentError::Anyhow(_)));
        assert!(error.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_empty_json_file_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{}}").unwrap();
        assert!(matches!(
            IntentExampleBank::from_json_file(file.path()),
            Err(IntentError::InvalidConfig(_))
        ));
    }
}
