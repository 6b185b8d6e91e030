use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use scene::{EntitySet, MapEntity};
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizKind {
    ClickName,
    TypeName,
    ClickCapital,
    TypeCapital,
    ClickFlag,
}

impl QuizKind {
    pub const ALL: [QuizKind; 5] = [
        QuizKind::ClickName,
        QuizKind::TypeName,
        QuizKind::ClickCapital,
        QuizKind::TypeCapital,
        QuizKind::ClickFlag,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            QuizKind::ClickName => "click_name",
            QuizKind::TypeName => "type_name",
            QuizKind::ClickCapital => "click_capital",
            QuizKind::TypeCapital => "type_capital",
            QuizKind::ClickFlag => "click_flag",
        }
    }

    /// Answered by typing text rather than clicking the map.
    pub fn is_typed(self) -> bool {
        matches!(self, QuizKind::TypeName | QuizKind::TypeCapital)
    }

    pub fn needs_capital(self) -> bool {
        matches!(self, QuizKind::ClickCapital | QuizKind::TypeCapital)
    }
}

impl fmt::Display for QuizKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownQuizKind(pub String);

impl fmt::Display for UnknownQuizKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown quiz kind {:?}", self.0)
    }
}

impl std::error::Error for UnknownQuizKind {}

impl FromStr for QuizKind {
    type Err = UnknownQuizKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QuizKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownQuizKind(s.to_string()))
    }
}

/// One question: what the player is shown and which entity answers it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub alpha3_code: String,
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizDeck {
    pub kind: QuizKind,
    pub questions: Vec<QuizQuestion>,
}

impl QuizDeck {
    /// Questions for every attributed entity listed in `visible`, in entity
    /// order. Territories are left out unless `include_territories`; capital
    /// quizzes skip entities without a capital.
    pub fn build(
        set: &EntitySet,
        visible: &[String],
        kind: QuizKind,
        include_territories: bool,
    ) -> Self {
        let visible: BTreeSet<&str> = visible.iter().map(String::as_str).collect();
        let questions = set
            .iter()
            .filter_map(|(_, entity)| {
                let attrs = entity.attributes.as_ref()?;
                if !visible.contains(attrs.alpha3_code.as_str()) {
                    return None;
                }
                if entity.is_territory() && !include_territories {
                    return None;
                }
                let capital = attrs.capital.as_deref().filter(|c| !c.trim().is_empty());
                if kind.needs_capital() && capital.is_none() {
                    return None;
                }
                // Typed-name questions highlight the entity; the prompt is its code.
                let prompt = match kind {
                    QuizKind::ClickName | QuizKind::TypeCapital => attrs.name.clone(),
                    QuizKind::TypeName => attrs.alpha3_code.clone(),
                    QuizKind::ClickCapital => capital.unwrap_or_default().to_string(),
                    QuizKind::ClickFlag => attrs.alpha2_code.to_lowercase(),
                };
                Some(QuizQuestion {
                    alpha3_code: attrs.alpha3_code.clone(),
                    prompt,
                })
            })
            .collect();
        Self { kind, questions }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// Lowercases, trims and collapses internal whitespace.
pub fn normalize_answer(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Whether `guess` answers a question about `entity`.
///
/// Click quizzes compare alpha-3 codes exactly. Typed quizzes compare the
/// normalized guess against the name and every alternate spelling, or
/// against the capital.
pub fn matches_answer(kind: QuizKind, entity: &MapEntity, guess: &str) -> bool {
    let Some(attrs) = entity.attributes.as_ref() else {
        return false;
    };
    if !kind.is_typed() {
        return guess == attrs.alpha3_code;
    }
    let guess_norm = normalize_answer(guess);
    if guess_norm.is_empty() {
        return false;
    }
    if kind.needs_capital() {
        return attrs
            .capital
            .as_deref()
            .is_some_and(|capital| normalize_answer(capital) == guess_norm);
    }
    std::iter::once(&attrs.name)
        .chain(attrs.alt_spellings.iter())
        .any(|candidate| normalize_answer(candidate) == guess_norm)
}
