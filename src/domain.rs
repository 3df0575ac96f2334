//! Domain models used by the engine: character mappings, level sets, the sentence bank,
//! questions and the content items handed to the presentation layer.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Id prefix marking a kanji-family mapping.
pub const KANJI_PREFIX: &str = "kanji_";

/// Script family of a mapping, derived from its id prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptFamily {
  Kana,
  Kanji,
}

/// One learnable grapheme.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterMapping {
  pub id: String,
  pub character: String,
  /// Accepted Latin spellings, first entry is the canonical one.
  pub romanizations: Vec<String>,
  pub pronunciation: String,
  /// English meanings; only kanji carry them.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub translations: Option<Vec<String>>,
}

impl CharacterMapping {
  pub fn kana(id: &str, character: &str, romanizations: &[&str], pronunciation: &str) -> Self {
    Self {
      id: id.into(),
      character: character.into(),
      romanizations: romanizations.iter().map(|r| r.to_string()).collect(),
      pronunciation: pronunciation.into(),
      translations: None,
    }
  }

  pub fn kanji(id: &str, character: &str, romanizations: &[&str], pronunciation: &str, translations: &[&str]) -> Self {
    Self {
      translations: Some(translations.iter().map(|t| t.to_string()).collect()),
      ..Self::kana(id, character, romanizations, pronunciation)
    }
  }

  pub fn family(&self) -> ScriptFamily {
    if self.id.starts_with(KANJI_PREFIX) { ScriptFamily::Kanji } else { ScriptFamily::Kana }
  }

  pub fn is_kanji(&self) -> bool {
    self.family() == ScriptFamily::Kanji
  }

  /// Translations as a slice, empty when absent.
  pub fn translations(&self) -> &[String] {
    self.translations.as_deref().unwrap_or(&[])
  }
}

/// An ordered curriculum unit. Array position of a character is its unlock order.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelSet {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub explanation: String,
  #[serde(default, alias = "characters")]
  pub character_mappings: Vec<CharacterMapping>,
}

/// Length bucket of the sentence bank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentenceLength {
  Short,
  Medium,
  Long,
}

impl SentenceLength {
  pub const ALL: [SentenceLength; 3] = [SentenceLength::Short, SentenceLength::Medium, SentenceLength::Long];
}

/// Static corpus of English sentences, bucketed by length.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SentenceBank {
  #[serde(default)] pub short: Vec<String>,
  #[serde(default)] pub medium: Vec<String>,
  #[serde(default)] pub long: Vec<String>,
}

impl SentenceBank {
  pub fn bucket(&self, length: SentenceLength) -> &[String] {
    match length {
      SentenceLength::Short => &self.short,
      SentenceLength::Medium => &self.medium,
      SentenceLength::Long => &self.long,
    }
  }

  pub fn len(&self) -> usize {
    self.short.len() + self.medium.len() + self.long.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

/// What a question asks the learner to produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKind {
  CharacterToRomanization,
  CharacterToMeaning,
}

impl QuestionKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      QuestionKind::CharacterToRomanization => "character-to-romanization",
      QuestionKind::CharacterToMeaning => "character-to-meaning",
    }
  }
}

/// A drill question for one character.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
  pub id: String,
  pub kind: QuestionKind,
  pub prompt: String,
  pub accepted_answers: Vec<String>,
  pub character_id: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub hint_text: Option<String>,
}

impl Question {
  /// Case- and edge-whitespace-insensitive match against any accepted answer.
  pub fn accepts(&self, answer: &str) -> bool {
    let normalized = crate::util::normalize_answer(answer);
    self.accepted_answers.iter().any(|a| crate::util::normalize_answer(a) == normalized)
  }
}

/// One presentable exercise.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentItem {
  Sentence {
    id: String,
    #[serde(rename = "displayText")]
    display_text: String,
    #[serde(rename = "originalText")]
    original_text: String,
  },
  Question {
    id: String,
    #[serde(rename = "displayText")]
    display_text: String,
    #[serde(rename = "acceptedAnswers")]
    accepted_answers: Vec<String>,
    #[serde(rename = "characterId")]
    character_id: String,
    #[serde(rename = "hintText", default, skip_serializing_if = "Option::is_none")]
    hint_text: Option<String>,
  },
}

impl ContentItem {
  pub fn from_question(question: Question, id: String) -> Self {
    ContentItem::Question {
      id,
      display_text: question.prompt,
      accepted_answers: question.accepted_answers,
      character_id: question.character_id,
      hint_text: question.hint_text,
    }
  }

  pub fn id(&self) -> &str {
    match self {
      ContentItem::Sentence { id, .. } | ContentItem::Question { id, .. } => id,
    }
  }

  pub fn display_text(&self) -> &str {
    match self {
      ContentItem::Sentence { display_text, .. } | ContentItem::Question { display_text, .. } => display_text,
    }
  }

  pub fn character_id(&self) -> Option<&str> {
    match self {
      ContentItem::Sentence { .. } => None,
      ContentItem::Question { character_id, .. } => Some(character_id),
    }
  }

  pub fn is_sentence(&self) -> bool {
    matches!(self, ContentItem::Sentence { .. })
  }
}

/// Outcome of checking a learner's answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
  pub is_correct: bool,
  pub expected: String,
  pub provided: String,
  pub feedback: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackType {
  Success,
  Error,
  #[default]
  Info,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelProgress {
  pub completed: usize,
  pub total: usize,
  pub level_name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelSetProgress {
  pub completed: usize,
  pub total: usize,
  pub set_name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallProgress {
  pub completed: usize,
  pub total: usize,
}

/// Read projection of the session state for progress bars.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressInfo {
  pub current_level_progress: LevelProgress,
  pub level_set_progress: LevelSetProgress,
  pub overall_progress: OverallProgress,
}

/// Insertion-ordered set of ids: the order answers "most recent", the set answers membership.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct OrderedIdSet {
  order: Vec<String>,
  members: HashSet<String>,
}

impl OrderedIdSet {
  pub fn new() -> Self {
    Self::default()
  }

  /// Append `id` unless present. Returns whether it was added.
  pub fn insert(&mut self, id: impl Into<String>) -> bool {
    let id = id.into();
    if self.members.contains(&id) {
      return false;
    }
    self.members.insert(id.clone());
    self.order.push(id);
    true
  }

  pub fn contains(&self, id: &str) -> bool {
    self.members.contains(id)
  }

  pub fn len(&self) -> usize {
    self.order.len()
  }

  pub fn is_empty(&self) -> bool {
    self.order.is_empty()
  }

  /// Ids in insertion order.
  pub fn iter(&self) -> impl Iterator<Item = &str> {
    self.order.iter().map(String::as_str)
  }

  pub fn to_vec(&self) -> Vec<String> {
    self.order.clone()
  }
}

impl PartialEq for OrderedIdSet {
  fn eq(&self, other: &Self) -> bool {
    self.order == other.order
  }
}

impl Eq for OrderedIdSet {}

impl<S: Into<String>> FromIterator<S> for OrderedIdSet {
  fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
    let mut set = OrderedIdSet::new();
    for id in iter {
      set.insert(id);
    }
    set
  }
}

impl From<Vec<String>> for OrderedIdSet {
  fn from(ids: Vec<String>) -> Self {
    ids.into_iter().collect()
  }
}

impl From<OrderedIdSet> for Vec<String> {
  fn from(set: OrderedIdSet) -> Self {
    set.order
  }
}
