//! Drill questions for a single character and weighted spaced-repetition review.
//!
//! Kanji flip a fair coin between a meaning question and a romanization question,
//! each carrying the complementary fact as hint. Kana always get a romanization
//! question without a hint. A question is only produced when its accepted-answer
//! list is non-empty.

use rand::distributions::WeightedIndex;
use rand::prelude::*;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{CharacterMapping, Question, QuestionKind};

/// Characters introduced this many levels ago or fewer get the review boost.
const RECENT_LEVEL_WINDOW: usize = 5;
const RECENT_BOOST: f64 = 1.5;

fn question_id(kind: QuestionKind, character_id: &str) -> String {
  format!("{}-{}-{}", kind.as_str(), character_id, Uuid::new_v4().simple())
}

/// Build a question of the given kind, or `None` when the character lacks the answers for it.
pub fn question_for(character: &CharacterMapping, kind: QuestionKind) -> Option<Question> {
  let (answers, hint) = match kind {
    QuestionKind::CharacterToMeaning => (character.translations(), Some(character.romanizations.join(" / "))),
    QuestionKind::CharacterToRomanization => {
      let hint = if character.is_kanji() && !character.translations().is_empty() {
        Some(character.translations().join(" / "))
      } else {
        None
      };
      (character.romanizations.as_slice(), hint)
    }
  };
  if answers.is_empty() {
    return None;
  }
  Some(Question {
    id: question_id(kind, &character.id),
    kind,
    prompt: character.character.clone(),
    accepted_answers: answers.to_vec(),
    character_id: character.id.clone(),
    hint_text: hint,
  })
}

/// Kanji with translations: 50/50 meaning vs romanization. Everything else: romanization.
pub fn pick_kind<R: Rng + ?Sized>(character: &CharacterMapping, rng: &mut R) -> QuestionKind {
  if character.is_kanji() && !character.translations().is_empty() && rng.gen_bool(0.5) {
    QuestionKind::CharacterToMeaning
  } else {
    QuestionKind::CharacterToRomanization
  }
}

/// Questions introducing `character`: exactly one for kanji, at most `min(count, 1)` for kana.
pub fn current_character_questions<R: Rng + ?Sized>(character: &CharacterMapping, count: usize, rng: &mut R) -> Vec<Question> {
  if character.is_kanji() && !character.translations().is_empty() {
    let kind = pick_kind(character, rng);
    return question_for(character, kind).into_iter().collect();
  }
  if count == 0 {
    return Vec::new();
  }
  question_for(character, QuestionKind::CharacterToRomanization)
    .into_iter()
    .collect()
}

/// Review weight per character, oldest first.
///
/// Position `i` (0 = oldest) has recency `i + 1` and weight `2^(recency / n)`,
/// times 1.5 when it was introduced within the last five levels.
pub fn spaced_repetition_weights(character_count: usize, current_level_index: usize) -> Vec<f64> {
  let n = character_count as f64;
  (0..character_count)
    .map(|i| {
      let recency = (i + 1) as f64;
      let base = 2f64.powf(recency / n);
      let levels_since = current_level_index.saturating_sub(i);
      if levels_since <= RECENT_LEVEL_WINDOW { base * RECENT_BOOST } else { base }
    })
    .collect()
}

/// Draw up to `count` distinct review questions from `previous` (unlock order).
///
/// Sampling is weighted towards recent characters and gives up after `3 * count`
/// draws, so a small pool may yield fewer questions than requested.
pub fn spaced_repetition_questions<R: Rng + ?Sized>(
  previous: &[CharacterMapping],
  count: usize,
  current_level_index: usize,
  rng: &mut R,
) -> Vec<Question> {
  if previous.is_empty() || count == 0 {
    return Vec::new();
  }
  let weights = spaced_repetition_weights(previous.len(), current_level_index);
  let Ok(dist) = WeightedIndex::new(&weights) else {
    return Vec::new();
  };

  let mut questions = Vec::with_capacity(count);
  let mut chosen: Vec<&str> = Vec::with_capacity(count);
  let max_attempts = count * 3;
  let mut attempts = 0;

  while questions.len() < count && attempts < max_attempts {
    attempts += 1;
    let character = &previous[dist.sample(rng)];
    if chosen.contains(&character.id.as_str()) {
      continue;
    }
    chosen.push(&character.id);
    let kind = pick_kind(character, rng);
    if let Some(q) = question_for(character, kind) {
      questions.push(q);
    }
  }

  debug!(target: "content", requested = count, produced = questions.len(), attempts, "Spaced repetition draw");
  questions
}

/// Questions for the current character plus review questions, shuffled.
pub fn generate_level_questions<R: Rng + ?Sized>(
  current: Option<&CharacterMapping>,
  previous: &[CharacterMapping],
  current_level_index: usize,
  question_count: usize,
  review_count: usize,
  rng: &mut R,
) -> Vec<Question> {
  let mut questions = Vec::new();
  if let Some(c) = current {
    if question_count > 0 {
      questions.extend(current_character_questions(c, question_count, rng));
    }
  }
  questions.extend(spaced_repetition_questions(previous, review_count, current_level_index, rng));
  questions.shuffle(rng);
  questions
}

pub fn question_feedback(question: &Question, is_correct: bool) -> String {
  if is_correct {
    return "Correct!".into();
  }
  let expected = question.accepted_answers.join(" / ");
  match question.kind {
    QuestionKind::CharacterToRomanization => format!("Correct romanization: {expected}"),
    QuestionKind::CharacterToMeaning => format!("Correct meaning: {expected}"),
  }
}
