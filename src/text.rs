//! Romanized-token → glyph substitution inside English sentences.
//!
//! Kanji are matched against their English translations on whole-word boundaries;
//! kana are matched against their romanizations anywhere, including mid-word
//! ("cat" → "cアt"). All kanji replacements run before any kana replacement so an
//! inserted kanji glyph is never rewritten by the kana pass. Longer tokens are
//! applied first in both passes.

use regex::{Regex, RegexBuilder};
use tracing::warn;

use crate::domain::CharacterMapping;

/// Matching policy for one token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Boundary {
  WholeWord,
  Anywhere,
}

fn build_pattern(token: &str, boundary: Boundary) -> Option<Regex> {
  if token.is_empty() {
    return None;
  }
  let escaped = regex::escape(token);
  let pattern = match boundary {
    Boundary::WholeWord => format!(r"\b{escaped}\b"),
    Boundary::Anywhere => escaped,
  };
  match RegexBuilder::new(&pattern).case_insensitive(true).build() {
    Ok(re) => Some(re),
    Err(e) => {
      warn!(target: "content", %token, error = %e, "Skipping unbuildable substitution pattern");
      None
    }
  }
}

/// (token, glyph) pairs sorted by descending token length; stable for equal lengths.
fn replacement_pairs<'a, F>(characters: &[&'a CharacterMapping], tokens: F) -> Vec<(&'a str, &'a str)>
where
  F: Fn(&'a CharacterMapping) -> &'a [String],
{
  let mut pairs: Vec<(&str, &str)> = characters
    .iter()
    .copied()
    .flat_map(|c| tokens(c).iter().map(move |t| (t.as_str(), c.character.as_str())))
    .collect();
  pairs.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
  pairs
}

fn apply(sentence: String, pairs: &[(&str, &str)], boundary: Boundary) -> String {
  pairs.iter().fold(sentence, |acc, (token, glyph)| match build_pattern(token, boundary) {
    Some(re) => re.replace_all(&acc, regex::NoExpand(glyph)).into_owned(),
    None => acc,
  })
}

/// Replace every romanized token of `characters` in `sentence` with its glyph.
pub fn substitute<'a, I>(sentence: &str, characters: I) -> String
where
  I: IntoIterator<Item = &'a CharacterMapping>,
{
  let (kanji, kana): (Vec<&CharacterMapping>, Vec<&CharacterMapping>) =
    characters.into_iter().partition(|c| c.is_kanji());

  let kanji_pairs = replacement_pairs(&kanji, |c| c.translations());
  let kana_pairs = replacement_pairs(&kana, |c| c.romanizations.as_slice());

  let after_kanji = apply(sentence.to_string(), &kanji_pairs, Boundary::WholeWord);
  apply(after_kanji, &kana_pairs, Boundary::Anywhere)
}

/// Whether `sentence` carries any target token, using the same matching policy as
/// [`substitute`]: translations on word boundaries for kanji, romanizations anywhere otherwise.
pub fn contains_target(sentence: &str, romanizations: &[String], is_kanji: bool, translations: Option<&[String]>) -> bool {
  let (targets, boundary) = if is_kanji {
    (translations.unwrap_or(&[]), Boundary::WholeWord)
  } else {
    (romanizations, Boundary::Anywhere)
  };
  targets
    .iter()
    .filter_map(|t| build_pattern(t, boundary))
    .any(|re| re.is_match(sentence))
}

/// [`contains_target`] for a whole mapping.
pub fn mentions(sentence: &str, character: &CharacterMapping) -> bool {
  contains_target(sentence, &character.romanizations, character.is_kanji(), character.translations.as_deref())
}
