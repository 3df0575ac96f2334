//! Built-in curriculum: level sets and sentence bank that make the service useful
//! without an external curriculum file.

use crate::domain::{CharacterMapping, LevelSet, SentenceBank};

fn kana(id: &str, glyph: &str, roms: &[&str], pron: &str) -> CharacterMapping {
  CharacterMapping::kana(id, glyph, roms, pron)
}

fn kanji(id: &str, glyph: &str, roms: &[&str], pron: &str, meanings: &[&str]) -> CharacterMapping {
  CharacterMapping::kanji(id, glyph, roms, pron, meanings)
}

pub fn seed_katakana() -> Vec<CharacterMapping> {
  vec![
    kana("ka_a", "ア", &["a"], "ah"),
    kana("ka_i", "イ", &["i"], "ee"),
    kana("ka_u", "ウ", &["u"], "oo"),
    kana("ka_e", "エ", &["e"], "eh"),
    kana("ka_o", "オ", &["o"], "oh"),
    kana("ka_ka", "カ", &["ka", "ca"], "kah"),
    kana("ka_ki", "キ", &["ki"], "kee"),
    kana("ka_ku", "ク", &["ku"], "koo"),
    kana("ka_ke", "ケ", &["ke"], "keh"),
    kana("ka_ko", "コ", &["ko", "co"], "koh"),
    kana("ka_sa", "サ", &["sa"], "sah"),
    kana("ka_shi", "シ", &["shi", "si"], "shee"),
    kana("ka_su", "ス", &["su"], "soo"),
    kana("ka_se", "セ", &["se"], "seh"),
    kana("ka_so", "ソ", &["so"], "soh"),
  ]
}

pub fn seed_hiragana() -> Vec<CharacterMapping> {
  vec![
    kana("hi_a", "あ", &["a"], "ah"),
    kana("hi_i", "い", &["i"], "ee"),
    kana("hi_u", "う", &["u"], "oo"),
    kana("hi_e", "え", &["e"], "eh"),
    kana("hi_o", "お", &["o"], "oh"),
    kana("hi_ka", "か", &["ka", "ca"], "kah"),
    kana("hi_ki", "き", &["ki"], "kee"),
    kana("hi_ku", "く", &["ku"], "koo"),
    kana("hi_ke", "け", &["ke"], "keh"),
    kana("hi_ko", "こ", &["ko", "co"], "koh"),
    kana("hi_ta", "た", &["ta"], "tah"),
    kana("hi_te", "て", &["te"], "teh"),
    kana("hi_to", "と", &["to"], "toh"),
    kana("hi_na", "な", &["na"], "nah"),
    kana("hi_no", "の", &["no"], "noh"),
  ]
}

pub fn seed_jlpt_n5() -> Vec<CharacterMapping> {
  vec![
    kanji("kanji_ichi", "一", &["ichi"], "ee-chee", &["one"]),
    kanji("kanji_ni", "二", &["ni"], "nee", &["two"]),
    kanji("kanji_san", "三", &["san"], "sahn", &["three"]),
    kanji("kanji_shi", "四", &["shi", "yon"], "shee", &["four"]),
    kanji("kanji_go", "五", &["go"], "goh", &["five"]),
    kanji("kanji_hito", "人", &["hito", "jin"], "hee-toh", &["person", "people"]),
    kanji("kanji_hi", "日", &["hi", "nichi"], "hee", &["day", "sun"]),
    kanji("kanji_tsuki", "月", &["tsuki", "getsu"], "tsoo-kee", &["moon", "month"]),
    kanji("kanji_yama", "山", &["yama", "san"], "yah-mah", &["mountain"]),
    kanji("kanji_kawa", "川", &["kawa"], "kah-wah", &["river"]),
    kanji("kanji_mizu", "水", &["mizu", "sui"], "mee-zoo", &["water"]),
    kanji("kanji_hi_fire", "火", &["hi", "ka"], "hee", &["fire"]),
    kanji("kanji_ki", "木", &["ki", "moku"], "kee", &["tree", "wood"]),
    kanji("kanji_ookii", "大", &["ookii", "dai"], "oh-kee", &["big", "large"]),
    kanji("kanji_chiisai", "小", &["chiisai", "shou"], "chee-sigh", &["small", "little"]),
  ]
}

pub fn seed_level_sets() -> Vec<LevelSet> {
  let katakana = seed_katakana();
  let hiragana = seed_hiragana();
  let practice: Vec<CharacterMapping> = katakana.iter().chain(hiragana.iter()).cloned().collect();
  vec![
    LevelSet {
      id: "katakana".into(),
      name: "Katakana".into(),
      description: "Learn katakana characters".into(),
      explanation: "Katakana is used for foreign words, onomatopoeia, and emphasis. Each character represents a syllable sound.".into(),
      character_mappings: katakana,
    },
    LevelSet {
      id: "hiragana".into(),
      name: "Hiragana".into(),
      description: "Learn hiragana characters".into(),
      explanation: "Hiragana is used for native Japanese words, grammatical particles, and verb endings. It's the foundation of Japanese writing.".into(),
      character_mappings: hiragana,
    },
    LevelSet {
      id: "practice".into(),
      name: "Practice".into(),
      description: "Mixed practice with longer sentences".into(),
      explanation: "Practice your skills with longer sentences using both katakana and hiragana characters randomly.".into(),
      character_mappings: practice,
    },
    LevelSet {
      id: "jlpt_n5".into(),
      name: "Kanji (JLPT N5)".into(),
      description: "JLPT N5 level kanji".into(),
      explanation: "Essential kanji for JLPT N5 level. These are the most basic kanji you should learn first.".into(),
      character_mappings: seed_jlpt_n5(),
    },
  ]
}

pub fn seed_sentence_bank() -> SentenceBank {
  let v = |s: &[&str]| s.iter().map(|x| x.to_string()).collect::<Vec<String>>();
  SentenceBank {
    short: v(&[
      "I have a cat",
      "This is fun",
      "She is happy",
      "We eat rice",
      "The sun is hot",
      "I like tea",
      "He can swim",
      "Look at the moon",
      "Open the door",
      "It is cold today",
      "My dog runs fast",
      "Kate bakes cake",
      "Take a seat",
      "The sky is blue",
      "Go to bed",
      "I see one bird",
      "I have two cats",
      "Three cups of tea",
      "Four books on a desk",
      "Five fish swim",
      "One person waits",
      "A big tree",
      "A small river",
      "Drink some water",
      "The fire is warm",
      "That mountain is tall",
      "Every day is new",
      "The moon is bright",
      "People sing songs",
      "A little cat sleeps",
      "A skunk smells bad",
      "The ship is big",
    ]),
    medium: v(&[
      "The kind teacher reads a book to the class",
      "Sometimes I walk to the station in the rain",
      "Our neighbor keeps a koi pond in the garden",
      "The tall tree near the river grows every year",
      "Please bring me some water from the kitchen",
      "We climbed the mountain before the sun rose",
      "Two people talked quietly by the fire",
      "Nobody knows the name of that tiny island",
    ]),
    long: v(&[
      "After school the children ran across the park to watch the boats sail on the river",
      "My grandmother tells stories about the big mountain village where she grew up",
      "On a clear night you can see the moon rise slowly above the quiet sea",
      "The small shop on the corner sells tea, cakes, and cold drinks every day of the week",
    ]),
  }
}
