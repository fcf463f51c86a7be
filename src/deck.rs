// ============================================
// src/deck.rs
// 漢字データ (グループ / 漢字 / 例文) を管理するモジュール
// ============================================

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// バイナリに同梱するデータセット
const BUNDLED_DECK: &str = include_str!("../data/kanji.json");

/// 1つの読みにつき表示する例文の最大数
pub const MAX_EXAMPLES: usize = 2;

#[derive(Debug, Error)]
pub enum DeckError {
    #[error("failed to read deck file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse deck: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("deck contains no groups")]
    Empty,
    #[error("group \"{0}\" contains no characters")]
    EmptyGroup(String),
}

/// 音読み / 訓読み
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReadingSide {
    On,
    Kun,
}

/// 例文 (単語・読み・意味)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Example {
    pub word: String,
    pub reading: String,
    pub meaning: String,
}

/// 漢字1文字分のカード
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Kanji {
    pub kanji: String,
    /// 訓音 (例: "물가 정")
    #[serde(rename = "korean", default)]
    pub gloss: String,
    #[serde(rename = "ondoku", default)]
    pub on_reading: String,
    #[serde(rename = "kundoku", default)]
    pub kun_reading: String,
    #[serde(rename = "ondokuEx", default)]
    pub on_examples: Vec<Example>,
    #[serde(rename = "kundokuEx", default)]
    pub kun_examples: Vec<Example>,
}

impl Kanji {
    /// 読み (空なら "-")
    pub fn reading(&self, side: ReadingSide) -> &str {
        let reading = match side {
            ReadingSide::On => &self.on_reading,
            ReadingSide::Kun => &self.kun_reading,
        };
        if reading.is_empty() { "-" } else { reading }
    }

    /// 表示対象の例文 (先頭 MAX_EXAMPLES 件)
    pub fn examples(&self, side: ReadingSide) -> &[Example] {
        let all = match side {
            ReadingSide::On => &self.on_examples,
            ReadingSide::Kun => &self.kun_examples,
        };
        &all[..all.len().min(MAX_EXAMPLES)]
    }
}

/// 漢字グループ (例: "丁 계열")
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Group {
    #[serde(rename = "groupName")]
    pub name: String,
    pub characters: Vec<Kanji>,
}

/// データセット全体
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Deck {
    groups: Vec<Group>,
}

impl Deck {
    /// 同梱データを読み込む
    pub fn bundled() -> Result<Self, DeckError> {
        Self::from_json(BUNDLED_DECK)
    }

    /// 外部の JSON ファイルから読み込む
    pub fn from_path(path: &Path) -> Result<Self, DeckError> {
        let text = fs::read_to_string(path).map_err(|source| DeckError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let deck = Self::from_json(&text)?;
        tracing::info!(path = %path.display(), total = deck.total(), "loaded external deck");
        Ok(deck)
    }

    pub fn from_json(text: &str) -> Result<Self, DeckError> {
        let deck: Deck = serde_json::from_str(text)?;
        deck.validate()?;
        Ok(deck)
    }

    fn validate(&self) -> Result<(), DeckError> {
        if self.groups.is_empty() {
            return Err(DeckError::Empty);
        }
        if let Some(group) = self.groups.iter().find(|g| g.characters.is_empty()) {
            return Err(DeckError::EmptyGroup(group.name.clone()));
        }

        // 学習状態は漢字をキーにしているので、重複は同じ状態を共有する
        let mut seen = HashSet::new();
        for k in self.groups.iter().flat_map(|g| &g.characters) {
            if !seen.insert(k.kanji.as_str()) {
                tracing::warn!(kanji = %k.kanji, "duplicate kanji in deck");
            }
        }
        Ok(())
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn group(&self, index: usize) -> Option<&Group> {
        self.groups.get(index)
    }

    /// 全漢字数
    pub fn total(&self) -> usize {
        self.groups.iter().map(|g| g.characters.len()).sum()
    }

    /// 漢字の位置 (グループ番号, グループ内番号) を探す
    pub fn locate(&self, kanji: &str) -> Option<(usize, usize)> {
        self.groups.iter().enumerate().find_map(|(gi, g)| {
            g.characters
                .iter()
                .position(|k| k.kanji == kanji)
                .map(|ci| (gi, ci))
        })
    }

    pub fn contains(&self, kanji: &str) -> bool {
        self.locate(kanji).is_some()
    }
}
