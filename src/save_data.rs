// ============================================
// src/save_data.rs
// 学習進捗の構造と読み書きロジック
// ============================================

use bincode::config::standard;
use bincode::{Decode, Encode};
use chrono::{DateTime, TimeZone, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::study::CardLayout;

const SAVE_FILE_BIN: &str = "progress.bin";
const SAVE_FILE_JSON: &str = "progress.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode progress: {0}")]
    Encode(#[from] bincode::error::EncodeError),
    #[error("failed to decode progress: {0}")]
    Decode(#[from] bincode::error::DecodeError),
    #[error("failed to (de)serialize progress json: {0}")]
    Json(#[from] serde_json::Error),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn default_dark_mode() -> bool {
    true
}

/// 学習の進行状況データ (丸ごと保存・丸ごと復元する)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// 現在のグループ番号
    #[serde(default)]
    pub group: usize,
    /// グループ内の現在の漢字番号
    #[serde(rename = "char", default)]
    pub character: usize,
    /// 漢字 -> 覚えたかどうか
    #[serde(default)]
    pub learned: BTreeMap<String, bool>,
    #[serde(default = "default_dark_mode")]
    pub dark_mode: bool,
    #[serde(default)]
    pub layout: CardLayout,
    /// 最終保存時刻
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for Progress {
    /// 進捗データの初期値
    fn default() -> Self {
        Self {
            group: 0,
            character: 0,
            learned: BTreeMap::new(),
            dark_mode: true,
            layout: CardLayout::default(),
            updated_at: None,
        }
    }
}

/// bincode用の内部表現（DateTimeをi64に変換）
#[derive(Encode, Decode)]
struct ProgressBin {
    group: u64,
    character: u64,
    learned: BTreeMap<String, bool>,
    dark_mode: bool,
    layout: u8,
    updated_at_secs: Option<i64>,
}

impl From<&Progress> for ProgressBin {
    fn from(p: &Progress) -> Self {
        Self {
            group: p.group as u64,
            character: p.character as u64,
            learned: p.learned.clone(),
            dark_mode: p.dark_mode,
            layout: match p.layout {
                CardLayout::Flip => 0,
                CardLayout::Split => 1,
            },
            updated_at_secs: p.updated_at.map(|t| t.timestamp()),
        }
    }
}

impl From<ProgressBin> for Progress {
    fn from(bin: ProgressBin) -> Self {
        Self {
            group: usize::try_from(bin.group).unwrap_or(usize::MAX),
            character: usize::try_from(bin.character).unwrap_or(usize::MAX),
            learned: bin.learned,
            dark_mode: bin.dark_mode,
            layout: if bin.layout == 1 {
                CardLayout::Split
            } else {
                CardLayout::Flip
            },
            updated_at: bin
                .updated_at_secs
                .and_then(|secs| Utc.timestamp_opt(secs, 0).single()),
        }
    }
}

/// 進捗ファイルの置き場所
#[derive(Debug, Clone)]
pub struct ProgressStore {
    dir: PathBuf,
}

impl ProgressStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    // MARK:OSごとのデータ保存用ディレクトリを取得する関数
    pub fn default_dir() -> PathBuf {
        if let Some(proj_dirs) = ProjectDirs::from("jp", "Fukumoto0141", "KANJI_FLIP") {
            return proj_dirs.data_dir().to_path_buf();
        }
        // 取得できなかったらカレントディレクトリに（フォールバック）
        PathBuf::from(".")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn bin_path(&self) -> PathBuf {
        self.dir.join(SAVE_FILE_BIN)
    }

    pub fn json_path(&self) -> PathBuf {
        self.dir.join(SAVE_FILE_JSON)
    }

    /// MARK:進捗をファイルに保存する (バイナリ + JSON)
    pub fn save(&self, progress: &Progress) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(io_error(&self.dir))?;

        let mut stamped = progress.clone();
        stamped.updated_at = Some(Utc::now());

        // --- 1. バイナリ形式で保存 (本番用) ---
        let bin_path = self.bin_path();
        let encoded = bincode::encode_to_vec(ProgressBin::from(&stamped), standard())?;
        let file = File::create(&bin_path).map_err(io_error(&bin_path))?;
        let mut writer = BufWriter::new(file);
        writer.write_all(&encoded).map_err(io_error(&bin_path))?;
        writer.flush().map_err(io_error(&bin_path))?;

        // --- 2. JSON形式で保存 (閲覧・移行用) ---
        let json_path = self.json_path();
        let json = serde_json::to_string_pretty(&stamped)?;
        fs::write(&json_path, json).map_err(io_error(&json_path))?;

        tracing::debug!(
            group = stamped.group,
            character = stamped.character,
            learned = stamped.learned.len(),
            "progress saved"
        );
        Ok(())
    }

    /// バイナリ -> JSON の順に読み込みを試す。どちらも無ければ None
    pub fn try_load(&self) -> Result<Option<Progress>, StoreError> {
        let bin_path = self.bin_path();
        if bin_path.exists() {
            match self.load_bin(&bin_path) {
                Ok(progress) => return Ok(Some(progress)),
                Err(e) => tracing::warn!("binary progress unreadable, trying json: {e}"),
            }
        }

        let json_path = self.json_path();
        if json_path.exists() {
            let file = File::open(&json_path).map_err(io_error(&json_path))?;
            let progress = serde_json::from_reader(BufReader::new(file))?;
            return Ok(Some(progress));
        }

        Ok(None)
    }

    fn load_bin(&self, path: &Path) -> Result<Progress, StoreError> {
        let buffer = fs::read(path).map_err(io_error(path))?;
        let (bin, _) = bincode::decode_from_slice::<ProgressBin, _>(&buffer, standard())?;
        Ok(Progress::from(bin))
    }

    /// MARK:ファイルから進捗を読み込む (失敗時はデフォルト)
    pub fn load(&self) -> Progress {
        match self.try_load() {
            Ok(Some(progress)) => {
                tracing::info!(dir = %self.dir.display(), "progress restored");
                progress
            }
            Ok(None) => {
                tracing::info!(dir = %self.dir.display(), "no saved progress, starting fresh");
                Progress::default()
            }
            Err(e) => {
                tracing::warn!("failed to load progress, using defaults: {e}");
                Progress::default()
            }
        }
    }

    /// 保存済みの進捗を削除する
    pub fn reset(&self) -> Result<(), StoreError> {
        for path in [self.bin_path(), self.json_path()] {
            if path.exists() {
                fs::remove_file(&path).map_err(io_error(&path))?;
                tracing::info!(path = %path.display(), "progress file removed");
            }
        }
        Ok(())
    }
}
