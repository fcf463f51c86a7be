// ============================================
// src/cli.rs
// コマンドライン引数と起動設定
// ============================================

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::save_data::ProgressStore;
use crate::study::CardLayout;

#[derive(Debug, Parser)]
#[command(name = "kanjiflip", version, about = "Kanji flip cards in the terminal.")]
pub struct Cli {
    /// 同梱データの代わりに使う JSON データセット
    #[arg(long, value_name = "PATH", global = true)]
    pub deck: Option<PathBuf>,

    /// 進捗とログの保存先
    #[arg(long, value_name = "PATH", global = true)]
    pub data_dir: Option<PathBuf>,

    /// カードの表示形式 (保存済みの設定より優先)
    #[arg(long, value_enum, global = true)]
    pub layout: Option<CardLayout>,

    /// ライトモードで起動する
    #[arg(long, global = true)]
    pub light: bool,

    /// 最後の漢字の次を最初に戻す
    #[arg(long, global = true)]
    pub wrap: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// 学習画面を開く (デフォルト)
    Study,
    /// 進捗の集計を表示する
    Stats,
    /// 保存済みの進捗を削除する
    Reset {
        /// 確認せずに削除する
        #[arg(short, long)]
        yes: bool,
    },
}

/// 引数を解決した起動設定
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub deck_path: Option<PathBuf>,
    pub data_dir: PathBuf,
    pub layout: Option<CardLayout>,
    pub light: bool,
    pub wrap: bool,
}

impl Cli {
    pub fn config(&self) -> Config {
        Config {
            deck_path: self.deck.clone(),
            data_dir: self
                .data_dir
                .clone()
                .unwrap_or_else(ProgressStore::default_dir),
            layout: self.layout,
            light: self.light,
            wrap: self.wrap,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_study() {
        let cli = Cli::parse_from(["kanjiflip"]);
        assert!(cli.command.is_none());
        let config = cli.config();
        assert_eq!(config.layout, None);
        assert!(!config.light);
        assert!(!config.wrap);
    }

    #[test]
    fn parses_options_and_subcommands() {
        let cli = Cli::parse_from([
            "kanjiflip",
            "--layout",
            "split",
            "--light",
            "--wrap",
            "--data-dir",
            "/tmp/kf",
            "reset",
            "--yes",
        ]);
        let config = cli.config();
        assert_eq!(config.layout, Some(CardLayout::Split));
        assert!(config.light && config.wrap);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/kf"));
        assert!(matches!(cli.command, Some(Command::Reset { yes: true })));
    }

    #[test]
    fn global_options_after_subcommand() {
        let cli = Cli::parse_from(["kanjiflip", "stats", "--deck", "my.json"]);
        assert!(matches!(cli.command, Some(Command::Stats)));
        assert_eq!(cli.deck, Some(PathBuf::from("my.json")));
    }

    #[test]
    fn study_options_after_study_subcommand() {
        let cli = Cli::parse_from(["kanjiflip", "study", "--wrap", "--layout", "split", "--light"]);
        assert!(matches!(cli.command, Some(Command::Study)));
        let config = cli.config();
        assert!(config.wrap);
        assert!(config.light);
        assert_eq!(config.layout, Some(CardLayout::Split));
    }

    #[test]
    fn rejects_unknown_layout() {
        assert!(Cli::try_parse_from(["kanjiflip", "--layout", "grid"]).is_err());
    }

    #[test]
    fn command_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
