// ============================================
// src/main.rs (メインファイル)
// ============================================

use std::io::stdout;
use std::time::Duration;

mod cli;
mod deck;
mod error;
mod keys;
mod logging;
mod save_data;
mod stats;
mod study;
mod ui;

use clap::Parser;
use cli::{Cli, Command, Config};
use deck::Deck;
use error::AppError;
use keys::{Action, action_for};
use save_data::{Progress, ProgressStore};
use study::StudyState;

use crossterm::{
    ExecutableCommand,
    cursor::{Hide, Show},
    event::{self, Event},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;

// --------------------------------------------------
// メイン関数
// --------------------------------------------------

fn main() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = cli.config();

    // guard はプロセス終了まで保持する (ログの書き出し用)。失敗してもログ無しで続行
    let _log_guard = logging::init(&config.data_dir);
    tracing::info!(?config, "starting kanjiflip");

    let deck = load_deck(&config)?;
    let store = ProgressStore::new(&config.data_dir);

    match cli.command {
        Some(Command::Stats) => stats::print_stats(&deck, &store),
        Some(Command::Reset { yes }) => {
            stats::reset(&store, yes)?;
        }
        Some(Command::Study) | None => study(&deck, &store, &config)?,
    }
    Ok(())
}

fn load_deck(config: &Config) -> Result<Deck, AppError> {
    let deck = match &config.deck_path {
        Some(path) => Deck::from_path(path)?,
        None => Deck::bundled()?,
    };
    tracing::info!(
        groups = deck.groups().len(),
        total = deck.total(),
        "deck loaded"
    );
    Ok(deck)
}

/// 学習画面を開く
fn study(deck: &Deck, store: &ProgressStore, config: &Config) -> Result<(), AppError> {
    let mut app_state = StudyState::new(deck, store.load(), config.wrap);
    if let Some(layout) = config.layout {
        app_state.set_layout(layout);
    }
    if config.light {
        app_state.set_dark_mode(false);
    }

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &mut app_state, store);
    // エラーでも端末は元に戻す
    restore_terminal()?;
    result?;

    // 終了時にも保存しておく
    if let Err(e) = store.save(&app_state.progress()) {
        tracing::warn!("failed to save progress on exit: {e}");
    }
    tracing::info!(
        learned = app_state.learned_count(),
        total = app_state.total(),
        "session finished"
    );
    Ok(())
}

// --------------------------------------------------
// TUIセットアップと実行ループ
// --------------------------------------------------

fn setup_terminal() -> std::io::Result<Terminal<impl Backend>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?; // 代替スクリーンを使用
    stdout().execute(Hide)?; // カーソルを非表示
    let backend = CrosstermBackend::new(stdout());
    Terminal::new(backend)
}

fn restore_terminal() -> std::io::Result<()> {
    stdout().execute(Show)?; // カーソルを再表示
    stdout().execute(LeaveAlternateScreen)?; // 代替スクリーンを終了
    disable_raw_mode()?;
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<impl Backend>,
    app_state: &mut StudyState,
    store: &ProgressStore,
) -> std::io::Result<()> {
    let mut rng = rand::rng();
    let mut saved: Progress = app_state.progress();

    loop {
        terminal.draw(|f| ui::ui(f, app_state))?;

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        let Some(action) = action_for(key, app_state.group_list_cursor().is_some()) else {
            continue;
        };
        if action == Action::Quit {
            break;
        }

        app_state.apply(action, &mut rng);
        autosave(store, &mut saved, app_state);
    }

    Ok(())
}

/// 保存対象が前回から変わっていれば丸ごと保存する。保存を試みたら true
fn autosave(store: &ProgressStore, saved: &mut Progress, app_state: &StudyState) -> bool {
    let current = app_state.progress();
    if current == *saved {
        return false;
    }
    if let Err(e) = store.save(&current) {
        tracing::warn!("failed to save progress: {e}");
    }
    *saved = current;
    true
}
