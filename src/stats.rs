// ============================================
// src/stats.rs
// `stats` / `reset` サブコマンド (TUI を使わない出力)
// ============================================

use console::style;
use dialoguer::Confirm;

use crate::deck::Deck;
use crate::error::AppError;
use crate::save_data::{Progress, ProgressStore};
use crate::study::StudyState;

/// 進捗の集計をテキストにする
pub fn summary(deck: &Deck, progress: &Progress) -> Vec<String> {
    let state = StudyState::new(deck, progress.clone(), false);
    let mut lines = Vec::new();

    lines.push(format!(
        "{} / {} ({}%)",
        state.learned_count(),
        state.total(),
        state.percent()
    ));
    for (i, group) in deck.groups().iter().enumerate() {
        lines.push(format!(
            "{:>3}. {}  {} / {}",
            i + 1,
            group.name,
            state.group_learned_count(i),
            group.characters.len()
        ));
    }
    let last = match progress.updated_at {
        Some(t) => t.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => "-".to_string(),
    };
    lines.push(format!("last studied: {last}"));
    lines
}

pub fn print_stats(deck: &Deck, store: &ProgressStore) {
    let progress = store.load();
    let lines = summary(deck, &progress);

    println!("{}", style("Kanji Flip").bold().magenta());
    if let Some((head, rest)) = lines.split_first() {
        println!("{} {}", style("learned").dim(), style(head).yellow());
        for line in rest {
            println!("{line}");
        }
    }
    println!("{} {}", style("data").dim(), store.dir().display());
}

/// 進捗を削除する。`yes` でなければ確認する
pub fn reset(store: &ProgressStore, yes: bool) -> Result<bool, AppError> {
    let confirmed = yes
        || Confirm::new()
            .with_prompt("Erase all saved progress?")
            .default(false)
            .interact()?;

    if !confirmed {
        println!("{}", style("cancelled").dim());
        return Ok(false);
    }

    store.reset()?;
    tracing::info!(dir = %store.dir().display(), "progress reset");
    println!("{}", style("progress erased").green());
    Ok(true)
}
