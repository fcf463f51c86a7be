// ============================================
// src/error.rs
// アプリ全体のエラー
// ============================================

use thiserror::Error;

use crate::deck::DeckError;
use crate::save_data::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Deck(#[from] DeckError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("terminal error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to set up logging: {0}")]
    Logging(String),
    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),
}
