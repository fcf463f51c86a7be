// ============================================
// src/logging.rs
// ログ設定 (画面は TUI が使うのでファイルに書き出す)
// ============================================

use std::fs;
use std::path::Path;

use console::style;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

const LOG_FILE: &str = "kanjiflip.log";

/// `dir/kanjiflip.log` への書き込み口を作る
fn open_writer(dir: &Path) -> Result<(NonBlocking, WorkerGuard), AppError> {
    fs::create_dir_all(dir)?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE)
        .build(dir)
        .map_err(|e| AppError::Logging(e.to_string()))?;
    Ok(tracing_appender::non_blocking(appender))
}

fn try_init(dir: &Path) -> Result<WorkerGuard, AppError> {
    let (writer, guard) = open_writer(dir)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| AppError::Logging(e.to_string()))?;

    Ok(guard)
}

/// ロガーを初期化する。失敗してもアプリは続行し、ログ無しで動く。
/// 返り値の guard はプロセス終了まで保持すること
pub fn init(dir: &Path) -> Option<WorkerGuard> {
    match try_init(dir) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!(
                "{} {} ({})",
                style("warning:").yellow().bold(),
                style("logging disabled").yellow(),
                e
            );
            None
        }
    }
}
