// ============================================
// src/keys.rs
// キー入力 -> 操作 (Action) の対応表
// ============================================

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::deck::ReadingSide;

/// 学習画面で行える操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    NextChar,
    PrevChar,
    NextGroup,
    PrevGroup,
    Flip,
    ToggleLearned,
    /// 例文の読みの表示切り替え
    Reveal(ReadingSide, usize),
    /// グループ内の漢字を番号で選ぶ (0 始まり)
    SelectChar(usize),
    ToggleGroupList,
    ListUp,
    ListDown,
    ListConfirm,
    ToggleDarkMode,
    ToggleLayout,
    RandomUnlearned,
}

/// 例文の読みを表示するキー (音読み / 訓読み の順に 1 番目, 2 番目)
const REVEAL_KEYS: [(ReadingSide, [char; 2]); 2] = [
    (ReadingSide::On, ['a', 's']),
    (ReadingSide::Kun, ['z', 'x']),
];

/// 例文 `index` 番目の読みを表示するキー
pub fn reveal_key(side: ReadingSide, index: usize) -> Option<char> {
    REVEAL_KEYS
        .iter()
        .find(|(s, _)| *s == side)
        .and_then(|(_, keys)| keys.get(index).copied())
}

fn reveal_target(c: char) -> Option<(ReadingSide, usize)> {
    REVEAL_KEYS.iter().find_map(|(side, keys)| {
        keys.iter().position(|&k| k == c).map(|index| (*side, index))
    })
}

/// キーイベントを操作に変換する。`group_list_open` のときは一覧操作を優先する
pub fn action_for(key: KeyEvent, group_list_open: bool) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        // Ctrl+C でも終了できるように
        return match key.code {
            KeyCode::Char('c') => Some(Action::Quit),
            _ => None,
        };
    }

    if group_list_open {
        return match key.code {
            KeyCode::Up | KeyCode::Char('k') => Some(Action::ListUp),
            KeyCode::Down | KeyCode::Char('j') => Some(Action::ListDown),
            KeyCode::Enter => Some(Action::ListConfirm),
            KeyCode::Esc | KeyCode::Char('g') => Some(Action::ToggleGroupList),
            KeyCode::Char('q') => Some(Action::Quit),
            _ => None,
        };
    }

    if let KeyCode::Char(c) = key.code {
        if let Some((side, index)) = reveal_target(c) {
            return Some(Action::Reveal(side, index));
        }
    }

    let action = match key.code {
        KeyCode::Esc | KeyCode::Char('q') => Action::Quit,
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('n') => Action::NextChar,
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('p') => Action::PrevChar,
        KeyCode::Char(']') => Action::NextGroup,
        KeyCode::Char('[') => Action::PrevGroup,
        KeyCode::Char(' ') => Action::Flip,
        KeyCode::Enter | KeyCode::Char('m') => Action::ToggleLearned,
        KeyCode::Char('g') => Action::ToggleGroupList,
        KeyCode::Char('t') => Action::ToggleDarkMode,
        KeyCode::Tab => Action::ToggleLayout,
        KeyCode::Char('r') => Action::RandomUnlearned,
        KeyCode::Char(c @ '1'..='9') => Action::SelectChar(c as usize - '1' as usize),
        _ => return None,
    };
    Some(action)
}
