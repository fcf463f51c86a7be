// ============================================
// src/study.rs
// 学習画面の状態管理 (ナビゲーション・学習済み・読みの表示)
// ============================================

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::deck::{Deck, Group, Kanji, ReadingSide};
use crate::keys::Action;
use crate::save_data::Progress;

/// カードの表示形式
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum CardLayout {
    /// 表 (漢字のみ) / 裏 (詳細) を切り替える
    #[default]
    Flip,
    /// 漢字と詳細を左右に並べる
    Split,
}

impl CardLayout {
    pub fn toggled(self) -> Self {
        match self {
            CardLayout::Flip => CardLayout::Split,
            CardLayout::Split => CardLayout::Flip,
        }
    }
}

/// 例文の読み (ルビ) の表示キー
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RevealKey {
    pub side: ReadingSide,
    pub index: usize,
}

/// 学習画面全体の状態を管理する
pub struct StudyState<'a> {
    deck: &'a Deck,
    group: usize,
    character: usize,

    /// カードが裏返っているか
    flipped: bool,
    /// 漢字 -> 覚えたかどうか
    learned: BTreeMap<String, bool>,
    /// 読みを表示中の例文
    revealed: BTreeSet<RevealKey>,

    dark_mode: bool,
    layout: CardLayout,

    /// グループ一覧を開いている場合、そのカーソル位置
    group_list: Option<usize>,
    /// 最後の漢字の次を最初に戻すか
    wrap: bool,
}

impl<'a> StudyState<'a> {
    /// 保存済みの進捗から状態を復元する
    pub fn new(deck: &'a Deck, progress: Progress, wrap: bool) -> Self {
        let last_group = deck.groups().len().saturating_sub(1);
        let group = progress.group.min(last_group);
        let last_char = deck
            .group(group)
            .map_or(0, |g| g.characters.len().saturating_sub(1));
        let character = progress.character.min(last_char);

        if group != progress.group || character != progress.character {
            tracing::warn!(
                saved_group = progress.group,
                saved_char = progress.character,
                group,
                character,
                "saved position out of range, clamped"
            );
        }

        Self {
            deck,
            group,
            character,
            flipped: false,
            learned: progress.learned,
            revealed: BTreeSet::new(),
            dark_mode: progress.dark_mode,
            layout: progress.layout,
            group_list: None,
            wrap,
        }
    }

    /// 永続化するフィールドのスナップショット
    pub fn progress(&self) -> Progress {
        Progress {
            group: self.group,
            character: self.character,
            learned: self.learned.clone(),
            dark_mode: self.dark_mode,
            layout: self.layout,
            updated_at: None,
        }
    }

    // --------------------------------------------------
    // 参照系
    // --------------------------------------------------

    pub fn deck(&self) -> &'a Deck {
        self.deck
    }

    pub fn group_index(&self) -> usize {
        self.group
    }

    pub fn char_index(&self) -> usize {
        self.character
    }

    pub fn current_group(&self) -> &'a Group {
        &self.deck.groups()[self.group]
    }

    pub fn current_kanji(&self) -> &'a Kanji {
        &self.current_group().characters[self.character]
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn is_dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn layout(&self) -> CardLayout {
        self.layout
    }

    pub fn group_list_cursor(&self) -> Option<usize> {
        self.group_list
    }

    pub fn is_learned(&self, kanji: &str) -> bool {
        self.learned.get(kanji).copied().unwrap_or(false)
    }

    pub fn is_revealed(&self, side: ReadingSide, index: usize) -> bool {
        self.revealed.contains(&RevealKey { side, index })
    }

    /// 覚えた漢字の数 (デッキに存在するものだけ数える)
    pub fn learned_count(&self) -> usize {
        self.learned
            .iter()
            .filter(|(kanji, learned)| **learned && self.deck.contains(kanji))
            .count()
    }

    pub fn group_learned_count(&self, group: usize) -> usize {
        self.deck.group(group).map_or(0, |g| {
            g.characters
                .iter()
                .filter(|k| self.is_learned(&k.kanji))
                .count()
        })
    }

    pub fn total(&self) -> usize {
        self.deck.total()
    }

    /// 進捗率 (%, 四捨五入)
    pub fn percent(&self) -> u16 {
        percent(self.learned_count(), self.total())
    }

    fn is_first(&self) -> bool {
        self.group == 0 && self.character == 0
    }

    fn is_last(&self) -> bool {
        self.group + 1 == self.deck.groups().len()
            && self.character + 1 == self.current_group().characters.len()
    }

    pub fn can_go_prev(&self) -> bool {
        !self.is_first() || (self.wrap && self.total() > 1)
    }

    pub fn can_go_next(&self) -> bool {
        !self.is_last() || (self.wrap && self.total() > 1)
    }

    pub fn has_prev_group(&self) -> bool {
        self.group > 0
    }

    pub fn has_next_group(&self) -> bool {
        self.group + 1 < self.deck.groups().len()
    }

    // --------------------------------------------------
    // 操作系
    // --------------------------------------------------

    /// カードを表に戻し、読みの表示をリセットする
    fn reset_card(&mut self) {
        self.flipped = false;
        self.revealed.clear();
    }

    /// 次の漢字へ (グループの最後なら次のグループの先頭へ)
    pub fn next_char(&mut self) {
        if self.character + 1 < self.current_group().characters.len() {
            self.character += 1;
        } else if self.has_next_group() {
            self.group += 1;
            self.character = 0;
        } else if self.wrap {
            self.group = 0;
            self.character = 0;
        }
        self.reset_card();
    }

    /// 前の漢字へ (グループの先頭なら前のグループの最後へ)
    pub fn prev_char(&mut self) {
        if self.character > 0 {
            self.character -= 1;
        } else if self.has_prev_group() {
            self.group -= 1;
            self.character = self.current_group().characters.len() - 1;
        } else if self.wrap {
            self.group = self.deck.groups().len() - 1;
            self.character = self.current_group().characters.len() - 1;
        }
        self.reset_card();
    }

    /// グループ内の漢字を直接選ぶ
    pub fn select_char(&mut self, index: usize) -> bool {
        if index >= self.current_group().characters.len() {
            return false;
        }
        self.character = index;
        self.reset_card();
        true
    }

    /// グループを選ぶ (先頭の漢字から)
    pub fn select_group(&mut self, index: usize) -> bool {
        if index >= self.deck.groups().len() {
            return false;
        }
        self.group = index;
        self.character = 0;
        self.group_list = None;
        self.reset_card();
        tracing::debug!(group = index, "group selected");
        true
    }

    pub fn prev_group(&mut self) {
        if self.has_prev_group() {
            self.select_group(self.group - 1);
        }
    }

    pub fn next_group(&mut self) {
        if self.has_next_group() {
            self.select_group(self.group + 1);
        }
    }

    pub fn flip(&mut self) {
        self.flipped = !self.flipped;
    }

    /// 現在の漢字の「覚えた」を切り替える
    pub fn toggle_learned(&mut self) {
        let kanji = self.current_kanji().kanji.clone();
        let learned = !self.is_learned(&kanji);
        tracing::debug!(%kanji, learned, "learned toggled");
        self.learned.insert(kanji, learned);
    }

    /// 例文の読みの表示を切り替える (裏面に表示中の例文のみ)
    pub fn toggle_reveal(&mut self, side: ReadingSide, index: usize) -> bool {
        if !self.flipped || index >= self.current_kanji().examples(side).len() {
            return false;
        }
        let key = RevealKey { side, index };
        if !self.revealed.remove(&key) {
            self.revealed.insert(key);
        }
        true
    }

    pub fn toggle_dark_mode(&mut self) {
        self.dark_mode = !self.dark_mode;
    }

    pub fn toggle_layout(&mut self) {
        self.layout = self.layout.toggled();
    }

    pub fn set_layout(&mut self, layout: CardLayout) {
        self.layout = layout;
    }

    pub fn set_dark_mode(&mut self, dark_mode: bool) {
        self.dark_mode = dark_mode;
    }

    /// グループ一覧の開閉 (開いたときのカーソルは現在のグループ)
    pub fn toggle_group_list(&mut self) {
        self.group_list = match self.group_list {
            Some(_) => None,
            None => Some(self.group),
        };
    }

    pub fn list_up(&mut self) {
        if let Some(cursor) = self.group_list.as_mut() {
            *cursor = cursor.saturating_sub(1);
        }
    }

    pub fn list_down(&mut self) {
        let last = self.deck.groups().len().saturating_sub(1);
        if let Some(cursor) = self.group_list.as_mut() {
            *cursor = (*cursor + 1).min(last);
        }
    }

    pub fn list_confirm(&mut self) {
        if let Some(cursor) = self.group_list {
            self.select_group(cursor);
        }
    }

    /// まだ覚えていない漢字 (現在以外) にランダムで移動する
    pub fn jump_to_random_unlearned<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        let current = (self.group, self.character);
        let state = &*self;
        let candidates: Vec<(usize, usize)> = self
            .deck
            .groups()
            .iter()
            .enumerate()
            .flat_map(|(gi, g)| {
                g.characters
                    .iter()
                    .enumerate()
                    .filter(move |(_, k)| !state.is_learned(&k.kanji))
                    .map(move |(ci, _)| (gi, ci))
            })
            .filter(|&pos| pos != current)
            .collect();

        let Some(&(group, character)) = candidates.choose(rng) else {
            return false;
        };
        self.group = group;
        self.character = character;
        self.reset_card();
        true
    }

    /// キー操作を状態に反映する
    pub fn apply<R: Rng + ?Sized>(&mut self, action: Action, rng: &mut R) {
        match action {
            Action::Quit => {}
            Action::NextChar => self.next_char(),
            Action::PrevChar => self.prev_char(),
            Action::NextGroup => self.next_group(),
            Action::PrevGroup => self.prev_group(),
            Action::Flip => self.flip(),
            Action::ToggleLearned => self.toggle_learned(),
            Action::Reveal(side, index) => {
                self.toggle_reveal(side, index);
            }
            Action::SelectChar(index) => {
                self.select_char(index);
            }
            Action::ToggleGroupList => self.toggle_group_list(),
            Action::ListUp => self.list_up(),
            Action::ListDown => self.list_down(),
            Action::ListConfirm => self.list_confirm(),
            Action::ToggleDarkMode => self.toggle_dark_mode(),
            Action::ToggleLayout => self.toggle_layout(),
            Action::RandomUnlearned => {
                self.jump_to_random_unlearned(rng);
            }
        }
    }
}

/// learned / total を四捨五入した百分率に
pub fn percent(learned: usize, total: usize) -> u16 {
    if total == 0 {
        return 0;
    }
    ((learned as f64 / total as f64) * 100.0).round() as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::tests::sample_deck;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn position(state: &StudyState) -> (usize, usize) {
        (state.group_index(), state.char_index())
    }

    #[test]
    fn next_char_crosses_groups_and_stops_at_end() {
        let deck = sample_deck();
        let mut state = StudyState::new(&deck, Progress::default(), false);

        state.next_char();
        state.next_char();
        assert_eq!(position(&state), (0, 2));
        state.next_char();
        assert_eq!(position(&state), (1, 0));
        state.next_char();
        assert_eq!(position(&state), (1, 1));
        assert!(!state.can_go_next());
        state.next_char();
        assert_eq!(position(&state), (1, 1));
    }

    #[test]
    fn prev_char_lands_on_last_of_previous_group() {
        let deck = sample_deck();
        let progress = Progress {
            group: 1,
            ..Progress::default()
        };
        let mut state = StudyState::new(&deck, progress, false);

        state.prev_char();
        assert_eq!(position(&state), (0, 2));
        state.select_char(0);
        assert!(!state.can_go_prev());
        state.prev_char();
        assert_eq!(position(&state), (0, 0));
    }

    #[test]
    fn wrap_cycles_both_directions() {
        let deck = sample_deck();
        let mut state = StudyState::new(&deck, Progress::default(), true);

        assert!(state.can_go_prev());
        state.prev_char();
        assert_eq!(position(&state), (1, 1));
        state.next_char();
        assert_eq!(position(&state), (0, 0));
    }

    #[test]
    fn navigation_resets_card() {
        let deck = sample_deck();
        let mut state = StudyState::new(&deck, Progress::default(), false);

        state.flip();
        assert!(state.toggle_reveal(ReadingSide::On, 0));
        assert!(state.is_flipped());
        assert!(state.is_revealed(ReadingSide::On, 0));

        state.next_char();
        assert!(!state.is_flipped());
        assert!(!state.is_revealed(ReadingSide::On, 0));
    }

    #[test]
    fn reveal_only_for_displayed_examples() {
        let deck = sample_deck();
        let mut state = StudyState::new(&deck, Progress::default(), false);

        // 表面では例文が見えないので切り替えない
        assert!(!state.toggle_reveal(ReadingSide::Kun, 0));
        assert!(!state.is_revealed(ReadingSide::Kun, 0));

        state.flip();
        assert!(!state.toggle_reveal(ReadingSide::On, 1));
        assert!(state.toggle_reveal(ReadingSide::Kun, 0));
        assert!(state.is_revealed(ReadingSide::Kun, 0));
        assert!(state.toggle_reveal(ReadingSide::Kun, 0));
        assert!(!state.is_revealed(ReadingSide::Kun, 0));
    }

    #[test]
    fn split_layout_reveals_only_after_flip() {
        let deck = sample_deck();
        let progress = Progress {
            layout: CardLayout::Split,
            ..Progress::default()
        };
        let mut state = StudyState::new(&deck, progress, false);
        let mut rng = StdRng::seed_from_u64(3);

        state.apply(Action::Reveal(ReadingSide::On, 0), &mut rng);
        assert!(!state.is_revealed(ReadingSide::On, 0));

        state.apply(Action::Flip, &mut rng);
        state.apply(Action::Reveal(ReadingSide::On, 0), &mut rng);
        assert!(state.is_revealed(ReadingSide::On, 0));
    }

    #[test]
    fn restore_clamps_out_of_range_position() {
        let deck = sample_deck();
        let progress = Progress {
            group: 7,
            character: 9,
            ..Progress::default()
        };
        let state = StudyState::new(&deck, progress, false);
        assert_eq!(position(&state), (1, 1));
        assert_eq!(state.current_kanji().kanji, "箕");
    }

    #[test]
    fn learned_toggle_and_percent() {
        let deck = sample_deck();
        let mut state = StudyState::new(&deck, Progress::default(), false);

        state.toggle_learned();
        assert!(state.is_learned("汀"));
        assert_eq!(state.learned_count(), 1);
        assert_eq!(state.percent(), 20);

        state.toggle_learned();
        assert!(!state.is_learned("汀"));
        assert_eq!(state.learned_count(), 0);
        // false のエントリも進捗に残る
        assert_eq!(state.progress().learned.get("汀"), Some(&false));
    }

    #[test]
    fn learned_count_ignores_unknown_kanji() {
        let deck = sample_deck();
        let mut progress = Progress::default();
        progress.learned.insert("猫".to_string(), true);
        progress.learned.insert("其".to_string(), true);
        let state = StudyState::new(&deck, progress, false);

        assert_eq!(state.learned_count(), 1);
        assert_eq!(state.group_learned_count(1), 1);
        assert_eq!(state.group_learned_count(0), 0);
    }

    #[test]
    fn percent_rounds() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 8), 13);
    }

    #[test]
    fn group_navigation_only_within_bounds() {
        let deck = sample_deck();
        let mut state = StudyState::new(&deck, Progress::default(), false);

        state.select_char(2);
        state.prev_group();
        assert_eq!(position(&state), (0, 2));
        state.next_group();
        assert_eq!(position(&state), (1, 0));
        state.next_group();
        assert_eq!(position(&state), (1, 0));
        assert!(!state.select_group(5));
        assert!(!state.select_char(5));
    }

    #[test]
    fn group_list_selects_with_cursor() {
        let deck = sample_deck();
        let mut state = StudyState::new(&deck, Progress::default(), false);

        state.toggle_group_list();
        assert_eq!(state.group_list_cursor(), Some(0));
        state.list_up();
        assert_eq!(state.group_list_cursor(), Some(0));
        state.list_down();
        state.list_down();
        assert_eq!(state.group_list_cursor(), Some(1));
        state.list_confirm();
        assert_eq!(state.group_list_cursor(), None);
        assert_eq!(position(&state), (1, 0));
    }

    #[test]
    fn random_jump_picks_unlearned() {
        let deck = sample_deck();
        let mut progress = Progress::default();
        for k in ["汀", "釘", "酊", "其"] {
            progress.learned.insert(k.to_string(), true);
        }
        let mut state = StudyState::new(&deck, progress, false);
        let mut rng = StdRng::seed_from_u64(7);

        assert!(state.jump_to_random_unlearned(&mut rng));
        assert_eq!(state.current_kanji().kanji, "箕");
        // 現在地以外に候補が無い
        assert!(!state.jump_to_random_unlearned(&mut rng));
    }

    #[test]
    fn progress_snapshot_round_trips_through_new() {
        let deck = sample_deck();
        let mut state = StudyState::new(&deck, Progress::default(), false);
        state.next_group();
        state.select_char(1);
        state.toggle_learned();
        state.toggle_dark_mode();
        state.toggle_layout();

        let snapshot = state.progress();
        let restored = StudyState::new(&deck, snapshot.clone(), false);
        assert_eq!(restored.progress(), snapshot);
        assert_eq!(restored.layout(), CardLayout::Split);
        assert!(!restored.is_dark_mode());
    }

    #[test]
    fn apply_dispatches_actions() {
        let deck = sample_deck();
        let mut state = StudyState::new(&deck, Progress::default(), false);
        let mut rng = StdRng::seed_from_u64(1);

        state.apply(Action::SelectChar(1), &mut rng);
        state.apply(Action::Flip, &mut rng);
        assert_eq!(position(&state), (0, 1));
        assert!(state.is_flipped());
        state.apply(Action::ToggleLearned, &mut rng);
        assert!(state.is_learned("釘"));
        state.apply(Action::NextGroup, &mut rng);
        assert_eq!(position(&state), (1, 0));
        state.apply(Action::Quit, &mut rng);
        assert_eq!(position(&state), (1, 0));
    }
}
