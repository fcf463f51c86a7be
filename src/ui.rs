// ============================================
// src/ui.rs
// 学習画面の描画
// ============================================

use ratatui::{
    prelude::*,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph},
};

use crate::deck::{Kanji, ReadingSide};
use crate::keys::reveal_key;
use crate::study::{CardLayout, StudyState};

// 共通のアクセント色
const ACCENT: Color = Color::Rgb(255, 47, 255);
const ON_COLOR: Color = Color::Rgb(255, 255, 51);
const KUN_COLOR: Color = Color::Rgb(51, 255, 102);
const LEARNED_COLOR: Color = Color::Rgb(16, 185, 129);
const PROGRESS_COLOR: Color = Color::Rgb(245, 158, 11);

/// ダーク / ライトの配色
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub muted: Color,
    pub faint: Color,
    pub card: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            bg: Color::Rgb(15, 23, 42),
            fg: Color::Rgb(241, 245, 249),
            muted: Color::Rgb(100, 116, 139),
            faint: Color::Rgb(51, 65, 85),
            card: Color::Rgb(30, 41, 59),
        }
    }

    pub fn light() -> Self {
        Self {
            bg: Color::Rgb(241, 245, 249),
            fg: Color::Rgb(30, 41, 59),
            muted: Color::Rgb(100, 116, 139),
            faint: Color::Rgb(203, 213, 225),
            card: Color::White,
        }
    }

    pub fn for_mode(dark_mode: bool) -> Self {
        if dark_mode { Self::dark() } else { Self::light() }
    }
}

pub fn ui(f: &mut Frame, state: &StudyState) {
    let theme = Theme::for_mode(state.is_dark_mode());
    let size = f.area();

    // 枠線を描画
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Kanji Flip ")
        .style(Style::default().bg(theme.bg).fg(theme.fg))
        .border_style(Style::default().fg(theme.faint));
    let inner_area = block.inner(size);
    f.render_widget(block, size);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // [0] ヘッダー
            Constraint::Length(1), // [1] 進捗ゲージ
            Constraint::Length(1), // [2] グループ切り替え
            Constraint::Length(1), // [3] 漢字タブ
            Constraint::Min(6),    // [4] カード
            Constraint::Length(1), // [5] ボタン
            Constraint::Length(1), // [6] ヒント
            Constraint::Length(1), // [7] 位置ドット
        ])
        .split(inner_area);

    render_header(f, chunks[0], state, theme);
    render_progress(f, chunks[1], state, theme);
    render_group_nav(f, chunks[2], state, theme);
    render_tabs(f, chunks[3], state, theme);
    render_card(f, chunks[4], state, theme);
    render_buttons(f, chunks[5], state, theme);
    render_hints(f, chunks[6], theme);
    render_dots(f, chunks[7], state, theme);

    // グループ一覧はカードの上に重ねる
    if let Some(cursor) = state.group_list_cursor() {
        render_group_list(f, chunks[4], state, cursor, theme);
    }
}

fn render_header(f: &mut Frame, area: Rect, state: &StudyState, theme: Theme) {
    let cols = Layout::horizontal([Constraint::Min(0), Constraint::Length(8)]).split(area);

    let summary = format!(
        "  {} groups · {} kanji",
        state.deck().groups().len(),
        state.total()
    );
    let title = Line::from(vec![
        Span::styled("常用漢字外 Flip", Style::default().fg(theme.fg).bold()),
        Span::styled(summary, Style::default().fg(theme.muted)),
    ]);
    f.render_widget(Paragraph::new(title), cols[0]);

    let mode = if state.is_dark_mode() { "[dark]" } else { "[light]" };
    f.render_widget(
        Paragraph::new(mode)
            .style(Style::default().fg(PROGRESS_COLOR))
            .right_aligned(),
        cols[1],
    );
}

fn render_progress(f: &mut Frame, area: Rect, state: &StudyState, theme: Theme) {
    let learned = state.learned_count();
    let total = state.total();
    let ratio = if total > 0 {
        (learned as f64 / total as f64).min(1.0)
    } else {
        0.0
    };

    let label = format!("{} / {} ({}%)", learned, total, state.percent());
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(LEARNED_COLOR).bg(theme.card))
        .ratio(ratio)
        .label(Span::styled(label, Style::default().fg(PROGRESS_COLOR)));
    f.render_widget(gauge, area);
}

fn render_group_nav(f: &mut Frame, area: Rect, state: &StudyState, theme: Theme) {
    let arrow = |enabled: bool| {
        if enabled {
            Style::default().fg(theme.muted)
        } else {
            Style::default().fg(theme.faint)
        }
    };

    let label = format!(
        "  {} ({}/{})  ",
        state.current_group().name,
        state.group_index() + 1,
        state.deck().groups().len()
    );
    let line = Line::from(vec![
        Span::styled("◀ ", arrow(state.has_prev_group())),
        Span::styled(label, Style::default().fg(Color::White).bg(ACCENT).bold()),
        Span::styled(" ▶", arrow(state.has_next_group())),
    ]);
    f.render_widget(Paragraph::new(line).centered(), area);
}

fn render_tabs(f: &mut Frame, area: Rect, state: &StudyState, theme: Theme) {
    let mut spans = Vec::new();
    for (i, k) in state.current_group().characters.iter().enumerate() {
        let mark = if state.is_learned(&k.kanji) { "✓" } else { " " };
        let style = if i == state.char_index() {
            Style::default().fg(Color::White).bg(ACCENT).bold()
        } else {
            Style::default().fg(theme.muted)
        };
        spans.push(Span::styled(format!("{}{}", i + 1, k.kanji), style));
        spans.push(Span::styled(
            format!("{mark} "),
            Style::default().fg(LEARNED_COLOR),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)).centered(), area);
}

fn card_block(theme: Theme) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.faint))
        .style(Style::default().bg(theme.card).fg(theme.fg))
}

fn render_card(f: &mut Frame, area: Rect, state: &StudyState, theme: Theme) {
    match state.layout() {
        CardLayout::Flip => {
            if state.is_flipped() {
                render_back(f, area, state, theme);
            } else {
                render_front(f, area, state.current_kanji(), theme);
            }
        }
        CardLayout::Split => {
            let cols = Layout::horizontal([Constraint::Percentage(35), Constraint::Percentage(65)])
                .split(area);
            render_front(f, cols[0], state.current_kanji(), theme);
            if state.is_flipped() {
                render_back(f, cols[1], state, theme);
            } else {
                let block = card_block(theme);
                let inner = block.inner(cols[1]);
                f.render_widget(block, cols[1]);
                f.render_widget(
                    Paragraph::new(vertical_center(
                        vec![Line::from("space: show details")],
                        inner.height,
                    ))
                    .style(Style::default().fg(theme.muted))
                    .centered(),
                    inner,
                );
            }
        }
    }
}

/// 行を縦方向の中央に寄せる
fn vertical_center(lines: Vec<Line<'_>>, height: u16) -> Vec<Line<'_>> {
    let pad = (height as usize).saturating_sub(lines.len()) / 2;
    let mut out = vec![Line::default(); pad];
    out.extend(lines);
    out
}

/// 表面 (漢字のみ)
fn render_front(f: &mut Frame, area: Rect, kanji: &Kanji, theme: Theme) {
    let block = card_block(theme);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines = vec![Line::from(Span::styled(
        kanji.kanji.as_str(),
        Style::default().fg(theme.fg).add_modifier(Modifier::BOLD),
    ))];
    f.render_widget(
        Paragraph::new(vertical_center(lines, inner.height)).centered(),
        inner,
    );
}

/// 裏面 (訓音・音読み / 訓読みと例文)
fn render_back(f: &mut Frame, area: Rect, state: &StudyState, theme: Theme) {
    let kanji = state.current_kanji();
    let block = card_block(theme);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::vertical([
        Constraint::Length(2), // 漢字 + 訓音
        Constraint::Min(0),    // 音読み / 訓読み
        Constraint::Length(1), // ヒント
    ])
    .split(inner);

    let head = vec![
        Line::from(Span::styled(
            kanji.kanji.as_str(),
            Style::default().fg(theme.fg).bold(),
        )),
        Line::from(Span::styled(kanji.gloss.as_str(), Style::default().fg(ACCENT))),
    ];
    f.render_widget(Paragraph::new(head).centered(), rows[0]);

    let cols = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
        .spacing(1)
        .split(rows[1]);
    render_reading_column(f, cols[0], state, ReadingSide::On, theme);
    render_reading_column(f, cols[1], state, ReadingSide::Kun, theme);

    f.render_widget(
        Paragraph::new("a/s · z/x: show reading")
            .style(Style::default().fg(theme.faint))
            .centered(),
        rows[2],
    );
}

fn render_reading_column(
    f: &mut Frame,
    area: Rect,
    state: &StudyState,
    side: ReadingSide,
    theme: Theme,
) {
    let kanji = state.current_kanji();
    let color = match side {
        ReadingSide::On => ON_COLOR,
        ReadingSide::Kun => KUN_COLOR,
    };
    let examples = kanji.examples(side);
    // 例文が無い列は薄く表示
    let text_color = if examples.is_empty() { theme.faint } else { theme.fg };
    let head_color = if examples.is_empty() { theme.faint } else { color };

    let mut lines = vec![
        Line::from(Span::styled(
            kanji.reading(side),
            Style::default().fg(head_color).bold(),
        ))
        .centered(),
    ];

    if examples.is_empty() {
        lines.push(Line::from(Span::styled("│ -", Style::default().fg(theme.faint))));
    }

    for (i, ex) in examples.iter().enumerate() {
        let revealed = state.is_revealed(side, i);
        let key = reveal_key(side, i).map_or(String::new(), |c| format!("[{c}] "));

        // ルビ: 読みを単語の上に出す
        let ruby = if revealed {
            Span::styled(ex.reading.as_str(), Style::default().fg(color))
        } else {
            Span::raw("")
        };
        lines.push(Line::from(vec![
            Span::styled("│ ", Style::default().fg(color)),
            Span::raw(" ".repeat(key.chars().count())),
            ruby,
        ]));

        let mut word = vec![
            Span::styled("│ ", Style::default().fg(color)),
            Span::styled(key, Style::default().fg(theme.faint)),
            Span::styled(ex.word.as_str(), Style::default().fg(text_color).bold()),
        ];
        if revealed {
            word.push(Span::styled(
                format!("  {}", ex.meaning),
                Style::default().fg(ON_COLOR),
            ));
        }
        lines.push(Line::from(word));
    }

    f.render_widget(Paragraph::new(lines), area);
}

fn render_buttons(f: &mut Frame, area: Rect, state: &StudyState, theme: Theme) {
    let enabled = |on: bool, bg: Color| {
        if on {
            Style::default().fg(Color::White).bg(bg)
        } else {
            Style::default().fg(theme.faint).bg(theme.card)
        }
    };

    let learned = state.is_learned(&state.current_kanji().kanji);
    let done = if learned {
        Span::styled(" ✓ done ", Style::default().fg(Color::White).bg(LEARNED_COLOR))
    } else {
        Span::styled(" done ", Style::default().fg(theme.fg).bg(theme.faint))
    };

    let line = Line::from(vec![
        Span::styled(" ← prev ", enabled(state.can_go_prev(), theme.muted)),
        Span::raw("  "),
        Span::styled(" next → ", enabled(state.can_go_next(), ACCENT)),
        Span::raw("  "),
        done,
    ]);
    f.render_widget(Paragraph::new(line).centered(), area);
}

fn render_hints(f: &mut Frame, area: Rect, theme: Theme) {
    f.render_widget(
        Paragraph::new(
            "space flip · ←/→ move · enter done · g groups · r random · tab layout · t theme · q quit",
        )
        .style(Style::default().fg(theme.muted))
        .centered(),
        area,
    );
}

fn render_dots(f: &mut Frame, area: Rect, state: &StudyState, theme: Theme) {
    let spans: Vec<Span> = state
        .current_group()
        .characters
        .iter()
        .enumerate()
        .map(|(i, k)| {
            if i == state.char_index() {
                Span::styled("● ", Style::default().fg(PROGRESS_COLOR))
            } else if state.is_learned(&k.kanji) {
                Span::styled("• ", Style::default().fg(LEARNED_COLOR))
            } else {
                Span::styled("· ", Style::default().fg(theme.faint))
            }
        })
        .collect();
    f.render_widget(Paragraph::new(Line::from(spans)).centered(), area);
}

/// `area` の中央に幅 `width`・高さ `height` の矩形を取る
fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// グループ一覧の高さ (枠線込み)
fn list_height(groups: usize) -> u16 {
    u16::try_from(groups).unwrap_or(u16::MAX).saturating_add(2)
}

fn render_group_list(f: &mut Frame, area: Rect, state: &StudyState, cursor: usize, theme: Theme) {
    let groups = state.deck().groups();
    let items: Vec<ListItem> = groups
        .iter()
        .enumerate()
        .map(|(i, g)| {
            ListItem::new(format!(
                "{}  {}/{}",
                g.name,
                state.group_learned_count(i),
                g.characters.len()
            ))
        })
        .collect();

    let rect = centered_rect(area, 36, list_height(groups.len()));
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(" groups ")
                .border_style(Style::default().fg(ACCENT)),
        )
        .style(Style::default().bg(theme.card).fg(theme.fg))
        .highlight_style(Style::default().bg(ACCENT).fg(Color::White).bold());

    let mut list_state = ListState::default().with_selected(Some(cursor));
    f.render_widget(Clear, rect);
    f.render_stateful_widget(list, rect, &mut list_state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::tests::sample_deck;
    use crate::save_data::Progress;
    use ratatui::backend::TestBackend;

    /// 画面の文字を空白抜きで連結する (全角文字の後ろの空セルを無視するため)
    fn screen_text(state: &StudyState, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| ui(f, state)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text.replace(' ', "")
    }

    #[test]
    fn front_shows_header_and_progress() {
        let deck = sample_deck();
        let state = StudyState::new(&deck, Progress::default(), false);
        let text = screen_text(&state, 100, 30);

        assert!(text.contains("2groups·5kanji"));
        assert!(text.contains("0/5(0%)"));
        assert!(text.contains("A(1/2)"));
        assert!(text.contains("[dark]"));
        // 表面では例文を出さない
        assert!(!text.contains("汀線"));
    }

    #[test]
    fn back_reveals_reading_on_demand() {
        let deck = sample_deck();
        let mut state = StudyState::new(&deck, Progress::default(), false);
        state.flip();

        let text = screen_text(&state, 100, 30);
        assert!(text.contains("물가정"));
        assert!(text.contains("[a]汀線"));
        assert!(!text.contains("ていせん"));
        assert!(!text.contains("해안선"));

        state.toggle_reveal(ReadingSide::On, 0);
        let text = screen_text(&state, 100, 30);
        assert!(text.contains("ていせん"));
        assert!(text.contains("해안선"));
    }

    #[test]
    fn learned_mark_and_percent() {
        let deck = sample_deck();
        let mut state = StudyState::new(&deck, Progress::default(), false);
        state.toggle_learned();

        let text = screen_text(&state, 100, 30);
        assert!(text.contains("1汀✓"));
        assert!(text.contains("1/5(20%)"));
        assert!(text.contains("✓done"));
    }

    #[test]
    fn group_list_overlay() {
        let deck = sample_deck();
        let mut state = StudyState::new(&deck, Progress::default(), false);
        state.toggle_group_list();

        let text = screen_text(&state, 100, 30);
        assert!(text.contains("groups"));
        assert!(text.contains("A0/3"));
        assert!(text.contains("B0/2"));
    }

    #[test]
    fn split_layout_and_light_theme() {
        let deck = sample_deck();
        let progress = Progress {
            dark_mode: false,
            layout: CardLayout::Split,
            ..Progress::default()
        };
        let state = StudyState::new(&deck, progress, false);

        let text = screen_text(&state, 100, 30);
        assert!(text.contains("space:showdetails"));
        assert!(text.contains("[light]"));
    }

    #[test]
    fn list_height_saturates() {
        assert_eq!(list_height(2), 4);
        assert_eq!(list_height(65_534), u16::MAX);
        assert_eq!(list_height(70_000), u16::MAX);
        let area = Rect::new(0, 0, 40, 10);
        assert_eq!(centered_rect(area, 36, list_height(70_000)).height, 10);
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let deck = sample_deck();
        let mut state = StudyState::new(&deck, Progress::default(), false);
        state.flip();
        state.toggle_group_list();
        screen_text(&state, 12, 4);
    }
}
