// src/tui.rs
//
// Terminal client. Owns the screen state machine (home -> test -> results)
// and drives the typing engine; all persistence goes through the shared
// service, the same code path the HTTP front end uses.

use std::{
    io,
    time::{Duration, Instant},
};

use chrono::Utc;
use crossterm::{
    event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use tui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Paragraph, Tabs, Wrap},
    Frame, Terminal,
};

use crate::db::{Difficulty, Mode, ProgressPoint, Score};
use crate::engine::{Event, Phase, TestResult, TypingTest};
use crate::paragraphs;
use crate::service::{NewScore, Service};

const DIFFICULTIES: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

enum Screen {
    Home,
    Test { test: TypingTest, mode: Mode },
    Results { result: TestResult, rank: Option<i64> },
    Leaderboard(Vec<Score>),
    Progress(Vec<ProgressPoint>),
}

enum Transition {
    Stay,
    Home,
    Start,
    Finish,
    Leaderboard,
    Progress,
}

struct Client {
    name: String,
    difficulty_idx: usize,
    daily: bool,
    screen: Screen,
    notice: Option<String>,
}

impl Client {
    fn new() -> Self {
        Client {
            name: String::new(),
            difficulty_idx: 0,
            daily: false,
            screen: Screen::Home,
            notice: None,
        }
    }

    fn difficulty(&self) -> Difficulty {
        DIFFICULTIES[self.difficulty_idx]
    }
}

pub fn run(service: &Service) -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(service, &mut terminal);

    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    result
}

fn event_loop<B: Backend>(
    service: &Service,
    terminal: &mut Terminal<B>,
) -> Result<(), Box<dyn std::error::Error>> {
    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();
    let mut client = Client::new();

    'main: loop {
        terminal.draw(|f| match &client.screen {
            Screen::Home => draw_home(f, &client),
            Screen::Test { test, mode } => draw_test(f, test, *mode),
            Screen::Results { result, rank } => draw_results(f, *result, *rank),
            Screen::Leaderboard(scores) => draw_leaderboard(f, scores),
            Screen::Progress(points) => draw_progress(f, &client.name, points),
        })?;

        let timeout = tick_rate.checked_sub(last_tick.elapsed()).unwrap_or_default();
        if event::poll(timeout)? {
            if let TermEvent::Key(KeyEvent { code, modifiers, .. }) = event::read()? {
                if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
                    break 'main;
                }
                let next = match &mut client.screen {
                    Screen::Home => match code {
                        KeyCode::Char('l') if modifiers.contains(KeyModifiers::CONTROL) => {
                            Transition::Leaderboard
                        }
                        KeyCode::Char('p') if modifiers.contains(KeyModifiers::CONTROL) => {
                            Transition::Progress
                        }
                        KeyCode::Char(c) => {
                            client.name.push(c);
                            client.notice = None;
                            Transition::Stay
                        }
                        KeyCode::Backspace => {
                            client.name.pop();
                            Transition::Stay
                        }
                        KeyCode::Left if client.difficulty_idx > 0 => {
                            client.difficulty_idx -= 1;
                            Transition::Stay
                        }
                        KeyCode::Right if client.difficulty_idx + 1 < DIFFICULTIES.len() => {
                            client.difficulty_idx += 1;
                            Transition::Stay
                        }
                        KeyCode::Tab => {
                            client.daily = !client.daily;
                            Transition::Stay
                        }
                        KeyCode::Enter => Transition::Start,
                        _ => Transition::Stay,
                    },

                    Screen::Test { test, .. } => match code {
                        // abandoning writes nothing
                        KeyCode::Esc => Transition::Home,
                        KeyCode::Char(c) => {
                            test.apply(Event::Key(c), Instant::now());
                            if test.phase() == Phase::Finished {
                                Transition::Finish
                            } else {
                                Transition::Stay
                            }
                        }
                        KeyCode::Backspace => {
                            test.apply(Event::Backspace, Instant::now());
                            Transition::Stay
                        }
                        _ => Transition::Stay,
                    },

                    Screen::Results { .. } | Screen::Leaderboard(_) | Screen::Progress(_) => match code {
                        KeyCode::Enter | KeyCode::Esc => Transition::Home,
                        _ => Transition::Stay,
                    },
                };

                match next {
                    Transition::Stay => {}
                    Transition::Home => client.screen = Screen::Home,
                    Transition::Start => start_test(service, &mut client),
                    Transition::Finish => finish_test(service, &mut client),
                    Transition::Leaderboard => match service.leaderboard(None) {
                        Ok(scores) => client.screen = Screen::Leaderboard(scores),
                        Err(e) => client.notice = Some(e.to_string()),
                    },
                    Transition::Progress => {
                        if client.name.trim().is_empty() {
                            client.notice = Some("enter your name first".into());
                        } else {
                            match service.progress(client.name.trim()) {
                                Ok(points) => client.screen = Screen::Progress(points),
                                Err(e) => client.notice = Some(e.to_string()),
                            }
                        }
                    }
                }
            }
        }

        last_tick = Instant::now();
    }
    Ok(())
}

fn start_test(service: &Service, client: &mut Client) {
    if client.name.trim().is_empty() {
        client.notice = Some("enter your name first".into());
        return;
    }
    let target = if client.daily {
        match service.daily_paragraph(Utc::now().date_naive()) {
            Ok(p) => p,
            Err(e) => {
                client.notice = Some(e.to_string());
                return;
            }
        }
    } else {
        paragraphs::practice(client.difficulty()).to_string()
    };
    let mode = if client.daily { Mode::Daily } else { Mode::Normal };
    client.screen = Screen::Test {
        test: TypingTest::new(target),
        mode,
    };
}

fn finish_test(service: &Service, client: &mut Client) {
    let (result, mode) = match &client.screen {
        Screen::Test { test, mode } => match test.result() {
            Some(r) => (r, *mode),
            None => return,
        },
        _ => return,
    };
    let rank = service
        .record(NewScore {
            name: Some(client.name.trim().to_string()),
            wpm: Some(result.wpm as f64),
            accuracy: Some(result.accuracy as f64),
            difficulty: Some(client.difficulty()),
            mode: Some(mode),
        })
        .map(|recorded| recorded.rank)
        .ok();
    client.screen = Screen::Results { result, rank };
}

fn draw_home<B: Backend>(f: &mut Frame<B>, client: &Client) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // name
            Constraint::Length(3), // difficulty tabs
            Constraint::Length(3), // mode
            Constraint::Min(3),    // help / notice
        ])
        .split(f.size());

    let name = Paragraph::new(client.name.as_str())
        .block(Block::default().borders(Borders::ALL).title("Name"));
    f.render_widget(name, chunks[0]);

    let titles = DIFFICULTIES
        .iter()
        .map(|d| Spans::from(d.as_str()))
        .collect::<Vec<_>>();
    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title("Difficulty"))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .select(client.difficulty_idx);
    f.render_widget(tabs, chunks[1]);

    let mode_txt = if client.daily {
        "Daily challenge (Tab to switch)"
    } else {
        "Normal (Tab for daily challenge)"
    };
    let mode = Paragraph::new(mode_txt)
        .block(Block::default().borders(Borders::ALL).title("Mode"));
    f.render_widget(mode, chunks[2]);

    let mut lines = vec![
        Spans::from("Enter: start a test"),
        Spans::from("Ctrl-L: leaderboard   Ctrl-P: your progress   Ctrl-C: quit"),
    ];
    if let Some(notice) = &client.notice {
        lines.push(Spans::from(Span::styled(
            notice.clone(),
            Style::default().fg(Color::Red),
        )));
    }
    let help = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("velotype"));
    f.render_widget(help, chunks[3]);
}

fn draw_test<B: Backend>(f: &mut Frame<B>, test: &TypingTest, mode: Mode) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(f.size());

    let stats = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(chunks[0]);

    let speed = Paragraph::new(format!("{}", test.live_wpm()))
        .block(Block::default().borders(Borders::ALL).title("WPM"));
    f.render_widget(speed, stats[0]);

    let acc = Paragraph::new(format!("{}%", test.accuracy()))
        .block(Block::default().borders(Borders::ALL).title("Accuracy"));
    f.render_widget(acc, stats[1]);

    // cosmetic 1-second display; the engine computes from wall-clock deltas
    let timer = Paragraph::new(format!("{}s", test.elapsed_secs(Instant::now())))
        .block(Block::default().borders(Borders::ALL).title("Timer"));
    f.render_widget(timer, stats[2]);

    let typed: Vec<char> = test.typed().chars().collect();
    let cursor = typed.len();
    let spans = test
        .target()
        .chars()
        .enumerate()
        .map(|(i, ch)| {
            let base = match typed.get(i) {
                Some(t) if *t == ch => Style::default().fg(Color::Green),
                Some(_) => Style::default().fg(Color::Red),
                None => Style::default().fg(Color::White),
            };
            if i == cursor {
                Span::styled(
                    ch.to_string(),
                    base.bg(Color::Yellow).fg(Color::Black).add_modifier(Modifier::BOLD),
                )
            } else {
                Span::styled(ch.to_string(), base)
            }
        })
        .collect::<Vec<_>>();

    let title = match mode {
        Mode::Daily => "Daily challenge (Esc to abandon)",
        Mode::Normal => "Text (Esc to abandon)",
    };
    let text = Paragraph::new(Spans::from(spans))
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: true });
    f.render_widget(text, chunks[1]);
}

fn draw_results<B: Backend>(f: &mut Frame<B>, result: TestResult, rank: Option<i64>) {
    let rank_txt = match rank {
        Some(r) => format!("#{r}"),
        None => "unavailable (score not saved)".to_string(),
    };
    let lines = vec![
        Spans::from(vec![
            Span::styled("WPM   ", Style::default().fg(Color::Gray)),
            Span::styled(
                result.wpm.to_string(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ]),
        Spans::from(vec![
            Span::styled("ACC   ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{}%", result.accuracy),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ]),
        Spans::from(vec![
            Span::styled("TIME  ", Style::default().fg(Color::Gray)),
            Span::raw(format!("{}s", result.seconds)),
        ]),
        Spans::from(vec![
            Span::styled("RANK  ", Style::default().fg(Color::Gray)),
            Span::raw(rank_txt),
        ]),
        Spans::from(""),
        Spans::from("Enter: back to home"),
    ];
    let para = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Results"))
        .wrap(Wrap { trim: true });
    f.render_widget(para, f.size());
}

fn draw_leaderboard<B: Backend>(f: &mut Frame<B>, scores: &[Score]) {
    let mut lines = Vec::new();
    if scores.is_empty() {
        lines.push(Spans::from("No scores yet."));
    }
    for (i, score) in scores.iter().enumerate() {
        lines.push(Spans::from(vec![
            Span::styled(
                format!("#{:<3}", i + 1),
                Style::default().fg(Color::Yellow),
            ),
            Span::raw(format!(
                "{:<20} {:>5.0} wpm  {:>4.0}%  {}",
                score.name, score.wpm, score.accuracy, score.difficulty.as_str()
            )),
        ]));
    }
    lines.push(Spans::from(""));
    lines.push(Spans::from("Esc: back to home"));
    let para = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Leaderboard"))
        .wrap(Wrap { trim: true });
    f.render_widget(para, f.size());
}

fn draw_progress<B: Backend>(f: &mut Frame<B>, name: &str, points: &[ProgressPoint]) {
    let mut lines = Vec::new();
    if points.is_empty() {
        lines.push(Spans::from("No recorded attempts yet."));
    } else {
        let n = points.len() as f64;
        let avg_wpm = points.iter().map(|p| p.wpm).sum::<f64>() / n;
        let avg_acc = points.iter().map(|p| p.accuracy).sum::<f64>() / n;
        let best = points.iter().map(|p| p.wpm).fold(0.0_f64, f64::max);
        lines.push(Spans::from(vec![
            Span::styled("AVG   ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{avg_wpm:.0} wpm  {avg_acc:.0}%"),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled("    BEST  ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{best:.0} wpm"),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ]));
        lines.push(Spans::from(""));
        // oldest first, one bar per attempt scaled against the personal best
        for point in points {
            let width = if best > 0.0 {
                ((point.wpm / best) * 30.0).round() as usize
            } else {
                0
            };
            let day = point.date.get(..10).unwrap_or(&point.date);
            lines.push(Spans::from(vec![
                Span::raw(format!("{day}  {:>5.0} wpm  {:>4.0}%  ", point.wpm, point.accuracy)),
                Span::styled("▇".repeat(width), Style::default().fg(Color::Green)),
            ]));
        }
    }
    lines.push(Spans::from(""));
    lines.push(Spans::from("Esc: back to home"));
    let para = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Progress: {name}")),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(para, f.size());
}

#[cfg(test)]
mod tests {
    use super::*;
    use tui::backend::TestBackend;

    fn rendered(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol.as_str())
            .collect()
    }

    #[test]
    fn progress_screen_shows_averages_and_attempts() {
        let backend = TestBackend::new(80, 12);
        let mut terminal = Terminal::new(backend).unwrap();
        let points = vec![
            ProgressPoint {
                wpm: 40.0,
                accuracy: 90.0,
                date: "2026-08-01T00:00:00+00:00".into(),
            },
            ProgressPoint {
                wpm: 60.0,
                accuracy: 96.0,
                date: "2026-08-02T00:00:00+00:00".into(),
            },
        ];
        terminal.draw(|f| draw_progress(f, "ada", &points)).unwrap();
        let text = rendered(&terminal);
        assert!(text.contains("Progress: ada"));
        assert!(text.contains("50 wpm"));
        assert!(text.contains("2026-08-01"));
        assert!(text.contains("2026-08-02"));
    }

    #[test]
    fn progress_screen_handles_no_attempts() {
        let backend = TestBackend::new(80, 6);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw_progress(f, "ada", &[])).unwrap();
        assert!(rendered(&terminal).contains("No recorded attempts yet."));
    }
}
