//! Aggregate statistics over a player's classified games.
//!
//! Every function is deterministic: ties are broken by name ascending unless
//! noted otherwise.

use std::collections::HashMap;

use chess_core::opening::OpeningLabel;
use chrono::NaiveDate;
use serde::Serialize;
use shakmaty::Color;

use crate::player::{Outcome, PlayerGame};

pub const DEFAULT_MIN_OPENING_GAMES: usize = 3;
pub const DEFAULT_MIN_OPPONENT_GAMES: usize = 3;
pub const DEFAULT_MIN_TIME_CONTROL_GAMES: usize = 10;
pub const DEFAULT_TOP_STREAKS: usize = 5;
pub const DEFAULT_TOP_DEFEATED: usize = 20;

const SHORT_GAME_MOVES: usize = 20;
const MEDIUM_GAME_MOVES: usize = 40;

const RATING_BANDS: &[(&str, u32)] = &[
    ("Under 1200", 0),
    ("1200-1399", 1200),
    ("1400-1599", 1400),
    ("1600-1799", 1600),
    ("1800-1999", 1800),
    ("2000+", 2000),
];

/// Percentage rounded to one decimal; zero when there is nothing to divide by.
fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 / whole as f64 * 1000.0).round() / 10.0
}

pub(crate) fn color_name(color: Color) -> &'static str {
    match color {
        Color::White => "white",
        Color::Black => "black",
    }
}

/// Results against a group of games. `total` counts decided games only;
/// `games` also includes games whose result is unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
    pub total: usize,
    pub games: usize,
    pub win_rate: f64,
}

impl Record {
    fn add(&mut self, outcome: Outcome) {
        self.games += 1;
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Loss => self.losses += 1,
            Outcome::Draw => self.draws += 1,
            Outcome::Unknown => return,
        }
        self.total += 1;
        self.win_rate = percent(self.wins, self.total);
    }

    fn from_outcomes<I: IntoIterator<Item = Outcome>>(outcomes: I) -> Self {
        let mut record = Self::default();
        for outcome in outcomes {
            record.add(outcome);
        }
        record
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ByColor<T> {
    pub white: T,
    pub black: T,
}

impl<T> ByColor<T> {
    fn get_mut(&mut self, color: Color) -> &mut T {
        match color {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> ByColor<U> {
        ByColor {
            white: f(self.white),
            black: f(self.black),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub opening: OpeningLabel,
    pub count: usize,
}

/// Count desc, then label.
fn label_counts<'a, I>(labels: I) -> Vec<LabelCount>
where
    I: IntoIterator<Item = &'a OpeningLabel>,
{
    let mut counts: HashMap<OpeningLabel, usize> = HashMap::new();
    for label in labels {
        *counts.entry(*label).or_insert(0) += 1;
    }
    let mut counts: Vec<LabelCount> = counts
        .into_iter()
        .map(|(opening, count)| LabelCount { opening, count })
        .collect();
    counts.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.opening.as_str().cmp(b.opening.as_str()))
    });
    counts
}

fn openings_by_color(
    games: &[PlayerGame],
    keep: impl Fn(&PlayerGame) -> bool,
) -> ByColor<Vec<LabelCount>> {
    let mut labels: ByColor<Vec<OpeningLabel>> = ByColor::default();
    for game in games.iter().filter(|g| keep(*g)) {
        labels.get_mut(game.color).push(game.opening);
    }
    labels.map(|l| label_counts(&l))
}

pub fn overall_record(games: &[PlayerGame]) -> Record {
    Record::from_outcomes(games.iter().map(|g| g.outcome))
}

/// How often each opening label was reached, per color.
pub fn opening_counts(games: &[PlayerGame]) -> ByColor<Vec<LabelCount>> {
    openings_by_color(games, |_| true)
}

pub fn winning_openings(games: &[PlayerGame]) -> ByColor<Vec<LabelCount>> {
    openings_by_color(games, |g| g.outcome == Outcome::Win)
}

pub fn losing_openings(games: &[PlayerGame]) -> ByColor<Vec<LabelCount>> {
    openings_by_color(games, |g| g.outcome == Outcome::Loss)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpeningRecord {
    pub opening: OpeningLabel,
    #[serde(flatten)]
    pub record: Record,
}

/// Per-color results for openings with at least `min_games` decided games,
/// best win rate first.
pub fn opening_win_rates(games: &[PlayerGame], min_games: usize) -> ByColor<Vec<OpeningRecord>> {
    let mut records: ByColor<HashMap<OpeningLabel, Record>> = ByColor::default();
    for game in games {
        records
            .get_mut(game.color)
            .entry(game.opening)
            .or_default()
            .add(game.outcome);
    }

    records.map(|by_label| {
        let mut rows: Vec<OpeningRecord> = by_label
            .into_iter()
            .filter(|(_, record)| record.total >= min_games)
            .map(|(opening, record)| OpeningRecord { opening, record })
            .collect();
        rows.sort_by(|a, b| {
            b.record
                .win_rate
                .total_cmp(&a.record.win_rate)
                .then_with(|| b.record.total.cmp(&a.record.total))
                .then_with(|| a.opening.as_str().cmp(b.opening.as_str()))
        });
        rows
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandRecord {
    pub band: &'static str,
    #[serde(flatten)]
    pub record: Record,
}

fn rating_band(rating: u32) -> usize {
    RATING_BANDS
        .iter()
        .rposition(|(_, floor)| rating >= *floor)
        .unwrap_or(0)
}

/// Results by opponent rating band. An unknown rating counts as 0.
pub fn performance_vs_rating(games: &[PlayerGame]) -> Vec<BandRecord> {
    let mut records = vec![Record::default(); RATING_BANDS.len()];
    for game in games {
        let band = rating_band(game.opponent_rating.unwrap_or(0));
        records[band].add(game.outcome);
    }

    RATING_BANDS
        .iter()
        .zip(records)
        .filter(|(_, record)| record.total > 0)
        .map(|(&(band, _), record)| BandRecord { band, record })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LengthStats {
    pub average: f64,
    pub min: usize,
    pub max: usize,
    pub short: usize,
    pub medium: usize,
    pub long: usize,
}

fn length_stats(lengths: &[usize]) -> Option<LengthStats> {
    if lengths.is_empty() {
        return None;
    }
    let valid: Vec<usize> = lengths.iter().copied().filter(|&n| n > 0).collect();
    if valid.is_empty() {
        return Some(LengthStats::default());
    }

    let sum: usize = valid.iter().sum();
    Some(LengthStats {
        average: (sum as f64 / valid.len() as f64 * 10.0).round() / 10.0,
        min: valid.iter().copied().min().unwrap_or(0),
        max: valid.iter().copied().max().unwrap_or(0),
        short: valid.iter().filter(|&&n| n <= SHORT_GAME_MOVES).count(),
        medium: valid
            .iter()
            .filter(|&&n| n > SHORT_GAME_MOVES && n <= MEDIUM_GAME_MOVES)
            .count(),
        long: valid.iter().filter(|&&n| n > MEDIUM_GAME_MOVES).count(),
    })
}

/// Game length in full moves, per color. `None` for a color never played;
/// zero-length games are ignored.
pub fn game_length_stats(games: &[PlayerGame]) -> ByColor<Option<LengthStats>> {
    let mut lengths: ByColor<Vec<usize>> = ByColor::default();
    for game in games {
        lengths.get_mut(game.color).push(game.full_moves());
    }
    lengths.map(|l| length_stats(&l))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TerminationCount {
    pub termination: String,
    pub games: usize,
    pub wins: usize,
}

/// Games and wins per `Termination` header, most common first.
pub fn termination_methods(games: &[PlayerGame]) -> Vec<TerminationCount> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for game in games {
        let entry = counts.entry(game.termination.as_str()).or_insert((0, 0));
        entry.0 += 1;
        if game.outcome == Outcome::Win {
            entry.1 += 1;
        }
    }

    let mut rows: Vec<TerminationCount> = counts
        .into_iter()
        .map(|(termination, (games, wins))| TerminationCount {
            termination: termination.to_string(),
            games,
            wins,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.games
            .cmp(&a.games)
            .then_with(|| a.termination.cmp(&b.termination))
    });
    rows
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedRecord {
    pub name: String,
    #[serde(flatten)]
    pub record: Record,
}

fn records_by<'a>(
    games: &'a [PlayerGame],
    key: impl Fn(&'a PlayerGame) -> &'a str,
) -> Vec<NamedRecord> {
    let mut records: HashMap<&str, Record> = HashMap::new();
    for game in games {
        records.entry(key(game)).or_default().add(game.outcome);
    }
    records
        .into_iter()
        .map(|(name, record)| NamedRecord {
            name: name.to_string(),
            record,
        })
        .collect()
}

/// Results per `TimeControl` header for controls with at least `min_games`
/// decided games, most played first.
pub fn time_control_performance(games: &[PlayerGame], min_games: usize) -> Vec<NamedRecord> {
    let mut rows = records_by(games, |g| g.time_control.as_str());
    rows.retain(|row| row.record.total >= min_games);
    rows.sort_by(|a, b| {
        b.record
            .total
            .cmp(&a.record.total)
            .then_with(|| a.name.cmp(&b.name))
    });
    rows
}

/// Opponents met at least `min_games` times, most frequent first. Win rate
/// here is over every game against the opponent, unfinished ones included.
pub fn opponent_patterns(games: &[PlayerGame], min_games: usize) -> Vec<NamedRecord> {
    let mut rows = records_by(games, |g| g.opponent.as_str());
    rows.retain(|row| row.record.games >= min_games);
    for row in &mut rows {
        row.record.win_rate = percent(row.record.wins, row.record.games);
    }
    rows.sort_by(|a, b| {
        b.record
            .games
            .cmp(&a.record.games)
            .then_with(|| b.record.win_rate.total_cmp(&a.record.win_rate))
            .then_with(|| a.name.cmp(&b.name))
    });
    rows
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Streak {
    pub length: usize,
    /// Indices into the date-ordered game list.
    pub first: usize,
    pub last: usize,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StreakSummary {
    pub longest: usize,
    pub streaks: Vec<Streak>,
}

fn game_date(game: &PlayerGame) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(game.date.as_deref()?, "%Y.%m.%d").ok()
}

/// Consecutive wins over the games with a complete `YYYY.MM.DD` date, in date
/// order. Longest streaks first; equal lengths keep chronological order.
pub fn win_streaks(games: &[PlayerGame], top: usize) -> StreakSummary {
    let mut dated: Vec<(NaiveDate, &PlayerGame)> = games
        .iter()
        .filter_map(|game| game_date(game).map(|date| (date, game)))
        .collect();
    dated.sort_by_key(|(date, _)| *date);

    let mut streaks = Vec::new();
    let mut start: Option<usize> = None;
    for (i, (_, game)) in dated.iter().enumerate() {
        match (game.outcome == Outcome::Win, start) {
            (true, None) => start = Some(i),
            (false, Some(first)) => {
                streaks.push((first, i - 1));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(first) = start {
        streaks.push((first, dated.len() - 1));
    }

    let mut streaks: Vec<Streak> = streaks
        .into_iter()
        .map(|(first, last)| Streak {
            length: last - first + 1,
            first,
            last,
            start_date: dated[first].0.format("%Y.%m.%d").to_string(),
            end_date: dated[last].0.format("%Y.%m.%d").to_string(),
        })
        .collect();
    streaks.sort_by(|a, b| b.length.cmp(&a.length).then_with(|| a.first.cmp(&b.first)));

    StreakSummary {
        longest: streaks.first().map_or(0, |s| s.length),
        streaks: streaks.into_iter().take(top).collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefeatedOpponent {
    pub opponent: String,
    pub rating: u32,
    /// The color the opponent played.
    pub color: &'static str,
    pub opening: OpeningLabel,
    pub year: String,
}

/// Wins against rated opponents, highest rating first. Equal ratings keep
/// input order.
pub fn top_defeated_opponents(games: &[PlayerGame], limit: usize) -> Vec<DefeatedOpponent> {
    let mut defeated: Vec<DefeatedOpponent> = games
        .iter()
        .filter(|g| g.outcome == Outcome::Win)
        .filter_map(|g| {
            let rating = g.opponent_rating.filter(|&r| r > 0)?;
            let year = g
                .date
                .as_deref()
                .filter(|d| d.contains('.'))
                .and_then(|d| d.split('.').next())
                .unwrap_or("N/A");
            Some(DefeatedOpponent {
                opponent: g.opponent.clone(),
                rating,
                color: color_name(g.color.other()),
                opening: g.opening,
                year: year.to_string(),
            })
        })
        .collect();

    defeated.sort_by(|a, b| b.rating.cmp(&a.rating));
    defeated.truncate(limit);
    defeated
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(color: Color, outcome: Outcome, opening: &str) -> PlayerGame {
        PlayerGame {
            color,
            outcome,
            opponent: "rival".to_string(),
            opponent_rating: Some(1500),
            opening: OpeningLabel::from_name(opening),
            date: None,
            plies: 60,
            termination: "Normal".to_string(),
            time_control: "600".to_string(),
            movetext: String::new(),
            motifs: Vec::new(),
            link: None,
        }
    }

    fn dated(outcome: Outcome, date: &str) -> PlayerGame {
        PlayerGame {
            date: Some(date.to_string()),
            ..game(Color::White, outcome, "Ruy Lopez")
        }
    }

    #[test]
    fn test_overall_record() {
        let games = vec![
            game(Color::White, Outcome::Win, "Ruy Lopez"),
            game(Color::White, Outcome::Win, "Ruy Lopez"),
            game(Color::Black, Outcome::Loss, "French Defense"),
            game(Color::Black, Outcome::Draw, "French Defense"),
            game(Color::Black, Outcome::Unknown, "French Defense"),
        ];
        let record = overall_record(&games);
        assert_eq!(record.wins, 2);
        assert_eq!(record.losses, 1);
        assert_eq!(record.draws, 1);
        assert_eq!(record.total, 4);
        assert_eq!(record.games, 5);
        assert_eq!(record.win_rate, 50.0);
    }

    #[test]
    fn test_overall_record_empty() {
        let record = overall_record(&[]);
        assert_eq!(record.total, 0);
        assert_eq!(record.win_rate, 0.0);
    }

    #[test]
    fn test_opening_counts_sorted_with_ties_by_name() {
        let games = vec![
            game(Color::White, Outcome::Win, "Ruy Lopez"),
            game(Color::White, Outcome::Loss, "Italian Game"),
            game(Color::White, Outcome::Win, "Vienna Game"),
            game(Color::White, Outcome::Win, "Vienna Game"),
            game(Color::Black, Outcome::Win, "Caro-Kann Defense"),
        ];
        let counts = opening_counts(&games);
        let white: Vec<(&str, usize)> = counts
            .white
            .iter()
            .map(|c| (c.opening.as_str(), c.count))
            .collect();
        assert_eq!(
            white,
            vec![("Vienna Game", 2), ("Italian Game", 1), ("Ruy Lopez", 1)]
        );
        assert_eq!(counts.black.len(), 1);

        let wins = winning_openings(&games);
        assert_eq!(wins.white[0].opening.as_str(), "Vienna Game");
        assert_eq!(wins.white.len(), 2);

        let losses = losing_openings(&games);
        assert_eq!(losses.white.len(), 1);
        assert_eq!(losses.white[0].opening.as_str(), "Italian Game");
        assert!(losses.black.is_empty());
    }

    #[test]
    fn test_opening_win_rates_threshold() {
        let mut games = vec![
            game(Color::White, Outcome::Win, "Ruy Lopez"),
            game(Color::White, Outcome::Win, "Ruy Lopez"),
            game(Color::White, Outcome::Loss, "Ruy Lopez"),
            game(Color::White, Outcome::Win, "Italian Game"),
            game(Color::White, Outcome::Win, "Italian Game"),
        ];
        games.push(game(Color::White, Outcome::Unknown, "Italian Game"));

        let rates = opening_win_rates(&games, 3);
        assert_eq!(rates.white.len(), 1);
        assert_eq!(rates.white[0].opening.as_str(), "Ruy Lopez");
        assert_eq!(rates.white[0].record.win_rate, 66.7);
        assert!(rates.black.is_empty());
    }

    #[test]
    fn test_performance_vs_rating_bands() {
        let mut low = game(Color::White, Outcome::Win, "Ruy Lopez");
        low.opponent_rating = Some(1199);
        let mut unrated = game(Color::White, Outcome::Loss, "Ruy Lopez");
        unrated.opponent_rating = None;
        let mut edge = game(Color::White, Outcome::Win, "Ruy Lopez");
        edge.opponent_rating = Some(2000);
        let mut mid = game(Color::Black, Outcome::Draw, "Ruy Lopez");
        mid.opponent_rating = Some(1400);

        let bands = performance_vs_rating(&[edge, low, unrated, mid]);
        let names: Vec<&str> = bands.iter().map(|b| b.band).collect();
        assert_eq!(names, vec!["Under 1200", "1400-1599", "2000+"]);
        assert_eq!(bands[0].record.total, 2);
        assert_eq!(bands[0].record.win_rate, 50.0);
    }

    #[test]
    fn test_game_length_stats() {
        let mut short = game(Color::White, Outcome::Win, "Ruy Lopez");
        short.plies = 30;
        let mut medium = game(Color::White, Outcome::Win, "Ruy Lopez");
        medium.plies = 80;
        let mut long = game(Color::White, Outcome::Win, "Ruy Lopez");
        long.plies = 83;
        let mut empty = game(Color::White, Outcome::Win, "Ruy Lopez");
        empty.plies = 1;

        let stats = game_length_stats(&[short, medium, long, empty]);
        let white = stats.white.expect("white games");
        assert_eq!(white.min, 15);
        assert_eq!(white.max, 41);
        assert_eq!((white.short, white.medium, white.long), (1, 1, 1));
        assert_eq!(white.average, 32.0);
        assert!(stats.black.is_none());
    }

    #[test]
    fn test_termination_methods() {
        let mut resign = game(Color::White, Outcome::Win, "Ruy Lopez");
        resign.termination = "won by resignation".to_string();
        let games = vec![
            resign,
            game(Color::White, Outcome::Win, "Ruy Lopez"),
            game(Color::White, Outcome::Loss, "Ruy Lopez"),
        ];
        let terms = termination_methods(&games);
        assert_eq!(terms[0].termination, "Normal");
        assert_eq!(terms[0].games, 2);
        assert_eq!(terms[0].wins, 1);
        assert_eq!(terms[1].termination, "won by resignation");
    }

    #[test]
    fn test_time_control_threshold() {
        let mut games: Vec<PlayerGame> = (0..10)
            .map(|i| {
                let outcome = if i < 4 { Outcome::Win } else { Outcome::Loss };
                game(Color::White, outcome, "Ruy Lopez")
            })
            .collect();
        let mut blitz = game(Color::White, Outcome::Win, "Ruy Lopez");
        blitz.time_control = "180+2".to_string();
        games.push(blitz);

        let controls = time_control_performance(&games, 10);
        assert_eq!(controls.len(), 1);
        assert_eq!(controls[0].name, "600");
        assert_eq!(controls[0].record.win_rate, 40.0);
    }

    #[test]
    fn test_win_streaks() {
        let games = vec![
            dated(Outcome::Win, "2024.01.05"),
            dated(Outcome::Win, "2024.01.01"),
            dated(Outcome::Loss, "2024.01.02"),
            dated(Outcome::Win, "2024.01.03"),
            dated(Outcome::Win, "2024.01.04"),
            dated(Outcome::Win, "2024.??.??"),
            game(Color::White, Outcome::Win, "Ruy Lopez"),
        ];

        let summary = win_streaks(&games, 5);
        assert_eq!(summary.longest, 3);
        assert_eq!(summary.streaks.len(), 2);
        assert_eq!(summary.streaks[0].length, 3);
        assert_eq!(summary.streaks[0].first, 2);
        assert_eq!(summary.streaks[0].last, 4);
        assert_eq!(summary.streaks[0].start_date, "2024.01.03");
        assert_eq!(summary.streaks[0].end_date, "2024.01.05");
        assert_eq!(summary.streaks[1].length, 1);
    }

    #[test]
    fn test_win_streaks_without_dates() {
        let summary = win_streaks(&[game(Color::White, Outcome::Win, "Ruy Lopez")], 5);
        assert_eq!(summary, StreakSummary::default());
    }

    #[test]
    fn test_opponent_patterns() {
        let mut games: Vec<PlayerGame> = (0..3)
            .map(|_| game(Color::White, Outcome::Win, "Ruy Lopez"))
            .collect();
        let mut once = game(Color::White, Outcome::Win, "Ruy Lopez");
        once.opponent = "stranger".to_string();
        games.push(once);

        let opponents = opponent_patterns(&games, 3);
        assert_eq!(opponents.len(), 1);
        assert_eq!(opponents[0].name, "rival");
        assert_eq!(opponents[0].record.games, 3);
        assert_eq!(opponents[0].record.win_rate, 100.0);
    }

    #[test]
    fn test_opponent_win_rate_counts_unfinished_games() {
        let games = vec![
            game(Color::White, Outcome::Win, "Ruy Lopez"),
            game(Color::Black, Outcome::Win, "Sicilian Defense"),
            game(Color::White, Outcome::Unknown, "Ruy Lopez"),
        ];

        let opponents = opponent_patterns(&games, 3);
        assert_eq!(opponents.len(), 1);
        assert_eq!(opponents[0].record.total, 2);
        assert_eq!(opponents[0].record.games, 3);
        assert_eq!(opponents[0].record.win_rate, 66.7);
    }

    #[test]
    fn test_top_defeated_opponents() {
        let mut strong = game(Color::Black, Outcome::Win, "Sicilian Defense");
        strong.opponent = "strong".to_string();
        strong.opponent_rating = Some(2100);
        strong.date = Some("2023.05.01".to_string());
        let mut unrated = game(Color::White, Outcome::Win, "Ruy Lopez");
        unrated.opponent_rating = None;
        let lost = game(Color::White, Outcome::Loss, "Ruy Lopez");
        let weak = game(Color::White, Outcome::Win, "Ruy Lopez");

        let top = top_defeated_opponents(&[weak, lost, unrated, strong], 20);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].opponent, "strong");
        assert_eq!(top[0].color, "white");
        assert_eq!(top[0].year, "2023");
        assert_eq!(top[1].rating, 1500);
        assert_eq!(top[1].year, "N/A");

        assert_eq!(top_defeated_opponents(&[], 20), Vec::new());
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let json = serde_json::to_value(overall_record(&[])).unwrap();
        assert!(json.get("winRate").is_some());
    }
}
