//! Assembles every statistic for one player into a single serializable report.

use std::collections::HashMap;

use chess_core::opening::OpeningLabel;
use serde::Serialize;
use tracing::info;

use crate::motifs::{self, CategorySummary, MotifCount, SacrificeSummary};
use crate::player::PlayerGame;
use crate::stats::{
    self, BandRecord, ByColor, DefeatedOpponent, LabelCount, LengthStats, NamedRecord,
    OpeningRecord, Record, StreakSummary, TerminationCount,
};

const TOP_OPENINGS: usize = 5;
const TOP_WINNING_OPENINGS: usize = 3;
const TOP_TERMINATIONS: usize = 5;
const TOP_OPPONENTS: usize = 5;
const TOP_ATTACKS: usize = 5;
const TOP_MOTIFS_PER_CATEGORY: usize = 3;

/// Thresholds and list sizes for a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    pub min_opening_games: usize,
    pub min_opponent_games: usize,
    pub min_time_control_games: usize,
    pub top_defeated: usize,
    pub top_streaks: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            min_opening_games: stats::DEFAULT_MIN_OPENING_GAMES,
            min_opponent_games: stats::DEFAULT_MIN_OPPONENT_GAMES,
            min_time_control_games: stats::DEFAULT_MIN_TIME_CONTROL_GAMES,
            top_defeated: stats::DEFAULT_TOP_DEFEATED,
            top_streaks: stats::DEFAULT_TOP_STREAKS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub player: String,
    pub total_games: usize,
    pub overall: Record,
    pub checks: usize,
    pub checkmates: usize,
    pub opening_counts: ByColor<Vec<LabelCount>>,
    pub winning_openings: ByColor<Vec<LabelCount>>,
    pub losing_openings: ByColor<Vec<LabelCount>>,
    pub opening_win_rates: ByColor<Vec<OpeningRecord>>,
    pub performance_vs_rating: Vec<BandRecord>,
    pub game_length: ByColor<Option<LengthStats>>,
    pub terminations: Vec<TerminationCount>,
    pub time_controls: Vec<NamedRecord>,
    pub streaks: StreakSummary,
    pub frequent_opponents: Vec<NamedRecord>,
    pub tactics: Vec<CategorySummary>,
    pub motif_games: Vec<MotifCount>,
    pub attack_combinations: Vec<MotifCount>,
    pub sacrifices: SacrificeSummary,
    pub top_defeated: Vec<DefeatedOpponent>,
    /// Every label reached at least once, in catalog order.
    pub opening_histogram: Vec<LabelCount>,
}

fn top<T>(mut rows: Vec<T>, limit: usize) -> Vec<T> {
    rows.truncate(limit);
    rows
}

fn top_by_color<T>(rows: ByColor<Vec<T>>, limit: usize) -> ByColor<Vec<T>> {
    rows.map(|r| top(r, limit))
}

/// Count of every catalog label that occurs in `games`.
pub fn opening_histogram(games: &[PlayerGame]) -> Vec<LabelCount> {
    let mut counts: HashMap<OpeningLabel, usize> = HashMap::new();
    for game in games {
        *counts.entry(game.opening).or_insert(0) += 1;
    }
    OpeningLabel::catalog()
        .filter_map(|opening| {
            counts
                .get(&opening)
                .map(|&count| LabelCount { opening, count })
        })
        .collect()
}

/// Number of games in which each tactical motif appears, most common first.
fn motif_games(games: &[PlayerGame]) -> Vec<MotifCount> {
    let mut counts: Vec<MotifCount> = Vec::new();
    for name in games.iter().flat_map(|g| g.motifs.iter().copied()) {
        match counts.iter_mut().find(|c| c.name == name) {
            Some(count) => count.count += 1,
            None => counts.push(MotifCount { name, count: 1 }),
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(b.name)));
    counts
}

pub fn build_report(player: &str, games: &[PlayerGame], options: &ReportOptions) -> Report {
    let movetexts = || games.iter().map(|g| g.movetext.as_str());
    let (checks, checkmates) = movetexts()
        .map(motifs::checks_and_mates)
        .fold((0, 0), |(c, m), (gc, gm)| (c + gc, m + gm));

    let report = Report {
        player: player.to_string(),
        total_games: games.len(),
        overall: stats::overall_record(games),
        checks,
        checkmates,
        opening_counts: top_by_color(stats::opening_counts(games), TOP_OPENINGS),
        winning_openings: top_by_color(stats::winning_openings(games), TOP_WINNING_OPENINGS),
        losing_openings: top_by_color(stats::losing_openings(games), TOP_WINNING_OPENINGS),
        opening_win_rates: stats::opening_win_rates(games, options.min_opening_games),
        performance_vs_rating: stats::performance_vs_rating(games),
        game_length: stats::game_length_stats(games),
        terminations: top(stats::termination_methods(games), TOP_TERMINATIONS),
        time_controls: stats::time_control_performance(games, options.min_time_control_games),
        streaks: stats::win_streaks(games, options.top_streaks),
        frequent_opponents: top(
            stats::opponent_patterns(games, options.min_opponent_games),
            TOP_OPPONENTS,
        ),
        tactics: motifs::tactical_summary(movetexts(), TOP_MOTIFS_PER_CATEGORY),
        motif_games: motif_games(games),
        attack_combinations: motifs::attack_combinations(movetexts(), TOP_ATTACKS),
        sacrifices: motifs::sacrifice_summary(movetexts()),
        top_defeated: stats::top_defeated_opponents(games, options.top_defeated),
        opening_histogram: opening_histogram(games),
    };

    info!(
        player,
        games = report.total_games,
        win_rate = report.overall.win_rate,
        "Report built"
    );
    report
}
