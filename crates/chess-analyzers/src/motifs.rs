//! Move-text pattern matching for tactical motifs, attack shapes and sacrifices.
//!
//! Everything here works on the rendered mainline (`GameData::movetext`), so a
//! pattern is a statement about notation, not about the board.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum MotifCategory {
    #[serde(rename = "Checkmate Patterns")]
    CheckmatePatterns,
    #[serde(rename = "Tactical Motifs")]
    TacticalMotifs,
    #[serde(rename = "Piece Sacrifices")]
    PieceSacrifices,
}

impl MotifCategory {
    pub const ALL: [MotifCategory; 3] = [
        MotifCategory::CheckmatePatterns,
        MotifCategory::TacticalMotifs,
        MotifCategory::PieceSacrifices,
    ];
}

struct Motif {
    name: &'static str,
    category: MotifCategory,
    pattern: Regex,
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("motif pattern must compile")
}

static TACTICAL_MOTIFS: LazyLock<Vec<Motif>> = LazyLock::new(|| {
    use MotifCategory::*;
    [
        ("Back Rank Mate", CheckmatePatterns, r"R[a-h][18]#|Q[a-h][18]#"),
        ("Smothered Mate", CheckmatePatterns, r"N[a-h][1-8]#"),
        ("Queen Mate", CheckmatePatterns, r"Q[a-h]?[1-8]?x?[a-h][1-8]#"),
        ("Rook Mate", CheckmatePatterns, r"R[a-h]?[1-8]?x?[a-h][1-8]#"),
        ("Discovered Attack", TacticalMotifs, r"[NBR][a-h1-8]*\+.*[QRN][a-h][1-8]"),
        ("Double Check", TacticalMotifs, r"\+\+"),
        ("Queen Sacrifice", PieceSacrifices, r"Qx[a-h][1-8]"),
        ("Rook Sacrifice", PieceSacrifices, r"Rx[a-h][1-8]"),
        ("Knight Sacrifice", PieceSacrifices, r"Nx[a-h][1-8]"),
        ("Bishop Sacrifice", PieceSacrifices, r"Bx[a-h][1-8]"),
        ("Exchange Sacrifice", PieceSacrifices, r"Rx[NBRQ]"),
    ]
    .into_iter()
    .map(|(name, category, pattern)| Motif {
        name,
        category,
        pattern: compile(pattern),
    })
    .collect()
});

static ATTACK_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("Pin", r"(Bb5|Ba4|Bg5|Bf4)"),
        ("Fork", r"N[a-h][1-8](?:\+|#)?"),
        ("Skewer", r"[RQ][a-h1-8]*x[a-h][1-8]"),
        ("Double Attack", r"Q[a-h][1-8](?:\+|#)?"),
        ("Discovery", r"[NBRQ][a-h1-8]*\+"),
        ("Back Rank", r"[RQ][a-h][18](?:#|\+)"),
        ("Smothered Mate", r"N[a-h][1-8]#"),
    ]
    .into_iter()
    .map(|(name, pattern)| (name, compile(pattern)))
    .collect()
});

/// Annotated captures, then plain queen captures. The flag marks the pattern
/// that counts toward queen sacrifices.
static SACRIFICE_PATTERNS: LazyLock<Vec<(Regex, bool)>> = LazyLock::new(|| {
    [
        (r"[NBRQ]x[a-h][1-8](?:\+|#)?!", false),
        (r"[NBRQ][a-h]?[1-8]?x[a-h][1-8](?:\+|#)?!", false),
        (r"Qx[a-h][1-8](?:\+|#)?", true),
        (r"Q[a-h]?[1-8]?x[a-h][1-8](?:\+|#)?", false),
    ]
    .into_iter()
    .map(|(pattern, queen)| (compile(pattern), queen))
    .collect()
});

static SACRIFICE_WORDS: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)sacrifice|sacrificio|brilliant|brilhante"));

static MOVE_TOKEN: LazyLock<Regex> = LazyLock::new(|| compile(r"\{[^}]*\}|\S+"));

/// Names of the tactical motifs present in one game, in table order.
pub fn game_motifs(movetext: &str) -> Vec<&'static str> {
    TACTICAL_MOTIFS
        .iter()
        .filter(|motif| motif.pattern.is_match(movetext))
        .map(|motif| motif.name)
        .collect()
}

/// Number of checking and mating moves in the mainline. Comments are ignored.
pub fn checks_and_mates(movetext: &str) -> (usize, usize) {
    MOVE_TOKEN
        .find_iter(movetext)
        .map(|token| token.as_str())
        .filter(|token| !token.starts_with('{'))
        .fold((0, 0), |(checks, mates), token| {
            let token = token.trim_end_matches(['!', '?']);
            if token.ends_with('#') {
                (checks, mates + 1)
            } else if token.ends_with('+') {
                (checks + 1, mates)
            } else {
                (checks, mates)
            }
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MotifCount {
    pub name: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub category: MotifCategory,
    pub motifs: Vec<MotifCount>,
}

/// Most frequent first; equal counts keep table order.
fn ranked(mut counts: Vec<MotifCount>, limit: usize) -> Vec<MotifCount> {
    counts.retain(|c| c.count > 0);
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}

/// Total pattern occurrences per category, keeping the top `per_category`
/// motifs of each. Categories with nothing found are left out.
pub fn tactical_summary<'a, I>(movetexts: I, per_category: usize) -> Vec<CategorySummary>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: Vec<usize> = vec![0; TACTICAL_MOTIFS.len()];
    for text in movetexts {
        for (slot, motif) in counts.iter_mut().zip(TACTICAL_MOTIFS.iter()) {
            *slot += motif.pattern.find_iter(text).count();
        }
    }

    MotifCategory::ALL
        .into_iter()
        .filter_map(|category| {
            let motifs: Vec<MotifCount> = TACTICAL_MOTIFS
                .iter()
                .zip(&counts)
                .filter(|(motif, _)| motif.category == category)
                .map(|(motif, &count)| MotifCount {
                    name: motif.name,
                    count,
                })
                .collect();
            let motifs = ranked(motifs, per_category);
            (!motifs.is_empty()).then_some(CategorySummary { category, motifs })
        })
        .collect()
}

/// Occurrences of each attack shape, most frequent first.
pub fn attack_combinations<'a, I>(movetexts: I, limit: usize) -> Vec<MotifCount>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: Vec<MotifCount> = ATTACK_PATTERNS
        .iter()
        .map(|(name, _)| MotifCount { name: *name, count: 0 })
        .collect();
    for text in movetexts {
        for (count, (_, pattern)) in counts.iter_mut().zip(ATTACK_PATTERNS.iter()) {
            count.count += pattern.find_iter(text).count();
        }
    }
    ranked(counts, limit)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SacrificeSummary {
    pub games_with_sacrifices: usize,
    pub queen_sacrifices: usize,
}

pub fn sacrifice_summary<'a, I>(movetexts: I) -> SacrificeSummary
where
    I: IntoIterator<Item = &'a str>,
{
    let mut summary = SacrificeSummary::default();
    for text in movetexts {
        let mut found = false;
        for (pattern, queen) in SACRIFICE_PATTERNS.iter() {
            if pattern.is_match(text) {
                found = true;
                if *queen {
                    summary.queen_sacrifices += 1;
                }
            }
        }
        if found || SACRIFICE_WORDS.is_match(text) {
            summary.games_with_sacrifices += 1;
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHOLARS_MATE: &str = "1. e4 e5 2. Bc4 Nc6 3. Qh5 Nf6 4. Qxf7#";

    #[test]
    fn test_game_motifs_scholars_mate() {
        let motifs = game_motifs(SCHOLARS_MATE);
        assert_eq!(motifs, vec!["Queen Mate", "Queen Sacrifice"]);
    }

    #[test]
    fn test_game_motifs_quiet_game() {
        assert!(game_motifs("1. d4 d5 2. c4 e6").is_empty());
    }

    #[test]
    fn test_back_rank_and_smothered() {
        assert!(game_motifs("30. Re8#").contains(&"Back Rank Mate"));
        assert!(game_motifs("25. Nf7#").contains(&"Smothered Mate"));
    }

    #[test]
    fn test_checks_and_mates() {
        let text = "1. e4 e5 2. Bc4 { threatening Qf7+ } Nc6 3. Bxf7+ Kxf7 4. Qh5+ g6 5. Qd5#";
        assert_eq!(checks_and_mates(text), (2, 1));
        assert_eq!(checks_and_mates(""), (0, 0));
    }

    #[test]
    fn test_tactical_summary_groups_by_category() {
        let texts = [SCHOLARS_MATE, "1. e4 e5 2. Nf3 Nc6 3. Nxe5 Nxe5"];
        let summary = tactical_summary(texts, 3);

        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].category, MotifCategory::CheckmatePatterns);
        assert_eq!(summary[0].motifs, vec![MotifCount { name: "Queen Mate", count: 1 }]);
        assert_eq!(summary[1].category, MotifCategory::PieceSacrifices);
        assert_eq!(summary[1].motifs[0], MotifCount { name: "Knight Sacrifice", count: 2 });
        assert_eq!(summary[1].motifs[1], MotifCount { name: "Queen Sacrifice", count: 1 });
    }

    #[test]
    fn test_attack_combinations_counts_occurrences() {
        let counts = attack_combinations(["1. e4 e5 2. Nf3 Nc6 3. Bb5 a6 4. Ba4"], 5);
        assert_eq!(counts[0], MotifCount { name: "Pin", count: 2 });
        assert_eq!(counts[1], MotifCount { name: "Fork", count: 2 });
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_attack_combinations_limit() {
        let counts = attack_combinations([SCHOLARS_MATE], 1);
        assert_eq!(counts.len(), 1);
    }

    #[test]
    fn test_sacrifice_summary() {
        let texts = [
            SCHOLARS_MATE,
            "1. e4 e5 2. Nf3 Nc6 3. Bc4 Nf6 4. Ng5 d5 5. exd5 Nxd5 6. Nxf7!",
            "1. d4 d5 { a brilliant idea } 2. c4",
            "1. d4 d5 2. c4 e6",
        ];
        let summary = sacrifice_summary(texts);
        assert_eq!(summary.games_with_sacrifices, 3);
        assert_eq!(summary.queen_sacrifices, 1);
    }

    #[test]
    fn test_category_serializes_as_display_name() {
        let json = serde_json::to_string(&MotifCategory::PieceSacrifices).unwrap();
        assert_eq!(json, "\"Piece Sacrifices\"");
    }
}
