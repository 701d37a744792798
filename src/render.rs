use serde::Serialize;
use std::fmt::Write;

use crate::session::TierReport;
use crate::structures::Team;

/// Plain-text report, one block per tier.
pub fn render_text(report: &[TierReport], per_tier: usize) -> String {
    let mut out = String::new();
    if report.is_empty() {
        out.push_str("No clues found.\n");
        return out;
    }

    for tier in report {
        let _ = writeln!(out, "TOP {} CLUES FOR {} WORDS:", per_tier, tier.covered);
        for clue in &tier.clues {
            let _ = writeln!(out, "\"{}\" for {}", clue.word, clue.covered);
            let _ = writeln!(out, "Frenemy Diff: {:.4}", clue.frenemy_diff);
            let breakdown: Vec<String> = clue
                .distances
                .iter()
                .map(|entry| format!("{}{}, {:.4}", entry.target, team_marker(entry.team), entry.distance))
                .collect();
            let _ = writeln!(out, "{}", breakdown.join(" "));
            out.push('\n');
        }
    }
    out
}

fn team_marker(team: Team) -> &'static str {
    match team {
        Team::Friendly => "",
        Team::Civilian => " (civilian)",
        Team::Enemy => " (enemy)",
    }
}

/// Nearest/farthest listing for a single word.
pub fn render_neighbors(word: &str, closest: &[(String, f32)], farthest: &[(String, f32)], total: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "The closest {} words to \"{}\" are:", closest.len(), word);
    for (i, (neighbor, distance)) in closest.iter().enumerate() {
        let _ = writeln!(out, "{:<3} {:<50} {:.5}", i, format!("\"{}\"", neighbor), distance);
    }

    if !farthest.is_empty() {
        let _ = writeln!(out, "\nThe farthest {} words are:", farthest.len());
        let first = total.saturating_sub(farthest.len());
        for (i, (neighbor, distance)) in farthest.iter().enumerate() {
            let _ = writeln!(out, "{:<3} {:<50} {:.5}", first + i, format!("\"{}\"", neighbor), distance);
        }
    }
    out
}

pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}
