pub mod component;
pub mod dashboard;
pub mod exercise;
pub mod tree;

use crate::models::COMPLETION_THRESHOLD;

pub(crate) fn solved_bar(num_solved: u32) -> String {
    let filled = num_solved.min(COMPLETION_THRESHOLD) as usize;
    let empty = COMPLETION_THRESHOLD as usize - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
