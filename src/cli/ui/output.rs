use console::{Term, style};

use crate::ai::{CostEstimate, UsageLedger, format_cost};
use crate::cache::CacheStats;
use crate::explorer::{FailureKind, ItemView};
use crate::service::FileDetail;
use crate::types::{ExplorerItem, NodeKind, Result};

pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        println!("{} {}", style("ℹ").blue(), message);
    }

    pub fn header(&self, message: &str) {
        println!("\n{}", style(message).bold().underlined());
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }

    // =========================================================================
    // Explorer
    // =========================================================================

    /// One listing row without an explanation
    pub fn item(&self, item: &ExplorerItem) {
        match item.kind {
            NodeKind::Folder => {
                let count = item
                    .child_count
                    .map(|n| format!(" ({} items)", n))
                    .unwrap_or_default();
                println!("  {}{}", style(format!("{}/", item.name)).blue().bold(), style(count).dim());
            }
            NodeKind::File => {
                let size = item.size.map(human_size).unwrap_or_default();
                println!("  {} {}", item.name, style(size).dim());
            }
        }
    }

    /// Listing row plus its explanation, flagged when it is a placeholder
    pub fn item_view(&self, view: &ItemView) {
        self.item(&view.item);
        let text = view.explanation.as_deref().unwrap_or("");
        match view.failure {
            Some(FailureKind::Failed) | Some(FailureKind::RateLimited) => {
                println!("      {}", style(text).red())
            }
            Some(FailureKind::Unanswered) => println!("      {}", style(text).yellow()),
            None if view.deep_dive => println!("      {} {}", style("★").magenta(), text),
            None => println!("      {}", text),
        }
    }

    pub fn file_detail(&self, detail: &FileDetail) {
        self.header(&detail.path);
        if !detail.language.is_empty() {
            println!(
                "{} {}",
                style(&detail.language).cyan().bold(),
                style(format!("({})", detail.language_explanation)).dim()
            );
        }
        println!();
        println!("{}", detail.summary);

        if !detail.key_points.is_empty() {
            self.section("Key parts");
            for point in &detail.key_points {
                println!("  {} {}", style(&point.name).bold(), point.explanation);
            }
        }

        if !detail.dependencies.is_empty() {
            self.section("Depends on");
            for dep in &detail.dependencies {
                println!("  {} {}", style(&dep.name).bold(), dep.why);
            }
        }

        if !detail.notes.is_empty() {
            self.section("Good to know");
            for note in &detail.notes {
                println!("  • {}", note);
            }
        }
    }

    // =========================================================================
    // Spend
    // =========================================================================

    pub fn estimate(&self, estimate: &CostEstimate) {
        println!(
            "{} {} with {}: ~{} in / ~{} out tokens, {} (about {}s)",
            style("$").yellow(),
            estimate.description,
            estimate.tier_label,
            estimate.input_tokens,
            estimate.output_tokens,
            style(format_cost(estimate.estimated_cost)).bold(),
            estimate.estimated_seconds
        );
    }

    pub fn ledger(&self, ledger: &UsageLedger) {
        println!("\n{} {}", style("Session usage:").dim(), ledger);
    }

    pub fn cache_stats(&self, label: &str, stats: &CacheStats, entries: usize) {
        println!(
            "{} {} entries, {} hits, {} misses ({:.0}% hit rate), {} evicted, {} expired",
            style(format!("{}:", label)).dim(),
            entries,
            stats.hits,
            stats.misses,
            stats.hit_rate() * 100.0,
            stats.evictions,
            stats.expirations
        );
    }

    pub fn prompt(&self, location: &str) -> Result<()> {
        Term::stdout().write_str(&format!("{} ", style(format!("{}>", location)).cyan()))?;
        Ok(())
    }

    /// Ask before spending. Anything but `y`/`yes` declines.
    pub fn confirm(&self, prompt: &str) -> Result<bool> {
        let term = Term::stdout();
        term.write_str(&format!("{} {} ", prompt, style("[y/N]").dim()))?;
        let answer = term.read_line()?;
        Ok(is_yes(&answer))
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn human_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    match bytes {
        b if b >= MB => format!("{:.1} MB", b as f64 / MB as f64),
        b if b >= KB => format!("{:.1} KB", b as f64 / KB as f64),
        b => format!("{} B", b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("no"));
    }

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(2048), "2.0 KB");
        assert_eq!(human_size(3 * 1024 * 1024), "3.0 MB");
    }
}
