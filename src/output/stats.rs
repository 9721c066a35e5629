//! Statistics reporting.

use console::style;
use indicatif::HumanBytes;

use crate::download::RecoveryStats;

/// Print the end-of-run report for an account.
pub fn print_recovery_stats(stats: &RecoveryStats) {
    println!();
    println!(
        "{}",
        style(format!("Recovery summary for {}:", stats.account)).bold()
    );
    println!("{}", style("═".repeat(50)).dim());

    match stats.total {
        Some(total) => println!("  Listed on profile: {}", total),
        None => println!("  Listed on profile: ~"),
    }
    println!("  Snapshots:  {} ({} profile captures)", stats.snapshots, stats.profile_pages);
    println!("  Found:      {}", stats.found);
    println!(
        "  Downloaded: {} ({})",
        style(stats.completed).green(),
        HumanBytes(stats.bytes_downloaded)
    );
    println!("  Skipped:    {} (already recovered)", style(stats.skipped).dim());
    println!("  Failed:     {}", style(stats.failed).red());

    let mut recent = stats.recent().peekable();
    if recent.peek().is_some() {
        println!();
        println!("{}", style("Recent downloads:").bold());
        for event in recent {
            println!("  {}: {}", event.time(), event.message);
        }
    }

    println!();
    println!("{}", style("Status:").bold());

    if stats.missing() > 0 {
        println!(
            "{} Only found {}/{} videos ({} missing). Some videos may not have been archived.",
            style("⚠ Warning:").yellow().bold(),
            stats.found,
            stats.total.unwrap_or(0),
            stats.missing()
        );
    }

    let processed = stats.completed + stats.skipped + stats.failed;
    if stats.failed == 0 && processed == stats.found {
        if stats.completed == stats.found {
            println!(
                "{} All {} videos downloaded successfully.",
                style("✓ Complete:").green().bold(),
                stats.found
            );
        } else {
            println!(
                "{} All {} videos processed ({} downloaded, {} already recovered).",
                style("✓ Complete:").green().bold(),
                stats.found,
                stats.completed,
                stats.skipped
            );
        }
    } else if stats.failed > 0 {
        println!(
            "{} {} video(s) could not be recovered. Success rate: {:.1}%",
            style("✗ Incomplete:").red().bold(),
            stats.failed,
            stats.success_rate()
        );
    }

    println!("{}", style("═".repeat(50)).dim());
}
