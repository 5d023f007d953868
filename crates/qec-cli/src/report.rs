//! Terminal output for register counts and QEC summaries.

use console::style;

use qec_codes::{QecReport, decode_syndrome};
use qec_hal::Counts;

/// Outcomes shown per register before the rest are summarized.
pub const MAX_ROWS: usize = 16;

/// One line of a counts table.
#[derive(Debug, Clone, PartialEq)]
pub struct CountRow {
    pub bitstring: String,
    pub count: u64,
    pub percent: f64,
    /// Width of the bar in characters, one per two percent.
    pub bar_len: usize,
}

/// The `limit` most frequent outcomes of `counts`.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn count_rows(counts: &Counts, limit: usize) -> Vec<CountRow> {
    let total = counts.total_shots();
    counts
        .sorted()
        .into_iter()
        .take(limit)
        .map(|(bitstring, &count)| {
            let percent = if total == 0 {
                0.0
            } else {
                count as f64 / total as f64 * 100.0
            };
            CountRow {
                bitstring: bitstring.clone(),
                count,
                percent,
                bar_len: (percent / 2.0).round() as usize,
            }
        })
        .collect()
}

/// Print a counts table with percentage bars.
pub fn print_counts(title: &str, counts: &Counts) {
    println!(
        "\n{} {} ({} shots):",
        style("✓").green().bold(),
        title,
        counts.total_shots()
    );

    for row in count_rows(counts, MAX_ROWS) {
        println!(
            "  {}: {:>6} ({:>5.2}%) {}",
            style(&row.bitstring).cyan(),
            row.count,
            row.percent,
            style("█".repeat(row.bar_len)).green()
        );
    }

    if counts.len() > MAX_ROWS {
        println!("  ... and {} more outcomes", counts.len() - MAX_ROWS);
    }
}

/// Label for a syndrome bitstring, e.g. `"flip on q2"`.
pub fn syndrome_label(bits: &str) -> String {
    match u64::from_str_radix(bits, 2).ok().map(decode_syndrome) {
        Some(Some(qubit)) => format!("flip on q{qubit}"),
        Some(None) => "no error".to_string(),
        None => "unrecognized".to_string(),
    }
}

/// Print both register tables and the derived error-correction figures.
pub fn print_report(report: &QecReport) {
    print_counts("Result register", &report.result_counts);
    print_counts("Syndrome register", &report.syndrome_counts);

    println!("\n{} Error correction:", style("→").cyan().bold());
    println!(
        "  Logical success:  {:>6.2}% (majority equals {})",
        report.logical_success_rate * 100.0,
        style(&report.expected_result).cyan()
    );
    println!(
        "  Exact readout:    {:>6.2}%",
        report.exact_success_rate * 100.0
    );
    if let Some((bits, count)) = &report.most_frequent_syndrome {
        println!(
            "  Top syndrome:     {} x{} ({})",
            style(bits).cyan(),
            count,
            syndrome_label(bits)
        );
    }
    println!(
        "  Corrections:      q0 {}, q1 {}, q2 {}",
        report.corrections[0], report.corrections[1], report.corrections[2]
    );
}
