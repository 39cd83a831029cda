//! Progress reporting and summaries for the CLI

use std::io::{self, Write};
use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar counting finished files in a batch run
pub fn batch_progress(total_files: u64) -> ProgressBar {
    let bar = ProgressBar::new(total_files);
    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")
        .map(|s| s.progress_chars("█▓▒░-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar
}

/// Summary of a single deduplication run
pub struct Summary<'a> {
    pub input: &'a Path,
    /// `None` for dry runs
    pub output: Option<&'a str>,
    pub key_column: &'a str,
    pub total: usize,
    pub unique: usize,
    pub duplicates: usize,
    pub duplicate_report: &'a str,
}

/// Print a formatted summary report
pub fn print_summary_report<W: Write>(out: &mut W, summary: &Summary<'_>) -> io::Result<()> {
    writeln!(out, "\n{}", "═".repeat(60))?;
    writeln!(out, "CSV Deduplication Complete")?;
    writeln!(out, "{}", "═".repeat(60))?;
    writeln!(out, "Input:              {}", summary.input.display())?;

    match summary.output {
        Some(output) => writeln!(out, "Output:             {}", output)?,
        None => writeln!(out, "Output:             (dry run - no output written)")?,
    }

    writeln!(out, "Key column:         {}", summary.key_column)?;
    writeln!(out, "Total rows:         {}", format_with_commas(summary.total))?;

    if summary.duplicates > 0 {
        writeln!(
            out,
            "Duplicates removed: {} ({:.1}%)",
            format_with_commas(summary.duplicates),
            percent(summary.duplicates, summary.total)
        )?;
    }

    writeln!(
        out,
        "Final rows:         {} ({:.1}%)",
        format_with_commas(summary.unique),
        percent(summary.unique, summary.total)
    )?;
    writeln!(out, "Duplicate values:   {}", summary.duplicate_report)?;

    writeln!(out, "{}", "═".repeat(60))
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}

/// Format number with thousand separators
fn format_with_commas(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
