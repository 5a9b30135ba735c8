//! Text report of a finished scan
//!
//! Rendering is a pure function of the accumulator and the options; it
//! never touches the filesystem.

use crate::usage::{Usage, UsageAccumulator};

/// Binary units used by human-readable output
const UNITS: [&str; 6] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB"];

const LABEL_WIDTH: usize = 20;
const ID_WIDTH: usize = 18;
const VALUE_WIDTH: usize = 24;
const COUNT_WIDTH: usize = 12;

/// Order of the per-user and per-group lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SortOrder {
    /// Ascending by byte usage
    #[default]
    Usage,
    /// Ascending by numeric id
    Id,
    /// Ascending by entry count
    Entries,
}

/// Report rendering options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReportOptions {
    /// Binary units instead of raw byte counts
    pub human_readable: bool,
    pub sort: SortOrder,
    /// Trailing entry-count column
    pub show_counts: bool,
    /// Percentage of the total bytes and entries, plus bytes per entry.
    /// Implies the entry-count column.
    pub show_shares: bool,
}

/// Format a byte count with binary units and two decimals
///
/// Each step divides by 1024 while the value is at least one full unit
/// and a larger unit remains: 1536 -> "1.50 KiB", 0 -> "0.00 B".
pub fn format_bytes(bytes: u64) -> String {
    format_scaled(bytes as f64)
}

fn format_scaled(mut value: f64) -> String {
    let mut unit = 0;

    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }

    format!("{:.2} {}", value, UNITS[unit])
}

/// Render with default options apart from unit selection
pub fn render(acc: &UsageAccumulator, human_readable: bool) -> String {
    render_with(
        acc,
        &ReportOptions {
            human_readable,
            ..ReportOptions::default()
        },
    )
}

/// Render the full report
pub fn render_with(acc: &UsageAccumulator, options: &ReportOptions) -> String {
    let mut out = String::new();

    let total = acc.total();

    out.push_str(&format!(
        "{:<LABEL_WIDTH$} {:>VALUE_WIDTH$}{}\n",
        "Total usage",
        value_text(total.bytes, options),
        trailing_text(total, total, options),
    ));

    out.push_str("Per-user usage\n");
    for (uid, usage) in sorted(acc.by_owner().iter(), options.sort) {
        push_row(&mut out, uid, usage, total, options);
    }

    out.push_str("Per-group usage\n");
    for (gid, usage) in sorted(acc.by_group().iter(), options.sort) {
        push_row(&mut out, gid, usage, total, options);
    }

    out
}

/// Entries ordered per `order`; equal keys fall back to id order
pub fn sorted<'a, I>(entries: I, order: SortOrder) -> Vec<(u32, Usage)>
where
    I: Iterator<Item = (&'a u32, &'a Usage)>,
{
    let mut rows: Vec<(u32, Usage)> = entries.map(|(id, usage)| (*id, *usage)).collect();
    match order {
        SortOrder::Usage => rows.sort_by_key(|(id, usage)| (usage.bytes, *id)),
        SortOrder::Id => rows.sort_by_key(|(id, _)| *id),
        SortOrder::Entries => rows.sort_by_key(|(id, usage)| (usage.entries, *id)),
    }
    rows
}

fn push_row(out: &mut String, id: u32, usage: Usage, total: Usage, options: &ReportOptions) {
    out.push_str(&format!(
        "  {:>ID_WIDTH$} {:>VALUE_WIDTH$}{}\n",
        id,
        value_text(usage.bytes, options),
        trailing_text(usage, total, options),
    ));
}

fn value_text(bytes: u64, options: &ReportOptions) -> String {
    if options.human_readable {
        format_bytes(bytes)
    } else {
        bytes.to_string()
    }
}

/// Everything after the value column: byte share, count, entry share and
/// bytes per entry, each only when enabled
fn trailing_text(usage: Usage, total: Usage, options: &ReportOptions) -> String {
    let mut text = String::new();

    if options.show_shares {
        text.push_str(&format!(" ({:6.2}%)", percent(usage.bytes, total.bytes)));
    }
    if options.show_counts || options.show_shares {
        text.push_str(&format!(" {:>COUNT_WIDTH$}", usage.entries));
    }
    if options.show_shares {
        let per_entry = if usage.entries == 0 {
            0.0
        } else {
            usage.bytes as f64 / usage.entries as f64
        };
        let per_entry = if options.human_readable {
            format_scaled(per_entry)
        } else {
            format!("{:.0} B", per_entry)
        };
        text.push_str(&format!(
            " ({:6.2}%) @ {}/inode",
            percent(usage.entries, total.entries),
            per_entry
        ));
    }

    text
}

/// `part` as a percentage of `whole`; an empty whole is 0%
fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        100.0 * part as f64 / whole as f64
    }
}
