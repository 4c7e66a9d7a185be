//! Pure formatting functions for UI output.
//!
//! This module contains all display/formatting logic separated from input handling.

use crate::domain::{DeleteTag, Disposition};
use crate::retention::{GroupedItem, WindowOutcome};
use crate::skip::SkipReason;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("\x1b[31mERROR:\x1b[0m {}", message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("\x1b[32m✓\x1b[0m {}", message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("\x1b[33m→\x1b[0m {}", message);
}

/// One line per tag: `keep` or `delete` followed by the tag name
pub fn format_keep_line(tag: &str, keep: bool) -> String {
    format!("{:<6} {}", if keep { "keep" } else { "delete" }, tag)
}

/// One line per tag with its disposition
pub fn format_disposition_line(tag: &str, disposition: Disposition) -> String {
    let marker = if disposition.is_deletable() { "delete" } else { "keep" };
    format!("{:<6} {:<24} {}", marker, disposition.as_str(), tag)
}

/// One line per planned deletion
pub fn format_delete_line(delete: &DeleteTag) -> String {
    format!(
        "delete image={}:{} reason={}",
        delete.repository, delete.tag, delete.disposition
    )
}

/// Display a date-window evaluation.
///
/// Kept and deletable tags are listed newest first, followed by the tags
/// that were skipped and why.
pub fn display_window_outcome(outcome: &WindowOutcome) {
    if outcome.used_minimum {
        display_status("Retention window kept too few dates, kept newest builds instead");
    }

    for candidate in &outcome.candidates {
        println!(
            "{}",
            format_keep_line(&candidate.name, outcome.keep.contains(&candidate.name))
        );
    }

    for reason in &outcome.skipped {
        display_skip(reason);
    }
}

/// Display a skipped tag in dim text
pub fn display_skip(reason: &SkipReason) {
    println!("\x1b[2mskip   {}\x1b[0m", reason);
}

/// Display the deletable items of one bucket group
pub fn display_group(group: &str, deletable: &[GroupedItem]) {
    println!("\n\x1b[1mGroup '{}'\x1b[0m", group);

    if deletable.is_empty() {
        println!("  nothing to delete");
        return;
    }

    for item in deletable {
        println!("  delete {}", item);
    }
}
