//! Common display utilities for CLI commands.

use colored::Colorize;

/// Longest list printed before truncating.
pub const MAX_DISPLAY_ITEMS: usize = 10;

/// Display a bulleted list with truncation.
///
/// Shows up to `MAX_DISPLAY_ITEMS` items. If there are more, shows
/// "... and N more". If empty, shows the provided `empty_message`.
pub fn print_list<S: AsRef<str>>(items: &[S], empty_message: &str) {
    if items.is_empty() {
        println!("    {}", empty_message.dimmed());
        return;
    }

    for item in items.iter().take(MAX_DISPLAY_ITEMS) {
        println!("    {} {}", "•".dimmed(), item.as_ref());
    }

    if items.len() > MAX_DISPLAY_ITEMS {
        println!(
            "    {} ... and {} more",
            "•".dimmed(),
            items.len() - MAX_DISPLAY_ITEMS
        );
    }
}

/// Display a labelled section header followed by its list.
pub fn print_section<S: AsRef<str>>(title: &str, items: &[S], empty_message: &str) {
    println!(
        "  {} ({}):",
        title.white().bold(),
        items.len().to_string().green()
    );
    print_list(items, empty_message);
}
