//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Status
//!
//! ```text
//! dawn.jpg
//!     Dimensions: 4000 x 3000
//!     Zoom: 20%
//!     Size: 2.4 MB
//! ```
//!
//! ## Siblings
//!
//! ```text
//! 001   aurora.png
//! 002 * dawn.jpg
//! 003   mountains.gif
//! ```
//!
//! ## Render
//!
//! ```text
//! dawn.jpg → out.png (4000x3000, zoom 20%, 31 frames)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::session::StatusInfo;
use crate::siblings::SiblingSet;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Human-readable byte count with one decimal above 1 KB.
///
/// ```text
/// 512 B
/// 1.0 KB
/// 2.4 MB
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

// ============================================================================
// Status
// ============================================================================

pub fn format_status(status: &StatusInfo) -> Vec<String> {
    let mut lines = vec![status.file_name.clone()];
    lines.push(format!(
        "{}Dimensions: {} x {}",
        indent(1),
        status.width,
        status.height
    ));
    lines.push(format!("{}Zoom: {}%", indent(1), status.zoom_percent));
    if let Some(bytes) = status.file_size {
        lines.push(format!("{}Size: {}", indent(1), format_size(bytes)));
    }
    lines
}

pub fn print_status(status: &StatusInfo) {
    for line in format_status(status) {
        println!("{}", line);
    }
}

// ============================================================================
// Siblings
// ============================================================================

/// One line per sibling, the current image marked with `*`.
pub fn format_siblings(siblings: &SiblingSet) -> Vec<String> {
    if siblings.is_empty() {
        return vec!["No images found".to_string()];
    }
    siblings
        .paths()
        .iter()
        .enumerate()
        .map(|(i, path)| {
            let marker = if siblings.current_index() == Some(i) {
                '*'
            } else {
                ' '
            };
            format!("{} {} {}", format_index(i + 1), marker, file_name(path))
        })
        .collect()
}

pub fn print_siblings(siblings: &SiblingSet) {
    for line in format_siblings(siblings) {
        println!("{}", line);
    }
}

// ============================================================================
// Render
// ============================================================================

pub fn format_render_summary(status: &StatusInfo, output: &Path, frames: usize) -> String {
    let frames = match frames {
        1 => "1 frame".to_string(),
        n => format!("{n} frames"),
    };
    format!(
        "{} → {} ({}x{}, zoom {}%, {})",
        status.file_name,
        file_name(output),
        status.width,
        status.height,
        status.zoom_percent,
        frames
    )
}
