//! Sibling set: the images next to the current one, in browse order.
//!
//! Built once per load by listing the image's directory (one level, no
//! recursion), keeping files with a supported extension, and sorting by file
//! name. Navigation wraps at both ends. A directory that cannot be listed
//! produces an empty set; navigating an empty set is a no-op.
//! [`SiblingSet::walk`] yields every candidate in browse order so a caller can
//! step past files that fail to decode.

use crate::imaging::is_supported_image;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

/// Ordered sibling paths plus the position of the current image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiblingSet {
    paths: Vec<PathBuf>,
    current: Option<usize>,
}

impl SiblingSet {
    /// List the directory containing `image` and locate `image` in it.
    pub fn scan(image: &Path) -> Self {
        let dir = match image.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut paths = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if entry.file_type().is_file() && is_supported_image(path) {
                        paths.push(path.to_path_buf());
                    }
                }
                Err(e) if e.depth() == 0 => {
                    log::warn!("Cannot list {}: {e}", dir.display());
                    return Self::default();
                }
                Err(e) => log::warn!("Skipping unreadable entry: {e}"),
            }
        }

        Self::from_paths(paths, image)
    }

    /// Build a set from an already-listed directory. Sorts by file name and
    /// marks `current` if present.
    pub fn from_paths(mut paths: Vec<PathBuf>, current: &Path) -> Self {
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        let current = current
            .file_name()
            .and_then(|name| paths.iter().position(|p| p.file_name() == Some(name)));
        log::debug!("{} sibling image(s), current {:?}", paths.len(), current);
        Self { paths, current }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Index of the current image, if it is part of the set.
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current(&self) -> Option<&Path> {
        self.current.map(|i| self.paths[i].as_path())
    }

    /// Index one step away in `direction`, wrapping around.
    ///
    /// When the current image is not in the set, `Next` starts at the first
    /// entry and `Prev` at the last.
    pub fn neighbor_index(&self, direction: Direction) -> Option<usize> {
        let len = self.paths.len();
        if len == 0 {
            return None;
        }
        Some(match (self.current, direction) {
            (Some(i), Direction::Next) => (i + 1) % len,
            (Some(i), Direction::Prev) => (i + len - 1) % len,
            (None, Direction::Next) => 0,
            (None, Direction::Prev) => len - 1,
        })
    }

    pub fn neighbor(&self, direction: Direction) -> Option<&Path> {
        self.neighbor_index(direction)
            .map(|i| self.paths[i].as_path())
    }

    /// Entries in browse order starting one step away in `direction`, each
    /// visited once. The current image is skipped unless it is the only entry.
    pub fn walk(&self, direction: Direction) -> impl Iterator<Item = &Path> + '_ {
        let len = self.paths.len();
        let count = match self.current {
            Some(_) if len > 1 => len - 1,
            _ => len,
        };
        let step = match direction {
            Direction::Next => 1,
            Direction::Prev => len.saturating_sub(1),
        };
        let start = self.neighbor_index(direction).unwrap_or(0);
        (0..count).map(move |k| self.paths[(start + k * step) % len].as_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::write_png;

    fn set(names: &[&str], current: &str) -> SiblingSet {
        let paths = names.iter().map(|n| PathBuf::from("/pics").join(n)).collect();
        SiblingSet::from_paths(paths, &Path::new("/pics").join(current))
    }

    #[test]
    fn next_wraps_from_last_to_first() {
        let s = set(&["a.png", "b.png", "c.png"], "c.png");
        assert_eq!(s.current_index(), Some(2));
        assert_eq!(s.neighbor_index(Direction::Next), Some(0));
    }

    #[test]
    fn prev_wraps_from_first_to_last() {
        let s = set(&["a.png", "b.png", "c.png"], "a.png");
        assert_eq!(s.neighbor_index(Direction::Prev), Some(2));
        assert_eq!(s.neighbor(Direction::Prev), Some(Path::new("/pics/c.png")));
    }

    #[test]
    fn middle_moves_one_step() {
        let s = set(&["a.png", "b.png", "c.png"], "b.png");
        assert_eq!(s.neighbor_index(Direction::Prev), Some(0));
        assert_eq!(s.neighbor_index(Direction::Next), Some(2));
    }

    #[test]
    fn single_image_wraps_to_itself() {
        let s = set(&["only.jpg"], "only.jpg");
        assert_eq!(s.neighbor_index(Direction::Next), Some(0));
        assert_eq!(s.neighbor_index(Direction::Prev), Some(0));
    }

    #[test]
    fn walk_visits_every_other_entry_in_browse_order() {
        let s = set(&["a.png", "b.png", "c.png", "d.png"], "b.png");
        let names = |dir| -> Vec<_> {
            s.walk(dir)
                .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
                .collect()
        };
        assert_eq!(names(Direction::Next), ["c.png", "d.png", "a.png"]);
        assert_eq!(names(Direction::Prev), ["a.png", "d.png", "c.png"]);
    }

    #[test]
    fn walk_edges() {
        let only = set(&["only.jpg"], "only.jpg");
        assert_eq!(only.walk(Direction::Next).count(), 1);

        let unknown = set(&["a.png", "b.png"], "zzz.png");
        let prev: Vec<_> = unknown.walk(Direction::Prev).collect();
        assert_eq!(prev, [Path::new("/pics/b.png"), Path::new("/pics/a.png")]);

        assert_eq!(SiblingSet::default().walk(Direction::Next).count(), 0);
    }

    #[test]
    fn empty_set_has_no_neighbor() {
        let s = SiblingSet::default();
        assert!(s.is_empty());
        assert_eq!(s.neighbor(Direction::Next), None);
        assert_eq!(s.current(), None);
    }

    #[test]
    fn unknown_current_starts_at_ends() {
        let s = set(&["a.png", "b.png"], "zzz.png");
        assert_eq!(s.current_index(), None);
        assert_eq!(s.neighbor_index(Direction::Next), Some(0));
        assert_eq!(s.neighbor_index(Direction::Prev), Some(1));
    }

    #[test]
    fn sorted_by_file_name() {
        let s = set(&["c.png", "a.png", "b.png"], "a.png");
        let names: Vec<_> = s
            .paths()
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, ["a.png", "b.png", "c.png"]);
        assert_eq!(s.current_index(), Some(0));
    }

    #[test]
    fn scan_keeps_supported_images_only() {
        let tmp = tempfile::TempDir::new().unwrap();
        write_png(&tmp.path().join("b.png"), 2, 2);
        write_png(&tmp.path().join("a.PNG"), 2, 2);
        std::fs::write(tmp.path().join("notes.txt"), "hi").unwrap();
        std::fs::write(tmp.path().join("c.JPG"), "not decoded here").unwrap();
        std::fs::create_dir(tmp.path().join("sub.png")).unwrap();
        write_png(&tmp.path().join("sub.png/nested.png"), 2, 2);

        let s = SiblingSet::scan(&tmp.path().join("b.png"));
        let names: Vec<_> = s
            .paths()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, ["a.PNG", "b.png", "c.JPG"]);
        assert_eq!(s.current(), Some(tmp.path().join("b.png").as_path()));
    }

    #[test]
    fn scan_missing_directory_is_empty() {
        let s = SiblingSet::scan(Path::new("/nonexistent/dir/image.png"));
        assert!(s.is_empty());
        assert_eq!(s.neighbor(Direction::Next), None);
    }
}
