//! help::table
//!
//! Two-column layout with the right column aligned.

const INDENT: &str = "  ";
const GAP: &str = "    ";

#[derive(Debug, Default)]
pub(super) struct Table {
    rows: Vec<(String, String)>,
}

impl Table {
    pub(super) fn new() -> Self {
        Self::default()
    }

    pub(super) fn row(&mut self, left: impl Into<String>, right: impl Into<String>) {
        self.rows.push((left.into(), right.into()));
    }

    pub(super) fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub(super) fn render(&self) -> String {
        let width = self
            .rows
            .iter()
            .map(|(left, _)| left.chars().count())
            .max()
            .unwrap_or(0);

        let mut out = String::new();
        for (left, right) in &self.rows {
            let line = if right.is_empty() {
                format!("{}{}", INDENT, left)
            } else {
                format!("{}{:<width$}{}{}", INDENT, left, GAP, right, width = width)
            };
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}
