//! Inline run formatting
//!
//! A run carries at most one effective style: attributes are checked in a
//! fixed priority order and the first hit decides the output. Combined styles
//! (bold and italic on the same run) collapse to the higher-priority one.

use super::model::Run;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStyle<'a> {
    WikiLink {
        name: &'a str,
        secondary: Option<&'a str>,
    },
    Math {
        tex: &'a str,
    },
    Link(&'a str),
    Code,
    Italic,
    Bold,
    Strikethrough,
    /// Superscript and subscript; Markdown has no syntax for either.
    Script,
    Highlight,
    Plain,
}

const HIGHLIGHT_PREFIXES: [&str; 2] = ["style-color-", "style-bg-color-"];

impl Run {
    pub fn style(&self) -> RunStyle<'_> {
        let Some(attributes) = &self.attributes else {
            return RunStyle::Plain;
        };
        match self.attr_str("type") {
            Some("wiki-link") => {
                return RunStyle::WikiLink {
                    name: self.attr_str("name").unwrap_or_default(),
                    secondary: self.attr_str("secondaryName"),
                };
            }
            Some("math") => {
                return RunStyle::Math {
                    tex: self.attr_str("tex").unwrap_or_default(),
                };
            }
            _ => {}
        }
        if let Some(link) = self.attr_str("link") {
            RunStyle::Link(link)
        } else if self.has_attr("style-code") {
            RunStyle::Code
        } else if self.has_attr("style-italic") {
            RunStyle::Italic
        } else if self.has_attr("style-bold") {
            RunStyle::Bold
        } else if self.has_attr("style-strikethrough") {
            RunStyle::Strikethrough
        } else if self.has_attr("style-super") || self.has_attr("style-sub") {
            RunStyle::Script
        } else if attributes
            .keys()
            .any(|key| HIGHLIGHT_PREFIXES.iter().any(|prefix| key.starts_with(prefix)))
        {
            RunStyle::Highlight
        } else {
            RunStyle::Plain
        }
    }
}

pub fn format_run(run: &Run) -> String {
    let insert = run.insert.as_str();
    match run.style() {
        RunStyle::WikiLink { name, secondary } => {
            let name = name.strip_suffix(".md").unwrap_or(name);
            match secondary {
                Some(secondary) => format!("[[{secondary}|{name}]]"),
                None => format!("[[{name}]]"),
            }
        }
        RunStyle::Math { tex } => format!("${}$", tex.trim()),
        RunStyle::Link(link) => format!("[{insert}]({link})"),
        RunStyle::Code => format!("`{insert}`"),
        RunStyle::Italic => format!("*{insert}*"),
        RunStyle::Bold => format!("**{insert}**"),
        RunStyle::Strikethrough => format!("~~{insert}~~"),
        RunStyle::Script | RunStyle::Plain => insert.to_owned(),
        RunStyle::Highlight => format!("=={insert}=="),
    }
}

pub fn format_runs(runs: &[Run]) -> String {
    runs.iter().map(format_run).collect()
}
