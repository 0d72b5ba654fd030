//! Markdown post-processing
//!
//! A fixed pipeline of text repairs applied once to every converted note,
//! whatever its source format. Each stage is a plain `&str -> String`
//! function so it can be run and tested on its own.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

static HEADING_WITHOUT_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})(\w)").unwrap());

const FENCE: &str = "```";

pub type Stage = fn(&str) -> String;

pub const STAGES: [(&str, Stage); 4] = [
    ("heading-space", fix_heading_space),
    ("code-fence-blank-lines", collapse_code_blank_lines),
    ("escaped-hyphen", unescape_list_markers),
    ("blank-runs", collapse_blank_runs),
];

pub fn fix(content: &str) -> String {
    STAGES
        .iter()
        .fold(content.to_owned(), |content, (name, stage)| {
            trace!(stage = name, "fix markdown");
            stage(&content)
        })
}

/// `##Title` becomes `## Title`.
pub fn fix_heading_space(content: &str) -> String {
    content
        .split('\n')
        .map(|line| HEADING_WITHOUT_SPACE.replace(line, "$1 $2"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Drop the blank line the block format inserts after every code line.
///
/// Inside a fence, lines are counted from the opening marker; a blank line at
/// an even position is dropped and a non-blank one shifts the count by one.
pub fn collapse_code_blank_lines(content: &str) -> String {
    let mut in_fence = false;
    let mut position = 0usize;
    let mut lines = Vec::new();
    for line in content.split('\n') {
        if line.starts_with(FENCE) {
            in_fence = !in_fence;
            position = 0;
        }
        if in_fence {
            position += 1;
            if position % 2 == 0 {
                if line.trim().is_empty() {
                    continue;
                }
                position += 1;
            }
        }
        lines.push(line);
    }
    lines.join("\n")
}

pub fn unescape_list_markers(content: &str) -> String {
    content.replace("\\- ", "- ")
}

pub fn collapse_blank_runs(content: &str) -> String {
    content
        .replace("\n\n\n\n", "\n\n")
        .replace("\n\n \n\n", "\n\n")
        .replace("\n\n \n\n", "\n\n")
}

#[cfg(test)]
mod tests {
    use super::{
        collapse_blank_runs, collapse_code_blank_lines, fix, fix_heading_space,
        unescape_list_markers,
    };

    #[test]
    fn test_heading_space() {
        assert_eq!(fix_heading_space("##Title"), "## Title");
        assert_eq!(fix_heading_space("#标题\ntext\n###x y"), "# 标题\ntext\n### x y");
        assert_eq!(fix_heading_space("## already"), "## already");
        assert_eq!(fix_heading_space("#######seven"), "#######seven");
        assert_eq!(fix_heading_space("#!bang"), "#!bang");
        assert_eq!(fix_heading_space("text #tag"), "text #tag");
    }

    #[test]
    fn test_heading_space_idempotent() {
        let samples = ["##a\n#b\n", "# a", "######x", "#\n##\n", "plain", ""];
        for sample in samples {
            let once = fix_heading_space(sample);
            assert_eq!(fix_heading_space(&once), once, "{sample:?}");
        }
    }

    #[test]
    fn test_code_blank_lines() {
        let input = "```rust\nfn main() {\n\n    run();\n\n}\n\n```\nafter\n\nkept";
        assert_eq!(
            collapse_code_blank_lines(input),
            "```rust\nfn main() {\n    run();\n}\n```\nafter\n\nkept"
        );
    }

    #[test]
    fn test_code_blank_lines_shift_on_content() {
        let input = "```\na\nb\n\nc\n```";
        assert_eq!(collapse_code_blank_lines(input), "```\na\nb\nc\n```");
    }

    #[test]
    fn test_outside_fence_untouched() {
        let input = "a\n\n\nb\n";
        assert_eq!(collapse_code_blank_lines(input), input);
    }

    #[test]
    fn test_unescape_list_markers() {
        assert_eq!(unescape_list_markers("\\- item\n\\-not"), "- item\n\\-not");
    }

    #[test]
    fn test_blank_runs() {
        assert_eq!(collapse_blank_runs("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(collapse_blank_runs("a\n\n \n\nb"), "a\n\nb");
        assert_eq!(collapse_blank_runs("a\n\n \n\n \n\nb"), "a\n\nb");
        assert_eq!(collapse_blank_runs("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_pipeline_order() {
        let input = "##Title\n\n\n\n```\nx\n\n```\n\\- item\n";
        assert_eq!(fix(input), "## Title\n\n```\nx\n```\n- item\n");
    }
}
