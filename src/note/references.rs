//! Image and attachment reference scanning
//!
//! Runs over the final Markdown of any note format. Images are the targets of
//! `![alt](ref)` that still point at local files; attachments are links in
//! the private [`ATTACHMENT_SCHEME`] written for office and drawio embeds.

use std::sync::LazyLock;

use indexmap::IndexSet;
use regex::Regex;

pub const ATTACHMENT_SCHEME: &str = "wiz-collab-attachment://";

const IMAGE_DIR_PREFIX: &str = "index_files/";

static IMAGE_LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!\[.*?\]\((.*?)\)").unwrap());

static ATTACHMENT_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\[(.+?)\]\({}([^)]+)\)",
        regex::escape(ATTACHMENT_SCHEME)
    ))
    .unwrap()
});

/// Local image names that need uploading, deduplicated in first-seen order.
pub fn extract_images(markdown: &str) -> Vec<String> {
    IMAGE_LINK
        .captures_iter(markdown)
        .filter_map(|caps| caps.get(1))
        .map(|target| target.as_str())
        .filter(|target| !target.starts_with("http"))
        .map(|target| target.strip_prefix(IMAGE_DIR_PREFIX).unwrap_or(target))
        .filter(|target| !target.starts_with("data:image") && !target.is_empty())
        .map(ToOwned::to_owned)
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

/// Targets of attachment links outside fenced code, escaped brackets excluded.
pub fn extract_attachment_links(markdown: &str) -> Vec<String> {
    let mut in_fence = false;
    let mut links = Vec::new();
    for line in markdown.lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        for caps in ATTACHMENT_LINK.captures_iter(line) {
            let (Some(whole), Some(label), Some(target)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            let escaped_open = line[..whole.start()].ends_with('\\');
            let escaped_close = label.as_str().ends_with('\\');
            if !escaped_open && !escaped_close {
                links.push(target.as_str().to_owned());
            }
        }
    }
    links
}

#[cfg(test)]
mod tests {
    use super::{extract_attachment_links, extract_images};

    #[test]
    fn test_extract_images() {
        let markdown = "![a](index_files/a.png)\n![b](b.jpg) ![remote](https://x/y.png)\n\
            ![inline](data:image/png;base64,AAAA) ![empty]() ![again](a.png) ![c](http://c)";
        assert_eq!(extract_images(markdown), vec!["a.png".to_string(), "b.jpg".to_string()]);
    }

    #[test]
    fn test_plain_links_are_not_images() {
        assert!(extract_images("[doc](file.pdf) [x](wiz-collab-attachment://y.zip)").is_empty());
    }

    #[test]
    fn test_extract_attachment_links() {
        let markdown = r"
# Links
![image](image.png)
[文档附件](wiz-collab-attachment://document.pdf)
[外部网站](https://www.example.com)
[另一个类似链接](wiz-attachment://fake.pdf)
有一个图片 ![内联图片](inline.png) 和一个附件 [重要文档](wiz-collab-attachment://important.docx)，还有 [官网](https://official.site)。
[带空格附件](wiz-collab-attachment://file with spaces.txt)
\[转义链接\](wiz-collab-attachment://escaped.pdf)
[[双重括号]](wiz-collab-attachment://double-bracket.txt)
> 引用块中的附件：[引用附件](wiz-collab-attachment://quoted-file.zip)
| 行1 | [表格附件](wiz-collab-attachment://table-file.csv) | [表格链接](https://table.link) |

```text
[代码中的附件](wiz-collab-attachment://code-file.py)
```
";
        assert_eq!(
            extract_attachment_links(markdown),
            vec![
                "document.pdf",
                "important.docx",
                "file with spaces.txt",
                "double-bracket.txt",
                "quoted-file.zip",
                "table-file.csv",
            ]
        );
    }
}
