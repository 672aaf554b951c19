//! Prefix codec: renders, recognizes, and rewrites the conventional-comment
//! prefix at the start of a comment body.
//!
//! Two grammars are recognized, always anchored at byte 0 of the whole buffer:
//!
//! - plain: `issue(blocking): ` where both words come from the closed sets in
//!   [`crate::labels`];
//! - badge: `[![](https://img.shields.io/badge/...)](https://pullpo.io/cc?l=...)`
//!   followed by a line break, as produced by [`render`] in prettify mode.
//!
//! Anything that only resembles a prefix is left alone and treated as subject text.

use std::sync::LazyLock;

use regex::Regex;

use crate::labels::{CommentType, Decoration};

/// Host serving the generated badge images.
pub const BADGE_BASE: &str = "https://img.shields.io/badge/";
/// Endpoint the badge links to; carries the type and decoration as query params.
pub const ANNOTATION_BASE: &str = "https://pullpo.io/cc?";

static PLAIN_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    let types = CommentType::ALL.map(|t| regex::escape(t.label())).join("|");
    let decorations = Decoration::ALL.map(|d| regex::escape(d.label())).join("|");
    Regex::new(&format!(r"^({types})(?:\(({decorations})\))?:[ \t]*"))
        .expect("plain prefix pattern is built from fixed labels")
});

/// A prefix found at the start of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detected {
    /// Byte length of the prefix, trailing spaces included, line break excluded.
    pub len: usize,
    pub comment_type: CommentType,
    pub decoration: Option<Decoration>,
    /// `true` when the badge grammar matched.
    pub prettified: bool,
}

/// Result of [`apply`]: the rewritten buffer and where the cursor should land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub text: String,
    /// Byte offset into `text`.
    pub cursor: usize,
}

/// Renders the prefix for `comment_type` / `decoration` in the requested format.
///
/// Plain mode yields `type(decoration): `. Prettify mode yields a badge image
/// wrapped in a link to the annotation endpoint, terminated by `\n` so the
/// comment text starts on its own line.
pub fn render(comment_type: CommentType, decoration: Option<Decoration>, prettify: bool) -> String {
    if prettify {
        format!(
            "[![]({})]({})\n",
            badge_url(comment_type, decoration),
            annotation_url(comment_type, decoration)
        )
    } else {
        match decoration {
            Some(d) => format!("{}({}): ", comment_type.label(), d.label()),
            None => format!("{}: ", comment_type.label()),
        }
    }
}

/// Builds the shields.io badge URL for a type and optional decoration.
///
/// With a decoration the badge reads `type | decoration`, the message half
/// colored by the decoration and the label half by the type. Without one it is
/// a single type-colored segment.
pub fn badge_url(comment_type: CommentType, decoration: Option<Decoration>) -> String {
    let label = escape_badge_segment(comment_type.label());
    match decoration {
        Some(d) => format!(
            "{BADGE_BASE}{label}-{}-{}?labelColor={}",
            escape_badge_segment(d.label()),
            d.color(),
            comment_type.color()
        ),
        None => format!("{BADGE_BASE}{label}-{}", comment_type.color()),
    }
}

/// Builds the annotation link: `...cc?l=<type>` plus `&d=<decoration>` when present.
pub fn annotation_url(comment_type: CommentType, decoration: Option<Decoration>) -> String {
    let mut url = format!(
        "{ANNOTATION_BASE}l={}",
        urlencoding::encode(comment_type.label())
    );
    if let Some(d) = decoration {
        url.push_str("&d=");
        url.push_str(&urlencoding::encode(d.label()));
    }
    url
}

/// Shields.io treats `-` and `_` as markup in path segments; double them, then percent-encode.
fn escape_badge_segment(segment: &str) -> String {
    let escaped = segment.replace('-', "--").replace('_', "__");
    urlencoding::encode(&escaped).into_owned()
}

/// Recognizes a prefix at the very start of `buffer`.
///
/// The plain grammar is tried first, then the badge grammar. Returns `None`
/// unless one of them matches exactly.
pub fn detect(buffer: &str) -> Option<Detected> {
    detect_plain(buffer).or_else(|| detect_badge(buffer))
}

fn detect_plain(buffer: &str) -> Option<Detected> {
    let caps = PLAIN_PREFIX.captures(buffer)?;
    let comment_type = caps.get(1)?.as_str().parse().ok()?;
    let decoration = match caps.get(2) {
        Some(m) => Some(m.as_str().parse().ok()?),
        None => None,
    };
    Some(Detected {
        len: caps.get(0)?.end(),
        comment_type,
        decoration,
        prettified: false,
    })
}

fn detect_badge(buffer: &str) -> Option<Detected> {
    let head = format!("[![]({BADGE_BASE}");
    let rest = buffer.strip_prefix(head.as_str())?;
    let (badge, rest) = rest.split_once(')')?;

    let link_head = format!("]({ANNOTATION_BASE}");
    let rest = rest.strip_prefix(link_head.as_str())?;
    let (query, rest) = rest.split_once(')')?;

    let (comment_type, decoration) = parse_annotation_query(query)?;
    if !badge_matches(badge, comment_type, decoration) {
        return None;
    }

    let trailing = rest.len() - rest.trim_start_matches([' ', '\t']).len();
    Some(Detected {
        len: buffer.len() - rest.len() + trailing,
        comment_type,
        decoration,
        prettified: true,
    })
}

/// Parses `l=<type>` with an optional `&d=<decoration>`; nothing else is accepted.
fn parse_annotation_query(query: &str) -> Option<(CommentType, Option<Decoration>)> {
    let mut params = query.split('&');
    let comment_type = decode_param(params.next()?, "l")?.parse().ok()?;
    let decoration = match params.next() {
        Some(param) => Some(decode_param(param, "d")?.parse().ok()?),
        None => None,
    };
    if params.next().is_some() {
        return None;
    }
    Some((comment_type, decoration))
}

fn decode_param(param: &str, key: &str) -> Option<String> {
    let (k, v) = param.split_once('=')?;
    if k != key {
        return None;
    }
    urlencoding::decode(v).ok().map(|v| v.into_owned())
}

/// Checks the badge path against the type/decoration recovered from the link.
///
/// Accepts `<label>-<color>` when there is no decoration, and
/// `<label>-<message>-<color>?labelColor=<color>` when there is one. Colors
/// must be hex but are not compared against the registry.
fn badge_matches(badge: &str, comment_type: CommentType, decoration: Option<Decoration>) -> bool {
    let (path, query) = match badge.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (badge, None),
    };
    let Some(segments) = split_badge_path(path) else {
        return false;
    };

    match (decoration, segments.as_slice(), query) {
        (None, [label, color], None) => label == comment_type.label() && is_hex_color(color),
        (Some(d), [label, message, color], Some(query)) => {
            label == comment_type.label()
                && message == d.label()
                && is_hex_color(color)
                && query
                    .strip_prefix("labelColor=")
                    .is_some_and(is_hex_color)
        }
        _ => false,
    }
}

/// Splits a badge path on single dashes, undoing the `--` / `__` escapes.
fn split_badge_path(path: &str) -> Option<Vec<String>> {
    let decoded = urlencoding::decode(path).ok()?;
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = decoded.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '-' if chars.peek() == Some(&'-') => {
                chars.next();
                current.push('-');
            }
            '-' => segments.push(std::mem::take(&mut current)),
            '_' if chars.peek() == Some(&'_') => {
                chars.next();
                current.push('_');
            }
            '_' => current.push(' '),
            other => current.push(other),
        }
    }
    segments.push(current);
    Some(segments)
}

fn is_hex_color(s: &str) -> bool {
    (3..=8).contains(&s.len()) && s.chars().all(|c| c.is_ascii_hexdigit())
}

/// Removes a recognized prefix and one line break right after it.
///
/// Returns `buffer` untouched when no prefix is recognized.
pub fn strip(buffer: &str) -> &str {
    match detect(buffer) {
        Some(found) => skip_line_break(&buffer[found.len..]),
        None => buffer,
    }
}

fn skip_line_break(s: &str) -> &str {
    s.strip_prefix("\r\n")
        .or_else(|| s.strip_prefix('\n'))
        .unwrap_or(s)
}

/// Replaces whatever prefix `buffer` carries with the one for the given selection.
///
/// With `comment_type == None` the prefix is removed and the cursor goes to 0.
/// Otherwise the cursor lands right after the prefix. A badge ends in its own
/// line break, so the subject follows it verbatim. A plain prefix shares the
/// subject's first line: leading blanks and line breaks are dropped there,
/// since the plain grammar and `strip` would consume them on the next pass.
pub fn apply(
    buffer: &str,
    comment_type: Option<CommentType>,
    decoration: Option<Decoration>,
    prettify: bool,
) -> Applied {
    let subject = strip(buffer);
    let Some(comment_type) = comment_type else {
        return Applied {
            text: subject.to_owned(),
            cursor: 0,
        };
    };

    let prefix = render(comment_type, decoration, prettify);
    let cursor = prefix.len();
    let mut text = prefix;
    if prettify {
        text.push_str(subject);
    } else {
        text.push_str(subject.trim_start_matches(PLAIN_SEPARATORS));
    }
    Applied { text, cursor }
}

/// What may sit between a plain prefix and the subject text.
const PLAIN_SEPARATORS: [char; 4] = [' ', '\t', '\r', '\n'];

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn decorations() -> impl Iterator<Item = Option<Decoration>> {
        std::iter::once(None).chain(Decoration::ALL.into_iter().map(Some))
    }

    #[test]
    fn plain_render_omits_empty_decoration_clause() {
        assert_eq!(render(CommentType::Issue, None, false), "issue: ");
        assert_eq!(
            render(CommentType::Issue, Some(Decoration::Blocking), false),
            "issue(blocking): "
        );
    }

    #[test]
    fn badge_render_escapes_dashes_and_links_the_annotation_endpoint() {
        assert_eq!(
            render(CommentType::Nitpick, Some(Decoration::NonBlocking), true),
            "[![](https://img.shields.io/badge/nitpick-non--blocking-9CA3AF?labelColor=F59E0B)]\
             (https://pullpo.io/cc?l=nitpick&d=non-blocking)\n"
        );
        assert_eq!(
            render(CommentType::Praise, None, true),
            "[![](https://img.shields.io/badge/praise-28A745)](https://pullpo.io/cc?l=praise)\n"
        );
    }

    #[test]
    fn detect_recovers_every_rendered_selection() {
        for t in CommentType::ALL {
            for d in decorations() {
                for prettify in [false, true] {
                    let rendered = render(t, d, prettify);
                    let found = detect(&rendered).expect("rendered prefix is recognized");
                    assert_eq!(
                        (found.comment_type, found.decoration, found.prettified),
                        (t, d, prettify),
                        "{rendered:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn detect_only_matches_closed_set_words() {
        assert_eq!(detect("note: remember this"), None);
        assert_eq!(detect("issue(urgent): fix"), None);
        assert_eq!(detect("issues: many"), None);
        assert_eq!(detect("Issue: capitalized"), None);
    }

    #[test]
    fn detect_is_anchored_at_the_start_of_the_buffer() {
        assert_eq!(detect("hello\nissue: fix this"), None);
        assert_eq!(detect(" issue: leading space"), None);
    }

    #[test]
    fn malformed_badge_is_not_a_prefix() {
        // Label disagrees with the link's query.
        let mismatched = "[![](https://img.shields.io/badge/praise-28A745)](https://pullpo.io/cc?l=issue)\nx";
        assert_eq!(detect(mismatched), None);
        // Unknown decoration in the link.
        let unknown = "[![](https://img.shields.io/badge/issue-urgent-374151?labelColor=EF4444)](https://pullpo.io/cc?l=issue&d=urgent)\n";
        assert_eq!(detect(unknown), None);
        // Unterminated link.
        let truncated = "[![](https://img.shields.io/badge/praise-28A745)](https://pullpo.io/cc?l=praise";
        assert_eq!(detect(truncated), None);
        assert_eq!(strip(truncated), truncated);
    }

    #[test]
    fn badge_detection_tolerates_a_trailing_space_before_the_break() {
        let older = "[![](https://img.shields.io/badge/praise-28A745)](https://pullpo.io/cc?l=praise) \nnice";
        let found = detect(older).expect("older rendering is recognized");
        assert_eq!(found.comment_type, CommentType::Praise);
        assert_eq!(strip(older), "nice");
    }

    #[test]
    fn strip_removes_prefix_and_a_single_line_break() {
        let subject = "looks good\n\nsecond paragraph";
        for t in CommentType::ALL {
            for d in decorations() {
                for prettify in [false, true] {
                    let buffer = format!("{}{subject}", render(t, d, prettify));
                    assert_eq!(strip(&buffer), subject);
                }
            }
        }
        let badge = render(CommentType::Thought, None, true);
        assert_eq!(strip(&format!("{badge}\r\nbody")), "body");
        assert_eq!(strip(&format!("{badge}\n\nbody")), "\nbody");
    }

    #[test]
    fn apply_on_empty_buffer_places_cursor_after_prefix() {
        let applied = apply("", Some(CommentType::Suggestion), None, true);
        let prefix = render(CommentType::Suggestion, None, true);
        assert!(prefix.ends_with('\n'));
        assert_eq!(applied.text, prefix);
        assert_eq!(applied.cursor, applied.text.len());
    }

    #[test]
    fn apply_swaps_decoration_in_place() {
        let applied = apply(
            "issue(blocking): fix this",
            Some(CommentType::Issue),
            Some(Decoration::NonBlocking),
            false,
        );
        assert_eq!(applied.text, "issue(non-blocking): fix this");
        assert_eq!(applied.cursor, "issue(non-blocking): ".len());
    }

    #[test]
    fn apply_is_idempotent() {
        let buffers = [
            "",
            "plain text",
            "  indented",
            "\nstarts with newline",
            "\n\n  blank lines first",
            "issue: old",
            "nitpick(if-minor):\r\nwindows break",
        ];
        for buffer in buffers {
            for t in CommentType::ALL {
                for d in decorations() {
                    for prettify in [false, true] {
                        let once = apply(buffer, Some(t), d, prettify);
                        let twice = apply(&once.text, Some(t), d, prettify);
                        assert_eq!(once, twice, "buffer {buffer:?}, {t:?} {d:?}, prettify {prettify}");
                    }
                }
            }
        }
    }

    #[test]
    fn badge_apply_keeps_leading_indentation_and_blank_lines() {
        let badge = render(CommentType::Issue, None, true);

        let code = apply("    let x = 1;", Some(CommentType::Issue), None, true);
        assert_eq!(code.text, format!("{badge}    let x = 1;"));
        assert_eq!(strip(&code.text), "    let x = 1;");

        let spaced = apply("\n\nsee below", Some(CommentType::Issue), None, true);
        assert_eq!(spaced.text, format!("{badge}\n\nsee below"));
    }

    #[test]
    fn plain_apply_drops_only_separator_characters() {
        let code = apply("  \t\n    let x = 1;", Some(CommentType::Issue), None, false);
        assert_eq!(code.text, "issue: let x = 1;");

        // Non-breaking space is subject text, not a separator.
        let nbsp = apply("\u{a0}quoted", Some(CommentType::Issue), None, false);
        assert_eq!(nbsp.text, "issue: \u{a0}quoted");
    }

    #[test]
    fn apply_converts_between_formats() {
        let plain = apply("question: why?", Some(CommentType::Question), None, true);
        assert_eq!(plain.text, format!("{}why?", render(CommentType::Question, None, true)));
        let back = apply(&plain.text, Some(CommentType::Question), None, false);
        assert_eq!(back.text, "question: why?");
    }

    #[test]
    fn apply_without_type_removes_prefix() {
        let badge = format!("{}great work", render(CommentType::Praise, None, true));
        let removed = apply(&badge, None, None, true);
        assert_eq!(removed, Applied { text: "great work".to_owned(), cursor: 0 });

        let untouched = apply("no prefix here", None, None, false);
        assert_eq!(untouched.text, "no prefix here");
    }

    #[test]
    fn colon_terminated_ordinary_text_is_never_stripped() {
        let buffer = "todo: not a conventional label";
        assert_eq!(strip(buffer), buffer);
        let applied = apply(buffer, Some(CommentType::Chore), None, false);
        assert_eq!(applied.text, "chore: todo: not a conventional label");
    }
}
