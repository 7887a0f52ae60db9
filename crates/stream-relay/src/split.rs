//! Splitting a rendered transcript into message-sized chunks without breaking its markup.
//!
//! Lengths are measured in the platform's [`LengthUnit`]. Cuts never fall inside an HTML tag or entity;
//! markup still open at a cut (HTML tags, a Markdown code fence) is closed at the end of the chunk and
//! reopened at the start of the next one. Within the budget a cut after a newline is preferred, then one
//! after whitespace, as long as it keeps more than half of the chunk.

/// Unit a platform counts message length in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LengthUnit {
    /// Unicode scalar values.
    #[default]
    Chars,
    /// UTF-16 code units; characters outside the BMP (most emoji) count twice.
    Utf16,
}

impl LengthUnit {
    pub fn measure(self, text: &str) -> usize {
        match self {
            LengthUnit::Chars => text.chars().count(),
            LengthUnit::Utf16 => text.encode_utf16().count(),
        }
    }
}

/// Markup a cut must respect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Markup {
    #[default]
    Plain,
    /// Telegram HTML parse mode.
    Html,
    /// Discord Markdown; only code fences are carried across cuts.
    Markdown,
}

/// How a platform measures and marks up message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextFormat {
    pub unit: LengthUnit,
    pub markup: Markup,
}

impl TextFormat {
    pub const fn new(unit: LengthUnit, markup: Markup) -> Self {
        Self { unit, markup }
    }

    pub fn measure(&self, text: &str) -> usize {
        self.unit.measure(text)
    }
}

/// Longest entity name looked for after `&` (`&quot;` and numeric references fit).
const MAX_ENTITY_LEN: usize = 10;

const FENCE: &str = "```";

/// Markup open at some position of the transcript.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct OpenMarkup {
    /// Open HTML tags, outermost first, as `(name, opening tag as written)`.
    tags: Vec<(String, String)>,
    /// Opening line of an unclosed code fence, e.g. "```json".
    fence: Option<String>,
}

impl OpenMarkup {
    fn reopen(&self) -> String {
        let mut out: String = self.tags.iter().map(|(_, tag)| tag.as_str()).collect();
        if let Some(fence) = &self.fence {
            out.push_str(fence);
            out.push('\n');
        }
        out
    }

    fn close(&self) -> String {
        let mut out = String::new();
        if self.fence.is_some() {
            out.push('\n');
            out.push_str(FENCE);
        }
        for (name, _) in self.tags.iter().rev() {
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
        out
    }

    fn apply(&mut self, atom: &str, markup: Markup) {
        match markup {
            Markup::Html => {
                if let Some(closing) = atom.strip_prefix("</") {
                    let name = tag_name(closing);
                    if let Some(i) = self.tags.iter().rposition(|(n, _)| n == name) {
                        self.tags.truncate(i);
                    }
                } else if atom.len() > 2
                    && atom.starts_with('<')
                    && atom.ends_with('>')
                    && !atom.ends_with("/>")
                {
                    self.tags
                        .push((tag_name(&atom[1..]).to_string(), atom.to_string()));
                }
            }
            Markup::Markdown => {
                if atom.starts_with(FENCE) {
                    self.fence = match self.fence.take() {
                        Some(_) => None,
                        None => Some(atom.to_string()),
                    };
                }
            }
            Markup::Plain => {}
        }
    }
}

fn tag_name(s: &str) -> &str {
    let end = s
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(s.len());
    &s[..end]
}

/// End (byte offset) of the smallest piece starting at `start` that may not be cut: a whole tag or entity in
/// HTML, a whole fence line in Markdown, otherwise one character.
fn atom_end(text: &str, start: usize, markup: Markup) -> usize {
    let rest = &text[start..];
    let one = rest.chars().next().map_or(0, char::len_utf8);
    let len = match markup {
        Markup::Html if rest.starts_with('<') => rest.find('>').map_or(one, |i| i + 1),
        Markup::Html if rest.starts_with('&') => rest[1..]
            .char_indices()
            .take(MAX_ENTITY_LEN)
            .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '#'))
            .filter(|(_, c)| *c == ';')
            .map_or(one, |(i, _)| i + 2),
        Markup::Markdown if rest.starts_with(FENCE) && (start == 0 || text[..start].ends_with('\n')) => {
            rest.find('\n').unwrap_or(rest.len())
        }
        _ => one,
    };
    start + len
}

/// A position a chunk may end at.
#[derive(Debug, Clone)]
struct Cut {
    end: usize,
    /// Content length up to `end`, reopened prefix excluded.
    len: usize,
    open: OpenMarkup,
}

/// Picks where the chunk starting at `start` ends and what markup is open there.
fn next_cut(
    text: &str,
    start: usize,
    budget: usize,
    format: TextFormat,
    open: &OpenMarkup,
    prefix_len: usize,
) -> (usize, OpenMarkup) {
    let mut state = open.clone();
    let mut pos = start;
    let mut content_len = 0;
    let mut furthest: Option<Cut> = None;
    let mut after_newline: Option<Cut> = None;
    let mut after_space: Option<Cut> = None;

    while pos < text.len() {
        let end = atom_end(text, pos, format.markup);
        let atom = &text[pos..end];
        let atom_len = format.measure(atom);
        if prefix_len + content_len + atom_len > budget {
            break;
        }
        content_len += atom_len;
        state.apply(atom, format.markup);
        pos = end;

        if prefix_len + content_len + format.measure(&state.close()) > budget {
            continue;
        }
        let cut = Cut {
            end: pos,
            len: content_len,
            open: state.clone(),
        };
        if atom == "\n" {
            after_newline = Some(cut.clone());
        } else if atom.chars().all(char::is_whitespace) {
            after_space = Some(cut.clone());
        }
        furthest = Some(cut);
    }

    let Some(furthest) = furthest else {
        // Nothing fits beside the reopened markup; take one piece so the split advances.
        let end = atom_end(text, start, format.markup);
        let mut state = open.clone();
        state.apply(&text[start..end], format.markup);
        return (end, state);
    };
    if furthest.end == text.len() {
        return (furthest.end, furthest.open);
    }
    let half = furthest.len / 2;
    let cut = [after_newline, after_space]
        .into_iter()
        .flatten()
        .find(|cut| cut.len > half)
        .unwrap_or(furthest);
    (cut.end, cut.open)
}

/// Splits `text` into chunks of at most `budget` units each, reopened and closed markup included.
///
/// Plain text without whitespace splits into exactly `ceil(len / budget)` chunks. Empty text yields no chunks.
pub fn split_chunks(text: &str, budget: usize, format: TextFormat) -> Vec<String> {
    let budget = budget.max(1);
    let mut chunks = Vec::new();
    let mut open = OpenMarkup::default();
    let mut pos = 0;

    while pos < text.len() {
        let prefix = open.reopen();
        let (end, state) = next_cut(text, pos, budget, format, &open, format.measure(&prefix));
        let mut chunk = prefix;
        chunk.push_str(&text[pos..end]);
        chunk.push_str(&state.close());
        chunks.push(chunk);
        open = state;
        pos = end;
    }
    chunks
}
