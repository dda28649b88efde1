//! The HTML diff renderer.
//!
//! Takes diffs over HTML symbol streams and emits a third HTML document in
//! which deleted regions are wrapped in a deletion marker and inserted
//! regions in an insertion marker, while the surrounding markup stays
//! syntactically valid.
//!
//! The raw diff does not respect tag boundaries, so wrapping every edit
//! naively would produce broken markup like `<de<ins>l>x</del></ins>`.
//! Instead the flat edit list is regrouped into a tag tree ([`DiffSeg`])
//! first, and markers are only ever emitted around whole segments.

use crate::diff::{Diff, Operation};
use crate::engine::DiffMatchPatch;
use crate::errors::Error;
use crate::tokenize::{Chunk, HtmlTokenizer, Tokenizer, WordTokenizer};

/// Tag names that close themselves even without an explicit `/`.
const ALWAYS_SELF_CLOSING: &[&str] = &[
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input", "keygen", "link",
    "meta", "param", "source", "track", "wbr", "!doctype",
];

/// Renders marked-up text for one operation.
///
/// Formatters are pluggable; [`StyledFormatter`] is the default.
pub trait MarkupFormatter {
    /// Produces the output fragment for `text` under `op`.
    fn text_for_change(&self, text: &str, op: Operation) -> String;
}

/// Wraps deletions in a line-through red `<del>` and insertions in an
/// underlined green `<ins>`; equalities pass through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct StyledFormatter;

impl MarkupFormatter for StyledFormatter {
    fn text_for_change(&self, text: &str, op: Operation) -> String {
        match op {
            Operation::Equal => text.to_string(),
            Operation::Delete => format!(
                "<del style=\"text-decoration: line-through;color: red;\">{text}</del>"
            ),
            Operation::Insert => format!(
                "<ins style=\"text-decoration: underline;color: green;\">{text}</ins>"
            ),
        }
    }
}

/// A node of the reconstructed HTML diff tree.
///
/// Non-tag segments never have children; only a start tag that is not
/// self-closing becomes a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffSeg {
    text: String,
    op: Operation,
    is_tag: bool,
    is_start_tag: bool,
    self_closing: bool,
    tag_name: String,
    children: Option<Vec<DiffSeg>>,
}

impl DiffSeg {
    /// Classifies one chunk of diffed text.
    ///
    /// Surrounding whitespace is ignored for classification but preserved
    /// in the carried text.
    pub fn classify(text: String, op: Operation) -> DiffSeg {
        let trimmed = text.trim();
        if trimmed.starts_with("<!--") {
            // A comment acts as a childless, self-closing tag.
            return DiffSeg {
                text,
                op,
                is_tag: true,
                is_start_tag: true,
                self_closing: true,
                tag_name: "!--".to_string(),
                children: None,
            };
        }
        if let Some(inner) = trimmed.strip_prefix('<') {
            let (is_start_tag, rest) = match inner.strip_prefix('/') {
                Some(rest) => (false, rest),
                None => (true, inner),
            };
            let tag_name: String = rest
                .chars()
                .take_while(|&c| !c.is_whitespace() && c != '>' && c != '/')
                .collect();
            let self_closing = trimmed.ends_with("/>")
                || ALWAYS_SELF_CLOSING
                    .iter()
                    .any(|name| tag_name.eq_ignore_ascii_case(name));
            return DiffSeg {
                text,
                op,
                is_tag: true,
                is_start_tag,
                self_closing,
                tag_name,
                children: None,
            };
        }
        DiffSeg {
            text,
            op,
            is_tag: false,
            is_start_tag: false,
            self_closing: false,
            tag_name: String::new(),
            children: None,
        }
    }

    /// Returns the raw text chunk.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the associated operation.
    pub fn op(&self) -> Operation {
        self.op
    }

    /// Returns `true` for tag and comment segments.
    pub fn is_tag(&self) -> bool {
        self.is_tag
    }

    /// Returns `true` for start tags (no leading `/`).
    pub fn is_start_tag(&self) -> bool {
        self.is_start_tag
    }

    /// Returns `true` for self-closing tags and comments.
    pub fn self_closing(&self) -> bool {
        self.self_closing
    }

    /// Returns the parsed tag name (empty for text segments).
    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    /// Returns the ordered children of a container segment.
    ///
    /// Fails with [`Error::Logic`] on a non-container segment; that is a
    /// programming mistake in the caller, not a recoverable condition.
    pub fn children(&self) -> Result<&[DiffSeg], Error> {
        match &self.children {
            Some(children) => Ok(children),
            None => Err(Error::Logic(format!(
                "segment {:?} is not a container",
                self.text
            ))),
        }
    }

    fn is_container(&self) -> bool {
        self.is_tag && self.is_start_tag && !self.self_closing
    }

    /// Appends the raw text of this segment and all descendants.
    fn raw_text(&self, out: &mut String) {
        out.push_str(&self.text);
        for child in self.children.iter().flatten() {
            child.raw_text(out);
        }
    }

    /// The operation shared by this segment and its entire subtree, if any.
    fn uniform(&self) -> Option<Operation> {
        fn all_match(seg: &DiffSeg, op: Operation) -> bool {
            seg.op == op && seg.children.iter().flatten().all(|c| all_match(c, op))
        }
        all_match(self, self.op).then_some(self.op)
    }

    fn end_tag_for(&self) -> DiffSeg {
        DiffSeg {
            text: format!("</{}>", self.tag_name),
            op: self.op,
            is_tag: true,
            is_start_tag: false,
            self_closing: false,
            tag_name: self.tag_name.clone(),
            children: None,
        }
    }
}

/// Turns a diff list into the flat segment list.
fn flatten(diffs: &[Diff<Chunk>]) -> Vec<DiffSeg> {
    let mut segs = Vec::new();
    for diff in diffs {
        for symbol in diff.symbols() {
            segs.push(DiffSeg::classify(symbol.text().into_owned(), diff.op()));
        }
    }
    segs
}

/// Regroups the flat segment list into a tag tree.
///
/// An open start tag consumes following segments as children until its
/// matching end tag.  The end tag becomes the final child, and the parent's
/// operation is overwritten with the end tag's, because the upstream diff
/// tends to attribute closing tags to whichever change surrounded them.  A
/// tag left open at end of input gets a synthesized end tag carrying the
/// parent's operation.
fn build_tree(segs: Vec<DiffSeg>) -> Vec<DiffSeg> {
    let mut iter = segs.into_iter();
    let mut roots = Vec::new();
    while let Some(seg) = iter.next() {
        roots.push(nest(seg, &mut iter));
    }
    roots
}

fn nest(mut seg: DiffSeg, iter: &mut std::vec::IntoIter<DiffSeg>) -> DiffSeg {
    if !seg.is_container() {
        return seg;
    }
    let mut children = Vec::new();
    loop {
        match iter.next() {
            None => {
                children.push(seg.end_tag_for());
                break;
            }
            Some(next) => {
                if next.is_tag
                    && !next.is_start_tag
                    && next.tag_name.eq_ignore_ascii_case(&seg.tag_name)
                {
                    seg.op = next.op;
                    children.push(next);
                    break;
                }
                children.push(nest(next, iter));
            }
        }
    }
    seg.children = Some(children);
    seg
}

/// Emits a list of sibling segments, coalescing maximal runs of
/// same-operation uniform subtrees into single formatter calls.
fn emit_run<F: MarkupFormatter>(segs: &[DiffSeg], formatter: &F, out: &mut String) {
    let mut run = String::new();
    let mut run_op = Operation::Equal;
    for seg in segs {
        match seg.uniform() {
            Some(op) => {
                if !run.is_empty() && op != run_op {
                    out.push_str(&formatter.text_for_change(&run, run_op));
                    run.clear();
                }
                run_op = op;
                seg.raw_text(&mut run);
            }
            None => {
                if !run.is_empty() {
                    out.push_str(&formatter.text_for_change(&run, run_op));
                    run.clear();
                }
                emit(seg, formatter, out);
            }
        }
    }
    if !run.is_empty() {
        out.push_str(&formatter.text_for_change(&run, run_op));
    }
}

/// Emits a single mixed-operation segment.
fn emit<F: MarkupFormatter>(seg: &DiffSeg, formatter: &F, out: &mut String) {
    match &seg.children {
        None => {
            // Leaf: text, self-closing tag or stray end tag.
            out.push_str(&formatter.text_for_change(&seg.text, seg.op));
        }
        Some(children) => {
            // A mixed subtree keeps its own markup unmarked so the markers
            // never straddle the tag delimiters.
            out.push_str(&seg.text);
            emit_run(children, formatter, out);
        }
    }
}

/// Renders diffs between two HTML documents.
///
/// The engine, tokenizer and formatter are explicit dependencies so tests
/// can substitute any of them.
///
/// ```rust
/// use semblance::html::HtmlDiffer;
///
/// let differ = HtmlDiffer::new();
/// let marked = differ.diff("<p>Hello world</p>", "<p>Hello brave world</p>");
/// assert!(marked.starts_with("<p>Hello <ins"));
/// assert!(marked.ends_with("world</p>"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct HtmlDiffer<I = WordTokenizer, F = StyledFormatter> {
    engine: DiffMatchPatch,
    tokenizer: HtmlTokenizer<I>,
    formatter: F,
}

impl HtmlDiffer<WordTokenizer, StyledFormatter> {
    /// Creates a differ with the default engine, word-level text
    /// tokenization and the styled formatter.
    pub fn new() -> HtmlDiffer<WordTokenizer, StyledFormatter> {
        HtmlDiffer {
            engine: DiffMatchPatch::new(),
            tokenizer: HtmlTokenizer::new(),
            formatter: StyledFormatter,
        }
    }
}

impl<I: Tokenizer<String>, F: MarkupFormatter> HtmlDiffer<I, F> {
    /// Creates a differ from explicit collaborators.
    pub fn with_parts(
        engine: DiffMatchPatch,
        tokenizer: HtmlTokenizer<I>,
        formatter: F,
    ) -> HtmlDiffer<I, F> {
        HtmlDiffer {
            engine,
            tokenizer,
            formatter,
        }
    }

    /// Diffs two HTML documents and renders the annotated result.
    pub fn diff(&self, old: &str, new: &str) -> String {
        let old = self.tokenizer.tokenize(old);
        let new = self.tokenizer.tokenize(new);
        let mut diffs = self.engine.diff_main(&old, &new);
        self.engine.diff_cleanup_semantic(&mut diffs);
        self.render(&diffs)
    }

    /// Renders a precomputed diff list over HTML symbols.
    pub fn render(&self, diffs: &[Diff<Chunk>]) -> String {
        let tree = build_tree(flatten(diffs));
        let mut out = String::new();
        emit_run(&tree, &self.formatter, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INS_OPEN: &str = "<ins style=\"text-decoration: underline;color: green;\">";
    const DEL_OPEN: &str = "<del style=\"text-decoration: line-through;color: red;\">";

    #[test]
    fn test_classify() {
        let seg = DiffSeg::classify("<div class=\"x\">".to_string(), Operation::Equal);
        assert!(seg.is_tag() && seg.is_start_tag() && !seg.self_closing());
        assert_eq!(seg.tag_name(), "div");

        let seg = DiffSeg::classify("</div>".to_string(), Operation::Equal);
        assert!(seg.is_tag() && !seg.is_start_tag());
        assert_eq!(seg.tag_name(), "div");

        let seg = DiffSeg::classify("<x/>".to_string(), Operation::Equal);
        assert!(seg.self_closing());

        let seg = DiffSeg::classify("<br>".to_string(), Operation::Equal);
        assert!(seg.self_closing());

        let seg = DiffSeg::classify("<IMG src=\"a\">".to_string(), Operation::Equal);
        assert!(seg.self_closing());
        assert_eq!(seg.tag_name(), "IMG");

        let seg = DiffSeg::classify("<!DOCTYPE html>".to_string(), Operation::Equal);
        assert!(seg.self_closing());

        let seg = DiffSeg::classify("<!-- <b> -->".to_string(), Operation::Equal);
        assert!(seg.is_tag() && seg.self_closing());
        assert_eq!(seg.tag_name(), "!--");

        let seg = DiffSeg::classify("plain".to_string(), Operation::Equal);
        assert!(!seg.is_tag());
        assert!(seg.children().is_err());
    }

    #[test]
    fn test_build_tree_closes_parent() {
        let segs = vec![
            DiffSeg::classify("<p>".to_string(), Operation::Insert),
            DiffSeg::classify("x".to_string(), Operation::Equal),
            DiffSeg::classify("</p>".to_string(), Operation::Equal),
        ];
        let tree = build_tree(segs);
        assert_eq!(tree.len(), 1);
        // The closing tag decides the parent's operation.
        assert_eq!(tree[0].op(), Operation::Equal);
        let children = tree[0].children().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[1].text(), "</p>");
    }

    #[test]
    fn test_build_tree_synthesizes_close() {
        let segs = vec![
            DiffSeg::classify("<p>".to_string(), Operation::Delete),
            DiffSeg::classify("x".to_string(), Operation::Delete),
        ];
        let tree = build_tree(segs);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].op(), Operation::Delete);
        let children = tree[0].children().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[1].text(), "</p>");
        assert_eq!(children[1].op(), Operation::Delete);
    }

    #[test]
    fn test_diff_insertion() {
        let differ = HtmlDiffer::new();
        let marked = differ.diff("<p>Hello world</p>", "<p>Hello brave world</p>");
        insta::assert_snapshot!(
            &marked,
            @r#"<p>Hello <ins style="text-decoration: underline;color: green;">brave </ins>world</p>"#
        );
    }

    #[test]
    fn test_diff_uniform_subtree() {
        let differ = HtmlDiffer::new();
        let marked = differ.diff("before", "before<p>added</p>");
        assert_eq!(marked, format!("before{INS_OPEN}<p>added</p></ins>"));
        let marked = differ.diff("<p>gone</p>after", "after");
        assert_eq!(marked, format!("{DEL_OPEN}<p>gone</p></del>after"));
    }

    #[test]
    fn test_diff_identity() {
        let differ = HtmlDiffer::new();
        let html = "<div><p>one</p><!-- note --><br/></div>";
        assert_eq!(differ.diff(html, html), html);
    }

    #[test]
    fn test_diff_word_replacement() {
        let differ = HtmlDiffer::new();
        let marked = differ.diff("<p>red fox</p>", "<p>blue fox</p>");
        assert_eq!(
            marked,
            format!("<p>{DEL_OPEN}red</del>{INS_OPEN}blue</ins> fox</p>")
        );
    }

    #[test]
    fn test_tag_balance_survives_edits() {
        let differ = HtmlDiffer::new();
        let marked = differ.diff(
            "<div><p>Hello world</p><p>second</p></div>",
            "<div><p>Hello brave world</p></div>",
        );
        for name in ["div", "p", "ins", "del"] {
            let opens = marked.matches(&format!("<{name}")).count();
            let closes = marked.matches(&format!("</{name}>")).count();
            assert_eq!(opens, closes, "unbalanced <{name}> in {marked:?}");
        }
    }

    #[test]
    fn test_custom_formatter() {
        struct Bare;
        impl MarkupFormatter for Bare {
            fn text_for_change(&self, text: &str, op: Operation) -> String {
                match op {
                    Operation::Equal => text.to_string(),
                    Operation::Delete => format!("[-{text}-]"),
                    Operation::Insert => format!("[+{text}+]"),
                }
            }
        }
        let differ =
            HtmlDiffer::with_parts(DiffMatchPatch::new(), HtmlTokenizer::new(), Bare);
        let marked = differ.diff("<p>a b</p>", "<p>a c</p>");
        assert_eq!(marked, "<p>a [-b-][+c+]</p>");
    }
}
