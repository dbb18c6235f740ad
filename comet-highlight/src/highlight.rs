//! The tree highlighter: walks a parse tree with a cursor, resolves each
//! node's rule chain against a [`TagMatcher`], and emits ordered,
//! coalesced `(from, to, classes)` spans.

use std::ops::Range;

use comet_tree::{MOUNTED, MountedTree, NodeType, OverlayRange, Tree, TreeCursor};

use crate::{
    rule::{HIGHLIGHT_RULES, Mode},
    style::TagMatcher,
};

/// Highlights `range` of `tree`, calling `emit` with `(from, to,
/// classes)` for every styled stretch, in position order. Consecutive
/// emitted spans never share a class string, spans never overlap, and
/// unstyled stretches produce no call.
pub fn highlight_tree(
    tree: &Tree,
    matcher: &dyn TagMatcher,
    range: Range<usize>,
    emit: &mut dyn FnMut(usize, usize, &str),
) {
    if range.start >= range.end {
        return;
    }
    let mut builder = HighlightBuilder {
        at: range.start,
        class: String::new(),
        pending: None,
        stack: Vec::new(),
        matcher,
        emit,
    };
    let mut cursor = tree.cursor();
    builder.highlight_range(
        &mut cursor,
        range.start,
        range.end,
        "",
        0,
        tree.ty(),
    );
    builder.flush(range.end);
}

/// Re-emits `code` as highlighted text chunks: `emit` receives each
/// stretch of a line together with its classes (the empty string for
/// unstyled text), `emit_break` is called at every newline. `code` is
/// the text `tree` was parsed from.
pub fn highlight_code(
    code: &str,
    tree: &Tree,
    matcher: &dyn TagMatcher,
    emit: &mut dyn FnMut(&str, &str),
    emit_break: &mut dyn FnMut(),
) {
    let len = tree.len().min(code.len());
    let mut pos = 0;
    highlight_tree(tree, matcher, 0..tree.len(), &mut |from, to, class| {
        let (from, to) = (from.min(len), to.min(len));
        if from > pos {
            write_chunk(&code[pos..from], "", emit, emit_break);
        }
        write_chunk(&code[from..to], class, emit, emit_break);
        pos = to;
    });
    if pos < len {
        write_chunk(&code[pos..len], "", emit, emit_break);
    }
}

fn write_chunk(
    text: &str,
    class: &str,
    emit: &mut dyn FnMut(&str, &str),
    emit_break: &mut dyn FnMut(),
) {
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            emit_break();
        }
        if !line.is_empty() {
            emit(line, class);
        }
    }
}

/// Per-call traversal state. Spans materialise in exactly one place,
/// [`HighlightBuilder::start_span`]: opening a span with a class other
/// than the current one completes the stretch accumulated so far.
///
/// A completed stretch is held back until its successor's class is
/// known: the traversal closes and immediately re-opens the parent class
/// around every child, and holding one span back lets those zero-length
/// reversions coalesce instead of splitting runs of equal classes.
struct HighlightBuilder<'a, 'e> {
    /// Start of the currently open span.
    at: usize,
    /// Classes of the currently open span; empty when unstyled.
    class: String,
    /// A completed span awaiting a differently-classed successor.
    pending: Option<(usize, usize, String)>,
    /// Node type name per depth; entries above the current depth are
    /// stale and ignored.
    stack: Vec<&'a str>,
    matcher: &'e dyn TagMatcher,
    emit: &'e mut dyn FnMut(usize, usize, &str),
}

impl<'a> HighlightBuilder<'a, '_> {
    fn start_span(&mut self, at: usize, class: &str) {
        if class == self.class {
            return;
        }
        if at <= self.at {
            // The open span is empty. When the change reverts to the
            // span completed right before it, re-open that span;
            // otherwise just relabel. Positions moving backwards only
            // happen for malformed overlays and are ignored.
            let reopen = matches!(&self.pending, Some((_, to, pending))
                if *to == self.at && pending.as_str() == class);
            if reopen {
                let (from, _, _) = self.pending.take().unwrap();
                self.at = from;
            }
        } else {
            self.close_span(at);
            self.at = at;
        }
        self.class.clear();
        self.class.push_str(class);
    }

    /// Completes the open span at `to`, emitting the span it displaces
    /// from the pending slot.
    fn close_span(&mut self, to: usize) {
        let completed = (self.at, to, std::mem::take(&mut self.class));
        match &mut self.pending {
            Some((_, pending_to, pending))
                if *pending_to == completed.0 && *pending == completed.2 =>
            {
                *pending_to = to;
            }
            _ => {
                if let Some((from, to, class)) =
                    self.pending.replace(completed)
                {
                    if !class.is_empty() && to > from {
                        (self.emit)(from, to, &class);
                    }
                }
            }
        }
    }

    fn flush(&mut self, to: usize) {
        if to > self.at {
            self.close_span(to);
        }
        if let Some((from, to, class)) = self.pending.take() {
            if !class.is_empty() && to > from {
                (self.emit)(from, to, &class);
            }
        }
    }

    fn highlight_range(
        &mut self,
        cursor: &mut TreeCursor<'a>,
        from: usize,
        to: usize,
        inherited: &str,
        depth: usize,
        scope: &'a NodeType,
    ) {
        let start = cursor.start();
        let end = cursor.end();
        if start >= to || end <= from {
            return;
        }
        let ty = cursor.ty();
        if depth == self.stack.len() {
            self.stack.push(ty.name());
        } else {
            self.stack[depth] = ty.name();
        }
        let scope = if ty.is_top() { ty } else { scope };

        let mut cls = inherited.to_string();
        let mut inherited = inherited.to_string();
        let mut opaque = false;
        let mut rule = ty.prop(&HIGHLIGHT_RULES);
        while let Some(r) = rule {
            if r.context.is_empty() || r.match_context(&self.stack, depth) {
                // Rules in a chain are alternatives: the first one whose
                // context matches wins, whether or not its tags resolve.
                for tag in &r.tags {
                    if let Some(class) = self.matcher.style(tag, scope) {
                        if !cls.is_empty() {
                            cls.push(' ');
                        }
                        cls.push_str(&class);
                        match r.mode {
                            Mode::Inherit => {
                                if !inherited.is_empty() {
                                    inherited.push(' ');
                                }
                                inherited.push_str(&class);
                            }
                            Mode::Opaque => opaque = true,
                            Mode::Normal => {}
                        }
                    }
                }
                break;
            }
            rule = r.next();
        }

        self.start_span(start.max(from), &cls);
        if opaque {
            return;
        }

        if let Some(mounted) = cursor.tree().prop(&MOUNTED) {
            match &mounted.overlay {
                Some(overlay) => self.highlight_overlay(
                    cursor, mounted, overlay, from, to, &inherited, &cls,
                    depth, scope,
                ),
                // A full mount replaces the node's subtree; inherited
                // classes stop at the language boundary.
                None => {
                    let mut inner = mounted.tree.cursor_at(start);
                    self.highlight_range(
                        &mut inner,
                        from,
                        to,
                        "",
                        depth,
                        mounted.tree.ty(),
                    );
                }
            }
        } else if cursor.first_child() {
            loop {
                if cursor.end() > from {
                    if cursor.start() >= to {
                        break;
                    }
                    self.highlight_range(
                        cursor,
                        from,
                        to,
                        &inherited,
                        depth + 1,
                        scope,
                    );
                    // Re-open the node's own class between children.
                    self.start_span(to.min(cursor.end()), &cls);
                }
                if !cursor.next_sibling() {
                    break;
                }
            }
            cursor.parent();
        }
    }

    /// Interleaves an overlay-mounted node: the outer node's children
    /// cover the stretches between overlay ranges, the inner tree covers
    /// the ranges themselves. Spans are closed at every boundary so none
    /// crosses between the two languages.
    #[allow(clippy::too_many_arguments)]
    fn highlight_overlay(
        &mut self,
        cursor: &mut TreeCursor<'a>,
        mounted: &'a MountedTree,
        overlay: &[OverlayRange],
        from: usize,
        to: usize,
        inherited: &str,
        cls: &str,
        depth: usize,
        scope: &'a NodeType,
    ) {
        let start = cursor.start();
        let end = cursor.end();
        let descended = cursor.first_child();
        let mut has_child = descended;
        let mut pos = start;
        for index in 0.. {
            let next = overlay.get(index);
            let next_pos = next.map_or(end, |range| start + range.from);
            let range_from = pos.max(from);
            let range_to = next_pos.min(to);
            if range_from < range_to && has_child {
                while cursor.start() < range_to {
                    self.highlight_range(
                        cursor,
                        range_from,
                        range_to,
                        inherited,
                        depth + 1,
                        scope,
                    );
                    self.start_span(range_to.min(cursor.end()), cls);
                    if cursor.end() >= next_pos {
                        // Crosses into the overlay; the next outer
                        // segment picks this child up again.
                        break;
                    }
                    if !cursor.next_sibling() {
                        has_child = false;
                        break;
                    }
                }
            }
            let Some(next) = next else { break };
            if next_pos > to {
                break;
            }
            pos = (start + next.to).min(end);
            if pos > from {
                let mut inner = mounted.tree.cursor_at(start);
                self.highlight_range(
                    &mut inner,
                    (start + next.from).max(from),
                    pos.min(to),
                    "",
                    depth,
                    mounted.tree.ty(),
                );
                self.start_span(pos.min(to), cls);
            }
        }
        if descended {
            cursor.parent();
        }
    }
}
