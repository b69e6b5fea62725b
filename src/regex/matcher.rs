//! Backtracking matcher over a compiled node list.
//!
//! The matcher keeps two explicit stacks instead of recursing: `goals` is the
//! work that must still succeed from the current position, and `choices`
//! records every point where a shorter run or an earlier stop could still be
//! tried. A quantified atom takes its longest run first and gives back one
//! occurrence at a time. Group captures are set when an iteration of the
//! group body finishes; backtracking restores the captures saved with the
//! choice, so a failed tail rolls them back.
//!
//! Native stack use does not depend on the length of the text.

use super::compile::{Atom, Node, Program, MAX_GROUPS};
use super::{Match, Span};

type Groups = [Option<Span>; MAX_GROUPS];

/// Work remaining from the current position; the top of the stack runs first
#[derive(Clone, Copy)]
enum Goal<'a> {
    /// Match these nodes in order
    Seq(&'a [Node]),
    /// One iteration of a group body has just finished
    Repeat {
        node: &'a Node,
        index: usize,
        body: &'a [Node],
        count: u32,
        start: usize,
    },
}

enum Alternative {
    /// A single-byte atom took `taken` bytes from `start`; try one fewer
    Shorter { start: usize, taken: usize, min: usize },
    /// Stop repeating a group and carry on with the saved goals
    Stop { pos: usize },
}

struct Choice<'a> {
    goals: Vec<Goal<'a>>,
    groups: Groups,
    alternative: Alternative,
}

struct Matcher<'a, 't> {
    text: &'t [u8],
    anchored_end: bool,
    groups: Groups,
    goals: Vec<Goal<'a>>,
    choices: Vec<Choice<'a>>,
}

impl<'a, 't> Matcher<'a, 't> {
    fn new(text: &'t [u8], anchored_end: bool) -> Self {
        Self {
            text,
            anchored_end,
            groups: [None; MAX_GROUPS],
            goals: Vec::new(),
            choices: Vec::new(),
        }
    }

    /// End offset of the first match of `nodes` anchored at `start`
    fn run(&mut self, nodes: &'a [Node], start: usize) -> Option<usize> {
        self.groups = [None; MAX_GROUPS];
        self.goals.clear();
        self.choices.clear();
        self.goals.push(Goal::Seq(nodes));

        let mut pos = start;
        loop {
            let advanced = match self.goals.pop() {
                None => {
                    if !self.anchored_end || pos == self.text.len() {
                        return Some(pos);
                    }
                    false
                }
                Some(Goal::Seq(nodes)) => match nodes.split_first() {
                    None => true,
                    Some((node, rest)) => {
                        if !rest.is_empty() {
                            self.goals.push(Goal::Seq(rest));
                        }
                        self.step(node, &mut pos)
                    }
                },
                Some(Goal::Repeat {
                    node,
                    index,
                    body,
                    count,
                    start,
                }) => {
                    // An empty iteration beyond the minimum would loop forever
                    if pos == start && count >= node.min {
                        false
                    } else {
                        self.groups[index] = Some(Span::new(start, pos - start));
                        self.repeat(node, index, body, count + 1, pos)
                    }
                }
            };

            if !advanced {
                pos = self.backtrack()?;
            }
        }
    }

    /// Match one node at `pos`, leaving a choice behind if it could
    /// match less.
    fn step(&mut self, node: &'a Node, pos: &mut usize) -> bool {
        if let Atom::Group { index, body } = &node.atom {
            return self.repeat(node, *index, body, 0, *pos);
        }

        let available = self.text.len() - *pos;
        let limit = node
            .max
            .map_or(available, |max| (max as usize).min(available));
        let mut run = 0;
        while run < limit && node.atom.matches_byte(self.text[*pos + run]) {
            run += 1;
        }

        let min = node.min as usize;
        if run < min {
            return false;
        }
        if run > min {
            self.choose(Alternative::Shorter {
                start: *pos,
                taken: run,
                min,
            });
        }
        *pos += run;
        true
    }

    /// Greedy group repetition: schedule one more iteration, and remember
    /// that stopping here is the fallback once the minimum is met.
    fn repeat(&mut self, node: &'a Node, index: usize, body: &'a [Node], count: u32, pos: usize) -> bool {
        let more = node.max.map_or(true, |max| count < max);
        let may_stop = count >= node.min;
        if !more {
            return may_stop;
        }
        if may_stop {
            self.choose(Alternative::Stop { pos });
        }
        self.goals.push(Goal::Repeat {
            node,
            index,
            body,
            count,
            start: pos,
        });
        self.goals.push(Goal::Seq(body));
        true
    }

    fn choose(&mut self, alternative: Alternative) {
        self.choices.push(Choice {
            goals: self.goals.clone(),
            groups: self.groups,
            alternative,
        });
    }

    /// Restore the most recent choice and return the position to resume
    /// from; `None` when every alternative has failed.
    fn backtrack(&mut self) -> Option<usize> {
        let Choice {
            goals,
            groups,
            alternative,
        } = self.choices.pop()?;
        self.goals = goals;
        self.groups = groups;
        match alternative {
            Alternative::Stop { pos } => Some(pos),
            Alternative::Shorter { start, taken, min } => {
                let taken = taken - 1;
                if taken > min {
                    self.choose(Alternative::Shorter { start, taken, min });
                }
                Some(start + taken)
            }
        }
    }
}

/// Leftmost match starting at or after `from`.
///
/// `^` only ever matches at offset 0 of `text`, so an anchored program
/// searched from a later offset never matches.
pub(crate) fn search(program: &Program, text: &[u8], from: usize) -> Option<Match> {
    if from > text.len() {
        return None;
    }
    let last_start = if program.anchored_start {
        if from > 0 {
            return None;
        }
        0
    } else {
        text.len()
    };

    // A mandatory literal first byte lets us skip hopeless start positions
    let first_byte = match program.nodes.first() {
        Some(Node {
            atom: Atom::Byte(b),
            min,
            ..
        }) if *min > 0 => Some(*b),
        _ => None,
    };

    let mut matcher = Matcher::new(text, program.anchored_end);
    for start in from..=last_start {
        if let Some(b) = first_byte {
            if text.get(start) != Some(&b) {
                continue;
            }
        }
        if let Some(end) = matcher.run(&program.nodes, start) {
            return Some(Match {
                span: Span::new(start, end - start),
                groups: matcher.groups,
                group_count: program.groups,
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::super::compile::compile;
    use super::*;

    fn find(pattern: &str, text: &str) -> Option<(usize, usize)> {
        let program = compile(pattern.as_bytes()).unwrap();
        search(&program, text.as_bytes(), 0).map(|m| (m.start(), m.len()))
    }

    fn group(pattern: &str, text: &str, n: usize) -> Option<(usize, usize)> {
        let program = compile(pattern.as_bytes()).unwrap();
        let m = search(&program, text.as_bytes(), 0)?;
        m.group(n).map(|g| (g.start, g.len))
    }

    #[test]
    fn test_literal_leftmost() {
        assert_eq!(find("ab", "xxabab"), Some((2, 2)));
        assert_eq!(find("abc", "ab"), None);
    }

    #[test]
    fn test_empty_pattern_matches_at_zero() {
        assert_eq!(find("", "hello"), Some((0, 0)));
        assert_eq!(find("", ""), Some((0, 0)));
    }

    #[test]
    fn test_star_is_greedy_with_backoff() {
        assert_eq!(find("a*", "aaab"), Some((0, 3)));
        assert_eq!(find("a*ab", "aaab"), Some((0, 4)));
        assert_eq!(find("x*", "abc"), Some((0, 0)));
    }

    #[test]
    fn test_dot_skips_nul() {
        assert_eq!(find("a.c", "abc"), Some((0, 3)));
        let program = compile(b"a.c").unwrap();
        assert!(search(&program, b"a\0c", 0).is_none());
    }

    #[test]
    fn test_anchors() {
        assert_eq!(find("^ab", "abab"), Some((0, 2)));
        assert_eq!(find("^b", "ab"), None);
        assert_eq!(find("b$", "abab"), Some((3, 1)));
        assert_eq!(find("^$", ""), Some((0, 0)));
        assert_eq!(find("^$", "x"), None);
    }

    #[test]
    fn test_intervals() {
        assert_eq!(find(r"a\{2\}", "aaaa"), Some((0, 2)));
        assert_eq!(find(r"a\{2,\}", "aaaa"), Some((0, 4)));
        assert_eq!(find(r"a\{2,3\}", "aaaa"), Some((0, 3)));
        assert_eq!(find(r"ba\{2,3\}", "ba"), None);
        assert_eq!(find(r"a\+", "bbaab"), Some((2, 2)));
    }

    #[test]
    fn test_bracket_match() {
        assert_eq!(find("[0-9][0-9]*", "abc 1234 x"), Some((4, 4)));
        assert_eq!(find("[^ ]*", "word rest"), Some((0, 4)));
        assert_eq!(find(r"[a\[]", "zz\\"), Some((2, 1)));
    }

    #[test]
    fn test_group_span_excludes_tail() {
        // The group must give back the last 'a' so the tail can match
        assert_eq!(group(r"\(a*\)ab", "aaab", 1), Some((0, 2)));
        assert_eq!(group(r"x\(.*\)y", "xabyzy", 1), Some((1, 4)));
    }

    #[test]
    fn test_quantified_group_records_last_iteration() {
        assert_eq!(find(r"\(ab\)*c", "ababc"), Some((0, 5)));
        assert_eq!(group(r"\(ab\)*c", "ababc", 1), Some((2, 2)));
    }

    #[test]
    fn test_group_backtracks_into_body() {
        assert_eq!(find(r"\(a*b\)*ab", "aabab"), Some((0, 5)));
        assert_eq!(group(r"\(a*b\)*ab", "aabab", 1), Some((0, 3)));
    }

    #[test]
    fn test_nonparticipating_group() {
        assert_eq!(find(r"\(x\)*y", "y"), Some((0, 1)));
        assert_eq!(group(r"\(x\)*y", "y", 1), None);
    }

    #[test]
    fn test_empty_group_iteration_terminates() {
        assert_eq!(find(r"\(a*\)*b", "aab"), Some((0, 3)));
        assert_eq!(find(r"\(\)*", "x"), Some((0, 0)));
    }

    #[test]
    fn test_nested_group_numbering() {
        assert_eq!(group(r"\(a\(b\)c\)", "abc", 1), Some((0, 3)));
        assert_eq!(group(r"\(a\(b\)c\)", "abc", 2), Some((1, 1)));
    }

    #[test]
    fn test_long_line_group_repetition() {
        let line = "ab".repeat(32 * 1024) + "c";
        assert_eq!(find(r"\(ab\)*c", &line), Some((0, line.len())));
        assert_eq!(group(r"\(ab\)*c", &line, 1), Some((line.len() - 3, 2)));

        let unanchored = "ab".repeat(32 * 1024);
        assert_eq!(find(r"\(a*b\)*$", &unanchored), Some((0, unanchored.len())));
    }

    #[test]
    fn test_search_from_offset() {
        let program = compile(b"o").unwrap();
        let m = search(&program, b"foo", 2).unwrap();
        assert_eq!(m.start(), 2);
        assert!(search(&program, b"foo", 4).is_none());

        let anchored = compile(b"^f").unwrap();
        assert!(search(&anchored, b"ff", 1).is_none());
    }
}
