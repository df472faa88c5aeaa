//! Thompson construction
//!
//! Builds a nondeterministic automaton from the syntax tree by structural
//! induction: concatenation sequences fragments, alternation branches,
//! repetition loops or skips. Unanchored pattern sides get an any-byte self
//! loop so the automaton language is the pattern's search language.

use super::class::ByteClass;
use super::parse::{Ast, Pattern};

/// Nondeterministic automaton with epsilon transitions and one accept state.
#[derive(Debug)]
pub struct Nfa {
    pub(crate) eps: Vec<Vec<usize>>,
    pub(crate) edges: Vec<Vec<(ByteClass, usize)>>,
    pub(crate) start: usize,
    pub(crate) accept: usize,
}

impl Nfa {
    pub fn from_pattern(pattern: &Pattern) -> Self {
        let mut builder = Builder::default();
        let start = builder.state();
        let (frag_start, frag_accept) = builder.compile(&pattern.ast);
        let accept = builder.state();

        builder.eps_edge(start, frag_start);
        builder.eps_edge(frag_accept, accept);
        if !pattern.anchored_start {
            builder.edge(start, ByteClass::full(), start);
        }
        if !pattern.anchored_end {
            builder.edge(accept, ByteClass::full(), accept);
        }

        Nfa {
            eps: builder.eps,
            edges: builder.edges,
            start,
            accept,
        }
    }

    pub fn state_count(&self) -> usize {
        self.eps.len()
    }
}

#[derive(Default)]
struct Builder {
    eps: Vec<Vec<usize>>,
    edges: Vec<Vec<(ByteClass, usize)>>,
}

impl Builder {
    fn state(&mut self) -> usize {
        self.eps.push(Vec::new());
        self.edges.push(Vec::new());
        self.eps.len() - 1
    }

    fn eps_edge(&mut self, from: usize, to: usize) {
        self.eps[from].push(to);
    }

    fn edge(&mut self, from: usize, class: ByteClass, to: usize) {
        if !class.is_empty() {
            self.edges[from].push((class, to));
        }
    }

    /// Compile one subtree into a (start, accept) fragment.
    fn compile(&mut self, ast: &Ast) -> (usize, usize) {
        match ast {
            Ast::Empty => {
                let s = self.state();
                (s, s)
            }
            Ast::Class(class) => {
                let s = self.state();
                let a = self.state();
                self.edge(s, class.clone(), a);
                (s, a)
            }
            Ast::Concat(parts) => {
                let s = self.state();
                let mut cursor = s;
                for part in parts {
                    let (ps, pa) = self.compile(part);
                    self.eps_edge(cursor, ps);
                    cursor = pa;
                }
                (s, cursor)
            }
            Ast::Alt(branches) => {
                let s = self.state();
                let a = self.state();
                for branch in branches {
                    let (bs, ba) = self.compile(branch);
                    self.eps_edge(s, bs);
                    self.eps_edge(ba, a);
                }
                (s, a)
            }
            Ast::Repeat { node, min, max } => self.repeat(node, *min, *max),
        }
    }

    /// `min` mandatory copies followed by an optional tail: a loop copy for
    /// unbounded repetition, `max - min` skippable copies otherwise.
    fn repeat(&mut self, node: &Ast, min: u32, max: Option<u32>) -> (usize, usize) {
        let s = self.state();
        let mut cursor = s;
        for _ in 0..min {
            let (ns, na) = self.compile(node);
            self.eps_edge(cursor, ns);
            cursor = na;
        }
        let a = self.state();
        match max {
            None => {
                let (ns, na) = self.compile(node);
                self.eps_edge(cursor, ns);
                self.eps_edge(cursor, a);
                self.eps_edge(na, ns);
                self.eps_edge(na, a);
            }
            Some(max) => {
                self.eps_edge(cursor, a);
                for _ in min..max {
                    let (ns, na) = self.compile(node);
                    self.eps_edge(cursor, ns);
                    cursor = na;
                    self.eps_edge(cursor, a);
                }
            }
        }
        (s, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::parse::Pattern;

    fn nfa(source: &str) -> Nfa {
        Nfa::from_pattern(&Pattern::parse(source).unwrap())
    }

    #[test]
    fn test_fragments_have_bounded_size() {
        // A literal contributes a constant number of states.
        let small = nfa("^ab$");
        let larger = nfa("^abcdef$");
        assert!(larger.state_count() > small.state_count());
        assert!(larger.state_count() < 30);
    }

    #[test]
    fn test_unanchored_sides_self_loop() {
        let n = nfa("ab");
        let any_loop = |state: usize| {
            n.edges[state]
                .iter()
                .any(|(class, target)| *target == state && class.contains(0) && class.contains(255))
        };
        assert!(any_loop(n.start));
        assert!(any_loop(n.accept));

        let anchored = nfa("^ab$");
        assert!(anchored.edges[anchored.start].is_empty());
        assert!(anchored.edges[anchored.accept].is_empty());
    }
}
