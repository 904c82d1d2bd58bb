//! # Atom Selection Language
//!
//! A small subset of the host selection language, evaluated against the atom
//! records held by [`crate::core::host::memory::MemoryHost`].
//!
//! Supported keywords are `all`, `none`, `hydrogen`, `noh`, and the valued
//! keywords `index`, `name`, `resname`, `resid` and `element`, combined with
//! `not`, `and`, `or` and parentheses.

pub mod parser;

use crate::core::io::traits::AtomRecord;
use parser::{Predicate, SelectionExpr};

pub use parser::{SelectionParseError, parse};

fn is_hydrogen(atom: &AtomRecord) -> bool {
    if !atom.element.is_empty() {
        return atom.element.eq_ignore_ascii_case("H");
    }
    atom.name.trim_start_matches(|c: char| c.is_ascii_digit()).starts_with('H')
}

fn matches(expr: &SelectionExpr, index: usize, atom: &AtomRecord) -> bool {
    match expr {
        SelectionExpr::All => true,
        SelectionExpr::None => false,
        SelectionExpr::Not(inner) => !matches(inner, index, atom),
        SelectionExpr::And(a, b) => matches(a, index, atom) && matches(b, index, atom),
        SelectionExpr::Or(a, b) => matches(a, index, atom) || matches(b, index, atom),
        SelectionExpr::Match(predicate) => match predicate {
            Predicate::Index(values) => values.contains(&index),
            Predicate::Name(values) => values.iter().any(|v| *v == atom.name),
            Predicate::Resname(values) => values.iter().any(|v| *v == atom.resname),
            Predicate::Resid(values) => values.contains(&atom.resid),
            Predicate::Element(values) => values.iter().any(|v| *v == atom.element),
            Predicate::Hydrogen => is_hydrogen(atom),
        },
    }
}

/// Returns the ascending indices of the atoms matched by `expr`.
pub fn evaluate(expr: &SelectionExpr, atoms: &[AtomRecord]) -> Vec<usize> {
    atoms
        .iter()
        .enumerate()
        .filter(|(index, atom)| matches(expr, *index, atom))
        .map(|(index, _)| index)
        .collect()
}
