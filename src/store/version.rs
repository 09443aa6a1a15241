//! Dotted-numeric version comparison.
//!
//! Versions are split on `.` and compared component by component. Missing
//! trailing components count as `0`, and so does any component that is not
//! a plain number, which makes malformed input compare equal rather than
//! fail. A leading `v` is ignored.

use std::cmp::Ordering;

fn components(version: &str) -> Vec<u64> {
    let version = version.trim();
    let version = version.strip_prefix('v').unwrap_or(version);
    version
        .split('.')
        .map(|part| part.trim().parse::<u64>().unwrap_or(0))
        .collect()
}

pub fn compare_versions(left: &str, right: &str) -> Ordering {
    let left = components(left);
    let right = components(right);
    let len = left.len().max(right.len());

    (0..len)
        .map(|index| {
            let l = left.get(index).copied().unwrap_or(0);
            let r = right.get(index).copied().unwrap_or(0);
            l.cmp(&r)
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Comparison operator of a version requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl VersionOp {
    /// Accepts both symbolic (`<=`) and mnemonic (`le`) spellings
    pub fn parse(op: &str) -> Option<Self> {
        match op.trim() {
            "<" | "lt" => Some(VersionOp::Lt),
            "<=" | "le" => Some(VersionOp::Le),
            ">" | "gt" => Some(VersionOp::Gt),
            ">=" | "ge" => Some(VersionOp::Ge),
            "" | "=" | "==" | "eq" => Some(VersionOp::Eq),
            "!=" | "<>" | "ne" => Some(VersionOp::Ne),
            _ => None,
        }
    }

    pub fn matches(self, ordering: Ordering) -> bool {
        match self {
            VersionOp::Lt => ordering.is_lt(),
            VersionOp::Le => ordering.is_le(),
            VersionOp::Gt => ordering.is_gt(),
            VersionOp::Ge => ordering.is_ge(),
            VersionOp::Eq => ordering.is_eq(),
            VersionOp::Ne => ordering.is_ne(),
        }
    }
}

/// Split a requirement such as `"<= 1.2.0"` into operator and version.
///
/// A requirement without an operator means equality. Unknown operators
/// yield `None`.
pub fn parse_requirement(requirement: &str) -> Option<(VersionOp, &str)> {
    let requirement = requirement.trim();
    for mnemonic in ["lt", "le", "gt", "ge", "eq", "ne"] {
        if let Some(rest) = requirement.strip_prefix(mnemonic) {
            if rest.starts_with(char::is_whitespace) {
                return VersionOp::parse(mnemonic).map(|op| (op, rest.trim()));
            }
        }
    }

    let split = requirement
        .find(|c: char| !matches!(c, '<' | '>' | '=' | '!'))
        .unwrap_or(requirement.len());
    let (op, version) = requirement.split_at(split);
    VersionOp::parse(op).map(|op| (op, version.trim()))
}
