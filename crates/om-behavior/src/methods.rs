//! `MethodMap` — compiled dynamic-method dispatch table.
//!
//! A behavior that exposes callable methods builds one of these in
//! [`Behavior::methods`][crate::Behavior::methods].  The table is immutable
//! after construction and compiled once per attachment, so dispatch is an
//! ordered scan over pre-compiled patterns — no regex compilation on the
//! call path.
//!
//! Within one table, exact literal names resolve before patterns, and
//! patterns are tried in insertion order.  Across several attached behaviors
//! the registry widens this to two phases — every behavior's literals, then
//! every behavior's patterns — via [`has_literal`][MethodMap::has_literal]
//! and [`resolve_pattern`][MethodMap::resolve_pattern].

use om_core::Value;
use regex::Regex;

use crate::BehaviorResult;

/// A resolved dynamic-method call.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMethod {
    /// The target method name to hand to [`Behavior::call`][crate::Behavior::call].
    pub target: String,

    /// Capture groups from a pattern match (empty for literal matches),
    /// passed as the leading arguments of the call.
    pub captures: Vec<Value>,
}

/// Immutable literal + pattern dispatch table.
#[derive(Debug, Default)]
pub struct MethodMap {
    literals: Vec<String>,
    patterns: Vec<(Regex, String)>,
}

impl MethodMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a directly callable method name.
    pub fn literal(mut self, name: impl Into<String>) -> Self {
        self.literals.push(name.into());
        self
    }

    /// Register a pattern mapping: any method name matching `pattern`
    /// resolves to `target`, with capture groups forwarded as arguments.
    ///
    /// A malformed pattern is a programmer error and fails here (i.e. at
    /// attach time), never during dispatch.
    pub fn pattern(mut self, pattern: &str, target: impl Into<String>) -> BehaviorResult<Self> {
        let re = Regex::new(pattern)?;
        self.patterns.push((re, target.into()));
        Ok(self)
    }

    /// Number of entries (literals + patterns).
    pub fn len(&self) -> usize {
        self.literals.len() + self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty() && self.patterns.is_empty()
    }

    /// `true` when `method` is registered as a literal name.
    pub fn has_literal(&self, method: &str) -> bool {
        self.literals.iter().any(|name| name == method)
    }

    /// Resolve `method` against this table.
    ///
    /// Literals match by exact name and resolve to themselves; otherwise
    /// patterns are consulted via [`resolve_pattern`][Self::resolve_pattern].
    pub fn resolve(&self, method: &str) -> Option<ResolvedMethod> {
        if self.has_literal(method) {
            return Some(ResolvedMethod {
                target: method.to_owned(),
                captures: Vec::new(),
            });
        }
        self.resolve_pattern(method)
    }

    /// Resolve `method` against the pattern entries only.
    ///
    /// Patterns are tried in insertion order; the first whose regex matches
    /// wins, with capture groups 1.. forwarded as `Value::Str` arguments (a
    /// group that did not participate in the match forwards as
    /// `Value::Null`).
    pub fn resolve_pattern(&self, method: &str) -> Option<ResolvedMethod> {
        for (re, target) in &self.patterns {
            if let Some(caps) = re.captures(method) {
                let captures = caps
                    .iter()
                    .skip(1)
                    .map(|m| match m {
                        Some(m) => Value::Str(m.as_str().to_owned()),
                        None => Value::Null,
                    })
                    .collect();
                return Some(ResolvedMethod {
                    target: target.clone(),
                    captures,
                });
            }
        }

        None
    }
}
