//! Diagnostic messages produced during hierarchy resolution.
//!
//! The resolver never unwinds on user errors: every recoverable problem is
//! reported as a [`Diagnostic`] keyed by a [`MessageKind`] from a closed
//! set, and resolution continues with a documented fallback. The
//! [`Diagnostics`] collector preserves report order.

use std::collections::VecDeque;
use std::fmt;

use crate::span::Span;

/// The closed set of message kinds the hierarchy resolver can report.
///
/// Downstream tooling switches on these; new kinds are an API change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    DuplicateTypeVariableName,
    CyclicTypeVariable,
    CannotExtendMalformed,
    CannotExtendEnum,
    ClassNameExpected,
    CannotExtend,
    CannotImplementMalformed,
    CannotImplementEnum,
    CannotImplement,
    DuplicateExtendsImplements,
    DuplicateImplements,
    CannotMixin,
    CannotMixinMalformed,
    CannotMixinEnum,
    IllegalMixinCycle,
    CannotFindUnnamedConstructor,
    SuperCallToFactory,
    NoMatchingConstructorForImplicit,
    EmptyEnumDeclaration,
    NotAPrefix,
    CannotResolveType,
}

impl MessageKind {
    /// Stable kebab-case name, used in rendered messages and test baselines.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DuplicateTypeVariableName => "duplicate-type-variable-name",
            Self::CyclicTypeVariable => "cyclic-type-variable",
            Self::CannotExtendMalformed => "cannot-extend-malformed",
            Self::CannotExtendEnum => "cannot-extend-enum",
            Self::ClassNameExpected => "class-name-expected",
            Self::CannotExtend => "cannot-extend",
            Self::CannotImplementMalformed => "cannot-implement-malformed",
            Self::CannotImplementEnum => "cannot-implement-enum",
            Self::CannotImplement => "cannot-implement",
            Self::DuplicateExtendsImplements => "duplicate-extends-implements",
            Self::DuplicateImplements => "duplicate-implements",
            Self::CannotMixin => "cannot-mixin",
            Self::CannotMixinMalformed => "cannot-mixin-malformed",
            Self::CannotMixinEnum => "cannot-mixin-enum",
            Self::IllegalMixinCycle => "illegal-mixin-cycle",
            Self::CannotFindUnnamedConstructor => "cannot-find-unnamed-constructor",
            Self::SuperCallToFactory => "super-call-to-factory",
            Self::NoMatchingConstructorForImplicit => "no-matching-constructor-for-implicit",
            Self::EmptyEnumDeclaration => "empty-enum-declaration",
            Self::NotAPrefix => "not-a-prefix",
            Self::CannotResolveType => "cannot-resolve-type",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single resolver diagnostic: a kind, an anchor position, and named
/// arguments in report order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Which message this is.
    pub kind: MessageKind,
    /// Source anchor of the offending construct.
    pub span: Span,
    /// Named arguments, e.g. `("type", "int")`.
    pub args: Vec<(&'static str, String)>,
}

impl Diagnostic {
    /// Create a diagnostic with no arguments.
    pub fn new(kind: MessageKind, span: Span) -> Self {
        Self { kind, span, args: Vec::new() }
    }

    /// Attach a named argument.
    pub fn with_arg(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.args.push((name, value.into()));
        self
    }

    /// Look up a named argument.
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for Diagnostic {
    /// Renders as `line:col: kind (name=value, ...)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.span, self.kind)?;
        if !self.args.is_empty() {
            write!(f, " (")?;
            for (i, (name, value)) in self.args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}={}", name, value)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// Ordered collector of resolver diagnostics.
///
/// Every kind in the closed set is a compile-time error; the resolver
/// recovers locally and keeps going, so one run can accumulate many.
#[derive(Debug, Default)]
pub struct Diagnostics {
    messages: VecDeque<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.messages.push_back(diagnostic);
    }

    /// Whether nothing has been reported.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of reported diagnostics.
    pub fn count(&self) -> usize {
        self.messages.len()
    }

    /// All diagnostics, in report order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.messages.iter()
    }

    /// Diagnostics of one kind, in report order.
    pub fn of_kind(&self, kind: MessageKind) -> impl Iterator<Item = &Diagnostic> {
        self.messages.iter().filter(move |d| d.kind == kind)
    }

    /// Number of diagnostics of one kind.
    pub fn count_of(&self, kind: MessageKind) -> usize {
        self.of_kind(kind).count()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in &self.messages {
            writeln!(f, "{}", diagnostic)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_are_kebab_case() {
        assert_eq!(MessageKind::CannotExtendEnum.as_str(), "cannot-extend-enum");
        assert_eq!(
            MessageKind::NoMatchingConstructorForImplicit.as_str(),
            "no-matching-constructor-for-implicit"
        );
    }

    #[test]
    fn diagnostic_args() {
        let d = Diagnostic::new(MessageKind::CannotExtend, Span::new(2, 7, 3))
            .with_arg("type", "int");
        assert_eq!(d.arg("type"), Some("int"));
        assert_eq!(d.arg("missing"), None);
        assert_eq!(d.to_string(), "2:7: cannot-extend (type=int)");
    }

    #[test]
    fn collector_preserves_order_and_counts() {
        let mut sink = Diagnostics::new();
        sink.report(Diagnostic::new(MessageKind::DuplicateImplements, Span::point(1, 1)));
        sink.report(Diagnostic::new(MessageKind::CannotExtend, Span::point(2, 1)));
        sink.report(Diagnostic::new(MessageKind::DuplicateImplements, Span::point(3, 1)));

        assert_eq!(sink.count(), 3);
        assert_eq!(sink.count_of(MessageKind::DuplicateImplements), 2);
        let kinds: Vec<_> = sink.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![
                MessageKind::DuplicateImplements,
                MessageKind::CannotExtend,
                MessageKind::DuplicateImplements
            ]
        );
    }
}
