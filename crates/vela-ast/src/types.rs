//! Identifiers and type annotations.

use vela_core::Span;

/// An identifier with its source position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ident<'ast> {
    /// The identifier text.
    pub name: &'ast str,
    /// Source location.
    pub span: Span,
}

impl<'ast> Ident<'ast> {
    /// Create an identifier.
    pub fn new(name: &'ast str, span: Span) -> Self {
        Self { name, span }
    }

    /// Whether this name is library-private (leading underscore).
    pub fn is_private(&self) -> bool {
        self.name.starts_with('_')
    }
}

/// A nominal type annotation, possibly prefixed and possibly generic:
/// `Name`, `prefix.Name`, `Name<A, B>`.
///
/// The name `dynamic` denotes the dynamic type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeAnnotation<'ast> {
    /// Import prefix of a dotted form, if any.
    pub prefix: Option<Ident<'ast>>,
    /// The referenced name.
    pub name: Ident<'ast>,
    /// Type arguments; empty for a raw reference.
    pub args: &'ast [TypeAnnotation<'ast>],
    /// Source location of the whole annotation.
    pub span: Span,
}

impl<'ast> TypeAnnotation<'ast> {
    /// Create an annotation.
    pub fn new(
        prefix: Option<Ident<'ast>>,
        name: Ident<'ast>,
        args: &'ast [TypeAnnotation<'ast>],
        span: Span,
    ) -> Self {
        Self { prefix, name, args, span }
    }

    /// A bare, unprefixed, raw reference.
    pub fn simple(name: Ident<'ast>) -> Self {
        Self { prefix: None, name, args: &[], span: name.span }
    }

    /// Whether this annotation names the dynamic type.
    pub fn is_dynamic(&self) -> bool {
        self.prefix.is_none() && self.name.name == "dynamic"
    }

    /// The annotation's name as written, including any prefix.
    pub fn written_name(&self) -> String {
        match self.prefix {
            Some(prefix) => format!("{}.{}", prefix.name, self.name.name),
            None => self.name.name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn private_names() {
        assert!(Ident::new("_secret", Span::point(1, 1)).is_private());
        assert!(!Ident::new("open", Span::point(1, 1)).is_private());
    }

    #[test]
    fn written_name_includes_prefix() {
        let ann = TypeAnnotation::new(
            Some(Ident::new("core", Span::point(1, 1))),
            Ident::new("Object", Span::point(1, 6)),
            &[],
            Span::new(1, 1, 11),
        );
        assert_eq!(ann.written_name(), "core.Object");
        assert!(!ann.is_dynamic());
    }

    #[test]
    fn dynamic_detection() {
        let ann = TypeAnnotation::simple(Ident::new("dynamic", Span::point(1, 1)));
        assert!(ann.is_dynamic());
    }
}
