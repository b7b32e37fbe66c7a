//! Resolved structural types.
//!
//! A [`ResolvedType`] is what a syntactic type annotation becomes after
//! name resolution: an instantiation of a class, a reference to a type
//! variable in scope, the dynamic type, or a malformed sentinel carrying
//! the diagnostic that produced it. Malformed types flow through the rest
//! of resolution like any other type, so one bad annotation never stops a
//! class from resolving.

use vela_core::{ClassId, Diagnostic};

/// A resolved type.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedType {
    /// An instantiation of a class-like declaration.
    Instance(InstanceType),
    /// A reference to a type parameter in the enclosing scope.
    Variable(TypeVariable),
    /// The dynamic type (also the default bound and the argument filler
    /// for raw instantiations).
    Dynamic,
    /// A placeholder for an annotation that failed to resolve.
    Malformed(Box<Diagnostic>),
}

/// An instantiation of a class with type arguments.
///
/// The argument list length always equals the class's type-parameter
/// count; annotations violating that produce [`ResolvedType::Malformed`]
/// instead.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceType {
    /// The instantiated class.
    pub class: ClassId,
    /// Type arguments, one per declared parameter.
    pub args: Vec<ResolvedType>,
}

/// Identity of a type parameter: declaring class plus index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeVariable {
    /// The class declaring the parameter.
    pub owner: ClassId,
    /// Position in the owner's parameter list.
    pub index: u16,
}

impl ResolvedType {
    /// An instantiation with explicit arguments.
    pub fn instance(class: ClassId, args: Vec<ResolvedType>) -> Self {
        Self::Instance(InstanceType { class, args })
    }

    /// A raw instantiation: every argument is dynamic.
    pub fn raw(class: ClassId, arity: usize) -> Self {
        Self::instance(class, vec![ResolvedType::Dynamic; arity])
    }

    /// A type-variable reference.
    pub fn variable(owner: ClassId, index: u16) -> Self {
        Self::Variable(TypeVariable { owner, index })
    }

    /// A malformed sentinel carrying its diagnostic.
    pub fn malformed(diagnostic: Diagnostic) -> Self {
        Self::Malformed(Box::new(diagnostic))
    }

    /// The instantiated class, if this is an instantiation.
    pub fn class_id(&self) -> Option<ClassId> {
        match self {
            Self::Instance(instance) => Some(instance.class),
            _ => None,
        }
    }

    /// View as an instantiation.
    pub fn as_instance(&self) -> Option<&InstanceType> {
        match self {
            Self::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    /// View as a type-variable reference.
    pub fn as_variable(&self) -> Option<TypeVariable> {
        match self {
            Self::Variable(variable) => Some(*variable),
            _ => None,
        }
    }

    /// Whether this is the malformed sentinel.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed(_))
    }

    /// Whether this type can stand in extends/implements/with position:
    /// only class instantiations can.
    pub fn is_interface_type(&self) -> bool {
        matches!(self, Self::Instance(_))
    }

    /// Replace every reference to `owner`'s type parameters by the
    /// corresponding entry of `args`, recursively.
    ///
    /// Out-of-range indices fall back to dynamic; they can only come from
    /// a malformed instantiation that was already diagnosed.
    pub fn substitute(&self, owner: ClassId, args: &[ResolvedType]) -> ResolvedType {
        match self {
            Self::Variable(variable) if variable.owner == owner => args
                .get(variable.index as usize)
                .cloned()
                .unwrap_or(ResolvedType::Dynamic),
            Self::Instance(instance) => ResolvedType::Instance(InstanceType {
                class: instance.class,
                args: instance
                    .args
                    .iter()
                    .map(|arg| arg.substitute(owner, args))
                    .collect(),
            }),
            other => other.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vela_core::{MessageKind, Span};

    #[test]
    fn raw_instantiation_fills_dynamic() {
        let t = ResolvedType::raw(ClassId::new(1), 2);
        let instance = t.as_instance().unwrap();
        assert_eq!(instance.args, vec![ResolvedType::Dynamic, ResolvedType::Dynamic]);
        assert!(t.is_interface_type());
    }

    #[test]
    fn variable_identity() {
        let a = ResolvedType::variable(ClassId::new(1), 0);
        let b = ResolvedType::variable(ClassId::new(1), 0);
        let c = ResolvedType::variable(ClassId::new(1), 1);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(!a.is_interface_type());
    }

    #[test]
    fn substitution_is_recursive() {
        let owner = ClassId::new(1);
        let list = ClassId::new(2);
        // List<T> where T is owner's first parameter
        let t = ResolvedType::instance(list, vec![ResolvedType::variable(owner, 0)]);
        let result = t.substitute(owner, &[ResolvedType::raw(ClassId::new(3), 0)]);
        let instance = result.as_instance().unwrap();
        assert_eq!(instance.args[0], ResolvedType::raw(ClassId::new(3), 0));
    }

    #[test]
    fn substitution_ignores_other_owners() {
        let t = ResolvedType::variable(ClassId::new(9), 0);
        let result = t.substitute(ClassId::new(1), &[ResolvedType::Dynamic]);
        assert_eq!(result, t);
    }

    #[test]
    fn malformed_keeps_its_diagnostic() {
        let diagnostic = Diagnostic::new(MessageKind::CannotResolveType, Span::point(3, 1))
            .with_arg("type", "Missing");
        let t = ResolvedType::malformed(diagnostic);
        assert!(t.is_malformed());
        match &t {
            ResolvedType::Malformed(d) => assert_eq!(d.arg("type"), Some("Missing")),
            _ => unreachable!(),
        }
    }
}
