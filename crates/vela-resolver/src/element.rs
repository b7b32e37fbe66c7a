//! Class records and the arena they live in.
//!
//! Every class-like declaration (user-written or synthetic) is one
//! [`ClassRecord`] in a [`ClassStore`]. Records reference each other by
//! [`ClassId`] only; the store owns them all for the duration of the
//! compilation run and never frees one. The class resolver is the single
//! writer: fields documented as set-once enforce that through
//! [`InternalError::SetTwice`].

use bitflags::bitflags;
use vela_core::{ClassId, InternalError, LibraryId, ResolveResult, Span};

use crate::linearize::SupertypeSet;
use crate::types::ResolvedType;

bitflags! {
    /// Capability flags summarizing what a class record carries.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Capabilities: u8 {
        /// The class declares at least one constructor of its own.
        const HAS_OWN_CONSTRUCTORS = 1 << 0;
        /// The class is a mixin application (has a mixin type).
        const HAS_MIXIN = 1 << 1;
        /// The class was synthesized by mixin expansion.
        const IS_SYNTHETIC = 1 << 2;
    }
}

/// What kind of class-like declaration a record is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    /// Ordinary class.
    Regular,
    /// Enum declaration.
    Enum,
    /// User-written `class N = S with M…;`.
    NamedMixinApplication,
    /// Synthesized intermediate link of a mixin chain.
    SyntheticMixinApplication,
}

impl ClassKind {
    /// Whether this kind carries a mixin type and forwarding constructors.
    pub fn is_mixin_application(self) -> bool {
        matches!(self, Self::NamedMixinApplication | Self::SyntheticMixinApplication)
    }
}

/// Progress of the class resolver on a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionState {
    /// Not yet scheduled.
    #[default]
    Unstarted,
    /// Resolution in progress; observing this from a neighbor means the
    /// hierarchy is cyclic.
    Started,
    /// Fully resolved.
    Done,
}

/// Progress of the supertype loader on a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Not yet visited.
    #[default]
    Unstarted,
    /// On the loader's DFS stack; revisiting means a naming cycle.
    Started,
    /// Direct supertype names are bound.
    Done,
}

/// A type parameter declaration.
#[derive(Debug, Clone)]
pub struct TypeParameter {
    /// Parameter name.
    pub name: String,
    /// Declaring class.
    pub owner: ClassId,
    /// Position in the owner's parameter list.
    pub index: u16,
    /// Resolved bound. `None` until the class resolver runs; defaults to
    /// the top type (dynamic) when no bound was written.
    pub bound: Option<ResolvedType>,
    /// Source location of the declaration.
    pub span: Span,
}

/// Whether a constructor is generative or a factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructorKind {
    /// Produces a fresh instance of exactly its declaring class.
    Generative,
    /// May return anything; cannot be the target of an implicit super
    /// call.
    Factory,
}

/// Reference to a constructor by owning class and index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstructorRef {
    /// The owning class.
    pub class: ClassId,
    /// Index into the owner's constructor list.
    pub index: usize,
}

/// How a constructor came to exist on a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstructorOrigin {
    /// Written in source.
    Declared,
    /// Synthesized default; `target` is the superclass's unnamed
    /// constructor (`None` only on the root class).
    SynthesizedDefault {
        /// The forwarded-to constructor.
        target: Option<ConstructorRef>,
    },
    /// Mixin-application forwarder to a superclass constructor.
    Forwarding {
        /// The forwarded-to constructor.
        target: ConstructorRef,
    },
    /// Placeholder installed after a failed default synthesis; invoking
    /// it throws no-such-method.
    Erroneous,
}

/// A constructor as hierarchy resolution sees it: name, kind, and the
/// parameter structure forwarders must replicate.
#[derive(Debug, Clone)]
pub struct Constructor {
    /// Constructor name; empty for the unnamed constructor.
    pub name: String,
    /// Generative or factory.
    pub kind: ConstructorKind,
    /// Required positional parameter names.
    pub required: Vec<String>,
    /// Optional positional parameter names.
    pub optional: Vec<String>,
    /// Named parameter names.
    pub named: Vec<String>,
    /// Provenance.
    pub origin: ConstructorOrigin,
    /// Source location (synthetic for synthesized constructors).
    pub span: Span,
}

impl Constructor {
    /// Whether this constructor is generative.
    pub fn is_generative(&self) -> bool {
        self.kind == ConstructorKind::Generative
    }

    /// Whether invoking this constructor requires arguments.
    pub fn requires_arguments(&self) -> bool {
        !self.required.is_empty()
    }

    /// Whether the constructor name is library-private.
    pub fn is_private(&self) -> bool {
        self.name.starts_with('_')
    }
}

/// The mutable record for one class-like declaration.
#[derive(Debug)]
pub struct ClassRecord {
    /// Stable identity.
    pub id: ClassId,
    /// Simple name.
    pub name: String,
    /// Owning library.
    pub library: LibraryId,
    /// Declaration kind.
    pub kind: ClassKind,
    /// Declared abstract.
    pub is_abstract: bool,
    /// Type parameters, in declaration order.
    pub type_params: Vec<TypeParameter>,
    /// Class-resolver progress.
    pub resolution_state: ResolutionState,
    /// Supertype-loader progress.
    pub load_state: LoadState,
    /// Mixin type; present only on mixin applications, and cleared again
    /// when a mixin cycle is cut.
    pub mixin: Option<ResolvedType>,
    /// Set when a cycle or structural error forced the hierarchy to be
    /// truncated at the root.
    pub has_incomplete_hierarchy: bool,
    /// Constructors: declared ones first (registration order), then
    /// synthesized ones.
    pub constructors: Vec<Constructor>,
    /// Names of non-constructor members; opaque to hierarchy resolution.
    pub members: Vec<String>,
    /// Capability summary.
    pub capabilities: Capabilities,
    /// Declaration span (synthetic for synthesized classes).
    pub span: Span,

    supertype: Option<ResolvedType>,
    interfaces: Option<Vec<ResolvedType>>,
    all_supertypes: Option<SupertypeSet>,
}

impl ClassRecord {
    /// Create an unresolved record.
    pub fn new(id: ClassId, name: impl Into<String>, library: LibraryId, kind: ClassKind, span: Span) -> Self {
        Self {
            id,
            name: name.into(),
            library,
            kind,
            is_abstract: false,
            type_params: Vec::new(),
            resolution_state: ResolutionState::default(),
            load_state: LoadState::default(),
            mixin: None,
            has_incomplete_hierarchy: false,
            constructors: Vec::new(),
            members: Vec::new(),
            capabilities: Capabilities::empty(),
            span,
            supertype: None,
            interfaces: None,
            all_supertypes: None,
        }
    }

    /// The instantiation of this class by its own type parameters.
    pub fn this_type(&self) -> ResolvedType {
        let args = (0..self.type_params.len())
            .map(|i| ResolvedType::variable(self.id, i as u16))
            .collect();
        ResolvedType::instance(self.id, args)
    }

    /// The resolved supertype, if set. The root class never has one.
    pub fn supertype(&self) -> Option<&ResolvedType> {
        self.supertype.as_ref()
    }

    /// Set the supertype. Set-once.
    pub fn set_supertype(&mut self, supertype: ResolvedType) -> ResolveResult<()> {
        if self.supertype.is_some() {
            return Err(InternalError::set_twice(self.id, "supertype"));
        }
        self.supertype = Some(supertype);
        Ok(())
    }

    /// The resolved direct interfaces (empty until set).
    pub fn interfaces(&self) -> &[ResolvedType] {
        self.interfaces.as_deref().unwrap_or(&[])
    }

    /// Set the interface list. Set-once.
    pub fn set_interfaces(&mut self, interfaces: Vec<ResolvedType>) -> ResolveResult<()> {
        if self.interfaces.is_some() {
            return Err(InternalError::set_twice(self.id, "interfaces"));
        }
        self.interfaces = Some(interfaces);
        Ok(())
    }

    /// The linearized supertypes including self, once computed.
    pub fn all_supertypes(&self) -> Option<&SupertypeSet> {
        self.all_supertypes.as_ref()
    }

    /// Set the linearization. Set-once.
    pub fn set_all_supertypes(&mut self, set: SupertypeSet) -> ResolveResult<()> {
        if self.all_supertypes.is_some() {
            return Err(InternalError::set_twice(self.id, "all_supertypes"));
        }
        self.all_supertypes = Some(set);
        Ok(())
    }

    /// Whether this record is a mixin application.
    pub fn is_mixin_application(&self) -> bool {
        self.kind.is_mixin_application()
    }

    /// Find a constructor by name (`""` for the unnamed one).
    pub fn find_constructor(&self, name: &str) -> Option<(usize, &Constructor)> {
        self.constructors
            .iter()
            .enumerate()
            .find(|(_, c)| c.name == name)
    }

    /// First type parameter with the given name. Duplicate declarations
    /// are diagnosed elsewhere; the first one wins in scope.
    pub fn type_param_named(&self, name: &str) -> Option<&TypeParameter> {
        self.type_params.iter().find(|p| p.name == name)
    }
}

/// Arena of class records, indexed by [`ClassId`].
///
/// Ids are allocated monotonically and never reused; `get`/`get_mut`
/// accept only store-issued ids.
#[derive(Debug, Default)]
pub struct ClassStore {
    classes: Vec<ClassRecord>,
}

impl ClassStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new record and return its id.
    pub fn alloc(
        &mut self,
        name: impl Into<String>,
        library: LibraryId,
        kind: ClassKind,
        span: Span,
    ) -> ClassId {
        let id = ClassId::new(self.classes.len() as u32);
        self.classes.push(ClassRecord::new(id, name, library, kind, span));
        id
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Borrow a record.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this store.
    pub fn get(&self, id: ClassId) -> &ClassRecord {
        &self.classes[id.index()]
    }

    /// Mutably borrow a record.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this store.
    pub fn get_mut(&mut self, id: ClassId) -> &mut ClassRecord {
        &mut self.classes[id.index()]
    }

    /// Fallible lookup for ids crossing the driver API boundary.
    pub fn try_get(&self, id: ClassId) -> ResolveResult<&ClassRecord> {
        self.classes
            .get(id.index())
            .ok_or(InternalError::UnknownClass(id))
    }

    /// All ids, in allocation order.
    pub fn ids(&self) -> impl Iterator<Item = ClassId> + use<> {
        (0..self.classes.len() as u32).map(ClassId::new)
    }

    /// All records, in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = &ClassRecord> {
        self.classes.iter()
    }
}
