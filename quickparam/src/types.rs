//! Runtime type descriptors and covariant assignability checks.
//!
//! A [`TypeToken`] names the type a parameter is declared with, or a type a
//! generator claims to produce. Tokens carry their type arguments and their
//! declared supertypes, so a parameter typed `Clock` accepts a generator of
//! `FixedClock` as long as the latter lists `Clock` among its supertypes.
//!
//! When the type is known at compile time, [`Typed::type_token`] builds the
//! token; hand-built tokens cover everything else.

use std::borrow::Cow;
use std::fmt;

/// The shape of a type as far as sampling decisions are concerned
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// The top type; every other type is assignable to it
    Any,
    /// A two-valued truth type
    Boolean,
    /// A closed set of named members, in declaration order
    Enumeration(Vec<Cow<'static, str>>),
    /// Any other named type
    Nominal,
}

/// A type argument of a parameterized type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeArg {
    /// Exactly this type (invariant)
    Exact(TypeToken),
    /// Any type at all
    Wildcard,
    /// The bound or any of its subtypes
    Extends(TypeToken),
    /// The bound or any of its supertypes
    Super(TypeToken),
}

impl TypeArg {
    /// Whether an argument `other` fits where this argument is expected
    pub fn contains(&self, other: &TypeArg) -> bool {
        match (self, other) {
            (TypeArg::Wildcard, _) => true,
            (TypeArg::Exact(expected), TypeArg::Exact(actual)) => expected.same_type(actual),
            (TypeArg::Extends(bound), TypeArg::Exact(actual))
            | (TypeArg::Extends(bound), TypeArg::Extends(actual)) => {
                bound.is_assignable_from(actual)
            }
            (TypeArg::Extends(bound), TypeArg::Wildcard) => bound.is_any(),
            (TypeArg::Super(bound), TypeArg::Exact(actual))
            | (TypeArg::Super(bound), TypeArg::Super(actual)) => actual.is_assignable_from(bound),
            _ => false,
        }
    }
}

impl fmt::Display for TypeArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeArg::Exact(token) => write!(f, "{}", token),
            TypeArg::Wildcard => write!(f, "?"),
            TypeArg::Extends(bound) => write!(f, "? extends {}", bound),
            TypeArg::Super(bound) => write!(f, "? super {}", bound),
        }
    }
}

/// Descriptor of a possibly parameterized type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeToken {
    name: Cow<'static, str>,
    kind: TypeKind,
    args: Vec<TypeArg>,
    supertypes: Vec<TypeToken>,
}

impl TypeToken {
    fn with_kind(name: impl Into<Cow<'static, str>>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            args: Vec::new(),
            supertypes: Vec::new(),
        }
    }

    /// The top type
    pub fn any() -> Self {
        Self::with_kind("Any", TypeKind::Any)
    }

    /// A boolean-like type
    pub fn boolean(name: impl Into<Cow<'static, str>>) -> Self {
        Self::with_kind(name, TypeKind::Boolean)
    }

    /// An enumeration-like type with the given members
    pub fn enumeration<I, S>(name: impl Into<Cow<'static, str>>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'static, str>>,
    {
        let variants = variants.into_iter().map(Into::into).collect();
        Self::with_kind(name, TypeKind::Enumeration(variants))
    }

    /// Any other named type
    pub fn nominal(name: impl Into<Cow<'static, str>>) -> Self {
        Self::with_kind(name, TypeKind::Nominal)
    }

    /// Replace the type arguments
    pub fn with_args(mut self, args: impl IntoIterator<Item = TypeArg>) -> Self {
        self.args = args.into_iter().collect();
        self
    }

    /// Declare a supertype this type may stand in for
    pub fn with_supertype(mut self, supertype: TypeToken) -> Self {
        self.supertypes.push(supertype);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn args(&self) -> &[TypeArg] {
        &self.args
    }

    pub fn supertypes(&self) -> &[TypeToken] {
        &self.supertypes
    }

    /// The same type with its arguments erased
    pub fn raw(&self) -> TypeToken {
        Self {
            args: Vec::new(),
            ..self.clone()
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self.kind, TypeKind::Any)
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self.kind, TypeKind::Boolean)
    }

    /// The declared members, if this is an enumeration
    pub fn enum_variants(&self) -> Option<&[Cow<'static, str>]> {
        match &self.kind {
            TypeKind::Enumeration(variants) => Some(variants),
            _ => None,
        }
    }

    /// Identity on name and arguments; supertypes do not take part
    pub fn same_type(&self, other: &TypeToken) -> bool {
        self.name == other.name && self.args == other.args
    }

    /// Whether values of `candidate` may be used wherever `self` is expected.
    ///
    /// Raw tokens (no arguments) match any parameterization of the same
    /// type, in either direction.
    pub fn is_assignable_from(&self, candidate: &TypeToken) -> bool {
        if self.is_any() {
            return true;
        }

        if self.name == candidate.name {
            if self.args.is_empty() || candidate.args.is_empty() {
                return true;
            }
            return self.args.len() == candidate.args.len()
                && self
                    .args
                    .iter()
                    .zip(&candidate.args)
                    .all(|(expected, actual)| expected.contains(actual));
        }

        candidate
            .supertypes
            .iter()
            .any(|supertype| self.is_assignable_from(supertype))
    }
}

impl fmt::Display for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.args.is_empty() {
            write!(f, "<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", arg)?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}

/// Types whose token is known at compile time
pub trait Typed: 'static {
    fn type_token() -> TypeToken;
}

/// Token for a statically known type
pub fn type_of<T: Typed + ?Sized>() -> TypeToken {
    T::type_token()
}

macro_rules! impl_typed_nominal {
    ($($t:ty),*) => {
        $(
            impl Typed for $t {
                fn type_token() -> TypeToken {
                    TypeToken::nominal(stringify!($t))
                }
            }
        )*
    };
}

impl_typed_nominal!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, char, String
);

impl Typed for bool {
    fn type_token() -> TypeToken {
        TypeToken::boolean("bool")
    }
}

impl<T: Typed> Typed for Vec<T> {
    fn type_token() -> TypeToken {
        TypeToken::nominal("Vec").with_args([TypeArg::Exact(T::type_token())])
    }
}

impl<T: Typed> Typed for Option<T> {
    fn type_token() -> TypeToken {
        TypeToken::nominal("Option").with_args([TypeArg::Exact(T::type_token())])
    }
}
