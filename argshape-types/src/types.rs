//! Type table, handles, and structural kinds
//!
//! Types are stored in a flat arena; a `TypeId` is an index into it.
//! Handles are cheap to copy and compare, but identity is *not* the
//! memoization key downstream: the compiler derives a canonical
//! structural signature instead, so two separately-built but
//! structurally identical types compile to the same validator.

use std::fmt;

/// Opaque handle into a [`TypeTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl TypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Numeric literal value carried by a number-literal type
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralNumber {
    Int(i64),
    Float(f64),
}

impl fmt::Display for LiteralNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralNumber::Int(value) => write!(f, "{value}"),
            LiteralNumber::Float(value) => write!(f, "{value}"),
        }
    }
}

/// A named property of an object type
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub ty: TypeId,
    pub optional: bool,
    /// Method-valued properties are rejected or ignored per compiler options
    pub is_method: bool,
    /// Symbol-named properties are skipped entirely by the object compiler
    pub is_symbol: bool,
}

impl Property {
    pub fn required(name: impl Into<String>, ty: TypeId) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
            is_method: false,
            is_symbol: false,
        }
    }

    pub fn optional(name: impl Into<String>, ty: TypeId) -> Self {
        Self {
            optional: true,
            ..Self::required(name, ty)
        }
    }

    pub fn method(name: impl Into<String>, ty: TypeId) -> Self {
        Self {
            is_method: true,
            ..Self::required(name, ty)
        }
    }

    pub fn symbol(name: impl Into<String>, ty: TypeId) -> Self {
        Self {
            is_symbol: true,
            ..Self::required(name, ty)
        }
    }
}

/// Structural object type: interfaces, records, and arrays
///
/// Arrays are object types with a number index signature and no tuple
/// representation, the same classification rule the compiler uses.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectType {
    /// Declared properties, in declaration order
    pub properties: Vec<Property>,
    /// Open string-index signature (`{ [key: string]: T }`)
    pub string_index: Option<TypeId>,
    /// Number-index signature; present on array-like types
    pub number_index: Option<TypeId>,
    /// Generic parameters declared by this definition (each a `Parameter` type)
    pub type_params: Vec<TypeId>,
    /// Declared base types (references, so inherited generic parameters
    /// can be captured when a reference to this definition is expanded)
    pub base_types: Vec<TypeId>,
    /// Class types cannot be structurally validated
    pub is_class: bool,
}

/// One position of a tuple type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TupleElement {
    pub ty: TypeId,
    pub optional: bool,
}

/// Fixed-position composite type; a suffix of elements may be optional
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TupleType {
    pub elements: Vec<TupleElement>,
}

/// Structural category of a type
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    Any,
    Unknown,
    Never,
    Null,
    Undefined,
    /// The `object` intrinsic: anything that is not a primitive
    NonPrimitive,
    String,
    Number,
    Boolean,
    BigInt,
    StringLiteral(String),
    NumberLiteral(LiteralNumber),
    BooleanLiteral(bool),
    Object(ObjectType),
    Tuple(TupleType),
    Union(Vec<TypeId>),
    Intersection(Vec<TypeId>),
    /// Generic instantiation: `target` is the unparameterized definition
    Reference { target: TypeId, args: Vec<TypeId> },
    /// Generic type parameter with an optional declared default
    Parameter {
        name: String,
        default: Option<TypeId>,
    },
    /// `keyof T`
    Index(TypeId),
    /// `T[U]`
    IndexedAccess { object: TypeId, index: TypeId },
}

/// Arena of types scoped to one compilation run
#[derive(Debug, Default)]
pub struct TypeTable {
    types: Vec<TypeKind>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a kind and return its handle
    pub fn intern(&mut self, kind: TypeKind) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(kind);
        id
    }

    /// Reserve a handle for a type defined later (recursive shapes)
    pub fn declare(&mut self) -> TypeId {
        self.intern(TypeKind::Unknown)
    }

    /// Fill in a previously declared handle
    pub fn define(&mut self, id: TypeId, kind: TypeKind) {
        self.types[id.index()] = kind;
    }

    /// Structural kind of a handle
    pub fn kind(&self, id: TypeId) -> &TypeKind {
        &self.types[id.index()]
    }

    pub fn any(&mut self) -> TypeId {
        self.intern(TypeKind::Any)
    }

    pub fn unknown(&mut self) -> TypeId {
        self.intern(TypeKind::Unknown)
    }

    pub fn never(&mut self) -> TypeId {
        self.intern(TypeKind::Never)
    }

    pub fn null(&mut self) -> TypeId {
        self.intern(TypeKind::Null)
    }

    pub fn undefined(&mut self) -> TypeId {
        self.intern(TypeKind::Undefined)
    }

    pub fn non_primitive(&mut self) -> TypeId {
        self.intern(TypeKind::NonPrimitive)
    }

    pub fn string(&mut self) -> TypeId {
        self.intern(TypeKind::String)
    }

    pub fn number(&mut self) -> TypeId {
        self.intern(TypeKind::Number)
    }

    pub fn boolean(&mut self) -> TypeId {
        self.intern(TypeKind::Boolean)
    }

    pub fn bigint(&mut self) -> TypeId {
        self.intern(TypeKind::BigInt)
    }

    pub fn string_literal(&mut self, value: impl Into<String>) -> TypeId {
        self.intern(TypeKind::StringLiteral(value.into()))
    }

    pub fn number_literal(&mut self, value: i64) -> TypeId {
        self.intern(TypeKind::NumberLiteral(LiteralNumber::Int(value)))
    }

    pub fn float_literal(&mut self, value: f64) -> TypeId {
        self.intern(TypeKind::NumberLiteral(LiteralNumber::Float(value)))
    }

    pub fn boolean_literal(&mut self, value: bool) -> TypeId {
        self.intern(TypeKind::BooleanLiteral(value))
    }

    /// Closed object type with the given properties
    pub fn object(&mut self, properties: Vec<Property>) -> TypeId {
        self.intern(TypeKind::Object(ObjectType {
            properties,
            ..ObjectType::default()
        }))
    }

    /// Object type with an open string-index signature
    pub fn open_object(&mut self, properties: Vec<Property>, string_index: TypeId) -> TypeId {
        self.intern(TypeKind::Object(ObjectType {
            properties,
            string_index: Some(string_index),
            ..ObjectType::default()
        }))
    }

    /// Class object type (rejected unless class-ignoring is enabled)
    pub fn class(&mut self, properties: Vec<Property>) -> TypeId {
        self.intern(TypeKind::Object(ObjectType {
            properties,
            is_class: true,
            ..ObjectType::default()
        }))
    }

    /// Homogeneous array: an object type with a number index signature
    pub fn array(&mut self, element: TypeId) -> TypeId {
        self.intern(TypeKind::Object(ObjectType {
            number_index: Some(element),
            ..ObjectType::default()
        }))
    }

    /// Tuple where every position is required
    pub fn tuple(&mut self, elements: Vec<TypeId>) -> TypeId {
        let elements = elements
            .into_iter()
            .map(|ty| TupleElement {
                ty,
                optional: false,
            })
            .collect();
        self.intern(TypeKind::Tuple(TupleType { elements }))
    }

    /// Tuple with explicit per-position optionality
    pub fn tuple_with_optional(&mut self, elements: Vec<(TypeId, bool)>) -> TypeId {
        let elements = elements
            .into_iter()
            .map(|(ty, optional)| TupleElement { ty, optional })
            .collect();
        self.intern(TypeKind::Tuple(TupleType { elements }))
    }

    pub fn union(&mut self, members: Vec<TypeId>) -> TypeId {
        self.intern(TypeKind::Union(members))
    }

    pub fn intersection(&mut self, members: Vec<TypeId>) -> TypeId {
        self.intern(TypeKind::Intersection(members))
    }

    pub fn reference(&mut self, target: TypeId, args: Vec<TypeId>) -> TypeId {
        self.intern(TypeKind::Reference { target, args })
    }

    pub fn parameter(&mut self, name: impl Into<String>, default: Option<TypeId>) -> TypeId {
        self.intern(TypeKind::Parameter {
            name: name.into(),
            default,
        })
    }

    /// `keyof T`
    pub fn keyof(&mut self, ty: TypeId) -> TypeId {
        self.intern(TypeKind::Index(ty))
    }

    /// `T[U]`
    pub fn indexed_access(&mut self, object: TypeId, index: TypeId) -> TypeId {
        self.intern(TypeKind::IndexedAccess { object, index })
    }

    /// Generic definition: an object type carrying its own parameter list
    pub fn generic_object(
        &mut self,
        type_params: Vec<TypeId>,
        base_types: Vec<TypeId>,
        properties: Vec<Property>,
    ) -> TypeId {
        self.intern(TypeKind::Object(ObjectType {
            properties,
            type_params,
            base_types,
            ..ObjectType::default()
        }))
    }

    /// Object view of a handle, if it is object-like
    pub fn as_object(&self, id: TypeId) -> Option<&ObjectType> {
        match self.kind(id) {
            TypeKind::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Tuple view of a handle, if it is a fixed tuple
    pub fn as_tuple(&self, id: TypeId) -> Option<&TupleType> {
        match self.kind(id) {
            TypeKind::Tuple(tuple) => Some(tuple),
            _ => None,
        }
    }

    pub fn is_tuple(&self, id: TypeId) -> bool {
        matches!(self.kind(id), TypeKind::Tuple(_))
    }

    /// Number index signature, present on array-like object types
    pub fn number_index_type(&self, id: TypeId) -> Option<TypeId> {
        self.as_object(id).and_then(|object| object.number_index)
    }

    /// String index signature of an object type
    pub fn string_index_type(&self, id: TypeId) -> Option<TypeId> {
        self.as_object(id).and_then(|object| object.string_index)
    }

    /// Declared properties of an object type, in declaration order
    pub fn properties(&self, id: TypeId) -> &[Property] {
        self.as_object(id)
            .map(|object| object.properties.as_slice())
            .unwrap_or(&[])
    }
}
