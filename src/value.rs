//! Script value representation
//!
//! `Value` is a tagged handle over the per-context heap. Primitives are
//! stored inline and carry no context affiliation; heap values (strings,
//! objects, arrays, functions, promises, errors, externals) are
//! reference-counted and remember the context that allocated them.
//!
//! `PlainValue` is the engine-independent intermediate representation used
//! when plain data has to cross a context boundary: it can be extracted
//! from a value in one context and rebuilt as a native value in another.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::context::{Context, WeakContext};
use crate::runtime::array::ArrayRef;
use crate::runtime::function::FunctionRef;
use crate::runtime::object::{ErrorRef, ExternalRef, ObjectRef};
use crate::runtime::promise::PromiseRef;

/// Value kind, in the marshaller's dispatch order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Function,
    Promise,
    Error,
    Array,
    Object,
    Null,
    Undefined,
    Bool,
    Int,
    Float,
    Str,
    External,
}

/// A script value
///
/// Cheap to clone: heap kinds share their backing allocation, so equality
/// for them is pointer identity, exactly like object identity inside a
/// single context of a real engine.
#[derive(Clone)]
pub enum Value {
    /// The undefined value
    Undefined,
    /// The null value
    Null,
    /// Boolean
    Bool(bool),
    /// Full-width 32-bit integer
    Int(i32),
    /// Double-precision float
    Float(f64),
    /// Immutable per-context string
    Str(JSString),
    /// Plain object
    Object(ObjectRef),
    /// Dense array
    Array(ArrayRef),
    /// Callable
    Function(FunctionRef),
    /// Promise
    Promise(PromiseRef),
    /// Native error object
    Error(ErrorRef),
    /// Opaque host handle with no cross-context representation
    External(ExternalRef),
}

impl Value {
    /// Get the value kind
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Undefined => ValueKind::Undefined,
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Str(_) => ValueKind::Str,
            Value::Object(_) => ValueKind::Object,
            Value::Array(_) => ValueKind::Array,
            Value::Function(_) => ValueKind::Function,
            Value::Promise(_) => ValueKind::Promise,
            Value::Error(_) => ValueKind::Error,
            Value::External(_) => ValueKind::External,
        }
    }

    /// Check if this is null
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this is undefined
    #[inline]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Check if this is nullish (null or undefined)
    #[inline]
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Null | Value::Undefined)
    }

    /// Check if this is a callable function
    #[inline]
    pub fn is_function(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    /// Check if this is a promise
    #[inline]
    pub fn is_promise(&self) -> bool {
        matches!(self, Value::Promise(_))
    }

    /// Check if this is a native error
    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Check if this is an array
    #[inline]
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Check if this is a plain object
    #[inline]
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// Get boolean value, returns None if not a boolean
    #[inline]
    pub fn to_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get integer value, returns None if not an integer
    #[inline]
    pub fn to_i32(&self) -> Option<i32> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get float value; integers widen, returns None otherwise
    #[inline]
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(f64::from(*i)),
            _ => None,
        }
    }

    /// Get string slice, returns None if not a string
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Get the object handle, returns None if not a plain object
    #[inline]
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Get the array handle, returns None if not an array
    #[inline]
    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Get the function handle, returns None if not a function
    #[inline]
    pub fn as_function(&self) -> Option<&FunctionRef> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Get the promise handle, returns None if not a promise
    #[inline]
    pub fn as_promise(&self) -> Option<&PromiseRef> {
        match self {
            Value::Promise(p) => Some(p),
            _ => None,
        }
    }

    /// Get the error handle, returns None if not an error
    #[inline]
    pub fn as_error(&self) -> Option<&ErrorRef> {
        match self {
            Value::Error(e) => Some(e),
            _ => None,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Undefined
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a.as_str() == b.as_str(),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Promise(a), Value::Promise(b)) => a.ptr_eq(b),
            (Value::Error(a), Value::Error(b)) => a.ptr_eq(b),
            (Value::External(a), Value::External(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "Undefined"),
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(i) => write!(f, "Int({i})"),
            Value::Float(x) => write!(f, "Float({x})"),
            Value::Str(s) => write!(f, "Str({:?})", s.as_str()),
            Value::Object(_) => write!(f, "Object"),
            Value::Array(a) => write!(f, "Array(len={})", a.len()),
            Value::Function(func) => write!(f, "Function({})", func.name().unwrap_or("")),
            Value::Promise(_) => write!(f, "Promise"),
            Value::Error(e) => write!(f, "Error({:?})", e.message()),
            Value::External(_) => write!(f, "External"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{}", s.as_str()),
            Value::Object(_) => write!(f, "[object]"),
            Value::Array(_) => write!(f, "[array]"),
            Value::Function(func) => {
                write!(f, "[function {}]", func.name().unwrap_or("anonymous"))
            }
            Value::Promise(_) => write!(f, "[promise]"),
            Value::Error(e) => write!(f, "Error: {}", e.message()),
            Value::External(_) => write!(f, "[external]"),
        }
    }
}

/// Immutable string owned by a single context
///
/// Strings never cross contexts by reference: the marshaller re-allocates
/// their text in the destination context via [`PlainValue`].
#[derive(Clone)]
pub struct JSString(Rc<StringData>);

struct StringData {
    ctx: WeakContext,
    text: String,
}

impl JSString {
    pub(crate) fn new(ctx: WeakContext, text: impl Into<String>) -> Self {
        JSString(Rc::new(StringData {
            ctx,
            text: text.into(),
        }))
    }

    /// Get the string content
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0.text
    }

    /// Length in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.0.text.len()
    }

    /// Check if the string is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.text.is_empty()
    }

    /// The context this string was allocated in
    pub(crate) fn context(&self) -> &WeakContext {
        &self.0.ctx
    }
}

impl fmt::Debug for JSString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JSString({:?})", self.as_str())
    }
}

/// Engine-independent representation of plain data
///
/// This is the intermediate form a primitive passes through when it crosses
/// a context boundary: extracted from the source context, rebuilt in the
/// destination. Values with no such representation (heap externals) simply
/// do not convert.
#[derive(Debug, Clone, PartialEq)]
pub enum PlainValue {
    Null,
    Bool(bool),
    Int(i32),
    Float(f64),
    Str(String),
}

impl PlainValue {
    /// Extract plain data from a value
    ///
    /// Returns None for values that have no engine-independent form; the
    /// marshaller degrades those to the destination's null.
    pub fn from_value(value: &Value) -> Option<PlainValue> {
        match value {
            Value::Null => Some(PlainValue::Null),
            Value::Bool(b) => Some(PlainValue::Bool(*b)),
            Value::Int(i) => Some(PlainValue::Int(*i)),
            Value::Float(f) => Some(PlainValue::Float(*f)),
            Value::Str(s) => Some(PlainValue::Str(s.as_str().to_owned())),
            _ => None,
        }
    }

    /// Rebuild a native value inside `context`
    pub fn into_value(self, context: &Context) -> Value {
        match self {
            PlainValue::Null => Value::Null,
            PlainValue::Bool(b) => Value::Bool(b),
            PlainValue::Int(i) => Value::Int(i),
            PlainValue::Float(f) => Value::Float(f),
            PlainValue::Str(s) => context.new_string(&s),
        }
    }
}

/// Shorthand for building an opaque external handle payload
pub type OpaqueHandle = Rc<dyn Any>;
