//! User-supplied functions and the store call shape.

use std::fmt;

use crate::error::{Error, Result};
use crate::value::Sequence;

/// Minimum arity of both user functions.
pub const MIN_ARITY: usize = 3;

type Body<'f> = dyn FnMut(&[Sequence]) -> Result<Sequence> + 'f;

/// A function item passed as an argument, e.g. `user:unrar-entry-filter#3`.
///
/// The declared arity is what the unrar function inspects; the body receives
/// the positional arguments as sequences.
pub struct FunctionReference<'f> {
    name: String,
    arity: usize,
    body: Box<Body<'f>>,
}

impl<'f> FunctionReference<'f> {
    pub fn new(
        name: impl Into<String>,
        arity: usize,
        body: impl FnMut(&[Sequence]) -> Result<Sequence> + 'f,
    ) -> Self {
        Self {
            name: name.into(),
            arity,
            body: Box::new(body),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn call(&mut self, args: &[Sequence]) -> Result<Sequence> {
        (self.body)(args)
    }
}

impl fmt::Debug for FunctionReference<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.arity)
    }
}

/// How entry content reaches the store, decided once from the store
/// function's arity.
#[derive(Debug)]
pub enum StoreStrategy<'f> {
    /// `(name, kind, params) -> path`: the unrar function writes the entry.
    PathReturning(FunctionReference<'f>),
    /// `(name, kind, data, params) -> item()*`: the function handles the data.
    DataReceiving(FunctionReference<'f>),
}

impl<'f> StoreStrategy<'f> {
    pub fn from_function(function: FunctionReference<'f>) -> Result<Self> {
        match function.arity() {
            arity if arity < MIN_ARITY => Err(Error::InvalidArity {
                parameter: "entry-data",
                arity,
                required: MIN_ARITY,
            }),
            MIN_ARITY => Ok(Self::PathReturning(function)),
            _ => Ok(Self::DataReceiving(function)),
        }
    }
}
