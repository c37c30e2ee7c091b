//! Name resolution.
//!
//! A [`Resolver`] is one resolution session: it turns names into
//! [`TypeDeclaration`]s, memoizing each by canonical name. A name requested
//! again while its own resolution is still in progress is a circular
//! declaration; this is the only cycle guard.

use std::collections::HashMap;
use std::sync::Arc;

use flatbind_foundation::{
    Error, ErrorContext, Field, Malformation, ParamMode, Parameter, Primitive, Result,
    TypeDeclaration,
};
use tracing::debug;

use crate::source::{
    DeclarationSource, Definition, FUNCTION, INDEX_BY_TABLE, Member, NESTED_TABLE, PROCEDURE,
    RECORD, VARRAY, canonical_name,
};

/// Per-name resolution state. Absence from the map means never requested.
#[derive(Debug)]
enum Slot {
    InProgress,
    Done(Arc<TypeDeclaration>),
}

/// One resolution session over a declaration source.
///
/// Sessions own their memo table, so independent sessions never interfere.
pub struct Resolver<'s, S: DeclarationSource + ?Sized> {
    source: &'s S,
    slots: HashMap<String, Slot>,
    stack: Vec<String>,
}

impl<'s, S: DeclarationSource + ?Sized> Resolver<'s, S> {
    /// Creates a session reading from `source`.
    #[must_use]
    pub fn new(source: &'s S) -> Self {
        Self {
            source,
            slots: HashMap::new(),
            stack: Vec::new(),
        }
    }

    /// Returns the number of names fully resolved so far.
    #[must_use]
    pub fn resolved_count(&self) -> usize {
        self.slots
            .values()
            .filter(|slot| matches!(slot, Slot::Done(_)))
            .count()
    }

    /// Resolves `name`, recursively resolving everything it refers to.
    ///
    /// # Errors
    ///
    /// Fails on undeclared names, unknown constructs, circular declarations,
    /// malformed entries, invalid index keys, and source document errors.
    /// The error context lists the chain of declarations being resolved.
    pub fn ensure_declaration(&mut self, name: &str) -> Result<Arc<TypeDeclaration>> {
        let name = canonical_name(name);
        match self.slots.get(&name) {
            Some(Slot::Done(decl)) => return Ok(Arc::clone(decl)),
            Some(Slot::InProgress) => return Err(Error::circular(name)),
            None => {}
        }

        self.slots.insert(name.clone(), Slot::InProgress);
        self.stack.push(name.clone());
        let built = self.build(&name).map_err(|err| self.attach_stack(err));
        self.stack.pop();
        if built.is_err() {
            self.slots.remove(&name);
        }

        let decl = Arc::new(built?);
        debug!(name = decl.name(), kind = decl.kind_name(), "resolved declaration");
        self.slots.insert(name, Slot::Done(Arc::clone(&decl)));
        Ok(decl)
    }

    fn attach_stack(&self, err: Error) -> Error {
        if err.context.is_some() {
            return err;
        }
        let context = self
            .stack
            .iter()
            .fold(ErrorContext::new(), |ctx, frame| ctx.with_frame(frame.clone()));
        err.with_context(context)
    }

    fn build(&mut self, name: &str) -> Result<TypeDeclaration> {
        if let Some(primitive) = Primitive::recognize(name) {
            return Ok(TypeDeclaration::primitive(primitive));
        }

        let definition = self
            .source
            .definition(name)?
            .ok_or_else(|| Error::undeclared_type(name))?;

        match definition.normalized_kind().as_str() {
            RECORD => self.build_record(name, &definition),
            VARRAY => {
                let element = self.resolve_attribute(name, definition.element.as_deref(), "element")?;
                Ok(TypeDeclaration::varray(name, element))
            }
            NESTED_TABLE => {
                let element = self.resolve_attribute(name, definition.element.as_deref(), "element")?;
                Ok(TypeDeclaration::nested_table(name, element))
            }
            INDEX_BY_TABLE => {
                let element = self.resolve_attribute(name, definition.element.as_deref(), "element")?;
                let key = required(name, definition.index.as_deref(), "index")?;
                if !Primitive::recognize(key).is_some_and(Primitive::is_index_key) {
                    return Err(Error::invalid_index_key(name, key));
                }
                let key = self.ensure_declaration(key)?;
                TypeDeclaration::index_by_table(name, element, key)
            }
            PROCEDURE => {
                let parameters = self.build_parameters(name, &definition.members)?;
                Ok(TypeDeclaration::procedure(name, parameters))
            }
            FUNCTION => {
                let returns = match definition.returns.as_deref() {
                    Some(returns) if !returns.trim().is_empty() => self.ensure_declaration(returns)?,
                    _ => return Err(Error::malformed(name, Malformation::MissingReturn)),
                };
                let parameters = self.build_parameters(name, &definition.members)?;
                Ok(TypeDeclaration::function(name, returns, parameters))
            }
            _ => Err(Error::invalid_construct(name, definition.kind.clone())),
        }
    }

    fn build_record(&mut self, name: &str, definition: &Definition) -> Result<TypeDeclaration> {
        if definition.members.is_empty() {
            return Err(Error::malformed(name, Malformation::EmptyRecord));
        }
        let mut fields = Vec::with_capacity(definition.members.len());
        for member in &definition.members {
            let field_name = required(name, member.name.as_deref(), "name")?;
            let ty = self.resolve_attribute(name, member.ty.as_deref(), "type")?;
            fields.push(Field::new(field_name, ty));
        }
        TypeDeclaration::record(name, fields)
    }

    fn build_parameters(&mut self, name: &str, members: &[Member]) -> Result<Vec<Parameter>> {
        let mut parameters = Vec::with_capacity(members.len());
        for member in members {
            let param_name = required(name, member.name.as_deref(), "name")?;
            let mode = match member.mode.as_deref() {
                None => ParamMode::In,
                Some(text) => ParamMode::parse(text).ok_or_else(|| {
                    Error::malformed(name, Malformation::UnknownMode(text.to_string()))
                })?,
            };
            let ty = self.resolve_attribute(name, member.ty.as_deref(), "type")?;
            parameters.push(Parameter::new(param_name, mode, ty));
        }
        Ok(parameters)
    }

    fn resolve_attribute(
        &mut self,
        name: &str,
        value: Option<&str>,
        attribute: &'static str,
    ) -> Result<Arc<TypeDeclaration>> {
        let reference = required(name, value, attribute)?;
        self.ensure_declaration(reference)
    }
}

fn required<'v>(name: &str, value: Option<&'v str>, attribute: &'static str) -> Result<&'v str> {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::malformed(name, Malformation::MissingAttribute(attribute))),
    }
}
