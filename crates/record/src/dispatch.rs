//! String-keyed accessor dispatch for boundary code that only has a property
//! name, such as a form handler mapping submitted fields onto a record.
//!
//! `get<Name>()` and `is<Name>()` read, `set<Name>(value)` writes; all three
//! resolve `<Name>` against the entity's schema descriptor and then run the
//! typed accessor.

use rowkeep_core::ColumnValue;
use rowkeep_storage::QueryExecutor;

use crate::entity::Entity;
use crate::error::RecordError;
use crate::property::Property;
use crate::record::{Record, WriteOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorKind {
    Get,
    Is,
    Set,
}

impl AccessorKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Is => "is",
            Self::Set => "set",
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            Self::Get | Self::Is => 0,
            Self::Set => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accessor<'a> {
    pub kind: AccessorKind,
    pub name: &'a str,
}

impl<'a> Accessor<'a> {
    pub fn parse(operation: &'a str) -> Result<Self, RecordError> {
        for kind in [AccessorKind::Get, AccessorKind::Is, AccessorKind::Set] {
            if let Some(name) = operation.strip_prefix(kind.prefix()) {
                return Ok(Self { kind, name });
            }
        }
        Err(RecordError::InvalidAccessor(format!(
            "{operation} is not a get/is/set accessor"
        )))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    Value(ColumnValue),
    Flag(bool),
    Write(WriteOutcome),
}

impl<E: Entity> Record<E> {
    /// Resolve and run `operation` (e.g. `"getNick"`, `"setColor"`).
    ///
    /// Unknown names fail with `UnknownProperty` whatever the argument
    /// count; a known name with the wrong argument count fails with
    /// `InvalidAccessor`.
    pub fn dispatch(
        &mut self,
        storage: &mut dyn QueryExecutor,
        operation: &str,
        args: &[ColumnValue],
    ) -> Result<Dispatched, RecordError> {
        let accessor = Accessor::parse(operation)?;
        let property = <E::Property as Property>::from_name(accessor.name).ok_or_else(|| {
            RecordError::UnknownProperty {
                name: accessor.name.to_string(),
            }
        })?;
        if args.len() != accessor.kind.arity() {
            return Err(RecordError::InvalidAccessor(format!(
                "{operation} takes {} argument(s), got {}",
                accessor.kind.arity(),
                args.len()
            )));
        }

        match accessor.kind {
            AccessorKind::Get => Ok(Dispatched::Value(self.get(&*storage, property)?)),
            AccessorKind::Is => Ok(Dispatched::Flag(self.is(&*storage, property)?)),
            AccessorKind::Set => Ok(Dispatched::Write(self.set(
                storage,
                property,
                args[0].clone(),
            )?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prefixes() {
        assert_eq!(
            Accessor::parse("getNick").unwrap(),
            Accessor {
                kind: AccessorKind::Get,
                name: "Nick"
            }
        );
        assert_eq!(Accessor::parse("isNsfw").unwrap().kind, AccessorKind::Is);
        assert_eq!(Accessor::parse("setColor").unwrap().name, "Color");
        assert_eq!(Accessor::parse("get").unwrap().name, "");
    }

    #[test]
    fn rejects_other_prefixes() {
        for operation in ["fetchNick", "Nick", "", "GetNick", "delete"] {
            assert!(
                matches!(
                    Accessor::parse(operation),
                    Err(RecordError::InvalidAccessor(_))
                ),
                "{operation:?} should not parse"
            );
        }
    }
}
