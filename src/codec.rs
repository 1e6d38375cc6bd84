//! An immutable codec value.
//!
//! Registration happens on a [`CodecBuilder`]; `build` consumes it, so a
//! finished [`Codec`] can be shared freely (`&Codec` is `Sync`) and never
//! changes. Registered names are informational and have no effect on the wire.

use crate::framing;
use crate::registry::{support_list, AnyValue, Registered, TypeKind};
use crate::*;
use std::collections::BTreeMap;
use std::io::{Read, Write};

/// Collects concrete-type registrations before a [`Codec`] is built.
#[derive(Debug, Default)]
pub struct CodecBuilder {
    names: BTreeMap<TypeKind, String>,
}

impl CodecBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `name` as the alias of `T`. A later registration of the same
    /// type replaces the earlier name.
    pub fn register_concrete<T: Registered>(mut self, name: impl Into<String>) -> Self {
        self.names.insert(T::KIND, name.into());
        self
    }

    pub fn build(self) -> Codec {
        Codec { names: self.names }
    }
}

#[derive(Debug, Clone)]
pub struct Codec {
    names: BTreeMap<TypeKind, String>,
}

impl Default for Codec {
    fn default() -> Self {
        Codec::standard()
    }
}

impl Codec {
    pub fn builder() -> CodecBuilder {
        CodecBuilder::new()
    }

    /// A codec with every proof type registered under its usual alias.
    pub fn standard() -> Codec {
        Codec {
            names: TypeKind::ALL
                .into_iter()
                .map(|kind| (kind, kind.name().to_string()))
                .collect(),
        }
    }

    /// The alias `kind` was registered under, if any.
    pub fn name_of(&self, kind: TypeKind) -> Option<&str> {
        self.names.get(&kind).map(String::as_str)
    }

    pub fn registered(&self) -> impl Iterator<Item = (TypeKind, &str)> + '_ {
        self.names.iter().map(|(kind, name)| (*kind, name.as_str()))
    }

    /// Writes the supported type paths, one per line.
    pub fn print_types<W: Write + ?Sized>(&self, out: &mut W) -> Result<()> {
        for entry in support_list() {
            writeln!(out, "{}", entry)?;
        }
        Ok(())
    }

    pub fn deep_copy(&self, value: &AnyValue) -> AnyValue {
        value.deep_copy()
    }

    pub fn marshal_binary_bare<T: Registered>(&self, value: &T) -> Result<Bytes> {
        framing::marshal_binary_bare(value)
    }

    pub fn marshal_binary_length_prefixed<T: Registered>(&self, value: &T) -> Result<Bytes> {
        framing::marshal_binary_length_prefixed(value)
    }

    pub fn marshal_binary_length_prefixed_writer<W: Write + ?Sized, T: Registered>(
        &self,
        w: &mut W,
        value: &T,
    ) -> Result<usize> {
        framing::marshal_binary_length_prefixed_writer(w, value)
    }

    pub fn unmarshal_binary_bare<T: Registered>(&self, bz: &[u8]) -> Result<T> {
        framing::unmarshal_binary_bare(bz)
    }

    pub fn unmarshal_binary_length_prefixed<T: Registered>(&self, bz: &[u8]) -> Result<T> {
        framing::unmarshal_binary_length_prefixed(bz)
    }

    pub fn unmarshal_binary_length_prefixed_reader<R: Read, T: Registered>(
        &self,
        reader: &mut R,
        max_size: u64,
    ) -> Result<(T, u64)> {
        framing::unmarshal_binary_length_prefixed_reader(reader, max_size)
    }

    pub fn must_marshal_binary_bare<T: Registered>(&self, value: &T) -> Bytes {
        framing::must_marshal_binary_bare(value)
    }

    pub fn must_marshal_binary_length_prefixed<T: Registered>(&self, value: &T) -> Bytes {
        framing::must_marshal_binary_length_prefixed(value)
    }

    pub fn must_unmarshal_binary_bare<T: Registered>(&self, bz: &[u8]) -> T {
        framing::must_unmarshal_binary_bare(bz)
    }

    pub fn must_unmarshal_binary_length_prefixed<T: Registered>(&self, bz: &[u8]) -> T {
        framing::must_unmarshal_binary_length_prefixed(bz)
    }
}
