//! STRINGTABLE accumulation and bundle emission.
//!
//! Strings from every `STRINGTABLE` statement are gathered into a sparse
//! table keyed by `(language, id >> 4)`. After all other resources have
//! been written, each non-empty bundle becomes one RT_STRING resource
//! named `bundle_index + 1`, holding 16 length-prefixed strings with
//! zero-length entries for the missing slots.

use std::collections::BTreeMap;
use std::io::Write;

use crate::ast::StringTable;
use crate::emitter::{
    put_u16, write_padding, CompileErrorKind, Emitter, ResourceHeader, Result,
};
use crate::eval::eval;
use crate::literals::NameOrOrdinal;
use crate::resources::rt;

pub const BUNDLE_LEN: usize = 16;

struct Bundle {
    slots: [Option<Vec<u16>>; BUNDLE_LEN],
    memory_flags: u16,
    version: u32,
    characteristics: u32,
}

#[derive(Default)]
pub struct StringTables {
    bundles: BTreeMap<(u16, u16), Bundle>,
}

pub fn accumulate(e: &mut Emitter, table: &StringTable) -> Result<()> {
    let language = e.effective_language(&table.optionals)?;
    let version = e.effective_version(&table.optionals);
    let characteristics = e.effective_characteristics(&table.optionals);

    for entry in &table.strings {
        let id = eval(&entry.id, e.source).as_u16();
        let mut units = e.string_units(entry.text)?;
        if e.options.null_terminate_string_table_strings {
            units.push(0);
        }

        let key = (language, id >> 4);
        let bundle = e
            .string_tables
            .bundles
            .entry(key)
            .or_insert_with(|| Bundle {
                slots: Default::default(),
                memory_flags: table.memory_flags.value,
                version,
                characteristics,
            });
        let slot = &mut bundle.slots[usize::from(id & 0xF)];
        if slot.is_some() {
            return Err(CompileErrorKind::DuplicateStringId { id }.at(entry.text.span()));
        }
        *slot = Some(units);
    }
    Ok(())
}

/// Emits every accumulated bundle in `(language, bundle index)` order.
pub fn emit_all<W: Write>(e: &mut Emitter, out: &mut W) -> Result<()> {
    let tables = std::mem::take(&mut e.string_tables);
    for ((language, bundle_index), bundle) in &tables.bundles {
        let mut payload = Vec::new();
        for slot in &bundle.slots {
            match slot {
                Some(units) => {
                    put_u16(&mut payload, units.len() as u16);
                    for unit in units {
                        put_u16(&mut payload, *unit);
                    }
                }
                None => put_u16(&mut payload, 0),
            }
        }
        let header = ResourceHeader {
            type_id: NameOrOrdinal::Ordinal(rt::STRING),
            name_id: NameOrOrdinal::Ordinal(bundle_index + 1),
            data_size: payload.len() as u32,
            memory_flags: bundle.memory_flags,
            language: *language,
            version: bundle.version,
            characteristics: bundle.characteristics,
        };
        header.write(out)?;
        out.write_all(&payload)?;
        write_padding(out, header.data_size)?;
    }
    Ok(())
}
