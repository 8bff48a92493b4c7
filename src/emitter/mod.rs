//! Per-resource code generation and `.res` assembly.
//!
//! [`compile`] walks the syntax tree statement by statement, keeping the
//! only cross-statement state the format needs: the ambient language,
//! version and characteristics set by top-level statements, the
//! auto-incrementing icon/cursor sub-resource id, and the string-table
//! accumulator that turns `STRINGTABLE` statements into bundle resources
//! after everything else has been written.
//!
//! Payload builders live in the per-resource submodules and return plain
//! byte vectors; large external files never pass through memory, they are
//! streamed through a small fixed buffer.

mod accelerators;
mod compile_error;
mod dialog;
mod header;
mod menu;
mod string_table;
mod version;

#[cfg(test)]
mod emitter_tests;

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::PathBuf;

use tracing::debug;

use crate::ast::*;
use crate::code_page::CodePageLookup;
use crate::diagnostics::{Diagnostics, Reason};
use crate::eval::eval;
use crate::formats::{read_icon_dir, validate_bitmap, IconDirKind};
use crate::lexer::{Token, TokenId};
use crate::literals::{parse_narrow_string, parse_wide_string, NameOrOrdinal};
use crate::options::Options;
use crate::resolver::SearchPaths;
use crate::resources::{rt, ResourceKind};

pub use compile_error::{CompileError, CompileErrorKind, Result};
pub use header::{align4, write_padding, write_sentinel, ResourceHeader};

use string_table::StringTables;

const STREAM_BUFFER_LEN: usize = 4096;

/// Memory flags of every icon/cursor sub-resource.
const SUB_RESOURCE_FLAGS: u16 = 0x1010;

pub struct Emitter<'a> {
    source: &'a [u8],
    code_pages: &'a CodePageLookup,
    options: &'a Options,
    search: &'a SearchPaths,
    diagnostics: &'a mut Diagnostics,
    /// Next free RT_ICON/RT_CURSOR sub-resource name; shared across the
    /// whole compilation.
    next_icon_id: u16,
    language: u16,
    version: u32,
    characteristics: u32,
    string_tables: StringTables,
}

pub fn compile<W: Write>(
    root: &Root,
    source: &[u8],
    code_pages: &CodePageLookup,
    options: &Options,
    search: &SearchPaths,
    diagnostics: &mut Diagnostics,
    out: &mut W,
) -> Result<()> {
    let mut e = Emitter {
        source,
        code_pages,
        options,
        search,
        diagnostics,
        next_icon_id: 1,
        language: options.default_language_id,
        version: 0,
        characteristics: 0,
        string_tables: StringTables::default(),
    };

    write_sentinel(out)?;
    for statement in &root.body {
        emit_statement(&mut e, statement, out)?;
    }
    string_table::emit_all(&mut e, out)
}

fn emit_statement<W: Write>(e: &mut Emitter, statement: &Statement, out: &mut W) -> Result<()> {
    match statement {
        Statement::Language(language) => {
            e.language = language_id(e, language)?;
            Ok(())
        }
        Statement::Version(simple) => {
            e.version = eval(&simple.value, e.source).value;
            Ok(())
        }
        Statement::Characteristics(simple) => {
            e.characteristics = eval(&simple.value, e.source).value;
            Ok(())
        }
        Statement::Invalid(_) => Ok(()),
        Statement::StringTable(table) => string_table::accumulate(e, table),
        Statement::ResourceRawData(raw) => {
            let payload = raw_data_bytes(e, &raw.raw_data)?;
            emit_payload(e, &raw.head, &Optionals::default(), &payload, out)
        }
        Statement::ResourceExternal(external) => match external.head.kind {
            ResourceKind::Icon | ResourceKind::Cursor => emit_icon_group(e, external, out),
            ResourceKind::Bitmap => emit_bitmap(e, external, out),
            ResourceKind::DlgInclude => emit_dlg_include(e, external, out),
            _ => emit_external_file(e, external, out),
        },
        Statement::Accelerators(table) => {
            let payload = accelerators::payload(e, table)?;
            emit_payload(e, &table.head, &table.optionals, &payload, out)
        }
        Statement::Dialog(dialog) => {
            let payload = dialog::payload(e, dialog)?;
            emit_payload(e, &dialog.head, &dialog.optionals, &payload, out)
        }
        Statement::Menu(menu) => {
            let payload = menu::payload(e, menu)?;
            emit_payload(e, &menu.head, &menu.optionals, &payload, out)
        }
        Statement::Toolbar(toolbar) => {
            let payload = toolbar_payload(e, toolbar);
            emit_payload(e, &toolbar.head, &toolbar.optionals, &payload, out)
        }
        Statement::VersionInfo(info) => {
            let payload = version::payload(e, info)?;
            emit_payload(e, &info.head, &info.optionals, &payload, out)
        }
    }
}

// ---------------------------------------------------------------------------
// Shared helpers

pub(crate) fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub(crate) fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub(crate) fn put_utf16z(out: &mut Vec<u8>, units: &[u16]) {
    for unit in units {
        put_u16(out, *unit);
    }
    put_u16(out, 0);
}

pub(crate) fn pad_to_4(out: &mut Vec<u8>) {
    while out.len() % 4 != 0 {
        out.push(0);
    }
}

impl Emitter<'_> {
    pub(crate) fn string_limit(&self) -> u32 {
        u32::from(self.options.max_string_literal_code_units)
    }

    /// UTF-16 code units of a quoted string token, narrow or wide.
    pub(crate) fn string_units(&self, token: Token) -> Result<Vec<u16>> {
        let input = self.code_pages.input(token.line);
        parse_wide_string(token.slice(self.source), input, self.string_limit())
            .map_err(|error| CompileErrorKind::String(error).at(token.span()))
    }

    /// On-disk bytes of a narrow string token under the active code pages.
    pub(crate) fn narrow_bytes(&self, token: Token) -> Result<Vec<u8>> {
        let pair = self.code_pages.pair_for_line(token.line);
        parse_narrow_string(
            token.slice(self.source),
            pair.input,
            pair.output,
            self.string_limit(),
        )
        .map_err(|error| CompileErrorKind::String(error).at(token.span()))
    }
}

/// Packs a `LANGUAGE` statement into the on-disk u16. The reference
/// compiler errors on `L` suffixes here; we warn and truncate.
fn language_id(e: &mut Emitter, language: &Language) -> Result<u16> {
    let primary = eval(&language.primary, e.source);
    let sublanguage = eval(&language.sublanguage, e.source);
    if primary.is_long {
        e.diagnostics.warn(
            Reason::LanguageLongSuffix,
            language.primary.first_token().span(),
        );
    }
    if sublanguage.is_long {
        e.diagnostics.warn(
            Reason::LanguageLongSuffix,
            language.sublanguage.first_token().span(),
        );
    }
    Ok((primary.as_u16() & 0x3FF) | ((sublanguage.as_u16() & 0x3F) << 10))
}

impl Emitter<'_> {
    fn effective_language(&mut self, optionals: &Optionals) -> Result<u16> {
        match &optionals.language {
            Some(language) => language_id(self, language),
            None => Ok(self.language),
        }
    }

    fn effective_version(&self, optionals: &Optionals) -> u32 {
        optionals
            .version
            .as_ref()
            .map_or(self.version, |v| eval(v, self.source).value)
    }

    fn effective_characteristics(&self, optionals: &Optionals) -> u32 {
        optionals
            .characteristics
            .as_ref()
            .map_or(self.characteristics, |v| eval(v, self.source).value)
    }

    /// Resolves the header type and name ids for a resource statement.
    fn resolve_ids(&self, head: &ResourceHead) -> (NameOrOrdinal, NameOrOrdinal) {
        let name_input = self.code_pages.input(head.id.line);
        let name_id = NameOrOrdinal::from_text(head.id.slice(self.source), name_input);
        let type_id = match head.kind.predefined_ordinal() {
            Some(ordinal) => NameOrOrdinal::Ordinal(ordinal),
            None => {
                let type_input = self.code_pages.input(head.type_token.line);
                NameOrOrdinal::from_text(head.type_token.slice(self.source), type_input)
            }
        };
        (type_id, name_id)
    }
}

fn emit_payload<W: Write>(
    e: &mut Emitter,
    head: &ResourceHead,
    optionals: &Optionals,
    payload: &[u8],
    out: &mut W,
) -> Result<()> {
    let (type_id, name_id) = e.resolve_ids(head);
    let header = ResourceHeader {
        type_id,
        name_id,
        data_size: payload.len() as u32,
        memory_flags: head.memory_flags.value,
        language: e.effective_language(optionals)?,
        version: e.effective_version(optionals),
        characteristics: e.effective_characteristics(optionals),
    };
    header.write(out)?;
    out.write_all(payload)?;
    write_padding(out, header.data_size)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Raw data

fn raw_data_bytes(e: &mut Emitter, items: &[Expression]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for expression in items {
        match expression {
            Expression::Literal(token) if token.id == TokenId::QuotedAsciiString => {
                out.extend_from_slice(&e.narrow_bytes(*token)?);
            }
            Expression::Literal(token) if token.id == TokenId::QuotedWideString => {
                for unit in e.string_units(*token)? {
                    put_u16(&mut out, unit);
                }
            }
            _ => {
                let number = eval(expression, e.source);
                if number.is_long {
                    put_u32(&mut out, number.value);
                } else {
                    put_u16(&mut out, number.as_u16());
                }
            }
        }
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// External files

/// Reduces a filename expression to the path text looked up on disk.
fn filename_string(e: &Emitter, expression: &Expression) -> Result<String> {
    if let Expression::Literal(token) = expression {
        if token.is_string() {
            let units = e.string_units(*token)?;
            return Ok(String::from_utf16_lossy(&units));
        }
    }
    // Unquoted tokens and number expressions reduce to their raw source
    // text, operator characters included, without evaluation.
    let slice = expression.source_slice(e.source);
    let input = e.code_pages.input(expression.first_token().line);
    let mut name = String::new();
    for decoded in input.decode_all(slice) {
        name.push(char::from_u32(decoded.codepoint).unwrap_or(char::REPLACEMENT_CHARACTER));
    }
    Ok(name)
}

fn open_resource_file(e: &Emitter, expression: &Expression) -> Result<(PathBuf, File, u64)> {
    let filename = filename_string(e, expression)?;
    let span = expression
        .first_token()
        .span()
        .join(expression.last_token().span());
    let path = e
        .search
        .resolve(&filename)
        .ok_or_else(|| CompileErrorKind::FileNotFound { filename }.at(span))?;
    let file = File::open(&path).map_err(|source| {
        CompileErrorKind::Io {
            path: path.clone(),
            source,
        }
        .at(span)
    })?;
    let len = file
        .metadata()
        .map_err(|source| {
            CompileErrorKind::Io {
                path: path.clone(),
                source,
            }
            .at(span)
        })?
        .len();
    debug!(path = %path.display(), len, "embedding resource file");
    Ok((path, file, len))
}

/// Copies exactly `len` bytes through a bounded buffer.
fn stream_bytes<R: Read, W: Write>(reader: &mut R, out: &mut W, len: u64) -> std::io::Result<()> {
    let mut buffer = [0u8; STREAM_BUFFER_LEN];
    let mut remaining = len;
    while remaining > 0 {
        let want = buffer.len().min(remaining as usize);
        reader.read_exact(&mut buffer[..want])?;
        out.write_all(&buffer[..want])?;
        remaining -= want as u64;
    }
    Ok(())
}

fn data_size_u32(len: u64, path: &std::path::Path, span: crate::diagnostics::Span) -> Result<u32> {
    u32::try_from(len).map_err(|_| {
        CompileErrorKind::FileTooLarge {
            path: path.to_path_buf(),
        }
        .at(span)
    })
}

fn emit_external_file<W: Write>(
    e: &mut Emitter,
    external: &ResourceExternal,
    out: &mut W,
) -> Result<()> {
    let span = external.filename.first_token().span();
    let (path, mut file, len) = open_resource_file(e, &external.filename)?;
    let data_size = data_size_u32(len, &path, span)?;

    let (type_id, name_id) = e.resolve_ids(&external.head);
    let header = ResourceHeader {
        type_id,
        name_id,
        data_size,
        memory_flags: external.head.memory_flags.value,
        language: e.language,
        version: e.version,
        characteristics: e.characteristics,
    };
    header.write(out)?;
    stream_bytes(&mut file, out, len).map_err(|source| {
        CompileErrorKind::Io { path, source }.at(span)
    })?;
    write_padding(out, data_size)?;
    Ok(())
}

fn emit_bitmap<W: Write>(e: &mut Emitter, external: &ResourceExternal, out: &mut W) -> Result<()> {
    let span = external.filename.first_token().span();
    let (path, mut file, len) = open_resource_file(e, &external.filename)?;
    let info = validate_bitmap(&mut file, len).map_err(|source| {
        CompileErrorKind::Format {
            path: path.clone(),
            source,
        }
        .at(span)
    })?;
    let data_size = data_size_u32(info.payload_len, &path, span)?;

    let (type_id, name_id) = e.resolve_ids(&external.head);
    let header = ResourceHeader {
        type_id,
        name_id,
        data_size,
        memory_flags: external.head.memory_flags.value,
        language: e.language,
        version: e.version,
        characteristics: e.characteristics,
    };
    header.write(out)?;
    file.seek(SeekFrom::Start(info.payload_offset)).map_err(|source| {
        CompileErrorKind::Io {
            path: path.clone(),
            source,
        }
        .at(span)
    })?;
    stream_bytes(&mut file, out, info.payload_len).map_err(|source| {
        CompileErrorKind::Io { path, source }.at(span)
    })?;
    write_padding(out, data_size)?;
    Ok(())
}

fn emit_dlg_include<W: Write>(
    e: &mut Emitter,
    external: &ResourceExternal,
    out: &mut W,
) -> Result<()> {
    // The payload is the include filename itself in the output code page,
    // NUL terminated; the file does not have to exist at compile time.
    let mut payload = match &external.filename {
        Expression::Literal(token) if token.is_string() => e.narrow_bytes(*token)?,
        other => other.source_slice(e.source).to_vec(),
    };
    payload.push(0);
    emit_payload(
        e,
        &external.head,
        &Optionals::default(),
        &payload,
        out,
    )
}

// ---------------------------------------------------------------------------
// Icon and cursor groups

fn emit_icon_group<W: Write>(
    e: &mut Emitter,
    external: &ResourceExternal,
    out: &mut W,
) -> Result<()> {
    let span = external.filename.first_token().span();
    let (path, mut file, len) = open_resource_file(e, &external.filename)?;
    let dir = read_icon_dir(&mut file).map_err(|source| {
        CompileErrorKind::Format {
            path: path.clone(),
            source,
        }
        .at(span)
    })?;

    let statement_kind = if external.head.kind == ResourceKind::Cursor {
        IconDirKind::Cursor
    } else {
        IconDirKind::Icon
    };
    let sub_type = match statement_kind {
        IconDirKind::Icon => rt::ICON,
        IconDirKind::Cursor => rt::CURSOR,
    };

    let mut assigned_ids = Vec::with_capacity(dir.entries.len());
    for entry in &dir.entries {
        let end = u64::from(entry.data_offset) + u64::from(entry.bytes_in_res);
        if end > len {
            return Err(CompileErrorKind::Format {
                path: path.clone(),
                source: crate::formats::FormatError::IconEntryOutOfBounds,
            }
            .at(span));
        }
        let id = e.next_icon_id;
        e.next_icon_id = e.next_icon_id.wrapping_add(1);
        assigned_ids.push(id);

        let header = ResourceHeader {
            type_id: NameOrOrdinal::Ordinal(sub_type),
            name_id: NameOrOrdinal::Ordinal(id),
            data_size: entry.bytes_in_res,
            memory_flags: SUB_RESOURCE_FLAGS,
            language: e.language,
            version: e.version,
            characteristics: e.characteristics,
        };
        header.write(out)?;
        file.seek(SeekFrom::Start(u64::from(entry.data_offset)))
            .map_err(|source| {
                CompileErrorKind::Io {
                    path: path.clone(),
                    source,
                }
                .at(span)
            })?;
        stream_bytes(&mut file, out, u64::from(entry.bytes_in_res)).map_err(|source| {
            CompileErrorKind::Io {
                path: path.clone(),
                source,
            }
            .at(span)
        })?;
        write_padding(out, entry.bytes_in_res)?;
    }

    // Directory header plus one 14-byte entry per image, where the file
    // offset field is replaced by the assigned 16-bit sub-resource id.
    let mut payload = Vec::with_capacity(6 + 14 * dir.entries.len());
    put_u16(&mut payload, 0);
    put_u16(&mut payload, statement_kind.type_value());
    put_u16(&mut payload, dir.entries.len() as u16);
    for (entry, id) in dir.entries.iter().zip(&assigned_ids) {
        payload.push(entry.width);
        payload.push(entry.height);
        payload.push(entry.color_count);
        payload.push(entry.reserved);
        put_u16(&mut payload, entry.planes);
        put_u16(&mut payload, entry.bit_count);
        put_u32(&mut payload, entry.bytes_in_res);
        put_u16(&mut payload, *id);
    }

    emit_payload(
        e,
        &external.head,
        &Optionals::default(),
        &payload,
        out,
    )
}

// ---------------------------------------------------------------------------
// Toolbars

fn toolbar_payload(e: &Emitter, toolbar: &Toolbar) -> Vec<u8> {
    let mut out = Vec::new();
    put_u16(&mut out, 1); // version
    put_u16(&mut out, eval(&toolbar.button_width, e.source).as_u16());
    put_u16(&mut out, eval(&toolbar.button_height, e.source).as_u16());
    put_u16(&mut out, toolbar.buttons.len() as u16);
    for button in &toolbar.buttons {
        match button {
            ToolbarButton::Button { id, .. } => {
                put_u16(&mut out, eval(id, e.source).as_u16());
            }
            ToolbarButton::Separator { .. } => put_u16(&mut out, 0),
        }
    }
    out
}
