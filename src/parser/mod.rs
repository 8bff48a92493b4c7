//! Recursive-descent parser.
//!
//! The grammar is resource-type-sensitive: a statement's shape is unknown
//! until its type keyword has been read, so ids and types are consumed in
//! whitespace-delimited lex mode and everything after dispatches on the
//! classified [`ResourceKind`]. The parser owns the lexer and picks a
//! [`LexMode`] per token; lookahead is a lexer snapshot.
//!
//! There is no mid-statement recovery: the first hard error aborts the
//! parse. Compatibility warnings go to the shared [`Diagnostics`] list and
//! never block.

mod cursor;
mod parse_error;
#[cfg(test)]
mod parser_tests;

use crate::ast::*;
use crate::code_page::CodePageLookup;
use crate::diagnostics::{Diagnostics, Reason};
use crate::lexer::{LexMode, Lexer, Token, TokenId};
use crate::literals::maybe_ordinal_from_text;
use crate::resources::{MemoryFlags, ResourceKind};
use cursor::Cursor;
pub use parse_error::{ParseError, ParseErrorKind, Result};

pub const MAX_MENU_NESTING: u32 = 512;
pub const MAX_VERSION_NESTING: u32 = 512;
pub const MAX_EXPRESSION_NESTING: u32 = 200;
pub const MAX_DIALOG_CONTROLS: u32 = 65_535;

struct Parser<'a, 'd> {
    cursor: Cursor<'a>,
    code_pages: &'d CodePageLookup,
    diagnostics: &'d mut Diagnostics,
    paren_depth: u32,
}

pub fn parse(
    source: &[u8],
    code_pages: &CodePageLookup,
    diagnostics: &mut Diagnostics,
) -> Result<Root> {
    let mut p = Parser {
        cursor: Cursor::new(Lexer::new(source)),
        code_pages,
        diagnostics,
        paren_depth: 0,
    };
    let mut body = Vec::new();

    loop {
        let first = p.cursor.next(LexMode::WhitespaceDelimiterOnly)?;
        if first.id == TokenId::Eof {
            break;
        }
        let source = p.cursor.source();
        let statement = if first.is_keyword(source, "LANGUAGE") {
            Statement::Language(parse_language(&mut p, first)?)
        } else if first.is_keyword(source, "VERSION") {
            Statement::Version(parse_simple_statement(&mut p, first)?)
        } else if first.is_keyword(source, "CHARACTERISTICS") {
            Statement::Characteristics(parse_simple_statement(&mut p, first)?)
        } else if first.is_keyword(source, "STRINGTABLE") {
            Statement::StringTable(parse_string_table(&mut p, first)?)
        } else {
            let type_token = p.cursor.next(LexMode::WhitespaceDelimiterOnly)?;
            if type_token.id == TokenId::Eof {
                // The reference compiler tolerates a dangling identifier at
                // the very end of the input.
                body.push(Statement::Invalid(Invalid {
                    tokens: vec![first],
                }));
                break;
            }
            parse_resource(&mut p, first, type_token)?
        };
        body.push(statement);
    }

    Ok(Root { body })
}

fn lossy(p: &Parser, token: Token) -> String {
    String::from_utf8_lossy(token.slice(p.cursor.source())).into_owned()
}

fn expect(p: &mut Parser, id: TokenId, expected: &'static str) -> Result<Token> {
    let token = p.cursor.next(LexMode::Normal)?;
    if token.id == id {
        Ok(token)
    } else {
        Err(ParseErrorKind::ExpectedButGot {
            expected,
            found: lossy(p, token),
        }
        .at(token.span()))
    }
}

fn expect_comma(p: &mut Parser) -> Result<()> {
    expect(p, TokenId::Comma, "','").map(|_| ())
}

fn bump_if_comma(p: &mut Parser) -> Result<bool> {
    Ok(p
        .cursor
        .next_if(LexMode::Normal, |t, _| t.id == TokenId::Comma)?
        .is_some())
}

fn expect_string(p: &mut Parser, expected: &'static str) -> Result<Token> {
    let token = p.cursor.next(LexMode::Normal)?;
    if token.is_string() {
        Ok(token)
    } else {
        Err(ParseErrorKind::ExpectedButGot {
            expected,
            found: lossy(p, token),
        }
        .at(token.span()))
    }
}

// ---------------------------------------------------------------------------
// Expressions

fn can_start_expression(p: &Parser, token: Token) -> bool {
    match token.id {
        TokenId::Number | TokenId::OpenParen => true,
        TokenId::Literal => token.is_keyword(p.cursor.source(), "NOT"),
        _ => false,
    }
}

fn parse_expression(p: &mut Parser, allow_not: bool) -> Result<Expression> {
    let mut left = parse_primary(p, allow_not)?;
    loop {
        let peek = p.cursor.peek(LexMode::NormalExpectOperator)?;
        if peek.id != TokenId::Operator {
            break;
        }
        let operator = p.cursor.next(LexMode::NormalExpectOperator)?;
        let right = parse_primary(p, allow_not)?;
        left = Expression::Binary(BinaryExpression {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        });
    }
    Ok(left)
}

fn parse_primary(p: &mut Parser, allow_not: bool) -> Result<Expression> {
    let token = p.cursor.next(LexMode::Normal)?;
    match token.id {
        TokenId::Number | TokenId::QuotedAsciiString | TokenId::QuotedWideString => {
            Ok(Expression::Literal(token))
        }
        TokenId::OpenParen => {
            p.paren_depth += 1;
            if p.paren_depth > MAX_EXPRESSION_NESTING {
                p.diagnostics
                    .note(Reason::NoteInnermostExpression, token.span());
                return Err(
                    ParseErrorKind::ExpressionNestingTooDeep(MAX_EXPRESSION_NESTING)
                        .at(token.span()),
                );
            }
            let expression = parse_expression(p, allow_not)?;
            let close = p.cursor.next(LexMode::NormalExpectOperator)?;
            if close.id != TokenId::CloseParen {
                return Err(ParseErrorKind::ExpectedButGot {
                    expected: "')'",
                    found: lossy(p, close),
                }
                .at(close.span()));
            }
            p.paren_depth -= 1;
            Ok(Expression::Grouped(GroupedExpression {
                open: token,
                expression: Box::new(expression),
                close,
            }))
        }
        TokenId::CloseParen => {
            p.diagnostics
                .note(Reason::NoteStrayCloseParen, token.span());
            Err(ParseErrorKind::StrayCloseParen.at(token.span()))
        }
        TokenId::Literal if allow_not && token.is_keyword(p.cursor.source(), "NOT") => {
            let number = p.cursor.next(LexMode::Normal)?;
            if number.id != TokenId::Number {
                return Err(ParseErrorKind::ExpectedButGot {
                    expected: "number after NOT",
                    found: lossy(p, number),
                }
                .at(number.span()));
            }
            Ok(Expression::Not(NotExpression {
                keyword: token,
                number,
            }))
        }
        TokenId::Literal => Ok(Expression::Literal(token)),
        TokenId::Eof => Err(ParseErrorKind::UnexpectedEof.at(token.span())),
        _ => Err(ParseErrorKind::UnexpectedToken(lossy(p, token)).at(token.span())),
    }
}

// ---------------------------------------------------------------------------
// Keyword-led statements

fn parse_language(p: &mut Parser, keyword: Token) -> Result<Language> {
    let primary = parse_expression(p, false)?;
    expect_comma(p)?;
    let sublanguage = parse_expression(p, false)?;
    Ok(Language {
        keyword,
        primary,
        sublanguage,
    })
}

fn parse_simple_statement(p: &mut Parser, keyword: Token) -> Result<SimpleStatement> {
    let value = parse_expression(p, false)?;
    Ok(SimpleStatement { keyword, value })
}

fn parse_optionals(p: &mut Parser) -> Result<Optionals> {
    let mut optionals = Optionals::default();
    loop {
        let peek = p.cursor.peek(LexMode::Normal)?;
        if peek.id != TokenId::Literal {
            break;
        }
        let source = p.cursor.source();
        if peek.is_keyword(source, "LANGUAGE") {
            let keyword = p.cursor.next(LexMode::Normal)?;
            optionals.language = Some(parse_language(p, keyword)?);
        } else if peek.is_keyword(source, "VERSION") {
            p.cursor.next(LexMode::Normal)?;
            optionals.version = Some(parse_expression(p, false)?);
        } else if peek.is_keyword(source, "CHARACTERISTICS") {
            p.cursor.next(LexMode::Normal)?;
            optionals.characteristics = Some(parse_expression(p, false)?);
        } else {
            break;
        }
    }
    Ok(optionals)
}

fn parse_string_table(p: &mut Parser, keyword: Token) -> Result<StringTable> {
    let memory_flags = parse_memory_flags(p, ResourceKind::StringTable)?;
    let optionals = parse_optionals(p)?;
    expect(p, TokenId::OpenBrace, "'{' or BEGIN")?;
    let mut strings = Vec::new();
    loop {
        let peek = p.cursor.peek(LexMode::Normal)?;
        match peek.id {
            TokenId::CloseBrace => {
                p.cursor.next(LexMode::Normal)?;
                break;
            }
            TokenId::Eof => return Err(ParseErrorKind::UnterminatedBlock.at(peek.span())),
            _ => {
                let id = parse_expression(p, false)?;
                bump_if_comma(p)?;
                let text = expect_string(p, "string literal")?;
                strings.push(StringTableEntry { id, text });
            }
        }
    }
    Ok(StringTable {
        keyword,
        memory_flags,
        optionals,
        strings,
    })
}

// ---------------------------------------------------------------------------
// Resource statements

fn parse_memory_flags(p: &mut Parser, kind: ResourceKind) -> Result<MemoryFlags> {
    let mut flags = MemoryFlags::defaults(kind.predefined_ordinal());
    while let Some(token) = p.cursor.next_if(LexMode::Normal, |t, s| {
        t.id == TokenId::Literal && MemoryFlags::is_memory_attribute(t.slice(s))
    })? {
        flags.apply(token.slice(p.cursor.source()));
    }
    Ok(flags)
}

fn parse_resource(p: &mut Parser, id: Token, type_token: Token) -> Result<Statement> {
    let source = p.cursor.source();
    let input = p.code_pages.input(type_token.line);
    let kind = ResourceKind::from_type_text(type_token.slice(source), input)
        .map_err(|error| ParseErrorKind::Type(error).at(type_token.span()))?;

    if kind == ResourceKind::StringTable {
        return Err(ParseErrorKind::ExpectedButGot {
            expected: "resource type",
            found: lossy(p, type_token),
        }
        .at(type_token.span()));
    }
    if kind.requires_ordinal_id() {
        let id_input = p.code_pages.input(id.line);
        if maybe_ordinal_from_text(id.slice(source), id_input).is_none() {
            return Err(ParseErrorKind::IdMustBeOrdinal {
                type_name: lossy(p, type_token).to_ascii_uppercase(),
            }
            .at(id.span()));
        }
    }

    let memory_flags = parse_memory_flags(p, kind)?;
    let head = ResourceHead {
        id,
        type_token,
        kind,
        memory_flags,
    };

    match kind {
        ResourceKind::Dialog => parse_dialog(p, head, false).map(Statement::Dialog),
        ResourceKind::DialogEx => parse_dialog(p, head, true).map(Statement::Dialog),
        ResourceKind::Menu => parse_menu(p, head, false).map(Statement::Menu),
        ResourceKind::MenuEx => parse_menu(p, head, true).map(Statement::Menu),
        ResourceKind::Accelerators => parse_accelerators(p, head).map(Statement::Accelerators),
        ResourceKind::Toolbar => parse_toolbar(p, head).map(Statement::Toolbar),
        ResourceKind::VersionInfo => parse_version_info(p, head).map(Statement::VersionInfo),
        ResourceKind::DlgInclude => {
            let filename = parse_filename(p)?;
            Ok(Statement::ResourceExternal(ResourceExternal {
                head,
                filename,
            }))
        }
        _ => parse_generic_body(p, head),
    }
}

fn parse_filename(p: &mut Parser) -> Result<Expression> {
    let peek = p.cursor.peek(LexMode::Normal)?;
    match peek.id {
        TokenId::QuotedAsciiString | TokenId::QuotedWideString | TokenId::Literal => {
            p.cursor.next(LexMode::Normal)?;
            Ok(Expression::Literal(peek))
        }
        TokenId::Eof => Err(ParseErrorKind::UnexpectedEof.at(peek.span())),
        // A number expression; it reduces to its source text later.
        _ => parse_expression(p, false),
    }
}

fn parse_generic_body(p: &mut Parser, head: ResourceHead) -> Result<Statement> {
    let peek = p.cursor.peek(LexMode::Normal)?;
    if peek.id != TokenId::OpenBrace {
        let filename = parse_filename(p)?;
        return Ok(Statement::ResourceExternal(ResourceExternal {
            head,
            filename,
        }));
    }
    if !head.kind.allows_raw_data() {
        return Err(ParseErrorKind::RawDataNotAllowed {
            type_name: lossy(p, head.type_token).to_ascii_uppercase(),
        }
        .at(peek.span()));
    }
    p.cursor.next(LexMode::Normal)?;
    let raw_data = parse_raw_data(p)?;
    Ok(Statement::ResourceRawData(ResourceRawData {
        head,
        raw_data,
    }))
}

/// Parses raw-data items up to the closing brace. Commas between items are
/// optional.
fn parse_raw_data(p: &mut Parser) -> Result<Vec<Expression>> {
    let mut raw_data = Vec::new();
    loop {
        let peek = p.cursor.peek(LexMode::Normal)?;
        match peek.id {
            TokenId::CloseBrace => {
                p.cursor.next(LexMode::Normal)?;
                return Ok(raw_data);
            }
            TokenId::Eof => return Err(ParseErrorKind::UnterminatedBlock.at(peek.span())),
            _ => {
                raw_data.push(parse_expression(p, false)?);
                bump_if_comma(p)?;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Accelerators

const ACCELERATOR_MODIFIERS: [&str; 6] =
    ["VIRTKEY", "ASCII", "SHIFT", "CONTROL", "ALT", "NOINVERT"];

fn parse_accelerators(p: &mut Parser, head: ResourceHead) -> Result<Accelerators> {
    let optionals = parse_optionals(p)?;
    expect(p, TokenId::OpenBrace, "'{' or BEGIN")?;
    let mut entries = Vec::new();
    loop {
        let peek = p.cursor.peek(LexMode::Normal)?;
        match peek.id {
            TokenId::CloseBrace => {
                p.cursor.next(LexMode::Normal)?;
                break;
            }
            TokenId::Eof => return Err(ParseErrorKind::UnterminatedBlock.at(peek.span())),
            _ => {
                let event = parse_expression(p, false)?;
                expect_comma(p)?;
                let id = parse_expression(p, false)?;
                let mut modifiers = Vec::new();
                while bump_if_comma(p)? {
                    let token = p.cursor.next(LexMode::Normal)?;
                    let known = token.id == TokenId::Literal
                        && ACCELERATOR_MODIFIERS
                            .iter()
                            .any(|m| token.is_keyword(p.cursor.source(), m));
                    if !known {
                        return Err(ParseErrorKind::ExpectedButGot {
                            expected: "accelerator type or option",
                            found: lossy(p, token),
                        }
                        .at(token.span()));
                    }
                    modifiers.push(token);
                }
                entries.push(AcceleratorEntry {
                    event,
                    id,
                    modifiers,
                });
            }
        }
    }
    Ok(Accelerators {
        head,
        optionals,
        entries,
    })
}

// ---------------------------------------------------------------------------
// Dialogs

fn parse_dialog(p: &mut Parser, head: ResourceHead, ex: bool) -> Result<Dialog> {
    let x = parse_expression(p, false)?;
    expect_comma(p)?;
    let y = parse_expression(p, false)?;
    expect_comma(p)?;
    let width = parse_expression(p, false)?;
    expect_comma(p)?;
    let height = parse_expression(p, false)?;

    let mut help_id = None;
    if ex && bump_if_comma(p)? {
        let peek = p.cursor.peek(LexMode::Normal)?;
        if can_start_expression(p, peek) {
            help_id = Some(parse_expression(p, false)?);
        }
    }

    let mut dialog = Dialog {
        head,
        ex,
        x,
        y,
        width,
        height,
        help_id,
        caption: None,
        style: None,
        exstyle: None,
        class: None,
        menu: None,
        font: None,
        optionals: Optionals::default(),
        controls: Vec::new(),
    };

    // Optional statements; the last duplicate wins.
    let mut forced_ordinal = false;
    loop {
        let peek = p.cursor.peek(LexMode::Normal)?;
        if peek.id != TokenId::Literal {
            break;
        }
        let source = p.cursor.source();
        if peek.is_keyword(source, "CAPTION") {
            p.cursor.next(LexMode::Normal)?;
            dialog.caption = Some(expect_string(p, "string literal")?);
        } else if peek.is_keyword(source, "STYLE") {
            p.cursor.next(LexMode::Normal)?;
            dialog.style = Some(parse_expression(p, true)?);
        } else if peek.is_keyword(source, "EXSTYLE") {
            p.cursor.next(LexMode::Normal)?;
            dialog.exstyle = Some(parse_expression(p, true)?);
        } else if peek.is_keyword(source, "CLASS") {
            p.cursor.next(LexMode::Normal)?;
            dialog.class = Some(parse_name_value(p, ex, &mut forced_ordinal)?);
        } else if peek.is_keyword(source, "MENU") {
            p.cursor.next(LexMode::Normal)?;
            dialog.menu = Some(parse_name_value(p, ex, &mut forced_ordinal)?);
        } else if peek.is_keyword(source, "FONT") {
            p.cursor.next(LexMode::Normal)?;
            dialog.font = Some(parse_font(p, ex)?);
        } else if peek.is_keyword(source, "LANGUAGE") {
            let keyword = p.cursor.next(LexMode::Normal)?;
            dialog.optionals.language = Some(parse_language(p, keyword)?);
        } else if peek.is_keyword(source, "VERSION") {
            p.cursor.next(LexMode::Normal)?;
            dialog.optionals.version = Some(parse_expression(p, false)?);
        } else if peek.is_keyword(source, "CHARACTERISTICS") {
            p.cursor.next(LexMode::Normal)?;
            dialog.optionals.characteristics = Some(parse_expression(p, false)?);
        } else {
            break;
        }
    }

    expect(p, TokenId::OpenBrace, "'{' or BEGIN")?;
    loop {
        let peek = p.cursor.peek(LexMode::Normal)?;
        match peek.id {
            TokenId::CloseBrace => {
                p.cursor.next(LexMode::Normal)?;
                break;
            }
            TokenId::Eof => return Err(ParseErrorKind::UnterminatedBlock.at(peek.span())),
            _ => {
                if dialog.controls.len() as u32 >= MAX_DIALOG_CONTROLS {
                    return Err(ParseErrorKind::TooManyDialogControls(MAX_DIALOG_CONTROLS)
                        .at(peek.span()));
                }
                let control = parse_control(p, ex)?;
                dialog.controls.push(control);
            }
        }
    }
    Ok(dialog)
}

/// Parses a `CLASS`/`MENU` value with an id-style scan. When the unquoted
/// value starts with a digit it becomes an ordinal via the wrapping
/// subtract-`'0'` algorithm, and once that happens every later `CLASS` or
/// `MENU` in the same dialog is an ordinal too.
fn parse_name_value(p: &mut Parser, ex: bool, forced_ordinal: &mut bool) -> Result<NameValue> {
    // Quoted values lex normally (they may contain spaces); everything
    // else is an id-style whitespace-delimited scan.
    let peek = p.cursor.peek(LexMode::Normal)?;
    if peek.is_string() {
        p.cursor.next(LexMode::Normal)?;
        return Ok(NameValue {
            token: peek,
            ordinal: None,
        });
    }
    let token = p.cursor.next(LexMode::WhitespaceDelimiterOnly)?;
    if token.id == TokenId::Eof {
        return Err(ParseErrorKind::UnexpectedEof.at(token.span()));
    }
    let slice = token.slice(p.cursor.source());
    let mut ordinal = None;
    if ex {
        let input = p.code_pages.input(token.line);
        let starts_with_digit = input
            .decode(slice)
            .is_some_and(|d| (0x30..=0x39).contains(&d.codepoint));
        if *forced_ordinal || starts_with_digit {
            ordinal = Some(crate::literals::forced_ordinal_from_text(slice, input));
            *forced_ordinal = true;
        }
    }
    Ok(NameValue { token, ordinal })
}

fn parse_font(p: &mut Parser, ex: bool) -> Result<FontStatement> {
    let point_size = parse_expression(p, false)?;
    expect_comma(p)?;
    let typeface = expect_string(p, "font name string")?;
    let mut font = FontStatement {
        point_size,
        typeface,
        weight: None,
        italic: None,
        charset: None,
    };
    if ex {
        let slots: [&mut Option<Expression>; 3] =
            [&mut font.weight, &mut font.italic, &mut font.charset];
        for slot in slots {
            if !bump_if_comma(p)? {
                break;
            }
            *slot = Some(parse_expression(p, false)?);
        }
    }
    Ok(font)
}

fn control_kind(source: &[u8], token: Token) -> Option<ControlKind> {
    const KINDS: [(&str, ControlKind); 20] = [
        ("AUTO3STATE", ControlKind::Auto3State),
        ("AUTOCHECKBOX", ControlKind::AutoCheckBox),
        ("AUTORADIOBUTTON", ControlKind::AutoRadioButton),
        ("CHECKBOX", ControlKind::CheckBox),
        ("COMBOBOX", ControlKind::ComboBox),
        ("CONTROL", ControlKind::Control),
        ("CTEXT", ControlKind::CText),
        ("DEFPUSHBUTTON", ControlKind::DefPushButton),
        ("EDITTEXT", ControlKind::EditText),
        ("GROUPBOX", ControlKind::GroupBox),
        ("ICON", ControlKind::Icon),
        ("LISTBOX", ControlKind::ListBox),
        ("LTEXT", ControlKind::LText),
        ("PUSHBOX", ControlKind::PushBox),
        ("PUSHBUTTON", ControlKind::PushButton),
        ("RADIOBUTTON", ControlKind::RadioButton),
        ("RTEXT", ControlKind::RText),
        ("SCROLLBAR", ControlKind::ScrollBar),
        ("STATE3", ControlKind::State3),
        ("USERBUTTON", ControlKind::UserButton),
    ];
    KINDS
        .iter()
        .find(|(keyword, _)| token.is_keyword(source, keyword))
        .map(|(_, kind)| *kind)
}

impl ControlKind {
    /// Whether the statement carries a text param before the id.
    pub fn has_text(self) -> bool {
        !matches!(
            self,
            Self::ComboBox | Self::EditText | Self::ListBox | Self::ScrollBar
        )
    }
}

fn parse_control(p: &mut Parser, ex: bool) -> Result<Control> {
    let keyword = p.cursor.next(LexMode::Normal)?;
    let Some(kind) = control_kind(p.cursor.source(), keyword) else {
        return Err(ParseErrorKind::ExpectedButGot {
            expected: "control statement",
            found: lossy(p, keyword),
        }
        .at(keyword.span()));
    };

    let mut text = None;
    if kind.has_text() {
        let token = p.cursor.next(LexMode::Normal)?;
        if !(token.is_string() || token.id == TokenId::Number) {
            return Err(ParseErrorKind::ExpectedButGot {
                expected: "control text",
                found: lossy(p, token),
            }
            .at(token.span()));
        }
        text = Some(token);
        expect_comma(p)?;
    }

    let id = parse_expression(p, false)?;
    expect_comma(p)?;

    let mut class = None;
    let mut style = None;
    if kind == ControlKind::Control {
        let token = p.cursor.next(LexMode::Normal)?;
        if !(token.is_string() || token.id == TokenId::Literal || token.id == TokenId::Number) {
            return Err(ParseErrorKind::ExpectedButGot {
                expected: "control class",
                found: lossy(p, token),
            }
            .at(token.span()));
        }
        class = Some(token);
        expect_comma(p)?;
        style = Some(parse_expression(p, true)?);
        expect_comma(p)?;
    }

    let x = parse_expression(p, false)?;
    expect_comma(p)?;
    let y = parse_expression(p, false)?;
    expect_comma(p)?;
    let width = parse_expression(p, false)?;
    expect_comma(p)?;
    let height = parse_expression(p, false)?;

    if kind != ControlKind::Control {
        style = parse_optional_param(p, true)?;
    }
    let exstyle = parse_optional_param(p, true)?;
    let help_id = if ex {
        parse_optional_param(p, false)?
    } else {
        None
    };

    let mut creation_data = Vec::new();
    if ex {
        let peek = p.cursor.peek(LexMode::Normal)?;
        if peek.id == TokenId::OpenBrace {
            p.cursor.next(LexMode::Normal)?;
            creation_data = parse_raw_data(p)?;
        }
    }

    Ok(Control {
        keyword,
        kind,
        text,
        id,
        x,
        y,
        width,
        height,
        style,
        exstyle,
        help_id,
        class,
        creation_data,
    })
}

/// Parses a trailing optional param. The param normally requires a leading
/// comma; when an expression follows with no comma the reference compiler
/// would miscompile the control, so we warn and parse it anyway.
fn parse_optional_param(p: &mut Parser, allow_not: bool) -> Result<Option<Expression>> {
    if bump_if_comma(p)? {
        let peek = p.cursor.peek(LexMode::Normal)?;
        if !can_start_expression(p, peek) {
            return Ok(None);
        }
        return parse_expression(p, allow_not).map(Some);
    }
    let peek = p.cursor.peek(LexMode::Normal)?;
    if can_start_expression(p, peek) {
        p.diagnostics
            .warn(Reason::ControlStyleParamsMiscompile, peek.span());
        p.diagnostics
            .note(Reason::NoteAddCommaAfterStyle, peek.span());
        return parse_expression(p, allow_not).map(Some);
    }
    Ok(None)
}

// ---------------------------------------------------------------------------
// Menus

const MENU_OPTIONS: [&str; 6] = [
    "CHECKED",
    "GRAYED",
    "HELP",
    "INACTIVE",
    "MENUBARBREAK",
    "MENUBREAK",
];

fn parse_menu(p: &mut Parser, head: ResourceHead, ex: bool) -> Result<Menu> {
    let optionals = parse_optionals(p)?;
    let mut help_id = None;
    if ex {
        let peek = p.cursor.peek(LexMode::Normal)?;
        if can_start_expression(p, peek) {
            help_id = Some(parse_expression(p, false)?);
        }
    }
    let open = expect(p, TokenId::OpenBrace, "'{' or BEGIN")?;
    let items = parse_menu_items(p, ex, 1)?;
    if items.is_empty() {
        return Err(ParseErrorKind::EmptyMenu.at(open.span()));
    }
    Ok(Menu {
        head,
        ex,
        optionals,
        help_id,
        items,
    })
}

fn parse_menu_items(p: &mut Parser, ex: bool, depth: u32) -> Result<Vec<MenuItem>> {
    let mut items = Vec::new();
    loop {
        let token = p.cursor.next(LexMode::Normal)?;
        match token.id {
            TokenId::CloseBrace => return Ok(items),
            TokenId::Eof => return Err(ParseErrorKind::UnterminatedBlock.at(token.span())),
            TokenId::Literal if token.is_keyword(p.cursor.source(), "MENUITEM") => {
                items.push(parse_menu_item(p, token, ex)?);
            }
            TokenId::Literal if token.is_keyword(p.cursor.source(), "POPUP") => {
                if depth > MAX_MENU_NESTING {
                    p.diagnostics
                        .note(Reason::NoteInnermostExpression, token.span());
                    return Err(
                        ParseErrorKind::MenuNestingTooDeep(MAX_MENU_NESTING).at(token.span())
                    );
                }
                items.push(parse_popup(p, token, ex, depth)?);
            }
            _ => {
                return Err(ParseErrorKind::ExpectedButGot {
                    expected: "MENUITEM or POPUP",
                    found: lossy(p, token),
                }
                .at(token.span()))
            }
        }
    }
}

fn parse_menu_item(p: &mut Parser, keyword: Token, ex: bool) -> Result<MenuItem> {
    let token = p.cursor.next(LexMode::Normal)?;
    if token.is_keyword(p.cursor.source(), "SEPARATOR") {
        return Ok(MenuItem::Separator { keyword });
    }
    if !token.is_string() {
        return Err(ParseErrorKind::ExpectedButGot {
            expected: "menu item text or SEPARATOR",
            found: lossy(p, token),
        }
        .at(token.span()));
    }

    if ex {
        let mut id = None;
        let mut item_type = None;
        let mut state = None;
        for slot in [&mut id, &mut item_type, &mut state] {
            if !bump_if_comma(p)? {
                break;
            }
            *slot = Some(parse_expression(p, true)?);
        }
        return Ok(MenuItem::ItemEx {
            keyword,
            text: token,
            id,
            item_type,
            state,
        });
    }

    expect_comma(p)?;
    let id = parse_expression(p, false)?;
    let options = parse_menu_options(p)?;
    Ok(MenuItem::Item {
        keyword,
        text: token,
        id,
        options,
    })
}

fn parse_menu_options(p: &mut Parser) -> Result<Vec<Token>> {
    let mut options = Vec::new();
    loop {
        let mut lookahead = p.cursor.clone();
        if lookahead.next(LexMode::Normal)?.id != TokenId::Comma {
            break;
        }
        let token = lookahead.next(LexMode::Normal)?;
        let known = token.id == TokenId::Literal
            && MENU_OPTIONS
                .iter()
                .any(|o| token.is_keyword(p.cursor.source(), o));
        if !known {
            break;
        }
        p.cursor = lookahead;
        options.push(token);
    }
    Ok(options)
}

fn parse_popup(p: &mut Parser, keyword: Token, ex: bool, depth: u32) -> Result<MenuItem> {
    let text = expect_string(p, "popup text")?;

    if ex {
        let mut id = None;
        let mut item_type = None;
        let mut state = None;
        let mut help_id = None;
        for slot in [&mut id, &mut item_type, &mut state, &mut help_id] {
            if !bump_if_comma(p)? {
                break;
            }
            *slot = Some(parse_expression(p, true)?);
        }
        let open = expect(p, TokenId::OpenBrace, "'{' or BEGIN")?;
        let items = parse_menu_items(p, ex, depth + 1)?;
        if items.is_empty() {
            return Err(ParseErrorKind::EmptyMenu.at(open.span()));
        }
        return Ok(MenuItem::PopupEx {
            keyword,
            text,
            id,
            item_type,
            state,
            help_id,
            items,
        });
    }

    let options = parse_menu_options(p)?;
    let open = expect(p, TokenId::OpenBrace, "'{' or BEGIN")?;
    let items = parse_menu_items(p, ex, depth + 1)?;
    if items.is_empty() {
        return Err(ParseErrorKind::EmptyMenu.at(open.span()));
    }
    Ok(MenuItem::Popup {
        keyword,
        text,
        options,
        items,
    })
}

// ---------------------------------------------------------------------------
// Toolbars

fn parse_toolbar(p: &mut Parser, head: ResourceHead) -> Result<Toolbar> {
    let button_width = parse_expression(p, false)?;
    expect_comma(p)?;
    let button_height = parse_expression(p, false)?;
    let optionals = parse_optionals(p)?;
    expect(p, TokenId::OpenBrace, "'{' or BEGIN")?;
    let mut buttons = Vec::new();
    loop {
        let token = p.cursor.next(LexMode::Normal)?;
        match token.id {
            TokenId::CloseBrace => break,
            TokenId::Eof => return Err(ParseErrorKind::UnterminatedBlock.at(token.span())),
            TokenId::Literal if token.is_keyword(p.cursor.source(), "BUTTON") => {
                let id = parse_expression(p, false)?;
                buttons.push(ToolbarButton::Button { keyword: token, id });
            }
            TokenId::Literal if token.is_keyword(p.cursor.source(), "SEPARATOR") => {
                buttons.push(ToolbarButton::Separator { keyword: token });
            }
            _ => {
                return Err(ParseErrorKind::ExpectedButGot {
                    expected: "BUTTON or SEPARATOR",
                    found: lossy(p, token),
                }
                .at(token.span()))
            }
        }
    }
    Ok(Toolbar {
        head,
        button_width,
        button_height,
        optionals,
        buttons,
    })
}

// ---------------------------------------------------------------------------
// Version info

fn parse_version_info(p: &mut Parser, head: ResourceHead) -> Result<VersionInfo> {
    let mut fixed = Vec::new();
    let mut optionals = Optionals::default();
    loop {
        let peek = p.cursor.peek(LexMode::Normal)?;
        if peek.id != TokenId::Literal {
            break;
        }
        let source = p.cursor.source();
        let fixed_kind = version_fixed_kind(source, peek);
        if let Some(kind) = fixed_kind {
            let keyword = p.cursor.next(LexMode::Normal)?;
            let mut parts = vec![parse_expression(p, false)?];
            while parts.len() < 4 && bump_if_comma(p)? {
                parts.push(parse_expression(p, false)?);
            }
            fixed.push(VersionFixed {
                keyword,
                kind,
                parts,
            });
        } else if peek.is_keyword(source, "LANGUAGE") {
            let keyword = p.cursor.next(LexMode::Normal)?;
            optionals.language = Some(parse_language(p, keyword)?);
        } else if peek.is_keyword(source, "VERSION") {
            p.cursor.next(LexMode::Normal)?;
            optionals.version = Some(parse_expression(p, false)?);
        } else if peek.is_keyword(source, "CHARACTERISTICS") {
            p.cursor.next(LexMode::Normal)?;
            optionals.characteristics = Some(parse_expression(p, false)?);
        } else {
            break;
        }
    }

    expect(p, TokenId::OpenBrace, "'{' or BEGIN")?;
    let blocks = parse_version_nodes(p, 1)?;
    Ok(VersionInfo {
        head,
        fixed,
        optionals,
        blocks,
    })
}

fn version_fixed_kind(source: &[u8], token: Token) -> Option<VersionFixedKind> {
    const KINDS: [(&str, VersionFixedKind); 7] = [
        ("FILEVERSION", VersionFixedKind::FileVersion),
        ("PRODUCTVERSION", VersionFixedKind::ProductVersion),
        ("FILEFLAGSMASK", VersionFixedKind::FileFlagsMask),
        ("FILEFLAGS", VersionFixedKind::FileFlags),
        ("FILEOS", VersionFixedKind::FileOs),
        ("FILETYPE", VersionFixedKind::FileType),
        ("FILESUBTYPE", VersionFixedKind::FileSubtype),
    ];
    KINDS
        .iter()
        .find(|(keyword, _)| token.is_keyword(source, keyword))
        .map(|(_, kind)| *kind)
}

fn parse_version_nodes(p: &mut Parser, depth: u32) -> Result<Vec<VersionNode>> {
    let mut nodes = Vec::new();
    loop {
        let token = p.cursor.next(LexMode::Normal)?;
        match token.id {
            TokenId::CloseBrace => return Ok(nodes),
            TokenId::Eof => return Err(ParseErrorKind::UnterminatedBlock.at(token.span())),
            TokenId::Literal if token.is_keyword(p.cursor.source(), "BLOCK") => {
                if depth > MAX_VERSION_NESTING {
                    p.diagnostics
                        .note(Reason::NoteInnermostExpression, token.span());
                    return Err(ParseErrorKind::VersionNestingTooDeep(MAX_VERSION_NESTING)
                        .at(token.span()));
                }
                let key = expect_string(p, "block key string")?;
                expect(p, TokenId::OpenBrace, "'{' or BEGIN")?;
                let children = parse_version_nodes(p, depth + 1)?;
                nodes.push(VersionNode::Block {
                    keyword: token,
                    key,
                    children,
                });
            }
            TokenId::Literal if token.is_keyword(p.cursor.source(), "VALUE") => {
                let key = expect_string(p, "value key string")?;
                let values = parse_version_values(p)?;
                nodes.push(VersionNode::Value {
                    keyword: token,
                    key,
                    values,
                });
            }
            _ => {
                return Err(ParseErrorKind::ExpectedButGot {
                    expected: "BLOCK or VALUE",
                    found: lossy(p, token),
                }
                .at(token.span()))
            }
        }
    }
}

fn parse_version_values(p: &mut Parser) -> Result<Vec<VersionValue>> {
    let mut values = Vec::new();
    loop {
        let preceded_by_comma = bump_if_comma(p)?;
        let peek = p.cursor.peek(LexMode::Normal)?;
        let is_value = peek.is_string() || can_start_expression(p, peek);
        if !is_value {
            break;
        }
        let expression = if peek.is_string() {
            p.cursor.next(LexMode::Normal)?;
            Expression::Literal(peek)
        } else {
            parse_expression(p, false)?
        };
        values.push(VersionValue {
            expression,
            preceded_by_comma,
        });
    }
    Ok(values)
}
