use super::*;

fn lex_all(source: &[u8], mode: LexMode) -> Vec<(TokenId, Vec<u8>)> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next(mode).expect("lex should succeed");
        if token.id == TokenId::Eof {
            break;
        }
        tokens.push((token.id, token.slice(source).to_vec()));
    }
    tokens
}

#[test]
fn whitespace_delimited_reads_whole_runs() {
    let tokens = lex_all(b"IDB_BITMAP BITMAP \"img.bmp\"", LexMode::WhitespaceDelimiterOnly);
    let expected = vec![
        (TokenId::Literal, b"IDB_BITMAP".to_vec()),
        (TokenId::Literal, b"BITMAP".to_vec()),
        (TokenId::Literal, b"\"img.bmp\"".to_vec()),
    ];
    assert_eq!(tokens, expected);
}

#[test]
fn normal_mode_token_kinds() {
    let tokens = lex_all(b"1 RCDATA { 1, \"2\", L\"3\" }", LexMode::Normal);
    let kinds: Vec<TokenId> = tokens.iter().map(|(id, _)| *id).collect();
    assert_eq!(
        kinds,
        vec![
            TokenId::Number,
            TokenId::Literal,
            TokenId::OpenBrace,
            TokenId::Number,
            TokenId::Comma,
            TokenId::QuotedAsciiString,
            TokenId::Comma,
            TokenId::QuotedWideString,
            TokenId::CloseBrace,
        ]
    );
}

#[test]
fn begin_end_are_brace_synonyms() {
    let tokens = lex_all(b"BEGIN end", LexMode::Normal);
    assert_eq!(tokens[0].0, TokenId::OpenBrace);
    assert_eq!(tokens[1].0, TokenId::CloseBrace);
}

#[test]
fn unary_minus_is_part_of_the_number() {
    // The parser alternates modes while reading an expression: operand
    // positions use Normal, operator positions use NormalExpectOperator.
    let source = b"1+-1";
    let mut lexer = Lexer::new(source);
    let one = lexer.next(LexMode::Normal).unwrap();
    let plus = lexer.next(LexMode::NormalExpectOperator).unwrap();
    let minus_one = lexer.next(LexMode::Normal).unwrap();
    assert_eq!((one.id, one.slice(source)), (TokenId::Number, &b"1"[..]));
    assert_eq!((plus.id, plus.slice(source)), (TokenId::Operator, &b"+"[..]));
    assert_eq!(
        (minus_one.id, minus_one.slice(source)),
        (TokenId::Number, &b"-1"[..])
    );
}

#[test]
fn expect_operator_mode_makes_minus_binary() {
    let source = b"- 5";
    let mut lexer = Lexer::new(source);
    let token = lexer.next(LexMode::NormalExpectOperator).unwrap();
    assert_eq!(token.id, TokenId::Operator);
}

#[test]
fn unary_plus_is_rejected() {
    let mut lexer = Lexer::new(b"+5");
    let err = lexer.next(LexMode::Normal).unwrap_err();
    assert_eq!(err.kind, LexErrorKind::UnaryPlus);
}

#[test]
fn decimal_exponent_is_rejected() {
    let mut lexer = Lexer::new(b"1e2");
    let err = lexer.next(LexMode::Normal).unwrap_err();
    assert_eq!(err.kind, LexErrorKind::NumberExponent);

    // Hex digits named e are fine, and so is a trailing e.
    let tokens = lex_all(b"0x1e2", LexMode::Normal);
    assert_eq!(tokens[0].1, b"0x1e2".to_vec());
}

#[test]
fn semicolon_comment_does_not_fuse_tokens() {
    let tokens = lex_all(b"RC;DATA comment\ndata", LexMode::WhitespaceDelimiterOnly);
    assert_eq!(
        tokens,
        vec![
            (TokenId::Literal, b"RC".to_vec()),
            (TokenId::Literal, b"data".to_vec()),
        ]
    );
}

#[test]
fn substitute_byte_terminates_input() {
    let tokens = lex_all(b"ONE \x1A TWO", LexMode::WhitespaceDelimiterOnly);
    assert_eq!(tokens, vec![(TokenId::Literal, b"ONE".to_vec())]);
}

#[test]
fn doubled_quote_stays_inside_string() {
    let tokens = lex_all(b"\"a\"\"b\"", LexMode::Normal);
    assert_eq!(tokens, vec![(TokenId::QuotedAsciiString, b"\"a\"\"b\"".to_vec())]);
}

#[test]
fn unterminated_string_is_an_error() {
    let mut lexer = Lexer::new(b"\"abc");
    let err = lexer.next(LexMode::Normal).unwrap_err();
    assert_eq!(err.kind, LexErrorKind::UnterminatedString);
}

#[test]
fn pragma_lines_produce_no_tokens() {
    let tokens = lex_all(b"#pragma code_page(65001)\n1 RCDATA", LexMode::Normal);
    assert_eq!(tokens[0].0, TokenId::Number);
    assert_eq!(tokens[1].0, TokenId::Literal);
}

#[test]
fn snapshot_rewind_is_cheap() {
    let source = b"FIRST SECOND";
    let mut lexer = Lexer::new(source);
    let snapshot = lexer.clone();
    let first = lexer.next(LexMode::WhitespaceDelimiterOnly).unwrap();
    assert_eq!(first.slice(source), b"FIRST");
    let mut rewound = snapshot;
    let again = rewound.next(LexMode::WhitespaceDelimiterOnly).unwrap();
    assert_eq!(again.slice(source), b"FIRST");
}

#[test]
fn token_lines_are_recorded() {
    let source = b"A\nB\n\nC";
    let mut lexer = Lexer::new(source);
    let a = lexer.next(LexMode::Normal).unwrap();
    let b = lexer.next(LexMode::Normal).unwrap();
    let c = lexer.next(LexMode::Normal).unwrap();
    assert_eq!((a.line, b.line, c.line), (1, 2, 4));
}
