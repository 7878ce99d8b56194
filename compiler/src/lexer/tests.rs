use super::*;

fn kinds(src: &str) -> Vec<TokenKind> {
    Lexer::new(src)
        .tokenize()
        .expect("lexing should succeed")
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

#[test]
fn tokenizes_keywords() {
    let k = kinds("def end decl ref nil nil? not and or");
    assert_eq!(
        k,
        vec![
            TokenKind::Def,
            TokenKind::End,
            TokenKind::Decl,
            TokenKind::Ref,
            TokenKind::Nil,
            TokenKind::NilQuestion,
            TokenKind::Not,
            TokenKind::And,
            TokenKind::Or,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn nil_question_is_not_split_into_nil_and_question() {
    let k = kinds("nil?(x)");
    assert_eq!(k[0], TokenKind::NilQuestion);
}

#[test]
fn identifiers_allow_embedded_question_marks() {
    let k = kinds("is_empty?");
    assert_eq!(k[0], TokenKind::Identifier("is_empty?".to_string()));
}

#[test]
fn tokenizes_integer_literal() {
    let k = kinds("12345");
    assert_eq!(k[0], TokenKind::IntLiteral(12345));
}

#[test]
fn integer_literal_overflow_is_lex_error() {
    let mut lexer = Lexer::new("99999999999999999999999");
    let err = lexer.tokenize().unwrap_err();
    assert_eq!(err.kind(), LexErrorKind::IntegerOverflow);
}

#[test]
fn char_literal_with_escape() {
    let k = kinds(r"'\n'");
    assert_eq!(k[0], TokenKind::CharLiteral(b'\n'));
}

#[test]
fn char_literal_plain() {
    let k = kinds("'a'");
    assert_eq!(k[0], TokenKind::CharLiteral(b'a'));
}

#[test]
fn char_literal_hex_escape() {
    let k = kinds(r"'\x41'");
    assert_eq!(k[0], TokenKind::CharLiteral(b'A'));
}

#[test]
fn unterminated_char_literal_is_error() {
    let mut lexer = Lexer::new("'a");
    let err = lexer.tokenize().unwrap_err();
    assert_eq!(err.kind(), LexErrorKind::UnterminatedCharLiteral);
}

#[test]
fn overlong_char_literal_is_error() {
    let mut lexer = Lexer::new("'ab'");
    let err = lexer.tokenize().unwrap_err();
    assert_eq!(err.kind(), LexErrorKind::OverlongCharLiteral);
}

#[test]
fn string_literal_with_escapes() {
    let k = kinds(r#""hi\n\t\"there\"""#);
    assert_eq!(
        k[0],
        TokenKind::StringLiteral(b"hi\n\t\"there\"".to_vec())
    );
}

#[test]
fn unterminated_string_is_error() {
    let mut lexer = Lexer::new("\"abc");
    let err = lexer.tokenize().unwrap_err();
    assert_eq!(err.kind(), LexErrorKind::UnterminatedString);
}

#[test]
fn invalid_escape_is_error() {
    let mut lexer = Lexer::new(r#""\q""#);
    let err = lexer.tokenize().unwrap_err();
    assert_eq!(err.kind(), LexErrorKind::InvalidEscape);
}

#[test]
fn single_line_comment_is_discarded() {
    let k = kinds("int x % this is a comment\n:= 1");
    assert_eq!(k[0], TokenKind::Int);
    assert_eq!(k[1], TokenKind::Identifier("x".to_string()));
    assert_eq!(k[2], TokenKind::Assign);
}

#[test]
fn nested_block_comments_are_skipped() {
    let k = kinds("int <* outer <* inner *> still outer *> x");
    assert_eq!(k[0], TokenKind::Int);
    assert_eq!(k[1], TokenKind::Identifier("x".to_string()));
}

#[test]
fn unterminated_block_comment_is_error() {
    let mut lexer = Lexer::new("int <* never closed");
    let err = lexer.tokenize().unwrap_err();
    assert_eq!(err.kind(), LexErrorKind::UnterminatedBlockComment);
}

#[test]
fn operators_and_punctuation() {
    let k = kinds("+ - * / = <> < > <= >= # ( ) [ ] , ; : :=");
    assert_eq!(
        k,
        vec![
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::Equal,
            TokenKind::NotEqual,
            TokenKind::Less,
            TokenKind::Greater,
            TokenKind::LessEqual,
            TokenKind::GreaterEqual,
            TokenKind::Hash,
            TokenKind::LParen,
            TokenKind::RParen,
            TokenKind::LBracket,
            TokenKind::RBracket,
            TokenKind::Comma,
            TokenKind::Semicolon,
            TokenKind::Colon,
            TokenKind::Assign,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn illegal_character_is_error() {
    let mut lexer = Lexer::new("int $");
    let err = lexer.tokenize().unwrap_err();
    assert_eq!(err.kind(), LexErrorKind::IllegalCharacter);
}

#[test]
fn line_and_column_tracking() {
    let tokens = Lexer::new("int\nchar").tokenize().unwrap();
    assert_eq!(tokens[0].span.line, 1);
    assert_eq!(tokens[1].span.line, 2);
    assert_eq!(tokens[1].span.column, 1);
}

#[test]
fn empty_input_yields_only_eof() {
    let k = kinds("");
    assert_eq!(k, vec![TokenKind::Eof]);
}
