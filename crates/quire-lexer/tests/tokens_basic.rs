use quire_lexer::{lex, tokenize, tokenize_detailed, Token};

#[test]
fn numbers_and_identifiers() {
    assert_eq!(tokenize("2a"), vec![Token::Num, Token::Ident]);
    assert_eq!(
        tokenize("x1 + 2.5e-3"),
        vec![Token::Ident, Token::Plus, Token::Num]
    );
    assert_eq!(tokenize("0x1F"), vec![Token::Num]);
    assert_eq!(tokenize("50%"), vec![Token::Num]);
}

#[test]
fn minus_is_unary_when_no_value_precedes() {
    assert_eq!(tokenize("-2"), vec![Token::Minus(false), Token::Num]);
    assert_eq!(
        tokenize("3 - 2"),
        vec![Token::Num, Token::Minus(true), Token::Num]
    );
    assert_eq!(
        tokenize("(-2)"),
        vec![
            Token::LParen,
            Token::Minus(false),
            Token::Num,
            Token::RParen
        ]
    );
    assert_eq!(
        tokenize("2 \u{00d7} -3"),
        vec![Token::Num, Token::Times, Token::Minus(false), Token::Num]
    );
    // After a closing paren the minus is a subtraction.
    assert_eq!(
        tokenize("(1) - 2"),
        vec![
            Token::LParen,
            Token::Num,
            Token::RParen,
            Token::Minus(true),
            Token::Num
        ]
    );
}

#[test]
fn quoted_literals_consume_to_their_delimiter() {
    assert_eq!(tokenize("\"a + b\""), vec![Token::Str]);
    assert_eq!(tokenize("'3 m/s'"), vec![Token::UnitLit]);
    assert_eq!(tokenize("`rich text`"), vec![Token::RichText]);
    assert_eq!(tokenize("``x, y\n1, 2``"), vec![Token::TableLit]);
    let toks = tokenize_detailed("'m' + 1");
    assert_eq!(toks[0].lexeme, "'m'");
    assert_eq!(toks[0].token, Token::UnitLit);
}

#[test]
fn control_words_and_render_forms() {
    let toks = tokenize_detailed("\\cdot");
    assert_eq!(toks[0].token, Token::ControlWord);
    assert_eq!(toks[0].render, "\u{00b7}");
    let unknown = tokenize_detailed("\\mystery");
    assert_eq!(unknown[0].render, "\\mystery");
}

#[test]
fn superscripts_and_sqrt() {
    assert_eq!(tokenize("x\u{00b2}"), vec![Token::Ident, Token::Superscript]);
    assert_eq!(
        tokenize("sin\u{207b}\u{00b9}"),
        vec![Token::Ident, Token::Superscript]
    );
    assert_eq!(tokenize("\u{221a}2"), vec![Token::Sqrt, Token::Num]);
}

#[test]
fn keywords_and_operators() {
    assert_eq!(
        tokenize("x if y otherwise"),
        vec![Token::Ident, Token::If, Token::Ident, Token::Otherwise]
    );
    assert_eq!(
        tokenize("a <= b \u{2260} c"),
        vec![
            Token::Ident,
            Token::LessEqual,
            Token::Ident,
            Token::NotEqual,
            Token::Ident
        ]
    );
    assert_eq!(tokenize("1..10"), vec![Token::Num, Token::Range, Token::Num]);
}

#[test]
fn open_brackets_carry_their_closing_delimiter() {
    let toks = tokenize_detailed("(1");
    assert_eq!(toks[0].closing, Some(")"));
    let toks = tokenize_detailed("[1");
    assert_eq!(toks[0].closing, Some("]"));
}

#[test]
fn incremental_lexing_threads_the_value_state() {
    // Fresh start: unary.
    let t = lex("-4", false).unwrap();
    assert_eq!(t.token, Token::Minus(false));
    // After a value: subtraction.
    let t = lex("- 4", true).unwrap();
    assert_eq!(t.token, Token::Minus(true));
}

#[test]
fn whitespace_classification_marks_spaced_tokens() {
    let toks = tokenize_detailed("sin(x) sin (x)");
    // "sin(" with no gap, then "sin (" with a gap.
    assert!(!toks[1].spaced_before);
    let second_paren = &toks[5];
    assert_eq!(second_paren.token, Token::LParen);
    assert!(second_paren.spaced_before);
}
