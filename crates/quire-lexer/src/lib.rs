use logos::{Lexer, Logos};
use unicode_normalization::UnicodeNormalization;

#[derive(Default, Clone, Copy)]
pub struct LexerExtras {
    /// True when the previous token can end a value. Decides whether a
    /// `-` is subtraction or a unary minus, and whether a quote opens
    /// a quantity literal.
    pub last_was_value: bool,
}

#[derive(Logos, Debug, PartialEq, Eq, Clone, Copy)]
#[logos(skip r"[ \t\n\r]+")]
#[logos(extras = LexerExtras)]
pub enum Token {
    // Keywords
    #[token("if", |lex| { lex.extras.last_was_value = false; })]
    If,
    #[token("else", |lex| { lex.extras.last_was_value = false; })]
    Else,
    #[token("otherwise", |lex| { lex.extras.last_was_value = false; })]
    Otherwise,
    #[token("while", |lex| { lex.extras.last_was_value = false; })]
    While,
    #[token("for", |lex| { lex.extras.last_was_value = false; })]
    For,
    #[token("in", |lex| { lex.extras.last_was_value = false; })]
    In,
    #[token("break")]
    Break,
    #[token("return", |lex| { lex.extras.last_was_value = false; })]
    Return,
    #[token("echo", |lex| { lex.extras.last_was_value = false; })]
    Echo,
    #[token("raise", |lex| { lex.extras.last_was_value = false; })]
    Raise,
    #[token("end")]
    End,
    #[token("function", |lex| { lex.extras.last_was_value = false; })]
    Function,
    #[token("and", |lex| { lex.extras.last_was_value = false; })]
    #[token("\u{2227}", |lex| { lex.extras.last_was_value = false; })]
    And,
    #[token("or", |lex| { lex.extras.last_was_value = false; })]
    #[token("\u{2228}", |lex| { lex.extras.last_was_value = false; })]
    Or,
    #[token("not", |lex| { lex.extras.last_was_value = false; })]
    #[token("\u{00ac}", |lex| { lex.extras.last_was_value = false; })]
    Not,
    #[token("mod", |lex| { lex.extras.last_was_value = false; })]
    Mod,
    #[token("true", |lex| { lex.extras.last_was_value = true; })]
    True,
    #[token("false", |lex| { lex.extras.last_was_value = true; })]
    False,

    // Literals
    #[regex(r"0[xX][0-9a-fA-F]+", |lex| { lex.extras.last_was_value = true; }, priority = 4)]
    #[regex(r"[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?%?", |lex| { lex.extras.last_was_value = true; })]
    Num,
    // Inline table literal: ``…`` (matched before rich text)
    #[token("``", table_literal, priority = 6)]
    TableLit,
    // Rich-text literal: `…`
    #[token("`", rich_text_literal, priority = 3)]
    RichText,
    // String literal: "…"
    #[token("\"", string_literal)]
    Str,
    // Unit / quantity literal: '…'
    #[token("'", unit_literal)]
    UnitLit,
    // Control word: backslash-prefixed name, looked up against the
    // fixed accent/unary/binary/relation/color tables
    #[regex(r"\\[a-zA-Z]+", |lex| { lex.extras.last_was_value = false; })]
    ControlWord,
    // Superscript-digit run (exponent sugar)
    #[regex(r"[\u{2070}\u{00b9}\u{00b2}\u{00b3}\u{2074}-\u{2079}\u{207b}]+",
            |lex| { lex.extras.last_was_value = true; })]
    Superscript,
    // Identifiers, including multi-codepoint letters and trailing
    // combining diacritics (folded into accent notation on render)
    #[regex(r"[\p{L}_][\p{L}\p{M}\p{Nd}_\u{2032}]*", |lex| { lex.extras.last_was_value = true; })]
    Ident,

    // Operators. `-` splits on whether the previous token permits a
    // unary operator in this position: the payload is true for binary
    // subtraction, false for a unary minus.
    #[token("-", minus_filter)]
    Minus(bool),
    #[token("+", |lex| { lex.extras.last_was_value = false; })]
    Plus,
    #[token("*", |lex| { lex.extras.last_was_value = false; })]
    #[token("\u{00d7}", |lex| { lex.extras.last_was_value = false; })]
    Times,
    #[token("\u{00b7}", |lex| { lex.extras.last_was_value = false; })]
    Cdot,
    #[token("/", |lex| { lex.extras.last_was_value = false; })]
    #[token("\u{00f7}", |lex| { lex.extras.last_was_value = false; })]
    Slash,
    #[token("^", |lex| { lex.extras.last_was_value = false; })]
    Caret,
    #[token("\u{221a}", |lex| { lex.extras.last_was_value = false; })]
    Sqrt,
    #[token("!", |lex| { lex.extras.last_was_value = true; })]
    Bang,
    #[token("%", |lex| { lex.extras.last_was_value = true; })]
    Percent,
    #[token("&", |lex| { lex.extras.last_was_value = false; })]
    Amp,
    #[token("<=", |lex| { lex.extras.last_was_value = false; })]
    #[token("\u{2264}", |lex| { lex.extras.last_was_value = false; })]
    LessEqual,
    #[token(">=", |lex| { lex.extras.last_was_value = false; })]
    #[token("\u{2265}", |lex| { lex.extras.last_was_value = false; })]
    GreaterEqual,
    #[token("==", |lex| { lex.extras.last_was_value = false; })]
    EqualEqual,
    #[token("!=", |lex| { lex.extras.last_was_value = false; })]
    #[token("\u{2260}", |lex| { lex.extras.last_was_value = false; })]
    NotEqual,
    #[token("<", |lex| { lex.extras.last_was_value = false; })]
    Less,
    #[token(">", |lex| { lex.extras.last_was_value = false; })]
    Greater,
    #[token("=", |lex| { lex.extras.last_was_value = false; })]
    Equal,
    #[token("..", |lex| { lex.extras.last_was_value = false; })]
    #[token("\u{2026}", |lex| { lex.extras.last_was_value = false; })]
    Range,
    #[token(":", |lex| { lex.extras.last_was_value = false; })]
    Colon,
    #[token(",", |lex| { lex.extras.last_was_value = false; })]
    Comma,
    #[token(";", |lex| { lex.extras.last_was_value = false; })]
    Semicolon,
    #[token("(", |lex| { lex.extras.last_was_value = false; })]
    LParen,
    #[token(")", |lex| { lex.extras.last_was_value = true; })]
    RParen,
    #[token("[", |lex| { lex.extras.last_was_value = false; })]
    LBracket,
    #[token("]", |lex| { lex.extras.last_was_value = true; })]
    RBracket,
    #[token("{", |lex| { lex.extras.last_was_value = false; })]
    LBrace,
    #[token("}", |lex| { lex.extras.last_was_value = true; })]
    RBrace,
    #[token("|", |lex| { lex.extras.last_was_value = false; })]
    Pipe,
    #[token("_", |lex| { lex.extras.last_was_value = false; }, priority = 3)]
    Underscore,

    Error,
}

fn minus_filter(lex: &mut Lexer<Token>) -> bool {
    let binary = lex.extras.last_was_value;
    lex.extras.last_was_value = false;
    binary
}

/// Consume up to (and including) the closing delimiter. Unterminated
/// literals swallow the rest of the input; the parser reports them.
fn scan_to(lex: &mut Lexer<Token>, close: &str) {
    let rest = lex.remainder();
    match rest.find(close) {
        Some(idx) => lex.bump(idx + close.len()),
        None => lex.bump(rest.len()),
    }
    lex.extras.last_was_value = true;
}

fn string_literal(lex: &mut Lexer<Token>) {
    scan_to(lex, "\"");
}

fn rich_text_literal(lex: &mut Lexer<Token>) {
    scan_to(lex, "`");
}

fn table_literal(lex: &mut Lexer<Token>) {
    scan_to(lex, "``");
}

fn unit_literal(lex: &mut Lexer<Token>) {
    scan_to(lex, "'");
}

/// Fixed control-word tables: accents, unary/binary operator words,
/// relations, and colors, each mapping to its render form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlWordKind {
    Accent,
    Unary,
    Binary,
    Relation,
    Color,
}

pub const CONTROL_WORDS: &[(&str, &str, ControlWordKind)] = &[
    ("hat", "\u{0302}", ControlWordKind::Accent),
    ("bar", "\u{0304}", ControlWordKind::Accent),
    ("vec", "\u{20d7}", ControlWordKind::Accent),
    ("dot", "\u{0307}", ControlWordKind::Accent),
    ("ddot", "\u{0308}", ControlWordKind::Accent),
    ("tilde", "\u{0303}", ControlWordKind::Accent),
    ("sqrt", "\u{221a}", ControlWordKind::Unary),
    ("neg", "\u{00ac}", ControlWordKind::Unary),
    ("cdot", "\u{00b7}", ControlWordKind::Binary),
    ("times", "\u{00d7}", ControlWordKind::Binary),
    ("div", "\u{00f7}", ControlWordKind::Binary),
    ("pm", "\u{00b1}", ControlWordKind::Binary),
    ("le", "\u{2264}", ControlWordKind::Relation),
    ("ge", "\u{2265}", ControlWordKind::Relation),
    ("ne", "\u{2260}", ControlWordKind::Relation),
    ("in", "\u{2208}", ControlWordKind::Relation),
    ("approx", "\u{2248}", ControlWordKind::Relation),
    ("red", "red", ControlWordKind::Color),
    ("blue", "blue", ControlWordKind::Color),
    ("green", "green", ControlWordKind::Color),
];

pub fn control_word(name: &str) -> Option<(&'static str, ControlWordKind)> {
    CONTROL_WORDS
        .iter()
        .find(|(w, _, _)| *w == name)
        .map(|(_, render, kind)| (*render, *kind))
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub lexeme: String,
    /// Form used when building the display target.
    pub render: String,
    /// Closing delimiter auto-inserted for open brackets.
    pub closing: Option<&'static str>,
    pub start: usize,
    pub end: usize,
    /// Whitespace (or start of input) immediately before this token;
    /// the parser uses it when deciding implicit multiplication.
    pub spaced_before: bool,
}

fn closing_delimiter(token: Token) -> Option<&'static str> {
    match token {
        Token::LParen => Some(")"),
        Token::LBracket => Some("]"),
        Token::LBrace => Some("}"),
        Token::Pipe => Some("|"),
        _ => None,
    }
}

/// Render form of a token: control words fold to their symbol,
/// identifiers get decomposed diacritics folded into accent notation,
/// everything else renders as written.
fn render_of(token: Token, lexeme: &str) -> String {
    match token {
        Token::ControlWord => {
            let name = &lexeme[1..];
            match control_word(name) {
                Some((render, _)) => render.to_string(),
                None => lexeme.to_string(),
            }
        }
        Token::Ident => lexeme.nfc().collect(),
        Token::Times => "\u{00d7}".to_string(),
        Token::Cdot => "\u{00b7}".to_string(),
        Token::Slash if lexeme == "\u{00f7}" => "\u{00f7}".to_string(),
        Token::LessEqual => "\u{2264}".to_string(),
        Token::GreaterEqual => "\u{2265}".to_string(),
        Token::NotEqual => "\u{2260}".to_string(),
        Token::Range => "\u{2026}".to_string(),
        _ => lexeme.to_string(),
    }
}

fn spanned(token: Token, lexeme: &str, start: usize, end: usize, spaced: bool) -> SpannedToken {
    SpannedToken {
        token,
        lexeme: lexeme.to_string(),
        render: render_of(token, lexeme),
        closing: closing_delimiter(token),
        start,
        end,
        spaced_before: spaced,
    }
}

/// Return the next token of `input`, with `prev_was_value` carrying
/// the one bit of cross-token state (whether the previous token can
/// end a value). This is the incremental entry point for hosts that
/// lex a token at a time.
pub fn lex(input: &str, prev_was_value: bool) -> Option<SpannedToken> {
    let mut lexer = Token::lexer(input);
    lexer.extras.last_was_value = prev_was_value;
    let result = lexer.next()?;
    let span = lexer.span();
    let token = result.unwrap_or(Token::Error);
    Some(spanned(token, lexer.slice(), span.start, span.end, span.start > 0))
}

pub fn tokenize(input: &str) -> Vec<Token> {
    tokenize_detailed(input)
        .into_iter()
        .map(|t| t.token)
        .collect()
}

pub fn tokenize_detailed(input: &str) -> Vec<SpannedToken> {
    let mut lexer = Token::lexer(input);
    let mut out: Vec<SpannedToken> = Vec::new();
    let mut prev_end = 0usize;
    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let token = result.unwrap_or(Token::Error);
        let spaced = span.start > prev_end || span.start == 0;
        out.push(spanned(token, lexer.slice(), span.start, span.end, spaced));
        prev_end = span.end;
    }
    out
}
