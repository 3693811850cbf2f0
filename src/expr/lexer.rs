use crate::error::ParseError;
use logos::Logos;

/// A token with its kind and source slice.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub text: &'src str,
}

/// All token types of the expression fragment language.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum TokenKind {
    // Delimiters
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("?")]
    Question,
    #[token(":")]
    Colon,

    // Operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    LessEq,
    #[token(">=")]
    GreaterEq,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("!")]
    Bang,

    // Keyword literals
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,

    // Literals and names
    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Number,
    #[regex(r"'([^'\\]|\\.)*'")]
    SingleQuoteString,
    #[regex(r#""([^"\\]|\\.)*""#)]
    DoubleQuoteString,
    #[regex(r"\$[A-Za-z_][A-Za-z0-9_]*")]
    DollarIdent,
    #[token("$")]
    Dollar,
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,
}

impl TokenKind {
    /// Human-readable token description for error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Comma => "','",
            TokenKind::Dot => "'.'",
            TokenKind::Question => "'?'",
            TokenKind::Colon => "':'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::EqEq => "'=='",
            TokenKind::NotEq => "'!='",
            TokenKind::LessEq => "'<='",
            TokenKind::GreaterEq => "'>='",
            TokenKind::Less => "'<'",
            TokenKind::Greater => "'>'",
            TokenKind::AndAnd => "'&&'",
            TokenKind::OrOr => "'||'",
            TokenKind::Bang => "'!'",
            TokenKind::True | TokenKind::False => "a boolean literal",
            TokenKind::Null => "'null'",
            TokenKind::Number => "a number",
            TokenKind::SingleQuoteString | TokenKind::DoubleQuoteString => "a string",
            TokenKind::DollarIdent | TokenKind::Dollar => "a binding name",
            TokenKind::Ident => "an identifier",
        }
    }
}

/// Tokenizes an expression fragment, failing on the first unrecognized input.
pub fn tokenize(source: &str) -> Result<Vec<Token<'_>>, ParseError> {
    let mut lexer = TokenKind::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        match result {
            Ok(kind) => tokens.push(Token {
                kind,
                text: lexer.slice(),
            }),
            Err(()) => return Err(ParseError::InvalidToken(lexer.slice().to_string())),
        }
    }

    Ok(tokens)
}
