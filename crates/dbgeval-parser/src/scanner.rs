//! Scanner for evaluator snippets and synthesized source.
//!
//! `SyntaxKind` is a closed enum covering both tokens and node kinds. The
//! scanner produces one token per `scan()` call and keeps the text of the
//! last identifier/literal in `token_value`.

use serde::Serialize;

#[repr(u16)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum SyntaxKind {
    Unknown,
    EndOfFileToken,

    // Literals and names
    Identifier,
    NumericLiteral,
    StringLiteral,

    // Punctuation
    OpenBraceToken,
    CloseBraceToken,
    OpenParenToken,
    CloseParenToken,
    OpenBracketToken,
    CloseBracketToken,
    DotToken,
    SemicolonToken,
    CommaToken,
    ColonToken,
    LessThanToken,
    GreaterThanToken,
    LessThanEqualsToken,
    GreaterThanEqualsToken,
    EqualsEqualsToken,
    ExclamationEqualsToken,
    EqualsEqualsEqualsToken,
    ExclamationEqualsEqualsToken,
    PlusToken,
    MinusToken,
    AsteriskToken,
    SlashToken,
    PercentToken,
    AmpersandAmpersandToken,
    BarBarToken,
    ExclamationToken,
    EqualsToken,

    // Keywords
    LetKeyword,
    ConstKeyword,
    ReturnKeyword,
    IfKeyword,
    ElseKeyword,
    NewKeyword,
    ThisKeyword,
    SuperKeyword,
    TrueKeyword,
    FalseKeyword,
    NullKeyword,
    ClassKeyword,
    ExtendsKeyword,
    FunctionKeyword,
    ImportKeyword,
    ExportKeyword,
    FromKeyword,
    AsKeyword,
    DeclareKeyword,
    AbstractKeyword,
    StaticKeyword,
    ReadonlyKeyword,
    PrivateKeyword,
    ProtectedKeyword,
    PublicKeyword,
    ConstructorKeyword,

    // Type keywords
    VoidKeyword,
    NumberKeyword,
    IntKeyword,
    LongKeyword,
    ShortKeyword,
    ByteKeyword,
    CharKeyword,
    FloatKeyword,
    DoubleKeyword,
    BooleanKeyword,
    StringKeyword,

    // Nodes
    SourceFile,
    Block,
    VariableStatement,
    VariableDeclaration,
    ExpressionStatement,
    ReturnStatement,
    IfStatement,
    ClassDeclaration,
    PropertyDeclaration,
    MethodDeclaration,
    Constructor,
    ClassStaticBlockDeclaration,
    Parameter,
    FunctionDeclaration,
    ImportDeclaration,
    ImportSpecifier,
    NamespaceImport,
    BinaryExpression,
    PrefixUnaryExpression,
    CallExpression,
    NewExpression,
    PropertyAccessExpression,
    ParenthesizedExpression,
    AsExpression,
    TypeReference,
    ArrayType,
}

impl SyntaxKind {
    /// Keyword lookup for identifier-shaped text.
    pub fn keyword(text: &str) -> Option<SyntaxKind> {
        Some(match text {
            "let" => SyntaxKind::LetKeyword,
            "const" => SyntaxKind::ConstKeyword,
            "return" => SyntaxKind::ReturnKeyword,
            "if" => SyntaxKind::IfKeyword,
            "else" => SyntaxKind::ElseKeyword,
            "new" => SyntaxKind::NewKeyword,
            "this" => SyntaxKind::ThisKeyword,
            "super" => SyntaxKind::SuperKeyword,
            "true" => SyntaxKind::TrueKeyword,
            "false" => SyntaxKind::FalseKeyword,
            "null" => SyntaxKind::NullKeyword,
            "class" => SyntaxKind::ClassKeyword,
            "extends" => SyntaxKind::ExtendsKeyword,
            "function" => SyntaxKind::FunctionKeyword,
            "import" => SyntaxKind::ImportKeyword,
            "export" => SyntaxKind::ExportKeyword,
            "from" => SyntaxKind::FromKeyword,
            "as" => SyntaxKind::AsKeyword,
            "declare" => SyntaxKind::DeclareKeyword,
            "abstract" => SyntaxKind::AbstractKeyword,
            "static" => SyntaxKind::StaticKeyword,
            "readonly" => SyntaxKind::ReadonlyKeyword,
            "private" => SyntaxKind::PrivateKeyword,
            "protected" => SyntaxKind::ProtectedKeyword,
            "public" => SyntaxKind::PublicKeyword,
            "constructor" => SyntaxKind::ConstructorKeyword,
            "void" => SyntaxKind::VoidKeyword,
            "number" => SyntaxKind::NumberKeyword,
            "int" => SyntaxKind::IntKeyword,
            "long" => SyntaxKind::LongKeyword,
            "short" => SyntaxKind::ShortKeyword,
            "byte" => SyntaxKind::ByteKeyword,
            "char" => SyntaxKind::CharKeyword,
            "float" => SyntaxKind::FloatKeyword,
            "double" => SyntaxKind::DoubleKeyword,
            "boolean" => SyntaxKind::BooleanKeyword,
            "string" => SyntaxKind::StringKeyword,
            _ => return None,
        })
    }

    /// Keywords that may still be used as names (member names, `from`, ...).
    pub fn is_contextual_keyword(self) -> bool {
        matches!(
            self,
            SyntaxKind::FromKeyword
                | SyntaxKind::AsKeyword
                | SyntaxKind::DeclareKeyword
                | SyntaxKind::AbstractKeyword
                | SyntaxKind::StaticKeyword
                | SyntaxKind::ReadonlyKeyword
                | SyntaxKind::ConstructorKeyword
        )
    }

    /// Keywords that denote a built-in type when used in type position.
    pub fn is_type_keyword(self) -> bool {
        matches!(
            self,
            SyntaxKind::VoidKeyword
                | SyntaxKind::NumberKeyword
                | SyntaxKind::IntKeyword
                | SyntaxKind::LongKeyword
                | SyntaxKind::ShortKeyword
                | SyntaxKind::ByteKeyword
                | SyntaxKind::CharKeyword
                | SyntaxKind::FloatKeyword
                | SyntaxKind::DoubleKeyword
                | SyntaxKind::BooleanKeyword
                | SyntaxKind::StringKeyword
        )
    }

    /// Source text of a token kind, if it has a fixed spelling.
    pub fn token_text(self) -> Option<&'static str> {
        Some(match self {
            SyntaxKind::OpenBraceToken => "{",
            SyntaxKind::CloseBraceToken => "}",
            SyntaxKind::OpenParenToken => "(",
            SyntaxKind::CloseParenToken => ")",
            SyntaxKind::OpenBracketToken => "[",
            SyntaxKind::CloseBracketToken => "]",
            SyntaxKind::DotToken => ".",
            SyntaxKind::SemicolonToken => ";",
            SyntaxKind::CommaToken => ",",
            SyntaxKind::ColonToken => ":",
            SyntaxKind::LessThanToken => "<",
            SyntaxKind::GreaterThanToken => ">",
            SyntaxKind::LessThanEqualsToken => "<=",
            SyntaxKind::GreaterThanEqualsToken => ">=",
            SyntaxKind::EqualsEqualsToken => "==",
            SyntaxKind::ExclamationEqualsToken => "!=",
            SyntaxKind::EqualsEqualsEqualsToken => "===",
            SyntaxKind::ExclamationEqualsEqualsToken => "!==",
            SyntaxKind::PlusToken => "+",
            SyntaxKind::MinusToken => "-",
            SyntaxKind::AsteriskToken => "*",
            SyntaxKind::SlashToken => "/",
            SyntaxKind::PercentToken => "%",
            SyntaxKind::AmpersandAmpersandToken => "&&",
            SyntaxKind::BarBarToken => "||",
            SyntaxKind::ExclamationToken => "!",
            SyntaxKind::EqualsToken => "=",
            SyntaxKind::LetKeyword => "let",
            SyntaxKind::ConstKeyword => "const",
            SyntaxKind::ReturnKeyword => "return",
            SyntaxKind::IfKeyword => "if",
            SyntaxKind::ElseKeyword => "else",
            SyntaxKind::NewKeyword => "new",
            SyntaxKind::ThisKeyword => "this",
            SyntaxKind::SuperKeyword => "super",
            SyntaxKind::TrueKeyword => "true",
            SyntaxKind::FalseKeyword => "false",
            SyntaxKind::NullKeyword => "null",
            SyntaxKind::ClassKeyword => "class",
            SyntaxKind::ExtendsKeyword => "extends",
            SyntaxKind::FunctionKeyword => "function",
            SyntaxKind::ImportKeyword => "import",
            SyntaxKind::ExportKeyword => "export",
            SyntaxKind::FromKeyword => "from",
            SyntaxKind::AsKeyword => "as",
            SyntaxKind::DeclareKeyword => "declare",
            SyntaxKind::AbstractKeyword => "abstract",
            SyntaxKind::StaticKeyword => "static",
            SyntaxKind::ReadonlyKeyword => "readonly",
            SyntaxKind::PrivateKeyword => "private",
            SyntaxKind::ProtectedKeyword => "protected",
            SyntaxKind::PublicKeyword => "public",
            SyntaxKind::ConstructorKeyword => "constructor",
            SyntaxKind::VoidKeyword => "void",
            SyntaxKind::NumberKeyword => "number",
            SyntaxKind::IntKeyword => "int",
            SyntaxKind::LongKeyword => "long",
            SyntaxKind::ShortKeyword => "short",
            SyntaxKind::ByteKeyword => "byte",
            SyntaxKind::CharKeyword => "char",
            SyntaxKind::FloatKeyword => "float",
            SyntaxKind::DoubleKeyword => "double",
            SyntaxKind::BooleanKeyword => "boolean",
            SyntaxKind::StringKeyword => "string",
            _ => return None,
        })
    }
}

/// Snapshot taken by `Scanner::save_state`.
#[derive(Clone, Debug)]
pub struct ScannerState {
    pos: usize,
    token_start: usize,
    token: SyntaxKind,
    token_value: String,
    unterminated: bool,
}

/// Tokenizer over a single source text.
pub struct Scanner {
    text: Vec<char>,
    /// Current read position (character index).
    pos: usize,
    /// Start of the last scanned token.
    token_start: usize,
    token: SyntaxKind,
    /// Text of the last identifier, string or numeric token.
    token_value: String,
    /// Set when the last string literal was not terminated.
    unterminated: bool,
}

impl Scanner {
    pub fn new(text: &str) -> Scanner {
        Scanner {
            text: text.chars().collect(),
            pos: 0,
            token_start: 0,
            token: SyntaxKind::Unknown,
            token_value: String::new(),
            unterminated: false,
        }
    }

    #[inline]
    pub fn token(&self) -> SyntaxKind {
        self.token
    }

    #[inline]
    pub fn token_value(&self) -> &str {
        &self.token_value
    }

    #[inline]
    pub fn token_start(&self) -> u32 {
        self.token_start as u32
    }

    #[inline]
    pub fn token_end(&self) -> u32 {
        self.pos as u32
    }

    #[inline]
    pub fn is_unterminated(&self) -> bool {
        self.unterminated
    }

    /// Save the scanner position for speculative lookahead.
    pub fn save_state(&self) -> ScannerState {
        ScannerState {
            pos: self.pos,
            token_start: self.token_start,
            token: self.token,
            token_value: self.token_value.clone(),
            unterminated: self.unterminated,
        }
    }

    /// Restore a position returned by `save_state`.
    pub fn restore_state(&mut self, state: ScannerState) {
        self.pos = state.pos;
        self.token_start = state.token_start;
        self.token = state.token;
        self.token_value = state.token_value;
        self.unterminated = state.unterminated;
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.text.get(self.pos + offset).copied()
    }

    fn skip_trivia(&mut self) {
        while let Some(ch) = self.peek_char(0) {
            if ch.is_whitespace() {
                self.pos += 1;
            } else if ch == '/' && self.peek_char(1) == Some('/') {
                while let Some(c) = self.peek_char(0) {
                    if c == '\n' {
                        break;
                    }
                    self.pos += 1;
                }
            } else if ch == '/' && self.peek_char(1) == Some('*') {
                self.pos += 2;
                while self.pos < self.text.len() {
                    if self.peek_char(0) == Some('*') && self.peek_char(1) == Some('/') {
                        self.pos += 2;
                        break;
                    }
                    self.pos += 1;
                }
            } else {
                break;
            }
        }
    }

    /// Scan the next token and return its kind.
    pub fn scan(&mut self) -> SyntaxKind {
        self.skip_trivia();
        self.token_start = self.pos;
        self.token_value.clear();
        self.unterminated = false;

        let Some(ch) = self.peek_char(0) else {
            self.token = SyntaxKind::EndOfFileToken;
            return self.token;
        };

        self.token = if ch.is_ascii_alphabetic() || ch == '_' || ch == '$' {
            self.scan_identifier()
        } else if ch.is_ascii_digit() {
            self.scan_number()
        } else if ch == '"' || ch == '\'' {
            self.scan_string(ch)
        } else {
            self.scan_punctuation(ch)
        };
        self.token
    }

    fn scan_identifier(&mut self) -> SyntaxKind {
        while let Some(c) = self.peek_char(0) {
            if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
                self.token_value.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        SyntaxKind::keyword(&self.token_value).unwrap_or(SyntaxKind::Identifier)
    }

    fn scan_number(&mut self) -> SyntaxKind {
        let mut seen_dot = false;
        while let Some(c) = self.peek_char(0) {
            if c.is_ascii_digit() {
                self.token_value.push(c);
                self.pos += 1;
            } else if c == '.'
                && !seen_dot
                && self.peek_char(1).is_some_and(|next| next.is_ascii_digit())
            {
                seen_dot = true;
                self.token_value.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        SyntaxKind::NumericLiteral
    }

    fn scan_string(&mut self, quote: char) -> SyntaxKind {
        self.pos += 1;
        loop {
            let Some(c) = self.peek_char(0) else {
                self.unterminated = true;
                break;
            };
            self.pos += 1;
            if c == quote {
                break;
            }
            if c == '\n' {
                self.unterminated = true;
                break;
            }
            if c == '\\' {
                let escaped = match self.peek_char(0) {
                    Some('n') => '\n',
                    Some('t') => '\t',
                    Some('r') => '\r',
                    Some('0') => '\0',
                    Some(other) => other,
                    None => {
                        self.unterminated = true;
                        break;
                    }
                };
                self.pos += 1;
                self.token_value.push(escaped);
            } else {
                self.token_value.push(c);
            }
        }
        SyntaxKind::StringLiteral
    }

    fn scan_punctuation(&mut self, ch: char) -> SyntaxKind {
        let next = self.peek_char(1);
        let next2 = self.peek_char(2);
        let (kind, len) = match ch {
            '{' => (SyntaxKind::OpenBraceToken, 1),
            '}' => (SyntaxKind::CloseBraceToken, 1),
            '(' => (SyntaxKind::OpenParenToken, 1),
            ')' => (SyntaxKind::CloseParenToken, 1),
            '[' => (SyntaxKind::OpenBracketToken, 1),
            ']' => (SyntaxKind::CloseBracketToken, 1),
            '.' => (SyntaxKind::DotToken, 1),
            ';' => (SyntaxKind::SemicolonToken, 1),
            ',' => (SyntaxKind::CommaToken, 1),
            ':' => (SyntaxKind::ColonToken, 1),
            '+' => (SyntaxKind::PlusToken, 1),
            '-' => (SyntaxKind::MinusToken, 1),
            '*' => (SyntaxKind::AsteriskToken, 1),
            '/' => (SyntaxKind::SlashToken, 1),
            '%' => (SyntaxKind::PercentToken, 1),
            '<' if next == Some('=') => (SyntaxKind::LessThanEqualsToken, 2),
            '<' => (SyntaxKind::LessThanToken, 1),
            '>' if next == Some('=') => (SyntaxKind::GreaterThanEqualsToken, 2),
            '>' => (SyntaxKind::GreaterThanToken, 1),
            '=' if next == Some('=') && next2 == Some('=') => {
                (SyntaxKind::EqualsEqualsEqualsToken, 3)
            }
            '=' if next == Some('=') => (SyntaxKind::EqualsEqualsToken, 2),
            '=' => (SyntaxKind::EqualsToken, 1),
            '!' if next == Some('=') && next2 == Some('=') => {
                (SyntaxKind::ExclamationEqualsEqualsToken, 3)
            }
            '!' if next == Some('=') => (SyntaxKind::ExclamationEqualsToken, 2),
            '!' => (SyntaxKind::ExclamationToken, 1),
            '&' if next == Some('&') => (SyntaxKind::AmpersandAmpersandToken, 2),
            '|' if next == Some('|') => (SyntaxKind::BarBarToken, 2),
            _ => (SyntaxKind::Unknown, 1),
        };
        if kind == SyntaxKind::Unknown {
            self.token_value.push(ch);
        }
        self.pos += len;
        kind
    }
}
