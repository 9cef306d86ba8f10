//! Streaming JSON entry codec.
//!
//! The reader pulls one token at a time from a buffered source, so only the
//! entry currently being decoded is held in memory.

use std::collections::HashSet;
use std::io::{BufRead, BufReader, Read, Write};
use std::str::FromStr;

use cads_dataset::Structure;
use cads_types::Logger;
use serde_json::{Map, Number, Value};

use crate::entry::{Direction, Entry, EntryReader, EntryWriter, ScanMode};
use crate::error::{traced, IoError, IoResult};

/// Deepest container nesting accepted, counting the top-level container.
const MAX_DEPTH: usize = 128;

#[derive(Clone, Debug, PartialEq)]
enum Token {
    BeginArray,
    EndArray,
    BeginObject,
    EndObject,
    Colon,
    Comma,
    Str(String),
    Num(Number),
    Bool(bool),
    Null,
}

impl Token {
    fn describe(token: Option<&Token>) -> String {
        match token {
            None => "end of input".to_string(),
            Some(Token::BeginArray) => "'['".to_string(),
            Some(Token::EndArray) => "']'".to_string(),
            Some(Token::BeginObject) => "'{'".to_string(),
            Some(Token::EndObject) => "'}'".to_string(),
            Some(Token::Colon) => "':'".to_string(),
            Some(Token::Comma) => "','".to_string(),
            Some(Token::Str(s)) => format!("string {s:?}"),
            Some(Token::Num(n)) => format!("number {n}"),
            Some(Token::Bool(b)) => format!("{b}"),
            Some(Token::Null) => "null".to_string(),
        }
    }
}

struct Tokenizer<R> {
    inner: BufReader<R>,
    offset: u64,
}

impl<R: Read> Tokenizer<R> {
    fn new(reader: R) -> Self {
        Self {
            inner: BufReader::new(reader),
            offset: 0,
        }
    }

    fn peek(&mut self) -> IoResult<Option<u8>> {
        Ok(self.inner.fill_buf()?.first().copied())
    }

    fn bump(&mut self) -> IoResult<Option<u8>> {
        let b = self.peek()?;
        if b.is_some() {
            self.inner.consume(1);
            self.offset += 1;
        }
        Ok(b)
    }

    fn syntax(&self, reason: impl Into<String>) -> IoError {
        IoError::Syntax {
            offset: self.offset,
            reason: reason.into(),
        }
    }

    fn next_token(&mut self) -> IoResult<Option<Token>> {
        while let Some(b) = self.peek()? {
            if !b.is_ascii_whitespace() {
                break;
            }
            self.bump()?;
        }
        let Some(b) = self.peek()? else {
            return Ok(None);
        };
        let token = match b {
            b'[' => self.single(Token::BeginArray)?,
            b']' => self.single(Token::EndArray)?,
            b'{' => self.single(Token::BeginObject)?,
            b'}' => self.single(Token::EndObject)?,
            b':' => self.single(Token::Colon)?,
            b',' => self.single(Token::Comma)?,
            b'"' => Token::Str(self.string()?),
            b'-' | b'0'..=b'9' => Token::Num(self.number()?),
            b't' => self.literal("true", Token::Bool(true))?,
            b'f' => self.literal("false", Token::Bool(false))?,
            b'n' => self.literal("null", Token::Null)?,
            other => {
                return Err(self.syntax(format!("unexpected character {:?}", other as char)))
            }
        };
        Ok(Some(token))
    }

    fn single(&mut self, token: Token) -> IoResult<Token> {
        self.bump()?;
        Ok(token)
    }

    fn string(&mut self) -> IoResult<String> {
        let start = self.offset;
        let mut raw = Vec::new();
        raw.extend(self.bump()?);
        loop {
            match self.bump()? {
                None => return Err(self.syntax(format!("unterminated string starting at {start}"))),
                Some(b'\\') => {
                    raw.push(b'\\');
                    match self.bump()? {
                        Some(escaped) => raw.push(escaped),
                        None => return Err(self.syntax("unterminated escape")),
                    }
                }
                Some(b'"') => {
                    raw.push(b'"');
                    break;
                }
                Some(b) => raw.push(b),
            }
        }
        serde_json::from_slice(&raw).map_err(|e| self.syntax(e.to_string()))
    }

    fn number(&mut self) -> IoResult<Number> {
        let mut raw = String::new();
        while let Some(b) = self.peek()? {
            if !matches!(b, b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E') {
                break;
            }
            raw.push(b as char);
            self.bump()?;
        }
        Number::from_str(&raw).map_err(|_| self.syntax(format!("invalid number {raw:?}")))
    }

    fn literal(&mut self, word: &str, token: Token) -> IoResult<Token> {
        for expected in word.bytes() {
            if self.bump()? != Some(expected) {
                return Err(self.syntax(format!("invalid literal, expected {word}")));
            }
        }
        Ok(token)
    }
}

/// Reads entries from a JSON array or object.
pub struct JsonReader<R> {
    structure: Structure,
    mode: ScanMode,
    tokens: Tokenizer<R>,
    count: usize,
    done: bool,
    logger: Logger,
}

impl<R: Read> JsonReader<R> {
    /// Consume the opening delimiter the schema's root type calls for.
    pub fn new(structure: Structure, reader: R) -> IoResult<Self> {
        let mode = ScanMode::from_structure(&structure, Direction::Read)?;
        let mut tokens = Tokenizer::new(reader);
        let first = tokens.next_token()?;
        let expected = match mode {
            ScanMode::Array => Token::BeginArray,
            ScanMode::Object => Token::BeginObject,
        };
        if first.as_ref() != Some(&expected) {
            return Err(IoError::UnexpectedOpening {
                expected: mode.open(),
                container: mode.container(),
                found: Token::describe(first.as_ref()),
            });
        }
        Ok(Self {
            structure,
            mode,
            tokens,
            count: 0,
            done: false,
            logger: Logger::default(),
        })
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    /// Number of entries read so far.
    pub fn count(&self) -> usize {
        self.count
    }

    fn expect_token(&mut self, close: char) -> IoResult<Token> {
        self.tokens.next_token()?.ok_or(IoError::Unterminated(close))
    }

    /// Next member token of a container, `None` at its closing delimiter.
    fn member(&mut self, close: char, first: bool) -> IoResult<Option<Token>> {
        let end = if close == ']' {
            Token::EndArray
        } else {
            Token::EndObject
        };
        let token = self.expect_token(close)?;
        if token == end {
            return Ok(None);
        }
        if first {
            return Ok(Some(token));
        }
        if token != Token::Comma {
            return Err(self.tokens.syntax(format!(
                "expected ',' or '{close}', found {}",
                Token::describe(Some(&token))
            )));
        }
        self.expect_token(close).map(Some)
    }

    /// `depth` is the number of containers open around the item.
    fn array_item(&mut self, first: bool, depth: usize) -> IoResult<Option<Value>> {
        match self.member(']', first)? {
            Some(token) => self.value(token, ']', depth).map(Some),
            None => Ok(None),
        }
    }

    fn object_item(&mut self, first: bool, depth: usize) -> IoResult<Option<(String, Value)>> {
        let Some(token) = self.member('}', first)? else {
            return Ok(None);
        };
        let Token::Str(key) = token else {
            return Err(self.tokens.syntax(format!(
                "expected string key, found {}",
                Token::describe(Some(&token))
            )));
        };
        let colon = self.expect_token('}')?;
        if colon != Token::Colon {
            return Err(self.tokens.syntax(format!(
                "expected ':' after key {key:?}, found {}",
                Token::describe(Some(&colon))
            )));
        }
        let token = self.expect_token('}')?;
        let value = self.value(token, '}', depth)?;
        Ok(Some((key, value)))
    }

    fn value(&mut self, token: Token, enclosing: char, depth: usize) -> IoResult<Value> {
        if matches!(token, Token::BeginArray | Token::BeginObject) && depth >= MAX_DEPTH {
            return Err(self.tokens.syntax(format!(
                "recursion limit exceeded, nesting deeper than {MAX_DEPTH}"
            )));
        }
        Ok(match token {
            Token::Str(s) => Value::String(s),
            Token::Num(n) => Value::Number(n),
            Token::Bool(b) => Value::Bool(b),
            Token::Null => Value::Null,
            Token::BeginArray => {
                let mut items = Vec::new();
                while let Some(item) = self.array_item(items.is_empty(), depth + 1)? {
                    items.push(item);
                }
                Value::Array(items)
            }
            Token::BeginObject => {
                let mut map = Map::new();
                let mut first = true;
                while let Some((key, value)) = self.object_item(first, depth + 1)? {
                    map.insert(key, value);
                    first = false;
                }
                Value::Object(map)
            }
            other => {
                return Err(self.tokens.syntax(format!(
                    "expected value inside '{enclosing}', found {}",
                    Token::describe(Some(&other))
                )))
            }
        })
    }

    fn next_entry(&mut self) -> IoResult<Option<Entry>> {
        if self.done {
            return Ok(None);
        }
        let first = self.count == 0;
        let entry = match self.mode {
            ScanMode::Array => self
                .array_item(first, 1)?
                .map(|value| Entry::indexed(self.count, value)),
            ScanMode::Object => self
                .object_item(first, 1)?
                .map(|(key, value)| Entry::keyed(key, value)),
        };
        match entry {
            Some(_) => self.count += 1,
            None => self.done = true,
        }
        Ok(entry)
    }
}

impl<R: Read> EntryReader for JsonReader<R> {
    fn structure(&self) -> &Structure {
        &self.structure
    }

    fn read_entry(&mut self) -> IoResult<Option<Entry>> {
        let result = self.next_entry();
        traced(&self.logger, "read json entry", result)
    }
}

/// Writes entries as a JSON array or object.
///
/// The opening delimiter is written with the first entry, so a writer
/// closed without entries emits `[]` or `{}`.
pub struct JsonWriter<W: Write> {
    structure: Structure,
    mode: ScanMode,
    out: W,
    count: usize,
    keys: HashSet<String>,
    closed: bool,
    logger: Logger,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(structure: Structure, out: W) -> IoResult<Self> {
        let mode = ScanMode::from_structure(&structure, Direction::Write)?;
        Ok(Self {
            structure,
            mode,
            out,
            count: 0,
            keys: HashSet::new(),
            closed: false,
            logger: Logger::default(),
        })
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    /// Number of entries written so far.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Give back the underlying sink.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn encode(&mut self, entry: &Entry) -> IoResult<()> {
        if self.closed {
            return Err(IoError::Closed);
        }
        let mut body = Vec::new();
        let key = match self.mode {
            ScanMode::Array => None,
            ScanMode::Object => {
                let key = entry.key.as_deref().unwrap_or_default();
                if key.is_empty() {
                    return Err(IoError::EmptyKey);
                }
                if self.keys.contains(key) {
                    return Err(IoError::DuplicateKey(key.to_string()));
                }
                serde_json::to_writer(&mut body, key)?;
                body.push(b':');
                Some(key.to_string())
            }
        };
        serde_json::to_writer(&mut body, &entry.value)?;

        let lead: &[u8] = match (self.count, self.mode) {
            (0, ScanMode::Array) => b"[",
            (0, ScanMode::Object) => b"{",
            _ => b",",
        };
        self.out.write_all(lead)?;
        self.out.write_all(&body)?;
        if let Some(key) = key {
            self.keys.insert(key);
        }
        self.count += 1;
        Ok(())
    }

    fn finish(&mut self) -> IoResult<()> {
        if self.closed {
            return Ok(());
        }
        if self.count == 0 {
            write!(self.out, "{}", self.mode.open())?;
        }
        write!(self.out, "{}", self.mode.close())?;
        self.out.flush()?;
        self.closed = true;
        Ok(())
    }
}

impl<W: Write> EntryWriter for JsonWriter<W> {
    fn structure(&self) -> &Structure {
        &self.structure
    }

    fn write_entry(&mut self, entry: &Entry) -> IoResult<()> {
        let result = self.encode(entry);
        traced(&self.logger, "write json entry", result)
    }

    fn close(&mut self) -> IoResult<()> {
        let result = self.finish();
        traced(&self.logger, "close json writer", result)
    }
}
