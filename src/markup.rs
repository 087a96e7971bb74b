//! Structured-markup decoding of entry bytes.
//!
//! Entry content is offered to the store as an XML [`Document`] when it is a
//! well-formed document with a single root element. The character encoding
//! comes from a byte order mark, then the XML declaration, and defaults to
//! UTF-8; documents in other encodings are transcoded to UTF-8. Anything else
//! is kept as raw bytes: see [`decode_entry`].

use std::fmt;

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;
use tracing::debug;

use crate::value::{Base64Binary, Item, Sequence};

/// Why a byte buffer is not a document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("no content")]
    Empty,
    #[error("content is not valid {0}")]
    Encoding(&'static str),
    #[error("malformed markup at byte {position}: {message}")]
    Syntax { position: usize, message: String },
    #[error("document has no root element")]
    NoRootElement,
    #[error("document has more than one root element")]
    MultipleRoots,
    #[error("character data outside the root element")]
    ContentOutsideRoot,
    #[error("document ends inside element '{0}'")]
    Unclosed(String),
}

/// A well-formed XML document, held as UTF-8.
#[derive(Clone, PartialEq, Eq)]
pub struct Document {
    root: String,
    source: String,
    encoding: &'static Encoding,
}

impl Document {
    /// Parse `bytes` as a standalone XML document.
    pub fn parse(bytes: &[u8]) -> Result<Self, DecodeError> {
        let (encoding, body) = sniff_encoding(bytes);
        let text = encoding
            .decode_without_bom_handling_and_without_replacement(body)
            .ok_or(DecodeError::Encoding(encoding.name()))?;
        if text.trim_matches(is_xml_whitespace).is_empty() {
            return Err(DecodeError::Empty);
        }

        let root = check_well_formed(&text)?;
        let source = if encoding == UTF_8 {
            text.into_owned()
        } else {
            relabel_declaration(&text)
        };
        Ok(Self {
            root,
            source,
            encoding,
        })
    }

    /// Qualified name of the document element.
    pub fn root_name(&self) -> &str {
        &self.root
    }

    /// Encoding the entry bytes were read in, e.g. `UTF-16LE`.
    pub fn source_encoding(&self) -> &'static str {
        self.encoding.name()
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.source.as_bytes()
    }

    pub fn into_string(self) -> String {
        self.source
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("root", &self.root)
            .field("encoding", &self.encoding.name())
            .field("len", &self.source.len())
            .finish()
    }
}

fn is_xml_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// Byte order mark first, then the UTF-16 signature of `<?`, then the
/// encoding named by the XML declaration.
fn sniff_encoding(bytes: &[u8]) -> (&'static Encoding, &[u8]) {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        return (encoding, &bytes[bom_len..]);
    }
    match bytes {
        [0x3C, 0x00, 0x3F, 0x00, ..] => (UTF_16LE, bytes),
        [0x00, 0x3C, 0x00, 0x3F, ..] => (UTF_16BE, bytes),
        // A UTF-16 label on bytes without a UTF-16 signature reads as UTF-8.
        _ => (
            declared_encoding(bytes).map_or(UTF_8, Encoding::output_encoding),
            bytes,
        ),
    }
}

fn declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let mut reader = Reader::from_reader(bytes);
    match reader.read_event() {
        Ok(Event::Decl(decl)) => {
            let label = decl.encoding()?.ok()?;
            Encoding::for_label(label.as_ref())
        }
        _ => None,
    }
}

/// Point the XML declaration of transcoded text at UTF-8.
fn relabel_declaration(text: &str) -> String {
    const KEY: &str = "encoding";
    let Some(end) = text.starts_with("<?xml").then(|| text.find("?>")).flatten() else {
        return text.to_owned();
    };
    let Some(key) = text[..end].find(KEY) else {
        return text.to_owned();
    };
    let after_key = key + KEY.len();
    let Some(open) = text[after_key..end].find(['"', '\'']) else {
        return text.to_owned();
    };
    let value = after_key + open + 1;
    let quote = &text[value - 1..value];
    let Some(len) = text[value..end].find(quote) else {
        return text.to_owned();
    };
    format!("{}UTF-8{}", &text[..value], &text[value + len..])
}

/// Walk the whole document and return the root element name.
fn check_well_formed(text: &str) -> Result<String, DecodeError> {
    let mut reader = Reader::from_str(text);
    reader.check_comments(true);
    let mut open: Vec<String> = Vec::new();
    let mut root: Option<String> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| syntax(reader.buffer_position(), e))?;
        match event {
            Event::Start(start) => {
                check_attributes(&start, reader.buffer_position())?;
                let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                if open.is_empty() {
                    claim_root(&mut root, &name)?;
                }
                open.push(name);
            }
            Event::Empty(start) => {
                check_attributes(&start, reader.buffer_position())?;
                if open.is_empty() {
                    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                    claim_root(&mut root, &name)?;
                }
            }
            Event::End(_) => {
                // quick-xml already rejects mismatched end names
                open.pop();
            }
            Event::Text(chars) => {
                // Undefined entities and a bare '&' fail here
                let chars = chars
                    .unescape()
                    .map_err(|e| syntax(reader.buffer_position(), e))?;
                if open.is_empty() && !chars.trim_matches(is_xml_whitespace).is_empty() {
                    return Err(DecodeError::ContentOutsideRoot);
                }
            }
            Event::CData(_) if open.is_empty() => {
                return Err(DecodeError::ContentOutsideRoot);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(name) = open.pop() {
        return Err(DecodeError::Unclosed(name));
    }
    root.ok_or(DecodeError::NoRootElement)
}

/// Quoted, unique, and with well-formed references in every value.
fn check_attributes(start: &BytesStart<'_>, position: usize) -> Result<(), DecodeError> {
    for attr in start.attributes().with_checks(true) {
        let attr = attr.map_err(|e| syntax(position, e))?;
        attr.unescape_value().map_err(|e| syntax(position, e))?;
    }
    Ok(())
}

fn syntax(position: usize, err: impl fmt::Display) -> DecodeError {
    DecodeError::Syntax {
        position,
        message: err.to_string(),
    }
}

fn claim_root(root: &mut Option<String>, name: &str) -> Result<(), DecodeError> {
    if root.is_some() {
        return Err(DecodeError::MultipleRoots);
    }
    *root = Some(name.to_owned());
    Ok(())
}

/// Entry content after the decode-or-fallback step.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryData {
    Document(Document),
    Binary(Base64Binary),
    /// Not a document and zero bytes long: no data value is substituted.
    Empty,
}

impl EntryData {
    /// The `$data` argument for a data-receiving store function.
    pub fn into_sequence(self) -> Sequence {
        match self {
            Self::Document(doc) => Sequence::one(Item::Document(doc)),
            Self::Binary(bin) => Sequence::one(Item::Binary(bin)),
            Self::Empty => Sequence::empty(),
        }
    }
}

/// Decode entry bytes as markup, falling back to a binary value.
pub fn decode_entry(bytes: Vec<u8>) -> EntryData {
    match Document::parse(&bytes) {
        Ok(doc) => EntryData::Document(doc),
        Err(err) => {
            debug!(error = %err, len = bytes.len(), "entry is not markup, keeping raw bytes");
            if bytes.is_empty() {
                EntryData::Empty
            } else {
                EntryData::Binary(Base64Binary::new(bytes))
            }
        }
    }
}
