//! JSON Pointers (RFC 6901) and the source locations built on them.

use core::fmt;

/// A JSON Pointer: a list of unescaped reference tokens addressing one
/// node inside a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Pointer(Vec<String>);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid json pointer: {0:?}")]
pub struct PointerParseError(pub String);

impl Pointer {
    /// The pointer to the document root.
    pub fn root() -> Pointer {
        Pointer(Vec::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// A new pointer with one more reference token appended.
    pub fn child(&self, segment: impl Into<String>) -> Pointer {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Pointer(segments)
    }

    /// A new pointer addressing an array element.
    pub fn child_index(&self, index: usize) -> Pointer {
        self.child(index.to_string())
    }

    /// Parse the textual form, with or without the leading `#`.
    ///
    /// The empty string and `#` both denote the root pointer.
    pub fn parse(input: &str) -> Result<Pointer, PointerParseError> {
        let text = input.strip_prefix('#').unwrap_or(input);
        if text.is_empty() {
            return Ok(Pointer::root());
        }
        let Some(rest) = text.strip_prefix('/') else {
            return Err(PointerParseError(input.to_string()));
        };
        let segments = rest.split('/').map(unescape).collect();
        Ok(Pointer(segments))
    }
}

fn escape(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

fn unescape(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#")?;
        for segment in &self.0 {
            write!(f, "/{}", escape(segment))?;
        }
        Ok(())
    }
}

impl<S: Into<String>> FromIterator<S> for Pointer {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Pointer(iter.into_iter().map(Into::into).collect())
    }
}

/// Where a value came from: the document it was parsed out of (if any)
/// and the pointer to its position inside that document.
///
/// Locations are diagnostic metadata only. They never participate in
/// value equality.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceLocation {
    pub document: Option<String>,
    pub pointer: Pointer,
}

impl SourceLocation {
    pub fn new(document: Option<String>, pointer: Pointer) -> SourceLocation {
        SourceLocation { document, pointer }
    }

    /// The location of programmatically constructed values.
    pub fn unknown() -> SourceLocation {
        SourceLocation::default()
    }

    /// The location of a member or element one level below this one.
    pub fn child(&self, segment: impl Into<String>) -> SourceLocation {
        SourceLocation {
            document: self.document.clone(),
            pointer: self.pointer.child(segment),
        }
    }

    pub fn child_index(&self, index: usize) -> SourceLocation {
        self.child(index.to_string())
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.document {
            Some(document) => write!(f, "{document}: {}", self.pointer),
            None => write!(f, "{}", self.pointer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_escapes_reference_tokens() {
        let pointer = Pointer::root().child("a/b").child("c~d").child("plain");
        assert_eq!(pointer.to_string(), "#/a~1b/c~0d/plain");
    }

    #[test]
    fn parse_round_trips() {
        for text in ["#", "#/a/b", "#/a~1b/c~0d", "#/0/1"] {
            let pointer = Pointer::parse(text).unwrap();
            assert_eq!(pointer.to_string(), if text == "#" { "#" } else { text });
        }
        assert_eq!(Pointer::parse("/a/b").unwrap().segments().len(), 2);
        assert!(Pointer::parse("a/b").is_err());
    }

    #[test]
    fn empty_segments_survive() {
        let pointer = Pointer::parse("#/a//b").unwrap();
        assert_eq!(pointer.segments(), ["a", "", "b"]);
    }

    #[test]
    fn locations_render_with_document() {
        let location = SourceLocation::new(
            Some("config.json".to_string()),
            Pointer::root().child("age"),
        );
        assert_eq!(location.to_string(), "config.json: #/age");
        assert_eq!(SourceLocation::unknown().to_string(), "#");
    }
}
