use bytes::Bytes;
use serde::Serialize;

/// Number of characters returned by `ExtractedText::preview`.
pub const MAX_PREVIEW_CHARS: usize = 4000;

/// An uploaded resume. Moved into the pipeline and dropped once the text is extracted.
#[derive(Debug, Clone)]
pub struct ResumeDocument {
    pub filename: String,
    pub data: Bytes,
}

impl ResumeDocument {
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }
}

/// Why an extraction produced no text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractionDiagnostic {
    /// The container could not be opened at all.
    Unreadable { reason: String },
    /// The container opened but none of its pages carry a text layer (scanned/image-only).
    NoTextLayer { pages: usize },
}

impl std::fmt::Display for ExtractionDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionDiagnostic::Unreadable { reason } => {
                write!(f, "document could not be read: {reason}")
            }
            ExtractionDiagnostic::NoTextLayer { pages } => write!(
                f,
                "none of the {pages} page(s) contain extractable text; scanned documents need OCR"
            ),
        }
    }
}

/// Plain text of a document, pages joined in order with a single newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    text: String,
    pages_with_text: usize,
    diagnostic: Option<ExtractionDiagnostic>,
}

impl ExtractedText {
    /// Joins page texts in order. Pages that are blank after trimming are dropped.
    pub fn from_pages<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut text = String::new();
        let mut pages_with_text = 0;
        let mut total_pages = 0;

        for page in pages {
            total_pages += 1;
            let page = page.as_ref().trim_end();
            if page.trim().is_empty() {
                continue;
            }
            if pages_with_text > 0 {
                text.push('\n');
            }
            text.push_str(page);
            pages_with_text += 1;
        }

        let diagnostic = (pages_with_text == 0).then_some(ExtractionDiagnostic::NoTextLayer {
            pages: total_pages,
        });

        Self {
            text,
            pages_with_text,
            diagnostic,
        }
    }

    /// An empty extraction carrying the reason nothing was produced.
    pub fn empty(diagnostic: ExtractionDiagnostic) -> Self {
        Self {
            text: String::new(),
            pages_with_text: 0,
            diagnostic: Some(diagnostic),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn pages_with_text(&self) -> usize {
        self.pages_with_text
    }

    pub fn diagnostic(&self) -> Option<&ExtractionDiagnostic> {
        self.diagnostic.as_ref()
    }

    /// First `MAX_PREVIEW_CHARS` characters, for display.
    pub fn preview(&self) -> &str {
        match self.text.char_indices().nth(MAX_PREVIEW_CHARS) {
            Some((idx, _)) => &self.text[..idx],
            None => &self.text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_joined_in_order_with_single_newline() {
        let text = ExtractedText::from_pages(["Page one\n\n", "Page two", "Page three  "]);
        assert_eq!(text.as_str(), "Page one\nPage two\nPage three");
        assert_eq!(text.pages_with_text(), 3);
        assert!(text.diagnostic().is_none());
    }

    #[test]
    fn test_blank_pages_contribute_nothing() {
        let text = ExtractedText::from_pages(["First", "   \n ", "", "Last"]);
        assert_eq!(text.as_str(), "First\nLast");
        assert_eq!(text.pages_with_text(), 2);
    }

    #[test]
    fn test_duplicate_pages_are_kept() {
        let text = ExtractedText::from_pages(["Same", "Same"]);
        assert_eq!(text.as_str(), "Same\nSame");
    }

    #[test]
    fn test_all_blank_pages_is_empty_with_no_text_layer() {
        let text = ExtractedText::from_pages(["", "  "]);
        assert!(text.is_empty());
        assert_eq!(
            text.diagnostic(),
            Some(&ExtractionDiagnostic::NoTextLayer { pages: 2 })
        );
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let long = "é".repeat(MAX_PREVIEW_CHARS + 10);
        let text = ExtractedText::from_pages([long]);
        assert_eq!(text.preview().chars().count(), MAX_PREVIEW_CHARS);
    }

    #[test]
    fn test_preview_of_short_text_is_whole_text() {
        let text = ExtractedText::from_pages(["short"]);
        assert_eq!(text.preview(), "short");
    }
}
