//! Inline-vs-attachment decision for the serialized body.
//!
//! The destination rejects embed fields over 2000 characters. The default
//! threshold leaves room for the code fence and field name.

/// Default longest body rendered inline.
pub const DEFAULT_INLINE_LIMIT: usize = 1900;

/// File name of the attachment carrying an oversized body.
pub const BODY_ATTACHMENT_NAME: &str = "request-body.json";

/// Body field text used when the body ships as an attachment.
pub const BODY_TOO_LARGE: &str = "Body too large to include in message.";

/// A file uploaded next to the notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub contents: String,
}

/// How the body appears in the notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyRendering {
    /// Fenced JSON for the Body field.
    Inline(String),
    /// Placeholder text for the Body field plus the file to upload.
    Attachment {
        field: String,
        attachment: Attachment,
    },
}

impl BodyRendering {
    pub fn into_parts(self) -> (String, Option<Attachment>) {
        match self {
            BodyRendering::Inline(text) => (text, None),
            BodyRendering::Attachment { field, attachment } => (field, Some(attachment)),
        }
    }

    pub fn is_attachment(&self) -> bool {
        matches!(self, BodyRendering::Attachment { .. })
    }
}

/// Chooses inline or attachment rendering by length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeGuard {
    inline_limit: usize,
}

impl SizeGuard {
    pub fn new(inline_limit: usize) -> Self {
        Self { inline_limit }
    }

    /// Length in UTF-16 code units.
    pub fn measure(text: &str) -> usize {
        text.encode_utf16().count()
    }

    /// True when `body_string` must ship as an attachment.
    pub fn exceeds(&self, body_string: &str) -> bool {
        Self::measure(body_string) > self.inline_limit
    }

    /// Render a serialized body, inline when it fits.
    pub fn render(&self, body_string: String) -> BodyRendering {
        if self.exceeds(&body_string) {
            BodyRendering::Attachment {
                field: BODY_TOO_LARGE.to_string(),
                attachment: Attachment {
                    name: BODY_ATTACHMENT_NAME.to_string(),
                    contents: body_string,
                },
            }
        } else {
            BodyRendering::Inline(json_fence(&body_string))
        }
    }
}

impl Default for SizeGuard {
    fn default() -> Self {
        Self::new(DEFAULT_INLINE_LIMIT)
    }
}

/// Wrap text in a ```json code fence.
pub fn json_fence(text: &str) -> String {
    format!("```json\n{}\n```", text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary() {
        let guard = SizeGuard::default();

        let at_limit = "x".repeat(1900);
        let rendering = guard.render(at_limit.clone());
        assert_eq!(rendering, BodyRendering::Inline(json_fence(&at_limit)));

        let over = "x".repeat(1901);
        match guard.render(over.clone()) {
            BodyRendering::Attachment { field, attachment } => {
                assert_eq!(field, BODY_TOO_LARGE);
                assert_eq!(attachment.name, "request-body.json");
                assert_eq!(attachment.contents, over);
            }
            other => panic!("expected attachment, got {:?}", other),
        }
    }

    #[test]
    fn test_measures_utf16_units() {
        // U+1F600 takes two UTF-16 units.
        assert_eq!(SizeGuard::measure("\u{1F600}"), 2);
        assert_eq!(SizeGuard::measure("é"), 1);

        let guard = SizeGuard::new(3);
        assert!(!guard.exceeds("a\u{1F600}"));
        assert!(guard.exceeds("ab\u{1F600}"));
    }

    #[test]
    fn test_decision_is_stable() {
        let guard = SizeGuard::default();
        for len in [0, 1, 1899, 1900, 1901, 5000] {
            let body = "y".repeat(len);
            let first = guard.render(body.clone()).is_attachment();
            let second = guard.render(body).is_attachment();
            assert_eq!(first, second);
            assert_eq!(first, len > 1900);
        }
    }
}
