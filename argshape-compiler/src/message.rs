//! Deferred error-message templates
//!
//! A validator's failure message is compiled as an ordered sequence of
//! literal text segments and symbolic placeholders. Placeholders that
//! depend on the value under test (`Path`, `ActualValue`, `ActualType`,
//! `ActualLength`) are resolved by the evaluator at the failure point;
//! placeholders whose value is known while compiling (expected type,
//! expected value, arity bounds) carry their payload in the template.

/// One segment of an error message template
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Literal text emitted verbatim
    Text(String),
    /// The runtime error path, joined at the failure point
    Path,
    /// JSON serialization of the value under test
    ActualValue,
    /// Runtime type name of the value under test
    ActualType,
    /// Length of the (array) value under test
    ActualLength,
    ExpectedType(String),
    ExpectedValue(String),
    ExpectedLength(usize),
    ExpectedMinLength(usize),
    ExpectedMaxLength(usize),
}

/// Ordered template of literal text and placeholders
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ErrorMessage {
    pub segments: Vec<Segment>,
}

impl ErrorMessage {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }
}

/// Rendering context a validator graph is compiled for
///
/// Named arguments render as `--name`; positional arguments render as
/// `argument at [index]`, and arity failures drop the path entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetStyle {
    Flags,
    Positional,
}

impl TargetStyle {
    /// Signature namespace tag: message templates differ per style, so
    /// the style participates in the canonical validator name
    pub fn signature_prefix(self) -> &'static str {
        match self {
            TargetStyle::Flags => "f:",
            TargetStyle::Positional => "p:",
        }
    }
}

/// Builds the message templates for one rendering context
#[derive(Debug, Clone, Copy)]
pub struct MessageFactory {
    style: TargetStyle,
}

impl MessageFactory {
    pub fn new(style: TargetStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> TargetStyle {
        self.style
    }

    fn text(value: &str) -> Segment {
        Segment::Text(value.to_string())
    }

    /// Leading `--<path>` or `argument at <path>` fragment
    fn subject(&self) -> Vec<Segment> {
        match self.style {
            TargetStyle::Flags => vec![Self::text("--"), Segment::Path],
            TargetStyle::Positional => vec![Self::text("argument at "), Segment::Path],
        }
    }

    /// `never` rejection
    pub fn never(&self) -> ErrorMessage {
        let mut segments = self.subject();
        segments.push(Self::text(" should never be specified. Received "));
        segments.push(Segment::ActualValue);
        ErrorMessage::new(segments)
    }

    /// Required property absent from the input
    pub fn missing(&self) -> ErrorMessage {
        let mut segments = self.subject();
        segments.push(Self::text(" is required but missing"));
        ErrorMessage::new(segments)
    }

    /// Primitive or structural type mismatch
    pub fn type_mismatch(&self, expected_type: &str) -> ErrorMessage {
        let mut segments = self.subject();
        segments.push(Self::text(" must be of type "));
        segments.push(Segment::ExpectedType(expected_type.to_string()));
        segments.push(Self::text(". Received "));
        segments.push(Segment::ActualValue);
        segments.push(Self::text(" of type "));
        segments.push(Segment::ActualType);
        ErrorMessage::new(segments)
    }

    /// Exact-arity tuple failure
    pub fn length(&self, expected: usize) -> ErrorMessage {
        let mut segments = match self.style {
            TargetStyle::Flags => {
                let mut segments = self.subject();
                segments.push(Self::text(" must be array of length "));
                segments
            }
            TargetStyle::Positional => vec![Self::text("requires exactly ")],
        };
        segments.push(Segment::ExpectedLength(expected));
        if self.style == TargetStyle::Positional {
            segments.push(Self::text(" arguments"));
        }
        segments.push(Self::text(". Received "));
        segments.push(Segment::ActualValue);
        segments.push(Self::text(" of length "));
        segments.push(Segment::ActualLength);
        ErrorMessage::new(segments)
    }

    /// Ranged-arity tuple failure
    pub fn range(&self, min: usize, max: usize) -> ErrorMessage {
        let mut segments = match self.style {
            TargetStyle::Flags => {
                let mut segments = self.subject();
                segments.push(Self::text(" must be array with a length from "));
                segments
            }
            TargetStyle::Positional => vec![Self::text("requires ")],
        };
        segments.push(Segment::ExpectedMinLength(min));
        segments.push(Self::text(" to "));
        segments.push(Segment::ExpectedMaxLength(max));
        if self.style == TargetStyle::Positional {
            segments.push(Self::text(" arguments"));
        }
        segments.push(Self::text(". Received "));
        segments.push(Segment::ActualValue);
        segments.push(Self::text(" of length "));
        segments.push(Segment::ActualLength);
        ErrorMessage::new(segments)
    }

    /// Literal equality failure
    pub fn literal_mismatch(&self, expected_value: impl Into<String>) -> ErrorMessage {
        let mut segments = self.subject();
        segments.push(Self::text(" must be "));
        segments.push(Segment::ExpectedValue(expected_value.into()));
        segments.push(Self::text(", received "));
        segments.push(Segment::ActualValue);
        ErrorMessage::new(segments)
    }

    /// All union members rejected the value. Member failures are
    /// deliberately discarded in favour of this one generic message.
    pub fn no_alternatives(&self) -> ErrorMessage {
        let mut segments = self.subject();
        segments.push(Self::text(": there are no valid alternatives"));
        ErrorMessage::new(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn literal_text(message: &ErrorMessage) -> String {
        message
            .segments
            .iter()
            .map(|segment| match segment {
                Segment::Text(text) => text.clone(),
                Segment::ExpectedType(text) | Segment::ExpectedValue(text) => text.clone(),
                Segment::ExpectedLength(n)
                | Segment::ExpectedMinLength(n)
                | Segment::ExpectedMaxLength(n) => n.to_string(),
                Segment::Path => "<path>".to_string(),
                Segment::ActualValue => "<value>".to_string(),
                Segment::ActualType => "<type>".to_string(),
                Segment::ActualLength => "<len>".to_string(),
            })
            .collect()
    }

    #[test]
    fn flags_mismatch_template_shape() {
        let factory = MessageFactory::new(TargetStyle::Flags);
        assert_eq!(
            literal_text(&factory.type_mismatch("boolean")),
            "--<path> must be of type boolean. Received <value> of type <type>"
        );
    }

    #[test]
    fn positional_arity_templates_drop_the_path() {
        let factory = MessageFactory::new(TargetStyle::Positional);
        assert_eq!(
            literal_text(&factory.length(2)),
            "requires exactly 2 arguments. Received <value> of length <len>"
        );
        assert_eq!(
            literal_text(&factory.range(2, 3)),
            "requires 2 to 3 arguments. Received <value> of length <len>"
        );
    }

    #[test]
    fn flags_arity_templates_keep_the_path() {
        let factory = MessageFactory::new(TargetStyle::Flags);
        assert_eq!(
            literal_text(&factory.length(2)),
            "--<path> must be array of length 2. Received <value> of length <len>"
        );
        assert_eq!(
            literal_text(&factory.range(1, 4)),
            "--<path> must be array with a length from 1 to 4. Received <value> of length <len>"
        );
    }
}
