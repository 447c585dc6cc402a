use crate::error::AtlasError;

pub const DEFAULT_NAME_FORMAT: &str = "atlas-{index:02}.{ext}";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    /// 1-based bin number, zero-padded to the given width
    Index(usize),
    Extension,
}

/// File name template for atlas images.
///
/// Placeholders: `{index}` the 1-based atlas number, `{index:0N}` the same
/// zero-padded to N digits, `{ext}` the output format extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTemplate {
    segments: Vec<Segment>,
}

impl NameTemplate {
    pub fn parse(template: &str) -> Result<Self, AtlasError> {
        let invalid = || AtlasError::InvalidNameTemplate(template.to_string());
        let mut segments = Vec::new();
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            if open > 0 {
                segments.push(Segment::Literal(rest[..open].to_string()));
            }
            let close = rest[open..].find('}').ok_or_else(invalid)? + open;
            let placeholder = &rest[open + 1..close];

            let segment = match placeholder.split_once(':') {
                None if placeholder == "index" => Segment::Index(0),
                None if placeholder == "ext" => Segment::Extension,
                Some(("index", width)) => {
                    Segment::Index(width.parse::<usize>().map_err(|_e| invalid())?)
                }
                _ => return Err(invalid()),
            };
            segments.push(segment);
            rest = &rest[close + 1..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        if !segments.iter().any(|s| matches!(s, Segment::Index(_))) {
            return Err(invalid());
        }

        Ok(Self { segments })
    }

    /// File name of the bin with zero-based `bin_index`.
    pub fn render(&self, bin_index: usize, extension: &str) -> String {
        let number = bin_index + 1;
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(text) => text.clone(),
                Segment::Index(width) => format!("{:0width$}", number, width = *width),
                Segment::Extension => extension.to_string(),
            })
            .collect()
    }
}

impl Default for NameTemplate {
    fn default() -> Self {
        Self {
            segments: vec![
                Segment::Literal("atlas-".to_string()),
                Segment::Index(2),
                Segment::Literal(".".to_string()),
                Segment::Extension,
            ],
        }
    }
}
