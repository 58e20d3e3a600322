use crate::{region::Region, syntax::Syntax, token::Token};
use regex::Regex;

/// A piece of the template being rewritten.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Segment {
    /// Untouched text from the source.
    Raw(Region),
    /// A reference to one format of one token.
    Marker {
        /// Position of the token in allocation order.
        token: usize,
        /// Position of the format within the token's query.
        format: usize,
    },
}

/// Rewrites format occurrences in a template into token references.
///
/// Rules only ever match against source text that no earlier rule has
/// claimed, so the markers produced along the way are never rewritten again.
pub struct Rewriter<'source> {
    /// Reference to the source text.
    source: &'source str,
    /// The template as it stands after the rules applied so far.
    segments: Vec<Segment>,
}

impl<'source> Rewriter<'source> {
    /// Create a new [`Rewriter`] over the given source text.
    pub fn new(source: &'source str) -> Self {
        let segments = if source.is_empty() {
            vec![]
        } else {
            vec![Segment::Raw((0..source.len()).into())]
        };

        Self { source, segments }
    }

    /// Replace every match of `matcher` in the remaining raw text with a
    /// marker for the given token and format.
    ///
    /// Empty matches are ignored. Returns the number of markers inserted.
    pub fn apply(&mut self, matcher: &Regex, token: usize, format: usize) -> usize {
        let mut count = 0;
        let mut segments = Vec::with_capacity(self.segments.len());

        for segment in std::mem::take(&mut self.segments) {
            let region = match segment {
                Segment::Raw(region) => region,
                marker => {
                    segments.push(marker);
                    continue;
                }
            };

            let text = &self.source[region];
            let mut cursor = 0;
            for found in matcher.find_iter(text) {
                if found.is_empty() {
                    continue;
                }
                if found.start() > cursor {
                    segments.push(Segment::Raw(region.slice(cursor..found.start())));
                }
                segments.push(Segment::Marker { token, format });
                cursor = found.end();
                count += 1;
            }
            if cursor < text.len() {
                segments.push(Segment::Raw(region.slice(cursor..text.len())));
            }
        }

        self.segments = segments;
        count
    }

    /// Return the segments produced so far.
    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Join the segments into the rewritten template text.
    pub fn finish(self, tokens: &[Token], syntax: &Syntax) -> String {
        let mut buffer = String::with_capacity(self.source.len());

        for segment in self.segments {
            match segment {
                Segment::Raw(region) => buffer.push_str(region.literal(self.source)),
                Segment::Marker { token, format } => {
                    let token = &tokens[token];
                    let rule = &token.query.formats()[format];
                    buffer.push_str(&syntax.reference(&token.id, rule.name()));
                }
            }
        }

        buffer
    }
}
