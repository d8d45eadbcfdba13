use crate::error::RenderError;

/// Default ramp: dense glyphs for dark cells, light punctuation for bright ones.
pub const CHARSET_DEFAULT: &str = "@#S%?*+;:,.";

/// 10 caractères, compact, bon contraste (sombre → clair sur fond noir).
pub const CHARSET_COMPACT: &str = " .:-=+*#%@";

/// 70 caractères, Paul Bourke extended, bon équilibre.
pub const CHARSET_STANDARD: &str =
    " .'`^\",:;Il!i><~+_-?][}{1)(|/tfjrxnuvczXYUJCLQ0OZmwqpdbkhao*#MW&8%B@$";

/// 70 caractères, Paul Bourke, résolution maximale (inversé: dense→clair).
pub const CHARSET_DETAILED: &str =
    "$@B%8&WM#*oahkbdpqwmZO0QLCJUYXzcvunxrjft/\\|()1{}[]?-_+~<>i!lI;:,\"^`'. ";

/// Blocs Unicode en pseudo-pixels.
pub const CHARSET_BLOCKS: &str = "█▓▒░ ";

/// Named ramps selectable with `--preset`.
pub const PRESETS: &[(&str, &str)] = &[
    ("binary", "10"),
    ("matrix", "MATRIX"),
    ("blocks", CHARSET_BLOCKS),
    ("simple", "# "),
    ("detailed", CHARSET_DETAILED),
    ("dots", "●•°· "),
    ("cards", "♠♣♥♦"),
    ("compact", CHARSET_COMPACT),
    ("standard", CHARSET_STANDARD),
];

/// Look up a preset ramp by name, ignoring case.
///
/// # Example
/// ```
/// use ag_core::charset::preset;
/// assert_eq!(preset("BINARY"), Some("10"));
/// assert_eq!(preset("nope"), None);
/// ```
#[must_use]
pub fn preset(name: &str) -> Option<&'static str> {
    PRESETS
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, chars)| *chars)
}

/// Ordered character lookup table keyed by luminance.
///
/// Index 0 is selected by luminance 0.0, the last index by luminance 1.0.
/// Characters are kept in input order; duplicates are allowed.
///
/// # Example
/// ```
/// use ag_core::charset::CharacterRamp;
/// let ramp = CharacterRamp::new(" .:#@").unwrap();
/// assert_eq!(ramp.len(), 5);
/// assert_eq!(ramp.first(), ' ');
/// assert_eq!(ramp.last(), '@');
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharacterRamp {
    chars: Vec<char>,
}

impl CharacterRamp {
    /// Build a ramp from a string, one character per step.
    ///
    /// # Errors
    /// Returns [`RenderError::EmptyRamp`] if `charset` is empty.
    pub fn new(charset: &str) -> Result<Self, RenderError> {
        Self::from_chars(charset.chars().collect())
    }

    /// Build a ramp from an explicit character list.
    ///
    /// # Errors
    /// Returns [`RenderError::EmptyRamp`] if `chars` is empty.
    pub fn from_chars(chars: Vec<char>) -> Result<Self, RenderError> {
        if chars.is_empty() {
            return Err(RenderError::EmptyRamp);
        }
        Ok(Self { chars })
    }

    /// Same characters, opposite order.
    ///
    /// # Example
    /// ```
    /// use ag_core::charset::CharacterRamp;
    /// let ramp = CharacterRamp::new("ab").unwrap().reversed();
    /// assert_eq!(ramp.as_slice(), &['b', 'a']);
    /// ```
    #[must_use]
    pub fn reversed(&self) -> Self {
        let mut chars = self.chars.clone();
        chars.reverse();
        Self { chars }
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[char] {
        &self.chars
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Always `false`; an empty ramp cannot be constructed.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Character selected by luminance 0.0.
    #[must_use]
    pub fn first(&self) -> char {
        self.chars[0]
    }

    /// Character selected by luminance 1.0.
    #[must_use]
    pub fn last(&self) -> char {
        self.chars[self.chars.len() - 1]
    }
}

impl Default for CharacterRamp {
    fn default() -> Self {
        Self {
            chars: CHARSET_DEFAULT.chars().collect(),
        }
    }
}
