use strum_macros::{AsRefStr, Display, EnumIter};

/// Character encodings the decoder understands.
///
/// `Raw` is never detected. It maps every byte to the code point of the same
/// value and exists for callers that force it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter)]
pub enum Encoding {
    /// 7-bit US-ASCII.
    #[strum(serialize = "US-ASCII")]
    Ascii,
    /// UTF-8.
    #[strum(serialize = "UTF-8")]
    Utf8,
    /// ISO-2022 escape-switched 7-bit encoding.
    #[strum(serialize = "ISO-2022")]
    Iso2022,
    /// Classic Mac OS Roman.
    #[strum(serialize = "MacRoman")]
    MacRoman,
    /// Windows code page 1252.
    #[strum(serialize = "windows-1252")]
    Windows1252,
    /// ISO-8859-1.
    #[strum(serialize = "ISO-8859-1")]
    Latin1,
    /// Byte value equals code point.
    #[strum(serialize = "raw")]
    Raw,
}

impl Encoding {
    /// Map a charset label, as found in a declaration, to an encoding.
    ///
    /// Matching is case-insensitive. Families are matched by prefix, so
    /// `iso-8859-15` maps to `Latin1` and `windows-1250` to `Windows1252`.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim().to_ascii_lowercase();
        match label.as_str() {
            "utf-8" | "utf8" => Some(Self::Utf8),
            "us-ascii" | "ascii" => Some(Self::Ascii),
            "latin1" | "latin-1" | "l1" => Some(Self::Latin1),
            "cp1252" | "x-cp1252" => Some(Self::Windows1252),
            "raw" => Some(Self::Raw),
            l if l.starts_with("iso-2022") => Some(Self::Iso2022),
            l if l.starts_with("iso-8859") || l.starts_with("iso8859") => Some(Self::Latin1),
            l if l.starts_with("windows") => Some(Self::Windows1252),
            l if l.starts_with("mac") || l == "x-mac-roman" => Some(Self::MacRoman),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_map_to_families() {
        assert_eq!(Encoding::from_label("UTF-8"), Some(Encoding::Utf8));
        assert_eq!(Encoding::from_label("utf8"), Some(Encoding::Utf8));
        assert_eq!(Encoding::from_label("iso-8859-15"), Some(Encoding::Latin1));
        assert_eq!(Encoding::from_label("ISO-2022-JP"), Some(Encoding::Iso2022));
        assert_eq!(Encoding::from_label("windows-1250"), Some(Encoding::Windows1252));
        assert_eq!(Encoding::from_label("macintosh"), Some(Encoding::MacRoman));
        assert_eq!(Encoding::from_label("us-ascii"), Some(Encoding::Ascii));
        assert_eq!(Encoding::from_label("koi8-r"), None);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Encoding::Utf8.to_string(), "UTF-8");
        assert_eq!(Encoding::Windows1252.as_ref(), "windows-1252");
    }
}
