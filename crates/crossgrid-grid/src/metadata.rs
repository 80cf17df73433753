/// Descriptive text attached to a crossword.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Metadata {
    /// Puzzle title.
    pub title: String,
    /// Puzzle author.
    pub author: String,
    /// Copyright line.
    pub copyright: String,
    /// Free-form notes.
    pub notes: String,
}

impl Metadata {
    /// Returns the text of `property`.
    #[must_use]
    pub fn get(&self, property: Property) -> &str {
        match property {
            Property::Title => &self.title,
            Property::Author => &self.author,
            Property::Copyright => &self.copyright,
            Property::Notes => &self.notes,
        }
    }

    pub(crate) fn get_mut(&mut self, property: Property) -> &mut String {
        match property {
            Property::Title => &mut self.title,
            Property::Author => &mut self.author,
            Property::Copyright => &mut self.copyright,
            Property::Notes => &mut self.notes,
        }
    }
}

/// One field of [`Metadata`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[repr(u8)]
pub enum Property {
    /// [`Metadata::title`].
    #[display("title")]
    Title = 0,
    /// [`Metadata::author`].
    #[display("author")]
    Author = 1,
    /// [`Metadata::copyright`].
    #[display("copyright")]
    Copyright = 2,
    /// [`Metadata::notes`].
    #[display("notes")]
    Notes = 3,
}

impl Property {
    /// Returns the wire tag.
    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Parses a wire tag.
    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Title),
            1 => Some(Self::Author),
            2 => Some(Self::Copyright),
            3 => Some(Self::Notes),
            _ => None,
        }
    }
}
