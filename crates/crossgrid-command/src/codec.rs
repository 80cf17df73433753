//! Field encoding for log records.
//!
//! All integers are little-endian. Text is a `u16` byte length followed by
//! UTF-8; optional values are a `u8` presence flag followed by the value;
//! characters are their `u32` scalar value; lists are a `u16` count followed
//! by the items. There is no padding and no self-describing schema.

use crossgrid_core::{
    Anchor, AnswerOffset, CellKinds, ClueCellHandling, ClueId, Confidence, Coord, CrosswordType,
    CrosswordTypeInfo, ErrorType, LetterContent, Orientation, Size,
};
use crossgrid_grid::{ClueProperties, ClueSnapshot, ImageSnapshot, LetterState, Property};

use crate::LogError;

/// Nesting limit for records with children.
const MAX_DEPTH: usize = 64;

/// Appends encoded fields to a byte buffer.
#[derive(Debug)]
pub(crate) struct RecordWriter<'a> {
    buf: &'a mut Vec<u8>,
}

impl<'a> RecordWriter<'a> {
    pub(crate) fn new(buf: &'a mut Vec<u8>) -> Self {
        Self { buf }
    }

    pub(crate) fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub(crate) fn u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub(crate) fn i16(&mut self, v: i16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub(crate) fn char(&mut self, c: char) {
        self.buf.extend_from_slice(&u32::from(c).to_le_bytes());
    }

    pub(crate) fn bool(&mut self, v: bool) {
        self.u8(u8::from(v));
    }

    /// Writes a `u16` length prefix.
    pub(crate) fn len(&mut self, what: &'static str, len: usize) -> Result<(), LogError> {
        let len16 = u16::try_from(len).map_err(|_| LogError::TooLong { what, len })?;
        self.u16(len16);
        Ok(())
    }

    pub(crate) fn text(&mut self, s: &str) -> Result<(), LogError> {
        self.len("text", s.len())?;
        self.buf.extend_from_slice(s.as_bytes());
        Ok(())
    }

    pub(crate) fn opt_char(&mut self, c: Option<char>) {
        self.bool(c.is_some());
        if let Some(c) = c {
            self.char(c);
        }
    }

    pub(crate) fn opt_u16(&mut self, v: Option<u16>) {
        self.bool(v.is_some());
        if let Some(v) = v {
            self.u16(v);
        }
    }

    pub(crate) fn coord(&mut self, c: Coord) {
        self.u16(c.x);
        self.u16(c.y);
    }

    pub(crate) fn size(&mut self, s: Size) {
        self.u16(s.width);
        self.u16(s.height);
    }

    pub(crate) fn clue_id(&mut self, id: ClueId) {
        self.coord(id.coord);
        self.u8(id.orientation.tag());
    }

    pub(crate) fn properties(&mut self, props: &ClueProperties) -> Result<(), LogError> {
        self.clue_id(props.id());
        self.u8(props.offset.tag());
        self.text(props.answer())
    }

    pub(crate) fn letter_state(&mut self, state: LetterState) {
        self.opt_char(state.current);
        self.u8(state.confidence.tag());
        self.opt_u16(state.solution_index);
    }

    pub(crate) fn snapshot(&mut self, snapshot: &ClueSnapshot) -> Result<(), LogError> {
        self.properties(&snapshot.properties)?;
        self.text(&snapshot.text)?;
        self.len("letter list", snapshot.letters.len())?;
        for &state in &snapshot.letters {
            self.letter_state(state);
        }
        Ok(())
    }

    pub(crate) fn letter_states(
        &mut self,
        states: &[(Coord, LetterState)],
    ) -> Result<(), LogError> {
        self.len("letter list", states.len())?;
        for &(coord, state) in states {
            self.coord(coord);
            self.letter_state(state);
        }
        Ok(())
    }

    pub(crate) fn image(&mut self, image: &ImageSnapshot) -> Result<(), LogError> {
        self.coord(image.anchor);
        self.size(image.size);
        self.text(&image.url)
    }

    pub(crate) fn type_info(&mut self, info: &CrosswordTypeInfo) {
        self.u8(info.crossword_type.tag());
        self.u8(info.letter_content.tag());
        self.u8(info.clue_cell_handling.tag());
        self.u8(info.allowed_cells.bits());
        self.u8(info.min_answer_length);
        self.bool(info.rotational_symmetry);
    }
}

/// Reads encoded fields from a byte buffer, tracking the byte offset.
#[derive(Debug, Clone)]
pub(crate) struct RecordReader<'a> {
    data: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> RecordReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            depth: 0,
        }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Runs `f` one nesting level deeper.
    pub(crate) fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, LogError>,
    ) -> Result<T, LogError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.invalid("nesting depth"));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], LogError> {
        let bytes = self
            .data
            .get(self.pos..self.pos + N)
            .and_then(|s| <[u8; N]>::try_from(s).ok())
            .ok_or(LogError::UnexpectedEnd { offset: self.pos })?;
        self.pos += N;
        Ok(bytes)
    }

    fn invalid(&self, what: &'static str) -> LogError {
        LogError::InvalidValue {
            what,
            offset: self.pos,
        }
    }

    /// Decodes a one-byte tag with `parse`, reporting `what` on failure.
    fn tag<T>(
        &mut self,
        what: &'static str,
        parse: impl FnOnce(u8) -> Option<T>,
    ) -> Result<T, LogError> {
        let start = self.pos;
        let tag = self.u8()?;
        parse(tag).ok_or(LogError::InvalidValue {
            what,
            offset: start,
        })
    }

    pub(crate) fn u8(&mut self) -> Result<u8, LogError> {
        Ok(self.take::<1>()?[0])
    }

    pub(crate) fn u16(&mut self) -> Result<u16, LogError> {
        Ok(u16::from_le_bytes(self.take()?))
    }

    pub(crate) fn i16(&mut self) -> Result<i16, LogError> {
        Ok(i16::from_le_bytes(self.take()?))
    }

    pub(crate) fn char(&mut self) -> Result<char, LogError> {
        let start = self.pos;
        let scalar = u32::from_le_bytes(self.take()?);
        char::from_u32(scalar).ok_or(LogError::InvalidValue {
            what: "character",
            offset: start,
        })
    }

    pub(crate) fn bool(&mut self) -> Result<bool, LogError> {
        self.tag("flag", |v| match v {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        })
    }

    pub(crate) fn len(&mut self) -> Result<usize, LogError> {
        Ok(usize::from(self.u16()?))
    }

    pub(crate) fn text(&mut self) -> Result<String, LogError> {
        let start = self.pos;
        let len = self.len()?;
        let bytes = self
            .data
            .get(self.pos..self.pos + len)
            .ok_or(LogError::UnexpectedEnd { offset: self.pos })?;
        let text = std::str::from_utf8(bytes)
            .map_err(|_| LogError::InvalidText { offset: start })?
            .to_owned();
        self.pos += len;
        Ok(text)
    }

    pub(crate) fn opt_char(&mut self) -> Result<Option<char>, LogError> {
        if self.bool()? {
            Ok(Some(self.char()?))
        } else {
            Ok(None)
        }
    }

    pub(crate) fn opt_u16(&mut self) -> Result<Option<u16>, LogError> {
        if self.bool()? {
            Ok(Some(self.u16()?))
        } else {
            Ok(None)
        }
    }

    pub(crate) fn coord(&mut self) -> Result<Coord, LogError> {
        Ok(Coord::new(self.u16()?, self.u16()?))
    }

    pub(crate) fn size(&mut self) -> Result<Size, LogError> {
        Ok(Size::new(self.u16()?, self.u16()?))
    }

    pub(crate) fn orientation(&mut self) -> Result<Orientation, LogError> {
        self.tag("orientation", Orientation::from_tag)
    }

    pub(crate) fn clue_id(&mut self) -> Result<ClueId, LogError> {
        let coord = self.coord()?;
        Ok(ClueId::new(coord, self.orientation()?))
    }

    pub(crate) fn anchor(&mut self) -> Result<Anchor, LogError> {
        self.tag("anchor", Anchor::from_tag)
    }

    pub(crate) fn confidence(&mut self) -> Result<Confidence, LogError> {
        self.tag("confidence", Confidence::from_tag)
    }

    pub(crate) fn property(&mut self) -> Result<Property, LogError> {
        self.tag("property", Property::from_tag)
    }

    pub(crate) fn error_type(&mut self) -> Result<ErrorType, LogError> {
        let start = self.pos;
        let bits = self.u16()?;
        ErrorType::from_bits(bits).ok_or(LogError::InvalidValue {
            what: "error flags",
            offset: start,
        })
    }

    pub(crate) fn properties(&mut self) -> Result<ClueProperties, LogError> {
        let id = self.clue_id()?;
        let offset = self.tag("answer offset", AnswerOffset::from_tag)?;
        let answer = self.text()?;
        Ok(ClueProperties::new(id.coord, id.orientation, offset, answer))
    }

    pub(crate) fn letter_state(&mut self) -> Result<LetterState, LogError> {
        Ok(LetterState {
            current: self.opt_char()?,
            confidence: self.confidence()?,
            solution_index: self.opt_u16()?,
        })
    }

    pub(crate) fn snapshot(&mut self) -> Result<ClueSnapshot, LogError> {
        let properties = self.properties()?;
        let text = self.text()?;
        let count = self.len()?;
        let letters = (0..count)
            .map(|_| self.letter_state())
            .collect::<Result<_, _>>()?;
        Ok(ClueSnapshot {
            properties,
            text,
            letters,
        })
    }

    pub(crate) fn letter_states(&mut self) -> Result<Vec<(Coord, LetterState)>, LogError> {
        let count = self.len()?;
        (0..count)
            .map(|_| Ok((self.coord()?, self.letter_state()?)))
            .collect()
    }

    pub(crate) fn image(&mut self) -> Result<ImageSnapshot, LogError> {
        Ok(ImageSnapshot {
            anchor: self.coord()?,
            size: self.size()?,
            url: self.text()?,
        })
    }

    pub(crate) fn type_info(&mut self) -> Result<CrosswordTypeInfo, LogError> {
        let crossword_type = self.tag("crossword type", CrosswordType::from_tag)?;
        let letter_content = self.tag("letter content", LetterContent::from_tag)?;
        let clue_cell_handling = self.tag("clue cell handling", ClueCellHandling::from_tag)?;
        let allowed_cells = self.tag("cell kinds", CellKinds::from_bits)?;
        Ok(CrosswordTypeInfo {
            crossword_type,
            letter_content,
            clue_cell_handling,
            allowed_cells,
            min_answer_length: self.u8()?,
            rotational_symmetry: self.bool()?,
        })
    }
}
