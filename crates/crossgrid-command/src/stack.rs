//! The undo/redo stack.

use crossgrid_grid::Grid;
use log::{debug, trace, warn};

use crate::{Command, CommandLog, LogError, StackError, codec::RecordReader};

/// Applied commands with an undo cursor, mirrored into a [`CommandLog`].
///
/// Commands before the cursor are applied to the grid; commands from the
/// cursor on were undone and can be redone until the next push cuts them off.
#[derive(Debug, Clone, Default)]
pub struct CommandStack {
    commands: Vec<Command>,
    cursor: usize,
    clean_index: Option<usize>,
    log: CommandLog,
}

impl CommandStack {
    /// Creates an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a stack from stored log bytes by replaying every record onto
    /// `grid`, then undoing back to the stored cursor.
    ///
    /// The resulting position is marked clean.
    ///
    /// # Errors
    ///
    /// Returns a [`LogError`] if the log is malformed or a record cannot be
    /// applied. All commands replayed so far are undone before returning, so
    /// `grid` is left as it was.
    pub fn create_from_data(grid: &mut Grid, data: &[u8]) -> Result<Self, LogError> {
        let mut stack = Self::new();
        let mut reader = RecordReader::new(data);
        let cursor = reader.u16()?;
        let mut index = 0;
        while !reader.is_at_end() {
            trace!("replaying record {index} at byte {}", reader.position());
            let replayed = Command::read(&mut reader).and_then(|command| {
                stack
                    .push_with(grid, command, false)
                    .map_err(|e| LogError::ReplayRejected {
                        index,
                        reason: e.to_string(),
                    })
            });
            if let Err(e) = replayed {
                warn!("log replay aborted: {e}");
                stack.unwind(grid);
                return Err(e);
            }
            index += 1;
        }

        if usize::from(cursor) > stack.len() {
            let e = LogError::CursorOutOfRange {
                cursor,
                records: stack.len(),
            };
            warn!("log replay aborted: {e}");
            stack.unwind(grid);
            return Err(e);
        }
        while stack.cursor > usize::from(cursor) {
            let index = stack.cursor - 1;
            if let Err(e) = stack.undo(grid) {
                let e = LogError::ReplayRejected {
                    index,
                    reason: e.to_string(),
                };
                warn!("log replay aborted: {e}");
                stack.unwind(grid);
                return Err(e);
            }
        }
        stack.clean_index = Some(stack.cursor);
        debug!(
            "replayed {} commands, cursor at {}",
            stack.len(),
            stack.cursor
        );
        Ok(stack)
    }

    /// Undoes every applied command and empties the stack.
    fn unwind(&mut self, grid: &mut Grid) {
        while self.cursor > 0 {
            self.cursor -= 1;
            let command = &self.commands[self.cursor];
            if let Err(e) = command.undo(grid) {
                warn!("cannot undo {} while unwinding: {e}", command.kind());
            }
        }
        self.clear();
    }

    /// Checks and applies `command`, then records it.
    ///
    /// Commands past the cursor are discarded. If the command continues the
    /// one on top of the stack (see [`Command::merge_with`]) the two become
    /// one undo step.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::Rejected`] if the check fails,
    /// [`StackError::LogFull`] if the log cannot take another record, and
    /// [`StackError::Log`] if the command cannot be encoded. In all these
    /// cases nothing changes.
    pub fn push(&mut self, grid: &mut Grid, command: Command) -> Result<(), StackError> {
        self.push_with(grid, command, true)
    }

    fn push_with(
        &mut self,
        grid: &mut Grid,
        command: Command,
        allow_merge: bool,
    ) -> Result<(), StackError> {
        command.check(grid)?;
        let record = command.encode()?;

        let merged = match self.cursor.checked_sub(1) {
            Some(top) if allow_merge => {
                let mut merged = self.commands[top].clone();
                if merged.merge_with(&command) {
                    let record = merged.encode()?;
                    Some((merged, record))
                } else {
                    None
                }
            }
            _ => None,
        };
        if merged.is_none() && self.cursor >= usize::from(u16::MAX) {
            return Err(StackError::LogFull);
        }

        command.redo(grid)?;

        self.commands.truncate(self.cursor);
        self.log.truncate(self.cursor);
        if self.clean_index.is_some_and(|clean| clean > self.cursor) {
            self.clean_index = None;
        }

        if let Some((merged, record)) = merged {
            debug!("merged {} into the top of the stack", command.kind());
            self.commands[self.cursor - 1] = merged;
            self.log.overwrite_last(&record);
            if self.clean_index == Some(self.cursor) {
                self.clean_index = None;
            }
        } else {
            debug!("pushed {} at {}", command.kind(), self.cursor);
            self.commands.push(command);
            if !self.log.append_at(self.cursor, &record) {
                self.rebuild_log();
            }
            self.cursor += 1;
        }
        self.sync_cursor();
        Ok(())
    }

    fn rebuild_log(&mut self) {
        self.log.reset();
        for (index, command) in self.commands.iter().enumerate() {
            match command.encode() {
                Ok(record) => {
                    self.log.append_at(index, &record);
                }
                Err(e) => {
                    warn!("cannot re-encode {}: {e}", command.kind());
                    return;
                }
            }
        }
    }

    fn sync_cursor(&mut self) {
        // Pushes stop at u16::MAX records, so the cursor always fits.
        self.log
            .set_cursor(u16::try_from(self.cursor).unwrap_or(u16::MAX));
    }

    /// Reverts the command before the cursor.
    ///
    /// Returns `Ok(false)` if there is nothing to undo.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::Grid`] if the grid refuses the reversal; the
    /// cursor does not move.
    pub fn undo(&mut self, grid: &mut Grid) -> Result<bool, StackError> {
        let Some(index) = self.cursor.checked_sub(1) else {
            return Ok(false);
        };
        let command = &self.commands[index];
        command.undo(grid)?;
        debug!("undid {} at {index}", command.kind());
        self.cursor = index;
        self.sync_cursor();
        Ok(true)
    }

    /// Reapplies the command at the cursor.
    ///
    /// Returns `Ok(false)` if there is nothing to redo.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::Grid`] if the grid refuses the change; the
    /// cursor does not move.
    pub fn redo(&mut self, grid: &mut Grid) -> Result<bool, StackError> {
        let Some(command) = self.commands.get(self.cursor) else {
            return Ok(false);
        };
        command.redo(grid)?;
        debug!("redid {} at {}", command.kind(), self.cursor);
        self.cursor += 1;
        self.sync_cursor();
        Ok(true)
    }

    /// Returns `true` if a command can be undone.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Returns `true` if a command can be redone.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor < self.commands.len()
    }

    /// Returns the label of the command [`CommandStack::undo`] would revert.
    #[must_use]
    pub fn undo_text(&self) -> Option<String> {
        let index = self.cursor.checked_sub(1)?;
        self.commands.get(index).map(Command::text)
    }

    /// Returns the label of the command [`CommandStack::redo`] would apply.
    #[must_use]
    pub fn redo_text(&self) -> Option<String> {
        self.commands.get(self.cursor).map(Command::text)
    }

    /// Returns the undo cursor: the number of applied commands.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Returns the number of commands, applied or undone.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if the stack holds no commands.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Returns all commands, oldest first.
    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Returns the cursor position last marked clean, if it is still
    /// reachable.
    #[must_use]
    pub fn clean_index(&self) -> Option<usize> {
        self.clean_index
    }

    /// Returns `true` if the cursor is at the position last marked clean.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.clean_index == Some(self.cursor)
    }

    /// Marks the current position clean, typically after saving.
    pub fn set_clean(&mut self) {
        self.clean_index = Some(self.cursor);
    }

    /// Forgets all commands without touching the grid.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.cursor = 0;
        self.clean_index = None;
        self.log.reset();
    }

    /// Returns the log mirroring this stack.
    #[must_use]
    pub fn log(&self) -> &CommandLog {
        &self.log
    }

    /// Returns the log bytes, ready to be stored.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.log.bytes()
    }
}
