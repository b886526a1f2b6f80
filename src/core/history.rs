/// Command recall buffer for the input line.
///
/// Entries are append-only, in send order. The cursor tracks which past entry
/// is currently recalled; `None` means the user is not browsing. Only ever
/// touched from the foreground context, so no synchronization.
#[derive(Debug, Clone, Default)]
pub struct CommandHistory {
    entries: Vec<String>,
    cursor: Option<usize>,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sent command and leave browsing mode.
    pub fn append(&mut self, text: impl Into<String>) {
        self.entries.push(text.into());
        self.cursor = None;
    }

    /// Step to an older entry.
    ///
    /// Clamps at the oldest entry: repeated calls at the top keep returning
    /// it rather than wrapping around. Returns `None` only when the history
    /// is empty.
    pub fn navigate_up(&mut self) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        let index = match self.cursor {
            None => self.entries.len() - 1,
            Some(0) => 0,
            Some(i) => i - 1,
        };
        self.cursor = Some(index);
        Some(&self.entries[index])
    }

    /// Step to a newer entry.
    ///
    /// At the newest entry, returns `Some("")` (clear the input line) and
    /// leaves browsing mode. Returns `None` when the history is empty or the
    /// user is not browsing.
    pub fn navigate_down(&mut self) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        match self.cursor {
            None => None,
            Some(i) if i == self.entries.len() - 1 => {
                self.cursor = None;
                Some("")
            }
            Some(i) => {
                self.cursor = Some(i + 1);
                Some(&self.entries[i + 1])
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the user is currently recalling a past entry.
    pub fn is_browsing(&self) -> bool {
        self.cursor.is_some()
    }
}
