//! The note list shared between the input thread and the audio thread.

use parking_lot::{Mutex, MutexGuard};

use crate::note::{Admission, Channel, Note, NoteList, NoteState};

/// What a key event did to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// A new note was created.
    Pressed,
    /// A releasing note was pressed again and is held once more.
    Repressed,
    /// A held note started its release.
    Released,
    /// Nothing changed: the key is already in the requested state, or has no note.
    Unchanged,
}

/// Mutex-guarded [`NoteList`].
///
/// Every operation takes the lock for its whole duration, so a note's timestamps are
/// never observed half-written and no two notes share an id.
pub struct NoteRegistry {
    notes: Mutex<NoteList>,
}

impl NoteRegistry {
    pub fn new(max_notes: usize) -> Self {
        Self {
            notes: Mutex::new(NoteList::new(max_notes)),
        }
    }

    /// Exclusive access for compound operations such as render-and-prune.
    pub fn lock(&self) -> MutexGuard<'_, NoteList> {
        self.notes.lock()
    }

    /// Like [`NoteRegistry::lock`], but gives up instead of waiting.
    pub fn try_lock(&self) -> Option<MutexGuard<'_, NoteList>> {
        self.notes.try_lock()
    }

    /// Key `id` is down at `time`.
    ///
    /// Creates a note on `channel` if the key has none, restarts a releasing note, and
    /// leaves a held note alone. A restarted note keeps its original channel. When the
    /// list is full of held notes the press is ignored.
    pub fn key_down(&self, id: i32, channel: Channel, time: f64) -> Transition {
        let mut notes = self.notes.lock();
        let (transition, admission) = match notes.find_by_id(id) {
            None => {
                let admission = notes.add(Note::new(id, channel, time));
                let transition = match admission {
                    Admission::Refused(_) => Transition::Unchanged,
                    _ => Transition::Pressed,
                };
                (transition, Some(admission))
            }
            Some(key) => match notes.get_mut(key) {
                Some(note) if note.state() == NoteState::Releasing => {
                    note.on_time = time;
                    note.active = true;
                    (Transition::Repressed, None)
                }
                _ => (Transition::Unchanged, None),
            },
        };
        drop(notes);

        match admission {
            Some(Admission::Replaced { stolen, .. }) => {
                tracing::debug!(id = stolen.id, "note list full, stole oldest released note")
            }
            Some(Admission::Refused(_)) => {
                tracing::debug!(id, "note list full of held notes, press ignored")
            }
            _ => {}
        }
        match transition {
            Transition::Pressed => tracing::debug!(id, channel = channel.0, time, "note pressed"),
            Transition::Repressed => tracing::debug!(id, time, "note repressed"),
            _ => {}
        }
        transition
    }

    /// Key `id` is up at `time`. Starts the release of a held note.
    pub fn key_up(&self, id: i32, time: f64) -> Transition {
        let mut notes = self.notes.lock();
        let transition = match notes.find_by_id_mut(id) {
            Some(note) if note.is_held() => {
                note.off_time = time;
                Transition::Released
            }
            _ => Transition::Unchanged,
        };
        drop(notes);

        if transition == Transition::Released {
            tracing::debug!(id, time, "note released");
        }
        transition
    }

    /// A copy of key `id`'s note, if it has one.
    pub fn find_by_id(&self, id: i32) -> Option<Note> {
        let notes = self.notes.lock();
        let key = notes.find_by_id(id)?;
        notes.get(key).cloned()
    }

    pub fn prune_inactive(&self) {
        self.notes.lock().prune_inactive();
    }

    /// Number of notes currently tracked. A snapshot for display only.
    pub fn len(&self) -> usize {
        self.notes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies of all notes in press order.
    pub fn snapshot(&self) -> Vec<Note> {
        self.notes.lock().iter().cloned().collect()
    }
}
