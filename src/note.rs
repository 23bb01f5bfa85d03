//! Notes and the ordered list that stores the ones currently sounding.

use slotmap::SlotMap;

/// Routing tag selecting which instrument renders a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Channel(pub u8);

impl Channel {
    pub const HARMONICA: Channel = Channel(1);
    pub const BELL: Channel = Channel(2);
}

/// One sounding instance of a triggered key.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    /// The key that produced the note.
    pub id: i32,
    /// When the note was most recently pressed, in seconds.
    pub on_time: f64,
    /// When the note was most recently released. Anything below `on_time` means the
    /// note is still held.
    pub off_time: f64,
    /// Cleared by the render loop once the note is silent and released.
    pub active: bool,
    pub channel: Channel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteState {
    Held,
    Releasing,
}

impl Note {
    /// A note pressed at `time` and not yet released.
    pub fn new(id: i32, channel: Channel, time: f64) -> Self {
        Note {
            id,
            on_time: time,
            off_time: f64::NEG_INFINITY,
            active: true,
            channel,
        }
    }

    pub fn state(&self) -> NoteState {
        if self.on_time > self.off_time {
            NoteState::Held
        } else {
            NoteState::Releasing
        }
    }

    pub fn is_held(&self) -> bool {
        self.state() == NoteState::Held
    }
}

slotmap::new_key_type! {
    pub struct NoteKey;
}

struct ListEntry {
    it: Note,
    next: Option<NoteKey>,
    prev: Option<NoteKey>,
}

/// What [`NoteList::add`] did with a note.
#[derive(Debug, Clone, PartialEq)]
pub enum Admission {
    Added(NoteKey),
    /// The list was full, so its oldest released note made room.
    Replaced { key: NoteKey, stolen: Note },
    /// The list was full of held notes. The new note is handed back.
    Refused(Note),
}

impl Admission {
    /// The new note's key, unless it was refused.
    pub fn key(&self) -> Option<NoteKey> {
        match self {
            Admission::Added(key) | Admission::Replaced { key, .. } => Some(*key),
            Admission::Refused(_) => None,
        }
    }
}

/// Notes in the order they were first pressed, with constant-time removal.
///
/// Holds at most `max_notes` notes. Adding to a full list steals the oldest released
/// note; held notes are never stolen.
pub struct NoteList {
    head: Option<NoteKey>,
    tail: Option<NoteKey>,
    max_notes: usize,
    entries: SlotMap<NoteKey, ListEntry>,
}

impl NoteList {
    pub fn new(max_notes: usize) -> Self {
        NoteList {
            head: None,
            tail: None,
            max_notes: max_notes.max(1),
            entries: SlotMap::with_capacity_and_key(max_notes),
        }
    }

    pub fn add(&mut self, note: Note) -> Admission {
        let stolen = if self.is_full() {
            let oldest_released = self.keys().find(|key| !self.entries[*key].it.is_held());
            match oldest_released {
                Some(oldest) => self.remove(oldest),
                None => return Admission::Refused(note),
            }
        } else {
            None
        };

        let key = self.entries.insert(ListEntry {
            it: note,
            next: None,
            prev: self.tail,
        });
        if let Some(tail) = self.tail {
            self.entries[tail].next = Some(key);
        }
        if self.head.is_none() {
            self.head = Some(key);
        }
        self.tail = Some(key);

        match stolen {
            Some(stolen) => Admission::Replaced { key, stolen },
            None => Admission::Added(key),
        }
    }

    pub fn get(&self, key: NoteKey) -> Option<&Note> {
        self.entries.get(key).map(|entry| &entry.it)
    }

    pub fn get_mut(&mut self, key: NoteKey) -> Option<&mut Note> {
        self.entries.get_mut(key).map(|entry| &mut entry.it)
    }

    /// The first note in the list produced by key `id`.
    pub fn find_by_id(&self, id: i32) -> Option<NoteKey> {
        self.keys().find(|key| self.entries[*key].it.id == id)
    }

    pub fn find_by_id_mut(&mut self, id: i32) -> Option<&mut Note> {
        let key = self.find_by_id(id)?;
        self.get_mut(key)
    }

    pub fn remove(&mut self, key: NoteKey) -> Option<Note> {
        let entry = self.entries.remove(key)?;
        if let Some(prev) = entry.prev {
            self.entries[prev].next = entry.next;
        } else {
            self.head = entry.next;
        }
        if let Some(next) = entry.next {
            self.entries[next].prev = entry.prev;
        } else {
            self.tail = entry.prev;
        }
        Some(entry.it)
    }

    /// Keep only the notes for which `f` returns true, preserving their order.
    pub fn filter(&mut self, f: impl Fn(&Note) -> bool) {
        let mut key = self.head;
        while let Some(k) = key {
            let next = self.entries[k].next;
            if !f(&self.entries[k].it) {
                self.remove(k);
            }
            key = next;
        }
    }

    /// Drop every note whose `active` flag is cleared.
    pub fn prune_inactive(&mut self) {
        self.filter(|note| note.active);
    }

    /// Visit every note in order with mutable access.
    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut Note)) {
        let mut key = self.head;
        while let Some(k) = key {
            let entry = &mut self.entries[k];
            f(&mut entry.it);
            key = entry.next;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Note> + '_ {
        self.keys().map(move |key| &self.entries[key].it)
    }

    fn keys(&self) -> impl Iterator<Item = NoteKey> + '_ {
        std::iter::successors(self.head, move |key| self.entries[*key].next)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_notes(&self) -> usize {
        self.max_notes
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.max_notes
    }
}
