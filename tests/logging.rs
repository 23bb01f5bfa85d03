//! Every event the engine logs is emitted with the note list unlocked, so a slow
//! subscriber can never stall the audio thread.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use key_synth::note::Channel;
use key_synth::registry::Transition;
use key_synth::{Config, Synth};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

#[derive(Default)]
struct Counts {
    events: AtomicUsize,
    while_locked: AtomicUsize,
}

/// Counts events, and how many of them arrived while the synth's notes were locked.
struct LockCheck {
    synth: Arc<Synth>,
    counts: Arc<Counts>,
}

impl<S: Subscriber> Layer<S> for LockCheck {
    fn on_event(&self, _event: &Event<'_>, _ctx: Context<'_, S>) {
        self.counts.events.fetch_add(1, Ordering::Relaxed);
        if self.synth.notes().try_lock().is_none() {
            self.counts.while_locked.fetch_add(1, Ordering::Relaxed);
        }
    }
}

#[test]
fn events_are_logged_outside_the_note_lock() {
    let cfg = Config {
        max_notes: 2,
        ..Default::default()
    };
    let synth = Arc::new(Synth::new(cfg).unwrap());
    let counts = Arc::new(Counts::default());
    let subscriber = tracing_subscriber::registry().with(LockCheck {
        synth: Arc::clone(&synth),
        counts: Arc::clone(&counts),
    });

    tracing::subscriber::with_default(subscriber, || {
        assert_eq!(synth.key_down(0, Channel::HARMONICA, 0.0), Transition::Pressed);
        assert_eq!(synth.key_down(1, Channel::HARMONICA, 0.1), Transition::Pressed);
        // full of held notes
        assert_eq!(synth.key_down(2, Channel::BELL, 0.2), Transition::Unchanged);
        assert_eq!(synth.key_up(1, 0.3), Transition::Released);
        // steals the released note
        assert_eq!(synth.key_down(2, Channel::BELL, 0.4), Transition::Pressed);
        assert_eq!(synth.key_up(0, 0.5), Transition::Released);
        assert_eq!(synth.key_down(0, Channel::HARMONICA, 0.55), Transition::Repressed);
        synth.key_up(0, 0.6);
        synth.render_sample(1.0);
        assert_eq!(synth.active_notes(), 1);
    });

    // pressed x3, refused, released x3, stolen, repressed, retired
    assert!(counts.events.load(Ordering::Relaxed) >= 10);
    assert_eq!(counts.while_locked.load(Ordering::Relaxed), 0);
}
