use crate::held_notes::HeldNoteSet;
use crate::midi::MidiMessage;
use crate::params::NoteLength;
use crate::processor::Output;
use log::trace;

/// Re-triggers every note of a group as a fresh note-on followed by a
/// deferred note-off.
///
/// Earlier note-offs for the same pitch are not cancelled, so a note that is
/// re-triggered while still sounding may be cut short by its previous release.
#[derive(Debug, Clone, Copy)]
pub struct Repeater {
    channel: u8,
    note_length: NoteLength,
}

impl Repeater {
    pub fn new(channel: u8, note_length: NoteLength) -> Self {
        Self {
            channel: channel & 0x0F,
            note_length,
        }
    }

    /// Sustain time for a re-triggered note at the given beat duration
    pub fn wait_ms(&self, beat_ms: f64) -> f64 {
        self.note_length.of(beat_ms)
    }

    pub fn trigger(&self, notes: &HeldNoteSet, beat_ms: f64, out: &mut Vec<Output>) {
        let delay_ms = self.wait_ms(beat_ms);

        for (pitch, velocity) in notes.iter() {
            trace!(
                "repeat note={} vel={} off after {:.1} ms",
                pitch,
                velocity,
                delay_ms
            );
            out.push(Output::Now(MidiMessage::NoteOn {
                channel: self.channel,
                note: pitch,
                velocity,
            }));
            out.push(Output::After {
                message: MidiMessage::NoteOff {
                    channel: self.channel,
                    note: pitch,
                    velocity: 0,
                },
                delay_ms,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_length_of_500ms_beat() {
        let repeater = Repeater::new(0, NoteLength::new(50));
        assert_eq!(repeater.wait_ms(500.0), 250.0);
    }

    #[test]
    fn test_trigger_emits_on_and_deferred_off_per_note() {
        let repeater = Repeater::new(2, NoteLength::new(25));
        let mut notes = HeldNoteSet::new();
        notes.insert(60, 100);
        notes.insert(65, 70);

        let mut out = Vec::new();
        repeater.trigger(&notes, 1000.0, &mut out);

        assert_eq!(
            out,
            vec![
                Output::Now(MidiMessage::NoteOn {
                    channel: 2,
                    note: 60,
                    velocity: 100
                }),
                Output::After {
                    message: MidiMessage::NoteOff {
                        channel: 2,
                        note: 60,
                        velocity: 0
                    },
                    delay_ms: 250.0
                },
                Output::Now(MidiMessage::NoteOn {
                    channel: 2,
                    note: 65,
                    velocity: 70
                }),
                Output::After {
                    message: MidiMessage::NoteOff {
                        channel: 2,
                        note: 65,
                        velocity: 0
                    },
                    delay_ms: 250.0
                },
            ]
        );
    }

    #[test]
    fn test_empty_group_emits_nothing() {
        let repeater = Repeater::new(0, NoteLength::default());
        let mut out = Vec::new();
        repeater.trigger(&HeldNoteSet::new(), 500.0, &mut out);
        assert!(out.is_empty());
    }
}
