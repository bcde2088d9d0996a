//! Pitch classification into the two syncopation groups.
//!
//! Pitch classes are counted in semitones from F and grouped in threes:
//! F-G, G#-A#, B-C#, D-E. Even groups repeat on the beat, odd groups
//! repeat off the beat.

/// Which half of a subdivision step a held note repeats on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncGroup {
    OnBeat,
    OffBeat,
}

const PITCH_CLASS_F: i16 = 5;

/// Maps a MIDI pitch to its syncopation group.
pub fn classify(pitch: u8) -> SyncGroup {
    let from_f = (i16::from(pitch) - PITCH_CLASS_F).rem_euclid(12);
    let group = from_f / 3;

    if group % 2 == 0 {
        SyncGroup::OnBeat
    } else {
        SyncGroup::OffBeat
    }
}
