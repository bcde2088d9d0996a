use crate::pitch::{classify, SyncGroup};
use std::collections::BTreeMap;

/// Currently held pitches of one syncopation group, with their velocities
#[derive(Debug, Default, Clone)]
pub struct HeldNoteSet {
    notes: BTreeMap<u8, u8>,
}

impl HeldNoteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-pressing a held pitch refreshes its velocity.
    pub fn insert(&mut self, pitch: u8, velocity: u8) {
        self.notes.insert(pitch, velocity);
    }

    pub fn remove(&mut self, pitch: u8) -> Option<u8> {
        self.notes.remove(&pitch)
    }

    pub fn velocity(&self, pitch: u8) -> Option<u8> {
        self.notes.get(&pitch).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        self.notes.iter().map(|(pitch, velocity)| (*pitch, *velocity))
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

/// Both syncopation groups plus the count of note-ons not yet released
#[derive(Debug, Default)]
pub struct HeldNotes {
    on_beat: HeldNoteSet,
    off_beat: HeldNoteSet,
    held_count: u32,
}

impl HeldNotes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a note-on. Returns true when this is the first note held.
    pub fn press(&mut self, pitch: u8, velocity: u8) -> bool {
        let first = self.held_count == 0;
        self.group_mut(classify(pitch)).insert(pitch, velocity);
        self.held_count += 1;
        first
    }

    /// Records a note-off. A release with no matching press is tolerated.
    pub fn release(&mut self, pitch: u8) {
        self.group_mut(classify(pitch)).remove(pitch);
        self.held_count = self.held_count.saturating_sub(1);
    }

    pub fn group(&self, group: SyncGroup) -> &HeldNoteSet {
        match group {
            SyncGroup::OnBeat => &self.on_beat,
            SyncGroup::OffBeat => &self.off_beat,
        }
    }

    fn group_mut(&mut self, group: SyncGroup) -> &mut HeldNoteSet {
        match group {
            SyncGroup::OnBeat => &mut self.on_beat,
            SyncGroup::OffBeat => &mut self.off_beat,
        }
    }

    pub fn held_count(&self) -> u32 {
        self.held_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_routes_by_group() {
        let mut held = HeldNotes::new();
        held.press(60, 100); // C
        held.press(62, 90); // D

        assert_eq!(held.group(SyncGroup::OnBeat).velocity(60), Some(100));
        assert_eq!(held.group(SyncGroup::OffBeat).velocity(62), Some(90));
        assert!(held.group(SyncGroup::OnBeat).velocity(62).is_none());
        assert_eq!(held.held_count(), 2);
    }

    #[test]
    fn test_first_press_is_reported() {
        let mut held = HeldNotes::new();
        assert!(held.press(60, 100));
        assert!(!held.press(64, 100));
        held.release(60);
        held.release(64);
        assert!(held.press(65, 80));
    }

    #[test]
    fn test_repress_refreshes_velocity() {
        let mut set = HeldNoteSet::new();
        set.insert(60, 40);
        set.insert(60, 110);
        assert_eq!(set.len(), 1);
        assert_eq!(set.velocity(60), Some(110));
    }

    #[test]
    fn test_unmatched_release_is_a_no_op() {
        let mut held = HeldNotes::new();
        held.release(60);
        assert_eq!(held.held_count(), 0);
        assert!(held.group(SyncGroup::OnBeat).is_empty());

        // The count never underflows, so the next press still counts as first
        assert!(held.press(60, 100));
    }
}
