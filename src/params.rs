//! User-facing parameters: rhythmic subdivision, note length and output channel.

use std::fmt;
use std::str::FromStr;

/// Rhythmic unit a held note is repeated at, in host beats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Subdivision {
    SixteenthTriplet,
    #[default]
    Sixteenth,
    SixteenthDotted,
    EighthTriplet,
    Eighth,
    EighthDotted,
    QuarterTriplet,
    Quarter,
    QuarterDotted,
    HalfTriplet,
    Half,
    HalfDotted,
}

impl Subdivision {
    pub const ALL: [Subdivision; 12] = [
        Subdivision::SixteenthTriplet,
        Subdivision::Sixteenth,
        Subdivision::SixteenthDotted,
        Subdivision::EighthTriplet,
        Subdivision::Eighth,
        Subdivision::EighthDotted,
        Subdivision::QuarterTriplet,
        Subdivision::Quarter,
        Subdivision::QuarterDotted,
        Subdivision::HalfTriplet,
        Subdivision::Half,
        Subdivision::HalfDotted,
    ];

    /// Length of one step as a fraction of a beat.
    ///
    /// The triplet values are truncated to three places, matching the
    /// constants the repeat effect has always shipped with.
    pub fn beats(self) -> f64 {
        match self {
            Subdivision::SixteenthTriplet => 0.166,
            Subdivision::Sixteenth => 0.25,
            Subdivision::SixteenthDotted => 0.375,
            Subdivision::EighthTriplet => 0.333,
            Subdivision::Eighth => 0.5,
            Subdivision::EighthDotted => 0.75,
            Subdivision::QuarterTriplet => 0.666,
            Subdivision::Quarter => 1.0,
            Subdivision::QuarterDotted => 1.5,
            Subdivision::HalfTriplet => 1.333,
            Subdivision::Half => 2.0,
            Subdivision::HalfDotted => 3.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Subdivision::SixteenthTriplet => "1/16 triplets",
            Subdivision::Sixteenth => "1/16",
            Subdivision::SixteenthDotted => "1/16 dotted",
            Subdivision::EighthTriplet => "1/8 triplets",
            Subdivision::Eighth => "1/8",
            Subdivision::EighthDotted => "1/8 dotted",
            Subdivision::QuarterTriplet => "1/4 triplets",
            Subdivision::Quarter => "1/4",
            Subdivision::QuarterDotted => "1/4 dotted",
            Subdivision::HalfTriplet => "1/2 triplets",
            Subdivision::Half => "1/2",
            Subdivision::HalfDotted => "1/2 dotted",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|s| *s == self)
            .unwrap_or_default()
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for Subdivision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Subdivision {
    type Err = String;

    /// Accepts the display name ("1/8 dotted"), a short alias ("1/8d",
    /// "1/16t") or a 0-based menu index.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();

        if let Ok(index) = wanted.parse::<usize>() {
            return Self::from_index(index)
                .ok_or_else(|| format!("Subdivision index {} out of range 0-11", index));
        }

        Self::ALL
            .iter()
            .copied()
            .find(|sub| {
                let name = sub.name();
                let short = name
                    .replace(" triplets", "t")
                    .replace(" dotted", "d");
                wanted == name || wanted == short
            })
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|s| s.name()).collect();
                format!("Unknown subdivision '{}', expected one of: {}", s, names.join(", "))
            })
    }
}

/// Percentage of a beat that a re-triggered note sustains for, 1-100
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteLength(u8);

impl NoteLength {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 100;

    /// Out-of-range values are clamped rather than rejected.
    pub fn new(percent: u8) -> Self {
        NoteLength(percent.clamp(Self::MIN, Self::MAX))
    }

    pub fn percent(self) -> u8 {
        self.0
    }

    pub fn of(self, beat_ms: f64) -> f64 {
        beat_ms * f64::from(self.0) / 100.0
    }
}

impl Default for NoteLength {
    fn default() -> Self {
        NoteLength(50)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Params {
    pub time: Subdivision,
    pub note_length: NoteLength,
    /// Output channel, 0-based
    pub channel: u8,
}
