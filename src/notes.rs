use std::{fmt, str::FromStr};

const NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// MIDI number of the lowest entry in the table (C1).
pub const LOWEST: u8 = 24;
/// MIDI number of the highest entry in the table (C8).
pub const HIGHEST: u8 = 108;

/// A pitch from the equal-tempered reference table, stored as its MIDI
/// number. Only values in `LOWEST..=HIGHEST` can be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NoteName(u8);

impl NoteName {
    /// Anchor of the canvas' vertical axis.
    pub const C2: NoteName = NoteName(36);
    pub const A4: NoteName = NoteName(69);

    pub fn from_midi(midi: u8) -> Option<Self> {
        (LOWEST..=HIGHEST).contains(&midi).then(|| Self(midi))
    }

    pub const fn midi(self) -> u8 {
        self.0
    }

    pub fn frequency(self) -> f64 {
        440.0 * 2f64.powf((self.0 as f64 - 69.0) / 12.0)
    }

    pub fn octave(self) -> i32 {
        self.0 as i32 / 12 - 1
    }

    /// Every note in the table, ascending.
    pub fn all() -> impl Iterator<Item = NoteName> {
        (LOWEST..=HIGHEST).map(NoteName)
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", NAMES[self.0 as usize % 12], self.octave())
    }
}

impl FromStr for NoteName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let split = s
            .find(|c: char| c.is_ascii_digit() || c == '-')
            .ok_or_else(|| format!("missing octave in {:?}", s))?;

        let (name, octave) = s.split_at(split);

        let mut chars = name.chars();
        let letter = chars.next().ok_or_else(|| format!("missing note letter in {:?}", s))?;

        let base = match letter.to_ascii_uppercase() {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return Err(format!("unknown note letter in {:?}", s)),
        };

        let accidental = match chars.as_str() {
            "" => 0,
            "#" => 1,
            "b" => -1,
            _ => return Err(format!("unknown accidental in {:?}", s)),
        };

        let octave: i32 = octave
            .parse()
            .map_err(|_| format!("invalid octave in {:?}", s))?;

        let midi = (octave + 1) * 12 + base + accidental;

        u8::try_from(midi)
            .ok()
            .and_then(NoteName::from_midi)
            .ok_or_else(|| format!("{:?} is outside the note table", s))
    }
}

/// The table entry whose frequency is closest to `frequency`. Ties go to the
/// lower note and anything outside the table clamps to its boundary.
pub fn closest_note(frequency: f64) -> NoteName {
    let mut best = NoteName(LOWEST);
    let mut best_distance = f64::INFINITY;

    for note in NoteName::all() {
        let distance = (note.frequency() - frequency).abs();

        if distance < best_distance {
            best = note;
            best_distance = distance;
        }
    }

    best
}
