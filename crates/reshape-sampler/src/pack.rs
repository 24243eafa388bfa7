//! Instruments and packs of reference notes.
//!
//! A [`Pack`] maps instrument names to [`Instrument`]s, each a set of
//! [`Note`]s keyed by their intrinsic frequency. Packs are built once (by
//! hand or through a [`SampleLoader`]) and only read afterwards.

use std::collections::HashMap;

use reshape_core::Sound;

use crate::error::{Error, Result};
use crate::note::{Note, NoteDetails};

/// Notes of one instrument, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Instrument {
    notes: Vec<Note>,
}

impl Instrument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a note, replacing any note with the same frequency in place.
    pub fn insert(&mut self, note: Note) {
        match self
            .notes
            .iter_mut()
            .find(|existing| existing.frequency() == note.frequency())
        {
            Some(existing) => *existing = note,
            None => self.notes.push(note),
        }
    }

    /// Note with the frequency closest to `frequency`.
    ///
    /// Ties go to the note inserted first.
    pub fn nearest_note(&self, frequency: f32) -> Option<&Note> {
        let mut nearest: Option<(&Note, f32)> = None;
        for note in &self.notes {
            let distance = (note.frequency() - frequency).abs();
            match nearest {
                Some((_, best)) if distance >= best => {}
                _ => nearest = Some((note, distance)),
            }
        }
        nearest.map(|(note, _)| note)
    }

    pub fn get(&self, frequency: f32) -> Option<&Note> {
        self.notes.iter().find(|note| note.frequency() == frequency)
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

impl FromIterator<Note> for Instrument {
    fn from_iter<I: IntoIterator<Item = Note>>(iter: I) -> Self {
        let mut instrument = Self::new();
        for note in iter {
            instrument.insert(note);
        }
        instrument
    }
}

/// Instruments by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pack {
    instruments: HashMap<String, Instrument>,
}

impl Pack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an instrument.
    pub fn insert(&mut self, name: impl Into<String>, instrument: Instrument) {
        self.instruments.insert(name.into(), instrument);
    }

    pub fn instrument(&self, name: &str) -> Option<&Instrument> {
        self.instruments.get(name)
    }

    /// Like [`instrument`](Self::instrument), failing with `UnknownInstrument`.
    pub fn require(&self, name: &str) -> Result<&Instrument> {
        self.instrument(name)
            .ok_or_else(|| Error::UnknownInstrument(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.instruments.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.instruments.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    /// Build a pack from a manifest, reading samples through `loader`.
    ///
    /// Notes with [`NoteDetails`] are sliced directly; the others are
    /// segmented with `hop` and get their frequency detected.
    pub fn load<L: SampleLoader + ?Sized>(
        manifest: &[InstrumentSource],
        loader: &L,
        hop: usize,
    ) -> Result<Self> {
        let mut pack = Self::new();
        for source in manifest {
            let mut instrument = Instrument::new();
            for note_source in &source.notes {
                let channels = loader.load(&note_source.sample)?;
                let note = match &note_source.details {
                    Some(details) => Note::from_details(&channels, details)?,
                    None => Note::build_detecting_frequency(&channels, hop)?,
                };
                tracing::debug!(
                    "{}: loaded {} at {} Hz",
                    source.name,
                    note_source.sample,
                    note.frequency()
                );
                instrument.insert(note);
            }
            pack.insert(source.name.clone(), instrument);
        }
        tracing::info!("loaded pack with {} instruments", pack.len());
        Ok(pack)
    }
}

/// Reads the channels of a named sample.
pub trait SampleLoader {
    fn load(&self, name: &str) -> Result<Vec<Sound>>;
}

impl SampleLoader for HashMap<String, Vec<Sound>> {
    fn load(&self, name: &str) -> Result<Vec<Sound>> {
        self.get(name)
            .cloned()
            .ok_or_else(|| Error::Load(format!("no sample named {}", name)))
    }
}

/// One note of a pack manifest.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct NoteSource {
    /// Name passed to the [`SampleLoader`]
    pub sample: String,
    /// Known frequency and envelope, if any
    #[cfg_attr(feature = "serialization", serde(default))]
    pub details: Option<NoteDetails>,
}

/// One instrument of a pack manifest.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct InstrumentSource {
    pub name: String,
    pub notes: Vec<NoteSource>,
}
