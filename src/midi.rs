use js_sys::Array;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{MidiAccess, MidiOutput, Performance};

use crate::{
    error::{Result, SketchError},
    notes::NoteName,
    playback::SynthEngine,
    project::Instrument,
};

const FULL_VELOCITY: u8 = 0x7f;
const ALL_NOTES_OFF: u8 = 123;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MidiMessageType {
    ChangeInstrument { channel: u8, program: u8 },
    NoteOn { channel: u8, pitch: u8, velocity: u8 },
    NoteOff { channel: u8, pitch: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
}

impl MidiMessageType {
    pub fn to_bytes(&self) -> Vec<u8> {
        match *self {
            Self::ChangeInstrument { channel, program } => vec![0xC0 | channel, program],
            Self::NoteOn {
                channel,
                pitch,
                velocity,
            } => vec![0x90 | channel, pitch, velocity],
            Self::NoteOff {
                channel,
                pitch,
                velocity,
            } => vec![0x80 | channel, pitch, velocity],
            Self::ControlChange {
                channel,
                controller,
                value,
            } => vec![0xB0 | channel, controller, value],
        }
    }

    pub fn to_array(&self) -> Array {
        self.to_bytes()
            .into_iter()
            .map(|byte| JsValue::from_f64(byte as _))
            .collect()
    }
}

/// General MIDI channel and program that voice an instrument.
pub fn voice(instrument: Instrument) -> (u8, u8) {
    match instrument {
        // Koto
        Instrument::Guzheng => (0, 107),
        // Flute
        Instrument::Dizi => (1, 73),
    }
}

/// A synth engine backed by a Web MIDI output port. Triggers are queued on
/// the port with timestamps, so scheduling never blocks.
pub struct MidiSynth {
    output: MidiOutput,
    performance: Performance,
}

impl MidiSynth {
    pub fn new(output: MidiOutput, performance: Performance) -> Self {
        let synth = Self {
            output,
            performance,
        };

        for instrument in Instrument::ALL {
            let (channel, program) = voice(instrument);
            let message = MidiMessageType::ChangeInstrument { channel, program };

            if let Err(err) = synth.send(message, None) {
                log::warn!("could not select a voice for {}: {}", instrument, err);
            }
        }

        synth
    }

    /// Asks the browser for MIDI access and opens the first output port.
    pub async fn request() -> Result<Self> {
        let window = web_sys::window().ok_or_else(|| SketchError::Synth("no window".into()))?;
        let performance = window
            .performance()
            .ok_or_else(|| SketchError::Synth("no performance clock".into()))?;

        let promise = window
            .navigator()
            .request_midi_access()
            .map_err(|err| SketchError::Synth(format!("{:?}", err)))?;

        let access = JsFuture::from(promise)
            .await
            .map_err(|err| SketchError::Synth(format!("MIDI access refused: {:?}", err)))?
            .dyn_into::<MidiAccess>()
            .map_err(|_| SketchError::Synth("not a MIDIAccess".into()))?;

        let output = output_devices(&access)
            .into_iter()
            .next()
            .ok_or_else(|| SketchError::Synth("no MIDI output available".into()))?;

        log::info!("playing through {}", output.name().unwrap_or_else(|| "unnamed output".into()));

        Ok(Self::new(output, performance))
    }

    fn send(&self, message: MidiMessageType, at: Option<f64>) -> Result<()> {
        let array = message.to_array();

        match at {
            Some(at) => self.output.send_with_timestamp(&array, at * 1000.0),
            None => self.output.send(&array),
        }
        .map_err(|err| SketchError::Synth(format!("{:?}", err)))
    }
}

impl SynthEngine for MidiSynth {
    fn current_time(&self) -> f64 {
        self.performance.now() / 1000.0
    }

    fn trigger_note_at(
        &mut self,
        instrument: Instrument,
        pitch: NoteName,
        duration: f64,
        time: f64,
    ) -> Result<()> {
        let (channel, _) = voice(instrument);
        let pitch = pitch.midi();

        self.send(
            MidiMessageType::NoteOn {
                channel,
                pitch,
                velocity: FULL_VELOCITY,
            },
            Some(time),
        )?;

        self.send(
            MidiMessageType::NoteOff {
                channel,
                pitch,
                velocity: FULL_VELOCITY,
            },
            Some(time + duration),
        )
    }

    fn cancel_pending(&mut self) {
        self.output.clear();

        for instrument in Instrument::ALL {
            let (channel, _) = voice(instrument);
            let message = MidiMessageType::ControlChange {
                channel,
                controller: ALL_NOTES_OFF,
                value: 0,
            };

            if let Err(err) = self.send(message, None) {
                log::warn!("{}", err);
            }
        }
    }
}

pub fn output_devices(access: &MidiAccess) -> Vec<MidiOutput> {
    let iter = match js_sys::try_iter(access.outputs().as_ref()) {
        Ok(Some(iter)) => iter,
        _ => return Vec::new(),
    };

    iter.filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.dyn_into::<Array>().ok())
        .filter_map(|entry| entry.get(1).dyn_into::<MidiOutput>().ok())
        .collect()
}
