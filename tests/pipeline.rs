//! Pipeline integration tests: classifications in, recorded MIDI bytes and
//! scheduled voices out. No MIDI or audio hardware involved.

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use assert_approx_eq::assert_approx_eq;

use gestural::audio::AudioHost;
use gestural::backend::{BackendPreference, BackendSelector, BackendState};
use gestural::classify::{ClassificationResult, JsonLinesClassifier, Ranking, ScriptedClassifier};
use gestural::gesture::GestureControlState;
use gestural::midi::{MidiMessage, MidiTransport};
use gestural::pipeline::{ClassificationLoop, CycleOutcome, InstrumentContext, LoopEnd};
use gestural::synth::{arpeggio, Voice, Waveform};
use gestural::{InstrumentError, Result};

type Sent = Arc<Mutex<Vec<Vec<u8>>>>;
type Scheduled = Arc<Mutex<Vec<Voice>>>;

struct RecordingPort(Sent);

impl MidiTransport for RecordingPort {
    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        self.0.lock().unwrap().push(bytes.to_vec());
        Ok(())
    }

    fn port_name(&self) -> &str {
        "recording"
    }
}

struct RecordingHost {
    now: f64,
    voices: Scheduled,
    resumes: Arc<Mutex<u32>>,
}

impl AudioHost for RecordingHost {
    fn current_time(&self) -> f64 {
        self.now
    }

    fn schedule(&mut self, voice: Voice) -> Result<()> {
        self.voices.lock().unwrap().push(voice);
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        *self.resumes.lock().unwrap() += 1;
        Ok(())
    }
}

fn midi_instrument() -> (InstrumentContext, Sent) {
    let sent = Sent::default();
    let mut selector = BackendSelector::new();
    let port = sent.clone();
    let backend = selector
        .select(
            BackendPreference::Auto,
            move || -> Result<Box<dyn MidiTransport>> { Ok(Box::new(RecordingPort(port))) },
            || -> Result<Box<dyn AudioHost>> { Err(InstrumentError::Audio("unused".into())) },
        )
        .unwrap();
    let ctx = InstrumentContext::new(
        GestureControlState::default(),
        backend,
        selector.state().clone(),
    );
    (ctx, sent)
}

fn synth_instrument(now: f64) -> (InstrumentContext, Scheduled, Arc<Mutex<u32>>) {
    let voices = Scheduled::default();
    let resumes = Arc::new(Mutex::new(0));
    let host = RecordingHost {
        now,
        voices: voices.clone(),
        resumes: resumes.clone(),
    };
    let mut selector = BackendSelector::new();
    let backend = selector
        .select(
            BackendPreference::Auto,
            || -> Result<Box<dyn MidiTransport>> { Err(InstrumentError::NoMidiPorts) },
            move || -> Result<Box<dyn AudioHost>> { Ok(Box::new(host)) },
        )
        .unwrap();
    assert_eq!(*selector.state(), BackendState::AudioReady);
    let ctx = InstrumentContext::new(
        GestureControlState::default(),
        backend,
        selector.state().clone(),
    );
    (ctx, voices, resumes)
}

fn top(label: &str, confidence: f32) -> Result<Ranking> {
    Ok(vec![ClassificationResult::new(label, confidence)])
}

#[test]
fn unmapped_labels_make_no_sound() {
    let (mut midi, sent) = midi_instrument();
    let (mut synth, voices, _) = synth_instrument(0.0);

    for label in ["unknown", "", "Wood", "glass"] {
        midi.process(top(label, 0.9));
        synth.process(top(label, 0.9));
    }

    assert!(sent.lock().unwrap().is_empty());
    assert!(voices.lock().unwrap().is_empty());
}

#[test]
fn midi_note_on_precedes_control_change() {
    let (mut ctx, sent) = midi_instrument();
    ctx.process(top("wood", 0.5));

    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 2);
    assert_eq!(
        MidiMessage::from_bytes(&sent[0]),
        Some(MidiMessage::note_on(3, 60, 63))
    );
    assert_eq!(
        MidiMessage::from_bytes(&sent[1]),
        Some(MidiMessage::control_change(3, 3, 63))
    );
}

#[test]
fn velocity_is_floored_confidence() {
    for (confidence, expected) in [(0.0, 0u8), (0.999, 126), (1.0, 127), (0.5, 63), (0.01, 1)] {
        let (mut ctx, sent) = midi_instrument();
        ctx.process(top("coral", confidence));
        assert_approx_eq!(ctx.state().range, confidence);

        let sent = sent.lock().unwrap();
        assert_eq!(sent[0], vec![0x90, 72, expected], "confidence {confidence}");
        assert_eq!(sent[1], vec![0xB0, 1, expected], "confidence {confidence}");
    }
}

#[test]
fn leaving_a_material_sends_no_note_off_until_shutdown() {
    let (mut ctx, sent) = midi_instrument();
    ctx.process(top("stone", 0.8));
    ctx.process(top("unknown", 0.8));
    assert_eq!(sent.lock().unwrap().len(), 2);

    ctx.shutdown();
    let sent = sent.lock().unwrap();
    assert_eq!(sent.last().unwrap(), &vec![0x81, 48, 0]);
}

#[test]
fn material_change_sequence() {
    let (mut ctx, _sent) = midi_instrument();
    let changes: Vec<_> = ["wood", "wood", "stone"]
        .into_iter()
        .filter_map(|label| ctx.process(top(label, 0.7)).change().cloned())
        .map(|c| (c.from, c.to))
        .collect();

    assert_eq!(
        changes,
        vec![
            (String::new(), "wood".to_string()),
            ("wood".to_string(), "stone".to_string()),
        ]
    );
}

#[test]
fn combined_material_plays_the_arpeggio() {
    let (mut ctx, voices, _) = synth_instrument(2.0);
    ctx.process(top("wood+coral+stone", 1.0));

    let voices = voices.lock().unwrap();
    assert_eq!(voices.len(), 4);

    let third = &voices[2];
    assert_approx_eq!(third.frequency(), arpeggio::ROOT_HZ * 1.5);
    assert_eq!(third.waveform(), Waveform::Triangle);
    assert_approx_eq!(third.start_time(), 2.4);
    assert_approx_eq!(third.gain().peak(), 0.06);
    assert_approx_eq!(third.stop_time(), 2.56);
}

#[test]
fn single_material_plays_one_burst() {
    let (mut ctx, voices, _) = synth_instrument(1.0);
    ctx.process(top("stone", 0.5));
    ctx.process(top("stone", 0.5));

    let voices = voices.lock().unwrap();
    assert_eq!(voices.len(), 2);
    assert_approx_eq!(voices[0].frequency(), 130.81);
    assert_eq!(voices[0].waveform(), Waveform::Sawtooth);
    assert_approx_eq!(voices[0].gain().value_at(1.05), 0.15);
    assert_approx_eq!(voices[0].stop_time(), 1.1);
}

#[test]
fn resume_reaches_the_audio_host_every_time() {
    let (mut ctx, _voices, resumes) = synth_instrument(0.0);
    ctx.resume();
    ctx.resume();
    assert_eq!(*resumes.lock().unwrap(), 2);
}

#[test]
fn no_ports_and_no_audio_runs_silent() {
    let mut selector = BackendSelector::new();
    let backend = selector
        .select(
            BackendPreference::Auto,
            || -> Result<Box<dyn MidiTransport>> { Err(InstrumentError::NoMidiPorts) },
            || -> Result<Box<dyn AudioHost>> { Err(InstrumentError::Audio("no device".into())) },
        )
        .unwrap();
    assert!(backend.is_none());

    let mut ctx = InstrumentContext::new(
        GestureControlState::default(),
        backend,
        selector.state().clone(),
    );
    let outcome = ctx.process(top("coral", 0.9));
    assert!(matches!(outcome, CycleOutcome::Silent { .. }));
    assert!(ctx.state().on_off);
    assert_eq!(ctx.feed().latest().backend, "Not Ready");
}

#[test]
fn repeated_update_is_idempotent() {
    let mut state = GestureControlState::default();
    assert!(state.update("coral", 0.4).is_some());
    let snapshot = state.clone();
    assert!(state.update("coral", 0.4).is_none());
    assert_eq!(state, snapshot);
}

#[test]
fn loop_plays_a_json_lines_session() {
    let input = r#"
[{"label":"wood","confidence":0.93},{"label":"stone","confidence":0.04}]
{"label":"wood","confidence":0.5}
{"error":"camera busy"}
not json
{"label":"unknown","confidence":0.8}
{"label":"coral","confidence":1.0}
"#;
    let (mut ctx, sent) = midi_instrument();
    let feed = ctx.feed();
    let mut lp = ClassificationLoop::spawn(JsonLinesClassifier::new(input.as_bytes())).unwrap();

    let summary = lp.run(&mut ctx, &AtomicBool::new(false));
    assert_eq!(summary.end, LoopEnd::Exhausted);
    assert_eq!(summary.cycles, 6);
    assert_eq!(ctx.cycles(), 4);

    // wood twice (note-on + CC each), coral once.
    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 6);
    assert_eq!(sent[4], vec![0x90, 72, 127]);

    let latest = feed.latest();
    assert_eq!(latest.material, "coral");
    assert_eq!(latest.intensity, 255);
    assert_eq!(latest.backend, "MIDI");
}

#[test]
fn scripted_loop_honours_stop_flag() {
    let classifier = ScriptedClassifier::from_pairs([("wood", 0.7), ("stone", 0.7)]);
    let (mut ctx, sent) = midi_instrument();
    let mut lp = ClassificationLoop::spawn(classifier).unwrap();

    let summary = lp.run(&mut ctx, &AtomicBool::new(true));
    assert_eq!(summary.end, LoopEnd::Stopped);
    assert!(sent.lock().unwrap().is_empty());
}
