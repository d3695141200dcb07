//! Per-tick translation of device snapshots into MIDI messages
//!
//! The translator owns the previous-value cache and the stick sensitivity.
//! Cached values only move when a message was actually delivered, so a value
//! that failed to send is retried on the next tick.

use std::collections::BTreeMap;

use tracing::{debug, info, trace, warn};

use super::midi::OutputSink;
use crate::config::{PadConfig, PairConfig};
use crate::error::{Error, Result};
use crate::mapping::{normalize, to_midi_value, ChangeFilter, Edge, EdgeDetector, Sensitivity};
use crate::prompt::AdjustmentPrompt;
use crate::sources::DeviceSnapshot;

const SENSITIVITY_PROMPT: &str = "Enter new joystick sensitivity (0 to 1): ";

/// Translator state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Translating every tick
    Running,
    /// Suspended while a new sensitivity is requested
    Adjusting,
}

/// What one tick did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Messages delivered to the sink
    pub sent: usize,
    /// Messages the sink refused
    pub failed: usize,
    /// Whether the tick switched to adjustment mode
    pub entered_adjusting: bool,
}

/// How an adjustment ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AdjustOutcome {
    /// A new sensitivity was stored
    Adjusted(Sensitivity),
    /// Gave up; the old sensitivity stays
    Abandoned,
}

#[derive(Debug, Clone)]
struct PairState {
    binding: PairConfig,
    last_sent: [f32; 2],
}

/// Sampling-to-message translator
pub struct Translator {
    pairs: Vec<PairState>,
    notes: BTreeMap<u32, u8>,
    buttons: EdgeDetector,
    mode_switch_button: u32,
    mode_switch: EdgeDetector,
    filter: ChangeFilter,
    sensitivity: Sensitivity,
    max_attempts: Option<u32>,
    mode: Mode,
}

impl Translator {
    /// Build a translator from a configuration
    ///
    /// Fails with `InvalidSensitivityInput` if the initial sensitivity is
    /// outside [0, 1].
    pub fn new(config: &PadConfig) -> Result<Self> {
        let filter = ChangeFilter::new(config.filter.dead_zone)
            .with_change_threshold(config.filter.change_threshold());
        let sensitivity = Sensitivity::new(config.sensitivity.initial)?;

        Ok(Self {
            pairs: config
                .pairs
                .iter()
                .map(|binding| PairState {
                    binding: binding.clone(),
                    last_sent: [0.0; 2],
                })
                .collect(),
            notes: config.buttons.clone(),
            buttons: EdgeDetector::new(),
            mode_switch_button: config.mode_switch_button,
            mode_switch: EdgeDetector::new(),
            filter,
            sensitivity,
            max_attempts: config.sensitivity.max_attempts,
            mode: Mode::Running,
        })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn sensitivity(&self) -> Sensitivity {
        self.sensitivity
    }

    /// Last values delivered for the pair at `index`
    pub fn last_sent(&self, index: usize) -> Option<[f32; 2]> {
        self.pairs.get(index).map(|p| p.last_sent)
    }

    /// Translate one snapshot, sending whatever changed
    pub fn tick<O: OutputSink + ?Sized>(
        &mut self,
        snapshot: &DeviceSnapshot,
        sink: &mut O,
    ) -> TickReport {
        let mut report = TickReport::default();
        if self.mode != Mode::Running {
            trace!("tick ignored while adjusting");
            return report;
        }

        self.translate_buttons(snapshot, sink, &mut report);
        self.translate_pairs(snapshot, sink, &mut report);

        let pressed = snapshot.button(self.mode_switch_button);
        if self.mode_switch.process(self.mode_switch_button, pressed) == Some(Edge::Press) {
            info!("mode switch pressed, adjusting sensitivity");
            self.mode = Mode::Adjusting;
            report.entered_adjusting = true;
        }

        report
    }

    fn translate_buttons<O: OutputSink + ?Sized>(
        &mut self,
        snapshot: &DeviceSnapshot,
        sink: &mut O,
        report: &mut TickReport,
    ) {
        for (&button, &note) in &self.notes {
            let pressed = snapshot.button(button);
            let Some(edge) = self.buttons.detect(button, pressed) else {
                continue;
            };

            let result = match edge {
                Edge::Press => sink.send_note_on(note),
                Edge::Release => sink.send_note_off(note),
            };

            match result {
                Ok(()) => {
                    self.buttons.commit(button, pressed);
                    report.sent += 1;
                    match edge {
                        Edge::Press => info!(button, note, "button pressed"),
                        Edge::Release => info!(button, note, "button released"),
                    }
                }
                Err(e) => {
                    warn!(button, note, error = %e, "failed to send note");
                    report.failed += 1;
                }
            }
        }
    }

    fn translate_pairs<O: OutputSink + ?Sized>(
        &mut self,
        snapshot: &DeviceSnapshot,
        sink: &mut O,
        report: &mut TickReport,
    ) {
        let filter = self.filter;
        let sensitivity = self.sensitivity;

        for pair in &mut self.pairs {
            let binding = &pair.binding;
            let (Some(raw_x), Some(raw_y)) = (
                snapshot.axis(binding.x.channel),
                snapshot.axis(binding.y.channel),
            ) else {
                trace!(pair = %binding.name, "device lacks channels for pair");
                continue;
            };

            let values = [
                normalize(raw_x, binding.kind, binding.x.invert, sensitivity),
                normalize(raw_y, binding.kind, binding.y.invert, sensitivity),
            ];
            let Some(out) = filter.gate_pair(values, pair.last_sent) else {
                continue;
            };

            for (i, axis) in [&binding.x, &binding.y].into_iter().enumerate() {
                let value = to_midi_value(out[i], binding.kind);
                match sink.send_control(axis.controller, value) {
                    Ok(()) => {
                        pair.last_sent[i] = out[i];
                        report.sent += 1;
                    }
                    Err(e) => {
                        warn!(
                            pair = %binding.name,
                            controller = axis.controller,
                            error = %e,
                            "failed to send control change"
                        );
                        report.failed += 1;
                    }
                }
            }

            debug!("{}: x={:.2}, y={:.2}", binding.name, out[0], out[1]);
        }
    }

    /// Block on `prompt` until a valid sensitivity arrives, then resume.
    ///
    /// Invalid answers are re-prompted, up to `max_attempts` when configured.
    /// A closed prompt abandons the adjustment. Either way the translator is
    /// back in `Mode::Running` afterwards.
    pub fn adjust<P: AdjustmentPrompt + ?Sized>(&mut self, prompt: &mut P) -> AdjustOutcome {
        let mut rejected = 0u32;

        let outcome = loop {
            match prompt
                .request_float(SENSITIVITY_PROMPT)
                .and_then(Sensitivity::new)
            {
                Ok(sensitivity) => {
                    self.sensitivity = sensitivity;
                    info!(%sensitivity, "joystick sensitivity adjusted");
                    break AdjustOutcome::Adjusted(sensitivity);
                }
                Err(Error::PromptClosed) => {
                    warn!(sensitivity = %self.sensitivity, "prompt closed, keeping sensitivity");
                    break AdjustOutcome::Abandoned;
                }
                Err(e) => {
                    rejected += 1;
                    warn!("{}", e);
                    if self.max_attempts.is_some_and(|max| rejected >= max) {
                        warn!(attempts = rejected, "giving up on sensitivity adjustment");
                        break AdjustOutcome::Abandoned;
                    }
                }
            }
        };

        self.mode = Mode::Running;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AxisConfig;
    use crate::mapping::ChannelKind;
    use std::collections::VecDeque;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Sent {
        Control(u8, u8),
        NoteOn(u8),
        NoteOff(u8),
    }

    #[derive(Default)]
    struct RecordingSink {
        sent: Vec<Sent>,
        failing: bool,
    }

    impl OutputSink for RecordingSink {
        fn send_control(&mut self, controller: u8, value: u8) -> Result<()> {
            self.deliver(Sent::Control(controller, value))
        }

        fn send_note_on(&mut self, note: u8) -> Result<()> {
            self.deliver(Sent::NoteOn(note))
        }

        fn send_note_off(&mut self, note: u8) -> Result<()> {
            self.deliver(Sent::NoteOff(note))
        }

        fn close(&mut self) {}
    }

    impl RecordingSink {
        fn deliver(&mut self, msg: Sent) -> Result<()> {
            if self.failing {
                return Err(Error::OutputFailure("unplugged".to_string()));
            }
            self.sent.push(msg);
            Ok(())
        }
    }

    struct ScriptedPrompt {
        answers: VecDeque<&'static str>,
        asked: usize,
    }

    impl ScriptedPrompt {
        fn new(answers: &[&'static str]) -> Self {
            Self {
                answers: answers.iter().copied().collect(),
                asked: 0,
            }
        }
    }

    impl AdjustmentPrompt for ScriptedPrompt {
        fn request_line(&mut self, _prompt: &str) -> Result<String> {
            self.asked += 1;
            self.answers
                .pop_front()
                .map(str::to_string)
                .ok_or(Error::PromptClosed)
        }
    }

    /// Six axes at rest (triggers fully released)
    fn rest() -> DeviceSnapshot {
        DeviceSnapshot::new()
            .with_axis(0.0)
            .with_axis(0.0)
            .with_axis(0.0)
            .with_axis(0.0)
            .with_axis(-1.0)
            .with_axis(-1.0)
    }

    fn stick_only(dead_zone: f32) -> PadConfig {
        let mut config = PadConfig::default();
        config.filter.dead_zone = dead_zone;
        config.pairs.truncate(1);
        config.pairs[0].y = AxisConfig::new(1, 1);
        config
    }

    #[test]
    fn test_rest_sends_nothing() {
        let mut translator = Translator::new(&PadConfig::default()).unwrap();
        let mut sink = RecordingSink::default();

        for _ in 0..5 {
            let report = translator.tick(&rest(), &mut sink);
            assert_eq!(report.sent, 0);
        }
        assert!(sink.sent.is_empty());
    }

    #[test]
    fn test_small_reading_inside_dead_zone() {
        let mut translator = Translator::new(&stick_only(0.1)).unwrap();
        let mut sink = RecordingSink::default();

        let snapshot = DeviceSnapshot::new().with_axis(0.05).with_axis(0.0);
        translator.tick(&snapshot, &mut sink);

        assert!(sink.sent.is_empty());
        assert_eq!(translator.last_sent(0), Some([0.0, 0.0]));
    }

    #[test]
    fn test_stick_pair_sent_together() {
        let mut translator = Translator::new(&stick_only(0.1)).unwrap();
        let mut sink = RecordingSink::default();

        let snapshot = DeviceSnapshot::new().with_axis(1.0).with_axis(0.0);
        translator.tick(&snapshot, &mut sink);

        assert_eq!(sink.sent, vec![Sent::Control(16, 127), Sent::Control(1, 63)]);
        assert_eq!(translator.last_sent(0), Some([1.0, 0.0]));
    }

    #[test]
    fn test_same_value_not_resent() {
        let mut translator = Translator::new(&stick_only(0.1)).unwrap();
        let mut sink = RecordingSink::default();

        let snapshot = DeviceSnapshot::new().with_axis(0.6).with_axis(-0.4);
        translator.tick(&snapshot, &mut sink);
        translator.tick(&snapshot, &mut sink);
        translator.tick(&snapshot, &mut sink);

        assert_eq!(sink.sent.len(), 2);
    }

    #[test]
    fn test_hysteresis_against_last_sent() {
        let mut translator = Translator::new(&stick_only(0.1)).unwrap();
        let mut sink = RecordingSink::default();

        let at = |x: f32| DeviceSnapshot::new().with_axis(x).with_axis(0.0);
        translator.tick(&at(0.5), &mut sink);
        // creeping up in small steps never moves far enough from 0.5 in one go
        translator.tick(&at(0.55), &mut sink);
        translator.tick(&at(0.58), &mut sink);
        assert_eq!(sink.sent.len(), 2);

        // but drifting past the threshold from the last sent value does
        translator.tick(&at(0.65), &mut sink);
        assert_eq!(sink.sent.len(), 4);
        assert_eq!(translator.last_sent(0), Some([0.65, 0.0]));
    }

    #[test]
    fn test_y_axis_inverted_by_default() {
        let mut translator = Translator::new(&PadConfig::default()).unwrap();
        let mut sink = RecordingSink::default();

        // pushing the left stick up reads negative on the device
        let snapshot = DeviceSnapshot::new()
            .with_axis(0.0)
            .with_axis(-1.0)
            .with_axis(0.0)
            .with_axis(0.0)
            .with_axis(-1.0)
            .with_axis(-1.0);
        translator.tick(&snapshot, &mut sink);

        assert_eq!(sink.sent, vec![Sent::Control(16, 63), Sent::Control(1, 127)]);
    }

    #[test]
    fn test_triggers() {
        let mut translator = Translator::new(&PadConfig::default()).unwrap();
        let mut sink = RecordingSink::default();

        let mut snapshot = rest();
        snapshot.axes[4] = 1.0;
        translator.tick(&snapshot, &mut sink);

        assert_eq!(sink.sent, vec![Sent::Control(18, 127), Sent::Control(19, 0)]);
    }

    #[test]
    fn test_trigger_ignores_sensitivity() {
        let mut config = PadConfig::default();
        config.sensitivity.initial = 0.2;
        let mut low = Translator::new(&config).unwrap();
        let mut full = Translator::new(&PadConfig::default()).unwrap();
        let mut low_sink = RecordingSink::default();
        let mut full_sink = RecordingSink::default();

        let mut snapshot = rest();
        snapshot.axes[4] = 0.5;
        snapshot.axes[5] = 0.0;
        low.tick(&snapshot, &mut low_sink);
        full.tick(&snapshot, &mut full_sink);

        assert_eq!(low_sink.sent, full_sink.sent);
        assert_eq!(low_sink.sent.len(), 2);
    }

    #[test]
    fn test_missing_channels_skip_pair() {
        let mut translator = Translator::new(&PadConfig::default()).unwrap();
        let mut sink = RecordingSink::default();

        // only the left stick exists on this device
        let snapshot = DeviceSnapshot::new().with_axis(1.0).with_axis(0.0);
        translator.tick(&snapshot, &mut sink);

        assert_eq!(sink.sent.len(), 2);
    }

    #[test]
    fn test_button_press_and_release() {
        let mut translator = Translator::new(&PadConfig::default()).unwrap();
        let mut sink = RecordingSink::default();

        translator.tick(&rest().with_button(0, false), &mut sink);
        translator.tick(&rest().with_button(0, true), &mut sink);
        translator.tick(&rest().with_button(0, false), &mut sink);

        assert_eq!(sink.sent, vec![Sent::NoteOn(60), Sent::NoteOff(60)]);
    }

    #[test]
    fn test_button_held_at_startup() {
        let mut translator = Translator::new(&PadConfig::default()).unwrap();
        let mut sink = RecordingSink::default();

        for _ in 0..3 {
            translator.tick(&rest().with_button(3, true), &mut sink);
        }

        assert_eq!(sink.sent, vec![Sent::NoteOn(65)]);
    }

    #[test]
    fn test_failed_send_is_retried() {
        let mut translator = Translator::new(&PadConfig::default()).unwrap();
        let mut sink = RecordingSink {
            failing: true,
            ..Default::default()
        };

        let pressed = rest().with_button(1, true);
        let report = translator.tick(&pressed, &mut sink);
        assert_eq!(report.failed, 1);
        assert_eq!(report.sent, 0);

        sink.failing = false;
        let report = translator.tick(&pressed, &mut sink);
        assert_eq!(report.sent, 1);
        assert_eq!(sink.sent, vec![Sent::NoteOn(62)]);
    }

    #[test]
    fn test_failed_control_keeps_cache() {
        let mut translator = Translator::new(&stick_only(0.1)).unwrap();
        let mut sink = RecordingSink {
            failing: true,
            ..Default::default()
        };

        let snapshot = DeviceSnapshot::new().with_axis(0.8).with_axis(0.0);
        translator.tick(&snapshot, &mut sink);
        assert_eq!(translator.last_sent(0), Some([0.0, 0.0]));

        sink.failing = false;
        translator.tick(&snapshot, &mut sink);
        assert_eq!(sink.sent.len(), 2);
    }

    #[test]
    fn test_mode_switch_enters_adjusting() {
        let mut translator = Translator::new(&PadConfig::default()).unwrap();
        let mut sink = RecordingSink::default();

        let report = translator.tick(&rest().with_button(7, true), &mut sink);
        assert!(report.entered_adjusting);
        assert_eq!(translator.mode(), Mode::Adjusting);

        // suspended: nothing is translated until the adjustment finishes
        let report = translator.tick(&rest().with_button(0, true), &mut sink);
        assert_eq!(report, TickReport::default());
        assert!(sink.sent.is_empty());
    }

    #[test]
    fn test_adjust_rejects_then_accepts() {
        let mut translator = Translator::new(&PadConfig::default()).unwrap();
        let mut sink = RecordingSink::default();
        translator.tick(&rest().with_button(7, true), &mut sink);

        let mut prompt = ScriptedPrompt::new(&["1.5", "0.5"]);
        let outcome = translator.adjust(&mut prompt);

        assert_eq!(prompt.asked, 2);
        assert_eq!(outcome, AdjustOutcome::Adjusted(Sensitivity::new(0.5).unwrap()));
        assert_eq!(translator.sensitivity().value(), 0.5);
        assert_eq!(translator.mode(), Mode::Running);
    }

    #[test]
    fn test_adjust_rejects_garbage() {
        let mut translator = Translator::new(&PadConfig::default()).unwrap();
        let mut prompt = ScriptedPrompt::new(&["abc", "", "-0.2", "0.3"]);

        let outcome = translator.adjust(&mut prompt);
        assert_eq!(prompt.asked, 4);
        assert_eq!(outcome, AdjustOutcome::Adjusted(Sensitivity::new(0.3).unwrap()));
    }

    #[test]
    fn test_adjust_bounded_attempts() {
        let mut config = PadConfig::default();
        config.sensitivity.max_attempts = Some(2);
        let mut translator = Translator::new(&config).unwrap();
        let mut prompt = ScriptedPrompt::new(&["2", "3", "0.5"]);

        assert_eq!(translator.adjust(&mut prompt), AdjustOutcome::Abandoned);
        assert_eq!(prompt.asked, 2);
        assert_eq!(translator.sensitivity(), Sensitivity::FULL);
        assert_eq!(translator.mode(), Mode::Running);
    }

    #[test]
    fn test_adjust_closed_prompt() {
        let mut translator = Translator::new(&PadConfig::default()).unwrap();
        let mut prompt = ScriptedPrompt::new(&[]);

        assert_eq!(translator.adjust(&mut prompt), AdjustOutcome::Abandoned);
        assert_eq!(translator.mode(), Mode::Running);
    }

    #[test]
    fn test_held_mode_switch_does_not_reenter() {
        let mut translator = Translator::new(&PadConfig::default()).unwrap();
        let mut sink = RecordingSink::default();
        let held = rest().with_button(7, true);

        translator.tick(&held, &mut sink);
        translator.adjust(&mut ScriptedPrompt::new(&["0.4"]));

        let report = translator.tick(&held, &mut sink);
        assert!(!report.entered_adjusting);
        assert_eq!(translator.mode(), Mode::Running);

        translator.tick(&rest(), &mut sink);
        let report = translator.tick(&held, &mut sink);
        assert!(report.entered_adjusting);
    }

    #[test]
    fn test_sensitivity_scales_stick_output() {
        let mut translator = Translator::new(&stick_only(0.1)).unwrap();
        let mut sink = RecordingSink::default();
        translator.adjust(&mut ScriptedPrompt::new(&["0.5"]));

        let snapshot = DeviceSnapshot::new().with_axis(1.0).with_axis(0.0);
        translator.tick(&snapshot, &mut sink);

        // 0.5 canonical -> (0.5 + 1) / 2 * 127 = 95.25
        assert_eq!(sink.sent[0], Sent::Control(16, 95));
    }

    #[test]
    fn test_unidirectional_pair_config() {
        let mut config = PadConfig::default();
        config.pairs = vec![PairConfig {
            name: "pedals".to_string(),
            kind: ChannelKind::Unidirectional,
            x: AxisConfig::new(0, 30),
            y: AxisConfig::new(1, 31),
        }];
        let mut translator = Translator::new(&config).unwrap();
        let mut sink = RecordingSink::default();

        let snapshot = DeviceSnapshot::new().with_axis(0.0).with_axis(-1.0);
        translator.tick(&snapshot, &mut sink);

        assert_eq!(sink.sent, vec![Sent::Control(30, 63), Sent::Control(31, 0)]);
    }

    #[test]
    fn test_out_of_range_initial_sensitivity_rejected() {
        let mut config = PadConfig::default();
        config.sensitivity.initial = 1.5;
        assert!(matches!(
            Translator::new(&config),
            Err(Error::InvalidSensitivityInput(_))
        ));

        config.sensitivity.initial = 0.0;
        let translator = Translator::new(&config).unwrap();
        assert_eq!(translator.sensitivity().value(), 0.0);
    }
}
