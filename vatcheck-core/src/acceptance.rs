//! Sensor acceptance tests
//!
//! Two pass/fail checks run against the board's temperature sensors:
//!
//! - **IR**: single shot. Healthy IR sensor passes with the current resin
//!   temperature as the reading.
//! - **NTC**: stability over a window of plate temperature samples taken from
//!   consecutive telemetry replies. Any out-of-range sample or a jump
//!   between neighbours fails immediately; a full window passes when its
//!   average is in range and its spread is small enough. A timeout finalizes
//!   the test from whatever was collected.
//!
//! Results move Pending -> Running -> Pass/Fail only, single shot checks
//! included. A new run replaces the previous result. At most one test is
//! running at a time.

use vatcheck_protocol::{Deci, SensorHealth};

use crate::config::NtcTestConfig;
use crate::device::DeviceState;

/// Which acceptance test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TestKind {
    Ntc,
    Ir,
}

/// Outcome of a test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Verdict {
    #[default]
    Pending,
    Running,
    Pass,
    Fail,
}

impl Verdict {
    pub fn label(self) -> &'static str {
        match self {
            Verdict::Pending => "--",
            Verdict::Running => "RUNNING",
            Verdict::Pass => "PASS",
            Verdict::Fail => "FAIL",
        }
    }

    /// Whether a result may move from `self` to `next`
    pub fn can_move_to(self, next: Verdict) -> bool {
        matches!(
            (self, next),
            (Verdict::Pending, Verdict::Running)
                | (Verdict::Running, Verdict::Pass)
                | (Verdict::Running, Verdict::Fail)
        )
    }
}

/// Result of the latest run of one test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TestResult {
    pub kind: TestKind,
    pub verdict: Verdict,
    /// Average (NTC) or point reading (IR)
    pub summary: Option<Deci>,
    pub min: Option<Deci>,
    pub max: Option<Deci>,
    /// Samples accepted so far (NTC)
    pub samples: u8,
}

impl TestResult {
    /// Fresh pending result
    pub fn new(kind: TestKind) -> Self {
        Self {
            kind,
            verdict: Verdict::Pending,
            summary: None,
            min: None,
            max: None,
            samples: 0,
        }
    }

    /// Move to `next` if the transition is allowed
    ///
    /// Returns false and leaves the verdict alone otherwise.
    pub fn advance(&mut self, next: Verdict) -> bool {
        if !self.verdict.can_move_to(next) {
            log_warn!("{} test: {} -> {} refused", self.kind, self.verdict, next);
            return false;
        }
        self.verdict = next;
        true
    }

    /// max - min of the accepted samples
    pub fn spread(&self) -> Option<Deci> {
        match (self.min, self.max) {
            (Some(min), Some(max)) => Some(max.abs_diff(min)),
            _ => None,
        }
    }
}

/// Accumulator for a running NTC test
#[derive(Debug, Clone, Copy)]
struct NtcRun {
    started_ms: u32,
    previous: Option<Deci>,
    sum: i64,
}

/// Runs the acceptance tests and keeps their latest results
#[derive(Debug, Clone, Copy)]
pub struct TestEngine {
    config: NtcTestConfig,
    ntc: TestResult,
    ir: TestResult,
    run: Option<NtcRun>,
}

impl TestEngine {
    pub fn new(config: NtcTestConfig) -> Self {
        Self {
            config,
            ntc: TestResult::new(TestKind::Ntc),
            ir: TestResult::new(TestKind::Ir),
            run: None,
        }
    }

    /// Latest result for a test
    pub fn result(&self, kind: TestKind) -> &TestResult {
        match kind {
            TestKind::Ntc => &self.ntc,
            TestKind::Ir => &self.ir,
        }
    }

    /// Samples needed for a full NTC window
    pub fn target_samples(&self) -> u8 {
        self.config.target_samples
    }

    /// Whether the given test is collecting samples
    pub fn is_running(&self, kind: TestKind) -> bool {
        self.result(kind).verdict == Verdict::Running
    }

    /// Whether any test is collecting samples
    pub fn any_running(&self) -> bool {
        self.run.is_some()
    }

    /// Run the IR test
    ///
    /// `health` is `None` when the health query failed. The resin temperature
    /// is only read for a healthy sensor.
    pub fn run_ir(&mut self, health: Option<SensorHealth>, device: &DeviceState) -> Verdict {
        self.ir = TestResult::new(TestKind::Ir);
        self.ir.advance(Verdict::Running);

        match health {
            Some(health) if health.ir_ok => {
                let reading = device.frame.resin_temp;
                self.ir.summary = Some(reading);
                self.ir.advance(Verdict::Pass);
                log_info!("IR test pass, resin {}", reading);
            }
            Some(_) => {
                self.ir.advance(Verdict::Fail);
                log_info!("IR test fail, sensor fault");
            }
            None => {
                self.ir.advance(Verdict::Fail);
                log_info!("IR test fail, no health reply");
            }
        }
        self.ir.verdict
    }

    /// Start the NTC stability test
    ///
    /// Ignored while a run is already in progress.
    pub fn start_ntc(&mut self, health: Option<SensorHealth>, now_ms: u32) -> Verdict {
        if self.any_running() {
            return self.ntc.verdict;
        }
        self.ntc = TestResult::new(TestKind::Ntc);
        self.ntc.advance(Verdict::Running);

        match health {
            Some(health) if health.ntc_ok => {
                self.run = Some(NtcRun {
                    started_ms: now_ms,
                    previous: None,
                    sum: 0,
                });
                log_info!("NTC test started");
            }
            Some(_) => {
                self.ntc.advance(Verdict::Fail);
                log_info!("NTC test fail, sensor fault");
            }
            None => {
                self.ntc.advance(Verdict::Fail);
                log_info!("NTC test fail, no health reply");
            }
        }
        self.ntc.verdict
    }

    /// Feed one plate temperature sample
    ///
    /// Returns true when the sample finished the test.
    pub fn feed_ntc(&mut self, sample: Deci) -> bool {
        let Some(run) = self.run.as_mut() else {
            return false;
        };
        let config = &self.config;
        let result = &mut self.ntc;

        if sample < config.min_temp || sample > config.max_temp {
            log_info!("NTC test fail, sample {} out of range", sample);
            result.summary = Some(sample);
            result.advance(Verdict::Fail);
            self.run = None;
            return true;
        }

        if let Some(previous) = run.previous {
            if sample.abs_diff(previous) > config.max_step {
                log_info!("NTC test fail, jump {} -> {}", previous, sample);
                result.summary = Some(sample);
                result.advance(Verdict::Fail);
                self.run = None;
                return true;
            }
        }

        run.previous = Some(sample);
        run.sum += i64::from(sample.tenths());
        result.samples += 1;
        result.min = Some(result.min.map_or(sample, |min| min.min(sample)));
        result.max = Some(result.max.map_or(sample, |max| max.max(sample)));

        if result.samples >= config.target_samples {
            self.finish();
            return true;
        }
        false
    }

    /// Finalize the NTC test if its timeout has passed
    ///
    /// Returns true when the test was finalized by this call.
    pub fn check_timeout(&mut self, now_ms: u32) -> bool {
        let Some(run) = self.run else {
            return false;
        };
        if now_ms.wrapping_sub(run.started_ms) < self.config.timeout_ms {
            return false;
        }

        if self.ntc.samples == 0 {
            log_info!("NTC test fail, timeout without samples");
            self.ntc.summary = Some(Deci::ZERO);
            self.ntc.advance(Verdict::Fail);
            self.run = None;
        } else {
            log_info!("NTC test timeout after {} samples", self.ntc.samples);
            self.finish();
        }
        true
    }

    /// Verdict from the average and spread of the collected window
    fn finish(&mut self) {
        let Some(run) = self.run.take() else {
            return;
        };
        let result = &mut self.ntc;

        let average = Deci::from_tenths((run.sum / i64::from(result.samples.max(1))) as i32);
        result.summary = Some(average);

        let in_range = average >= self.config.min_temp && average <= self.config.max_temp;
        let stable = result.spread().is_some_and(|s| s <= self.config.max_spread);

        result.advance(if in_range && stable {
            Verdict::Pass
        } else {
            Verdict::Fail
        });
        log_info!(
            "NTC test {}, avg {} over {} samples",
            result.verdict,
            average,
            result.samples
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const HEALTHY: SensorHealth = SensorHealth {
        ntc_ok: true,
        ir_ok: true,
    };

    fn engine() -> TestEngine {
        TestEngine::new(NtcTestConfig::default())
    }

    fn feed_all(engine: &mut TestEngine, samples: &[i32]) {
        for &s in samples {
            engine.feed_ntc(Deci::from_tenths(s));
        }
    }

    #[test]
    fn test_ntc_identical_samples_pass() {
        let mut engine = engine();
        assert_eq!(engine.start_ntc(Some(HEALTHY), 0), Verdict::Running);
        feed_all(&mut engine, &[250; 20]);

        let result = engine.result(TestKind::Ntc);
        assert_eq!(result.verdict, Verdict::Pass);
        assert_eq!(result.samples, 20);
        assert_eq!(result.summary, Some(Deci::from_tenths(250)));
        assert_eq!(result.spread(), Some(Deci::ZERO));
        assert!(!engine.any_running());
    }

    #[test]
    fn test_ntc_jump_fails_immediately() {
        let mut engine = engine();
        engine.start_ntc(Some(HEALTHY), 0);
        feed_all(&mut engine, &[250, 255, 263]);

        let result = engine.result(TestKind::Ntc);
        assert_eq!(result.verdict, Verdict::Fail);
        assert_eq!(result.samples, 2);

        // Further samples are ignored
        assert!(!engine.feed_ntc(Deci::from_tenths(263)));
        assert_eq!(engine.result(TestKind::Ntc).samples, 2);
    }

    #[test]
    fn test_ntc_step_of_exactly_limit_is_accepted() {
        let mut engine = engine();
        engine.start_ntc(Some(HEALTHY), 0);
        feed_all(&mut engine, &[250, 257]);
        assert!(engine.is_running(TestKind::Ntc));
        assert_eq!(engine.result(TestKind::Ntc).samples, 2);
    }

    #[test]
    fn test_ntc_spread_at_limit_passes() {
        // 0.5 steps up to 3.0 above the start, then hold
        let mut samples = [280; 20];
        for (i, s) in samples.iter_mut().enumerate().take(7) {
            *s = 250 + 5 * i as i32;
        }
        let mut engine = engine();
        engine.start_ntc(Some(HEALTHY), 0);
        feed_all(&mut engine, &samples);

        let result = engine.result(TestKind::Ntc);
        assert_eq!(result.spread(), Some(Deci::from_tenths(30)));
        assert_eq!(result.verdict, Verdict::Pass);
    }

    #[test]
    fn test_ntc_spread_over_limit_fails() {
        let mut samples = [281; 20];
        for (i, s) in samples.iter_mut().enumerate().take(7) {
            *s = 250 + 5 * i as i32;
        }
        samples[7] = 281;
        let mut engine = engine();
        engine.start_ntc(Some(HEALTHY), 0);
        feed_all(&mut engine, &samples);

        let result = engine.result(TestKind::Ntc);
        assert_eq!(result.spread(), Some(Deci::from_tenths(31)));
        assert_eq!(result.samples, 20);
        assert_eq!(result.verdict, Verdict::Fail);
    }

    #[test]
    fn test_ntc_out_of_range_sample() {
        let mut engine = engine();
        engine.start_ntc(Some(HEALTHY), 0);
        assert!(engine.feed_ntc(Deci::from_tenths(1001)));
        assert_eq!(engine.result(TestKind::Ntc).verdict, Verdict::Fail);
    }

    #[test]
    fn test_ntc_unhealthy_or_no_reply() {
        let mut engine = engine();
        let faulted = SensorHealth {
            ntc_ok: false,
            ir_ok: true,
        };
        assert_eq!(engine.start_ntc(Some(faulted), 0), Verdict::Fail);
        assert_eq!(engine.start_ntc(None, 0), Verdict::Fail);
        assert!(!engine.any_running());
    }

    #[test]
    fn test_ntc_timeout_without_samples() {
        let mut engine = engine();
        engine.start_ntc(Some(HEALTHY), 1000);
        assert!(!engine.check_timeout(5999));
        assert!(engine.check_timeout(6000));

        let result = engine.result(TestKind::Ntc);
        assert_eq!(result.verdict, Verdict::Fail);
        assert_eq!(result.summary, Some(Deci::ZERO));
    }

    #[test]
    fn test_ntc_timeout_with_partial_window() {
        let mut engine = engine();
        engine.start_ntc(Some(HEALTHY), 0);
        feed_all(&mut engine, &[250, 251, 252, 251]);
        assert!(engine.check_timeout(5000));

        let result = engine.result(TestKind::Ntc);
        assert_eq!(result.verdict, Verdict::Pass);
        assert_eq!(result.samples, 4);
        // 1004 / 4 = 251
        assert_eq!(result.summary, Some(Deci::from_tenths(251)));
    }

    #[test]
    fn test_ntc_restart_replaces_result() {
        let mut engine = engine();
        engine.start_ntc(None, 0);
        assert_eq!(engine.result(TestKind::Ntc).verdict, Verdict::Fail);

        engine.start_ntc(Some(HEALTHY), 10);
        let result = engine.result(TestKind::Ntc);
        assert_eq!(result.verdict, Verdict::Running);
        assert_eq!(result.samples, 0);
        assert_eq!(result.summary, None);
    }

    #[test]
    fn test_ntc_start_while_running_ignored() {
        let mut engine = engine();
        engine.start_ntc(Some(HEALTHY), 0);
        feed_all(&mut engine, &[250, 250]);
        assert_eq!(engine.start_ntc(Some(HEALTHY), 100), Verdict::Running);
        assert_eq!(engine.result(TestKind::Ntc).samples, 2);
    }

    #[test]
    fn test_ir_pass_reads_resin() {
        let mut engine = engine();
        let mut device = DeviceState::new(1000);
        device.apply_line(b"$1,2,3,245", 0).unwrap();

        assert_eq!(engine.run_ir(Some(HEALTHY), &device), Verdict::Pass);
        assert_eq!(
            engine.result(TestKind::Ir).summary,
            Some(Deci::from_tenths(245))
        );
    }

    #[test]
    fn test_ir_unhealthy_has_no_reading() {
        let mut engine = engine();
        let mut device = DeviceState::new(1000);
        device.apply_line(b"$1,2,3,245", 0).unwrap();
        let faulted = SensorHealth {
            ntc_ok: true,
            ir_ok: false,
        };

        assert_eq!(engine.run_ir(Some(faulted), &device), Verdict::Fail);
        assert_eq!(engine.result(TestKind::Ir).summary, None);
        assert_eq!(engine.run_ir(None, &device), Verdict::Fail);
        assert_eq!(engine.result(TestKind::Ir).summary, None);
    }

    #[test]
    fn test_verdict_transitions() {
        use Verdict::*;
        let all = [Pending, Running, Pass, Fail];
        for from in all {
            for to in all {
                let allowed = matches!(
                    (from, to),
                    (Pending, Running) | (Running, Pass) | (Running, Fail)
                );
                assert_eq!(from.can_move_to(to), allowed, "{:?} -> {:?}", from, to);
            }
        }
    }

    #[test]
    fn test_result_skips_refused() {
        let mut result = TestResult::new(TestKind::Ir);
        assert!(!result.advance(Verdict::Pass));
        assert_eq!(result.verdict, Verdict::Pending);

        assert!(result.advance(Verdict::Running));
        assert!(result.advance(Verdict::Fail));
        assert!(!result.advance(Verdict::Running));
        assert_eq!(result.verdict, Verdict::Fail);
    }

    #[test]
    fn test_health_fault_ntc_settles_through_running() {
        let mut engine = engine();
        let faulted = SensorHealth {
            ntc_ok: false,
            ir_ok: true,
        };
        // A Pending -> Fail jump would be refused and leave Pending behind
        assert_eq!(engine.start_ntc(Some(faulted), 0), Verdict::Fail);
        assert_eq!(engine.start_ntc(None, 0), Verdict::Fail);
        assert!(!engine.any_running());
    }

    proptest! {
        /// A full window of gentle in-range samples always reaches a verdict
        #[test]
        fn prop_gentle_window_finishes(
            start in 0i32..=900,
            steps in proptest::collection::vec(-7i32..=7, 19),
        ) {
            let mut engine = engine();
            engine.start_ntc(Some(HEALTHY), 0);
            let mut value = start;
            engine.feed_ntc(Deci::from_tenths(value));
            for step in steps {
                value = (value + step).clamp(0, 1000);
                engine.feed_ntc(Deci::from_tenths(value));
            }

            let result = engine.result(TestKind::Ntc);
            prop_assert!(!engine.any_running());
            prop_assert_eq!(result.samples, 20);
            let spread = result.spread().unwrap();
            let expected = if spread <= Deci::from_whole(3) {
                Verdict::Pass
            } else {
                Verdict::Fail
            };
            prop_assert_eq!(result.verdict, expected);
        }
    }
}
