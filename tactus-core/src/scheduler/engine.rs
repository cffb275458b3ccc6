//! Tick engine
//!
//! The scheduler-task half of the core. Owns the tick divider and the
//! scanner drivers, runs the every-tick callback, and executes the one
//! domain action the divider selects: millis callback, digital/touch
//! scan, analog aggregation, or output refresh.
//!
//! [`TickEngine::tick`] is the tick handler: the tick source guarantees
//! serialized delivery (notify-then-wake, never inside the hardware
//! interrupt), so the engine is owned exclusively by the scheduler task
//! and needs no locking of its own. The device and output slots are the
//! only modules it shares with the dispatch loop, each behind a scoped
//! blocking mutex.

use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::event::{Event, Origin};
use crate::queue::{SharedEventQueue, ANALOG_QUEUE_LEN, DIGITAL_QUEUE_LEN, TOUCH_QUEUE_LEN};
use crate::scheduler::divider::{DividerConfig, Domain, TickDivider};
use crate::traits::{AnalogScanner, DigitalScanner, SharedDevice, SharedOutput, TouchScanner};

/// The scheduler-task half: divider, scanners, and the scan-context
/// callbacks.
pub struct TickEngine<'a, M: RawMutex> {
    divider: TickDivider,
    digital: Option<&'a mut (dyn DigitalScanner<M> + 'a)>,
    touch: Option<&'a mut (dyn TouchScanner<M> + 'a)>,
    analog: Option<&'a mut (dyn AnalogScanner + 'a)>,
    device: Option<&'a SharedDevice<'a, M>>,
    output: Option<&'a SharedOutput<'a, M>>,
    digital_queue: &'a SharedEventQueue<M, DIGITAL_QUEUE_LEN>,
    touch_queue: &'a SharedEventQueue<M, TOUCH_QUEUE_LEN>,
    analog_queue: &'a SharedEventQueue<M, ANALOG_QUEUE_LEN>,
    on_tick: Option<&'a mut (dyn FnMut() + 'a)>,
    on_millis: Option<&'a mut (dyn FnMut() + 'a)>,
    on_analog_rt: Option<&'a mut (dyn FnMut(u8, i16) + 'a)>,
}

impl<'a, M: RawMutex> TickEngine<'a, M> {
    /// Create an engine with no modules wired and canonical divisors.
    pub fn new(
        digital_queue: &'a SharedEventQueue<M, DIGITAL_QUEUE_LEN>,
        touch_queue: &'a SharedEventQueue<M, TOUCH_QUEUE_LEN>,
        analog_queue: &'a SharedEventQueue<M, ANALOG_QUEUE_LEN>,
    ) -> Self {
        Self {
            divider: TickDivider::new(),
            digital: None,
            touch: None,
            analog: None,
            device: None,
            output: None,
            digital_queue,
            touch_queue,
            analog_queue,
            on_tick: None,
            on_millis: None,
            on_analog_rt: None,
        }
    }

    /// Override the divider configuration.
    pub fn with_divider(mut self, config: DividerConfig) -> Self {
        self.divider = TickDivider::with_config(config);
        self
    }

    /// Wire the digital input scanner.
    pub fn with_digital(mut self, scanner: &'a mut (dyn DigitalScanner<M> + 'a)) -> Self {
        self.digital = Some(scanner);
        self
    }

    /// Wire the touch scanner.
    pub fn with_touch(mut self, scanner: &'a mut (dyn TouchScanner<M> + 'a)) -> Self {
        self.touch = Some(scanner);
        self
    }

    /// Wire the analog scanner.
    pub fn with_analog(mut self, scanner: &'a mut (dyn AnalogScanner + 'a)) -> Self {
        self.analog = Some(scanner);
        self
    }

    /// Wire the shared device slot (enables the scan-context analog
    /// bypass and calibration-bounded reads).
    pub fn with_device(mut self, device: &'a SharedDevice<'a, M>) -> Self {
        self.device = Some(device);
        self
    }

    /// Wire the shared output slot (enables the output refresh domain).
    pub fn with_output(mut self, output: &'a SharedOutput<'a, M>) -> Self {
        self.output = Some(output);
        self
    }

    /// Register the every-tick (base period) callback. Runs before the
    /// divider on every tick, irrespective of domain presence.
    pub fn on_tick(mut self, callback: &'a mut (dyn FnMut() + 'a)) -> Self {
        self.on_tick = Some(callback);
        self
    }

    /// Register the 1 ms aggregate callback (millis domain).
    pub fn on_millis(mut self, callback: &'a mut (dyn FnMut() + 'a)) -> Self {
        self.on_millis = Some(callback);
        self
    }

    /// Register the low-latency analog callback. Executes in the
    /// scheduler context (keep it short) and consumes the sample,
    /// bypassing the aggregation queue.
    pub fn on_analog_rt(mut self, callback: &'a mut (dyn FnMut(u8, i16) + 'a)) -> Self {
        self.on_analog_rt = Some(callback);
        self
    }

    /// The tick handler: invoked exactly once per base tick.
    pub fn tick(&mut self) {
        if let Some(callback) = self.on_tick.as_mut() {
            callback();
        }

        let millis = self.on_millis.is_some();
        let digital = self.digital.is_some();
        let touch = self.touch.is_some();
        let analog = self.analog.is_some();
        let output = self.output.is_some();

        let fired = self.divider.advance(|domain| match domain {
            Domain::Millis => millis,
            Domain::DigitalScan => digital,
            Domain::TouchScan => touch,
            Domain::AnalogScan => analog,
            Domain::OutputFlush => output,
        });

        match fired {
            Some(Domain::Millis) => {
                if let Some(callback) = self.on_millis.as_mut() {
                    callback();
                }
            }
            Some(Domain::DigitalScan) => {
                if let Some(scanner) = self.digital.as_mut() {
                    scanner.scan(self.digital_queue);
                }
            }
            Some(Domain::TouchScan) => {
                if let Some(scanner) = self.touch.as_mut() {
                    scanner.scan(self.touch_queue);
                }
            }
            Some(Domain::AnalogScan) => self.aggregate_analog(),
            Some(Domain::OutputFlush) => {
                if let Some(output) = self.output {
                    output.lock(|o| o.borrow_mut().refresh());
                }
            }
            None => {}
        }
    }

    /// The analog aggregation bridge (analog domain action).
    ///
    /// Samples every channel and routes each meaningful change through
    /// the scan-context first-refusal chain: device handler, then the
    /// low-latency callback, and only then the aggregation queue.
    fn aggregate_analog(&mut self) {
        let Some(scanner) = self.analog.as_mut() else {
            return;
        };

        for port in 0..scanner.ports() {
            let sample = if let Some(device) = self.device {
                let (min, max) = device.lock(|d| {
                    let d = d.borrow();
                    (d.adc_min(port), d.adc_max(port))
                });
                scanner.read_ranged(port, min, max)
            } else {
                scanner.read(port)
            };
            let Some(value) = sample else {
                continue;
            };

            // Device smoothing/interception happens here in the scan
            // context; a consumed sample never touches the queue.
            let handled = match self.device {
                Some(device) => {
                    device.lock(|d| d.borrow_mut().handle_analog_event(port, value, Origin::Scan))
                }
                None => false,
            };
            if handled {
                continue;
            }

            if let Some(callback) = self.on_analog_rt.as_mut() {
                callback(port, value);
                continue;
            }

            // Hand off to the dispatch loop; a full queue drops the
            // sample silently.
            let _ = self.analog_queue.push(Event::new(port, value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::{Cell, RefCell};

    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use embassy_sync::blocking_mutex::Mutex;

    use crate::traits::{ControlMode, Device};

    type Queues = (
        SharedEventQueue<NoopRawMutex, DIGITAL_QUEUE_LEN>,
        SharedEventQueue<NoopRawMutex, TOUCH_QUEUE_LEN>,
        SharedEventQueue<NoopRawMutex, ANALOG_QUEUE_LEN>,
    );

    fn queues() -> Queues {
        (
            SharedEventQueue::new(),
            SharedEventQueue::new(),
            SharedEventQueue::new(),
        )
    }

    /// Divider config that fires the analog domain on every tick.
    fn analog_every_tick() -> DividerConfig {
        DividerConfig {
            millis: 1000,
            digital: 1000,
            touch: 1000,
            analog: 1,
            output: 1000,
        }
    }

    struct FakeAnalog {
        values: [Option<i16>; 4],
        ranged_calls: heapless::Vec<(u8, u16, u16), 16>,
    }

    impl FakeAnalog {
        fn new(values: [Option<i16>; 4]) -> Self {
            Self {
                values,
                ranged_calls: heapless::Vec::new(),
            }
        }
    }

    impl AnalogScanner for FakeAnalog {
        fn ports(&self) -> u8 {
            self.values.len() as u8
        }

        fn read(&mut self, port: u8) -> Option<i16> {
            self.values[port as usize]
        }

        fn read_ranged(&mut self, port: u8, min: u16, max: u16) -> Option<i16> {
            self.ranged_calls.push((port, min, max)).unwrap();
            self.values[port as usize]
        }
    }

    struct FakeDigital {
        events: heapless::Vec<Event, 8>,
        scans: u32,
    }

    impl DigitalScanner<NoopRawMutex> for FakeDigital {
        fn ports(&self) -> u8 {
            8
        }

        fn scan(&mut self, out: &SharedEventQueue<NoopRawMutex, DIGITAL_QUEUE_LEN>) {
            self.scans += 1;
            for event in self.events.iter() {
                out.push(*event);
            }
            self.events.clear();
        }
    }

    #[derive(Default)]
    struct FakeDevice {
        consume_analog: bool,
        analog_events: core::cell::RefCell<heapless::Vec<(u8, i16, Origin), 16>>,
    }

    impl Device for FakeDevice {
        fn handle_digital_event(&mut self, _port: u8, _value: i16, _origin: Origin) -> bool {
            false
        }

        fn handle_analog_event(&mut self, port: u8, value: i16, origin: Origin) -> bool {
            self.analog_events
                .borrow_mut()
                .push((port, value, origin))
                .unwrap();
            self.consume_analog
        }

        fn ctrl_mode(&self) -> ControlMode {
            ControlMode::Run
        }

        fn setup_ctrl(&mut self, _port: u8, _value: i16) {}

        fn adc_min(&self, port: u8) -> u16 {
            port as u16 * 10
        }

        fn adc_max(&self, port: u8) -> u16 {
            1000 + port as u16
        }

        fn show_data_feedback(&self) -> bool {
            false
        }

        fn data_feedback(&mut self) {}

        fn feedback_since(&self) -> u32 {
            0
        }

        fn set_data_feedback(&mut self, _on: bool) {}
    }

    #[test]
    fn test_every_tick_callback_runs_before_domains() {
        let (dq, tq, aq) = queues();
        let ticks = Cell::new(0u32);
        let mut on_tick = || ticks.set(ticks.get() + 1);
        let mut engine: TickEngine<'_, NoopRawMutex> =
            TickEngine::new(&dq, &tq, &aq).on_tick(&mut on_tick);

        for _ in 0..10 {
            engine.tick();
        }
        assert_eq!(ticks.get(), 10);
    }

    #[test]
    fn test_millis_cadence() {
        let (dq, tq, aq) = queues();
        let millis = Cell::new(0u32);
        let mut on_millis = || millis.set(millis.get() + 1);
        let mut engine: TickEngine<'_, NoopRawMutex> =
            TickEngine::new(&dq, &tq, &aq).on_millis(&mut on_millis);

        // Canonical divisor 4: 12 ticks = 3 firings.
        for _ in 0..12 {
            engine.tick();
        }
        assert_eq!(millis.get(), 3);
    }

    #[test]
    fn test_digital_scan_fires_and_pushes() {
        let (dq, tq, aq) = queues();
        let mut scanner = FakeDigital {
            events: heapless::Vec::from_slice(&[Event::new(2, 1), Event::new(5, 0)]).unwrap(),
            scans: 0,
        };
        let mut engine: TickEngine<'_, NoopRawMutex> =
            TickEngine::new(&dq, &tq, &aq).with_digital(&mut scanner);

        // Digital divisor 8 with nothing above it present.
        for _ in 0..8 {
            engine.tick();
        }
        assert_eq!(dq.pop(), Some(Event::new(2, 1)));
        assert_eq!(dq.pop(), Some(Event::new(5, 0)));
        assert_eq!(dq.pop(), None);
    }

    #[test]
    fn test_analog_enqueue_without_consumers() {
        let (dq, tq, aq) = queues();
        let mut scanner = FakeAnalog::new([Some(100), None, Some(300), None]);
        let mut engine: TickEngine<'_, NoopRawMutex> = TickEngine::new(&dq, &tq, &aq)
            .with_divider(analog_every_tick())
            .with_analog(&mut scanner);

        engine.tick();

        // Channels reporting None enqueue nothing.
        assert_eq!(aq.pop(), Some(Event::new(0, 100)));
        assert_eq!(aq.pop(), Some(Event::new(2, 300)));
        assert_eq!(aq.pop(), None);
    }

    #[test]
    fn test_analog_device_consumption_bypasses_queue() {
        let (dq, tq, aq) = queues();
        let mut scanner = FakeAnalog::new([Some(100), Some(200), None, None]);
        let mut device = FakeDevice {
            consume_analog: true,
            ..Default::default()
        };
        {
            let device_cell: SharedDevice<'_, NoopRawMutex> =
                Mutex::new(RefCell::new(&mut device as &mut dyn Device));
            let mut engine: TickEngine<'_, NoopRawMutex> = TickEngine::new(&dq, &tq, &aq)
                .with_divider(analog_every_tick())
                .with_analog(&mut scanner)
                .with_device(&device_cell);

            engine.tick();

            // Consumed in the scan context: nothing reaches the queue.
            assert!(aq.is_empty());
        }
        assert_eq!(
            device.analog_events.borrow().as_slice(),
            &[(0, 100, Origin::Scan), (1, 200, Origin::Scan)]
        );
        // Every channel was read through the device's calibration bounds.
        assert_eq!(
            scanner.ranged_calls.as_slice(),
            &[(0, 0, 1000), (1, 10, 1001), (2, 20, 1002), (3, 30, 1003)]
        );
    }

    #[test]
    fn test_analog_unconsumed_with_device_still_enqueues() {
        let (dq, tq, aq) = queues();
        let mut scanner = FakeAnalog::new([Some(42), None, None, None]);
        let mut device = FakeDevice::default();
        let device_cell: SharedDevice<'_, NoopRawMutex> =
            Mutex::new(RefCell::new(&mut device as &mut dyn Device));
        let mut engine: TickEngine<'_, NoopRawMutex> = TickEngine::new(&dq, &tq, &aq)
            .with_divider(analog_every_tick())
            .with_analog(&mut scanner)
            .with_device(&device_cell);

        engine.tick();

        assert_eq!(aq.pop(), Some(Event::new(0, 42)));
        assert_eq!(aq.pop(), None);
    }

    #[test]
    fn test_analog_rt_callback_bypasses_queue() {
        let (dq, tq, aq) = queues();
        let mut scanner = FakeAnalog::new([Some(7), Some(9), None, None]);
        let seen: RefCell<heapless::Vec<(u8, i16), 8>> = RefCell::new(heapless::Vec::new());
        let mut on_rt = |port, value| seen.borrow_mut().push((port, value)).unwrap();
        let mut engine: TickEngine<'_, NoopRawMutex> = TickEngine::new(&dq, &tq, &aq)
            .with_divider(analog_every_tick())
            .with_analog(&mut scanner)
            .on_analog_rt(&mut on_rt);

        engine.tick();

        assert!(aq.is_empty());
        assert_eq!(seen.borrow().as_slice(), &[(0, 7), (1, 9)]);
    }

    #[test]
    fn test_analog_queue_saturation_drops_silently() {
        let (dq, tq, aq) = queues();
        // 4 channels producing every tick against a capacity of 7: the
        // queue saturates on the second tick and keeps running.
        let mut scanner = FakeAnalog::new([Some(1), Some(2), Some(3), Some(4)]);
        let mut engine: TickEngine<'_, NoopRawMutex> = TickEngine::new(&dq, &tq, &aq)
            .with_divider(analog_every_tick())
            .with_analog(&mut scanner);

        engine.tick();
        engine.tick();
        engine.tick();

        assert_eq!(aq.len(), ANALOG_QUEUE_LEN - 1);
        // FIFO order of the accepted events is intact.
        assert_eq!(aq.pop(), Some(Event::new(0, 1)));
        assert_eq!(aq.pop(), Some(Event::new(1, 2)));
    }
}
