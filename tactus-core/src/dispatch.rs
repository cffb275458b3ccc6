//! Main dispatch loop
//!
//! The cooperative half of the core, invoked once per application frame
//! (cadence set by the embedder, typically a few milliseconds and
//! decoupled from the base tick). Each frame drains all three event
//! queues to empty in fixed domain order (digital, touch with port
//! offset, analog), routes every event through device arbitration, then
//! the active page, then the raw callbacks, and finally runs the
//! per-peripheral maintenance: page view refresh, device data-feedback
//! overlay, display refresh, output flush.
//!
//! As long as the frame rate keeps up with production, backlog never
//! grows across frames; ordering within a queue is strict FIFO.

use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::event::{Event, EventKind, Origin};
use crate::nav::{ChannelLocks, NavLock, NavLockState};
use crate::queue::{SharedEventQueue, ANALOG_QUEUE_LEN, DIGITAL_QUEUE_LEN, TOUCH_QUEUE_LEN};
use crate::traits::{ControlMode, Display, Page, SharedDevice, SharedOutput, Storage};

/// How long a data-feedback overlay stays on screen, in milliseconds.
const FEEDBACK_HOLD_MS: u32 = 1000;

/// Which switch domain an event came from (selects the raw callback).
#[derive(Clone, Copy)]
enum SwitchSource {
    Digital,
    Touch,
}

/// The main-loop half: queue drains, event routing, and per-frame
/// peripheral maintenance.
pub struct Dispatcher<'a, M: RawMutex> {
    digital_queue: &'a SharedEventQueue<M, DIGITAL_QUEUE_LEN>,
    touch_queue: &'a SharedEventQueue<M, TOUCH_QUEUE_LEN>,
    analog_queue: &'a SharedEventQueue<M, ANALOG_QUEUE_LEN>,
    device: Option<&'a SharedDevice<'a, M>>,
    output: Option<&'a SharedOutput<'a, M>>,
    page: Option<&'a mut (dyn Page + 'a)>,
    display: Option<&'a mut (dyn Display + 'a)>,
    storage: Option<&'a mut (dyn Storage + 'a)>,
    locks: Option<&'a ChannelLocks>,
    nav: NavLock,
    /// Digital port count, used as the touch port offset base.
    digital_ports: u8,
    on_frame: Option<&'a mut (dyn FnMut() + 'a)>,
    on_digital: Option<&'a mut (dyn FnMut(u8, i16) + 'a)>,
    on_touch: Option<&'a mut (dyn FnMut(u8, i16) + 'a)>,
    on_analog: Option<&'a mut (dyn FnMut(u8, i16) + 'a)>,
}

impl<'a, M: RawMutex> Dispatcher<'a, M> {
    /// Create a dispatcher with no modules wired.
    pub fn new(
        digital_queue: &'a SharedEventQueue<M, DIGITAL_QUEUE_LEN>,
        touch_queue: &'a SharedEventQueue<M, TOUCH_QUEUE_LEN>,
        analog_queue: &'a SharedEventQueue<M, ANALOG_QUEUE_LEN>,
    ) -> Self {
        Self {
            digital_queue,
            touch_queue,
            analog_queue,
            device: None,
            output: None,
            page: None,
            display: None,
            storage: None,
            locks: None,
            nav: NavLock::new(),
            digital_ports: 0,
            on_frame: None,
            on_digital: None,
            on_touch: None,
            on_analog: None,
        }
    }

    /// Wire the shared device slot.
    pub fn with_device(mut self, device: &'a SharedDevice<'a, M>) -> Self {
        self.device = Some(device);
        self
    }

    /// Wire the shared output slot.
    pub fn with_output(mut self, output: &'a SharedOutput<'a, M>) -> Self {
        self.output = Some(output);
        self
    }

    /// Wire the active page.
    pub fn with_page(mut self, page: &'a mut (dyn Page + 'a)) -> Self {
        self.page = Some(page);
        self
    }

    /// Wire the display.
    pub fn with_display(mut self, display: &'a mut (dyn Display + 'a)) -> Self {
        self.display = Some(display);
        self
    }

    /// Wire the storage module (gates the data-feedback routine).
    pub fn with_storage(mut self, storage: &'a mut (dyn Storage + 'a)) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Wire the analog channel-lock handle shared with the scan driver
    /// (enables navigation-lock arbitration).
    pub fn with_nav_locks(mut self, locks: &'a ChannelLocks) -> Self {
        self.locks = Some(locks);
        self
    }

    /// Record the digital port count used to offset touch ports.
    pub fn with_digital_ports(mut self, ports: u8) -> Self {
        self.digital_ports = ports;
        self
    }

    /// Register the per-frame callback. Invoked exactly once per frame,
    /// only when no page is wired.
    pub fn on_frame(mut self, callback: &'a mut (dyn FnMut() + 'a)) -> Self {
        self.on_frame = Some(callback);
        self
    }

    /// Register the raw digital event callback.
    pub fn on_digital(mut self, callback: &'a mut (dyn FnMut(u8, i16) + 'a)) -> Self {
        self.on_digital = Some(callback);
        self
    }

    /// Register the raw touch event callback (ports arrive offset).
    pub fn on_touch(mut self, callback: &'a mut (dyn FnMut(u8, i16) + 'a)) -> Self {
        self.on_touch = Some(callback);
        self
    }

    /// Register the raw analog event callback.
    pub fn on_analog(mut self, callback: &'a mut (dyn FnMut(u8, i16) + 'a)) -> Self {
        self.on_analog = Some(callback);
        self
    }

    /// Current navigation-lock state (for diagnostics).
    pub fn nav_state(&self) -> NavLockState {
        self.nav.state()
    }

    /// Run one frame.
    ///
    /// `now_ms` is the frame timestamp handed to timer-aware peripherals
    /// for their own animation and refresh timing.
    pub fn run(&mut self, now_ms: u32) {
        if let Some(output) = self.output {
            output.lock(|o| o.borrow_mut().set_timer(now_ms));
        }
        if let Some(display) = self.display.as_mut() {
            display.set_timer(now_ms);
            display.clear();
        }

        while let Some(event) = self.digital_queue.pop() {
            self.route_switch_event(event, SwitchSource::Digital);
        }

        // Offset touch ports past the digital range so the two switch
        // domains never collide.
        let offset = self.digital_ports;
        while let Some(event) = self.touch_queue.pop() {
            let event = Event::new(event.port + offset, event.value);
            self.route_switch_event(event, SwitchSource::Touch);
        }

        while let Some(event) = self.analog_queue.pop() {
            self.route_analog_event(event);
        }

        if let Some(page) = self.page.as_mut() {
            page.process_view();
        } else if let Some(callback) = self.on_frame.as_mut() {
            callback();
        }

        if self.display.is_some() {
            if self.device.is_some() && self.storage.is_some() {
                self.process_feedback(now_ms);
            }
            if let Some(display) = self.display.as_mut() {
                display.refresh();
            }
        }

        if let Some(output) = self.output {
            output.lock(|o| o.borrow_mut().flush());
        }
    }

    /// Route one digital or touch event: device arbitration, navigation
    /// lock, page, raw callback.
    fn route_switch_event(&mut self, event: Event, source: SwitchSource) {
        if let Some(device) = self.device {
            let handled = device.lock(|d| {
                d.borrow_mut()
                    .handle_digital_event(event.port, event.value, Origin::Frame)
            });
            if handled {
                return;
            }
        }

        if let Some(page) = self.page.as_mut() {
            // A navigation gesture claims the pot channel before the page
            // sees the event, so the coarse gesture cannot double as a
            // parameter change.
            if let Some(locks) = self.locks {
                if page.uses_nav_pot() {
                    let ports = page.nav_ports();
                    if ports.is_nav_control(event.port) {
                        if let Some(pot) = ports.pot {
                            locks.lock_channel(pot);
                            self.nav.engage(pot);
                        }
                    }
                }
            }
            page.process_event(event.port, event.value, EventKind::Digital);
        }

        let callback = match source {
            SwitchSource::Digital => self.on_digital.as_mut(),
            SwitchSource::Touch => self.on_touch.as_mut(),
        };
        if let Some(callback) = callback {
            callback(event.port, event.value);
        }
    }

    /// Route one analog event: navigation-lock discard filter, edit-mode
    /// setup, device arbitration, page, raw callback.
    fn route_analog_event(&mut self, event: Event) {
        if let Some(locks) = self.locks {
            if self.nav.filter(event.port, locks) {
                return;
            }
        }

        if let Some(device) = self.device {
            let handled = device.lock(|d| {
                let mut d = d.borrow_mut();
                if d.ctrl_mode() == ControlMode::Edit {
                    d.setup_ctrl(event.port, event.value);
                }
                d.handle_analog_event(event.port, event.value, Origin::Frame)
            });
            if handled {
                return;
            }
        }

        if let Some(page) = self.page.as_mut() {
            page.process_event(event.port, event.value, EventKind::Analog);
        }

        if let Some(callback) = self.on_analog.as_mut() {
            callback(event.port, event.value);
        }
    }

    /// Device data-feedback overlay: draw while unlocked, then re-lock;
    /// clear the overlay once its hold time expires outside edit mode.
    fn process_feedback(&mut self, now_ms: u32) {
        let Some(device) = self.device else {
            return;
        };
        let Some(display) = self.display.as_mut() else {
            return;
        };

        if !device.lock(|d| d.borrow().show_data_feedback()) {
            return;
        }

        display.set_lock(false);
        device.lock(|d| d.borrow_mut().data_feedback());
        display.set_lock(true);

        let (since, in_edit) = device.lock(|d| {
            let d = d.borrow();
            (d.feedback_since(), d.ctrl_mode() == ControlMode::Edit)
        });
        if now_ms.wrapping_sub(since) >= FEEDBACK_HOLD_MS && !in_edit {
            device.lock(|d| d.borrow_mut().set_data_feedback(false));
            display.set_lock(false);
            display.clear();
        }
    }
}
