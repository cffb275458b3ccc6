//! Tactus reference firmware for RP2040 boards
//!
//! Wires the Tactus core to a minimal control surface: four direct-GPIO
//! buttons, two pots on the ADC, four status LEDs. The scan task runs
//! the tick engine at the 250 us base tick; the main task runs the
//! dispatch loop every couple of milliseconds and logs the event stream
//! through raw callbacks.

#![no_std]
#![no_main]

use core::cell::RefCell;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{Adc, Channel as AdcChannel, Config as AdcConfig};
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::{Instant, Timer};
use portable_atomic::{AtomicU32, Ordering};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use tactus_core::dispatch::Dispatcher;
use tactus_core::scheduler::TickEngine;
use tactus_core::traits::{OutputDriver, SharedOutput};

use crate::channels::{ANALOG_EVENTS, DIGITAL_EVENTS, NAV_LOCKS, TOUCH_EVENTS};
use crate::drivers::{ButtonScanner, LedDriver, PotScanner};

mod channels;
mod drivers;
mod tasks;

/// Front-panel buttons on GPIO 2..=5, active low.
const BUTTON_COUNT: usize = 4;

/// Pots on the first two ADC inputs.
const POT_COUNT: usize = 2;

/// Status LEDs on GPIO 6..=9.
const LED_COUNT: usize = 4;

/// Dispatch frame interval.
const FRAME_INTERVAL_MS: u64 = 2;

// Static cells for everything the scan task borrows (must live forever)
static BUTTONS: StaticCell<ButtonScanner<BUTTON_COUNT>> = StaticCell::new();
static POTS: StaticCell<PotScanner<POT_COUNT>> = StaticCell::new();
static LEDS: StaticCell<LedDriver<LED_COUNT>> = StaticCell::new();
static OUTPUT_SLOT: StaticCell<SharedOutput<'static, CriticalSectionRawMutex>> = StaticCell::new();
static MILLIS_CB: StaticCell<fn()> = StaticCell::new();

/// 1 ms ticks since boot, counted in the scan context.
static MILLIS_TICKS: AtomicU32 = AtomicU32::new(0);

fn count_millis() {
    MILLIS_TICKS.fetch_add(1, Ordering::Relaxed);
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Tactus firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let buttons = BUTTONS.init(ButtonScanner::new([
        Input::new(p.PIN_2, Pull::Up),
        Input::new(p.PIN_3, Pull::Up),
        Input::new(p.PIN_4, Pull::Up),
        Input::new(p.PIN_5, Pull::Up),
    ]));

    let adc = Adc::new_blocking(p.ADC, AdcConfig::default());
    let pots = POTS.init(PotScanner::new(
        adc,
        [
            AdcChannel::new_pin(p.PIN_26, Pull::None),
            AdcChannel::new_pin(p.PIN_27, Pull::None),
        ],
        &NAV_LOCKS,
    ));

    let leds = LEDS.init(LedDriver::new([
        Output::new(p.PIN_6, Level::Low),
        Output::new(p.PIN_7, Level::Low),
        Output::new(p.PIN_8, Level::Low),
        Output::new(p.PIN_9, Level::Low),
    ]));
    // LED 0 blinks as a heartbeat
    leds.set(0, true);
    leds.set_blink(0, true);
    let output_slot = OUTPUT_SLOT.init(Mutex::new(RefCell::new(leds as &mut dyn OutputDriver)));

    info!(
        "Drivers initialized: {} buttons, {} pots, {} LEDs",
        BUTTON_COUNT, POT_COUNT, LED_COUNT
    );

    // Scheduler-task half
    let millis_cb = MILLIS_CB.init(count_millis);
    let engine = TickEngine::new(&DIGITAL_EVENTS, &TOUCH_EVENTS, &ANALOG_EVENTS)
        .with_digital(buttons)
        .with_analog(pots)
        .with_output(output_slot)
        .on_millis(millis_cb);

    spawner.spawn(tasks::tick_task()).unwrap();
    spawner.spawn(tasks::scan_task(engine)).unwrap();

    info!("Tick source running");

    // Main-loop half: raw callbacks log the event stream
    let mut on_digital = |port: u8, value: i16| info!("button {}: {}", port, value);
    let mut on_analog = |port: u8, value: i16| info!("pot {}: {}", port, value);
    let mut dispatcher: Dispatcher<'_, CriticalSectionRawMutex> =
        Dispatcher::new(&DIGITAL_EVENTS, &TOUCH_EVENTS, &ANALOG_EVENTS)
            .with_output(output_slot)
            .with_nav_locks(&NAV_LOCKS)
            .with_digital_ports(BUTTON_COUNT as u8)
            .on_digital(&mut on_digital)
            .on_analog(&mut on_analog);

    info!("Dispatch loop running");

    let mut frames: u32 = 0;
    loop {
        dispatcher.run(Instant::now().as_millis() as u32);

        frames = frames.wrapping_add(1);
        if frames % 4096 == 0 {
            trace!(
                "{} frames, {} ms ticked",
                frames,
                MILLIS_TICKS.load(Ordering::Relaxed)
            );
        }

        Timer::after_millis(FRAME_INTERVAL_MS).await;
    }
}
