//! Embassy time driver clocked by USB audio frames
//!
//! Full-speed USB sends one isochronous frame per millisecond, so the frame
//! counter doubles as a 1 kHz tick. Time stands still while the host is not
//! streaming audio.

use core::cell::Cell;

use critical_section::Mutex;
use embassy_time_driver::{AlarmHandle, Driver};
use portable_atomic::{AtomicBool, Ordering};

struct Alarm {
    timestamp: Cell<u64>,
    callback: Cell<Option<(fn(*mut ()), *mut ())>>,
}

// Only touched inside critical sections
unsafe impl Send for Alarm {}

/// Frame counter with a single alarm
pub struct FrameClock {
    ticks: Mutex<Cell<u64>>,
    alarm_taken: AtomicBool,
    alarm: Mutex<Alarm>,
}

impl FrameClock {
    const fn new() -> Self {
        Self {
            ticks: Mutex::new(Cell::new(0)),
            alarm_taken: AtomicBool::new(false),
            alarm: Mutex::new(Alarm {
                timestamp: Cell::new(u64::MAX),
                callback: Cell::new(None),
            }),
        }
    }

    /// Count one frame and fire the alarm when due
    fn tick(&self) {
        let due = critical_section::with(|cs| {
            let now = self.ticks.borrow(cs).get() + 1;
            self.ticks.borrow(cs).set(now);

            let alarm = self.alarm.borrow(cs);
            if alarm.timestamp.get() <= now {
                alarm.timestamp.set(u64::MAX);
                alarm.callback.get()
            } else {
                None
            }
        });

        if let Some((callback, ctx)) = due {
            callback(ctx);
        }
    }
}

impl Driver for FrameClock {
    fn now(&self) -> u64 {
        critical_section::with(|cs| self.ticks.borrow(cs).get())
    }

    unsafe fn allocate_alarm(&self) -> Option<AlarmHandle> {
        if self.alarm_taken.swap(true, Ordering::AcqRel) {
            None
        } else {
            Some(AlarmHandle::new(0))
        }
    }

    fn set_alarm_callback(&self, _alarm: AlarmHandle, callback: fn(*mut ()), ctx: *mut ()) {
        critical_section::with(|cs| self.alarm.borrow(cs).callback.set(Some((callback, ctx))));
    }

    fn set_alarm(&self, _alarm: AlarmHandle, timestamp: u64) -> bool {
        critical_section::with(|cs| {
            if timestamp <= self.ticks.borrow(cs).get() {
                // Already due; the caller polls instead
                self.alarm.borrow(cs).timestamp.set(u64::MAX);
                false
            } else {
                self.alarm.borrow(cs).timestamp.set(timestamp);
                true
            }
        })
    }
}

embassy_time_driver::time_driver_impl!(static DRIVER: FrameClock = FrameClock::new());

/// Called once per transmitted USB audio frame
pub fn on_frame() {
    DRIVER.tick();
}
