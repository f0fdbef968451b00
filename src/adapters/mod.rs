//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to                 |
//! |----------------|--------------------|-----------------------------|
//! | `console`      | LED/Backlight/Buzzer/RenderPort, TouchPort | simulator console |
//! | `fetch_worker` | CalendarSource     | background fetch thread     |
//! | `hal`          | LedPort            | embedded-hal PWM ×3         |
//! |                | BacklightPort      | embedded-hal PWM            |
//! |                | BuzzerPort         | embedded-hal GPIO           |
//! | `log_sink`     | EventSink          | `log` facade                |
//! | `memory`       | StoragePort        | in-memory map               |
//! |                | Fetcher            | fixed event list            |
//! | `time`         | ClockPort          | host system clock           |

pub mod console;
pub mod fetch_worker;
pub mod hal;
pub mod log_sink;
pub mod memory;
pub mod time;
