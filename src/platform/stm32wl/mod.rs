//! STM32WL55 platform implementation
//!
//! Power controller, wake-up sources and backup register retention for the
//! STM32WL55 Cortex-M4 core of the Kineis reference design. Registers are
//! driven through the `embassy-stm32` PAC; the core's SCB and `wfi` come
//! from `cortex-m`.
//!
//! # Feature Gate
//!
//! Only available with the `stm32wl` feature:
//!
//! ```toml
//! [dependencies]
//! kineis_lpm = { version = "0.1", features = ["stm32wl"] }
//! ```
//!
//! # Mode Mapping
//!
//! | Mode     | Hardware state                         |
//! |----------|----------------------------------------|
//! | SLEEP    | WFI, SLEEPDEEP cleared                 |
//! | STOP     | Stop 2 (LPMS = 010)                    |
//! | STANDBY  | Standby (LPMS = 011), exit via reset   |
//! | SHUTDOWN | Shutdown (LPMS = 1xx), exit via reset  |

mod power;

pub use power::Stm32wlPower;
