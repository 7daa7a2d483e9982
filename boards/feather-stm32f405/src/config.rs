#![deny(unsafe_code)]
#![deny(warnings)]
//! Board configuration
//!
//! Clock tree, boot policy, store placement and the RTIC priorities the
//! worker catalogue is bound to. Build mode selection lives in `boot`.

use bootstrap_core::workers::{self, WorkerEntry};
use bootstrap_core::ReportPolicy;
use hal_abstractions::{Priority, StackSize};

/// TIM2 on APB1: timer clock = 2*APB1 when prescaler != 1
pub const TIM2_CLOCK_HZ: u32 = 84_000_000;

/// RTIC priority of the `mqtt_agent` task
pub const AGENT_TASK_PRIORITY: u8 = 2;
/// RTIC priority of every application worker task
pub const WORKER_TASK_PRIORITY: u8 = 1;

// RTIC priorities are literals on the task attributes; keep them in step
// with the catalogue
const _: () = assert!(AGENT_TASK_PRIORITY == workers::AGENT_PRIORITY.get());
const _: () = assert!(AGENT_TASK_PRIORITY > WORKER_TASK_PRIORITY);

/// Priority the RTIC task bound to `entry` was declared with
pub const fn task_priority(entry: WorkerEntry) -> Priority {
    match entry {
        WorkerEntry::Cli
        | WorkerEntry::OtaUpdate
        | WorkerEntry::DeviceDefender
        | WorkerEntry::QualificationTest
        | WorkerEntry::SubscribePublishTest => Priority::new(WORKER_TASK_PRIORITY),
    }
}

/// Boot sequencer configuration
#[derive(Debug, Clone, Copy)]
pub struct BootConfig {
    /// How a failed boot step is reported back to `init`
    pub report_policy: ReportPolicy,
    /// Task stack budget shared by the agent and all workers
    pub stack_pool: StackSize,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            report_policy: if cfg!(feature = "legacy-boot-status") {
                ReportPolicy::AlwaysPass
            } else {
                ReportPolicy::Aggregate
            },
            // 64 KB: agent (6144) + OTA (4096) + defender (2048) fit with room
            stack_pool: StackSize::words(16 * 1024),
        }
    }
}

/// Configuration store placement in internal flash
#[derive(Debug, Clone, Copy)]
pub struct KvStoreConfig {
    /// Offset of the store sector from the start of flash
    pub sector_offset: u32,
    /// Sector size in bytes
    pub sector_size: u32,
}

impl Default for KvStoreConfig {
    fn default() -> Self {
        // Sector 11, the last 128 KB sector of the 1 MB STM32F405RG flash
        Self {
            sector_offset: 0x000E_0000,
            sector_size: 128 * 1024,
        }
    }
}

/// Adafruit Feather STM32F405: 12 MHz HSE, SYSCLK 84 MHz
pub fn rcc_config() -> embassy_stm32::Config {
    use embassy_stm32::rcc::{
        AHBPrescaler, APBPrescaler, Hse, HseMode, Pll, PllMul, PllPDiv, PllPreDiv, PllQDiv,
        PllSource, Sysclk,
    };
    use embassy_stm32::time::Hertz;

    let mut config = embassy_stm32::Config::default();
    config.rcc.hse = Some(Hse {
        freq: Hertz(12_000_000),
        mode: HseMode::Oscillator,
    });

    // 12 MHz / 6 * 168 = 336 MHz VCO; /4 = 84 MHz SYSCLK, /7 = 48 MHz
    config.rcc.pll_src = PllSource::HSE;
    config.rcc.pll = Some(Pll {
        prediv: PllPreDiv::DIV6,
        mul: PllMul::MUL168,
        divp: Some(PllPDiv::DIV4),
        divq: Some(PllQDiv::DIV7),
        divr: None,
    });
    config.rcc.sys = Sysclk::PLL1_P;
    config.rcc.ahb_pre = AHBPrescaler::DIV1;
    config.rcc.apb1_pre = APBPrescaler::DIV2; // 42 MHz, TIM2 at 84 MHz
    config.rcc.apb2_pre = APBPrescaler::DIV1;
    config
}
