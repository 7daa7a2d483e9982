#![deny(unsafe_code)]
#![deny(warnings)]
#![no_main]
#![no_std]

use defmt_rtt as _; // global logger
use panic_probe as _;
use rtic::app;
use rtic_monotonics::stm32::prelude::*;

mod agent;
mod boot;
mod config;
mod kvstore;
mod scheduler;

stm32_tim2_monotonic!(Mono, 1_000_000);

#[app(device = embassy_stm32, peripherals = true, dispatchers = [USART1, USART2])]
mod app {
    use super::*;
    use bootstrap_core::WorkerEntry;
    use defmt::{info, warn};
    use embassy_stm32::flash::Flash;

    use agent::{AgentCommand, AgentReceiver};
    use config::{BootConfig, KvStoreConfig};
    use kvstore::FlashKvStore;
    use scheduler::{RticScheduler, TaskLaunchers};

    #[shared]
    struct Shared {}

    #[local]
    struct Local {}

    #[init]
    fn init(_cx: init::Context) -> (Shared, Local) {
        info!("IoT firmware starting...");

        let p = embassy_stm32::init(config::rcc_config());
        Mono::start(config::TIM2_CLOCK_HZ);
        info!("TIM2 monotonic timer initialized at 1 MHz");

        let boot_config = BootConfig::default();
        let store = FlashKvStore::new(Flash::new_blocking(p.FLASH), KvStoreConfig::default());
        let scheduler = RticScheduler::new(
            boot_config.stack_pool,
            TaskLaunchers {
                agent: launch_agent,
                worker: launch_worker,
            },
        );

        // Spawned tasks start running once init returns
        let _ = boot::app_main(store, &scheduler, &scheduler, &boot_config);

        (Shared {}, Local {})
    }

    fn launch_agent(commands: AgentReceiver) -> Result<(), AgentReceiver> {
        mqtt_agent::spawn(commands)
    }

    fn launch_worker(entry: WorkerEntry, parameter: Option<u32>) -> Result<(), ()> {
        match entry {
            WorkerEntry::Cli => cli::spawn(parameter),
            WorkerEntry::OtaUpdate => ota_update::spawn(parameter),
            WorkerEntry::DeviceDefender => defender::spawn(parameter),
            WorkerEntry::QualificationTest => qualification_test::spawn(parameter),
            WorkerEntry::SubscribePublishTest => subscribe_publish_test::spawn(parameter),
        }
        .map_err(drop)
    }

    /// MQTT agent - drains the command queue onto the broker connection
    ///
    /// Runs one priority level above the workers that feed it.
    #[task(priority = 2)]
    async fn mqtt_agent(_cx: mqtt_agent::Context, mut commands: AgentReceiver) {
        info!("MQTT agent task started");
        while let Ok(command) = commands.recv().await {
            match &command {
                AgentCommand::Publish { payload, .. } => info!(
                    "Agent: publish to {} ({} bytes)",
                    command.topic(),
                    payload.len()
                ),
                AgentCommand::Subscribe { .. } => {
                    info!("Agent: subscribe to {}", command.topic())
                }
            }
        }
        warn!("MQTT agent queue closed");
    }

    /// Provisioning command line
    #[task(priority = 1)]
    async fn cli(_cx: cli::Context, _parameter: Option<u32>) {
        info!("CLI task started");
        park().await;
    }

    /// Firmware update state machine
    #[task(priority = 1)]
    async fn ota_update(_cx: ota_update::Context, _parameter: Option<u32>) {
        info!("OTA update task started");
        park().await;
    }

    /// Device defender - periodic metrics report through the agent
    #[task(priority = 1)]
    async fn defender(_cx: defender::Context, _parameter: Option<u32>) {
        info!("Device defender task started");
        let Some(mut queue) = agent::command_sender() else {
            warn!("Device defender started without MQTT agent");
            return;
        };
        loop {
            if let Some(report) = AgentCommand::publish("device/defender/metrics", b"{}") {
                if queue.send(report).await.is_err() {
                    warn!("Device defender: agent queue closed");
                    return;
                }
            }
            Mono::delay(5.minutes()).await;
        }
    }

    /// Qualification test runner
    #[task(priority = 1)]
    async fn qualification_test(_cx: qualification_test::Context, _parameter: Option<u32>) {
        info!("Qualification test task started");
        park().await;
    }

    /// Device Advisor subscribe/publish test
    #[task(priority = 1)]
    async fn subscribe_publish_test(
        _cx: subscribe_publish_test::Context,
        _parameter: Option<u32>,
    ) {
        info!("Subscribe/publish test task started");
        let Some(mut queue) = agent::command_sender() else {
            warn!("Subscribe/publish test started without MQTT agent");
            return;
        };
        let commands = [
            AgentCommand::subscribe("device/test"),
            AgentCommand::publish("device/test", b"Hello from STM32F405!"),
        ];
        for command in commands.into_iter().flatten() {
            if queue.send(command).await.is_err() {
                warn!("Subscribe/publish test: agent queue closed");
                return;
            }
        }
        park().await;
    }

    /// Placeholder body for workers whose logic lives elsewhere
    async fn park() {
        loop {
            Mono::delay(60.secs()).await;
        }
    }

    /// RTIC idle task - WFI sleep mode when no tasks active
    #[idle]
    fn idle(_cx: idle::Context) -> ! {
        info!("Idle task started - entering WFI loop");
        loop {
            cortex_m::asm::wfi();
        }
    }
}
