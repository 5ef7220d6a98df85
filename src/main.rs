pub(crate) mod color;
pub(crate) mod config;
pub(crate) mod effects;
pub(crate) mod events;
pub(crate) mod intervaltimer;
pub(crate) mod mqtt;
pub(crate) mod olaoutput;
pub(crate) mod progress;
pub(crate) mod scheduler;
pub(crate) mod strip;

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use clap::Parser;
use config_file::FromConfigFile;

use crate::config::Config;
use crate::events::Controller;
use crate::mqtt::MqttClient;
use crate::olaoutput::OlaOutput;
use crate::scheduler::EffectScheduler;
use crate::strip::StripDriver;

#[derive(Parser)]
struct Cli {
    /// The configuration file to read
    #[arg(short, long, value_name = "FILE", default_value = "drucklicht.toml")]
    config: std::path::PathBuf,
}

fn create_strip(config: &Config) -> Option<Box<dyn StripDriver>> {
    let ola_addr = match SocketAddr::from_str(&config.strip.ola_addr) {
        Ok(addr) => addr,
        Err(error) => {
            log::error!("Invalid OLA address {}: {}", config.strip.ola_addr, error);
            return None;
        }
    };

    match OlaOutput::new(
        ola_addr,
        config.strip.universe,
        config.strip.led_count,
        config.strip.color_order,
    ) {
        Ok(ola) => Some(Box::new(ola)),
        Err(msg) => {
            log::error!("Cannot set up OLA output: {}", msg);
            None
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Cli::parse();
    let config = match Config::from_config_file(&args.config) {
        Ok(config) => config,
        Err(error) => panic!("Cannot read {}: {}", args.config.display(), error),
    };

    // A missing strip is not fatal: the scheduler keeps reporting
    // StripUnavailable while the rest of the daemon stays up.
    let strip = create_strip(&config);
    let scheduler = Arc::new(Mutex::new(EffectScheduler::new(
        strip,
        config.strip.brightness,
    )));
    let controller = Arc::new(Mutex::new(Controller::new(
        Arc::clone(&scheduler),
        config.effects.clone(),
        config.progress.clone(),
    )));

    let shutdown_scheduler = Arc::clone(&scheduler);
    let res = ctrlc::set_handler(move || {
        log::info!("Shutting down");
        let mut scheduler = match shutdown_scheduler.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        scheduler.kill(true);
        if let Ok(Err(error)) = scheduler.with_strip(|strip| strip.blackout()) {
            log::warn!("Failed to blank the strip: {}", error);
        }
        std::process::exit(0);
    });
    if let Err(error) = res {
        panic!("Failed to register signal handler: {}", error);
    }

    let mqtt_client = match MqttClient::new(&config.mqtt, Arc::clone(&controller)) {
        Ok(mqtt_client) => mqtt_client,
        Err(msg) => panic!("Cannot set up MQTT: {}", msg),
    };

    {
        let mut controller = match controller.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        controller.startup();
    }

    mqtt_client.run();
}
