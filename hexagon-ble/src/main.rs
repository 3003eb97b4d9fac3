//! Command-line control for Hexagon lights
//!
//! Connects to one lamp, applies a single action and optionally prints the
//! state the lamp reports back.

use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use data_encoding::HEXLOWER;
use hexagon_ble_controller::{Backoff, HexagonLight, LightConfig, RetryPolicy};
use hexagon_proto::{StateReading, TG609};
use tracing_subscriber::{EnvFilter, fmt};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const DEFAULT_MAC: &str = "FF:FF:11:52:AB:BD";
const STATUS_WAIT: Duration = Duration::from_secs(2);
const RETRY_STEP: Duration = Duration::from_millis(700);

#[derive(Parser)]
#[command(name = "hexagon-ble")]
#[command(about = "Control a Hexagon light over BLE")]
struct Cli {
    /// Lamp address (or advertised name)
    #[arg(long, env = "HEXAGON_MAC", default_value = DEFAULT_MAC)]
    mac: String,
    /// If > 0, wait this many seconds after the action and print status
    #[arg(long, default_value = "0")]
    wait: f64,
    /// Connect retries after the first attempt
    #[arg(long, default_value = "4")]
    retries: u32,
    /// Seconds allowed for one connect attempt
    #[arg(long, default_value = "15")]
    connect_timeout: f64,
    /// Seconds to scan for the lamp before a connect attempt fails
    #[arg(long, default_value = "10")]
    scan_timeout: f64,
    /// Print readings and scene lists as JSON
    #[arg(long)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Turn the lamp on
    On,
    /// Turn the lamp off
    Off,
    /// Print the state the lamp reports
    Status,
    /// List built-in scenes (no connection)
    Scenes,
    /// Set a color
    Rgb { r: u8, g: u8, b: u8 },
    /// Set brightness in percent
    Brightness {
        #[arg(allow_negative_numbers = true)]
        percent: i64,
    },
    /// Start a scene by name or index
    Scene {
        scene: String,
        /// Scene speed, 0-255
        #[arg(long)]
        speed: Option<i64>,
    },
    /// Apply several settings in one connection
    Set {
        #[arg(long, value_enum, default_value = "keep")]
        power: Power,
        #[arg(long, num_args = 3, value_names = ["R", "G", "B"])]
        rgb: Option<Vec<u8>>,
        #[arg(long, allow_negative_numbers = true)]
        brightness: Option<i64>,
        /// Scene name or index
        #[arg(long)]
        scene: Option<String>,
        #[arg(long)]
        scene_speed: Option<i64>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Power {
    On,
    Off,
    Keep,
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,hexagon=debug"));
    fmt().with_env_filter(filter).with_target(true).init();

    let cli = Cli::parse();

    if let Commands::Scenes = cli.command {
        return print_scenes(cli.json);
    }

    let config = LightConfig::default()
        .with_retry(RetryPolicy::new(cli.retries, Backoff::Linear(RETRY_STEP)))
        .with_connect_timeout(seconds(cli.connect_timeout));
    let mut light = HexagonLight::open(&cli.mac, config, TG609, seconds(cli.scan_timeout)).await?;

    let result = run(&mut light, &cli).await;
    light.disconnect().await;
    result
}

async fn run(light: &mut HexagonLight, cli: &Cli) -> Result<(), BoxError> {
    light.connect().await?;
    tracing::info!(address = light.address(), "connected");

    match &cli.command {
        Commands::On => light.turn_on().await?,
        Commands::Off => light.turn_off().await?,
        Commands::Status => {
            let wait = if cli.wait > 0.0 { seconds(cli.wait) } else { STATUS_WAIT };
            let reading = light.get_state(wait).await?;
            return print_reading(&reading, cli.json);
        }
        Commands::Scenes => {}
        Commands::Rgb { r, g, b } => light.set_rgb(*r, *g, *b).await?,
        Commands::Brightness { percent } => light.set_brightness(*percent).await?,
        Commands::Scene { scene, speed } => start_scene(light, scene, *speed).await?,
        Commands::Set {
            power,
            rgb,
            brightness,
            scene,
            scene_speed,
        } => {
            match power {
                Power::On => light.turn_on().await?,
                Power::Off => light.turn_off().await?,
                Power::Keep => {}
            }
            if let Some([r, g, b]) = rgb.as_deref() {
                light.set_rgb(*r, *g, *b).await?;
            }
            if let Some(percent) = brightness {
                light.set_brightness(*percent).await?;
            }
            match (scene, scene_speed) {
                (Some(scene), speed) => start_scene(light, scene, *speed).await?,
                (None, Some(speed)) => light.set_scene_speed(*speed).await?,
                (None, None) => {}
            }
        }
    }

    if cli.wait > 0.0 {
        let reading = light.get_state(seconds(cli.wait)).await?;
        print_reading(&reading, cli.json)?;
    }
    Ok(())
}

/// Digits go straight to the lamp as an index; anything else is a scene name
async fn start_scene(
    light: &mut HexagonLight,
    scene: &str,
    speed: Option<i64>,
) -> Result<(), BoxError> {
    let scene = scene.trim();
    match scene.parse::<u16>() {
        Ok(index) => light.set_scene(index, speed).await?,
        Err(_) => light.set_scene_by_name(scene, speed).await?,
    }
    Ok(())
}

fn print_reading(reading: &StateReading, json: bool) -> Result<(), BoxError> {
    if json {
        println!("{}", serde_json::to_string(reading)?);
        return Ok(());
    }
    match reading {
        StateReading::Reported(state) => {
            let brightness = state
                .brightness_percent
                .map_or_else(|| "unknown".to_string(), |p| p.to_string());
            let raw = HEXLOWER.encode(&state.raw);
            println!("is_on={} brightness={brightness} raw={raw}", state.is_on);
        }
        StateReading::Unknown => println!("is_on=unknown brightness=unknown raw="),
    }
    Ok(())
}

fn print_scenes(json: bool) -> Result<(), BoxError> {
    let mut scenes = TG609.scenes.list().to_vec();
    if json {
        println!("{}", serde_json::to_string_pretty(&scenes)?);
        return Ok(());
    }
    scenes.sort_by_key(|s| s.name);
    for scene in scenes {
        println!("{}={}", scene.name, scene.index);
    }
    Ok(())
}

fn seconds(s: f64) -> Duration {
    Duration::try_from_secs_f64(s).unwrap_or(Duration::ZERO)
}
