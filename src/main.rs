use std::env;
use std::fs;

use anyhow::{anyhow, Context, Result};
use log::info;

use portfolio_scene::app::{print_final_state, print_targets};
use portfolio_scene::{parse_script, HeadlessHost, Scene, Session, SessionConfig};

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}

fn run() -> Result<()> {
    let options = CliOptions::parse(env::args().skip(1))?;
    let xml = fs::read_to_string(&options.scene)
        .with_context(|| format!("failed to read scene {}", options.scene))?;
    let scene = Scene::from_xml(&xml).context("failed to parse scene XML")?;
    println!("Loaded scene with {} nodes", scene.nodes.len());

    let commands = match &options.events {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read event script {path}"))?;
            parse_script(&text).with_context(|| format!("invalid event script {path}"))?
        }
        None => Vec::new(),
    };

    let mut session = Session::new(&scene, options.config, HeadlessHost::new());
    print_targets(session.registry());

    info!("replaying {} event(s)", commands.len());
    for command in &commands {
        command.apply(&mut session);
    }
    println!("Replayed {} event(s)", commands.len());
    for url in &session.host().opened {
        println!("Opened {url}");
    }

    print_final_state(&session);
    Ok(())
}

struct CliOptions {
    scene: String,
    events: Option<String>,
    config: SessionConfig,
}

const USAGE: &str = "Usage: portfolio-scene <scene.xml> [--events <file>] [--toast-ms <n>] [--cue-ms <n>] [--link-url <url>]";

impl CliOptions {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let Some(scene) = args.next() else {
            return Err(anyhow!(USAGE));
        };
        let mut events = None;
        let mut config = SessionConfig::default();
        while let Some(arg) = args.next() {
            let mut value = || {
                args.next()
                    .ok_or_else(|| anyhow!("{arg} expects a value. {USAGE}"))
            };
            match arg.as_str() {
                "--events" => events = Some(value()?),
                "--toast-ms" => config.toast_duration_ms = parse_ms(&value()?)?,
                "--cue-ms" => config.completion_cue_delay_ms = parse_ms(&value()?)?,
                "--link-url" => config.external_link_url = value()?,
                other => return Err(anyhow!("Unknown argument: {other}. {USAGE}")),
            }
        }
        Ok(Self {
            scene,
            events,
            config,
        })
    }
}

fn parse_ms(value: &str) -> Result<u64> {
    value
        .parse::<u64>()
        .with_context(|| format!("invalid duration {value:?}"))
}
