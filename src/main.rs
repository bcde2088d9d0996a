use clap::Parser;
use crossbeam::channel::{bounded, unbounded};
use dialoguer::Select;
use marimba_repeat::{
    cli::{validate_device, Args},
    handle_device_list,
    logging,
    midi::{MidirEngine, MidirInput},
    ui::run_status_display,
    Config, EngineMessage, EventLoop,
};
use std::error::Error;
use std::{io, thread};

fn main() {
    let args = Args::parse();
    initialize_logging(args.verbose);

    if let Err(e) = run(args) {
        log::error!("{}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn initialize_logging(verbose: bool) {
    match logging::init_logger(verbose) {
        Ok(()) => log::info!("Application starting"),
        Err(e) => eprintln!("Warning: {}", e),
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let (inputs, outputs) = handle_device_list();

    if args.device_list {
        list_available_devices("Available MIDI inputs:", &inputs);
        list_available_devices("Available MIDI outputs:", &outputs);
        return Ok(());
    }

    let mut config = Config::load(&args)?;
    if args.select_devices {
        config.input_device = Some(select_device("MIDI input", &inputs)?);
        config.output_device = Some(select_device("MIDI output", &outputs)?);
    }

    let input_name = config
        .input_device
        .clone()
        .ok_or("No MIDI input given, use --input or --select-devices")?;
    let output_name = config
        .output_device
        .clone()
        .ok_or("No MIDI output given, use --output or --select-devices")?;
    validate_device(&input_name, &inputs)?;
    validate_device(&output_name, &outputs)?;

    let (engine_tx, engine_rx) = unbounded();
    let engine = MidirEngine::connect(&output_name)?;
    let input = MidirInput::connect(&input_name, engine_tx.clone())?;
    println!("Repeating {} -> {}", input_name, output_name);

    let mut event_loop = EventLoop::new(&config, engine, engine_rx);
    let status_handle = if config.show_status {
        let (status_tx, status_rx) = bounded(1);
        event_loop = event_loop.with_status(status_tx);
        Some(run_status_display(status_rx))
    } else {
        None
    };

    let loop_handle = thread::spawn(move || event_loop.run());
    wait_for_enter();

    drop(input);
    engine_tx.send(EngineMessage::Shutdown)?;
    loop_handle
        .join()
        .map_err(|_| "Event loop thread panicked")?;
    if let Some(handle) = status_handle {
        let _ = handle.join();
    }

    log::info!("Application stopped");
    Ok(())
}

fn list_available_devices(title: &str, devices: &[String]) {
    println!("{}", title);
    for device in devices {
        println!("  - {}", device);
    }
}

fn select_device(prompt: &str, devices: &[String]) -> Result<String, Box<dyn Error>> {
    if devices.is_empty() {
        return Err(format!("No {} ports available", prompt).into());
    }
    let index = Select::new()
        .with_prompt(prompt)
        .items(devices)
        .default(0)
        .interact()?;
    Ok(devices[index].clone())
}

fn wait_for_enter() {
    println!("Press Enter to exit...");
    let mut line = String::new();
    if let Err(e) = io::stdin().read_line(&mut line) {
        log::error!("Failed to read stdin: {}", e);
    }
}
