mod demos;

use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Parser;
use winit::dpi::LogicalSize;

use prism_engine::core::{ContextConfig, FrameDriver, GpuContext};
use prism_engine::device::{Device, RecordingDevice};
use prism_engine::logging::{LoggingConfig, init_logging};
use prism_engine::window::{Runtime, RuntimeConfig};

use demos::{Demo, DemoOptions};

#[derive(Parser, Debug)]
#[command(name = "prism-studio")]
#[command(about = "Example renderers for the prism GL command layer")]
struct Args {
    /// Demo to run
    #[arg(short, long, value_enum, default_value_t = Demo::Texture)]
    demo: Demo,

    /// Image(s) for the texture demo
    #[arg(short, long = "image")]
    images: Vec<PathBuf>,

    /// Seed for randomized demos
    #[arg(long, default_value_t = 0x5eed)]
    seed: u64,

    /// Window width in logical pixels
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Window height in logical pixels
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Disable vsync and pace frames to this rate instead
    #[arg(long)]
    fps: Option<u32>,

    /// Run against a recording device instead of opening a window
    #[arg(long)]
    headless: bool,

    /// Frames to run in headless mode
    #[arg(long, default_value_t = 4)]
    frames: u32,

    /// More logging; repeat for trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log filter, e.g. "prism_engine::state=trace"; overrides -v
    #[arg(long)]
    log: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(match &args.log {
        Some(filter) => LoggingConfig::with_filter(filter.clone()),
        None => LoggingConfig::verbosity(args.verbose),
    });

    let options = DemoOptions {
        images: args.images.clone(),
        seed: args.seed,
    };

    if args.headless {
        return run_headless(&args, &options);
    }

    let config = RuntimeConfig {
        title: format!("prism studio: {:?}", args.demo),
        initial_size: LogicalSize::new(args.width as f64, args.height as f64),
        vsync: args.fps.is_none(),
        target_fps: args.fps.unwrap_or(60),
        context: ContextConfig::default(),
        ..RuntimeConfig::default()
    };
    let demo = args.demo;
    Runtime::run(config, move |ctx| demos::build(demo, ctx, &options))
}

/// Drives the demo for `args.frames` frames without a GL context and logs
/// what each frame issued.
fn run_headless(args: &Args, options: &DemoOptions) -> Result<()> {
    let (recorder, device): (Rc<RecordingDevice>, Rc<dyn Device>) = RecordingDevice::new().shared();
    let mut ctx = GpuContext::new(device, args.width, args.height, ContextConfig::default());
    let renderer = demos::build(args.demo, &mut ctx, options)?;
    log::info!("setup issued {} driver calls", recorder.take_calls().len());

    let mut driver = FrameDriver::new(ctx, renderer);
    for _ in 0..args.frames {
        let stats = driver.frame().context("headless frame failed")?;
        let calls = recorder.take_calls();
        log::info!(
            "frame {}: {} commands, {} driver calls",
            stats.frame_index,
            stats.commands,
            calls.len()
        );
        for call in &calls {
            log::trace!("  {call:?}");
        }
    }
    log::info!("{} live driver objects", recorder.live_objects());
    Ok(())
}
