mod app;
mod commands;
mod config;
mod features;
mod gfx;
mod physics;
mod report;
mod stage;

use anyhow::{anyhow, Result};
use app::{App, ModelState, UiEvent};
use calloop::timer::{TimeoutAction, Timer};
use calloop::{EventLoop, LoopSignal};
use commands::watch_commands;
use config::{Config, Parameters};
use gfx::{draw::DrawContext, math::Vec2};
use log::{debug, info, warn};
use physics::TemperatureModel;
use report::{host::JsonLinesHost, TrialReporter};
use stage::{Stage, StageEvent, VIEWPORT};
use std::fs::File;
use std::os::fd::AsFd;
use std::path::Path;
use std::rc::Rc;
use std::time::Instant;

struct Runner {
    app: App,
    draw: DrawContext,
    last_frame: Instant,
    signal: LoopSignal,
}

impl Runner {
    fn frame(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f64();
        self.last_frame = now;

        for event in self.app.update(dt) {
            let name = match event {
                StageEvent::Tick(t) => format!("frame_{:04}.svg", t),
                StageEvent::Completed => "frame_done.svg".to_string(),
            };
            self.snapshot(&name);
        }
    }

    fn snapshot(&mut self, name: &str) {
        let Some(dir) = self.app.config.snapshot_dir.clone() else {
            return;
        };
        if let Err(e) = self.write_snapshot(&dir, name) {
            warn!("Failed to write snapshot {}: {}", name, e);
        }
    }

    fn write_snapshot(&mut self, dir: &Path, name: &str) -> Result<()> {
        self.draw.begin(VIEWPORT);
        self.app.stage.render(&mut self.draw);
        debug!("Snapshot {} with {} elements", name, self.draw.element_count());
        std::fs::write(dir.join(name), self.draw.flush())?;
        Ok(())
    }

    fn command(&mut self, line: &str) {
        match line.trim() {
            "" => {}
            "p" | "play" | "pause" => self.app.handle_event(UiEvent::PlayPause),
            "r" | "reset" => {
                self.app.handle_event(UiEvent::Reset);
                self.snapshot("frame_0000.svg");
            }
            "restart" => self.app.restart(),
            "q" | "quit" => self.signal.stop(),
            other => warn!("Unknown command: {}", other),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let mut config = Config::load().unwrap_or_else(|e| {
        warn!("Using default config: {}", e);
        Config::default()
    });
    let query = std::env::args().nth(1).unwrap_or_default();
    let params = Parameters::parse(&query);
    if !params.is_empty() {
        info!("Applying {} page parameters", params.len());
    }
    config.apply_parameters(&params);

    let model = Rc::new(TemperatureModel::from_config(&config)?);
    info!(
        "Simulating {} ticks, hot {:?}, cold {:?}",
        model.max_time(),
        config.hot,
        config.cold
    );

    let reporter = TrialReporter::new(Box::new(JsonLinesHost::new(std::io::stdout())));
    let stage = Stage::new(
        model,
        config.simulation.lowering_seconds,
        config.simulation.transfer_seconds,
        reporter,
    )
    .with_offset(Vec2::new(config.layout.left, config.layout.top));

    if let Some(dir) = &config.snapshot_dir {
        std::fs::create_dir_all(dir)?;
    }

    let mut event_loop: EventLoop<Runner> = EventLoop::try_new()?;
    let handle = event_loop.handle();

    let mut runner = Runner {
        app: App::new(config, stage),
        draw: DrawContext::new(),
        last_frame: Instant::now(),
        signal: event_loop.get_signal(),
    };
    let frame = runner.app.frame_interval();

    handle
        .insert_source(Timer::immediate(), move |_, _, runner| {
            runner.frame();
            if runner.app.state == ModelState::Completed {
                runner.signal.stop();
                TimeoutAction::Drop
            } else {
                TimeoutAction::ToDuration(frame)
            }
        })
        .map_err(|e| anyhow!("Failed to insert frame timer: {}", e.error))?;

    match std::io::stdin().as_fd().try_clone_to_owned() {
        Ok(fd) => {
            watch_commands(&handle, File::from(fd), |line, runner: &mut Runner| {
                runner.command(line)
            });
        }
        Err(e) => warn!("Commands disabled, stdin unavailable: {}", e),
    }

    runner.snapshot("frame_0000.svg");
    runner.app.play();

    event_loop.run(frame, &mut runner, |_| {})?;

    let trial = runner.app.stage.trial();
    info!(
        "Finished trial {} at t={} with {} samples per series",
        trial.id(),
        runner.app.stage.clock(),
        trial.series(physics::Body::Hot).data.len()
    );
    Ok(())
}
