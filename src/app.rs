use crate::config::Config;
use crate::stage::{Stage, StageEvent};
use log::{debug, info};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    Initialized,
    Playing,
    Paused,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    PlayPause,
    Reset,
}

/// Widget side of the model's state changes.
pub trait Controls {
    fn model_paused(&mut self);
    fn model_played(&mut self);
    fn model_completed(&mut self);
    fn model_reset(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonIcon {
    Play,
    Pause,
}

impl ButtonIcon {
    #[cfg(test)]
    pub fn name(self) -> &'static str {
        match self {
            ButtonIcon::Play => "play_arrow",
            ButtonIcon::Pause => "pause",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayPauseButton {
    pub icon: ButtonIcon,
    pub enabled: bool,
}

impl Default for PlayPauseButton {
    fn default() -> Self {
        Self {
            icon: ButtonIcon::Play,
            enabled: true,
        }
    }
}

impl Controls for PlayPauseButton {
    fn model_paused(&mut self) {
        self.icon = ButtonIcon::Play;
    }

    fn model_played(&mut self) {
        self.icon = ButtonIcon::Pause;
    }

    fn model_completed(&mut self) {
        self.icon = ButtonIcon::Play;
        self.enabled = false;
    }

    fn model_reset(&mut self) {
        self.icon = ButtonIcon::Play;
        self.enabled = true;
    }
}

pub struct App {
    pub config: Config,
    pub state: ModelState,
    pub time: f64,
    pub stage: Stage,
    pub button: PlayPauseButton,
}

impl App {
    pub fn new(config: Config, stage: Stage) -> Self {
        Self {
            config,
            state: ModelState::Initialized,
            time: 0.0,
            stage,
            button: PlayPauseButton::default(),
        }
    }

    /// Frame period for the configured cap; a cap of 0 counts as 1 fps.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.config.fps_cap.max(1) as f64)
    }

    pub fn play(&mut self) {
        if self.state != ModelState::Initialized {
            debug!("Play ignored in {:?}", self.state);
            return;
        }
        self.state = ModelState::Playing;
        self.stage.start_animation(self.time);
        self.button.model_played();
        info!("Playing");
    }

    pub fn pause(&mut self) {
        if self.state != ModelState::Playing {
            debug!("Pause ignored in {:?}", self.state);
            return;
        }
        self.state = ModelState::Paused;
        self.stage.pause(self.time);
        self.button.model_paused();
        info!("Paused at {:.2}s", self.time);
    }

    pub fn resume(&mut self) {
        if self.state != ModelState::Paused {
            debug!("Resume ignored in {:?}", self.state);
            return;
        }
        self.state = ModelState::Playing;
        self.stage.resume(self.time);
        self.button.model_played();
        info!("Resumed at {:.2}s", self.time);
    }

    /// Back to the initial picture. Valid from any state.
    pub fn reset(&mut self) {
        self.state = ModelState::Initialized;
        self.stage.stop();
        self.stage.reset();
        self.button.model_reset();
        info!("Reset");
    }

    pub fn restart(&mut self) {
        self.reset();
        self.play();
    }

    fn set_completed(&mut self) {
        self.state = ModelState::Completed;
        self.button.model_completed();
        info!("Completed at {:.2}s", self.time);
    }

    pub fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::PlayPause => {
                if !self.button.enabled {
                    return;
                }
                match self.state {
                    ModelState::Initialized => self.play(),
                    ModelState::Playing => self.pause(),
                    ModelState::Paused => self.resume(),
                    ModelState::Completed => {}
                }
            }
            UiEvent::Reset => self.reset(),
        }
    }

    pub fn update(&mut self, dt: f64) -> Vec<StageEvent> {
        self.time += dt;
        let events = self.stage.update(self.time);
        if events.contains(&StageEvent::Completed) {
            self.set_completed();
        }
        events
    }
}
