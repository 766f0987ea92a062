use std::io;
use std::time::{Duration, Instant};

use crossterm::event::Event;

use crate::drivers::InputDriver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    Continue,
    Quit,
}

/// What the loop hands to its handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick {
    /// The poll interval elapsed with no pending input. Deferred focus,
    /// timers, background-save completions and redraws run here.
    Idle(Instant),
    Input(Event),
}

/// Single-threaded loop that owns input polling.
///
/// Every pane, layout and focus mutation happens inside the handler, on the
/// thread that called [`run`](EventLoop::run). Work started elsewhere (the
/// background saver) only reports back when the handler asks for it on an
/// idle tick.
pub struct EventLoop<D> {
    driver: D,
    poll_interval: Duration,
}

impl<D: InputDriver> EventLoop<D> {
    pub fn new(driver: D, poll_interval: Duration) -> Self {
        Self {
            driver,
            poll_interval,
        }
    }

    pub fn driver(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Run until the handler returns [`ControlFlow::Quit`].
    ///
    /// Each iteration starts with an idle tick, then drains every queued
    /// input event so bursts do not fall behind rendering.
    pub fn run<F>(&mut self, mut handler: F) -> io::Result<()>
    where
        F: FnMut(Tick) -> io::Result<ControlFlow>,
    {
        loop {
            if handler(Tick::Idle(Instant::now()))? == ControlFlow::Quit {
                return Ok(());
            }
            if !self.drain_input(&mut handler)? {
                return Ok(());
            }
        }
    }

    /// Run at most `iterations` loop turns. Returns early on quit.
    pub fn run_for<F>(&mut self, iterations: usize, mut handler: F) -> io::Result<ControlFlow>
    where
        F: FnMut(Tick) -> io::Result<ControlFlow>,
    {
        for _ in 0..iterations {
            if handler(Tick::Idle(Instant::now()))? == ControlFlow::Quit {
                return Ok(ControlFlow::Quit);
            }
            if !self.drain_input(&mut handler)? {
                return Ok(ControlFlow::Quit);
            }
        }
        Ok(ControlFlow::Continue)
    }

    /// Returns false when the handler asked to quit.
    fn drain_input<F>(&mut self, handler: &mut F) -> io::Result<bool>
    where
        F: FnMut(Tick) -> io::Result<ControlFlow>,
    {
        if !self.driver.poll(self.poll_interval)? {
            return Ok(true);
        }
        loop {
            let event = self.driver.read()?;
            if handler(Tick::Input(event))? == ControlFlow::Quit {
                return Ok(false);
            }
            if !self.driver.poll(Duration::ZERO)? {
                return Ok(true);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::ScriptedDriver;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn key(ch: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE))
    }

    #[test]
    fn idle_tick_precedes_input_burst() {
        let mut lp = EventLoop::new(ScriptedDriver::new([key('a'), key('b')]), Duration::ZERO);
        let mut seen = Vec::new();
        let flow = lp
            .run_for(2, |tick| {
                seen.push(match tick {
                    Tick::Idle(_) => "idle".to_string(),
                    Tick::Input(Event::Key(KeyEvent {
                        code: KeyCode::Char(ch),
                        ..
                    })) => ch.to_string(),
                    Tick::Input(_) => "other".to_string(),
                });
                Ok(ControlFlow::Continue)
            })
            .unwrap();
        assert_eq!(flow, ControlFlow::Continue);
        assert_eq!(seen, vec!["idle", "a", "b", "idle"]);
    }

    #[test]
    fn quit_from_input_stops_the_loop() {
        let mut lp = EventLoop::new(ScriptedDriver::new([key('q'), key('z')]), Duration::ZERO);
        let mut inputs = 0;
        lp.run(|tick| {
            if let Tick::Input(_) = tick {
                inputs += 1;
                return Ok(ControlFlow::Quit);
            }
            Ok(ControlFlow::Continue)
        })
        .unwrap();
        assert_eq!(inputs, 1);
        assert_eq!(lp.driver().remaining(), 1);
    }
}
