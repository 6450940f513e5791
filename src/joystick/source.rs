//! Trait abstraction over the event stream to enable testing without hardware

use std::io;

use super::event::JoystickEvent;

/// A non-blocking stream of joystick events.
#[cfg_attr(test, mockall::automock)]
pub trait EventSource {
    /// Reads the next queued event.
    ///
    /// Returns `Ok(None)` once the queue is empty. Must never block.
    fn next_event(&mut self) -> io::Result<Option<JoystickEvent>>;

    /// Releases the underlying handle. Calling it again is a no-op.
    fn close(&mut self);
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// One scripted read result.
    #[derive(Debug, Clone)]
    pub enum Step {
        Event(JoystickEvent),
        Error(io::ErrorKind),
    }

    /// Event source that replays queued steps, then reports an empty queue.
    ///
    /// Clones share the queue, so a test can keep feeding events after
    /// handing a clone to a session.
    #[derive(Clone, Default)]
    pub struct ScriptedSource {
        pub steps: Arc<Mutex<VecDeque<Step>>>,
        pub reads: Arc<Mutex<usize>>,
        pub close_calls: Arc<Mutex<usize>>,
    }

    impl ScriptedSource {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push_event(&self, event: JoystickEvent) {
            self.steps.lock().unwrap().push_back(Step::Event(event));
        }

        pub fn push_axis(&self, index: u8, value: i16) {
            self.push_event(JoystickEvent::axis(index, value));
        }

        pub fn push_button(&self, index: u8, value: i16) {
            self.push_event(JoystickEvent::button(index, value));
        }

        pub fn push_error(&self, kind: io::ErrorKind) {
            self.steps.lock().unwrap().push_back(Step::Error(kind));
        }

        pub fn pending(&self) -> usize {
            self.steps.lock().unwrap().len()
        }

        pub fn reads(&self) -> usize {
            *self.reads.lock().unwrap()
        }

        pub fn close_calls(&self) -> usize {
            *self.close_calls.lock().unwrap()
        }
    }

    impl EventSource for ScriptedSource {
        fn next_event(&mut self) -> io::Result<Option<JoystickEvent>> {
            *self.reads.lock().unwrap() += 1;
            match self.steps.lock().unwrap().pop_front() {
                Some(Step::Event(event)) => Ok(Some(event)),
                Some(Step::Error(kind)) => Err(io::Error::new(kind, "Mock read error")),
                None => Ok(None),
            }
        }

        fn close(&mut self) {
            *self.close_calls.lock().unwrap() += 1;
        }
    }
}
