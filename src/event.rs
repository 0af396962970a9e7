use crossterm::event::KeyEvent;

/// Events that can occur in the application
#[derive(Debug, Clone)]
pub enum Event {
    /// Terminal key press event
    Key(KeyEvent),
    /// Terminal resize event
    Resize(u16, u16),
    /// Tick event for periodic updates (spinner animation, outcome polling)
    Tick,
}

/// Result type for event handling
pub type EventResult<T> = anyhow::Result<T>;
