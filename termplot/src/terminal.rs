// ABOUTME: Terminal geometry queries and multiplexer session detection
// ABOUTME: Geometry is best effort; callers treat a failed query as "do not clamp"

use crate::constants::env::MULTIPLEXER_SESSION;
use std::io;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalGeometry {
    pub rows: u16,
    pub columns: u16,
}

impl TerminalGeometry {
    pub fn new(rows: u16, columns: u16) -> Self {
        Self { rows, columns }
    }
}

/// Source of the controlling terminal's size
pub trait TerminalProbe: Send + Sync {
    fn geometry(&self) -> io::Result<TerminalGeometry>;
}

/// Queries the real terminal through crossterm
#[derive(Debug, Clone, Copy, Default)]
pub struct CrosstermProbe;

impl TerminalProbe for CrosstermProbe {
    fn geometry(&self) -> io::Result<TerminalGeometry> {
        let (columns, rows) = crossterm::terminal::size()?;
        Ok(TerminalGeometry { rows, columns })
    }
}

/// A geometry known up front; `None` behaves like a failed query
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedProbe(pub Option<TerminalGeometry>);

impl FixedProbe {
    pub fn rows(rows: u16) -> Self {
        Self(Some(TerminalGeometry::new(rows, 80)))
    }

    pub fn unavailable() -> Self {
        Self(None)
    }
}

impl TerminalProbe for FixedProbe {
    fn geometry(&self) -> io::Result<TerminalGeometry> {
        self.0
            .ok_or_else(|| io::Error::other("terminal geometry not available"))
    }
}

/// Whether this process runs inside a tmux session
pub fn is_multiplexed() -> bool {
    is_multiplexed_value(std::env::var(MULTIPLEXER_SESSION).ok().as_deref())
}

pub fn is_multiplexed_value(session: Option<&str>) -> bool {
    session.is_some_and(|value| value.contains("tmux"))
}

/// Whether frames are wrapped in multiplexer passthrough
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Passthrough {
    /// Follow the session environment
    #[default]
    Auto,
    Always,
    Never,
}

impl Passthrough {
    pub fn resolve(self) -> bool {
        match self {
            Passthrough::Auto => is_multiplexed(),
            Passthrough::Always => true,
            Passthrough::Never => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Passthrough::Auto => "auto",
            Passthrough::Always => "always",
            Passthrough::Never => "never",
        }
    }
}

impl FromStr for Passthrough {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Passthrough::Auto),
            "always" | "on" => Ok(Passthrough::Always),
            "never" | "off" => Ok(Passthrough::Never),
            _ => Err(format!(
                "Invalid passthrough mode '{}'. Must be one of: auto, always, never",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    #[test]
    fn test_fixed_probe() {
        let probe = FixedProbe::rows(40);
        assert_eq!(probe.geometry().unwrap().rows, 40);
        assert!(FixedProbe::unavailable().geometry().is_err());
    }

    #[test]
    fn test_multiplexer_value() {
        assert!(is_multiplexed_value(Some(
            "/private/tmp/tmux-501/default,3351,0"
        )));
        assert!(!is_multiplexed_value(Some("/tmp/screen-socket")));
        assert!(!is_multiplexed_value(Some("")));
        assert!(!is_multiplexed_value(None));
    }

    #[test]
    #[serial]
    fn test_multiplexer_env_detection() {
        let original = env::var(MULTIPLEXER_SESSION).ok();

        unsafe {
            env::set_var(MULTIPLEXER_SESSION, "/tmp/tmux-1000/default,1234,0");
        }
        assert!(is_multiplexed());
        assert!(Passthrough::Auto.resolve());

        unsafe {
            env::remove_var(MULTIPLEXER_SESSION);
        }
        assert!(!is_multiplexed());
        assert!(!Passthrough::Auto.resolve());
        assert!(Passthrough::Always.resolve());

        // Restore env
        unsafe {
            if let Some(val) = original {
                env::set_var(MULTIPLEXER_SESSION, val);
            } else {
                env::remove_var(MULTIPLEXER_SESSION);
            }
        }
    }

    #[test]
    fn test_passthrough_parsing() {
        assert_eq!("auto".parse::<Passthrough>(), Ok(Passthrough::Auto));
        assert_eq!("ALWAYS".parse::<Passthrough>(), Ok(Passthrough::Always));
        assert_eq!("off".parse::<Passthrough>(), Ok(Passthrough::Never));
        assert!("sometimes".parse::<Passthrough>().is_err());
        assert!(!Passthrough::Never.resolve());
        assert_eq!(Passthrough::default().as_str(), "auto");
    }
}
