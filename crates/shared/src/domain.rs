use serde::{Deserialize, Serialize};

/// Lifecycle of a simulated call. `Locked` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Armed,
    Connecting,
    Connected,
    Locked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatSender {
    User,
    Remote,
}

/// UI regions the session controller shows and hides through the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Panel {
    Landing,
    CallScreen,
    Loading,
    ChatBox,
    Controls,
    Paywall,
}

/// Formats elapsed whole seconds as zero-padded `MM:SS`.
pub fn format_elapsed(elapsed_seconds: u64) -> String {
    let minutes = elapsed_seconds / 60;
    let seconds = elapsed_seconds % 60;
    format!("{minutes:02}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_zero_elapsed_as_padded_zeroes() {
        assert_eq!(format_elapsed(0), "00:00");
    }

    #[test]
    fn formats_seconds_and_minutes_with_padding() {
        assert_eq!(format_elapsed(1), "00:01");
        assert_eq!(format_elapsed(59), "00:59");
        assert_eq!(format_elapsed(60), "01:00");
        assert_eq!(format_elapsed(35), "00:35");
        assert_eq!(format_elapsed(754), "12:34");
    }

    #[test]
    fn minutes_keep_growing_past_an_hour() {
        assert_eq!(format_elapsed(6000), "100:00");
    }
}
