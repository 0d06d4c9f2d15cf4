//! Scripted remote-chat lines played back on fixed offsets after connect.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// One scripted remote message. `template` may contain a `{name}`
/// placeholder filled with the caller's display name at schedule time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptedMessage {
    pub delay_ms: u64,
    pub template: String,
}

impl ScriptedMessage {
    pub fn new(delay_ms: u64, template: impl Into<String>) -> Self {
        Self {
            delay_ms,
            template: template.into(),
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn render(&self, display_name: &str) -> String {
        self.template.replace("{name}", display_name)
    }
}

/// The stock opener script the fake peer runs after every connect.
pub fn default_script() -> Vec<ScriptedMessage> {
    vec![
        ScriptedMessage::new(3_000, "Hey {name} 😊"),
        ScriptedMessage::new(8_000, "How are you?"),
        ScriptedMessage::new(14_000, "Where are you calling from?"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_display_name_into_template() {
        let message = ScriptedMessage::new(3_000, "Hey {name} 😊");
        assert_eq!(message.render("Sam"), "Hey Sam 😊");
    }

    #[test]
    fn templates_without_placeholder_pass_through() {
        let message = ScriptedMessage::new(8_000, "How are you?");
        assert_eq!(message.render("Sam"), "How are you?");
    }

    #[test]
    fn default_script_is_ordered_by_delay() {
        let script = default_script();
        assert_eq!(script.len(), 3);
        assert!(script.windows(2).all(|pair| pair[0].delay_ms < pair[1].delay_ms));
    }
}
