use crate::messaging::message_ids;

/// Operator keywords and the wall trigger each one simulates.
pub const TRIGGERS: [(&str, u16, &str); 7] = [
    ("start", message_ids::WALL_START_CHARGING, "Trigger WALL_START_CHARGING"),
    ("reset", message_ids::WALL_RESET, "Trigger WALL_RESET"),
    ("estop", message_ids::WALL_EMERGENCY_STOP, "Trigger WALL_EMERGENCY_STOP"),
    (
        "recovery",
        message_ids::WALL_EMERGENCY_STOP_RECOVERY,
        "Trigger WALL_EMERGENCY_STOP_RECOVERY",
    ),
    ("open", message_ids::WALL_OPEN_COVER, "Trigger WALL_OPEN_COVER"),
    ("close", message_ids::WALL_CLOSE_COVER, "Trigger WALL_CLOSE_COVER"),
    ("mode", message_ids::WALL_SWITCH_MODE, "Trigger WALL_SWITCH_MODE"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorCommand {
    Trigger(u16),
    Help,
    Exit,
    Unknown(String),
}

impl OperatorCommand {
    /// Parses one line of operator input. Blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let word = line.trim();
        if word.is_empty() {
            return None;
        }

        let command = match word {
            "exit" | "quit" => OperatorCommand::Exit,
            "help" => OperatorCommand::Help,
            _ => TRIGGERS
                .iter()
                .find(|(keyword, _, _)| *keyword == word)
                .map(|(_, message_id, _)| OperatorCommand::Trigger(*message_id))
                .unwrap_or_else(|| OperatorCommand::Unknown(word.to_string())),
        };
        Some(command)
    }

    pub fn help_text() -> String {
        let mut text = String::from("Commands:\n");
        for (keyword, _, description) in TRIGGERS.iter() {
            text.push_str(&format!("  {:<9}- {}\n", keyword, description));
        }
        text.push_str("  help     - Show this list\n");
        text.push_str("  exit     - Exit simulator");
        text
    }
}
