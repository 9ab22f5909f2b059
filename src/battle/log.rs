//! Human-readable battle log
//!
//! Lines carry a side tag so a front end can colour attacker and defender
//! lines differently. Rendering is either plain text or lightly tagged text.

use serde::{Deserialize, Serialize};

use crate::battle::units::Side;

/// Colour hint for a log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogTag {
    Neutral,
    Attacker,
    Defender,
}

impl From<Side> for LogTag {
    fn from(side: Side) -> Self {
        match side {
            Side::Attacker => LogTag::Attacker,
            Side::Defender => LogTag::Defender,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    pub tag: LogTag,
    pub text: String,
}

/// Ordered battle log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleLog {
    pub lines: Vec<LogLine>,
}

impl BattleLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, text: impl Into<String>) {
        self.push_tagged(LogTag::Neutral, text);
    }

    pub fn push_tagged(&mut self, tag: LogTag, text: impl Into<String>) {
        self.lines.push(LogLine {
            tag,
            text: text.into(),
        });
    }

    pub fn blank(&mut self) {
        self.push("");
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.text.contains(needle))
    }

    /// Plain text, one line per entry
    pub fn render(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Text with `<attacker>`/`<defender>` wrappers on side-specific lines
    pub fn render_tagged(&self) -> String {
        self.lines
            .iter()
            .map(|line| match line.tag {
                LogTag::Neutral => line.text.clone(),
                LogTag::Attacker => format!("<attacker>{}</attacker>", line.text),
                LogTag::Defender => format!("<defender>{}</defender>", line.text),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Format a count with thousands separators (1500000 -> "1,500,000")
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(10_000_000), "10,000,000");
    }

    #[test]
    fn test_render_tagged() {
        let mut log = BattleLog::new();
        log.push("=== ROUND 1 ===");
        log.push_tagged(Side::Attacker.into(), "Conscript attacks Porter");
        assert_eq!(
            log.render_tagged(),
            "=== ROUND 1 ===\n<attacker>Conscript attacks Porter</attacker>"
        );
        assert_eq!(log.render(), "=== ROUND 1 ===\nConscript attacks Porter");
        assert!(log.contains("attacks Porter"));
    }
}
