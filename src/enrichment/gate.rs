/*!
 * Script gate run before any completion call.
 */

use anyhow::{Result, anyhow};
use whatlang::Script;

use crate::errors::LookupError;

/// Rejects input that is not written in the expected script
#[derive(Debug, Clone, Copy)]
pub struct LanguageGate {
    expected: Script,
}

impl LanguageGate {
    pub fn new(expected: Script) -> Self {
        Self { expected }
    }

    /// Build a gate from a script name such as "Arabic" (case-insensitive)
    pub fn from_script_name(name: &str) -> Result<Self> {
        find_script(name)
            .map(Self::new)
            .ok_or_else(|| anyhow!("Unknown script: {}", name))
    }

    pub fn expected(&self) -> Script {
        self.expected
    }

    /// Whether `text` is predominantly written in the expected script
    pub fn accepts(&self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        whatlang::detect_script(text) == Some(self.expected)
    }

    /// `accepts` as a classified result
    pub fn check(&self, text: &str) -> Result<(), LookupError> {
        if self.accepts(text) {
            Ok(())
        } else if text.trim().is_empty() {
            Err(LookupError::InvalidInput("input is empty".to_string()))
        } else {
            Err(LookupError::InvalidInput(format!(
                "{} is not {} text",
                text,
                self.expected.name()
            )))
        }
    }
}

/// Look up a whatlang script by name
pub fn find_script(name: &str) -> Option<Script> {
    Script::all()
        .iter()
        .copied()
        .find(|script| script.name().eq_ignore_ascii_case(name.trim()))
}
