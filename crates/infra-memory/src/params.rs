// Producer-side adapters: a map-backed parameter store and scripted
// conflict prompts. These double as test doubles and as the CLI's
// "dict-backed producer".

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::info;

use shotlink_core::port::parameters::{ParameterStore, Severity};
use shotlink_core::port::ConflictPrompt;

/// Parameter store backed by a plain string map.
#[derive(Default)]
pub struct MapParameterStore {
    values: Mutex<HashMap<String, String>>,
    messages: Mutex<Vec<(String, Severity)>>,
}

impl MapParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();
        {
            let mut values = store.values.lock().unwrap();
            for (k, v) in pairs {
                values.insert(k.into(), v.into());
            }
        }
        store
    }

    /// Messages shown so far (for assertions)
    pub fn messages(&self) -> Vec<(String, Severity)> {
        self.messages.lock().unwrap().clone()
    }
}

impl ParameterStore for MapParameterStore {
    fn get_parameter(&self, name: &str) -> Option<String> {
        self.values.lock().unwrap().get(name).cloned()
    }

    fn set_parameter(&self, name: &str, value: &str) {
        self.values
            .lock()
            .unwrap()
            .insert(name.to_string(), value.to_string());
    }

    fn show_message(&self, text: &str, severity: Severity) {
        info!(severity = ?severity, "{text}");
        self.messages
            .lock()
            .unwrap()
            .push((text.to_string(), severity));
    }
}

/// Prompt that replays a fixed sequence of answers. `None` entries mean
/// cancel; running out of answers also cancels.
pub struct ScriptedPrompt {
    answers: Mutex<Vec<Option<usize>>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn new(answers: Vec<Option<usize>>) -> Self {
        let mut answers = answers;
        answers.reverse(); // pop() yields in original order
        Self {
            answers: Mutex::new(answers),
            asked: Mutex::new(Vec::new()),
        }
    }

    /// One answer for every question
    pub fn always(answer: usize) -> AlwaysPrompt {
        AlwaysPrompt { answer }
    }

    /// The questions asked so far
    pub fn questions(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }
}

impl ConflictPrompt for ScriptedPrompt {
    fn ask(&self, message: &str, options: &[&str]) -> Option<usize> {
        self.asked.lock().unwrap().push(message.to_string());
        let answer = self.answers.lock().unwrap().pop().flatten()?;
        if answer >= options.len() {
            return None;
        }
        Some(answer)
    }
}

/// Prompt answering every question with the same index
pub struct AlwaysPrompt {
    answer: usize,
}

impl ConflictPrompt for AlwaysPrompt {
    fn ask(&self, _message: &str, options: &[&str]) -> Option<usize> {
        (self.answer < options.len()).then_some(self.answer)
    }
}

/// Prompt that records questions and always cancels; useful for asserting
/// that no conflict check happened at all.
#[derive(Default)]
pub struct RecordingPrompt {
    asked: Mutex<Vec<String>>,
}

impl RecordingPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn questions(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }
}

impl ConflictPrompt for RecordingPrompt {
    fn ask(&self, message: &str, _options: &[&str]) -> Option<usize> {
        self.asked.lock().unwrap().push(message.to_string());
        None
    }
}

#[cfg(test)]
#[path = "params_test.rs"]
mod params_test;
