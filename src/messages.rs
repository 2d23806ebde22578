use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::palette::{self, Color};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub color: Color,
}

impl Message {
    pub fn new<S: Into<String>>(text: S, color: Color) -> Self {
        Self {
            text: text.into(),
            color,
        }
    }

    pub fn plain<S: Into<String>>(text: S) -> Self {
        Self::new(text, palette::WHITE)
    }
}

/// Scrolling log shown in the bottom panel.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MessageLog {
    pub x: i32,
    pub width: usize,
    pub height: usize,
    pub messages: VecDeque<Message>,
}

impl MessageLog {
    pub fn new(x: i32, width: usize, height: usize) -> Self {
        Self {
            x,
            width,
            height,
            messages: VecDeque::new(),
        }
    }

    pub fn add_message(&mut self, message: Message) {
        for line in wrap(&message.text, self.width) {
            if self.messages.len() == self.height {
                self.messages.pop_front();
            }
            self.messages.push_back(Message::new(line, message.color));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let mut word = word;
        // Words longer than a full line are hard-split.
        while word.chars().count() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let split = word
                .char_indices()
                .nth(width)
                .map(|(idx, _)| idx)
                .unwrap_or(word.len());
            lines.push(word[..split].to_string());
            word = &word[split..];
        }
        if word.is_empty() {
            continue;
        }
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_messages_wrap_at_word_boundaries() {
        let mut log = MessageLog::new(0, 12, 10);
        log.add_message(Message::plain("the quick brown fox jumps"));
        let lines: Vec<&str> = log.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(lines, vec!["the quick", "brown fox", "jumps"]);
    }

    #[test]
    fn oldest_lines_scroll_off() {
        let mut log = MessageLog::new(0, 40, 2);
        log.add_message(Message::plain("one"));
        log.add_message(Message::plain("two"));
        log.add_message(Message::new("three", palette::RED));
        let lines: Vec<&str> = log.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(lines, vec!["two", "three"]);
        assert_eq!(log.messages.back().map(|m| m.color), Some(palette::RED));
    }

    #[test]
    fn oversized_words_are_split() {
        assert_eq!(wrap("abcdefgh", 3), vec!["abc", "def", "gh"]);
    }
}
