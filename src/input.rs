use std::time::{Duration, Instant};

use aho_corasick::{AhoCorasick, BuildError, Input, MatchKind};
use lib_2048::Direction;

const ESC: u8 = 0x1b;

/// What a match of one of the [`KEY_PATTERNS`] starts.
#[derive(Clone, Copy, Debug)]
enum Token {
    /// `ESC [`, followed by parameter and intermediate bytes and one final byte.
    Csi,
    /// `ESC O` and one more byte, sent for arrows in application cursor mode.
    Ss3,
    /// A lone `ESC`, or `ESC` and the key it was pressed with under Alt.
    Escape,
    Key(&'static str),
}

/// Byte sequences searched for in terminal input. The escape introducers come first so that
/// leftmost-first matching prefers `ESC [` over a bare `ESC`.
const KEY_PATTERNS: [(&str, Token); 15] = [
    ("\x1b[", Token::Csi),
    ("\x1bO", Token::Ss3),
    ("\x1b", Token::Escape),
    ("w", Token::Key("w")),
    ("a", Token::Key("a")),
    ("s", Token::Key("s")),
    ("d", Token::Key("d")),
    ("r", Token::Key("r")),
    ("q", Token::Key("q")),
    ("W", Token::Key("w")),
    ("A", Token::Key("a")),
    ("S", Token::Key("s")),
    ("D", Token::Key("d")),
    ("R", Token::Key("r")),
    ("Q", Token::Key("q")),
];

/// Key named by the final byte of an unmodified cursor key sequence.
const fn arrow_key(final_byte: u8) -> Option<&'static str> {
    match final_byte {
        b'A' => Some("arrowup"),
        b'B' => Some("arrowdown"),
        b'C' => Some("arrowright"),
        b'D' => Some("arrowleft"),
        _ => None,
    }
}

/// Decodes the body of a CSI sequence starting at `input[start]`, just past `ESC [`. Returns the
/// key and the index one past the sequence, or `None` if the input ends first.
fn csi_sequence(input: &[u8], start: usize) -> Option<(Option<&'static str>, usize)> {
    let body_len = input[start..]
        .iter()
        .position(|byte| !(0x20..=0x3f).contains(byte))?;
    let final_at = start + body_len;

    match input[final_at] {
        // Parameters such as `1;5` mark a modified key, which has no binding.
        final_byte @ 0x40..=0x7e if body_len == 0 => Some((arrow_key(final_byte), final_at + 1)),
        0x40..=0x7e => Some((None, final_at + 1)),
        // Malformed. Drop what was read so far and decode the offending byte on its own.
        _ => Some((None, final_at)),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    Restart,
    Quit,
}

/// Maps a key name such as `w` or `ArrowUp` to a direction, ignoring case.
pub fn direction_for_key(key: &str) -> Option<Direction> {
    match key.to_ascii_lowercase().as_str() {
        "w" | "arrowup" => Some(Direction::Up),
        "s" | "arrowdown" => Some(Direction::Down),
        "a" | "arrowleft" => Some(Direction::Left),
        "d" | "arrowright" => Some(Direction::Right),
        _ => None,
    }
}

pub fn command_for_key(key: &str) -> Option<Command> {
    direction_for_key(key)
        .map(Command::Move)
        .or_else(|| match key.to_ascii_lowercase().as_str() {
            "r" => Some(Command::Restart),
            "q" => Some(Command::Quit),
            _ => None,
        })
}

pub struct KeyDecoder {
    searcher: AhoCorasick,
}

impl KeyDecoder {
    pub fn new() -> Result<Self, BuildError> {
        let searcher = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostFirst)
            .build(KEY_PATTERNS.map(|(bytes, _)| bytes))?;

        Ok(Self { searcher })
    }

    /// Commands found in `input`, in order, and the number of bytes decoded. Anything after
    /// that is the start of an escape sequence cut off by the end of a read and should be kept
    /// for the next call. Unknown bytes and unbound escape sequences are skipped.
    pub fn decode(&self, input: &[u8]) -> (Vec<Command>, usize) {
        let mut commands = Vec::new();
        let mut pos = 0;

        while let Some(m) = self.searcher.find(Input::new(input).span(pos..input.len())) {
            let after = m.end();

            let (key, end) = match KEY_PATTERNS[m.pattern().as_usize()].1 {
                Token::Key(key) => (Some(key), after),
                Token::Csi => match csi_sequence(input, after) {
                    Some(decoded) => decoded,
                    None => return (commands, m.start()),
                },
                Token::Ss3 => match input.get(after) {
                    Some(&final_byte) => (arrow_key(final_byte), after + 1),
                    None => return (commands, m.start()),
                },
                Token::Escape => match input.get(after) {
                    Some(&ESC) => (None, after),
                    Some(_) => (None, after + 1),
                    None => return (commands, m.start()),
                },
            };

            commands.extend(key.and_then(command_for_key));
            pos = end;
        }

        (commands, input.len())
    }
}

/// Drops moves that arrive before `interval` has passed since the last accepted one.
#[derive(Clone, Copy, Debug)]
pub struct Cooldown {
    interval: Duration,
    ready_at: Option<Instant>,
}

impl Cooldown {
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            ready_at: None,
        }
    }

    pub fn try_acquire(&mut self, now: Instant) -> bool {
        if self.ready_at.is_some_and(|ready_at| now < ready_at) {
            return false;
        }

        self.ready_at = Some(now + self.interval);

        true
    }

    pub fn reset(&mut self) {
        self.ready_at = None;
    }
}
