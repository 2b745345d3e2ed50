//! Line editor and command dispatch.
//!
//! Keystrokes arriving from the host accumulate in a bounded input line.
//! On submission the line is split into a command token and an argument,
//! matched against the registered command table and dispatched. The shell
//! also owns frame-level dispatch: START brings the terminal surface up,
//! KEYSTROKE feeds the editor, and every processed frame echoes its
//! correlation token back with a fresh seed.

pub mod commands;
pub mod status;

use heapless::String;

use crate::term::Terminal;
use crate::traits::display::{DisplayCommand, TermDisplay};
use crate::traits::settings::SettingsStore;
use crate::traits::system::{ButtonProbe, NetworkInfo, SeedSource, StorageMount, TokenExchange};
use harken_protocol::{
    commands::param_u32, correlation_token, Frame, Keystroke, CMD_TERMINAL_KEYSTROKE,
    CMD_TERMINAL_START,
};

use status::LiveStatus;

/// Input line capacity in bytes; keystrokes beyond it are dropped silently.
pub const INPUT_CAPACITY: usize = 80;

/// The prompt printed after every submitted line.
pub const PROMPT: &str = "> ";

const BACKSPACE: u8 = 0x08;

/// Collaborator handles passed into every command dispatch.
pub struct Env<'a> {
    pub settings: &'a mut dyn SettingsStore,
    pub storage: &'a dyn StorageMount,
    pub network: &'a dyn NetworkInfo,
    pub button: &'a dyn ButtonProbe,
    pub seed: &'a mut dyn SeedSource,
    pub tokens: &'a mut dyn TokenExchange,
}

/// A command handler: terminal for output, collaborators, argument text.
pub type CommandHandler<D> = fn(&mut Terminal<D>, &mut Env<'_>, &str);

/// One command table entry.
///
/// An entry with an empty name is the catch-all, invoked (with the whole
/// raw line) only when no exact name match exists.
pub struct CommandEntry<D: TermDisplay> {
    pub name: &'static str,
    pub handler: CommandHandler<D>,
}

/// The interactive shell: terminal, input line, command table.
pub struct Shell<'c, D: TermDisplay> {
    term: Terminal<D>,
    input: String<INPUT_CAPACITY>,
    commands: &'c [CommandEntry<D>],
    live: LiveStatus,
}

impl<'c, D: TermDisplay> Shell<'c, D> {
    pub fn new(term: Terminal<D>, commands: &'c [CommandEntry<D>]) -> Self {
        Self {
            term,
            input: String::new(),
            commands,
            live: LiveStatus::new(),
        }
    }

    /// Access the terminal (status prints, firmware wiring, tests).
    pub fn term_mut(&mut self) -> &mut Terminal<D> {
        &mut self.term
    }

    /// Current accumulated input line.
    pub fn input_line(&self) -> &str {
        self.input.as_str()
    }

    /// Handle one completed command frame.
    ///
    /// Unknown ids are ignored; the correlation token is echoed back with a
    /// fresh seed in every case, so the host never stalls on a bad frame.
    pub fn handle_frame(&mut self, env: &mut Env<'_>, frame: &Frame) {
        let token = correlation_token(&frame.payload).unwrap_or(0);

        match frame.command_id {
            CMD_TERMINAL_START => self.start_terminal(env),
            CMD_TERMINAL_KEYSTROKE => {
                if let Some(word) = param_u32(&frame.payload, 0) {
                    let key = Keystroke::from_word(word);
                    self.on_keystroke(env, key.ascii);
                }
            }
            _ => {
                #[cfg(feature = "defmt")]
                defmt::warn!("unknown command id {=u16}", frame.command_id);
            }
        }

        env.tokens.publish_token(token);
        env.tokens.publish_seed(env.seed.next_seed());
    }

    /// Bring the terminal surface up and print the banner.
    fn start_terminal(&mut self, env: &mut Env<'_>) {
        self.term.start_surface();
        self.term.clear_screen();
        self.term.print_str("Harken terminal ready.\n");
        self.term.print_str("Type 'help' for available commands.\n");
        // An empty submission prints the first prompt.
        self.on_keystroke(env, b'\n');
        self.term.display_mut().send_command(DisplayCommand::Terminal);
    }

    /// Single point of entry for user keystrokes.
    pub fn on_keystroke(&mut self, env: &mut Env<'_>, ch: u8) {
        match ch {
            BACKSPACE => {
                let erase = !self.input.is_empty();
                if erase {
                    self.input.pop();
                }
                self.term.backspace(erase);
            }
            b'\n' | b'\r' => self.submit_line(env),
            _ => {
                if self.input.len() < INPUT_CAPACITY {
                    let _ = self.input.push(ch as char);
                    self.term.render_char(ch);
                    self.term.refresh();
                }
                // At capacity the keystroke is dropped silently.
            }
        }
    }

    /// Periodic update of the live status lines.
    pub fn refresh_status(&mut self, env: &Env<'_>) -> bool {
        self.live.refresh(&mut self.term, env)
    }

    fn submit_line(&mut self, env: &mut Env<'_>) {
        self.term.render_char(b'\n');

        let line = self.input.as_str();
        let (token, argument) = split_command(line);

        let mut matched = false;
        for entry in self.commands {
            if !entry.name.is_empty() && entry.name == token {
                (entry.handler)(&mut self.term, env, argument);
                matched = true;
            }
        }
        // Catch-all entries see the raw line, not the trimmed argument.
        if !matched && !token.is_empty() {
            for entry in self.commands {
                if entry.name.is_empty() {
                    (entry.handler)(&mut self.term, env, line);
                }
            }
        }

        self.input.clear();
        self.term.print_str(PROMPT);
        self.term.mark_prompt_cursor();
        self.term.refresh();
    }
}

/// Split a line into the command token and the remainder argument.
fn split_command(line: &str) -> (&str, &str) {
    let trimmed = line.trim_start();
    match trimmed.split_once(|c: char| c.is_whitespace()) {
        Some((token, rest)) => (token, rest.trim_start()),
        None => (trimmed, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::screen::CursorPos;
    use crate::testutil::{row_text, EnvFixture, FakeDisplay};
    use heapless::Vec as HVec;

    fn frame(command_id: u16, payload: &[u8]) -> Frame {
        let mut vec = HVec::new();
        vec.extend_from_slice(payload).unwrap();
        Frame {
            command_id,
            payload_size: payload.len() as u16,
            payload: vec,
            checksum: 0,
        }
    }

    fn h_get(term: &mut Terminal<FakeDisplay>, _env: &mut Env<'_>, arg: &str) {
        term.print_str("get:");
        term.print_str(arg);
        term.print_str("\n");
    }

    fn h_dup(term: &mut Terminal<FakeDisplay>, _env: &mut Env<'_>, _arg: &str) {
        term.print_str("dup\n");
    }

    fn h_raw(term: &mut Terminal<FakeDisplay>, _env: &mut Env<'_>, arg: &str) {
        term.print_str("raw:");
        term.print_str(arg);
        term.print_str("\n");
    }

    fn type_line(shell: &mut Shell<'_, FakeDisplay>, env: &mut Env<'_>, line: &str) {
        for &ch in line.as_bytes() {
            shell.on_keystroke(env, ch);
        }
        shell.on_keystroke(env, b'\n');
    }

    #[test]
    fn test_exact_match_gets_trimmed_argument() {
        let table = [CommandEntry {
            name: "get",
            handler: h_get,
        }];
        let mut shell = Shell::new(Terminal::new(FakeDisplay::new()), &table);
        let mut fixture = EnvFixture::new();
        let mut env = fixture.env();

        type_line(&mut shell, &mut env, "get   foo");

        assert_eq!(row_text(shell.term_mut(), 1), "get:foo");
    }

    #[test]
    fn test_duplicate_entries_all_invoked() {
        let table = [
            CommandEntry {
                name: "go",
                handler: h_dup,
            },
            CommandEntry {
                name: "go",
                handler: h_dup,
            },
        ];
        let mut shell = Shell::new(Terminal::new(FakeDisplay::new()), &table);
        let mut fixture = EnvFixture::new();
        let mut env = fixture.env();

        type_line(&mut shell, &mut env, "go");

        assert_eq!(row_text(shell.term_mut(), 1), "dup");
        assert_eq!(row_text(shell.term_mut(), 2), "dup");
    }

    #[test]
    fn test_no_match_without_catch_all_invokes_nothing() {
        let table = [CommandEntry {
            name: "get",
            handler: h_get,
        }];
        let mut shell = Shell::new(Terminal::new(FakeDisplay::new()), &table);
        let mut fixture = EnvFixture::new();
        let mut env = fixture.env();

        type_line(&mut shell, &mut env, "bogus");

        // Row 1 holds only the reprinted prompt.
        assert_eq!(row_text(shell.term_mut(), 1), ">");
    }

    #[test]
    fn test_catch_all_receives_raw_line() {
        let table = [
            CommandEntry {
                name: "get",
                handler: h_get,
            },
            CommandEntry {
                name: "",
                handler: h_raw,
            },
        ];
        let mut shell = Shell::new(Terminal::new(FakeDisplay::new()), &table);
        let mut fixture = EnvFixture::new();
        let mut env = fixture.env();

        type_line(&mut shell, &mut env, "  bogus  x");

        // Raw line, leading spaces and all - not the trimmed argument.
        assert_eq!(row_text(shell.term_mut(), 1), "raw:  bogus  x");
    }

    #[test]
    fn test_empty_line_invokes_nothing() {
        let table = [CommandEntry {
            name: "",
            handler: h_raw,
        }];
        let mut shell = Shell::new(Terminal::new(FakeDisplay::new()), &table);
        let mut fixture = EnvFixture::new();
        let mut env = fixture.env();

        shell.on_keystroke(&mut env, b'\n');

        assert_eq!(row_text(shell.term_mut(), 1), ">");
    }

    #[test]
    fn test_backspace_edits_line_and_screen() {
        let table: [CommandEntry<FakeDisplay>; 0] = [];
        let mut shell = Shell::new(Terminal::new(FakeDisplay::new()), &table);
        let mut fixture = EnvFixture::new();
        let mut env = fixture.env();

        for &ch in b"ab" {
            shell.on_keystroke(&mut env, ch);
        }
        shell.on_keystroke(&mut env, BACKSPACE);

        assert_eq!(shell.input_line(), "a");
        assert_eq!(shell.term_mut().char_at(1, 0), 0);
        assert_eq!(shell.term_mut().cursor(), CursorPos { col: 1, row: 0 });
    }

    #[test]
    fn test_backspace_on_empty_line_keeps_cursor() {
        let table: [CommandEntry<FakeDisplay>; 0] = [];
        let mut shell = Shell::new(Terminal::new(FakeDisplay::new()), &table);
        let mut fixture = EnvFixture::new();
        let mut env = fixture.env();

        shell.on_keystroke(&mut env, BACKSPACE);

        assert_eq!(shell.input_line(), "");
        assert_eq!(shell.term_mut().cursor(), CursorPos::default());
    }

    #[test]
    fn test_input_drops_silently_at_capacity() {
        let table: [CommandEntry<FakeDisplay>; 0] = [];
        let mut shell = Shell::new(Terminal::new(FakeDisplay::new()), &table);
        let mut fixture = EnvFixture::new();
        let mut env = fixture.env();

        for _ in 0..INPUT_CAPACITY + 10 {
            shell.on_keystroke(&mut env, b'x');
        }

        assert_eq!(shell.input_line().len(), INPUT_CAPACITY);
    }

    #[test]
    fn test_start_frame_brings_up_terminal() {
        let table: [CommandEntry<FakeDisplay>; 0] = [];
        let mut shell = Shell::new(Terminal::new(FakeDisplay::new()), &table);
        let mut fixture = EnvFixture::new();
        let mut env = fixture.env();

        shell.handle_frame(&mut env, &frame(CMD_TERMINAL_START, &[1, 0, 0, 0]));

        assert_eq!(row_text(shell.term_mut(), 0), "Harken terminal ready.");
        let display = shell.term_mut().display_mut();
        assert_eq!(display.surface, Some((40, 25)));
        assert_eq!(display.commands, std::vec![DisplayCommand::Terminal]);

        drop(env);
        assert_eq!(fixture.tokens.tokens, std::vec![1]);
        assert_eq!(fixture.tokens.seeds.len(), 1);
    }

    #[test]
    fn test_keystroke_frame_feeds_editor() {
        let table: [CommandEntry<FakeDisplay>; 0] = [];
        let mut shell = Shell::new(Terminal::new(FakeDisplay::new()), &table);
        let mut fixture = EnvFixture::new();
        let mut env = fixture.env();

        // Token then the packed keystroke word for 'h'.
        let word = (b'h' as u32).to_le_bytes();
        let payload = [9, 0, 0, 0, word[0], word[1], word[2], word[3]];
        shell.handle_frame(&mut env, &frame(CMD_TERMINAL_KEYSTROKE, &payload));

        assert_eq!(shell.input_line(), "h");
        drop(env);
        assert_eq!(fixture.tokens.tokens, std::vec![9]);
    }

    #[test]
    fn test_unknown_frame_still_echoes_token() {
        let table: [CommandEntry<FakeDisplay>; 0] = [];
        let mut shell = Shell::new(Terminal::new(FakeDisplay::new()), &table);
        let mut fixture = EnvFixture::new();
        let mut env = fixture.env();

        shell.handle_frame(&mut env, &frame(0xBEEF, &[7, 0, 0, 0]));

        assert_eq!(shell.input_line(), "");
        drop(env);
        assert_eq!(fixture.tokens.tokens, std::vec![7]);
        assert_eq!(fixture.tokens.seeds.len(), 1);
    }

    #[test]
    fn test_split_command_edges() {
        assert_eq!(split_command("get foo"), ("get", "foo"));
        assert_eq!(split_command("  get   foo bar "), ("get", "foo bar "));
        assert_eq!(split_command("get"), ("get", ""));
        assert_eq!(split_command(""), ("", ""));
    }
}
