//! Built-in command handlers.
//!
//! The firmware registers this table at startup; applications may append
//! their own entries. Handlers report problems on the terminal and return -
//! no command failure is fatal.

use core::fmt::Write as _;

use heapless::String;

use super::{status, Env};
use crate::term::Terminal;
use crate::traits::display::{DisplayCommand, TermDisplay};
use crate::traits::settings::SettingView;

/// Longest formatted output line; longer values degrade to an error line.
const OUTPUT_LINE_MAX: usize = 112;

/// The standard command table: terminal control plus the settings family.
/// The final empty-name entry is the catch-all.
pub fn builtin_commands<D: TermDisplay>() -> [super::CommandEntry<D>; 13] {
    [
        entry("clear", cmd_clear),
        entry("exit", cmd_exit),
        entry("help", cmd_help),
        entry("status", cmd_status),
        entry("settings", cmd_settings),
        entry("print", cmd_print),
        entry("save", cmd_save),
        entry("erase", cmd_erase),
        entry("get", cmd_get),
        entry("put_int", cmd_put_int),
        entry("put_bool", cmd_put_bool),
        entry("put_str", cmd_put_str),
        entry("", cmd_unknown),
    ]
}

fn entry<D: TermDisplay>(
    name: &'static str,
    handler: super::CommandHandler<D>,
) -> super::CommandEntry<D> {
    super::CommandEntry { name, handler }
}

/// Format one line onto the terminal, degrading to a message on overflow.
fn print_fmt<D: TermDisplay>(term: &mut Terminal<D>, args: core::fmt::Arguments<'_>) {
    let mut line: String<OUTPUT_LINE_MAX> = String::new();
    if line.write_fmt(args).is_ok() {
        term.print_str(&line);
    } else {
        term.print_str("Error: output line too long.\n");
    }
}

fn cmd_clear<D: TermDisplay>(term: &mut Terminal<D>, _env: &mut Env<'_>, _arg: &str) {
    term.clear_screen();
}

fn cmd_exit<D: TermDisplay>(term: &mut Terminal<D>, _env: &mut Env<'_>, _arg: &str) {
    term.print_str("Exiting terminal...\n");
    term.display_mut().send_command(DisplayCommand::Resume);
}

fn cmd_help<D: TermDisplay>(term: &mut Terminal<D>, _env: &mut Env<'_>, _arg: &str) {
    term.print_str("Available commands:\n");
    term.print_str("  clear    - Clear the screen\n");
    term.print_str("  exit     - Leave the terminal\n");
    term.print_str("  status   - Show device status\n");
    term.print_str("  settings - Settings commands help\n");
}

fn cmd_status<D: TermDisplay>(term: &mut Terminal<D>, env: &mut Env<'_>, _arg: &str) {
    status::print_status(term, env);
}

fn cmd_settings<D: TermDisplay>(term: &mut Terminal<D>, _env: &mut Env<'_>, _arg: &str) {
    term.print_str("Available settings commands:\n");
    term.print_str("  print   - Show settings\n");
    term.print_str("  save    - Save settings\n");
    term.print_str("  erase   - Erase settings\n");
    term.print_str("  get     - Get setting (requires key)\n");
    term.print_str("  put_int - Set integer (key and value)\n");
    term.print_str("  put_bool- Set boolean (key and value)\n");
    term.print_str("  put_str - Set string (key and value)\n");
    term.print_str("\n");
}

fn cmd_print<D: TermDisplay>(term: &mut Terminal<D>, env: &mut Env<'_>, _arg: &str) {
    env.settings.for_each(&mut |entry: SettingView<'_>| {
        print_fmt(
            term,
            format_args!("{} = {} ({})\n", entry.key, entry.value, entry.kind.label()),
        );
    });
}

fn cmd_save<D: TermDisplay>(term: &mut Terminal<D>, env: &mut Env<'_>, _arg: &str) {
    match env.settings.save() {
        Ok(()) => term.print_str("Settings saved.\n"),
        Err(_) => term.print_str("Error saving settings.\n"),
    }
}

fn cmd_erase<D: TermDisplay>(term: &mut Terminal<D>, env: &mut Env<'_>, _arg: &str) {
    match env.settings.erase() {
        Ok(()) => term.print_str("Settings erased.\n"),
        Err(_) => term.print_str("Error erasing settings.\n"),
    }
}

fn cmd_get<D: TermDisplay>(term: &mut Terminal<D>, env: &mut Env<'_>, arg: &str) {
    let Some((key, _)) = split_key_value(arg) else {
        term.print_str("No key provided for 'get' command.\n");
        return;
    };

    match env.settings.find(key) {
        Some(entry) => {
            print_fmt(term, format_args!("Key: {}\n", entry.key));
            print_fmt(term, format_args!("Type: {}\n", entry.kind.label()));
            print_fmt(term, format_args!("Value: {}\n", entry.value));
        }
        None => term.print_str("Key not found.\n"),
    }
}

fn cmd_put_int<D: TermDisplay>(term: &mut Terminal<D>, env: &mut Env<'_>, arg: &str) {
    let parsed = split_key_value(arg)
        .and_then(|(key, value)| Some((key, parse_int(value)?)));

    let Some((key, value)) = parsed else {
        term.print_str("Invalid arguments for 'put_int' command.\n");
        return;
    };

    match env.settings.put_int(key, value) {
        Ok(()) => {
            print_fmt(term, format_args!("Key: {}\n", key));
            print_fmt(term, format_args!("Value: {}\n", value));
        }
        Err(_) => print_fmt(
            term,
            format_args!("Error setting integer value for key: {}\n", key),
        ),
    }
}

fn cmd_put_bool<D: TermDisplay>(term: &mut Terminal<D>, env: &mut Env<'_>, arg: &str) {
    let parsed = split_key_value(arg)
        .and_then(|(key, value)| Some((key, parse_bool(value)?)));

    let Some((key, value)) = parsed else {
        term.print_str(
            "Invalid arguments for 'put_bool' command. Usage: put_bool <key> <true/false>\n",
        );
        return;
    };

    match env.settings.put_bool(key, value) {
        Ok(()) => {
            print_fmt(term, format_args!("Key: {}\n", key));
            print_fmt(
                term,
                format_args!("Value: {}\n", if value { "true" } else { "false" }),
            );
        }
        Err(_) => print_fmt(
            term,
            format_args!("Error setting boolean value for key: {}\n", key),
        ),
    }
}

fn cmd_put_str<D: TermDisplay>(term: &mut Terminal<D>, env: &mut Env<'_>, arg: &str) {
    let Some((key, value)) = split_key_value(arg) else {
        term.print_str("Invalid arguments for 'put_str' command.\n");
        return;
    };

    match env.settings.put_str(key, value) {
        Ok(()) => {
            print_fmt(term, format_args!("Key: {}\n", key));
            print_fmt(
                term,
                format_args!("Value: {}\n", if value.is_empty() { "<EMPTY>" } else { value }),
            );
        }
        Err(_) => print_fmt(
            term,
            format_args!("Error setting string value for key: {}\n", key),
        ),
    }
}

fn cmd_unknown<D: TermDisplay>(term: &mut Terminal<D>, _env: &mut Env<'_>, _arg: &str) {
    term.print_str("Unknown command. Type 'help' for a list of commands.\n");
}

/// Split an argument into its first token and the remainder.
///
/// Returns `None` when there is no token at all.
fn split_key_value(arg: &str) -> Option<(&str, &str)> {
    let arg = arg.trim_start();
    if arg.is_empty() {
        return None;
    }
    match arg.split_once(|c: char| c.is_whitespace()) {
        Some((key, rest)) => Some((key, rest.trim_start())),
        None => Some((arg, "")),
    }
}

/// Strict integer parse: trailing garbage rejects the whole value.
fn parse_int(value: &str) -> Option<i32> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    value.parse::<i32>().ok()
}

/// Accepts `true/false/t/f/1/0`, case-insensitively.
fn parse_bool(value: &str) -> Option<bool> {
    let value = value.trim();
    for truthy in ["true", "t", "1"] {
        if value.eq_ignore_ascii_case(truthy) {
            return Some(true);
        }
    }
    for falsy in ["false", "f", "0"] {
        if value.eq_ignore_ascii_case(falsy) {
            return Some(false);
        }
    }
    None
}
