//! Interactive chat about one case.
//!
//! Answers are streamed as they arrive. Ctrl-C while an answer is
//! streaming cancels that answer; at the prompt it only prints a hint.

use std::borrow::Cow::{self, Borrowed, Owned};
use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tokio_util::sync::CancellationToken;

use super::find_case;
use crate::AppContext;
use regdesk_application::{ChatUseCase, user_facing_error};
use regdesk_core::chat::{ChatSession, SessionStore};
use regdesk_infrastructure::RegdeskPaths;
use regdesk_interaction::OpenAICompletionClient;

/// REPL commands, as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ReplCommand {
    New,
    Clear,
    Sessions,
    /// Reopen an earlier session by id prefix
    Load(String),
    Help,
    Quit,
}

/// Command name, argument placeholder and help text.
const COMMANDS: [(&str, &str, &str); 6] = [
    ("/new", "", "start a new session for this case"),
    ("/clear", "", "remove all messages from the current session"),
    ("/sessions", "", "list sessions for this case"),
    ("/load", "<id>", "reopen a session listed by /sessions (id prefix is enough)"),
    ("/help", "", "show this help"),
    ("/quit", "", "leave the chat"),
];

impl ReplCommand {
    /// Returns `None` for anything that is not a command, including a
    /// known command given an argument it does not take.
    fn parse(input: &str) -> Option<Self> {
        if !input.starts_with('/') {
            return matches!(input, "quit" | "exit").then_some(ReplCommand::Quit);
        }

        let (name, arg) = match input.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (input, ""),
        };
        match (name, arg) {
            ("/load", arg) => Some(ReplCommand::Load(arg.to_string())),
            (_, "") => match name {
                "/new" => Some(ReplCommand::New),
                "/clear" => Some(ReplCommand::Clear),
                "/sessions" => Some(ReplCommand::Sessions),
                "/help" => Some(ReplCommand::Help),
                "/quit" => Some(ReplCommand::Quit),
                _ => None,
            },
            _ => None,
        }
    }
}

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|(name, _, _)| name.to_string()).collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

pub async fn run(ctx: AppContext, case_id: &str) -> Result<()> {
    let case = find_case(&ctx.cases, case_id)?;
    let client = OpenAICompletionClient::try_from_env(&ctx.config.provider)?;
    let chat = ChatUseCase::new(Arc::new(ctx.cases), SessionStore::new(), Arc::new(client));

    let mut rl: Editor<CliHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));
    let history_file = RegdeskPaths::history_file().ok();
    if let Some(path) = &history_file {
        let _ = rl.load_history(path);
    }

    println!("{}", format!("=== {} ===", case.name).bright_magenta().bold());
    println!("{}", "Type a question, '/help' for commands, or '/quit' to exit.".bright_black());
    println!();

    let mut session = chat.start_chat(case_id)?;
    print_session(&session);

    loop {
        match rl.readline(">> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                match ReplCommand::parse(trimmed) {
                    Some(ReplCommand::Quit) => {
                        println!("{}", "Goodbye!".bright_green());
                        break;
                    }
                    Some(ReplCommand::New) => {
                        session = chat.start_chat(case_id)?;
                        print_session(&session);
                    }
                    Some(ReplCommand::Clear) => match chat.clear_chat(&session.id) {
                        Ok(()) => println!("{}", "Chat cleared.".bright_black()),
                        Err(e) => eprintln!("{}", user_facing_error(&e).red()),
                    },
                    Some(ReplCommand::Sessions) => {
                        print_sessions(&chat.sessions_for_case(case_id), &session.id)
                    }
                    Some(ReplCommand::Load(prefix)) => {
                        let sessions = chat.sessions_for_case(case_id);
                        match resolve_session(&sessions, &prefix) {
                            Ok(found) => match chat.session(&found.id) {
                                Ok(loaded) => {
                                    session = loaded;
                                    print_session(&session);
                                }
                                Err(e) => eprintln!("{}", e.to_string().red()),
                            },
                            Err(message) => println!("{}", message.bright_black()),
                        }
                    }
                    Some(ReplCommand::Help) => print_help(),
                    None if trimmed.starts_with('/') => {
                        println!("{}", format!("Unknown command: {trimmed}").bright_black());
                    }
                    None => send(&chat, &session.id, trimmed).await,
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type '/quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {err:?}").red());
                break;
            }
        }
    }

    if let Some(path) = &history_file {
        if let Err(e) = rl.save_history(path) {
            tracing::warn!("Failed to save REPL history: {e}");
        }
    }
    Ok(())
}

/// Runs one streamed turn, printing fragments as they arrive.
async fn send(chat: &ChatUseCase, session_id: &str, text: &str) {
    let cancel = CancellationToken::new();
    let watcher = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let result = chat
        .send_message_streaming(session_id, text, &cancel, |fragment| {
            print!("{}", fragment.bright_blue());
            let _ = std::io::stdout().flush();
        })
        .await;
    watcher.abort();
    println!();

    if let Err(e) = result {
        tracing::debug!(session_id, "Turn ended with error: {e}");
        eprintln!("{}", user_facing_error(&e).red());
    }
    println!();
}

fn print_session(session: &ChatSession) {
    println!("{}", format!("[session {}]", short_id(&session.id)).bright_black());
    for message in &session.messages {
        for line in message.content.lines() {
            println!("{}", line.bright_blue());
        }
    }
    println!();
}

fn print_sessions(sessions: &[ChatSession], current_id: &str) {
    for session in sessions {
        let line = session_line(session, session.id == current_id);
        if session.id == current_id {
            println!("{}", line.green());
        } else {
            println!("{line}");
        }
    }
}

fn session_line(session: &ChatSession, current: bool) -> String {
    let marker = if current { "*" } else { " " };
    let updated = session.updated_at.with_timezone(&chrono::Local).format("%H:%M");
    format!(
        "{marker} {}  {} messages  updated {updated}",
        short_id(&session.id),
        session.messages.len()
    )
}

/// Picks the session whose id starts with `prefix`. An exact id always
/// wins; otherwise the prefix must match exactly one session.
fn resolve_session<'a>(
    sessions: &'a [ChatSession],
    prefix: &str,
) -> std::result::Result<&'a ChatSession, String> {
    if prefix.is_empty() {
        return Err("Usage: /load <id> (see /sessions)".to_string());
    }
    if let Some(exact) = sessions.iter().find(|s| s.id == prefix) {
        return Ok(exact);
    }

    let matches: Vec<&ChatSession> = sessions.iter().filter(|s| s.id.starts_with(prefix)).collect();
    match matches.as_slice() {
        [only] => Ok(*only),
        [] => Err(format!("No session for this case starts with '{prefix}'.")),
        many => Err(format!("'{prefix}' matches {} sessions. Type more of the id.", many.len())),
    }
}

fn print_help() {
    for (name, args, description) in COMMANDS {
        let usage = format!("{name} {args}");
        println!("  {}  {}", format!("{usage:<14}").bright_cyan(), description.bright_black());
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn session(id: &str) -> ChatSession {
        ChatSession {
            id: id.into(),
            case_id: "case-001".into(),
            case_name: "Basel III".into(),
            messages: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn parses_commands_and_aliases() {
        assert_eq!(ReplCommand::parse("/new"), Some(ReplCommand::New));
        assert_eq!(ReplCommand::parse("/sessions"), Some(ReplCommand::Sessions));
        assert_eq!(ReplCommand::parse("exit"), Some(ReplCommand::Quit));
        assert_eq!(ReplCommand::parse("/nope"), None);
        assert_eq!(ReplCommand::parse("What is the risk level?"), None);
        assert_eq!(ReplCommand::parse("exit strategy for Basel IV?"), None);
    }

    #[test]
    fn parses_load_argument() {
        assert_eq!(
            ReplCommand::parse("/load  0123abcd "),
            Some(ReplCommand::Load("0123abcd".into()))
        );
        assert_eq!(ReplCommand::parse("/load"), Some(ReplCommand::Load(String::new())));
        assert_eq!(ReplCommand::parse("/new extra"), None);
    }

    #[test]
    fn helper_offers_every_command() {
        let helper = CliHelper::new();
        assert_eq!(
            helper.commands,
            vec!["/new", "/clear", "/sessions", "/load", "/help", "/quit"]
        );
    }

    #[test]
    fn resolves_unique_prefix_and_exact_id() {
        let sessions = vec![session("0123aaaa"), session("0123bbbb"), session("4567cccc")];

        assert_eq!(resolve_session(&sessions, "0123b").unwrap().id, "0123bbbb");
        assert_eq!(resolve_session(&sessions, "4567cccc").unwrap().id, "4567cccc");
    }

    #[test]
    fn exact_id_wins_over_longer_ids_with_same_prefix() {
        let sessions = vec![session("0123"), session("01234567")];
        assert_eq!(resolve_session(&sessions, "0123").unwrap().id, "0123");
    }

    #[test]
    fn ambiguous_prefix_is_rejected() {
        let sessions = vec![session("0123aaaa"), session("0123bbbb")];

        let message = resolve_session(&sessions, "0123").unwrap_err();
        assert!(message.contains("matches 2 sessions"));
    }

    #[test]
    fn unmatched_or_empty_prefix_is_rejected() {
        let sessions = vec![session("0123aaaa")];

        assert!(resolve_session(&sessions, "ffff").unwrap_err().starts_with("No session"));
        assert!(resolve_session(&sessions, "").unwrap_err().starts_with("Usage: /load"));
        assert!(resolve_session(&[], "0123").is_err());
    }

    #[test]
    fn session_line_marks_current() {
        let session = session("0123456789abcdef");

        let line = session_line(&session, true);
        assert!(line.starts_with("* 01234567"));
        assert!(line.contains("0 messages"));
        assert!(session_line(&session, false).starts_with("  "));
    }

    #[test]
    fn short_id_handles_short_input() {
        assert_eq!(short_id("abc"), "abc");
    }
}
