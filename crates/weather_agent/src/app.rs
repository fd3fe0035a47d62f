use std::collections::HashSet;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use agent_contract::Message;
use time::UtcOffset;
use tracing::warn;
use weather_chat::{format_local_timestamp, write_export, ChatSession};

use crate::commands::{parse_slash_command, SlashCommand, HELP_TEXT};
use crate::runtime::{lock_unpoisoned, ControllerHost, RuntimeController};

pub const RETRY_HINT: &str = "Type /retry to resend your last message.";
pub const BUSY_NOTICE: &str = "Still waiting for the previous reply.";

/// Line-oriented front end over a [`ChatSession`].
///
/// Input lines go to [`App::handle_line`]; [`App::on_tick`] applies finished
/// requests and prints every message not shown yet.
pub struct App<W: Write> {
    controller: Arc<RuntimeController>,
    export_dir: PathBuf,
    offset: UtcOffset,
    out: W,
    printed: HashSet<String>,
    should_exit: bool,
}

impl<W: Write> App<W> {
    pub fn new(
        controller: Arc<RuntimeController>,
        export_dir: PathBuf,
        offset: UtcOffset,
        out: W,
    ) -> Self {
        Self {
            controller,
            export_dir,
            offset,
            out,
            printed: HashSet::new(),
            should_exit: false,
        }
    }

    pub fn should_exit(&self) -> bool {
        self.should_exit
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    pub fn is_sending(&self) -> bool {
        lock_unpoisoned(self.controller.session()).is_sending()
    }

    /// Prints the banner and the restored transcript.
    pub fn start(&mut self) -> io::Result<()> {
        let profile = self.controller.transport_profile();
        writeln!(
            self.out,
            "Weather agent via {} ({}). Type /help for commands.",
            profile.transport_id, profile.endpoint
        )?;
        self.render_new_messages()
    }

    pub fn handle_line(&mut self, line: &str) -> io::Result<()> {
        match parse_slash_command(line) {
            Some(command) => self.handle_command(command)?,
            None => self.send(line)?,
        }
        self.render_new_messages()
    }

    /// Applies finished requests and prints new messages.
    pub fn on_tick(&mut self) -> io::Result<()> {
        if self.controller.flush_pending_events() > 0 {
            self.render_new_messages()?;
        }
        Ok(())
    }

    fn send(&mut self, text: &str) -> io::Result<()> {
        if text.trim().is_empty() {
            return Ok(());
        }

        let mut host = ControllerHost(Arc::clone(&self.controller));
        let mut session = lock_unpoisoned(self.controller.session());
        if session.is_sending() {
            drop(session);
            return writeln!(self.out, "{BUSY_NOTICE}");
        }
        session.send_message(text, &mut host);
        Ok(())
    }

    fn handle_command(&mut self, command: SlashCommand) -> io::Result<()> {
        match command {
            SlashCommand::Help => writeln!(self.out, "{HELP_TEXT}"),
            SlashCommand::Clear => {
                lock_unpoisoned(self.controller.session()).clear_messages();
                self.printed.clear();
                writeln!(self.out, "Started a new conversation.")
            }
            SlashCommand::Retry => {
                let mut host = ControllerHost(Arc::clone(&self.controller));
                let retried =
                    lock_unpoisoned(self.controller.session()).retry_last_message(&mut host);
                if retried {
                    Ok(())
                } else {
                    writeln!(self.out, "Nothing to retry.")
                }
            }
            SlashCommand::Export => self.export(),
            SlashCommand::Search(query) => self.search(&query),
            SlashCommand::Reply(Some(number)) => {
                let mut host = ControllerHost(Arc::clone(&self.controller));
                let sent = lock_unpoisoned(self.controller.session())
                    .send_quick_reply(number - 1, &mut host);
                if sent {
                    Ok(())
                } else {
                    writeln!(self.out, "No quick reply {number} available.")
                }
            }
            SlashCommand::Reply(None) => writeln!(self.out, "Usage: /reply <n>"),
            SlashCommand::History => {
                let lines = {
                    let session = lock_unpoisoned(self.controller.session());
                    session
                        .messages()
                        .iter()
                        .map(|message| format_message(message, self.offset))
                        .collect::<Vec<_>>()
                };
                for line in lines {
                    writeln!(self.out, "{line}")?;
                }
                Ok(())
            }
            SlashCommand::Quit => {
                self.should_exit = true;
                Ok(())
            }
            SlashCommand::Unknown(command) => writeln!(
                self.out,
                "Unknown command {command}. Type /help for commands."
            ),
        }
    }

    fn export(&mut self) -> io::Result<()> {
        let written = {
            let session = lock_unpoisoned(self.controller.session());
            write_export(&self.export_dir, session.messages(), self.offset)
        };
        match written {
            Ok(path) => writeln!(self.out, "Transcript exported to {}", path.display()),
            Err(error) => {
                warn!(%error, dir = %self.export_dir.display(), "transcript export failed");
                writeln!(self.out, "Export failed: {error}")
            }
        }
    }

    fn search(&mut self, query: &str) -> io::Result<()> {
        let lines = {
            let session = lock_unpoisoned(self.controller.session());
            session
                .search(query)
                .into_iter()
                .map(|message| format_message(message, self.offset))
                .collect::<Vec<_>>()
        };

        if lines.is_empty() {
            return writeln!(self.out, "No messages match \"{}\".", query.trim());
        }
        for line in lines {
            writeln!(self.out, "{line}")?;
        }
        Ok(())
    }

    fn render_new_messages(&mut self) -> io::Result<()> {
        let (lines, errored) = {
            let session = lock_unpoisoned(self.controller.session());
            (
                collect_unprinted(&mut self.printed, &session, self.offset),
                session.error().is_some(),
            )
        };

        let printed_any = !lines.is_empty();
        for line in lines {
            writeln!(self.out, "{line}")?;
        }
        if printed_any && errored {
            writeln!(self.out, "{RETRY_HINT}")?;
        }
        self.out.flush()
    }
}

fn collect_unprinted(
    printed: &mut HashSet<String>,
    session: &ChatSession,
    offset: UtcOffset,
) -> Vec<String> {
    let mut lines = Vec::new();
    for message in session.messages() {
        if !printed.insert(message.id.clone()) {
            continue;
        }
        lines.push(format_message(message, offset));
        if message.is_agent() {
            for (index, reply) in message.quick_replies().iter().enumerate() {
                lines.push(format!("    /reply {}  {}", index + 1, reply.text));
            }
        }
    }
    lines
}

/// `[timestamp] Role: content`.
pub fn format_message(message: &Message, offset: UtcOffset) -> String {
    format!(
        "[{}] {}: {}",
        format_local_timestamp(message.timestamp, offset),
        message.role.label(),
        message.content
    )
}
