//! Terminal rendition of the interaction surface. The surface is a thin
//! shell: it renders text and collects input, while every decision lives in
//! the session state machine.

use std::io::Write;

use ansi_term::Colour::{Green, Red};
use ansi_term::Style;
use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio_util::sync::CancellationToken;

use crate::session::CATEGORIES;
use crate::utils::format::stopwatch_text;

/// One line of user input, or the reason none arrived.
#[derive(Debug, PartialEq, Eq)]
pub enum LineEvent {
    Line(String),
    /// The user pressed Ctrl-C; the caller decides whether to exit.
    Interrupted,
    /// Input is closed; the session is dropped silently.
    Eof,
}

/// A submitted input block.
#[derive(Debug, PartialEq, Eq)]
pub enum Submission {
    Text(String),
    Interrupted,
    Eof,
}

pub struct Surface<R, W> {
    lines: Lines<R>,
    out: W,
    shutdown: CancellationToken,
}

pub fn stdio_surface(shutdown: CancellationToken) -> Surface<BufReader<Stdin>, std::io::Stdout> {
    Surface::new(
        BufReader::new(tokio::io::stdin()),
        std::io::stdout(),
        shutdown,
    )
}

impl<R: AsyncBufRead + Unpin, W: Write> Surface<R, W> {
    pub fn new(reader: R, out: W, shutdown: CancellationToken) -> Self {
        Self {
            lines: reader.lines(),
            out,
            shutdown,
        }
    }

    /// Swaps in a fresh interrupt token after a declined exit.
    pub fn rearm_shutdown(&mut self, shutdown: CancellationToken) {
        self.shutdown = shutdown;
    }

    /// Reads one line, racing the interrupt token. An interrupt wins over
    /// already-buffered input.
    pub async fn read_line(&mut self) -> Result<LineEvent> {
        self.out.flush()?;
        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => Ok(LineEvent::Interrupted),
            line = self.lines.next_line() => Ok(match line? {
                Some(line) => LineEvent::Line(line),
                None => LineEvent::Eof,
            }),
        }
    }

    pub fn show_welcome(&mut self) -> Result<()> {
        writeln!(self.out, "{}", Style::new().bold().paint("Effort Logger"))?;
        writeln!(self.out)?;
        Ok(())
    }

    /// Numbered selector over the fixed category list. Anything that is not a
    /// list number or a category name comes back empty and fails start-time
    /// validation, which re-runs the form.
    pub async fn select_category(&mut self) -> Result<Submission> {
        writeln!(self.out, "What will I focus on this session?")?;
        for (index, category) in CATEGORIES.iter().enumerate() {
            writeln!(self.out, "  {:2}. {category}", index + 1)?;
        }
        write!(self.out, "> ")?;
        match self.read_line().await? {
            LineEvent::Line(line) => Ok(Submission::Text(parse_category(&line))),
            LineEvent::Interrupted => Ok(Submission::Interrupted),
            LineEvent::Eof => Ok(Submission::Eof),
        }
    }

    /// Multi-line input block terminated by an empty line.
    pub async fn read_block(&mut self, header: &str) -> Result<Submission> {
        writeln!(self.out, "{}", Style::new().bold().paint(header))?;
        writeln!(self.out, "(finish with an empty line)")?;
        let mut collected: Vec<String> = vec![];
        loop {
            match self.read_line().await? {
                LineEvent::Line(line) => {
                    if line.trim().is_empty() {
                        return Ok(Submission::Text(collected.join("\n").trim().to_owned()));
                    }
                    collected.push(line);
                }
                LineEvent::Interrupted => return Ok(Submission::Interrupted),
                LineEvent::Eof => return Ok(Submission::Eof),
            }
        }
    }

    pub async fn prompt_block(&mut self, title: &str) -> Result<Submission> {
        writeln!(self.out)?;
        self.read_block(title).await
    }

    /// Redraws the stopwatch in place.
    pub fn render_stopwatch(&mut self, elapsed_seconds: u64) -> Result<()> {
        write!(self.out, "\r  {}  ", stopwatch_text(elapsed_seconds))?;
        self.out.flush()?;
        Ok(())
    }

    pub fn show_session_started(&mut self) -> Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "Session running. Press Enter to end it.")?;
        self.render_stopwatch(0)
    }

    pub fn show_session_ended(&mut self, elapsed_seconds: u64) -> Result<()> {
        writeln!(self.out)?;
        writeln!(
            self.out,
            "Session ended at {}.",
            stopwatch_text(elapsed_seconds)
        )?;
        Ok(())
    }

    pub fn show_error(&mut self, message: &str) -> Result<()> {
        writeln!(self.out, "{}", Red.paint(message))?;
        Ok(())
    }

    pub fn show_notice(&mut self, message: &str) -> Result<()> {
        writeln!(self.out, "{}", Green.paint(message))?;
        Ok(())
    }

    /// Exit confirmation. Reads the line stream directly: the interrupt token
    /// has already fired when this prompt is shown.
    pub async fn confirm_exit(&mut self) -> Result<bool> {
        writeln!(self.out)?;
        write!(self.out, "Do you really want to exit? [y/N] ")?;
        self.out.flush()?;
        match self.lines.next_line().await? {
            Some(line) => Ok(matches!(line.trim(), "y" | "Y" | "yes" | "Yes")),
            None => Ok(true),
        }
    }

    #[cfg(test)]
    pub fn output(&self) -> &W {
        &self.out
    }
}

fn parse_category(line: &str) -> String {
    let line = line.trim();
    if let Ok(index) = line.parse::<usize>() {
        return index
            .checked_sub(1)
            .and_then(|i| CATEGORIES.get(i))
            .map(|category| (*category).to_owned())
            .unwrap_or_default();
    }
    CATEGORIES
        .iter()
        .find(|category| category.eq_ignore_ascii_case(line))
        .map(|category| (*category).to_owned())
        .unwrap_or_default()
}
