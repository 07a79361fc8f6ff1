//! Line sources for the shell.

use std::io::{self, BufRead, Write};

/// Supplies one line per call; `None` at end of input.
pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

/// Plain reader, no prompt echo. Used for piped input and tests.
pub struct ReaderLines<R> {
    reader: R,
}

impl<R: BufRead> ReaderLines<R> {
    pub fn new(reader: R) -> Self {
        ReaderLines { reader }
    }
}

impl<R: BufRead> LineSource for ReaderLines<R> {
    fn read_line(&mut self, _prompt: &str) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// Prompted terminal input through dialoguer.
#[derive(Debug, Default)]
pub struct TerminalLines;

impl LineSource for TerminalLines {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        io::stdout().flush()?;
        let result = dialoguer::Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text();
        match result {
            Ok(line) => Ok(Some(line)),
            Err(dialoguer::Error::IO(e)) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
            Err(dialoguer::Error::IO(e)) => Err(e),
        }
    }
}
