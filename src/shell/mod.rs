//! Interactive Shell
//!
//! Line-oriented exploration of an in-memory snapshot. Each filtering or
//! reshaping verb pushes a frame holding its result set; `back` pops one
//! frame, and popping the root frame ends the session.

pub mod input;

pub use input::{LineSource, ReaderLines, TerminalLines};

use crate::query::{self, Query};
use crate::report::{format_device_counts, format_records_table};
use crate::store::RecordView;
use crate::types::{Field, MatchMethod};
use std::io::{self, Write};
use std::str::FromStr;
use tracing::debug;

const HELP: &str = "\
verbs:
  contain|startwith|endwith|regex [field] <keyword>   filter (prefix ! to negate)
                      field defaults to path and must come first; a keyword that
                      starts with a field name needs it spelled out: contain path size 00
  sort [field]        sort ascending (path, digest, size, time)
  rev                 reverse
  shuffle             random order
  skip <n>            drop the first n records
  take <n>            keep the first n records
  show [n]            print the first n records
  sum                 total size
  count               number of records
  device              records per device
  back                return to the previous result set
  exit                leave the shell
";

/// One result set on the stack.
#[derive(Debug, Clone)]
pub struct Frame<R> {
    pub label: String,
    pub records: Vec<R>,
}

/// Whether the session continues after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Exit,
}

#[derive(Debug)]
pub struct Shell<R> {
    frames: Vec<Frame<R>>,
    page_size: usize,
}

/// Split `[field] keyword…`. The first token selects the field only when it
/// names one and more text follows it.
fn split_field_keyword(args: &str) -> (Field, &str) {
    let args = args.trim();
    if let Some((first, rest)) = args.split_once(char::is_whitespace) {
        let rest = rest.trim();
        if !rest.is_empty() {
            if let Ok(field) = Field::from_str(first) {
                return (field, rest);
            }
        }
    }
    (Field::Path, args)
}

fn parse_count(args: &str) -> Result<usize, String> {
    args.trim()
        .parse()
        .map_err(|_| format!("expected a count, got {:?}", args.trim()))
}

impl<R> Shell<R>
where
    R: RecordView + Clone + Default + Send + Sync,
{
    pub fn new(records: Vec<R>, page_size: usize) -> Self {
        Shell {
            frames: vec![Frame {
                label: "all".to_string(),
                records,
            }],
            page_size: page_size.max(1),
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn current(&self) -> &[R] {
        self.frames
            .last()
            .map(|frame| frame.records.as_slice())
            .unwrap_or(&[])
    }

    pub fn prompt(&self) -> String {
        format!("md5db[{}]", self.depth())
    }

    fn push(&mut self, label: String, records: Vec<R>) -> String {
        let message = format!("{}: {} records", label, records.len());
        self.frames.push(Frame { label, records });
        message
    }

    /// Run until `exit`, end of input, or `back` at the root frame.
    pub fn run<W: Write>(&mut self, input: &mut dyn LineSource, out: &mut W) -> io::Result<()> {
        while let Some(line) = input.read_line(&self.prompt())? {
            if self.execute_line(&line, out)? == Step::Exit {
                break;
            }
        }
        Ok(())
    }

    /// Execute one line and write its output.
    pub fn execute_line<W: Write>(&mut self, line: &str, out: &mut W) -> io::Result<Step> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Step::Continue);
        }
        let (verb, args) = line
            .split_once(char::is_whitespace)
            .unwrap_or((line, ""));
        debug!(verb, args, depth = self.depth(), "shell command");

        let result = match verb.to_ascii_lowercase().as_str() {
            "exit" | "quit" => return Ok(Step::Exit),
            "back" => {
                self.frames.pop();
                if self.frames.is_empty() {
                    return Ok(Step::Exit);
                }
                Ok(format!("back to {} ({} records)", self.frames.len(), self.current().len()))
            }
            "help" => Ok(HELP.trim_end().to_string()),
            "count" => Ok(format!("Records: {}", self.current().len())),
            "sum" => Ok(format!("Total size: {} bytes", query::total_size(self.current()))),
            "device" => Ok(format_device_counts(&query::devices(self.current()))
                .trim_end()
                .to_string()),
            "show" => self.show(args),
            "sort" => self.sort(args),
            "rev" => {
                let mut records = self.current().to_vec();
                query::reverse(&mut records);
                Ok(self.push("rev".to_string(), records))
            }
            "shuffle" => {
                let mut records = self.current().to_vec();
                query::shuffle(&mut records);
                Ok(self.push("shuffle".to_string(), records))
            }
            "skip" => parse_count(args).map(|n| {
                let records = query::skip(self.current().to_vec(), n);
                self.push(format!("skip {}", n), records)
            }),
            "take" => parse_count(args).map(|n| {
                let records = query::take(self.current().to_vec(), n);
                self.push(format!("take {}", n), records)
            }),
            other => self.filter(other, args),
        };

        match result {
            Ok(text) => writeln!(out, "{}", text)?,
            Err(message) => writeln!(out, "error: {}", message)?,
        }
        Ok(Step::Continue)
    }

    fn show(&self, args: &str) -> Result<String, String> {
        let rows = if args.trim().is_empty() {
            self.page_size
        } else {
            parse_count(args)?
        };
        let records = self.current();
        let shown = &records[..rows.min(records.len())];
        Ok(format!(
            "{}\n{} of {} records",
            format_records_table(shown),
            shown.len(),
            records.len()
        ))
    }

    fn sort(&mut self, args: &str) -> Result<String, String> {
        let field = if args.trim().is_empty() {
            Field::Path
        } else {
            Field::from_str(args).map_err(|e| e.to_string())?
        };
        let mut records = self.current().to_vec();
        query::sort_by_field(&mut records, field);
        Ok(self.push(format!("sort {}", field), records))
    }

    fn filter(&mut self, verb: &str, args: &str) -> Result<String, String> {
        let (negate, name) = match verb.strip_prefix('!') {
            Some(name) => (true, name),
            None => (false, verb),
        };
        let method = match name {
            "contain" => MatchMethod::Contain,
            "startwith" => MatchMethod::StartWith,
            "endwith" => MatchMethod::EndWith,
            "regex" => MatchMethod::Regex,
            _ => return Err(format!("unknown command {:?}, try help", verb)),
        };
        let (field, keyword) = split_field_keyword(args);
        if keyword.is_empty() {
            return Err(format!("{} needs a keyword", verb));
        }
        let compiled = Query::new(method, field, keyword)
            .negate(negate)
            .compile()
            .map_err(|e| e.to_string())?;
        let records = compiled.run(self.current());
        Ok(self.push(format!("{} {} {}", verb, field, keyword), records))
    }
}
