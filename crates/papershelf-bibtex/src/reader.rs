//! Streaming entry segmentation
//!
//! An entry starts at a line whose first non-blank character is `@` and runs
//! until the next such line or the end of the stream. Outside of entries,
//! blank lines, `%` comment lines and any other stray text are skipped.
//! `%` comment lines inside an entry are dropped as well.
//!
//! Lines are read as bytes. A line that is not valid UTF-8 is decoded lossily
//! and the entry holding it is marked, so one bad byte costs one entry rather
//! than the rest of the stream.

use std::io::{self, BufRead};

use crate::entry::RawEntry;

struct Line {
    number: usize,
    text: String,
    decoded: bool,
}

/// Iterator over the raw entries of a citation stream.
pub struct EntryReader<'a, R> {
    reader: R,
    buffer: Vec<u8>,
    line_number: usize,
    // Opening line of the next entry, read while finishing the previous one
    pending: Option<Line>,
    on_line: Option<&'a mut dyn FnMut(usize)>,
}

impl<'a, R: BufRead> EntryReader<'a, R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::new(),
            line_number: 0,
            pending: None,
            on_line: None,
        }
    }

    /// Report every consumed line number to `callback`.
    pub fn with_progress(mut self, callback: &'a mut dyn FnMut(usize)) -> Self {
        self.on_line = Some(callback);
        self
    }

    /// Number of lines consumed so far.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    fn next_line(&mut self) -> Option<io::Result<Line>> {
        if let Some(pending) = self.pending.take() {
            return Some(Ok(pending));
        }
        self.buffer.clear();
        match self.reader.read_until(b'\n', &mut self.buffer) {
            Ok(0) => return None,
            Ok(_) => {}
            Err(e) => return Some(Err(e)),
        }
        if self.buffer.last() == Some(&b'\n') {
            self.buffer.pop();
            if self.buffer.last() == Some(&b'\r') {
                self.buffer.pop();
            }
        }
        self.line_number += 1;
        if let Some(callback) = self.on_line.as_mut() {
            callback(self.line_number);
        }
        let (text, decoded) = match std::str::from_utf8(&self.buffer) {
            Ok(text) => (text.to_string(), true),
            Err(_) => (String::from_utf8_lossy(&self.buffer).into_owned(), false),
        };
        Some(Ok(Line {
            number: self.line_number,
            text,
            decoded,
        }))
    }
}

fn is_entry_start(line: &str) -> bool {
    line.trim_start().starts_with('@')
}

fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with('%')
}

impl<R: BufRead> Iterator for EntryReader<'_, R> {
    type Item = io::Result<RawEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        // Find the opening line
        let opening = loop {
            match self.next_line()? {
                Ok(line) if is_entry_start(&line.text) => break line,
                Ok(_) => continue,
                Err(e) => return Some(Err(e)),
            }
        };

        let mut entry = RawEntry::new(String::new(), opening.number);
        if !opening.decoded {
            entry.undecodable_line = Some(opening.number);
        }
        let mut body = vec![opening.text];
        loop {
            match self.next_line() {
                None => break,
                Some(Err(e)) => return Some(Err(e)),
                Some(Ok(line)) => {
                    if is_entry_start(&line.text) {
                        self.pending = Some(line);
                        break;
                    }
                    if !is_comment(&line.text) {
                        if !line.decoded && entry.undecodable_line.is_none() {
                            entry.undecodable_line = Some(line.number);
                        }
                        body.push(line.text);
                    }
                }
            }
        }

        while body.last().is_some_and(|line| line.trim().is_empty()) {
            body.pop();
        }

        entry.text = body.join("\n");
        Some(Ok(entry))
    }
}
