use std::io::Write;

use log::{debug, warn};
use pacer_core::{index::WordRecord, visual::VisualLayer};

/// Prints each chunk as it is marked read, one sentence per line.
pub(super) struct TerminalVisual<W: Write> {
    out: W,
    line_open: bool,
}

impl<W: Write> TerminalVisual<W> {
    pub(super) fn new(out: W) -> Self {
        Self {
            out,
            line_open: false,
        }
    }

    #[cfg(test)]
    pub(super) fn output(&self) -> &W {
        &self.out
    }

    fn end_line(&mut self) {
        if self.line_open {
            self.line_open = false;
            self.emit(format_args!("\n"));
        }
    }

    fn emit(&mut self, args: std::fmt::Arguments<'_>) {
        let result = self.out.write_fmt(args).and_then(|()| self.out.flush());
        if let Err(err) = result {
            warn!("terminal write failed: {}", err);
        }
    }
}

impl<W: Write> VisualLayer for TerminalVisual<W> {
    fn mark_read(&mut self, words: &[WordRecord]) {
        for word in words {
            let separator = if self.line_open { " " } else { "" };
            self.line_open = true;
            self.emit(format_args!("{}{}", separator, word.text));
            if word.is_sentence_end {
                self.end_line();
            }
        }
    }

    fn reset_unread(&mut self, words: &[WordRecord]) {
        self.end_line();
        debug!("terminal: {} words back to unread", words.len());
    }

    fn select(&mut self, word: &WordRecord) {
        self.end_line();
        self.emit(format_args!("[{} \"{}\"]\n", word.id, word.text));
    }
}
