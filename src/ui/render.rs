use gtk4::prelude::*;

use crate::markup::{Run, RunStyle};

pub const BOLD_TAG: &str = "bold";
pub const HEADER_TAG: &str = "header";

/// Replace the buffer contents with styled runs, one line per entry.
pub fn render_runs(buffer: &gtk4::TextBuffer, lines: &[Vec<Run>]) {
    buffer.set_text("");
    let mut end = buffer.end_iter();

    for line in lines {
        for run in line {
            match run.style {
                RunStyle::Plain => buffer.insert(&mut end, &run.text),
                RunStyle::Bold => buffer.insert_with_tags_by_name(&mut end, &run.text, &[BOLD_TAG]),
                RunStyle::Header => {
                    buffer.insert_with_tags_by_name(&mut end, &run.text, &[HEADER_TAG])
                }
            }
        }
        buffer.insert(&mut end, "\n");
    }
}
