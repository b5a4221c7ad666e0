//! Where tags open and close in the replayed character stream.
//!
//! Reconstruction replays the reading order one character at a time. A
//! [`Plan`] records, by stream position, which marks open before a character,
//! which close after it, and which highlight class applies from there on.
//! Two builders produce the same plan:
//!
//! - [`Plan::scan`] checks every mark and user mark against every character.
//! - [`Plan::indexed`] binary-searches mark extents and sweeps user marks once,
//!   which requires the stream to be sorted by offset.

use crate::jdom::{Jdom, Mark, UserMark};

use super::HighlightStyles;

/// One replayed character and the byte offset it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Replayed {
    pub offset: usize,
    pub ch: char,
}

/// Every character of the reading order, in reading order.
pub(crate) fn replay_stream(jdom: &Jdom) -> Vec<Replayed> {
    let bytes = jdom.reading_order().iter().map(|e| e.end - e.start).sum();
    let mut stream = Vec::with_capacity(bytes);
    for entry in jdom.reading_order() {
        let text = jdom.entry_text(entry);
        stream.extend(text.char_indices().map(|(i, ch)| Replayed {
            offset: entry.start + i,
            ch,
        }));
    }
    stream
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Plan {
    /// `(position, mark index)`, marks opening before the character; container
    /// marks first.
    pub opens: Vec<(usize, usize)>,
    /// `(position, mark index)`, marks closing after the character; contained
    /// marks first.
    pub closes: Vec<(usize, usize)>,
    /// `(position, class)`, the highlight class in force from `position` until
    /// the next run.
    pub highlights: Vec<(usize, Option<String>)>,
}

impl Plan {
    /// Reference builder: rescans all marks and user marks per character.
    pub fn scan(
        stream: &[Replayed],
        marks: &[Mark],
        user_marks: &[UserMark],
        styles: &HighlightStyles,
    ) -> Plan {
        let mut extents: Vec<Option<(usize, usize)>> = vec![None; marks.len()];
        let mut runs = HighlightRuns::default();

        for (pos, replayed) in stream.iter().enumerate() {
            for (m, mark) in marks.iter().enumerate() {
                if mark.contains(replayed.offset) {
                    let extent = extents[m].get_or_insert((pos, pos));
                    extent.1 = pos;
                }
            }

            let active: Vec<usize> = user_marks
                .iter()
                .enumerate()
                .filter(|(_, u)| u.covers(replayed.offset))
                .map(|(i, _)| i)
                .collect();
            runs.push(pos, styles.class_for_active(user_marks, &active));
        }

        Plan::from_extents(&extents, runs)
    }

    /// Event-index builder for streams sorted by offset.
    pub fn indexed(
        stream: &[Replayed],
        marks: &[Mark],
        user_marks: &[UserMark],
        styles: &HighlightStyles,
    ) -> Plan {
        let extents: Vec<Option<(usize, usize)>> = marks
            .iter()
            .map(|mark| {
                let first = stream.partition_point(|r| r.offset < mark.start);
                let past_last = stream.partition_point(|r| r.offset < mark.end);
                (first < past_last).then(|| (first, past_last - 1))
            })
            .collect();

        let mut by_start: Vec<usize> = (0..user_marks.len()).collect();
        by_start.sort_by_key(|&i| user_marks[i].start);
        let mut pending = by_start.into_iter().peekable();
        // Sorted by caller order so class composition matches the scan.
        let mut active: Vec<usize> = Vec::new();
        let mut runs = HighlightRuns::default();

        for (pos, replayed) in stream.iter().enumerate() {
            let mut changed = false;
            while let Some(&next) = pending.peek() {
                if user_marks[next].start > replayed.offset {
                    break;
                }
                pending.next();
                if user_marks[next].end >= replayed.offset {
                    let at = active.partition_point(|&a| a < next);
                    active.insert(at, next);
                    changed = true;
                }
            }
            let before = active.len();
            active.retain(|&a| user_marks[a].end >= replayed.offset);
            changed |= active.len() != before;

            if changed || pos == 0 {
                runs.push(pos, styles.class_for_active(user_marks, &active));
            }
        }

        Plan::from_extents(&extents, runs)
    }

    fn from_extents(extents: &[Option<(usize, usize)>], runs: HighlightRuns) -> Plan {
        let mut opens = Vec::new();
        let mut closes = Vec::new();
        for (m, extent) in extents.iter().enumerate() {
            if let Some((first, last)) = *extent {
                opens.push((first, m));
                closes.push((last, m));
            }
        }
        opens.sort_unstable();
        closes.sort_unstable_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

        Plan {
            opens,
            closes,
            highlights: runs.0,
        }
    }
}

/// Run-length list of highlight classes; only changes are stored.
#[derive(Default)]
struct HighlightRuns(Vec<(usize, Option<String>)>);

impl HighlightRuns {
    fn push(&mut self, pos: usize, class: Option<String>) {
        let current = self.0.last().and_then(|(_, c)| c.as_ref());
        if current != class.as_ref() {
            self.0.push((pos, class));
        }
    }
}
