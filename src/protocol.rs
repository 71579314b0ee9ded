// LinkState: Driver for the link-state routing simulator
// Copyright (C) 2023 Tibor Schneider <sctibor@ethz.ch>
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! Parser for the line-oriented control protocol.
//!
//! The input consists of three sections:
//!
//! 1. Router names, one per line, terminated by the line `LINKSTATE`.
//! 2. The initial link state, terminated by the line `UPDATE`.
//! 3. Link updates, terminated by the line `END`.
//!
//! Lines of the last two sections have the form `SRC-DST WEIGHT [R1,R2,...]`. A weight of `-1`
//! removes the link. The optional third field lists the routers whose tables are printed after
//! the line was applied. Blank lines are ignored.

use std::{collections::VecDeque, fmt, io::BufRead};

use spfsim::types::LinkWeight;
use thiserror::Error;

/// A single command that is applied to the topology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Register a new router.
    AddRouter(String),
    /// Create, update, or remove a link.
    LinkUpdate(LinkUpdate),
    /// Print the neighbour table, LSDB, and routing table of each router, in the order given.
    Query(Vec<String>),
}

/// Change of a single link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkUpdate {
    /// First endpoint
    pub source: String,
    /// Second endpoint
    pub destination: String,
    /// New weight of the link, or `None` if the link is removed.
    pub weight: Option<LinkWeight>,
    /// If `true`, endpoints that are not yet known are registered before the link is changed.
    /// Otherwise, a link towards an unknown router is an error.
    pub register: bool,
}

/// Section of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// List of routers (until `LINKSTATE`)
    Routers,
    /// Initial link state (until `UPDATE`)
    LinkState,
    /// Link updates (until `END`)
    Update,
    /// After `END`
    Done,
}

impl Section {
    /// Keyword that terminates this section.
    fn terminator(&self) -> &'static str {
        match self {
            Section::Routers => "LINKSTATE",
            Section::LinkState => "UPDATE",
            Section::Update | Section::Done => "END",
        }
    }

    /// Section that follows after the terminator.
    fn next(&self) -> Self {
        match self {
            Section::Routers => Section::LinkState,
            Section::LinkState => Section::Update,
            Section::Update | Section::Done => Section::Done,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Routers => write!(f, "router list"),
            Section::LinkState => write!(f, "LINKSTATE section"),
            Section::Update => write!(f, "UPDATE section"),
            Section::Done => write!(f, "end of input"),
        }
    }
}

/// Error while parsing the input. Each variant carries the (1-based) line number.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Cannot read the input
    #[error("Cannot read line {0}: {1}")]
    Io(usize, #[source] std::io::Error),
    /// The link is not of the form `SRC-DST`.
    #[error("Line {0}: expected a link of the form SRC-DST, found {1:?}")]
    MissingSeparator(usize, String),
    /// One of the router names is empty.
    #[error("Line {0}: empty router name")]
    EmptyRouterName(usize),
    /// The line has no weight.
    #[error("Line {0}: missing link weight")]
    MissingWeight(usize),
    /// The weight is not an integer.
    #[error("Line {0}: invalid link weight {1:?}")]
    InvalidWeight(usize, String),
    /// The weight is an integer, but neither `-1` nor a valid link weight.
    #[error("Line {0}: link weight {1} is out of range")]
    WeightOutOfRange(usize, i64),
    /// The line has more than three fields.
    #[error("Line {0}: too many fields")]
    TooManyFields(usize),
    /// The list of routers to query contains an empty name.
    #[error("Line {0}: empty router name in query list")]
    EmptyQuery(usize),
    /// The input ended before the `END` keyword.
    #[error("Unexpected end of input in the {0}")]
    UnexpectedEof(Section),
}

impl ProtocolError {
    /// Line number at which the error occurred, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            ProtocolError::Io(l, _)
            | ProtocolError::MissingSeparator(l, _)
            | ProtocolError::EmptyRouterName(l)
            | ProtocolError::MissingWeight(l)
            | ProtocolError::InvalidWeight(l, _)
            | ProtocolError::WeightOutOfRange(l, _)
            | ProtocolError::TooManyFields(l)
            | ProtocolError::EmptyQuery(l) => Some(*l),
            ProtocolError::UnexpectedEof(_) => None,
        }
    }
}

/// Iterator over the commands of an input stream. The input is read lazily, one line at a time.
/// After the first error, the iterator is exhausted.
#[derive(Debug)]
pub struct CommandReader<R> {
    /// Lines of the input
    lines: std::io::Lines<R>,
    /// Current line number
    line: usize,
    /// The section of the next line.
    section: Section,
    /// Commands that were parsed, but not yet yielded.
    pending: VecDeque<Command>,
    /// Set after an error, or after the `END` keyword.
    finished: bool,
}

impl<R: BufRead> CommandReader<R> {
    /// Create a new reader for the input stream.
    pub fn new(input: R) -> Self {
        Self {
            lines: input.lines(),
            line: 0,
            section: Section::Routers,
            pending: VecDeque::new(),
            finished: false,
        }
    }

    /// Returns the current section.
    pub fn section(&self) -> Section {
        self.section
    }

    /// Read the next line, and push all of its commands onto `pending`.
    fn read_line(&mut self) -> Result<(), ProtocolError> {
        let line = match self.lines.next() {
            Some(line) => line.map_err(|e| ProtocolError::Io(self.line + 1, e))?,
            None => return Err(ProtocolError::UnexpectedEof(self.section)),
        };
        self.line += 1;
        let line = line.trim();

        if line.is_empty() {
            return Ok(());
        }
        if line == self.section.terminator() {
            log::debug!("Line {}: {}", self.line, line);
            self.section = self.section.next();
            return Ok(());
        }

        match self.section {
            Section::Routers => self.pending.push_back(Command::AddRouter(line.to_string())),
            Section::LinkState | Section::Update => {
                let register = self.section == Section::Update;
                let (update, query) = parse_link_line(self.line, line, register)?;
                self.pending.push_back(Command::LinkUpdate(update));
                if let Some(query) = query {
                    self.pending.push_back(Command::Query(query));
                }
            }
            Section::Done => {}
        }
        Ok(())
    }
}

impl<R: BufRead> Iterator for CommandReader<R> {
    type Item = Result<Command, ProtocolError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(command) = self.pending.pop_front() {
                return Some(Ok(command));
            }
            if self.finished || self.section == Section::Done {
                return None;
            }
            if let Err(e) = self.read_line() {
                self.finished = true;
                return Some(Err(e));
            }
        }
    }
}

/// Parse an entire input at once.
pub fn parse(input: &str) -> Result<Vec<Command>, ProtocolError> {
    CommandReader::new(input.as_bytes()).collect()
}

/// Parse a single line of the form `SRC-DST WEIGHT [R1,R2,...]`.
fn parse_link_line(
    line_nr: usize,
    line: &str,
    register: bool,
) -> Result<(LinkUpdate, Option<Vec<String>>), ProtocolError> {
    let mut fields = line.split_whitespace();
    let link = fields.next().unwrap_or_default();
    let weight = fields.next().ok_or(ProtocolError::MissingWeight(line_nr))?;
    let query = fields.next();
    if fields.next().is_some() {
        return Err(ProtocolError::TooManyFields(line_nr));
    }

    let (source, destination) = link
        .split_once('-')
        .ok_or_else(|| ProtocolError::MissingSeparator(line_nr, link.to_string()))?;
    if source.is_empty() || destination.is_empty() {
        return Err(ProtocolError::EmptyRouterName(line_nr));
    }

    let weight = parse_weight(line_nr, weight)?;

    let query = query
        .map(|q| {
            q.split(',')
                .map(|r| {
                    let r = r.trim();
                    if r.is_empty() {
                        Err(ProtocolError::EmptyQuery(line_nr))
                    } else {
                        Ok(r.to_string())
                    }
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()?;

    Ok((
        LinkUpdate {
            source: source.to_string(),
            destination: destination.to_string(),
            weight,
            register,
        },
        query,
    ))
}

/// Parse the weight. `-1` means that the link is removed.
fn parse_weight(line_nr: usize, weight: &str) -> Result<Option<LinkWeight>, ProtocolError> {
    let value: i64 = weight
        .parse()
        .map_err(|_| ProtocolError::InvalidWeight(line_nr, weight.to_string()))?;
    match value {
        -1 => Ok(None),
        v => LinkWeight::try_from(v)
            .map(Some)
            .map_err(|_| ProtocolError::WeightOutOfRange(line_nr, v)),
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    /// Shorthand to create a link update.
    fn update(a: &str, b: &str, weight: Option<LinkWeight>, register: bool) -> Command {
        Command::LinkUpdate(LinkUpdate {
            source: a.to_string(),
            destination: b.to_string(),
            weight,
            register,
        })
    }

    #[test]
    fn sections() {
        let input = "X\nY\n\nZ\nLINKSTATE\nX-Y 2\nY-Z 3 X,Z\nUPDATE\nX-Z -1 Y\nX-W 1\nEND\n";
        assert_eq!(
            parse(input).unwrap(),
            vec![
                Command::AddRouter("X".into()),
                Command::AddRouter("Y".into()),
                Command::AddRouter("Z".into()),
                update("X", "Y", Some(2), false),
                update("Y", "Z", Some(3), false),
                Command::Query(vec!["X".into(), "Z".into()]),
                update("X", "Z", None, true),
                Command::Query(vec!["Y".into()]),
                update("X", "W", Some(1), true),
            ]
        );
    }

    #[test]
    fn ignores_input_after_end() {
        let input = "A\nLINKSTATE\nUPDATE\nEND\ngarbage";
        assert_eq!(parse(input).unwrap(), vec![Command::AddRouter("A".into())]);
    }

    #[test]
    fn trims_whitespace() {
        let input = "  A \r\nLINKSTATE\r\n  A-B   4  \r\nUPDATE\nEND";
        assert_eq!(
            parse(input).unwrap(),
            vec![
                Command::AddRouter("A".into()),
                update("A", "B", Some(4), false)
            ]
        );
    }

    #[test]
    fn unexpected_eof() {
        assert!(matches!(
            parse("A\nB\n"),
            Err(ProtocolError::UnexpectedEof(Section::Routers))
        ));
        assert!(matches!(
            parse("A\nLINKSTATE\nUPDATE\nA-B 1\n"),
            Err(ProtocolError::UnexpectedEof(Section::Update))
        ));
    }

    #[test]
    fn malformed_lines() {
        let wrap = |l: &str| format!("A\nB\nLINKSTATE\n{l}\nUPDATE\nEND\n");
        let err = |l: &str| parse(&wrap(l)).unwrap_err();
        assert!(matches!(err("AB 1"), ProtocolError::MissingSeparator(4, _)));
        assert!(matches!(err("A- 1"), ProtocolError::EmptyRouterName(4)));
        assert!(matches!(err("A-B"), ProtocolError::MissingWeight(4)));
        assert!(matches!(err("A-B x"), ProtocolError::InvalidWeight(4, _)));
        assert!(matches!(err("A-B -2"), ProtocolError::WeightOutOfRange(4, -2)));
        assert!(matches!(err("A-B 1 A extra"), ProtocolError::TooManyFields(4)));
        assert!(matches!(err("A-B 1 A,,B"), ProtocolError::EmptyQuery(4)));
        assert_eq!(err("A-B 1 A,").line(), Some(4));
    }

    #[test]
    fn stops_after_error() {
        let mut reader = CommandReader::new("A\nLINKSTATE\nA-B\nA-B 1\n".as_bytes());
        assert!(matches!(reader.next(), Some(Ok(Command::AddRouter(_)))));
        assert!(matches!(reader.next(), Some(Err(_))));
        assert_eq!(reader.section(), Section::LinkState);
        assert!(reader.next().is_none());
    }
}
