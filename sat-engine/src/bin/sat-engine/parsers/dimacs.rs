//! A streaming parser for the DIMACS CNF format. Instances can be very large, so the source is
//! read in chunks and the buffers for the current literal and clause are reused.
//!
//! The parser hands every clause to a [`DimacsSink`]. Besides `c` comment lines it accepts the
//! `%` trailer of the SATLIB benchmarks, after which the rest of the file is ignored.
use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;
use std::num::NonZeroI32;
use std::str::FromStr;

use log::debug;
use sat_engine::Engine;
use sat_engine::EngineConfig;
use sat_engine::EngineError;
use thiserror::Error;

/// The consumer of the parsed formula.
pub(crate) trait DimacsSink {
    /// The arguments to the dimacs sink.
    type ConstructorArgs;

    /// The underlying formula type.
    type Formula;

    /// Create an empty formula over `num_variables` variables.
    fn empty(args: Self::ConstructorArgs, num_variables: usize) -> Self;

    /// Add a clause to the formula. Every literal refers to one of the announced variables.
    fn add_clause(&mut self, clause: &[NonZeroI32]);

    fn into_formula(self) -> Self::Formula;
}

#[derive(Debug, Error)]
pub(crate) enum DimacsParseError {
    #[error("failed to read the instance")]
    Io(#[from] std::io::Error),

    #[error("missing dimacs header")]
    MissingHeader,

    #[error("line {line}: '{header}' is an invalid header")]
    InvalidHeader { line: usize, header: String },

    #[error("line {0}: multiple dimacs headers found")]
    DuplicateHeader(usize),

    #[error("line {line}: unexpected character '{character}'")]
    UnexpectedCharacter { line: usize, character: char },

    #[error("line {line}: '{literal}' is an invalid DIMACS literal")]
    InvalidLiteral { line: usize, literal: String },

    #[error("line {line}: literal {literal} refers to a variable above {num_variables}")]
    LiteralOutOfRange {
        line: usize,
        literal: i32,
        num_variables: usize,
    },

    #[error("the last clause in the source is not terminated with a '0'")]
    UnterminatedClause,

    #[error("expected to parse {expected} clauses, but parsed {parsed}")]
    IncorrectClauseCount { expected: usize, parsed: usize },
}

pub(crate) fn parse_cnf<Sink: DimacsSink>(
    source: impl Read,
    sink_constructor_args: Sink::ConstructorArgs,
) -> Result<Sink::Formula, DimacsParseError> {
    let mut reader = BufReader::new(source);
    let mut parser = DimacsParser::<Sink>::new(sink_constructor_args);

    loop {
        let num_bytes = {
            let data = reader.fill_buf()?;

            if data.is_empty() {
                return parser.complete();
            }

            parser.parse_chunk(data)?;
            data.len()
        };

        reader.consume(num_bytes);
    }
}

struct DimacsParser<Sink: DimacsSink> {
    sink_constructor_args: Option<Sink::ConstructorArgs>,
    sink: Option<Sink>,
    header: Option<CnfHeader>,
    buffer: String,
    clause: Vec<NonZeroI32>,
    state: ParseState,
    parsed_clauses: usize,
    /// The line of the byte being parsed, starting at 1.
    line: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ParseState {
    StartLine,
    Header,
    Comment,
    Literal,
    NegativeLiteral,
    Clause,
    /// Everything after a `%` line is ignored.
    Trailer,
}

impl<Sink: DimacsSink> DimacsParser<Sink> {
    fn new(sink_constructor_args: Sink::ConstructorArgs) -> Self {
        DimacsParser {
            sink_constructor_args: Some(sink_constructor_args),
            sink: None,
            header: None,
            buffer: String::new(),
            clause: vec![],
            state: ParseState::StartLine,
            parsed_clauses: 0,
            line: 1,
        }
    }

    /// Parse the next chunk of bytes. This may start in the middle of parsing a clause or file
    /// header, and may end in such a state as well.
    fn parse_chunk(&mut self, chunk: &[u8]) -> Result<(), DimacsParseError> {
        for &byte in chunk {
            match self.state {
                ParseState::StartLine => match byte {
                    b if b.is_ascii_whitespace() => {}

                    b'p' => {
                        self.state = ParseState::Header;
                        self.buffer.clear();
                        self.buffer.push('p');
                    }

                    b'c' => self.state = ParseState::Comment,

                    b'%' => self.state = ParseState::Trailer,

                    b @ b'1'..=b'9' => self.start_literal(b, true),

                    // An empty clause on its own line.
                    b'0' => self.finish_clause()?,

                    b'-' => self.start_literal(b'-', false),

                    b => return Err(self.unexpected(b)),
                },

                ParseState::Header => match byte {
                    b'\n' => {
                        self.init_formula()?;
                        self.state = ParseState::StartLine;
                    }

                    b => self.buffer.push(b as char),
                },

                ParseState::Comment => {
                    if byte == b'\n' {
                        self.state = ParseState::StartLine;
                    }
                }

                ParseState::Literal => match byte {
                    b'\n' => {
                        self.finish_literal()?;
                        self.state = ParseState::StartLine;
                    }
                    b if b.is_ascii_whitespace() => self.finish_literal()?,

                    b @ b'0'..=b'9' => self.buffer.push(b as char),

                    b => return Err(self.unexpected(b)),
                },

                ParseState::NegativeLiteral => match byte {
                    b @ b'1'..=b'9' => {
                        self.buffer.push(b as char);
                        self.state = ParseState::Literal;
                    }

                    b => return Err(self.unexpected(b)),
                },

                ParseState::Clause => match byte {
                    b'0' => self.finish_clause()?,

                    // A clause may continue on the next line, so only the line state is reset;
                    // the literals parsed so far are kept.
                    b'\n' => self.state = ParseState::StartLine,
                    b if b.is_ascii_whitespace() => {}

                    b @ b'1'..=b'9' => self.start_literal(b, true),
                    b'-' => self.start_literal(b'-', false),

                    b => return Err(self.unexpected(b)),
                },

                ParseState::Trailer => {}
            }

            if byte == b'\n' {
                self.line += 1;
            }
        }

        Ok(())
    }

    fn unexpected(&self, byte: u8) -> DimacsParseError {
        DimacsParseError::UnexpectedCharacter {
            line: self.line,
            character: byte as char,
        }
    }

    fn start_literal(&mut self, byte: u8, is_positive: bool) {
        self.state = if is_positive {
            ParseState::Literal
        } else {
            ParseState::NegativeLiteral
        };

        self.buffer.clear();
        self.buffer.push(byte as char);
    }

    fn complete(mut self) -> Result<Sink::Formula, DimacsParseError> {
        if self.state == ParseState::Header {
            self.init_formula()?;
        }
        let sink = self.sink.ok_or(DimacsParseError::MissingHeader)?;
        let Some(header) = self.header else {
            return Err(DimacsParseError::MissingHeader);
        };

        let is_literal_pending = matches!(
            self.state,
            ParseState::Literal | ParseState::NegativeLiteral
        );
        if is_literal_pending || !self.clause.is_empty() {
            Err(DimacsParseError::UnterminatedClause)
        } else if header.num_clauses != self.parsed_clauses {
            Err(DimacsParseError::IncorrectClauseCount {
                expected: header.num_clauses,
                parsed: self.parsed_clauses,
            })
        } else {
            Ok(sink.into_formula())
        }
    }

    fn init_formula(&mut self) -> Result<(), DimacsParseError> {
        let header = self
            .buffer
            .trim()
            .parse::<CnfHeader>()
            .map_err(|_| DimacsParseError::InvalidHeader {
                line: self.line,
                header: self.buffer.trim().to_owned(),
            })?;

        let args = self
            .sink_constructor_args
            .take()
            .ok_or(DimacsParseError::DuplicateHeader(self.line))?;
        debug!(
            "Parsing {} clauses over {} variables",
            header.num_clauses, header.num_variables
        );
        self.sink = Some(Sink::empty(args, header.num_variables));
        self.header = Some(header);

        Ok(())
    }

    fn finish_literal(&mut self) -> Result<(), DimacsParseError> {
        let invalid_literal = || DimacsParseError::InvalidLiteral {
            line: self.line,
            literal: self.buffer.clone(),
        };
        let literal = self
            .buffer
            .parse::<i32>()
            .ok()
            .and_then(NonZeroI32::new)
            .ok_or_else(invalid_literal)?;

        let num_variables = self
            .header
            .as_ref()
            .ok_or(DimacsParseError::MissingHeader)?
            .num_variables;
        if literal.unsigned_abs().get() as usize > num_variables {
            return Err(DimacsParseError::LiteralOutOfRange {
                line: self.line,
                literal: literal.get(),
                num_variables,
            });
        }

        self.clause.push(literal);
        self.state = ParseState::Clause;

        Ok(())
    }

    fn finish_clause(&mut self) -> Result<(), DimacsParseError> {
        let sink = self.sink.as_mut().ok_or(DimacsParseError::MissingHeader)?;

        self.parsed_clauses += 1;
        sink.add_clause(&self.clause);
        self.clause.clear();
        self.state = ParseState::Clause;

        Ok(())
    }
}

#[derive(Clone, Copy, Debug)]
struct CnfHeader {
    num_variables: usize,
    num_clauses: usize,
}

impl FromStr for CnfHeader {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut components = s.split_whitespace();
        if components.next() != Some("p") || components.next() != Some("cnf") {
            return Err(());
        }

        let num_variables = components
            .next()
            .and_then(|component| component.parse::<usize>().ok())
            .ok_or(())?;
        let num_clauses = components
            .next()
            .and_then(|component| component.parse::<usize>().ok())
            .ok_or(())?;

        if components.next().is_some() || num_variables > i32::MAX as usize {
            return Err(());
        }

        Ok(CnfHeader {
            num_variables,
            num_clauses,
        })
    }
}

/// A [`DimacsSink`] which loads the clauses into a fresh [`Engine`].
#[derive(Debug)]
pub(crate) struct EngineDimacsSink {
    engine: Engine,
    clause: Vec<i32>,
}

impl DimacsSink for EngineDimacsSink {
    type ConstructorArgs = EngineConfig;
    type Formula = Engine;

    fn empty(config: EngineConfig, num_variables: usize) -> Self {
        let mut engine = Engine::new(config);
        engine.set_max_variable(num_variables as u32);

        EngineDimacsSink {
            engine,
            clause: vec![],
        }
    }

    fn add_clause(&mut self, clause: &[NonZeroI32]) {
        self.clause.clear();
        self.clause.extend(clause.iter().map(|literal| literal.get()));

        match self.engine.add_model_clause(&self.clause) {
            Ok(_) => {}
            // Once the formula is refuted, the remaining clauses do not matter.
            Err(EngineError::InconsistentSolver) => {}
            Err(error) => debug!("Skipped clause {:?}: {error}", self.clause),
        }
    }

    fn into_formula(self) -> Self::Formula {
        self.engine
    }
}

#[cfg(test)]
mod tests {
    use sat_engine::SolverState;

    use super::*;

    /// Records the clauses it receives.
    #[derive(Debug, Default)]
    struct ClauseCollector {
        num_variables: usize,
        clauses: Vec<Vec<i32>>,
    }

    impl DimacsSink for ClauseCollector {
        type ConstructorArgs = ();
        type Formula = ClauseCollector;

        fn empty(_: (), num_variables: usize) -> Self {
            ClauseCollector {
                num_variables,
                clauses: vec![],
            }
        }

        fn add_clause(&mut self, clause: &[NonZeroI32]) {
            self.clauses
                .push(clause.iter().map(|literal| literal.get()).collect());
        }

        fn into_formula(self) -> Self::Formula {
            self
        }
    }

    fn parse(source: &str) -> Result<ClauseCollector, DimacsParseError> {
        parse_cnf::<ClauseCollector>(source.as_bytes(), ())
    }

    #[test]
    fn clauses_are_parsed_across_lines_and_comments() {
        let formula = parse("c a comment\np cnf 3 2\n1 -2\nc inside\n 3 0\n-1 0\n")
            .expect("valid instance");

        assert_eq!(3, formula.num_variables);
        assert_eq!(vec![vec![1, -2, 3], vec![-1]], formula.clauses);
    }

    #[test]
    fn satlib_trailer_is_ignored() {
        let formula = parse("p cnf 2 1\n1 2 0\n%\n0\n\n").expect("valid instance");

        assert_eq!(vec![vec![1, 2]], formula.clauses);
    }

    #[test]
    fn empty_clause_is_accepted() {
        let formula = parse("p cnf 1 1\n0\n").expect("valid instance");

        assert_eq!(vec![Vec::<i32>::new()], formula.clauses);
    }

    #[test]
    fn multiple_spaces_in_header() {
        let formula = parse("p  cnf 2   1\r\n1 -2 0\r\n").expect("valid instance");

        assert_eq!(vec![vec![1, -2]], formula.clauses);
    }

    #[test]
    fn missing_header_is_reported() {
        assert!(matches!(
            parse("1 2 0\n"),
            Err(DimacsParseError::MissingHeader)
        ));
    }

    #[test]
    fn unexpected_character_reports_its_line() {
        let result = parse("p cnf 2 1\n1 x 0\n");

        assert!(matches!(
            result,
            Err(DimacsParseError::UnexpectedCharacter {
                line: 2,
                character: 'x'
            })
        ));
    }

    #[test]
    fn unterminated_clause_is_reported() {
        assert!(matches!(
            parse("p cnf 2 1\n1 2\n"),
            Err(DimacsParseError::UnterminatedClause)
        ));
        assert!(matches!(
            parse("p cnf 2 1\n1 2"),
            Err(DimacsParseError::UnterminatedClause)
        ));
    }

    #[test]
    fn clause_count_must_match_header() {
        assert!(matches!(
            parse("p cnf 2 2\n1 2 0\n"),
            Err(DimacsParseError::IncorrectClauseCount {
                expected: 2,
                parsed: 1
            })
        ));
    }

    #[test]
    fn literals_must_be_announced() {
        assert!(matches!(
            parse("p cnf 2 1\n1 -3 0\n"),
            Err(DimacsParseError::LiteralOutOfRange {
                line: 2,
                literal: -3,
                num_variables: 2
            })
        ));
    }

    #[test]
    fn second_header_is_rejected() {
        assert!(matches!(
            parse("p cnf 2 1\np cnf 2 1\n1 0\n"),
            Err(DimacsParseError::DuplicateHeader(2))
        ));
    }

    #[test]
    fn invalid_header_is_rejected() {
        assert!(matches!(
            parse("p dnf 2 1\n1 0\n"),
            Err(DimacsParseError::InvalidHeader { line: 1, .. })
        ));
    }

    #[test]
    fn engine_sink_loads_the_formula() {
        let engine = parse_cnf::<EngineDimacsSink>(
            "p cnf 2 3\n1 2 0\n-1 2 0\n-2 0\n".as_bytes(),
            EngineConfig::default(),
        )
        .expect("valid instance");

        assert_eq!(2, engine.max_variable());
        assert_eq!(3, engine.clause_store().num_clauses());
        assert!(matches!(
            engine.current_state(),
            SolverState::Unknown | SolverState::Unsatisfiable
        ));
    }
}
