use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use log::warn;
use thiserror::Error;

use super::cnf::{CnfFormula, InputError};

#[derive(Error, Debug)]
pub enum DimacsError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("line {line}: expected `p cnf <vars> <clauses>` before clause data")]
    MissingHeader { line: usize },
    #[error("line {line}: malformed problem line `{text}`")]
    BadHeader { line: usize, text: String },
    #[error("line {line}: `{token}` is not a literal")]
    BadLiteral { line: usize, token: String },
    #[error("line {line}: {source}")]
    Input {
        line: usize,
        #[source]
        source: InputError,
    },
}

/// Reads DIMACS CNF: `c` comments, one `p cnf <vars> <clauses>` line, then literals with `0`
/// closing each clause. Clauses may span lines. A `%` line ends the input (SATLIB files).
pub struct DimacsParser<R> {
    reader: R,
}

impl DimacsParser<BufReader<File>> {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, DimacsError> {
        let file = File::open(path)?;
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<R: BufRead> DimacsParser<R> {
    pub fn from_reader(reader: R) -> Self {
        Self { reader }
    }

    pub fn parse(self) -> Result<CnfFormula, DimacsError> {
        let mut formula: Option<CnfFormula> = None;
        let mut declared_clauses = 0;
        let mut current: Vec<i64> = vec![];
        let mut last_line = 0;

        for (i, line) in self.reader.lines().enumerate() {
            let line = line?;
            let line_no = i + 1;
            last_line = line_no;
            let trimmed = line.trim();
            // Skip blanks and comments
            if trimmed.is_empty() || trimmed.starts_with('c') {
                continue;
            }
            if trimmed.starts_with('%') {
                break;
            }
            if trimmed.starts_with('p') {
                if formula.is_some() {
                    return Err(bad_header(line_no, trimmed));
                }
                let (n_vars, n_clauses) = parse_header(line_no, trimmed)?;
                formula = Some(CnfFormula::new(n_vars));
                declared_clauses = n_clauses;
                continue;
            }

            let Some(f) = formula.as_mut() else {
                return Err(DimacsError::MissingHeader { line: line_no });
            };
            for token in trimmed.split_whitespace() {
                let x: i64 = token.parse().map_err(|_| DimacsError::BadLiteral {
                    line: line_no,
                    token: token.to_string(),
                })?;
                if x == 0 {
                    f.add_clause(&current).map_err(|source| DimacsError::Input {
                        line: line_no,
                        source,
                    })?;
                    current.clear();
                } else {
                    current.push(x);
                }
            }
        }

        let mut formula = formula.ok_or(DimacsError::MissingHeader {
            line: last_line + 1,
        })?;
        if !current.is_empty() {
            warn!("Last clause is missing its terminating 0");
            formula
                .add_clause(&current)
                .map_err(|source| DimacsError::Input {
                    line: last_line,
                    source,
                })?;
        }
        if formula.len() != declared_clauses {
            warn!(
                "Header declares {} clauses, found {}",
                declared_clauses,
                formula.len()
            );
        }
        Ok(formula)
    }
}

/// Parses DIMACS text held in memory.
pub fn parse_str(s: &str) -> Result<CnfFormula, DimacsError> {
    DimacsParser::from_reader(s.as_bytes()).parse()
}

fn parse_header(line: usize, text: &str) -> Result<(usize, usize), DimacsError> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    match fields.as_slice() {
        ["p", "cnf", vars, clauses] => {
            let vars = vars.parse().map_err(|_| bad_header(line, text))?;
            let clauses = clauses.parse().map_err(|_| bad_header(line, text))?;
            Ok((vars, clauses))
        }
        _ => Err(bad_header(line, text)),
    }
}

fn bad_header(line: usize, text: &str) -> DimacsError {
    DimacsError::BadHeader {
        line,
        text: text.to_string(),
    }
}
