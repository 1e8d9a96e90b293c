//! Read-only segments of a table
//!
//! A [`Segment`] is a filtered view over the records of a
//! [`GameTable`](crate::table::GameTable). It borrows the table, preserves the
//! table's row order, and never mutates it; filtering a segment produces a new
//! segment, so segments compose by successive filtering (logical AND).
//!
//! Filters are plain closures or [`Predicate`]s. Predicates can also be parsed
//! from text, which is how the command line builds them:
//!
//! ```
//! use vgsales_analysis::segment::Predicate;
//!
//! let predicate: Predicate = "platform=PS2 & year>=2003 & user_score>0".parse().unwrap();
//! assert_eq!(predicate.to_string(), "platform=PS2 & year>=2003 & user_score>0");
//! ```

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::record::{Column, Record};

/// Filtered, read-only view over table records.
#[derive(Debug, Clone)]
pub struct Segment<'a> {
    records: Vec<&'a Record>,
}

impl<'a> Segment<'a> {
    pub fn new<I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a Record>,
    {
        Self {
            records: records.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + '_ {
        self.records.iter().copied()
    }

    /// Sub-segment of the rows for which `f` holds.
    #[must_use]
    pub fn filter<F>(&self, f: F) -> Segment<'a>
    where
        F: Fn(&Record) -> bool,
    {
        Segment::new(self.iter().filter(|record| f(record)))
    }

    /// Sub-segment of the rows matching `predicate`.
    #[must_use]
    pub fn matching(&self, predicate: &Predicate) -> Segment<'a> {
        self.filter(|record| predicate.matches(record))
    }

    /// Non-missing values of `column`, in row order.
    #[must_use]
    pub fn values(&self, column: Column) -> Vec<f64> {
        self.iter().filter_map(|record| column.value(record)).collect()
    }
}

/// Comparison operator of a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    // two-character operators first so `>=` is not read as `>`
    const ALL: [CmpOp; 6] = [
        CmpOp::Ne,
        CmpOp::Ge,
        CmpOp::Le,
        CmpOp::Eq,
        CmpOp::Gt,
        CmpOp::Lt,
    ];

    #[must_use]
    pub fn to_str(self) -> &'static str {
        match self {
            CmpOp::Eq => "=",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }

    fn compare<T>(self, lhs: T, rhs: T) -> bool
    where
        T: PartialOrd,
    {
        match self {
            CmpOp::Eq => lhs == rhs,
            CmpOp::Ne => lhs != rhs,
            CmpOp::Lt => lhs < rhs,
            CmpOp::Le => lhs <= rhs,
            CmpOp::Gt => lhs > rhs,
            CmpOp::Ge => lhs >= rhs,
        }
    }
}

/// Row filter over records.
///
/// Comparisons against a missing field (unknown year, missing score) never
/// match. The text form groups nested conjunctions in parentheses, so
/// `!(platform=PS2 & genre=Action)` negates the whole conjunction and every
/// predicate displays as text that parses back to itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Predicate {
    Platform(String),
    Genre(String),
    /// `None` selects records without a rating.
    Rating(Option<String>),
    Year(CmpOp, i32),
    Value(Column, CmpOp, f64),
    And(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    #[must_use]
    pub fn platform(platform: impl Into<String>) -> Self {
        Predicate::Platform(platform.into())
    }

    #[must_use]
    pub fn genre(genre: impl Into<String>) -> Self {
        Predicate::Genre(genre.into())
    }

    #[must_use]
    pub fn year(year: i32) -> Self {
        Predicate::Year(CmpOp::Eq, year)
    }

    /// Years strictly between `after` and `before`.
    #[must_use]
    pub fn year_between(after: i32, before: i32) -> Self {
        Predicate::And(vec![
            Predicate::Year(CmpOp::Gt, after),
            Predicate::Year(CmpOp::Lt, before),
        ])
    }

    /// Records with positive sales in the column's region (or total).
    #[must_use]
    pub fn has_sales(column: Column) -> Self {
        Predicate::Value(column, CmpOp::Gt, 0.0)
    }

    #[must_use]
    pub fn and(self, other: Predicate) -> Self {
        match self {
            Predicate::And(mut terms) => {
                terms.push(other);
                Predicate::And(terms)
            }
            this => Predicate::And(vec![this, other]),
        }
    }

    #[must_use]
    pub fn negate(self) -> Self {
        Predicate::Not(Box::new(self))
    }

    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Predicate::Platform(platform) => record.platform == *platform,
            Predicate::Genre(genre) => record.genre == *genre,
            Predicate::Rating(rating) => record.rating == *rating,
            Predicate::Year(op, year) => record
                .release_year
                .is_some_and(|value| op.compare(value, *year)),
            Predicate::Value(column, op, threshold) => column
                .value(record)
                .is_some_and(|value| op.compare(value, *threshold)),
            Predicate::And(terms) => terms.iter().all(|term| term.matches(record)),
            Predicate::Not(inner) => !inner.matches(record),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::And(terms) if terms.len() >= 2 => fmt_terms(f, terms),
            _ => fmt_term(f, self),
        }
    }
}

fn fmt_terms(f: &mut fmt::Formatter<'_>, terms: &[Predicate]) -> fmt::Result {
    for (i, term) in terms.iter().enumerate() {
        if i > 0 {
            f.write_str(" & ")?;
        }
        fmt_term(f, term)?;
    }
    Ok(())
}

// Nested conjunctions are always parenthesized, including empty and
// single-term ones.
fn fmt_term(f: &mut fmt::Formatter<'_>, predicate: &Predicate) -> fmt::Result {
    match predicate {
        Predicate::Platform(platform) => write!(f, "platform={platform}"),
        Predicate::Genre(genre) => write!(f, "genre={genre}"),
        Predicate::Rating(rating) => write!(f, "rating={}", rating.as_deref().unwrap_or("")),
        Predicate::Year(op, year) => write!(f, "year{}{year}", op.to_str()),
        Predicate::Value(column, op, value) => write!(f, "{column}{}{value}", op.to_str()),
        Predicate::And(terms) => {
            f.write_str("(")?;
            fmt_terms(f, terms)?;
            f.write_str(")")
        }
        Predicate::Not(inner) => {
            f.write_str("!")?;
            fmt_term(f, inner)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum PredicateParseError {
    #[display("empty predicate")]
    Empty,
    #[display("no comparison operator in '{text}'")]
    MissingOperator { text: String },
    #[display("unknown predicate key '{key}'")]
    UnknownKey { key: String },
    #[display("operator '{op}' is not supported for '{key}'")]
    UnsupportedOperator { key: String, op: &'static str },
    #[display("invalid value '{value}' for '{key}'")]
    InvalidValue { key: String, value: String },
    #[display("unbalanced parentheses in '{text}'")]
    Unbalanced { text: String },
}

impl FromStr for Predicate {
    type Err = PredicateParseError;

    /// Parses `key<op>value` terms joined by `&`. A leading `!` negates a
    /// term and parentheses group a conjunction into a single term.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = Parser { text: s, rest: s };
        let mut terms = parser.conjunction()?;
        if !parser.rest.trim().is_empty() {
            return Err(parser.unbalanced());
        }
        if terms.len() == 1 {
            Ok(terms.remove(0))
        } else {
            Ok(Predicate::And(terms))
        }
    }
}

struct Parser<'a> {
    text: &'a str,
    rest: &'a str,
}

impl Parser<'_> {
    fn unbalanced(&self) -> PredicateParseError {
        PredicateParseError::Unbalanced {
            text: self.text.to_owned(),
        }
    }

    fn conjunction(&mut self) -> Result<Vec<Predicate>, PredicateParseError> {
        let mut terms = vec![self.term()?];
        loop {
            self.rest = self.rest.trim_start();
            let Some(rest) = self.rest.strip_prefix('&') else {
                return Ok(terms);
            };
            self.rest = rest;
            terms.push(self.term()?);
        }
    }

    fn term(&mut self) -> Result<Predicate, PredicateParseError> {
        self.rest = self.rest.trim_start();
        if let Some(rest) = self.rest.strip_prefix('!') {
            self.rest = rest;
            return Ok(self.term()?.negate());
        }
        if let Some(rest) = self.rest.strip_prefix('(') {
            self.rest = rest.trim_start();
            let terms = if self.rest.starts_with(')') {
                Vec::new()
            } else {
                self.conjunction()?
            };
            self.rest = self
                .rest
                .trim_start()
                .strip_prefix(')')
                .ok_or_else(|| self.unbalanced())?;
            return Ok(Predicate::And(terms));
        }
        let end = self.rest.find(['&', '(', ')']).unwrap_or(self.rest.len());
        let (atom, rest) = self.rest.split_at(end);
        self.rest = rest;
        parse_atom(atom)
    }
}

impl TryFrom<String> for Predicate {
    type Error = PredicateParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Predicate> for String {
    fn from(predicate: Predicate) -> Self {
        predicate.to_string()
    }
}

fn parse_atom(text: &str) -> Result<Predicate, PredicateParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(PredicateParseError::Empty);
    }

    let op_start = text
        .find(['=', '!', '<', '>'])
        .ok_or_else(|| PredicateParseError::MissingOperator {
            text: text.to_owned(),
        })?;
    let key = text[..op_start].trim().to_ascii_lowercase();
    let rest = &text[op_start..];
    let op = CmpOp::ALL
        .into_iter()
        .find(|op| rest.starts_with(op.to_str()))
        .ok_or_else(|| PredicateParseError::MissingOperator {
            text: text.to_owned(),
        })?;
    let value = rest[op.to_str().len()..].trim();

    let invalid = || PredicateParseError::InvalidValue {
        key: key.clone(),
        value: value.to_owned(),
    };
    let equality = |predicate: Predicate| match op {
        CmpOp::Eq => Ok(predicate),
        CmpOp::Ne => Ok(predicate.negate()),
        _ => Err(PredicateParseError::UnsupportedOperator {
            key: key.clone(),
            op: op.to_str(),
        }),
    };

    match key.as_str() {
        "platform" => equality(Predicate::platform(value)),
        "genre" => equality(Predicate::genre(value)),
        "rating" => equality(Predicate::Rating(
            (!value.is_empty()).then(|| value.to_owned()),
        )),
        "year" | "year_of_release" => {
            let year = value.parse().map_err(|_| invalid())?;
            Ok(Predicate::Year(op, year))
        }
        _ => {
            let column = key
                .parse::<Column>()
                .map_err(|_| PredicateParseError::UnknownKey { key: key.clone() })?;
            let threshold = value
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(invalid)?;
            Ok(Predicate::Value(column, op, threshold))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{record::RegionalSales, table::GameTable};

    fn record(platform: &str, year: Option<i32>, genre: &str, na: f64) -> Record {
        Record::new("game", platform, year, genre, RegionalSales::new(na, 0.0, 0.0, 0.0))
    }

    fn sample_table() -> GameTable {
        [
            record("PS2", Some(2004), "Action", 1.0),
            record("X360", Some(2008), "Shooter", 2.0),
            record("PS2", Some(2005), "Sports", 3.0),
            record("Wii", Some(2007), "Sports", 4.0),
            record("DS", None, "Puzzle", 5.0),
            record("PS2", Some(2006), "Action", 6.0),
            record("PC", Some(2011), "Strategy", 7.0),
            record("XOne", Some(2014), "Shooter", 8.0),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_platform_filter() {
        let table = sample_table();
        let ps2 = table.segment().matching(&Predicate::platform("PS2"));
        assert_eq!(ps2.len(), 3);
        assert!(ps2.iter().all(|r| r.platform == "PS2"));
    }

    #[test]
    fn test_segments_compose() {
        let table = sample_table();
        let all = table.segment();
        let ps2 = all.matching(&Predicate::platform("PS2"));
        let ps2_action = ps2.matching(&Predicate::genre("Action"));
        let combined = all.matching(&Predicate::platform("PS2").and(Predicate::genre("Action")));
        assert_eq!(ps2_action.len(), 2);
        assert_eq!(
            ps2_action.values(Column::NaSales),
            combined.values(Column::NaSales)
        );
        // the parent segment is untouched
        assert_eq!(ps2.len(), 3);
        assert_eq!(all.len(), 8);
    }

    #[test]
    fn test_unknown_year_never_matches_comparisons() {
        let table = sample_table();
        let segment = table.segment();
        assert_eq!(segment.matching(&Predicate::Year(CmpOp::Ne, 1990)).len(), 7);
        assert_eq!(segment.matching(&Predicate::year_between(2004, 2008)).len(), 3);
        assert_eq!(segment.matching(&Predicate::year(2004).negate()).len(), 7);
    }

    #[test]
    fn test_region_sales_and_bounds() {
        let table = sample_table();
        let segment = table.segment();
        assert_eq!(segment.matching(&Predicate::has_sales(Column::JpSales)).len(), 0);
        assert_eq!(segment.matching(&Predicate::has_sales(Column::NaSales)).len(), 8);
        let below: Predicate = "total_sales<4".parse().unwrap();
        assert_eq!(segment.matching(&below).values(Column::NaSales), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_parse_predicates() {
        assert_eq!("platform=PS2".parse(), Ok(Predicate::platform("PS2")));
        assert_eq!(
            "platform != PS2".parse(),
            Ok(Predicate::platform("PS2").negate())
        );
        assert_eq!("rating=".parse(), Ok(Predicate::Rating(None)));
        assert_eq!(
            "user_score>0".parse(),
            Ok(Predicate::Value(Column::UserScore, CmpOp::Gt, 0.0))
        );
        assert_eq!(
            "year >= 2003 & !genre=Misc".parse(),
            Ok(Predicate::And(vec![
                Predicate::Year(CmpOp::Ge, 2003),
                Predicate::genre("Misc").negate(),
            ]))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "platform".parse::<Predicate>(),
            Err(PredicateParseError::MissingOperator {
                text: "platform".to_owned()
            })
        );
        assert!(matches!(
            "price>3".parse::<Predicate>(),
            Err(PredicateParseError::UnknownKey { .. })
        ));
        assert!(matches!(
            "genre>Action".parse::<Predicate>(),
            Err(PredicateParseError::UnsupportedOperator { .. })
        ));
        assert!(matches!(
            "year=soon".parse::<Predicate>(),
            Err(PredicateParseError::InvalidValue { .. })
        ));
        assert_eq!("".parse::<Predicate>(), Err(PredicateParseError::Empty));
    }

    #[test]
    fn test_display_parses_back() {
        for text in ["genre=Action", "year<2016", "jp_sales>0.5", "rating=E10+"] {
            let predicate: Predicate = text.parse().unwrap();
            assert_eq!(predicate.to_string(), text);
        }
    }

    #[test]
    fn test_negated_conjunction_is_grouped() {
        let predicate = Predicate::platform("PS2")
            .and(Predicate::genre("Action"))
            .negate();
        assert_eq!(predicate.to_string(), "!(platform=PS2 & genre=Action)");
        assert_eq!(predicate.to_string().parse(), Ok(predicate.clone()));

        // 2 of the 8 rows are PS2 action games
        let table = sample_table();
        assert_eq!(table.matching(&predicate).len(), 6);
    }

    #[test]
    fn test_every_shape_round_trips() {
        let ps2 = Predicate::platform("PS2");
        let action = Predicate::genre("Action");
        let shapes = [
            ps2.clone(),
            action.clone(),
            Predicate::Rating(Some("E10+".to_owned())),
            Predicate::Rating(None),
            Predicate::Year(CmpOp::Le, 2010),
            Predicate::Value(Column::CriticScore, CmpOp::Ne, 72.5),
            ps2.clone().negate(),
            ps2.clone().negate().negate(),
            Predicate::And(vec![]),
            Predicate::And(vec![ps2.clone()]),
            ps2.clone().and(action.clone()),
            ps2.clone().and(action.clone()).negate(),
            Predicate::And(vec![
                ps2.clone(),
                Predicate::And(vec![action.clone(), Predicate::year(2005)]),
            ]),
            Predicate::And(vec![Predicate::And(vec![]).negate(), action.negate()]),
            Predicate::And(vec![ps2.negate(), Predicate::year_between(2002, 2016)]).negate(),
        ];
        for predicate in shapes {
            let text = String::from(predicate.clone());
            assert_eq!(text.parse(), Ok(predicate.clone()), "{text}");

            let json = serde_json::to_string(&predicate).unwrap();
            let back: Predicate = serde_json::from_str(&json).unwrap();
            assert_eq!(back, predicate, "{json}");
        }
    }

    #[test]
    fn test_parse_grouping() {
        assert_eq!(
            "!( platform=PS2 & genre=Action ) & year>2002".parse(),
            Ok(Predicate::And(vec![
                Predicate::platform("PS2")
                    .and(Predicate::genre("Action"))
                    .negate(),
                Predicate::Year(CmpOp::Gt, 2002),
            ]))
        );
        for text in ["(platform=PS2", "platform=PS2)", "!(genre=Action & year=2005"] {
            assert_eq!(
                text.parse::<Predicate>(),
                Err(PredicateParseError::Unbalanced {
                    text: text.to_owned()
                })
            );
        }
    }
}
