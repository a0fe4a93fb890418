use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::aggregate::TeamSummary;
use wcstats_common::{Result, WcStatsError};

// --- fields ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    TeamName,
    Wins,
    Losses,
    Draws,
    MatchesPlayed,
    GoalsScored,
    GoalsTaken,
    AvgGoalsScored,
    AvgGoalsTaken,
    CurrentWinStreak,
    MaxWinStreak,
    FirstMatch,
    LastMatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Date,
}

impl Field {
    pub const ALL: [Field; 13] = [
        Field::TeamName,
        Field::Wins,
        Field::Losses,
        Field::Draws,
        Field::MatchesPlayed,
        Field::GoalsScored,
        Field::GoalsTaken,
        Field::AvgGoalsScored,
        Field::AvgGoalsTaken,
        Field::CurrentWinStreak,
        Field::MaxWinStreak,
        Field::FirstMatch,
        Field::LastMatch,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::TeamName => "team_name",
            Field::Wins => "wins",
            Field::Losses => "losses",
            Field::Draws => "draws",
            Field::MatchesPlayed => "matches_played",
            Field::GoalsScored => "goals_scored",
            Field::GoalsTaken => "goals_taken",
            Field::AvgGoalsScored => "avg_goals_scored",
            Field::AvgGoalsTaken => "avg_goals_taken",
            Field::CurrentWinStreak => "current_win_streak",
            Field::MaxWinStreak => "max_win_streak",
            Field::FirstMatch => "first_match",
            Field::LastMatch => "last_match",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Field::TeamName => FieldKind::Text,
            Field::FirstMatch | Field::LastMatch => FieldKind::Date,
            _ => FieldKind::Number,
        }
    }

    /// Reads this field off a summary. Date fields of a team without matches read as `None`.
    pub fn get(self, s: &TeamSummary) -> Option<Value> {
        let v = match self {
            Field::TeamName => Value::Text(s.team_name.clone()),
            Field::Wins => Value::Number(s.wins as f64),
            Field::Losses => Value::Number(s.losses as f64),
            Field::Draws => Value::Number(s.draws as f64),
            Field::MatchesPlayed => Value::Number(s.matches_played as f64),
            Field::GoalsScored => Value::Number(s.goals_scored as f64),
            Field::GoalsTaken => Value::Number(s.goals_taken as f64),
            Field::AvgGoalsScored => Value::Number(s.avg_goals_scored),
            Field::AvgGoalsTaken => Value::Number(s.avg_goals_taken),
            Field::CurrentWinStreak => Value::Number(s.current_win_streak as f64),
            Field::MaxWinStreak => Value::Number(s.max_win_streak as f64),
            Field::FirstMatch => Value::Date(s.first_match?),
            Field::LastMatch => Value::Date(s.last_match?),
        };
        Some(v)
    }

    /// Parses `raw` into a value of this field's kind.
    pub fn parse_value(self, raw: &str) -> Result<Value> {
        let bad = || WcStatsError::InvalidValue { field: self.name().into(), value: raw.into() };
        match self.kind() {
            FieldKind::Text => Ok(Value::Text(raw.to_owned())),
            FieldKind::Number => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Value::Number)
                .ok_or_else(bad),
            FieldKind::Date => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map(Value::Date)
                .map_err(|_| bad()),
        }
    }
}

impl FromStr for Field {
    type Err = WcStatsError;

    fn from_str(s: &str) -> Result<Self> {
        Field::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| WcStatsError::InvalidField(s.to_owned()))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// --- operators and values ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CmpOp {
    Lt,
    Le,
    #[default]
    Eq,
    Ne,
    Ge,
    Gt,
}

impl CmpOp {
    pub fn holds(self, ord: Ordering) -> bool {
        match self {
            CmpOp::Lt => ord == Ordering::Less,
            CmpOp::Le => ord != Ordering::Greater,
            CmpOp::Eq => ord == Ordering::Equal,
            CmpOp::Ne => ord != Ordering::Equal,
            CmpOp::Ge => ord != Ordering::Less,
            CmpOp::Gt => ord == Ordering::Greater,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            CmpOp::Lt => "lt",
            CmpOp::Le => "le",
            CmpOp::Eq => "eq",
            CmpOp::Ne => "ne",
            CmpOp::Ge => "ge",
            CmpOp::Gt => "gt",
        }
    }
}

impl FromStr for CmpOp {
    type Err = WcStatsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "lt" => Ok(CmpOp::Lt),
            "le" => Ok(CmpOp::Le),
            "eq" => Ok(CmpOp::Eq),
            "ne" => Ok(CmpOp::Ne),
            "ge" => Ok(CmpOp::Ge),
            "gt" => Ok(CmpOp::Gt),
            other => Err(WcStatsError::InvalidOperator(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl Value {
    /// Natural ordering within a kind; `None` across kinds or for NaN.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s:?}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Date(d) => write!(f, "{d}"),
        }
    }
}

// --- constraints and queries ---

#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub field: Field,
    pub op: CmpOp,
    pub value: Value,
}

impl Constraint {
    /// Builds a constraint, checking the value against the field's kind.
    pub fn new(field: Field, op: CmpOp, value: Value) -> Result<Self> {
        let kind_ok = matches!(
            (field.kind(), &value),
            (FieldKind::Text, Value::Text(_))
                | (FieldKind::Number, Value::Number(_))
                | (FieldKind::Date, Value::Date(_))
        );
        if !kind_ok {
            return Err(WcStatsError::InvalidValue { field: field.name().into(), value: value.to_string() });
        }
        Ok(Self { field, op, value })
    }

    /// Parses a `field` or `field__op` key with its raw value.
    pub fn parse(key: &str, raw: &str) -> Result<Self> {
        let (name, op) = match key.split_once("__") {
            Some((name, suffix)) => (name, suffix.parse::<CmpOp>()?),
            None => (key, CmpOp::default()),
        };
        let field: Field = name.parse()?;
        let value = field.parse_value(raw)?;
        Ok(Self { field, op, value })
    }

    /// A summary lacking the field (no match dates) never satisfies the constraint.
    pub fn eval(&self, s: &TeamSummary) -> bool {
        self.field
            .get(s)
            .and_then(|v| v.compare(&self.value))
            .is_some_and(|ord| self.op.holds(ord))
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}__{}={}", self.field, self.op.suffix(), self.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    And,
    #[default]
    Or,
}

impl FromStr for Mode {
    type Err = WcStatsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "and" => Ok(Mode::And),
            "or" => Ok(Mode::Or),
            other => Err(WcStatsError::InvalidMode(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    pub mode: Mode,
    pub constraints: Vec<Constraint>,
}

impl Query {
    pub fn new(mode: Mode, constraints: Vec<Constraint>) -> Self {
        Self { mode, constraints }
    }

    /// Builds a query from `key=value` style pairs; the reserved key `mode` selects the combinator.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut query = Query::default();
        for (key, raw) in pairs {
            if key == "mode" {
                query.mode = raw.parse()?;
            } else {
                query.constraints.push(Constraint::parse(key, raw)?);
            }
        }
        Ok(query)
    }

    /// Parses whitespace-separated `key=value` terms, e.g. `mode=and wins__gt=10 team_name="South Korea"`.
    /// Single or double quotes group text containing spaces.
    pub fn parse_expr(expr: &str) -> Result<Self> {
        let terms = split_terms(expr)?;
        let mut pairs = Vec::with_capacity(terms.len());
        for term in &terms {
            let (key, raw) = term
                .split_once('=')
                .ok_or_else(|| WcStatsError::Other(format!("expected key=value, got '{term}'")))?;
            pairs.push((key, raw));
        }
        Self::from_pairs(pairs)
    }

    /// Empty AND is true, empty OR is false.
    pub fn matches(&self, s: &TeamSummary) -> bool {
        match self.mode {
            Mode::And => self.constraints.iter().all(|c| c.eval(s)),
            Mode::Or => self.constraints.iter().any(|c| c.eval(s)),
        }
    }

    /// Matching subset, by reference, so results can be fed into another query.
    pub fn filter<'a, I>(&self, items: I) -> Vec<&'a TeamSummary>
    where
        I: IntoIterator<Item = &'a TeamSummary>,
    {
        items.into_iter().filter(|s| self.matches(s)).collect()
    }
}

fn split_terms(expr: &str) -> Result<Vec<String>> {
    let mut terms = Vec::new();
    let mut word = String::new();
    let mut quote: Option<char> = None;
    let mut in_term = false;
    for c in expr.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => word.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_term = true;
            }
            None if c.is_whitespace() => {
                if in_term {
                    terms.push(std::mem::take(&mut word));
                    in_term = false;
                }
            }
            None => {
                word.push(c);
                in_term = true;
            }
        }
    }
    if let Some(q) = quote {
        return Err(WcStatsError::Other(format!("unterminated {q} in '{expr}'")));
    }
    if in_term {
        terms.push(word);
    }
    Ok(terms)
}

/// Runs `queries` in sequence, each over the previous stage's output.
pub fn filter_chain<'a, I>(items: I, queries: &[Query]) -> Vec<&'a TeamSummary>
where
    I: IntoIterator<Item = &'a TeamSummary>,
{
    let mut current: Vec<&'a TeamSummary> = items.into_iter().collect();
    for q in queries {
        current = q.filter(current);
    }
    current
}

/// Orders summaries by `field`; summaries missing the field sort last.
pub fn sort_by_field(items: &mut [&TeamSummary], field: Field, descending: bool) {
    items.sort_by(|a, b| {
        let ord = match (field.get(a), field.get(b)) {
            (Some(x), Some(y)) => x.compare(&y).unwrap_or(Ordering::Equal),
            (Some(_), None) => return Ordering::Less,
            (None, Some(_)) => return Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        if descending { ord.reverse() } else { ord }
    });
}
