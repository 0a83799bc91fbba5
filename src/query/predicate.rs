//! Store-agnostic predicates and ordering over race and form-line records.
//!
//! A [`Query`] is a conjunction of [`Condition`]s plus an ordering. The
//! SQLite repository compiles it to a WHERE/ORDER BY clause. Tests evaluate
//! the same query in memory to check the compiled SQL against it.

use chrono::NaiveDate;
#[cfg(test)]
use std::cmp::Ordering;

use super::filters::{FormFilter, RaceFilter};

/// Record collection a query targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Race,
    FormLine,
}

impl EntityKind {
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Race => "races",
            EntityKind::FormLine => "form_lines",
        }
    }
}

/// Filterable or orderable column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    // races
    Date,
    RaceTime,
    // form_lines
    RunnerId,
    RaceDate,
    FinishingPosition,
    // both
    Course,
    Going,
    Distance,
    RaceClass,
}

impl Field {
    pub fn column(&self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Date => "date",
            Field::RaceTime => "race_time",
            Field::RunnerId => "runner_id",
            Field::RaceDate => "race_date",
            Field::FinishingPosition => "finishing_position",
            Field::Course => "course",
            Field::Going => "going",
            Field::Distance => "distance",
            Field::RaceClass => "race_class",
        }
    }
}

/// Typed value a condition compares against
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Text(String),
    Date(NaiveDate),
    List(Vec<i64>),
}

#[cfg(test)]
impl FieldValue {
    fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::Int(a), FieldValue::Int(b)) => Some(a.cmp(b)),
            (FieldValue::Text(a), FieldValue::Text(b)) => Some(a.cmp(b)),
            (FieldValue::Date(a), FieldValue::Date(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Gte,
    Lte,
    In,
}

/// Single `field op value` restriction
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: Field,
    pub op: Op,
    pub value: FieldValue,
}

#[cfg(test)]
impl Condition {
    /// Evaluate against a record value. Null never matches, as in SQL.
    pub fn matches(&self, actual: Option<&FieldValue>) -> bool {
        let Some(actual) = actual else {
            return false;
        };

        match (self.op, &self.value) {
            (Op::In, FieldValue::List(ids)) => match actual {
                FieldValue::Int(id) => ids.contains(id),
                _ => false,
            },
            (Op::In, _) => false,
            (Op::Eq, expected) => actual.compare(expected) == Some(Ordering::Equal),
            (Op::Gte, bound) => matches!(
                actual.compare(bound),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            (Op::Lte, bound) => matches!(
                actual.compare(bound),
                Some(Ordering::Less | Ordering::Equal)
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn keyword(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub field: Field,
    pub direction: Direction,
}

/// Records that can be evaluated against a [`Query`] in memory.
#[cfg(test)]
pub trait Filterable {
    /// Value of `field`, `None` when null or not a column of this record.
    fn field(&self, field: Field) -> Option<FieldValue>;
}

/// Conjunctive query plus result ordering
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub entity: EntityKind,
    pub conditions: Vec<Condition>,
    pub order: Vec<OrderBy>,
}

impl Query {
    pub fn new(entity: EntityKind) -> Self {
        Self {
            entity,
            conditions: Vec::new(),
            order: Vec::new(),
        }
    }

    /// Add a condition unconditionally.
    pub fn filter(mut self, field: Field, op: Op, value: FieldValue) -> Self {
        self.conditions.push(Condition { field, op, value });
        self
    }

    /// Add a condition only when a value is present.
    pub fn filter_opt(self, field: Field, op: Op, value: Option<FieldValue>) -> Self {
        match value {
            Some(value) => self.filter(field, op, value),
            None => self,
        }
    }

    pub fn order_by(mut self, field: Field, direction: Direction) -> Self {
        self.order.push(OrderBy { field, direction });
        self
    }
}

#[cfg(test)]
impl Query {
    /// Whether `record` satisfies every condition.
    pub fn matches<R: Filterable>(&self, record: &R) -> bool {
        self.conditions
            .iter()
            .all(|c| c.matches(record.field(c.field).as_ref()))
    }

    /// Sort records by the query ordering. Nulls sort lowest, like SQLite.
    pub fn sort<R: Filterable>(&self, records: &mut [R]) {
        records.sort_by(|a, b| {
            for key in &self.order {
                let ordering = compare_nullable(&a.field(key.field), &b.field(key.field));
                let ordering = match key.direction {
                    Direction::Asc => ordering,
                    Direction::Desc => ordering.reverse(),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });
    }
}

#[cfg(test)]
fn compare_nullable(a: &Option<FieldValue>, b: &Option<FieldValue>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.compare(b).unwrap_or(Ordering::Equal),
    }
}

/// Mandatory outer scope for form-line queries
#[derive(Debug, Clone, PartialEq)]
pub enum FormScope {
    Runner(i64),
    /// Batched scope for every runner of a race
    Runners(Vec<i64>),
}

fn text(value: &Option<String>) -> Option<FieldValue> {
    value.clone().map(FieldValue::Text)
}

/// Races matching `filter`, latest meeting first, then by race time.
pub fn build_race_query(filter: &RaceFilter) -> Query {
    Query::new(EntityKind::Race)
        .filter_opt(Field::Date, Op::Eq, filter.date.map(FieldValue::Date))
        .filter_opt(Field::Course, Op::Eq, text(&filter.course))
        .filter_opt(Field::Going, Op::Eq, text(&filter.going))
        .filter_opt(Field::Distance, Op::Eq, text(&filter.distance))
        .filter_opt(Field::RaceClass, Op::Eq, text(&filter.race_class))
        .filter_opt(Field::RaceTime, Op::Eq, text(&filter.race_time))
        .order_by(Field::Date, Direction::Desc)
        .order_by(Field::RaceTime, Direction::Asc)
        .order_by(Field::Id, Direction::Asc)
}

/// Form lines in `scope` matching `filter`, most recent first.
pub fn build_form_query(scope: FormScope, filter: &FormFilter) -> Query {
    let query = match scope {
        FormScope::Runner(id) => {
            Query::new(EntityKind::FormLine).filter(Field::RunnerId, Op::Eq, FieldValue::Int(id))
        }
        FormScope::Runners(ids) => {
            Query::new(EntityKind::FormLine).filter(Field::RunnerId, Op::In, FieldValue::List(ids))
        }
    };

    query
        .filter_opt(Field::RaceDate, Op::Eq, filter.date.map(FieldValue::Date))
        .filter_opt(Field::Course, Op::Eq, text(&filter.course))
        .filter_opt(Field::Going, Op::Eq, text(&filter.going))
        .filter_opt(Field::Distance, Op::Eq, text(&filter.distance))
        .filter_opt(Field::RaceClass, Op::Eq, text(&filter.race_class))
        .filter_opt(
            Field::FinishingPosition,
            Op::Gte,
            filter.min_position.map(|p| FieldValue::Int(p as i64)),
        )
        .filter_opt(
            Field::FinishingPosition,
            Op::Lte,
            filter.max_position.map(|p| FieldValue::Int(p as i64)),
        )
        .order_by(Field::RaceDate, Direction::Desc)
        .order_by(Field::Id, Direction::Asc)
}
