//! Typed filter expressions for the CRM search grammar.
//!
//! The CRM's search endpoint takes a textual `criteria` parameter built from
//! parenthesized `field:operator:value` clauses. Building the expression from
//! typed nodes keeps quoting and grouping rules in one place, testable
//! without any HTTP involved.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

/// CRM field holding the formatted street address.
pub const FIELD_FULL_ADDRESS: &str = "Full_Address";

/// CRM field holding the mobile phone number.
pub const FIELD_MOBILE: &str = "Mobile";

/// CRM field holding the email address.
pub const FIELD_EMAIL: &str = "Email";

/// CRM field holding the scheduled meeting time.
pub const FIELD_MEETING_TIME: &str = "Meeting_Time";

/// Days of lookback the duplicate window covers before the anchor date.
pub const DUPLICATE_LOOKBACK_DAYS: i64 = 4;

/// Timestamp rendering used by the `between` clause, offset included.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// A node in a CRM filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Criteria {
    /// Exact match: `(field:equals:"value")`
    Equals { field: &'static str, value: String },

    /// Inclusive time range: `(field:between:from,to)`
    Between {
        field: &'static str,
        from: DateTime<FixedOffset>,
        to: DateTime<FixedOffset>,
    },

    /// Disjunction, rendered inside one set of parentheses
    Or(Vec<Criteria>),

    /// Conjunction of already-grouped clauses
    And(Vec<Criteria>),
}

impl Criteria {
    /// Exact-match clause on a field.
    pub fn equals(field: &'static str, value: impl Into<String>) -> Self {
        Criteria::Equals {
            field,
            value: value.into(),
        }
    }

    /// Inclusive range clause on a timestamp field.
    pub fn between(field: &'static str, from: DateTime<FixedOffset>, to: DateTime<FixedOffset>) -> Self {
        Criteria::Between { field, from, to }
    }

    /// Render the expression in the CRM's textual grammar.
    pub fn render(&self) -> String {
        match self {
            Criteria::Equals { field, value } => format!("({}:equals:\"{}\")", field, value),
            Criteria::Between { field, from, to } => format!(
                "({}:between:{},{})",
                field,
                from.format(TIMESTAMP_FORMAT),
                to.format(TIMESTAMP_FORMAT)
            ),
            Criteria::Or(clauses) => {
                let parts: Vec<String> = clauses.iter().map(Criteria::render).collect();
                format!("({})", parts.join(" or "))
            }
            Criteria::And(clauses) => {
                let parts: Vec<String> = clauses.iter().map(Criteria::render).collect();
                parts.join(" and ")
            }
        }
    }
}

/// The inputs duplicate detection filters on.
///
/// Identity fields are optional; blank values are treated as absent so that a
/// form submitting empty strings does not produce empty-match clauses.
#[derive(Debug, Clone, PartialEq)]
pub struct LeadQuery {
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub date: NaiveDate,
}

impl LeadQuery {
    /// Build a query, dropping identity fields that are empty after trimming.
    pub fn new(
        address: Option<String>,
        phone: Option<String>,
        email: Option<String>,
        date: NaiveDate,
    ) -> Self {
        fn present(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }

        LeadQuery {
            address: present(address),
            phone: present(phone),
            email: present(email),
            date,
        }
    }

    /// Build the full search criteria: the identity disjunction, when any
    /// identity field is present, ANDed with the duplicate time window. With
    /// no identity fields the window stands alone.
    pub fn criteria(&self, offset: FixedOffset) -> Criteria {
        let mut identity = Vec::new();
        if let Some(address) = &self.address {
            identity.push(Criteria::equals(FIELD_FULL_ADDRESS, address.clone()));
        }
        if let Some(phone) = &self.phone {
            identity.push(Criteria::equals(FIELD_MOBILE, phone.clone()));
        }
        if let Some(email) = &self.email {
            identity.push(Criteria::equals(FIELD_EMAIL, email.clone()));
        }

        let (from, to) = duplicate_window(self.date, offset);
        let window = Criteria::between(FIELD_MEETING_TIME, from, to);

        if identity.is_empty() {
            window
        } else {
            Criteria::And(vec![Criteria::Or(identity), window])
        }
    }
}

/// Time range for duplicate detection: midnight four days before `date`
/// through the end of `date`, anchored to the given UTC offset.
///
/// The asymmetry is deliberate: a colliding booking can only have been made
/// on or before the requested day, so there is no lookahead past its end.
pub fn duplicate_window(
    date: NaiveDate,
    offset: FixedOffset,
) -> (DateTime<FixedOffset>, DateTime<FixedOffset>) {
    let start = NaiveDateTime::new(date - Duration::days(DUPLICATE_LOOKBACK_DAYS), NaiveTime::MIN);
    let end = NaiveDateTime::new(date, end_of_day());
    (at_offset(start, offset), at_offset(end, offset))
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
}

/// A fixed offset maps each local time to exactly one instant, so this
/// conversion is total.
fn at_offset(local: NaiveDateTime, offset: FixedOffset) -> DateTime<FixedOffset> {
    DateTime::from_naive_utc_and_offset(local - offset, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edt() -> FixedOffset {
        FixedOffset::west_opt(4 * 3600).unwrap()
    }

    fn june_10() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    #[test]
    fn test_full_criteria_rendering() {
        let query = LeadQuery::new(
            Some("123 Main St".to_string()),
            Some("5551234567".to_string()),
            Some("a@b.com".to_string()),
            june_10(),
        );

        assert_eq!(
            query.criteria(edt()).render(),
            "((Full_Address:equals:\"123 Main St\") or (Mobile:equals:\"5551234567\") or \
             (Email:equals:\"a@b.com\")) and \
             (Meeting_Time:between:2024-06-06T00:00:00-04:00,2024-06-10T23:59:59-04:00)"
        );
    }

    #[test]
    fn test_no_identity_fields_renders_window_only() {
        let query = LeadQuery::new(None, None, None, june_10());

        assert_eq!(
            query.criteria(edt()).render(),
            "(Meeting_Time:between:2024-06-06T00:00:00-04:00,2024-06-10T23:59:59-04:00)"
        );
    }

    #[test]
    fn test_blank_identity_fields_are_absent() {
        let blank = LeadQuery::new(
            Some(String::new()),
            Some("   ".to_string()),
            Some(String::new()),
            june_10(),
        );
        let absent = LeadQuery::new(None, None, None, june_10());

        assert_eq!(blank, absent);
        assert_eq!(blank.criteria(edt()), absent.criteria(edt()));
    }

    #[test]
    fn test_single_identity_field_still_grouped() {
        let query = LeadQuery::new(None, None, Some("a@b.com".to_string()), june_10());

        assert_eq!(
            query.criteria(edt()).render(),
            "((Email:equals:\"a@b.com\")) and \
             (Meeting_Time:between:2024-06-06T00:00:00-04:00,2024-06-10T23:59:59-04:00)"
        );
    }

    #[test]
    fn test_duplicate_window_bounds() {
        let (from, to) = duplicate_window(june_10(), edt());

        assert_eq!(from.to_rfc3339(), "2024-06-06T00:00:00-04:00");
        assert_eq!(to.to_rfc3339(), "2024-06-10T23:59:59-04:00");
    }

    #[test]
    fn test_duplicate_window_crosses_month_boundary() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 2).unwrap();
        let (from, to) = duplicate_window(date, edt());

        assert_eq!(from.to_rfc3339(), "2024-06-28T00:00:00-04:00");
        assert_eq!(to.to_rfc3339(), "2024-07-02T23:59:59-04:00");
    }

    #[test]
    fn test_window_respects_configured_offset() {
        let est = FixedOffset::west_opt(5 * 3600).unwrap();
        let (from, _) = duplicate_window(june_10(), est);

        assert_eq!(from.to_rfc3339(), "2024-06-06T00:00:00-05:00");
    }

    #[test]
    fn test_equals_clause_quotes_value() {
        let clause = Criteria::equals(FIELD_EMAIL, "a@b.com");
        assert_eq!(clause.render(), "(Email:equals:\"a@b.com\")");
    }
}
